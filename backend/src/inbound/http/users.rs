//! Users API handlers.
//!
//! ```text
//! GET /api/users/me
//! PATCH /api/users/avatar  (multipart/form-data, field "file")
//! ```

use actix_multipart::{Field, Multipart, MultipartError};
use actix_web::{get, patch, web};
use futures_util::TryStreamExt;

use crate::domain::ports::AvatarUpload;
use crate::domain::{Error, UserProfile};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, invalid_value, missing_field_error};

/// Multipart field carrying the avatar image.
pub const AVATAR_FIELD: &str = "file";
/// Largest accepted avatar upload.
pub const AVATAR_MAX_BYTES: usize = 5 * 1024 * 1024;

/// Return the authenticated caller's profile.
#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Current user", body = UserProfile),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 429, description = "Too many requests", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "currentUser",
    security(("bearer" = []))
)]
#[get("/me")]
pub async fn me(user: AuthenticatedUser) -> ApiResult<web::Json<UserProfile>> {
    Ok(web::Json(user.into_profile()))
}

fn malformed_multipart(error: MultipartError) -> Error {
    invalid_value(
        FieldName::new(AVATAR_FIELD),
        format!("malformed multipart body: {error}"),
    )
}

async fn read_upload(mut field: Field) -> Result<AvatarUpload, Error> {
    let file_name = field
        .content_disposition()
        .and_then(|disposition| disposition.get_filename())
        .unwrap_or(AVATAR_FIELD)
        .to_owned();
    let content_type = field.content_type().map(ToString::to_string);
    let mut bytes = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(malformed_multipart)? {
        if bytes.len() + chunk.len() > AVATAR_MAX_BYTES {
            return Err(invalid_value(
                FieldName::new(AVATAR_FIELD),
                format!("avatar must be at most {AVATAR_MAX_BYTES} bytes"),
            ));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(AvatarUpload {
        file_name,
        content_type,
        bytes,
    })
}

/// Pull the avatar part out of the multipart stream, skipping other parts.
async fn avatar_part(mut payload: Multipart) -> Result<AvatarUpload, Error> {
    while let Some(field) = payload.try_next().await.map_err(malformed_multipart)? {
        if field.name() == Some(AVATAR_FIELD) {
            return read_upload(field).await;
        }
    }
    Err(missing_field_error(FieldName::new(AVATAR_FIELD)))
}

/// Replace the caller's avatar with the uploaded image.
#[utoipa::path(
    patch,
    path = "/api/users/avatar",
    request_body(content_type = "multipart/form-data", description = "Image in the `file` part"),
    responses(
        (status = 200, description = "Updated profile", body = UserProfile),
        (status = 400, description = "Missing, empty or rejected image", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 429, description = "Too many requests", body = Error),
        (status = 503, description = "Image host unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateAvatar",
    security(("bearer" = []))
)]
#[patch("/avatar")]
pub async fn update_avatar(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: Multipart,
) -> ApiResult<web::Json<UserProfile>> {
    let upload = avatar_part(payload).await?;
    let profile = state
        .profile
        .update_avatar(user.profile(), upload)
        .await?;
    Ok(web::Json(profile))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{MockPorts, authenticated, bearer, sample_profile};
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use serde_json::Value;

    const BOUNDARY: &str = "contacts-boundary";

    fn multipart_body(field: &str, file_name: &str, bytes: &[u8]) -> Vec<u8> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: image/png\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload_request(body: Vec<u8>) -> actix_test::TestRequest {
        actix_test::TestRequest::patch()
            .uri("/api/users/avatar")
            .insert_header(bearer())
            .insert_header((
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(body)
    }

    macro_rules! users_app {
        ($ports:expr) => {
            actix_test::init_service(
                App::new()
                    .app_data($ports.into_state())
                    .service(web::scope("/api/users").service(me).service(update_avatar)),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn me_returns_profile_of_bearer() {
        let mut ports = MockPorts::default();
        authenticated(&mut ports, sample_profile());
        let app = users_app!(ports);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/users/me")
                .insert_header(bearer())
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["username"], "ada");
        assert_eq!(body["role"], "user");
        assert!(body.get("refreshToken").is_none());
    }

    #[actix_web::test]
    async fn me_without_token_is_unauthorised() {
        let app = users_app!(MockPorts::default());

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/api/users/me").to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn avatar_upload_forwards_file_part() {
        let mut ports = MockPorts::default();
        authenticated(&mut ports, sample_profile());
        ports
            .profile
            .expect_update_avatar()
            .withf(|profile, upload| {
                profile.username.as_str() == "ada"
                    && upload.file_name == "me.png"
                    && upload.content_type.as_deref() == Some("image/png")
                    && upload.bytes == b"PNGDATA"
            })
            .return_once(|profile, _| {
                let mut updated = profile.clone();
                updated.avatar = Some("https://res.cloudinary.com/demo/contacts/me.png".into());
                Ok(updated)
            });
        let app = users_app!(ports);

        let res = actix_test::call_service(
            &app,
            upload_request(multipart_body(AVATAR_FIELD, "me.png", b"PNGDATA")).to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["avatar"], "https://res.cloudinary.com/demo/contacts/me.png");
    }

    #[actix_web::test]
    async fn upload_without_file_part_is_bad_request() {
        let mut ports = MockPorts::default();
        authenticated(&mut ports, sample_profile());
        let app = users_app!(ports);

        let res = actix_test::call_service(
            &app,
            upload_request(multipart_body("picture", "me.png", b"PNGDATA")).to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["details"]["field"], AVATAR_FIELD);
    }

    #[actix_web::test]
    async fn oversized_upload_is_rejected_before_reaching_the_host() {
        let mut ports = MockPorts::default();
        authenticated(&mut ports, sample_profile());
        let app = users_app!(ports);
        let oversized = vec![0_u8; AVATAR_MAX_BYTES + 1];

        let res = actix_test::call_service(
            &app,
            upload_request(multipart_body(AVATAR_FIELD, "big.png", &oversized)).to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
