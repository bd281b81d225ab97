//! Contacts API handlers.
//!
//! ```text
//! POST   /api/contacts {"first_name":"Jack","email":"jack@example.com"}
//! GET    /api/contacts?limit=10&offset=0
//! GET    /api/contacts/search?q=jac
//! GET    /api/contacts/birthdays
//! GET    /api/contacts/{contact_id}
//! PUT    /api/contacts/{contact_id} {"phone":"1234567890"}
//! DELETE /api/contacts/{contact_id}
//! ```
//!
//! Every handler is scoped to the authenticated caller; another user's
//! contact ids resolve to `404`.

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Contact, ContactFields, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_contact_id, parse_pagination, parse_search_term};

/// Contact body for create and update.
///
/// On update, absent fields are left unchanged and blank optional strings
/// clear the stored value. Camel-case field names are accepted as aliases.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct ContactPayload {
    #[serde(default, alias = "firstName")]
    #[schema(example = "Jack", max_length = 50)]
    pub first_name: Option<String>,
    #[serde(default, alias = "lastName")]
    #[schema(example = "Smith", max_length = 50)]
    pub last_name: Option<String>,
    #[serde(default)]
    #[schema(example = "jack@example.com", max_length = 50)]
    pub email: Option<String>,
    #[serde(default)]
    #[schema(example = "1234567890", max_length = 30)]
    pub phone: Option<String>,
    #[serde(default)]
    #[schema(example = "1990-05-17")]
    pub birthday: Option<NaiveDate>,
    #[serde(default)]
    #[schema(max_length = 150)]
    pub notes: Option<String>,
}

impl From<ContactPayload> for ContactFields {
    fn from(payload: ContactPayload) -> Self {
        Self {
            first_name: payload.first_name,
            last_name: payload.last_name,
            email: payload.email,
            phone: payload.phone,
            birthday: payload.birthday,
            notes: payload.notes,
        }
    }
}

/// Paging parameters.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Page size, 10 to 100. Defaults to 10.
    pub limit: Option<u32>,
    /// Rows to skip. Defaults to 0.
    pub offset: Option<u32>,
}

/// Search parameters.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Case-insensitive fragment of a name or email, 3 to 50 characters.
    pub q: Option<String>,
    /// Page size, 10 to 100. Defaults to 10.
    pub limit: Option<u32>,
    /// Rows to skip. Defaults to 0.
    pub offset: Option<u32>,
}

/// Create a contact.
#[utoipa::path(
    post,
    path = "/api/contacts",
    request_body = ContactPayload,
    responses(
        (status = 201, description = "Contact created", body = Contact),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 409, description = "Email or phone already used", body = Error),
        (status = 429, description = "Too many requests", body = Error)
    ),
    tags = ["contacts"],
    operation_id = "createContact",
    security(("bearer" = []))
)]
#[post("")]
pub async fn create_contact(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<ContactPayload>,
) -> ApiResult<HttpResponse> {
    let contact = state
        .contacts
        .create(&user.profile().id, payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(contact))
}

/// List the caller's contacts ordered by id.
#[utoipa::path(
    get,
    path = "/api/contacts",
    params(PageQuery),
    responses(
        (status = 200, description = "Contacts", body = [Contact]),
        (status = 400, description = "Invalid paging", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 429, description = "Too many requests", body = Error)
    ),
    tags = ["contacts"],
    operation_id = "listContacts",
    security(("bearer" = []))
)]
#[get("")]
pub async fn list_contacts(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<Vec<Contact>>> {
    let page = parse_pagination(query.limit, query.offset)?;
    let contacts = state.contacts_query.list(&user.profile().id, page).await?;
    Ok(web::Json(contacts))
}

/// Search names and email.
#[utoipa::path(
    get,
    path = "/api/contacts/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching contacts", body = [Contact]),
        (status = 400, description = "Invalid search term or paging", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 429, description = "Too many requests", body = Error)
    ),
    tags = ["contacts"],
    operation_id = "searchContacts",
    security(("bearer" = []))
)]
#[get("/search")]
pub async fn search_contacts(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    query: web::Query<SearchQuery>,
) -> ApiResult<web::Json<Vec<Contact>>> {
    let SearchQuery { q, limit, offset } = query.into_inner();
    let term = parse_search_term(q.as_deref())?;
    let page = parse_pagination(limit, offset)?;
    let contacts = state
        .contacts_query
        .search(&user.profile().id, &term, page)
        .await?;
    Ok(web::Json(contacts))
}

/// Contacts with a birthday in the next seven days.
#[utoipa::path(
    get,
    path = "/api/contacts/birthdays",
    responses(
        (status = 200, description = "Upcoming birthdays", body = [Contact]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 429, description = "Too many requests", body = Error)
    ),
    tags = ["contacts"],
    operation_id = "upcomingBirthdays",
    security(("bearer" = []))
)]
#[get("/birthdays")]
pub async fn upcoming_birthdays(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<Contact>>> {
    let contacts = state
        .contacts_query
        .upcoming_birthdays(&user.profile().id)
        .await?;
    Ok(web::Json(contacts))
}

/// Fetch one contact.
#[utoipa::path(
    get,
    path = "/api/contacts/{contact_id}",
    params(("contact_id" = i64, Path, description = "Contact identifier", minimum = 1)),
    responses(
        (status = 200, description = "Contact", body = Contact),
        (status = 400, description = "Invalid id", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Contact not found", body = Error),
        (status = 429, description = "Too many requests", body = Error)
    ),
    tags = ["contacts"],
    operation_id = "getContact",
    security(("bearer" = []))
)]
#[get("/{contact_id}")]
pub async fn get_contact(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> ApiResult<web::Json<Contact>> {
    let id = parse_contact_id(path.into_inner())?;
    let contact = state.contacts_query.get(&user.profile().id, id).await?;
    Ok(web::Json(contact))
}

/// Update the present fields of a contact.
#[utoipa::path(
    put,
    path = "/api/contacts/{contact_id}",
    params(("contact_id" = i64, Path, description = "Contact identifier", minimum = 1)),
    request_body = ContactPayload,
    responses(
        (status = 202, description = "Contact updated", body = Contact),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Contact not found", body = Error),
        (status = 409, description = "Email or phone already used", body = Error),
        (status = 429, description = "Too many requests", body = Error)
    ),
    tags = ["contacts"],
    operation_id = "updateContact",
    security(("bearer" = []))
)]
#[put("/{contact_id}")]
pub async fn update_contact(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
    payload: web::Json<ContactPayload>,
) -> ApiResult<HttpResponse> {
    let id = parse_contact_id(path.into_inner())?;
    let contact = state
        .contacts
        .update(&user.profile().id, id, payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Accepted().json(contact))
}

/// Delete a contact.
#[utoipa::path(
    delete,
    path = "/api/contacts/{contact_id}",
    params(("contact_id" = i64, Path, description = "Contact identifier", minimum = 1)),
    responses(
        (status = 204, description = "Contact deleted"),
        (status = 400, description = "Invalid id", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Contact not found", body = Error),
        (status = 429, description = "Too many requests", body = Error)
    ),
    tags = ["contacts"],
    operation_id = "deleteContact",
    security(("bearer" = []))
)]
#[delete("/{contact_id}")]
pub async fn delete_contact(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let id = parse_contact_id(path.into_inner())?;
    state.contacts.delete(&user.profile().id, id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Register the contact routes on a scope.
///
/// The fixed `search` and `birthdays` paths are registered before
/// `{contact_id}` so they are never captured as ids.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(create_contact)
        .service(list_contacts)
        .service(search_contacts)
        .service(upcoming_birthdays)
        .service(get_contact)
        .service(update_contact)
        .service(delete_contact);
}

#[cfg(test)]
#[path = "contacts_tests.rs"]
mod tests;
