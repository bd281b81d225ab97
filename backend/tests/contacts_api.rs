//! Contacts endpoints over the full application stack.

use actix_web::http::StatusCode;
use actix_web::test::TestRequest;
use rstest::rstest;
use serde_json::{Value, json};

mod support;

use support::{TestApp, bearer, call, register};

fn first_names(body: &Value) -> Vec<String> {
    body.as_array()
        .expect("contact list")
        .iter()
        .map(|contact| contact["first_name"].as_str().expect("first name").to_owned())
        .collect()
}

#[rstest]
#[actix_web::test]
async fn contact_lifecycle() {
    let harness = TestApp::new();
    let app = harness.service().await;
    let tokens = register(&harness, &app, "ada").await;
    let auth = || bearer(&tokens.access_token);

    let created = call(
        &app,
        TestRequest::post()
            .uri("/api/contacts")
            .insert_header(auth())
            .set_json(json!({
                "first_name": "Jack",
                "last_name": "Smith",
                "email": "Jack@Example.com",
                "phone": "1234567890",
                "birthday": "1990-05-17",
            })),
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED, "{}", created.body);
    assert_eq!(created.body["email"], "jack@example.com");
    assert!(created.body.get("owner").is_none());
    let id = created.body["id"].as_i64().expect("contact id");
    let uri = format!("/api/contacts/{id}");

    let fetched = call(&app, TestRequest::get().uri(&uri).insert_header(auth())).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body["last_name"], "Smith");

    let updated = call(
        &app,
        TestRequest::put()
            .uri(&uri)
            .insert_header(auth())
            .set_json(json!({ "notes": "met at the conference", "last_name": "" })),
    )
    .await;
    assert_eq!(updated.status, StatusCode::ACCEPTED, "{}", updated.body);
    assert_eq!(updated.body["notes"], "met at the conference");
    assert_eq!(updated.body["last_name"], Value::Null);
    assert_eq!(updated.body["phone"], "1234567890");

    let deleted = call(&app, TestRequest::delete().uri(&uri).insert_header(auth())).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
    assert!(harness.contacts.is_empty());

    let gone = call(&app, TestRequest::get().uri(&uri).insert_header(auth())).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    assert_eq!(gone.body["code"], "not_found");

    let again = call(&app, TestRequest::delete().uri(&uri).insert_header(auth())).await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
}

#[rstest]
#[actix_web::test]
async fn contacts_require_authentication() {
    let harness = TestApp::new();
    let app = harness.service().await;

    let reply = call(&app, TestRequest::get().uri("/api/contacts")).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.body["code"], "unauthorized");
}

#[rstest]
#[actix_web::test]
async fn contacts_are_private_to_their_owner() {
    let harness = TestApp::new();
    let app = harness.service().await;
    let ada = register(&harness, &app, "ada").await;
    let bob = register(&harness, &app, "bob").await;

    let created = call(
        &app,
        TestRequest::post()
            .uri("/api/contacts")
            .insert_header(bearer(&ada.access_token))
            .set_json(json!({ "first_name": "Jack", "email": "jack@example.com" })),
    )
    .await;
    let uri = format!("/api/contacts/{}", created.body["id"]);

    let peek = call(
        &app,
        TestRequest::get().uri(&uri).insert_header(bearer(&bob.access_token)),
    )
    .await;
    assert_eq!(peek.status, StatusCode::NOT_FOUND);

    let overwrite = call(
        &app,
        TestRequest::put()
            .uri(&uri)
            .insert_header(bearer(&bob.access_token))
            .set_json(json!({ "notes": "mine now" })),
    )
    .await;
    assert_eq!(overwrite.status, StatusCode::NOT_FOUND);

    let remove = call(
        &app,
        TestRequest::delete().uri(&uri).insert_header(bearer(&bob.access_token)),
    )
    .await;
    assert_eq!(remove.status, StatusCode::NOT_FOUND);

    let bobs = call(
        &app,
        TestRequest::get()
            .uri("/api/contacts")
            .insert_header(bearer(&bob.access_token)),
    )
    .await;
    assert_eq!(bobs.body, json!([]));
    assert_eq!(harness.contacts.len(), 1);
}

#[rstest]
#[case(json!({ "first_name": "Jill", "email": "JACK@example.com" }))]
#[case(json!({ "first_name": "Jill", "phone": "1234567890" }))]
#[actix_web::test]
async fn duplicate_email_or_phone_conflicts_per_owner(#[case] duplicate: Value) {
    let harness = TestApp::new();
    let app = harness.service().await;
    let ada = register(&harness, &app, "ada").await;
    let bob = register(&harness, &app, "bob").await;
    let original = json!({
        "first_name": "Jack",
        "email": "jack@example.com",
        "phone": "1234567890",
    });
    let create = |token: &str, body: &Value| {
        TestRequest::post()
            .uri("/api/contacts")
            .insert_header(bearer(token))
            .set_json(body)
    };

    assert_eq!(
        call(&app, create(&ada.access_token, &original)).await.status,
        StatusCode::CREATED
    );

    let clash = call(&app, create(&ada.access_token, &duplicate)).await;
    assert_eq!(clash.status, StatusCode::CONFLICT);
    assert_eq!(clash.body["code"], "conflict");

    let other_owner = call(&app, create(&bob.access_token, &duplicate)).await;
    assert_eq!(other_owner.status, StatusCode::CREATED);
}

#[rstest]
#[actix_web::test]
async fn search_matches_names_and_email_case_insensitively() {
    let harness = TestApp::new();
    let app = harness.service().await;
    let tokens = register(&harness, &app, "ada").await;
    for body in [
        json!({ "first_name": "Jack", "last_name": "Smith" }),
        json!({ "first_name": "Anna", "last_name": "Jackson" }),
        json!({ "first_name": "Zoe", "email": "zoe@jacket.example" }),
        json!({ "first_name": "Bob", "last_name": "Brown" }),
    ] {
        let created = call(
            &app,
            TestRequest::post()
                .uri("/api/contacts")
                .insert_header(bearer(&tokens.access_token))
                .set_json(body),
        )
        .await;
        assert_eq!(created.status, StatusCode::CREATED, "{}", created.body);
    }

    let found = call(
        &app,
        TestRequest::get()
            .uri("/api/contacts/search?q=JAC")
            .insert_header(bearer(&tokens.access_token)),
    )
    .await;
    assert_eq!(found.status, StatusCode::OK);
    assert_eq!(first_names(&found.body), ["Anna", "Jack", "Zoe"]);

    let too_short = call(
        &app,
        TestRequest::get()
            .uri("/api/contacts/search?q=ja")
            .insert_header(bearer(&tokens.access_token)),
    )
    .await;
    assert_eq!(too_short.status, StatusCode::BAD_REQUEST);
}

#[rstest]
#[actix_web::test]
async fn birthdays_cover_the_coming_week() {
    let harness = TestApp::new();
    let app = harness.service().await;
    let tokens = register(&harness, &app, "ada").await;
    // The harness clock reads 2024-12-28, so the window is Dec 29 to Jan 4.
    for (name, birthday) in [
        ("Today", "1980-12-28"),
        ("Tomorrow", "1985-12-29"),
        ("NewYear", "1990-01-02"),
        ("EndOfWindow", "1975-01-04"),
        ("TooLate", "1992-01-10"),
    ] {
        call(
            &app,
            TestRequest::post()
                .uri("/api/contacts")
                .insert_header(bearer(&tokens.access_token))
                .set_json(json!({ "first_name": name, "birthday": birthday })),
        )
        .await;
    }

    let upcoming = call(
        &app,
        TestRequest::get()
            .uri("/api/contacts/birthdays")
            .insert_header(bearer(&tokens.access_token)),
    )
    .await;
    assert_eq!(upcoming.status, StatusCode::OK);
    let mut names = first_names(&upcoming.body);
    names.sort();
    assert_eq!(names, ["EndOfWindow", "NewYear", "Tomorrow"]);
}

#[rstest]
#[case("/api/contacts?limit=5")]
#[case("/api/contacts?limit=101")]
#[case("/api/contacts?limit=ten")]
#[case("/api/contacts/0")]
#[case("/api/contacts/not-a-number")]
#[actix_web::test]
async fn malformed_paging_or_ids_are_bad_requests(#[case] uri: &str) {
    let harness = TestApp::new();
    let app = harness.service().await;
    let tokens = register(&harness, &app, "ada").await;

    let reply = call(
        &app,
        TestRequest::get()
            .uri(uri)
            .insert_header(bearer(&tokens.access_token)),
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST, "{}", reply.body);
    assert_eq!(reply.body["code"], "invalid_request");
}

#[rstest]
#[actix_web::test]
async fn listing_pages_through_contacts() {
    let harness = TestApp::new();
    let app = harness.service().await;
    let tokens = register(&harness, &app, "ada").await;
    for n in 0..12 {
        call(
            &app,
            TestRequest::post()
                .uri("/api/contacts")
                .insert_header(bearer(&tokens.access_token))
                .set_json(json!({ "first_name": format!("Contact{n:02}") })),
        )
        .await;
    }

    let first = call(
        &app,
        TestRequest::get()
            .uri("/api/contacts")
            .insert_header(bearer(&tokens.access_token)),
    )
    .await;
    assert_eq!(first.body.as_array().map(Vec::len), Some(10));

    let rest = call(
        &app,
        TestRequest::get()
            .uri("/api/contacts?limit=10&offset=10")
            .insert_header(bearer(&tokens.access_token)),
    )
    .await;
    assert_eq!(rest.body.as_array().map(Vec::len), Some(2));
}
