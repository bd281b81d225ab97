//! Integration tests for `DieselContactRepository`.
//!
//! Runs the adapter against embedded PostgreSQL so owner filtering, the
//! unique indexes, `ILIKE` escaping and the `to_char` birthday projection are
//! checked against the real server.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use contacts_backend::domain::ports::{
    ContactRepository, ContactRepositoryError, UserPersistenceError, UserRepository,
};
use contacts_backend::domain::{
    ContactDraft, ContactFields, ContactPatch, EmailAddress, NewUser, Pagination, Role,
    SearchTerm, UserId, Username, birthday_window,
};
use contacts_backend::outbound::persistence::{
    DbPool, DieselContactRepository, DieselUserRepository, PoolConfig,
};
use diesel::pg::PgConnection;
use diesel::{Connection, RunQueryDsl};
use pg_embedded_setup_unpriv::TemporaryDatabase;
use rstest::{fixture, rstest};
use tokio::runtime::Runtime;

#[path = "support/embedded_postgres.rs"]
mod embedded_postgres;

use embedded_postgres::{handle_cluster_setup_failure, provision_database, shared_cluster};

struct TestContext {
    runtime: Runtime,
    contacts: DieselContactRepository,
    ada: UserId,
    bob: UserId,
    database_url: String,
    _database: TemporaryDatabase,
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 12, 28, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

fn new_user(name: &str) -> NewUser {
    NewUser {
        id: UserId::random(),
        username: Username::new(name).expect("valid username"),
        email: EmailAddress::parse(format!("{name}@example.com")).expect("valid email"),
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_owned(),
        avatar: None,
        role: Role::User,
    }
}

fn draft(first_name: &str) -> ContactDraft {
    ContactDraft {
        first_name: first_name.to_owned(),
        last_name: None,
        email: None,
        phone: None,
        birthday: None,
        notes: None,
    }
}

fn with_email(first_name: &str, email: &str) -> ContactDraft {
    ContactDraft {
        email: Some(EmailAddress::parse(email).expect("valid email")),
        ..draft(first_name)
    }
}

fn setup_context() -> Result<TestContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = shared_cluster()?;
    let database = provision_database(cluster)?;
    let database_url = database.url().to_string();

    let config = PoolConfig::new(database_url.as_str())
        .with_max_size(2)
        .with_min_idle(Some(1));
    let pool = runtime
        .block_on(DbPool::new(config))
        .map_err(|err| err.to_string())?;

    let users = DieselUserRepository::new(pool.clone());
    let (ada, bob) = runtime.block_on(async {
        let ada = users.create(&new_user("ada")).await?;
        let bob = users.create(&new_user("bob")).await?;
        Ok::<_, UserPersistenceError>((ada.id, bob.id))
    })
    .map_err(|err| err.to_string())?;

    Ok(TestContext {
        runtime,
        contacts: DieselContactRepository::new(pool),
        ada,
        bob,
        database_url,
        _database: database,
    })
}

#[fixture]
fn repo_context() -> Option<TestContext> {
    match setup_context() {
        Ok(ctx) => Some(ctx),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

#[rstest]
fn contacts_round_trip_and_stay_with_their_owner(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: contacts_round_trip_and_stay_with_their_owner skipped");
        return;
    };
    let repo = &ctx.contacts;

    ctx.runtime.block_on(async {
        let full = ContactDraft {
            last_name: Some("Smith".to_owned()),
            phone: Some("1234567890".to_owned()),
            birthday: Some(date(1990, 5, 17)),
            notes: Some("met at the conference".to_owned()),
            ..with_email("Jack", "jack@example.com")
        };
        let created = repo.create(&ctx.ada, &full, now()).await.expect("create");
        assert_eq!(created.owner, ctx.ada);
        assert_eq!(created.first_name, "Jack");
        assert_eq!(created.birthday, Some(date(1990, 5, 17)));
        assert_eq!(created.created_at, now());
        assert_eq!(created.updated_at, now());

        let found = repo.find(&ctx.ada, created.id).await.expect("find");
        assert_eq!(found.as_ref(), Some(&created));
        assert_eq!(repo.find(&ctx.bob, created.id).await.expect("find"), None);
        assert!(
            repo.list(&ctx.bob, Pagination::default())
                .await
                .expect("list")
                .is_empty()
        );

        let patch = ContactPatch::try_new(
            ContactFields {
                last_name: Some(String::new()),
                notes: Some("moved to Leeds".to_owned()),
                ..ContactFields::default()
            },
            now().date_naive(),
        )
        .expect("valid patch");
        let mut changed = created.clone();
        let later = now() + chrono::Duration::minutes(5);
        changed.apply(&patch, later);
        let updated = repo
            .update(&changed)
            .await
            .expect("update")
            .expect("row exists");
        assert_eq!(updated.last_name, None);
        assert_eq!(updated.notes.as_deref(), Some("moved to Leeds"));
        assert_eq!(updated.created_at, now());
        assert_eq!(updated.updated_at, later);

        let mut hijack = updated.clone();
        hijack.owner = ctx.bob;
        assert_eq!(repo.update(&hijack).await.expect("update"), None);

        assert!(!repo.delete(&ctx.bob, created.id).await.expect("delete"));
        assert!(repo.delete(&ctx.ada, created.id).await.expect("delete"));
        assert!(!repo.delete(&ctx.ada, created.id).await.expect("delete"));
    });
}

#[rstest]
fn unique_indexes_reject_repeated_email_or_phone(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: unique_indexes_reject_repeated_email_or_phone skipped");
        return;
    };
    let repo = &ctx.contacts;

    ctx.runtime.block_on(async {
        let original = ContactDraft {
            phone: Some("1234567890".to_owned()),
            ..with_email("Jack", "jack@example.com")
        };
        repo.create(&ctx.ada, &original, now())
            .await
            .expect("first contact");

        let same_email = with_email("Jill", "jack@example.com");
        let err = repo
            .create(&ctx.ada, &same_email, now())
            .await
            .expect_err("email taken");
        assert_eq!(err, ContactRepositoryError::Duplicate);

        let same_phone = ContactDraft {
            phone: Some("1234567890".to_owned()),
            ..draft("Jill")
        };
        let err = repo
            .create(&ctx.ada, &same_phone, now())
            .await
            .expect_err("phone taken");
        assert_eq!(err, ContactRepositoryError::Duplicate);

        repo.create(&ctx.bob, &original, now())
            .await
            .expect("other owners may reuse details");

        repo.create(&ctx.ada, &draft("NoDetails"), now())
            .await
            .expect("contact without email or phone");
        repo.create(&ctx.ada, &draft("AlsoNoDetails"), now())
            .await
            .expect("absent details never clash");

        let sibling = repo
            .create(&ctx.ada, &with_email("Zoe", "zoe@example.com"), now())
            .await
            .expect("sibling");
        let mut clash = sibling.clone();
        clash.email = Some(EmailAddress::parse("jack@example.com").expect("valid email"));
        let err = repo.update(&clash).await.expect_err("update onto taken email");
        assert_eq!(err, ContactRepositoryError::Duplicate);
    });
}

#[rstest]
fn search_ignores_case_and_escapes_wildcards(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: search_ignores_case_and_escapes_wildcards skipped");
        return;
    };
    let repo = &ctx.contacts;

    ctx.runtime.block_on(async {
        for contact in [
            ContactDraft {
                last_name: Some("Smith".to_owned()),
                ..draft("Jack")
            },
            ContactDraft {
                last_name: Some("Jackson".to_owned()),
                ..draft("Anna")
            },
            with_email("Zoe", "zoe@jacket.example"),
            draft("Bob"),
            draft("Max_Power"),
            draft("MaxxPower"),
        ] {
            repo.create(&ctx.ada, &contact, now()).await.expect("create");
        }
        repo.create(&ctx.bob, &draft("Jacqueline"), now())
            .await
            .expect("other owner");

        let term = SearchTerm::new("JAC").expect("valid term");
        let names: Vec<String> = repo
            .search(&ctx.ada, &term, Pagination::default())
            .await
            .expect("search")
            .into_iter()
            .map(|contact| contact.first_name)
            .collect();
        assert_eq!(names, ["Anna", "Jack", "Zoe"]);

        let underscore = SearchTerm::new("x_p").expect("valid term");
        let names: Vec<String> = repo
            .search(&ctx.ada, &underscore, Pagination::default())
            .await
            .expect("search")
            .into_iter()
            .map(|contact| contact.first_name)
            .collect();
        assert_eq!(names, ["Max_Power"]);
    });
}

#[rstest]
fn birthdays_match_month_and_day_in_any_year(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: birthdays_match_month_and_day_in_any_year skipped");
        return;
    };
    let repo = &ctx.contacts;

    ctx.runtime.block_on(async {
        for (name, birthday) in [
            ("Today", date(1980, 12, 28)),
            ("Tomorrow", date(1985, 12, 29)),
            ("NewYear", date(1990, 1, 2)),
            ("TooLate", date(1992, 1, 10)),
        ] {
            let contact = ContactDraft {
                birthday: Some(birthday),
                ..draft(name)
            };
            repo.create(&ctx.ada, &contact, now()).await.expect("create");
        }
        repo.create(&ctx.ada, &draft("Unknown"), now())
            .await
            .expect("no birthday");

        let window = birthday_window(date(2024, 12, 28));
        let names: Vec<String> = repo
            .with_birthdays_on(&ctx.ada, &window)
            .await
            .expect("birthdays")
            .into_iter()
            .map(|contact| contact.first_name)
            .collect();
        assert_eq!(names, ["Tomorrow", "NewYear"]);

        assert!(
            repo.with_birthdays_on(&ctx.bob, &window)
                .await
                .expect("birthdays")
                .is_empty()
        );
        assert!(
            repo.with_birthdays_on(&ctx.ada, &[])
                .await
                .expect("empty window")
                .is_empty()
        );
    });
}

#[rstest]
fn listing_pages_in_id_order(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: listing_pages_in_id_order skipped");
        return;
    };
    let repo = &ctx.contacts;

    ctx.runtime.block_on(async {
        for n in 0..12 {
            repo.create(&ctx.ada, &draft(&format!("Contact{n:02}")), now())
                .await
                .expect("create");
        }

        let first = repo
            .list(&ctx.ada, Pagination::default())
            .await
            .expect("first page");
        assert_eq!(first.len(), 10);
        assert_eq!(first[0].first_name, "Contact00");

        let rest = repo
            .list(
                &ctx.ada,
                Pagination::new(Some(10), Some(10)).expect("valid page"),
            )
            .await
            .expect("second page");
        let names: Vec<&str> = rest.iter().map(|c| c.first_name.as_str()).collect();
        assert_eq!(names, ["Contact10", "Contact11"]);
    });
}

#[rstest]
fn lookups_by_email_and_phone_are_scoped_to_owner(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: lookups_by_email_and_phone_are_scoped_to_owner skipped");
        return;
    };
    let repo = &ctx.contacts;
    let email = EmailAddress::parse("jack@example.com").expect("valid email");

    ctx.runtime.block_on(async {
        let created = repo
            .create(
                &ctx.ada,
                &ContactDraft {
                    phone: Some("555-0100".to_owned()),
                    ..with_email("Jack", "jack@example.com")
                },
                now(),
            )
            .await
            .expect("create");

        let by_email = repo.find_by_email(&ctx.ada, &email).await.expect("lookup");
        assert_eq!(by_email.map(|c| c.id), Some(created.id));
        let by_phone = repo.find_by_phone(&ctx.ada, "555-0100").await.expect("lookup");
        assert_eq!(by_phone.map(|c| c.id), Some(created.id));

        assert_eq!(repo.find_by_email(&ctx.bob, &email).await.expect("lookup"), None);
        assert_eq!(
            repo.find_by_phone(&ctx.bob, "555-0100").await.expect("lookup"),
            None
        );
    });
}

#[rstest]
fn missing_table_maps_to_query_error(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: missing_table_maps_to_query_error skipped");
        return;
    };

    let mut conn = PgConnection::establish(&ctx.database_url).expect("connect");
    diesel::sql_query("DROP TABLE contacts")
        .execute(&mut conn)
        .expect("drop table");

    let err = ctx
        .runtime
        .block_on(ctx.contacts.list(&ctx.ada, Pagination::default()))
        .expect_err("table is gone");
    assert!(matches!(err, ContactRepositoryError::Query { .. }));
}
