use app::{
    database::{self, Database},
    user::{self, Error, Id, NewUser, ProfileUpdate, Stamps, MAX_STAMPS},
};

async fn database() -> Database {
    let db = database::connect("sqlite::memory:").await.unwrap();
    database::run_migrations(&db).await.unwrap();
    db
}

fn new_user(email: &str, password: &str) -> NewUser {
    NewUser {
        name: Some("Ann".to_owned()),
        email: email.to_owned(),
        password: password.to_owned(),
    }
}

async fn stored_hash(db: &Database, id: Id) -> String {
    let (hash,): (String,) = sqlx::query_as("SELECT password FROM users WHERE id = ?")
        .bind(id.0)
        .fetch_one(db)
        .await
        .unwrap();
    hash
}

#[tokio::test]
async fn register_starts_with_an_empty_card() {
    let db = database().await;
    let user = user::register(&db, new_user("ann@example.com", "secret1"))
        .await
        .unwrap();
    assert_eq!(user.stamps, Stamps(0));
    assert_eq!(user.name.as_deref(), Some("Ann"));

    let stored = user::get(&db, user.id).await.unwrap();
    assert_eq!(stored.email.as_str(), "ann@example.com");
    assert_ne!(stored_hash(&db, user.id).await, "secret1");
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let db = database().await;
    user::register(&db, new_user("ann@example.com", "secret1"))
        .await
        .unwrap();
    let err = user::register(&db, new_user("ANN@example.com ", "another1"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::EmailTaken), "{:?}", err);
}

#[tokio::test]
async fn invalid_input_is_rejected_before_storing() {
    let db = database().await;
    assert!(matches!(
        user::register(&db, new_user("not-an-email", "secret1")).await,
        Err(Error::InvalidEmail(_))
    ));
    assert!(matches!(
        user::register(&db, new_user("ann@example.com", "short")).await,
        Err(Error::InvalidPassword(_))
    ));
    // the failed attempt must not have claimed the email
    user::register(&db, new_user("ann@example.com", "secret1"))
        .await
        .unwrap();
}

#[tokio::test]
async fn login_does_not_reveal_which_field_was_wrong() {
    let db = database().await;
    user::register(&db, new_user("ann@example.com", "secret1"))
        .await
        .unwrap();

    let wrong_password = user::login(&db, "ann@example.com", "secret2")
        .await
        .unwrap_err();
    let unknown_email = user::login(&db, "bob@example.com", "secret1")
        .await
        .unwrap_err();
    assert!(matches!(wrong_password, Error::InvalidCredentials));
    assert!(matches!(unknown_email, Error::InvalidCredentials));
    assert_eq!(wrong_password.to_string(), unknown_email.to_string());

    let user = user::login(&db, " Ann@Example.com", "secret1 ").await.unwrap();
    assert_eq!(user.email.as_str(), "ann@example.com");
}

#[tokio::test]
async fn login_requires_both_fields() {
    let db = database().await;
    assert!(matches!(
        user::login(&db, "", "secret1").await,
        Err(Error::MissingCredentials)
    ));
    assert!(matches!(
        user::login(&db, "ann@example.com", "  ").await,
        Err(Error::MissingCredentials)
    ));
}

#[tokio::test]
async fn scan_is_clamped_at_the_maximum() {
    let db = database().await;
    let user = user::register(&db, new_user("ann@example.com", "secret1"))
        .await
        .unwrap();

    for expected in 1..=4 {
        assert_eq!(user::scan(&db, user.id).await.unwrap().stamps, Stamps(expected));
    }
    assert_eq!(user::scan(&db, user.id).await.unwrap().stamps, MAX_STAMPS);
    assert_eq!(user::scan(&db, user.id).await.unwrap().stamps, MAX_STAMPS);
    assert_eq!(user::get(&db, user.id).await.unwrap().stamps, MAX_STAMPS);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_scans_all_succeed_and_stay_clamped() {
    let path = std::env::temp_dir().join(format!("digistamp-{}.db", uuid::Uuid::new_v4()));
    let db = database::connect(&format!("sqlite://{}", path.display()))
        .await
        .unwrap();
    database::run_migrations(&db).await.unwrap();
    let user = user::register(&db, new_user("ann@example.com", "secret1"))
        .await
        .unwrap();
    let id = user.id;

    let scans: Vec<_> = (0..8)
        .map(|_| {
            let db = db.clone();
            tokio::spawn(async move { user::scan(&db, id).await })
        })
        .collect();
    for scan in scans {
        let scanned = scan.await.unwrap().unwrap();
        assert!(scanned.stamps <= MAX_STAMPS);
    }
    assert_eq!(user::get(&db, id).await.unwrap().stamps, MAX_STAMPS);

    db.close().await;
    std::fs::remove_file(path).unwrap();
}

#[tokio::test]
async fn redeem_resets_any_count() {
    let db = database().await;
    let user = user::register(&db, new_user("ann@example.com", "secret1"))
        .await
        .unwrap();
    assert_eq!(user::redeem(&db, user.id).await.unwrap().stamps, Stamps(0));

    user::scan(&db, user.id).await.unwrap();
    user::scan(&db, user.id).await.unwrap();
    assert_eq!(user::redeem(&db, user.id).await.unwrap().stamps, Stamps(0));
    assert_eq!(user::get(&db, user.id).await.unwrap().stamps, Stamps(0));
}

#[tokio::test]
async fn unknown_users_are_not_found() {
    let db = database().await;
    assert!(matches!(user::get(&db, Id(42)).await, Err(Error::NotFound)));
    assert!(matches!(user::scan(&db, Id(42)).await, Err(Error::NotFound)));
    assert!(matches!(user::redeem(&db, Id(42)).await, Err(Error::NotFound)));
    assert!(matches!(
        user::update(&db, Id(42), ProfileUpdate::default()).await,
        Err(Error::NotFound)
    ));
}

#[tokio::test]
async fn blank_password_keeps_the_stored_hash() {
    let db = database().await;
    let user = user::register(&db, new_user("ann@example.com", "secret1"))
        .await
        .unwrap();
    let before = stored_hash(&db, user.id).await;

    let updated = user::update(
        &db,
        user.id,
        ProfileUpdate {
            name: Some("Annie".to_owned()),
            email: Some(" ".to_owned()),
            password: Some(String::new()),
        },
    )
    .await
    .unwrap();

    assert_eq!(updated.name.as_deref(), Some("Annie"));
    assert_eq!(updated.email.as_str(), "ann@example.com");
    assert_eq!(stored_hash(&db, user.id).await, before);
    user::login(&db, "ann@example.com", "secret1").await.unwrap();
}

#[tokio::test]
async fn new_password_is_rehashed() {
    let db = database().await;
    let user = user::register(&db, new_user("ann@example.com", "secret1"))
        .await
        .unwrap();
    let before = stored_hash(&db, user.id).await;

    user::update(
        &db,
        user.id,
        ProfileUpdate {
            password: Some("secret2".to_owned()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_ne!(stored_hash(&db, user.id).await, before);
    assert!(user::login(&db, "ann@example.com", "secret1").await.is_err());
    user::login(&db, "ann@example.com", "secret2").await.unwrap();
}

#[tokio::test]
async fn update_to_a_taken_email_is_rejected() {
    let db = database().await;
    user::register(&db, new_user("ann@example.com", "secret1"))
        .await
        .unwrap();
    let bob = user::register(&db, new_user("bob@example.com", "secret1"))
        .await
        .unwrap();

    let err = user::update(
        &db,
        bob.id,
        ProfileUpdate {
            email: Some("ann@example.com".to_owned()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::EmailTaken));
    assert_eq!(
        user::get(&db, bob.id).await.unwrap().email.as_str(),
        "bob@example.com"
    );
}

#[tokio::test]
async fn profile_update_keeps_stamps() {
    let db = database().await;
    let user = user::register(&db, new_user("ann@example.com", "secret1"))
        .await
        .unwrap();
    user::scan(&db, user.id).await.unwrap();

    let updated = user::update(
        &db,
        user.id,
        ProfileUpdate {
            email: Some("ann@example.org".to_owned()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.stamps, Stamps(1));
    assert_eq!(updated.email.as_str(), "ann@example.org");
}

#[tokio::test]
async fn seeding_is_idempotent() {
    let db = database().await;
    database::seed_development_data(&db).await.unwrap();
    database::seed_development_data(&db).await.unwrap();

    let user = user::login(&db, "test-2@user.net", "test-2").await.unwrap();
    assert_eq!(user.stamps, Stamps(4));
}
