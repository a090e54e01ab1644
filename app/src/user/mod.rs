//! Registration, login, profile updates, and the stamp card itself.
//!
//! Every user carries exactly one card. A scan adds a stamp up to [`MAX_STAMPS`], a redemption
//! consumes the reward and resets the card to zero.

use crate::{
    auth::{self, Password, PasswordError},
    database::Database,
};
use chrono::Utc;
use thiserror::Error;

mod entities;

pub use entities::{Email, EmailError, Id, Stamps, User, MAX_STAMPS};

use entities::normalize_name;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    InvalidEmail(#[from] EmailError),
    #[error(transparent)]
    InvalidPassword(#[from] PasswordError),
    #[error("email is already registered")]
    EmailTaken,
    #[error("email and password are required")]
    MissingCredentials,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("user not found")]
    NotFound,
    #[error(transparent)]
    Hash(#[from] auth::HashError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Default)]
pub struct NewUser {
    pub name: Option<String>,
    pub email: String,
    pub password: String,
}

/// Requested profile changes. Absent or blank fields keep their current value.
#[derive(Debug, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

pub async fn register(db: &Database, new_user: NewUser) -> Result<User, Error> {
    let email = Email::parse(&new_user.email)?;
    let password = Password::parse(&new_user.password)?;
    let user = User {
        id: Id::default(),
        name: normalize_name(new_user.name.as_deref()),
        email,
        password: auth::hash(&password)?,
        stamps: Stamps::default(),
        created: Utc::now(),
    };

    let mut conn = db.acquire().await?;
    let id = queries::insert(&mut conn, &user).await?;
    log::info!("registered user {:?}", id);
    Ok(User { id, ..user })
}

/// Checks credentials. Unknown emails and wrong passwords produce the same error.
pub async fn login(db: &Database, email: &str, password: &str) -> Result<User, Error> {
    if email.trim().is_empty() || password.trim().is_empty() {
        return Err(Error::MissingCredentials);
    }
    let email = Email::parse(email).map_err(|_| Error::InvalidCredentials)?;

    let mut conn = db.acquire().await?;
    let user = queries::get_by_email(&mut conn, &email)
        .await?
        .ok_or(Error::InvalidCredentials)?;
    if auth::verify(&user.password, password.trim())? {
        Ok(user)
    } else {
        log::info!("rejected login for user {:?}", user.id);
        Err(Error::InvalidCredentials)
    }
}

pub async fn get(db: &Database, id: Id) -> Result<User, Error> {
    let mut conn = db.acquire().await?;
    queries::get(&mut conn, id).await?.ok_or(Error::NotFound)
}

/// Applies a profile update. The password is only rehashed when a new one is supplied; otherwise
/// the stored hash is written back unchanged.
pub async fn update(db: &Database, id: Id, update: ProfileUpdate) -> Result<User, Error> {
    let email = match non_blank(update.email.as_deref()) {
        Some(raw) => Some(Email::parse(raw)?),
        None => None,
    };
    let password = match non_blank(update.password.as_deref()) {
        Some(raw) => Some(auth::hash(&Password::parse(raw)?)?),
        None => None,
    };
    let name = normalize_name(update.name.as_deref());

    let mut data_tx = db.begin().await?;
    let mut user = queries::get(&mut data_tx, id)
        .await?
        .ok_or(Error::NotFound)?;
    if let Some(name) = name {
        user.name = Some(name);
    }
    if let Some(email) = email {
        user.email = email;
    }
    if let Some(password) = password {
        user.password = password;
    }
    queries::update(&mut data_tx, &user).await?;
    data_tx.commit().await?;
    Ok(user)
}

/// Adds a stamp to the user's card, never going past [`MAX_STAMPS`].
pub async fn scan(db: &Database, id: Id) -> Result<User, Error> {
    let mut conn = db.acquire().await?;
    queries::add_stamp(&mut conn, id)
        .await?
        .ok_or(Error::NotFound)
}

/// Resets the user's card to zero stamps.
pub async fn redeem(db: &Database, id: Id) -> Result<User, Error> {
    let mut conn = db.acquire().await?;
    let user = queries::reset_stamps(&mut conn, id)
        .await?
        .ok_or(Error::NotFound)?;
    log::info!("user {:?} redeemed a reward", id);
    Ok(user)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}

mod queries {
    use super::{Email, Error, Id, Stamps, User, MAX_STAMPS};
    use crate::{auth::PasswordHash, database::Connection};
    use chrono::{DateTime, Utc};
    use const_format::formatcp;

    const COLUMNS: &str = "id, name, email, password, stamps, created";

    pub(super) async fn insert(conn: &mut Connection, user: &User) -> Result<Id, Error> {
        sqlx::query(
            "INSERT INTO users (name, email, password, stamps, created) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(user.name.as_deref())
        .bind(user.email.as_str())
        .bind(user.password.as_str())
        .bind(i64::from(user.stamps.0))
        .bind(user.created)
        .execute(conn)
        .await
        .map(|result| Id(result.last_insert_rowid()))
        .map_err(email_conflict)
    }

    pub(super) async fn get(conn: &mut Connection, id: Id) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, UserRow>(formatcp!("SELECT {} FROM users WHERE id = ?", COLUMNS))
            .bind(id.0)
            .fetch_optional(conn)
            .await
            .map(|row| row.map(UserRow::into_entity))
    }

    pub(super) async fn get_by_email(
        conn: &mut Connection,
        email: &Email,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, UserRow>(formatcp!("SELECT {} FROM users WHERE email = ?", COLUMNS))
            .bind(email.as_str())
            .fetch_optional(conn)
            .await
            .map(|row| row.map(UserRow::into_entity))
    }

    pub(super) async fn update(conn: &mut Connection, user: &User) -> Result<(), Error> {
        sqlx::query("UPDATE users SET name = ?, email = ?, password = ? WHERE id = ?")
            .bind(user.name.as_deref())
            .bind(user.email.as_str())
            .bind(user.password.as_str())
            .bind(user.id.0)
            .execute(conn)
            .await
            .map(|_| ())
            .map_err(email_conflict)
    }

    /// Stamp changes are single statements, so concurrent scans never race a read against a write.
    pub(super) async fn add_stamp(
        conn: &mut Connection,
        id: Id,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, UserRow>(formatcp!(
            "UPDATE users SET stamps = MIN(stamps + 1, ?) WHERE id = ? RETURNING {}",
            COLUMNS
        ))
        .bind(i64::from(MAX_STAMPS.0))
        .bind(id.0)
        .fetch_optional(conn)
        .await
        .map(|row| row.map(UserRow::into_entity))
    }

    pub(super) async fn reset_stamps(
        conn: &mut Connection,
        id: Id,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, UserRow>(formatcp!(
            "UPDATE users SET stamps = 0 WHERE id = ? RETURNING {}",
            COLUMNS
        ))
        .bind(id.0)
        .fetch_optional(conn)
        .await
        .map(|row| row.map(UserRow::into_entity))
    }

    /// The only unique column besides the key is `email`.
    fn email_conflict(e: sqlx::Error) -> Error {
        match &e {
            sqlx::Error::Database(db_error) if db_error.is_unique_violation() => Error::EmailTaken,
            _ => Error::Database(e),
        }
    }

    #[derive(sqlx::FromRow, Debug)]
    struct UserRow {
        id: i64,
        name: Option<String>,
        email: String,
        password: String,
        stamps: i64,
        created: DateTime<Utc>,
    }

    impl UserRow {
        fn into_entity(self) -> User {
            User {
                id: Id(self.id),
                name: self.name,
                email: Email(self.email),
                password: PasswordHash(self.password),
                stamps: Stamps::from_stored(self.stamps),
                created: self.created,
            }
        }
    }
}
