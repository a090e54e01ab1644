//! The server operations the front end depends on.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    /// The request never got an answer. The caller should fall back to cached state.
    #[error("backend unreachable: {0}")]
    Unreachable(String),
    /// The server answered with an error status, and usually a message to show.
    #[error("request rejected with status {status}")]
    Rejected { status: u16, message: Option<String> },
    #[error("unexpected response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    pub email: String,
    #[serde(default)]
    pub stamps: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct StampsRecord {
    pub id: i64,
    pub stamps: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// The profile screen's inputs. Blank fields are left unchanged by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[async_trait]
pub trait Backend: Send + Sync {
    async fn register(&self, registration: &Registration) -> Result<UserRecord, BackendError>;
    async fn login(&self, credentials: &Credentials) -> Result<UserRecord, BackendError>;
    async fn get_user(&self, id: i64) -> Result<UserRecord, BackendError>;
    async fn update_user(&self, id: i64, form: &ProfileForm) -> Result<UserRecord, BackendError>;
    async fn scan(&self, id: i64) -> Result<StampsRecord, BackendError>;
    async fn redeem(&self, id: i64) -> Result<StampsRecord, BackendError>;
}
