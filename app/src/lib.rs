//! Domain and persistence layer of the stamp card service.

pub mod auth;
pub mod database;
pub mod user;

pub use user::{Stamps, MAX_STAMPS};
