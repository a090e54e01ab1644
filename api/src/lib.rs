//! This library contains definitions for the API layer.

use app::database::Database;
use rocket::{Build, Rocket};
use state::RocketState;

mod cors;
mod error;
mod rate_limit;
mod routes;
mod state;

pub use cors::Cors;
pub use rate_limit::RateLimit;

pub fn register(
    rocket: Rocket<Build>,
    db: Database,
    cors: Cors,
    stamp_limit: RateLimit,
) -> Rocket<Build> {
    routes::register(rocket.attach(cors), RocketState { db, stamp_limit })
}
