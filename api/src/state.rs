use app::database::Database;

use crate::rate_limit::RateLimit;

pub struct RocketState {
    pub db: Database,
    /// Throttles scans and redemptions per user.
    pub stamp_limit: RateLimit,
}
