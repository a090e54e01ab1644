use std::time::Duration;

use app::database::{self, run_migrations, seed_development_data};
use rocket::{figment::providers::Env, Build, Rocket};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Config {
    database_url: String,
    #[serde(default)]
    cors: CorsConfig,
    #[serde(default)]
    rate_limit: RateLimitConfig,
    #[serde(default = "seed_by_default")]
    seed_development_data: bool,
}

fn seed_by_default() -> bool {
    cfg!(debug_assertions)
}

#[derive(Debug, Deserialize)]
struct CorsConfig {
    allowed_origin: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origin: "*".to_owned(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RateLimitConfig {
    limit: usize,
    span_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            limit: 10,
            span_secs: 60,
        }
    }
}

impl RateLimitConfig {
    fn into_rate_limit(self) -> api::RateLimit {
        api::RateLimit::new(self.limit, Duration::from_secs(self.span_secs))
    }
}

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    start_server().await?.launch().await?;
    Ok(())
}

async fn start_server() -> anyhow::Result<Rocket<Build>> {
    // A bare PORT variable is honoured alongside ROCKET_PORT.
    let rocket = rocket::custom(rocket::Config::figment().merge(Env::raw().only(&["port"])));
    let config: Config = rocket.figment().extract()?;

    let db = database::connect(&config.database_url).await?;
    run_migrations(&db).await?;
    if config.seed_development_data {
        log::info!("seeding development users");
        seed_development_data(&db).await?;
    }

    Ok(api::register(
        rocket,
        db,
        api::Cors::new(config.cors.allowed_origin),
        config.rate_limit.into_rate_limit(),
    ))
}
