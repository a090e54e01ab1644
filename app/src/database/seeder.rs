use super::{Database, Transaction};
use crate::auth::{self, Password};
use chrono::Utc;

/// Inserts a couple of known users for local development. Existing rows are left alone, so this
/// is safe to run on every start.
pub async fn seed_development_data(db: &Database) -> anyhow::Result<()> {
    let mut data_tx = db.begin().await?;
    seed_test_user(&mut data_tx, 1, 0).await?;
    seed_test_user(&mut data_tx, 2, 4).await?;
    data_tx.commit().await?;
    Ok(())
}

async fn seed_test_user(data_tx: &mut Transaction, index: i64, stamps: i64) -> anyhow::Result<()> {
    let email = format!("test-{}@user.net", index);
    let row = sqlx::query("SELECT id FROM users WHERE email = ?")
        .bind(&email)
        .fetch_optional(&mut **data_tx)
        .await?;
    if row.is_some() {
        return Ok(());
    }
    let password = Password::parse(&format!("test-{}", index))?;
    sqlx::query("INSERT INTO users (name, email, password, stamps, created) VALUES (?, ?, ?, ?, ?)")
        .bind(format!("Test {}", index))
        .bind(&email)
        .bind(auth::hash(&password)?.as_str())
        .bind(stamps)
        .bind(Utc::now())
        .execute(&mut **data_tx)
        .await?;
    log::info!("seeded development user {}", email);
    Ok(())
}
