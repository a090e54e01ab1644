use super::{Migration, SimpleSqlMigration};

pub fn migration() -> impl Migration {
    SimpleSqlMigration {
        serial_number: 0,
        sql: vec![
            r#"
            CREATE TABLE users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT,
                email TEXT UNIQUE NOT NULL,
                password TEXT NOT NULL,
                stamps INTEGER NOT NULL DEFAULT 0 CHECK (stamps BETWEEN 0 AND 5),
                created TEXT NOT NULL
            )"#,
        ],
    }
}
