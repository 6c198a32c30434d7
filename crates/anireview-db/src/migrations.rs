use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);"
    )?;

    let version: i64 = conn
        .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (users, anime, reviews)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id          TEXT PRIMARY KEY,
                user_email  TEXT NOT NULL UNIQUE,
                last_login  TEXT NOT NULL,
                name        TEXT,
                img         TEXT
            );

            CREATE TABLE anime (
                id          TEXT PRIMARY KEY,
                name        TEXT NOT NULL,
                image_url   TEXT NOT NULL,
                description TEXT
            );

            CREATE TABLE reviews (
                id          TEXT PRIMARY KEY,
                user_id     TEXT NOT NULL REFERENCES users(id),
                anime_id    TEXT NOT NULL REFERENCES anime(id),
                date        TEXT NOT NULL,
                rating      TEXT NOT NULL,
                text        TEXT NOT NULL,
                image       TEXT,
                name        TEXT
            );

            CREATE INDEX idx_reviews_anime ON reviews(anime_id);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
