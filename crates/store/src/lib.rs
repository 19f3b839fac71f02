//! SQLite persistence for the conversation log and auto-reply records.

pub mod sqlite;

pub use sqlite::SqliteConversationLog;

/// Run database migrations for the store crate.
///
/// Creates the `messages` and `auto_replies` tables. Called once at
/// application startup before any store handle is built.
pub async fn run_migrations(pool: &sqlx::SqlitePool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .set_ignore_missing(true)
        .run(pool)
        .await?;
    Ok(())
}
