//! Store connection.

use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};

/// Pragmas applied to SQLite file databases.
///
/// Sync writes one chunk at a time while `movies list` may read from another
/// process; WAL lets the reader through and the busy timeout absorbs the
/// short write lock.
const SQLITE_PRAGMAS: [&str; 3] = [
    "PRAGMA journal_mode=WAL",
    "PRAGMA busy_timeout=5000",
    "PRAGMA synchronous=NORMAL",
];

/// Whether `database_url` names an on-disk SQLite database.
fn is_sqlite_file(database_url: &str) -> bool {
    database_url.starts_with("sqlite://") && !database_url.contains(":memory:")
}

async fn apply_sqlite_pragmas(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    for pragma in SQLITE_PRAGMAS {
        db.execute(Statement::from_string(backend, pragma)).await?;
    }
    Ok(())
}

/// Open the movie store.
///
/// `database_url` is anything sea-orm accepts, e.g.
/// `sqlite:///home/me/.local/state/reelsync/reelsync.db?mode=rwc` or
/// `postgres://localhost/reelsync`.
///
/// # Errors
/// Returns `DbErr` if the connection or the SQLite pragmas fail.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(database_url).await?;
    if is_sqlite_file(database_url) {
        apply_sqlite_pragmas(&db).await?;
        tracing::debug!("SQLite store opened in WAL mode");
    }
    Ok(db)
}

/// Open the movie store and bring the schema up to date.
///
/// # Errors
/// Returns `DbErr` if the connection fails or a migration fails.
#[cfg(feature = "migrate")]
pub async fn connect_and_migrate(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    use sea_orm_migration::MigratorTrait;

    let db = connect(database_url).await?;
    crate::migration::Migrator::up(&db, None).await?;
    Ok(db)
}
