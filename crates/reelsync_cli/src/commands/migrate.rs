use console::style;

use reelsync::db;
use reelsync::migration::{Migrator, MigratorTrait};

use crate::MigrateAction;

/// Handle `reelsync migrate ...`.
pub(crate) async fn handle_migrate(
    action: MigrateAction,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = db::connect(database_url).await?;

    match action {
        MigrateAction::Up => {
            let pending = Migrator::get_pending_migrations(&db).await?;
            if pending.is_empty() {
                println!("Movie store schema is up to date.");
                return Ok(());
            }
            for migration in &pending {
                println!("  applying {}", migration.name());
            }
            Migrator::up(&db, None).await?;
            println!("{} {} migration(s) applied.", style("Done:").green().bold(), pending.len());
        }
        MigrateAction::Down => {
            Migrator::down(&db, Some(1)).await?;
            println!("Rolled back the most recent migration.");
        }
        MigrateAction::Status => {
            let applied = Migrator::get_applied_migrations(&db).await?;
            let pending = Migrator::get_pending_migrations(&db).await?;
            for migration in &applied {
                println!("  {} {}", style("applied").green(), migration.name());
            }
            for migration in &pending {
                println!("  {} {}", style("pending").yellow(), migration.name());
            }
        }
        MigrateAction::Fresh => {
            println!(
                "{} dropping the movies table and every stored movie.",
                style("Warning:").yellow().bold()
            );
            Migrator::fresh(&db).await?;
            println!("Movie store recreated.");
        }
    }

    Ok(())
}
