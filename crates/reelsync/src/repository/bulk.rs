use sea_orm::{DatabaseConnection, EntityTrait, sea_query::OnConflict};
use serde::Serialize;

use crate::entity::movie::{ActiveModel, Column, Entity as Movie};

use super::errors::Result;

// ─── Bulk Operations ─────────────────────────────────────────────────────────

/// Tally of an unordered bulk insert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BulkInsertOutcome {
    /// Rows written.
    pub inserted: u64,
    /// Rows whose id was already stored.
    pub skipped: u64,
    /// Rows that failed for any other reason.
    pub failed: u64,
}

impl BulkInsertOutcome {
    pub fn total(&self) -> u64 {
        self.inserted + self.skipped + self.failed
    }
}

impl std::ops::AddAssign for BulkInsertOutcome {
    fn add_assign(&mut self, other: Self) {
        self.inserted += other.inserted;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

/// `ON CONFLICT (id) DO NOTHING`.
pub(crate) fn build_skip_on_conflict() -> OnConflict {
    OnConflict::column(Column::Id).do_nothing().to_owned()
}

/// Insert many movies without letting one bad row block the rest.
///
/// First tries a single multi-row `INSERT .. ON CONFLICT (id) DO NOTHING`.
/// If that statement fails as a whole, every row is retried on its own and
/// failures are counted instead of returned.
///
/// # Errors
/// Never fails on row-level problems; the outcome carries the counts.
pub async fn insert_many_unordered(
    db: &DatabaseConnection,
    models: Vec<ActiveModel>,
) -> Result<BulkInsertOutcome> {
    if models.is_empty() {
        return Ok(BulkInsertOutcome::default());
    }

    let models: Vec<ActiveModel> = models
        .into_iter()
        .map(ActiveModel::with_search_keys)
        .collect();
    let total = models.len() as u64;
    tracing::debug!(count = total, "Starting bulk insert");

    match Movie::insert_many(models.clone())
        .on_conflict(build_skip_on_conflict())
        .exec_without_returning(db)
        .await
    {
        Ok(inserted) => Ok(BulkInsertOutcome {
            inserted,
            skipped: total.saturating_sub(inserted),
            failed: 0,
        }),
        Err(e) => {
            tracing::warn!(
                count = total,
                error = %e,
                "Bulk insert failed, falling back to per-row inserts"
            );
            Ok(insert_each(db, models).await)
        }
    }
}

async fn insert_each(db: &DatabaseConnection, models: Vec<ActiveModel>) -> BulkInsertOutcome {
    let mut outcome = BulkInsertOutcome::default();

    for model in models {
        let id = model.id.clone().into_value();
        match Movie::insert(model)
            .on_conflict(build_skip_on_conflict())
            .exec_without_returning(db)
            .await
        {
            Ok(0) => outcome.skipped += 1,
            Ok(_) => outcome.inserted += 1,
            Err(e) => {
                tracing::warn!(id = ?id, error = %e, "Failed to insert movie");
                outcome.failed += 1;
            }
        }
    }

    outcome
}
