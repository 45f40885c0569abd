use std::collections::HashSet;

use diesel::prelude::*;
use uuid::Uuid;

use schoolhub_shared::clients::db::DbPool;
use schoolhub_shared::errors::{AppError, AppResult};

use crate::models::{Alert, AnnotatedAlert, NewReadMarker};
use crate::schema::alert_read_markers;

/// Durable read-marker store: append-only acknowledgments keyed by
/// (guardian, alert id). Markers are never updated or deleted and all
/// writes are idempotent; there is no unread operation.
pub trait ReadStateStore {
    /// All alert ids this guardian has acknowledged, fetched in one
    /// batch.
    fn fetch_read_ids(&self, guardian_id: Uuid) -> AppResult<HashSet<String>>;

    fn is_read(&self, guardian_id: Uuid, alert_id: &str) -> AppResult<bool> {
        Ok(self.fetch_read_ids(guardian_id)?.contains(alert_id))
    }

    /// Record that a guardian has seen one alert id. Repeat calls for
    /// the same pair are no-ops.
    fn mark_read(&self, guardian_id: Uuid, alert_id: &str) -> AppResult<()>;

    /// Set-union write: inserts the given ids, silently skipping pairs
    /// that already exist. Returns the number of newly marked ids.
    fn mark_read_bulk(&self, guardian_id: Uuid, alert_ids: &[String]) -> AppResult<usize>;
}

/// Postgres-backed store over the alert_read_markers table. Uniqueness
/// rests on the table's composite primary key; no other locking is
/// needed.
#[derive(Clone)]
pub struct PgReadStateStore {
    pool: DbPool,
}

impl PgReadStateStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn get_conn(
        &self,
    ) -> AppResult<
        diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<diesel::pg::PgConnection>>,
    > {
        self.pool.get().map_err(|e| {
            tracing::error!(error = %e, "failed to get db connection");
            AppError::internal("database connection error")
        })
    }
}

impl ReadStateStore for PgReadStateStore {
    fn fetch_read_ids(&self, guardian_id: Uuid) -> AppResult<HashSet<String>> {
        let mut conn = self.get_conn()?;

        let ids = alert_read_markers::table
            .filter(alert_read_markers::guardian_id.eq(guardian_id))
            .select(alert_read_markers::alert_id)
            .load::<String>(&mut conn)?;

        Ok(ids.into_iter().collect())
    }

    fn mark_read(&self, guardian_id: Uuid, alert_id: &str) -> AppResult<()> {
        let mut conn = self.get_conn()?;

        diesel::insert_into(alert_read_markers::table)
            .values(&NewReadMarker {
                guardian_id,
                alert_id: alert_id.to_string(),
            })
            .on_conflict((
                alert_read_markers::guardian_id,
                alert_read_markers::alert_id,
            ))
            .do_nothing()
            .execute(&mut conn)?;

        Ok(())
    }

    fn mark_read_bulk(&self, guardian_id: Uuid, alert_ids: &[String]) -> AppResult<usize> {
        if alert_ids.is_empty() {
            return Ok(0);
        }

        let mut conn = self.get_conn()?;

        let markers: Vec<NewReadMarker> = alert_ids
            .iter()
            .map(|alert_id| NewReadMarker {
                guardian_id,
                alert_id: alert_id.clone(),
            })
            .collect();

        let inserted = diesel::insert_into(alert_read_markers::table)
            .values(&markers)
            .on_conflict((
                alert_read_markers::guardian_id,
                alert_read_markers::alert_id,
            ))
            .do_nothing()
            .execute(&mut conn)?;

        Ok(inserted)
    }
}

/// Joins durable read markers onto the freshly synthesized feed. There
/// is no referential integrity between the two: an unmatched marker is
/// simply ignored, an unmatched alert is unread.
pub fn annotate(alerts: Vec<Alert>, read_ids: &HashSet<String>) -> Vec<AnnotatedAlert> {
    alerts
        .into_iter()
        .map(|alert| {
            let read = read_ids.contains(&alert.id);
            AnnotatedAlert { alert, read }
        })
        .collect()
}
