use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::task;
use uuid::Uuid;

use schoolhub_shared::clients::db::DbPool;
use schoolhub_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{Alert, AnnotatedAlert, Student};
use crate::services::read_state::{self, PgReadStateStore, ReadStateStore};
use crate::services::{collectors, synthesizer};

fn join_err(e: task::JoinError) -> AppError {
    tracing::error!(error = %e, "blocking task failed");
    AppError::internal("internal task failure")
}

fn no_dependents() -> AppError {
    AppError::new(
        ErrorCode::NoDependentsRegistered,
        "no students are linked to this account",
    )
}

/// The full feed for a guardian: dependents resolved and read markers
/// fetched concurrently, then the four collectors fanned out, then the
/// synthesized feed annotated with read state. Pure read.
pub async fn list_alerts(pool: &DbPool, guardian_id: Uuid) -> AppResult<Vec<AnnotatedAlert>> {
    let now = Utc::now();

    let dependents_pool = pool.clone();
    let markers = PgReadStateStore::new(pool.clone());
    let (dependents, read_ids) = tokio::try_join!(
        task::spawn_blocking(move || collectors::resolve_dependents(&dependents_pool, guardian_id)),
        task::spawn_blocking(move || markers.fetch_read_ids(guardian_id)),
    )
    .map_err(join_err)?;
    let dependents = dependents?;
    let read_ids = read_ids?;

    if dependents.is_empty() {
        return Err(no_dependents());
    }

    let alerts = build_feed(pool, &dependents, now).await?;

    tracing::debug!(
        guardian_id = %guardian_id,
        alerts = alerts.len(),
        "alert feed synthesized"
    );

    Ok(read_state::annotate(alerts, &read_ids))
}

/// Acknowledge a single alert id. The id only has to be well formed;
/// whether it matches a currently active alert is irrelevant (see the
/// orphaned-marker invariant).
pub async fn mark_alert_read(pool: &DbPool, guardian_id: Uuid, alert_id: String) -> AppResult<()> {
    if !synthesizer::is_valid_alert_id(&alert_id) {
        return Err(AppError::new(
            ErrorCode::MalformedAlertId,
            format!("malformed alert id: {alert_id}"),
        ));
    }

    let store = PgReadStateStore::new(pool.clone());
    task::spawn_blocking(move || store.mark_read(guardian_id, &alert_id))
        .await
        .map_err(join_err)?
}

/// Recomputes the live feed and bulk-acknowledges every id in it. An
/// alert that disappeared since the client last listed is never
/// marked; one that appeared since is. Returns the number of newly
/// marked ids.
pub async fn mark_all_alerts_read(pool: &DbPool, guardian_id: Uuid) -> AppResult<usize> {
    let now = Utc::now();

    let dependents_pool = pool.clone();
    let dependents =
        task::spawn_blocking(move || collectors::resolve_dependents(&dependents_pool, guardian_id))
            .await
            .map_err(join_err)??;

    if dependents.is_empty() {
        return Err(no_dependents());
    }

    let alert_ids: Vec<String> = build_feed(pool, &dependents, now)
        .await?
        .into_iter()
        .map(|alert| alert.id)
        .collect();

    let store = PgReadStateStore::new(pool.clone());
    let marked = task::spawn_blocking(move || store.mark_read_bulk(guardian_id, &alert_ids))
        .await
        .map_err(join_err)??;

    tracing::debug!(guardian_id = %guardian_id, marked, "marked all alerts read");

    Ok(marked)
}

/// Collector fan-out, synthesis, and ordering. A single `now` is
/// threaded through the whole pass so urgency thresholds cannot
/// straddle a day boundary within one response. Any collector failure
/// fails the feed; a partial feed is never returned.
async fn build_feed(
    pool: &DbPool,
    dependents: &[Student],
    now: DateTime<Utc>,
) -> AppResult<Vec<Alert>> {
    let student_ids: Vec<Uuid> = dependents.iter().map(|s| s.id).collect();
    let names: HashMap<Uuid, String> = dependents
        .iter()
        .map(|s| (s.id, s.display_name()))
        .collect();

    let fee_pool = pool.clone();
    let homework_pool = pool.clone();
    let exam_pool = pool.clone();
    let attendance_pool = pool.clone();
    let fee_ids = student_ids.clone();
    let homework_ids = student_ids.clone();
    let exam_ids = student_ids.clone();
    let attendance_ids = student_ids;

    let (fees, homework, exams, attendance) = tokio::try_join!(
        task::spawn_blocking(move || collectors::collect_fees(&fee_pool, &fee_ids, now)),
        task::spawn_blocking(move || collectors::collect_homework(&homework_pool, &homework_ids)),
        task::spawn_blocking(move || collectors::collect_exams(&exam_pool, &exam_ids)),
        task::spawn_blocking(move || {
            collectors::collect_attendance(&attendance_pool, &attendance_ids, now)
        }),
    )
    .map_err(join_err)?;
    let (fees, homework, exams, attendance) = (fees?, homework?, exams?, attendance?);

    let mut alerts = Vec::new();
    alerts.extend(fees.iter().filter_map(|fee| {
        let name = names.get(&fee.student_id)?;
        synthesizer::fee_alert(fee, name, now)
    }));
    alerts.extend(homework.iter().filter_map(|submission| {
        let name = names.get(&submission.student_id)?;
        synthesizer::homework_alert(submission, name, now)
    }));
    alerts.extend(exams.iter().filter_map(|result| {
        let name = names.get(&result.student_id)?;
        synthesizer::exam_alert(result, name, now)
    }));
    alerts.extend(attendance.iter().filter_map(|record| {
        let name = names.get(&record.student_id)?;
        synthesizer::attendance_alert(record, name)
    }));

    Ok(synthesizer::merge_and_sort(alerts))
}
