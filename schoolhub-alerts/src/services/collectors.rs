use chrono::{DateTime, Duration, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use schoolhub_shared::clients::db::DbPool;
use schoolhub_shared::errors::{AppError, AppResult};

use crate::models::{AttendanceRecord, ExamResult, FeePayment, HomeworkSubmission, Student};
use crate::schema::{attendance_records, exam_results, fee_payments, homework_submissions, students};

/// Per-domain cap on records per dependent. The feed is bounded by
/// design; a guardian never sees more than this many per source per
/// child.
const PER_DEPENDENT_CAP: i64 = 5;
const FEE_LOOKAHEAD_DAYS: i64 = 7;
const ATTENDANCE_LOOKBACK_DAYS: i64 = 7;

type PooledConn =
    diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<diesel::pg::PgConnection>>;

fn get_conn(pool: &DbPool) -> AppResult<PooledConn> {
    pool.get().map_err(|e| {
        tracing::error!(error = %e, "failed to get db connection");
        AppError::internal("database connection error")
    })
}

/// Students linked to a guardian, in registration order.
pub fn resolve_dependents(pool: &DbPool, guardian_id: Uuid) -> AppResult<Vec<Student>> {
    let mut conn = get_conn(pool)?;

    let dependents = students::table
        .filter(students::guardian_id.eq(guardian_id))
        .order(students::created_at.asc())
        .load::<Student>(&mut conn)?;

    Ok(dependents)
}

/// Unsettled fee payments due within the next 7 days, overdue included.
pub fn collect_fees(
    pool: &DbPool,
    student_ids: &[Uuid],
    now: DateTime<Utc>,
) -> AppResult<Vec<FeePayment>> {
    let mut conn = get_conn(pool)?;
    let horizon = now + Duration::days(FEE_LOOKAHEAD_DAYS);

    let mut payments = Vec::new();
    for student_id in student_ids {
        let rows = fee_payments::table
            .filter(fee_payments::student_id.eq(student_id))
            .filter(fee_payments::status.eq_any(vec!["pending", "partial"]))
            .filter(fee_payments::due_date.le(horizon))
            .order(fee_payments::due_date.desc())
            .limit(PER_DEPENDENT_CAP)
            .load::<FeePayment>(&mut conn)?;
        payments.extend(rows);
    }

    Ok(payments)
}

/// Open homework submissions, newest first.
pub fn collect_homework(pool: &DbPool, student_ids: &[Uuid]) -> AppResult<Vec<HomeworkSubmission>> {
    let mut conn = get_conn(pool)?;

    let mut submissions = Vec::new();
    for student_id in student_ids {
        let rows = homework_submissions::table
            .filter(homework_submissions::student_id.eq(student_id))
            .filter(homework_submissions::status.eq_any(vec!["pending", "overdue"]))
            .order(homework_submissions::created_at.desc())
            .limit(PER_DEPENDENT_CAP)
            .load::<HomeworkSubmission>(&mut conn)?;
        submissions.extend(rows);
    }

    Ok(submissions)
}

/// Latest exam results, newest first. The 7-day relevance window is
/// applied by the synthesizer, not here.
pub fn collect_exams(pool: &DbPool, student_ids: &[Uuid]) -> AppResult<Vec<ExamResult>> {
    let mut conn = get_conn(pool)?;

    let mut results = Vec::new();
    for student_id in student_ids {
        let rows = exam_results::table
            .filter(exam_results::student_id.eq(student_id))
            .order(exam_results::created_at.desc())
            .limit(PER_DEPENDENT_CAP)
            .load::<ExamResult>(&mut conn)?;
        results.extend(rows);
    }

    Ok(results)
}

/// The single most recent attendance record per dependent within the
/// last 7 days.
pub fn collect_attendance(
    pool: &DbPool,
    student_ids: &[Uuid],
    now: DateTime<Utc>,
) -> AppResult<Vec<AttendanceRecord>> {
    let mut conn = get_conn(pool)?;
    let cutoff = now - Duration::days(ATTENDANCE_LOOKBACK_DAYS);

    let mut records = Vec::new();
    for student_id in student_ids {
        let row = attendance_records::table
            .filter(attendance_records::student_id.eq(student_id))
            .filter(attendance_records::recorded_on.ge(cutoff))
            .order(attendance_records::recorded_on.desc())
            .first::<AttendanceRecord>(&mut conn)
            .optional()?;
        if let Some(record) = row {
            records.push(record);
        }
    }

    Ok(records)
}
