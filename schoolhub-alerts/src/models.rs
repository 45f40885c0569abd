use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::schema::{
    alert_read_markers, attendance_records, exam_results, fee_payments, homework_submissions,
    students,
};

#[derive(Debug, Clone, Queryable, Identifiable, Serialize)]
#[diesel(table_name = students)]
pub struct Student {
    pub id: Uuid,
    pub guardian_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub class_name: String,
    pub created_at: DateTime<Utc>,
}

impl Student {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = fee_payments)]
pub struct FeePayment {
    pub id: Uuid,
    pub student_id: Uuid,
    pub status: String,
    pub final_amount_cents: i64,
    pub paid_amount_cents: i64,
    pub due_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = homework_submissions)]
pub struct HomeworkSubmission {
    pub id: Uuid,
    pub student_id: Uuid,
    pub title: String,
    pub status: String,
    pub due_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = exam_results)]
pub struct ExamResult {
    pub id: Uuid,
    pub student_id: Uuid,
    pub exam_name: String,
    pub marks_obtained: i32,
    pub total_marks: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = attendance_records)]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub student_id: Uuid,
    pub status: String,
    pub recorded_on: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// The only persisted row of the alert subsystem. Presence of a
/// (guardian_id, alert_id) pair means the guardian has acknowledged
/// that alert id; there is no unread operation and no payload.
#[derive(Debug, Insertable)]
#[diesel(table_name = alert_read_markers)]
pub struct NewReadMarker {
    pub guardian_id: Uuid,
    pub alert_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertType {
    Info,
    Warning,
    Urgent,
}

/// A synthesized alert. Never stored; recomputed from the source domain
/// tables on every feed request. `created_at` is the domain-relevant
/// date (due date, result date, absence date), used for ordering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub created_at: DateTime<Utc>,
}

/// An alert with the viewer's durable read state joined on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedAlert {
    #[serde(flatten)]
    pub alert: Alert,
    pub read: bool,
}
