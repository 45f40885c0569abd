use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{
    Alert, AlertType, AttendanceRecord, ExamResult, FeePayment, HomeworkSubmission,
};

/// Id tags per source domain. Homework carries two tags so that a
/// submission moving from pending to overdue produces a new alert id:
/// an acknowledged "due soon" must not suppress the later "overdue".
pub const FEE_TAG: &str = "fee";
pub const HOMEWORK_DUE_TAG: &str = "homework-due";
pub const HOMEWORK_OVERDUE_TAG: &str = "homework-overdue";
pub const EXAM_TAG: &str = "exam";
pub const ATTENDANCE_TAG: &str = "attendance";

const ALL_TAGS: [&str; 5] = [
    FEE_TAG,
    HOMEWORK_DUE_TAG,
    HOMEWORK_OVERDUE_TAG,
    EXAM_TAG,
    ATTENDANCE_TAG,
];

const SECS_PER_DAY: i64 = 86_400;

fn alert_id(tag: &str, source_id: Uuid) -> String {
    format!("{tag}-{source_id}")
}

/// Checks that an id could have been produced by `alert_id`: a known
/// tag followed by a UUID. Well-formed ids that no longer match an
/// active alert are still accepted (orphaned markers are harmless).
pub fn is_valid_alert_id(id: &str) -> bool {
    ALL_TAGS.iter().any(|tag| {
        id.strip_prefix(tag)
            .and_then(|rest| rest.strip_prefix('-'))
            .map(|rest| Uuid::parse_str(rest).is_ok())
            .unwrap_or(false)
    })
}

/// Calendar-day ceiling of `due - now`. Zero or negative means due
/// today or overdue.
pub fn days_until(now: DateTime<Utc>, due: DateTime<Utc>) -> i64 {
    let secs = (due - now).num_seconds();
    secs.div_euclid(SECS_PER_DAY) + i64::from(secs.rem_euclid(SECS_PER_DAY) > 0)
}

/// Calendar-day floor of `now - then`.
pub fn days_since(now: DateTime<Utc>, then: DateTime<Utc>) -> i64 {
    (now - then).num_seconds().div_euclid(SECS_PER_DAY)
}

fn format_amount(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.abs();
    format!("{sign}{}.{:02}", cents / 100, cents % 100)
}

/// Fee rule: urgent when due today or overdue, warning when due within
/// the next 7 days. The amount due is final minus paid, deliberately
/// unclamped.
pub fn fee_alert(fee: &FeePayment, student_name: &str, now: DateTime<Utc>) -> Option<Alert> {
    let days = days_until(now, fee.due_date);
    if days > 7 {
        return None;
    }

    let amount_due = fee.final_amount_cents - fee.paid_amount_cents;
    let (alert_type, message) = if days <= 0 {
        (
            AlertType::Urgent,
            format!(
                "Fee of {} for {student_name} is due today",
                format_amount(amount_due)
            ),
        )
    } else {
        (
            AlertType::Warning,
            format!(
                "Fee of {} for {student_name} is due in {days} day(s)",
                format_amount(amount_due)
            ),
        )
    };

    Some(Alert {
        id: alert_id(FEE_TAG, fee.id),
        title: "Fee payment due".to_string(),
        message,
        alert_type,
        created_at: fee.due_date,
    })
}

/// Homework rule: overdue submissions are always urgent; pending ones
/// alert only within two days of the due date and are silent before
/// that.
pub fn homework_alert(
    homework: &HomeworkSubmission,
    student_name: &str,
    now: DateTime<Utc>,
) -> Option<Alert> {
    match homework.status.as_str() {
        "overdue" => Some(Alert {
            id: alert_id(HOMEWORK_OVERDUE_TAG, homework.id),
            title: "Homework overdue".to_string(),
            message: format!("\"{}\" is overdue for {student_name}", homework.title),
            alert_type: AlertType::Urgent,
            created_at: homework.due_date,
        }),
        "pending" => {
            let days = days_until(now, homework.due_date);
            if days <= 0 {
                Some(Alert {
                    id: alert_id(HOMEWORK_DUE_TAG, homework.id),
                    title: "Homework due".to_string(),
                    message: format!("\"{}\" for {student_name} is due today", homework.title),
                    alert_type: AlertType::Urgent,
                    created_at: homework.due_date,
                })
            } else if days <= 2 {
                Some(Alert {
                    id: alert_id(HOMEWORK_DUE_TAG, homework.id),
                    title: "Homework due".to_string(),
                    message: format!(
                        "\"{}\" for {student_name} is due in {days} day(s)",
                        homework.title
                    ),
                    alert_type: AlertType::Warning,
                    created_at: homework.due_date,
                })
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Exam rule: a result published within the last 7 days is worth an
/// info alert; older results are silent.
pub fn exam_alert(exam: &ExamResult, student_name: &str, now: DateTime<Utc>) -> Option<Alert> {
    if days_since(now, exam.created_at) > 7 {
        return None;
    }

    Some(Alert {
        id: alert_id(EXAM_TAG, exam.id),
        title: "Exam result published".to_string(),
        message: format!(
            "{} result is available for {student_name}",
            exam.exam_name
        ),
        alert_type: AlertType::Info,
        created_at: exam.created_at,
    })
}

/// Attendance rule: only the absent status alerts. The collector has
/// already narrowed this to the most recent record within 7 days.
pub fn attendance_alert(record: &AttendanceRecord, student_name: &str) -> Option<Alert> {
    if record.status != "absent" {
        return None;
    }

    Some(Alert {
        id: alert_id(ATTENDANCE_TAG, record.id),
        title: "Absence recorded".to_string(),
        message: format!(
            "{student_name} was marked absent on {}",
            record.recorded_on.format("%Y-%m-%d")
        ),
        alert_type: AlertType::Warning,
        created_at: record.recorded_on,
    })
}

/// Concatenated alerts ordered newest first. The sort is stable, so
/// equal timestamps keep their concatenation order.
pub fn merge_and_sort(mut alerts: Vec<Alert>) -> Vec<Alert> {
    alerts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap()
    }

    fn fee(due: DateTime<Utc>, final_cents: i64, paid_cents: i64) -> FeePayment {
        FeePayment {
            id: Uuid::now_v7(),
            student_id: Uuid::now_v7(),
            status: "pending".to_string(),
            final_amount_cents: final_cents,
            paid_amount_cents: paid_cents,
            due_date: due,
            created_at: now() - Duration::days(30),
        }
    }

    fn homework(status: &str, due: DateTime<Utc>) -> HomeworkSubmission {
        HomeworkSubmission {
            id: Uuid::now_v7(),
            student_id: Uuid::now_v7(),
            title: "Algebra worksheet".to_string(),
            status: status.to_string(),
            due_date: due,
            created_at: now() - Duration::days(3),
        }
    }

    fn exam(recorded: DateTime<Utc>) -> ExamResult {
        ExamResult {
            id: Uuid::now_v7(),
            student_id: Uuid::now_v7(),
            exam_name: "Midterm Mathematics".to_string(),
            marks_obtained: 78,
            total_marks: 100,
            created_at: recorded,
        }
    }

    fn attendance(status: &str, recorded: DateTime<Utc>) -> AttendanceRecord {
        AttendanceRecord {
            id: Uuid::now_v7(),
            student_id: Uuid::now_v7(),
            status: status.to_string(),
            recorded_on: recorded,
            created_at: recorded,
        }
    }

    #[test]
    fn days_until_is_calendar_ceiling() {
        assert_eq!(days_until(now(), now()), 0);
        assert_eq!(days_until(now(), now() + Duration::seconds(1)), 1);
        assert_eq!(days_until(now(), now() + Duration::days(1)), 1);
        assert_eq!(days_until(now(), now() + Duration::hours(36)), 2);
        assert_eq!(days_until(now(), now() - Duration::seconds(1)), 0);
        assert_eq!(days_until(now(), now() - Duration::hours(25)), -1);
    }

    #[test]
    fn days_since_is_calendar_floor() {
        assert_eq!(days_since(now(), now()), 0);
        assert_eq!(days_since(now(), now() - Duration::hours(23)), 0);
        assert_eq!(days_since(now(), now() - Duration::days(7)), 7);
        assert_eq!(
            days_since(now(), now() - Duration::days(7) - Duration::hours(1)),
            7
        );
        assert_eq!(days_since(now(), now() - Duration::days(8)), 8);
    }

    #[test]
    fn fee_due_today_is_urgent() {
        let alert = fee_alert(&fee(now(), 50_000, 0), "Asha Rao", now()).unwrap();
        assert_eq!(alert.alert_type, AlertType::Urgent);
        assert!(alert.message.contains("due today"));
        assert!(alert.message.contains("500.00"));
    }

    #[test]
    fn fee_overdue_is_urgent() {
        let alert = fee_alert(&fee(now() - Duration::days(3), 50_000, 20_000), "Asha Rao", now())
            .unwrap();
        assert_eq!(alert.alert_type, AlertType::Urgent);
        assert!(alert.message.contains("300.00"));
    }

    #[test]
    fn fee_due_within_week_is_warning() {
        let alert = fee_alert(&fee(now() + Duration::days(3), 50_000, 0), "Asha Rao", now())
            .unwrap();
        assert_eq!(alert.alert_type, AlertType::Warning);
        assert!(alert.message.contains("due in 3 day(s)"));
    }

    #[test]
    fn fee_seven_day_boundary() {
        assert!(fee_alert(&fee(now() + Duration::days(7), 10_000, 0), "A", now()).is_some());
        assert!(fee_alert(&fee(now() + Duration::days(8), 10_000, 0), "A", now()).is_none());
    }

    #[test]
    fn fee_overpayment_is_not_clamped() {
        let alert = fee_alert(&fee(now(), 50_000, 60_000), "Asha Rao", now()).unwrap();
        assert!(alert.message.contains("-100.00"));
    }

    #[test]
    fn fee_id_is_stable() {
        let record = fee(now(), 50_000, 0);
        let a = fee_alert(&record, "Asha Rao", now()).unwrap();
        let b = fee_alert(&record, "Asha Rao", now()).unwrap();
        assert_eq!(a.id, b.id);
        assert_eq!(a.id, format!("fee-{}", record.id));
    }

    #[test]
    fn homework_overdue_is_urgent_with_distinct_tag() {
        let record = homework("overdue", now() - Duration::days(2));
        let alert = homework_alert(&record, "Asha Rao", now()).unwrap();
        assert_eq!(alert.alert_type, AlertType::Urgent);
        assert_eq!(alert.id, format!("homework-overdue-{}", record.id));
        assert!(alert.message.contains("is overdue for Asha Rao"));
    }

    #[test]
    fn homework_pending_due_today_is_urgent() {
        let record = homework("pending", now());
        let alert = homework_alert(&record, "Asha Rao", now()).unwrap();
        assert_eq!(alert.alert_type, AlertType::Urgent);
        assert_eq!(alert.id, format!("homework-due-{}", record.id));
        assert!(alert.message.contains("due today"));
    }

    #[test]
    fn homework_pending_in_two_days_is_warning() {
        let alert =
            homework_alert(&homework("pending", now() + Duration::days(2)), "Asha", now()).unwrap();
        assert_eq!(alert.alert_type, AlertType::Warning);
        assert!(alert.message.contains("due in 2 day(s)"));
    }

    #[test]
    fn homework_pending_in_three_days_is_suppressed() {
        assert!(
            homework_alert(&homework("pending", now() + Duration::days(3)), "Asha", now())
                .is_none()
        );
    }

    #[test]
    fn homework_pending_and_overdue_ids_differ() {
        let mut record = homework("pending", now());
        let due_id = homework_alert(&record, "Asha", now()).unwrap().id;
        record.status = "overdue".to_string();
        let overdue_id = homework_alert(&record, "Asha", now()).unwrap().id;
        assert_ne!(due_id, overdue_id);
    }

    #[test]
    fn homework_graded_is_silent() {
        assert!(homework_alert(&homework("graded", now()), "Asha", now()).is_none());
    }

    #[test]
    fn exam_result_within_week_is_info() {
        let alert = exam_alert(&exam(now() - Duration::days(7)), "Asha Rao", now()).unwrap();
        assert_eq!(alert.alert_type, AlertType::Info);
        assert!(alert.message.contains("result is available"));
    }

    #[test]
    fn exam_result_older_than_week_is_silent() {
        assert!(exam_alert(&exam(now() - Duration::days(8)), "Asha", now()).is_none());
    }

    #[test]
    fn attendance_absent_is_warning() {
        let record = attendance("absent", now() - Duration::days(1));
        let alert = attendance_alert(&record, "Asha Rao").unwrap();
        assert_eq!(alert.alert_type, AlertType::Warning);
        assert_eq!(alert.id, format!("attendance-{}", record.id));
        assert!(alert.message.contains("was marked absent on 2026-03-09"));
    }

    #[test]
    fn attendance_present_is_silent() {
        assert!(attendance_alert(&attendance("present", now()), "Asha").is_none());
    }

    #[test]
    fn merge_and_sort_orders_newest_first() {
        let older = fee_alert(&fee(now() + Duration::days(1), 10_000, 0), "A", now()).unwrap();
        let newer = fee_alert(&fee(now() + Duration::days(5), 10_000, 0), "A", now()).unwrap();
        let sorted = merge_and_sort(vec![older.clone(), newer.clone()]);
        assert_eq!(sorted, vec![newer, older]);
    }

    #[test]
    fn merge_and_sort_keeps_order_on_ties() {
        let record = attendance("absent", now());
        let first = attendance_alert(&record, "A").unwrap();
        let second = fee_alert(&fee(record.recorded_on, 10_000, 0), "B", now()).unwrap();
        let sorted = merge_and_sort(vec![first.clone(), second.clone()]);
        assert_eq!(sorted, vec![first, second]);
    }

    #[test]
    fn ordering_follows_timestamp_not_domain_priority() {
        // Fee due today vs yesterday's absence: the fee's due-date
        // timestamp is more recent, so it sorts first despite both
        // being synthesized independently.
        let fee_record = fee(now(), 50_000, 0);
        let absence = attendance("absent", now() - Duration::days(1));
        let feed = merge_and_sort(vec![
            attendance_alert(&absence, "Asha Rao").unwrap(),
            fee_alert(&fee_record, "Asha Rao", now()).unwrap(),
        ]);
        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].id, format!("fee-{}", fee_record.id));
        assert_eq!(feed[0].alert_type, AlertType::Urgent);
        assert_eq!(feed[1].id, format!("attendance-{}", absence.id));
        assert_eq!(feed[1].alert_type, AlertType::Warning);
    }

    #[test]
    fn synthesis_is_deterministic_for_fixed_now() {
        let fee_record = fee(now() + Duration::days(2), 50_000, 10_000);
        let hw = homework("pending", now() + Duration::days(1));
        let build = || {
            merge_and_sort(vec![
                fee_alert(&fee_record, "Asha Rao", now()).unwrap(),
                homework_alert(&hw, "Asha Rao", now()).unwrap(),
            ])
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn valid_alert_ids_are_accepted() {
        let id = Uuid::now_v7();
        for tag in ALL_TAGS {
            assert!(is_valid_alert_id(&format!("{tag}-{id}")));
        }
    }

    #[test]
    fn malformed_alert_ids_are_rejected() {
        assert!(!is_valid_alert_id(""));
        assert!(!is_valid_alert_id("fee-"));
        assert!(!is_valid_alert_id("fee-123"));
        assert!(!is_valid_alert_id("grade-00000000-0000-0000-0000-000000000000"));
        assert!(!is_valid_alert_id("homework-00000000-0000-0000-0000-000000000000"));
    }

    #[test]
    fn negative_amount_formatting() {
        assert_eq!(format_amount(-10_050), "-100.50");
        assert_eq!(format_amount(0), "0.00");
        assert_eq!(format_amount(50_000), "500.00");
        assert_eq!(format_amount(7), "0.07");
    }
}
