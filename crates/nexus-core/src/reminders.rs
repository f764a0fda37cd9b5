//! Due-reminder detection.

use chrono::{DateTime, Duration, Utc};

use crate::models::Note;

/// Reminders older than this are considered missed, not due
pub const DUE_WINDOW_MINUTES: i64 = 5;

/// Notes whose enabled, not yet delivered reminder fell due within the
/// last five minutes (inclusive at both ends).
#[must_use]
pub fn due_reminders(notes: &[Note], now: DateTime<Utc>) -> Vec<&Note> {
    let window_start = now - Duration::minutes(DUE_WINDOW_MINUTES);
    notes
        .iter()
        .filter(|note| {
            note.reminder.as_ref().is_some_and(|reminder| {
                reminder.enabled
                    && !reminder.notified
                    && reminder.datetime <= now
                    && reminder.datetime >= window_start
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Reminder;
    use chrono::TimeZone;

    fn with_reminder(title: &str, datetime: DateTime<Utc>) -> Note {
        let mut note = Note::new("personal", title);
        note.reminder = Some(Reminder::at(datetime));
        note
    }

    #[test]
    fn only_recent_undelivered_reminders_are_due() {
        let now = Utc.with_ymd_and_hms(2025, 12, 15, 10, 0, 0).unwrap();

        let due = with_reminder("due", now - Duration::minutes(2));
        let edge = with_reminder("edge", now - Duration::minutes(5));
        let missed = with_reminder("missed", now - Duration::minutes(6));
        let future = with_reminder("future", now + Duration::minutes(1));
        let mut delivered = with_reminder("delivered", now);
        if let Some(reminder) = delivered.reminder.as_mut() {
            reminder.notified = true;
        }
        let mut disabled = with_reminder("disabled", now);
        if let Some(reminder) = disabled.reminder.as_mut() {
            reminder.enabled = false;
        }
        let plain = Note::new("work", "no reminder");

        let notes = vec![due, edge, missed, future, delivered, disabled, plain];
        let titles: Vec<&str> = due_reminders(&notes, now)
            .into_iter()
            .map(|note| note.title.as_str())
            .collect();

        assert_eq!(titles, vec!["due", "edge"]);
    }
}
