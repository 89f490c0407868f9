use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::models::Visit;

/// Follow-ups further out than this are not shown.
pub const FOLLOW_UP_HORIZON_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FollowUpReminder {
    pub visit_id: Uuid,
    pub patient_id: Uuid,
    pub patient_name: String,
    pub follow_up_date: NaiveDate,
    pub reason: Option<String>,
    /// Days overdue for `overdue`, days remaining for `upcoming`, 0 for today.
    pub days: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FollowUpBoard {
    pub overdue: Vec<FollowUpReminder>,
    pub due_today: Vec<FollowUpReminder>,
    pub upcoming: Vec<FollowUpReminder>,
}

impl FollowUpBoard {
    pub fn total(&self) -> usize {
        self.overdue.len() + self.due_today.len() + self.upcoming.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Group open follow-ups relative to `today`, each group by date ascending.
pub fn follow_up_board(visits: &[Visit], today: NaiveDate) -> FollowUpBoard {
    let mut pending: Vec<(&Visit, NaiveDate)> = visits
        .iter()
        .filter(|v| v.is_pending_follow_up())
        .filter_map(|v| v.follow_up_date.map(|d| (v, d)))
        .collect();
    pending.sort_by_key(|(_, date)| *date);

    let mut board = FollowUpBoard::default();
    for (visit, date) in pending {
        let diff = (date - today).num_days();
        let reminder = |days| FollowUpReminder {
            visit_id: visit.id,
            patient_id: visit.patient_id,
            patient_name: visit.patient_name.clone(),
            follow_up_date: date,
            reason: visit.follow_up_reason.clone(),
            days,
        };
        if diff < 0 {
            board.overdue.push(reminder(-diff));
        } else if diff == 0 {
            board.due_today.push(reminder(0));
        } else if diff <= FOLLOW_UP_HORIZON_DAYS {
            board.upcoming.push(reminder(diff));
        }
    }
    board
}
