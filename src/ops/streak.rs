use chrono::{DateTime, TimeZone, Utc};

use crate::model::habit::Habit;

/// Which streak rule a completion toggle went through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakChange {
    /// First ever completion
    Started,
    /// Completed the day after the previous completion
    Extended,
    /// Completed again on a day that already counted
    Unchanged,
    /// A gap of two or more days broke the chain
    Reset,
    /// Un-completed; history is kept as-is
    Paused,
}

/// Compute the next state of `habit` for a completion toggle at `now`.
///
/// Calendar days are taken in the time zone of `now`. Completing bumps the
/// streak when the previous completion was yesterday (or never), keeps it when
/// the previous completion was today, and restarts it at 1 after a gap.
/// Un-completing only flips the flag.
pub fn toggle_completion<Tz: TimeZone>(habit: &Habit, now: &DateTime<Tz>) -> (Habit, StreakChange) {
    let mut next = habit.clone();
    if habit.completed {
        next.completed = false;
        return (next, StreakChange::Paused);
    }

    let today = now.date_naive();
    let change = match habit.last_completed {
        None => StreakChange::Started,
        Some(last) => {
            let last_day = last.with_timezone(&now.timezone()).date_naive();
            if today.pred_opt() == Some(last_day) {
                StreakChange::Extended
            } else if last_day >= today {
                // Same day, or a clock that went backwards: never count twice
                StreakChange::Unchanged
            } else {
                StreakChange::Reset
            }
        }
    };

    next.streak = match change {
        StreakChange::Started | StreakChange::Extended => habit.streak.saturating_add(1),
        StreakChange::Reset => 1,
        StreakChange::Unchanged | StreakChange::Paused => habit.streak,
    };
    next.completed = true;

    let now_utc = now.with_timezone(&Utc);
    next.last_completed = Some(match habit.last_completed {
        Some(last) if last > now_utc => last,
        _ => now_utc,
    });

    (next, change)
}
