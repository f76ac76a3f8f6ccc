use std::io::{self, BufRead, Write};

use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use crate::model::config::HabitsConfig;
use crate::model::habit::Habit;
use crate::ops::book::{NoticeKind, Presenter};
use crate::ops::calendar::CalendarMonth;
use crate::ops::categories::{capitalize, category_icon};
use crate::ops::reminder::ReminderSchedule;
use crate::ops::stats::{HabitChartRow, HabitStats};
use crate::ops::view::{CategoryFilter, StatusFilter};

// ---------------------------------------------------------------------------
// Presenter
// ---------------------------------------------------------------------------

/// Presenter for the terminal: confirmations on stdin, notices on
/// stdout/stderr.
pub struct TerminalPresenter {
    /// Answer yes to every confirmation without asking
    pub assume_yes: bool,
    /// Suppress success notices (JSON mode keeps stdout machine-readable)
    pub quiet: bool,
}

impl Presenter for TerminalPresenter {
    fn confirm(&self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        eprint!("{} [y/N] ", message);
        let _ = io::stderr().flush();
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }

    fn notify(&self, message: &str, kind: NoticeKind) {
        match kind {
            NoticeKind::Success if !self.quiet => println!("{}", message),
            NoticeKind::Success => {}
            NoticeKind::Error => eprintln!("error: {}", message),
        }
    }
}

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct HabitListJson<'a> {
    pub status: StatusFilter,
    pub category: String,
    pub habits: Vec<&'a Habit>,
}

#[derive(Serialize)]
pub struct StatsJson {
    #[serde(flatten)]
    pub stats: HabitStats,
    pub chart: Vec<HabitChartRow>,
}

#[derive(Serialize)]
pub struct CategoryJson {
    pub name: String,
    pub habits: usize,
}

#[derive(Serialize)]
pub struct ReminderJson {
    pub time: String,
    pub days: Vec<&'static str>,
    pub next: Option<DateTime<Local>>,
}

pub fn list_to_json<'a>(
    habits: Vec<&'a Habit>,
    status: StatusFilter,
    category: &CategoryFilter,
) -> HabitListJson<'a> {
    HabitListJson {
        status,
        category: category.to_string(),
        habits,
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

fn check_char(habit: &Habit) -> char {
    if habit.completed { 'x' } else { ' ' }
}

fn days(n: u32) -> &'static str {
    if n == 1 { "day" } else { "days" }
}

fn local_date(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d").to_string()
}

/// Format a habit as a one-line summary
pub fn format_habit_line(habit: &Habit) -> String {
    format!(
        "[{}] {:>3}  {}  ({})  {} {}",
        check_char(habit),
        habit.id,
        habit.name,
        habit.category,
        habit.streak,
        days(habit.streak)
    )
}

/// Format the visible list. `total` is the unfiltered collection size, used
/// to tell "nothing yet" from "nothing matches".
pub fn format_habit_list(habits: &[&Habit], total: usize) -> Vec<String> {
    if total == 0 {
        return vec!["No habits yet. Add your first habit to get started!".to_string()];
    }
    if habits.is_empty() {
        return vec!["No habits match the current filters.".to_string()];
    }
    habits.iter().map(|h| format_habit_line(h)).collect()
}

/// Format detailed habit view
pub fn format_habit_detail(habit: &Habit) -> Vec<String> {
    let mut lines = vec![format!("[{}] {} {}", check_char(habit), habit.id, habit.name)];
    lines.push(format!(
        "category: {} ({})",
        capitalize(&habit.category),
        category_icon(&habit.category)
    ));
    if let Some(ref goal) = habit.goal {
        lines.push(format!("goal: {}", goal));
    }
    lines.push(format!("streak: {} {}", habit.streak, days(habit.streak)));
    if let Some(last) = habit.last_completed {
        lines.push(format!("last completed: {}", local_date(last)));
    }
    lines.push(format!("created: {}", local_date(habit.created_at)));
    lines.push(format!("order: {}", habit.order));
    if let Some(ref notes) = habit.notes {
        lines.push("notes:".to_string());
        for line in notes.lines() {
            lines.push(format!("  {}", line));
        }
    }
    lines
}

pub fn format_stats(stats: &HabitStats, chart: &[HabitChartRow]) -> Vec<String> {
    let mut lines = vec![
        format!("habits:          {}", stats.habits),
        format!("completion rate: {}%", stats.completion_rate),
        format!("longest streak:  {} {}", stats.longest_streak, days(stats.longest_streak)),
        format!("average streak:  {:.1} days", stats.average_streak),
    ];
    if !chart.is_empty() {
        lines.push(String::new());
        let width = chart.iter().map(|r| r.name.chars().count()).max().unwrap_or(0);
        for row in chart {
            lines.push(format!(
                "  {:<width$}  {:>3}%  {}",
                row.name,
                row.completion,
                "#".repeat(row.streak.min(60) as usize),
                width = width
            ));
        }
    }
    lines
}

/// Render a month grid, Sunday first, with `*` marking days on which a habit
/// was started, followed by a legend.
pub fn format_calendar(cal: &CalendarMonth, habits: &[Habit]) -> Vec<String> {
    let mut lines = vec![cal.month.label(), "Sun Mon Tue Wed Thu Fri Sat".to_string()];
    let mut row = "    ".repeat(cal.leading_blanks as usize);
    let mut column = cal.leading_blanks;
    for day in &cal.days {
        let marker = if day.habits.is_empty() { ' ' } else { '*' };
        row.push_str(&format!("{:>3}{}", day.date.format("%-d"), marker));
        column += 1;
        if column == 7 {
            lines.push(row.trim_end().to_string());
            row = String::new();
            column = 0;
        }
    }
    if !row.is_empty() {
        lines.push(row.trim_end().to_string());
    }

    let started: Vec<_> = cal.days.iter().filter(|d| !d.habits.is_empty()).collect();
    if !started.is_empty() {
        lines.push(String::new());
        for day in started {
            let names: Vec<&str> = day
                .habits
                .iter()
                .filter_map(|id| habits.iter().find(|h| h.id == *id))
                .map(|h| h.name.as_str())
                .collect();
            lines.push(format!("{}: {}", day.date.format("%Y-%m-%d"), names.join(", ")));
        }
    }
    lines
}

pub fn format_config(config: &HabitsConfig) -> Vec<String> {
    vec![
        format!("store.backend = {:?}", config.store.backend).to_lowercase(),
        format!("store.file = {}", config.store.file),
        format!("store.reorder_retries = {}", config.store.reorder_retries),
        format!("reminders.time = {}", config.reminders.time),
        format!(
            "reminders.days = {}",
            config
                .reminders
                .days
                .iter()
                .map(|d| d.to_string())
                .collect::<Vec<_>>()
                .join(",")
        ),
        format!("ui.theme = {}", config.ui.theme.as_str()),
        format!("categories = {}", config.categories.names.join(", ")),
    ]
}

pub fn format_reminder(schedule: &ReminderSchedule, next: Option<DateTime<Local>>) -> String {
    match next {
        Some(at) => format!(
            "next reminder: {} (at {} on {})",
            at.format("%a %Y-%m-%d %H:%M"),
            schedule.time.format("%H:%M"),
            schedule.day_names().join(" ")
        ),
        None => "reminders are off (no days selected)".to_string(),
    }
}
