use serde::Serialize;

use crate::model::habit::Habit;

/// Summary figures over the whole collection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HabitStats {
    pub habits: usize,
    pub completed: usize,
    /// Rounded percentage of habits completed, 0 for an empty collection
    pub completion_rate: u32,
    pub longest_streak: u32,
    /// Mean streak across habits
    pub average_streak: f64,
}

/// One bar pair of the per-habit chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HabitChartRow {
    pub name: String,
    /// 100 when completed, else 0
    pub completion: u32,
    pub streak: u32,
}

pub fn compute_stats(habits: &[Habit]) -> HabitStats {
    if habits.is_empty() {
        return HabitStats {
            habits: 0,
            completed: 0,
            completion_rate: 0,
            longest_streak: 0,
            average_streak: 0.0,
        };
    }
    let completed = habits.iter().filter(|h| h.completed).count();
    let total_streak: u64 = habits.iter().map(|h| h.streak as u64).sum();
    HabitStats {
        habits: habits.len(),
        completed,
        completion_rate: ((completed as f64 / habits.len() as f64) * 100.0).round() as u32,
        longest_streak: habits.iter().map(|h| h.streak).max().unwrap_or(0),
        average_streak: total_streak as f64 / habits.len() as f64,
    }
}

pub fn chart_rows(habits: &[Habit]) -> Vec<HabitChartRow> {
    habits
        .iter()
        .map(|h| HabitChartRow {
            name: h.name.clone(),
            completion: if h.completed { 100 } else { 0 },
            streak: h.streak,
        })
        .collect()
}
