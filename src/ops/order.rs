use std::collections::{HashMap, HashSet};

use crate::model::habit::Habit;

/// New manual position for one habit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderAssignment {
    pub id: String,
    /// Order before the reorder
    pub previous: u32,
    pub order: u32,
}

impl OrderAssignment {
    pub fn changed(&self) -> bool {
        self.previous != self.order
    }
}

/// Compute the order assignment for a user-observed id sequence.
///
/// Ids in `sequence` get `order = index` in first-occurrence order; repeated
/// ids and ids not in the collection are skipped. Habits missing from the
/// sequence follow, keeping their current relative order, and take the next
/// indices. The result covers every habit exactly once, in the new order.
pub fn plan_order(habits: &[Habit], sequence: &[String]) -> Vec<OrderAssignment> {
    let by_id: HashMap<&str, &Habit> = habits.iter().map(|h| (h.id.as_str(), h)).collect();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut ordered: Vec<&Habit> = Vec::with_capacity(habits.len());

    for id in sequence {
        if let Some(habit) = by_id.get(id.as_str())
            && seen.insert(id.as_str())
        {
            ordered.push(*habit);
        }
    }

    // Leftovers keep their current display order
    let mut rest: Vec<&Habit> = habits.iter().filter(|h| !seen.contains(h.id.as_str())).collect();
    rest.sort_by_key(|h| h.order);
    ordered.extend(rest);

    ordered
        .into_iter()
        .enumerate()
        .map(|(index, habit)| OrderAssignment {
            id: habit.id.clone(),
            previous: habit.order,
            order: index as u32,
        })
        .collect()
}

/// Rearrange `habits` to match `plan`, writing the planned order values.
pub fn apply_order(habits: &mut [Habit], plan: &[OrderAssignment]) {
    let position: HashMap<&str, u32> = plan.iter().map(|a| (a.id.as_str(), a.order)).collect();
    for habit in habits.iter_mut() {
        if let Some(&order) = position.get(habit.id.as_str()) {
            habit.order = order;
        }
    }
    sort_by_order(habits);
}

/// Stable sort by the order field; ties keep their current relative position.
pub fn sort_by_order(habits: &mut [Habit]) {
    habits.sort_by_key(|h| h.order);
}

/// Sequence with `id` moved to `index` (clamped to the end), other ids keeping
/// their relative order. The input is the current display sequence.
pub fn move_to(current: &[String], id: &str, index: usize) -> Vec<String> {
    let mut next: Vec<String> = current.iter().filter(|c| c.as_str() != id).cloned().collect();
    let index = index.min(next.len());
    next.insert(index, id.to_string());
    next
}
