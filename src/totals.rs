use crate::models::{CompletionOverrides, Entry, EntryDetail, PlanDocument, Totals};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayProgress {
    pub planned: Totals,
    pub completed: Totals,
    pub entries_done: usize,
    pub entries_total: usize,
}

impl DayProgress {
    pub fn ratio(&self) -> f64 {
        if self.entries_total == 0 {
            return 0.0;
        }
        self.entries_done as f64 / self.entries_total as f64
    }
}

pub fn sum_entries<'a>(entries: impl IntoIterator<Item = &'a Entry>) -> Totals {
    let mut totals = Totals::default();
    for entry in entries {
        match &entry.detail {
            Some(EntryDetail::Meal {
                calories,
                protein,
                carbs,
                fat,
            }) => {
                totals.calories = totals.calories.saturating_add(*calories);
                totals.protein += protein;
                totals.carbs += carbs;
                totals.fat += fat;
            }
            Some(EntryDetail::Exercise {
                duration_minutes, ..
            }) => {
                totals.exercise_minutes = totals.exercise_minutes.saturating_add(*duration_minutes);
            }
            None => {}
        }
    }
    totals
}

/// Planned totals against what has been ticked off, using the override map as
/// the source of truth for completion.
pub fn build_progress(plan: &PlanDocument, overrides: &CompletionOverrides) -> DayProgress {
    let done = |entry: &&Entry| {
        overrides
            .get(&entry.key)
            .copied()
            .unwrap_or(entry.completed)
    };

    DayProgress {
        planned: sum_entries(&plan.entries),
        completed: sum_entries(plan.entries.iter().filter(done)),
        entries_done: plan.entries.iter().filter(done).count(),
        entries_total: plan.entries.len(),
    }
}
