use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identifies an entry within a day: a time slot for meals, an exercise id for workouts.
pub type EntryKey = String;

/// Keys travel as URL path segments, where `.` and `..` would be collapsed
/// away, so those are refused along with blank keys.
pub fn is_valid_entry_key(key: &str) -> bool {
    let key = key.trim();
    !key.is_empty() && key != "." && key != ".."
}

/// Optimistic local view of completion, keyed by entry.
pub type CompletionOverrides = BTreeMap<EntryKey, bool>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlanKind {
    #[default]
    Diet,
    Workout,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EntryDetail {
    Meal {
        calories: u32,
        #[serde(default)]
        protein: f64,
        #[serde(default)]
        carbs: f64,
        #[serde(default)]
        fat: f64,
    },
    Exercise {
        #[serde(default)]
        sets: u32,
        #[serde(default)]
        reps: u32,
        #[serde(default)]
        duration_minutes: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub key: EntryKey,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<EntryDetail>,
    #[serde(default)]
    pub completed: bool,
}

impl Entry {
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            notes: None,
            detail: None,
            completed: false,
        }
    }

    pub fn with_detail(mut self, detail: EntryDetail) -> Self {
        self.detail = Some(detail);
        self
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Totals {
    pub calories: u32,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub exercise_minutes: u32,
}

/// One day's set of meals or exercises, replaced wholesale on every fetch or save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDocument {
    pub date: NaiveDate,
    #[serde(default)]
    pub kind: PlanKind,
    #[serde(default)]
    pub entries: Vec<Entry>,
    #[serde(default)]
    pub totals: Totals,
}

impl PlanDocument {
    pub fn empty(date: NaiveDate, kind: PlanKind) -> Self {
        Self {
            date,
            kind,
            entries: Vec::new(),
            totals: Totals::default(),
        }
    }

    pub fn entry(&self, key: &str) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entry(key).is_some()
    }

    pub fn recompute_totals(&mut self) {
        self.totals = crate::totals::sum_entries(self.entries.iter());
    }

    /// Seeds the override map from the completion flags the store reported.
    pub fn completion_map(&self) -> CompletionOverrides {
        self.entries
            .iter()
            .map(|entry| (entry.key.clone(), entry.completed))
            .collect()
    }

    /// Copy of this plan with each entry's flag taken from `overrides` where present.
    pub fn with_overrides(&self, overrides: &CompletionOverrides) -> Self {
        let mut plan = self.clone();
        for entry in &mut plan.entries {
            if let Some(done) = overrides.get(&entry.key) {
                entry.completed = *done;
            }
        }
        plan
    }

    pub fn with_entries(mut self, entries: Vec<Entry>) -> Self {
        self.entries = entries;
        self.recompute_totals();
        self
    }
}

/// Body returned by the store when a whole plan is saved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SaveResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
        }
    }
}
