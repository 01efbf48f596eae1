//! Pure state transitions for a single day's plan.
//!
//! Every user or network event becomes an [`Action`]; [`reduce`] folds it into
//! the current [`DayState`] and names at most one [`Effect`] for the executor
//! to run. Nothing in here touches the network, so rollback and stale-response
//! handling can be tested directly.

use crate::editor::{DraftEdit, apply_edit};
use crate::errors::StoreError;
use crate::models::{CompletionOverrides, EntryKey, PlanDocument, PlanKind};
use crate::totals::{DayProgress, build_progress};
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestStatus {
    #[default]
    Idle,
    Loading,
    Error(String),
}

/// Tags a fetch with the date and sequence number it was issued under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub date: NaiveDate,
    pub request: u64,
}

/// Tags a save with the date and save number it was issued under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveTicket {
    pub date: NaiveDate,
    pub request: u64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DayState {
    pub selected_date: Option<NaiveDate>,
    pub kind: PlanKind,
    pub plan: Option<PlanDocument>,
    pub overrides: CompletionOverrides,
    pub status: RequestStatus,
    pub editing: bool,
    pub draft: Option<PlanDocument>,
    pub saving: bool,
    pub save_error: Option<String>,
    latest_request: u64,
    latest_save: u64,
}

impl DayState {
    pub fn new(kind: PlanKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn latest_request(&self) -> u64 {
        self.latest_request
    }

    /// Completion flag used for rendering `key`.
    pub fn is_completed(&self, key: &str) -> Option<bool> {
        if let Some(done) = self.overrides.get(key) {
            return Some(*done);
        }
        self.plan
            .as_ref()
            .and_then(|plan| plan.entry(key))
            .map(|entry| entry.completed)
    }

    pub fn progress(&self) -> Option<DayProgress> {
        self.plan
            .as_ref()
            .map(|plan| build_progress(plan, &self.overrides))
    }

    /// Only the most recent save of a still-open edit session may land.
    pub fn accepts_save(&self, ticket: SaveTicket) -> bool {
        self.selected_date == Some(ticket.date)
            && self.latest_save == ticket.request
            && self.editing
            && self.saving
    }

    fn is_current(&self, ticket: FetchTicket) -> bool {
        self.selected_date == Some(ticket.date) && self.latest_request == ticket.request
    }

    fn issue_fetch(&mut self, date: NaiveDate) -> Effect {
        self.latest_request += 1;
        self.status = RequestStatus::Loading;
        Effect::Fetch(FetchTicket {
            date,
            request: self.latest_request,
        })
    }

    fn clear_plan(&mut self) {
        self.plan = None;
        self.overrides.clear();
    }

    fn leave_edit(&mut self) {
        self.editing = false;
        self.saving = false;
        self.draft = None;
        self.save_error = None;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SelectDate(NaiveDate),
    Retry,
    FetchResolved {
        ticket: FetchTicket,
        result: Result<Option<PlanDocument>, StoreError>,
    },
    ToggleEntry(EntryKey),
    ToggleResolved {
        date: NaiveDate,
        key: EntryKey,
        previous: bool,
        result: Result<(), StoreError>,
    },
    EnterEdit,
    CancelEdit,
    EditDraft(DraftEdit),
    SaveRequested(PlanDocument),
    SaveResolved {
        ticket: SaveTicket,
        result: Result<PlanDocument, StoreError>,
    },
}

/// Remote work requested by a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Fetch(FetchTicket),
    SetCompletion {
        date: NaiveDate,
        key: EntryKey,
        completed: bool,
        previous: bool,
    },
    Save {
        ticket: SaveTicket,
        document: PlanDocument,
    },
}

pub fn reduce(mut state: DayState, action: Action) -> (DayState, Option<Effect>) {
    let effect = match action {
        Action::SelectDate(date) => {
            if state.selected_date == Some(date) {
                None
            } else {
                state.selected_date = Some(date);
                state.clear_plan();
                state.leave_edit();
                Some(state.issue_fetch(date))
            }
        }
        Action::Retry => match state.selected_date {
            Some(date) if matches!(state.status, RequestStatus::Error(_)) => {
                Some(state.issue_fetch(date))
            }
            _ => None,
        },
        Action::FetchResolved { ticket, result } => {
            if state.is_current(ticket) {
                match result {
                    Ok(Some(plan)) => {
                        state.overrides = plan.completion_map();
                        state.plan = Some(plan);
                        state.status = RequestStatus::Idle;
                    }
                    Ok(None) => {
                        state.clear_plan();
                        state.status = RequestStatus::Idle;
                    }
                    Err(err) => {
                        state.clear_plan();
                        state.status = RequestStatus::Error(err.user_message());
                    }
                }
            }
            None
        }
        Action::ToggleEntry(key) => toggle(&mut state, key),
        Action::ToggleResolved {
            date,
            key,
            previous,
            result,
        } => {
            let same_day = state.selected_date == Some(date);
            let known = state.plan.as_ref().is_some_and(|plan| plan.contains(&key));
            if result.is_err() && same_day && known {
                state.overrides.insert(key, previous);
            }
            None
        }
        Action::EnterEdit => {
            let ready = state.status == RequestStatus::Idle && !state.editing;
            if let (Some(date), true) = (state.selected_date, ready) {
                let draft = match &state.plan {
                    Some(plan) => plan.with_overrides(&state.overrides),
                    None => PlanDocument::empty(date, state.kind),
                };
                state.draft = Some(draft);
                state.editing = true;
                state.save_error = None;
            }
            None
        }
        Action::CancelEdit => {
            state.leave_edit();
            None
        }
        Action::EditDraft(edit) => {
            if let Some(draft) = state.draft.as_mut() {
                apply_edit(draft, edit);
            }
            None
        }
        Action::SaveRequested(mut document) => match state.selected_date {
            Some(date) if state.editing && !state.saving => {
                document.recompute_totals();
                state.latest_save += 1;
                state.saving = true;
                state.save_error = None;
                let ticket = SaveTicket {
                    date,
                    request: state.latest_save,
                };
                Some(Effect::Save { ticket, document })
            }
            _ => None,
        },
        Action::SaveResolved { ticket, result } => {
            if state.accepts_save(ticket) {
                state.saving = false;
                match result {
                    Ok(saved) => {
                        state.overrides = saved.completion_map();
                        state.plan = Some(saved);
                        state.leave_edit();
                    }
                    Err(err) => {
                        state.save_error = Some(err.to_string());
                    }
                }
            }
            None
        }
    };

    (state, effect)
}

fn toggle(state: &mut DayState, key: EntryKey) -> Option<Effect> {
    let date = state.selected_date?;
    let fetched = state.plan.as_ref()?.entry(&key)?.completed;
    let previous = state.overrides.get(&key).copied().unwrap_or(fetched);
    let completed = !previous;
    state.overrides.insert(key.clone(), completed);

    Some(Effect::SetCompletion {
        date,
        key,
        completed,
        previous,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Entry;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn plan_for(date: NaiveDate) -> PlanDocument {
        PlanDocument::empty(date, PlanKind::Diet).with_entries(vec![
            Entry::new("Breakfast", "Oats"),
            Entry::new("Lunch", "Salad").completed(true),
        ])
    }

    fn fetch_ticket(effect: Option<Effect>) -> FetchTicket {
        match effect {
            Some(Effect::Fetch(ticket)) => ticket,
            other => panic!("expected fetch effect, got {other:?}"),
        }
    }

    fn save_effect(effect: Option<Effect>) -> (SaveTicket, PlanDocument) {
        match effect {
            Some(Effect::Save { ticket, document }) => (ticket, document),
            other => panic!("expected save effect, got {other:?}"),
        }
    }

    fn fetched(state: DayState, effect: Option<Effect>, date: NaiveDate) -> DayState {
        let ticket = fetch_ticket(effect);
        reduce(
            state,
            Action::FetchResolved {
                ticket,
                result: Ok(Some(plan_for(date))),
            },
        )
        .0
    }

    fn loaded(date: NaiveDate) -> DayState {
        let (state, effect) = reduce(DayState::default(), Action::SelectDate(date));
        let ticket = fetch_ticket(effect);
        let (state, _) = reduce(
            state,
            Action::FetchResolved {
                ticket,
                result: Ok(Some(plan_for(date))),
            },
        );
        state
    }

    #[test]
    fn select_date_clears_plan_and_starts_loading() {
        let state = loaded(day(1));
        let (state, effect) = reduce(state, Action::SelectDate(day(2)));

        assert_eq!(fetch_ticket(effect).date, day(2));
        assert_eq!(state.status, RequestStatus::Loading);
        assert!(state.plan.is_none());
        assert!(state.overrides.is_empty());
    }

    #[test]
    fn selecting_current_date_issues_no_fetch() {
        let state = loaded(day(1));
        let before = state.clone();
        let (state, effect) = reduce(state, Action::SelectDate(day(1)));
        assert!(effect.is_none());
        assert_eq!(state, before);
    }

    #[test]
    fn stale_fetch_is_dropped() {
        let (state, first) = reduce(DayState::default(), Action::SelectDate(day(1)));
        let (state, second) = reduce(state, Action::SelectDate(day(2)));
        let (first, second) = (fetch_ticket(first), fetch_ticket(second));

        let (state, _) = reduce(
            state,
            Action::FetchResolved {
                ticket: second,
                result: Ok(Some(plan_for(day(2)))),
            },
        );
        let (state, _) = reduce(
            state,
            Action::FetchResolved {
                ticket: first,
                result: Ok(Some(plan_for(day(1)))),
            },
        );

        assert_eq!(state.plan.as_ref().map(|plan| plan.date), Some(day(2)));
        assert_eq!(state.status, RequestStatus::Idle);
    }

    #[test]
    fn superseded_fetch_for_same_date_is_dropped() {
        let (state, first) = reduce(DayState::default(), Action::SelectDate(day(1)));
        let (state, _) = reduce(state, Action::SelectDate(day(2)));
        let (state, third) = reduce(state, Action::SelectDate(day(1)));
        let (first, third) = (fetch_ticket(first), fetch_ticket(third));

        let (state, _) = reduce(
            state,
            Action::FetchResolved {
                ticket: first,
                result: Err(StoreError::Transport("timeout".into())),
            },
        );
        assert_eq!(state.status, RequestStatus::Loading);

        let (state, _) = reduce(
            state,
            Action::FetchResolved {
                ticket: third,
                result: Ok(Some(plan_for(day(1)))),
            },
        );
        assert_eq!(state.status, RequestStatus::Idle);
    }

    #[test]
    fn fetch_seeds_overrides_from_plan() {
        let state = loaded(day(1));
        let expected: CompletionOverrides =
            [("Breakfast".to_string(), false), ("Lunch".to_string(), true)]
                .into_iter()
                .collect();
        assert_eq!(state.overrides, expected);
    }

    #[test]
    fn not_found_leaves_empty_idle_state() {
        let (state, effect) = reduce(DayState::default(), Action::SelectDate(day(4)));
        let (state, _) = reduce(
            state,
            Action::FetchResolved {
                ticket: fetch_ticket(effect),
                result: Ok(None),
            },
        );
        assert_eq!(state.status, RequestStatus::Idle);
        assert!(state.plan.is_none());
    }

    #[test]
    fn fetch_failure_sets_error_and_retry_refetches() {
        let (state, effect) = reduce(DayState::default(), Action::SelectDate(day(1)));
        let (state, _) = reduce(
            state,
            Action::FetchResolved {
                ticket: fetch_ticket(effect),
                result: Err(StoreError::Http {
                    status: 500,
                    message: "boom".into(),
                }),
            },
        );
        assert!(matches!(state.status, RequestStatus::Error(_)));
        assert!(state.plan.is_none());

        let (state, effect) = reduce(state, Action::Retry);
        let ticket = fetch_ticket(effect);
        assert_eq!(ticket.date, day(1));
        assert_eq!(ticket.request, state.latest_request());
        assert_eq!(state.status, RequestStatus::Loading);
    }

    #[test]
    fn retry_without_error_does_nothing() {
        let state = loaded(day(1));
        let (_, effect) = reduce(state, Action::Retry);
        assert!(effect.is_none());
    }

    #[test]
    fn toggle_flips_immediately_and_requests_persistence() {
        let state = loaded(day(1));
        let (state, effect) = reduce(state, Action::ToggleEntry("Breakfast".into()));

        assert_eq!(state.is_completed("Breakfast"), Some(true));
        assert_eq!(
            effect,
            Some(Effect::SetCompletion {
                date: day(1),
                key: "Breakfast".into(),
                completed: true,
                previous: false,
            })
        );
    }

    #[test]
    fn toggle_failure_restores_previous_value() {
        let state = loaded(day(1));
        let (state, effect) = reduce(state, Action::ToggleEntry("Lunch".into()));
        assert_eq!(state.is_completed("Lunch"), Some(false));

        let Some(Effect::SetCompletion { previous, .. }) = effect else {
            panic!("expected completion effect");
        };
        let (state, _) = reduce(
            state,
            Action::ToggleResolved {
                date: day(1),
                key: "Lunch".into(),
                previous,
                result: Err(StoreError::Transport("offline".into())),
            },
        );
        assert_eq!(state.is_completed("Lunch"), Some(true));
        assert_eq!(state.status, RequestStatus::Idle);
    }

    #[test]
    fn toggle_failure_after_date_change_is_ignored() {
        let state = loaded(day(1));
        let (state, _) = reduce(state, Action::ToggleEntry("Lunch".into()));
        let (state, _) = reduce(state, Action::SelectDate(day(2)));
        let (state, _) = reduce(
            state,
            Action::ToggleResolved {
                date: day(1),
                key: "Lunch".into(),
                previous: true,
                result: Err(StoreError::Transport("offline".into())),
            },
        );
        assert!(state.overrides.is_empty());
    }

    #[test]
    fn toggling_unknown_key_is_noop() {
        let state = loaded(day(1));
        let before = state.clone();
        let (state, effect) = reduce(state, Action::ToggleEntry("Dinner".into()));
        assert!(effect.is_none());
        assert_eq!(state, before);
    }

    #[test]
    fn edit_mode_seeds_draft_and_cancel_discards_it() {
        let state = loaded(day(1));
        let (state, _) = reduce(state, Action::ToggleEntry("Breakfast".into()));
        let (state, _) = reduce(state, Action::EnterEdit);
        assert!(state.editing);
        let draft = state.draft.clone().expect("draft");
        assert!(draft.entry("Breakfast").unwrap().completed);

        let (state, _) = reduce(state, Action::EditDraft(DraftEdit::Remove("Lunch".into())));
        assert_eq!(state.draft.as_ref().unwrap().entries.len(), 1);

        let (state, _) = reduce(state, Action::CancelEdit);
        assert!(!state.editing);
        assert!(state.draft.is_none());
        assert_eq!(state.plan.as_ref().unwrap().entries.len(), 2);
    }

    #[test]
    fn save_success_replaces_plan_and_exits_edit() {
        let state = loaded(day(1));
        let (state, _) = reduce(state, Action::EnterEdit);
        let edited = plan_for(day(1)).with_entries(vec![Entry::new("Dinner", "Soup")]);

        let (state, effect) = reduce(state, Action::SaveRequested(edited.clone()));
        assert!(state.saving);
        let (ticket, document) = save_effect(effect);

        let (state, _) = reduce(
            state,
            Action::SaveResolved {
                ticket,
                result: Ok(document),
            },
        );
        assert_eq!(state.plan, Some(edited));
        assert!(!state.editing);
        assert!(!state.saving);
        assert_eq!(state.overrides.get("Dinner"), Some(&false));
    }

    #[test]
    fn save_failure_keeps_plan_and_edit_mode() {
        let state = loaded(day(1));
        let original = state.plan.clone();
        let (state, _) = reduce(state, Action::EnterEdit);
        let (state, effect) = reduce(state, Action::SaveRequested(plan_for(day(1))));
        let (ticket, _) = save_effect(effect);
        let (state, _) = reduce(
            state,
            Action::SaveResolved {
                ticket,
                result: Err(StoreError::Rejected("invalid entry".into())),
            },
        );

        assert!(state.editing);
        assert!(!state.saving);
        assert_eq!(state.plan, original);
        assert!(state.save_error.as_deref().unwrap().contains("invalid entry"));
    }

    #[test]
    fn save_outside_edit_mode_is_ignored() {
        let state = loaded(day(1));
        let (state, effect) = reduce(state, Action::SaveRequested(plan_for(day(1))));
        assert!(effect.is_none());
        assert!(!state.saving);
    }

    #[test]
    fn edit_from_empty_day_starts_blank_draft() {
        let (state, effect) = reduce(DayState::new(PlanKind::Workout), Action::SelectDate(day(9)));
        let (state, _) = reduce(
            state,
            Action::FetchResolved {
                ticket: fetch_ticket(effect),
                result: Ok(None),
            },
        );
        let (state, _) = reduce(state, Action::EnterEdit);

        assert!(state.editing);
        assert_eq!(
            state.draft,
            Some(PlanDocument::empty(day(9), PlanKind::Workout))
        );
    }

    #[test]
    fn edit_is_refused_while_loading() {
        let (state, _) = reduce(DayState::default(), Action::SelectDate(day(9)));
        let (state, _) = reduce(state, Action::EnterEdit);
        assert!(!state.editing);
        assert!(state.draft.is_none());
    }

    #[test]
    fn date_change_discards_draft_and_leaves_edit() {
        let state = loaded(day(1));
        let (state, _) = reduce(state, Action::EnterEdit);
        let (state, _) = reduce(state, Action::EditDraft(DraftEdit::Remove("Lunch".into())));
        let (state, _) = reduce(state, Action::SaveRequested(plan_for(day(1))));
        assert!(state.saving);

        let (state, _) = reduce(state, Action::SelectDate(day(2)));
        assert!(!state.editing);
        assert!(!state.saving);
        assert!(state.draft.is_none());
        assert!(state.save_error.is_none());
    }

    #[test]
    fn save_result_after_date_change_is_ignored() {
        let state = loaded(day(1));
        let (state, _) = reduce(state, Action::EnterEdit);
        let (state, effect) = reduce(state, Action::SaveRequested(plan_for(day(1))));
        let (ticket, document) = save_effect(effect);

        let (state, effect) = reduce(state, Action::SelectDate(day(2)));
        let state = fetched(state, effect, day(2));
        let before = state.clone();

        let (state, _) = reduce(
            state,
            Action::SaveResolved {
                ticket,
                result: Ok(document),
            },
        );
        assert_eq!(state, before);
    }

    #[test]
    fn save_from_earlier_visit_to_same_date_is_ignored() {
        let state = loaded(day(1));
        let (state, _) = reduce(state, Action::EnterEdit);
        let old = PlanDocument::empty(day(1), PlanKind::Diet)
            .with_entries(vec![Entry::new("Old", "Leftovers")]);
        let (state, effect) = reduce(state, Action::SaveRequested(old));
        let (old_ticket, old_document) = save_effect(effect);

        let (state, effect) = reduce(state, Action::SelectDate(day(2)));
        let state = fetched(state, effect, day(2));
        let (state, effect) = reduce(state, Action::SelectDate(day(1)));
        let state = fetched(state, effect, day(1));
        let (state, _) = reduce(state, Action::EnterEdit);
        let (state, _) = reduce(state, Action::EditDraft(DraftEdit::Remove("Lunch".into())));
        let draft = state.draft.clone().unwrap();
        let (state, effect) = reduce(state, Action::SaveRequested(draft.clone()));
        let (new_ticket, _) = save_effect(effect);

        let (state, _) = reduce(
            state,
            Action::SaveResolved {
                ticket: old_ticket,
                result: Ok(old_document),
            },
        );
        assert!(state.editing);
        assert!(state.saving);
        assert_eq!(state.draft, Some(draft.clone()));
        assert_eq!(state.plan, Some(plan_for(day(1))));

        let (state, _) = reduce(
            state,
            Action::SaveResolved {
                ticket: new_ticket,
                result: Ok(draft.clone()),
            },
        );
        assert!(!state.editing);
        assert_eq!(state.plan, Some(draft));
    }

    #[test]
    fn cancel_during_save_drops_its_result() {
        let state = loaded(day(1));
        let (state, _) = reduce(state, Action::EnterEdit);
        let (state, effect) = reduce(state, Action::SaveRequested(plan_for(day(1)).with_entries(Vec::new())));
        let (ticket, document) = save_effect(effect);
        let (state, _) = reduce(state, Action::CancelEdit);
        assert!(!state.saving);

        let (state, _) = reduce(state, Action::EnterEdit);
        let (state, _) = reduce(
            state,
            Action::SaveResolved {
                ticket,
                result: Ok(document),
            },
        );
        assert!(state.editing);
        assert_eq!(state.plan, Some(plan_for(day(1))));
    }
}
