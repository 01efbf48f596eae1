//! Runs the effects requested by [`reduce`] against a [`PlanStore`].
//!
//! State lives in a `watch` channel: every transition happens inside a single
//! `send_modify` call, so each event is applied to completion before the next
//! and subscribers always see a consistent snapshot. Remote calls run on
//! spawned tasks and feed their outcome back in as another [`Action`].

use crate::editor::DraftEdit;
use crate::errors::{SaveError, StoreError};
use crate::models::{EntryKey, PlanDocument, PlanKind};
use crate::plan_state::{Action, DayState, Effect, SaveTicket, reduce};
use crate::preferences::Preferences;
use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub struct DayPlanController<S> {
    store: Arc<S>,
    state: Arc<watch::Sender<DayState>>,
}

impl<S> Clone for DayPlanController<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            state: Arc::clone(&self.state),
        }
    }
}

impl<S: crate::store::PlanStore> DayPlanController<S> {
    pub fn new(store: S, kind: PlanKind) -> Self {
        Self::with_shared_store(Arc::new(store), kind)
    }

    pub fn with_shared_store(store: Arc<S>, kind: PlanKind) -> Self {
        let (state, _) = watch::channel(DayState::new(kind));
        Self {
            store,
            state: Arc::new(state),
        }
    }

    pub fn snapshot(&self) -> DayState {
        self.state.borrow().clone()
    }

    /// Receives a fresh snapshot after every transition.
    pub fn subscribe(&self) -> watch::Receiver<DayState> {
        self.state.subscribe()
    }

    /// Opens on the last viewed date, or `today` on first use.
    pub fn mount(&self, preferences: &Preferences, today: NaiveDate) -> Option<JoinHandle<()>> {
        self.select_date(preferences.initial_date(today))
    }

    /// Returns the fetch task, or `None` when `date` is already selected.
    pub fn select_date(&self, date: NaiveDate) -> Option<JoinHandle<()>> {
        let effect = self.dispatch(Action::SelectDate(date));
        self.spawn(effect)
    }

    pub fn retry(&self) -> Option<JoinHandle<()>> {
        let effect = self.dispatch(Action::Retry);
        self.spawn(effect)
    }

    /// Flips the entry locally before the store has answered; a failed
    /// persistence call restores the earlier value.
    pub fn toggle_entry(&self, key: impl Into<EntryKey>) -> Option<JoinHandle<()>> {
        let effect = self.dispatch(Action::ToggleEntry(key.into()));
        self.spawn(effect)
    }

    pub fn enter_edit_mode(&self) -> bool {
        self.dispatch(Action::EnterEdit);
        self.state.borrow().editing
    }

    pub fn cancel_edit(&self) {
        self.dispatch(Action::CancelEdit);
    }

    pub fn edit_draft(&self, edit: DraftEdit) {
        self.dispatch(Action::EditDraft(edit));
    }

    pub async fn save_draft(&self) -> Result<PlanDocument, SaveError> {
        let draft = self.state.borrow().draft.clone();
        match draft {
            Some(draft) => self.save_edited(draft).await,
            None => Err(SaveError::NotEditing),
        }
    }

    /// Persists `document`. On failure the controller stays in edit mode with
    /// `save_error` set, so the same save can simply be attempted again.
    pub async fn save_edited(&self, document: PlanDocument) -> Result<PlanDocument, SaveError> {
        let Some(Effect::Save { ticket, document }) =
            self.dispatch(Action::SaveRequested(document))
        else {
            let state = self.state.borrow();
            return Err(if state.saving {
                SaveError::InProgress
            } else {
                SaveError::NotEditing
            });
        };

        let result = self.save(ticket, document).await;
        self.resolve_save(ticket, result)
    }

    /// Applies a save outcome, reporting it as superseded when the edit
    /// session it belonged to is gone.
    fn resolve_save(
        &self,
        ticket: SaveTicket,
        result: Result<PlanDocument, StoreError>,
    ) -> Result<PlanDocument, SaveError> {
        let mut accepted = false;
        let outcome = result.clone();
        self.state.send_modify(|state| {
            accepted = state.accepts_save(ticket);
            let (next, _) = reduce(std::mem::take(state), Action::SaveResolved { ticket, result });
            *state = next;
        });

        if !accepted {
            debug!(date = %ticket.date, request = ticket.request, "dropping stale save response");
            return Err(SaveError::Superseded);
        }
        outcome.map_err(SaveError::from)
    }

    fn dispatch(&self, action: Action) -> Option<Effect> {
        let mut effect = None;
        self.state.send_modify(|state| {
            let (next, requested) = reduce(std::mem::take(state), action);
            *state = next;
            effect = requested;
        });
        effect
    }

    fn spawn(&self, effect: Option<Effect>) -> Option<JoinHandle<()>> {
        let effect = effect?;
        let controller = self.clone();
        Some(tokio::spawn(async move {
            let action = controller.execute(effect).await;
            controller.dispatch(action);
        }))
    }

    async fn execute(&self, effect: Effect) -> Action {
        match effect {
            Effect::Fetch(ticket) => {
                debug!(date = %ticket.date, request = ticket.request, "fetching plan");
                let result = self.store.fetch_plan(ticket.date).await;
                if self.state.borrow().latest_request() != ticket.request {
                    debug!(date = %ticket.date, request = ticket.request, "dropping stale plan response");
                } else if let Err(err) = &result {
                    warn!(date = %ticket.date, "failed to load plan: {err}");
                }
                Action::FetchResolved { ticket, result }
            }
            Effect::SetCompletion {
                date,
                key,
                completed,
                previous,
            } => {
                let result = if completed {
                    self.store.mark_complete(date, &key).await
                } else {
                    self.store.mark_incomplete(date, &key).await
                };
                if let Err(err) = &result {
                    warn!(%date, key = %key, "reverting completion toggle: {err}");
                }
                Action::ToggleResolved {
                    date,
                    key,
                    previous,
                    result,
                }
            }
            Effect::Save { ticket, document } => Action::SaveResolved {
                ticket,
                result: self.save(ticket, document).await,
            },
        }
    }

    async fn save(
        &self,
        ticket: SaveTicket,
        document: PlanDocument,
    ) -> Result<PlanDocument, StoreError> {
        let date = ticket.date;
        let result = match self.store.save_plan(&document).await {
            Ok(resp) if resp.success => {
                info!(%date, entries = document.entries.len(), "plan saved");
                Ok(document)
            }
            Ok(resp) => Err(StoreError::Rejected(
                resp.error.unwrap_or_else(|| "save failed".to_string()),
            )),
            Err(err) => Err(err),
        };
        if let Err(err) = &result {
            warn!(%date, "failed to save plan: {err}");
        }
        result
    }
}
