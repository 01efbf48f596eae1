use crate::plan_state::{DayState, RequestStatus};

/// What the view layer should render for the current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    Loading,
    Error(String),
    Empty,
    Editing,
    Viewing,
}

pub fn view_state(state: &DayState) -> ViewState {
    match &state.status {
        RequestStatus::Loading => ViewState::Loading,
        RequestStatus::Error(message) => ViewState::Error(message.clone()),
        RequestStatus::Idle if state.editing => ViewState::Editing,
        RequestStatus::Idle => match &state.plan {
            Some(plan) if !plan.entries.is_empty() => ViewState::Viewing,
            _ => ViewState::Empty,
        },
    }
}

/// Toggle controls must be disabled unless a plan is being viewed.
pub fn toggles_enabled(state: &DayState) -> bool {
    view_state(state) == ViewState::Viewing
}
