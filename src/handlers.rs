use crate::errors::AppError;
use crate::models::{PlanDocument, PlanKind, SaveResponse, is_valid_entry_key};
use crate::state::AppState;
use crate::storage::persist_book;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use std::collections::HashSet;
use tracing::info;

pub async fn health() -> &'static str {
    "ok"
}

pub async fn get_plan(
    State(state): State<AppState>,
    Path((kind, date)): Path<(PlanKind, NaiveDate)>,
) -> Result<Json<PlanDocument>, AppError> {
    let book = state.book.lock().await;
    book.get(kind, date)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("no plan for {date}")))
}

pub async fn put_plan(
    State(state): State<AppState>,
    Path((kind, date)): Path<(PlanKind, NaiveDate)>,
    Json(mut plan): Json<PlanDocument>,
) -> Result<Json<SaveResponse>, AppError> {
    if let Err(reason) = validate_plan(date, &plan) {
        return Ok(Json(SaveResponse::failed(reason)));
    }

    plan.kind = kind;
    plan.recompute_totals();

    let mut book = state.book.lock().await;
    let entries = plan.entries.len();
    book.insert(kind, plan);
    persist_book(&state.data_path, &book).await?;

    info!(%date, ?kind, entries, "plan stored");
    Ok(Json(SaveResponse::ok()))
}

pub async fn complete_entry(
    State(state): State<AppState>,
    Path((kind, date, key)): Path<(PlanKind, NaiveDate, String)>,
) -> Result<StatusCode, AppError> {
    set_completion(&state, kind, date, &key, true).await
}

pub async fn uncomplete_entry(
    State(state): State<AppState>,
    Path((kind, date, key)): Path<(PlanKind, NaiveDate, String)>,
) -> Result<StatusCode, AppError> {
    set_completion(&state, kind, date, &key, false).await
}

async fn set_completion(
    state: &AppState,
    kind: PlanKind,
    date: NaiveDate,
    key: &str,
    completed: bool,
) -> Result<StatusCode, AppError> {
    if !is_valid_entry_key(key) {
        return Err(AppError::bad_request(format!("invalid entry key {key:?}")));
    }

    let mut book = state.book.lock().await;
    let plan = book
        .get_mut(kind, date)
        .ok_or_else(|| AppError::not_found(format!("no plan for {date}")))?;
    let entry = plan
        .entries
        .iter_mut()
        .find(|entry| entry.key == key)
        .ok_or_else(|| AppError::not_found(format!("no entry {key} on {date}")))?;
    entry.completed = completed;

    persist_book(&state.data_path, &book).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn validate_plan(date: NaiveDate, plan: &PlanDocument) -> Result<(), String> {
    if plan.date != date {
        return Err(format!("plan date {} does not match {date}", plan.date));
    }
    let mut seen = HashSet::new();
    for entry in &plan.entries {
        if !is_valid_entry_key(&entry.key) {
            return Err(format!("invalid entry key {:?}", entry.key));
        }
        if !seen.insert(entry.key.as_str()) {
            return Err(format!("duplicate entry key {}", entry.key));
        }
    }
    Ok(())
}
