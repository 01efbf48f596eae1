use crate::errors::AppError;
use crate::models::{PlanDocument, PlanKind};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tokio::fs;
use tracing::error;

/// Everything the development server stores, keyed by `YYYY-MM-DD`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PlanBook {
    #[serde(default)]
    pub diet: BTreeMap<String, PlanDocument>,
    #[serde(default)]
    pub workout: BTreeMap<String, PlanDocument>,
}

impl PlanBook {
    pub fn plans(&self, kind: PlanKind) -> &BTreeMap<String, PlanDocument> {
        match kind {
            PlanKind::Diet => &self.diet,
            PlanKind::Workout => &self.workout,
        }
    }

    pub fn plans_mut(&mut self, kind: PlanKind) -> &mut BTreeMap<String, PlanDocument> {
        match kind {
            PlanKind::Diet => &mut self.diet,
            PlanKind::Workout => &mut self.workout,
        }
    }

    pub fn get(&self, kind: PlanKind, date: NaiveDate) -> Option<&PlanDocument> {
        self.plans(kind).get(&date_key(date))
    }

    pub fn get_mut(&mut self, kind: PlanKind, date: NaiveDate) -> Option<&mut PlanDocument> {
        self.plans_mut(kind).get_mut(&date_key(date))
    }

    pub fn insert(&mut self, kind: PlanKind, plan: PlanDocument) {
        self.plans_mut(kind).insert(date_key(plan.date), plan);
    }
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub async fn load_book(path: &Path) -> PlanBook {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(book) => book,
            Err(err) => {
                error!("failed to parse plan file: {err}");
                PlanBook::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => PlanBook::default(),
        Err(err) => {
            error!("failed to read plan file: {err}");
            PlanBook::default()
        }
    }
}

pub async fn persist_book(path: &Path, book: &PlanBook) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(book).map_err(AppError::internal)?;
    fs::write(path, payload).await.map_err(AppError::internal)?;
    Ok(())
}
