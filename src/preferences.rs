use crate::models::PlanKind;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Light,
    Dark,
}

impl DisplayMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

/// UI preferences that outlive a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Preferences {
    #[serde(default)]
    pub display_mode: DisplayMode,
    #[serde(default)]
    pub last_date: Option<NaiveDate>,
    #[serde(default)]
    pub plan_kind: PlanKind,
}

impl Preferences {
    /// Date to open on mount: the last one viewed, else today.
    pub fn initial_date(&self, today: NaiveDate) -> NaiveDate {
        self.last_date.unwrap_or(today)
    }
}

/// File-backed key-value home for [`Preferences`]; every change is written through.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
    current: Preferences,
}

impl PreferenceStore {
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let current = load_preferences(&path).await;
        Self { path, current }
    }

    pub fn get(&self) -> &Preferences {
        &self.current
    }

    pub async fn toggle_display_mode(&mut self) -> std::io::Result<DisplayMode> {
        self.current.display_mode = self.current.display_mode.toggled();
        persist_preferences(&self.path, &self.current).await?;
        Ok(self.current.display_mode)
    }

    pub async fn remember_date(&mut self, date: NaiveDate) -> std::io::Result<()> {
        if self.current.last_date == Some(date) {
            return Ok(());
        }
        self.current.last_date = Some(date);
        persist_preferences(&self.path, &self.current).await
    }

    pub async fn set_plan_kind(&mut self, kind: PlanKind) -> std::io::Result<()> {
        self.current.plan_kind = kind;
        persist_preferences(&self.path, &self.current).await
    }
}

pub async fn load_preferences(path: &Path) -> Preferences {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(prefs) => prefs,
            Err(err) => {
                error!("failed to parse preferences file: {err}");
                Preferences::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Preferences::default(),
        Err(err) => {
            error!("failed to read preferences file: {err}");
            Preferences::default()
        }
    }
}

pub async fn persist_preferences(path: &Path, prefs: &Preferences) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let payload = serde_json::to_vec_pretty(prefs).map_err(std::io::Error::other)?;
    fs::write(path, payload).await
}
