//! The remote plan store the controller talks to.
//!
//! [`PlanStore`] is the seam: the controller only ever sees this trait, so tests
//! can script responses while [`HttpPlanStore`] speaks to the real backend.

use crate::config::ClientConfig;
use crate::errors::StoreError;
use crate::models::{PlanDocument, PlanKind, SaveResponse, is_valid_entry_key};
use chrono::NaiveDate;
use reqwest::{Client, Response, StatusCode, Url};

#[async_trait::async_trait]
pub trait PlanStore: Send + Sync + 'static {
    /// `Ok(None)` means the store has nothing planned for `date`.
    async fn fetch_plan(&self, date: NaiveDate) -> Result<Option<PlanDocument>, StoreError>;

    async fn mark_complete(&self, date: NaiveDate, key: &str) -> Result<(), StoreError>;

    async fn mark_incomplete(&self, date: NaiveDate, key: &str) -> Result<(), StoreError>;

    async fn save_plan(&self, document: &PlanDocument) -> Result<SaveResponse, StoreError>;
}

pub struct HttpPlanStore {
    client: Client,
    base_url: Url,
    kind: PlanKind,
}

impl HttpPlanStore {
    pub fn new(base_url: &str, kind: PlanKind) -> Result<Self, StoreError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| StoreError::Transport(format!("invalid base url {base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::Transport(format!(
                "base url {base_url} cannot carry a path"
            )));
        }
        Ok(Self {
            client: Client::new(),
            base_url,
            kind,
        })
    }

    pub fn from_config(config: &ClientConfig, kind: PlanKind) -> Result<Self, StoreError> {
        Self::new(&config.api_url, kind)
    }

    fn plan_url(&self, date: NaiveDate, tail: &[&str]) -> Url {
        let kind = match self.kind {
            PlanKind::Diet => "diet",
            PlanKind::Workout => "workout",
        };
        let date = date.format("%Y-%m-%d").to_string();
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["api", kind, "plans", date.as_str()])
                .extend(tail);
        }
        url
    }

    async fn set_completion(
        &self,
        date: NaiveDate,
        key: &str,
        completed: bool,
    ) -> Result<(), StoreError> {
        if !is_valid_entry_key(key) {
            return Err(StoreError::NotFound);
        }
        let url = self.plan_url(date, &["entries", key, "complete"]);
        let request = if completed {
            self.client.post(url)
        } else {
            self.client.delete(url)
        };
        let resp = request.send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound);
        }
        ensure_success(resp).await?;
        Ok(())
    }
}

async fn ensure_success(resp: Response) -> Result<Response, StoreError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = resp.text().await.unwrap_or_default();
    Err(StoreError::Http {
        status: status.as_u16(),
        message,
    })
}

#[async_trait::async_trait]
impl PlanStore for HttpPlanStore {
    async fn fetch_plan(&self, date: NaiveDate) -> Result<Option<PlanDocument>, StoreError> {
        let resp = self.client.get(self.plan_url(date, &[])).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let plan = ensure_success(resp).await?.json::<PlanDocument>().await?;
        Ok(Some(plan))
    }

    async fn mark_complete(&self, date: NaiveDate, key: &str) -> Result<(), StoreError> {
        self.set_completion(date, key, true).await
    }

    async fn mark_incomplete(&self, date: NaiveDate, key: &str) -> Result<(), StoreError> {
        self.set_completion(date, key, false).await
    }

    async fn save_plan(&self, document: &PlanDocument) -> Result<SaveResponse, StoreError> {
        let resp = self
            .client
            .put(self.plan_url(document.date, &[]))
            .json(document)
            .send()
            .await?;
        let body = ensure_success(resp).await?.json::<SaveResponse>().await?;
        Ok(body)
    }
}
