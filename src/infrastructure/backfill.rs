//! Batch coordinate repair
//!
//! Scans the job table for rows whose stored coordinates fail the
//! coordinate policy and re-geocodes them with the same candidate/provider
//! loop the HTTP resolver uses, minus the HTTP hop and the rate limiter.
//! Per-row failures are accumulated into the summary; only setup failures
//! abort the run.

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use serde::Serialize;
use sqlx::{PgPool, Row};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::domain::address::candidate_queries;
use crate::domain::coords::{is_usable_job_coords, normalize_address_text};
use crate::domain::{DomainError, GeocodeProvider};

use super::resolver::resolve_candidates;

const MAX_SAMPLES: usize = 20;

/// One row of the externally-owned job table.
#[derive(Debug, Clone)]
pub struct JobRow {
    pub id: String,
    pub address_text: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// Access to the job table. The table belongs to the CRM; this service
/// only reads rows and writes the lat/lng columns.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Most recent rows first, up to `limit`.
    async fn fetch_recent(&self, limit: i64) -> Result<Vec<JobRow>, DomainError>;

    /// Writes new coordinates, or nulls them when `coords` is `None`.
    async fn update_coords(&self, id: &str, coords: Option<(f64, f64)>)
        -> Result<(), DomainError>;
}

pub struct PostgresJobStore {
    pool: PgPool,
}

impl PostgresJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobStore for PostgresJobStore {
    async fn fetch_recent(&self, limit: i64) -> Result<Vec<JobRow>, DomainError> {
        let rows = sqlx::query(
            "SELECT id, address_text, lat, lng FROM jobs ORDER BY created_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("jobs select failed: {e}")))?;

        rows.into_iter()
            .map(|row| {
                Ok(JobRow {
                    id: row
                        .try_get::<String, _>("id")
                        .map_err(|e| DomainError::storage(format!("jobs row decode failed: {e}")))?,
                    address_text: row
                        .try_get("address_text")
                        .map_err(|e| DomainError::storage(format!("jobs row decode failed: {e}")))?,
                    lat: row
                        .try_get("lat")
                        .map_err(|e| DomainError::storage(format!("jobs row decode failed: {e}")))?,
                    lng: row
                        .try_get("lng")
                        .map_err(|e| DomainError::storage(format!("jobs row decode failed: {e}")))?,
                })
            })
            .collect()
    }

    async fn update_coords(
        &self,
        id: &str,
        coords: Option<(f64, f64)>,
    ) -> Result<(), DomainError> {
        let (lat, lng) = match coords {
            Some((lat, lng)) => (Some(lat), Some(lng)),
            None => (None, None),
        };
        sqlx::query("UPDATE jobs SET lat = $1, lng = $2 WHERE id = $3")
            .bind(lat)
            .bind(lng)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("jobs update failed: {e}")))?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackfillAction {
    Fixed,
    Nulled,
    Skipped,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct BackfillSample {
    pub id: String,
    pub action: BackfillAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct BackfillSummary {
    pub scanned: usize,
    pub fixed: usize,
    pub nulled: usize,
    pub failed: usize,
    pub skipped: usize,
    pub dry_run: bool,
    pub samples: Vec<BackfillSample>,
}

impl BackfillSummary {
    fn record(&mut self, id: &str, action: BackfillAction, coords: Option<(f64, f64)>, detail: Option<String>) {
        match action {
            BackfillAction::Fixed => self.fixed += 1,
            BackfillAction::Nulled => self.nulled += 1,
            BackfillAction::Skipped => self.skipped += 1,
            BackfillAction::Failed => self.failed += 1,
        }
        if self.samples.len() < MAX_SAMPLES {
            self.samples.push(BackfillSample {
                id: id.to_string(),
                action,
                lat: coords.map(|c| c.0),
                lng: coords.map(|c| c.1),
                detail,
            });
        }
    }
}

pub struct BackfillJob {
    store: Arc<dyn JobStore>,
    providers: Vec<Arc<dyn GeocodeProvider>>,
    concurrency: usize,
    dry_run: bool,
}

impl BackfillJob {
    pub fn new(
        store: Arc<dyn JobStore>,
        providers: Vec<Arc<dyn GeocodeProvider>>,
        concurrency: usize,
        dry_run: bool,
    ) -> Self {
        Self {
            store,
            providers,
            concurrency: concurrency.max(1),
            dry_run,
        }
    }

    /// Runs the repair over at most `limit` recent rows with bounded
    /// concurrency and returns the summary. Never aborts on a row-level
    /// failure.
    pub async fn run(&self, limit: i64) -> Result<BackfillSummary, DomainError> {
        let rows = self.store.fetch_recent(limit).await?;
        let scanned = rows.len();

        let broken: Vec<JobRow> = rows
            .into_iter()
            .filter(|row| !is_usable_job_coords(row.lat, row.lng))
            .collect();

        info!(
            scanned,
            broken = broken.len(),
            dry_run = self.dry_run,
            "starting coordinate backfill"
        );

        let summary = Mutex::new(BackfillSummary {
            scanned,
            dry_run: self.dry_run,
            ..Default::default()
        });

        futures::stream::iter(broken)
            .for_each_concurrent(self.concurrency, |row| {
                let summary = &summary;
                async move {
                    let (action, coords, detail) = self.repair_row(&row).await;
                    summary.lock().await.record(&row.id, action, coords, detail);
                }
            })
            .await;

        Ok(summary.into_inner())
    }

    /// Decides and (unless dry-run) applies the repair for one row.
    async fn repair_row(
        &self,
        row: &JobRow,
    ) -> (BackfillAction, Option<(f64, f64)>, Option<String>) {
        let normalized = normalize_address_text(row.address_text.as_deref().unwrap_or(""));

        if normalized.is_empty() {
            // No address to geocode; clear stray unusable coordinates.
            if row.lat.is_none() && row.lng.is_none() {
                return (BackfillAction::Skipped, None, Some("no address, no coordinates".to_string()));
            }
            return match self.apply(&row.id, None).await {
                Ok(()) => (BackfillAction::Nulled, None, Some("no address".to_string())),
                Err(e) => (BackfillAction::Failed, None, Some(e.to_string())),
            };
        }

        let candidates = candidate_queries(&normalized);
        match resolve_candidates(&self.providers, &candidates).await {
            Ok(Some((hit, source))) => {
                if row.lat == Some(hit.lat) && row.lng == Some(hit.lng) {
                    return (BackfillAction::Skipped, None, Some("coordinates unchanged".to_string()));
                }
                match self.apply(&row.id, Some((hit.lat, hit.lng))).await {
                    Ok(()) => (
                        BackfillAction::Fixed,
                        Some((hit.lat, hit.lng)),
                        Some(format!("via {source}")),
                    ),
                    Err(e) => (BackfillAction::Failed, None, Some(e.to_string())),
                }
            }
            Ok(None) => {
                // Nothing found; prior coordinates were unusable anyway.
                if row.lat.is_none() && row.lng.is_none() {
                    return (BackfillAction::Skipped, None, Some("no match, nothing stored".to_string()));
                }
                match self.apply(&row.id, None).await {
                    Ok(()) => (BackfillAction::Nulled, None, Some("no match".to_string())),
                    Err(e) => (BackfillAction::Failed, None, Some(e.to_string())),
                }
            }
            Err(e) => {
                warn!(id = row.id.as_str(), "backfill geocode failed: {e}");
                (BackfillAction::Failed, None, Some(e.to_string()))
            }
        }
    }

    async fn apply(&self, id: &str, coords: Option<(f64, f64)>) -> Result<(), DomainError> {
        if self.dry_run {
            return Ok(());
        }
        self.store.update_coords(id, coords).await
    }
}
