//! Dashboard read service
//!
//! Loads a bounded slice of a tracker's events and hands it to the pure
//! aggregation layer. Every call is independent; concurrent refreshes are
//! neither coalesced nor cancelled.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::debug;

use crate::analytics::{CountryLookup, DashboardSummary, Visitor, summarize, unique_visitors};
use crate::config::DashboardConfig;
use crate::errors::{Result, ScrolldepthError};
use crate::storage::{ScrollEvent, SeaOrmStorage};

pub struct DashboardService {
    storage: Arc<SeaOrmStorage>,
    lookup: Arc<dyn CountryLookup>,
    event_limit: u64,
    active_window: Duration,
}

impl DashboardService {
    pub fn new(
        storage: Arc<SeaOrmStorage>,
        lookup: Arc<dyn CountryLookup>,
        config: &DashboardConfig,
    ) -> Self {
        Self {
            storage,
            lookup,
            event_limit: config.event_limit.max(1),
            active_window: Duration::minutes(config.active_window_minutes.max(1)),
        }
    }

    async fn ensure_owned(&self, owner: &str, tracker_id: &str) -> Result<()> {
        match self.storage.find_owned_tracker(owner, tracker_id).await? {
            Some(_) => Ok(()),
            None => Err(ScrolldepthError::not_found(format!(
                "Tracker '{}' not found",
                tracker_id
            ))),
        }
    }

    /// 最近的事件；limit 超过上限时截断
    pub async fn events(
        &self,
        owner: &str,
        tracker_id: &str,
        limit: Option<u64>,
    ) -> Result<Vec<ScrollEvent>> {
        self.ensure_owned(owner, tracker_id).await?;
        let limit = limit
            .unwrap_or(self.event_limit)
            .clamp(1, self.event_limit);
        self.storage.recent_events(tracker_id, limit).await
    }

    async fn window_events(&self, tracker_id: &str) -> Result<Vec<ScrollEvent>> {
        let since = Utc::now() - self.active_window;
        self.storage
            .events_since(tracker_id, Some(since), self.event_limit)
            .await
    }

    pub async fn summary(&self, owner: &str, tracker_id: &str) -> Result<DashboardSummary> {
        self.ensure_owned(owner, tracker_id).await?;

        let events = self
            .storage
            .recent_events(tracker_id, self.event_limit)
            .await?;
        let recent = self.window_events(tracker_id).await?;
        debug!(
            "Summarizing tracker {}: {} events, {} in active window",
            tracker_id,
            events.len(),
            recent.len()
        );

        Ok(summarize(&events, &recent, self.lookup.as_ref()))
    }

    pub async fn visitors(&self, owner: &str, tracker_id: &str) -> Result<Vec<Visitor>> {
        self.ensure_owned(owner, tracker_id).await?;
        let recent = self.window_events(tracker_id).await?;
        Ok(unique_visitors(&recent, self.lookup.as_ref()))
    }
}
