//! Tracker management service
//!
//! Owner-scoped CRUD shared by the HTTP API and the CLI. A tracker that
//! belongs to someone else is reported exactly like a missing one.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::errors::{Result, ScrolldepthError};
use crate::storage::{SeaOrmStorage, Tracker};
use crate::utils::generate_random_code;

/// 生成的追踪器 id 长度
pub const TRACKER_ID_LENGTH: usize = 16;
/// id 冲突时的最大尝试次数
const CREATE_ATTEMPTS: usize = 3;
const MAX_OWNER_LENGTH: usize = 128;

pub struct TrackerService {
    storage: Arc<SeaOrmStorage>,
}

impl TrackerService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    fn validate_owner(owner: &str) -> Result<&str> {
        let owner = owner.trim();
        if owner.is_empty() {
            return Err(ScrolldepthError::validation("Owner id cannot be empty"));
        }
        if owner.len() > MAX_OWNER_LENGTH {
            return Err(ScrolldepthError::validation(format!(
                "Owner id exceeds {} bytes",
                MAX_OWNER_LENGTH
            )));
        }
        Ok(owner)
    }

    /// Create a tracker with a freshly generated id
    pub async fn create(&self, owner: &str) -> Result<Tracker> {
        let owner = Self::validate_owner(owner)?;

        for attempt in 1..=CREATE_ATTEMPTS {
            let tracker = Tracker {
                id: generate_random_code(TRACKER_ID_LENGTH),
                owner: owner.to_string(),
                created_at: Utc::now(),
            };

            if self.storage.insert_tracker_if_absent(&tracker).await? {
                info!("TrackerService: created tracker '{}'", tracker.id);
                return Ok(tracker);
            }
            warn!(
                "Tracker id collision on '{}' (attempt {}/{})",
                tracker.id, attempt, CREATE_ATTEMPTS
            );
        }

        Err(ScrolldepthError::database_operation(format!(
            "Failed to allocate a unique tracker id after {} attempts",
            CREATE_ATTEMPTS
        )))
    }

    pub async fn list(&self, owner: &str) -> Result<Vec<Tracker>> {
        let owner = Self::validate_owner(owner)?;
        self.storage.list_trackers(owner).await
    }

    pub async fn get(&self, owner: &str, id: &str) -> Result<Tracker> {
        let owner = Self::validate_owner(owner)?;
        self.storage
            .find_owned_tracker(owner, id)
            .await?
            .ok_or_else(|| ScrolldepthError::not_found(format!("Tracker '{}' not found", id)))
    }

    /// Delete a tracker and, through the cascade, all of its events
    pub async fn delete(&self, owner: &str, id: &str) -> Result<()> {
        let owner = Self::validate_owner(owner)?;
        self.storage.delete_tracker(owner, id).await?;
        info!("TrackerService: deleted tracker '{}'", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_owner() {
        assert_eq!(TrackerService::validate_owner(" user_1 ").unwrap(), "user_1");
        assert!(TrackerService::validate_owner("   ").is_err());
        assert!(TrackerService::validate_owner(&"x".repeat(129)).is_err());
    }

    #[test]
    fn test_generated_ids_fit_ingest_bounds() {
        use crate::services::ingest::{TRACKER_ID_MAX_LEN, TRACKER_ID_MIN_LEN};
        assert!((TRACKER_ID_MIN_LEN..=TRACKER_ID_MAX_LEN).contains(&TRACKER_ID_LENGTH));
    }
}
