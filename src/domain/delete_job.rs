//! Delete job model for asynchronous soft-deletion.

use chrono::{DateTime, Utc};

use crate::domain::entities::Alias;

/// A request to soft-delete some of a user's aliases.
///
/// Created when a caller enqueues a deletion and consumed exactly once by a
/// worker of [`crate::domain::delete_worker::DeleteQueue`]. Discarded after the
/// backend call returns, whatever its outcome.
#[derive(Debug, Clone)]
pub struct DeleteJob {
    pub owner: String,
    pub aliases: Vec<Alias>,
    pub enqueued_at: DateTime<Utc>,
}

impl DeleteJob {
    /// Creates a job stamped with the current time.
    pub fn new(owner: impl Into<String>, aliases: Vec<Alias>) -> Self {
        Self {
            owner: owner.into(),
            aliases,
            enqueued_at: Utc::now(),
        }
    }

    /// Milliseconds spent waiting in the queue so far.
    pub fn queued_for_ms(&self) -> i64 {
        (Utc::now() - self.enqueued_at).num_milliseconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_job_creation() {
        let job = DeleteJob::new("user-1", vec!["abc".to_string(), "def".to_string()]);

        assert_eq!(job.owner, "user-1");
        assert_eq!(job.aliases, vec!["abc", "def"]);
        assert!(job.enqueued_at <= Utc::now());
    }

    #[test]
    fn test_queued_for_is_not_negative() {
        let job = DeleteJob::new("user-1", Vec::new());
        assert!(job.queued_for_ms() >= 0);
    }
}
