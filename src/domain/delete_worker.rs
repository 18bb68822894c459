//! Fixed-size worker pool applying soft-deletes in the background.
//!
//! All workers read from one shared channel. Enqueueing waits for channel
//! capacity, which is the pipeline's only flow control. Stopping closes the
//! channel and waits until every accepted job has been handed to the backend.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::domain::delete_job::DeleteJob;
use crate::domain::entities::Alias;
use crate::domain::repositories::UrlRepository;

/// Returned by [`DeleteQueue::add`] once the queue has been stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("delete queue has been stopped")]
pub struct QueueStopped;

type SharedReceiver = Arc<AsyncMutex<mpsc::Receiver<DeleteJob>>>;

/// Background pool of delete workers sharing one job channel.
///
/// Meant to be wrapped in an `Arc` and shared by every caller; the owner of
/// the application calls [`DeleteQueue::stop`] once at shutdown.
pub struct DeleteQueue {
    sender: Mutex<Option<mpsc::Sender<DeleteJob>>>,
    workers: AsyncMutex<Vec<JoinHandle<()>>>,
}

impl DeleteQueue {
    /// Spawns `workers` workers (at least one) on the current tokio runtime.
    ///
    /// `capacity` is the number of jobs the channel holds before
    /// [`DeleteQueue::add`] starts waiting; it is clamped to at least 1.
    pub fn start(repository: Arc<dyn UrlRepository>, workers: usize, capacity: usize) -> Self {
        let workers = workers.max(1);
        let capacity = capacity.max(1);

        let (tx, rx) = mpsc::channel(capacity);
        let rx: SharedReceiver = Arc::new(AsyncMutex::new(rx));

        let handles = (0..workers)
            .map(|worker_id| {
                tokio::spawn(run_delete_worker(
                    worker_id,
                    rx.clone(),
                    repository.clone(),
                ))
            })
            .collect();

        info!(
            workers,
            capacity,
            backend = repository.backend_name(),
            "Delete queue started"
        );

        Self {
            sender: Mutex::new(Some(tx)),
            workers: AsyncMutex::new(handles),
        }
    }

    /// Enqueues a soft-delete of `aliases` owned by `owner`.
    ///
    /// Waits while the channel is full. Once this returns `Ok`, the job will
    /// be applied before [`DeleteQueue::stop`] returns. Empty alias lists are
    /// accepted and dropped.
    ///
    /// # Errors
    ///
    /// Returns [`QueueStopped`] if [`DeleteQueue::stop`] has been called.
    pub async fn add(
        &self,
        owner: impl Into<String>,
        aliases: Vec<Alias>,
    ) -> Result<(), QueueStopped> {
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(QueueStopped)?;

        if aliases.is_empty() {
            return Ok(());
        }

        sender
            .send(DeleteJob::new(owner, aliases))
            .await
            .map_err(|_| QueueStopped)
    }

    /// Returns true until [`DeleteQueue::stop`] is called.
    pub fn is_running(&self) -> bool {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Closes the channel and waits for all workers to drain it.
    ///
    /// Every caller returns only after the drain has finished, including
    /// callers that race with one already in progress. Calling `stop` again
    /// afterwards is a no-op.
    pub async fn stop(&self) {
        drop(
            self.sender
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take(),
        );

        // Held across the joins so concurrent callers wait for the same drain.
        let mut workers = self.workers.lock().await;
        if workers.is_empty() {
            return;
        }
        let total = workers.len();

        while let Some(handle) = workers.pop() {
            if let Err(e) = handle.await {
                error!("Delete worker terminated abnormally: {}", e);
            }
        }

        info!(workers = total, "Delete queue stopped");
    }
}

/// Worker loop: receive a job, apply it, repeat until the channel closes.
async fn run_delete_worker(
    worker_id: usize,
    jobs: SharedReceiver,
    repository: Arc<dyn UrlRepository>,
) {
    debug!(worker_id, "Delete worker started");

    loop {
        let next = jobs.lock().await.recv().await;
        let Some(job) = next else {
            break;
        };

        let queued_ms = job.queued_for_ms();

        match repository
            .delete_user_urls(&job.owner, &job.aliases)
            .await
        {
            Ok(()) => {
                metrics::counter!("delete_jobs_processed_total").increment(1);
                debug!(
                    worker_id,
                    owner = %job.owner,
                    count = job.aliases.len(),
                    queued_ms,
                    "Delete job applied"
                );
            }
            Err(e) => {
                metrics::counter!("delete_jobs_failed_total").increment(1);
                warn!(
                    worker_id,
                    owner = %job.owner,
                    count = job.aliases.len(),
                    "Delete job dropped: {}",
                    e
                );
            }
        }
    }

    debug!(worker_id, "Delete worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::OriginalUrl;
    use crate::error::StorageError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Counts `delete_user_urls` calls; every other operation is unsupported.
    #[derive(Default)]
    struct CountingRepository {
        calls: AtomicUsize,
        aliases: AtomicUsize,
        fail: bool,
        delay: Option<Duration>,
    }

    #[async_trait]
    impl UrlRepository for CountingRepository {
        fn backend_name(&self) -> &'static str {
            "counting"
        }

        async fn add(
            &self,
            _owner: Option<&str>,
            _batch: HashMap<Alias, OriginalUrl>,
        ) -> Result<(), StorageError> {
            Err(StorageError::unsupported("add", "counting"))
        }

        async fn get_url(&self, _alias: &str) -> Result<OriginalUrl, StorageError> {
            Err(StorageError::unsupported("get_url", "counting"))
        }

        async fn get_alias(
            &self,
            _owner: Option<&str>,
            _url: &str,
        ) -> Result<Alias, StorageError> {
            Err(StorageError::unsupported("get_alias", "counting"))
        }

        async fn get_user_urls(
            &self,
            _user_id: &str,
        ) -> Result<HashMap<Alias, OriginalUrl>, StorageError> {
            Err(StorageError::unsupported("get_user_urls", "counting"))
        }

        async fn delete_user_urls(
            &self,
            _user_id: &str,
            aliases: &[Alias],
        ) -> Result<(), StorageError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.aliases.fetch_add(aliases.len(), Ordering::SeqCst);
            if self.fail {
                Err(StorageError::unavailable("backend down"))
            } else {
                Ok(())
            }
        }

        async fn ping(&self) -> Result<(), StorageError> {
            Ok(())
        }

        async fn close(&self) -> Result<(), StorageError> {
            Ok(())
        }
    }

    fn aliases(n: usize) -> Vec<Alias> {
        (0..n).map(|i| format!("alias{i}")).collect()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_stop_drains_all_jobs() {
        let repo = Arc::new(CountingRepository::default());
        let queue = DeleteQueue::start(repo.clone(), 4, 1);

        for i in 0..100 {
            queue.add(format!("user-{i}"), aliases(2)).await.unwrap();
        }
        queue.stop().await;

        assert_eq!(repo.calls.load(Ordering::SeqCst), 100);
        assert_eq!(repo.aliases.load(Ordering::SeqCst), 200);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_stop_waits_for_slow_backend() {
        let repo = Arc::new(CountingRepository {
            delay: Some(Duration::from_millis(20)),
            ..Default::default()
        });
        let queue = DeleteQueue::start(repo.clone(), 2, 8);

        for _ in 0..10 {
            queue.add("user", aliases(1)).await.unwrap();
        }
        queue.stop().await;

        assert_eq!(repo.calls.load(Ordering::SeqCst), 10);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_producers_are_all_applied() {
        let repo = Arc::new(CountingRepository::default());
        let queue = Arc::new(DeleteQueue::start(repo.clone(), 3, 1));

        let producers: Vec<_> = (0..20)
            .map(|i| {
                let queue = queue.clone();
                tokio::spawn(async move {
                    for _ in 0..5 {
                        queue.add(format!("user-{i}"), aliases(1)).await.unwrap();
                    }
                })
            })
            .collect();
        for producer in producers {
            producer.await.unwrap();
        }
        queue.stop().await;

        assert_eq!(repo.calls.load(Ordering::SeqCst), 100);
    }

    #[tokio::test]
    async fn test_backend_errors_are_swallowed() {
        let repo = Arc::new(CountingRepository {
            fail: true,
            ..Default::default()
        });
        let queue = DeleteQueue::start(repo.clone(), 2, 1);

        for _ in 0..5 {
            queue.add("user", aliases(3)).await.unwrap();
        }
        queue.stop().await;

        // Every job was attempted exactly once, none retried.
        assert_eq!(repo.calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_add_after_stop_fails() {
        let repo = Arc::new(CountingRepository::default());
        let queue = DeleteQueue::start(repo.clone(), 1, 1);
        assert!(queue.is_running());

        queue.stop().await;

        assert!(!queue.is_running());
        assert_eq!(queue.add("user", aliases(1)).await, Err(QueueStopped));
        assert_eq!(repo.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let repo = Arc::new(CountingRepository::default());
        let queue = DeleteQueue::start(repo, 2, 1);

        queue.stop().await;
        queue.stop().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_stops_both_wait_for_drain() {
        let repo = Arc::new(CountingRepository {
            delay: Some(Duration::from_millis(50)),
            ..Default::default()
        });
        let queue = Arc::new(DeleteQueue::start(repo.clone(), 1, 8));

        for _ in 0..5 {
            queue.add("user", aliases(1)).await.unwrap();
        }

        let stoppers: Vec<_> = (0..2)
            .map(|_| {
                let queue = queue.clone();
                let repo = repo.clone();
                tokio::spawn(async move {
                    queue.stop().await;
                    repo.calls.load(Ordering::SeqCst)
                })
            })
            .collect();

        for stopper in stoppers {
            assert_eq!(stopper.await.unwrap(), 5);
        }
    }

    #[tokio::test]
    async fn test_empty_job_is_dropped() {
        let repo = Arc::new(CountingRepository::default());
        let queue = DeleteQueue::start(repo.clone(), 1, 1);

        queue.add("user", Vec::new()).await.unwrap();
        queue.stop().await;

        assert_eq!(repo.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_zero_workers_still_processes() {
        let repo = Arc::new(CountingRepository::default());
        let queue = DeleteQueue::start(repo.clone(), 0, 0);

        queue.add("user", aliases(1)).await.unwrap();
        queue.stop().await;

        assert_eq!(repo.calls.load(Ordering::SeqCst), 1);
    }
}
