use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

/// Tracks which threads currently have a generation in flight.
///
/// Cancellation is cooperative: the streaming loop polls `is_active` between
/// events, so a stop request takes effect at the next event boundary rather
/// than preemptively.
#[derive(Debug, Default)]
pub struct GenerationRegistry {
    inner: RwLock<HashMap<String, bool>>,
}

impl GenerationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that a generation started for this thread
    pub async fn mark_active(&self, thread_id: &str) {
        self.inner
            .write()
            .await
            .insert(thread_id.to_string(), true);
    }

    /// False when the entry is absent or was explicitly stopped
    pub async fn is_active(&self, thread_id: &str) -> bool {
        self.inner
            .read()
            .await
            .get(thread_id)
            .copied()
            .unwrap_or(false)
    }

    /// Flip the flag to false if present. Stopping an absent or finished
    /// generation is not an error, so this never fails.
    pub async fn request_stop(&self, thread_id: &str) {
        let mut map = self.inner.write().await;
        if let Some(flag) = map.get_mut(thread_id) {
            *flag = false;
            tracing::debug!(thread_id, "stop requested for active generation");
        } else {
            tracing::debug!(thread_id, "stop requested with no generation in flight");
        }
    }

    /// Remove the entry after a grace period, so a stale flag can't answer
    /// polls for a run that already ended.
    ///
    /// Only entries still marked stopped are reaped: a new turn may start on
    /// the same thread inside the grace window, and its live flag must not
    /// be deleted by the previous turn's timer.
    pub fn schedule_cleanup(self: &Arc<Self>, thread_id: &str, after: Duration) {
        let registry = Arc::clone(self);
        let thread_id = thread_id.to_string();
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            let mut map = registry.inner.write().await;
            if map.get(&thread_id) == Some(&false) {
                map.remove(&thread_id);
            }
        });
    }

    pub async fn contains(&self, thread_id: &str) -> bool {
        self.inner.read().await.contains_key(thread_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_absent_thread_is_inactive() {
        let registry = GenerationRegistry::new();
        assert!(!registry.is_active("nope").await);
    }

    #[tokio::test]
    async fn test_mark_then_stop() {
        let registry = GenerationRegistry::new();
        registry.mark_active("t1").await;
        assert!(registry.is_active("t1").await);

        registry.request_stop("t1").await;
        assert!(!registry.is_active("t1").await);
        // Entry survives until cleanup
        assert!(registry.contains("t1").await);
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let registry = GenerationRegistry::new();
        registry.request_stop("never-started").await;
        registry.request_stop("never-started").await;
        assert!(!registry.is_active("never-started").await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_removes_stopped_entry_after_delay() {
        let registry = Arc::new(GenerationRegistry::new());
        registry.mark_active("t1").await;
        registry.request_stop("t1").await;
        registry.schedule_cleanup("t1", Duration::from_secs(5));
        tokio::task::yield_now().await;

        tokio::time::advance(Duration::from_secs(6)).await;
        tokio::task::yield_now().await;
        assert!(!registry.contains("t1").await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_spares_thread_remarked_active() {
        let registry = Arc::new(GenerationRegistry::new());
        registry.mark_active("t1").await;
        registry.request_stop("t1").await;
        registry.schedule_cleanup("t1", Duration::from_secs(5));
        tokio::task::yield_now().await;

        // A new turn starts on the same thread inside the grace window
        tokio::time::advance(Duration::from_secs(4)).await;
        registry.mark_active("t1").await;

        // The old timer fires but must not touch the live flag
        tokio::time::advance(Duration::from_secs(2)).await;
        tokio::task::yield_now().await;
        assert!(registry.is_active("t1").await);
    }
}
