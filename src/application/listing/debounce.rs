//! Trailing-edge debounce for the free-text search box.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use tracing::trace;

pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Collapses a burst of keystrokes into the last one.
///
/// Every call to [`SearchDebouncer::settle`] supersedes all earlier calls that
/// are still waiting. Clones share the same generation, so one debouncer can
/// be handed to each spawned keystroke task.
#[derive(Debug, Clone)]
pub struct SearchDebouncer {
    delay: Duration,
    generation: Arc<AtomicU64>,
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_DEBOUNCE)
    }
}

impl SearchDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Wait out the quiet period. Returns the input when no newer keystroke
    /// arrived meanwhile, `None` when it was superseded.
    pub async fn settle(&self, input: String) -> Option<String> {
        let issued = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.delay).await;

        if self.generation.load(Ordering::SeqCst) == issued {
            Some(input)
        } else {
            trace!(generation = issued, "Search keystroke superseded");
            None
        }
    }

    /// Invalidate every keystroke still waiting.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn burst_collapses_to_last_keystroke() {
        let debouncer = SearchDebouncer::default();
        let mut handles = Vec::new();
        for text in ["k", "ki", "kit"] {
            let debouncer = debouncer.clone();
            handles.push(tokio::spawn(
                async move { debouncer.settle(text.to_string()).await },
            ));
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        let mut settled = Vec::new();
        for handle in handles {
            settled.push(handle.await.expect("task completes"));
        }
        assert_eq!(settled, vec![None, None, Some("kit".to_string())]);
    }

    #[tokio::test(start_paused = true)]
    async fn spaced_keystrokes_all_settle() {
        let debouncer = SearchDebouncer::new(Duration::from_millis(50));
        assert_eq!(debouncer.settle("a".into()).await, Some("a".to_string()));
        assert_eq!(debouncer.settle("ab".into()).await, Some("ab".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_drops_pending_keystroke() {
        let debouncer = SearchDebouncer::default();
        let waiting = {
            let debouncer = debouncer.clone();
            tokio::spawn(async move { debouncer.settle("cat".into()).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        debouncer.cancel();

        assert_eq!(waiting.await.expect("task completes"), None);
    }
}
