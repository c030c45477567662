//! Trailing-edge debouncer
//!
//! Collapses a burst of triggers into one run of the action, started once a
//! full window has passed without another trigger.

use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};

pub struct Debouncer {
    trigger: mpsc::UnboundedSender<()>,
    task: JoinHandle<()>,
}

impl Debouncer {
    /// Spawn the timer task; it lives until the debouncer is dropped
    pub fn spawn<F, Fut>(window: Duration, mut action: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (trigger, mut triggers) = mpsc::unbounded_channel::<()>();

        let task = tokio::spawn(async move {
            while triggers.recv().await.is_some() {
                let deadline = sleep(window);
                tokio::pin!(deadline);

                loop {
                    tokio::select! {
                        next = triggers.recv() => match next {
                            Some(()) => deadline.as_mut().reset(Instant::now() + window),
                            None => return,
                        },
                        () = &mut deadline => break,
                    }
                }

                action().await;
            }
        });

        Self { trigger, task }
    }

    /// Restart the window
    pub fn trigger(&self) {
        // Only fails once the task is gone, i.e. during teardown
        let _ = self.trigger.send(());
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recording_debouncer(window_ms: u64) -> (Debouncer, Arc<Mutex<Vec<Instant>>>) {
        let fired = Arc::new(Mutex::new(Vec::new()));
        let log = fired.clone();
        let debouncer = Debouncer::spawn(Duration::from_millis(window_ms), move || {
            let log = log.clone();
            async move {
                log.lock().unwrap().push(Instant::now());
            }
        });
        (debouncer, fired)
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_fires_once_after_last_trigger() {
        let start = Instant::now();
        let (debouncer, fired) = recording_debouncer(200);

        debouncer.trigger();
        sleep(Duration::from_millis(50)).await;
        debouncer.trigger();
        sleep(Duration::from_millis(70)).await;
        debouncer.trigger();

        sleep(Duration::from_millis(190)).await;
        assert!(fired.lock().unwrap().is_empty());

        sleep(Duration::from_millis(20)).await;
        {
            let fired = fired.lock().unwrap();
            assert_eq!(fired.len(), 1);
            assert!(fired[0] - start >= Duration::from_millis(320));
        }

        sleep(Duration::from_secs(2)).await;
        assert_eq!(fired.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_bursts_fire_separately() {
        let (debouncer, fired) = recording_debouncer(200);

        debouncer.trigger();
        sleep(Duration::from_millis(300)).await;
        debouncer.trigger();
        sleep(Duration::from_millis(300)).await;

        assert_eq!(fired.lock().unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_run() {
        let (debouncer, fired) = recording_debouncer(200);

        debouncer.trigger();
        sleep(Duration::from_millis(100)).await;
        drop(debouncer);
        sleep(Duration::from_millis(500)).await;

        assert!(fired.lock().unwrap().is_empty());
    }
}
