//! Background worker that expires idle sessions

use crate::metrics::EngineMetrics;
use crate::session_store::SessionStore;
use std::future::Future;
use std::sync::Arc;
use tokio::time::{interval, Duration, MissedTickBehavior};

/// Periodically removes expired sessions from a [`SessionStore`]
///
/// # Examples
///
/// ```no_run
/// use folio_engine::QaEngine;
///
/// # async fn run(engine: &QaEngine) {
/// let sweeper = engine.sweeper();
/// tokio::spawn(sweeper.run_until(async {
///     let _ = tokio::signal::ctrl_c().await;
/// }));
/// # }
/// ```
pub struct SessionSweeper {
    sessions: Arc<SessionStore>,
    metrics: Arc<EngineMetrics>,
    interval: Duration,
}

impl SessionSweeper {
    /// Create a sweeper running every `interval`
    pub fn new(sessions: Arc<SessionStore>, metrics: Arc<EngineMetrics>, interval: Duration) -> Self {
        Self {
            sessions,
            metrics,
            interval,
        }
    }

    fn sweep(&self) -> usize {
        let removed = self.sessions.sweep_expired();
        self.metrics.record_sessions_expired(removed);
        if removed > 0 {
            tracing::info!(
                "Sweep removed {} expired session(s), {} live",
                removed,
                self.sessions.len()
            );
        }
        removed
    }

    /// Sweep on every tick until `shutdown` resolves
    pub async fn run_until<F>(self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        tracing::info!("Session sweeper started (interval: {:?})", self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.sweep();
                }
                _ = &mut shutdown => {
                    tracing::info!("Shutdown signal received, stopping session sweeper");
                    break;
                }
            }
        }

        tracing::info!("Session sweeper stopped. Final metrics:\n{}", self.metrics.summary());
    }

    /// Run for a specific number of cycles, returning sessions removed
    pub async fn run_cycles(&self, cycles: usize) -> usize {
        let mut ticker = interval(self.interval);
        let mut removed = 0;

        for cycle in 0..cycles {
            ticker.tick().await;
            tracing::debug!("Starting sweep cycle {}/{}", cycle + 1, cycles);
            removed += self.sweep();
        }

        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use folio_domain::{ManualClock, SessionId};

    fn setup() -> (Arc<ManualClock>, Arc<SessionStore>, Arc<EngineMetrics>) {
        let clock = Arc::new(ManualClock::new(0));
        let mut config = SessionConfig::default();
        config.idle_timeout_secs = 10;
        let sessions = Arc::new(SessionStore::new(&config, clock.clone()));
        (clock, sessions, Arc::new(EngineMetrics::new()))
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_cycles_removes_expired() {
        let (clock, sessions, metrics) = setup();
        sessions.checkout(&SessionId::from("a"));
        sessions.checkout(&SessionId::from("b"));
        clock.advance_ms(10_000);

        let sweeper = SessionSweeper::new(sessions.clone(), metrics.clone(), Duration::from_secs(1));
        assert_eq!(sweeper.run_cycles(2).await, 2);
        assert!(sessions.is_empty());
        assert_eq!(metrics.snapshot().sessions_expired, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_until_stops_on_shutdown() {
        let (_clock, sessions, metrics) = setup();
        let sweeper = SessionSweeper::new(sessions, metrics, Duration::from_secs(1));
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();

        let handle = tokio::spawn(sweeper.run_until(async {
            let _ = rx.await;
        }));
        tokio::time::sleep(Duration::from_secs(3)).await;
        tx.send(()).unwrap();

        handle.await.unwrap();
    }
}
