use crate::core::storage::ArtifactStore;
use crate::utils::constants::MAX_RETENTION_SWEEP_SECS;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// How often to sweep for a given retention window: never less often than
/// the window itself, capped at an hour.
pub fn sweep_interval(retention: Duration) -> Duration {
    retention
        .min(Duration::from_secs(MAX_RETENTION_SWEEP_SECS))
        .max(Duration::from_secs(1))
}

pub async fn sweep(store: &dyn ArtifactStore, retention: Duration) -> usize {
    let started = std::time::Instant::now();
    match store.purge_older_than(retention).await {
        Ok(0) => 0,
        Ok(removed) => {
            let window = chrono::Duration::from_std(retention).unwrap_or(chrono::Duration::zero());
            tracing::info!(
                removed,
                cutoff = %(Utc::now() - window),
                elapsed = ?started.elapsed(),
                "expired artifacts purged"
            );
            removed
        }
        Err(e) => {
            tracing::error!("artifact retention sweep failed: {e}");
            0
        }
    }
}

// Background sweeper; runs until the returned handle is aborted.
pub fn spawn_retention_task(store: Arc<dyn ArtifactStore>, retention: Duration) -> JoinHandle<()> {
    let interval = sweep_interval(retention);
    tracing::info!(?retention, ?interval, "artifact retention enabled");

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            sweep(store.as_ref(), retention).await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::LocalStore;
    use tempfile::TempDir;
    use url::Url;

    #[test]
    fn test_sweep_interval_bounds() {
        assert_eq!(sweep_interval(Duration::from_secs(30)), Duration::from_secs(30));
        assert_eq!(
            sweep_interval(Duration::from_secs(7 * 24 * 3600)),
            Duration::from_secs(3600)
        );
        assert_eq!(sweep_interval(Duration::from_millis(10)), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_sweep_removes_expired() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalStore::new(
            temp_dir.path(),
            Url::parse("http://localhost:8080/uploads").unwrap(),
        );
        store.put(b"a".to_vec()).await.unwrap();
        store.put(b"b".to_vec()).await.unwrap();

        assert_eq!(sweep(&store, Duration::from_secs(3600)).await, 0);
        assert_eq!(sweep(&store, Duration::ZERO).await, 2);
    }
}
