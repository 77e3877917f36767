// ============================================================================
// Boucle de polling d'un flux
// ============================================================================
// Une instance par colonne. Chaque cycle :
//   1. fetch du snapshot `/<flux>/poll`
//   2. envoi au propriétaire de la table (qui merge et publie)
//   3. attente de `interval` à partir de la FIN du cycle (délai fixe)
//
// Les erreurs de transport sont loggées puis ignorées : le cycle suivant est
// toujours planifié. La boucle ne s'arrête que si le propriétaire a disparu.
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::api::SnapshotFetcher;
use crate::engine::EngineEvent;
use crate::models::Column;

/// Poll indéfiniment le flux d'une colonne
///
/// CONCEPT RUST : Boucle explicite
/// - loop + sleep plutôt qu'un appel récursif
/// - Pas de croissance de pile, quelle que soit la durée de vie du process
pub async fn poll_loop(
    column: Column,
    fetcher: Arc<dyn SnapshotFetcher>,
    interval: Duration,
    events: mpsc::Sender<EngineEvent>,
) {
    let path = column.poll_path();
    info!(column = %column, path, interval_ms = interval.as_millis() as u64, "Poll loop started");

    let mut cycle: u64 = 0;
    loop {
        if events.is_closed() {
            break;
        }
        cycle += 1;

        match fetcher.fetch(path).await {
            Ok(snapshot) => {
                debug!(column = %column, cycle, base = %snapshot.base, "Poll snapshot fetched");
                if events
                    .send(EngineEvent::Polled { column, snapshot })
                    .await
                    .is_err()
                {
                    break;
                }
            }
            Err(e) => {
                warn!(column = %column, cycle, error = %e, "Poll failed, retrying after delay");
            }
        }

        tokio::time::sleep(interval).await;
    }

    info!(column = %column, cycles = cycle, "Table owner gone, poll loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tokio::time::Instant;

    use crate::error::TransportError;
    use crate::models::{Currency, Snapshot};

    /// Fetcher qui échoue un appel sur deux et note l'instant de chaque appel
    struct FlakyFetcher {
        calls: Mutex<Vec<(String, Instant)>>,
        latency: Duration,
    }

    #[async_trait]
    impl SnapshotFetcher for FlakyFetcher {
        async fn fetch(&self, feed_path: &str) -> Result<Snapshot, TransportError> {
            let n = {
                let mut calls = self.calls.lock().unwrap();
                calls.push((feed_path.to_string(), Instant::now()));
                calls.len()
            };
            tokio::time::sleep(self.latency).await;

            if n % 2 == 0 {
                Err(TransportError::Status {
                    path: feed_path.to_string(),
                    status: 503,
                })
            } else {
                Ok(Snapshot::new("CHF", &[(Currency::RUB, n as f64)]))
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_errors_do_not_break_loop_and_delay_is_fixed() {
        let fetcher = Arc::new(FlakyFetcher {
            calls: Mutex::new(Vec::new()),
            latency: Duration::from_millis(300),
        });
        let (tx, mut rx) = mpsc::channel(8);

        let handle = tokio::spawn(poll_loop(
            Column::Second,
            fetcher.clone(),
            Duration::from_secs(1),
            tx,
        ));

        // Appels 1 et 3 réussissent, l'appel 2 échoue sans casser la boucle
        for expected in [1.0, 3.0] {
            match rx.recv().await {
                Some(EngineEvent::Polled { column, snapshot }) => {
                    assert_eq!(column, Column::Second);
                    assert_eq!(snapshot.rate(Currency::RUB), Some(expected));
                }
                other => panic!("événement inattendu : {:?}", other),
            }
        }

        drop(rx);
        handle.await.unwrap();

        let calls = fetcher.calls.lock().unwrap();
        assert!(calls.len() >= 3);
        assert!(calls.iter().all(|(path, _)| path == "/second/poll"));

        // Délai mesuré depuis la fin du cycle précédent : latence + intervalle
        let gap = calls[1].1 - calls[0].1;
        assert!(gap >= Duration::from_millis(1300), "gap = {:?}", gap);
        assert!(gap < Duration::from_millis(1350), "gap = {:?}", gap);
    }
}
