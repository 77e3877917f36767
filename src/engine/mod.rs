// ============================================================================
// Module : engine
// ============================================================================
// Moteur de la table des taux :
// 1. Build initial : trois snapshots récupérés en parallèle, tout ou rien
// 2. Propriétaire unique de la table (owner.rs) qui merge et publie
// 3. Trois boucles de polling indépendantes, une par colonne (poller.rs)
//
// Ordre garanti : l'événement Built est envoyé AVANT le lancement des
// boucles de polling, sur le même channel. Le propriétaire voit donc
// toujours la table avant le premier snapshot pollé.
// ============================================================================

pub mod owner;  // Tâche propriétaire de la table
pub mod poller; // Boucles de polling

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{error, info, instrument};

use crate::api::SnapshotFetcher;
use crate::error::TransportError;
use crate::models::{Column, RateTable, Snapshot};

pub use owner::{EngineEvent, PublishedTable, TableOwner, TableReceiver};
pub use poller::poll_loop;

/// Capacité du channel d'événements vers le propriétaire
const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Récupère les trois snapshots initiaux en parallèle
///
/// CONCEPT RUST : tokio::try_join!
/// - Les trois futures avancent en même temps
/// - La première erreur annule le tout (pas de table partielle)
pub async fn fetch_initial(fetcher: &dyn SnapshotFetcher) -> Result<[Snapshot; 3], TransportError> {
    let (first, second, third) = tokio::try_join!(
        fetcher.fetch(Column::First.feed_path()),
        fetcher.fetch(Column::Second.feed_path()),
        fetcher.fetch(Column::Third.feed_path()),
    )?;
    Ok([first, second, third])
}

/// Build initial complet : fetch des trois flux puis construction de la table
#[instrument(skip(fetcher))]
pub async fn initial_build(fetcher: &dyn SnapshotFetcher) -> Result<RateTable> {
    let snapshots = fetch_initial(fetcher)
        .await
        .context("Échec de la récupération des snapshots initiaux")?;

    let table = RateTable::build(&snapshots).context("Snapshots initiaux incomplets")?;
    info!(base = %snapshots[0].base, "Initial rate table built");
    Ok(table)
}

/// Moteur : relie le fetcher, le propriétaire de la table et les pollers
pub struct RateEngine {
    fetcher: Arc<dyn SnapshotFetcher>,
    interval: Duration,
}

impl RateEngine {
    pub fn new(fetcher: Arc<dyn SnapshotFetcher>, interval: Duration) -> Self {
        Self { fetcher, interval }
    }

    /// Démarre le moteur sur le runtime tokio courant
    ///
    /// Le build initial est retenté toutes les `interval` jusqu'au succès ;
    /// rien n'est publié entre-temps (état "pas prêt"). Les trois boucles de
    /// polling ne démarrent qu'une fois la table construite.
    pub fn start(self) -> EngineHandle {
        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let (publish_tx, publish_rx) = watch::channel(None);

        let owner = tokio::spawn(TableOwner::new(publish_tx).run(events_rx));

        let Self { fetcher, interval } = self;
        let bootstrap = tokio::spawn(async move {
            let mut attempt: u32 = 0;
            let table = loop {
                attempt += 1;
                match initial_build(fetcher.as_ref()).await {
                    Ok(table) => break table,
                    Err(e) => {
                        error!(attempt, error = ?e, "Initial build failed, table not ready");
                        tokio::time::sleep(interval).await;
                    }
                }
            };

            if events_tx.send(EngineEvent::Built(table)).await.is_err() {
                return Vec::new();
            }

            Column::ALL
                .into_iter()
                .map(|column| {
                    tokio::spawn(poll_loop(
                        column,
                        fetcher.clone(),
                        interval,
                        events_tx.clone(),
                    ))
                })
                .collect()
        });

        EngineHandle {
            tables: publish_rx,
            owner,
            bootstrap,
        }
    }
}

/// Poignée sur un moteur démarré
pub struct EngineHandle {
    tables: TableReceiver,
    owner: JoinHandle<()>,
    bootstrap: JoinHandle<Vec<JoinHandle<()>>>,
}

impl EngineHandle {
    /// Nouvel abonné aux publications de la table
    pub fn subscribe(&self) -> TableReceiver {
        self.tables.clone()
    }

    /// Dernière table publiée (None tant que le build initial n'a pas réussi)
    pub fn current(&self) -> Option<PublishedTable> {
        self.tables.borrow().clone()
    }

    /// Arrête le moteur (utilisé à la sortie du programme et dans les tests)
    pub async fn shutdown(self) {
        self.bootstrap.abort();
        if let Ok(pollers) = self.bootstrap.await {
            for poller in pollers {
                poller.abort();
            }
        }
        self.owner.abort();
        let _ = self.owner.await;
        info!("Rate engine stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use async_trait::async_trait;

    use crate::models::Currency;

    struct StaticFetcher {
        responses: HashMap<&'static str, Snapshot>,
    }

    #[async_trait]
    impl SnapshotFetcher for StaticFetcher {
        async fn fetch(&self, feed_path: &str) -> Result<Snapshot, TransportError> {
            self.responses
                .get(feed_path)
                .cloned()
                .ok_or_else(|| TransportError::Status {
                    path: feed_path.to_string(),
                    status: 404,
                })
        }
    }

    fn snapshot(base: &str, rub: f64) -> Snapshot {
        Snapshot::new(
            base,
            &[(Currency::RUB, rub), (Currency::USD, 1.2), (Currency::EUR, 1.1)],
        )
    }

    #[tokio::test]
    async fn test_fetch_initial_keeps_column_order() {
        let fetcher = StaticFetcher {
            responses: HashMap::from([
                ("/first", snapshot("GBP", 90.0)),
                ("/second", snapshot("GBP", 91.0)),
                ("/third", snapshot("GBP", 89.0)),
            ]),
        };

        let [first, second, third] = fetch_initial(&fetcher).await.unwrap();
        assert_eq!(first.rate(Currency::RUB), Some(90.0));
        assert_eq!(second.rate(Currency::RUB), Some(91.0));
        assert_eq!(third.rate(Currency::RUB), Some(89.0));
    }

    #[tokio::test]
    async fn test_initial_build_all_or_nothing() {
        let fetcher = StaticFetcher {
            responses: HashMap::from([
                ("/first", snapshot("GBP", 90.0)),
                ("/third", snapshot("GBP", 89.0)),
            ]),
        };

        let err = initial_build(&fetcher).await.unwrap_err();
        let transport = err.downcast_ref::<TransportError>().unwrap();
        assert_eq!(transport.path(), "/second");
    }

    #[tokio::test]
    async fn test_initial_build_rejects_incomplete_snapshot() {
        let fetcher = StaticFetcher {
            responses: HashMap::from([
                ("/first", snapshot("GBP", 90.0)),
                ("/second", Snapshot::new("GBP", &[(Currency::RUB, 91.0)])),
                ("/third", snapshot("GBP", 89.0)),
            ]),
        };

        assert!(initial_build(&fetcher).await.is_err());
    }
}
