// ============================================================================
// Propriétaire de la table (single writer)
// ============================================================================
// Une seule tâche possède la RateTable. Le build initial et les boucles de
// polling lui envoient des EngineEvent par un channel mpsc ; elle applique
// chaque événement dans l'ordre d'arrivée puis publie une copie de la table
// sur un channel watch.
//
// CONCEPT : Message passing plutôt que Arc<Mutex<Table>>
// - Un seul &mut sur la table, jamais de lost update
// - L'affichage ne reçoit que des copies en lecture seule
// ============================================================================

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::models::{merge_into, Column, MergeOutcome, RateTable, Snapshot};

/// Événements reçus par le propriétaire de la table
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// Table initiale construite à partir des trois snapshots
    Built(RateTable),

    /// Snapshot fraîchement pollé pour une colonne
    Polled { column: Column, snapshot: Snapshot },
}

/// Table publiée vers l'affichage
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedTable {
    /// Incrémentée à chaque publication (1 = build initial)
    pub version: u64,
    pub table: RateTable,
    pub published_at: DateTime<Utc>,
}

/// Channel de publication : None tant que la table n'existe pas
pub type TableReceiver = watch::Receiver<Option<PublishedTable>>;

/// La tâche qui possède la table
pub struct TableOwner {
    table: Option<RateTable>,
    version: u64,
    publisher: watch::Sender<Option<PublishedTable>>,
}

impl TableOwner {
    pub fn new(publisher: watch::Sender<Option<PublishedTable>>) -> Self {
        Self {
            table: None,
            version: 0,
            publisher,
        }
    }

    /// Applique un événement sur la table et publie si elle a changé
    pub fn handle(&mut self, event: EngineEvent) -> MergeOutcome {
        match event {
            EngineEvent::Built(table) => {
                if self.table.is_some() {
                    warn!("Table already built, ignoring second build");
                    return MergeOutcome::NoMatch;
                }
                info!(rows = table.rows().len(), "Rate table built");
                self.table = Some(table);
                self.publish();
                MergeOutcome::Updated(self.table.as_ref().map_or(0, |t| t.rows().len()))
            }
            EngineEvent::Polled { column, snapshot } => {
                let outcome = merge_into(self.table.as_mut(), column, &snapshot);
                match outcome {
                    MergeOutcome::Updated(cells) => {
                        debug!(column = %column, base = %snapshot.base, cells, "Merged poll snapshot");
                        self.publish();
                    }
                    MergeOutcome::NoMatch => {
                        debug!(column = %column, base = %snapshot.base, "Poll snapshot matched no row");
                    }
                    MergeOutcome::NotReady => {
                        debug!(column = %column, "Table not ready, poll snapshot dropped");
                    }
                }
                outcome
            }
        }
    }

    /// Boucle principale : consomme les événements jusqu'à fermeture du channel
    pub async fn run(mut self, mut events: mpsc::Receiver<EngineEvent>) {
        info!("Table owner started");
        while let Some(event) = events.recv().await {
            self.handle(event);
        }
        info!(version = self.version, "All producers dropped, table owner exiting");
    }

    pub fn table(&self) -> Option<&RateTable> {
        self.table.as_ref()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    fn publish(&mut self) {
        let Some(table) = &self.table else {
            return;
        };

        self.version += 1;
        // send_replace : publie même si aucun récepteur n'est abonné
        self.publisher.send_replace(Some(PublishedTable {
            version: self.version,
            table: table.clone(),
            published_at: Utc::now(),
        }));
        debug!(version = self.version, "Table published");
    }
}
