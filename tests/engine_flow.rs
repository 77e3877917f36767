// ============================================================================
// Scénario complet du moteur
// ============================================================================
// Flux scriptés → build initial → pollers → propriétaire → watch
//
// Horloge tokio en pause : les intervalles de polling ne coûtent rien.
// ============================================================================

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use ratewatch::api::SnapshotFetcher;
use ratewatch::engine::{PublishedTable, RateEngine, TableReceiver};
use ratewatch::error::TransportError;
use ratewatch::models::{Column, Currency, RateTable, Snapshot};

/// Réponses scriptées par chemin de flux ; la dernière se répète indéfiniment
struct ScriptedFetcher {
    script: Mutex<HashMap<&'static str, VecDeque<Option<Snapshot>>>>,
}

impl ScriptedFetcher {
    fn new(entries: Vec<(&'static str, Vec<Option<Snapshot>>)>) -> Self {
        Self {
            script: Mutex::new(
                entries
                    .into_iter()
                    .map(|(path, responses)| (path, responses.into_iter().collect()))
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl SnapshotFetcher for ScriptedFetcher {
    async fn fetch(&self, feed_path: &str) -> Result<Snapshot, TransportError> {
        let response = {
            let mut script = self.script.lock().unwrap();
            script.get_mut(feed_path).and_then(|queue| {
                if queue.len() > 1 {
                    queue.pop_front().flatten()
                } else {
                    queue.front().cloned().flatten()
                }
            })
        };

        response.ok_or_else(|| TransportError::Status {
            path: feed_path.to_string(),
            status: 503,
        })
    }
}

fn snapshot(base: &str, rub: f64, usd: f64, eur: f64) -> Snapshot {
    Snapshot::new(
        base,
        &[(Currency::RUB, rub), (Currency::USD, usd), (Currency::EUR, eur)],
    )
}

async fn wait_for_version(tables: &mut TableReceiver, version: u64) -> PublishedTable {
    let published = tokio::time::timeout(
        Duration::from_secs(120),
        tables.wait_for(|t| t.as_ref().map_or(false, |p| p.version >= version)),
    )
    .await
    .expect("table non publiée à temps")
    .expect("moteur arrêté");

    published.clone().expect("table publiée")
}

#[tokio::test(start_paused = true)]
async fn poll_on_second_feed_only_touches_second_column() {
    let initial_snapshots = [
        snapshot("GBP", 90.0, 1.2, 1.1),
        snapshot("GBP", 91.0, 1.21, 1.11),
        snapshot("GBP", 89.0, 1.19, 1.09),
    ];
    let expected_initial = RateTable::build(&initial_snapshots).unwrap();

    let fetcher = Arc::new(ScriptedFetcher::new(vec![
        ("/first", vec![Some(initial_snapshots[0].clone())]),
        ("/second", vec![Some(initial_snapshots[1].clone())]),
        ("/third", vec![Some(initial_snapshots[2].clone())]),
        ("/second/poll", vec![Some(snapshot("GBP", 95.0, 1.25, 1.15))]),
        // Les polls des colonnes 1 et 3 échouent : ces colonnes restent telles que construites
        ("/first/poll", vec![None]),
        ("/third/poll", vec![None]),
    ]));

    let engine = RateEngine::new(fetcher, Duration::from_secs(1)).start();
    let mut tables = engine.subscribe();

    let initial = wait_for_version(&mut tables, 1).await;
    let grid = initial.table.to_grid();
    assert_eq!(grid.len(), 7);
    assert_eq!(grid[1], vec!["RUB/GBP", "90.00", "91.00", "89.00"]);

    let updated = wait_for_version(&mut tables, 2).await;
    let table = &updated.table;

    assert_eq!(table.cell("RUB/USD", Column::Second), Some("76.00"));
    assert_eq!(table.cell("RUB/EUR", Column::Second), Some("82.61"));
    assert_eq!(table.cell("EUR/USD", Column::Second), Some("0.92"));

    for (before, after) in expected_initial.rows().iter().zip(table.rows()) {
        assert_eq!(before.label, after.label);
        assert_eq!(before.cell(Column::First), after.cell(Column::First));
        assert_eq!(before.cell(Column::Third), after.cell(Column::Third));
    }

    // Même base que les libellés : les lignes absolues gardent leur valeur
    assert_eq!(table.cell("RUB/GBP", Column::Second), Some("91.00"));

    engine.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn initial_build_waits_for_all_three_feeds() {
    let fetcher = Arc::new(ScriptedFetcher::new(vec![
        ("/first", vec![Some(snapshot("USD", 92.0, 1.0, 0.93))]),
        // Le deuxième flux est indisponible pendant les deux premières tentatives
        (
            "/second",
            vec![None, None, Some(snapshot("USD", 92.5, 1.0, 0.92))],
        ),
        ("/third", vec![Some(snapshot("USD", 91.8, 1.0, 0.94))]),
    ]));

    let engine = RateEngine::new(fetcher, Duration::from_secs(2)).start();
    let mut tables = engine.subscribe();

    // Rien n'est publié tant que le triplet est incomplet
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(engine.current().is_none());

    let published = wait_for_version(&mut tables, 1).await;
    assert_eq!(published.version, 1);
    assert_eq!(published.table.cell("RUB/USD", Column::Second), Some("92.50"));
    assert!(published.table.row("EUR/USD").is_some());

    engine.shutdown().await;
}
