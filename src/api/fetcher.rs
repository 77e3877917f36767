// ============================================================================
// API Client : flux de taux de change
// ============================================================================
// Récupère un snapshot pour un flux nommé :
//   GET <base-url>/first        (snapshot initial)
//   GET <base-url>/first/poll   (polling)
//
// Pas de retry ici : la politique de reprise appartient à la boucle de
// polling du moteur, qui replanifie toujours le cycle suivant.
//
// CONCEPTS RUST :
// 1. Trait async (async-trait) : le moteur dépend du trait, pas de reqwest
// 2. Erreurs typées (thiserror) : Request / Status / Parse
// 3. #[instrument] : chaque requête a son span tracing
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use crate::error::TransportError;
use crate::models::Snapshot;

/// URL de base par défaut de l'API des flux
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api/v1";

/// Source de snapshots
///
/// CONCEPT RUST : Trait object
/// - Le moteur manipule un Arc<dyn SnapshotFetcher>
/// - En test, on branche un fetcher en mémoire sans réseau
#[async_trait]
pub trait SnapshotFetcher: Send + Sync {
    /// Récupère le snapshot du flux `feed_path` (ex: "/first/poll")
    async fn fetch(&self, feed_path: &str) -> Result<Snapshot, TransportError>;
}

/// Fetcher HTTP basé sur reqwest
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFetcher {
    /// Crée le client HTTP une seule fois pour tous les flux
    ///
    /// `timeout` borne chaque requête ; c'est le seul timeout du système.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        use anyhow::Context;

        let client = reqwest::Client::builder()
            .user_agent(concat!("ratewatch/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("Échec de la création du client HTTP")?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// URL complète d'un flux
    fn url_for(&self, feed_path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            feed_path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl SnapshotFetcher for HttpFetcher {
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn fetch(&self, feed_path: &str) -> Result<Snapshot, TransportError> {
        let url = self.url_for(feed_path);
        debug!(url = %url, "Sending snapshot request");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| TransportError::Request {
                path: feed_path.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Feed returned error status");
            return Err(TransportError::Status {
                path: feed_path.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| TransportError::Request {
                path: feed_path.to_string(),
                source,
            })?;

        let snapshot = parse_snapshot(feed_path, &body)?;
        debug!(base = %snapshot.base, rates = snapshot.rates.len(), "Snapshot received");
        Ok(snapshot)
    }
}

/// Décode le corps JSON d'une réponse de flux
pub fn parse_snapshot(feed_path: &str, body: &str) -> Result<Snapshot, TransportError> {
    serde_json::from_str(body).map_err(|source| TransportError::Parse {
        path: feed_path.to_string(),
        source,
    })
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Currency;

    #[test]
    fn test_url_for() {
        let fetcher = HttpFetcher::new("http://localhost:3000/api/v1/", Duration::from_secs(1)).unwrap();
        assert_eq!(fetcher.url_for("/first"), "http://localhost:3000/api/v1/first");
        assert_eq!(fetcher.url_for("/third/poll"), "http://localhost:3000/api/v1/third/poll");
    }

    #[test]
    fn test_parse_snapshot() {
        let body = r#"{"base":"USD","rates":{"RUB":92.1,"USD":1,"EUR":0.93},"timestamp":1,"date":"2024-01-01"}"#;
        let snapshot = parse_snapshot("/first", body).unwrap();
        assert_eq!(snapshot.base, "USD");
        assert_eq!(snapshot.rate(Currency::USD), Some(1.0));
    }

    #[test]
    fn test_parse_snapshot_rejects_garbage() {
        let err = parse_snapshot("/second/poll", "<html>502</html>").unwrap_err();
        assert!(matches!(err, TransportError::Parse { .. }));
        assert_eq!(err.path(), "/second/poll");

        // Champ obligatoire manquant
        assert!(parse_snapshot("/first", r#"{"rates":{}}"#).is_err());
    }

    // Aucun serveur n'écoute sur ce port : l'erreur doit être Request
    #[tokio::test]
    async fn test_fetch_unreachable() {
        let fetcher = HttpFetcher::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        let result = fetcher.fetch("/first").await;
        assert!(matches!(result, Err(TransportError::Request { .. })));
    }
}
