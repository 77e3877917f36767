// ============================================================================
// Erreurs typées
// ============================================================================
// Deux familles :
// - TransportError : l'appel réseau ou le parsing d'un snapshot a échoué
// - TableError : les snapshots initiaux ne permettent pas de construire la table
//
// "Table absente" et "aucune ligne correspondante" ne sont pas des erreurs :
// voir MergeOutcome dans models::table.
// ============================================================================

use thiserror::Error;

use crate::models::{Column, Currency};

/// Échec lors de la récupération d'un snapshot
#[derive(Debug, Error)]
pub enum TransportError {
    /// La requête HTTP n'a pas abouti (connexion, timeout, ...)
    #[error("requête vers {path} échouée : {source}")]
    Request {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    /// Le serveur a répondu avec un statut non 2xx
    #[error("{path} a retourné HTTP {status}")]
    Status { path: String, status: u16 },

    /// Le corps de la réponse n'est pas un snapshot valide
    #[error("réponse de {path} illisible : {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl TransportError {
    /// Chemin du flux concerné
    pub fn path(&self) -> &str {
        match self {
            TransportError::Request { path, .. }
            | TransportError::Status { path, .. }
            | TransportError::Parse { path, .. } => path,
        }
    }
}

/// Échec de construction de la table initiale
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    #[error("le flux {column} ne fournit pas de taux {currency}")]
    MissingRate { column: Column, currency: Currency },

    #[error("le flux {column} fournit un taux {currency} invalide : {value}")]
    InvalidRate {
        column: Column,
        currency: Currency,
        value: f64,
    },

    #[error("le flux {column} donne un ratio {pair} hors limites")]
    InvalidRatio { column: Column, pair: String },
}
