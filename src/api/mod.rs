// ============================================================================
// Module : api
// ============================================================================
// Client des flux de taux (HTTP) et trait d'abstraction utilisé par le moteur
// ============================================================================

pub mod fetcher; // Snapshot fetcher HTTP

// Re-export des éléments principaux
pub use fetcher::{parse_snapshot, HttpFetcher, SnapshotFetcher, DEFAULT_BASE_URL};
