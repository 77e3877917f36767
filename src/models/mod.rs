// ============================================================================
// Module : models
// ============================================================================
// Structures de données du moteur : devises, colonnes, snapshots et table
// ============================================================================

pub mod currency; // Devises suivies et colonnes de flux
pub mod snapshot; // Observation d'un flux
pub mod table;    // Table des taux et merge incrémental

// Re-export des structures principales pour simplifier les imports
pub use currency::{Column, Currency};
pub use snapshot::Snapshot;
pub use table::{format_rate, merge_into, MergeOutcome, RateRow, RateTable, RowKind};
