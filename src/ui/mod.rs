// ============================================================================
// Module : ui
// ============================================================================
// Gère l'affichage de la table des taux (TUI ratatui ou texte brut)
// ============================================================================

pub mod events;    // Gestion des événements clavier
pub mod dashboard; // Rendu de l'interface principale
pub mod highlight; // Minimum par ligne
pub mod plain;     // Rendu texte pour --headless

// Re-exports pour simplifier les imports
pub use dashboard::render;
pub use events::{Event, EventHandler};
pub use plain::render_plain;
