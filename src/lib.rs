// ============================================================================
// RateWatch - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests d'intégration
// ============================================================================

pub mod api;    // Client des flux de taux
pub mod app;    // État de l'application TUI
pub mod config; // Options de ligne de commande
pub mod engine; // Build initial, merge et boucles de polling
pub mod error;  // Erreurs typées
pub mod models; // Structures de données
pub mod ui;     // Interface utilisateur
