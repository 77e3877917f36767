// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état de l'interface TUI
//
// CONCEPTS RUST :
// 1. State Management : centraliser l'état dans une seule structure
// 2. Mutabilité contrôlée : &mut self pour modifier l'état
//
// L'App ne possède PAS la table des taux : elle garde la dernière copie
// publiée par le moteur, en lecture seule.
// ============================================================================

use crate::engine::PublishedTable;

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Indique si l'utilisateur a demandé à quitter (attend confirmation)
    /// CONCEPT : Two-step quit pour éviter les sorties accidentelles
    /// - Première pression de 'q' : confirm_quit = true
    /// - Deuxième pression de 'q' : running = false (quit réel)
    /// - N'importe quelle autre touche : confirm_quit = false (annulation)
    pub confirm_quit: bool,

    /// Dernière table reçue du moteur (None = flux pas encore prêts)
    pub table: Option<PublishedTable>,

    /// URL de base des flux, affichée dans l'en-tête
    pub source: String,
}

impl App {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            running: true,
            confirm_quit: false,
            table: None,
            source: source.into(),
        }
    }

    /// Quitte l'application
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Vérifie si l'application doit continuer
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Remplace la table affichée par une publication plus récente
    ///
    /// Retourne true si la table a effectivement changé. Une version plus
    /// ancienne ou identique est ignorée.
    pub fn update_table(&mut self, published: Option<PublishedTable>) -> bool {
        let Some(published) = published else {
            return false;
        };

        let newer = self
            .table
            .as_ref()
            .map_or(true, |current| published.version > current.version);

        if newer {
            self.table = Some(published);
        }
        newer
    }

    /// La table a-t-elle déjà été construite ?
    pub fn is_ready(&self) -> bool {
        self.table.is_some()
    }

    /// Demande la confirmation de quitter
    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    /// Annule la demande de quit
    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    /// Vérifie si on attend la confirmation de quit
    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
