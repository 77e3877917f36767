// ============================================================================
// Configuration : ligne de commande + variables d'environnement
// ============================================================================
// CONCEPT RUST : clap derive
// - La structure décrit les options, clap génère le parsing et l'aide
// - `env = ...` : chaque option peut aussi venir d'une variable d'environnement
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::Parser;

use crate::api::DEFAULT_BASE_URL;

#[derive(Parser, Debug, Clone)]
#[command(name = "ratewatch", version)]
#[command(about = "Live table of RUB/USD/EUR rates polled from three upstream feeds")]
pub struct Config {
    /// URL de base de l'API des flux (sans /first, /second, /third)
    #[arg(long, env = "RATEWATCH_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Délai entre deux polls d'un même flux, en millisecondes
    #[arg(long, env = "RATEWATCH_INTERVAL_MS", default_value_t = 5000)]
    pub interval_ms: u64,

    /// Timeout d'une requête HTTP, en millisecondes
    #[arg(long, env = "RATEWATCH_TIMEOUT_MS", default_value_t = 10_000)]
    pub timeout_ms: u64,

    /// Répertoire des fichiers de logs
    #[arg(long, env = "RATEWATCH_LOG_DIR", default_value = "./logs")]
    pub log_dir: PathBuf,

    /// Pas de TUI : affiche la table sur stdout à chaque publication
    #[arg(long)]
    pub headless: bool,
}

impl Config {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Vérifie les valeurs que clap ne peut pas contrôler seul
    pub fn validate(&self) -> Result<()> {
        if self.interval_ms == 0 {
            bail!("--interval-ms doit être strictement positif");
        }
        if self.timeout_ms == 0 {
            bail!("--timeout-ms doit être strictement positif");
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            bail!("--base-url doit commencer par http:// ou https:// : {}", self.base_url);
        }
        Ok(())
    }
}
