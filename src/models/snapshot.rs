// ============================================================================
// Structure : Snapshot
// ============================================================================
// Observation d'un flux à un instant donné, telle que renvoyée par l'API :
//
// { "base": "GBP", "rates": { "RUB": 90.0, "USD": 1.2, "EUR": 1.1 },
//   "timestamp": 1700000000, "date": "2023-11-14" }
//
// Les champs timestamp/date sont conservés mais jamais lus par le moteur.
// ============================================================================

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::Currency;

/// Snapshot d'un flux (immuable une fois créé)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Devise de référence du flux (ex: "USD")
    pub base: String,

    /// Taux par code devise, exprimés contre `base`
    /// Les devises non suivies sont gardées mais ignorées.
    pub rates: BTreeMap<String, f64>,

    #[serde(default)]
    pub timestamp: Option<i64>,

    #[serde(default)]
    pub date: Option<String>,
}

impl Snapshot {
    /// Crée un snapshot à partir d'une liste (devise, taux)
    pub fn new(base: impl Into<String>, rates: &[(Currency, f64)]) -> Self {
        Self {
            base: base.into(),
            rates: rates
                .iter()
                .map(|(currency, rate)| (currency.code().to_string(), *rate))
                .collect(),
            timestamp: None,
            date: None,
        }
    }

    /// Taux d'une devise suivie, s'il est présent
    pub fn rate(&self, currency: Currency) -> Option<f64> {
        self.rates.get(currency.code()).copied()
    }

    /// Ratio numerator / denominator calculé sur les taux bruts
    ///
    /// None si une des devises manque ou si le résultat n'est pas fini.
    pub fn ratio(&self, numerator: Currency, denominator: Currency) -> Option<f64> {
        let value = self.rate(numerator)? / self.rate(denominator)?;
        value.is_finite().then_some(value)
    }
}
