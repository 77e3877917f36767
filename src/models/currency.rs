// ============================================================================
// Devises suivies et colonnes de flux
// ============================================================================
// Deux petits enums qui remplacent les chaînes magiques :
// - Currency : l'ensemble fixe des devises affichées (RUB, USD, EUR)
// - Column : la position d'un flux dans la table (First, Second, Third)
//
// CONCEPT RUST : Enums Copy
// - Pas d'allocation, comparaisons gratuites
// - Le compilateur vérifie l'exhaustivité des match
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Devise suivie par la table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Currency {
    RUB,
    USD,
    EUR,
}

impl Currency {
    /// Ordre des lignes absolues dans la table
    pub const ALL: [Currency; 3] = [Currency::RUB, Currency::USD, Currency::EUR];

    /// Code ISO tel qu'il apparaît dans les réponses des flux
    pub fn code(&self) -> &'static str {
        match self {
            Currency::RUB => "RUB",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RUB" => Ok(Currency::RUB),
            "USD" => Ok(Currency::USD),
            "EUR" => Ok(Currency::EUR),
            other => Err(format!("devise non suivie : {}", other)),
        }
    }
}

/// Colonne de la table = un flux amont
///
/// L'attribution se fait par position, jamais par le nom du flux :
/// First est toujours la cellule 1, Second la 2, Third la 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    First,
    Second,
    Third,
}

impl Column {
    pub const ALL: [Column; 3] = [Column::First, Column::Second, Column::Third];

    /// Position 1-based de la cellule dans une ligne (0 = libellé)
    pub fn index(&self) -> usize {
        match self {
            Column::First => 1,
            Column::Second => 2,
            Column::Third => 3,
        }
    }

    /// Libellé affiché dans l'en-tête
    pub fn label(&self) -> &'static str {
        match self {
            Column::First => "First",
            Column::Second => "Second",
            Column::Third => "Third",
        }
    }

    /// Chemin du snapshot initial
    pub fn feed_path(&self) -> &'static str {
        match self {
            Column::First => "/first",
            Column::Second => "/second",
            Column::Third => "/third",
        }
    }

    /// Chemin utilisé par la boucle de polling
    pub fn poll_path(&self) -> &'static str {
        match self {
            Column::First => "/first/poll",
            Column::Second => "/second/poll",
            Column::Third => "/third/poll",
        }
    }

    /// Position 0-based dans un tableau de trois cellules
    pub(crate) fn offset(&self) -> usize {
        self.index() - 1
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
