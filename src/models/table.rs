// ============================================================================
// Structure : RateTable
// ============================================================================
// La table des taux : 1 en-tête + 3 lignes absolues + 3 lignes croisées,
// chacune avec un libellé et trois cellules (une par flux).
//
//   Pair Name / Market | First | Second | Third
//   RUB/<base col. 1>  |  ...  |  ...   |  ...     <- lignes absolues
//   USD/<base col. 1>  |
//   EUR/<base col. 1>  |
//   RUB/USD            |                          <- lignes croisées
//   RUB/EUR            |
//   EUR/USD            |
//
// CONCEPT : Descripteur de ligne typé
// - Chaque ligne porte un RowKind calculé une seule fois au build
// - Le merge compare des enums, il ne re-parse jamais le libellé
// ============================================================================

use crate::error::TableError;
use crate::models::{Column, Currency, Snapshot};

/// Libellé de la première cellule de l'en-tête
pub const HEADER_LABEL: &str = "Pair Name / Market";

/// Paires croisées, dans l'ordre d'affichage
pub const CROSS_PAIRS: [(Currency, Currency); 3] = [
    (Currency::RUB, Currency::USD),
    (Currency::RUB, Currency::EUR),
    (Currency::EUR, Currency::USD),
];

/// Formate un taux avec deux décimales
///
/// `{:.2}` arrondit les égalités exactes au pair (1.125 → "1.12") ; ici,
/// comme `toFixed(2)`, elles s'arrondissent à l'opposé de zéro (→ "1.13").
/// Une égalité exacte x.xx5 n'existe en binaire que pour un nombre impair
/// de huitièmes (…125, …375, …625, …875).
pub fn format_rate(value: f64) -> String {
    let eighths = value.abs() * 8.0;
    if eighths.fract() == 0.0 && eighths % 2.0 == 1.0 {
        // eighths impair donc < 2^53 : la conversion entière est exacte
        let hundredths = (eighths as u64 * 25 + 1) / 2;
        let sign = if value.is_sign_negative() { "-" } else { "" };
        return format!("{}{}.{:02}", sign, hundredths / 100, hundredths % 100);
    }
    format!("{:.2}", value)
}

/// Un taux exploitable : fini et strictement positif
fn is_usable(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Ce que suit une ligne
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowKind {
    /// Taux d'une devise contre la base du flux de la colonne 1 (figée au build)
    Absolute { currency: Currency, base: String },

    /// Ratio entre deux devises suivies, calculé dans chaque snapshot
    Cross {
        numerator: Currency,
        denominator: Currency,
    },
}

impl RowKind {
    /// Libellé affiché (ex: "RUB/GBP", "EUR/USD")
    pub fn label(&self) -> String {
        match self {
            RowKind::Absolute { currency, base } => format!("{}/{}", currency, base),
            RowKind::Cross {
                numerator,
                denominator,
            } => format!("{}/{}", numerator, denominator),
        }
    }

    /// Devise de référence de la ligne (partie droite du libellé)
    pub fn base_token(&self) -> &str {
        match self {
            RowKind::Absolute { base, .. } => base.as_str(),
            RowKind::Cross { denominator, .. } => denominator.code(),
        }
    }

    /// Valeur brute que cette ligne lit dans un snapshot (finie, sinon None)
    fn raw_value(&self, snapshot: &Snapshot) -> Option<f64> {
        match self {
            RowKind::Absolute { currency, .. } => snapshot.rate(*currency),
            RowKind::Cross {
                numerator,
                denominator,
            } => snapshot.ratio(*numerator, *denominator),
        }
    }

    /// Valeur exploitable pour un merge : finie et strictement positive
    pub fn value_from(&self, snapshot: &Snapshot) -> Option<f64> {
        self.raw_value(snapshot).filter(|value| is_usable(*value))
    }
}

/// Une ligne de taux : descripteur + libellé + trois cellules formatées
#[derive(Debug, Clone, PartialEq)]
pub struct RateRow {
    pub kind: RowKind,
    pub label: String,
    pub cells: [String; 3],
}

impl RateRow {
    fn new(kind: RowKind, cells: [String; 3]) -> Self {
        let label = kind.label();
        Self { kind, label, cells }
    }

    pub fn cell(&self, column: Column) -> &str {
        &self.cells[column.offset()]
    }
}

/// Résultat d'un merge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Pas encore de table : rien à faire
    NotReady,

    /// Aucune ligne ne correspond au snapshot
    NoMatch,

    /// Nombre de cellules réécrites dans la colonne visée
    Updated(usize),
}

/// La table complète (l'en-tête est implicite, voir `header()`)
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    rows: Vec<RateRow>,
}

impl RateTable {
    /// Construit la table à partir des trois snapshots initiaux
    ///
    /// Les libellés absolus prennent la base du snapshot de la colonne 1 ;
    /// les ratios croisés sont calculés sur les taux bruts puis formatés.
    /// Un taux manquant ou invalide dans un des trois snapshots, ou un ratio
    /// croisé qui déborde, fait échouer la construction entière.
    pub fn build(snapshots: &[Snapshot; 3]) -> Result<Self, TableError> {
        for (column, snapshot) in Column::ALL.iter().zip(snapshots.iter()) {
            for currency in Currency::ALL {
                match snapshot.rate(currency) {
                    None => {
                        return Err(TableError::MissingRate {
                            column: *column,
                            currency,
                        })
                    }
                    Some(value) if !is_usable(value) => {
                        return Err(TableError::InvalidRate {
                            column: *column,
                            currency,
                            value,
                        })
                    }
                    Some(_) => {}
                }
            }
        }

        let base = snapshots[0].base.clone();
        let absolute = Currency::ALL.into_iter().map(|currency| RowKind::Absolute {
            currency,
            base: base.clone(),
        });
        let cross = CROSS_PAIRS
            .into_iter()
            .map(|(numerator, denominator)| RowKind::Cross {
                numerator,
                denominator,
            });

        let mut rows = Vec::with_capacity(Currency::ALL.len() + CROSS_PAIRS.len());
        for kind in absolute.chain(cross) {
            let mut cells: [String; 3] = Default::default();
            for (column, snapshot) in Column::ALL.into_iter().zip(snapshots.iter()) {
                // Taux validés plus haut : seul un ratio croisé peut encore
                // déborder. Un ratio qui s'écrase à 0 reste affiché "0.00".
                let value = kind
                    .raw_value(snapshot)
                    .ok_or_else(|| TableError::InvalidRatio {
                        column,
                        pair: kind.label(),
                    })?;
                cells[column.offset()] = format_rate(value);
            }
            rows.push(RateRow::new(kind, cells));
        }

        Ok(Self { rows })
    }

    /// Applique un snapshot fraîchement pollé sur une colonne
    ///
    /// Pour chaque ligne (absolue ou croisée) :
    /// - ignorée si sa devise de référence est la base du snapshot
    /// - ignorée si le snapshot ne permet pas de calculer sa valeur
    /// - sinon, seule la cellule `column` est réécrite
    ///
    /// Les libellés ne sont jamais recalculés.
    pub fn merge_update(&mut self, column: Column, snapshot: &Snapshot) -> MergeOutcome {
        let mut updated = 0;

        for row in &mut self.rows {
            if row.kind.base_token() == snapshot.base {
                continue;
            }
            if let Some(value) = row.kind.value_from(snapshot) {
                row.cells[column.offset()] = format_rate(value);
                updated += 1;
            }
        }

        if updated == 0 {
            MergeOutcome::NoMatch
        } else {
            MergeOutcome::Updated(updated)
        }
    }

    /// Ligne d'en-tête
    pub fn header() -> [&'static str; 4] {
        [
            HEADER_LABEL,
            Column::First.label(),
            Column::Second.label(),
            Column::Third.label(),
        ]
    }

    pub fn rows(&self) -> &[RateRow] {
        &self.rows
    }

    /// Recherche une ligne par libellé
    pub fn row(&self, label: &str) -> Option<&RateRow> {
        self.rows.iter().find(|row| row.label == label)
    }

    /// Cellule d'une ligne pour une colonne donnée
    pub fn cell(&self, label: &str, column: Column) -> Option<&str> {
        self.row(label).map(|row| row.cell(column))
    }

    /// Grille de chaînes publiée vers l'affichage (ligne 0 = en-tête)
    pub fn to_grid(&self) -> Vec<Vec<String>> {
        let header = Self::header().iter().map(|s| s.to_string()).collect();

        std::iter::once(header)
            .chain(self.rows.iter().map(|row| {
                std::iter::once(row.label.clone())
                    .chain(row.cells.iter().cloned())
                    .collect()
            }))
            .collect()
    }
}

/// Merge sur une table éventuellement absente
///
/// Table absente = NotReady, jamais une erreur.
pub fn merge_into(table: Option<&mut RateTable>, column: Column, snapshot: &Snapshot) -> MergeOutcome {
    match table {
        Some(table) => table.merge_update(column, snapshot),
        None => MergeOutcome::NotReady,
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
