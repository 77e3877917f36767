// ============================================================================
// Mise en évidence du minimum par ligne
// ============================================================================
// Pour chaque ligne, la ou les cellules de flux égales au minimum numérique
// de la ligne sont marquées. Les égalités marquent toutes les cellules
// concernées ; une cellule non numérique n'est jamais marquée.
// ============================================================================

/// Drapeaux "minimum" pour les cellules de flux d'une ligne
///
/// `cells` ne contient que les cellules de flux (sans le libellé).
pub fn min_flags(cells: &[String]) -> Vec<bool> {
    let values: Vec<Option<f64>> = cells
        .iter()
        .map(|cell| cell.trim().parse::<f64>().ok().filter(|v| v.is_finite()))
        .collect();

    let min = values.iter().flatten().copied().fold(None, |acc: Option<f64>, v| {
        Some(acc.map_or(v, |m| m.min(v)))
    });

    values
        .iter()
        .map(|value| matches!((value, min), (Some(v), Some(m)) if *v == m))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_single_minimum() {
        assert_eq!(min_flags(&cells(&["90.00", "89.00", "91.00"])), vec![false, true, false]);
    }

    #[test]
    fn test_ties_mark_all() {
        assert_eq!(min_flags(&cells(&["0.92", "0.92", "0.95"])), vec![true, true, false]);
    }

    #[test]
    fn test_numeric_not_textual_comparison() {
        // "9.00" < "10.00" numériquement, pas lexicalement
        assert_eq!(min_flags(&cells(&["10.00", "9.00", "11.00"])), vec![false, true, false]);
    }

    #[test]
    fn test_unparsable_cells_ignored() {
        assert_eq!(min_flags(&cells(&["", "1.50", "n/a"])), vec![false, true, false]);
        assert_eq!(min_flags(&cells(&["", "", ""])), vec![false, false, false]);
    }
}
