// ============================================================================
// Rendu texte de la table (mode --headless)
// ============================================================================
// Colonnes alignées, minimum de chaque ligne suffixé par '*' :
//
//   Pair Name / Market  First   Second  Third
//   RUB/GBP             90.00   91.00   89.00*
// ============================================================================

use crate::ui::highlight::min_flags;

/// Rend la grille (ligne 0 = en-tête) en texte aligné
pub fn render_plain(grid: &[Vec<String>]) -> String {
    let Some((header, rows)) = grid.split_first() else {
        return String::new();
    };

    // Chaque ligne devient une liste de cellules déjà marquées
    let marked: Vec<Vec<String>> = std::iter::once(header.clone())
        .chain(rows.iter().map(|row| {
            let flags = min_flags(row.get(1..).unwrap_or_default());
            row.iter()
                .enumerate()
                .map(|(i, cell)| {
                    if i > 0 && flags.get(i - 1).copied().unwrap_or(false) {
                        format!("{}*", cell)
                    } else {
                        cell.clone()
                    }
                })
                .collect()
        }))
        .collect();

    let columns = marked.iter().map(Vec::len).max().unwrap_or(0);
    let widths: Vec<usize> = (0..columns)
        .map(|c| {
            marked
                .iter()
                .filter_map(|row| row.get(c))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    marked
        .iter()
        .map(|row| {
            row.iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{:<width$}", cell, width = width))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
