// ============================================================================
// Dashboard - Rendu de l'interface principale
// ============================================================================
// Dessine la table des taux avec les widgets de ratatui
//
// CONCEPTS RATATUI :
// 1. Frame : surface de dessin
// 2. Widgets : Block, Paragraph, Table
// 3. Layout : découpage de l'espace en zones
// 4. Style : couleurs et attributs de texte
// ============================================================================

use chrono::Local;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::app::App;
use crate::ui::highlight::min_flags;

/// Dessine l'interface complète
///
/// # Arguments
/// * `frame` - Surface de dessin ratatui
/// * `app` - État de l'application
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = create_layout(frame.size());

    render_header(frame, app, chunks[0]);
    render_main_content(frame, app, chunks[1]);
    render_footer(frame, app, chunks[2]);
}

/// Crée le layout principal (header, content, footer)
fn create_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header : 3 lignes
            Constraint::Min(0),    // Content : tout le reste
            Constraint::Length(3), // Footer : 3 lignes
        ])
        .split(area)
        .to_vec()
}

// ============================================================================
// Header : titre, source et fraîcheur de la table
// ============================================================================

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" RateWatch ")
        .title_alignment(Alignment::Center);

    let freshness = match &app.table {
        Some(published) => Span::styled(
            format!(
                "mis à jour {} (v{})",
                published.published_at.with_timezone(&Local).format("%H:%M:%S"),
                published.version
            ),
            Style::default().fg(Color::Green),
        ),
        None => Span::styled("en attente des flux…", Style::default().fg(Color::Yellow)),
    };

    let text = Line::from(vec![
        Span::styled(app.source.as_str(), Style::default().fg(Color::Gray)),
        Span::raw("  ·  "),
        freshness,
    ]);

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Main Content : la table des taux
// ============================================================================

/// Dessine la table, minimum de chaque ligne en surbrillance
///
/// CONCEPT RATATUI : Table widget
/// - Row::new(cells) pour chaque ligne, header séparé
/// - Les largeurs sont données par des Constraint
fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Taux de change ");

    let Some(published) = &app.table else {
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "Table pas encore disponible : les trois flux doivent répondre",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center);

        frame.render_widget(paragraph, area);
        return;
    };

    let grid = published.table.to_grid();
    let Some((header, rows)) = grid.split_first() else {
        return;
    };

    let header_row = Row::new(header.iter().map(|cell| Cell::from(cell.as_str())))
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .bottom_margin(1);

    let body: Vec<Row> = rows
        .iter()
        .map(|row| {
            let flags = min_flags(row.get(1..).unwrap_or_default());

            let cells = row.iter().enumerate().map(|(i, cell)| {
                let is_min = i > 0 && flags.get(i - 1).copied().unwrap_or(false);
                let style = if i == 0 {
                    Style::default().add_modifier(Modifier::BOLD)
                } else if is_min {
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Green)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                Cell::from(cell.as_str()).style(style)
            });

            Row::new(cells)
        })
        .collect();

    let widths = [
        Constraint::Length(20),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Length(12),
    ];

    let table = Table::new(body, widths)
        .header(header_row)
        .block(block)
        .column_spacing(2);

    frame.render_widget(table, area);
}

// ============================================================================
// Footer : Instructions
// ============================================================================

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let shortcuts = if app.is_awaiting_quit_confirmation() {
        Line::from(vec![
            Span::styled(
                "⚠  Appuyez sur ",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "[q]",
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
            Span::styled(
                " à nouveau pour quitter, ou n'importe quelle autre touche pour annuler ⚠",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ])
    } else {
        Line::from(vec![
            Span::styled("[q]", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::raw(" Quit  "),
            Span::styled("■", Style::default().fg(Color::Green)),
            Span::raw(" Minimum de la ligne"),
        ])
    };

    let paragraph = Paragraph::new(vec![shortcuts])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::PublishedTable;
    use crate::models::{Currency, RateTable, Snapshot};
    use chrono::Utc;
    use ratatui::{backend::TestBackend, Terminal};

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer.content.iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_render_waiting_state() {
        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        let app = App::new("http://localhost:3000/api/v1");

        terminal.draw(|frame| render(frame, &app)).unwrap();
        assert!(buffer_text(&terminal).contains("Table pas encore disponible"));
    }

    #[test]
    fn test_render_table() {
        let snapshot = Snapshot::new(
            "GBP",
            &[(Currency::RUB, 90.0), (Currency::USD, 1.2), (Currency::EUR, 1.1)],
        );
        let mut app = App::new("http://localhost:3000/api/v1");
        app.update_table(Some(PublishedTable {
            version: 1,
            table: RateTable::build(&[snapshot.clone(), snapshot.clone(), snapshot]).unwrap(),
            published_at: Utc::now(),
        }));

        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal.draw(|frame| render(frame, &app)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Pair Name / Market"));
        assert!(text.contains("RUB/GBP"));
        assert!(text.contains("75.00"));
    }
}
