// ============================================================================
// RateWatch - Table des taux RUB / USD / EUR en temps réel
// ============================================================================
// Programme TUI qui construit une table de taux à partir de trois flux,
// puis la garde fraîche en re-pollant chaque flux indéfiniment.
//
// Architecture :
// - Thread principal : boucle TUI (render → input), synchrone
// - Runtime tokio multi-thread : moteur (build initial, pollers, owner)
// - watch channel : le moteur publie, la TUI lit la dernière table
// ============================================================================

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info};

use ratewatch::api::HttpFetcher;
use ratewatch::app::App;
use ratewatch::config::Config;
use ratewatch::engine::{RateEngine, TableReceiver};
use ratewatch::ui::events::{is_escape_event, is_quit_event, Event, EventHandler};
use ratewatch::ui::{render, render_plain};

// ============================================================================
// Initialisation du logging
// ============================================================================
// Les println! ne fonctionnent pas une fois le TUI lancé : on log vers un
// fichier avec rotation quotidienne. En mode --headless, stdout est réservé
// à la table, les logs vont donc aussi dans le fichier.
// ============================================================================

/// Initialise le système de logging vers fichier
///
/// # Utilisation
/// ```bash
/// tail -f ./logs/ratewatch.log
/// RUST_LOG=ratewatch=trace cargo run
/// ```
fn init_logging(log_dir: &Path) -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = resolve_log_dir(log_dir)?;
    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "ratewatch.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ratewatch=debug,info".into()),
        )
        .init();

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

/// Répertoire demandé, ou repli dans le répertoire de données de l'utilisateur
fn resolve_log_dir(requested: &Path) -> Result<PathBuf> {
    if std::fs::create_dir_all(requested).is_ok() {
        return Ok(requested.to_path_buf());
    }

    let fallback = dirs::data_local_dir()
        .context("Aucun répertoire de données utilisateur disponible")?
        .join("ratewatch")
        .join("logs");
    std::fs::create_dir_all(&fallback).context("Échec de la création du répertoire de logs")?;
    Ok(fallback)
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    let config = Config::parse();
    config.validate()?;

    init_logging(&config.log_dir).unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    info!(
        base_url = %config.base_url,
        interval_ms = config.interval_ms,
        timeout_ms = config.timeout_ms,
        headless = config.headless,
        "RateWatch starting up"
    );

    // Le runtime exécute le moteur sur ses threads pendant que le thread
    // principal fait tourner la TUI
    let runtime = tokio::runtime::Runtime::new().context("Échec de la création du runtime tokio")?;

    let fetcher = HttpFetcher::new(config.base_url.clone(), config.timeout())?;
    let engine = {
        let _guard = runtime.enter();
        RateEngine::new(Arc::new(fetcher), config.interval()).start()
    };

    let result = if config.headless {
        runtime.block_on(run_headless(engine.subscribe()))
    } else {
        run_tui(&config, engine.subscribe())
    };

    runtime.block_on(engine.shutdown());

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }
    result
}

// ============================================================================
// Mode headless : table imprimée à chaque publication
// ============================================================================

async fn run_headless(mut tables: TableReceiver) -> Result<()> {
    loop {
        tokio::select! {
            changed = tables.changed() => {
                if changed.is_err() {
                    info!("Engine stopped publishing");
                    return Ok(());
                }
                let grid = tables
                    .borrow_and_update()
                    .as_ref()
                    .map(|published| (published.version, published.table.to_grid()));

                if let Some((version, grid)) = grid {
                    debug!(version, "Printing table");
                    println!("{}\n", render_plain(&grid));
                }
            }
            signal = tokio::signal::ctrl_c() => {
                signal.context("Échec de l'écoute de Ctrl-C")?;
                info!("Ctrl-C received");
                return Ok(());
            }
        }
    }
}

// ============================================================================
// Mode TUI : boucle render → input
// ============================================================================

fn run_tui(config: &Config, tables: TableReceiver) -> Result<()> {
    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    let mut app = App::new(config.base_url.clone());
    let events = EventHandler::new();

    info!("Starting event loop");
    let result = run(&mut terminal, &mut app, &events, tables);

    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;
    result
}

/// Exécute la boucle principale de l'application
///
/// À chaque itération :
/// 1. récupère la dernière table publiée (si elle a changé)
/// 2. dessine l'interface
/// 3. traite un événement clavier (ou un tick de 250 ms)
fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
    mut tables: TableReceiver,
) -> Result<()> {
    while app.is_running() {
        if tables.has_changed().unwrap_or(false) {
            let published = tables.borrow_and_update().clone();
            if app.update_table(published) {
                debug!(version = ?app.table.as_ref().map(|t| t.version), "Display refreshed");
            }
        }

        terminal.draw(|frame| render(frame, app))?;

        let event = events.next()?;
        handle_event(app, &event);
    }

    Ok(())
}

/// Traite un événement et met à jour l'état de l'application
fn handle_event(app: &mut App, event: &Event) {
    match event {
        Event::Key(_) if is_quit_event(event) => {
            if app.is_awaiting_quit_confirmation() {
                info!("User confirmed quit");
                app.quit();
            } else {
                info!("User requested quit (awaiting confirmation)");
                app.request_quit();
            }
        }
        Event::Key(_) if is_escape_event(event) && app.is_awaiting_quit_confirmation() => {
            info!("User cancelled quit");
            app.cancel_quit();
        }
        // Toute autre touche annule la confirmation en cours
        Event::Key(_) => app.cancel_quit(),
        Event::Tick => {}
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================

/// Configure le terminal en mode TUI (raw mode + alternate screen)
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.into())
}

/// Restaure le terminal à son état normal
///
/// Appelé même si la boucle a échoué, pour ne pas laisser le terminal cassé.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
