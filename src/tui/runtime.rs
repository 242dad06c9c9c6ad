//! Dashboard runtime: terminal lifecycle, event loop, command execution.
//!
//! The runtime is the only place where update-function commands touch the
//! outside world. Selection commands run synchronously to completion inside
//! the handler — normalize, persist, rebuild, feed the result back — so no
//! two rebuilds can ever interleave and the stored selection is always
//! written before the new table is read.

use std::io;
use std::panic;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::catalog::fetch::{ensure_snapshot, snapshot_timestamp};
use crate::catalog::store::EndpointStore;
use crate::catalog::SNAPSHOT_LOAD_ERROR_CAPTION;
use crate::core::config::Config;
use crate::core::errors::{EpmxError, Result};
use crate::matrix::MatrixController;
use crate::matrix::selection::SelectionStore;
use crate::matrix::tooltip::TooltipCache;

use super::model::{MatrixCmd, MatrixModel, MatrixMsg};
use super::render;
use super::update::update;

/// How long one poll waits before the loop re-draws.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// RAII guard for raw mode and the alternate screen.
///
/// A panic hook restores the terminal before the panic message prints, so
/// backtraces stay readable.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;

        let prev = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            restore_terminal_best_effort();
            prev(info);
        }));

        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore_terminal_best_effort();
        let _ = panic::take_hook();
    }
}

fn restore_terminal_best_effort() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

fn term_err(e: io::Error) -> EpmxError {
    EpmxError::Runtime {
        details: format!("terminal: {e}"),
    }
}

/// Load the snapshot and build the controller plus its initial model.
///
/// Load-boundary failures degrade to a model carrying the caption string;
/// anything else propagates.
fn load(config: &Config) -> Result<(Option<MatrixController>, MatrixModel)> {
    let loaded = ensure_snapshot(&config.snapshot, false)
        .and_then(|path| EndpointStore::open(&path))
        .and_then(|store| {
            let selection_store = SelectionStore::new(config.selection.file.clone());
            MatrixController::new(store, selection_store)
        });

    match loaded {
        Ok(controller) => {
            let caption = caption_for(config, &controller);
            let stats = match controller.stats() {
                Ok(stats) => Some(stats),
                Err(e) => {
                    tracing::warn!(error = %e, "snapshot stats query failed");
                    None
                }
            };
            let model = MatrixModel::new(
                caption,
                stats,
                controller.all_regions(),
                controller.selection(),
                controller.table().clone(),
            );
            Ok((Some(controller), model))
        }
        Err(e) if e.is_snapshot_load_failure() => {
            tracing::warn!(error = %e, "snapshot unavailable, entering degraded mode");
            Ok((
                None,
                MatrixModel::degraded(SNAPSHOT_LOAD_ERROR_CAPTION.to_string()),
            ))
        }
        Err(e) => Err(e),
    }
}

fn caption_for(config: &Config, controller: &MatrixController) -> String {
    let age = snapshot_timestamp(&config.snapshot.cache_file)
        .map_or_else(String::new, |ts| format!(" — snapshot {}", ts.format("%Y-%m-%d")));
    format!(
        "{} services × {} regions selected{age}",
        controller.services().len(),
        controller.selection().len(),
    )
}

/// Run the dashboard until the user quits.
pub fn run(config: &Config) -> Result<()> {
    let (mut controller, mut model) = load(config)?;
    let mut tooltips = TooltipCache::new(config.tooltip.clone());

    let _guard = TerminalGuard::enter().map_err(term_err)?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend).map_err(term_err)?;

    loop {
        terminal
            .draw(|frame| render::render(frame, &model))
            .map_err(term_err)?;

        if !event::poll(POLL_INTERVAL).map_err(term_err)? {
            continue;
        }
        match event::read().map_err(term_err)? {
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                let cmd = update(&mut model, MatrixMsg::Key(key));
                if execute_cmd(cmd, &mut model, controller.as_mut(), &mut tooltips) {
                    break;
                }
            }
            // Resize redraws on the next loop iteration; everything else
            // is ignored.
            _ => {}
        }
    }

    Ok(())
}

/// Execute a command from the update function. Returns true to quit.
fn execute_cmd(
    cmd: MatrixCmd,
    model: &mut MatrixModel,
    controller: Option<&mut MatrixController>,
    tooltips: &mut TooltipCache,
) -> bool {
    match cmd {
        MatrixCmd::None => false,
        MatrixCmd::Quit => true,

        MatrixCmd::ApplySelection(names) => {
            if let Some(controller) = controller {
                controller.set_selection(names);
                let msg = MatrixMsg::SelectionApplied {
                    selection: controller.selection().to_vec(),
                    table: controller.table().clone(),
                };
                let follow_up = update(model, msg);
                debug_assert_eq!(follow_up, MatrixCmd::None);
            }
            false
        }

        MatrixCmd::FetchTooltip(service) => {
            let body = tooltips.fetch(&service);
            let follow_up = update(model, MatrixMsg::TooltipLoaded { service, body });
            debug_assert_eq!(follow_up, MatrixCmd::None);
            false
        }
    }
}
