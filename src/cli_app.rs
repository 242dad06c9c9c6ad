//! Top-level CLI definition and dispatch.

use std::io;
use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell as CompletionShell, generate};
use colored::{Colorize, control};
use tracing_subscriber::EnvFilter;

use endpoint_matrix::catalog::SNAPSHOT_LOAD_ERROR_CAPTION;
use endpoint_matrix::catalog::fetch::{download_snapshot, ensure_snapshot, snapshot_timestamp};
use endpoint_matrix::catalog::store::EndpointStore;
use endpoint_matrix::core::config::Config;
use endpoint_matrix::core::errors::Result;
use endpoint_matrix::matrix::MatrixController;
use endpoint_matrix::matrix::classify::CellClass;
use endpoint_matrix::matrix::selection::SelectionStore;
use endpoint_matrix::matrix::table::{MatrixTable, contains_ci};

/// epmx — AWS service endpoints by region and IPv6 support.
#[derive(Debug, Parser)]
#[command(
    name = "epmx",
    author,
    version,
    about = "AWS service endpoints by region and IPv6 support",
    long_about = None,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Override config file path.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Force JSON output mode.
    #[arg(long, global = true)]
    json: bool,
    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
    /// Increase verbosity.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,
    /// Quiet mode (errors only).
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Print the service × region matrix.
    Show(ShowArgs),
    /// Inspect or change the persisted region selection.
    Regions(RegionsArgs),
    /// Download the endpoint snapshot into the local cache.
    Fetch(FetchArgs),
    /// Interactive dashboard.
    Dashboard,
    /// Generate shell completions.
    Completions(CompletionsArgs),
}

#[derive(Debug, Clone, Args, Default)]
struct ShowArgs {
    /// Use (and persist) this comma-separated region selection.
    #[arg(long, value_name = "REGIONS", value_delimiter = ',')]
    regions: Vec<String>,
    /// Only show services whose name contains this substring.
    #[arg(long, value_name = "TEXT")]
    filter_service: Option<String>,
    /// Include snapshot-wide IPv6 adoption stats.
    #[arg(long)]
    stats: bool,
    /// Re-download the snapshot before rendering.
    #[arg(long)]
    refresh: bool,
}

#[derive(Debug, Clone, Args)]
struct RegionsArgs {
    /// Region operation to run.
    #[command(subcommand)]
    command: RegionsCommand,
}

#[derive(Debug, Clone, Subcommand)]
enum RegionsCommand {
    /// List all known regions with their selection state.
    List,
    /// Replace the selection with the given region names.
    Select {
        /// Region names; duplicates collapse, an empty result falls back to
        /// the default seven.
        #[arg(value_name = "REGION", required = true)]
        names: Vec<String>,
    },
    /// Reset the selection to the default seven regions.
    Reset,
}

#[derive(Debug, Clone, Args, Default)]
struct FetchArgs {
    /// Override the snapshot URL for this fetch.
    #[arg(long, value_name = "URL")]
    url: Option<String>,
}

#[derive(Debug, Clone, Args)]
struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum)]
    shell: CompletionShell,
}

/// Parse-and-dispatch entry point used by `main`.
pub fn run(cli: &Cli) -> Result<()> {
    init_logging(cli);
    if cli.no_color || cli.json {
        control::set_override(false);
    }

    let config = Config::load(cli.config.as_deref())?;

    match &cli.command {
        Command::Show(args) => cmd_show(&config, args, cli.json),
        Command::Regions(args) => cmd_regions(&config, &args.command, cli.json),
        Command::Fetch(args) => cmd_fetch(&config, args, cli.json),
        Command::Dashboard => endpoint_matrix::tui::runtime::run(&config),
        Command::Completions(args) => {
            let mut command = Cli::command();
            generate(args.shell, &mut command, "epmx", &mut io::stdout());
            Ok(())
        }
    }
}

fn init_logging(cli: &Cli) {
    let default_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("endpoint_matrix={default_level},epmx={default_level}")));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Open the controller, degrading snapshot-load failures to the literal
/// caption string and a nonzero exit.
fn open_controller(config: &Config, refresh: bool) -> MatrixController {
    let loaded = (if refresh {
        download_snapshot(&config.snapshot)
    } else {
        ensure_snapshot(&config.snapshot, false)
    })
    .and_then(|path| EndpointStore::open(&path))
    .and_then(|store| {
        MatrixController::new(store, SelectionStore::new(config.selection.file.clone()))
    });

    match loaded {
        Ok(controller) => controller,
        Err(e) if e.is_snapshot_load_failure() => {
            tracing::debug!(error = %e, "snapshot load failed");
            eprintln!("{SNAPSHOT_LOAD_ERROR_CAPTION}");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("epmx: {e}");
            std::process::exit(1);
        }
    }
}

fn cmd_show(config: &Config, args: &ShowArgs, json: bool) -> Result<()> {
    let mut controller = open_controller(config, args.refresh);

    if !args.regions.is_empty() {
        controller.set_selection(args.regions.clone());
    }

    let filter = args.filter_service.as_deref().unwrap_or("");
    let stats = if args.stats || json {
        Some(controller.stats()?)
    } else {
        None
    };

    if json {
        let table = controller.table();
        let rows: Vec<_> = table
            .rows
            .iter()
            .filter(|row| contains_ci(&row.service, filter))
            .collect();
        let payload = serde_json::json!({
            "selection": controller.selection().to_vec(),
            "columns": table.columns,
            "rows": rows,
            "stats": stats,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    if let Some(timestamp) = snapshot_timestamp(&config.snapshot.cache_file) {
        println!("snapshot from {}", timestamp.format("%Y-%m-%d %H:%M"));
    }
    if let Some(stats) = stats {
        println!(
            "{} endpoints: {} {}%, {} {}%, {} {}%",
            stats.total,
            "IPv6 by default".green(),
            stats.ipv6_default_pct(),
            "opt-in".yellow(),
            stats.ipv6_dualstack_pct(),
            "IPv4 only".red(),
            stats.ipv4_only_pct(),
        );
    }
    print!("{}", render_text(controller.table(), filter));
    Ok(())
}

fn cmd_regions(config: &Config, command: &RegionsCommand, json: bool) -> Result<()> {
    let selection_store = SelectionStore::new(config.selection.file.clone());

    match command {
        RegionsCommand::List => {
            let controller = open_controller(config, false);
            if json {
                let payload: Vec<_> = controller
                    .all_regions()
                    .iter()
                    .map(|region| {
                        serde_json::json!({
                            "name": region.name,
                            "partition": region.partition,
                            "description": region.description,
                            "selected": controller.selection().contains(&region.name),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                for region in controller.all_regions() {
                    let mark = if controller.selection().contains(&region.name) {
                        "[x]".green()
                    } else {
                        "[ ]".dimmed()
                    };
                    println!("{mark} {} ({})", region.name, region.description);
                }
            }
        }
        RegionsCommand::Select { names } => {
            let selection = selection_store.set(names.clone());
            print_selection(&selection.to_vec(), json)?;
        }
        RegionsCommand::Reset => {
            let selection = selection_store.reset();
            print_selection(&selection.to_vec(), json)?;
        }
    }
    Ok(())
}

fn print_selection(names: &[String], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&names)?);
    } else {
        println!("selected: {}", names.join(", "));
    }
    Ok(())
}

fn cmd_fetch(config: &Config, args: &FetchArgs, json: bool) -> Result<()> {
    let mut snapshot_config = config.snapshot.clone();
    if let Some(url) = &args.url {
        snapshot_config.url.clone_from(url);
    }

    let path = download_snapshot(&snapshot_config)?;
    let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "path": path,
                "bytes": size,
            }))?
        );
    } else {
        println!("snapshot cached at {} ({size} bytes)", path.display());
    }
    Ok(())
}

// ──────────────────── text rendering ────────────────────

fn class_colorize(text: &str, class: CellClass) -> String {
    match class {
        CellClass::Ipv6 => text.green().to_string(),
        CellClass::Ipv6DualstackOptin => text.yellow().to_string(),
        CellClass::Ipv4 => text.red().to_string(),
        CellClass::Unavailable => text.dimmed().to_string(),
    }
}

/// Render the table as aligned text. Column order and content come straight
/// from the [`MatrixTable`] value; `filter` hides non-matching service rows.
fn render_text(table: &MatrixTable, filter: &str) -> String {
    let service_width = table
        .rows
        .iter()
        .map(|row| row.service.len())
        .chain(std::iter::once("Service".len()))
        .max()
        .unwrap_or(8);

    let column_widths: Vec<usize> = table
        .columns
        .iter()
        .map(|column| {
            column
                .region_name
                .len()
                .max(column.short_label.len())
                .max(6)
        })
        .collect();

    let mut out = String::new();

    // Header: region name, then short label underneath.
    out.push_str(&format!("{:service_width$}", "Service"));
    for (column, &width) in table.columns.iter().zip(&column_widths) {
        out.push_str(&format!("  {:width$}", column.region_name));
    }
    out.push('\n');
    out.push_str(&" ".repeat(service_width));
    for (column, &width) in table.columns.iter().zip(&column_widths) {
        out.push_str(&format!("  {:width$}", column.short_label));
    }
    out.push('\n');

    for row in &table.rows {
        if !contains_ci(&row.service, filter) {
            continue;
        }
        out.push_str(&format!("{:service_width$}", row.service));
        for (cell, &width) in row.cells.iter().zip(&column_widths) {
            let padded = format!("{:width$}", cell.text);
            out.push_str("  ");
            out.push_str(&class_colorize(&padded, cell.class));
        }
        out.push('\n');
    }

    out
}
