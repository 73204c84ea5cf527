use anyhow::Result;
use booklisting::config::{find_config_file, get_config, load_config, Config};
use booklisting::models::ResultState;
use booklisting::ui::{self, Spinner, Status};
use booklisting::utils::{Connectivity, ProbedConnectivity, StaticConnectivity, TcpProbe};
use booklisting::{GoogleBooksSource, SearchController};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// How long the reachability probe may take before the network counts as down
const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// How often the reachability probe is repeated in the background
const PROBE_INTERVAL: Duration = Duration::from_secs(10);

/// Booklisting - Search Google Books from the terminal
#[derive(Parser, Debug)]
#[command(name = "booklisting")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Search Google Books from the terminal", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short)]
    quiet: bool,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Behave as if no network were reachable
    #[arg(long, global = true, default_value_t = false)]
    offline: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Automatic based on terminal (table if TTY, JSON otherwise)
    Auto,
    /// Table format (human-readable)
    Table,
    /// JSON format (machine-readable)
    Json,
    /// Plain text format
    Plain,
}

impl OutputFormat {
    fn resolve(self) -> Self {
        match self {
            OutputFormat::Auto if ui::is_terminal() => OutputFormat::Table,
            OutputFormat::Auto => OutputFormat::Json,
            other => other,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search for books once and print the results
    #[command(alias = "s")]
    Search {
        /// Search terms (blank searches the default term)
        #[arg(num_args = 0..)]
        query: Vec<String>,
    },

    /// Search as you type: every line read from stdin replaces the query
    #[command(alias = "i")]
    Interactive,

    /// Print the effective configuration as TOML
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration from file if specified or found in default locations
    let config_path = cli.config.clone().or_else(find_config_file);
    let config = match &config_path {
        Some(path) => load_config(path)?,
        None => get_config()?,
    };

    // Initialize tracing based on verbosity
    let log_level = match cli.verbose {
        0 => config.logging.level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    let env_filter = if cli.quiet { "error" } else { log_level };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("booklisting={}", env_filter)),
        ))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Some(path) = &config_path {
        tracing::info!("Using config file: {}", path.display());
    }

    match cli.command {
        Some(Commands::Search { query }) => {
            let controller = build_controller(&config, cli.offline).await?;
            let query = query.join(" ");
            run_search(&controller, &query, cli.output.resolve(), cli.quiet).await?;
        }

        Some(Commands::Interactive) => {
            let controller = build_controller(&config, cli.offline).await?;
            run_interactive(controller, cli.output.resolve(), cli.quiet).await?;
        }

        Some(Commands::Config) => {
            print!("{}", config.to_toml()?);
        }

        None => {
            println!("Booklisting v{}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Use --help for usage information.");
            println!();
            println!("Commands:");
            println!("  search <query>   - Search for books once");
            println!("  interactive      - Search as you type, one query per line");
            println!("  config           - Show the effective configuration");
        }
    }

    Ok(())
}

async fn build_controller(config: &Config, offline: bool) -> Result<SearchController> {
    let source = GoogleBooksSource::from_config(config)?;

    let connectivity: Arc<dyn Connectivity> = if offline {
        Arc::new(StaticConnectivity::offline())
    } else {
        match TcpProbe::for_url(&config.api.base_url, PROBE_TIMEOUT) {
            Some(probe) => Arc::new(ProbedConnectivity::start(probe, PROBE_INTERVAL).await),
            None => Arc::new(StaticConnectivity::online()),
        }
    };

    Ok(SearchController::with_debounce(
        Arc::new(source),
        connectivity,
        config.search.debounce(),
    ))
}

async fn run_search(
    controller: &SearchController,
    query: &str,
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    let spinner = (format == OutputFormat::Table && !quiet && ui::is_terminal())
        .then(|| Spinner::new("Searching books..."));

    controller.submit(query);
    let state = controller.settled().await;

    if let Some(spinner) = spinner {
        spinner.finish();
    }
    if format == OutputFormat::Table && !quiet {
        ui::print_search_header(query);
    }
    render(&state, format)
}

async fn run_interactive(
    controller: SearchController,
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    if !quiet {
        ui::print_status(
            Status::Info,
            "Type a query and press Enter; each line replaces the previous search. Ctrl-D to quit.",
        );
    }

    let mut updates = controller.subscribe();
    let renderer = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let state = updates.borrow_and_update().clone();
            if state.is_loading() {
                if !quiet {
                    ui::print_status(Status::Loading, &ui::state_summary(&state));
                }
                continue;
            }
            if let Err(e) = render(&state, format) {
                tracing::warn!("Failed to render results: {}", e);
            }
        }
    });

    let (tx, rx) = mpsc::channel(32);
    let driver = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.drive(rx).await })
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => {
                    if tx.send(line).await.is_err() {
                        break;
                    }
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    drop(tx);
    driver.await?;
    renderer.abort();
    Ok(())
}

fn render(state: &ResultState, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => ui::print_state_json(state)?,
        OutputFormat::Plain => ui::print_state_plain(state),
        OutputFormat::Table | OutputFormat::Auto => ui::print_state_table(state),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::try_parse_from(["booklisting"]).unwrap();
        assert_eq!(cli.verbose, 0);
        assert!(!cli.quiet);
        assert!(!cli.offline);
        assert_eq!(cli.output, OutputFormat::Auto);
        assert!(cli.config.is_none());
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_verbose_flag() {
        let cli = Cli::try_parse_from(["booklisting", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_cli_search_command() {
        let cli = Cli::try_parse_from(["booklisting", "search", "harry", "potter"]).unwrap();
        match cli.command {
            Some(Commands::Search { query }) => assert_eq!(query.join(" "), "harry potter"),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_search_without_terms() {
        let cli = Cli::try_parse_from(["booklisting", "search"]).unwrap();
        match cli.command {
            Some(Commands::Search { query }) => assert!(query.is_empty()),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "booklisting",
            "interactive",
            "--offline",
            "--output",
            "json",
            "--config",
            "/tmp/booklisting.toml",
        ])
        .unwrap();
        assert!(matches!(cli.command, Some(Commands::Interactive)));
        assert!(cli.offline);
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/booklisting.toml")));
    }

    #[test]
    fn test_output_format_resolve_keeps_explicit() {
        assert_eq!(OutputFormat::Plain.resolve(), OutputFormat::Plain);
        assert_eq!(OutputFormat::Json.resolve(), OutputFormat::Json);
        assert_ne!(OutputFormat::Auto.resolve(), OutputFormat::Auto);
    }

    #[tokio::test]
    async fn test_offline_controller_never_loads() {
        let controller = build_controller(&Config::default(), true).await.unwrap();
        controller.submit("android");
        assert_eq!(controller.settled().await, ResultState::OfflineError);
    }
}
