//! finboard CLI
//!
//! Drives the dashboard against a running analytics backend:
//! - Render the page to HTML
//! - Export the current data
//! - Print the dashboard or one chart
//! - Watch mode with keyboard shortcuts read from stdin

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use finboard::config::LoggingConfig;
use finboard::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "finboard")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Finance analytics dashboard client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search the standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend URL, overrides the config
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Directory for exports, reports and rendered pages
    #[arg(short, long, global = true)]
    pub output_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load the dashboard and write it as an HTML page
    Render {
        /// Page file (default: <output-dir>/finance_dashboard.html)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Load the dashboard and export its data
    Export {
        #[arg(short, long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
    },

    /// Load the dashboard and print it
    Print {
        /// Print only this chart container (e.g. expensePieChart)
        #[arg(long)]
        chart: Option<String>,
    },

    /// Keep the dashboard open and react to commands on stdin
    ///
    /// Accepts shortcut combos (ctrl+r, ctrl+p, ctrl+s), `resize`,
    /// `theme` and `quit`.
    Watch {
        /// Enable the periodic update check
        #[arg(long)]
        interval_minutes: Option<u64>,
    },

    /// Show or change the saved theme
    Theme {
        #[arg(value_enum, default_value_t = ThemeAction::Show)]
        action: ThemeAction,
    },

    /// Print a default config file
    Config {
        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ThemeAction {
    Show,
    Toggle,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::load_default(),
    };
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }
    if let Some(dir) = &cli.output_dir {
        config.output.dir = dir.to_string_lossy().to_string();
    }

    init_tracing(&config.logging);
    shell::install_panic_hook();
    tracing::debug!("finboard v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("Wrote {}", path.display());
                }
                None => print!("{}", content),
            }
        }

        Commands::Theme { action } => {
            let store = FileStore::new(FileStore::default_path());
            let theme = match action {
                ThemeAction::Show => theme::load_theme(&store),
                ThemeAction::Toggle => {
                    let next = theme::load_theme(&store).toggled();
                    theme::save_theme(&store, next)?;
                    next
                }
            };
            println!("{}", theme);
        }

        Commands::Render { output } => {
            let app = App::build(&config)?;
            let report = app.shell.start().await;
            print_report(&report);

            let path = output.unwrap_or_else(|| app.page_path());
            app.write_page(&path)?;
            println!("Dashboard written to {}", path.display());
        }

        Commands::Export { format } => {
            let app = App::build(&config)?;
            app.shell.start().await;

            match app.shell.export_dashboard_data(format).await? {
                Some(receipt) => println!("Exported to {}", receipt.location.display()),
                None => eprintln!("{}", shell::NO_EXPORT_DATA),
            }
        }

        Commands::Print { chart } => {
            let app = App::build(&config)?;
            app.shell.start().await;

            match chart {
                Some(id) => match app.shell.print_chart(&id).await? {
                    Some(path) => println!("Chart report written to {}", path.display()),
                    None => eprintln!("No chart container named {}", id),
                },
                None => {
                    let path = app.shell.print_dashboard().await?;
                    println!("Dashboard report written to {}", path.display());
                }
            }
        }

        Commands::Watch { interval_minutes } => {
            let app = App::build(&config)?;
            watch(&app, interval_minutes, &config).await?;
        }
    }

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("finboard={}", logging.level).into());
    let json = logging.format.eq_ignore_ascii_case("json");

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
        }))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();
}

/// Shell wired to the real backend, a page document and the output directory
struct App {
    shell: Arc<DashboardShell>,
    document: Arc<Document>,
    output_dir: PathBuf,
}

impl App {
    fn build(config: &Config) -> Result<Self> {
        let output_dir = config.output.dir_path();
        let document = Arc::new(Document::finance_dashboard(&default_slots()));
        let sink = Arc::new(DirectorySink::new(&output_dir));
        let api = HttpDashboardApi::new(&config.api).context("creating HTTP client")?;
        tracing::info!(backend = %api.base_url(), "Using dashboard backend");

        let shell = DashboardShell::new(
            ShellPorts {
                api: Arc::new(api),
                renderer: Arc::new(PlotlyHtmlRenderer::new()),
                surface: document.clone(),
                downloads: sink.clone(),
                printer: sink,
                store: Arc::new(FileStore::new(FileStore::default_path())),
            },
            default_slots(),
            ShellSettings::from(&config.dashboard),
        );

        Ok(Self {
            shell: Arc::new(shell),
            document,
            output_dir,
        })
    }

    fn page_path(&self) -> PathBuf {
        self.output_dir.join("finance_dashboard.html")
    }

    fn write_page(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.document.to_html())
            .with_context(|| format!("writing {}", path.display()))
    }
}

fn print_report(report: &DashboardReport) {
    for (container_id, outcome) in &report.charts.outcomes {
        let status = match outcome {
            LoadOutcome::Rendered => "ok".to_string(),
            LoadOutcome::Failed(e) => format!("failed: {}", e),
            LoadOutcome::Superseded => "superseded".to_string(),
        };
        println!("  {:<24} {}", container_id, status);
    }
    println!("  {:<24} {:?}", "insights", report.insights);
}

async fn watch(app: &App, interval_minutes: Option<u64>, config: &Config) -> Result<()> {
    let report = app.shell.start().await;
    print_report(&report);
    let page = app.page_path();
    app.write_page(&page)?;
    println!("Watching; page at {}", page.display());

    let minutes = interval_minutes.or(config
        .dashboard
        .real_time_updates
        .then_some(config.dashboard.update_interval_minutes));
    let _updates = minutes.map(|m| app.shell.enable_real_time_updates(m));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break;
            }
        };
        let Some(line) = line else { break };
        let command = line.trim();

        match command {
            "" => continue,
            "quit" | "exit" => break,
            "resize" => app.shell.viewport_changed(),
            "theme" => {
                let theme = app.shell.toggle_theme()?;
                println!("Theme: {}", theme);
            }
            combo => match combo.parse::<KeyEvent>() {
                Ok(event) => {
                    let outcome = app.shell.handle_key(&event).await;
                    if outcome.action.is_none() {
                        println!("No shortcut for {}", combo);
                    }
                }
                Err(e) => println!("{}", e),
            },
        }
        app.write_page(&page)?;
    }

    Ok(())
}
