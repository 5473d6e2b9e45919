use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use miette::{IntoDiagnostic, Result};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use pulse_core::{OutputFormat, PulseConfig, PulseError, SortKey};
use pulse_data::loader::{RawTable, PERFORMANCE_COLUMNS, TOP_POST_COLUMNS};
use pulse_report::dashboard::DashboardOptions;
use pulse_report::{generate_report, load_dashboard, ReportRequest};

#[derive(Parser)]
#[command(
    name = "pulse",
    version,
    about = "Social media performance dashboard and PDF report",
    long_about = "Pulseboard turns weekly social media CSV exports into a dashboard and a report.\n\n\
                   Reads per-platform weekly metrics and a top-posts export, aggregates all-time\n\
                   and weekly totals, compares the latest week with the one before, and ranks\n\
                   the latest week's posts.\n\n\
                   Examples:\n  \
                     pulse dashboard                     Print the dashboard\n  \
                     pulse dashboard --sort-by engagement --top 3\n  \
                     pulse report                        Write reports/summary_report.pdf and .html\n  \
                     pulse preview data/input/top5.csv   Show the first rows of a CSV\n  \
                     pulse doctor                        Check inputs and configuration"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (default: .pulse.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "text",
        long_help = "Output format for command results.\n\n\
                       Formats:\n  \
                         text      Human-readable tables and summaries (default)\n  \
                         json      Machine-readable JSON with camelCase keys\n  \
                         markdown  GitHub-flavored Markdown"
    )]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    verbose: bool,

    /// When to use colors
    #[arg(long, global = true, default_value = "auto")]
    color: ColorChoice,
}

#[derive(Subcommand)]
enum Command {
    /// Print the performance dashboard
    #[command(long_about = "Print the performance dashboard.\n\n\
        Shows all-time totals, the latest week against the week before (overall and\n\
        per platform), the per-platform breakdown, and the latest week's top posts.\n\n\
        Examples:\n  pulse dashboard\n  pulse dashboard --format json\n  pulse dashboard --top 3 --sort-by engagement")]
    Dashboard {
        /// Weekly metrics CSV (default: from config)
        #[arg(long)]
        social: Option<PathBuf>,

        /// Top posts CSV (default: from config)
        #[arg(long)]
        top_posts: Option<PathBuf>,

        /// Number of top posts to show (default: 5)
        #[arg(long)]
        top: Option<usize>,

        /// Rank top posts by views or engagement (default: views)
        #[arg(long)]
        sort_by: Option<SortKey>,
    },
    /// Write the PDF report and its HTML copy
    #[command(long_about = "Write the PDF report and its HTML copy.\n\n\
        The HTML document lands next to the PDF with an .html extension and embeds\n\
        any chart images found in the charts directory.\n\n\
        Examples:\n  pulse report\n  pulse report --output out/weekly.pdf --no-html")]
    Report {
        /// Weekly metrics CSV (default: from config)
        #[arg(long)]
        social: Option<PathBuf>,

        /// Top posts CSV (default: from config)
        #[arg(long)]
        top_posts: Option<PathBuf>,

        /// PDF output path (default: reports/summary_report.pdf)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Directory with pre-rendered chart images (default: reports/charts)
        #[arg(long)]
        charts_dir: Option<PathBuf>,

        /// Skip the HTML copy
        #[arg(long)]
        no_html: bool,
    },
    /// Show the header and first rows of a CSV file
    #[command(long_about = "Show the header and first rows of a CSV file.\n\n\
        Works on any delimited file, using the delimiter from the configuration.\n\n\
        Example:\n  pulse preview data/input/socialmedia.csv --rows 10")]
    Preview {
        /// File to preview
        path: PathBuf,

        /// Number of rows to show (default: 5)
        #[arg(long, default_value = "5")]
        rows: usize,
    },
    /// Create a default .pulse.toml configuration file
    #[command(long_about = "Create a default .pulse.toml configuration file.\n\n\
        Generates a commented-out template with all available options.\n\
        Fails if .pulse.toml already exists.")]
    Init,
    /// Check your Pulseboard setup and input files
    #[command(long_about = "Check your Pulseboard setup and input files.\n\n\
        Runs diagnostics for the config file, both input files and their required\n\
        columns, and the charts directory. Use --format json for machine-readable output.")]
    Doctor,
    /// Generate shell completion scripts
    #[command(hide = true)]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Clone, PartialEq, Eq, ValueEnum)]
enum ColorChoice {
    /// Auto-detect based on terminal
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

fn print_welcome(use_color: bool) {
    let version = env!("CARGO_PKG_VERSION");

    if use_color {
        println!("\x1b[1m\x1b[33m▲\x1b[0m \x1b[1mpulse\x1b[0m v{version}: weekly social media performance at a glance\n");

        println!("Quick start:");
        println!("  \x1b[36mpulse init\x1b[0m         Create a .pulse.toml config file");
        println!("  \x1b[36mpulse dashboard\x1b[0m    Print the dashboard");
        println!("  \x1b[36mpulse report\x1b[0m       Write the PDF and HTML report\n");

        println!("All commands:");
        println!("  \x1b[32mdashboard\x1b[0m  All-time totals, week-over-week changes, top posts");
        println!("  \x1b[32mreport\x1b[0m     PDF report with an HTML copy");
        println!("  \x1b[32mpreview\x1b[0m    First rows of any CSV file");
        println!("  \x1b[32mdoctor\x1b[0m     Check configuration and input files");
        println!("  \x1b[32minit\x1b[0m       Create default configuration\n");
    } else {
        println!("pulse v{version}: weekly social media performance at a glance\n");

        println!("Quick start:");
        println!("  pulse init         Create a .pulse.toml config file");
        println!("  pulse dashboard    Print the dashboard");
        println!("  pulse report       Write the PDF and HTML report\n");

        println!("All commands:");
        println!("  dashboard  All-time totals, week-over-week changes, top posts");
        println!("  report     PDF report with an HTML copy");
        println!("  preview    First rows of any CSV file");
        println!("  doctor     Check configuration and input files");
        println!("  init       Create default configuration\n");
    }

    println!("Run 'pulse <command> --help' for details.");
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "warn,pulse=debug,pulse_core=debug,pulse_data=debug,pulse_report=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Collapse any loading or processing failure into the one message users see.
fn data_error(err: PulseError) -> miette::Report {
    miette::miette!(
        help = err.to_string(),
        "failed to load or process performance data"
    )
}

#[derive(serde::Serialize)]
struct CheckResult {
    name: &'static str,
    status: &'static str,
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
}

impl CheckResult {
    fn pass(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            status: "pass",
            detail: detail.into(),
            hint: None,
        }
    }

    fn fail(name: &'static str, detail: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            name,
            status: "fail",
            detail: detail.into(),
            hint: Some(hint.into()),
        }
    }

    fn info(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            status: "info",
            detail: detail.into(),
            hint: None,
        }
    }

    fn symbol(&self) -> &'static str {
        match self.status {
            "pass" => "\u{2713}",
            "fail" => "\u{2717}",
            _ => "~",
        }
    }

    fn colored_symbol(&self) -> String {
        match self.status {
            "pass" => "\x1b[32m\u{2713}\x1b[0m".into(),
            "fail" => "\x1b[31m\u{2717}\x1b[0m".into(),
            _ => "\x1b[33m~\x1b[0m".into(),
        }
    }
}

fn check_input(
    name: &'static str,
    path: &Path,
    delimiter: u8,
    required: &[&str],
) -> CheckResult {
    if !path.exists() {
        return CheckResult::fail(
            name,
            format!("{} not found", path.display()),
            "Export the file there or set its path under [input] in .pulse.toml",
        );
    }
    let table = match RawTable::from_path(path, delimiter) {
        Ok(table) => table,
        Err(e) => {
            return CheckResult::fail(name, e.to_string(), "Check that the file is valid CSV")
        }
    };
    match table.require_columns(required) {
        Ok(()) => CheckResult::pass(
            name,
            format!("{} ({} rows)", path.display(), table.len()),
        ),
        Err(e) => CheckResult::fail(
            name,
            e.to_string(),
            format!("Expected columns: {}", required.join(", ")),
        ),
    }
}

fn run_doctor(
    config: &PulseConfig,
    config_path: Option<&Path>,
    format: OutputFormat,
    use_color: bool,
) -> Result<()> {
    let mut checks: Vec<CheckResult> = Vec::new();

    // 1. Config file
    match config_path {
        Some(path) => checks.push(CheckResult::pass(
            "config_file",
            format!("loaded {}", path.display()),
        )),
        None => checks.push(CheckResult::info(
            "config_file",
            "no .pulse.toml found, using defaults (run 'pulse init' to create one)",
        )),
    }

    // 2. Delimiter, then both inputs
    match config.input.delimiter_byte() {
        Ok(delimiter) => {
            checks.push(check_input(
                "social_data",
                &config.input.social,
                delimiter,
                &PERFORMANCE_COLUMNS,
            ));
            checks.push(check_input(
                "top_posts_data",
                &config.input.top_posts,
                delimiter,
                &TOP_POST_COLUMNS,
            ));
        }
        Err(e) => checks.push(CheckResult::fail(
            "delimiter",
            e.to_string(),
            "Set [input] delimiter to a single ASCII character",
        )),
    }

    // 3. Charts
    let charts_dir = &config.report.charts_dir;
    match pulse_report::html::find_chart_images(charts_dir, None) {
        Ok(charts) if charts_dir.is_dir() => checks.push(CheckResult::info(
            "charts_dir",
            format!("{} ({} images)", charts_dir.display(), charts.len()),
        )),
        Ok(_) => checks.push(CheckResult::info(
            "charts_dir",
            format!(
                "{} not found, the HTML report will have no charts",
                charts_dir.display()
            ),
        )),
        Err(e) => checks.push(CheckResult::fail(
            "charts_dir",
            e.to_string(),
            "Check permissions on the charts directory",
        )),
    }

    // Output
    match format {
        OutputFormat::Json => {
            let version = env!("CARGO_PKG_VERSION");
            let json = serde_json::json!({
                "version": version,
                "checks": checks,
            });
            println!("{}", serde_json::to_string_pretty(&json).into_diagnostic()?);
        }
        _ => {
            let version = env!("CARGO_PKG_VERSION");
            println!("Pulseboard v{version}: Environment Check\n");

            for check in &checks {
                let sym = if use_color {
                    check.colored_symbol()
                } else {
                    check.symbol().to_string()
                };
                let label = check.name.replace('_', " ");
                println!("  {sym} {label:<16} {}", check.detail);
                if let Some(hint) = &check.hint {
                    println!("    hint: {hint}");
                }
            }

            let passed = checks.iter().filter(|c| c.status == "pass").count();
            let failed = checks.iter().filter(|c| c.status == "fail").count();
            let info = checks.iter().filter(|c| c.status == "info").count();
            println!("\n{passed} checks passed, {failed} failed, {info} info");
        }
    }

    Ok(())
}

fn print_preview(table: &RawTable, rows: usize, format: OutputFormat) -> Result<()> {
    let head = table.head(rows);
    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "source": table.source,
                "headers": table.headers,
                "rows": head,
                "totalRows": table.len(),
            });
            println!("{}", serde_json::to_string_pretty(&json).into_diagnostic()?);
        }
        OutputFormat::Markdown => {
            println!("| {} |", table.headers.join(" | "));
            println!("|{}", "---|".repeat(table.headers.len()));
            for row in head {
                println!("| {} |", row.join(" | "));
            }
        }
        OutputFormat::Text => {
            let mut widths: Vec<usize> = table.headers.iter().map(|h| h.chars().count()).collect();
            for row in head {
                for (i, cell) in row.iter().enumerate() {
                    if let Some(w) = widths.get_mut(i) {
                        *w = (*w).max(cell.chars().count());
                    }
                }
            }
            let line = |cells: &[String]| {
                cells
                    .iter()
                    .zip(&widths)
                    .map(|(cell, &w)| format!("{cell:<w$}"))
                    .collect::<Vec<_>>()
                    .join("  ")
            };
            println!("{}", line(table.headers.as_slice()).trim_end());
            for row in head {
                println!("{}", line(row.as_slice()).trim_end());
            }
            println!(
                "\n{} of {} rows from {}",
                head.len(),
                table.len(),
                table.source.display()
            );
        }
    }
    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# Pulseboard Configuration
# See: https://github.com/Meru143/pulseboard

[input]
# social = "data/input/socialmedia.csv"
# top_posts = "data/input/top5.csv"
# delimiter = ","

[report]
# output = "reports/summary_report.pdf"
# charts_dir = "reports/charts"
# html = true
# title = "Content Performance Dashboard Report"

[dashboard]
# top_n = 5
# sort_by = "views"    # or "engagement"
"#;

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .into_diagnostic()?;
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = match &cli.config {
        Some(path) => Some(path.clone()),
        None => {
            let default_path = Path::new(".pulse.toml");
            default_path.exists().then(|| default_path.to_path_buf())
        }
    };
    let config = match &config_path {
        Some(path) => PulseConfig::from_file(path)?,
        None => PulseConfig::default(),
    };

    let use_color = match cli.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => std::io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    };

    debug!(
        format = %cli.format,
        config = ?config_path,
        "resolved settings"
    );

    match cli.command {
        None => {
            print_welcome(use_color);
            return Ok(());
        }
        Some(Command::Dashboard {
            social,
            top_posts,
            top,
            sort_by,
        }) => {
            let social = social.unwrap_or_else(|| config.input.social.clone());
            let top_posts = top_posts.unwrap_or_else(|| config.input.top_posts.clone());
            let options = DashboardOptions {
                title: config.report.title.clone(),
                top_n: top.unwrap_or(config.dashboard.top_n),
                sort_by: sort_by.unwrap_or(config.dashboard.sort_by),
            };
            let delimiter = config.input.delimiter_byte().map_err(data_error)?;
            let dashboard =
                load_dashboard(&social, &top_posts, delimiter, &options).map_err(data_error)?;

            match cli.format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&dashboard).into_diagnostic()?
                    );
                }
                OutputFormat::Markdown => {
                    print!("{}", dashboard.to_markdown());
                }
                OutputFormat::Text => {
                    print!("{dashboard}");
                }
            }
        }
        Some(Command::Report {
            social,
            top_posts,
            output,
            charts_dir,
            no_html,
        }) => {
            let request = ReportRequest {
                social: social.unwrap_or_else(|| config.input.social.clone()),
                top_posts: top_posts.unwrap_or_else(|| config.input.top_posts.clone()),
                delimiter: config.input.delimiter_byte().map_err(data_error)?,
                output: output.unwrap_or_else(|| config.report.output.clone()),
                charts_dir: charts_dir.unwrap_or_else(|| config.report.charts_dir.clone()),
                html: config.report.html && !no_html,
                options: DashboardOptions {
                    title: config.report.title.clone(),
                    top_n: config.dashboard.top_n,
                    sort_by: config.dashboard.sort_by,
                },
            };

            let is_tty = std::io::stderr().is_terminal();
            let spinner = if is_tty {
                let pb = indicatif::ProgressBar::new_spinner();
                pb.set_style(
                    indicatif::ProgressStyle::with_template("{spinner:.cyan} {msg} ({elapsed})")
                        .unwrap_or_else(|_| indicatif::ProgressStyle::default_spinner()),
                );
                pb.set_message("Generating report...");
                pb.enable_steady_tick(std::time::Duration::from_millis(120));
                Some(pb)
            } else {
                None
            };

            let outcome = generate_report(&request)
                .inspect_err(|_e| {
                    if let Some(pb) = &spinner {
                        pb.finish_with_message("Failed");
                    }
                })
                .map_err(data_error)?;

            if let Some(pb) = spinner {
                pb.finish_with_message("Done");
            }

            match cli.format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&outcome).into_diagnostic()?
                    );
                }
                OutputFormat::Markdown => {
                    println!("- **PDF:** {}", outcome.pdf.display());
                    if let Some(html) = &outcome.html {
                        println!("- **HTML:** {} ({} charts)", html.display(), outcome.charts);
                    }
                }
                OutputFormat::Text => {
                    println!("Wrote PDF report to {}", outcome.pdf.display());
                    if let Some(html) = &outcome.html {
                        println!(
                            "Wrote HTML report to {} ({} charts)",
                            html.display(),
                            outcome.charts
                        );
                    }
                }
            }
        }
        Some(Command::Preview { ref path, rows }) => {
            let delimiter = config.input.delimiter_byte().map_err(data_error)?;
            let table = RawTable::from_path(path, delimiter).map_err(data_error)?;
            print_preview(&table, rows, cli.format)?;
        }
        Some(Command::Init) => {
            let path = Path::new(".pulse.toml");
            if path.exists() {
                miette::bail!(".pulse.toml already exists");
            }
            std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
            println!("Created .pulse.toml with default configuration");
        }
        Some(Command::Doctor) => {
            run_doctor(&config, config_path.as_deref(), cli.format, use_color)?;
        }
        Some(Command::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "pulse", &mut std::io::stdout());
        }
    }

    Ok(())
}
