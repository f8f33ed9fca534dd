//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use manubuild_core::{
    BuildContext, BuildReport, ProgressReporter, build_all, figures_stage, load_manuscript,
    pdf_stage, slides_stage, split_stage,
};
use manubuild_diagrams::DiagramRegistry;
use manubuild_shared::{AppConfig, Volume, init_config};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// manubuild: build the textbook series from its master manuscript.
#[derive(Parser)]
#[command(
    name = "manubuild",
    version,
    about = "Split a master manuscript into chapters and build figures, PDFs and slide decks.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Project root (defaults to the current directory).
    #[arg(long, global = true, env = "MANUBUILD_ROOT")]
    pub root: Option<PathBuf>,

    /// Config file (defaults to <root>/manubuild.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Split the master manuscript into per-chapter files.
    Split,

    /// Render every figure referenced by the manuscript.
    Figures,

    /// Build the PDF books from the split chapters.
    Pdf,

    /// Build the PPTX decks from the split chapters.
    Slides,

    /// Run every stage and write the dist manifest.
    Build,

    /// Show the parsed chapters and required figures.
    Info,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init {
        /// Overwrite an existing config file.
        #[arg(long)]
        force: bool,
    },
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "manubuild=info",
        1 => "manubuild=debug",
        _ => "manubuild=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir().map_err(|e| eyre!("cannot determine working directory: {e}"))?,
    };
    let config_file = cli.config.as_deref();

    let ctx = || BuildContext::load(&root, config_file);

    match cli.command {
        Command::Split => cmd_split(&ctx()?),
        Command::Figures => cmd_figures(&ctx()?),
        Command::Pdf => cmd_pdf(&ctx()?),
        Command::Slides => cmd_slides(&ctx()?),
        Command::Build => cmd_build(&ctx()?),
        Command::Info => cmd_info(&ctx()?),
        Command::Config { action } => match action {
            ConfigAction::Init { force } => cmd_config_init(&root, force),
            ConfigAction::Show => cmd_config_show(&ctx()?.config),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_split(ctx: &BuildContext) -> Result<()> {
    let reporter = CliProgress::new();
    let splits = split_stage(ctx, &reporter)?;
    reporter.finish();

    for split in &splits {
        println!(
            "  {:<14} {} chapters -> {}",
            split.volume.id(),
            split.chapters.len(),
            split.dir.display()
        );
    }
    Ok(())
}

fn cmd_figures(ctx: &BuildContext) -> Result<()> {
    let reporter = CliProgress::new();
    let report = figures_stage(ctx, &reporter)?;
    reporter.finish();

    println!(
        "  {} figures ({} drawn, {} placeholders) -> {}",
        report.total(),
        report.drawn.len(),
        report.placeholders.len(),
        ctx.paths.figures.display()
    );
    Ok(())
}

fn cmd_pdf(ctx: &BuildContext) -> Result<()> {
    let reporter = CliProgress::new();
    let pdfs = pdf_stage(ctx, &reporter)?;
    reporter.finish();

    for pdf in &pdfs {
        print_deliverable(&pdf.path, &format!("{} pages", pdf.pages));
    }
    Ok(())
}

fn cmd_slides(ctx: &BuildContext) -> Result<()> {
    let reporter = CliProgress::new();
    let decks = slides_stage(ctx, &reporter)?;
    reporter.finish();

    for deck in &decks {
        print_deliverable(&deck.path, &format!("{} slides", deck.slides));
    }
    Ok(())
}

fn cmd_build(ctx: &BuildContext) -> Result<()> {
    let rule = "=".repeat(60);
    println!("{rule}");
    println!("  {} v{}", ctx.config.project.name, ctx.config.project.version);
    println!("  {}", ctx.config.project.description);
    println!("{rule}");

    info!(root = %ctx.paths.root.display(), "starting build");

    let reporter = CliProgress::new();
    let report = build_all(ctx, &reporter)?;
    reporter.finish();

    println!();
    for volume in Volume::ALL {
        println!(
            "  {}: {} chapters",
            volume.id(),
            report.chapters.get(&volume).copied().unwrap_or_default()
        );
    }
    println!(
        "  Figures: {} ({} placeholders)",
        report.figures.total(),
        report.figures.placeholders.len()
    );
    println!();
    for pdf in &report.pdfs {
        print_deliverable(&pdf.path, &format!("{} pages", pdf.pages));
    }
    for deck in &report.decks {
        print_deliverable(&deck.path, &format!("{} slides", deck.slides));
    }
    println!("  Manifest: {}", report.manifest.display());
    println!("  Time:     {:.1}s", report.elapsed.as_secs_f64());
    println!("{rule}");

    Ok(())
}

fn cmd_info(ctx: &BuildContext) -> Result<()> {
    let manuscript = load_manuscript(ctx)?;
    let registry = DiagramRegistry::new();

    println!("  Master: {}", ctx.paths.master_file.display());
    for volume in Volume::ALL {
        let chapters = manuscript.chapters(volume);
        println!();
        println!("  {} ({}): {} chapters", volume.id(), ctx.paths.slug(volume), chapters.len());
        for chapter in chapters {
            println!(
                "    {}  {}  ({} chars)",
                chapter.filename(),
                chapter.title,
                chapter.body.chars().count()
            );
        }
    }

    let figures = manuscript.figure_references();
    println!();
    println!("  Figures: {}", figures.len());
    for id in &figures {
        let kind = if registry.contains(id.as_str()) {
            "drawn"
        } else {
            "placeholder"
        };
        println!("    {id:<28} {kind}");
    }
    Ok(())
}

fn cmd_config_init(root: &Path, force: bool) -> Result<()> {
    let path = init_config(root, force)?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}

fn print_deliverable(path: &Path, detail: &str) {
    let size = std::fs::metadata(path).map(|m| m.len()).unwrap_or_default();
    println!("  {:<28} {:>10}  {detail}", display_name(path), human_size(size));
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// `1536` -> `1.5 KB`.
fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn task_progress(&self, current: usize, total: usize, detail: &str) {
        self.spinner
            .set_message(format!("[{current}/{total}] {detail}"));
    }

    fn done(&self, report: &BuildReport) {
        self.spinner.set_message(format!(
            "Done in {:.1}s",
            report.elapsed.as_secs_f64()
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_are_human_readable() {
        assert_eq!(human_size(512), "512 B");
        assert_eq!(human_size(1536), "1.5 KB");
        assert_eq!(human_size(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["manubuild", "build", "--root", "/tmp/book", "-vv"]).unwrap();
        assert_eq!(cli.root.as_deref(), Some(Path::new("/tmp/book")));
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Command::Build));
    }

    #[test]
    fn config_init_takes_force() {
        let cli = Cli::try_parse_from(["manubuild", "config", "init", "--force"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Config {
                action: ConfigAction::Init { force: true }
            }
        ));
    }

    #[test]
    fn rejects_unknown_log_format() {
        assert!(Cli::try_parse_from(["manubuild", "--log-format", "xml", "info"]).is_err());
    }
}
