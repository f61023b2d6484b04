use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use directories::ProjectDirs;
use doty_application::{Library, Report, Workflow};
use doty_core::Settings;
use doty_engine::ProcessViewer;
use doty_storage::Catalog;
use doty_ui::FuzzyPicker;
use tracing::info;
use tracing_subscriber::EnvFilter;

const CATALOG_FILE: &str = "db.sql";
const SETTINGS_FILE: &str = "config.toml";

#[derive(Parser, Debug)]
#[command(
    name = "doty",
    version,
    about = "Doty - a simple ebook manager that remembers where you stopped reading."
)]
struct Cli {
    /// Reset the book catalog. Caution: no backups are done.
    #[arg(long)]
    reset_db: bool,

    /// Directory holding config.toml and the catalog.
    #[arg(long, env = "DOTY_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add a book to the catalog.
    Add { file: PathBuf },
    /// Remove a book from the catalog.
    Rem,
    /// List registered books with their current page.
    List {
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    fn workflow(&self) -> Workflow {
        match &self.command {
            None => Workflow::Open,
            Some(Command::Add { file }) => Workflow::Add(file.clone()),
            Some(Command::Rem) => Workflow::Remove,
            Some(Command::List { .. }) => Workflow::List,
        }
    }

    fn json(&self) -> bool {
        matches!(self.command, Some(Command::List { json: true }))
    }
}

fn main() {
    init_tracing();
    if let Err(err) = run() {
        eprintln!("ERROR: {err:#}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("DOTY_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_dir = resolve_config_dir(cli.config_dir.as_deref())?;
    let settings = load_settings(&config_dir)?;
    let viewer = ProcessViewer::new(settings.viewer.clone()).context("configure viewer")?;
    let selector = FuzzyPicker::new(settings.selector.clone());

    let db_path = config_dir.join(CATALOG_FILE);
    if cli.reset_db {
        Catalog::reset(&db_path)?;
        info!(path = %db_path.display(), "catalog reset");
    }
    let catalog = Catalog::open(&db_path)?;

    let library = Library::new(catalog, selector, viewer);
    let report = library.run(cli.workflow())?;
    render(&report, cli.json())
}

fn resolve_config_dir(explicit: Option<&Path>) -> anyhow::Result<PathBuf> {
    let dir = match explicit {
        Some(dir) => dir.to_path_buf(),
        None => ProjectDirs::from("", "", "doty")
            .context("resolve project dirs")?
            .config_dir()
            .to_path_buf(),
    };
    if !dir.is_dir() {
        anyhow::bail!(
            "config dir not available at {} (hint: create it with `mkdir -p {}`)",
            dir.display(),
            dir.display()
        );
    }
    Ok(dir)
}

fn load_settings(config_dir: &Path) -> anyhow::Result<Settings> {
    let path = config_dir.join(SETTINGS_FILE);
    let mut settings = match fs::read_to_string(&path) {
        Ok(text) => toml::from_str::<Settings>(&text)
            .with_context(|| format!("parse {}", path.display()))?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => Settings::default(),
        Err(err) => return Err(err).with_context(|| format!("read {}", path.display())),
    };
    settings.normalize();
    Ok(settings)
}

fn render(report: &Report, json: bool) -> anyhow::Result<()> {
    match report {
        Report::Listed(books) if json => {
            println!("{}", serde_json::to_string_pretty(books)?);
        }
        Report::Listed(books) if books.is_empty() => {}
        Report::PageUnchanged { .. } => {}
        report if report.is_informational() => eprintln!("INFO: {report}"),
        report => println!("{report}"),
    }
    Ok(())
}
