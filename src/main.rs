use anyhow::Context;
use artworks_table::prelude::*;
use bubbletea_rs::{Cmd, Model, Msg, Program};
use clap::Parser;
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "artworks-table", version, about = "Browse and select Art Institute of Chicago artworks")]
struct Args {
    /// Artworks listing endpoint
    #[arg(long, env = "ARTWORKS_API_URL", default_value = artworks_table::config::DEFAULT_API_URL)]
    api_url: String,

    /// Rows per page on start-up
    #[arg(long, env = "ARTWORKS_PAGE_SIZE", default_value_t = 10)]
    page_size: usize,

    /// Timeout for each HTTP request, in seconds
    #[arg(long, env = "ARTWORKS_TIMEOUT_SECS", default_value_t = 10)]
    timeout_secs: u64,

    /// Serve generated records instead of calling the API
    #[arg(long, env = "ARTWORKS_OFFLINE")]
    offline: bool,

    /// Number of generated records in offline mode
    #[arg(long, env = "ARTWORKS_SAMPLE_SIZE", default_value_t = 250)]
    sample_size: u64,

    /// Write logs to this file (the terminal is taken by the UI)
    #[arg(long, env = "ARTWORKS_LOG_FILE")]
    log_file: Option<PathBuf>,
}

impl Args {
    fn config(&self) -> Result<Config, ConfigError> {
        let config = Config::default()
            .with_api_url(self.api_url.clone())
            .with_page_size(self.page_size)
            .with_request_timeout(Duration::from_secs(self.timeout_secs));
        config.validate()?;
        Ok(config)
    }
}

struct Launch {
    config: Config,
    source: Arc<dyn PageSource<Record = Artwork>>,
}

static LAUNCH: OnceCell<Launch> = OnceCell::new();

fn offline_source(count: u64) -> Arc<dyn PageSource<Record = Artwork>> {
    Arc::new(MemorySource::new((1..=count).map(Artwork::sample).collect()).with_name("offline"))
}

struct App {
    table: ArtworksTable,
}

impl Model for App {
    fn init() -> (Self, Option<Cmd>) {
        let (config, source) = match LAUNCH.get() {
            Some(launch) => (launch.config.clone(), Arc::clone(&launch.source)),
            None => (Config::default(), offline_source(100)),
        };
        let (table, cmd) = ArtworksTable::new(config, source);
        (Self { table }, Some(cmd))
    }

    fn update(&mut self, msg: Msg) -> Option<Cmd> {
        self.table.update(msg)
    }

    fn view(&self) -> String {
        self.table.view()
    }
}

fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }

    let config = args.config().context("invalid configuration")?;
    let source: Arc<dyn PageSource<Record = Artwork>> = if args.offline {
        offline_source(args.sample_size)
    } else {
        Arc::new(ArticClient::new(&config).context("building HTTP client")?)
    };
    info!(
        source = source.source_name(),
        page_size = config.page_size,
        "starting artworks table"
    );

    if LAUNCH.set(Launch { config, source }).is_err() {
        anyhow::bail!("launch settings were already set");
    }

    let program = Program::<App>::builder().alt_screen(true).build()?;
    program.run().await?;
    Ok(())
}
