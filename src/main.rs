use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use cohortscraper::{
    fetch::{latest_snapshot, load_snapshot, save_snapshot, PortalClient},
    load_report,
    report::write_report,
    Cleaner, Config, Report,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "cohortscraper")]
#[command(about = "Enrollment report scraper: cohort sizes and major/minor distribution")]
#[command(version)]
struct Cli {
    /// Path to a YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the report page and save it as a snapshot
    Fetch {
        /// Snapshot directory (overrides output.snapshot_dir)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// Build the count tables from a snapshot or a live fetch
    Report {
        /// Saved report page; without it the portal is fetched
        #[arg(short, long, conflicts_with = "latest")]
        input: Option<PathBuf>,

        /// Use the newest snapshot in the snapshot directory
        #[arg(long)]
        latest: bool,

        /// Report directory (overrides output.dir)
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Count every status, not only currently enrolled students
        #[arg(long)]
        all_statuses: bool,

        /// Comma-separated subject codes to report (overrides subjects.requested)
        #[arg(long, value_delimiter = ',')]
        subjects: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,cohortscraper=info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();

    // ─── 2) load configuration ───────────────────────────────────────
    let cli = Cli::parse();
    let mut cfg = Config::load(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Commands::Fetch { out_dir } => {
            let dir = out_dir.unwrap_or_else(|| cfg.output.snapshot_dir.clone());
            let html = fetch_live(&cfg).await?;
            let path = save_snapshot(&dir, &html).await?;
            info!(path = %path.display(), "snapshot saved");
            println!("{}", path.display());
        }

        Commands::Report {
            input,
            latest,
            out_dir,
            all_statuses,
            subjects,
        } => {
            if !subjects.is_empty() {
                cfg.subjects.requested = subjects;
            }

            // ─── 3) obtain the report page ───────────────────────────────
            let (html, source) = match (input, latest) {
                (Some(path), _) => (load_snapshot(&path).await?, path.display().to_string()),
                (None, true) => {
                    let dir = &cfg.output.snapshot_dir;
                    let path = latest_snapshot(dir)
                        .await?
                        .ok_or_else(|| anyhow!("no snapshots in {}", dir.display()))?;
                    (load_snapshot(&path).await?, path.display().to_string())
                }
                (None, false) => {
                    let html = fetch_live(&cfg).await?;
                    let path = save_snapshot(&cfg.output.snapshot_dir, &html).await?;
                    info!(path = %path.display(), "snapshot saved");
                    (html, path.display().to_string())
                }
            };

            // ─── 4) extract, clean, aggregate ────────────────────────────
            let cleaner = Cleaner::from_config(&cfg.cleaning);
            let dataset = load_report(&html, &cleaner).with_context(|| {
                format!("{} does not contain the expected six-column report table", source)
            })?;
            let report = Report::build(&dataset, &cfg, &source, all_statuses)
                .context("building report tables")?;

            // ─── 5) write outputs ────────────────────────────────────────
            let dir = out_dir.unwrap_or_else(|| cfg.output.dir.clone());
            write_report(&dir, &report, &dataset.records)?;
            print!("{}", report.summary());
        }
    }

    info!("all done");
    Ok(())
}

async fn fetch_live(cfg: &Config) -> Result<String> {
    let client = PortalClient::new(&cfg.portal)?;
    client.fetch_report().await
}
