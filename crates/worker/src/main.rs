use anyhow::Context;
use clap::Parser;
use greenvast_core::ingest::provider::{HttpJsonSnapshotProvider, SnapshotProvider};
use greenvast_core::models::price::PriceModelStore;
use greenvast_core::time::dates::parse_iso_datetime;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod ingest;
mod submit;

#[derive(Debug, Parser)]
#[command(name = "greenvast_worker")]
struct Args {
    /// Read raw snapshot rows from this JSON file instead of the data provider.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Only use snapshots dated on or after this day (YYYY-MM-DD).
    #[arg(long)]
    since: Option<String>,

    /// Train an in-process model and log predictions instead of submitting to the API.
    #[arg(long)]
    dry_run: bool,

    /// Target date for dry-run predictions. Defaults to each pair's last observation.
    #[arg(long)]
    predict_date: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = greenvast_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    if let Err(err) = run(args, &settings).await {
        sentry_anyhow::capture_anyhow(&err);
        tracing::error!(error = %err, "snapshot run failed");
        return Err(err);
    }
    Ok(())
}

async fn run(args: Args, settings: &greenvast_core::config::Settings) -> anyhow::Result<()> {
    let since = args
        .since
        .as_deref()
        .map(|s| chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()
        .context("--since must be YYYY-MM-DD")?;

    let predict_date = args
        .predict_date
        .as_deref()
        .map(|s| parse_iso_datetime(s).with_context(|| format!("invalid --predict-date {s:?}")))
        .transpose()?;

    let snapshots = match &args.input {
        Some(path) => {
            let loaded = ingest::load_snapshots_file(path)?;
            tracing::info!(path = %path.display(), rows = loaded.len(), "loaded snapshots file");
            loaded
        }
        None => {
            let provider = HttpJsonSnapshotProvider::from_settings(settings)?;
            tracing::info!(provider = provider.provider_name(), ?since, "fetching snapshots");
            provider.fetch_snapshots(since).await?
        }
    };
    let snapshots = ingest::filter_since(snapshots, since);

    if args.dry_run {
        let mut store = PriceModelStore::new(settings.model_version.clone());
        let report = store.train(&snapshots)?;
        tracing::info!(
            dry_run = true,
            pair_count = report.pair_count,
            version = %report.model_version,
            "trained in-process price model"
        );

        for pair in store.summaries() {
            let prediction = store.predict(&pair.commodity, &pair.market, predict_date)?;
            tracing::info!(
                commodity = %prediction.commodity,
                market = %prediction.market,
                price = prediction.price,
                low = prediction.low,
                high = prediction.high,
                unit = %prediction.unit,
                confidence = prediction.confidence,
                history_count = prediction.history_count,
                "price prediction"
            );
        }
        return Ok(());
    }

    let api_base_url = settings.require_api_base_url()?;
    let report = submit::submit_training_rows(api_base_url, &snapshots).await?;
    tracing::info!(
        pair_count = report.pair_count,
        version = %report.model_version,
        trained_at = %report.trained_at,
        "submitted snapshots for training"
    );

    Ok(())
}

fn init_sentry(settings: &greenvast_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
