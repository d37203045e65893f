use anyhow::{Context, Result};
use pxtable::{
    config::Config,
    fetch,
    pipeline::{self, DatasetKind, TableState},
    render,
};
use reqwest::Client;
use std::{env, fs, path::PathBuf};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 2) load config ──────────────────────────────────────────────
    let cfg_path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("pxtable.yaml"));
    let cfg = Config::load(&cfg_path)?;
    info!(config = %cfg_path.display(), out = %cfg.out_path.display(), "configured");

    // ─── 3) fetch, join, fall back as needed ─────────────────────────
    let client = Client::new();
    let state = pipeline::load_table(|kind| {
        let (url, path) = match kind {
            DatasetKind::Population => (&cfg.population_url, &cfg.population_query),
            DatasetKind::Employment => (&cfg.employment_url, &cfg.employment_query),
        };
        fetch::run_query(&client, url, path)
    })
    .await;

    // ─── 4) render and write out ─────────────────────────────────────
    let page = render::render_page(&state, cfg.locale, cfg.highlight);
    fs::write(&cfg.out_path, &page)
        .with_context(|| format!("writing {}", cfg.out_path.display()))?;

    match &state {
        TableState::Full(rows) => info!(rows = rows.len(), "rendered full table"),
        TableState::PopulationOnly(rows) => {
            info!(rows = rows.len(), "rendered population-only table")
        }
        // data-load failure still writes the error-row page; the rendered
        // table is the error surface
        TableState::Failed(msg) => error!(message = %msg, "rendered error row"),
    }
    info!("done, wrote {}", cfg.out_path.display());
    Ok(())
}
