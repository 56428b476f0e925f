use anyhow::Result;
use foia_vendor_risk::{pipeline, Config};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 2) resolve inputs / outputs ─────────────────────────────────
    let cfg = Config::from_env();
    info!(
        sam = %cfg.sam_file.display(),
        uzbek = %cfg.uzbek_dir.display(),
        out = %cfg.output_dir.display(),
        "configured"
    );

    // ─── 3) build ────────────────────────────────────────────────────
    let summary = pipeline::run(&cfg)?;
    info!(
        us = summary.us_rows,
        uzbek = summary.uzbek_rows,
        total = summary.total_rows,
        dataset = %summary.dataset_path.display(),
        codebook = %summary.codebook_path.display(),
        "all done"
    );
    Ok(())
}
