mod analysis;
mod app;
mod pulse;

use std::path::PathBuf;

use clap::Parser;
use eframe::egui::vec2;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::pulse::{NullSurface, PulseConfig, PulseField, run_headless};

const HEADLESS_FRAME_SECS: f32 = 1.0 / 60.0;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Saved response from the fraud-risk service (`/stocks`) to replay.
    #[arg(long)]
    results: Option<PathBuf>,

    /// Initial risk score in 0..=100 when no results are loaded.
    #[arg(long)]
    risk_score: Option<f32>,

    /// Seed for the pulse's random source; entropy when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Stop spawning new nodes and edges; existing ones age out.
    #[arg(
        long,
        env = "PULSE_REDUCED_MOTION",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    reduced_motion: bool,

    /// JSON file overriding pulse tunables.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run this many frames without a window, then exit.
    #[arg(long)]
    headless_frames: Option<usize>,
}

fn load_config(path: Option<&PathBuf>) -> PulseConfig {
    let Some(path) = path else {
        return PulseConfig::default();
    };

    match PulseConfig::load(path) {
        Ok(config) => config,
        Err(error) => {
            warn!(error = format!("{error:#}"), "falling back to default pulse config");
            PulseConfig::default()
        }
    }
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("risk_pulse=info")),
        )
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_ref());
    let field = PulseField::new(config, args.reduced_motion, args.seed);

    if let Some(frames) = args.headless_frames {
        let mut field = field;
        field.set_risk_score(args.risk_score);
        field.resize(vec2(1280.0, 720.0), 1.0);
        let mut surface = NullSurface::default();
        let stats = run_headless(&mut field, &mut surface, frames, HEADLESS_FRAME_SECS);
        info!(
            frames,
            nodes = stats.nodes,
            connections = stats.connections,
            time_secs = stats.time_secs,
            color = ?stats.color,
            "headless run finished"
        );
        return Ok(());
    }

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1280.0, 800.0]),
        ..Default::default()
    };

    eframe::run_native(
        "risk pulse",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::PulseApp::new(
                cc,
                field,
                args.results.clone(),
                args.risk_score,
            )))
        }),
    )
}
