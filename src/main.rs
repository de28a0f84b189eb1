//! orrery - headless driver for the camera core
//!
//! Runs a demo planetary system through `CameraEngine` frame by frame and
//! reports what the camera did.
//!
//! Usage:
//!   cargo run -- --frames 900
//!   cargo run -- --focus earth --focus mars --focus-every 240
//!   cargo run -- --route mars --time-scale 50 --json

mod demo_scene;
mod driver;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use orrery_camera::{CameraConfig, ConfigLoader};

use crate::driver::{run, RunOptions, RunReport};

#[derive(Parser, Debug)]
#[command(name = "orrery")]
#[command(about = "Drive the orrery camera core without a renderer")]
struct Cli {
    /// Number of frames to simulate
    #[arg(long, default_value_t = 600)]
    frames: u32,

    /// Frames per wall-clock second
    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// Simulation time multiplier (negative runs time backwards)
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    time_scale: f64,

    /// Body to select; repeat to queue several selections
    #[arg(long = "focus", value_name = "BODY")]
    focus: Vec<String>,

    /// Frames between queued selections
    #[arg(long, default_value_t = 180)]
    focus_every: u32,

    /// Mount the camera on this body's route instead of the system root
    #[arg(long, value_name = "BODY")]
    route: Option<String>,

    /// Frames before the scene reports loaded
    #[arg(long, default_value_t = 5)]
    load_frames: u32,

    /// Camera config file (defaults to config/camera.yaml)
    #[arg(long, env = "ORRERY_CONFIG")]
    config: Option<PathBuf>,

    /// Print the run report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "orrery=info,orrery_camera=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => CameraConfig::load(path)
            .with_context(|| format!("Failed to load camera config {}", path.display()))?,
        None => ConfigLoader::from_env()
            .load()
            .context("Failed to load camera config")?,
    };

    let options = RunOptions {
        frames: cli.frames,
        fps: cli.fps,
        time_scale: cli.time_scale,
        focus: cli.focus,
        focus_every: cli.focus_every,
        route: cli.route,
        load_frames: cli.load_frames,
    };

    let report = run(&options, config)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &RunReport) {
    println!("Frames:      {}", report.frames);
    println!(
        "Time:        {:.2}s wall, {:.2}s simulated",
        report.wall_seconds, report.sim_seconds
    );
    println!("Route:       {}", report.route);
    println!(
        "Followed:    {} ({})",
        report.followed.as_deref().unwrap_or("-"),
        if report.following { "following" } else { "free" }
    );
    if let (Some(position), Some(target)) = (report.position, report.target) {
        println!("Position:    {:?}", position);
        println!("Target:      {:?}", target);
    }
    println!("Generation:  {}", report.generation);
    println!("Events:      {}", report.events.len());
    for event in &report.events {
        println!("  [{:>5}] {}", event.frame, event.event);
    }
}
