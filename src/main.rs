//! Drishti - drive the base toward a coloured target.
//!
//! Runs the servo loop against the simulated scene: the synthetic camera
//! renders the target, the colour detector finds it, and the navigator
//! steers the kinematic base until the target fills enough of the frame.
//!
//! Usage:
//!   drishti                          # drishti.toml if present, else defaults
//!   drishti --config my.toml --color blue --target-x 3.0 --target-y -0.5
//!   drishti --frames-dir output/frames --realtime

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use tracing::{info, warn};

use drishti::{
    BaseSink, ColorDetector, DrishtiConfig, LogSink, LoopOutcome, Navigator, Result, ServoLoop,
    SimulatedScene,
};

/// Visual-servoing approach controller (simulated base)
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path (default: drishti.toml if it exists)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Target colour for the colour detector
    #[arg(long)]
    color: Option<String>,

    /// Stop after this many control cycles
    #[arg(long)]
    max_cycles: Option<u64>,

    /// Base start x (meters)
    #[arg(long)]
    start_x: Option<f32>,

    /// Base start y (meters)
    #[arg(long)]
    start_y: Option<f32>,

    /// Base start heading (radians)
    #[arg(long)]
    start_theta: Option<f32>,

    /// Target x (meters)
    #[arg(long)]
    target_x: Option<f32>,

    /// Target y (meters)
    #[arg(long)]
    target_y: Option<f32>,

    /// Save annotated frames into this directory
    #[arg(long)]
    frames_dir: Option<PathBuf>,

    /// Save every Nth frame when --frames-dir is set
    #[arg(long, default_value_t = 10)]
    dump_every: u64,

    /// Hold the control rate in wall-clock time
    #[arg(long)]
    realtime: bool,

    /// Also log every command sent to the base
    #[arg(long)]
    echo_commands: bool,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("drishti=info".parse().unwrap()),
        )
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    info!("Drishti v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Navigating to {} target at ({:.2}, {:.2}) from ({:.2}, {:.2}, {:.1}°)",
        config.detector.color,
        config.simulation.target_x,
        config.simulation.target_y,
        config.simulation.start_x,
        config.simulation.start_y,
        config.simulation.start_theta.to_degrees()
    );

    let scene = SimulatedScene::new(
        &config.simulation,
        config.navigator.image_width,
        config.navigator.image_height,
        config.control.period_secs(),
    )?;

    let detector = ColorDetector::from_config(&config.detector)?;
    let navigator = Navigator::with_clock(config.navigator.clone(), scene.clock())?;
    let sink: Box<dyn BaseSink> = if args.echo_commands {
        Box::new((scene.base(), LogSink::new()))
    } else {
        Box::new(scene.base())
    };

    let mut servo = ServoLoop::new(detector, navigator, sink, config.control.clone());
    if let Some(dir) = &args.frames_dir {
        info!("Saving every {} frame(s) to {:?}", args.dump_every, dir);
        servo = servo.with_frame_dump(dir, args.dump_every);
    }

    install_signal_handler(servo.abort_handle())?;

    let report = servo.run(&mut scene.camera())?;
    let pose = scene.pose();

    match report.outcome {
        LoopOutcome::Arrived => info!(
            "Arrived after {} cycles ({:.1}s simulated), {:.2}m from target",
            report.cycles,
            report.cycles as f32 * config.control.period_secs(),
            scene.distance_to_target()
        ),
        outcome => warn!(
            "Stopped without arriving: {:?} after {} cycles, state {}, {:.2}m from target",
            outcome,
            report.cycles,
            report.final_state,
            scene.distance_to_target()
        ),
    }
    info!(
        "Final pose: ({:.3}, {:.3}, {:.1}°)",
        pose.x,
        pose.y,
        pose.theta.to_degrees()
    );

    Ok(())
}

/// Config from `--config`, else `drishti.toml`, else defaults; then CLI overrides.
fn load_config(args: &Args) -> Result<DrishtiConfig> {
    let mut config = if let Some(path) = &args.config {
        info!("Loading configuration from {:?}", path);
        DrishtiConfig::load(path)?
    } else if Path::new("drishti.toml").exists() {
        info!("Loading configuration from drishti.toml");
        DrishtiConfig::load(Path::new("drishti.toml"))?
    } else {
        info!("Using default configuration");
        DrishtiConfig::default()
    };

    if let Some(color) = &args.color {
        config.detector.color = color.clone();
    }
    if let Some(n) = args.max_cycles {
        config.control.max_cycles = Some(n);
    }
    if args.realtime {
        config.control.realtime = true;
    }

    let sim = &mut config.simulation;
    sim.start_x = args.start_x.unwrap_or(sim.start_x);
    sim.start_y = args.start_y.unwrap_or(sim.start_y);
    sim.start_theta = args.start_theta.unwrap_or(sim.start_theta);
    sim.target_x = args.target_x.unwrap_or(sim.target_x);
    sim.target_y = args.target_y.unwrap_or(sim.target_y);

    config.validate()?;
    Ok(config)
}

/// Raise the abort flag on SIGINT/SIGTERM.
fn install_signal_handler(abort: Arc<AtomicBool>) -> Result<()> {
    let mut signals = Signals::new([SIGINT, SIGTERM])?;
    std::thread::Builder::new()
        .name("signals".into())
        .spawn(move || {
            if let Some(sig) = signals.forever().next() {
                info!("Received signal {:?}, stopping base...", sig);
                abort.store(true, Ordering::Relaxed);
            }
        })?;
    Ok(())
}
