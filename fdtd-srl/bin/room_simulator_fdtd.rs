//! Parallel FDTD Room Acoustics Simulator
//!
//! This simulator integrates:
//! - JSON configuration and mesh model loading
//! - SRL FDTD stepping with admittance boundaries
//! - Domain partitioning with parallel slabs
//! - Slice captures and headless visualization streaming
//!
//! Usage:
//!   cargo run --release --bin room_simulator_fdtd -- --config configs/box.json
//!   cargo run --release --bin room_simulator_fdtd -- --help

use clap::{Parser, ValueEnum};
use fdtd_common::{
    box_model, MaterialConfig, MetadataConfig, ModelConfig, Point3DConfig, RunMode,
    SimulationConfig, Source, SurfaceCoefficient, TimingConfig, UpdateScheme,
};
use fdtd_srl::FdtdSolver;
use plotly::common::Mode;
use plotly::{Plot, Scatter};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "room-simulator-fdtd")]
#[command(about = "Room acoustics simulator using the SRL FDTD (finite-difference time-domain) scheme", long_about = None)]
struct Args {
    /// Path to JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output JSON file path
    #[arg(short, long, default_value = "output.json")]
    output: PathBuf,

    /// Write an HTML plot of the receiver responses
    #[arg(short, long)]
    plot: Option<PathBuf>,

    /// Override the update scheme
    #[arg(short, long)]
    scheme: Option<SchemeArg>,

    /// Override the number of time steps
    #[arg(long)]
    steps: Option<usize>,

    /// Number of parallel threads (default: all cores)
    #[arg(short = 't', long)]
    threads: Option<usize>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SchemeArg {
    /// SRL forward (usually the most efficient choice)
    Forward,
    /// SRL sliced (can be faster on some hardware, notably in double precision)
    Sliced,
    /// SRL centered (worst computational performance; kept for comparison)
    Centered,
}

impl From<SchemeArg> for UpdateScheme {
    fn from(arg: SchemeArg) -> Self {
        match arg {
            SchemeArg::Forward => UpdateScheme::Forward,
            SchemeArg::Sliced => UpdateScheme::Sliced,
            SchemeArg::Centered => UpdateScheme::Centered,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Set number of threads if specified
    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .expect("Failed to set thread pool");
        println!("Using {} threads\n", threads);
    }

    // Load configuration
    let mut config = if let Some(config_path) = &args.config {
        println!("Loading configuration from: {}", config_path.display());
        SimulationConfig::from_file(config_path)?
    } else {
        println!("No configuration file specified, using the built-in shoebox room");
        create_default_config()
    };

    if let Some(scheme) = args.scheme {
        config.engine.scheme = scheme.into();
    }
    if let Some(steps) = args.steps {
        config.timing.num_steps = steps;
    }

    print_config_summary(&config);

    let mut solver = FdtdSolver::from_config(&config)?;

    println!("\n=== Running Simulation ===");
    println!("Run mode: {:?}", config.run_mode);
    println!(
        "Grid: dx = {:.4} m, dt = {:.2e} s",
        solver.dx(),
        solver.dt()
    );

    match config.run_mode {
        RunMode::Simulation => solver.run_simulation()?,
        RunMode::Capture => solver.run_capture()?,
        RunMode::Visualization => {
            let mut streamed = 0usize;
            let verbose = args.verbose;
            solver.run_visualization(|frame| {
                streamed += 1;
                if verbose && frame.step % 100 == 0 {
                    println!("  frame at step {}", frame.step);
                }
            })?;
            println!("Streamed {} frames", streamed);
        }
    }

    let report = solver.report()?;
    report.print_summary();

    // Save results
    println!("\nSaving results to: {}", args.output.display());
    report.save_json(&args.output)?;

    if let Some(plot_path) = &args.plot {
        println!("Writing response plot to: {}", plot_path.display());
        write_response_plot(&report, plot_path);
    }
    println!("Done!");

    Ok(())
}

fn create_default_config() -> SimulationConfig {
    SimulationConfig {
        model: ModelConfig::Inline {
            model: box_model(2.5, 3.0, 2.2),
        },
        materials: MaterialConfig {
            default: SurfaceCoefficient::Reflection { coefficient: 0.99 },
            layers: Default::default(),
        },
        sources: vec![Source::new(fdtd_common::Point3D::new(1.25, 0.8, 1.2))],
        receivers: vec![
            Point3DConfig {
                x: 1.25,
                y: 2.2,
                z: 1.2,
            },
            Point3DConfig {
                x: 0.8,
                y: 1.5,
                z: 1.0,
            },
        ],
        timing: TimingConfig {
            fs: 20_000.0,
            num_steps: 1000,
        },
        engine: Default::default(),
        captures: Vec::new(),
        run_mode: RunMode::Simulation,
        metadata: MetadataConfig::default(),
    }
}

fn print_config_summary(config: &SimulationConfig) {
    println!("\n=== Configuration Summary ===");
    match &config.model {
        ModelConfig::File { path } => println!("Model: {}", path),
        ModelConfig::Inline { model } => println!(
            "Model: inline ({} vertices, {} triangles)",
            model.vertices.len() / 3,
            model.triangle_count()
        ),
    }

    println!("\nSources: {}", config.sources.len());
    for source in &config.sources {
        println!(
            "  - ({:.2}, {:.2}, {:.2}) {:?}/{:?}",
            source.position.x,
            source.position.y,
            source.position.z,
            source.source_type,
            source.input_type
        );
    }

    println!("Receivers: {}", config.receivers.len());
    for receiver in &config.receivers {
        println!(
            "  - ({:.2}, {:.2}, {:.2})",
            receiver.x, receiver.y, receiver.z
        );
    }

    println!(
        "\nTiming: fs = {:.0} Hz, {} steps",
        config.timing.fs, config.timing.num_steps
    );

    println!("\nEngine Configuration:");
    println!("  Scheme: {:?}", config.engine.scheme);
    println!("  Precision: {:?}", config.engine.precision);
    println!("  Partitions: {}", config.engine.partitions);
    println!("  Speed of sound: {:.1} m/s", config.engine.speed_of_sound);

    if !config.captures.is_empty() {
        println!("\nCaptures:");
        for capture in &config.captures {
            println!(
                "  - slice {} every {} steps ({:?})",
                capture.slice, capture.step_interval, capture.orientation
            );
        }
    }
}

fn write_response_plot(report: &fdtd_common::SimulationReport, path: &std::path::Path) {
    let mut plot = Plot::new();
    for (idx, response) in report.responses.iter().enumerate() {
        let time: Vec<f64> = (0..response.len()).map(|n| n as f64 * report.dt).collect();
        let label = format!("receiver {}", idx);
        let trace = Scatter::new(time, response.clone())
            .mode(Mode::Lines)
            .name(label.as_str());
        plot.add_trace(trace);
    }
    plot.write_html(path);
}
