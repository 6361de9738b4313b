//! # Pressplot CLI
//!
//! Command-line interface for printing build-up curve graphs.
//!
//! ## Usage
//!
//! ```bash
//! # List curve patterns
//! pressplot patterns
//!
//! # Print a quadratic build-up graph
//! pressplot print --pattern quadratic
//!
//! # Reproducible print on another port
//! pressplot print --pattern linear --seed 1234 --device /dev/ttyS1
//!
//! # Save the graph as PNG instead of printing
//! pressplot preview --png graph.png --seed 1234
//!
//! # Serve PRINT/STATUS/PING packets from the command port
//! pressplot --config pressplot.json listen
//!
//! # Check the link with a text-only page, or find the port first
//! pressplot ports
//! pressplot test-print --device /dev/ttyUSB0
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::{Args, Parser, Subcommand};
use tokio::sync::watch;

use pressplot::{
    PressplotError,
    config::AppConfig,
    diagnostic::TestPage,
    dispatch::{self, Inbox, LogIndicator, StatusCell},
    job::GraphJob,
    printer::{PrinterConfig, PrinterDriver, Timing, TransferReport},
    render::{CurvePattern, preview},
    transport::{MockTransport, SerialTransport, Transport, serial},
};

/// Pressplot - build-up curve printer utility
#[derive(Parser, Debug)]
#[command(name = "pressplot")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print one graph
    Print {
        #[command(flatten)]
        job: JobArgs,

        #[command(flatten)]
        port: PortArgs,

        /// Run the whole job against an in-memory transport
        #[arg(long)]
        dry_run: bool,
    },

    /// Render one graph to PNG
    Preview {
        #[command(flatten)]
        job: JobArgs,

        /// Output PNG file
        #[arg(long, value_name = "FILE")]
        png: PathBuf,
    },

    /// Accept jobs from the command port until Ctrl-C
    Listen {
        #[command(flatten)]
        port: PortArgs,

        /// Command port device path
        #[arg(long)]
        command_device: Option<String>,
    },

    /// List curve patterns
    Patterns,

    /// Print a text-only connection test page
    TestPrint {
        #[command(flatten)]
        port: PortArgs,

        /// Run against an in-memory transport
        #[arg(long)]
        dry_run: bool,
    },

    /// List candidate serial ports
    Ports,
}

#[derive(Args, Debug)]
struct JobArgs {
    /// Curve pattern (quadratic, linear, or 1/2)
    #[arg(long)]
    pattern: Option<CurvePattern>,

    /// Number of raw samples
    #[arg(long)]
    points: Option<usize>,

    /// Noise seed (defaults to the current time)
    #[arg(long)]
    seed: Option<u32>,

    /// Curve line thickness in dots
    #[arg(long)]
    thickness: Option<u8>,

    /// Draw solid instead of dashed grid lines
    #[arg(long)]
    solid_grid: bool,

    /// Title printed above the graph
    #[arg(long)]
    title: Option<String>,

    /// Skip the title and footer lines
    #[arg(long)]
    no_title: bool,
}

#[derive(Args, Debug)]
struct PortArgs {
    /// Printer device path
    #[arg(long)]
    device: Option<String>,

    /// Printer baud rate
    #[arg(long)]
    baud: Option<u32>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), PressplotError> {
    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    match cli.command {
        Commands::Patterns => {
            println!("Available patterns:");
            for pattern in CurvePattern::ALL {
                println!("  {} {:<10} {}", pattern as u8, pattern.name(), pattern.description());
            }
        }

        Commands::Preview { job, png } => {
            let job = build_job(&config, &job);
            println!("Rendering {} graph (seed {})...", job.pattern, job.seed);
            let fb = job.render(&config.layout)?;
            preview::save_png(&fb, &png)?;
            println!("Saved to {}", png.display());
        }

        Commands::Print { job, port, dry_run } => {
            apply_port(&mut config, &port);
            let job = build_job(&config, &job);
            println!("Printing {} graph (seed {})...", job.pattern, job.seed);

            if dry_run {
                let mut driver = PrinterDriver::new(
                    MockTransport::new(),
                    PrinterConfig::TM_T88III,
                    Timing::immediate(),
                );
                let report = run_job(&mut driver, &job, &config)?;
                let printer = *driver.config();
                let transport = driver.into_transport();
                let rows = config.layout.canvas_height() as u16;
                println!(
                    "Dry run: {} writes, {} bytes",
                    transport.writes().len(),
                    transport.written_bytes().len()
                );
                println!(
                    "  Graph: {:.0} mm of paper, at least {:.1} s of raster pacing",
                    printer.dots_to_mm(rows),
                    Timing::default()
                        .bitmap_estimate(report.bytes_expected, printer.chunk_size)
                        .as_secs_f32()
                );
            } else {
                let transport = SerialTransport::open(&config.serial.device, config.serial.baud)?;
                let mut driver =
                    PrinterDriver::new(transport, PrinterConfig::TM_T88III, Timing::default());
                run_job(&mut driver, &job, &config)?;
                println!("Printed successfully!");
            }
        }

        Commands::TestPrint { port, dry_run } => {
            apply_port(&mut config, &port);
            let page = TestPage::new(
                PrinterConfig::TM_T88III.name,
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            );

            if dry_run {
                let mut driver = PrinterDriver::new(
                    MockTransport::new(),
                    PrinterConfig::TM_T88III,
                    Timing::immediate(),
                );
                page.print(&mut driver)?;
                println!("Dry run: {} writes", driver.transport().writes().len());
            } else {
                println!(
                    "Testing {} at {} baud...",
                    config.serial.device, config.serial.baud
                );
                let transport = SerialTransport::open(&config.serial.device, config.serial.baud)?;
                let mut driver =
                    PrinterDriver::new(transport, PrinterConfig::TM_T88III, Timing::default());
                page.print(&mut driver)?;
                println!("Test page sent. Check the printer output.");
            }
        }

        Commands::Ports => {
            let ports = serial::list_ports()?;
            if ports.is_empty() {
                println!("No serial ports found");
            } else {
                println!("{:<20} | Kind", "Device");
                println!("{}", "-".repeat(44));
                for port in ports {
                    println!("{:<20} | {}", port.path.display(), port.kind);
                }
            }
        }

        Commands::Listen {
            port,
            command_device,
        } => {
            apply_port(&mut config, &port);
            if let Some(device) = command_device {
                config.serial.command_device = device;
            }
            config.validate()?;

            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(listen(config))?;
        }
    }

    Ok(())
}

fn apply_port(config: &mut AppConfig, port: &PortArgs) {
    if let Some(device) = &port.device {
        config.serial.device = device.clone();
    }
    if let Some(baud) = port.baud {
        config.serial.baud = baud;
    }
}

/// Merge CLI overrides into the configured job defaults.
fn build_job(config: &AppConfig, args: &JobArgs) -> GraphJob {
    let mut job = config.job.to_job(args.seed.unwrap_or_else(timer_seed));
    if let Some(pattern) = args.pattern {
        job.pattern = pattern;
    }
    if let Some(points) = args.points {
        job.num_points = points;
    }
    if let Some(thickness) = args.thickness {
        job.thickness = thickness;
    }
    if args.solid_grid {
        job.dashed_grid = false;
    }
    if let Some(title) = &args.title {
        job.title = Some(title.clone());
    }
    if args.no_title {
        job.title = None;
        job.footer = None;
    }
    job
}

/// Seed from the wall clock, for runs that do not ask for one.
fn timer_seed() -> u32 {
    let now = chrono::Utc::now();
    (now.timestamp() as u32)
        .wrapping_mul(1_000_000)
        .wrapping_add(now.timestamp_subsec_micros())
}

fn run_job<T: Transport>(
    driver: &mut PrinterDriver<T>,
    job: &GraphJob,
    config: &AppConfig,
) -> Result<TransferReport, PressplotError> {
    let report = job.run(driver, &config.layout, &config.print, &StatusCell::new())?;
    if !report.is_complete() {
        eprintln!(
            "Warning: {} of {} raster bytes were not sent",
            report.bytes_dropped(),
            report.bytes_expected
        );
    }
    Ok(report)
}

/// Inbox on a blocking thread, worker and status loop on the runtime.
async fn listen(config: AppConfig) -> Result<(), PressplotError> {
    let printer = SerialTransport::open(&config.serial.device, config.serial.baud)?;
    let driver = PrinterDriver::new(printer, PrinterConfig::TM_T88III, Timing::default());
    let commands =
        SerialTransport::open(&config.serial.command_device, config.serial.command_baud)?;

    let status = StatusCell::new();
    let (queue, jobs) = dispatch::job_queue(config.dispatch.queue_capacity);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let stop = Arc::new(AtomicBool::new(false));

    let status_task = tokio::spawn(dispatch::run_status_loop(
        status.clone(),
        LogIndicator::new(),
        config.dispatch.status_poll(),
        shutdown_rx,
    ));

    let worker = tokio::spawn(dispatch::run_worker(
        driver,
        jobs,
        config.layout,
        config.print,
        status.clone(),
        config.dispatch.idle_timeout(),
    ));

    let mut inbox = Inbox::new(
        commands,
        queue,
        status,
        config.job.clone(),
        Box::new(timer_seed),
    );
    let inbox_stop = Arc::clone(&stop);
    let mut inbox_task = tokio::task::spawn_blocking(move || inbox.run(&inbox_stop));

    println!("Listening on {} (Ctrl-C to stop)", config.serial.command_device);
    let inbox_result = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal?;
            log::info!("Shutting down after queued jobs");
            stop.store(true, Ordering::Relaxed);
            (&mut inbox_task).await
        }
        done = &mut inbox_task => done,
    }
    .map_err(|e| PressplotError::Task(e.to_string()))?;
    if let Err(e) = &inbox_result {
        log::warn!("Command inbox failed: {}", e);
    }

    // The inbox owned the queue sender; the worker drains what is left and stops.
    let (_, stats) = worker
        .await
        .map_err(|e| PressplotError::Task(e.to_string()))??;
    let _ = shutdown_tx.send(true);
    status_task
        .await
        .map_err(|e| PressplotError::Task(e.to_string()))?;

    println!(
        "Stopped: {} printed, {} failed",
        stats.completed, stats.failed
    );
    inbox_result
}
