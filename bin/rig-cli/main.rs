use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::{Parser, Subcommand};
use env_logger::Env;
use log::error;

use stm_bridge::{
    FrameRequest, MotorDirection, MotorGroup, NanonisClient, NanonisConfig,
    ParameterOrchestrator, ScanDirection, TipStatusView,
};

/// Operator console for an STM rig speaking the Nanonis TCP protocol.
#[derive(Parser, Debug)]
#[command(name = "rig-cli")]
#[command(about = "STM rig control console", long_about = None)]
struct Args {
    /// Path to a TOML configuration file; STM_RIG_* environment variables
    /// override it
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print results as JSON instead of text
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read tip position, feedback state and scan frame
    Status,
    /// Poll the tip status until interrupted
    Watch {
        /// Seconds between polls
        #[arg(long, default_value_t = 1.0)]
        interval: f64,
    },
    /// Read or set the bias voltage
    Bias {
        /// Target voltage; omit to read
        volts: Option<f32>,
        /// Ramp to the target in this many steps instead of jumping
        #[arg(long)]
        slew_steps: Option<u32>,
    },
    /// Scan lifecycle control
    Scan {
        #[command(subcommand)]
        action: ScanCommand,
    },
    /// Step the coarse motor
    Move {
        /// Direction: x+/x-/y+/y-/z+/z- or an alias like north, left, retract
        direction: String,
        /// Number of steps
        #[arg(default_value_t = 1)]
        steps: u16,
        /// Wait for the motion to finish
        #[arg(long)]
        wait: bool,
    },
    /// Withdraw the tip to the upper Z limit
    Withdraw {
        /// Seconds to wait for completion
        #[arg(long, default_value_t = 60.0)]
        timeout: f64,
    },
    /// List signal names and slot assignments
    Signals,
}

#[derive(Subcommand, Debug)]
enum ScanCommand {
    Start {
        /// Slow-axis direction: up or down
        #[arg(default_value = "up")]
        direction: String,
    },
    Stop,
    Pause,
    Resume,
    Status,
    /// Show the scan frame geometry
    Frame,
    /// Reshape the scan frame
    Reshape {
        #[arg(long)]
        x_nm: f64,
        #[arg(long)]
        y_nm: f64,
        #[arg(long)]
        width_nm: f64,
        #[arg(long)]
        height_nm: f64,
        #[arg(long, default_value_t = 0.0)]
        angle: f32,
    },
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if let Err(e) = run(args) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = NanonisConfig::load(args.config.as_deref())?;
    let client = Arc::new(NanonisClient::new(&config)?);
    let mut orchestrator = ParameterOrchestrator::new(client.clone());

    match args.command {
        Command::Status => {
            let tip = orchestrator.refresh_tip_status()?;
            let frame = orchestrator.refresh_frame()?;
            if args.json {
                println!(
                    "{}",
                    serde_json::json!({ "tip": tip, "frame": frame })
                );
            } else {
                print_tip_status(&tip);
                println!(
                    "frame:    {:.1} x {:.1} nm at ({:.1}, {:.1}) nm, {:.1} deg",
                    frame.width_nm, frame.height_nm, frame.x_nm, frame.y_nm, frame.angle_deg
                );
            }
        }
        Command::Watch { interval } => {
            let running = Arc::new(AtomicBool::new(true));
            let flag = running.clone();
            ctrlc::set_handler(move || flag.store(false, Ordering::SeqCst))?;

            while running.load(Ordering::SeqCst) {
                match orchestrator.poll_tip_status() {
                    TipStatusView::Known(tip) => {
                        if args.json {
                            println!("{}", serde_json::to_string(&tip)?);
                        } else {
                            print_tip_status(&tip);
                        }
                    }
                    TipStatusView::Unknown => println!("device offline"),
                }
                std::thread::sleep(Duration::from_secs_f64(interval));
            }
        }
        Command::Bias { volts, slew_steps } => match (volts, slew_steps) {
            (Some(target), Some(steps)) => {
                orchestrator.slew_bias(target, steps)?;
                println!("bias slewed to {target} V in {steps} steps");
            }
            (Some(target), None) => {
                client.with_session(|s| s.set_bias(target))?;
                println!("bias set to {target} V");
            }
            (None, _) => {
                let bias = client.with_session(|s| s.get_bias())?;
                println!("bias: {bias} V");
            }
        },
        Command::Scan { action } => run_scan(&client, &mut orchestrator, action, args.json)?,
        Command::Move {
            direction,
            steps,
            wait,
        } => {
            let direction = MotorDirection::from_alias(&direction)?;
            client.with_session(|s| {
                s.coarse_move(direction, steps, MotorGroup::default(), wait)
            })?;
            println!("moved {steps} step(s) {direction:?}");
        }
        Command::Withdraw { timeout } => {
            let tip =
                orchestrator.withdraw_tip(true, Some(Duration::from_secs_f64(timeout)))?;
            print_tip_status(&tip);
        }
        Command::Signals => {
            let (names, slots) =
                client.with_session(|s| Ok((s.get_signal_names()?, s.get_signals_in_slots()?)))?;
            if args.json {
                println!(
                    "{}",
                    serde_json::json!({ "names": names, "slots": slots })
                );
            } else {
                for (index, name) in names.iter().enumerate() {
                    println!("{index:3}  {name}");
                }
                println!("slots: {:?}", slots.indices);
            }
        }
    }
    Ok(())
}

fn run_scan(
    client: &Arc<NanonisClient>,
    orchestrator: &mut ParameterOrchestrator,
    action: ScanCommand,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ScanCommand::Start { direction } => {
            let direction = match direction.to_ascii_lowercase().as_str() {
                "up" => ScanDirection::Up,
                "down" => ScanDirection::Down,
                other => return Err(format!("unknown scan direction `{other}`").into()),
            };
            client.with_session(|s| s.start_scan(direction))?;
            println!("scan started");
        }
        ScanCommand::Stop => {
            client.with_session(|s| s.stop_scan())?;
            println!("scan stopped");
        }
        ScanCommand::Pause => {
            client.with_session(|s| s.pause_scan())?;
            println!("scan paused");
        }
        ScanCommand::Resume => {
            client.with_session(|s| s.resume_scan())?;
            println!("scan resumed");
        }
        ScanCommand::Status => {
            let running = client.with_session(|s| s.scan_status())?;
            println!("scan {}", if running { "running" } else { "idle" });
        }
        ScanCommand::Reshape {
            x_nm,
            y_nm,
            width_nm,
            height_nm,
            angle,
        } => {
            let settled = orchestrator.update_frame(FrameRequest {
                x_nm,
                y_nm,
                width_nm,
                height_nm,
                angle_deg: angle,
            })?;
            println!(
                "frame now {:.1} x {:.1} nm at ({:.1}, {:.1}) nm",
                settled.width_nm, settled.height_nm, settled.x_nm, settled.y_nm
            );
        }
        ScanCommand::Frame => {
            let frame = orchestrator.refresh_frame()?;
            if json {
                println!("{}", serde_json::to_string(&frame)?);
            } else {
                println!(
                    "{:.1} x {:.1} nm at ({:.1}, {:.1}) nm, {:.1} deg, aspect {}",
                    frame.width_nm,
                    frame.height_nm,
                    frame.x_nm,
                    frame.y_nm,
                    frame.angle_deg,
                    frame
                        .aspect_ratio
                        .map_or("n/a".to_string(), |a| format!("{a:.2}"))
                );
            }
        }
    }
    Ok(())
}

fn print_tip_status(tip: &stm_bridge::TipStatus) {
    println!(
        "tip:      ({:.2}, {:.2}) nm, z {:.3} nm  feedback {}  {}",
        tip.x_nm,
        tip.y_nm,
        tip.z_nm,
        if tip.feedback { "on" } else { "off" },
        if tip.withdrawn { "withdrawn" } else { "engaged" }
    );
}
