//! # Servo Drive Binary
//!
//! Opens a drive session, enables operation, releases the brake, enables the
//! controller, commands a target position and reports the actual position.
//!
//! # Usage
//!
//! ```bash
//! # Simulated drive seeded from a device description
//! servo_drive --simulate resources/servo_drive.xml --target 10000
//!
//! # Configuration file with gearbox and status verification
//! servo_drive --config config/servo_drive.toml --gear-ratio 30 --verify
//!
//! # Register dump, JSON logs
//! servo_drive -s resources/servo_drive.xml --dump --json -v
//! ```

#![deny(warnings)]

use clap::Parser;
use servo_common::consts::DEFAULT_CONFIG_PATH;
use servo_common::prelude::*;
use servo_drive::motion::GearRatio;
use servo_drive::transports::{self, hardware::FieldbusMaster};
use servo_drive::{DescriptionCache, DriveSession};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

/// Servo Drive - CiA-402 drive control over hardware or a simulated dictionary
#[derive(Parser, Debug)]
#[command(name = "servo_drive")]
#[command(version)]
#[command(about = "CiA-402 servo drive control over a register transport")]
#[command(long_about = None)]
struct Args {
    /// Path to the drive configuration file.
    ///
    /// This build links no fieldbus master: `kind = "hardware"` fails with
    /// "transport unavailable". Use `kind = "simulation"` or `--simulate`.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Use the simulated transport seeded from this device description
    /// (ignores the configured transport).
    #[arg(short = 's', long, value_name = "ESI")]
    simulate: Option<PathBuf>,

    /// Override the device description of a configured simulated transport.
    #[arg(long, value_name = "ESI")]
    description: Option<PathBuf>,

    /// Output-side target position.
    #[arg(short, long, allow_hyphen_values = true)]
    target: Option<i32>,

    /// Gear ratio applied to the target: integer (`30`), fraction (`5/2`) or
    /// decimal with up to 9 fractional digits (`2.5`).
    #[arg(short, long)]
    gear_ratio: Option<GearRatio>,

    /// Output-side target velocity.
    #[arg(long, allow_hyphen_values = true)]
    velocity: Option<i32>,

    /// Confirm "operation enabled" through the Status Word before moving.
    #[arg(long)]
    verify: bool,

    /// Print every mapped register after the run.
    #[arg(long)]
    dump: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(args) {
        error!("Servo drive run failed: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), DriveError> {
    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            setup_tracing(&args, LogLevel::default());
            return Err(e);
        }
    };
    setup_tracing(&args, config.shared.log_level);

    info!(
        "{} v{} starting...",
        config.shared.service_name,
        env!("CARGO_PKG_VERSION")
    );

    let ratio = match args.gear_ratio {
        Some(ratio) => Some(ratio),
        None => config.motion.gear_ratio.map(GearRatio::try_from).transpose()?,
    };
    let target = args.target.unwrap_or(config.motion.target_position);
    let velocity = args.velocity.or(config.motion.target_velocity);

    let cache = Arc::new(DescriptionCache::new());
    let transport = transports::from_config(&config.transport, &cache, no_fieldbus_master)?;
    let mut session = DriveSession::with_timing(transport, config.timing.into());

    let actual = session.run(|s| {
        s.set_mode(config.motion.mode)?;
        if args.verify {
            let status = s.enable_operation_verified()?;
            info!("Status word 0x{:04X} ({})", status.bits(), status.state());
        } else {
            s.enable_operation()?;
        }
        s.release_brake()?;
        s.enable_controller()?;

        match ratio {
            Some(ratio) => {
                s.set_target_position_after_gearbox(target, ratio)?;
                if let Some(velocity) = velocity {
                    s.set_target_velocity_after_gearbox(velocity, ratio)?;
                }
            }
            None => {
                s.set_target_position(target)?;
                if let Some(velocity) = velocity {
                    s.set_target_velocity(velocity)?;
                }
            }
        }
        s.start_motion()?;
        let actual = s.read_actual_position()?;

        if args.dump {
            for snapshot in s.dump_registers() {
                match snapshot.value {
                    Ok(value) => println!("{:<36} 0x{:08X}", snapshot.register.to_string(), value),
                    Err(e) => println!("{:<36} <{}>", snapshot.register.to_string(), e),
                }
            }
        }
        Ok(actual)
    })?;

    println!("Actual position: {}", actual);
    info!("Servo drive run complete");
    Ok(())
}

/// Resolve the configuration: `--simulate` replaces the transport section
/// and works without a configuration file.
fn load_config(args: &Args) -> Result<DriveConfig, DriveError> {
    let mut config = match &args.simulate {
        Some(description) if !args.config.exists() => DriveConfig {
            shared: SharedConfig::default(),
            transport: TransportConfig::Simulation {
                description: description.clone(),
            },
            timing: TimingConfig::default(),
            motion: MotionConfig::default(),
        },
        _ => DriveConfig::load(&args.config)?,
    };

    if let Some(description) = &args.simulate {
        config.transport = TransportConfig::Simulation {
            description: description.clone(),
        };
    } else if let (Some(path), TransportConfig::Simulation { description }) =
        (&args.description, &mut config.transport)
    {
        *description = path.clone();
    }

    config.validate()?;
    Ok(config)
}

/// This build links no fieldbus master.
fn no_fieldbus_master() -> Result<Box<dyn FieldbusMaster>, DriveError> {
    Err(DriveError::TransportUnavailable(
        "no fieldbus master linked into this build; use --simulate".to_string(),
    ))
}

/// Setup tracing subscriber based on CLI arguments and configured level.
fn setup_tracing(args: &Args, configured: LogLevel) {
    let filter = if args.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(configured.as_directive()))
    };

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn hardware_without_master_is_unavailable() {
        let help = Args::command().render_long_help().to_string();
        assert!(help.contains("links no fieldbus master"));

        let args = Args::parse_from(["servo_drive", "--gear-ratio", "2.5"]);
        assert_eq!(args.gear_ratio, Some(GearRatio::new(5, 2).unwrap()));

        let cache = Arc::new(DescriptionCache::new());
        let hardware = TransportConfig::Hardware {
            ifname: "eth0".to_string(),
            position: 0,
        };
        let result = transports::from_config(&hardware, &cache, no_fieldbus_master);
        assert!(matches!(result, Err(DriveError::TransportUnavailable(_))));
    }
}
