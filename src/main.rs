mod bridge;
mod config;
mod device;
mod error;
mod mapping;
mod midi;
mod types;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{info, warn};

use bridge::{Bridge, LoopConfig};
use config::ProfileConfig;
use device::UinputSink;
use mapping::DeviceProfile;
use midi::{DeviceFileSource, MidiPortSource, MidiSource};

/// Turn a MIDI control surface into a virtual joystick
#[derive(Parser, Debug)]
#[command(name = "midi-joy", version)]
#[command(
    about = "Translate MIDI notes and controllers into joystick buttons and axes",
    long_about = None
)]
struct Args {
    /// MIDI device path (e.g. /dev/midi1), or a port name/index with --port
    #[arg(required_unless_present_any = ["list_devices", "dump_profile"])]
    source: Option<String>,

    /// Treat SOURCE as a MIDI port (ALSA sequencer) instead of a device file
    #[arg(long)]
    port: bool,

    /// List available MIDI input ports and exit
    #[arg(short = 'l', long = "list")]
    list_devices: bool,

    /// Built-in device profile
    #[arg(long, default_value = "launchcontrol-xl", value_parser = ["launchcontrol-xl", "flat"])]
    profile: String,

    /// Device profile file (YAML), replaces --profile
    #[arg(short = 'c', long = "profile-file", conflicts_with = "profile")]
    profile_file: Option<PathBuf>,

    /// Print the selected profile as YAML and exit
    #[arg(long)]
    dump_profile: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, env = "MIDI_JOY_LOG", default_value = "info")]
    log_level: String,
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // Usage goes to stderr; help and version are not failures
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    init_logging(&args.log_level);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    if args.list_devices {
        let ports = MidiPortSource::list_devices()?;
        println!("Available MIDI Input Ports:");
        for (i, port) in ports.iter().enumerate() {
            println!("  {}: {}", i, port);
        }
        return Ok(());
    }

    let profile_config = load_profile(&args)?;
    if args.dump_profile {
        print!("{}", serde_yaml::to_string(&profile_config)?);
        return Ok(());
    }
    let profile = profile_config.build()?;

    let source = args.source.context("No MIDI source given")?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start runtime")?;

    if args.port {
        let source = MidiPortSource::connect(&source)?;
        runtime.block_on(run_bridge(source, profile))
    } else {
        let source = DeviceFileSource::open(&source)?;
        info!("Opened {}", source.path().display());
        runtime.block_on(run_bridge(source, profile))
    }
}

fn load_profile(args: &Args) -> Result<ProfileConfig> {
    match &args.profile_file {
        Some(path) => {
            info!("Loading profile {}", path.display());
            ProfileConfig::load(path)
        }
        None => ProfileConfig::builtin(&args.profile)
            .with_context(|| format!("Unknown profile: {}", args.profile)),
    }
}

/// Create the virtual device and forward events until a signal arrives
async fn run_bridge<S: MidiSource>(source: S, profile: DeviceProfile) -> Result<()> {
    let sink = UinputSink::create(&profile)?;
    let mut bridge = Bridge::new(source, sink, profile, LoopConfig::default());

    if let Err(e) = bridge.initialize_controller() {
        bridge.shutdown();
        return Err(e).context("Failed to send init message to controller");
    }

    info!("Forwarding MIDI events, Ctrl+C to stop");
    let result = bridge.run(shutdown_signal()).await;
    bridge.shutdown();

    result?;
    Ok(())
}

/// Resolves on SIGINT or SIGTERM
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for SIGINT: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = interrupt => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}

fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_is_required() {
        let err = Args::try_parse_from(["midi-joy"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_extra_argument_rejected() {
        assert!(Args::try_parse_from(["midi-joy", "/dev/midi1", "/dev/midi2"]).is_err());
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["midi-joy", "/dev/midi1"]).unwrap();
        assert_eq!(args.source.as_deref(), Some("/dev/midi1"));
        assert!(!args.port);
        assert_eq!(args.profile, "launchcontrol-xl");
        assert!(args.profile_file.is_none());
    }

    #[test]
    fn test_builtin_profile_names_accepted() {
        for name in config::BUILTIN_PROFILES {
            let args = Args::try_parse_from(["midi-joy", "--profile", *name, "x"]).unwrap();
            assert!(load_profile(&args).is_ok());
        }
        assert!(Args::try_parse_from(["midi-joy", "--profile", "nope", "x"]).is_err());
    }

    #[test]
    fn test_list_and_dump_need_no_source() {
        assert!(Args::try_parse_from(["midi-joy", "--list"]).unwrap().list_devices);
        assert!(Args::try_parse_from(["midi-joy", "--dump-profile"]).unwrap().dump_profile);
    }

    #[test]
    fn test_profile_file_conflicts_with_profile() {
        let result =
            Args::try_parse_from(["midi-joy", "--profile", "flat", "-c", "p.yaml", "/dev/midi1"]);
        assert!(result.is_err());

        let args = Args::try_parse_from(["midi-joy", "--port", "-c", "p.yaml", "Launch"]).unwrap();
        assert!(args.port);
        assert_eq!(args.profile_file, Some(PathBuf::from("p.yaml")));
    }
}
