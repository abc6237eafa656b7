//! PATLITE signal tower CLI tool
//!
//! Drives the buzzer, alarm and LEDs of PATLITE LR6-USB and NE-USB signal
//! towers by writing 8 byte output reports over USB HID.

use std::io;
use std::process;

use clap::{crate_description, crate_name, crate_version, value_parser, Arg, ArgAction, ArgMatches};
use hidapi::HidApi;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::controller::{select, Command, DeviceId, SignalTower, VENDOR_ID};
use crate::error::{Error, Result};
use crate::lr6_usb::Lr6Config;
use crate::ne_usb::NeConfig;
use crate::options::{possible_labels, Count, OptionLabel, REPORT_ID};
use crate::transport::{HidTransport, Transport};

mod controller;
mod error;
mod lr6_usb;
mod ne_usb;
mod options;
mod transport;

fn main() {
    let matches = cli();

    init_logging(matches.get_count("verbose"));

    let result = match matches.subcommand() {
        Some(("lr6", matches)) => lr6_command(matches).and_then(|command| run(command, matches)),
        Some(("ne", matches)) => ne_command(matches).and_then(|command| run(command, matches)),
        Some(("reset", _)) => send(None),
        Some(("list", _)) => list(),
        _ => unreachable!("subcommand is required"),
    };

    if let Err(err) = result {
        eprintln!("\x1b[31mError:\x1b[0m {err}");
        process::exit(1);
    }
}

/// Setup `tracing` output on STDERR.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}={}", crate_name!(), level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(io::stderr))
        .init();
}

/// Send a command, or print its report for `--dry-run`.
fn run(command: Command, matches: &ArgMatches) -> Result<()> {
    if !matches.get_flag("dry-run") {
        return send(Some(command));
    }

    let bytes = command.model().controller().command_bytes(&command)?;
    println!("{} report: {:02x?}", command.model_name(), &bytes[..]);

    Ok(())
}

/// Send a command to the connected signal tower.
///
/// Without a command, the device is reset.
fn send(command: Option<Command>) -> Result<()> {
    let api = HidApi::new()?;

    let mut transport = HidTransport::connect(&api);
    let controller = select(transport.as_ref().map(HidTransport::device_id)).controller()?;
    let transport = transport.as_mut().ok_or(Error::DeviceUnavailable)?;

    write_command(controller.as_ref(), transport, command.as_ref())?;

    transport.close()
}

/// Write a command to the transport.
///
/// The report is fully encoded before anything is written.
fn write_command(
    controller: &dyn SignalTower,
    transport: &mut impl Transport,
    command: Option<&Command>,
) -> Result<()> {
    let bytes = match command {
        Some(command) => controller.command_bytes(command)?,
        None => controller.reset_bytes(),
    };

    if let Err(err) = transport.send_report(REPORT_ID, &bytes) {
        warn!(model = controller.model_name(), "Unable to send report: {err}");
        return Err(err);
    }

    let id = DeviceId::new(controller.vendor_id(), controller.product_id());
    match command {
        Some(command) => info!(%id, model = controller.model_name(), ?command, "Sent command"),
        None => info!(%id, model = controller.model_name(), "Sent reset"),
    }

    Ok(())
}

/// Print all PATLITE HID devices.
fn list() -> Result<()> {
    let api = HidApi::new()?;

    let mut devices = api.device_list().filter(|info| info.vendor_id() == VENDOR_ID).peekable();
    if devices.peek().is_none() {
        println!("No PATLITE devices found.");
        return Ok(());
    }

    for info in devices {
        let id = DeviceId::new(info.vendor_id(), info.product_id());
        let product = info.product_string().unwrap_or("unknown product");
        println!("{}  {:<14} {}", id, select(Some(id)).to_string(), product);
    }

    Ok(())
}

/// Build an LR6-USB command from CLI labels.
fn lr6_command(matches: &ArgMatches) -> Result<Command> {
    let config = Lr6Config::from_labels(
        cli_count(matches, "buzzer-count"),
        cli_label(matches, "buzzer-pattern"),
        cli_label(matches, "pitch-a"),
        cli_label(matches, "pitch-b"),
        cli_label(matches, "red"),
        cli_label(matches, "amber"),
        cli_label(matches, "green"),
    )?;

    Ok(Command::Lr6(config))
}

/// Build an NE-USB command from CLI labels.
fn ne_command(matches: &ArgMatches) -> Result<Command> {
    let config = NeConfig::from_labels(
        cli_count(matches, "alarm-count"),
        cli_label(matches, "alarm-pattern"),
        cli_count(matches, "volume"),
        cli_label(matches, "color"),
        cli_label(matches, "led-pattern"),
    )?;

    Ok(Command::Ne(config))
}

/// Get a label parameter, an empty label is rejected by the option lookup.
#[inline]
fn cli_label<'a>(matches: &'a ArgMatches, name: &str) -> &'a str {
    matches.get_one::<String>(name).map(String::as_str).unwrap_or_default()
}

/// Get a numeric parameter.
#[inline]
fn cli_count(matches: &ArgMatches, name: &str) -> u8 {
    matches.get_one::<u8>(name).copied().unwrap_or_default()
}

/// Get clap CLI parameters.
fn cli() -> ArgMatches {
    cli_command().get_matches()
}

/// Option taking a label.
fn label_arg<T: OptionLabel>(name: &'static str, help: &str, default: &'static str) -> Arg {
    Arg::new(name)
        .help(format!("{} [possible values: {}]", help, possible_labels::<T>()))
        .long(name)
        .default_value(default)
}

/// Option taking a small number.
fn count_arg(name: &'static str, help: String, default: &'static str) -> Arg {
    Arg::new(name).help(help).long(name).value_parser(value_parser!(u8)).default_value(default)
}

fn dry_run_arg() -> Arg {
    Arg::new("dry-run")
        .help("Print the report instead of sending it")
        .long("dry-run")
        .action(ArgAction::SetTrue)
}

fn cli_command() -> clap::Command {
    use crate::{lr6_usb, ne_usb};

    let count_help = format!("Repeat count [possible values: 0..={}]", Count::MAX);

    clap::Command::new(crate_name!())
        .version(crate_version!())
        .about(crate_description!())
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .help("Increase log verbosity")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::Count),
        )
        .subcommand(
            clap::Command::new("lr6")
                .about("Drive the buzzer and LEDs of an LR6-USB")
                .arg(count_arg("buzzer-count", count_help.clone(), "15"))
                .arg(label_arg::<lr6_usb::BuzzerPattern>(
                    "buzzer-pattern",
                    "Buzzer pattern",
                    "pattern1",
                ))
                .arg(label_arg::<lr6_usb::Pitch>("pitch-a", "First buzzer pitch", "F7"))
                .arg(label_arg::<lr6_usb::Pitch>("pitch-b", "Second buzzer pitch", "A7"))
                .arg(label_arg::<lr6_usb::LedPattern>("red", "Red LED pattern", "on"))
                .arg(label_arg::<lr6_usb::LedPattern>("amber", "Amber LED pattern", "on"))
                .arg(label_arg::<lr6_usb::LedPattern>("green", "Green LED pattern", "on"))
                .arg(dry_run_arg()),
        )
        .subcommand(
            clap::Command::new("ne")
                .about("Drive the alarm and LED of an NE-USB")
                .arg(count_arg("alarm-count", count_help, "15"))
                .arg(label_arg::<ne_usb::AlarmPattern>(
                    "alarm-pattern",
                    "Alarm pattern",
                    "lowUrgency",
                ))
                .arg(count_arg("volume", format!("Alarm volume [0..={}]", ne_usb::MAX_VOLUME), "10"))
                .arg(label_arg::<ne_usb::LedColor>("color", "LED color", "green"))
                .arg(label_arg::<ne_usb::LedPattern>("led-pattern", "LED pattern", "pattern1"))
                .arg(dry_run_arg()),
        )
        .subcommand(clap::Command::new("reset").about("Turn off buzzer, alarm and LEDs"))
        .subcommand(clap::Command::new("list").about("List connected PATLITE devices"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::Selection;
    use crate::transport::mock::MockTransport;

    fn subcommand(args: &[&str]) -> ArgMatches {
        let matches = cli_command().try_get_matches_from(args.iter().copied()).unwrap();
        let (_, matches) = matches.subcommand().unwrap();
        matches.clone()
    }

    #[test]
    fn cli_defaults_match_config_defaults() {
        let command = lr6_command(&subcommand(&["patlite", "lr6"])).unwrap();
        assert_eq!(command, Command::Lr6(Lr6Config::default()));

        let command = ne_command(&subcommand(&["patlite", "ne"])).unwrap();
        assert_eq!(command, Command::Ne(NeConfig::default()));
    }

    #[test]
    fn cli_labels_are_validated() {
        let matches = subcommand(&["patlite", "lr6", "--pitch-b", "bogus"]);
        let err = lr6_command(&matches).unwrap_err();
        assert!(matches!(err, Error::InvalidOption { field: "pitchB", .. }));

        let matches = subcommand(&["patlite", "ne", "--alarm-count", "16"]);
        let err = ne_command(&matches).unwrap_err();
        assert!(matches!(err, Error::InvalidOption { field: "alarmCount", .. }));
    }

    #[test]
    fn cli_volume_is_not_limited() {
        let matches = subcommand(&["patlite", "ne", "--volume", "15"]);
        match ne_command(&matches).unwrap() {
            Command::Ne(config) => assert_eq!(config.alarm_volume, 15),
            command => panic!("unexpected command {:?}", command),
        }
    }

    #[test]
    fn write_lr6_command() {
        let mut transport = MockTransport::default();
        let controller = select(Some(DeviceId::new(VENDOR_ID, 0x8003))).controller().unwrap();

        let config = Lr6Config::from_labels(15, "on", "F7", "A7", "on", "on", "on").unwrap();
        write_command(controller.as_ref(), &mut transport, Some(&Command::Lr6(config))).unwrap();

        assert_eq!(transport.reports, vec![(0, vec![0x00, 0x00, 0xf1, 0x9d, 0x11, 0x10, 0x00, 0x00])]);
    }

    #[test]
    fn write_ne_command() {
        let mut transport = MockTransport::default();
        let controller = select(Some(DeviceId::new(VENDOR_ID, 0x6001))).controller().unwrap();

        let config = NeConfig::from_labels(15, "lowUrgency", 10, "green", "pattern1").unwrap();
        write_command(controller.as_ref(), &mut transport, Some(&Command::Ne(config))).unwrap();

        assert_eq!(transport.reports, vec![(0, vec![0x00, 0x00, 0xf4, 0x0a, 0x22, 0x00, 0x00, 0x00])]);
    }

    #[test]
    fn reset_writes_zero_report() {
        for selection in [Selection::Lr6, Selection::Ne].iter() {
            let mut transport = MockTransport::default();
            let controller = selection.controller().unwrap();

            write_command(controller.as_ref(), &mut transport, None).unwrap();

            assert_eq!(transport.reports, vec![(0, vec![0x00; 8])]);
        }
    }

    #[test]
    fn mismatched_command_is_not_sent() {
        let mut transport = MockTransport::default();
        let controller = Selection::Ne.controller().unwrap();

        let command = Command::Lr6(Lr6Config::default());
        let err = write_command(controller.as_ref(), &mut transport, Some(&command)).unwrap_err();

        assert!(matches!(err, Error::ModelMismatch { .. }));
        assert!(transport.reports.is_empty());
    }

    #[test]
    fn closed_transport_is_unavailable() {
        let mut transport = MockTransport::default();
        transport.close().unwrap();
        let controller = Selection::Lr6.controller().unwrap();

        let err = write_command(controller.as_ref(), &mut transport, None).unwrap_err();

        assert!(matches!(err, Error::DeviceUnavailable));
        assert!(transport.reports.is_empty());
    }

    #[test]
    fn transport_failure_is_surfaced() {
        let mut transport = MockTransport { failing: true, ..Default::default() };
        let controller = Selection::Ne.controller().unwrap();

        let command = Command::Ne(NeConfig::default());
        let err = write_command(controller.as_ref(), &mut transport, Some(&command)).unwrap_err();

        assert!(matches!(err, Error::Transport(_)));
        assert!(transport.reports.is_empty());
    }
}
