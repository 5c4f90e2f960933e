use clap::Parser;
use plugctl::{EndpointId, NodeId, PayloadSource, PowerAction};
use std::{path::PathBuf, time::Duration};

pub fn parse_args() -> Args {
    Args::parse()
}

/// `plugctl` - setup and power control for Matter smart power strips
///
/// Pairing and outlet switching are carried out by an external commissioning
/// tool (`chip-tool`). Outlets can be addressed by device id and outlet
/// number, or by a label from an operator-maintained JSON label map.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about, disable_help_subcommand(true))]
pub struct Args {
    /// Make logging more verbose
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Make logging less verbose
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    pub quiet: u8,

    /// Path to settings file.
    #[arg(long, global = true, value_name = "FILE", env = plugctl_config::CONFIG_PATH_ENV_VAR)]
    pub config: Option<PathBuf>,

    /// Commissioning tool program, overrides the settings file.
    #[arg(long, global = true, value_name = "PROGRAM")]
    pub chip_tool: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Parser, Debug)]
pub enum Command {
    Setup(Setup),
    Payload(Payload),
    #[command(subcommand)]
    Power(Power),
    #[command(subcommand)]
    Labels(Labels),
}

/// Pair a device over BLE and provision its WiFi
#[derive(Parser, Debug)]
pub struct Setup {
    #[command(flatten)]
    pub payload: PayloadOptions,

    /// Node id to assign to the device
    #[arg(long, value_name = "ID")]
    pub node_id: NodeId,

    /// WiFi network name
    #[arg(long)]
    pub ssid: String,

    /// WiFi password
    #[arg(long, env = "PLUGCTL_WIFI_PASSWORD", hide_env_values = true)]
    pub password: String,
}

/// Decode a setup payload and print its discriminator and passcode
#[derive(Parser, Debug)]
pub struct Payload {
    #[command(flatten)]
    pub payload: PayloadOptions,
}

#[derive(Parser, Debug)]
#[group(required = true, multiple = false)]
pub struct PayloadOptions {
    /// Image file holding the device's QR code
    #[arg(long, value_name = "FILE")]
    pub qr_image: Option<PathBuf>,

    /// QR code text (`MT:...`) or manual pairing code
    #[arg(long, value_name = "PAYLOAD")]
    pub qr_text: Option<String>,
}

impl PayloadOptions {
    /// clap guarantees exactly one of the two is set
    pub fn source(&self) -> PayloadSource {
        if let Some(path) = &self.qr_image {
            PayloadSource::QrImage(path.clone())
        } else {
            PayloadSource::Text(self.qr_text.clone().unwrap_or_default())
        }
    }
}

#[derive(Parser, Debug)]
pub enum Power {
    Id(PowerById),
    Label(PowerByLabel),
}

/// Switch an outlet addressed by device id and outlet number
#[derive(Parser, Debug)]
pub struct PowerById {
    pub node_id: NodeId,

    pub outlet: EndpointId,

    /// on, off, toggle or cycle
    pub action: PowerAction,

    #[command(flatten)]
    pub cycle: CycleOptions,
}

/// Switch an outlet addressed by label
#[derive(Parser, Debug)]
pub struct PowerByLabel {
    pub label: String,

    /// on, off, toggle or cycle
    pub action: PowerAction,

    #[command(flatten)]
    pub cycle: CycleOptions,

    #[command(flatten)]
    pub labels: LabelFileOptions,
}

#[derive(Parser, Debug)]
pub struct CycleOptions {
    /// Seconds to wait between off and on when cycling
    #[arg(long, value_name = "SECONDS", value_parser = parse_delay)]
    pub delay: Option<Duration>,
}

#[derive(Parser, Debug)]
pub struct LabelFileOptions {
    /// Path to the label map, overrides the settings file
    #[arg(long = "labels", value_name = "FILE")]
    pub path: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub enum Labels {
    List(ListLabels),
}

/// List the labels in the label map
#[derive(Parser, Debug)]
pub struct ListLabels {
    #[command(flatten)]
    pub labels: LabelFileOptions,
}

fn parse_delay(s: &str) -> Result<Duration, String> {
    let secs: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a number of seconds"))?;
    plugctl::config::parse_cycle_delay(secs).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Args::command().debug_assert();
    }

    #[test]
    fn delays() {
        assert_eq!(parse_delay("1.5"), Ok(Duration::from_millis(1500)));
        assert!(parse_delay("-1").is_err());
        assert!(parse_delay("soon").is_err());
    }

    #[test]
    fn power_by_id() {
        let args = Args::try_parse_from([
            "plugctl", "power", "id", "7", "2", "cycle", "--delay", "0",
        ])
        .unwrap();
        let Command::Power(Power::Id(p)) = args.command else {
            panic!("wrong command parsed")
        };
        assert_eq!(*p.node_id, 7);
        assert_eq!(*p.outlet, 2);
        assert_eq!(p.action, PowerAction::Cycle);
        assert_eq!(p.cycle.delay, Some(Duration::ZERO));
    }

    #[test]
    fn setup_needs_one_payload_source() {
        let base = ["plugctl", "setup", "--node-id", "1", "--ssid", "s", "--password", "p"];
        assert!(Args::try_parse_from(base).is_err());
        assert!(Args::try_parse_from(
            base.iter()
                .copied()
                .chain(["--qr-text", "MT:A", "--qr-image", "a.png"])
        )
        .is_err());
        assert!(Args::try_parse_from(base.iter().copied().chain(["--qr-text", "MT:A"])).is_ok());
    }

    #[test]
    fn payload_source_follows_the_given_flag() {
        let parse = |extra: [&'static str; 2]| {
            let args = Args::try_parse_from(["plugctl", "payload"].into_iter().chain(extra)).unwrap();
            let Command::Payload(p) = args.command else {
                panic!("wrong command parsed")
            };
            p.payload.source()
        };
        assert_eq!(
            parse(["--qr-image", "qr.png"]),
            PayloadSource::QrImage(PathBuf::from("qr.png"))
        );
        assert_eq!(
            parse(["--qr-text", "MT:A"]),
            PayloadSource::Text("MT:A".to_owned())
        );
    }
}
