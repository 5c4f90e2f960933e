use derive_more::{AsRef, Deref, Display, From, FromStr, Into};
use std::{num::ParseIntError, str::FromStr};

/// Matter operational node id assigned at pairing time
#[derive(
    Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display, From, FromStr, Into, Deref,
)]
pub struct NodeId(u64);

/// Endpoint number of a single outlet on a strip
#[derive(
    Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display, From, FromStr, Into, Deref,
)]
pub struct EndpointId(u16);

#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum AddressParseError {
    #[error("Expected \"device-id:outlet-number\", found '{_0}'")]
    MissingSeparator(String),
    #[error("Invalid device id '{_0}'")]
    NodeId(String, #[source] ParseIntError),
    #[error("Invalid outlet number '{_0}'")]
    Endpoint(String, #[source] ParseIntError),
}

/// One outlet of one device, written `device-id:outlet-number`
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display)]
#[display(fmt = "{}:{}", node, endpoint)]
pub struct OutletAddress {
    pub node: NodeId,
    pub endpoint: EndpointId,
}

impl OutletAddress {
    pub fn new(node: u64, endpoint: u16) -> Self {
        Self {
            node: NodeId(node),
            endpoint: EndpointId(endpoint),
        }
    }
}

impl FromStr for OutletAddress {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (node, endpoint) = s
            .split_once(':')
            .ok_or_else(|| AddressParseError::MissingSeparator(s.to_owned()))?;
        let node = node.trim();
        let endpoint = endpoint.trim();
        Ok(Self {
            node: node
                .parse()
                .map_err(|e| AddressParseError::NodeId(node.to_owned(), e))?,
            endpoint: endpoint
                .parse()
                .map_err(|e| AddressParseError::Endpoint(endpoint.to_owned(), e))?,
        })
    }
}

/// A single on/off cluster command understood by the commissioning tool
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display)]
#[display(fmt = "{}")]
pub enum OnOffCommand {
    #[display(fmt = "{}", "self.as_str()")]
    On,
    #[display(fmt = "{}", "self.as_str()")]
    Off,
    #[display(fmt = "{}", "self.as_str()")]
    Toggle,
}

impl OnOffCommand {
    pub fn as_str(self) -> &'static str {
        use OnOffCommand::*;
        match self {
            On => "on",
            Off => "off",
            Toggle => "toggle",
        }
    }
}

/// What an operator asks of an outlet
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display)]
#[display(fmt = "{}")]
pub enum PowerAction {
    #[display(fmt = "{}", "self.as_str()")]
    On,
    #[display(fmt = "{}", "self.as_str()")]
    Off,
    #[display(fmt = "{}", "self.as_str()")]
    Toggle,
    /// Off, wait, then on
    #[display(fmt = "{}", "self.as_str()")]
    Cycle,
}

impl PowerAction {
    pub fn as_str(self) -> &'static str {
        use PowerAction::*;
        match self {
            On => "on",
            Off => "off",
            Toggle => "toggle",
            Cycle => "cycle",
        }
    }
}

impl FromStr for PowerAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "on" => Ok(PowerAction::On),
            "off" => Ok(PowerAction::Off),
            "toggle" => Ok(PowerAction::Toggle),
            "cycle" => Ok(PowerAction::Cycle),
            _ => Err(format!(
                "'{s}' is not a valid power action, expected one of on, off, toggle, cycle"
            )),
        }
    }
}

const QR_PAYLOAD_PREFIX: &str = "MT:";
const QR_PAYLOAD_ALPHABET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ-.";

#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum PayloadError {
    #[error("Setup payload is empty")]
    Empty,
    #[error("'{_0}' is neither an MT: QR payload nor an 11 or 21 digit manual pairing code")]
    Unrecognized(String),
}

/// Onboarding payload text, either a QR string (`MT:...`) or a numeric
/// manual pairing code with separators removed
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, AsRef, Deref, Display, Into)]
pub struct SetupPayload(String);

impl SetupPayload {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for SetupPayload {
    type Err = PayloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PayloadError::Empty);
        }

        if let Some(body) = s.strip_prefix(QR_PAYLOAD_PREFIX) {
            if !body.is_empty() && body.chars().all(|c| QR_PAYLOAD_ALPHABET.contains(c)) {
                return Ok(Self(s.to_owned()));
            }
            return Err(PayloadError::Unrecognized(s.to_owned()));
        }

        let digits: String = s.chars().filter(|c| !matches!(c, '-' | ' ')).collect();
        if digits.chars().all(|c| c.is_ascii_digit()) && matches!(digits.len(), 11 | 21) {
            Ok(Self(digits))
        } else {
            Err(PayloadError::Unrecognized(s.to_owned()))
        }
    }
}
