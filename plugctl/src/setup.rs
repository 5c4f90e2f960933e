use crate::chip_tool::{CommissioningTool, Invocation, ToolError};
use crate::qr::{decode_qr_image, QrDecodeError};
use crate::types::{NodeId, PayloadError, SetupPayload};
use lazy_static::lazy_static;
use regex::Regex;
use std::path::PathBuf;
use tracing::{debug, info};

lazy_static! {
    // e.g. `[1699452915.316] [3121:3121] CHIP:SPL: Long discriminator:  3840   (0xf00)`,
    // manual pairing codes only carry a `Short discriminator`
    static ref SETUP_FIELD_LINE: Regex =
        Regex::new(r"CHIP:SPL:\s+(?P<field>[A-Za-z][A-Za-z ]*?):\s+(?P<value>\d+)\b").unwrap();
}

#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error(transparent)]
    QrImage(#[from] QrDecodeError),
    #[error(transparent)]
    Payload(#[from] PayloadError),
    #[error("Failed to parse setup payload")]
    ParsePayload(#[source] ToolError),
    #[error("Failed to parse setup payload, commissioning tool output is missing the {missing}")]
    IncompleteRecord {
        missing: &'static str,
        output: String,
    },
    #[error("Failed to pair node {node}")]
    Pair {
        node: NodeId,
        #[source]
        error: ToolError,
    },
}

impl SetupError {
    /// Raw commissioning tool output behind the failure, when there is one
    pub fn tool_output(&self) -> Option<String> {
        match self {
            SetupError::IncompleteRecord { output, .. } => Some(output.clone()),
            SetupError::ParsePayload(error) | SetupError::Pair { error, .. } => {
                error.output().map(|o| o.combined())
            }
            _ => None,
        }
    }
}

/// Discriminator and passcode scraped from the commissioning tool's
/// payload parser. Only usable when both were found.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct SetupRecord {
    pub discriminator: Option<u16>,
    pub passcode: Option<u32>,
}

impl SetupRecord {
    pub fn scrape(output: &str) -> Self {
        let mut record = Self::default();
        for caps in SETUP_FIELD_LINE.captures_iter(output) {
            let value = &caps["value"];
            match caps["field"].to_ascii_lowercase().as_str() {
                "discriminator" | "long discriminator" | "short discriminator" => {
                    record.discriminator = value.parse().ok();
                }
                "passcode" | "setup pin code" | "setuppincode" => {
                    record.passcode = value.parse().ok();
                }
                _ => (),
            }
        }
        record
    }

    pub fn is_valid(&self) -> bool {
        self.discriminator.is_some() && self.passcode.is_some()
    }

    /// `(discriminator, passcode)`
    pub fn credentials(&self) -> Option<(u16, u32)> {
        Some((self.discriminator?, self.passcode?))
    }

    fn missing_fields(&self) -> &'static str {
        match (self.discriminator, self.passcode) {
            (None, None) => "discriminator and passcode",
            (None, Some(_)) => "discriminator",
            (Some(_), None) => "passcode",
            (Some(_), Some(_)) => "nothing",
        }
    }
}

/// Where a setup payload comes from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PayloadSource {
    QrImage(PathBuf),
    Text(String),
}

impl PayloadSource {
    pub fn resolve(&self) -> Result<SetupPayload, SetupError> {
        Ok(match self {
            PayloadSource::QrImage(path) => decode_qr_image(path)?,
            PayloadSource::Text(text) => crate::qr::decode_qr_text(text)?,
        })
    }
}

#[derive(Clone, Debug)]
pub struct WifiCredentials {
    pub ssid: String,
    pub password: String,
}

/// Have the commissioning tool parse a payload and scrape the result
pub async fn parse_payload<T: CommissioningTool>(
    tool: &T,
    payload: &SetupPayload,
) -> Result<SetupRecord, SetupError> {
    parse_credentials(tool, payload)
        .await
        .map(|(record, _)| record)
}

/// The scraped record along with its `(discriminator, passcode)`
async fn parse_credentials<T: CommissioningTool>(
    tool: &T,
    payload: &SetupPayload,
) -> Result<(SetupRecord, (u16, u32)), SetupError> {
    let output = tool
        .run_checked(&Invocation::parse_setup_payload(payload))
        .await
        .map_err(SetupError::ParsePayload)?;

    let output = output.combined();
    let record = SetupRecord::scrape(&output);
    debug!(?record, "scraped setup payload");
    match record.credentials() {
        Some(credentials) => Ok((record, credentials)),
        None => Err(SetupError::IncompleteRecord {
            missing: record.missing_fields(),
            output,
        }),
    }
}

/// Parse the payload, then pair the device over BLE and hand it the WiFi
/// credentials under the given node id
pub async fn commission<T: CommissioningTool>(
    tool: &T,
    source: &PayloadSource,
    node: NodeId,
    wifi: &WifiCredentials,
    extra_pairing_args: &[String],
) -> Result<SetupRecord, SetupError> {
    let payload = source.resolve()?;
    let (record, (discriminator, passcode)) = parse_credentials(tool, &payload).await?;

    info!(%node, discriminator, ssid = %wifi.ssid, "pairing device");
    tool.run_checked(&Invocation::pair_ble_wifi(
        node,
        &wifi.ssid,
        &wifi.password,
        passcode,
        discriminator,
        extra_pairing_args,
    ))
    .await
    .map_err(|error| SetupError::Pair { node, error })?;
    info!(%node, "device paired");

    Ok(record)
}
