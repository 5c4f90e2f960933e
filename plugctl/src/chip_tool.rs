//! Invocation of the external Matter commissioning binary.
//!
//! Everything protocol related (BLE discovery, commissioning, WiFi
//! provisioning, cluster commands) happens inside that binary. This module
//! only builds its argument lists, runs it to completion and hands back what
//! it printed.

use crate::types::{NodeId, OnOffCommand, OutletAddress, SetupPayload};
use std::{
    collections::BTreeSet,
    fmt, io,
    path::{Path, PathBuf},
    process::Stdio,
};
use tokio::process::Command;
use tracing::{debug, trace};

pub const DEFAULT_PROGRAM: &str = "chip-tool";

const REDACTED: &str = "***";

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Failed to launch commissioning tool '{}'", .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        error: Box<io::Error>,
    },

    #[error("'{invocation}' {}", .output.status_description())]
    Failed {
        invocation: Invocation,
        output: ToolOutput,
    },
}

impl ToolError {
    /// Whatever the tool printed before failing, if it got that far
    pub fn output(&self) -> Option<&ToolOutput> {
        match self {
            ToolError::Spawn { .. } => None,
            ToolError::Failed { output, .. } => Some(output),
        }
    }
}

/// Captured result of one run of the tool
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// `None` when terminated by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// stdout followed by stderr, the tool logs to both
    pub fn combined(&self) -> String {
        let mut out = self.stdout.clone();
        if !out.is_empty() && !out.ends_with('\n') && !self.stderr.is_empty() {
            out.push('\n');
        }
        out.push_str(&self.stderr);
        out
    }

    pub(crate) fn status_description(&self) -> String {
        match self.code {
            Some(code) => format!("exited with status {code}"),
            None => "was terminated by a signal".to_owned(),
        }
    }
}

/// Argument list for one tool run.
///
/// Arguments added with [`Invocation::secret_arg`] are masked in the
/// `Display` and `Debug` output so command lines can be logged.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    args: Vec<String>,
    secrets: BTreeSet<usize>,
}

impl Invocation {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn arg(mut self, arg: impl ToString) -> Self {
        self.args.push(arg.to_string());
        self
    }

    pub fn secret_arg(mut self, arg: impl ToString) -> Self {
        self.secrets.insert(self.args.len());
        self.arg(arg)
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// `payload parse-setup-payload <payload>`
    pub fn parse_setup_payload(payload: &SetupPayload) -> Self {
        Self::new()
            .arg("payload")
            .arg("parse-setup-payload")
            .arg(payload)
    }

    /// `pairing ble-wifi <node> <ssid> <password> <passcode> <discriminator> [extra..]`
    pub fn pair_ble_wifi(
        node: NodeId,
        ssid: &str,
        password: &str,
        passcode: u32,
        discriminator: u16,
        extra_args: &[String],
    ) -> Self {
        let mut inv = Self::new()
            .arg("pairing")
            .arg("ble-wifi")
            .arg(node)
            .arg(ssid)
            .secret_arg(password)
            .arg(passcode)
            .arg(discriminator);
        for extra in extra_args {
            inv = inv.arg(extra);
        }
        inv
    }

    /// `onoff <on|off|toggle> <node> <endpoint>`
    pub fn on_off(command: OnOffCommand, address: OutletAddress) -> Self {
        Self::new()
            .arg("onoff")
            .arg(command)
            .arg(address.node)
            .arg(address.endpoint)
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, arg) in self.args.iter().enumerate() {
            if idx != 0 {
                f.write_str(" ")?;
            }
            if self.secrets.contains(&idx) {
                f.write_str(REDACTED)?;
            } else {
                f.write_str(arg)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invocation({self})")
    }
}

/// Something that can run commissioning tool invocations to completion
#[allow(async_fn_in_trait)]
pub trait CommissioningTool {
    /// Run once and capture the output, regardless of exit status
    async fn run(&self, invocation: &Invocation) -> Result<ToolOutput, ToolError>;

    /// Run once, a non-zero exit status is an error
    async fn run_checked(&self, invocation: &Invocation) -> Result<ToolOutput, ToolError> {
        let output = self.run(invocation).await?;
        if output.success() {
            Ok(output)
        } else {
            Err(ToolError::Failed {
                invocation: invocation.clone(),
                output,
            })
        }
    }
}

/// The real `chip-tool` subprocess
#[derive(Clone, Debug)]
pub struct ChipTool {
    program: PathBuf,
}

impl Default for ChipTool {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl ChipTool {
    pub fn new(program: impl AsRef<Path>) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
        }
    }
}

impl CommissioningTool for ChipTool {
    async fn run(&self, invocation: &Invocation) -> Result<ToolOutput, ToolError> {
        debug!(program = %self.program.display(), command = %invocation, "running commissioning tool");

        let output = Command::new(&self.program)
            .args(invocation.args())
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ToolError::Spawn {
                program: self.program.clone(),
                error: Box::new(e),
            })?;

        let output = ToolOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        trace!(code = ?output.code, stdout = %output.stdout, stderr = %output.stderr, "commissioning tool finished");

        Ok(output)
    }
}


#[cfg(test)]
mod tests {
    use super::test_util::*;
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn secrets_are_masked() {
        let inv = Invocation::pair_ble_wifi(
            NodeId::from(7),
            "home",
            "hunter2",
            20202021,
            3840,
            &["--bypass-attestation-verifier".to_owned(), "true".to_owned()],
        );
        assert_eq!(
            inv.args(),
            [
                "pairing",
                "ble-wifi",
                "7",
                "home",
                "hunter2",
                "20202021",
                "3840",
                "--bypass-attestation-verifier",
                "true"
            ]
        );
        assert_eq!(
            inv.to_string(),
            "pairing ble-wifi 7 home *** 20202021 3840 --bypass-attestation-verifier true"
        );
        assert!(!format!("{inv:?}").contains("hunter2"));
    }

    #[test]
    fn on_off_arguments() {
        let inv = Invocation::on_off(OnOffCommand::Toggle, OutletAddress::new(3, 2));
        assert_eq!(inv.args(), ["onoff", "toggle", "3", "2"]);
    }

    #[test]
    fn combined_output() {
        let out = ToolOutput {
            code: Some(0),
            stdout: "a".to_owned(),
            stderr: "b\n".to_owned(),
        };
        assert_eq!(out.combined(), "a\nb\n");
    }

    #[tokio::test]
    async fn non_zero_exit_is_an_error() {
        let tool = FakeTool::with_outputs([failed(1, "boom")]);
        let inv = Invocation::new().arg("payload");
        let err = tool.run_checked(&inv).await.unwrap_err();
        assert_eq!(err.output().map(|o| o.stderr.as_str()), Some("boom"));
        assert_eq!(err.to_string(), "'payload' exited with status 1");
    }

    #[tokio::test]
    async fn missing_program_fails_to_spawn() {
        let tool = ChipTool::new("/nonexistent/plugctl-test/chip-tool");
        let err = tool.run(&Invocation::new()).await.unwrap_err();
        assert!(matches!(err, ToolError::Spawn { .. }));
        assert!(err.output().is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn captures_real_process_output() {
        let tool = ChipTool::new("sh");
        let inv = Invocation::new()
            .arg("-c")
            .arg("echo out; echo err >&2; exit 3");
        let out = tool.run(&inv).await.unwrap();
        assert_eq!(out.code, Some(3));
        assert_eq!(out.stdout, "out\n");
        assert_eq!(out.stderr, "err\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    #[tracing_test::traced_test]
    async fn logged_command_lines_hide_secrets() {
        let tool = ChipTool::new("true");
        let inv = Invocation::new().arg("ssid").secret_arg("hunter2");
        tool.run_checked(&inv).await.unwrap();
        assert!(logs_contain("ssid ***"));
        assert!(!logs_contain("hunter2"));
    }
}
