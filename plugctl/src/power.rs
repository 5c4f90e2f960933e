use crate::chip_tool::{CommissioningTool, Invocation, ToolError};
use crate::types::{OnOffCommand, OutletAddress, PowerAction};
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_CYCLE_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
#[error("Failed to switch node {} outlet {} {command}", .address.node, .address.endpoint)]
pub struct PowerError {
    pub address: OutletAddress,
    pub command: OnOffCommand,
    #[source]
    pub error: ToolError,
}

/// Drives outlets through the commissioning tool's on/off cluster commands
#[derive(Debug)]
pub struct PowerController<'t, T> {
    tool: &'t T,
    cycle_delay: Duration,
}

impl<'t, T: CommissioningTool> PowerController<'t, T> {
    pub fn new(tool: &'t T) -> Self {
        Self {
            tool,
            cycle_delay: DEFAULT_CYCLE_DELAY,
        }
    }

    pub fn with_cycle_delay(mut self, cycle_delay: Duration) -> Self {
        self.cycle_delay = cycle_delay;
        self
    }

    pub async fn apply(
        &self,
        address: OutletAddress,
        action: PowerAction,
    ) -> Result<(), PowerError> {
        match action {
            PowerAction::On => self.send(address, OnOffCommand::On).await,
            PowerAction::Off => self.send(address, OnOffCommand::Off).await,
            PowerAction::Toggle => self.send(address, OnOffCommand::Toggle).await,
            PowerAction::Cycle => {
                self.send(address, OnOffCommand::Off).await?;
                debug!(%address, delay = ?self.cycle_delay, "waiting before switching back on");
                tokio::time::sleep(self.cycle_delay).await;
                self.send(address, OnOffCommand::On).await
            }
        }
    }

    async fn send(
        &self,
        address: OutletAddress,
        command: OnOffCommand,
    ) -> Result<(), PowerError> {
        self.tool
            .run_checked(&Invocation::on_off(command, address))
            .await
            .map_err(|error| PowerError {
                address,
                command,
                error,
            })?;
        info!(%address, %command, "outlet switched");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip_tool::test_util::{failed, ok, FakeTool};
    use pretty_assertions::assert_eq;

    #[tokio::test(start_paused = true)]
    async fn cycle_is_off_delay_on() {
        let tool = FakeTool::default();
        let delay = Duration::from_secs(3);
        PowerController::new(&tool)
            .with_cycle_delay(delay)
            .apply(OutletAddress::new(4, 2), PowerAction::Cycle)
            .await
            .unwrap();

        assert_eq!(
            tool.calls(),
            vec![vec!["onoff", "off", "4", "2"], vec!["onoff", "on", "4", "2"]]
        );
        let times = tool.call_times.borrow();
        assert!(times[1] - times[0] >= delay);
    }

    #[tokio::test]
    async fn single_commands() {
        let tool = FakeTool::default();
        let ctl = PowerController::new(&tool);
        let addr = OutletAddress::new(1, 1);
        ctl.apply(addr, PowerAction::On).await.unwrap();
        ctl.apply(addr, PowerAction::Off).await.unwrap();
        ctl.apply(addr, PowerAction::Toggle).await.unwrap();

        assert_eq!(
            tool.calls(),
            vec![
                vec!["onoff", "on", "1", "1"],
                vec!["onoff", "off", "1", "1"],
                vec!["onoff", "toggle", "1", "1"],
            ]
        );
    }

    #[tokio::test]
    async fn failed_off_skips_on() {
        let tool = FakeTool::with_outputs([failed(1, "CHIP:TOO: Run command failure")]);
        let err = PowerController::new(&tool)
            .with_cycle_delay(Duration::ZERO)
            .apply(OutletAddress::new(9, 1), PowerAction::Cycle)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Failed to switch node 9 outlet 1 off");
        assert_eq!(tool.calls().len(), 1);
    }

    #[tokio::test]
    async fn failed_on_after_off_is_reported() {
        let tool = FakeTool::with_outputs([ok(""), failed(2, "")]);
        let err = PowerController::new(&tool)
            .with_cycle_delay(Duration::ZERO)
            .apply(OutletAddress::new(9, 1), PowerAction::Cycle)
            .await
            .unwrap_err();

        assert_eq!(err.command, OnOffCommand::On);
        assert_eq!(tool.calls().len(), 2);
    }
}
