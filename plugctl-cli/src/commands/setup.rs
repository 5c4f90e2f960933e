use crate::commands::print_tool_output;
use crate::opts::Setup;
use anyhow::Result;
use plugctl::{setup, CommissioningTool, Config, WifiCredentials};

pub async fn handle<T: CommissioningTool>(s: Setup, config: &Config, tool: &T) -> Result<()> {
    let source = s.payload.source();
    let wifi = WifiCredentials {
        ssid: s.ssid,
        password: s.password,
    };

    match setup::commission(tool, &source, s.node_id, &wifi, &config.pairing_args).await {
        Ok(record) => {
            println!(
                "Paired node {} (discriminator {})",
                s.node_id,
                record.discriminator.unwrap_or_default()
            );
            Ok(())
        }
        Err(e) => {
            print_tool_output(e.tool_output());
            Err(e.into())
        }
    }
}
