use crate::commands::print_tool_output;
use crate::opts::Payload;
use anyhow::Result;
use plugctl::{setup, CommissioningTool};

pub async fn handle<T: CommissioningTool>(p: Payload, tool: &T) -> Result<()> {
    let payload = p.payload.source().resolve()?;

    match setup::parse_payload(tool, &payload).await {
        Ok(record) => {
            if let Some((discriminator, passcode)) = record.credentials() {
                println!("Payload:       {payload}");
                println!("Discriminator: {discriminator}");
                println!("Passcode:      {passcode}");
            }
            Ok(())
        }
        Err(e) => {
            print_tool_output(e.tool_output());
            Err(e.into())
        }
    }
}
