use crate::commands::print_tool_output;
use crate::opts::{CycleOptions, Power, PowerById, PowerByLabel};
use anyhow::Result;
use plugctl::{CommissioningTool, Config, Labels, OutletAddress, PowerAction, PowerController};

pub async fn handle<T: CommissioningTool>(p: Power, config: &Config, tool: &T) -> Result<()> {
    match p {
        Power::Id(PowerById {
            node_id,
            outlet,
            action,
            cycle,
        }) => {
            let address = OutletAddress {
                node: node_id,
                endpoint: outlet,
            };
            switch(tool, config, address, action, &cycle).await?;
            println!("Node {node_id} outlet {outlet}: {action}");
        }
        Power::Label(PowerByLabel {
            label,
            action,
            cycle,
            labels,
        }) => {
            let path = match labels.path {
                Some(path) => path,
                None => config.labels_path()?.to_owned(),
            };
            let address = Labels::read(path)?.resolve(&label)?;
            switch(tool, config, address, action, &cycle).await?;
            println!(
                "{label} (node {} outlet {}): {action}",
                address.node, address.endpoint
            );
        }
    }

    Ok(())
}

async fn switch<T: CommissioningTool>(
    tool: &T,
    config: &Config,
    address: OutletAddress,
    action: PowerAction,
    cycle: &CycleOptions,
) -> Result<()> {
    let controller =
        PowerController::new(tool).with_cycle_delay(cycle.delay.unwrap_or(config.cycle_delay));

    if let Err(e) = controller.apply(address, action).await {
        print_tool_output(e.error.output().map(|o| o.combined()));
        return Err(e.into());
    }

    Ok(())
}
