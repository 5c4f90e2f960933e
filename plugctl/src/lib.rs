pub mod chip_tool;
pub mod config;
pub mod labels;
pub mod power;
pub mod qr;
pub mod setup;
pub mod types;

pub use chip_tool::{ChipTool, CommissioningTool};
pub use config::Config;
pub use labels::Labels;
pub use power::PowerController;
pub use setup::{PayloadSource, SetupRecord, WifiCredentials};
pub use types::{EndpointId, NodeId, OutletAddress, PowerAction, SetupPayload};
