pub mod labels;
pub mod payload;
pub mod power;
pub mod setup;

/// Echo the commissioning tool's raw output so operators can see why it failed
pub(crate) fn print_tool_output(output: Option<String>) {
    if let Some(output) = output.filter(|o| !o.trim().is_empty()) {
        eprintln!("Commissioning tool output:");
        eprintln!("{}", output.trim_end());
    }
}
