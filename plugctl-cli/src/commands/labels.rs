use crate::opts::{Labels, ListLabels};
use anyhow::Result;
use plugctl::Config;
use std::io::{self, Write};
use tabwriter::TabWriter;

const TABWRITER_HEADER: &str = "LABEL\tNODE\tOUTLET";

pub fn handle(l: Labels, config: &Config) -> Result<()> {
    match l {
        Labels::List(ListLabels { labels }) => {
            let path = match labels.path {
                Some(path) => path,
                None => config.labels_path()?.to_owned(),
            };
            let labels = plugctl::Labels::read(path)?;
            if labels.is_empty() {
                eprintln!("No labels defined in {}", labels.path().display());
                return Ok(());
            }

            let mut tw = TabWriter::new(io::stdout());
            writeln!(tw, "{TABWRITER_HEADER}")?;
            for (label, value, address) in labels.iter() {
                match address {
                    Ok(address) => writeln!(tw, "{label}\t{}\t{}", address.node, address.endpoint)?,
                    Err(_) => writeln!(tw, "{label}\tinvalid: {value:?}\t")?,
                }
            }
            tw.flush()?;
        }
    }

    Ok(())
}
