use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
    str::FromStr,
};

#[derive(Debug, thiserror::Error)]
pub enum LabelMapReadError {
    #[error("Label map file {} could not be read", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        error: Box<io::Error>,
    },

    #[error("Label map file {} is not a JSON object of label to \"id:outlet\" strings", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        error: Box<serde_json::Error>,
    },
}

/// Operator-maintained map of label to `"device-id:outlet-number"`.
///
/// The file is never written by this crate.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelMap(BTreeMap<String, String>);

impl LabelMap {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, LabelMapReadError> {
        let content = fs::read_to_string(&path).map_err(|e| LabelMapReadError::Io {
            path: path.as_ref().to_owned(),
            error: Box::new(e),
        })?;
        Self::from_str(&content).map_err(|e| LabelMapReadError::Json {
            path: path.as_ref().to_owned(),
            error: Box::new(e),
        })
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.0.get(label).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromStr for LabelMap {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s)
    }
}
