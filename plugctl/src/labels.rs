use crate::types::{AddressParseError, OutletAddress};
use plugctl_config::{LabelMap, LabelMapReadError};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum LabelError {
    #[error(transparent)]
    Read(#[from] LabelMapReadError),
    #[error("Label '{label}' is not defined in {}", .path.display())]
    Unknown { label: String, path: PathBuf },
    #[error("Label '{label}' in {} maps to an invalid outlet '{value}'", .path.display())]
    InvalidAddress {
        label: String,
        value: String,
        path: PathBuf,
        #[source]
        error: AddressParseError,
    },
}

/// A label map read from disk, resolving labels to outlets
#[derive(Clone, Debug)]
pub struct Labels {
    path: PathBuf,
    map: LabelMap,
}

impl Labels {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, LabelError> {
        let path = path.as_ref().to_owned();
        let map = LabelMap::read(&path)?;
        Ok(Self { path, map })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn resolve(&self, label: &str) -> Result<OutletAddress, LabelError> {
        let value = self.map.get(label).ok_or_else(|| LabelError::Unknown {
            label: label.to_owned(),
            path: self.path.clone(),
        })?;
        value.parse().map_err(|error| LabelError::InvalidAddress {
            label: label.to_owned(),
            value: value.to_owned(),
            path: self.path.clone(),
            error,
        })
    }

    /// Every entry in label order, with the parsed outlet when the value is valid
    pub fn iter(
        &self,
    ) -> impl Iterator<Item = (&str, &str, Result<OutletAddress, AddressParseError>)> {
        self.map
            .iter()
            .map(|(label, value)| (label, value, value.parse()))
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn labels_file(content: &str) -> (tempfile::TempDir, PathBuf) {
        let td = tempfile::tempdir().unwrap();
        let path = td.path().join("labels.json");
        fs::write(&path, content).unwrap();
        (td, path)
    }

    #[test]
    fn resolves_known_label() {
        let (_td, path) = labels_file(indoc! {r#"
            {"lamp": "1:1", "router": "12:3", "broken": "12"}
        "#});
        let labels = Labels::read(&path).unwrap();
        assert_eq!(labels.resolve("router").unwrap(), OutletAddress::new(12, 3));
        assert_eq!(labels.iter().count(), 3);
        assert!(labels.iter().any(|(l, _, a)| l == "broken" && a.is_err()));
    }

    #[test]
    fn unknown_label_is_an_error() {
        let (_td, path) = labels_file(r#"{"lamp": "1:1"}"#);
        let err = Labels::read(&path).unwrap().resolve("kettle").unwrap_err();
        assert!(matches!(err, LabelError::Unknown { .. }));
        assert!(err.to_string().contains("'kettle'"));
    }

    #[test]
    fn invalid_value_is_an_error() {
        let (_td, path) = labels_file(r#"{"lamp": "one:1"}"#);
        let err = Labels::read(&path).unwrap().resolve("lamp").unwrap_err();
        assert!(matches!(err, LabelError::InvalidAddress { .. }));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let (_td, path) = labels_file(r#"{"lamp": "1:1""#);
        let err = Labels::read(&path).unwrap_err();
        assert!(matches!(
            err,
            LabelError::Read(LabelMapReadError::Json { .. })
        ));
    }

    #[test]
    fn missing_file_is_an_error() {
        let td = tempfile::tempdir().unwrap();
        let err = Labels::read(td.path().join("labels.json")).unwrap_err();
        assert!(matches!(err, LabelError::Read(LabelMapReadError::Io { .. })));
    }
}
