use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use serde::de::DeserializeOwned;

use ezo_client::{EzoClient, EzoError};

use crate::cli::{Commands, GlobalFlags};
use crate::output::output;

pub mod assets;
pub mod locations;
pub mod work_orders;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(
    command: Commands,
    client: &EzoClient,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Assets { action } => assets::handle(&action, client, flags).await,
        Commands::Locations { action } => locations::handle(&action, client, flags).await,
        Commands::WorkOrders { action } => work_orders::handle(&action, client, flags).await,
    }
}

/// Read a JSON payload file into a typed request body.
pub fn read_payload<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read payload file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse payload file {}", path.display()))
}

/// Print a listing result. With `--allow-partial`, a listing that stopped on
/// a non-success status prints the records it read before failing.
pub fn emit_listing<T: Serialize>(
    result: Result<T, EzoError>,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match result {
        Ok(records) => output(&records, flags.format),
        Err(error) if flags.allow_partial && error.partial().is_some() => {
            tracing::warn!(%error, "printing partial listing");
            output(&error.partial(), flags.format)
        }
        Err(error) => Err(error.into()),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;
    use serde_json::Value;

    use super::read_payload;
    use ezo_client::NewLocation;

    #[test]
    fn reads_typed_payload_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{"name": "Dock 4", "city": "Leeds", "parent_id": 2}}"#).expect("write");

        let location: NewLocation = read_payload(file.path()).expect("payload should parse");

        assert_eq!(location.name, "Dock 4");
        assert_eq!(location.city.as_deref(), Some("Leeds"));
        assert_eq!(location.parent_id, Some(2));
    }

    #[test]
    fn malformed_payload_names_the_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "not json").expect("write");

        let error = read_payload::<Value>(file.path()).expect_err("should fail");

        assert!(error.to_string().contains("failed to parse payload file"));
    }

    #[test]
    fn missing_payload_file_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let error = read_payload::<Value>(&dir.path().join("absent.json")).expect_err("should fail");
        assert!(error.to_string().contains("failed to read payload file"));
    }
}
