use std::path::PathBuf;

use clap::Subcommand;
use ezo_client::{LocationStatus, WorkOrderFilter};

/// Parse a `key=value` pair.
pub fn parse_key_val(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .filter(|(k, _)| !k.is_empty())
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))
}

#[derive(Clone, Debug, Subcommand)]
pub enum AssetCommands {
    /// List assets. Without --status every asset is fetched.
    List {
        #[arg(long)]
        status: Option<String>,
        /// Extra filter, repeatable (requires --status)
        #[arg(long = "param", value_parser = parse_key_val, requires = "status")]
        params: Vec<(String, String)>,
    },
    /// Full-text search.
    Search { term: String },
    /// Check-in/check-out history.
    History { id: u64 },
    /// Create an asset from a JSON payload file.
    Create {
        #[arg(long)]
        file: PathBuf,
    },
    /// Update an asset from a JSON payload file.
    Update {
        id: u64,
        #[arg(long)]
        file: PathBuf,
    },
    Delete { id: u64 },
    /// Check an asset in to a location.
    Checkin {
        id: u64,
        #[arg(long)]
        location: u64,
        #[arg(long)]
        comments: Option<String>,
    },
    /// Check an asset out to a member.
    Checkout {
        id: u64,
        #[arg(long)]
        user: u64,
        #[arg(long)]
        location: Option<u64>,
        #[arg(long)]
        comments: Option<String>,
        /// Return date, mm/dd/yyyy
        #[arg(long)]
        till: Option<String>,
    },
}

#[derive(Clone, Debug, Subcommand)]
pub enum LocationCommands {
    List {
        #[arg(long, value_parser = parse_location_status)]
        status: Option<LocationStatus>,
    },
    Show { id: u64 },
    /// Item quantities stocked at a location.
    Quantities { id: u64 },
    /// Create a location from a JSON payload file.
    Create {
        #[arg(long)]
        file: PathBuf,
    },
    /// Update a location from a JSON payload file.
    Update {
        id: u64,
        #[arg(long)]
        file: PathBuf,
    },
    Activate { id: u64 },
    Deactivate { id: u64 },
}

#[derive(Clone, Debug, Subcommand)]
pub enum WorkOrderCommands {
    /// List work orders in one state.
    List {
        #[arg(value_parser = parse_work_order_filter)]
        filter: WorkOrderFilter,
    },
    Show { id: u64 },
    Types,
    Checklists,
    /// Create a work order from a JSON payload file.
    Create {
        #[arg(long)]
        file: PathBuf,
    },
    Start { id: u64 },
    End { id: u64 },
    /// Log time against a work order.
    Log {
        id: u64,
        #[arg(long)]
        hours: f64,
        #[arg(long)]
        user: u64,
        #[arg(long)]
        description: Option<String>,
    },
    /// Link inventory to a work order from a JSON payload file.
    Link {
        id: u64,
        #[arg(long)]
        file: PathBuf,
    },
}

fn parse_location_status(raw: &str) -> Result<LocationStatus, String> {
    raw.parse().map_err(|e: ezo_client::EzoError| e.to_string())
}

fn parse_work_order_filter(raw: &str) -> Result<WorkOrderFilter, String> {
    raw.parse().map_err(|e: ezo_client::EzoError| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_key_val_splits_on_first_equals() {
        assert_eq!(
            parse_key_val("note=a=b").unwrap(),
            ("note".to_string(), "a=b".to_string())
        );
    }

    #[test]
    fn parse_key_val_rejects_missing_key() {
        assert!(parse_key_val("=3").is_err());
        assert!(parse_key_val("nothing").is_err());
    }
}
