//! Locations: listing, details, item quantities, create/update, (de)activation.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::EzoClient;
use crate::error::EzoError;
use crate::form::{FieldRule, FormFields, FormPayload, FormSchema, check_one_of, require_text};
use crate::paginate::Listing;

const LOCATION_STATUSES: &[&str] = &["active", "inactive"];

/// Status filter for [`EzoClient::get_locations`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationStatus {
    All,
    #[default]
    Active,
    Inactive,
}

impl LocationStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl fmt::Display for LocationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LocationStatus {
    type Err = EzoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            other => Err(EzoError::invalid(
                "status",
                format!("'{other}' must be one of all, active, inactive"),
            )),
        }
    }
}

/// Filter for [`EzoClient::get_locations`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationFilter {
    pub status: LocationStatus,
}

impl LocationFilter {
    pub const fn new(status: LocationStatus) -> Self {
        Self { status }
    }

    /// Build a filter from loose key/value pairs.
    ///
    /// # Errors
    ///
    /// Returns [`EzoError::Precondition`] if `status` is missing or not one
    /// of `all`, `active`, `inactive`.
    pub fn from_map(map: &BTreeMap<String, String>) -> Result<Self, EzoError> {
        let status = map.get("status").ok_or_else(|| EzoError::missing("status"))?;
        Ok(Self::new(status.parse()?))
    }
}

// ── Payloads ───────────────────────────────────────────────────────

/// Body for [`EzoClient::create_location`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewLocation {
    pub name: String,
    pub parent_id: Option<u64>,
    pub identification_number: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
    pub street1: Option<String>,
    pub street2: Option<String>,
    /// `active` or `inactive`.
    pub status: Option<String>,
    pub description: Option<String>,
    /// Sent as `location[custom_attributes][<name>]`.
    pub custom_attributes: BTreeMap<String, String>,
}

impl NewLocation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl FormPayload for NewLocation {
    const SCHEMA: FormSchema = FormSchema {
        operation: "create location",
        rules: &[
            FieldRule::Exact("location[parent_id]"),
            FieldRule::Exact("location[identification_number]"),
            FieldRule::Exact("location[name]"),
            FieldRule::Exact("location[city]"),
            FieldRule::Exact("location[state]"),
            FieldRule::Exact("location[zipcode]"),
            FieldRule::Exact("location[street1]"),
            FieldRule::Exact("location[street2]"),
            FieldRule::Exact("location[status]"),
            FieldRule::Exact("location[description]"),
            FieldRule::Prefix("location[custom_attributes]"),
        ],
    };

    fn validate(&self) -> Result<(), EzoError> {
        require_text("location[name]", &self.name)?;
        match &self.status {
            Some(status) => check_one_of("location[status]", status, LOCATION_STATUSES),
            None => Ok(()),
        }
    }

    fn to_fields(&self) -> FormFields {
        let mut fields = FormFields::new();
        fields.push("location[name]", &self.name);
        fields.push_opt("location[parent_id]", self.parent_id);
        fields.push_opt(
            "location[identification_number]",
            self.identification_number.as_ref(),
        );
        push_address(
            &mut fields,
            [
                ("location[city]", self.city.as_ref()),
                ("location[state]", self.state.as_ref()),
                ("location[zipcode]", self.zipcode.as_ref()),
                ("location[street1]", self.street1.as_ref()),
                ("location[street2]", self.street2.as_ref()),
            ],
        );
        fields.push_opt("location[status]", self.status.as_ref());
        fields.push_opt("location[description]", self.description.as_ref());
        fields.push_custom("location[custom_attributes]", &self.custom_attributes);
        fields
    }
}

/// Body for [`EzoClient::update_location`]. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationUpdate {
    pub name: Option<String>,
    pub parent_id: Option<u64>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
    pub street1: Option<String>,
    pub street2: Option<String>,
    pub status: Option<String>,
    pub description: Option<String>,
    pub custom_attributes: BTreeMap<String, String>,
}

impl FormPayload for LocationUpdate {
    const SCHEMA: FormSchema = FormSchema {
        operation: "update location",
        rules: &[
            FieldRule::Exact("location[parent_id]"),
            FieldRule::Exact("location[name]"),
            FieldRule::Exact("location[city]"),
            FieldRule::Exact("location[state]"),
            FieldRule::Exact("location[zipcode]"),
            FieldRule::Exact("location[street1]"),
            FieldRule::Exact("location[street2]"),
            FieldRule::Exact("location[status]"),
            FieldRule::Exact("location[description]"),
            FieldRule::Prefix("location[custom_attributes]"),
        ],
    };

    fn validate(&self) -> Result<(), EzoError> {
        if let Some(name) = &self.name {
            require_text("location[name]", name)?;
        }
        match &self.status {
            Some(status) => check_one_of("location[status]", status, LOCATION_STATUSES),
            None => Ok(()),
        }
    }

    fn to_fields(&self) -> FormFields {
        let mut fields = FormFields::new();
        fields.push_opt("location[name]", self.name.as_ref());
        fields.push_opt("location[parent_id]", self.parent_id);
        push_address(
            &mut fields,
            [
                ("location[city]", self.city.as_ref()),
                ("location[state]", self.state.as_ref()),
                ("location[zipcode]", self.zipcode.as_ref()),
                ("location[street1]", self.street1.as_ref()),
                ("location[street2]", self.street2.as_ref()),
            ],
        );
        fields.push_opt("location[status]", self.status.as_ref());
        fields.push_opt("location[description]", self.description.as_ref());
        fields.push_custom("location[custom_attributes]", &self.custom_attributes);
        fields
    }
}

fn push_address(fields: &mut FormFields, address: [(&str, Option<&String>); 5]) {
    for (name, value) in address {
        fields.push_opt(name, value);
    }
}

// ── Client ─────────────────────────────────────────────────────────

impl EzoClient {
    /// Locations, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// See [`EzoClient::fetch_all`].
    pub async fn get_locations(&self, filter: Option<&LocationFilter>) -> Result<Vec<Value>, EzoError> {
        let mut listing = Listing::new(
            "get locations",
            "locations/get_line_item_locations.api",
            "locations",
        )
        .param("include_custom_fields", "true");
        if let Some(filter) = filter {
            listing = listing.param("status", filter.status.as_str());
        }
        self.fetch_all(&listing).await
    }

    /// # Errors
    ///
    /// Transport, status, and decode errors.
    pub async fn get_location_details(&self, location_id: u64) -> Result<Value, EzoError> {
        self.get_json(
            "get location",
            &format!("locations/{location_id}.api"),
            &[("include_custom_fields", "true")],
        )
        .await
    }

    /// Quantity of each item stocked at a location, keyed by asset id.
    ///
    /// # Errors
    ///
    /// Transport, status, and decode errors.
    pub async fn get_location_item_quantities(&self, location_id: u64) -> Result<Value, EzoError> {
        self.get_json(
            "get location item quantities",
            &format!("locations/{location_id}/quantities_by_asset_ids.api"),
            &[],
        )
        .await
    }

    /// # Errors
    ///
    /// Returns [`EzoError::Precondition`] without a name or with a status
    /// other than `active`/`inactive`; transport and status errors otherwise.
    pub async fn create_location(&self, location: &NewLocation) -> Result<Value, EzoError> {
        self.submit(Method::POST, "locations.api", location, &[]).await
    }

    /// # Errors
    ///
    /// Returns [`EzoError::Precondition`] for an invalid status; transport
    /// and status errors otherwise.
    pub async fn update_location(&self, location_id: u64, update: &LocationUpdate) -> Result<Value, EzoError> {
        self.submit(
            Method::PUT,
            &format!("locations/{location_id}.api"),
            update,
            &[],
        )
        .await
    }

    /// # Errors
    ///
    /// Transport and status errors.
    pub async fn activate_location(&self, location_id: u64) -> Result<Value, EzoError> {
        self.action(
            "activate location",
            Method::PATCH,
            &format!("locations/{location_id}/activate.api"),
        )
        .await
    }

    /// # Errors
    ///
    /// Transport and status errors.
    pub async fn deactivate_location(&self, location_id: u64) -> Result<Value, EzoError> {
        self.action(
            "deactivate location",
            Method::PATCH,
            &format!("locations/{location_id}/deactivate.api"),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("all", LocationStatus::All)]
    #[case("active", LocationStatus::Active)]
    #[case("inactive", LocationStatus::Inactive)]
    fn status_parses_known_values(#[case] raw: &str, #[case] expected: LocationStatus) {
        assert_eq!(raw.parse::<LocationStatus>().unwrap(), expected);
        assert_eq!(expected.to_string(), raw);
    }

    #[rstest]
    #[case("Active")]
    #[case("archived")]
    #[case("")]
    fn status_rejects_unknown_values(#[case] raw: &str) {
        assert!(raw.parse::<LocationStatus>().unwrap_err().is_precondition());
    }

    #[test]
    fn filter_from_map_requires_status() {
        let err = LocationFilter::from_map(&BTreeMap::new()).unwrap_err();
        assert!(matches!(err, EzoError::Precondition { ref field, .. } if field == "status"));
    }

    #[test]
    fn new_location_rejects_bogus_status() {
        let location = NewLocation {
            status: Some("bogus".into()),
            ..NewLocation::new("Warehouse 2")
        };
        assert!(location.validate().is_err());
    }

    #[test]
    fn new_location_rejects_all_status() {
        let location = NewLocation {
            status: Some("all".into()),
            ..NewLocation::new("Warehouse 2")
        };
        assert!(location.validate().is_err());
    }

    #[test]
    fn update_schema_has_no_identification_number() {
        assert!(NewLocation::SCHEMA.accepts("location[identification_number]"));
        assert!(!LocationUpdate::SCHEMA.accepts("location[identification_number]"));
    }

    #[test]
    fn new_location_renders_address_and_custom_attributes() {
        let location = NewLocation {
            city: Some("Wichita".into()),
            zipcode: Some("67202".into()),
            custom_attributes: BTreeMap::from([("Region".into(), "South".into())]),
            ..NewLocation::new("Warehouse 2")
        };
        let fields = location.encode().unwrap();
        assert_eq!(fields.get("location[name]"), Some("Warehouse 2"));
        assert_eq!(fields.get("location[city]"), Some("Wichita"));
        assert_eq!(fields.get("location[zipcode]"), Some("67202"));
        assert_eq!(fields.get("location[custom_attributes][Region]"), Some("South"));
        assert_eq!(fields.len(), 4);
    }
}
