//! Fixed assets: listing, search, CRUD, check-in/check-out, history.

use std::collections::BTreeMap;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::EzoClient;
use crate::error::EzoError;
use crate::form::{
    FieldRule, FormFields, FormPayload, FormSchema, check_date, check_optional_date, require_id,
    require_text,
};
use crate::paginate::Listing;

/// Flags that make asset listings include custom fields and attachments.
const DETAIL_FLAGS: [(&str, &str); 3] = [
    ("include_custom_fields", "true"),
    ("show_document_urls", "true"),
    ("show_image_urls", "true"),
];

/// Query keys the filtered listing sets itself; extra filter params never
/// override them.
fn is_reserved_filter_key(name: &str) -> bool {
    name == "status" || name == "page" || DETAIL_FLAGS.iter().any(|(flag, _)| *flag == name)
}

const ASSET_RULES: &[FieldRule] = &[
    FieldRule::Exact("fixed_asset[name]"),
    FieldRule::Exact("fixed_asset[description]"),
    FieldRule::Exact("fixed_asset[group_id]"),
    FieldRule::Exact("fixed_asset[sub_group_id]"),
    FieldRule::Exact("fixed_asset[purchased_on]"),
    FieldRule::Exact("fixed_asset[location_id]"),
    FieldRule::Exact("fixed_asset[image_url]"),
    FieldRule::Exact("fixed_asset[document_urls][]"),
    FieldRule::Exact("fixed_asset[identifier]"),
    FieldRule::Prefix("cust_attr"),
];

// ── Filters ────────────────────────────────────────────────────────

/// Filter for [`EzoClient::get_filtered_assets`].
///
/// `status` is mandatory; any other filter the endpoint understands goes in
/// `params`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetFilter {
    pub status: String,
    #[serde(default, flatten)]
    pub params: BTreeMap<String, String>,
}

impl AssetFilter {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            params: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        if name == "status" {
            self.status = value.into();
        } else {
            self.params.insert(name, value.into());
        }
        self
    }

    /// Build a filter from loose key/value pairs.
    ///
    /// # Errors
    ///
    /// Returns [`EzoError::Precondition`] if there is no non-empty `status`.
    pub fn from_map(mut map: BTreeMap<String, String>) -> Result<Self, EzoError> {
        let status = map
            .remove("status")
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| EzoError::missing("status"))?;
        Ok(Self { status, params: map })
    }

    fn validate(&self) -> Result<(), EzoError> {
        require_text("status", &self.status)
    }
}

// ── Payloads ───────────────────────────────────────────────────────

/// Body for [`EzoClient::create_asset`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewAsset {
    pub name: String,
    pub group_id: u64,
    /// `mm/dd/yyyy`.
    pub purchased_on: String,
    pub description: Option<String>,
    pub sub_group_id: Option<u64>,
    pub location_id: Option<u64>,
    pub image_url: Option<String>,
    pub document_urls: Vec<String>,
    pub identifier: Option<String>,
    /// Sent as `cust_attr[<name>]`.
    pub custom_attributes: BTreeMap<String, String>,
}

impl NewAsset {
    pub fn new(name: impl Into<String>, group_id: u64, purchased_on: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            group_id,
            purchased_on: purchased_on.into(),
            ..Self::default()
        }
    }
}

impl FormPayload for NewAsset {
    const SCHEMA: FormSchema = FormSchema {
        operation: "create asset",
        rules: ASSET_RULES,
    };

    fn validate(&self) -> Result<(), EzoError> {
        require_text("fixed_asset[name]", &self.name)?;
        require_id("fixed_asset[group_id]", self.group_id)?;
        require_text("fixed_asset[purchased_on]", &self.purchased_on)?;
        check_date("fixed_asset[purchased_on]", &self.purchased_on)
    }

    fn to_fields(&self) -> FormFields {
        let mut fields = FormFields::new();
        fields.push("fixed_asset[name]", &self.name);
        fields.push("fixed_asset[group_id]", self.group_id);
        fields.push("fixed_asset[purchased_on]", &self.purchased_on);
        fields.push_opt("fixed_asset[description]", self.description.as_ref());
        fields.push_opt("fixed_asset[sub_group_id]", self.sub_group_id);
        fields.push_opt("fixed_asset[location_id]", self.location_id);
        fields.push_opt("fixed_asset[image_url]", self.image_url.as_ref());
        fields.push_opt("fixed_asset[identifier]", self.identifier.as_ref());
        for url in &self.document_urls {
            fields.push("fixed_asset[document_urls][]", url);
        }
        fields.push_custom("cust_attr", &self.custom_attributes);
        fields
    }
}

/// Body for [`EzoClient::update_asset`]. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub group_id: Option<u64>,
    pub sub_group_id: Option<u64>,
    pub identifier: Option<String>,
    /// `mm/dd/yyyy`.
    pub purchased_on: Option<String>,
    pub location_id: Option<u64>,
    pub image_url: Option<String>,
    pub document_urls: Vec<String>,
    pub custom_attributes: BTreeMap<String, String>,
}

impl FormPayload for AssetUpdate {
    const SCHEMA: FormSchema = FormSchema {
        operation: "update asset",
        rules: ASSET_RULES,
    };

    fn validate(&self) -> Result<(), EzoError> {
        check_optional_date("fixed_asset[purchased_on]", self.purchased_on.as_deref())
    }

    fn to_fields(&self) -> FormFields {
        let mut fields = FormFields::new();
        fields.push_opt("fixed_asset[name]", self.name.as_ref());
        fields.push_opt("fixed_asset[description]", self.description.as_ref());
        fields.push_opt("fixed_asset[group_id]", self.group_id);
        fields.push_opt("fixed_asset[sub_group_id]", self.sub_group_id);
        fields.push_opt("fixed_asset[identifier]", self.identifier.as_ref());
        fields.push_opt("fixed_asset[purchased_on]", self.purchased_on.as_ref());
        fields.push_opt("fixed_asset[location_id]", self.location_id);
        fields.push_opt("fixed_asset[image_url]", self.image_url.as_ref());
        for url in &self.document_urls {
            fields.push("fixed_asset[document_urls][]", url);
        }
        fields.push_custom("cust_attr", &self.custom_attributes);
        fields
    }
}

/// Body for [`EzoClient::checkin_asset`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetCheckin {
    pub location_id: u64,
    pub comments: Option<String>,
    /// Sent as `checkin_values[c_attr_vals][<name>]`.
    pub custom_attributes: BTreeMap<String, String>,
}

impl AssetCheckin {
    pub fn new(location_id: u64) -> Self {
        Self {
            location_id,
            ..Self::default()
        }
    }
}

impl FormPayload for AssetCheckin {
    const SCHEMA: FormSchema = FormSchema {
        operation: "check in asset",
        rules: &[
            FieldRule::Exact("checkin_values[location_id]"),
            FieldRule::Exact("checkin_values[comments]"),
            FieldRule::Prefix("checkin_values[c_attr_vals]"),
        ],
    };

    fn validate(&self) -> Result<(), EzoError> {
        require_id("checkin_values[location_id]", self.location_id)
    }

    fn to_fields(&self) -> FormFields {
        let mut fields = FormFields::new();
        fields.push("checkin_values[location_id]", self.location_id);
        fields.push_opt("checkin_values[comments]", self.comments.as_ref());
        fields.push_custom("checkin_values[c_attr_vals]", &self.custom_attributes);
        fields
    }
}

/// Body for [`EzoClient::checkout_asset`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetCheckout {
    pub location_id: Option<u64>,
    pub comments: Option<String>,
    /// Return date, `mm/dd/yyyy`. Any other format is rejected before
    /// sending.
    pub till: Option<String>,
    pub till_time: Option<String>,
    pub override_conflicting_reservations: Option<bool>,
    pub override_my_conflicting_reservations: Option<bool>,
    /// Sent as `checkout_values[c_attr_vals][<name>]`.
    pub custom_attributes: BTreeMap<String, String>,
}

impl FormPayload for AssetCheckout {
    const SCHEMA: FormSchema = FormSchema {
        operation: "check out asset",
        rules: &[
            FieldRule::Exact("checkout_values[location_id]"),
            FieldRule::Exact("checkout_values[comments]"),
            FieldRule::Exact("till"),
            FieldRule::Exact("till_time"),
            FieldRule::Exact("checkout_values[override_conflicting_reservations]"),
            FieldRule::Exact("checkout_values[override_my_conflicting_reservations]"),
            FieldRule::Prefix("checkout_values[c_attr_vals]"),
        ],
    };

    fn validate(&self) -> Result<(), EzoError> {
        check_optional_date("till", self.till.as_deref())
    }

    fn to_fields(&self) -> FormFields {
        let mut fields = FormFields::new();
        fields.push_opt("checkout_values[location_id]", self.location_id);
        fields.push_opt("checkout_values[comments]", self.comments.as_ref());
        fields.push_opt("till", self.till.as_ref());
        fields.push_opt("till_time", self.till_time.as_ref());
        fields.push_opt(
            "checkout_values[override_conflicting_reservations]",
            self.override_conflicting_reservations,
        );
        fields.push_opt(
            "checkout_values[override_my_conflicting_reservations]",
            self.override_my_conflicting_reservations,
        );
        fields.push_custom("checkout_values[c_attr_vals]", &self.custom_attributes);
        fields
    }
}

/// Result of a checkout call.
///
/// The API answers 200 even when nothing happened (for example when the
/// member is inactive); in that case the body is only a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    CheckedOut(Value),
    Advisory { message: String, body: Value },
}

impl CheckoutOutcome {
    fn from_body(body: Value) -> Self {
        if body.get("asset").is_none() {
            if let Some(message) = body.get("message").and_then(Value::as_str) {
                return Self::Advisory {
                    message: message.to_string(),
                    body,
                };
            }
        }
        Self::CheckedOut(body)
    }

    pub const fn is_checked_out(&self) -> bool {
        matches!(self, Self::CheckedOut(_))
    }

    pub const fn body(&self) -> &Value {
        match self {
            Self::CheckedOut(body) | Self::Advisory { body, .. } => body,
        }
    }
}

// ── Client ─────────────────────────────────────────────────────────

impl EzoClient {
    /// Every asset in the account. Can run to hundreds of pages; prefer
    /// [`Self::get_filtered_assets`].
    ///
    /// # Errors
    ///
    /// See [`EzoClient::fetch_all`].
    pub async fn get_all_assets(&self) -> Result<Vec<Value>, EzoError> {
        let listing = Listing::new("get assets", "assets.api", "assets").params(DETAIL_FLAGS);
        self.fetch_all(&listing).await
    }

    /// Assets matching a filter.
    ///
    /// # Errors
    ///
    /// Returns [`EzoError::Precondition`] for an empty status, otherwise see
    /// [`EzoClient::fetch_all`].
    pub async fn get_filtered_assets(&self, filter: &AssetFilter) -> Result<Vec<Value>, EzoError> {
        filter.validate()?;
        let listing = Listing::new("get filtered assets", "assets/filter.api", "assets")
            .param("status", filter.status.as_str())
            .params(
                filter
                    .params
                    .iter()
                    .filter(|(k, _)| !is_reserved_filter_key(k))
                    .map(|(k, v)| (k.as_str(), v.as_str())),
            )
            .params(DETAIL_FLAGS);
        self.fetch_all(&listing).await
    }

    /// Full-text asset search, the equivalent of the UI search bar. May not
    /// return every match.
    ///
    /// # Errors
    ///
    /// Returns [`EzoError::Precondition`] for a blank term, otherwise see
    /// [`EzoClient::fetch_all`].
    pub async fn search_assets(&self, term: &str) -> Result<Vec<Value>, EzoError> {
        require_text("search", term)?;
        let listing = Listing::new("search assets", "search.api", "assets")
            .param("search", term)
            .param("facet", "FixedAsset")
            .params(DETAIL_FLAGS)
            .param("show_document_details", "true");
        self.fetch_all(&listing).await
    }

    /// Check-in/check-out history of one asset.
    ///
    /// # Errors
    ///
    /// See [`EzoClient::fetch_all`].
    pub async fn get_asset_history(&self, asset_id: u64) -> Result<Vec<Value>, EzoError> {
        let listing = Listing::new(
            "get asset history",
            format!("assets/{asset_id}/history_paginate.api"),
            "history",
        );
        self.fetch_all(&listing).await
    }

    /// # Errors
    ///
    /// Returns [`EzoError::Precondition`] if name, group or a valid purchase
    /// date is missing; transport and status errors otherwise.
    pub async fn create_asset(&self, asset: &NewAsset) -> Result<Value, EzoError> {
        self.submit(Method::POST, "assets.api", asset, &[]).await
    }

    /// # Errors
    ///
    /// Returns [`EzoError::Precondition`] for a malformed purchase date;
    /// transport and status errors otherwise.
    pub async fn update_asset(&self, asset_id: u64, update: &AssetUpdate) -> Result<Value, EzoError> {
        self.submit(Method::PUT, &format!("assets/{asset_id}.api"), update, &[])
            .await
    }

    /// # Errors
    ///
    /// Transport and status errors.
    pub async fn delete_asset(&self, asset_id: u64) -> Result<Value, EzoError> {
        self.action("delete asset", Method::DELETE, &format!("assets/{asset_id}.api"))
            .await
    }

    /// Check an asset in to a location.
    ///
    /// # Errors
    ///
    /// Returns [`EzoError::Precondition`] without a location; transport and
    /// status errors otherwise.
    pub async fn checkin_asset(&self, asset_id: u64, checkin: &AssetCheckin) -> Result<Value, EzoError> {
        self.submit(
            Method::PUT,
            &format!("assets/{asset_id}/checkin.api"),
            checkin,
            &[],
        )
        .await
    }

    /// Check an asset out to a member.
    ///
    /// A success status does not guarantee the checkout happened; inspect the
    /// returned [`CheckoutOutcome`].
    ///
    /// # Errors
    ///
    /// Returns [`EzoError::Precondition`] for a zero user id or malformed
    /// return date; transport and status errors otherwise.
    pub async fn checkout_asset(
        &self,
        asset_id: u64,
        user_id: u64,
        checkout: &AssetCheckout,
    ) -> Result<CheckoutOutcome, EzoError> {
        require_id("user_id", user_id)?;
        let body = self
            .submit(
                Method::PUT,
                &format!("assets/{asset_id}/checkout.api"),
                checkout,
                &[("user_id", user_id.to_string())],
            )
            .await?;

        let outcome = CheckoutOutcome::from_body(body);
        if let CheckoutOutcome::Advisory { message, .. } = &outcome {
            tracing::warn!(asset_id, user_id, %message, "checkout accepted but not applied");
        }
        Ok(outcome)
    }
}
