//! Work orders (the API calls them tasks) and checklists.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::client::EzoClient;
use crate::error::EzoError;
use crate::form::{
    FieldRule, FormFields, FormPayload, FormSchema, check_date, check_optional_date, require_id,
    require_text,
};
use crate::paginate::Listing;

/// Which work orders [`EzoClient::get_work_orders`] returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkOrderFilter {
    Complete,
    InProgress,
    ReviewPending,
    Open,
}

impl WorkOrderFilter {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::InProgress => "in_progress",
            Self::ReviewPending => "review_pending",
            Self::Open => "open",
        }
    }
}

impl fmt::Display for WorkOrderFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkOrderFilter {
    type Err = EzoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "complete" => Ok(Self::Complete),
            "in_progress" => Ok(Self::InProgress),
            "review_pending" => Ok(Self::ReviewPending),
            "open" => Ok(Self::Open),
            other => Err(EzoError::invalid(
                "filter",
                format!("'{other}' must be one of complete, in_progress, review_pending, open"),
            )),
        }
    }
}

// ── Payloads ───────────────────────────────────────────────────────

/// One inventory line attached to a work order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkedInventoryItem {
    pub inventory_id: u64,
    pub quantity: f64,
    pub location_id: Option<u64>,
    pub resource_id: Option<u64>,
    /// What the item is linked against, e.g. `FixedAsset` or `User`.
    pub resource_type: Option<String>,
}

impl LinkedInventoryItem {
    pub fn new(inventory_id: u64, quantity: f64) -> Self {
        Self {
            inventory_id,
            quantity,
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<(), EzoError> {
        let field = format!("linked_inventory_items[{}][quantity]", self.inventory_id);
        require_id("linked_inventory_items[][inventory_id]", self.inventory_id)?;
        if !(self.quantity.is_finite() && self.quantity > 0.0) {
            return Err(EzoError::invalid(field, "must be a positive number"));
        }
        Ok(())
    }

    fn push_fields(&self, fields: &mut FormFields) {
        let base = format!("linked_inventory_items[{}]", self.inventory_id);
        fields.push(format!("{base}[quantity]"), self.quantity);
        fields.push_opt(&format!("{base}[location_id]"), self.location_id);
        fields.push_opt(&format!("{base}[resource_id]"), self.resource_id);
        fields.push_opt(&format!("{base}[resource_type]"), self.resource_type.as_ref());
    }
}

const LINKED_ITEM_RULES: [FieldRule; 4] = [
    FieldRule::Pattern {
        prefix: "linked_inventory_items[",
        suffix: "][quantity]",
    },
    FieldRule::Pattern {
        prefix: "linked_inventory_items[",
        suffix: "][location_id]",
    },
    FieldRule::Pattern {
        prefix: "linked_inventory_items[",
        suffix: "][resource_id]",
    },
    FieldRule::Pattern {
        prefix: "linked_inventory_items[",
        suffix: "][resource_type]",
    },
];

/// Body for [`EzoClient::create_work_order`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewWorkOrder {
    pub title: String,
    pub task_type: String,
    /// `mm/dd/yyyy`.
    pub due_date: String,
    pub task_type_id: Option<u64>,
    pub priority: Option<String>,
    pub assigned_to_id: Option<u64>,
    pub reviewer_id: Option<u64>,
    pub mark_items_unavailable: Option<bool>,
    /// `mm/dd/yyyy`.
    pub expected_start_date: Option<String>,
    pub expected_start_time: Option<String>,
    pub start_time: Option<String>,
    pub base_cost: Option<f64>,
    pub inventory_ids: Option<String>,
    pub checklist_ids: Option<String>,
    pub associated_assets: Option<String>,
    pub custom_field_names: Option<String>,
    pub linked_inventory_items: Vec<LinkedInventoryItem>,
    /// Sent as repeated `associated_checklists[]`.
    pub associated_checklists: Vec<u64>,
    /// Sent as `task[custom_attributes][<name>]`.
    pub custom_attributes: BTreeMap<String, String>,
}

impl NewWorkOrder {
    pub fn new(
        title: impl Into<String>,
        task_type: impl Into<String>,
        due_date: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            task_type: task_type.into(),
            due_date: due_date.into(),
            ..Self::default()
        }
    }
}

impl FormPayload for NewWorkOrder {
    const SCHEMA: FormSchema = FormSchema {
        operation: "create work order",
        rules: &[
            FieldRule::Exact("task[title]"),
            FieldRule::Exact("task[task_type]"),
            FieldRule::Exact("task[task_type_id]"),
            FieldRule::Exact("task[priority]"),
            FieldRule::Exact("task[assigned_to_id]"),
            FieldRule::Exact("task[reviewer_id]"),
            FieldRule::Exact("task[mark_items_unavailable]"),
            FieldRule::Exact("expected_start_date"),
            FieldRule::Exact("expected_start_time"),
            FieldRule::Exact("due_date"),
            FieldRule::Exact("start_time"),
            FieldRule::Exact("base_cost"),
            FieldRule::Exact("inventory_ids"),
            FieldRule::Exact("checklist_ids"),
            FieldRule::Exact("associated_assets"),
            FieldRule::Exact("custom_field_names"),
            FieldRule::Prefix("task[custom_attributes]"),
            FieldRule::Prefix("linked_inventory_items"),
            FieldRule::Prefix("associated_checklists"),
        ],
    };

    fn validate(&self) -> Result<(), EzoError> {
        require_text("task[title]", &self.title)?;
        require_text("task[task_type]", &self.task_type)?;
        require_text("due_date", &self.due_date)?;
        check_date("due_date", &self.due_date)?;
        check_optional_date("expected_start_date", self.expected_start_date.as_deref())?;
        self.linked_inventory_items
            .iter()
            .try_for_each(LinkedInventoryItem::validate)
    }

    fn to_fields(&self) -> FormFields {
        let mut fields = FormFields::new();
        fields.push("task[title]", &self.title);
        fields.push("task[task_type]", &self.task_type);
        fields.push("due_date", &self.due_date);
        fields.push_opt("task[task_type_id]", self.task_type_id);
        fields.push_opt("task[priority]", self.priority.as_ref());
        fields.push_opt("task[assigned_to_id]", self.assigned_to_id);
        fields.push_opt("task[reviewer_id]", self.reviewer_id);
        fields.push_opt("task[mark_items_unavailable]", self.mark_items_unavailable);
        fields.push_opt("expected_start_date", self.expected_start_date.as_ref());
        fields.push_opt("expected_start_time", self.expected_start_time.as_ref());
        fields.push_opt("start_time", self.start_time.as_ref());
        fields.push_opt("base_cost", self.base_cost);
        fields.push_opt("inventory_ids", self.inventory_ids.as_ref());
        fields.push_opt("checklist_ids", self.checklist_ids.as_ref());
        fields.push_opt("associated_assets", self.associated_assets.as_ref());
        fields.push_opt("custom_field_names", self.custom_field_names.as_ref());
        for item in &self.linked_inventory_items {
            item.push_fields(&mut fields);
        }
        for checklist in &self.associated_checklists {
            fields.push("associated_checklists[]", checklist);
        }
        fields.push_custom("task[custom_attributes]", &self.custom_attributes);
        fields
    }
}

/// Body for [`EzoClient::add_work_log`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkLog {
    /// Hours spent.
    pub time_spent: f64,
    pub user_id: u64,
    pub description: Option<String>,
    pub resource_id: Option<u64>,
    pub resource_type: Option<String>,
    /// `mm/dd/yyyy`.
    pub started_on_date: Option<String>,
    pub started_on_time: Option<String>,
    /// `mm/dd/yyyy`.
    pub ended_on_date: Option<String>,
    pub ended_on_time: Option<String>,
}

impl WorkLog {
    pub fn new(time_spent: f64, user_id: u64) -> Self {
        Self {
            time_spent,
            user_id,
            ..Self::default()
        }
    }
}

impl FormPayload for WorkLog {
    const SCHEMA: FormSchema = FormSchema {
        operation: "add work log",
        rules: &[
            FieldRule::Exact("task_work_log[time_spent]"),
            FieldRule::Exact("task_work_log[user_id]"),
            FieldRule::Exact("task_work_log[description]"),
            FieldRule::Exact("task_work_log[resource_id]"),
            FieldRule::Exact("task_work_log[resource_type]"),
            FieldRule::Exact("started_on_date"),
            FieldRule::Exact("started_on_time"),
            FieldRule::Exact("ended_on_date"),
            FieldRule::Exact("ended_on_time"),
        ],
    };

    fn validate(&self) -> Result<(), EzoError> {
        if !(self.time_spent.is_finite() && self.time_spent > 0.0) {
            return Err(EzoError::missing("task_work_log[time_spent]"));
        }
        require_id("task_work_log[user_id]", self.user_id)?;
        check_optional_date("started_on_date", self.started_on_date.as_deref())?;
        check_optional_date("ended_on_date", self.ended_on_date.as_deref())
    }

    fn to_fields(&self) -> FormFields {
        let mut fields = FormFields::new();
        fields.push("task_work_log[time_spent]", self.time_spent);
        fields.push("task_work_log[user_id]", self.user_id);
        fields.push_opt("task_work_log[description]", self.description.as_ref());
        fields.push_opt("task_work_log[resource_id]", self.resource_id);
        fields.push_opt("task_work_log[resource_type]", self.resource_type.as_ref());
        fields.push_opt("started_on_date", self.started_on_date.as_ref());
        fields.push_opt("started_on_time", self.started_on_time.as_ref());
        fields.push_opt("ended_on_date", self.ended_on_date.as_ref());
        fields.push_opt("ended_on_time", self.ended_on_time.as_ref());
        fields
    }
}

/// Body for [`EzoClient::add_linked_inventory`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkedInventory {
    pub inventory_id: u64,
    pub items: Vec<LinkedInventoryItem>,
}

impl FormPayload for LinkedInventory {
    const SCHEMA: FormSchema = FormSchema {
        operation: "add linked inventory",
        rules: &[
            FieldRule::Exact("inventory_id"),
            LINKED_ITEM_RULES[0],
            LINKED_ITEM_RULES[1],
            LINKED_ITEM_RULES[2],
            LINKED_ITEM_RULES[3],
        ],
    };

    fn validate(&self) -> Result<(), EzoError> {
        require_id("inventory_id", self.inventory_id)?;
        if self.items.is_empty() {
            return Err(EzoError::missing("linked_inventory_items[<id>][quantity]"));
        }
        self.items.iter().try_for_each(LinkedInventoryItem::validate)
    }

    fn to_fields(&self) -> FormFields {
        let mut fields = FormFields::new();
        fields.push("inventory_id", self.inventory_id);
        for item in &self.items {
            item.push_fields(&mut fields);
        }
        fields
    }
}

// ── Client ─────────────────────────────────────────────────────────

impl EzoClient {
    /// Work orders in one state, keyed by work order id.
    ///
    /// # Errors
    ///
    /// See [`EzoClient::fetch_all`].
    pub async fn get_work_orders(&self, filter: WorkOrderFilter) -> Result<Map<String, Value>, EzoError> {
        let listing =
            Listing::new("get work orders", "tasks.api", "work_orders").param("filter", filter.as_str());
        self.fetch_all(&listing).await
    }

    /// # Errors
    ///
    /// Transport, status, and decode errors.
    pub async fn get_work_order_details(&self, work_order_id: u64) -> Result<Value, EzoError> {
        self.get_json("get work order", &format!("tasks/{work_order_id}.api"), &[])
            .await
    }

    /// Work order types. This endpoint is not paginated.
    ///
    /// # Errors
    ///
    /// Returns [`EzoError::Protocol`] if the body has no `work_order_types`
    /// array; transport, status, and decode errors otherwise.
    pub async fn get_work_order_types(&self) -> Result<Vec<Value>, EzoError> {
        const OPERATION: &str = "get work order types";
        let mut body = self.get_json(OPERATION, "task_types.api", &[]).await?;
        match body.get_mut("work_order_types").map(Value::take) {
            Some(Value::Array(types)) => Ok(types),
            _ => Err(EzoError::Protocol {
                operation: OPERATION,
                field: "work_order_types",
                body: body.to_string(),
            }),
        }
    }

    /// # Errors
    ///
    /// Returns [`EzoError::Precondition`] without a title, type, or a valid
    /// due date; transport and status errors otherwise.
    pub async fn create_work_order(&self, work_order: &NewWorkOrder) -> Result<Value, EzoError> {
        self.submit(Method::POST, "tasks.api", work_order, &[]).await
    }

    /// # Errors
    ///
    /// Transport and status errors.
    pub async fn start_work_order(&self, work_order_id: u64) -> Result<Value, EzoError> {
        self.action(
            "start work order",
            Method::POST,
            &format!("tasks/{work_order_id}/mark_in_progress.api"),
        )
        .await
    }

    /// # Errors
    ///
    /// Transport and status errors.
    pub async fn end_work_order(&self, work_order_id: u64) -> Result<Value, EzoError> {
        self.action(
            "end work order",
            Method::POST,
            &format!("tasks/{work_order_id}/mark_complete.api"),
        )
        .await
    }

    /// Log time against a work order.
    ///
    /// # Errors
    ///
    /// Returns [`EzoError::Precondition`] without time spent or a user;
    /// transport and status errors otherwise.
    pub async fn add_work_log(&self, work_order_id: u64, log: &WorkLog) -> Result<Value, EzoError> {
        self.submit(
            Method::POST,
            &format!("tasks/{work_order_id}/task_work_logs.api"),
            log,
            &[],
        )
        .await
    }

    /// # Errors
    ///
    /// Returns [`EzoError::Precondition`] without an inventory id or items;
    /// transport and status errors otherwise.
    pub async fn add_linked_inventory(
        &self,
        work_order_id: u64,
        linked: &LinkedInventory,
    ) -> Result<Value, EzoError> {
        self.submit(
            Method::PATCH,
            &format!("tasks/{work_order_id}/link_inventory.api"),
            linked,
            &[],
        )
        .await
    }

    /// # Errors
    ///
    /// See [`EzoClient::fetch_all`].
    pub async fn get_checklists(&self) -> Result<Vec<Value>, EzoError> {
        let listing = Listing::new("get checklists", "checklists.api", "checklists");
        self.fetch_all(&listing).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("complete", WorkOrderFilter::Complete)]
    #[case("in_progress", WorkOrderFilter::InProgress)]
    #[case("review_pending", WorkOrderFilter::ReviewPending)]
    #[case("open", WorkOrderFilter::Open)]
    fn filter_round_trips_through_str(#[case] raw: &str, #[case] expected: WorkOrderFilter) {
        assert_eq!(raw.parse::<WorkOrderFilter>().unwrap(), expected);
        assert_eq!(expected.as_str(), raw);
    }

    #[test]
    fn filter_rejects_unknown_state() {
        assert!("closed".parse::<WorkOrderFilter>().unwrap_err().is_precondition());
    }

    #[test]
    fn new_work_order_validates_due_date_format() {
        let order = NewWorkOrder::new("Replace belt", "Repair", "2025-03-01");
        let err = order.validate().unwrap_err();
        assert!(matches!(err, EzoError::Precondition { ref field, .. } if field == "due_date"));
    }

    #[test]
    fn new_work_order_requires_due_date() {
        let order = NewWorkOrder::new("Replace belt", "Repair", "");
        assert!(order.validate().is_err());
    }

    #[test]
    fn new_work_order_renders_linked_items() {
        let order = NewWorkOrder {
            linked_inventory_items: vec![LinkedInventoryItem {
                location_id: Some(3),
                ..LinkedInventoryItem::new(42, 2.0)
            }],
            associated_checklists: vec![9],
            ..NewWorkOrder::new("Replace belt", "Repair", "03/01/2025")
        };
        let fields = order.encode().unwrap();
        assert_eq!(fields.get("linked_inventory_items[42][quantity]"), Some("2"));
        assert_eq!(fields.get("linked_inventory_items[42][location_id]"), Some("3"));
        assert_eq!(fields.get("associated_checklists[]"), Some("9"));
        assert_eq!(fields.get("due_date"), Some("03/01/2025"));
    }

    #[test]
    fn work_log_requires_time_and_user() {
        assert!(WorkLog::new(0.0, 5).validate().is_err());
        assert!(WorkLog::new(1.5, 0).validate().is_err());
        assert!(WorkLog::new(1.5, 5).validate().is_ok());
    }

    #[test]
    fn linked_inventory_requires_items() {
        let linked = LinkedInventory {
            inventory_id: 42,
            items: Vec::new(),
        };
        assert!(linked.validate().is_err());
    }

    #[test]
    fn linked_inventory_schema_only_accepts_item_patterns() {
        let schema = LinkedInventory::SCHEMA;
        assert!(schema.accepts("inventory_id"));
        assert!(schema.accepts("linked_inventory_items[42][resource_type]"));
        assert!(!schema.accepts("linked_inventory_items[42][price]"));
        assert!(!schema.accepts("task[title]"));
    }
}
