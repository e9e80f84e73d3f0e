//! # ezo-client
//!
//! Typed HTTP client for the EZOfficeInventory REST API.
//!
//! Every operation maps one endpoint to a typed request and a JSON response.
//! Records themselves stay loosely typed ([`serde_json::Value`]) because their
//! shape, custom attributes included, is owned by the remote account.
//!
//! - Listings page through `total_pages` via [`EzoClient::fetch_all`].
//! - Mutations take a typed payload ([`FormPayload`]) whose rendered fields
//!   are allow-listed against the operation's [`FormSchema`] before sending.
//! - Every failure is an [`EzoError`]. A listing that hits a non-success
//!   status still hands back the pages it already read via
//!   [`EzoError::partial`].
//!
//! ```no_run
//! # async fn demo() -> Result<(), ezo_client::EzoError> {
//! use ezo_client::{EzoClient, LocationFilter, LocationStatus};
//! use ezo_config::EzoConfig;
//!
//! let client = EzoClient::new(EzoConfig::new("https://acme.ezofficeinventory.com/", "token"))?;
//! let active = client
//!     .get_locations(Some(&LocationFilter::new(LocationStatus::Active)))
//!     .await?;
//! println!("{} active locations", active.len());
//! # Ok(())
//! # }
//! ```

pub mod assets;
pub mod form;
pub mod locations;
pub mod paginate;
pub mod work_orders;

mod client;
mod error;
mod http;

pub use assets::{AssetCheckin, AssetCheckout, AssetFilter, AssetUpdate, CheckoutOutcome, NewAsset};
pub use client::EzoClient;
pub use error::EzoError;
pub use form::{FieldRule, FormFields, FormPayload, FormSchema};
pub use locations::{LocationFilter, LocationStatus, LocationUpdate, NewLocation};
pub use paginate::{Listing, PageCollector};
pub use work_orders::{LinkedInventory, LinkedInventoryItem, NewWorkOrder, WorkLog, WorkOrderFilter};
