//! Paged listing fetcher.
//!
//! Listing endpoints return one page of records under a named field plus a
//! `total_pages` count. [`EzoClient::fetch_all`] walks pages 1..=N in order,
//! one request at a time, and stops on the first of:
//!
//! - page counter reaching `total_pages` (success);
//! - `total_pages` missing from the body (treated as the last page);
//! - the named field missing (fatal, [`EzoError::Protocol`]);
//! - a non-success status ([`EzoError::Status`] carrying earlier pages);
//! - a transport failure ([`EzoError::Transport`], nothing returned).

use reqwest::Method;
use serde_json::{Map, Value};

use crate::client::EzoClient;
use crate::error::EzoError;
use crate::http::{check_response, read_json};

/// Description of one paged listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    operation: &'static str,
    path: String,
    field: &'static str,
    params: Vec<(String, String)>,
}

impl Listing {
    /// `operation` names the call in errors and logs, `field` is the
    /// top-level response key holding the records.
    pub fn new(operation: &'static str, path: impl Into<String>, field: &'static str) -> Self {
        Self {
            operation,
            path: path.into(),
            field,
            params: Vec::new(),
        }
    }

    /// Add a query parameter sent with every page. A caller-supplied `page`
    /// is ignored; the fetcher owns the page counter.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        if name != "page" {
            self.params.push((name, value.into()));
        }
        self
    }

    #[must_use]
    pub fn params<I, K, V>(self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        params
            .into_iter()
            .fold(self, |listing, (k, v)| listing.param(k, v))
    }

    pub const fn operation(&self) -> &'static str {
        self.operation
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub const fn field(&self) -> &'static str {
        self.field
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.params
    }
}

/// Accumulates the named field across pages.
pub trait PageCollector: Default {
    /// Fold one page's field into the accumulator. Hands the value back if
    /// it has the wrong shape.
    ///
    /// # Errors
    ///
    /// Returns the rejected value when it cannot be merged.
    fn absorb(&mut self, items: Value) -> Result<(), Value>;

    /// Number of records collected so far.
    fn count(&self) -> usize;

    fn into_value(self) -> Value;
}

/// Array listings: pages are concatenated in server order.
impl PageCollector for Vec<Value> {
    fn absorb(&mut self, items: Value) -> Result<(), Value> {
        match items {
            Value::Array(items) => {
                self.extend(items);
                Ok(())
            }
            Value::Null => Ok(()),
            other => Err(other),
        }
    }

    fn count(&self) -> usize {
        self.len()
    }

    fn into_value(self) -> Value {
        Value::Array(self)
    }
}

/// Keyed listings (work orders come back as an object keyed by id): later
/// pages overwrite equal keys.
impl PageCollector for Map<String, Value> {
    fn absorb(&mut self, items: Value) -> Result<(), Value> {
        match items {
            Value::Object(items) => {
                self.extend(items);
                Ok(())
            }
            Value::Array(ref empty) if empty.is_empty() => Ok(()),
            Value::Null => Ok(()),
            other => Err(other),
        }
    }

    fn count(&self) -> usize {
        self.len()
    }

    fn into_value(self) -> Value {
        Value::Object(self)
    }
}

fn total_pages(body: &Value) -> Option<u64> {
    let total = body.get("total_pages")?;
    total
        .as_u64()
        .or_else(|| total.as_f64().and_then(integral))
        .or_else(|| total.as_str().and_then(|s| s.trim().parse().ok()))
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn integral(value: f64) -> Option<u64> {
    (value.fract() == 0.0 && value >= 0.0 && value <= u64::MAX as f64).then(|| value as u64)
}

impl EzoClient {
    /// Fetch every page of a listing and collect its field.
    ///
    /// # Errors
    ///
    /// - [`EzoError::Transport`] if a request fails to complete.
    /// - [`EzoError::Status`] on a non-success page, with earlier pages
    ///   available through [`EzoError::partial`].
    /// - [`EzoError::Protocol`] if a page lacks the named field or it has the
    ///   wrong shape.
    /// - [`EzoError::Decode`] if a page body is not JSON.
    pub async fn fetch_all<C: PageCollector>(&self, listing: &Listing) -> Result<C, EzoError> {
        let operation = listing.operation;
        let mut collected = C::default();
        let mut page: u64 = 1;

        loop {
            tracing::debug!(operation, page, "fetching page");
            let resp = self
                .request(Method::GET, &listing.path)
                .query(&[("page", page)])
                .query(&listing.params)
                .send()
                .await
                .map_err(|source| EzoError::transport(operation, source))?;

            let resp = match check_response(resp, operation).await {
                Ok(resp) => resp,
                Err(err) => {
                    tracing::warn!(
                        operation,
                        page,
                        collected = collected.count(),
                        "listing stopped on non-success status"
                    );
                    return Err(err.with_partial(collected.into_value()));
                }
            };

            let mut body = read_json(resp, operation).await?;
            let Some(items) = body.get_mut(listing.field).map(Value::take) else {
                return Err(EzoError::Protocol {
                    operation,
                    field: listing.field,
                    body: body.to_string(),
                });
            };
            if let Err(items) = collected.absorb(items) {
                return Err(EzoError::Protocol {
                    operation,
                    field: listing.field,
                    body: items.to_string(),
                });
            }

            match total_pages(&body) {
                None => {
                    tracing::warn!(operation, page, "response has no total_pages; treating as last page");
                    break;
                }
                Some(total) if page >= total => break,
                Some(_) => page += 1,
            }
        }

        tracing::debug!(operation, pages = page, records = collected.count(), "listing complete");
        Ok(collected)
    }
}
