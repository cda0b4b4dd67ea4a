//! # Form Decoding
//!
//! Turns submitted `application/x-www-form-urlencoded` bodies into the
//! input records of `orderdesk-core`.
//!
//! Every form keeps the raw strings it was submitted with. When a save is
//! rejected the same struct is rendered again, so the user sees exactly
//! what they typed next to the messages.
//!
//! ```text
//! name=Ana&email=ana%40x.com&...   ──► ClientForm ──► (ClientInput, ValidationErrors)
//!
//! delivery_days=3                  ┐
//! items[0].product_id=4            │
//! items[0].quantity=2              ├─► OrderForm ──► (OrderInput, ValidationErrors)
//! items[1].id=17                   │     lines ordered by N
//! items[1].product_id=              ┘
//! ```
//!
//! Decoding errors (a price that is not a number, say) are reported the
//! same way as rule violations, keyed by the form field name.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use orderdesk_core::{
    Client, ClientInput, Order, OrderInput, OrderLineInput, Product, ProductInput,
    ValidationError, ValidationErrors,
};

use crate::error::{WebError, WebResult};

/// Blank order lines appended to the order form for new items.
pub const BLANK_LINES: usize = 3;

// =============================================================================
// Field Parsing
// =============================================================================

/// Parses the hidden `id` field: blank means "create".
///
/// A malformed id was not typed by a user, so it is a bad request rather
/// than a field error.
pub fn parse_record_id(raw: &str) -> WebResult<Option<i64>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<i64>()
        .map(Some)
        .map_err(|_| WebError::bad_request(format!("Invalid record id '{}'", raw)))
}

/// Parses an optional numeric field, recording a format error.
fn parse_optional<T: FromStr>(field: &str, raw: &str, errors: &mut ValidationErrors) -> Option<T> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            errors.push(ValidationError::InvalidFormat {
                field: field.to_string(),
                reason: "must be a number".to_string(),
            });
            None
        }
    }
}

/// Parses a required field, recording a missing or format error.
fn parse_required<T>(field: &str, raw: &str, errors: &mut ValidationErrors) -> Option<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = raw.trim();
    if raw.is_empty() {
        errors.push(ValidationError::Required {
            field: field.to_string(),
        });
        return None;
    }
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(e) => {
            errors.push(ValidationError::InvalidFormat {
                field: field.to_string(),
                reason: e.to_string(),
            });
            None
        }
    }
}

// =============================================================================
// Client Form
// =============================================================================

/// The client create/edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientForm {
    pub id: String,
    pub name: String,
    pub email: String,
    pub address: String,
    pub postal_code: String,
}

impl ClientForm {
    pub fn from_client(client: &Client) -> Self {
        ClientForm {
            id: client.id.to_string(),
            name: client.name.clone(),
            email: client.email.clone(),
            address: client.address.clone(),
            postal_code: client.postal_code.clone(),
        }
    }

    pub fn record_id(&self) -> WebResult<Option<i64>> {
        parse_record_id(&self.id)
    }

    /// Client fields are plain text, so decoding cannot fail.
    pub fn to_input(&self) -> ClientInput {
        ClientInput {
            name: self.name.clone(),
            email: self.email.clone(),
            address: self.address.clone(),
            postal_code: self.postal_code.clone(),
        }
    }
}

// =============================================================================
// Product Form
// =============================================================================

/// The product create/edit form. Price is in currency units (`10.50`),
/// weight in kilograms (`1.250`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductForm {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub weight: String,
}

impl ProductForm {
    pub fn from_product(product: &Product) -> Self {
        ProductForm {
            id: product.id.to_string(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.to_decimal_string(),
            weight: product.weight.to_decimal_string(),
        }
    }

    pub fn record_id(&self) -> WebResult<Option<i64>> {
        parse_record_id(&self.id)
    }

    /// Decodes the form. Fields that fail to parse are zero in the
    /// returned input and listed in the errors.
    pub fn to_input(&self) -> (ProductInput, ValidationErrors) {
        let mut errors = ValidationErrors::new();
        let price = parse_required("price", &self.price, &mut errors).unwrap_or_default();
        let weight = parse_required("weight", &self.weight, &mut errors).unwrap_or_default();

        let input = ProductInput {
            name: self.name.clone(),
            description: self.description.clone(),
            price,
            weight,
        };
        (input, errors)
    }
}

// =============================================================================
// Order Form
// =============================================================================

/// One `items[N]` row of the order form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineForm {
    pub id: String,
    pub product_id: String,
    pub quantity: String,
}

impl LineForm {
    fn blank() -> Self {
        LineForm {
            id: String::new(),
            product_id: String::new(),
            quantity: "1".to_string(),
        }
    }

    /// True when the row neither edits an item nor picks a product.
    pub fn is_blank(&self) -> bool {
        self.id.trim().is_empty() && self.product_id.trim().is_empty()
    }
}

/// The order create/edit form.
///
/// There is no total field: any `total_price` in the body is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderForm {
    pub id: String,
    pub client_id: String,
    pub delivery_days: String,
    pub lines: Vec<LineForm>,
}

impl OrderForm {
    /// Empty form for a new order.
    pub fn blank() -> Self {
        OrderForm {
            delivery_days: "0".to_string(),
            ..Default::default()
        }
        .with_blank_lines(BLANK_LINES)
    }

    /// Form prefilled from a stored order plus a few blank rows.
    pub fn from_order(order: &Order) -> Self {
        let lines = order
            .items
            .iter()
            .map(|item| LineForm {
                id: item.id.to_string(),
                product_id: item.product_id.map(|p| p.to_string()).unwrap_or_default(),
                quantity: item.quantity.to_string(),
            })
            .collect();

        OrderForm {
            id: order.id.to_string(),
            client_id: order.client_id.map(|c| c.to_string()).unwrap_or_default(),
            delivery_days: order.delivery_days.to_string(),
            lines,
        }
        .with_blank_lines(BLANK_LINES)
    }

    /// Builds the form from raw body pairs.
    ///
    /// Line fields look like `items[N].field`. Rows are ordered by `N`;
    /// gaps in the numbering are closed up. Unknown keys are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut form = OrderForm::default();
        let mut rows: BTreeMap<usize, LineForm> = BTreeMap::new();

        for (key, value) in pairs {
            let key = key.as_ref();
            match key {
                "id" => form.id = value.into(),
                "client_id" => form.client_id = value.into(),
                "delivery_days" => form.delivery_days = value.into(),
                _ => {
                    if let Some((index, field)) = parse_line_key(key) {
                        let row = rows.entry(index).or_default();
                        match field {
                            "id" => row.id = value.into(),
                            "product_id" => row.product_id = value.into(),
                            "quantity" => row.quantity = value.into(),
                            _ => {}
                        }
                    }
                }
            }
        }

        form.lines = rows.into_values().collect();
        form
    }

    /// Drops trailing blank rows and appends `count` fresh ones.
    ///
    /// Only trailing rows are removed so row positions, and with them the
    /// `items[N]` names of any error messages, stay put.
    pub fn with_blank_lines(mut self, count: usize) -> Self {
        while self.lines.last().map(LineForm::is_blank).unwrap_or(false) {
            self.lines.pop();
        }
        self.lines.extend(std::iter::repeat_with(LineForm::blank).take(count));
        self
    }

    pub fn record_id(&self) -> WebResult<Option<i64>> {
        parse_record_id(&self.id)
    }

    /// Decodes the form into an [`OrderInput`].
    ///
    /// Quantity is only required on rows that pick a product; rows without
    /// one are dropped on save regardless of what they hold.
    pub fn to_input(&self) -> (OrderInput, ValidationErrors) {
        let mut errors = ValidationErrors::new();

        let client_id = parse_optional("client_id", &self.client_id, &mut errors);
        let delivery_days =
            parse_required("delivery_days", &self.delivery_days, &mut errors).unwrap_or(0);

        let lines = self
            .lines
            .iter()
            .enumerate()
            .map(|(index, row)| {
                let id = parse_optional(&format!("items[{}].id", index), &row.id, &mut errors);
                let product_id = parse_optional(
                    &format!("items[{}].product_id", index),
                    &row.product_id,
                    &mut errors,
                );

                let quantity = if product_id.is_some() {
                    parse_required(&format!("items[{}].quantity", index), &row.quantity, &mut errors)
                        .unwrap_or(0)
                } else {
                    row.quantity.trim().parse().unwrap_or(0)
                };

                OrderLineInput {
                    id,
                    product_id,
                    quantity,
                }
            })
            .collect();

        let input = OrderInput {
            client_id,
            delivery_days,
            lines,
        };
        (input, errors)
    }
}

/// Splits `items[3].quantity` into `(3, "quantity")`.
fn parse_line_key(key: &str) -> Option<(usize, &str)> {
    let rest = key.strip_prefix("items[")?;
    let (index, field) = rest.split_once("].")?;
    Some((index.parse().ok()?, field))
}

// =============================================================================
// Unit Tests
// =============================================================================
