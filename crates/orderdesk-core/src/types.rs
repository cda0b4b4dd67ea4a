//! # Domain Types
//!
//! Entity records used throughout OrderDesk.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Client      │   │      Order      │   │    Product      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │◄──│  client_id?     │   │  id             │       │
//! │  │  name           │   │  delivery_days  │   │  name           │       │
//! │  │  email (unique) │   │  total_price    │   │  description    │       │
//! │  │  address        │   │  items ─────┐   │   │  price (Money)  │       │
//! │  │  postal_code    │   └─────────────│───┘   │  weight         │       │
//! │  └─────────────────┘                 │       └────────▲────────┘       │
//! │                                      ▼                │                │
//! │                           ┌─────────────────┐         │                │
//! │                           │   OrderItem     │         │                │
//! │                           │  ─────────────  │         │                │
//! │                           │  order_id       │         │                │
//! │                           │  product_id? ───┼─────────┘                │
//! │                           │  quantity       │                          │
//! │                           └─────────────────┘                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Records vs Inputs
//! Entities (`Client`, `Product`, ...) are what the database holds. Inputs
//! (`ClientInput`, `ProductInput`, `OrderInput`) are what a submitted form
//! carries after decoding; they have no timestamps and no derived fields,
//! so an order total can never arrive from outside.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::{Money, Weight};
use crate::pricing;

// =============================================================================
// Client
// =============================================================================

/// A customer who places orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Client {
    pub id: i64,

    /// Display name, at most 60 characters.
    pub name: String,

    /// Contact email, unique across all clients.
    pub email: String,

    /// Street address, at most 255 characters.
    pub address: String,

    /// Postal code (CEP), at most 8 characters.
    pub postal_code: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client fields as submitted by the create/edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInput {
    pub name: String,
    pub email: String,
    pub address: String,
    pub postal_code: String,
}

impl From<&Client> for ClientInput {
    fn from(c: &Client) -> Self {
        ClientInput {
            name: c.name.clone(),
            email: c.email.clone(),
            address: c.address.clone(),
            postal_code: c.postal_code.clone(),
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product that can be put on an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,

    /// Display name, at most 40 characters.
    pub name: String,

    /// Description, at most 120 characters.
    pub description: String,

    /// Unit price in cents.
    pub price: Money,

    /// Weight in grams.
    pub weight: Weight,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product fields after decoding the create/edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub price: Money,
    pub weight: Weight,
}

impl From<&Product> for ProductInput {
    fn from(p: &Product) -> Self {
        ProductInput {
            name: p.name.clone(),
            description: p.description.clone(),
            price: p.price,
            weight: p.weight,
        }
    }
}

// =============================================================================
// Order Item
// =============================================================================

/// One line of an order.
///
/// `product` is filled in by the repository when the item is loaded together
/// with its product; it is never stored in the `order_items` row itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: Option<i64>,
    pub quantity: i64,

    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    #[serde(default)]
    pub product: Option<Product>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderItem {
    /// What this line adds to the order total: `price × quantity`, or zero
    /// when the product is not attached.
    #[inline]
    pub fn contribution(&self) -> Money {
        pricing::line_total(self.product.as_ref().map(|p| p.price), self.quantity)
    }
}

// =============================================================================
// Order
// =============================================================================

/// An order placed by an (optional) client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    pub client_id: Option<i64>,

    /// Derived from `items`; recomputed on every save.
    pub total_price: Money,

    pub delivery_days: i64,

    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    #[serde(default)]
    pub items: Vec<OrderItem>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Recomputes `total_price` from the loaded items.
    ///
    /// ## Rule
    /// ```text
    /// total_price = Σ product.price × quantity   (items with a product)
    /// ```
    /// Items without a product contribute nothing and are not an error.
    pub fn recalculate_total(&mut self) {
        self.total_price = self.items.iter().map(OrderItem::contribution).sum();
    }

    /// True when the stored total agrees with the loaded items.
    pub fn total_is_consistent(&self) -> bool {
        let expected: Money = self.items.iter().map(OrderItem::contribution).sum();
        expected == self.total_price
    }
}

/// A row of the order listing: the order plus its client's name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderSummary {
    pub id: i64,
    pub client_id: Option<i64>,
    pub client_name: Option<String>,
    pub total_price: Money,
    pub delivery_days: i64,
    pub item_count: i64,
}

/// One submitted order line, before its product has been resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineInput {
    /// Id of the existing item this line edits, if any.
    pub id: Option<i64>,
    pub product_id: Option<i64>,
    pub quantity: i64,
}

/// Order fields after decoding the create/edit form.
///
/// There is deliberately no total here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderInput {
    pub client_id: Option<i64>,
    pub delivery_days: i64,
    pub lines: Vec<OrderLineInput>,
}

impl From<&Order> for OrderInput {
    fn from(o: &Order) -> Self {
        OrderInput {
            client_id: o.client_id,
            delivery_days: o.delivery_days,
            lines: o
                .items
                .iter()
                .map(|i| OrderLineInput {
                    id: Some(i.id),
                    product_id: i.product_id,
                    quantity: i.quantity,
                })
                .collect(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
