//! # Order Pricing & Item Reconciliation
//!
//! The two rules that give an order its shape on save:
//!
//! 1. **Total**: `total_price = Σ price × quantity` over lines that carry a
//!    product. Lines without a product contribute zero.
//! 2. **Reconciliation**: the persisted item set is made equal to the
//!    submitted (resolvable) item set.
//!
//! ## Reconciliation Plan
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    plan_item_changes(existing, submitted)               │
//! │                                                                         │
//! │  existing (db)              submitted (form)          plan              │
//! │  ─────────────              ────────────────          ────              │
//! │  #10 coffee ×2   ◄───────── id=10 coffee ×2    ──►   (unchanged)        │
//! │  #11 tea    ×1   ◄───────── id=11 tea    ×4    ──►   update #11         │
//! │  #12 sugar  ×3              (not submitted)    ──►   delete #12         │
//! │                             id=∅  milk   ×1    ──►   insert milk ×1     │
//! │                                                                         │
//! │  Applied inside one transaction: no window where the order has no      │
//! │  items, no dangling order_id, one row touched per actual change.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::{HashMap, HashSet};

use crate::money::Money;
use crate::types::{OrderItem, OrderLineInput};

// =============================================================================
// Totals
// =============================================================================

/// Contribution of one line: `price × quantity`, or zero without a price.
#[inline]
pub fn line_total(unit_price: Option<Money>, quantity: i64) -> Money {
    match unit_price {
        Some(price) => price.multiply_quantity(quantity),
        None => Money::zero(),
    }
}

/// A line reduced to what pricing needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricedLine {
    pub unit_price: Option<Money>,
    pub quantity: i64,
}

impl PricedLine {
    pub const fn new(unit_price: Option<Money>, quantity: i64) -> Self {
        PricedLine {
            unit_price,
            quantity,
        }
    }

    #[inline]
    pub fn total(&self) -> Money {
        line_total(self.unit_price, self.quantity)
    }
}

/// Sums the contributions of every line.
///
/// ## Example
/// ```rust
/// use orderdesk_core::money::Money;
/// use orderdesk_core::pricing::{order_total, PricedLine};
///
/// let lines = [
///     PricedLine::new(Some(Money::from_cents(1000)), 2), // $10.00 × 2
///     PricedLine::new(Some(Money::from_cents(550)), 1),  // $5.50 × 1
/// ];
/// assert_eq!(order_total(&lines).cents(), 2550);
/// ```
pub fn order_total(lines: &[PricedLine]) -> Money {
    lines.iter().map(PricedLine::total).sum()
}

// =============================================================================
// Line Resolution
// =============================================================================

/// A submitted line whose product is known to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemDraft {
    /// Id of the existing item this line edits, if any.
    pub id: Option<i64>,
    pub product_id: i64,
    pub quantity: i64,
}

/// Keeps the lines whose product id resolves.
///
/// Lines with no product id, or with an id `product_exists` rejects, are
/// dropped silently: an order can be saved with a half-filled item row.
pub fn resolve_lines<F>(lines: &[OrderLineInput], product_exists: F) -> Vec<ItemDraft>
where
    F: Fn(i64) -> bool,
{
    lines
        .iter()
        .filter_map(|line| {
            let product_id = line.product_id?;
            if !product_exists(product_id) {
                return None;
            }
            Some(ItemDraft {
                id: line.id,
                product_id,
                quantity: line.quantity,
            })
        })
        .collect()
}

// =============================================================================
// Reconciliation Plan
// =============================================================================

/// An existing item row to rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemUpdate {
    pub id: i64,
    pub product_id: i64,
    pub quantity: i64,
}

/// The mutations that turn the stored item set into the submitted one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemChangeSet {
    pub inserts: Vec<ItemDraft>,
    pub updates: Vec<ItemUpdate>,
    pub deletes: Vec<i64>,
    /// Existing items kept exactly as they were.
    pub unchanged: Vec<i64>,
}

impl ItemChangeSet {
    /// True when applying the plan would not touch any row.
    pub fn is_noop(&self) -> bool {
        self.inserts.is_empty() && self.updates.is_empty() && self.deletes.is_empty()
    }

    /// Number of rows the plan writes.
    pub fn change_count(&self) -> usize {
        self.inserts.len() + self.updates.len() + self.deletes.len()
    }
}

/// Computes the item mutations for saving an order.
///
/// ## Matching Rules
/// - a draft whose `id` names an existing item of this order edits it
///   (update when product or quantity differ, otherwise unchanged);
/// - a draft without `id`, with an id that is not one of `existing`, or with
///   an id already claimed by an earlier draft becomes an insert;
/// - existing items no draft claimed are deleted.
///
/// Deletes come out in the order of `existing`; inserts and updates in the
/// order of `submitted`.
pub fn plan_item_changes(existing: &[OrderItem], submitted: &[ItemDraft]) -> ItemChangeSet {
    let by_id: HashMap<i64, &OrderItem> = existing.iter().map(|i| (i.id, i)).collect();
    let mut claimed: HashSet<i64> = HashSet::new();
    let mut plan = ItemChangeSet::default();

    for draft in submitted {
        let current = draft
            .id
            .filter(|id| !claimed.contains(id))
            .and_then(|id| by_id.get(&id).copied());

        match current {
            Some(item) => {
                claimed.insert(item.id);
                if item.product_id == Some(draft.product_id) && item.quantity == draft.quantity {
                    plan.unchanged.push(item.id);
                } else {
                    plan.updates.push(ItemUpdate {
                        id: item.id,
                        product_id: draft.product_id,
                        quantity: draft.quantity,
                    });
                }
            }
            None => plan.inserts.push(ItemDraft { id: None, ..*draft }),
        }
    }

    plan.deletes = existing
        .iter()
        .map(|i| i.id)
        .filter(|id| !claimed.contains(id))
        .collect();

    plan
}

// =============================================================================
// Unit Tests
// =============================================================================
