//! # Validation Module
//!
//! Field rules for the three entity forms.
//!
//! ## Where Validation Happens
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Form decoding (apps/web)                                     │
//! │  └── Unparsable numbers become InvalidFormat errors                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Required / length / range rules per field                         │
//! │  └── Every failure collected into ValidationErrors                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── UNIQUE(email) → Duplicate field error                             │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both create and edit go through the same `validate_*` entry point.
//!
//! ## Usage
//! ```rust
//! use orderdesk_core::types::ClientInput;
//! use orderdesk_core::validation::validate_client;
//!
//! let input = ClientInput {
//!     name: "Ana Souza".to_string(),
//!     email: "ana@example.com".to_string(),
//!     address: "Rua das Flores, 12".to_string(),
//!     postal_code: "01310100".to_string(),
//! };
//! assert!(validate_client(&input).is_ok());
//! ```

use crate::error::{ValidationError, ValidationErrors};
use crate::limits::*;
use crate::money::{Money, Weight};
use crate::types::{ClientInput, OrderInput, ProductInput};

/// Result type for single-field checks.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Checks that a text field is present and at most `max` characters long.
///
/// Length is counted in characters, not bytes, so accented names are not
/// penalised.
pub fn validate_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates an email address.
///
/// ## Rules
/// - Required, at most 254 characters
/// - Exactly one `@`, with a non-empty local part
/// - Domain contains a dot that is neither first nor last
/// - No whitespace
///
/// ## Example
/// ```rust
/// use orderdesk_core::validation::validate_email;
///
/// assert!(validate_email("ana@example.com").is_ok());
/// assert!(validate_email("ana.example.com").is_err());
/// assert!(validate_email("").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    validate_text("email", email, CLIENT_EMAIL_MAX)?;
    let email = email.trim();

    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: reason.to_string(),
    };

    if email.chars().any(char::is_whitespace) {
        return Err(invalid("must not contain spaces"));
    }

    let (local, domain) = match email.split_once('@') {
        Some(parts) => parts,
        None => return Err(invalid("must contain '@'")),
    };

    if local.is_empty() || domain.contains('@') {
        return Err(invalid("must be a valid email address"));
    }

    let dotted = domain
        .find('.')
        .map(|i| i > 0 && !domain.ends_with('.'))
        .unwrap_or(false);
    if !dotted {
        return Err(invalid("must have a domain like example.com"));
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a product price: non-negative, at most 99999.99.
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::Negative {
            field: "price".to_string(),
        });
    }

    if price.cents() > PRODUCT_PRICE_MAX_CENTS {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: PRODUCT_PRICE_MAX_CENTS,
        });
    }

    Ok(())
}

/// Validates a product weight: non-negative, at most 9999.999 kg.
pub fn validate_weight(weight: Weight) -> ValidationResult<()> {
    if weight.is_negative() {
        return Err(ValidationError::Negative {
            field: "weight".to_string(),
        });
    }

    if weight.grams() > PRODUCT_WEIGHT_MAX_GRAMS {
        return Err(ValidationError::OutOfRange {
            field: "weight".to_string(),
            min: 0,
            max: PRODUCT_WEIGHT_MAX_GRAMS,
        });
    }

    Ok(())
}

pub fn validate_delivery_days(days: i64) -> ValidationResult<()> {
    if days < 0 {
        return Err(ValidationError::Negative {
            field: "delivery_days".to_string(),
        });
    }
    Ok(())
}

/// Validates the quantity of one order line.
///
/// `field` names the form input, e.g. `items[2].quantity`, so the message
/// lands next to the right row.
pub fn validate_quantity(field: &str, qty: i64) -> ValidationResult<()> {
    if !(1..=ITEM_QUANTITY_MAX).contains(&qty) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 1,
            max: ITEM_QUANTITY_MAX,
        });
    }
    Ok(())
}

// =============================================================================
// Form Validators
// =============================================================================

/// Validates every field of a client form.
pub fn validate_client(input: &ClientInput) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors.check(validate_text("name", &input.name, CLIENT_NAME_MAX));
    errors.check(validate_email(&input.email));
    errors.check(validate_text("address", &input.address, CLIENT_ADDRESS_MAX));
    errors.check(validate_text(
        "postal_code",
        &input.postal_code,
        CLIENT_POSTAL_CODE_MAX,
    ));
    errors.into_result()
}

/// Validates every field of a product form.
pub fn validate_product(input: &ProductInput) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors.check(validate_text("name", &input.name, PRODUCT_NAME_MAX));
    errors.check(validate_text(
        "description",
        &input.description,
        PRODUCT_DESCRIPTION_MAX,
    ));
    errors.check(validate_price(input.price));
    errors.check(validate_weight(input.weight));
    errors.into_result()
}

/// Validates an order form.
///
/// Quantities are only checked on lines that pick a product: a blank line
/// is skipped on save anyway and must not block it.
pub fn validate_order(input: &OrderInput) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors.check(validate_delivery_days(input.delivery_days));

    for (index, line) in input.lines.iter().enumerate() {
        if line.product_id.is_some() {
            let field = format!("items[{}].quantity", index);
            errors.check(validate_quantity(&field, line.quantity));
        }
    }

    errors.into_result()
}

// =============================================================================
// Unit Tests
// =============================================================================
