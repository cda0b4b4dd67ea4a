//! # Views
//!
//! Tera templates compiled into the binary, and the view models they
//! render.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  handler ──► render_clients(page, flash)                               │
//! │                 │                                                       │
//! │                 ├── ListingView { columns, page, pager, flash }        │
//! │                 │      (hrefs and labels computed here, not in tera)   │
//! │                 ▼                                                       │
//! │              TEMPLATES.render("clients.html", context) ──► String      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Templates use the `.html` extension so tera escapes every value.

use std::collections::HashMap;
use std::sync::LazyLock;

use axum::http::StatusCode;
use serde::Serialize;
use tera::{Context, Tera};
use thiserror::Error;

use orderdesk_core::{
    Client, Money, OrderSummary, Page, Product, SortDirection, ValidationErrors,
};

use crate::forms::{ClientForm, OrderForm, ProductForm};

// =============================================================================
// Template Registry
// =============================================================================

const TEMPLATE_SOURCES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("pager.html", include_str!("../templates/pager.html")),
    ("index.html", include_str!("../templates/index.html")),
    ("clients.html", include_str!("../templates/clients.html")),
    ("client_form.html", include_str!("../templates/client_form.html")),
    ("products.html", include_str!("../templates/products.html")),
    ("product_form.html", include_str!("../templates/product_form.html")),
    ("orders.html", include_str!("../templates/orders.html")),
    ("order_form.html", include_str!("../templates/order_form.html")),
    ("error.html", include_str!("../templates/error.html")),
];

static TEMPLATES: LazyLock<Result<Tera, tera::Error>> = LazyLock::new(|| {
    let mut tera = Tera::default();
    tera.add_raw_templates(TEMPLATE_SOURCES.iter().copied())?;
    Ok(tera)
});

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("Templates failed to load: {0}")]
    Load(String),

    #[error("Failed to render {template}: {source}")]
    Render {
        template: &'static str,
        #[source]
        source: tera::Error,
    },
}

/// Compiles the templates. Called once at startup so a broken template
/// stops the server instead of failing the first request.
pub fn check() -> Result<(), ViewError> {
    templates().map(|_| ())
}

fn templates() -> Result<&'static Tera, ViewError> {
    TEMPLATES
        .as_ref()
        .map_err(|e| ViewError::Load(format!("{:?}", e)))
}

fn render<T: Serialize>(template: &'static str, model: &T) -> Result<String, ViewError> {
    let tera = templates()?;
    let context =
        Context::from_serialize(model).map_err(|source| ViewError::Render { template, source })?;
    tera.render(template, &context)
        .map_err(|source| ViewError::Render { template, source })
}

// =============================================================================
// Flash Messages
// =============================================================================

/// One-shot status shown on a listing after a redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    Saved,
    Deleted,
}

impl Flash {
    /// Reads the `flash` query parameter; unknown values show nothing.
    pub fn from_query(value: Option<&str>) -> Option<Flash> {
        match value? {
            "saved" => Some(Flash::Saved),
            "deleted" => Some(Flash::Deleted),
            _ => None,
        }
    }

    pub const fn as_query(&self) -> &'static str {
        match self {
            Flash::Saved => "saved",
            Flash::Deleted => "deleted",
        }
    }

    pub const fn message(&self) -> &'static str {
        match self {
            Flash::Saved => "Record saved.",
            Flash::Deleted => "Record deleted.",
        }
    }
}

// =============================================================================
// Listing Views
// =============================================================================

/// A sortable column header.
#[derive(Debug, Serialize)]
struct ColumnHeader {
    label: &'static str,
    href: String,
    active: bool,
    arrow: &'static str,
}

#[derive(Debug, Serialize)]
struct PageLink {
    number: i64,
    href: String,
    current: bool,
}

/// Numbered links on each side of the current page.
const PAGER_RADIUS: i64 = 3;

/// Links around the current page, plus the first and last page when they
/// fall outside that window.
#[derive(Debug, Serialize)]
struct Pager {
    first: Option<PageLink>,
    links: Vec<PageLink>,
    last: Option<PageLink>,
    previous: Option<String>,
    next: Option<String>,
}

#[derive(Debug, Serialize)]
struct ListingView<R: Serialize> {
    title: &'static str,
    entity: &'static str,
    columns: Vec<ColumnHeader>,
    page: Page<R>,
    pager: Pager,
    flash: Option<&'static str>,
}

/// `totalPrice` and `total_price` name the same column.
fn same_field(a: &str, b: &str) -> bool {
    let norm = |s: &str| s.replace('_', "").to_ascii_lowercase();
    norm(a) == norm(b)
}

fn page_href(entity: &str, page: i64, field: &str, dir: SortDirection) -> String {
    format!(
        "/{}_page/{}?sortField={}&sortDir={}",
        entity,
        page,
        field,
        dir.as_str()
    )
}

impl<R: Serialize> ListingView<R> {
    fn new(
        title: &'static str,
        entity: &'static str,
        columns: &[(&'static str, &'static str)],
        page: Page<R>,
        flash: Option<Flash>,
    ) -> Self {
        let current = i64::from(page.current_page);

        let columns = columns
            .iter()
            .map(|&(field, label)| {
                let active = same_field(field, &page.sort_field);
                let dir = if active {
                    page.reverse_sort_dir
                } else {
                    SortDirection::Asc
                };
                let arrow = match (active, page.sort_dir) {
                    (false, _) => "",
                    (true, SortDirection::Asc) => "▲",
                    (true, SortDirection::Desc) => "▼",
                };
                ColumnHeader {
                    label,
                    href: page_href(entity, current, field, dir),
                    active,
                    arrow,
                }
            })
            .collect();

        let link = |n: i64| page_href(entity, n, &page.sort_field, page.sort_dir);
        let page_link = |n: i64| PageLink {
            number: n,
            href: link(n),
            current: n == current,
        };
        let anchor = current.min(page.total_pages).max(1);
        let start = (anchor - PAGER_RADIUS).max(1);
        let end = (anchor + PAGER_RADIUS).min(page.total_pages);
        let pager = Pager {
            first: (start > 1).then(|| page_link(1)),
            links: (start..=end).map(page_link).collect(),
            last: (end < page.total_pages).then(|| page_link(page.total_pages)),
            previous: page.has_previous().then(|| link(current - 1)),
            next: page.has_next().then(|| link(current + 1)),
        };

        ListingView {
            title,
            entity,
            columns,
            page,
            pager,
            flash: flash.map(|f| f.message()),
        }
    }
}

const CLIENT_COLUMNS: &[(&str, &str)] = &[
    ("id", "Id"),
    ("name", "Name"),
    ("email", "Email"),
    ("address", "Address"),
    ("postal_code", "Postal code"),
];

const PRODUCT_COLUMNS: &[(&str, &str)] = &[
    ("id", "Id"),
    ("name", "Name"),
    ("description", "Description"),
    ("price", "Price"),
    ("weight", "Weight"),
];

const ORDER_COLUMNS: &[(&str, &str)] = &[
    ("id", "Id"),
    ("client_name", "Client"),
    ("item_count", "Items"),
    ("total_price", "Total"),
    ("delivery_days", "Delivery (days)"),
];

#[derive(Debug, Serialize)]
struct ProductRow {
    id: i64,
    name: String,
    description: String,
    price: String,
    weight: String,
}

impl From<Product> for ProductRow {
    fn from(p: Product) -> Self {
        ProductRow {
            id: p.id,
            price: p.price.to_string(),
            weight: p.weight.to_string(),
            name: p.name,
            description: p.description,
        }
    }
}

#[derive(Debug, Serialize)]
struct OrderRow {
    id: i64,
    client_name: String,
    item_count: i64,
    total: String,
    delivery_days: i64,
}

impl From<OrderSummary> for OrderRow {
    fn from(o: OrderSummary) -> Self {
        OrderRow {
            id: o.id,
            client_name: o.client_name.unwrap_or_else(|| "(no client)".to_string()),
            item_count: o.item_count,
            total: o.total_price.to_string(),
            delivery_days: o.delivery_days,
        }
    }
}

pub fn render_clients(page: Page<Client>, flash: Option<Flash>) -> Result<String, ViewError> {
    let view = ListingView::new("Clients", "clients", CLIENT_COLUMNS, page, flash);
    render("clients.html", &view)
}

pub fn render_products(page: Page<Product>, flash: Option<Flash>) -> Result<String, ViewError> {
    let view = ListingView::new(
        "Products",
        "products",
        PRODUCT_COLUMNS,
        page.map(ProductRow::from),
        flash,
    );
    render("products.html", &view)
}

pub fn render_orders(page: Page<OrderSummary>, flash: Option<Flash>) -> Result<String, ViewError> {
    let view = ListingView::new(
        "Orders",
        "orders",
        ORDER_COLUMNS,
        page.map(OrderRow::from),
        flash,
    );
    render("orders.html", &view)
}

// =============================================================================
// Form Views
// =============================================================================

/// First message per field; a field shows one message at a time.
fn field_messages(errors: &ValidationErrors) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for m in errors.messages() {
        map.entry(m.field).or_insert(m.message);
    }
    map
}

#[derive(Debug, Serialize)]
struct FormView<'a, F: Serialize> {
    title: &'static str,
    form: &'a F,
    errors: HashMap<String, String>,
}

fn form_title(id: &str, new: &'static str, edit: &'static str) -> &'static str {
    if id.trim().is_empty() {
        new
    } else {
        edit
    }
}

pub fn render_client_form(form: &ClientForm, errors: &ValidationErrors) -> Result<String, ViewError> {
    let view = FormView {
        title: form_title(&form.id, "New client", "Edit client"),
        form,
        errors: field_messages(errors),
    };
    render("client_form.html", &view)
}

pub fn render_product_form(
    form: &ProductForm,
    errors: &ValidationErrors,
) -> Result<String, ViewError> {
    let view = FormView {
        title: form_title(&form.id, "New product", "Edit product"),
        form,
        errors: field_messages(errors),
    };
    render("product_form.html", &view)
}

#[derive(Debug, Serialize)]
struct SelectOption {
    value: String,
    label: String,
    selected: bool,
}

fn options<I>(entries: I, selected: &str) -> Vec<SelectOption>
where
    I: IntoIterator<Item = (i64, String)>,
{
    let selected = selected.trim();
    entries
        .into_iter()
        .map(|(id, label)| {
            let value = id.to_string();
            SelectOption {
                selected: value == selected,
                value,
                label,
            }
        })
        .collect()
}

#[derive(Debug, Serialize)]
struct LineView {
    index: usize,
    id: String,
    quantity: String,
    products: Vec<SelectOption>,
    product_error: Option<String>,
    quantity_error: Option<String>,
}

#[derive(Debug, Serialize)]
struct OrderFormView {
    title: &'static str,
    id: String,
    delivery_days: String,
    clients: Vec<SelectOption>,
    lines: Vec<LineView>,
    total: Option<String>,
    errors: HashMap<String, String>,
}

/// Renders the order form.
///
/// `total` is the stored total of the order being edited; it is shown
/// read-only and never submitted back.
pub fn render_order_form(
    form: &OrderForm,
    errors: &ValidationErrors,
    clients: &[Client],
    products: &[Product],
    total: Option<Money>,
) -> Result<String, ViewError> {
    let errors = field_messages(errors);

    let product_entries = |selected: &str| {
        options(
            products
                .iter()
                .map(|p| (p.id, format!("{} ({})", p.name, p.price))),
            selected,
        )
    };

    let lines = form
        .lines
        .iter()
        .enumerate()
        .map(|(index, line)| LineView {
            index,
            id: line.id.clone(),
            quantity: line.quantity.clone(),
            products: product_entries(&line.product_id),
            product_error: errors.get(&format!("items[{}].product_id", index)).cloned(),
            quantity_error: errors.get(&format!("items[{}].quantity", index)).cloned(),
        })
        .collect();

    let view = OrderFormView {
        title: form_title(&form.id, "New order", "Edit order"),
        id: form.id.clone(),
        delivery_days: form.delivery_days.clone(),
        clients: options(
            clients.iter().map(|c| (c.id, c.name.clone())),
            &form.client_id,
        ),
        lines,
        total: total.map(|t| t.to_string()),
        errors,
    };
    render("order_form.html", &view)
}

// =============================================================================
// Other Pages
// =============================================================================

/// Record counts shown on the landing page.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Counts {
    pub clients: i64,
    pub products: i64,
    pub orders: i64,
}

pub fn render_index(counts: Counts) -> Result<String, ViewError> {
    render("index.html", &counts)
}

#[derive(Debug, Serialize)]
struct ErrorView<'a> {
    status: u16,
    reason: &'static str,
    message: &'a str,
}

pub fn render_error(status: StatusCode, message: &str) -> Result<String, ViewError> {
    let view = ErrorView {
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or("Error"),
        message,
    };
    render("error.html", &view)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use orderdesk_core::{PageRequest, ValidationError, Weight};

    fn client(id: i64, name: &str) -> Client {
        Client {
            id,
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            address: "Rua A, 1".to_string(),
            postal_code: "01000000".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn product(id: i64, name: &str, cents: i64) -> Product {
        Product {
            id,
            name: name.to_string(),
            description: "desc".to_string(),
            price: Money::from_cents(cents),
            weight: Weight::from_grams(500),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_templates_compile() {
        check().unwrap();
    }

    #[test]
    fn test_flash_from_query() {
        assert_eq!(Flash::from_query(Some("saved")), Some(Flash::Saved));
        assert_eq!(Flash::from_query(Some("deleted")), Some(Flash::Deleted));
        assert_eq!(Flash::from_query(Some("<script>")), None);
        assert_eq!(Flash::from_query(None), None);
    }

    #[test]
    fn test_listing_marks_sorted_column() {
        let request = PageRequest::new(1, Some("name"), Some("asc")).unwrap();
        let page = Page::new(vec![client(1, "Ana")], &request, 1);
        let view = ListingView::new("Clients", "clients", CLIENT_COLUMNS, page, None);

        let name = view.columns.iter().find(|c| c.label == "Name").unwrap();
        assert!(name.active);
        assert_eq!(name.arrow, "▲");
        assert_eq!(name.href, "/clients_page/1?sortField=name&sortDir=desc");

        let email = view.columns.iter().find(|c| c.label == "Email").unwrap();
        assert!(!email.active);
        assert_eq!(email.href, "/clients_page/1?sortField=email&sortDir=asc");
    }

    #[test]
    fn test_pager_links_keep_sort() {
        let request = PageRequest::new(2, Some("totalPrice"), Some("desc")).unwrap();
        let page: Page<OrderRow> = Page::new(vec![], &request, 12);
        let view = ListingView::new("Orders", "orders", ORDER_COLUMNS, page, None);

        assert_eq!(view.pager.links.len(), 3);
        assert!(view.pager.links[1].current);
        assert_eq!(
            view.pager.previous.as_deref(),
            Some("/orders_page/1?sortField=totalPrice&sortDir=desc")
        );
        assert!(view.pager.next.is_some());

        let total = view.columns.iter().find(|c| c.label == "Total").unwrap();
        assert!(total.active);
        assert_eq!(total.arrow, "▼");
    }

    #[test]
    fn test_pager_shows_window_around_current_page() {
        let request = PageRequest::new(500, None, None).unwrap();
        let page: Page<OrderRow> = Page::new(vec![], &request, 10_000);
        let view = ListingView::new("Orders", "orders", ORDER_COLUMNS, page, None);

        let numbers: Vec<i64> = view.pager.links.iter().map(|l| l.number).collect();
        assert_eq!(numbers, vec![497, 498, 499, 500, 501, 502, 503]);
        assert_eq!(view.pager.first.as_ref().map(|l| l.number), Some(1));
        assert_eq!(view.pager.last.as_ref().map(|l| l.number), Some(2_000));

        let html = render_orders(
            Page::new(vec![], &PageRequest::new(1, None, None).unwrap(), 10_000),
            None,
        )
        .unwrap();
        assert!(html.contains(r#"href="/orders_page/2000?sortField=id&sortDir=asc""#));
        assert!(!html.contains(r#"href="/orders_page/6?"#));
    }

    #[test]
    fn test_render_clients_escapes_values() {
        let request = PageRequest::new(1, None, None).unwrap();
        let page = Page::new(vec![client(1, "<b>Ana</b>")], &request, 1);
        let html = render_clients(page, Some(Flash::Saved)).unwrap();

        assert!(html.contains("&lt;b&gt;Ana&lt;&#x2F;b&gt;"));
        assert!(!html.contains("<b>Ana</b>"));
        assert!(html.contains("Record saved."));
    }

    #[test]
    fn test_render_client_form_shows_errors() {
        let form = ClientForm {
            name: "".into(),
            email: "nope".into(),
            ..Default::default()
        };
        let mut errors = ValidationErrors::new();
        errors.push(ValidationError::Required {
            field: "name".into(),
        });

        let html = render_client_form(&form, &errors).unwrap();
        assert!(html.contains("New client"));
        assert!(html.contains("name is required"));
        assert!(html.contains("nope"));
    }

    #[test]
    fn test_render_order_form_selects_options() {
        let form = OrderForm::from_pairs(vec![
            ("id", "3"),
            ("client_id", "2"),
            ("delivery_days", "4"),
            ("items[0].product_id", "11"),
            ("items[0].quantity", "2"),
        ])
        .with_blank_lines(1);

        let html = render_order_form(
            &form,
            &ValidationErrors::new(),
            &[client(1, "Ana"), client(2, "Bruno")],
            &[product(10, "Tea", 300), product(11, "Coffee", 1_050)],
            Some(Money::from_cents(2_100)),
        )
        .unwrap();

        assert!(html.contains("Edit order"));
        assert!(html.contains(r#"<option value="2" selected>Bruno</option>"#));
        assert!(html.contains(r#"<option value="11" selected>Coffee ($10.50)</option>"#));
        assert!(html.contains("$21.00"));
        assert!(html.contains(r#"name="items[1].quantity""#));
    }

    #[test]
    fn test_render_error_page() {
        let html = render_error(StatusCode::NOT_FOUND, "Client not found: 9").unwrap();
        assert!(html.contains("404"));
        assert!(html.contains("Not Found"));
        assert!(html.contains("Client not found: 9"));
    }

    #[test]
    fn test_same_field() {
        assert!(same_field("totalPrice", "total_price"));
        assert!(same_field("postal_code", "postalCode"));
        assert!(!same_field("name", "email"));
    }
}
