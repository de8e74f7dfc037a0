//! Bundled order fixture and the view models built from it.
//!
//! Orders are read-only: they come from `data/orders.json`, compiled into the
//! binary, and are only ever listed, filtered by status, or looked up by id.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::language::LanguageSnapshot;

const BUNDLED_ORDERS: &str = include_str!("../data/orders.json");

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("order fixture is malformed: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Preparing,
    Ready,
    Completed,
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    pub fn parse(raw: &str) -> OrderStatus {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => OrderStatus::Pending,
            "preparing" => OrderStatus::Preparing,
            "ready" => OrderStatus::Ready,
            "completed" => OrderStatus::Completed,
            _ => OrderStatus::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FulfillmentType {
    #[serde(rename = "pickup")]
    Pickup,
    #[serde(rename = "delivery")]
    Delivery,
    #[serde(rename = "dine-in")]
    DineIn,
}

impl FulfillmentType {
    pub fn as_str(self) -> &'static str {
        match self {
            FulfillmentType::Pickup => "pickup",
            FulfillmentType::Delivery => "delivery",
            FulfillmentType::DineIn => "dine-in",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extra {
    pub name: String,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub name: String,
    pub quantity: u32,
    /// Unit price.
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extras: Option<Vec<Extra>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl OrderItem {
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }

    pub fn has_extras(&self) -> bool {
        self.extras.as_ref().is_some_and(|e| !e.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub phone: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub status: OrderStatus,
    #[serde(rename = "type")]
    pub fulfillment: FulfillmentType,
    pub price: f64,
    pub items: Vec<OrderItem>,
    pub customer: Customer,
    pub order_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
}

impl Order {
    pub fn is_completed(&self) -> bool {
        self.status == OrderStatus::Completed
    }
}

/// Tabs of the home screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HomeTab {
    Home,
    Ready,
}

impl HomeTab {
    pub fn key(self) -> &'static str {
        match self {
            HomeTab::Home => "home",
            HomeTab::Ready => "ready",
        }
    }
}

pub struct OrderBook {
    orders: Vec<Order>,
}

impl OrderBook {
    /// The fixture compiled into the app.
    pub fn bundled() -> Result<Self, FixtureError> {
        Self::from_json(BUNDLED_ORDERS)
    }

    pub fn from_json(raw: &str) -> Result<Self, FixtureError> {
        let orders: Vec<Order> = serde_json::from_str(raw)?;
        debug!(count = orders.len(), "order fixture loaded");
        Ok(Self { orders })
    }

    pub fn all(&self) -> &[Order] {
        &self.orders
    }

    pub fn with_status(&self, status: OrderStatus) -> Vec<&Order> {
        self.orders.iter().filter(|o| o.status == status).collect()
    }

    pub fn ready(&self) -> Vec<&Order> {
        self.with_status(OrderStatus::Ready)
    }

    pub fn for_tab(&self, tab: HomeTab) -> Vec<&Order> {
        match tab {
            HomeTab::Home => self.orders.iter().collect(),
            HomeTab::Ready => self.ready(),
        }
    }

    pub fn find(&self, id: &str) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == id)
    }

    /// Detail screen content, or the "not found" rendering path.
    pub fn detail(&self, id: &str, lang: &LanguageSnapshot) -> OrderDetailView {
        match self.find(id) {
            Some(order) => OrderDetailView::Found(OrderDetail::build(order, lang)),
            None => {
                debug!(order_id = %id, "order lookup missed");
                OrderDetailView::NotFound {
                    message: lang.translate("orderNotFound").to_string(),
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// View models
// ---------------------------------------------------------------------------

/// One row of the home/ready lists.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCard {
    pub id: String,
    pub waiter_label: String,
    pub order_time: String,
    pub fulfillment: FulfillmentType,
    pub type_label: String,
    pub send_sms_enabled: bool,
    pub picked_up_highlighted: bool,
}

impl OrderCard {
    pub fn build(order: &Order, lang: &LanguageSnapshot) -> Self {
        let type_label = match order.fulfillment {
            FulfillmentType::Pickup => lang.translate("pickup").to_string(),
            FulfillmentType::Delivery => lang.translate("delivery").to_string(),
            FulfillmentType::DineIn => order
                .table
                .clone()
                .unwrap_or_else(|| lang.translate("table").to_string()),
        };
        Self {
            id: order.id.clone(),
            waiter_label: lang.translate("waiterName").to_string(),
            order_time: order.order_time.clone(),
            fulfillment: order.fulfillment,
            type_label,
            send_sms_enabled: !order.is_completed(),
            picked_up_highlighted: order.is_completed(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtraLine {
    pub name: String,
    pub price_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemLine {
    pub title: String,
    pub line_total: f64,
    pub total_label: String,
    pub extras_heading: String,
    pub extras: Vec<ExtraLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    pub id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub ordered_at: String,
    pub order_type: String,
    pub price_label: String,
    pub items: Vec<ItemLine>,
    pub rtl: bool,
}

impl OrderDetail {
    pub fn build(order: &Order, lang: &LanguageSnapshot) -> Self {
        let currency = lang.translate("currency");
        let items = order
            .items
            .iter()
            .map(|item| {
                let line_total = item.line_total();
                let extras_heading = if item.has_extras() { "extras" } else { "noExtras" };
                ItemLine {
                    title: format!("{} ({})", item.name, item.quantity),
                    line_total,
                    total_label: money_label(line_total, currency),
                    extras_heading: lang.translate(extras_heading).to_string(),
                    extras: item
                        .extras
                        .iter()
                        .flatten()
                        .map(|extra| ExtraLine {
                            name: extra.name.clone(),
                            price_label: money_label(extra.price, currency),
                        })
                        .collect(),
                    notes: item.notes.clone().filter(|n| !n.trim().is_empty()),
                }
            })
            .collect();

        Self {
            id: order.id.clone(),
            customer_name: order.customer.name.clone(),
            customer_phone: order.customer.phone.clone(),
            ordered_at: order.order_time.clone(),
            order_type: capitalize(order.fulfillment.as_str()),
            price_label: money_label(order.price, currency),
            items,
            rtl: lang.is_rtl(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum OrderDetailView {
    Found(OrderDetail),
    NotFound { message: String },
}

/// Collapsible item list of the detail screen. Starts expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollapsibleSection {
    pub collapsed: bool,
    pub len: usize,
}

impl CollapsibleSection {
    pub fn new(len: usize) -> Self {
        Self {
            collapsed: false,
            len,
        }
    }

    pub fn toggle(&mut self) {
        self.collapsed = !self.collapsed;
    }

    pub fn shows_children(&self) -> bool {
        !self.collapsed
    }
}

/// `245` -> `"245 EGP"`, `12.5` -> `"12.5 EGP"`.
pub fn money_label(amount: f64, currency: &str) -> String {
    if amount.fract() == 0.0 {
        format!("{amount:.0} {currency}")
    } else {
        format!("{amount} {currency}")
    }
}

fn capitalize(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
