use crate::server::model::{OrderId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use storefront::cart::{MenuId, Size};
use storefront::pricing::{self, PricedLine};

/// Where and to whom an order is delivered
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DeliveryContact {
    pub customer_name: String,
    pub email: String,
    pub street: String,
    pub city: String,
    pub phone: String,
}

/// A persisted order; only `paid` changes after creation
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub contact: DeliveryContact,
    pub paid: bool,
    pub created_at: DateTime<Utc>,
    pub cart_items: Vec<OrderCartItem>,
}

/// Menu line frozen at order creation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderCartItem {
    pub menu_id: MenuId,
    pub name: String,
    pub size: Size,
    pub unit_price: Decimal,
    pub quantity: u32,
}

impl PricedLine for OrderCartItem {
    fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    fn quantity(&self) -> u32 {
        self.quantity
    }
}

/// Everything needed to insert an order and its items in one transaction
#[derive(Debug, Clone)]
pub(crate) struct NewOrder {
    pub user_id: UserId,
    pub contact: DeliveryContact,
    pub created_at: DateTime<Utc>,
    pub cart_items: Vec<OrderCartItem>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderLineView {
    #[serde(flatten)]
    pub item: OrderCartItem,
    pub line_total: Decimal,
}

/// Order as returned by the read endpoints, with computed totals
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderView {
    pub id: OrderId,
    pub user_id: UserId,
    pub customer_name: String,
    pub email: String,
    pub street: String,
    pub city: String,
    pub phone: String,
    pub paid: bool,
    pub created_at: DateTime<Utc>,
    pub cart_items: Vec<OrderLineView>,
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub total: Decimal,
    pub formatted_total: String,
}

impl From<Order> for OrderView {
    fn from(order: Order) -> Self {
        let subtotal = pricing::subtotal(&order.cart_items);
        let total = pricing::order_total(&order.cart_items);
        let Order {
            id,
            user_id,
            contact,
            paid,
            created_at,
            cart_items,
        } = order;
        Self {
            id,
            user_id,
            customer_name: contact.customer_name,
            email: contact.email,
            street: contact.street,
            city: contact.city,
            phone: contact.phone,
            paid,
            created_at,
            cart_items: cart_items
                .into_iter()
                .map(|item| OrderLineView {
                    line_total: item.line_total(),
                    item,
                })
                .collect(),
            subtotal,
            delivery_fee: pricing::DELIVERY_FEE,
            total,
            formatted_total: pricing::format_price(total),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GetOrderResponse {
    pub order_item: OrderView,
}

#[derive(Debug, Serialize)]
pub(crate) struct GetOrdersResponse {
    pub orders: Vec<OrderView>,
}
