use crate::server::model::order::DeliveryContact;
use crate::server::model::validation;
use crate::server::model::UserId;
use serde::{Deserialize, Serialize};
use storefront::cart::CartItem;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateOrderRequest {
    pub cart: Vec<CartItem>,
    pub user_id: UserId,
    pub customer_name: String,
    pub email: String,
    pub street: String,
    pub city: String,
    pub phone: String,
}

/// Largest quantity accepted for a single cart line
pub(crate) const MAX_LINE_QUANTITY: u32 = 999;

pub(crate) fn line_quantity(item: &CartItem) -> Result<(), String> {
    match item.quantity {
        0 => Err(format!("quantity of menu item {} must be at least 1", item.menu.id)),
        q if q > MAX_LINE_QUANTITY => Err(format!(
            "quantity of menu item {} must be at most {}",
            item.menu.id, MAX_LINE_QUANTITY
        )),
        _ => Ok(()),
    }
}

impl CreateOrderRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.cart.is_empty() {
            return Err("cart is empty".to_string());
        }
        self.cart.iter().try_for_each(line_quantity)?;
        validation::required("customerName", &self.customer_name, 10)?;
        validation::email(&self.email)?;
        validation::required("street", &self.street, 20)?;
        validation::required("city", &self.city, 20)?;
        validation::required("phone", &self.phone, 10)
    }

    pub fn contact(&self) -> DeliveryContact {
        DeliveryContact {
            customer_name: self.customer_name.trim().to_string(),
            email: self.email.trim().to_string(),
            street: self.street.trim().to_string(),
            city: self.city.trim().to_string(),
            phone: self.phone.trim().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateOrderResponse {
    pub stripe_session_url: String,
    pub message: String,
}
