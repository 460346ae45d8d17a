//! Client-held shopping cart.
//!
//! A [`Cart`] holds at most one entry per `(menu id, size)` key; adding an
//! entry that already exists bumps its quantity. Quantities never drop
//! below one, removal is its own operation.

mod checkout_return;
mod store;

pub use checkout_return::{CheckoutOutcome, CheckoutReturn, ReturnParseError};
pub use store::CartStore;

use crate::pricing::{self, PricedLine};
use derive_more::{Display, Error, From};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub type MenuId = i64;

/// Portion size offered for every menu item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Size {
    Small,
    Normal,
}

impl Size {
    pub fn as_str(&self) -> &'static str {
        match self {
            Size::Small => "SMALL",
            Size::Normal => "NORMAL",
        }
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Size {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SMALL" => Ok(Self::Small),
            "NORMAL" => Ok(Self::Normal),
            s => Err(format!("Invalid size: {s}")),
        }
    }
}

/// Menu data copied into the cart when an item is added
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuSnapshot {
    pub id: MenuId,
    pub name: String,
    pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub menu: MenuSnapshot,
    pub size: Size,
    pub quantity: u32,
}

impl CartItem {
    fn matches(&self, menu_id: MenuId, size: Size) -> bool {
        self.menu.id == menu_id && self.size == size
    }
}

impl PricedLine for CartItem {
    fn unit_price(&self) -> Decimal {
        self.menu.price
    }

    fn quantity(&self) -> u32 {
        self.quantity
    }
}

#[derive(Debug, Display, Error, From)]
pub enum CartError {
    #[display("quantity must be at least 1")]
    #[from(ignore)]
    InvalidQuantity,
    #[display("quantity overflow for menu item {_0}")]
    #[from(ignore)]
    QuantityOverflow(#[error(not(source))] MenuId),
    #[display("cart storage error: {_0}")]
    Io(std::io::Error),
    #[display("cart storage is corrupt: {_0}")]
    Corrupt(serde_json::Error),
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Build a cart from loose items, merging entries that share a key.
    pub fn from_items(items: impl IntoIterator<Item = CartItem>) -> Result<Self, CartError> {
        let mut cart = Cart::default();
        for item in items {
            cart.add(item.menu, item.size, item.quantity)?;
        }
        Ok(cart)
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn get(&self, menu_id: MenuId, size: Size) -> Option<&CartItem> {
        self.items.iter().find(|item| item.matches(menu_id, size))
    }

    /// Add `quantity` of a menu item, merging with an existing entry of the same size.
    pub fn add(&mut self, menu: MenuSnapshot, size: Size, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }
        match self.items.iter_mut().find(|item| item.matches(menu.id, size)) {
            Some(item) => {
                item.quantity = item
                    .quantity
                    .checked_add(quantity)
                    .ok_or(CartError::QuantityOverflow(menu.id))?;
            }
            None => self.items.push(CartItem {
                menu,
                size,
                quantity,
            }),
        }
        Ok(())
    }

    /// Returns false when no entry matched.
    pub fn increase(&mut self, menu_id: MenuId, size: Size) -> Result<bool, CartError> {
        match self.items.iter_mut().find(|item| item.matches(menu_id, size)) {
            Some(item) => {
                item.quantity = item
                    .quantity
                    .checked_add(1)
                    .ok_or(CartError::QuantityOverflow(menu_id))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Decrement by one; an entry at quantity 1 is left untouched.
    pub fn decrease(&mut self, menu_id: MenuId, size: Size) -> bool {
        match self.items.iter_mut().find(|item| item.matches(menu_id, size)) {
            Some(item) if item.quantity > 1 => {
                item.quantity -= 1;
                true
            }
            _ => false,
        }
    }

    pub fn remove(&mut self, menu_id: MenuId, size: Size) -> bool {
        let before = self.items.len();
        self.items.retain(|item| !item.matches(menu_id, size));
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn subtotal(&self) -> Decimal {
        pricing::subtotal(&self.items)
    }

    /// Subtotal plus delivery, the amount shown before checkout
    pub fn total(&self) -> Decimal {
        pricing::order_total(&self.items)
    }
}
