use crate::cart::{Cart, CartError, CheckoutOutcome, CheckoutReturn, MenuId, MenuSnapshot, Size};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

/// On-disk layout of the cart file
#[derive(Debug, Default, Serialize, Deserialize)]
struct PersistedCart {
    cart: Cart,
    /// orders whose successful return already cleared the cart
    #[serde(default)]
    settled_orders: BTreeSet<i64>,
}

/// A [`Cart`] bound to a JSON file. Every mutation is written through before returning.
#[derive(Debug)]
pub struct CartStore {
    path: PathBuf,
    state: PersistedCart,
}

impl CartStore {
    /// Load the cart stored at `path`; a missing file yields an empty cart.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CartError> {
        let path = path.into();
        let state = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("no cart stored at {}, starting empty", path.display());
                PersistedCart::default()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, state })
    }

    pub fn cart(&self) -> &Cart {
        &self.state.cart
    }

    pub fn add_to_cart(
        &mut self,
        menu: MenuSnapshot,
        size: Size,
        quantity: u32,
    ) -> Result<(), CartError> {
        self.state.cart.add(menu, size, quantity)?;
        self.save()
    }

    pub fn increase_quantity(&mut self, menu_id: MenuId, size: Size) -> Result<bool, CartError> {
        let changed = self.state.cart.increase(menu_id, size)?;
        self.save_if(changed)
    }

    pub fn decrease_quantity(&mut self, menu_id: MenuId, size: Size) -> Result<bool, CartError> {
        let changed = self.state.cart.decrease(menu_id, size);
        self.save_if(changed)
    }

    pub fn remove_from_cart(&mut self, menu_id: MenuId, size: Size) -> Result<bool, CartError> {
        let changed = self.state.cart.remove(menu_id, size);
        self.save_if(changed)
    }

    pub fn clear_cart(&mut self) -> Result<(), CartError> {
        self.state.cart.clear();
        self.save()
    }

    /// Clear the cart after a successful checkout return, once per order.
    ///
    /// Returns whether the cart was cleared.
    pub fn observe_checkout_return(&mut self, ret: &CheckoutReturn) -> Result<bool, CartError> {
        if ret.outcome != CheckoutOutcome::Success
            || self.state.settled_orders.contains(&ret.order_id)
        {
            return Ok(false);
        }
        info!("order {} paid, clearing cart", ret.order_id);
        self.state.cart.clear();
        self.state.settled_orders.insert(ret.order_id);
        self.save()?;
        Ok(true)
    }

    fn save_if(&self, changed: bool) -> Result<bool, CartError> {
        if changed {
            self.save()?;
        }
        Ok(changed)
    }

    fn save(&self) -> Result<(), CartError> {
        let bytes = serde_json::to_vec_pretty(&self.state)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &self.path)?;
        debug!("cart saved to {}", self.path.display());
        Ok(())
    }
}
