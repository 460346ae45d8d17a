//! In-memory [`Store`] used by handler tests

use crate::server::database::store::{Store, StoreError};
use crate::server::model::menu::{Category, MenuItem};
use crate::server::model::order::{NewOrder, Order};
use crate::server::model::user::{ContactUpdate, NewUser, Profile};
use crate::server::model::{OrderId, UserId};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use storefront::cart::MenuId;

#[derive(Default)]
struct Tables {
    menu: Vec<MenuItem>,
    categories: Vec<Category>,
    users: Vec<(Profile, String)>,
    orders: Vec<Order>,
    next_order_id: OrderId,
    next_user_id: UserId,
}

#[derive(Default)]
pub(crate) struct MemoryStore {
    tables: Mutex<Tables>,
    /// when set, every call fails as if the pools were exhausted
    unavailable: Mutex<bool>,
}

impl MemoryStore {
    pub fn new(menu: Vec<MenuItem>, categories: Vec<Category>) -> Self {
        Self {
            tables: Mutex::new(Tables {
                menu,
                categories,
                next_order_id: 1,
                next_user_id: 1,
                ..Tables::default()
            }),
            unavailable: Mutex::new(false),
        }
    }

    pub fn add_user(&self, username: &str, email: &str) -> Profile {
        let mut tables = self.tables.lock().unwrap();
        let profile = Profile {
            id: tables.next_user_id,
            username: username.to_string(),
            email: email.to_string(),
            street: None,
            city: None,
            phone: None,
            role: "user".to_string(),
        };
        tables.next_user_id += 1;
        tables.users.push((profile.clone(), String::new()));
        profile
    }

    pub fn set_menu_price(&self, id: MenuId, price: rust_decimal::Decimal) {
        let mut tables = self.tables.lock().unwrap();
        if let Some(item) = tables.menu.iter_mut().find(|m| m.id == id) {
            item.price = price;
        }
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.lock().unwrap() = unavailable;
    }

    pub fn orders(&self) -> Vec<Order> {
        self.tables.lock().unwrap().orders.clone()
    }

    pub fn password_hash(&self, username: &str) -> Option<String> {
        self.tables
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|(p, _)| p.username == username)
            .map(|(_, hash)| hash.clone())
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        if *self.unavailable.lock().unwrap() {
            return Err(StoreError::Busy);
        }
        self.tables
            .lock()
            .map_err(|e| StoreError::Db(e.to_string()))
    }
}

impl Store for MemoryStore {
    async fn list_menu(&self) -> Result<Vec<MenuItem>, StoreError> {
        Ok(self.tables()?.menu.clone())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        Ok(self.tables()?.categories.clone())
    }

    async fn menu_items(&self, ids: &[MenuId]) -> Result<HashMap<MenuId, MenuItem>, StoreError> {
        Ok(self
            .tables()?
            .menu
            .iter()
            .filter(|item| ids.contains(&item.id))
            .map(|item| (item.id, item.clone()))
            .collect())
    }

    async fn create_order(&self, order: NewOrder) -> Result<Order, StoreError> {
        let mut tables = self.tables()?;
        let created = Order {
            id: tables.next_order_id,
            user_id: order.user_id,
            contact: order.contact,
            paid: false,
            created_at: order.created_at,
            cart_items: order.cart_items,
        };
        tables.next_order_id += 1;
        tables.orders.push(created.clone());
        Ok(created)
    }

    async fn mark_paid(&self, order_id: OrderId) -> Result<bool, StoreError> {
        let mut tables = self.tables()?;
        match tables.orders.iter_mut().find(|o| o.id == order_id) {
            Some(order) => {
                order.paid = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn order_for_user(
        &self,
        user_id: UserId,
        order_id: OrderId,
    ) -> Result<Option<Order>, StoreError> {
        Ok(self
            .tables()?
            .orders
            .iter()
            .find(|o| o.id == order_id && o.user_id == user_id)
            .cloned())
    }

    async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, StoreError> {
        let mut orders = self
            .tables()?
            .orders
            .iter()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect::<Vec<_>>();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(orders)
    }

    async fn profile(&self, user_id: UserId) -> Result<Option<Profile>, StoreError> {
        Ok(self
            .tables()?
            .users
            .iter()
            .find(|(p, _)| p.id == user_id)
            .map(|(p, _)| p.clone()))
    }

    async fn update_contact(
        &self,
        user_id: UserId,
        contact: &ContactUpdate,
    ) -> Result<bool, StoreError> {
        let mut tables = self.tables()?;
        match tables.users.iter_mut().find(|(p, _)| p.id == user_id) {
            Some((profile, _)) => {
                profile.street = Some(contact.street.clone());
                profile.city = Some(contact.city.clone());
                profile.phone = Some(contact.phone.clone());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn create_user(&self, user: NewUser) -> Result<Profile, StoreError> {
        let mut tables = self.tables()?;
        if tables.users.iter().any(|(p, _)| p.username == user.username) {
            return Err(StoreError::Conflict("Username already exist".to_string()));
        }
        if tables.users.iter().any(|(p, _)| p.email == user.email) {
            return Err(StoreError::Conflict("Email already exist".to_string()));
        }
        let profile = Profile {
            id: tables.next_user_id,
            username: user.username,
            email: user.email,
            street: Some(user.street),
            city: Some(user.city),
            phone: Some(user.phone),
            role: "user".to_string(),
        };
        tables.next_user_id += 1;
        tables.users.push((profile.clone(), user.password_hash));
        Ok(profile)
    }
}
