use crate::server::model::menu::{Category, MenuItem};
use crate::server::model::order::{NewOrder, Order};
use crate::server::model::user::{ContactUpdate, NewUser, Profile};
use crate::server::model::{OrderId, UserId};
use derive_more::{Display, Error};
use std::collections::HashMap;
use storefront::cart::MenuId;

#[derive(Debug, Display, Error, PartialEq)]
pub(crate) enum StoreError {
    #[display("no connection available")]
    Busy,
    #[display("{_0}")]
    Conflict(#[error(not(source))] String),
    #[display("database error: {_0}")]
    Db(#[error(not(source))] String),
}

impl From<tokio_postgres::Error> for StoreError {
    fn from(e: tokio_postgres::Error) -> Self {
        StoreError::Db(e.to_string())
    }
}

/// Persistence used by the request handlers.
///
/// Lookups scoped to a user return `None` both for missing rows and for rows
/// owned by someone else.
pub(crate) trait Store: Send + Sync + 'static {
    async fn list_menu(&self) -> Result<Vec<MenuItem>, StoreError>;

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError>;

    /// current menu rows for `ids`, keyed by id; unknown ids are absent
    async fn menu_items(&self, ids: &[MenuId]) -> Result<HashMap<MenuId, MenuItem>, StoreError>;

    /// insert the order and all of its items atomically, `paid` starts false
    async fn create_order(&self, order: NewOrder) -> Result<Order, StoreError>;

    /// set `paid = true`; returns false when no such order exists
    async fn mark_paid(&self, order_id: OrderId) -> Result<bool, StoreError>;

    async fn order_for_user(
        &self,
        user_id: UserId,
        order_id: OrderId,
    ) -> Result<Option<Order>, StoreError>;

    /// newest first
    async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, StoreError>;

    async fn profile(&self, user_id: UserId) -> Result<Option<Profile>, StoreError>;

    async fn update_contact(
        &self,
        user_id: UserId,
        contact: &ContactUpdate,
    ) -> Result<bool, StoreError>;

    /// fails with [`StoreError::Conflict`] on a taken username or email
    async fn create_user(&self, user: NewUser) -> Result<Profile, StoreError>;
}
