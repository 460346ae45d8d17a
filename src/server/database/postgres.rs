use crate::server::database::connection::Connection;
use crate::server::database::pool::Pool;
use crate::server::database::store::{Store, StoreError};
use crate::server::database::DB_TIMEOUT;
use crate::server::model::menu::{Category, MenuItem};
use crate::server::model::order::{DeliveryContact, NewOrder, Order, OrderCartItem};
use crate::server::model::user::{ContactUpdate, NewUser, Profile};
use crate::server::model::{OrderId, UserId};
use log::{info, warn};
use std::collections::HashMap;
use storefront::cart::{MenuId, Size};
use tokio_postgres::error::SqlState;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, Row};

const MENU_COLUMNS: &str = r#"
    SELECT m.id, m.name, m.description, m.price, c.name AS category
    FROM menu m
    LEFT JOIN category c
    ON m.category_id = c.id
"#;

const ORDER_COLUMNS: &str = r#"
    SELECT id, user_id, customer_name, email, street, city, phone, paid, created_at
    FROM "order"
"#;

/// [`Store`] backed by postgres, reads and writes go through separate pools
#[derive(Clone)]
pub(crate) struct PgStore {
    read_pool: Pool,
    write_pool: Pool,
}

impl PgStore {
    pub fn new(read_pool: Pool, write_pool: Pool) -> Self {
        Self {
            read_pool,
            write_pool,
        }
    }

    async fn read(&self) -> Result<Connection, StoreError> {
        self.read_pool.acquire(DB_TIMEOUT).await.ok_or(StoreError::Busy)
    }

    async fn write(&self) -> Result<Connection, StoreError> {
        self.write_pool.acquire(DB_TIMEOUT).await.ok_or(StoreError::Busy)
    }
}

fn menu_item_from_row(row: &Row) -> MenuItem {
    MenuItem {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        price: row.get("price"),
        category: row.get("category"),
    }
}

fn order_from_row(row: &Row) -> Order {
    Order {
        id: row.get("id"),
        user_id: row.get("user_id"),
        contact: DeliveryContact {
            customer_name: row.get("customer_name"),
            email: row.get("email"),
            street: row.get("street"),
            city: row.get("city"),
            phone: row.get("phone"),
        },
        paid: row.get("paid"),
        created_at: row.get("created_at"),
        cart_items: vec![],
    }
}

fn order_item_from_row(row: &Row) -> Result<OrderCartItem, StoreError> {
    let size: &str = row.get("size");
    let quantity: i32 = row.get("quantity");
    Ok(OrderCartItem {
        menu_id: row.get("menu_id"),
        name: row.get("name"),
        size: size.parse::<Size>().map_err(StoreError::Db)?,
        unit_price: row.get("unit_price"),
        quantity: u32::try_from(quantity)
            .map_err(|_| StoreError::Db(format!("invalid stored quantity {quantity}")))?,
    })
}

fn profile_from_row(row: &Row) -> Profile {
    Profile {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        street: row.get("street"),
        city: row.get("city"),
        phone: row.get("phone"),
        role: row.get("role"),
    }
}

/// fill `cart_items` of every order with a single query
async fn attach_items(
    client: &Client,
    mut orders: Vec<Order>,
) -> Result<Vec<Order>, StoreError> {
    if orders.is_empty() {
        return Ok(orders);
    }
    let ids = orders.iter().map(|o| o.id).collect::<Vec<OrderId>>();
    let rows = client
        .query(
            r#"
            SELECT order_id, menu_id, name, size, unit_price, quantity
            FROM order_cart_item
            WHERE order_id = ANY($1)
            ORDER BY id
            "#,
            &[&ids],
        )
        .await?;
    let mut by_order: HashMap<OrderId, Vec<OrderCartItem>> = HashMap::new();
    for row in &rows {
        by_order
            .entry(row.get("order_id"))
            .or_default()
            .push(order_item_from_row(row)?);
    }
    for order in orders.iter_mut() {
        order.cart_items = by_order.remove(&order.id).unwrap_or_default();
    }
    Ok(orders)
}

impl Store for PgStore {
    async fn list_menu(&self) -> Result<Vec<MenuItem>, StoreError> {
        let conn = self.read().await?;
        let sql = format!("{MENU_COLUMNS} ORDER BY m.id");
        let rows = conn.query(sql.as_str(), &[]).await?;
        Ok(rows.iter().map(menu_item_from_row).collect())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let conn = self.read().await?;
        let rows = conn
            .query("SELECT id, name FROM category ORDER BY id", &[])
            .await?;
        Ok(rows
            .iter()
            .map(|r| Category {
                id: r.get("id"),
                name: r.get("name"),
            })
            .collect())
    }

    async fn menu_items(&self, ids: &[MenuId]) -> Result<HashMap<MenuId, MenuItem>, StoreError> {
        let conn = self.read().await?;
        let sql = format!("{MENU_COLUMNS} WHERE m.id = ANY($1)");
        let rows = conn.query(sql.as_str(), &[&ids]).await?;
        Ok(rows
            .iter()
            .map(menu_item_from_row)
            .map(|item| (item.id, item))
            .collect())
    }

    async fn create_order(&self, order: NewOrder) -> Result<Order, StoreError> {
        let mut conn = self.write().await?;
        let txn = conn.transaction().await?;
        let contact = &order.contact;
        let params: &[&(dyn ToSql + Sync); 7] = &[
            &order.user_id,
            &contact.customer_name,
            &contact.email,
            &contact.street,
            &contact.city,
            &contact.phone,
            &order.created_at,
        ];
        let row = txn
            .query_one(
                r#"
                INSERT INTO "order"(user_id, customer_name, email, street, city, phone, paid, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, FALSE, $7)
                RETURNING id
                "#,
                params,
            )
            .await?;
        let id: OrderId = row.get("id");

        let stmt = txn
            .prepare(
                r#"
                INSERT INTO order_cart_item(order_id, menu_id, name, size, unit_price, quantity)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .await?;
        for item in &order.cart_items {
            let quantity = i32::try_from(item.quantity)
                .map_err(|_| StoreError::Db(format!("quantity {} out of range", item.quantity)))?;
            txn.execute(
                &stmt,
                &[
                    &id,
                    &item.menu_id,
                    &item.name,
                    &item.size.as_str(),
                    &item.unit_price,
                    &quantity,
                ],
            )
            .await?;
        }
        // dropping an uncommitted transaction rolls it back
        txn.commit().await?;
        info!("created order {} with {} items", id, order.cart_items.len());

        Ok(Order {
            id,
            user_id: order.user_id,
            contact: order.contact,
            paid: false,
            created_at: order.created_at,
            cart_items: order.cart_items,
        })
    }

    async fn mark_paid(&self, order_id: OrderId) -> Result<bool, StoreError> {
        let conn = self.write().await?;
        let affected = conn
            .execute(r#"UPDATE "order" SET paid = TRUE WHERE id = $1"#, &[&order_id])
            .await?;
        Ok(affected > 0)
    }

    async fn order_for_user(
        &self,
        user_id: UserId,
        order_id: OrderId,
    ) -> Result<Option<Order>, StoreError> {
        let conn = self.read().await?;
        let sql = format!("{ORDER_COLUMNS} WHERE id = $1 AND user_id = $2");
        let row = conn.query_opt(sql.as_str(), &[&order_id, &user_id]).await?;
        match row {
            Some(row) => Ok(attach_items(&*conn, vec![order_from_row(&row)])
                .await?
                .pop()),
            None => Ok(None),
        }
    }

    async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, StoreError> {
        let conn = self.read().await?;
        let sql = format!("{ORDER_COLUMNS} WHERE user_id = $1 ORDER BY created_at DESC, id DESC");
        let rows = conn.query(sql.as_str(), &[&user_id]).await?;
        attach_items(&*conn, rows.iter().map(order_from_row).collect()).await
    }

    async fn profile(&self, user_id: UserId) -> Result<Option<Profile>, StoreError> {
        let conn = self.read().await?;
        let row = conn
            .query_opt(
                r#"
                SELECT id, username, email, street, city, phone, role
                FROM "user"
                WHERE id = $1
                "#,
                &[&user_id],
            )
            .await?;
        Ok(row.as_ref().map(profile_from_row))
    }

    async fn update_contact(
        &self,
        user_id: UserId,
        contact: &ContactUpdate,
    ) -> Result<bool, StoreError> {
        let conn = self.write().await?;
        let affected = conn
            .execute(
                r#"UPDATE "user" SET street = $2, city = $3, phone = $4 WHERE id = $1"#,
                &[&user_id, &contact.street, &contact.city, &contact.phone],
            )
            .await?;
        Ok(affected > 0)
    }

    async fn create_user(&self, user: NewUser) -> Result<Profile, StoreError> {
        let conn = self.write().await?;
        let taken = conn
            .query_opt(
                r#"
                SELECT username = $1 AS same_name
                FROM "user"
                WHERE username = $1 OR email = $2
                ORDER BY same_name DESC
                LIMIT 1
                "#,
                &[&user.username, &user.email],
            )
            .await?;
        if let Some(row) = taken {
            let same_name: bool = row.get("same_name");
            return Err(StoreError::Conflict(
                if same_name {
                    "Username already exist"
                } else {
                    "Email already exist"
                }
                .to_string(),
            ));
        }

        let params: &[&(dyn ToSql + Sync); 6] = &[
            &user.username,
            &user.email,
            &user.password_hash,
            &user.street,
            &user.city,
            &user.phone,
        ];
        let row = conn
            .query_one(
                r#"
                INSERT INTO "user"(username, email, password, street, city, phone)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id, username, email, street, city, phone, role
                "#,
                params,
            )
            .await
            .map_err(|e| match e.code() {
                // lost a race with a concurrent registration
                Some(code) if *code == SqlState::UNIQUE_VIOLATION => {
                    warn!("user insert hit unique constraint, {}", e);
                    StoreError::Conflict("Username or email already exist".to_string())
                }
                _ => StoreError::from(e),
            })?;
        Ok(profile_from_row(&row))
    }
}
