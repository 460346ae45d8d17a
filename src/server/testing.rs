//! Wiring shared by handler tests

use crate::server::controller::caller::USER_ID_HEADER;
use crate::server::database::memory::MemoryStore;
use crate::server::model::config::PaymentConfig;
use crate::server::model::menu::{Category, MenuItem};
use crate::server::payment::fake::{FakeGateway, FAKE_WEBHOOK_SECRET};
use crate::server::routes;
use crate::server::state::AppState;
use actix_web::test::TestRequest;
use actix_web::web;
use rust_decimal::Decimal;
use serde_json::{json, Value};

pub(crate) type TestState = AppState<MemoryStore, FakeGateway>;

pub(crate) fn menu() -> Vec<MenuItem> {
    vec![
        MenuItem {
            id: 1,
            name: "Margherita".to_string(),
            description: Some("tomato, mozzarella".to_string()),
            price: Decimal::new(1050, 2),
            category: Some("Pizza".to_string()),
        },
        MenuItem {
            id: 2,
            name: "Lasagne".to_string(),
            description: None,
            price: Decimal::from(12),
            category: Some("Pasta".to_string()),
        },
        MenuItem {
            id: 3,
            name: "Tiramisu".to_string(),
            description: None,
            price: Decimal::new(475, 2),
            category: Some("Dessert".to_string()),
        },
    ]
}

pub(crate) fn categories() -> Vec<Category> {
    ["Pizza", "Pasta", "Dessert"]
        .iter()
        .enumerate()
        .map(|(i, name)| Category {
            id: i as i64 + 1,
            name: name.to_string(),
        })
        .collect()
}

pub(crate) fn payment_config() -> PaymentConfig {
    PaymentConfig {
        secret_key: "sk_test".to_string(),
        webhook_secret: FAKE_WEBHOOK_SECRET.to_string(),
        api_base: "http://localhost:12111".to_string(),
        public_url: "http://shop.test".to_string(),
    }
}

pub(crate) fn state() -> web::Data<TestState> {
    web::Data::new(AppState::new(
        MemoryStore::new(menu(), categories()),
        FakeGateway::default(),
        payment_config(),
    ))
}

/// Register the api with `data` on an `App`, for `App::new().configure(configure_api(data))`
pub(crate) fn configure_api(data: web::Data<TestState>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(data);
        routes::configure::<MemoryStore, FakeGateway>(cfg);
    }
}

pub(crate) fn as_user(req: TestRequest, user_id: i64) -> TestRequest {
    req.insert_header((USER_ID_HEADER, user_id.to_string()))
}

/// A valid checkout body for `user_id`; `cart` is the raw cart array
pub(crate) fn checkout_body(user_id: i64, cart: Value) -> Value {
    json!({
        "cart": cart,
        "userId": user_id,
        "customerName": "Ana",
        "email": "ana@example.com",
        "street": "Rua Nova 1",
        "city": "Porto",
        "phone": "912345678",
    })
}

pub(crate) fn cart_line(menu_id: i64, price: &str, size: &str, quantity: u32) -> Value {
    json!({
        "menu": { "id": menu_id, "name": format!("item {menu_id}"), "price": price },
        "size": size,
        "quantity": quantity,
    })
}
