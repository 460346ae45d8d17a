use crate::server::controller::caller::Caller;
use crate::server::controller::error::ApiError;
use crate::server::database::store::Store;
use crate::server::model::order::{GetOrderResponse, GetOrdersResponse, OrderView};
use crate::server::model::user::{ContactUpdate, GetProfileResponse, NewUser, RegisterRequest};
use crate::server::model::{MessageResponse, OrderId, UserId};
use crate::server::payment::PaymentGateway;
use crate::server::state::AppState;
use actix_web::{web, HttpResponse};
use argon2::password_hash::{PasswordHasher, SaltString};
use argon2::Argon2;
use log::{error, info};
use rand::rngs::OsRng;

/// Profile of the signed-in user
pub(crate) async fn get_profile<S: Store, P: PaymentGateway>(
    caller: Caller,
    id: web::Path<UserId>,
    data: web::Data<AppState<S, P>>,
) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    caller.ensure_is(id)?;
    let profile = data.store().profile(id).await?.ok_or(ApiError::NotFound)?;
    Ok(HttpResponse::Ok().json(GetProfileResponse { profile }))
}

/// Orders of the signed-in user, newest first
pub(crate) async fn get_orders<S: Store, P: PaymentGateway>(
    caller: Caller,
    id: web::Path<UserId>,
    data: web::Data<AppState<S, P>>,
) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    caller.ensure_is(id)?;
    let orders = data.store().orders_for_user(id).await?;
    Ok(HttpResponse::Ok().json(GetOrdersResponse {
        orders: orders.into_iter().map(OrderView::from).collect(),
    }))
}

/// One order; someone else's order is reported as missing
pub(crate) async fn get_order<S: Store, P: PaymentGateway>(
    caller: Caller,
    path: web::Path<(UserId, OrderId)>,
    data: web::Data<AppState<S, P>>,
) -> Result<HttpResponse, ApiError> {
    let (id, order_id) = path.into_inner();
    caller.ensure_is(id)?;
    let order = data
        .store()
        .order_for_user(id, order_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(HttpResponse::Ok().json(GetOrderResponse {
        order_item: OrderView::from(order),
    }))
}

pub(crate) async fn update_contact<S: Store, P: PaymentGateway>(
    caller: Caller,
    id: web::Path<UserId>,
    body: web::Json<ContactUpdate>,
    data: web::Data<AppState<S, P>>,
) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    caller.ensure_is(id)?;
    body.validate().map_err(ApiError::BadRequest)?;
    if !data.store().update_contact(id, &body.trimmed()).await? {
        return Err(ApiError::NotFound);
    }
    Ok(HttpResponse::Ok().json(MessageResponse::new("Contact updated")))
}

pub(crate) async fn register<S: Store, P: PaymentGateway>(
    body: web::Json<RegisterRequest>,
    data: web::Data<AppState<S, P>>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    body.validate().map_err(ApiError::BadRequest)?;
    if body.password != body.confirm_password {
        return Err(ApiError::Conflict("Confirm password does not match".to_string()));
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(body.password.as_bytes(), &salt)
        .map_err(|e| {
            error!("failed to hash password, {}", e);
            ApiError::DbError
        })?
        .to_string();

    let profile = data
        .store()
        .create_user(NewUser {
            username: body.username.trim().to_string(),
            email: body.email.trim().to_string(),
            password_hash,
            street: body.street.trim().to_string(),
            city: body.city.trim().to_string(),
            phone: body.phone.trim().to_string(),
        })
        .await?;
    info!("user {} registered", profile.id);
    Ok(HttpResponse::Created().json(MessageResponse::new("User created")))
}

#[cfg(test)]
mod tests {
    use crate::server::testing::{configure_api, as_user, cart_line, checkout_body, state};
    use crate::server::util::time::helper::set_mock_now;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use argon2::password_hash::{PasswordHash, PasswordVerifier};
    use argon2::Argon2;
    use serde_json::{json, Value};

    fn registration(username: &str, email: &str) -> Value {
        json!({
            "username": username,
            "email": email,
            "street": "Rua Nova 1",
            "city": "Porto",
            "phone": "912345678",
            "password": "secret",
            "confirmPassword": "secret",
        })
    }

    #[actix_web::test]
    async fn profile_is_private() {
        let data = state();
        let ana = data.store().add_user("ana", "ana@example.com");
        let app = test::init_service(App::new().configure(configure_api(data.clone()))).await;

        let req = as_user(test::TestRequest::get().uri(&format!("/api/user/{}", ana.id)), ana.id)
            .to_request();
        let res: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(res["profile"]["username"], "ana");
        assert_eq!(res["profile"]["role"], "user");

        let req = as_user(test::TestRequest::get().uri(&format!("/api/user/{}", ana.id)), 99)
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::get().uri(&format!("/api/user/{}", ana.id)).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        let req = as_user(test::TestRequest::get().uri("/api/user/99"), 99).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn order_totals_match_what_was_charged() {
        set_mock_now(1_700_000_000);
        let data = state();
        let app = test::init_service(App::new().configure(configure_api(data.clone()))).await;

        let cart = json!([cart_line(1, "10.50", "NORMAL", 2), cart_line(3, "4.75", "SMALL", 3)]);
        let req = as_user(test::TestRequest::post().uri("/api/checkout"), 1)
            .set_json(checkout_body(1, cart))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
        let order_id = data.store().orders()[0].id;
        let charged = data.payments().requests()[0].amount_total();

        let req = as_user(
            test::TestRequest::get().uri(&format!("/api/user/1/orders/{order_id}")),
            1,
        )
        .to_request();
        let res: Value = test::call_and_read_body_json(&app, req).await;
        let order = &res["orderItem"];
        assert_eq!(order["paid"], false);
        assert_eq!(order["cartItems"].as_array().unwrap().len(), 2);
        assert_eq!(order["formattedTotal"], "€37.25");
        let total: rust_decimal::Decimal = serde_json::from_value(order["total"].clone()).unwrap();
        assert_eq!(storefront::pricing::to_minor_units(total).unwrap(), charged);
    }

    #[actix_web::test]
    async fn orders_are_scoped_to_their_owner() {
        let data = state();
        for (user_id, at) in [(1, 10), (2, 20), (1, 30)] {
            set_mock_now(at);
            let app = test::init_service(App::new().configure(configure_api(data.clone()))).await;
            let req = as_user(test::TestRequest::post().uri("/api/checkout"), user_id)
                .set_json(checkout_body(user_id, json!([cart_line(2, "12", "NORMAL", 1)])))
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
        }
        let app = test::init_service(App::new().configure(configure_api(data.clone()))).await;

        let req = as_user(test::TestRequest::get().uri("/api/user/1/orders"), 1).to_request();
        let res: Value = test::call_and_read_body_json(&app, req).await;
        let ids = res["orders"]
            .as_array()
            .unwrap()
            .iter()
            .map(|o| o["id"].as_i64().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec![3, 1]);

        // order 2 belongs to user 2
        let req = as_user(test::TestRequest::get().uri("/api/user/1/orders/2"), 1).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = as_user(test::TestRequest::get().uri("/api/user/1/orders/2"), 2).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn contact_update_is_validated_and_stored() {
        let data = state();
        let ana = data.store().add_user("ana", "ana@example.com");
        let app = test::init_service(App::new().configure(configure_api(data.clone()))).await;
        let uri = format!("/api/user/{}/contact/update", ana.id);

        let req = as_user(test::TestRequest::put().uri(&uri), ana.id)
            .set_json(json!({"street": " Rua Velha 2 ", "city": "Lisboa", "phone": "911111111"}))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);

        let req = as_user(test::TestRequest::put().uri(&uri), ana.id)
            .set_json(json!({"street": "", "city": "Lisboa", "phone": "911111111"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = as_user(test::TestRequest::get().uri(&format!("/api/user/{}", ana.id)), ana.id)
            .to_request();
        let res: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(res["profile"]["street"], "Rua Velha 2");
        assert_eq!(res["profile"]["city"], "Lisboa");
    }

    #[actix_web::test]
    async fn register_hashes_password() {
        let data = state();
        let app = test::init_service(App::new().configure(configure_api(data.clone()))).await;

        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(registration("bruno", "bruno@example.com"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let res: Value = test::read_body_json(res).await;
        assert_eq!(res["message"], "User created");

        let hash = data.store().password_hash("bruno").unwrap();
        assert_ne!(hash, "secret");
        let parsed = PasswordHash::new(&hash).unwrap();
        assert!(Argon2::default().verify_password(b"secret", &parsed).is_ok());
    }

    #[actix_web::test]
    async fn register_rejects_conflicts() {
        let data = state();
        data.store().add_user("ana", "ana@example.com");
        let app = test::init_service(App::new().configure(configure_api(data.clone()))).await;

        let mut body = registration("bruno", "bruno@example.com");
        body["confirmPassword"] = json!("other");
        let req = test::TestRequest::post().uri("/api/auth/register").set_json(&body).to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CONFLICT);
        let res: Value = test::read_body_json(res).await;
        assert_eq!(res["message"], "Confirm password does not match");

        for (body, message) in [
            (registration("ana", "new@example.com"), "Username already exist"),
            (registration("carla", "ana@example.com"), "Email already exist"),
        ] {
            let req = test::TestRequest::post().uri("/api/auth/register").set_json(&body).to_request();
            let res = test::call_service(&app, req).await;
            assert_eq!(res.status(), StatusCode::CONFLICT);
            let res: Value = test::read_body_json(res).await;
            assert_eq!(res["message"], message);
        }

        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(registration("dora", "not-an-email"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }
}
