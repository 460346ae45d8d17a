use crate::server::controller::error::ApiError;
use crate::server::controller::{checkout, menu, user, webhook};
use crate::server::database::store::Store;
use crate::server::payment::PaymentGateway;
use actix_web::web;
use log::warn;

/// Register every `/api` route for a given store and payment provider
pub(crate) fn configure<S: Store, P: PaymentGateway>(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        warn!("rejected request body, {}", err);
        ApiError::BadRequest(err.to_string()).into()
    }))
    .service(
        web::scope("/api")
            .route("/menu", web::get().to(menu::get_menu::<S, P>))
            .route("/category", web::get().to(menu::get_categories::<S, P>))
            .route("/checkout", web::post().to(checkout::create_order::<S, P>))
            .route("/webhook", web::post().to(webhook::handle_webhook::<S, P>))
            .route("/auth/register", web::post().to(user::register::<S, P>))
            .route("/user/{id}", web::get().to(user::get_profile::<S, P>))
            .route("/user/{id}/orders", web::get().to(user::get_orders::<S, P>))
            .route(
                "/user/{id}/orders/{order_id}",
                web::get().to(user::get_order::<S, P>),
            )
            .route(
                "/user/{id}/contact/update",
                web::put().to(user::update_contact::<S, P>),
            ),
    );
}
