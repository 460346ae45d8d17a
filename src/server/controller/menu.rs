use crate::server::controller::error::ApiError;
use crate::server::database::store::Store;
use crate::server::model::menu::{GetCategoriesResponse, GetMenuResponse};
use crate::server::payment::PaymentGateway;
use crate::server::state::AppState;
use actix_web::{web, HttpResponse};

pub(crate) async fn get_menu<S: Store, P: PaymentGateway>(
    data: web::Data<AppState<S, P>>,
) -> Result<HttpResponse, ApiError> {
    let menu = data.store().list_menu().await?;
    Ok(HttpResponse::Ok().json(GetMenuResponse { menu }))
}

pub(crate) async fn get_categories<S: Store, P: PaymentGateway>(
    data: web::Data<AppState<S, P>>,
) -> Result<HttpResponse, ApiError> {
    let categories = data.store().list_categories().await?;
    Ok(HttpResponse::Ok().json(GetCategoriesResponse { categories }))
}
