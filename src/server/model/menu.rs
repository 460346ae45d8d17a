use rust_decimal::Decimal;
use serde::Serialize;
use storefront::cart::MenuId;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MenuItem {
    pub id: MenuId,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct Category {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct GetMenuResponse {
    pub menu: Vec<MenuItem>,
}

#[derive(Debug, Serialize)]
pub(crate) struct GetCategoriesResponse {
    pub categories: Vec<Category>,
}
