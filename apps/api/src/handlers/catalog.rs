use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use chrono::Utc;

use smartsales_application::{ProductOrdering, ProductQuery};
use smartsales_core::ActorContext;

use crate::dto::{
    BrandResponse, CategoryResponse, NamedResourceRequest, ProductDiscountRequest,
    ProductRequest, ProductResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

use super::parse_optional;

mod brands;
mod categories;
mod products;

pub use brands::{
    create_brand_handler, delete_brand_handler, get_brand_handler, list_brands_handler,
    update_brand_handler,
};
pub use categories::{
    create_category_handler, delete_category_handler, get_category_handler,
    list_categories_handler, update_category_handler,
};
pub use products::{
    create_product_handler, delete_product_handler, get_product_handler, list_products_handler,
    set_product_discount_handler, update_product_handler,
};
