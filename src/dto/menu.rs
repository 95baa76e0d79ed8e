use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::models::MenuItem;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateMenuItemRequest {
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub category: String,
    pub image_url: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub allergens: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub modifiers: Option<Value>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateMenuItemRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub is_available: Option<bool>,
    #[schema(value_type = Option<Object>)]
    pub allergens: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub modifiers: Option<Value>,
}

impl UpdateMenuItemRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.category.is_none()
            && self.image_url.is_none()
            && self.is_available.is_none()
            && self.allergens.is_none()
            && self.modifiers.is_none()
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MenuQuery {
    /// Case-insensitive substring match on the category.
    pub category: Option<String>,
    /// Only honoured for owners and managers.
    pub include_unavailable: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MenuList {
    pub items: Vec<MenuItem>,
}
