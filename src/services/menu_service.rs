use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
    audit,
    dto::menu::{CreateMenuItemRequest, MenuList, MenuQuery, UpdateMenuItemRequest},
    entity::menu_items::{ActiveModel, Column, Entity as MenuItems, Model as MenuItemModel},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{AssignmentRole, MenuItem},
    response::{ApiResponse, Meta},
    services::access_service::authorize,
    state::AppState,
};

/// Look up a menu item by id, scoped to its restaurant. Availability is left to the caller.
pub async fn find_in_restaurant<C: ConnectionTrait>(
    conn: &C,
    restaurant_id: Uuid,
    menu_item_id: Uuid,
) -> Result<Option<MenuItemModel>, DbErr> {
    MenuItems::find()
        .filter(
            Condition::all()
                .add(Column::Id.eq(menu_item_id))
                .add(Column::RestaurantId.eq(restaurant_id)),
        )
        .one(conn)
        .await
}

pub async fn list_menu(
    state: &AppState,
    user: &AuthUser,
    restaurant_id: Uuid,
    query: MenuQuery,
) -> AppResult<ApiResponse<MenuList>> {
    let role = authorize(&state.orm, user, restaurant_id, AssignmentRole::MEMBERS).await?;

    let mut condition = Condition::all().add(Column::RestaurantId.eq(restaurant_id));
    let include_unavailable = query.include_unavailable.unwrap_or(false) && role.is_management();
    if !include_unavailable {
        condition = condition.add(Column::IsAvailable.eq(true));
    }
    if let Some(category) = query.category.as_ref().map(|c| c.trim()).filter(|c| !c.is_empty()) {
        let pattern = format!("%{}%", escape_like(&category.to_lowercase()));
        condition =
            condition.add(Expr::expr(Func::lower(Expr::col(Column::Category))).like(pattern));
    }

    let items: Vec<MenuItem> = MenuItems::find()
        .filter(condition)
        .order_by_asc(Column::Category)
        .order_by_asc(Column::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(MenuItem::from)
        .collect();

    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Menu",
        MenuList { items },
        Some(Meta::new(1, total, total)),
    ))
}

pub async fn get_menu_item(
    state: &AppState,
    user: &AuthUser,
    restaurant_id: Uuid,
    id: Uuid,
) -> AppResult<ApiResponse<MenuItem>> {
    authorize(&state.orm, user, restaurant_id, AssignmentRole::MEMBERS).await?;
    let item = find_in_restaurant(&state.orm, restaurant_id, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::item("Menu item", MenuItem::from(item)))
}

pub async fn create_menu_item(
    state: &AppState,
    user: &AuthUser,
    restaurant_id: Uuid,
    payload: CreateMenuItemRequest,
) -> AppResult<ApiResponse<MenuItem>> {
    authorize(&state.orm, user, restaurant_id, AssignmentRole::MANAGEMENT).await?;

    let name = required_text("name", &payload.name)?;
    let category = required_text("category", &payload.category)?;
    validate_price(payload.price)?;
    let allergens = allergens_or_default(payload.allergens)?;
    let modifiers = modifiers_or_default(payload.modifiers)?;

    let item = ActiveModel {
        id: Set(Uuid::new_v4()),
        restaurant_id: Set(restaurant_id),
        name: Set(name),
        description: Set(payload.description),
        price: Set(payload.price),
        category: Set(category),
        image_url: Set(payload.image_url),
        is_available: Set(true),
        allergens: Set(allergens),
        modifiers: Set(modifiers),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        user.user_id,
        "menu_item_create",
        "menu_items",
        json!({ "menu_item_id": item.id, "restaurant_id": restaurant_id }),
    )
    .await;

    Ok(ApiResponse::item("Menu item created", MenuItem::from(item)))
}

pub async fn update_menu_item(
    state: &AppState,
    user: &AuthUser,
    restaurant_id: Uuid,
    id: Uuid,
    payload: UpdateMenuItemRequest,
) -> AppResult<ApiResponse<MenuItem>> {
    if payload.is_empty() {
        return Err(AppError::BadRequest("At least one field required".into()));
    }
    authorize(&state.orm, user, restaurant_id, AssignmentRole::MANAGEMENT).await?;

    let existing = find_in_restaurant(&state.orm, restaurant_id, id)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(required_text("name", &name)?);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    // A present price of 0 is a real price, not a missing field.
    if let Some(price) = payload.price {
        validate_price(price)?;
        active.price = Set(price);
    }
    if let Some(category) = payload.category {
        active.category = Set(required_text("category", &category)?);
    }
    if let Some(image_url) = payload.image_url {
        active.image_url = Set(Some(image_url));
    }
    if let Some(is_available) = payload.is_available {
        active.is_available = Set(is_available);
    }
    if let Some(allergens) = payload.allergens {
        active.allergens = Set(allergens_or_default(Some(allergens))?);
    }
    if let Some(modifiers) = payload.modifiers {
        active.modifiers = Set(modifiers_or_default(Some(modifiers))?);
    }
    active.updated_at = Set(Utc::now().into());

    let item = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "menu_item_update",
        "menu_items",
        json!({ "menu_item_id": item.id, "restaurant_id": restaurant_id }),
    )
    .await;

    Ok(ApiResponse::item("Updated", MenuItem::from(item)))
}

pub async fn delete_menu_item(
    state: &AppState,
    user: &AuthUser,
    restaurant_id: Uuid,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    authorize(&state.orm, user, restaurant_id, AssignmentRole::OWNERS).await?;

    let result = MenuItems::delete_many()
        .filter(
            Condition::all()
                .add(Column::Id.eq(id))
                .add(Column::RestaurantId.eq(restaurant_id)),
        )
        .exec(&state.orm)
        .await
        .map_err(|err| {
            AppError::conflict_on_reference(
                err,
                "Menu item is referenced by existing orders; mark it unavailable instead",
            )
        })?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        user.user_id,
        "menu_item_delete",
        "menu_items",
        json!({ "menu_item_id": id, "restaurant_id": restaurant_id }),
    )
    .await;

    Ok(ApiResponse::item("Menu item deleted successfully", json!({})))
}

fn required_text(field: &str, value: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::BadRequest(format!("{field} is required")));
    }
    Ok(value.to_string())
}

fn validate_price(price: i64) -> AppResult<()> {
    if price < 0 {
        return Err(AppError::BadRequest("Price must be non-negative".into()));
    }
    Ok(())
}

fn allergens_or_default(value: Option<Value>) -> AppResult<Value> {
    match value {
        None => Ok(json!([])),
        Some(v @ Value::Array(_)) => Ok(v),
        Some(_) => Err(AppError::BadRequest("allergens must be an array".into())),
    }
}

fn modifiers_or_default(value: Option<Value>) -> AppResult<Value> {
    match value {
        None => Ok(json!({})),
        Some(v @ Value::Object(_)) => Ok(v),
        Some(_) => Err(AppError::BadRequest("modifiers must be an object".into())),
    }
}

/// Make `%`, `_` and `\` match literally inside a LIKE pattern.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_price_is_valid_negative_is_not() {
        assert!(validate_price(0).is_ok());
        assert!(matches!(validate_price(-1), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn json_fields_default_and_validate_shape() {
        assert_eq!(allergens_or_default(None).unwrap(), json!([]));
        assert_eq!(modifiers_or_default(None).unwrap(), json!({}));
        assert!(allergens_or_default(Some(json!({"nuts": true}))).is_err());
        assert!(modifiers_or_default(Some(json!(["extra cheese"]))).is_err());
        assert_eq!(
            allergens_or_default(Some(json!(["gluten"]))).unwrap(),
            json!(["gluten"])
        );
    }

    #[test]
    fn blank_text_is_missing() {
        assert!(required_text("name", "   ").is_err());
        assert_eq!(required_text("name", " Soup ").unwrap(), "Soup");
    }

    #[test]
    fn like_wildcards_in_category_are_literal() {
        assert_eq!(escape_like("100% vegan"), "100\\% vegan");
        assert_eq!(escape_like("chef_special"), "chef\\_special");
        assert_eq!(escape_like(r"a\b"), r"a\\b");
        assert_eq!(escape_like("mains"), "mains");
    }
}
