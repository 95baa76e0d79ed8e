use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    audit,
    dto::tables::{
        CreateTableRequest, RestaurantTables, TableDetail, TableList, TableListQuery,
        UpdateTableRequest,
    },
    entity::{
        restaurant_tables::{ActiveModel, Column, Entity as Tables},
        restaurants::Entity as Restaurants,
        user_restaurants::{Column as AssignCol, Entity as Assignments},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{AssignmentRole, Table, TableStatus},
    response::{ApiResponse, Meta},
    services::access_service::{authorize, role_on},
    state::AppState,
};

const DUPLICATE_NUMBER: &str = "Table number already exists in this restaurant";

/// True when `table_id` exists and belongs to `restaurant_id`.
pub async fn belongs_to_restaurant<C: ConnectionTrait>(
    conn: &C,
    table_id: Uuid,
    restaurant_id: Uuid,
) -> Result<bool, DbErr> {
    let count = Tables::find()
        .filter(
            Condition::all()
                .add(Column::Id.eq(table_id))
                .add(Column::RestaurantId.eq(restaurant_id)),
        )
        .count(conn)
        .await?;
    Ok(count > 0)
}

pub async fn list_tables(
    state: &AppState,
    user: &AuthUser,
    query: TableListQuery,
) -> AppResult<ApiResponse<TableList>> {
    let restaurant_ids: Vec<Uuid> = Assignments::find()
        .select_only()
        .column(AssignCol::RestaurantId)
        .filter(
            Condition::all()
                .add(AssignCol::UserId.eq(user.user_id))
                .add(AssignCol::IsActive.eq(true)),
        )
        .into_tuple()
        .all(&state.orm)
        .await?;

    let mut condition = Condition::all().add(Column::RestaurantId.is_in(restaurant_ids));
    if let Some(restaurant_id) = query.restaurant_id {
        condition = condition.add(Column::RestaurantId.eq(restaurant_id));
    }

    let items = Tables::find()
        .filter(condition)
        .order_by_asc(Column::Number)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Table::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Tables",
        TableList { items },
        Some(Meta::new(1, total, total)),
    ))
}

pub async fn list_by_restaurant(
    state: &AppState,
    user: &AuthUser,
    restaurant_id: Uuid,
) -> AppResult<ApiResponse<RestaurantTables>> {
    authorize(&state.orm, user, restaurant_id, AssignmentRole::MEMBERS).await?;

    let tables = Tables::find()
        .filter(Column::RestaurantId.eq(restaurant_id))
        .order_by_asc(Column::Number)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Table::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ApiResponse::item(
        "Tables",
        RestaurantTables {
            restaurant_id,
            tables,
        },
    ))
}

pub async fn get_table(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<TableDetail>> {
    let (table, restaurant) = Tables::find_by_id(id)
        .find_also_related(Restaurants)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    // Non-members get the same answer as for a missing table.
    if role_on(&state.orm, user.user_id, table.restaurant_id)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound);
    }

    let restaurant_name = restaurant.map(|r| r.name).unwrap_or_default();
    Ok(ApiResponse::item(
        "Table",
        TableDetail {
            table: Table::try_from(table)?,
            restaurant_name,
        },
    ))
}

pub async fn create_table(
    state: &AppState,
    user: &AuthUser,
    payload: CreateTableRequest,
) -> AppResult<ApiResponse<Table>> {
    authorize(
        &state.orm,
        user,
        payload.restaurant_id,
        AssignmentRole::MANAGEMENT,
    )
    .await?;
    validate_positive("number", payload.number)?;
    validate_positive("capacity", payload.capacity)?;

    let table = ActiveModel {
        id: Set(Uuid::new_v4()),
        restaurant_id: Set(payload.restaurant_id),
        number: Set(payload.number),
        status: Set(TableStatus::Available.as_str().to_string()),
        capacity: Set(payload.capacity),
        location: Set(payload.location),
        notes: Set(payload.notes),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await
    .map_err(|err| AppError::conflict_on_unique(err, DUPLICATE_NUMBER))?;

    audit::record(
        &state.pool,
        user.user_id,
        "table_create",
        "restaurant_tables",
        json!({ "table_id": table.id, "restaurant_id": table.restaurant_id }),
    )
    .await;

    Ok(ApiResponse::item("Table created", Table::try_from(table)?))
}

pub async fn update_table(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateTableRequest,
) -> AppResult<ApiResponse<Table>> {
    if payload.is_empty() {
        return Err(AppError::BadRequest("At least one field required".into()));
    }

    let existing = Tables::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    // Floor staff may flip the status; everything else is for management.
    let role = authorize(
        &state.orm,
        user,
        existing.restaurant_id,
        AssignmentRole::STAFF,
    )
    .await?;
    if !role.is_management() && !payload.is_status_only() {
        return Err(AppError::Forbidden);
    }

    let mut active: ActiveModel = existing.into();
    if let Some(number) = payload.number {
        validate_positive("number", number)?;
        active.number = Set(number);
    }
    if let Some(status) = payload.status {
        active.status = Set(status.as_str().to_string());
    }
    if let Some(capacity) = payload.capacity {
        validate_positive("capacity", capacity)?;
        active.capacity = Set(capacity);
    }
    if let Some(location) = payload.location {
        active.location = Set(Some(location));
    }
    if let Some(notes) = payload.notes {
        active.notes = Set(Some(notes));
    }
    active.updated_at = Set(Utc::now().into());

    let table = active
        .update(&state.orm)
        .await
        .map_err(|err| AppError::conflict_on_unique(err, DUPLICATE_NUMBER))?;

    audit::record(
        &state.pool,
        user.user_id,
        "table_update",
        "restaurant_tables",
        json!({ "table_id": table.id, "status": table.status }),
    )
    .await;

    Ok(ApiResponse::item("Updated", Table::try_from(table)?))
}

pub async fn delete_table(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let existing = Tables::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    authorize(
        &state.orm,
        user,
        existing.restaurant_id,
        AssignmentRole::MANAGEMENT,
    )
    .await?;

    let result = Tables::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        user.user_id,
        "table_delete",
        "restaurant_tables",
        json!({ "table_id": id, "restaurant_id": existing.restaurant_id }),
    )
    .await;

    Ok(ApiResponse::item("Table deleted successfully", json!({})))
}

fn validate_positive(field: &str, value: i32) -> AppResult<()> {
    if value <= 0 {
        return Err(AppError::BadRequest(format!("{field} must be positive")));
    }
    Ok(())
}
