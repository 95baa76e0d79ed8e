use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    audit,
    dto::orders::{
        OrderDetail, OrderList, OrderWithItems, PlaceOrderRequest, TableOrders, TableOrdersQuery,
        UpdateOrderRequest,
    },
    entity::{
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        restaurant_tables::Entity as Tables,
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{AssignmentRole, Order, OrderItem},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::{
        access_service::authorize,
        order_placement::{self, PlaceOrder},
        table_service,
    },
    state::AppState,
};

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    restaurant_id: Uuid,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    authorize(&state.orm, user, restaurant_id, AssignmentRole::MEMBERS).await?;

    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all().add(OrderCol::RestaurantId.eq(restaurant_id));
    if let Some(status) = query.status {
        condition = condition.add(OrderCol::Status.eq(status.as_str()));
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);

    let mut finder = Orders::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Order::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Ok",
        OrderList { items: orders },
        Some(meta),
    ))
}

/// Authorize the caller, then run the placement transaction.
pub async fn place_order(
    state: &AppState,
    user: &AuthUser,
    restaurant_id: Uuid,
    payload: PlaceOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    authorize(
        &state.orm,
        user,
        restaurant_id,
        AssignmentRole::ORDER_PLACERS,
    )
    .await?;

    let placed = order_placement::place_order(
        &state.orm,
        PlaceOrder {
            restaurant_id,
            user_id: user.user_id,
            table_id: payload.table_id,
            notes: payload.notes,
            items: payload.items,
        },
    )
    .await?;

    audit::record(
        &state.pool,
        user.user_id,
        "order_placed",
        "orders",
        json!({
            "order_id": placed.order.id,
            "restaurant_id": restaurant_id,
            "total": placed.order.total,
        }),
    )
    .await;

    Ok(ApiResponse::item(
        "Order placed",
        OrderWithItems {
            order: Order::try_from(placed.order)?,
            items: placed.items.into_iter().map(OrderItem::from).collect(),
        },
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    restaurant_id: Uuid,
    id: Uuid,
) -> AppResult<ApiResponse<OrderDetail>> {
    authorize(&state.orm, user, restaurant_id, AssignmentRole::MEMBERS).await?;

    let order = find_order(state, restaurant_id, id).await?;

    let items: Vec<OrderItem> = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .order_by_asc(OrderItemCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(OrderItem::from)
        .collect();
    let subtotal: i64 = items.iter().map(OrderItem::line_total).sum();

    let placed_by_email = match order.placed_by_user_id {
        Some(user_id) => Users::find_by_id(user_id)
            .one(&state.orm)
            .await?
            .map(|u| u.email),
        None => None,
    };
    let table_number = match order.table_id {
        Some(table_id) => Tables::find_by_id(table_id)
            .one(&state.orm)
            .await?
            .map(|t| t.number),
        None => None,
    };

    Ok(ApiResponse::item(
        "OK",
        OrderDetail {
            order: Order::try_from(order)?,
            items,
            subtotal,
            placed_by_email,
            table_number,
        },
    ))
}

pub async fn list_table_orders(
    state: &AppState,
    user: &AuthUser,
    restaurant_id: Uuid,
    table_id: Uuid,
    query: TableOrdersQuery,
) -> AppResult<ApiResponse<TableOrders>> {
    authorize(&state.orm, user, restaurant_id, AssignmentRole::MEMBERS).await?;

    if !table_service::belongs_to_restaurant(&state.orm, table_id, restaurant_id).await? {
        return Err(AppError::NotFound);
    }

    let mut condition = Condition::all()
        .add(OrderCol::RestaurantId.eq(restaurant_id))
        .add(OrderCol::TableId.eq(table_id));
    if let Some(status) = query.status {
        condition = condition.add(OrderCol::Status.eq(status.as_str()));
    }

    let orders = Orders::find()
        .filter(condition)
        .order_by_desc(OrderCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Order::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ApiResponse::item(
        "Ok",
        TableOrders {
            restaurant_id,
            table_id,
            orders,
        },
    ))
}

/// Staff update: only the fields present in the request change.
pub async fn update_order(
    state: &AppState,
    user: &AuthUser,
    restaurant_id: Uuid,
    id: Uuid,
    payload: UpdateOrderRequest,
) -> AppResult<ApiResponse<Order>> {
    if payload.is_empty() {
        return Err(AppError::BadRequest("At least one field required".into()));
    }
    authorize(&state.orm, user, restaurant_id, AssignmentRole::STAFF).await?;

    let order = find_order(state, restaurant_id, id).await?;

    let mut active: OrderActive = order.into();
    if let Some(status) = payload.status {
        active.status = Set(status.as_str().to_string());
    }
    if let Some(notes) = payload.notes {
        active.notes = Set(Some(notes));
    }
    if let Some(estimated_ready) = payload.estimated_ready {
        active.estimated_ready = Set(Some(estimated_ready.into()));
    }
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "order_update",
        "orders",
        json!({ "order_id": order.id, "status": order.status }),
    )
    .await;

    Ok(ApiResponse::item("Updated", Order::try_from(order)?))
}

pub async fn delete_order(
    state: &AppState,
    user: &AuthUser,
    restaurant_id: Uuid,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    authorize(&state.orm, user, restaurant_id, AssignmentRole::MANAGEMENT).await?;

    let result = Orders::delete_many()
        .filter(
            Condition::all()
                .add(OrderCol::Id.eq(id))
                .add(OrderCol::RestaurantId.eq(restaurant_id)),
        )
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        user.user_id,
        "order_delete",
        "orders",
        json!({ "order_id": id, "restaurant_id": restaurant_id }),
    )
    .await;

    Ok(ApiResponse::item("Order deleted successfully", json!({})))
}

async fn find_order(state: &AppState, restaurant_id: Uuid, id: Uuid) -> AppResult<OrderModel> {
    Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::Id.eq(id))
                .add(OrderCol::RestaurantId.eq(restaurant_id)),
        )
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}
