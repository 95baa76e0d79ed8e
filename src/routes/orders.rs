use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::orders::{
        OrderDetail, OrderList, OrderWithItems, PlaceOrderRequest, TableOrders, TableOrdersQuery,
        UpdateOrderRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Order,
    response::ApiResponse,
    routes::params::OrderListQuery,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{restaurant_id}", get(list_orders).post(place_order))
        .route(
            "/{restaurant_id}/tables/{table_id}",
            get(list_table_orders),
        )
        .route(
            "/{restaurant_id}/{id}",
            get(get_order).put(update_order).delete(delete_order),
        )
}

#[utoipa::path(
    get,
    path = "/api/orders/{restaurant_id}",
    params(
        ("restaurant_id" = Uuid, Path, description = "Restaurant ID"),
        OrderListQuery
    ),
    responses(
        (status = 200, description = "Orders of a restaurant", body = ApiResponse<OrderList>),
        (status = 403, description = "Access to this restaurant denied")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Path(restaurant_id): Path<Uuid>,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::list_orders(&state, &user, restaurant_id, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/orders/{restaurant_id}",
    params(("restaurant_id" = Uuid, Path, description = "Restaurant ID")),
    request_body = PlaceOrderRequest,
    responses(
        (status = 201, description = "Order placed with its items", body = ApiResponse<OrderWithItems>),
        (status = 400, description = "Empty order, invalid line item or foreign table"),
        (status = 403, description = "Role may not place orders here"),
        (status = 500, description = "Transaction failed, nothing stored")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn place_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(restaurant_id): Path<Uuid>,
    Json(payload): Json<PlaceOrderRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<OrderWithItems>>)> {
    let resp = order_service::place_order(&state, &user, restaurant_id, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/orders/{restaurant_id}/{id}",
    params(
        ("restaurant_id" = Uuid, Path, description = "Restaurant ID"),
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order with items and subtotal", body = ApiResponse<OrderDetail>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path((restaurant_id, id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    let resp = order_service::get_order(&state, &user, restaurant_id, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/{restaurant_id}/tables/{table_id}",
    params(
        ("restaurant_id" = Uuid, Path, description = "Restaurant ID"),
        ("table_id" = Uuid, Path, description = "Table ID"),
        TableOrdersQuery
    ),
    responses(
        (status = 200, description = "Orders for one table", body = ApiResponse<TableOrders>),
        (status = 404, description = "Table not in this restaurant")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_table_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Path((restaurant_id, table_id)): Path<(Uuid, Uuid)>,
    Query(query): Query<TableOrdersQuery>,
) -> AppResult<Json<ApiResponse<TableOrders>>> {
    let resp =
        order_service::list_table_orders(&state, &user, restaurant_id, table_id, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/orders/{restaurant_id}/{id}",
    params(
        ("restaurant_id" = Uuid, Path, description = "Restaurant ID"),
        ("id" = Uuid, Path, description = "Order ID")
    ),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Updated order", body = ApiResponse<Order>),
        (status = 400, description = "No fields given"),
        (status = 403, description = "Staff only"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn update_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path((restaurant_id, id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateOrderRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = order_service::update_order(&state, &user, restaurant_id, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/orders/{restaurant_id}/{id}",
    params(
        ("restaurant_id" = Uuid, Path, description = "Restaurant ID"),
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Deleted order"),
        (status = 403, description = "Owner or manager only"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn delete_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path((restaurant_id, id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = order_service::delete_order(&state, &user, restaurant_id, id).await?;
    Ok(Json(resp))
}
