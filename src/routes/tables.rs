use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::tables::{
        CreateTableRequest, RestaurantTables, TableDetail, TableList, TableListQuery,
        UpdateTableRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Table,
    response::ApiResponse,
    services::table_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tables).post(create_table))
        .route("/restaurant/{restaurant_id}", get(list_by_restaurant))
        .route(
            "/{id}",
            get(get_table).put(update_table).delete(delete_table),
        )
}

#[utoipa::path(
    get,
    path = "/api/tables",
    params(TableListQuery),
    responses(
        (status = 200, description = "Tables in the caller's restaurants", body = ApiResponse<TableList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Tables"
)]
pub async fn list_tables(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<TableListQuery>,
) -> AppResult<Json<ApiResponse<TableList>>> {
    let resp = table_service::list_tables(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/tables/restaurant/{restaurant_id}",
    params(("restaurant_id" = Uuid, Path, description = "Restaurant ID")),
    responses(
        (status = 200, description = "Tables of one restaurant", body = ApiResponse<RestaurantTables>),
        (status = 403, description = "Access to this restaurant denied")
    ),
    security(("bearer_auth" = [])),
    tag = "Tables"
)]
pub async fn list_by_restaurant(
    State(state): State<AppState>,
    user: AuthUser,
    Path(restaurant_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<RestaurantTables>>> {
    let resp = table_service::list_by_restaurant(&state, &user, restaurant_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/tables/{id}",
    params(("id" = Uuid, Path, description = "Table ID")),
    responses(
        (status = 200, description = "Table with restaurant name", body = ApiResponse<TableDetail>),
        (status = 404, description = "Table not found or access denied")
    ),
    security(("bearer_auth" = [])),
    tag = "Tables"
)]
pub async fn get_table(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<TableDetail>>> {
    let resp = table_service::get_table(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/tables",
    request_body = CreateTableRequest,
    responses(
        (status = 201, description = "Table created", body = ApiResponse<Table>),
        (status = 403, description = "Owner or manager only"),
        (status = 409, description = "Table number already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "Tables"
)]
pub async fn create_table(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateTableRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Table>>)> {
    let resp = table_service::create_table(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/tables/{id}",
    params(("id" = Uuid, Path, description = "Table ID")),
    request_body = UpdateTableRequest,
    responses(
        (status = 200, description = "Updated table", body = ApiResponse<Table>),
        (status = 403, description = "Staff may change status only"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Tables"
)]
pub async fn update_table(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTableRequest>,
) -> AppResult<Json<ApiResponse<Table>>> {
    let resp = table_service::update_table(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/tables/{id}",
    params(("id" = Uuid, Path, description = "Table ID")),
    responses(
        (status = 200, description = "Deleted table"),
        (status = 403, description = "Owner or manager only"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Tables"
)]
pub async fn delete_table(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = table_service::delete_table(&state, &user, id).await?;
    Ok(Json(resp))
}
