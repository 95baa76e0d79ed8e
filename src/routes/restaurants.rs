use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
};
use uuid::Uuid;

use crate::{
    dto::restaurants::{
        AssignStaffRequest, CreateRestaurantRequest, RestaurantList, RestaurantWithRole,
        StaffList, UpdateRestaurantRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Restaurant, StaffMember},
    response::ApiResponse,
    services::restaurant_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_restaurants).post(create_restaurant))
        .route(
            "/{id}",
            get(get_restaurant)
                .put(update_restaurant)
                .delete(delete_restaurant),
        )
        .route("/{id}/staff", get(list_staff).post(assign_staff))
        .route("/{id}/staff/{user_id}", delete(remove_staff))
}

#[utoipa::path(
    get,
    path = "/api/restaurants",
    responses(
        (status = 200, description = "Restaurants the caller belongs to", body = ApiResponse<RestaurantList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Restaurants"
)]
pub async fn list_restaurants(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<RestaurantList>>> {
    let resp = restaurant_service::list_restaurants(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/restaurants/{id}",
    params(("id" = Uuid, Path, description = "Restaurant ID")),
    responses(
        (status = 200, description = "Restaurant with the caller's role", body = ApiResponse<RestaurantWithRole>),
        (status = 404, description = "Restaurant not found or access denied")
    ),
    security(("bearer_auth" = [])),
    tag = "Restaurants"
)]
pub async fn get_restaurant(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<RestaurantWithRole>>> {
    let resp = restaurant_service::get_restaurant(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/restaurants",
    request_body = CreateRestaurantRequest,
    responses(
        (status = 201, description = "Restaurant created, caller assigned as owner", body = ApiResponse<RestaurantWithRole>),
        (status = 400, description = "Name required")
    ),
    security(("bearer_auth" = [])),
    tag = "Restaurants"
)]
pub async fn create_restaurant(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateRestaurantRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<RestaurantWithRole>>)> {
    let resp = restaurant_service::create_restaurant(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/restaurants/{id}",
    params(("id" = Uuid, Path, description = "Restaurant ID")),
    request_body = UpdateRestaurantRequest,
    responses(
        (status = 200, description = "Updated restaurant", body = ApiResponse<Restaurant>),
        (status = 400, description = "No fields given"),
        (status = 403, description = "Owner or manager only")
    ),
    security(("bearer_auth" = [])),
    tag = "Restaurants"
)]
pub async fn update_restaurant(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRestaurantRequest>,
) -> AppResult<Json<ApiResponse<Restaurant>>> {
    let resp = restaurant_service::update_restaurant(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/restaurants/{id}",
    params(("id" = Uuid, Path, description = "Restaurant ID")),
    responses(
        (status = 200, description = "Deleted restaurant"),
        (status = 403, description = "Owner only")
    ),
    security(("bearer_auth" = [])),
    tag = "Restaurants"
)]
pub async fn delete_restaurant(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = restaurant_service::delete_restaurant(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/restaurants/{id}/staff",
    params(("id" = Uuid, Path, description = "Restaurant ID")),
    responses(
        (status = 200, description = "Assignments on the restaurant", body = ApiResponse<StaffList>),
        (status = 403, description = "Owner or manager only")
    ),
    security(("bearer_auth" = [])),
    tag = "Restaurants"
)]
pub async fn list_staff(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<StaffList>>> {
    let resp = restaurant_service::list_staff(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/restaurants/{id}/staff",
    params(("id" = Uuid, Path, description = "Restaurant ID")),
    request_body = AssignStaffRequest,
    responses(
        (status = 200, description = "Assignment created or changed", body = ApiResponse<StaffMember>),
        (status = 403, description = "Not allowed to grant this role"),
        (status = 404, description = "No user with that email")
    ),
    security(("bearer_auth" = [])),
    tag = "Restaurants"
)]
pub async fn assign_staff(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignStaffRequest>,
) -> AppResult<Json<ApiResponse<StaffMember>>> {
    let resp = restaurant_service::assign_staff(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/restaurants/{id}/staff/{user_id}",
    params(
        ("id" = Uuid, Path, description = "Restaurant ID"),
        ("user_id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Assignment deactivated"),
        (status = 400, description = "Last owner cannot be removed"),
        (status = 403, description = "Not allowed"),
        (status = 404, description = "No active assignment")
    ),
    security(("bearer_auth" = [])),
    tag = "Restaurants"
)]
pub async fn remove_staff(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = restaurant_service::remove_staff(&state, &user, id, user_id).await?;
    Ok(Json(resp))
}
