use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    audit,
    dto::restaurants::{
        AssignStaffRequest, CreateRestaurantRequest, RestaurantList, RestaurantWithRole,
        StaffList, UpdateRestaurantRequest,
    },
    entity::{
        restaurants::{ActiveModel as RestaurantActive, Column as RestCol, Entity as Restaurants},
        user_restaurants::{
            ActiveModel as AssignActive, Column as AssignCol, Entity as Assignments,
            Model as AssignModel,
        },
        users::{Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{AssignmentRole, Restaurant, StaffMember},
    response::{ApiResponse, Meta},
    services::access_service::{authorize, role_on},
    state::AppState,
};

pub async fn list_restaurants(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<RestaurantList>> {
    let rows = Assignments::find()
        .filter(
            Condition::all()
                .add(AssignCol::UserId.eq(user.user_id))
                .add(AssignCol::IsActive.eq(true)),
        )
        .find_also_related(Restaurants)
        .order_by_desc(RestCol::CreatedAt)
        .all(&state.orm)
        .await?;

    let mut items = Vec::with_capacity(rows.len());
    for (assignment, restaurant) in rows {
        if let Some(restaurant) = restaurant {
            items.push(RestaurantWithRole {
                restaurant: Restaurant::from(restaurant),
                assignment_role: assignment.assignment_role.parse()?,
            });
        }
    }

    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Restaurants",
        RestaurantList { items },
        Some(Meta::new(1, total, total)),
    ))
}

pub async fn get_restaurant(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<RestaurantWithRole>> {
    // Non-members cannot tell a foreign restaurant from a missing one.
    let role = role_on(&state.orm, user.user_id, id)
        .await?
        .ok_or(AppError::NotFound)?;
    let restaurant = Restaurants::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(ApiResponse::item(
        "Restaurant",
        RestaurantWithRole {
            restaurant: Restaurant::from(restaurant),
            assignment_role: role,
        },
    ))
}

/// Create a restaurant and make the caller its owner, in one transaction.
pub async fn create_restaurant(
    state: &AppState,
    user: &AuthUser,
    payload: CreateRestaurantRequest,
) -> AppResult<ApiResponse<RestaurantWithRole>> {
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::BadRequest("Name required".into()));
    }

    let txn = state.orm.begin().await?;

    let restaurant = RestaurantActive {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        address: Set(payload.address),
        phone: Set(payload.phone),
        description: Set(payload.description),
        owner_user_id: Set(user.user_id),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    AssignActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        restaurant_id: Set(restaurant.id),
        assignment_role: Set(AssignmentRole::Owner.as_str().to_string()),
        is_active: Set(true),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "restaurant_create",
        "restaurants",
        json!({ "restaurant_id": restaurant.id }),
    )
    .await;

    Ok(ApiResponse::item(
        "Restaurant created",
        RestaurantWithRole {
            restaurant: Restaurant::from(restaurant),
            assignment_role: AssignmentRole::Owner,
        },
    ))
}

pub async fn update_restaurant(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateRestaurantRequest,
) -> AppResult<ApiResponse<Restaurant>> {
    if payload.is_empty() {
        return Err(AppError::BadRequest("At least one field required".into()));
    }
    authorize(&state.orm, user, id, AssignmentRole::MANAGEMENT).await?;

    let existing = Restaurants::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: RestaurantActive = existing.into();
    if let Some(name) = payload.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::BadRequest("Name must not be empty".into()));
        }
        active.name = Set(name);
    }
    if let Some(address) = payload.address {
        active.address = Set(Some(address));
    }
    if let Some(phone) = payload.phone {
        active.phone = Set(Some(phone));
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    active.updated_at = Set(Utc::now().into());

    let restaurant = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "restaurant_update",
        "restaurants",
        json!({ "restaurant_id": restaurant.id }),
    )
    .await;

    Ok(ApiResponse::item("Updated", Restaurant::from(restaurant)))
}

/// Delete a restaurant; tables, menu, orders and assignments cascade.
pub async fn delete_restaurant(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    authorize(&state.orm, user, id, AssignmentRole::OWNERS).await?;

    let result = Restaurants::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        user.user_id,
        "restaurant_delete",
        "restaurants",
        json!({ "restaurant_id": id }),
    )
    .await;

    Ok(ApiResponse::item(
        "Restaurant deleted successfully",
        json!({}),
    ))
}

pub async fn list_staff(
    state: &AppState,
    user: &AuthUser,
    restaurant_id: Uuid,
) -> AppResult<ApiResponse<StaffList>> {
    authorize(&state.orm, user, restaurant_id, AssignmentRole::MANAGEMENT).await?;

    let rows = Assignments::find()
        .filter(AssignCol::RestaurantId.eq(restaurant_id))
        .find_also_related(Users)
        .order_by_asc(AssignCol::CreatedAt)
        .all(&state.orm)
        .await?;

    let mut items = Vec::with_capacity(rows.len());
    for (assignment, member) in rows {
        if let Some(member) = member {
            items.push(StaffMember::from_entities(assignment, member)?);
        }
    }

    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Staff",
        StaffList { items },
        Some(Meta::new(1, total, total)),
    ))
}

/// Grant (or change) a user's role on a restaurant.
pub async fn assign_staff(
    state: &AppState,
    user: &AuthUser,
    restaurant_id: Uuid,
    payload: AssignStaffRequest,
) -> AppResult<ApiResponse<StaffMember>> {
    let caller_role =
        authorize(&state.orm, user, restaurant_id, AssignmentRole::MANAGEMENT).await?;

    let email = payload.email.trim().to_lowercase();
    let member = Users::find()
        .filter(UserCol::Email.eq(email))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    if member.id == user.user_id {
        return Err(AppError::BadRequest(
            "You cannot change your own assignment".into(),
        ));
    }

    let txn = state.orm.begin().await?;
    let existing = find_assignment(&txn, member.id, restaurant_id).await?;

    let current_role = match &existing {
        Some(a) if a.is_active => Some(a.assignment_role.parse::<AssignmentRole>()?),
        _ => None,
    };
    ensure_may_manage(caller_role, current_role, Some(payload.role))?;
    if current_role == Some(AssignmentRole::Owner) && payload.role != AssignmentRole::Owner {
        ensure_other_owner(&txn, restaurant_id).await?;
    }

    let assignment = match existing {
        Some(existing) => {
            let mut active: AssignActive = existing.into();
            active.assignment_role = Set(payload.role.as_str().to_string());
            active.is_active = Set(true);
            active.update(&txn).await?
        }
        None => {
            AssignActive {
                id: Set(Uuid::new_v4()),
                user_id: Set(member.id),
                restaurant_id: Set(restaurant_id),
                assignment_role: Set(payload.role.as_str().to_string()),
                is_active: Set(true),
                created_at: NotSet,
            }
            .insert(&txn)
            .await?
        }
    };

    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "staff_assign",
        "user_restaurants",
        json!({
            "restaurant_id": restaurant_id,
            "user_id": member.id,
            "role": payload.role,
        }),
    )
    .await;

    Ok(ApiResponse::item(
        "Staff assigned",
        StaffMember::from_entities(assignment, member)?,
    ))
}

/// Deactivate a user's assignment on a restaurant.
pub async fn remove_staff(
    state: &AppState,
    user: &AuthUser,
    restaurant_id: Uuid,
    member_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let caller_role =
        authorize(&state.orm, user, restaurant_id, AssignmentRole::MANAGEMENT).await?;

    if member_id == user.user_id {
        return Err(AppError::BadRequest(
            "You cannot change your own assignment".into(),
        ));
    }

    let txn = state.orm.begin().await?;
    let existing = find_assignment(&txn, member_id, restaurant_id)
        .await?
        .filter(|a| a.is_active)
        .ok_or(AppError::NotFound)?;
    let current_role: AssignmentRole = existing.assignment_role.parse()?;

    ensure_may_manage(caller_role, Some(current_role), None)?;
    if current_role == AssignmentRole::Owner {
        ensure_other_owner(&txn, restaurant_id).await?;
    }

    let mut active: AssignActive = existing.into();
    active.is_active = Set(false);
    active.update(&txn).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "staff_remove",
        "user_restaurants",
        json!({ "restaurant_id": restaurant_id, "user_id": member_id }),
    )
    .await;

    Ok(ApiResponse::item("Staff removed", json!({})))
}

async fn find_assignment<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    restaurant_id: Uuid,
) -> AppResult<Option<AssignModel>> {
    let assignment = Assignments::find()
        .filter(
            Condition::all()
                .add(AssignCol::UserId.eq(user_id))
                .add(AssignCol::RestaurantId.eq(restaurant_id)),
        )
        .one(conn)
        .await?;
    Ok(assignment)
}

/// Managers handle floor staff and customers; owner and manager roles are owner business.
fn ensure_may_manage(
    caller: AssignmentRole,
    current: Option<AssignmentRole>,
    requested: Option<AssignmentRole>,
) -> AppResult<()> {
    if caller == AssignmentRole::Owner {
        return Ok(());
    }
    let touches_management = current.is_some_and(|r| r.is_management())
        || requested.is_some_and(|r| r.is_management());
    if touches_management {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

/// The last active owner of a restaurant cannot be demoted or removed.
async fn ensure_other_owner<C: ConnectionTrait>(conn: &C, restaurant_id: Uuid) -> AppResult<()> {
    let owners = Assignments::find()
        .filter(
            Condition::all()
                .add(AssignCol::RestaurantId.eq(restaurant_id))
                .add(AssignCol::AssignmentRole.eq(AssignmentRole::Owner.as_str()))
                .add(AssignCol::IsActive.eq(true)),
        )
        .count(conn)
        .await?;
    if owners <= 1 {
        return Err(AppError::BadRequest(
            "A restaurant must keep at least one owner".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owners_may_grant_anything() {
        assert!(ensure_may_manage(AssignmentRole::Owner, None, Some(AssignmentRole::Owner)).is_ok());
        assert!(
            ensure_may_manage(
                AssignmentRole::Owner,
                Some(AssignmentRole::Manager),
                Some(AssignmentRole::Waiter)
            )
            .is_ok()
        );
    }

    #[test]
    fn managers_handle_floor_staff_only() {
        assert!(
            ensure_may_manage(
                AssignmentRole::Manager,
                Some(AssignmentRole::Customer),
                Some(AssignmentRole::Waiter)
            )
            .is_ok()
        );
        assert!(matches!(
            ensure_may_manage(AssignmentRole::Manager, None, Some(AssignmentRole::Manager)),
            Err(AppError::Forbidden)
        ));
        assert!(matches!(
            ensure_may_manage(AssignmentRole::Manager, Some(AssignmentRole::Owner), None),
            Err(AppError::Forbidden)
        ));
    }
}
