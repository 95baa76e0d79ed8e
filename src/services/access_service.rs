//! Restaurant-scoped authorization.
//!
//! Handlers resolve the caller's assignment role once through [`authorize`] and branch on
//! the returned role instead of querying `user_restaurants` themselves.

use sea_orm::{ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::{
    entity::user_restaurants::{Column as AssignCol, Entity as Assignments},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::AssignmentRole,
};

/// The caller's active role on a restaurant, or `None` when they have no active assignment.
pub async fn role_on<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    restaurant_id: Uuid,
) -> AppResult<Option<AssignmentRole>> {
    let assignment = Assignments::find()
        .filter(
            Condition::all()
                .add(AssignCol::UserId.eq(user_id))
                .add(AssignCol::RestaurantId.eq(restaurant_id))
                .add(AssignCol::IsActive.eq(true)),
        )
        .one(conn)
        .await?;

    match assignment {
        Some(a) => Ok(Some(a.assignment_role.parse()?)),
        None => Ok(None),
    }
}

/// Check that `role` is one of `allowed`.
pub fn permits(role: Option<AssignmentRole>, allowed: &[AssignmentRole]) -> AppResult<AssignmentRole> {
    match role {
        Some(role) if allowed.contains(&role) => Ok(role),
        _ => Err(AppError::Forbidden),
    }
}

/// Resolve the caller's role on `restaurant_id` and require it to be in `allowed`.
pub async fn authorize<C: ConnectionTrait>(
    conn: &C,
    user: &AuthUser,
    restaurant_id: Uuid,
    allowed: &[AssignmentRole],
) -> AppResult<AssignmentRole> {
    let role = role_on(conn, user.user_id, restaurant_id).await?;
    let granted = permits(role, allowed);
    if granted.is_err() {
        tracing::debug!(
            user_id = %user.user_id,
            %restaurant_id,
            role = ?role,
            "restaurant access denied"
        );
    }
    granted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_assignment_is_forbidden() {
        assert!(matches!(
            permits(None, AssignmentRole::MEMBERS),
            Err(AppError::Forbidden)
        ));
    }

    #[test]
    fn role_outside_allow_list_is_forbidden() {
        assert!(matches!(
            permits(Some(AssignmentRole::Chef), AssignmentRole::ORDER_PLACERS),
            Err(AppError::Forbidden)
        ));
        assert!(matches!(
            permits(Some(AssignmentRole::Manager), AssignmentRole::OWNERS),
            Err(AppError::Forbidden)
        ));
    }

    #[test]
    fn allowed_role_is_returned() {
        let role = permits(Some(AssignmentRole::Waiter), AssignmentRole::STAFF).unwrap();
        assert_eq!(role, AssignmentRole::Waiter);
    }
}
