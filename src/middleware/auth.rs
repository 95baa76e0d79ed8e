use axum::{
    extract::{FromRef, FromRequestParts},
    http::header,
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use uuid::Uuid;

use crate::{dto::auth::Claims, error::AppError, models::UserRole, state::AppState};

/// The authenticated caller, taken from the bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: UserRole,
}

pub fn ensure_role(user: &AuthUser, role: UserRole) -> Result<(), AppError> {
    if user.role != role {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, UserRole::Admin)
}

/// Allow acting on `target` only when it is the caller or the caller is an admin.
pub fn ensure_self_or_admin(user: &AuthUser, target: Uuid) -> Result<(), AppError> {
    if user.user_id == target {
        return Ok(());
    }
    ensure_admin(user)
}

pub fn decode_token(token: &str, secret: &str) -> Result<AuthUser, AppError> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))?;

    let user_id = Uuid::parse_str(&decoded.claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid user id in token".into()))?;

    Ok(AuthUser {
        user_id,
        role: decoded.claims.role,
    })
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;
    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .map(str::trim)
            .ok_or_else(|| AppError::Unauthorized("Invalid Authorization scheme".into()))?;

        let app_state = AppState::from_ref(state);
        decode_token(token, &app_state.config.jwt_secret)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use jsonwebtoken::{EncodingKey, Header, encode};

    use super::*;

    fn token_for(sub: &str, role: UserRole, exp_offset: Duration, secret: &str) -> String {
        let claims = Claims {
            sub: sub.to_string(),
            role,
            exp: (Utc::now() + exp_offset).timestamp() as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn valid_token_yields_caller() {
        let id = Uuid::new_v4();
        let token = token_for(&id.to_string(), UserRole::Waiter, Duration::hours(1), "s3cret");
        let user = decode_token(&token, "s3cret").unwrap();
        assert_eq!(user.user_id, id);
        assert_eq!(user.role, UserRole::Waiter);
    }

    #[test]
    fn wrong_secret_or_expiry_is_unauthorized() {
        let id = Uuid::new_v4().to_string();
        let token = token_for(&id, UserRole::Customer, Duration::hours(1), "one");
        assert!(matches!(
            decode_token(&token, "two"),
            Err(AppError::Unauthorized(_))
        ));

        let expired = token_for(&id, UserRole::Customer, Duration::hours(-2), "one");
        assert!(matches!(
            decode_token(&expired, "one"),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn self_or_admin_guard() {
        let me = AuthUser {
            user_id: Uuid::new_v4(),
            role: UserRole::Customer,
        };
        assert!(ensure_self_or_admin(&me, me.user_id).is_ok());
        assert!(matches!(
            ensure_self_or_admin(&me, Uuid::new_v4()),
            Err(AppError::Forbidden)
        ));

        let admin = AuthUser {
            user_id: Uuid::new_v4(),
            role: UserRole::Admin,
        };
        assert!(ensure_self_or_admin(&admin, me.user_id).is_ok());
    }
}
