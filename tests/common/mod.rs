#![allow(dead_code)]

use restaurant_api::{
    config::AppConfig,
    db::create_pool,
    dto::restaurants::CreateRestaurantRequest,
    entity::{
        menu_items::ActiveModel as MenuItemActive, restaurant_tables::ActiveModel as TableActive,
        users::ActiveModel as UserActive,
    },
    middleware::auth::AuthUser,
    models::{TableStatus, UserRole},
    services::restaurant_service,
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::json;
use uuid::Uuid;

/// Connected state, or `None` when no database is configured.
pub async fn setup_state() -> anyhow::Result<Option<AppState>> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration tests.");
            return Ok(None);
        }
    };

    let pool = create_pool(&database_url, 5).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(Some(AppState::new(pool, test_config(&database_url))))
}

pub fn test_config(database_url: &str) -> AppConfig {
    AppConfig {
        database_url: database_url.to_string(),
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: "test-secret".into(),
        jwt_ttl_hours: 1,
        db_max_connections: 5,
        cors_origin: "http://localhost:5173".into(),
    }
}

// Every test works on fresh rows, so nothing is truncated between runs.
pub async fn create_user(state: &AppState, role: UserRole) -> anyhow::Result<AuthUser> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(format!("{}@example.test", Uuid::new_v4())),
        password_hash: Set("dummy".into()),
        first_name: Set(None),
        last_name: Set(None),
        role: Set(role.as_str().to_string()),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(AuthUser {
        user_id: user.id,
        role,
    })
}

pub async fn user_email(state: &AppState, user: &AuthUser) -> anyhow::Result<String> {
    let (email,): (String,) = sqlx::query_as("SELECT email FROM users WHERE id = $1")
        .bind(user.user_id)
        .fetch_one(&state.pool)
        .await?;
    Ok(email)
}

/// A restaurant owned by `owner`.
pub async fn create_restaurant(state: &AppState, owner: &AuthUser) -> anyhow::Result<Uuid> {
    let resp = restaurant_service::create_restaurant(
        state,
        owner,
        CreateRestaurantRequest {
            name: "Test Kitchen".into(),
            address: None,
            phone: None,
            description: None,
        },
    )
    .await?;
    let created = resp.data.ok_or_else(|| anyhow::anyhow!("missing data"))?;
    Ok(created.restaurant.id)
}

pub async fn create_menu_item(
    state: &AppState,
    restaurant_id: Uuid,
    name: &str,
    price: i64,
    is_available: bool,
) -> anyhow::Result<Uuid> {
    create_menu_item_in(state, restaurant_id, "Mains", name, price, is_available).await
}

pub async fn create_menu_item_in(
    state: &AppState,
    restaurant_id: Uuid,
    category: &str,
    name: &str,
    price: i64,
    is_available: bool,
) -> anyhow::Result<Uuid> {
    let item = MenuItemActive {
        id: Set(Uuid::new_v4()),
        restaurant_id: Set(restaurant_id),
        name: Set(name.to_string()),
        description: Set(None),
        price: Set(price),
        category: Set(category.to_string()),
        image_url: Set(None),
        is_available: Set(is_available),
        allergens: Set(json!([])),
        modifiers: Set(json!({})),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(item.id)
}

pub async fn create_table(
    state: &AppState,
    restaurant_id: Uuid,
    number: i32,
) -> anyhow::Result<Uuid> {
    let table = TableActive {
        id: Set(Uuid::new_v4()),
        restaurant_id: Set(restaurant_id),
        number: Set(number),
        status: Set(TableStatus::Available.as_str().to_string()),
        capacity: Set(4),
        location: Set(None),
        notes: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(table.id)
}

pub async fn count_orders(state: &AppState, restaurant_id: Uuid) -> anyhow::Result<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT count(*) FROM orders WHERE restaurant_id = $1")
        .bind(restaurant_id)
        .fetch_one(&state.pool)
        .await?;
    Ok(count)
}

pub async fn count_order_items(state: &AppState, restaurant_id: Uuid) -> anyhow::Result<i64> {
    let (count,): (i64,) = sqlx::query_as(
        r#"
        SELECT count(*) FROM order_items oi
        JOIN orders o ON o.id = oi.order_id
        WHERE o.restaurant_id = $1
        "#,
    )
    .bind(restaurant_id)
    .fetch_one(&state.pool)
    .await?;
    Ok(count)
}
