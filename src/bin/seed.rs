use restaurant_api::{
    config::AppConfig,
    db::create_pool,
    models::{AssignmentRole, UserRole},
    services::auth_service::hash_password,
};
use serde_json::json;
use uuid::Uuid;

const RESTAURANT_NAME: &str = "Ferris Bistro";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url, config.db_max_connections).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let owner_id = ensure_user(&pool, "owner@example.com", "owner123", UserRole::Customer).await?;
    let waiter_id = ensure_user(&pool, "waiter@example.com", "waiter123", UserRole::Waiter).await?;
    let chef_id = ensure_user(&pool, "chef@example.com", "chef123", UserRole::Chef).await?;

    let restaurant_id = ensure_restaurant(&pool, owner_id).await?;
    assign(&pool, owner_id, restaurant_id, AssignmentRole::Owner).await?;
    assign(&pool, waiter_id, restaurant_id, AssignmentRole::Waiter).await?;
    assign(&pool, chef_id, restaurant_id, AssignmentRole::Chef).await?;

    seed_tables(&pool, restaurant_id).await?;
    seed_menu(&pool, restaurant_id).await?;

    println!("Seed completed. Restaurant ID: {restaurant_id}, Owner ID: {owner_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    email: &str,
    password: &str,
    role: UserRole,
) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password)?;

    let (user_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, role)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind(role.as_str())
    .fetch_one(pool)
    .await?;

    println!("Ensured user {email} (role={role})");
    Ok(user_id)
}

async fn ensure_restaurant(pool: &sqlx::PgPool, owner_id: Uuid) -> anyhow::Result<Uuid> {
    let existing: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM restaurants WHERE name = $1 AND owner_user_id = $2")
            .bind(RESTAURANT_NAME)
            .bind(owner_id)
            .fetch_optional(pool)
            .await?;
    if let Some((id,)) = existing {
        return Ok(id);
    }

    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO restaurants (id, name, address, phone, description, owner_user_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(RESTAURANT_NAME)
    .bind("1 Crab Street")
    .bind("+1 555 0100")
    .bind("Small plates for Rustaceans")
    .bind(owner_id)
    .fetch_one(pool)
    .await?;

    println!("Created restaurant {RESTAURANT_NAME}");
    Ok(id)
}

async fn assign(
    pool: &sqlx::PgPool,
    user_id: Uuid,
    restaurant_id: Uuid,
    role: AssignmentRole,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO user_restaurants (id, user_id, restaurant_id, assignment_role, is_active)
        VALUES ($1, $2, $3, $4, TRUE)
        ON CONFLICT (user_id, restaurant_id)
        DO UPDATE SET assignment_role = EXCLUDED.assignment_role, is_active = TRUE
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(restaurant_id)
    .bind(role.as_str())
    .execute(pool)
    .await?;
    Ok(())
}

async fn seed_tables(pool: &sqlx::PgPool, restaurant_id: Uuid) -> anyhow::Result<()> {
    let tables = vec![(1, 2, "window"), (2, 4, "main hall"), (3, 6, "terrace")];

    for (number, capacity, location) in tables {
        sqlx::query(
            r#"
            INSERT INTO restaurant_tables (id, restaurant_id, number, capacity, location)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (restaurant_id, number) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(restaurant_id)
        .bind(number)
        .bind(capacity)
        .bind(location)
        .execute(pool)
        .await?;
    }

    println!("Seeded tables");
    Ok(())
}

async fn seed_menu(pool: &sqlx::PgPool, restaurant_id: Uuid) -> anyhow::Result<()> {
    let items = vec![
        ("Tomato Soup", "Starters", 650_i64, json!(["celery"])),
        ("Margherita", "Mains", 1200, json!(["gluten", "milk"])),
        ("Crab Linguine", "Mains", 1850, json!(["gluten", "crustaceans"])),
        ("Lemon Tart", "Desserts", 700, json!(["gluten", "eggs"])),
    ];

    for (name, category, price, allergens) in items {
        sqlx::query(
            r#"
            INSERT INTO menu_items (id, restaurant_id, name, price, category, allergens)
            SELECT $1, $2, $3, $4, $5, $6
            WHERE NOT EXISTS (
                SELECT 1 FROM menu_items WHERE restaurant_id = $2 AND name = $3
            )
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(restaurant_id)
        .bind(name)
        .bind(price)
        .bind(category)
        .bind(allergens)
        .execute(pool)
        .await?;
    }

    println!("Seeded menu");
    Ok(())
}
