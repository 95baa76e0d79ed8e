use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::{
    menu_items, order_items, orders, restaurant_tables, restaurants, user_restaurants, users,
};

/// A stored enum value that no longer matches any known variant.
#[derive(Debug, Error)]
#[error("unknown {kind} `{value}`")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Enums persisted as lowercase text columns.
macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err(UnknownVariant {
                        kind: stringify!($name),
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

text_enum! {
    /// Account-wide role.
    UserRole {
        Customer => "customer",
        Waiter => "waiter",
        Chef => "chef",
        Admin => "admin",
    }
}

text_enum! {
    /// Role a user holds on one restaurant.
    AssignmentRole {
        Owner => "owner",
        Manager => "manager",
        Waiter => "waiter",
        Chef => "chef",
        Customer => "customer",
    }
}

impl AssignmentRole {
    pub const MEMBERS: &'static [AssignmentRole] = AssignmentRole::ALL;
    pub const STAFF: &'static [AssignmentRole] = &[
        AssignmentRole::Owner,
        AssignmentRole::Manager,
        AssignmentRole::Waiter,
        AssignmentRole::Chef,
    ];
    pub const ORDER_PLACERS: &'static [AssignmentRole] = &[
        AssignmentRole::Owner,
        AssignmentRole::Manager,
        AssignmentRole::Waiter,
        AssignmentRole::Customer,
    ];
    pub const MANAGEMENT: &'static [AssignmentRole] =
        &[AssignmentRole::Owner, AssignmentRole::Manager];
    pub const OWNERS: &'static [AssignmentRole] = &[AssignmentRole::Owner];

    pub fn is_management(&self) -> bool {
        Self::MANAGEMENT.contains(self)
    }
}

text_enum! {
    TableStatus {
        Available => "available",
        Occupied => "occupied",
        Reserved => "reserved",
        Maintenance => "maintenance",
    }
}

text_enum! {
    OrderStatus {
        Pending => "pending",
        Preparing => "preparing",
        Ready => "ready",
        Served => "served",
        Cancelled => "cancelled",
        Paid => "paid",
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Restaurant {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub description: Option<String>,
    pub owner_user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StaffMember {
    pub user_id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub assignment_role: AssignmentRole,
    pub is_active: bool,
    pub assigned_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Table {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub number: i32,
    pub status: TableStatus,
    pub capacity: i32,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MenuItem {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Minor currency units.
    pub price: i64,
    pub category: String,
    pub image_url: Option<String>,
    pub is_available: bool,
    #[schema(value_type = Object)]
    pub allergens: Value,
    #[schema(value_type = Object)]
    pub modifiers: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub placed_by_user_id: Option<Uuid>,
    pub table_id: Option<Uuid>,
    pub status: OrderStatus,
    /// Minor currency units.
    pub total: i64,
    pub notes: Option<String>,
    pub estimated_ready: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub menu_item_id: Uuid,
    pub quantity: i32,
    pub price_at_order: i64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    pub fn line_total(&self) -> i64 {
        i64::from(self.quantity) * self.price_at_order
    }
}

impl TryFrom<users::Model> for User {
    type Error = UnknownVariant;

    fn try_from(model: users::Model) -> Result<Self, Self::Error> {
        Ok(User {
            id: model.id,
            email: model.email,
            first_name: model.first_name,
            last_name: model.last_name,
            role: model.role.parse()?,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        })
    }
}

impl From<restaurants::Model> for Restaurant {
    fn from(model: restaurants::Model) -> Self {
        Restaurant {
            id: model.id,
            name: model.name,
            address: model.address,
            phone: model.phone,
            description: model.description,
            owner_user_id: model.owner_user_id,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl StaffMember {
    pub fn from_entities(
        assignment: user_restaurants::Model,
        user: users::Model,
    ) -> Result<Self, UnknownVariant> {
        Ok(StaffMember {
            user_id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            assignment_role: assignment.assignment_role.parse()?,
            is_active: assignment.is_active,
            assigned_at: assignment.created_at.with_timezone(&Utc),
        })
    }
}

impl TryFrom<restaurant_tables::Model> for Table {
    type Error = UnknownVariant;

    fn try_from(model: restaurant_tables::Model) -> Result<Self, Self::Error> {
        Ok(Table {
            id: model.id,
            restaurant_id: model.restaurant_id,
            number: model.number,
            status: model.status.parse()?,
            capacity: model.capacity,
            location: model.location,
            notes: model.notes,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        })
    }
}

impl From<menu_items::Model> for MenuItem {
    fn from(model: menu_items::Model) -> Self {
        MenuItem {
            id: model.id,
            restaurant_id: model.restaurant_id,
            name: model.name,
            description: model.description,
            price: model.price,
            category: model.category,
            image_url: model.image_url,
            is_available: model.is_available,
            allergens: model.allergens,
            modifiers: model.modifiers,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl TryFrom<orders::Model> for Order {
    type Error = UnknownVariant;

    fn try_from(model: orders::Model) -> Result<Self, Self::Error> {
        Ok(Order {
            id: model.id,
            restaurant_id: model.restaurant_id,
            placed_by_user_id: model.placed_by_user_id,
            table_id: model.table_id,
            status: model.status.parse()?,
            total: model.total,
            notes: model.notes,
            estimated_ready: model.estimated_ready.map(|dt| dt.with_timezone(&Utc)),
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        })
    }
}

impl From<order_items::Model> for OrderItem {
    fn from(model: order_items::Model) -> Self {
        OrderItem {
            id: model.id,
            order_id: model.order_id,
            menu_item_id: model.menu_item_id,
            quantity: model.quantity,
            price_at_order: model.price_at_order,
            notes: model.notes,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_variant_round_trips_through_its_column_text() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().ok(), Some(*status));
        }
        for status in TableStatus::ALL {
            assert_eq!(status.as_str().parse::<TableStatus>().ok(), Some(*status));
        }
    }

    #[test]
    fn unknown_text_is_rejected() {
        let err = "shipped".parse::<OrderStatus>().unwrap_err();
        assert_eq!(err.kind, "OrderStatus");
        assert_eq!(err.to_string(), "unknown OrderStatus `shipped`");
    }

    #[test]
    fn json_uses_lowercase_names() {
        let json = serde_json::to_string(&AssignmentRole::Manager).unwrap();
        assert_eq!(json, "\"manager\"");
        let role: UserRole = serde_json::from_str("\"chef\"").unwrap();
        assert_eq!(role, UserRole::Chef);
    }

    #[test]
    fn chefs_cannot_place_orders_but_customers_can() {
        assert!(!AssignmentRole::ORDER_PLACERS.contains(&AssignmentRole::Chef));
        assert!(AssignmentRole::ORDER_PLACERS.contains(&AssignmentRole::Customer));
        assert!(!AssignmentRole::STAFF.contains(&AssignmentRole::Customer));
        assert!(AssignmentRole::Manager.is_management());
        assert!(!AssignmentRole::Waiter.is_management());
    }

    #[test]
    fn line_total_multiplies_snapshot_price() {
        let item = OrderItem {
            id: Uuid::nil(),
            order_id: Uuid::nil(),
            menu_item_id: Uuid::nil(),
            quantity: 3,
            price_at_order: 550,
            notes: None,
            created_at: Utc::now(),
        };
        assert_eq!(item.line_total(), 1650);
    }
}
