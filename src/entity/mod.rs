pub mod audit_logs;
pub mod menu_items;
pub mod order_items;
pub mod orders;
pub mod restaurant_tables;
pub mod restaurants;
pub mod user_restaurants;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use menu_items::Entity as MenuItems;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use restaurant_tables::Entity as RestaurantTables;
pub use restaurants::Entity as Restaurants;
pub use user_restaurants::Entity as UserRestaurants;
pub use users::Entity as Users;
