pub mod access_service;
pub mod auth_service;
pub mod menu_service;
pub mod order_placement;
pub mod order_service;
pub mod restaurant_service;
pub mod table_service;
pub mod user_service;
