pub mod auth;
pub mod menu;
pub mod orders;
pub mod restaurants;
pub mod tables;
pub mod users;
