use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{AssignmentRole, Restaurant, StaffMember};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRestaurantRequest {
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRestaurantRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub description: Option<String>,
}

impl UpdateRestaurantRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.address.is_none()
            && self.phone.is_none()
            && self.description.is_none()
    }
}

/// A restaurant together with the caller's role on it.
#[derive(Debug, Serialize, ToSchema)]
pub struct RestaurantWithRole {
    #[serde(flatten)]
    pub restaurant: Restaurant,
    pub assignment_role: AssignmentRole,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RestaurantList {
    pub items: Vec<RestaurantWithRole>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignStaffRequest {
    pub email: String,
    pub role: AssignmentRole,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StaffList {
    pub items: Vec<StaffMember>,
}
