use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::models::{Table, TableStatus};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTableRequest {
    pub restaurant_id: Uuid,
    pub number: i32,
    pub capacity: i32,
    pub location: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTableRequest {
    pub number: Option<i32>,
    pub status: Option<TableStatus>,
    pub capacity: Option<i32>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

impl UpdateTableRequest {
    pub fn is_empty(&self) -> bool {
        self.number.is_none()
            && self.status.is_none()
            && self.capacity.is_none()
            && self.location.is_none()
            && self.notes.is_none()
    }

    /// True when the request touches nothing but `status`.
    pub fn is_status_only(&self) -> bool {
        self.status.is_some()
            && self.number.is_none()
            && self.capacity.is_none()
            && self.location.is_none()
            && self.notes.is_none()
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TableListQuery {
    pub restaurant_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TableList {
    pub items: Vec<Table>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RestaurantTables {
    pub restaurant_id: Uuid,
    pub tables: Vec<Table>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TableDetail {
    #[serde(flatten)]
    pub table: Table,
    pub restaurant_name: String,
}
