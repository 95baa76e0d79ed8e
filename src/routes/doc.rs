use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{AuthResponse, LoginRequest, RegisterRequest},
        menu::{CreateMenuItemRequest, MenuList, UpdateMenuItemRequest},
        orders::{
            OrderDetail, OrderLineRequest, OrderList, OrderWithItems, PlaceOrderRequest,
            TableOrders, UpdateOrderRequest,
        },
        restaurants::{
            AssignStaffRequest, CreateRestaurantRequest, RestaurantList, RestaurantWithRole,
            StaffList, UpdateRestaurantRequest,
        },
        tables::{CreateTableRequest, RestaurantTables, TableDetail, TableList, UpdateTableRequest},
        users::UpdateUserRequest,
    },
    error::ErrorData,
    models::{
        AssignmentRole, MenuItem, Order, OrderItem, OrderStatus, Restaurant, StaffMember, Table,
        TableStatus, User, UserRole,
    },
    response::{ApiResponse, Meta},
    routes::{health, menu, orders, params, restaurants, tables, users},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        users::register,
        users::login,
        users::profile,
        users::update_user,
        users::delete_user,
        restaurants::list_restaurants,
        restaurants::get_restaurant,
        restaurants::create_restaurant,
        restaurants::update_restaurant,
        restaurants::delete_restaurant,
        restaurants::list_staff,
        restaurants::assign_staff,
        restaurants::remove_staff,
        tables::list_tables,
        tables::list_by_restaurant,
        tables::get_table,
        tables::create_table,
        tables::update_table,
        tables::delete_table,
        menu::list_menu,
        menu::get_menu_item,
        menu::create_menu_item,
        menu::update_menu_item,
        menu::delete_menu_item,
        orders::list_orders,
        orders::place_order,
        orders::get_order,
        orders::list_table_orders,
        orders::update_order,
        orders::delete_order
    ),
    components(
        schemas(
            User,
            UserRole,
            AssignmentRole,
            Restaurant,
            StaffMember,
            Table,
            TableStatus,
            MenuItem,
            Order,
            OrderStatus,
            OrderItem,
            RegisterRequest,
            LoginRequest,
            AuthResponse,
            UpdateUserRequest,
            CreateRestaurantRequest,
            UpdateRestaurantRequest,
            RestaurantWithRole,
            RestaurantList,
            AssignStaffRequest,
            StaffList,
            CreateTableRequest,
            UpdateTableRequest,
            TableList,
            RestaurantTables,
            TableDetail,
            CreateMenuItemRequest,
            UpdateMenuItemRequest,
            MenuList,
            OrderLineRequest,
            PlaceOrderRequest,
            UpdateOrderRequest,
            OrderWithItems,
            OrderDetail,
            OrderList,
            TableOrders,
            params::Pagination,
            params::SortOrder,
            ErrorData,
            Meta,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<MenuList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Users", description = "Registration, login and profile endpoints"),
        (name = "Restaurants", description = "Restaurant and staff endpoints"),
        (name = "Tables", description = "Table endpoints"),
        (name = "Menu", description = "Menu endpoints"),
        (name = "Orders", description = "Order endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_order_placement() {
        let doc = ApiDoc::openapi();
        let path = doc
            .paths
            .paths
            .get("/api/orders/{restaurant_id}")
            .expect("orders path documented");
        assert!(path.post.is_some());
        assert!(path.get.is_some());
    }
}
