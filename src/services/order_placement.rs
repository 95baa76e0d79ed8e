//! Order placement: one order plus its line items, written atomically.
//!
//! Prices are always re-read from `menu_items` inside the transaction and snapshotted onto
//! each order item, so the stored total never depends on anything the client sent.
//! Either every row is committed or the transaction is rolled back and nothing persists.

use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, DatabaseTransaction, DbErr, Set, TransactionTrait};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    db::OrmConn,
    dto::orders::OrderLineRequest,
    entity::{
        order_items::{ActiveModel as OrderItemActive, Model as OrderItemModel},
        orders::{ActiveModel as OrderActive, Model as OrderModel},
    },
    models::OrderStatus,
    services::{menu_service, table_service},
};

/// Why a single requested line was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LineItemIssue {
    #[error("quantity must be a positive integer, got {0}")]
    NonPositiveQuantity(i32),
    #[error("menu item does not exist in this restaurant")]
    UnknownMenuItem,
    #[error("menu item is currently unavailable")]
    Unavailable,
    #[error("order total is out of range")]
    TotalOverflow,
}

#[derive(Debug, Error)]
pub enum PlacementError {
    #[error("Order must contain at least one item")]
    EmptyItemList,

    /// `line` is 1-based, in request order.
    #[error("Invalid line {line} (menu item {menu_item_id}): {issue}")]
    InvalidLineItem {
        line: usize,
        menu_item_id: Uuid,
        issue: LineItemIssue,
    },

    #[error("Table {0} does not belong to this restaurant")]
    TableMismatch(Uuid),

    #[error("Order could not be stored")]
    TransactionFailure(#[from] DbErr),
}

#[derive(Debug, Clone)]
pub struct PlaceOrder {
    pub restaurant_id: Uuid,
    pub user_id: Uuid,
    pub table_id: Option<Uuid>,
    pub notes: Option<String>,
    pub items: Vec<OrderLineRequest>,
}

#[derive(Debug)]
pub struct PlacedOrder {
    pub order: OrderModel,
    pub items: Vec<OrderItemModel>,
}

/// Create a pending order with one item per requested line, or nothing at all.
///
/// The caller must already have checked that `user_id` may place orders at
/// `restaurant_id`.
pub async fn place_order(db: &OrmConn, request: PlaceOrder) -> Result<PlacedOrder, PlacementError> {
    validate_lines(&request.items)?;

    let txn = db.begin().await?;
    match write_order(&txn, request).await {
        Ok(placed) => {
            txn.commit().await?;
            tracing::info!(
                order_id = %placed.order.id,
                restaurant_id = %placed.order.restaurant_id,
                total = placed.order.total,
                lines = placed.items.len(),
                "order placed"
            );
            Ok(placed)
        }
        Err(err) => {
            if let Err(rollback_err) = txn.rollback().await {
                tracing::warn!(error = %rollback_err, "order placement rollback failed");
            }
            tracing::info!(error = %err, "order placement rejected");
            Err(err)
        }
    }
}

/// Checks that need no database access; run before the transaction opens.
fn validate_lines(items: &[OrderLineRequest]) -> Result<(), PlacementError> {
    if items.is_empty() {
        return Err(PlacementError::EmptyItemList);
    }
    for (idx, line) in items.iter().enumerate() {
        if line.quantity <= 0 {
            return Err(PlacementError::InvalidLineItem {
                line: idx + 1,
                menu_item_id: line.menu_item_id,
                issue: LineItemIssue::NonPositiveQuantity(line.quantity),
            });
        }
    }
    Ok(())
}

async fn write_order(
    txn: &DatabaseTransaction,
    request: PlaceOrder,
) -> Result<PlacedOrder, PlacementError> {
    let PlaceOrder {
        restaurant_id,
        user_id,
        table_id,
        notes,
        items: lines,
    } = request;

    if let Some(table_id) = table_id {
        if !table_service::belongs_to_restaurant(txn, table_id, restaurant_id).await? {
            return Err(PlacementError::TableMismatch(table_id));
        }
    }

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        restaurant_id: Set(restaurant_id),
        placed_by_user_id: Set(Some(user_id)),
        table_id: Set(table_id),
        status: Set(OrderStatus::Pending.as_str().to_string()),
        total: Set(0),
        notes: Set(notes),
        estimated_ready: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(txn)
    .await?;

    let mut running_total: i64 = 0;
    let mut items = Vec::with_capacity(lines.len());

    for (idx, line) in lines.into_iter().enumerate() {
        let menu_item_id = line.menu_item_id;
        let invalid = move |issue: LineItemIssue| PlacementError::InvalidLineItem {
            line: idx + 1,
            menu_item_id,
            issue,
        };

        let menu_item = menu_service::find_in_restaurant(txn, restaurant_id, menu_item_id)
            .await?
            .ok_or_else(|| invalid(LineItemIssue::UnknownMenuItem))?;
        if !menu_item.is_available {
            return Err(invalid(LineItemIssue::Unavailable));
        }

        running_total = i64::from(line.quantity)
            .checked_mul(menu_item.price)
            .and_then(|line_total| running_total.checked_add(line_total))
            .ok_or_else(|| invalid(LineItemIssue::TotalOverflow))?;

        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            menu_item_id: Set(menu_item.id),
            quantity: Set(line.quantity),
            price_at_order: Set(menu_item.price),
            notes: Set(line.notes),
            created_at: NotSet,
        }
        .insert(txn)
        .await?;
        items.push(item);
    }

    let mut active: OrderActive = order.into();
    active.total = Set(running_total);
    let order = active.update(txn).await?;

    Ok(PlacedOrder { order, items })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(quantity: i32) -> OrderLineRequest {
        OrderLineRequest {
            menu_item_id: Uuid::new_v4(),
            quantity,
            notes: None,
        }
    }

    #[test]
    fn empty_list_is_rejected_up_front() {
        assert!(matches!(
            validate_lines(&[]),
            Err(PlacementError::EmptyItemList)
        ));
    }

    #[test]
    fn non_positive_quantity_names_the_line() {
        let lines = vec![line(2), line(0), line(-1)];
        match validate_lines(&lines) {
            Err(PlacementError::InvalidLineItem {
                line,
                menu_item_id,
                issue,
            }) => {
                assert_eq!(line, 2);
                assert_eq!(menu_item_id, lines[1].menu_item_id);
                assert_eq!(issue, LineItemIssue::NonPositiveQuantity(0));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn positive_quantities_pass() {
        assert!(validate_lines(&[line(1), line(12)]).is_ok());
    }
}
