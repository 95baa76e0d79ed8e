mod common;

use axum::http::StatusCode;
use restaurant_api::{
    dto::{
        menu::UpdateMenuItemRequest,
        orders::{OrderLineRequest, PlaceOrderRequest},
    },
    error::AppError,
    models::{OrderStatus, UserRole},
    services::{
        menu_service,
        order_placement::{self, LineItemIssue, PlaceOrder, PlacementError},
        order_service,
    },
};
use uuid::Uuid;

use common::{
    count_order_items, count_orders, create_menu_item, create_restaurant, create_table,
    create_user, setup_state, user_email,
};

fn line(menu_item_id: Uuid, quantity: i32) -> OrderLineRequest {
    OrderLineRequest {
        menu_item_id,
        quantity,
        notes: None,
    }
}

fn request(restaurant_id: Uuid, user_id: Uuid, items: Vec<OrderLineRequest>) -> PlaceOrder {
    PlaceOrder {
        restaurant_id,
        user_id,
        table_id: None,
        notes: None,
        items,
    }
}

#[tokio::test]
async fn places_pending_order_with_price_snapshot() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let owner = create_user(&state, UserRole::Customer).await?;
    let restaurant_id = create_restaurant(&state, &owner).await?;
    let soup = create_menu_item(&state, restaurant_id, "Soup", 1000, true).await?;

    let placed = order_placement::place_order(
        &state.orm,
        request(restaurant_id, owner.user_id, vec![line(soup, 2)]),
    )
    .await?;

    assert_eq!(placed.order.total, 2000);
    assert_eq!(placed.order.status, OrderStatus::Pending.as_str());
    assert_eq!(placed.order.placed_by_user_id, Some(owner.user_id));
    assert_eq!(placed.items.len(), 1);
    assert_eq!(placed.items[0].menu_item_id, soup);
    assert_eq!(placed.items[0].quantity, 2);
    assert_eq!(placed.items[0].price_at_order, 1000);

    assert_eq!(count_orders(&state, restaurant_id).await?, 1);
    assert_eq!(count_order_items(&state, restaurant_id).await?, 1);
    Ok(())
}

#[tokio::test]
async fn total_is_sum_of_line_totals() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let owner = create_user(&state, UserRole::Customer).await?;
    let restaurant_id = create_restaurant(&state, &owner).await?;
    let soup = create_menu_item(&state, restaurant_id, "Soup", 650, true).await?;
    let pasta = create_menu_item(&state, restaurant_id, "Pasta", 1850, true).await?;
    let water = create_menu_item(&state, restaurant_id, "Tap water", 0, true).await?;

    let placed = order_placement::place_order(
        &state.orm,
        request(
            restaurant_id,
            owner.user_id,
            vec![line(soup, 3), line(pasta, 1), line(water, 4), line(soup, 1)],
        ),
    )
    .await?;

    let line_sum: i64 = placed
        .items
        .iter()
        .map(|item| i64::from(item.quantity) * item.price_at_order)
        .sum();
    assert_eq!(placed.order.total, line_sum);
    assert_eq!(placed.order.total, 4 * 650 + 1850);
    assert_eq!(placed.items.len(), 4);
    Ok(())
}

#[tokio::test]
async fn unavailable_item_rolls_back_whole_order() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let owner = create_user(&state, UserRole::Customer).await?;
    let restaurant_id = create_restaurant(&state, &owner).await?;
    let soup = create_menu_item(&state, restaurant_id, "Soup", 1000, true).await?;
    let special = create_menu_item(&state, restaurant_id, "Special", 550, false).await?;

    let err = order_placement::place_order(
        &state.orm,
        request(
            restaurant_id,
            owner.user_id,
            vec![line(soup, 2), line(special, 1)],
        ),
    )
    .await
    .expect_err("unavailable item must reject the order");

    match err {
        PlacementError::InvalidLineItem {
            line,
            menu_item_id,
            issue,
        } => {
            assert_eq!(line, 2);
            assert_eq!(menu_item_id, special);
            assert_eq!(issue, LineItemIssue::Unavailable);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert_eq!(count_orders(&state, restaurant_id).await?, 0);
    assert_eq!(count_order_items(&state, restaurant_id).await?, 0);
    Ok(())
}

#[tokio::test]
async fn menu_item_from_another_restaurant_is_unknown() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let owner = create_user(&state, UserRole::Customer).await?;
    let restaurant_id = create_restaurant(&state, &owner).await?;
    let other_restaurant = create_restaurant(&state, &owner).await?;
    let soup = create_menu_item(&state, restaurant_id, "Soup", 1000, true).await?;
    let foreign = create_menu_item(&state, other_restaurant, "Foreign", 900, true).await?;

    for missing in [foreign, Uuid::new_v4()] {
        let err = order_placement::place_order(
            &state.orm,
            request(
                restaurant_id,
                owner.user_id,
                vec![line(soup, 1), line(missing, 1)],
            ),
        )
        .await
        .expect_err("unknown item must reject the order");
        assert!(matches!(
            err,
            PlacementError::InvalidLineItem {
                line: 2,
                issue: LineItemIssue::UnknownMenuItem,
                ..
            }
        ));
    }

    assert_eq!(count_orders(&state, restaurant_id).await?, 0);
    assert_eq!(count_order_items(&state, restaurant_id).await?, 0);
    Ok(())
}

#[tokio::test]
async fn zero_or_negative_quantity_writes_nothing() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let owner = create_user(&state, UserRole::Customer).await?;
    let restaurant_id = create_restaurant(&state, &owner).await?;
    let soup = create_menu_item(&state, restaurant_id, "Soup", 1000, true).await?;

    for quantity in [0, -3] {
        let err = order_placement::place_order(
            &state.orm,
            request(restaurant_id, owner.user_id, vec![line(soup, quantity)]),
        )
        .await
        .expect_err("non-positive quantity must be rejected");
        match err {
            PlacementError::InvalidLineItem { line, issue, .. } => {
                assert_eq!(line, 1);
                assert_eq!(issue, LineItemIssue::NonPositiveQuantity(quantity));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(count_orders(&state, restaurant_id).await?, 0);
    Ok(())
}

#[tokio::test]
async fn empty_order_is_rejected() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let owner = create_user(&state, UserRole::Customer).await?;
    let restaurant_id = create_restaurant(&state, &owner).await?;

    let err = order_placement::place_order(
        &state.orm,
        request(restaurant_id, owner.user_id, Vec::new()),
    )
    .await
    .expect_err("empty order must be rejected");
    assert!(matches!(err, PlacementError::EmptyItemList));
    assert_eq!(count_orders(&state, restaurant_id).await?, 0);
    Ok(())
}

#[tokio::test]
async fn table_must_belong_to_restaurant() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let owner = create_user(&state, UserRole::Customer).await?;
    let restaurant_id = create_restaurant(&state, &owner).await?;
    let other_restaurant = create_restaurant(&state, &owner).await?;
    let soup = create_menu_item(&state, restaurant_id, "Soup", 1000, true).await?;
    let own_table = create_table(&state, restaurant_id, 1).await?;
    let foreign_table = create_table(&state, other_restaurant, 1).await?;

    let mut foreign = request(restaurant_id, owner.user_id, vec![line(soup, 1)]);
    foreign.table_id = Some(foreign_table);
    let err = order_placement::place_order(&state.orm, foreign)
        .await
        .expect_err("foreign table must be rejected");
    assert!(matches!(err, PlacementError::TableMismatch(id) if id == foreign_table));
    assert_eq!(count_orders(&state, restaurant_id).await?, 0);

    let mut own = request(restaurant_id, owner.user_id, vec![line(soup, 1)]);
    own.table_id = Some(own_table);
    let placed = order_placement::place_order(&state.orm, own).await?;
    assert_eq!(placed.order.table_id, Some(own_table));
    Ok(())
}

#[tokio::test]
async fn later_price_change_keeps_snapshot() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let owner = create_user(&state, UserRole::Customer).await?;
    let restaurant_id = create_restaurant(&state, &owner).await?;
    let soup = create_menu_item(&state, restaurant_id, "Soup", 1000, true).await?;
    let table_id = create_table(&state, restaurant_id, 7).await?;

    let placed = order_service::place_order(
        &state,
        &owner,
        restaurant_id,
        PlaceOrderRequest {
            table_id: Some(table_id),
            notes: Some("no croutons".into()),
            items: vec![line(soup, 2)],
        },
    )
    .await?
    .data
    .ok_or_else(|| anyhow::anyhow!("missing data"))?;

    menu_service::update_menu_item(
        &state,
        &owner,
        restaurant_id,
        soup,
        UpdateMenuItemRequest {
            name: None,
            description: None,
            price: Some(1500),
            category: None,
            image_url: None,
            is_available: None,
            allergens: None,
            modifiers: None,
        },
    )
    .await?;

    let detail = order_service::get_order(&state, &owner, restaurant_id, placed.order.id)
        .await?
        .data
        .ok_or_else(|| anyhow::anyhow!("missing data"))?;

    assert_eq!(detail.order.total, 2000);
    assert_eq!(detail.subtotal, 2000);
    assert_eq!(detail.items[0].price_at_order, 1000);
    assert_eq!(detail.table_number, Some(7));
    assert_eq!(detail.placed_by_email, Some(user_email(&state, &owner).await?));
    Ok(())
}

#[tokio::test]
async fn concurrent_placements_are_independent() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let owner = create_user(&state, UserRole::Customer).await?;
    let restaurant_id = create_restaurant(&state, &owner).await?;
    let soup = create_menu_item(&state, restaurant_id, "Soup", 1000, true).await?;
    let pasta = create_menu_item(&state, restaurant_id, "Pasta", 1200, true).await?;

    let mut handles = Vec::new();
    for n in 1..=8 {
        let orm = state.orm.clone();
        let items = vec![line(soup, n), line(pasta, 1)];
        let req = request(restaurant_id, owner.user_id, items);
        handles.push(tokio::spawn(async move {
            order_placement::place_order(&orm, req).await
        }));
    }

    for (idx, handle) in handles.into_iter().enumerate() {
        let placed = handle.await??;
        let n = (idx + 1) as i64;
        assert_eq!(placed.order.total, n * 1000 + 1200);
        assert_eq!(placed.items.len(), 2);
    }

    assert_eq!(count_orders(&state, restaurant_id).await?, 8);
    assert_eq!(count_order_items(&state, restaurant_id).await?, 16);
    Ok(())
}

#[tokio::test]
async fn only_order_placers_may_place() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let owner = create_user(&state, UserRole::Customer).await?;
    let stranger = create_user(&state, UserRole::Customer).await?;
    let restaurant_id = create_restaurant(&state, &owner).await?;
    let soup = create_menu_item(&state, restaurant_id, "Soup", 1000, true).await?;

    let err = order_service::place_order(
        &state,
        &stranger,
        restaurant_id,
        PlaceOrderRequest {
            table_id: None,
            notes: None,
            items: vec![line(soup, 1)],
        },
    )
    .await
    .expect_err("non-member must be refused");
    assert!(matches!(err, AppError::Forbidden));
    assert_eq!(count_orders(&state, restaurant_id).await?, 0);
    Ok(())
}

#[tokio::test]
async fn total_overflow_rolls_back() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let owner = create_user(&state, UserRole::Customer).await?;
    let restaurant_id = create_restaurant(&state, &owner).await?;
    let caviar =
        create_menu_item(&state, restaurant_id, "Caviar", i64::MAX / 2 + 1, true).await?;

    let err = order_placement::place_order(
        &state.orm,
        request(
            restaurant_id,
            owner.user_id,
            vec![line(caviar, 1), line(caviar, 1)],
        ),
    )
    .await
    .expect_err("overflowing total must be rejected");

    match err {
        PlacementError::InvalidLineItem {
            line,
            menu_item_id,
            issue,
        } => {
            assert_eq!(line, 2);
            assert_eq!(menu_item_id, caviar);
            assert_eq!(issue, LineItemIssue::TotalOverflow);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert_eq!(count_orders(&state, restaurant_id).await?, 0);
    assert_eq!(count_order_items(&state, restaurant_id).await?, 0);
    Ok(())
}

#[tokio::test]
async fn store_failure_inside_transaction_leaves_no_rows() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let owner = create_user(&state, UserRole::Customer).await?;
    let restaurant_id = create_restaurant(&state, &owner).await?;
    let soup = create_menu_item(&state, restaurant_id, "Soup", 1000, true).await?;
    let table_id = create_table(&state, restaurant_id, 9).await?;

    // The table check succeeds inside the transaction; the order insert then
    // violates the placed_by_user_id foreign key.
    let mut req = request(restaurant_id, Uuid::new_v4(), vec![line(soup, 1)]);
    req.table_id = Some(table_id);

    let err = order_placement::place_order(&state.orm, req)
        .await
        .expect_err("unknown placing user must fail in the store");
    assert!(matches!(err, PlacementError::TransactionFailure(_)));
    assert_eq!(
        AppError::from(err).status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );

    assert_eq!(count_orders(&state, restaurant_id).await?, 0);
    assert_eq!(count_order_items(&state, restaurant_id).await?, 0);

    // The pool is still usable after the rollback.
    let placed = order_placement::place_order(
        &state.orm,
        request(restaurant_id, owner.user_id, vec![line(soup, 1)]),
    )
    .await?;
    assert_eq!(placed.order.total, 1000);
    Ok(())
}
