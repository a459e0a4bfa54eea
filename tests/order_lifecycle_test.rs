mod common;

use common::{pending_order, seed_two_booths, test_context};
use foodcourt_core::domain::{OrderStatus, PaymentMethod, PaymentStatus};
use foodcourt_core::services::{CreateOrderInput, CreateOrderItem, OrderError};
use foodcourt_core::validation::ITEM_QUANTITY_MAX;

fn item(menu_id: i64, quantity: i32) -> CreateOrderItem {
    CreateOrderItem {
        menu_id,
        quantity,
        notes: String::new(),
    }
}

fn checkout(method: PaymentMethod, items: Vec<CreateOrderItem>) -> CreateOrderInput {
    CreateOrderInput {
        customer_name: "Budi Santoso".to_string(),
        table_number: "A1".to_string(),
        payment_method: method,
        items,
    }
}

#[tokio::test]
async fn test_create_order_totals_price_at_purchase() {
    let ctx = test_context();
    seed_two_booths(&ctx);

    let output = ctx
        .state
        .orders
        .create_order(checkout(PaymentMethod::Qris, vec![item(1, 2), item(5, 1)]))
        .await
        .unwrap();

    assert_eq!(output.total_amount, 65000);
    assert!(output.order_code.starts_with("ORD-"));

    let order = ctx.orders.get(&output.order_code).unwrap();
    assert_eq!(order.total_amount, 65000);
    assert_eq!(order.items_total(), 65000);
    assert_eq!(order.payment_status, PaymentStatus::Pending);
    assert_eq!(order.order_status, OrderStatus::Pending);
}

#[tokio::test]
async fn test_total_is_frozen_after_price_change() {
    let ctx = test_context();
    seed_two_booths(&ctx);

    let output = ctx
        .state
        .orders
        .create_order(checkout(PaymentMethod::Cash, vec![item(1, 2)]))
        .await
        .unwrap();
    ctx.catalog.set_menu_price(1, 99000);

    let order = ctx.state.orders.get_order_by_code(&output.order_code).await.unwrap();
    assert_eq!(order.total_amount, 50000);
    assert_eq!(order.items[0].price_at_purchase, 25000);
}

#[tokio::test]
async fn test_online_payment_issues_invoice() {
    let ctx = test_context();
    seed_two_booths(&ctx);

    let output = ctx
        .state
        .orders
        .create_order(checkout(PaymentMethod::Qris, vec![item(1, 1)]))
        .await
        .unwrap();

    let requests = ctx.payments.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.external_id, output.order_code);
    assert_eq!(request.amount, 25000);
    assert_eq!(
        request.description,
        format!("Pembayaran Order {} - Budi Santoso", output.order_code)
    );
    assert_eq!(
        request.success_redirect_url,
        format!("https://foodcourt.test/order/success/{}", output.order_code)
    );
    assert_eq!(request.failure_redirect_url, "https://foodcourt.test/cart");

    let expected_url = format!("https://checkout.test/{}", output.order_code);
    assert_eq!(output.payment_url.as_deref(), Some(expected_url.as_str()));

    let order = ctx.orders.get(&output.order_code).unwrap();
    assert_eq!(order.invoice_url.as_deref(), Some(expected_url.as_str()));
    assert_eq!(order.invoice_id, Some(format!("inv-{}", output.order_code)));
}

#[tokio::test]
async fn test_cash_order_never_calls_payment_gateway() {
    let ctx = test_context();
    seed_two_booths(&ctx);

    let output = ctx
        .state
        .orders
        .create_order(checkout(PaymentMethod::Cash, vec![item(5, 3)]))
        .await
        .unwrap();

    assert!(output.payment_url.is_none());
    assert!(ctx.payments.requests().is_empty());
}

#[tokio::test]
async fn test_invoice_failure_leaves_order_pending() {
    let ctx = test_context();
    seed_two_booths(&ctx);
    ctx.payments.fail.store(true, std::sync::atomic::Ordering::SeqCst);

    let err = ctx
        .state
        .orders
        .create_order(checkout(PaymentMethod::Qris, vec![item(1, 1)]))
        .await
        .unwrap_err();

    let OrderError::InvoiceIssuanceFailed { order_code, .. } = err else {
        panic!("expected InvoiceIssuanceFailed, got {:?}", err);
    };
    let order = ctx.orders.get(&order_code).expect("order must be kept");
    assert_eq!(order.order_status, OrderStatus::Pending);
    assert!(order.invoice_url.is_none());
}

#[tokio::test]
async fn test_unavailable_menu_is_rejected_without_persisting() {
    let ctx = test_context();
    let (nasi, _) = seed_two_booths(&ctx);
    ctx.catalog.add_menu(7, &nasi, "Rendang", 35000, false);

    let err = ctx
        .state
        .orders
        .create_order(checkout(PaymentMethod::Cash, vec![item(1, 1), item(7, 1)]))
        .await
        .unwrap_err();

    assert!(matches!(err, OrderError::MenuUnavailable(ref name) if name == "Rendang"));
    assert_eq!(ctx.orders.count(), 0);
}

#[tokio::test]
async fn test_closed_booth_is_rejected() {
    let ctx = test_context();
    let closed = ctx.catalog.add_booth("Sate Pak Kumis", "0812-3333-0003", false);
    ctx.catalog.add_menu(9, &closed, "Sate Ayam", 30000, true);

    let err = ctx
        .state
        .orders
        .create_order(checkout(PaymentMethod::Cash, vec![item(9, 1)]))
        .await
        .unwrap_err();

    assert!(matches!(err, OrderError::BoothClosed(ref name) if name == "Sate Pak Kumis"));
    assert_eq!(ctx.orders.count(), 0);
}

#[tokio::test]
async fn test_unknown_menu_and_bad_input() {
    let ctx = test_context();
    seed_two_booths(&ctx);

    let err = ctx
        .state
        .orders
        .create_order(checkout(PaymentMethod::Cash, vec![item(404, 1)]))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::MenuNotFound(404)));

    let err = ctx
        .state
        .orders
        .create_order(checkout(PaymentMethod::Cash, vec![]))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::EmptyOrder));

    let err = ctx
        .state
        .orders
        .create_order(checkout(PaymentMethod::Cash, vec![item(1, 0)]))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::InvalidQuantity { menu_id: 1 }));

    let err = ctx
        .state
        .orders
        .create_order(checkout(
            PaymentMethod::Cash,
            vec![item(1, 1), item(5, ITEM_QUANTITY_MAX + 1)],
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::InvalidQuantity { menu_id: 5 }));

    let mut blank_name = checkout(PaymentMethod::Cash, vec![item(1, 1)]);
    blank_name.customer_name = "   ".to_string();
    let err = ctx.state.orders.create_order(blank_name).await.unwrap_err();
    assert!(matches!(err, OrderError::Validation(_)));
}

#[tokio::test]
async fn test_completed_order_cannot_go_back_to_pending() {
    let ctx = test_context();
    ctx.orders.insert(pending_order("ORD-X", PaymentMethod::Cash));

    ctx.state
        .orders
        .update_order_status("ORD-X", "completed")
        .await
        .unwrap();
    let err = ctx
        .state
        .orders
        .update_order_status("ORD-X", "pending")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        OrderError::OrderFinal {
            status: OrderStatus::Completed,
            ..
        }
    ));
}

#[tokio::test]
async fn test_final_states_reject_every_target() {
    let ctx = test_context();
    ctx.orders.insert(pending_order("ORD-DONE", PaymentMethod::Qris));
    ctx.orders.insert(pending_order("ORD-VOID", PaymentMethod::Qris));
    ctx.state.orders.update_order_status("ORD-DONE", "completed").await.unwrap();
    ctx.state.orders.update_order_status("ORD-VOID", "cancelled").await.unwrap();

    for code in ["ORD-DONE", "ORD-VOID"] {
        for target in OrderStatus::ALL {
            let result = ctx.state.orders.update_order_status(code, target.as_str()).await;
            assert!(
                matches!(result, Err(OrderError::OrderFinal { .. })),
                "{} -> {} should be refused",
                code,
                target
            );
        }
    }
}

#[tokio::test]
async fn test_admin_change_rejected_when_cancelled_concurrently() {
    let ctx = test_context();
    ctx.orders.insert(pending_order("ORD-RACE0002", PaymentMethod::Cash));
    *ctx.orders.interleaved_status.lock().unwrap() = Some(OrderStatus::Cancelled);

    let err = ctx
        .state
        .orders
        .update_order_status("ORD-RACE0002", "completed")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        OrderError::OrderFinal {
            status: OrderStatus::Cancelled,
            ..
        }
    ));
    let order = ctx.orders.get("ORD-RACE0002").unwrap();
    assert_eq!(order.order_status, OrderStatus::Cancelled);
    assert_eq!(order.payment_status, PaymentStatus::Pending);
}

#[tokio::test]
async fn test_cash_fulfilment_marks_paid_idempotently() {
    let ctx = test_context();
    ctx.orders.insert(pending_order("ORD-CASH", PaymentMethod::Cash));

    for target in ["confirmed", "preparing", "ready", "ready"] {
        let order = ctx
            .state
            .orders
            .update_order_status("ORD-CASH", target)
            .await
            .unwrap();
        assert_eq!(order.payment_status, PaymentStatus::Paid);
    }

    let stored = ctx.orders.get("ORD-CASH").unwrap();
    assert_eq!(stored.payment_status, PaymentStatus::Paid);
    assert_eq!(stored.order_status, OrderStatus::Ready);
}

#[tokio::test]
async fn test_cancel_expires_payment() {
    let ctx = test_context();
    ctx.orders.insert(pending_order("ORD-CANCEL", PaymentMethod::Qris));

    let order = ctx
        .state
        .orders
        .update_order_status("ORD-CANCEL", "cancelled")
        .await
        .unwrap();

    assert_eq!(order.payment_status, PaymentStatus::Expired);
    assert_eq!(ctx.orders.get("ORD-CANCEL").unwrap().payment_status, PaymentStatus::Expired);
}

#[tokio::test]
async fn test_online_order_payment_untouched_by_fulfilment() {
    let ctx = test_context();
    ctx.orders.insert(pending_order("ORD-QRIS", PaymentMethod::Qris));

    let order = ctx
        .state
        .orders
        .update_order_status("ORD-QRIS", "preparing")
        .await
        .unwrap();

    assert_eq!(order.payment_status, PaymentStatus::Pending);
    assert_eq!(order.order_status, OrderStatus::Preparing);
}

#[tokio::test]
async fn test_invalid_status_and_missing_order() {
    let ctx = test_context();
    ctx.orders.insert(pending_order("ORD-A", PaymentMethod::Cash));

    let err = ctx
        .state
        .orders
        .update_order_status("ORD-A", "shipped")
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::InvalidStatus(ref s) if s == "shipped"));

    let err = ctx
        .state
        .orders
        .update_order_status("ORD-NOPE", "ready")
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::OrderNotFound(_)));
}

#[tokio::test]
async fn test_list_orders_filters_and_paginates() {
    let ctx = test_context();
    for i in 0..12 {
        ctx.orders
            .insert(pending_order(&format!("ORD-{:08}", i), PaymentMethod::Cash));
    }
    ctx.state
        .orders
        .update_order_status("ORD-00000003", "ready")
        .await
        .unwrap();

    let first = ctx.state.orders.list_orders(None, None, None).await.unwrap();
    assert_eq!(first.total, 12);
    assert_eq!(first.items.len(), 10);
    assert_eq!(first.page, 1);

    let second = ctx.state.orders.list_orders(Some(2), None, None).await.unwrap();
    assert_eq!(second.items.len(), 2);

    let ready = ctx
        .state
        .orders
        .list_orders(None, None, Some("ready"))
        .await
        .unwrap();
    assert_eq!(ready.total, 1);
    assert_eq!(ready.items[0].order_code, "ORD-00000003");

    let err = ctx
        .state
        .orders
        .list_orders(None, None, Some("lost"))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::InvalidStatus(_)));
}
