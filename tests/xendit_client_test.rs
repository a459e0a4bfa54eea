use mockito::{Matcher, Server};
use serde_json::json;

use foodcourt_core::payment::{InvoiceRequest, PaymentError, XenditClient};
use foodcourt_core::ports::PaymentGateway;

fn invoice_request(code: &str) -> InvoiceRequest {
    InvoiceRequest {
        external_id: code.to_string(),
        amount: 65000,
        description: format!("Pembayaran Order {} - Budi", code),
        success_redirect_url: format!("https://foodcourt.test/order/success/{}", code),
        failure_redirect_url: "https://foodcourt.test/cart".to_string(),
    }
}

#[tokio::test]
async fn test_create_invoice_sends_order_reference() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v2/invoices")
        .match_header("authorization", Matcher::Regex("^Basic ".to_string()))
        .match_body(Matcher::PartialJson(json!({
            "external_id": "ORD-XND00001",
            "amount": 65000,
            "currency": "IDR",
            "success_redirect_url": "https://foodcourt.test/order/success/ORD-XND00001",
            "failure_redirect_url": "https://foodcourt.test/cart"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "id": "inv_123",
                "invoice_url": "https://checkout.xendit.co/web/inv_123",
                "status": "PENDING"
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = XenditClient::new(server.url(), "xnd_development_key".to_string());
    let invoice = client
        .create_invoice(&invoice_request("ORD-XND00001"))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(invoice.id, "inv_123");
    assert_eq!(invoice.invoice_url, "https://checkout.xendit.co/web/inv_123");
}

#[tokio::test]
async fn test_gateway_rejection_carries_status() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/v2/invoices")
        .with_status(400)
        .with_body(r#"{"error_code":"API_VALIDATION_ERROR"}"#)
        .create_async()
        .await;

    let client = XenditClient::new(server.url(), "xnd_development_key".to_string());
    let err = client
        .create_invoice(&invoice_request("ORD-XND00002"))
        .await
        .unwrap_err();

    match err {
        PaymentError::Rejected { status, body } => {
            assert_eq!(status, 400);
            assert!(body.contains("API_VALIDATION_ERROR"));
        }
        other => panic!("expected rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_invoice_response() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/v2/invoices")
        .with_status(200)
        .with_body(r#"{"unexpected":true}"#)
        .create_async()
        .await;

    let client = XenditClient::new(server.url(), "xnd_development_key".to_string());
    let err = client
        .create_invoice(&invoice_request("ORD-XND00003"))
        .await
        .unwrap_err();

    assert!(matches!(err, PaymentError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_circuit_opens_after_consecutive_failures() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v2/invoices")
        .with_status(503)
        .expect(2)
        .create_async()
        .await;

    let client = XenditClient::with_circuit_breaker(
        server.url(),
        "xnd_development_key".to_string(),
        2,
        60,
    );
    assert_eq!(client.circuit_state(), "closed");

    for _ in 0..2 {
        let err = client
            .create_invoice(&invoice_request("ORD-XND00004"))
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::Rejected { status: 503, .. }));
    }

    let err = client
        .create_invoice(&invoice_request("ORD-XND00004"))
        .await
        .unwrap_err();
    assert!(matches!(err, PaymentError::CircuitBreakerOpen(_)));
    assert_eq!(client.circuit_state(), "open");
    mock.assert_async().await;
}
