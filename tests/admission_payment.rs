mod common;

use axum::http::StatusCode;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::Portal;

fn asha() -> serde_json::Value {
    json!({
        "name": "Asha Verma",
        "email": "asha@example.com",
        "phone": "9876543210",
        "class": "Class 4"
    })
}

#[tokio::test]
async fn already_registered_email_is_rejected_without_navigation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/student/status/a@b.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "registered": true })))
        .expect(1)
        .mount(&server)
        .await;

    let mut portal = Portal::new(&server);
    let mut form = asha();
    form["email"] = json!("a@b.com");

    let reply = portal.post("/admission", form).await;
    assert_eq!(reply.status, StatusCode::CONFLICT);
    assert_eq!(reply.body["message"], "This email is already registered!");
    assert_eq!(reply.body["success"], false);
    assert!(reply.body.get("redirect").is_none());
    // nothing was stored, so no session was started
    assert!(reply.set_cookie.is_none());
}

#[tokio::test]
async fn incomplete_admission_never_reaches_backend() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut portal = Portal::new(&server);
    let mut form = asha();
    form["phone"] = json!("  ");

    let reply = portal.post("/admission", form).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["message"], "Please enter all student details.");
}

#[tokio::test]
async fn admission_to_registration_payment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/student/status/asha@example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "registered": false })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/payment/create-order"))
        .and(body_partial_json(json!({
            "email": "asha@example.com",
            "class": "Class 4",
            "type": "registration"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "order": { "id": "order_reg_1", "amount": 20000, "currency": "INR" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut portal = Portal::new(&server);

    let reply = portal.post("/admission", asha()).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["redirect"], "/registration-payment");

    let page = portal.get("/registration-payment").await;
    assert_eq!(page.body["draft"]["name"], "Asha Verma");
    assert_eq!(page.body["fee"], 200);

    let checkout = portal.post("/registration-payment/pay", json!({})).await;
    assert_eq!(checkout.status, StatusCode::OK);
    assert_eq!(checkout.body["order_id"], "order_reg_1");
    assert_eq!(checkout.body["key"], "rzp_test_key");
    assert_eq!(checkout.body["name"], "Sanjeevni Pathshala");
    assert_eq!(checkout.body["description"], "Registration Fee");
    assert_eq!(checkout.body["prefill"]["contact"], "9876543210");
    assert_eq!(checkout.body["theme"]["color"], "#ec4899");

    let state = portal.get("/payment/state").await;
    assert_eq!(state.body["state"], "checkoutOpen");

    let done = portal.post("/payment/complete", json!({ "orderId": "order_reg_1" })).await;
    assert_eq!(done.status, StatusCode::OK);
    assert_eq!(done.body["feeType"], "registration");

    // the draft is gone once paid, and the callback cannot fire twice
    let replay = portal.post("/payment/complete", json!({ "orderId": "order_reg_1" })).await;
    assert_eq!(replay.status, StatusCode::CONFLICT);
    let page = portal.get("/registration-payment").await;
    assert!(page.body["draft"].is_null());
    assert_eq!(page.body["redirect"], "/admission");
}

#[tokio::test]
async fn edit_admission_prefills_the_form_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/student/status/asha@example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "registered": false })))
        .mount(&server)
        .await;

    let mut portal = Portal::new(&server);
    portal.post("/admission", asha()).await;

    let fresh = portal.get("/admission").await;
    assert!(fresh.body["draft"].is_null());

    let edit = portal.post("/registration-payment/edit", json!({})).await;
    assert_eq!(edit.body["redirect"], "/admission");

    let form = portal.get("/admission").await;
    assert_eq!(form.body["draft"]["email"], "asha@example.com");
    let again = portal.get("/admission").await;
    assert!(again.body["draft"].is_null());
}

#[tokio::test]
async fn order_failure_surfaces_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/student/status/asha@example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "registered": false })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/payment/create-order"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "message": "Gateway unavailable" })),
        )
        .mount(&server)
        .await;

    let mut portal = Portal::new(&server);
    portal.post("/admission", asha()).await;

    let reply = portal.post("/registration-payment/pay", json!({})).await;
    assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(reply.body["message"], "Gateway unavailable");

    let state = portal.get("/payment/state").await;
    assert_eq!(state.body["state"], "failed");
}

#[tokio::test]
async fn monthly_payment_blocked_when_paid_this_month() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/student/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "registered": true,
            "student": {
                "_id": "s1",
                "name": "Asha Verma",
                "email": "asha@example.com",
                "phone": "9876543210",
                "class": "Class 4",
                "monthlyPayments": [
                    { "amount": 150, "date": "2026-10-02T06:00:00Z" }
                ]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/payment/create-order"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut portal = Portal::new(&server);
    portal.get("/payment/monthly").await;

    let reply = portal.post("/payment/monthly/pay", asha()).await;
    assert_eq!(reply.status, StatusCode::CONFLICT);
    assert_eq!(reply.body["message"], "You have already paid this month's fee.");

    let state = portal.get("/payment/state").await;
    assert_eq!(state.body["state"], "failed");
}

#[tokio::test]
async fn monthly_payment_for_unregistered_student() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/student/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "registered": false })))
        .mount(&server)
        .await;

    let mut portal = Portal::new(&server);
    let reply = portal.post("/payment/monthly/pay", asha()).await;
    assert_eq!(reply.status, StatusCode::CONFLICT);
    assert_eq!(reply.body["message"], "Please complete registration first.");
}

#[tokio::test]
async fn monthly_fee_quote_follows_tiers() {
    let server = MockServer::start().await;
    let mut portal = Portal::new(&server);

    let quote = portal.get("/payment/monthly/fee?class=Class%209").await;
    assert_eq!(quote.body["monthlyFee"], 250);
    let quote = portal.get("/payment/monthly/fee?class=Class%2011").await;
    assert_eq!(quote.body["monthlyFee"], 0);
}

#[tokio::test]
async fn backend_down_is_a_generic_server_error() {
    let mut portal = Portal::at(&common::dead_backend_url());

    let reply = portal.post("/admission", asha()).await;
    assert_eq!(reply.status, StatusCode::BAD_GATEWAY);
    assert_eq!(reply.body["message"], "Server error");
}

#[tokio::test]
async fn page_mounts_and_health_checks_start_no_session() {
    let server = MockServer::start().await;
    let mut portal = Portal::new(&server);

    for _ in 0..20 {
        let health = portal.get("/health").await;
        assert_eq!(health.status, StatusCode::OK);
        assert!(health.set_cookie.is_none());
    }
    let health = portal.get("/health").await;
    assert_eq!(health.body["status"], "healthy");
    assert!(health.body.get("clients").is_none());

    for uri in ["/admission", "/registration-payment", "/payment/monthly", "/forgot-password"] {
        let reply = portal.get(uri).await;
        assert_eq!(reply.status, StatusCode::OK, "{}", uri);
        assert!(reply.set_cookie.is_none(), "{} started a session", uri);
    }
    assert!(portal.cookie.is_none());
}

#[tokio::test]
async fn a_draft_starts_the_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/student/status/asha@example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "registered": false })))
        .mount(&server)
        .await;

    let mut portal = Portal::new(&server);
    let reply = portal.post("/admission", asha()).await;
    assert_eq!(reply.status, StatusCode::OK);
    let cookie = reply.set_cookie.expect("session cookie");
    assert!(cookie.starts_with("pathshala.sid="));

    let page = portal.get("/registration-payment").await;
    assert_eq!(page.body["draft"]["email"], "asha@example.com");
}

