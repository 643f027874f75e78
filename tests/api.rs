//! End-to-end API tests against the in-memory database
//!
//! Every test builds a fresh app, registers users through the real signup
//! endpoint and drives the HTTP surface with `tower::ServiceExt::oneshot`.

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use erp_server::api::build_app;
use erp_server::core::{Config, ServerState};

async fn test_app() -> Router {
    let mut config = Config::with_overrides("unused-in-memory", 0);
    config.admin_email = None;
    config.admin_password = None;
    let state = ServerState::initialize_in_memory(&config)
        .await
        .expect("in-memory state");
    build_app(state)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.expect("request");
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// Register a user through the API and return their token
async fn signup(app: &Router, name: &str, email: &str, role: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({
            "name": name,
            "email": email,
            "password": "secret-pass",
            "role": role,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "signup failed: {body}");
    body["token"].as_str().expect("token").to_string()
}

fn id_of(body: &Value) -> String {
    body["id"].as_str().expect("record id").to_string()
}

// ========== Auth ==========

#[tokio::test]
async fn health_is_public() {
    let app = test_app().await;
    let (status, body) = send(&app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let app = test_app().await;
    let (status, body) = send(&app, "GET", "/api/customers", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "NO_AUTH_HEADER");
}

#[tokio::test]
async fn signin_round_trip() {
    let app = test_app().await;
    signup(&app, "Ada", "ada@example.com", "admin").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/signin",
        None,
        Some(json!({ "email": "ada@example.com", "password": "secret-pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();
    assert_eq!(body["user"]["email"], "ada@example.com");

    let (status, me) = send(&app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "ada@example.com");

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/signin",
        None,
        Some(json!({ "email": "ada@example.com", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn signup_rejects_duplicate_email() {
    let app = test_app().await;
    signup(&app, "Ada", "ada@example.com", "support").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({
            "name": "Imposter",
            "email": "ada@example.com",
            "password": "secret-pass",
            "role": "support",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "DUPLICATE");
}

#[tokio::test]
async fn refresh_reissues_a_token() {
    let app = test_app().await;
    let token = signup(&app, "Ada", "ada@example.com", "admin").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/refresh",
        None,
        Some(json!({ "token": token })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().is_some());

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/refresh",
        None,
        Some(json!({ "token": "not-a-jwt" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_TOKEN");
}

// ========== Authorization ==========

#[tokio::test]
async fn allow_lists_gate_writes_by_role() {
    let app = test_app().await;
    let support = signup(&app, "Sam", "sam@example.com", "support").await;

    // Support can read customers but not create them
    let (status, _) = send(&app, "GET", "/api/customers", Some(&support), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "POST",
        "/api/customers",
        Some(&support),
        Some(json!({ "name": "Acme", "email": "acme@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "INSUFFICIENT_PERMISSIONS");

    // HR routes are closed to support entirely
    let (status, _) = send(&app, "GET", "/api/hr/employees", Some(&support), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // User administration is admin-only
    let (status, _) = send(&app, "GET", "/api/users", Some(&support), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// ========== Customers ==========

#[tokio::test]
async fn customer_create_read_and_duplicate() {
    let app = test_app().await;
    let admin = signup(&app, "Ada", "ada@example.com", "admin").await;

    let (status, created) = send(
        &app,
        "POST",
        "/api/customers",
        Some(&admin),
        Some(json!({ "name": "Acme", "email": "acme@example.com", "customer_type": "business" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create failed: {created}");
    let id = id_of(&created);

    let (status, fetched) = send(
        &app,
        "GET",
        &format!("/api/customers/{id}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["email"], "acme@example.com");

    let (status, body) = send(
        &app,
        "POST",
        "/api/customers",
        Some(&admin),
        Some(json!({ "name": "Acme Again", "email": "acme@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "DUPLICATE");
}

// ========== Leads ==========

#[tokio::test]
async fn lead_conversion_happens_at_most_once() {
    let app = test_app().await;
    let admin = signup(&app, "Ada", "ada@example.com", "admin").await;

    let (status, lead) = send(
        &app,
        "POST",
        "/api/leads",
        Some(&admin),
        Some(json!({
            "name": "Lena Lead",
            "email": "lena@example.com",
            "company": "Widgets Ltd",
            "source": "referral",
            "estimated_value": 5000.0,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "lead create failed: {lead}");
    let id = id_of(&lead);

    let (status, converted) = send(
        &app,
        "PUT",
        &format!("/api/leads/{id}/convert"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "convert failed: {converted}");
    assert_eq!(converted["lead"]["status"], "converted");
    assert_eq!(converted["customer"]["email"], "lena@example.com");
    // A lead with a company becomes a business customer
    assert_eq!(converted["customer"]["customer_type"], "business");

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/leads/{id}/convert"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "BUSINESS_RULE");
}

#[tokio::test]
async fn lead_conversion_clears_assignment() {
    let app = test_app().await;
    let admin = signup(&app, "Ada", "ada@example.com", "admin").await;

    let (status, me) = send(&app, "GET", "/api/auth/me", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let admin_id = id_of(&me);

    let (status, lead) = send(
        &app,
        "POST",
        "/api/leads",
        Some(&admin),
        Some(json!({
            "name": "Owen Owned",
            "email": "owen@example.com",
            "assigned_to": admin_id,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "lead create failed: {lead}");
    assert!(lead["assigned_to"].is_string());
    let id = id_of(&lead);

    let (status, converted) = send(
        &app,
        "PUT",
        &format!("/api/leads/{id}/convert"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "convert failed: {converted}");
    // The converted lead is unassigned; the customer inherits the assignment
    assert!(converted["lead"].get("assigned_to").is_none());
    assert_eq!(converted["customer"]["assigned_to"], json!(admin_id));

    let (status, fetched) =
        send(&app, "GET", &format!("/api/leads/{id}"), Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(fetched.get("assigned_to").is_none());
}

// ========== Invoices ==========

async fn create_invoice(app: &Router, token: &str) -> Value {
    let (status, invoice) = send(
        app,
        "POST",
        "/api/sales/invoices",
        Some(token),
        Some(json!({
            "status": "sent",
            "items": [
                { "description": "Consulting", "quantity": 2, "unit_price": 100.0 }
            ],
            "due_date": "2026-09-30T00:00:00Z",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "invoice create failed: {invoice}");
    invoice
}

#[tokio::test]
async fn invoice_payment_lifecycle() {
    let app = test_app().await;
    let admin = signup(&app, "Ada", "ada@example.com", "admin").await;

    let invoice = create_invoice(&app, &admin).await;
    let id = id_of(&invoice);
    assert_eq!(invoice["total_amount"], 200.0);
    assert_eq!(invoice["balance"], 200.0);
    assert_eq!(invoice["version"], 1);

    // Partial payment
    let (status, paid) = send(
        &app,
        "POST",
        &format!("/api/sales/invoices/{id}/payments"),
        Some(&admin),
        Some(json!({ "amount": 50.0, "method": "cash" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "payment failed: {paid}");
    assert_eq!(paid["status"], "partially_paid");
    assert_eq!(paid["amount_paid"], 50.0);
    assert_eq!(paid["balance"], 150.0);
    assert_eq!(paid["version"], 2);

    // Overpayment is rejected
    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/sales/invoices/{id}/payments"),
        Some(&admin),
        Some(json!({ "amount": 500.0, "method": "cash" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "BUSINESS_RULE");

    // Settling the rest flips the status to paid
    let (status, settled) = send(
        &app,
        "POST",
        &format!("/api/sales/invoices/{id}/payments"),
        Some(&admin),
        Some(json!({ "amount": 150.0, "method": "bank_transfer" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(settled["status"], "paid");
    assert_eq!(settled["balance"], 0.0);

    // Nothing left to pay
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/sales/invoices/{id}/payments"),
        Some(&admin),
        Some(json!({ "amount": 1.0, "method": "cash" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn cancelled_invoices_reject_payments_and_edits() {
    let app = test_app().await;
    let admin = signup(&app, "Ada", "ada@example.com", "admin").await;

    let invoice = create_invoice(&app, &admin).await;
    let id = id_of(&invoice);

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/sales/invoices/{id}"),
        Some(&admin),
        Some(json!({ "status": "cancelled" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/sales/invoices/{id}/payments"),
        Some(&admin),
        Some(json!({ "amount": 10.0, "method": "cash" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "BUSINESS_RULE");

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/sales/invoices/{id}"),
        Some(&admin),
        Some(json!({ "notes": "too late" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn void_invoices_are_terminal() {
    let app = test_app().await;
    let admin = signup(&app, "Ada", "ada@example.com", "admin").await;

    let invoice = create_invoice(&app, &admin).await;
    let id = id_of(&invoice);

    let (status, voided) = send(
        &app,
        "PUT",
        &format!("/api/sales/invoices/{id}"),
        Some(&admin),
        Some(json!({ "status": "void" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "voiding failed: {voided}");
    assert_eq!(voided["status"], "void");

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/sales/invoices/{id}/payments"),
        Some(&admin),
        Some(json!({ "amount": 10.0, "method": "cash" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "BUSINESS_RULE");

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/sales/invoices/{id}"),
        Some(&admin),
        Some(json!({ "status": "sent" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

// ========== Quotations ==========

#[tokio::test]
async fn quotation_accept_is_a_one_way_transition() {
    let app = test_app().await;
    let admin = signup(&app, "Ada", "ada@example.com", "admin").await;

    let (status, quotation) = send(
        &app,
        "POST",
        "/api/quotations",
        Some(&admin),
        Some(json!({
            "status": "sent",
            "items": [
                { "description": "License", "quantity": 1, "unit_price": 999.0 }
            ],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "quotation create failed: {quotation}");
    let id = id_of(&quotation);
    assert_eq!(quotation["total_amount"], 999.0);

    let (status, accepted) = send(
        &app,
        "PUT",
        &format!("/api/quotations/{id}/accept"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(accepted["status"], "accepted");

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/quotations/{id}/accept"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "BUSINESS_RULE");

    // Accepted quotations cannot be edited either
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/quotations/{id}"),
        Some(&admin),
        Some(json!({ "notes": "haggling" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

// ========== Opportunities ==========

#[tokio::test]
async fn won_opportunity_converts_to_an_order_once() {
    let app = test_app().await;
    let admin = signup(&app, "Ada", "ada@example.com", "admin").await;

    let (status, opportunity) = send(
        &app,
        "POST",
        "/api/sales/opportunities",
        Some(&admin),
        Some(json!({
            "name": "Big Deal",
            "stage": "negotiation",
            "amount": 1500.0,
            "probability": 100.0,
            "items": [
                { "name": "Gadget", "quantity": 3, "unit_price": 500.0 }
            ],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create failed: {opportunity}");
    // Probability 100 forces the stage to closed-won
    assert_eq!(opportunity["stage"], "closed-won");
    let id = id_of(&opportunity);

    let (status, order) = send(
        &app,
        "POST",
        &format!("/api/sales/opportunities/{id}/convert-to-order"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "convert failed: {order}");
    assert_eq!(order["order_number"], "SO-00001");
    assert_eq!(order["total_amount"], 1500.0);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/sales/opportunities/{id}/convert-to-order"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "BUSINESS_RULE");
}

#[tokio::test]
async fn open_opportunity_cannot_convert() {
    let app = test_app().await;
    let admin = signup(&app, "Ada", "ada@example.com", "admin").await;

    let (status, opportunity) = send(
        &app,
        "POST",
        "/api/sales/opportunities",
        Some(&admin),
        Some(json!({
            "name": "Early Deal",
            "stage": "proposal",
            "amount": 100.0,
            "probability": 40.0,
            "items": [
                { "name": "Widget", "quantity": 1, "unit_price": 100.0 }
            ],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = id_of(&opportunity);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/sales/opportunities/{id}/convert-to-order"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

// ========== Orders ==========

#[tokio::test]
async fn orders_can_be_created_directly() {
    let app = test_app().await;
    let admin = signup(&app, "Ada", "ada@example.com", "admin").await;

    let (status, order) = send(
        &app,
        "POST",
        "/api/sales/orders",
        Some(&admin),
        Some(json!({
            "items": [
                { "description": "Gizmo", "quantity": 4, "unit_price": 25.0, "tax": 10.0 }
            ],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "order create failed: {order}");
    assert_eq!(order["order_number"], "SO-00001");
    assert_eq!(order["status"], "pending");
    // 4 x 25 = 100, plus 10% tax
    assert_eq!(order["subtotal"], 100.0);
    assert_eq!(order["total_amount"], 110.0);

    let (status, page) = send(&app, "GET", "/api/sales/orders", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);
}

// ========== HR ==========

async fn create_employee(app: &Router, token: &str, email: &str) -> String {
    let (status, employee) = send(
        app,
        "POST",
        "/api/hr/employees",
        Some(token),
        Some(json!({
            "first_name": "Eve",
            "last_name": "Engineer",
            "email": email,
            "join_date": "2026-01-05",
            "salary": 4200.0,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "employee create failed: {employee}");
    id_of(&employee)
}

#[tokio::test]
async fn attendance_check_in_and_out() {
    let app = test_app().await;
    let hr = signup(&app, "Harper", "hr@example.com", "hr").await;
    let employee = create_employee(&app, &hr, "eve@example.com").await;

    let (status, record) = send(
        &app,
        "POST",
        "/api/hr/attendance/check",
        Some(&hr),
        Some(json!({ "employee": employee, "direction": "in" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "check-in failed: {record}");
    assert!(record["check_in"].is_string());

    // Double clock-in
    let (status, body) = send(
        &app,
        "POST",
        "/api/hr/attendance/check",
        Some(&hr),
        Some(json!({ "employee": employee, "direction": "in" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_REQUEST");

    let (status, closed) = send(
        &app,
        "POST",
        "/api/hr/attendance/check",
        Some(&hr),
        Some(json!({ "employee": employee, "direction": "out" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "check-out failed: {closed}");
    assert!(closed["check_out"].is_string());
    assert!(closed["total_hours"].is_number());

    // Double clock-out
    let (status, _) = send(
        &app,
        "POST",
        "/api/hr/attendance/check",
        Some(&hr),
        Some(json!({ "employee": employee, "direction": "out" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn leave_requests_are_decided_once() {
    let app = test_app().await;
    let hr = signup(&app, "Harper", "hr@example.com", "hr").await;
    let employee = create_employee(&app, &hr, "eve@example.com").await;

    // Backwards date range
    let (status, _) = send(
        &app,
        "POST",
        "/api/hr/leaves",
        Some(&hr),
        Some(json!({
            "employee": employee,
            "leave_type": "casual",
            "start_date": "2026-09-10",
            "end_date": "2026-09-08",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, leave) = send(
        &app,
        "POST",
        "/api/hr/leaves",
        Some(&hr),
        Some(json!({
            "employee": employee,
            "leave_type": "casual",
            "start_date": "2026-09-08",
            "end_date": "2026-09-10",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "leave create failed: {leave}");
    assert_eq!(leave["days"], 3);
    assert_eq!(leave["status"], "pending");
    let id = id_of(&leave);

    let (status, approved) = send(
        &app,
        "PUT",
        &format!("/api/hr/leaves/{id}/status"),
        Some(&hr),
        Some(json!({ "status": "approved" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["status"], "approved");
    assert!(approved["approved_by"].is_string());

    // Already decided
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/hr/leaves/{id}/status"),
        Some(&hr),
        Some(json!({ "status": "rejected" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "BUSINESS_RULE");
}

#[tokio::test]
async fn payroll_derives_overtime_and_net_salary() {
    let app = test_app().await;
    let hr = signup(&app, "Harper", "hr@example.com", "hr").await;
    let employee = create_employee(&app, &hr, "eve@example.com").await;

    let (status, payroll) = send(
        &app,
        "POST",
        "/api/hr/payroll",
        Some(&hr),
        Some(json!({
            "employee": employee,
            "month": 8,
            "year": 2026,
            "basic_salary": 4200.0,
            "allowances": 300.0,
            "deductions": 500.0,
            "overtime_hours": 10.0,
            "overtime_rate": 25.0,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "payroll create failed: {payroll}");
    assert_eq!(payroll["overtime_amount"], 250.0);
    assert_eq!(payroll["net_salary"], 4250.0);
    assert_eq!(payroll["status"], "draft");

    // Same employee and period again
    let (status, body) = send(
        &app,
        "POST",
        "/api/hr/payroll",
        Some(&hr),
        Some(json!({
            "employee": employee,
            "month": 8,
            "year": 2026,
            "basic_salary": 4200.0,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "expected duplicate: {body}");
}

#[tokio::test]
async fn payroll_money_rounds_half_up_at_the_cent() {
    let app = test_app().await;
    let hr = signup(&app, "Harper", "hr@example.com", "hr").await;
    let employee = create_employee(&app, &hr, "eve@example.com").await;

    // 3 x 0.335 = 1.005, a value f64 arithmetic alone would round to 1.00
    let (status, payroll) = send(
        &app,
        "POST",
        "/api/hr/payroll",
        Some(&hr),
        Some(json!({
            "employee": employee,
            "month": 9,
            "year": 2026,
            "basic_salary": 1000.0,
            "overtime_hours": 3.0,
            "overtime_rate": 0.335,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "payroll create failed: {payroll}");
    assert_eq!(payroll["overtime_amount"], 1.01);
    assert_eq!(payroll["net_salary"], 1001.01);
}

// ========== Finance ==========

#[tokio::test]
async fn finance_summary_nets_income_against_expenses() {
    let app = test_app().await;
    let finance = signup(&app, "Fran", "fin@example.com", "finance").await;

    let (status, account) = send(
        &app,
        "POST",
        "/api/finance/accounts",
        Some(&finance),
        Some(json!({ "name": "Sales Revenue", "code": "4000", "account_type": "income" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "account create failed: {account}");
    let account_id = id_of(&account);

    for (kind, amount) in [("income", 1000.0), ("expense", 400.0)] {
        let (status, _) = send(
            &app,
            "POST",
            "/api/finance/transactions",
            Some(&finance),
            Some(json!({
                "transaction_type": kind,
                "amount": amount,
                "account": account_id,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, summary) = send(&app, "GET", "/api/finance/summary", Some(&finance), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["income"]["amount"], 1000.0);
    assert_eq!(summary["expense"]["amount"], 400.0);
    assert_eq!(summary["net"], 600.0);

    let (status, page) = send(
        &app,
        "GET",
        "/api/finance/transactions?type=income",
        Some(&finance),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);
}

// ========== Products ==========

#[tokio::test]
async fn product_sku_is_unique() {
    let app = test_app().await;
    let admin = signup(&app, "Ada", "ada@example.com", "admin").await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/products",
        Some(&admin),
        Some(json!({ "name": "Widget", "sku": "WID-1", "price": 9.99 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "POST",
        "/api/products",
        Some(&admin),
        Some(json!({ "name": "Widget Clone", "sku": "WID-1", "price": 7.99 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "DUPLICATE");
}

// ========== Settings ==========

#[tokio::test]
async fn settings_cover_profile_preferences_and_password() {
    let app = test_app().await;
    let token = signup(&app, "Cleo", "cleo@example.com", "customer").await;

    // Customer-role accounts reach the self-service surface
    let (status, profile) = send(&app, "GET", "/api/settings/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK, "profile read failed: {profile}");
    assert_eq!(profile["email"], "cleo@example.com");
    assert_eq!(profile["notification_preferences"]["email"], true);
    assert_eq!(profile["notification_preferences"]["sms"], false);

    let (status, updated) = send(
        &app,
        "PUT",
        "/api/settings/notifications",
        Some(&token),
        Some(json!({ "email": false, "sms": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["notification_preferences"]["email"], false);
    assert_eq!(updated["notification_preferences"]["sms"], true);

    // Wrong current password
    let (status, body) = send(
        &app,
        "PUT",
        "/api/settings/password",
        Some(&token),
        Some(json!({ "current_password": "wrong", "new_password": "fresh-secret" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_CREDENTIALS");

    let (status, _) = send(
        &app,
        "PUT",
        "/api/settings/password",
        Some(&token),
        Some(json!({ "current_password": "secret-pass", "new_password": "fresh-secret" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Only the new password signs in
    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/signin",
        None,
        Some(json!({ "email": "cleo@example.com", "password": "secret-pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/signin",
        None,
        Some(json!({ "email": "cleo@example.com", "password": "fresh-secret" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

// ========== Dashboard ==========

#[tokio::test]
async fn dashboard_aggregates_are_zero_on_an_empty_system() {
    let app = test_app().await;
    let admin = signup(&app, "Ada", "ada@example.com", "admin").await;

    let (status, dashboard) =
        send(&app, "GET", "/api/sales/dashboard", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK, "dashboard failed: {dashboard}");
    assert_eq!(dashboard["ytd_revenue"], 0.0);
    assert_eq!(dashboard["ytd_orders"], 0);
    assert_eq!(dashboard["pending_orders"], 0);
    assert_eq!(dashboard["conversion_rate"], 0.0);
    assert_eq!(dashboard["outstanding_invoices"], 0);
    assert!(dashboard["top_products"].as_array().unwrap().is_empty());
}
