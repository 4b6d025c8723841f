mod common;

use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use axum::http::StatusCode;
use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;

use common::TestApp;
use towertrack_api::database::models::{Apartment, Building, Role};
use towertrack_api::database::ListingRepository;
use towertrack_api::services::{PaymentError, PaymentGateway, PaymentIntent};

#[derive(Default)]
struct RecordingGateway {
    charges: Mutex<Vec<(i64, String)>>,
}

#[async_trait]
impl PaymentGateway for RecordingGateway {
    async fn create_intent(&self, amount_minor: i64, currency: &str) -> Result<PaymentIntent, PaymentError> {
        if let Ok(mut charges) = self.charges.lock() {
            charges.push((amount_minor, currency.to_string()));
        }
        Ok(PaymentIntent {
            id: "pi_test".to_string(),
            client_secret: "pi_test_secret".to_string(),
        })
    }
}

fn decimal(value: &serde_json::Value) -> Decimal {
    value
        .as_str()
        .map(|s| s.parse().unwrap())
        .or_else(|| value.as_f64().and_then(|f| Decimal::try_from(f).ok()))
        .expect("decimal value")
}

#[tokio::test]
async fn coupon_lifecycle() -> Result<()> {
    let app = TestApp::spawn().await?;
    let admin = app.admin().await?;

    let body = json!({ "code": "SPRING10", "discount": 10, "description": "Spring promotion" });
    let res = app.post("/coupons", Some(&admin), body.clone()).await?;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.data()["available"], true);
    let id = res.data()["id"].as_str().unwrap_or_default().to_string();

    let res = app.post("/coupons", Some(&admin), body).await?;
    assert_eq!(res.status, StatusCode::CONFLICT);

    let res = app.get("/coupons", None).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data().as_array().map(Vec::len), Some(1));

    let res = app.post("/validate-coupon", None, json!({ "code": "SPRING10" })).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["valid"], true);
    assert_eq!(res.data()["discount"], 10);

    let res = app
        .patch(&format!("/coupons/{id}"), Some(&admin), json!({ "available": false }))
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["available"], false);

    let res = app.post("/validate-coupon", None, json!({ "code": "SPRING10" })).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = app.delete(&format!("/coupons/{id}"), Some(&admin)).await?;
    assert_eq!(res.status, StatusCode::OK);
    let res = app.delete(&format!("/coupons/{id}"), Some(&admin)).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn coupon_input_is_validated() -> Result<()> {
    let app = TestApp::spawn().await?;
    let admin = app.admin().await?;
    let member = app.login_as("m@x.com", Role::Member).await?;

    let res = app
        .post("/coupons", Some(&admin), json!({ "code": "HUGE", "discount": 150 }))
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["field_errors"]["discount"], "Discount must be between 1 and 100");

    let res = app
        .patch(&format!("/coupons/{}", Uuid::new_v4()), Some(&admin), json!({}))
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app
        .post("/coupons", Some(&member), json!({ "code": "MINE", "discount": 50 }))
        .await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn payment_intent_applies_coupon_and_charges_cents() -> Result<()> {
    let gateway = Arc::new(RecordingGateway::default());
    let wired = gateway.clone();
    let app = TestApp::spawn_with(move |state| state.with_payments(wired)).await?;
    let admin = app.admin().await?;
    let member = app.login_as("m@x.com", Role::Member).await?;

    app.post("/coupons", Some(&admin), json!({ "code": "TEN", "discount": 10 }))
        .await?;

    let res = app
        .post(
            "/create-payment-intent",
            Some(&member),
            json!({ "amount": 1500, "coupon_code": "TEN" }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["client_secret"], "pi_test_secret");
    assert_eq!(res.data()["discount"], 10);
    assert_eq!(decimal(&res.data()["amount"]), Decimal::new(1350, 0));

    let charges = gateway.charges.lock().map(|c| c.clone()).unwrap_or_default();
    assert_eq!(charges, vec![(135_000, "usd".to_string())]);

    let res = app
        .post(
            "/create-payment-intent",
            Some(&member),
            json!({ "amount": 1500, "coupon_code": "NOPE" }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = app
        .post("/create-payment-intent", Some(&member), json!({ "amount": 0 }))
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn payment_intent_refuses_what_cannot_be_charged() -> Result<()> {
    let gateway = Arc::new(RecordingGateway::default());
    let wired = gateway.clone();
    let app = TestApp::spawn_with(move |state| state.with_payments(wired)).await?;
    let admin = app.admin().await?;
    let member = app.login_as("m@x.com", Role::Member).await?;

    app.post("/coupons", Some(&admin), json!({ "code": "FREE", "discount": 100 }))
        .await?;
    let res = app
        .post(
            "/create-payment-intent",
            Some(&member),
            json!({ "amount": 1500, "coupon_code": "FREE" }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app
        .post(
            "/create-payment-intent",
            Some(&member),
            json!({ "amount": "79228162514264337593543950335" }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"], "amount too large");

    let charges = gateway.charges.lock().map(|c| c.len()).unwrap_or_default();
    assert_eq!(charges, 0);
    Ok(())
}

#[tokio::test]
async fn payment_intent_needs_a_processor() -> Result<()> {
    let app = TestApp::spawn().await?;
    let member = app.login_as("m@x.com", Role::Member).await?;

    let res = app
        .post("/create-payment-intent", Some(&member), json!({ "amount": 1500 }))
        .await?;
    assert_eq!(res.status, StatusCode::SERVICE_UNAVAILABLE);
    Ok(())
}

#[tokio::test]
async fn recorded_payments_are_listed_per_member() -> Result<()> {
    let app = TestApp::spawn().await?;
    let admin = app.admin().await?;
    let member = app.login_as("m@x.com", Role::Member).await?;
    let user = app.login_as("u@x.com", Role::User).await?;

    let body = json!({
        "month": "2026-10",
        "amount": 1350,
        "discount": 10,
        "transaction_id": "pi_test",
        "floor": 4,
        "block": "C",
        "apartment_no": "C-402",
        "coupon_code": "TEN"
    });

    let res = app.post("/payments", Some(&user), body.clone()).await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let res = app.post("/payments", Some(&member), body).await?;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.data()["email"], "m@x.com");

    let res = app.get("/payments/user/m@x.com", Some(&member)).await?;
    assert_eq!(res.data().as_array().map(Vec::len), Some(1));

    let res = app.get("/payments", Some(&admin)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data().as_array().map(Vec::len), Some(1));

    let res = app.get("/payments", Some(&member)).await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn apartments_are_paged_and_filtered() -> Result<()> {
    let app = TestApp::spawn().await?;
    for n in 1..=8 {
        app.store
            .insert_apartment(&Apartment {
                id: Uuid::new_v4(),
                image: format!("https://img.test/{n}.jpg"),
                floor: n,
                block: "A".to_string(),
                apartment_no: format!("A-{n:02}"),
                rent: Decimal::new(1000 + i64::from(n) * 100, 0),
            })
            .await?;
    }

    let res = app.get("/apartments", None).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["total"], 8);
    assert_eq!(res.data()["limit"], 6);
    assert_eq!(res.data()["items"].as_array().map(Vec::len), Some(6));

    let res = app.get("/apartments?page=2", None).await?;
    assert_eq!(res.data()["items"].as_array().map(Vec::len), Some(2));
    assert_eq!(res.data()["items"][0]["apartment_no"], "A-07");

    let res = app.get("/apartments?min_rent=1300&max_rent=1500", None).await?;
    assert_eq!(res.data()["total"], 3);

    let res = app.get("/apartments?min_rent=2000&max_rent=1000", None).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn buildings_are_public() -> Result<()> {
    let app = TestApp::spawn().await?;
    app.store
        .insert_building(&Building {
            id: Uuid::new_v4(),
            name: "North Tower".to_string(),
            address: "1 Harbour Road".to_string(),
            floors: 12,
            description: "Twelve floors over the harbour".to_string(),
            image: "https://img.test/north.jpg".to_string(),
        })
        .await?;

    let res = app.get("/buildings", None).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()[0]["name"], "North Tower");
    assert_eq!(res.data()[0]["floors"], 12);
    Ok(())
}
