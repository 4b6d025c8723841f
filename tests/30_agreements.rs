mod common;

use anyhow::Result;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use serde_json::json;

use common::{agreement_body, TestApp};
use towertrack_api::auth::Identity;
use towertrack_api::database::models::Role;
use towertrack_api::database::UserRepository;

#[tokio::test]
async fn tenant_application_is_accepted_end_to_end() -> Result<()> {
    let app = TestApp::spawn().await?;
    let admin = app.admin().await?;
    let tenant = app.login_as("a@x.com", Role::User).await?;

    let res = app.post("/agreements", Some(&tenant), agreement_body()).await?;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.data()["status"], "pending");
    assert_eq!(res.data()["tenant_email"], "a@x.com");
    let id = res.data()["id"].as_str().unwrap_or_default().to_string();

    let res = app.get("/agreements?status=pending", Some(&admin)).await?;
    assert_eq!(res.status, StatusCode::OK);
    let pending = res.data().as_array().cloned().unwrap_or_default();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0]["id"], id.as_str());

    let res = app
        .patch(&format!("/agreements/{id}/status"), Some(&admin), json!({ "status": "checked" }))
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["status"], "checked");

    let res = app.get("/agreements/member/a@x.com", Some(&tenant)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["status"], "checked");
    assert_eq!(res.data()["apartment_no"], "C-402");

    // Acceptance promotes the tenant.
    let user = app.store.find_user("a@x.com").await?.expect("user record");
    assert_eq!(user.role, Role::Member);

    let res = app.get("/agreements?status=pending", Some(&admin)).await?;
    assert_eq!(res.data().as_array().map(Vec::len), Some(0));
    Ok(())
}

#[tokio::test]
async fn second_agreement_conflicts_whatever_the_first_status() -> Result<()> {
    let app = TestApp::spawn().await?;
    let admin = app.admin().await?;
    let tenant = app.login_as("a@x.com", Role::User).await?;

    let res = app.post("/agreements", Some(&tenant), agreement_body()).await?;
    assert_eq!(res.status, StatusCode::CREATED);
    let id = res.data()["id"].as_str().unwrap_or_default().to_string();

    let res = app.post("/agreements", Some(&tenant), agreement_body()).await?;
    assert_eq!(res.status, StatusCode::CONFLICT);

    app.patch(&format!("/agreements/{id}/status"), Some(&admin), json!({ "status": "rejected" }))
        .await?;
    let res = app.post("/agreements", Some(&tenant), agreement_body()).await?;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.code(), "CONFLICT");
    Ok(())
}

#[tokio::test]
async fn missing_fields_are_reported_per_field() -> Result<()> {
    let app = TestApp::spawn().await?;
    let tenant = app.login_as("a@x.com", Role::User).await?;

    let res = app
        .post("/agreements", Some(&tenant), json!({ "tenant_name": "Avery", "rent": 0 }))
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.code(), "VALIDATION_ERROR");
    let fields = &res.body["field_errors"];
    assert!(fields["floor"].is_string());
    assert!(fields["block"].is_string());
    assert!(fields["apartment_no"].is_string());
    assert_eq!(fields["rent"], "Rent must be positive");
    Ok(())
}

#[tokio::test]
async fn blank_tenant_name_falls_back_to_session_name() -> Result<()> {
    let app = TestApp::spawn().await?;
    let tenant = app
        .tokens
        .issue(&Identity::new("a@x.com", Some("Avery Quinn".to_string())))?
        .token;

    let mut body = agreement_body();
    body["tenant_name"] = json!("   ");
    let res = app.post("/agreements", Some(&tenant), body).await?;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.data()["tenant_name"], "Avery Quinn");
    Ok(())
}

#[tokio::test]
async fn malformed_json_is_invalid_json() -> Result<()> {
    let app = TestApp::spawn().await?;
    let tenant = app.login_as("a@x.com", Role::User).await?;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/agreements")
        .header(header::AUTHORIZATION, format!("Bearer {tenant}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"floor\": 4,"))?;
    let res = app.send(request).await?;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.code(), "INVALID_JSON");
    Ok(())
}

#[tokio::test]
async fn cannot_apply_for_someone_else() -> Result<()> {
    let app = TestApp::spawn().await?;
    let tenant = app.login_as("a@x.com", Role::User).await?;

    let mut body = agreement_body();
    body["tenant_email"] = json!("b@x.com");
    let res = app.post("/agreements", Some(&tenant), body).await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn admins_do_not_apply() -> Result<()> {
    let app = TestApp::spawn().await?;
    let admin = app.admin().await?;

    let res = app.post("/agreements", Some(&admin), agreement_body()).await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn pending_agreement_is_not_a_member_agreement() -> Result<()> {
    let app = TestApp::spawn().await?;
    let tenant = app.login_as("a@x.com", Role::User).await?;

    app.post("/agreements", Some(&tenant), agreement_body()).await?;
    let res = app.get("/agreements/member/a@x.com", Some(&tenant)).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn status_transition_validates_input() -> Result<()> {
    let app = TestApp::spawn().await?;
    let admin = app.admin().await?;

    let res = app
        .patch("/agreements/not-a-uuid/status", Some(&admin), json!({ "status": "checked" }))
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let missing = uuid::Uuid::new_v4();
    let res = app
        .patch(&format!("/agreements/{missing}/status"), Some(&admin), json!({ "status": "checked" }))
        .await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = app
        .patch(&format!("/agreements/{missing}/status"), Some(&admin), json!({ "status": "approved" }))
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app.get("/agreements?status=approved", Some(&admin)).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    Ok(())
}
