mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::{agreement_body, TestApp};
use towertrack_api::database::models::Role;
use towertrack_api::database::{AgreementRepository, UserRepository};

fn notice(email: &str) -> serde_json::Value {
    json!({ "tenant_email": email, "apartment": "C-402", "reason": "noise after hours" })
}

#[tokio::test]
async fn third_notice_revokes_and_fourth_is_still_recorded() -> Result<()> {
    let app = TestApp::spawn().await?;
    let admin = app.admin().await?;
    let tenant = app.login_as("t@x.com", Role::User).await?;

    let res = app.post("/agreements", Some(&tenant), agreement_body()).await?;
    let id = res.data()["id"].as_str().unwrap_or_default().to_string();
    app.patch(&format!("/agreements/{id}/status"), Some(&admin), json!({ "status": "checked" }))
        .await?;
    assert_eq!(app.store.find_user("t@x.com").await?.map(|u| u.role), Some(Role::Member));

    for expected in 1..=2 {
        let res = app.post("/notices/issue", Some(&admin), notice("t@x.com")).await?;
        assert_eq!(res.status, StatusCode::CREATED);
        assert_eq!(res.data()["notice"]["count"], expected);
        assert_eq!(res.data()["revoked"], false);
    }
    assert!(app.store.find_agreement_by_email("t@x.com").await?.is_some());

    let res = app.post("/notices/issue", Some(&admin), notice("t@x.com")).await?;
    assert_eq!(res.data()["notice"]["count"], 3);
    assert_eq!(res.data()["revoked"], true);
    assert!(app.store.find_agreement_by_email("t@x.com").await?.is_none());
    assert_eq!(app.store.find_user("t@x.com").await?.map(|u| u.role), Some(Role::User));

    // The tenant's existing token now fails the member-only routes.
    let res = app.get("/agreements/member/t@x.com", Some(&tenant)).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    let res = app.get("/payments/user/t@x.com", Some(&tenant)).await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let res = app.post("/notices/issue", Some(&admin), notice("t@x.com")).await?;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.data()["notice"]["count"], 4);

    let res = app.get("/notices/user/t@x.com", Some(&tenant)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data().as_array().map(Vec::len), Some(4));
    Ok(())
}

#[tokio::test]
async fn only_admins_issue_notices() -> Result<()> {
    let app = TestApp::spawn().await?;
    let member = app.login_as("m@x.com", Role::Member).await?;

    let res = app.post("/notices/issue", Some(&member), notice("t@x.com")).await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn notice_requires_all_fields() -> Result<()> {
    let app = TestApp::spawn().await?;
    let admin = app.admin().await?;

    let res = app
        .post("/notices/issue", Some(&admin), json!({ "tenant_email": "t@x.com" }))
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body["field_errors"]["apartment"].is_string());
    assert!(res.body["field_errors"]["reason"].is_string());
    Ok(())
}
