mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use serde_json::json;

use common::{job_body, TestApp};

#[tokio::test]
async fn created_job_is_publicly_visible() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.login().await?;

    let id = app.create_job(&token, "Kitchen Coordinator").await?;

    let (status, body) = app.get(&format!("/jobs/{}", id), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Kitchen Coordinator");
    assert_eq!(body["data"]["type"], "Full-time");
    assert_eq!(body["data"]["active"], true);

    let (status, body) = app.get("/jobs", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));

    Ok(())
}

#[tokio::test]
async fn invalid_job_reports_field_errors() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.login().await?;

    let mut body = job_body("ab");
    body["type"] = json!("Freelance");
    body["deadline"] = json!((Utc::now() - Duration::days(1)).to_rfc3339());

    let (status, body) = app.post("/jobs", Some(&token), body).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"]["title"].is_string());
    assert!(body["field_errors"]["type"].is_string());
    assert!(body["field_errors"]["deadline"].is_string());

    Ok(())
}

#[tokio::test]
async fn malformed_json_is_bad_request() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.login().await?;

    let (status, body) = app.post("/jobs", Some(&token), json!([1, 2, 3])).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_JSON");

    Ok(())
}

#[tokio::test]
async fn update_replaces_and_deactivates() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.login().await?;
    let id = app.create_job(&token, "Kitchen Coordinator").await?;

    let mut body = job_body("Head of Kitchen");
    body["active"] = json!(false);
    let (status, updated) = app
        .request(Method::PUT, &format!("/jobs/{}", id), Some(&token), Some(body))
        .await?;
    assert_eq!(status, StatusCode::OK, "{}", updated);
    assert_eq!(updated["data"]["title"], "Head of Kitchen");

    // Inactive jobs drop out of the listing but stay readable.
    let (_, listed) = app.get("/jobs", None).await?;
    assert_eq!(listed["data"].as_array().map(Vec::len), Some(0));
    let (status, _) = app.get(&format!("/jobs/{}", id), None).await?;
    assert_eq!(status, StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn deleted_job_is_gone_everywhere() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.login().await?;
    let id = app.create_job(&token, "Kitchen Coordinator").await?;
    let uri = format!("/jobs/{}", id);

    let (status, _) = app.request(Method::DELETE, &uri, Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get(&uri, None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.request(Method::DELETE, &uri, Some(&token), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .request(Method::PUT, &uri, Some(&token), Some(job_body("Revived")))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn unknown_job_is_not_found() -> Result<()> {
    let app = TestApp::spawn().await?;

    let (status, body) = app.get("/jobs/4242", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    Ok(())
}
