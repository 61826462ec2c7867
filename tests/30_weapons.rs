mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn weapon_crud_lifecycle() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let (status, body) = server
        .post("/weapons", &json!({"name": "AK47", "level": 3, "type": 2, "story": "old"}))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["code"], 0);
    let id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["type"], 2);

    let (status, body) = server.put(&format!("/weapons/{id}"), &json!({"level": 7})).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["level"], 7);
    assert_eq!(body["data"]["story"], "old");

    let (status, _) = server.delete(&format!("/weapons/{id}")).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = server.get(&format!("/weapons/{id}")).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "weapon not found");
    Ok(())
}

#[tokio::test]
async fn duplicate_name_conflicts() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let (_, body) = server.post("/weapons", &json!({"name": "M4"})).await?;
    let id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = server.post("/weapons", &json!({"name": "M4"})).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 2002);
    assert_eq!(body["data"]["existing_id"], id);
    Ok(())
}

#[tokio::test]
async fn invalid_bodies_are_400() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let (status, body) = server.post("/weapons", &json!({"name": ""})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1001);
    assert!(body["data"]["field_errors"]["name"].is_string());

    let resp = server
        .client
        .post(server.api("/weapons"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;
    let (status, body) = common::read(resp).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1001);
    assert!(body["detail"].is_string());
    Ok(())
}

#[tokio::test]
async fn list_searches_by_name() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    for name in ["Desert Eagle", "AK47", "Eagle Eye"] {
        server.post("/weapons", &json!({"name": name})).await?;
    }

    let (status, body) = server.get("/weapons?keyword=eagle&sort_by=name&sort_order=asc").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 2);
    assert_eq!(body["data"]["data"][0]["name"], "Desert Eagle");
    Ok(())
}
