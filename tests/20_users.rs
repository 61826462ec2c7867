mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

async fn seeded(n: usize) -> Result<common::TestServer> {
    let server = common::TestServer::spawn().await?;
    for i in 0..n {
        server
            .users
            .seed(&format!("user{i:02}"), &format!("user{i:02}@example.com"), "")
            .await;
    }
    Ok(server)
}

#[tokio::test]
async fn list_users_returns_page_metadata() -> Result<()> {
    let server = seeded(25).await?;

    let (status, body) = server.get("/users?page=3&page_size=10").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 0);
    let page = &body["data"];
    assert_eq!(page["total"], 25);
    assert_eq!(page["page"], 3);
    assert_eq!(page["page_size"], 10);
    assert_eq!(page["total_pages"], 3);
    assert_eq!(page["has_next"], false);
    assert_eq!(page["has_prev"], true);
    assert_eq!(page["data"].as_array().unwrap().len(), 5);
    Ok(())
}

#[tokio::test]
async fn malformed_page_numbers_fall_back_to_defaults() -> Result<()> {
    let server = seeded(3).await?;

    let (status, body) = server.get("/users?page=abc&page_size=-4").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["page"], 1);
    assert_eq!(body["data"]["page_size"], 10);
    Ok(())
}

#[tokio::test]
async fn sort_and_search_use_allow_lists() -> Result<()> {
    let server = seeded(5).await?;

    let (status, body) = server.get("/users?sort_by=username&sort_order=asc").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["data"][0]["username"], "user00");

    let (status, body) = server.get("/users?sort_by=password").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1001);

    let (status, body) = server.get("/users?keyword=user03&search_by=username").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);

    let (status, _) = server.get("/users?keyword=x&search_by=password").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn get_user_and_missing_user() -> Result<()> {
    let server = seeded(1).await?;

    let (status, body) = server.get("/users/1").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "user00");
    assert!(body["data"].get("password").is_none());

    let (status, body) = server.get("/users/42").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 1002);
    assert_eq!(body["message"], "user not found");

    let (status, body) = server.get("/users/abc").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1001);
    Ok(())
}

#[tokio::test]
async fn update_user_changes_only_given_fields() -> Result<()> {
    let server = seeded(2).await?;

    let (status, body) = server
        .put("/users/1", &json!({"nickname": "Zero", "avatar": "https://cdn.example.com/0.png"}))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "updated");
    assert_eq!(body["data"]["nickname"], "Zero");
    assert_eq!(body["data"]["username"], "user00");
    assert_eq!(body["data"]["email"], "user00@example.com");
    assert!(body["data"].get("password").is_none());

    // a user may resubmit its own username and email
    let (status, _) = server
        .put("/users/1", &json!({"username": "user00", "email": "user00@example.com"}))
        .await?;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = server.put("/users/1", &json!({"email": "not-an-email"})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1001);

    let (status, body) = server.put("/users/42", &json!({"nickname": "x"})).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 1002);
    Ok(())
}

#[tokio::test]
async fn update_user_onto_another_users_name_conflicts() -> Result<()> {
    let server = seeded(2).await?;

    let (status, body) = server.put("/users/1", &json!({"username": "user01"})).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 2002);
    assert_eq!(body["message"], "username already exists: user01");
    assert_eq!(body["data"]["existing_id"], 2);

    let (status, body) = server.put("/users/1", &json!({"email": "user01@example.com"})).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "email already exists: user01@example.com");

    let (_, body) = server.get("/users/1").await?;
    assert_eq!(body["data"]["username"], "user00");
    Ok(())
}

#[tokio::test]
async fn delete_user_is_soft_and_frees_the_name() -> Result<()> {
    let server = seeded(2).await?;

    let (status, body) = server.delete("/users/2").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "deleted");

    let (status, _) = server.get("/users/2").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = server.delete("/users/2").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = server.get("/users").await?;
    assert_eq!(body["data"]["total"], 1);

    let (status, body) = server.put("/users/1", &json!({"username": "user01"})).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "user01");
    Ok(())
}

#[tokio::test]
async fn keyword_wildcards_match_literally() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    server.users.seed("a_c", "a_c@example.com", "").await;
    server.users.seed("abc", "abc@example.com", "").await;
    server.users.seed("50off", "50off@example.com", "").await;

    let (_, body) = server.get("/users?keyword=a_c&search_by=username").await?;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["data"][0]["username"], "a_c");

    let (_, body) = server.get("/users?keyword=%25&search_by=username").await?;
    assert_eq!(body["data"]["total"], 0);
    Ok(())
}
