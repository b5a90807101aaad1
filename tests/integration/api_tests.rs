//! API integration tests

use bookshelf_server::{api, config::AppConfig, AppState};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

/// Start a server with a freshly seeded catalog and return its base URL
async fn spawn_server(config: AppConfig) -> String {
    let app = api::create_router(AppState::new(config));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("No local address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server error");
    });

    format!("http://{}", addr)
}

async fn spawn_default() -> String {
    spawn_server(AppConfig::default()).await
}

async fn get_json(client: &Client, url: String) -> (StatusCode, Value) {
    let response = client.get(url).send().await.expect("Failed to send request");
    let status = response.status();
    let body = response.json().await.expect("Failed to parse response");
    (status, body)
}

fn ids(body: &Value) -> Vec<i64> {
    body["books"]
        .as_array()
        .expect("books is not an array")
        .iter()
        .map(|b| b["id"].as_i64().expect("id is not an integer"))
        .collect()
}

#[tokio::test]
async fn test_health_check() {
    let base = spawn_default().await;
    let (status, body) = get_json(&Client::new(), format!("{}/health", base)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_list_books_defaults() {
    let base = spawn_default().await;
    let client = Client::new();

    let response = client
        .get(format!("{}/books", base))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "application/json"
    );

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["total_books"], 3);
    assert_eq!(body["total_pages"], 1);
    assert_eq!(body["page"], 1);
    assert_eq!(body["per_page"], 10);
    assert_eq!(
        body["books"][0],
        json!({"id": 1, "title": "Python Crash Course", "author": "Eric Matthes"})
    );
}

#[tokio::test]
async fn test_second_page() {
    let base = spawn_default().await;
    let (status, body) =
        get_json(&Client::new(), format!("{}/books?page=2&per_page=2", base)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![3]);
    assert_eq!(body["total_pages"], 2);
    assert_eq!(body["total_books"], 3);
}

#[tokio::test]
async fn test_page_size_bounds_result() {
    let base = spawn_default().await;
    let client = Client::new();

    for per_page in 1..=4 {
        let (_, body) =
            get_json(&client, format!("{}/books?per_page={}", base, per_page)).await;
        let total = body["total_books"].as_i64().unwrap();
        assert!(ids(&body).len() as i64 <= per_page);
        assert_eq!(body["total_pages"].as_i64().unwrap(), (total + per_page - 1) / per_page);
    }
}

#[tokio::test]
async fn test_out_of_range_page_is_empty() {
    let base = spawn_default().await;
    let (status, body) = get_json(&Client::new(), format!("{}/books?page=50", base)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(ids(&body).is_empty());
    assert_eq!(body["page"], 50);
}

#[tokio::test]
async fn test_filters_are_case_insensitive_and_combined() {
    let base = spawn_default().await;
    let client = Client::new();

    let (_, body) = get_json(&client, format!("{}/books?title=PYTHON", base)).await;
    assert_eq!(ids(&body), vec![1, 2]);

    let (_, body) =
        get_json(&client, format!("{}/books?title=python&author=ramalho", base)).await;
    assert_eq!(ids(&body), vec![2]);
    assert_eq!(body["total_books"], 1);

    let (_, body) = get_json(&client, format!("{}/books?title=", base)).await;
    assert_eq!(body["total_books"], 3);
}

#[tokio::test]
async fn test_malformed_pagination_is_rejected() {
    let base = spawn_default().await;
    let client = Client::new();

    let (status, body) = get_json(&client, format!("{}/books?per_page=0", base)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["per_page"][0], "min value is 1");

    let (status, body) = get_json(&client, format!("{}/books?page=-1", base)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["page"][0], "min value is 1");

    let (status, body) = get_json(&client, format!("{}/books?page=abc", base)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_create_then_list() {
    let base = spawn_default().await;
    let client = Client::new();
    let new_book = json!({"id": 4, "title": "Refactoring", "author": "Martin Fowler"});

    let response = client
        .post(format!("{}/books", base))
        .json(&new_book)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body, new_book);

    let (_, body) = get_json(&client, format!("{}/books?author=fowler", base)).await;
    assert_eq!(body["total_books"], 1);
    assert_eq!(body["books"][0], new_book);

    let (_, body) = get_json(&client, format!("{}/books?per_page=100", base)).await;
    assert_eq!(ids(&body), vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn test_create_invalid_payload() {
    let base = spawn_default().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/books", base))
        .json(&json!({"id": 0, "title": 5}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(
        body,
        json!({"error": {
            "id": ["min value is 1"],
            "title": ["must be of string type"],
            "author": ["required field"]
        }})
    );

    let (_, body) = get_json(&client, format!("{}/books", base)).await;
    assert_eq!(body["total_books"], 3);
}

#[tokio::test]
async fn test_create_non_object_payload() {
    let base = spawn_default().await;
    let response = Client::new()
        .post(format!("{}/books", base))
        .json(&json!([{"id": 4, "title": "t", "author": "a"}]))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body, json!({"error": {"document": ["must be a JSON object"]}}));
}

#[tokio::test]
async fn test_create_malformed_json() {
    let base = spawn_default().await;
    let response = Client::new()
        .post(format!("{}/books", base))
        .header("content-type", "application/json")
        .body("{\"id\": 4,")
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_create_duplicate_id() {
    let base = spawn_default().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/books", base))
        .json(&json!({"id": 1, "title": "Duplicate", "author": "Someone"}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let mut config = AppConfig::default();
    config.catalog.reject_duplicate_ids = false;
    let lenient = spawn_server(config).await;
    let response = client
        .post(format!("{}/books", lenient))
        .json(&json!({"id": 1, "title": "Duplicate", "author": "Someone"}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_update_book() {
    let base = spawn_default().await;
    let client = Client::new();

    let response = client
        .put(format!("{}/books/1", base))
        .json(&json!({"id": 1, "title": "New Title", "author": "New Author"}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body, json!({"id": 1, "title": "New Title", "author": "New Author"}));

    let (_, body) = get_json(&client, format!("{}/books", base)).await;
    assert_eq!(body["books"][0]["title"], "New Title");
    assert_eq!(body["books"][0]["author"], "New Author");
}

#[tokio::test]
async fn test_update_missing_book_leaves_catalog_unchanged() {
    let base = spawn_default().await;
    let client = Client::new();
    let (_, before) = get_json(&client, format!("{}/books", base)).await;

    let response = client
        .put(format!("{}/books/999", base))
        .json(&json!({"id": 999, "title": "Ghost", "author": "Nobody"}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body, json!({"error": "Book not found"}));

    let (_, after) = get_json(&client, format!("{}/books", base)).await;
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_update_validation_precedes_lookup() {
    let base = spawn_default().await;
    let response = Client::new()
        .put(format!("{}/books/999", base))
        .json(&json!({"title": "Only a title"}))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"]["id"][0], "required field");
    assert_eq!(body["error"]["author"][0], "required field");
}

#[tokio::test]
async fn test_delete_book_twice() {
    let base = spawn_default().await;
    let client = Client::new();

    let response = client
        .delete(format!("{}/books/2", base))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body, json!({"result": "Book deleted"}));

    let response = client
        .delete(format!("{}/books/2", base))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let (_, body) = get_json(&client, format!("{}/books", base)).await;
    assert_eq!(ids(&body), vec![1, 3]);
}

#[tokio::test]
async fn test_delete_missing_book() {
    let base = spawn_default().await;
    let response = Client::new()
        .delete(format!("{}/books/999", base))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body, json!({"error": "Book not found"}));
}

#[tokio::test]
async fn test_non_integer_path_and_unknown_route() {
    let base = spawn_default().await;
    let client = Client::new();

    let response = client
        .delete(format!("{}/books/abc", base))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let (status, body) = get_json(&client, format!("{}/shelves", base)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Not found"}));
}

#[tokio::test]
async fn test_empty_catalog_without_seed() {
    let mut config = AppConfig::default();
    config.catalog.seed = false;
    let base = spawn_server(config).await;

    let (status, body) = get_json(&Client::new(), format!("{}/books", base)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_books"], 0);
    assert_eq!(body["total_pages"], 0);
    assert!(ids(&body).is_empty());
}
