mod support;

use axum::http::{Method, StatusCode};
use serde_json::json;
use support::{request, token, InMemoryStore, TestApp};

const MOVIE_PERMISSIONS: &[&str] = &["get:movies", "post:movies", "patch:movies", "delete:movies"];
const ACTOR_PERMISSIONS: &[&str] = &["get:actors", "post:actors", "patch:actors", "delete:actors"];

#[tokio::test]
async fn movie_lifecycle() {
    let app = TestApp::start().await;
    let jwt = token(MOVIE_PERMISSIONS);

    let (status, body) = app.send(request(Method::GET, "/movies", Some(&jwt), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "movies_not_found");

    let (status, body) = app
        .send(request(
            Method::POST,
            "/movies",
            Some(&jwt),
            Some(json!({ "title": "Mad Max", "release_date": "2016-01-10" })),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "id": 1 }));

    let (status, body) = app.send(request(Method::GET, "/movies", Some(&jwt), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "success": true,
            "movies": [{ "id": 1, "title": "Mad Max", "release_date": "2016-01-10" }]
        })
    );

    let (status, body) = app
        .send(request(
            Method::PATCH,
            "/movies/1",
            Some(&jwt),
            Some(json!({ "title": "Mad Max: Fury Road", "release_date": "2015-05-15" })),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["movie"]["title"], "Mad Max: Fury Road");
    assert_eq!(body["movie"]["release_date"], "2015-05-15");

    let (status, body) = app.send(request(Method::DELETE, "/movies/1", Some(&jwt), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "delete": 1 }));

    let (status, body) = app.send(request(Method::DELETE, "/movies/1", Some(&jwt), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "movie_not_found");
}

#[tokio::test]
async fn movie_create_rejects_bad_body() {
    let app = TestApp::start().await;
    let jwt = token(MOVIE_PERMISSIONS);

    let (status, body) = app
        .send(request(
            Method::POST,
            "/movies",
            Some(&jwt),
            Some(json!({ "title": "Mad Max", "release_date": "10 January" })),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], 400);
    assert_eq!(body["code"], "invalid_movie");
}

#[tokio::test]
async fn store_failure_on_create_is_400() {
    let app = TestApp::with_store(InMemoryStore::failing()).await;
    let jwt = token(ACTOR_PERMISSIONS);

    let (status, body) = app
        .send(request(
            Method::POST,
            "/actors",
            Some(&jwt),
            Some(json!({ "name": "Denzel Washington", "age": 65, "gender": "Male" })),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "actor_not_created");
}

#[tokio::test]
async fn patching_missing_movie_is_404_before_body_validation() {
    let app = TestApp::start().await;
    let jwt = token(MOVIE_PERMISSIONS);

    let (status, body) = app
        .send(request(Method::PATCH, "/movies/42", Some(&jwt), Some(json!({ "title": 1 }))))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "movie_not_found");

    let (status, _) = app.send(request(Method::DELETE, "/movies/abc", Some(&jwt), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn actor_lifecycle() {
    let app = TestApp::start().await;
    let jwt = token(ACTOR_PERMISSIONS);

    let (status, body) = app.send(request(Method::GET, "/actors", Some(&jwt), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "actors_not_found");

    let (status, body) = app
        .send(request(
            Method::POST,
            "/actors",
            Some(&jwt),
            Some(json!({ "name": "Denzel Washington", "age": "65", "gender": "Male" })),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "id": 1 }));

    let (status, body) = app
        .send(request(
            Method::PATCH,
            "/actors/1",
            Some(&jwt),
            Some(json!({ "name": "Denzel Washington", "age": 66, "gender": "Male" })),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "success": true,
            "actor": { "id": 1, "name": "Denzel Washington", "age": 66, "gender": "Male" }
        })
    );

    let (status, body) = app.send(request(Method::GET, "/actors", Some(&jwt), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["actors"].as_array().map(Vec::len), Some(1));

    let (status, body) = app.send(request(Method::DELETE, "/actors/1", Some(&jwt), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "delete": 1 }));
}

#[tokio::test]
async fn invalid_actor_edit_is_422() {
    let app = TestApp::start().await;
    let jwt = token(ACTOR_PERMISSIONS);

    let (status, _) = app
        .send(request(
            Method::POST,
            "/actors",
            Some(&jwt),
            Some(json!({ "name": "Denzel Washington", "age": 65, "gender": "Male" })),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .send(request(
            Method::PATCH,
            "/actors/1",
            Some(&jwt),
            Some(json!({ "name": "Denzel Washington", "age": "old" })),
        ))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], 422);
    assert_eq!(body["code"], "invalid_actor");
}

#[tokio::test]
async fn unsupported_method_gets_envelope() {
    let app = TestApp::start().await;

    let (status, body) = app.send(request(Method::PUT, "/movies", None, None)).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(
        body,
        json!({
            "success": false,
            "error": 405,
            "message": "Method Not Allowed",
            "code": "method_not_allowed"
        })
    );
}

#[tokio::test]
async fn unknown_route_gets_envelope() {
    let app = TestApp::start().await;

    let (status, body) = app.send(request(Method::GET, "/directors", None, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({
            "success": false,
            "error": 404,
            "message": "Resource not found",
            "code": "route_not_found"
        })
    );
}

#[tokio::test]
async fn health_and_metrics_are_public() {
    let app = TestApp::start().await;

    let (status, body) = app.send(request(Method::GET, "/healthz", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("ok"));

    let (status, _) = app.send(request(Method::GET, "/movies", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.send(request(Method::GET, "/metrics", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    let text = body.as_str().expect("text exposition");
    assert!(text.contains("http_errors_total"));
    assert!(text.contains("casting-service"));
}
