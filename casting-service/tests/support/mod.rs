#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use casting_service::store::{Actor, ActorInput, CastingStore, Movie, MovieInput};
use casting_service::{router, AppState};
use common_auth::testing::{mock_jwks, test_config, test_keys, TokenBuilder, JWKS_PATH};
use common_auth::JwtVerifier;
use http_body_util::BodyExt;
use httpmock::MockServer;
use serde_json::Value;
use tower::util::ServiceExt;

#[derive(Default)]
struct Tables {
    next_id: i32,
    movies: BTreeMap<i32, Movie>,
    actors: BTreeMap<i32, Actor>,
}

/// Store double backed by ordered maps. `fail_writes` makes every insert fail.
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
    pub fail_writes: bool,
}

impl InMemoryStore {
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    fn tables(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl CastingStore for InMemoryStore {
    async fn list_movies(&self) -> Result<Vec<Movie>> {
        Ok(self.tables().movies.values().cloned().collect())
    }

    async fn find_movie(&self, id: i32) -> Result<Option<Movie>> {
        Ok(self.tables().movies.get(&id).cloned())
    }

    async fn insert_movie(&self, input: MovieInput) -> Result<Movie> {
        if self.fail_writes {
            return Err(anyhow!("insert rejected"));
        }
        let mut tables = self.tables();
        tables.next_id += 1;
        let movie = Movie {
            id: tables.next_id,
            title: input.title,
            release_date: input.release_date,
        };
        tables.movies.insert(movie.id, movie.clone());
        Ok(movie)
    }

    async fn update_movie(&self, id: i32, input: MovieInput) -> Result<Option<Movie>> {
        let mut tables = self.tables();
        Ok(tables.movies.get_mut(&id).map(|movie| {
            movie.title = input.title;
            movie.release_date = input.release_date;
            movie.clone()
        }))
    }

    async fn delete_movie(&self, id: i32) -> Result<bool> {
        Ok(self.tables().movies.remove(&id).is_some())
    }

    async fn list_actors(&self) -> Result<Vec<Actor>> {
        Ok(self.tables().actors.values().cloned().collect())
    }

    async fn find_actor(&self, id: i32) -> Result<Option<Actor>> {
        Ok(self.tables().actors.get(&id).cloned())
    }

    async fn insert_actor(&self, input: ActorInput) -> Result<Actor> {
        if self.fail_writes {
            return Err(anyhow!("insert rejected"));
        }
        let mut tables = self.tables();
        tables.next_id += 1;
        let actor = Actor {
            id: tables.next_id,
            name: input.name,
            age: input.age,
            gender: input.gender,
        };
        tables.actors.insert(actor.id, actor.clone());
        Ok(actor)
    }

    async fn update_actor(&self, id: i32, input: ActorInput) -> Result<Option<Actor>> {
        let mut tables = self.tables();
        Ok(tables.actors.get_mut(&id).map(|actor| {
            actor.name = input.name;
            actor.age = input.age;
            actor.gender = input.gender;
            actor.clone()
        }))
    }

    async fn delete_actor(&self, id: i32) -> Result<bool> {
        Ok(self.tables().actors.remove(&id).is_some())
    }
}

/// Router wired to an in-memory store and a mocked JWKS endpoint.
pub struct TestApp {
    pub server: MockServer,
    pub store: Arc<InMemoryStore>,
    pub verifier: Arc<JwtVerifier>,
    pub router: Router,
}

impl TestApp {
    pub async fn start() -> Self {
        Self::with_store(InMemoryStore::default()).await
    }

    pub async fn with_store(store: InMemoryStore) -> Self {
        let server = MockServer::start_async().await;
        mock_jwks(&server, test_keys()).await;
        let verifier = Arc::new(
            JwtVerifier::builder(test_config())
                .with_jwks_url(server.url(JWKS_PATH))
                .build(),
        );
        let store = Arc::new(store);
        let router = router(AppState::new(store.clone(), verifier.clone()));
        Self {
            server,
            store,
            verifier,
            router,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        send(self.router.clone(), request).await
    }
}

pub fn token(permissions: &[&str]) -> String {
    TokenBuilder::new().permissions(permissions).sign()
}

pub fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

/// Drive one request through the router; non-JSON bodies come back as a string.
pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.expect("infallible");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, body)
}
