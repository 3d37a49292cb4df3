//! Shared harness for the HTTP-level tests.
//!
//! Every `TestApp` owns a private in-memory database and drives the router
//! in-process through `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde_json::Value;
use sqlx::SqlitePool;
use tower::ServiceExt; // for `oneshot`

use taxi_backend::auth::models::Registration;
use taxi_backend::auth::service;
use taxi_backend::config::{DatabaseSettings, Settings};
use taxi_backend::database::models::Driver;
use taxi_backend::database::{self, queries};
use taxi_backend::{app, AppState};

pub const TEST_PASSWORD: &str = "test123user";

pub struct TestApp {
    pub pool: SqlitePool,
    router: Router,
    cookie: Option<String>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub set_cookie: Vec<String>,
    body: Vec<u8>,
}

impl TestResponse {
    async fn from_response(response: Response) -> Self {
        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let set_cookie = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .map(str::to_string)
            .collect();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body")
            .to_vec();
        Self {
            status,
            location,
            set_cookie,
            body,
        }
    }

    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("view responses are JSON")
    }

    pub fn template(&self) -> String {
        self.json()["template"]
            .as_str()
            .expect("template name")
            .to_string()
    }

    pub fn context(&self) -> Value {
        self.json()["context"].clone()
    }

    /// Values of `field` across the objects of context list `list`.
    pub fn list_field(&self, list: &str, field: &str) -> Vec<String> {
        self.context()[list]
            .as_array()
            .unwrap_or_else(|| panic!("context has no list {list}"))
            .iter()
            .map(|item| item[field].as_str().unwrap_or_default().to_string())
            .collect()
    }
}

fn encode(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                utf8_percent_encode(key, NON_ALPHANUMERIC),
                utf8_percent_encode(value, NON_ALPHANUMERIC)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

impl TestApp {
    pub async fn new() -> Self {
        let settings = Settings {
            database: DatabaseSettings::in_memory(),
            ..Settings::default()
        };
        let pool = database::connect(&settings.database)
            .await
            .expect("in-memory database");
        let router = app(AppState::new(pool.clone(), settings));
        Self {
            pool,
            router,
            cookie: None,
        }
    }

    pub async fn create_user(&self, username: &str, license_number: Option<&str>) -> Driver {
        service::register_driver(
            &self.pool,
            Registration {
                username,
                password: TEST_PASSWORD,
                license_number,
                ..Default::default()
            },
        )
        .await
        .expect("register driver")
    }

    /// Attach a fresh session for `driver` to every following request.
    pub async fn force_login(&mut self, driver: &Driver) {
        let token = service::start_session(&self.pool, driver.id)
            .await
            .expect("start session");
        self.cookie = Some(format!("{}={}", taxi_backend::auth::SESSION_COOKIE, token));
    }

    pub fn set_cookie_header(&mut self, cookie: Option<String>) {
        self.cookie = cookie;
    }

    pub async fn create_manufacturer(&self, name: &str, country: &str) -> i64 {
        queries::insert_manufacturer(&self.pool, name, country)
            .await
            .expect("insert manufacturer")
    }

    pub async fn create_car(&self, model: &str, manufacturer_id: i64) -> i64 {
        queries::insert_car(&self.pool, model, manufacturer_id)
            .await
            .expect("insert car")
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        TestResponse::from_response(response).await
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post(&self, uri: &str, form: &[(&str, &str)]) -> TestResponse {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(encode(form))).unwrap())
            .await
    }

    pub async fn count(&self, sql: &str, value: &str) -> i64 {
        let (count,): (i64,) = sqlx::query_as(sql)
            .bind(value)
            .fetch_one(&self.pool)
            .await
            .expect("count query");
        count
    }
}
