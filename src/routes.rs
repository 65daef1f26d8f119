// routes.rs
use std::{sync::Arc, time::Duration};

use axum::{middleware, routing::get, Extension, Json, Router};
use serde_json::json;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::{
    handler::{admin::admin_handler, jobs::jobs_handler},
    middleware::auth,
    AppState,
};

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": "Server is running"
    }))
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let timeout = Duration::from_secs(app_state.env.request_timeout_secs);

    let api_route = Router::new()
        .nest("/jobs", jobs_handler().layer(middleware::from_fn(auth)))
        .nest("/admin", admin_handler().layer(middleware::from_fn(auth)))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(timeout))
        .layer(Extension(app_state));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_route)
}

#[cfg(test)]
pub mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use tower::ServiceExt;

    use super::create_router;
    use crate::{
        config::Config,
        db::memory::MemoryStore,
        models::{
            jobmodel::Job,
            usermodel::{User, UserRole},
        },
        utils::token,
        AppState,
    };

    const SECRET: &str = "router-test-secret";

    /// Full router over an in-memory store, with helpers to mint users and tokens.
    pub struct TestApp {
        pub store: Arc<MemoryStore>,
        pub state: Arc<AppState>,
    }

    impl TestApp {
        pub fn new() -> Self {
            let store = Arc::new(MemoryStore::default());
            let config = Config {
                database_url: String::new(),
                jwt_secret: SECRET.to_string(),
                port: 0,
                db_max_connections: 1,
                request_timeout_secs: 5,
                cors_origins: vec![],
            };
            let state = Arc::new(AppState::new(store.clone(), config));
            Self { store, state }
        }

        pub fn router(&self) -> Router {
            create_router(self.state.clone())
        }

        pub fn user(&self, name: &str, role: UserRole) -> User {
            self.store.add_user(name, role)
        }

        pub fn token_for(&self, user: &User) -> String {
            token::create_token(&user.id.to_string(), SECRET.as_bytes(), 3600)
                .expect("test token")
        }

        pub async fn posted_job(&self, client: &User) -> Job {
            self.state
                .job_service
                .create(
                    client,
                    "Install shelves".to_string(),
                    "Four shelves in the living room".to_string(),
                    None,
                    None,
                )
                .await
                .expect("job creation")
        }
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = TestApp::new();

        let response = app
            .router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn tokens_for_unknown_users_are_refused() {
        let app = TestApp::new();
        let ghost = User {
            id: uuid::Uuid::new_v4(),
            name: "Ghost".to_string(),
            email: "ghost@example.com".to_string(),
            role: UserRole::Client,
            rating: 0.0,
            reviews_count: 0,
            created_at: chrono::Utc::now(),
        };

        let response = app
            .router()
            .oneshot(
                Request::builder()
                    .uri("/api/jobs")
                    .header("Authorization", format!("Bearer {}", app.token_for(&ghost)))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
