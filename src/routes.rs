//! Route definitions and router setup
//!
//! Configures all API routes and middleware.

mod member;
mod proposal;

use crate::auth::MEMBER_HEADER;
use crate::config::Settings;
use crate::state::SharedState;
use axum::{
    http::{header, HeaderName, Method},
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::MakeRequestUuid,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
    ServiceBuilderExt,
};
use tracing::Level;

/// Create the application router with all routes and middleware
pub fn create_router(state: SharedState, settings: &Settings) -> Router {
    // Build CORS layer
    let cors = build_cors_layer(settings);

    // Build tracing/logging layer
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    // Build middleware stack
    let middleware = ServiceBuilder::new()
        .set_x_request_id(MakeRequestUuid)
        .layer(trace_layer)
        .layer(CompressionLayer::new())
        .layer(cors)
        .propagate_x_request_id();

    Router::new()
        // Health check
        .route("/health", get(health_check))

        // DAO and token
        .route("/api/dao", get(member::dao_info))
        .route("/api/delegate", post(member::delegate))
        .route("/api/members/{member}", get(member::member_info))
        .route("/api/audit", get(member::audit_log))

        // Proposals
        .route("/api/proposals", post(proposal::create_proposal).get(proposal::list_proposals))
        .route("/api/proposals/winner", get(proposal::winning_proposal))
        .route("/api/proposals/{id}", get(proposal::get_proposal))
        .route("/api/proposals/{id}/remaining", get(proposal::remaining_time))
        .route("/api/proposals/{id}/voters/{member}", get(proposal::has_voted))
        .route("/api/proposals/{id}/vote", post(proposal::vote))
        .route("/api/proposals/{id}/execute", post(proposal::execute_proposal))

        // Apply middleware and state
        .layer(middleware)
        .with_state(state)
}

/// Build CORS layer from settings
fn build_cors_layer(settings: &Settings) -> CorsLayer {
    let origins: Vec<_> = settings
        .cors
        .allowed_origins
        .iter()
        .filter_map(|s| s.parse().ok())
        .collect();

    let headers = [
        header::CONTENT_TYPE,
        header::ACCEPT,
        HeaderName::from_static(MEMBER_HEADER),
    ];

    let layer = if origins.is_empty() {
        CorsLayer::new().allow_origin(Any)
    } else {
        CorsLayer::new().allow_origin(origins)
    };

    layer
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(headers)
        .max_age(Duration::from_secs(3600))
}

/// Health check endpoint
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "success": true,
        "message": "Server is running fine.",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CorsConfig, GovernanceConfig, ServerConfig};
    use crate::governance::clock::ManualClock;
    use crate::state::AppState;
    use crate::token::WeightMode;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use tower::ServiceExt;

    struct TestApp {
        router: Router,
        clock: Arc<ManualClock>,
    }

    fn settings() -> Settings {
        Settings {
            server: ServerConfig::default(),
            cors: CorsConfig { allowed_origins: vec![] },
            governance: GovernanceConfig {
                owner: "0xOwner".to_string(),
                members: vec!["0xAlice".to_string(), "0xBob".to_string(), "0xCarol".to_string()],
                weight_mode: WeightMode::Weighted,
                token_name: "Governance Token".to_string(),
                token_symbol: "GOV".to_string(),
                allocations: BTreeMap::from([
                    ("0xalice".to_string(), 1),
                    ("0xbob".to_string(), 2),
                    ("0xcarol".to_string(), 5),
                ]),
            },
        }
    }

    fn app() -> TestApp {
        let settings = settings();
        let clock = Arc::new(ManualClock::new());
        let state = Arc::new(AppState::new(&settings.governance, clock.clone()).unwrap());
        TestApp {
            router: create_router(state, &settings),
            clock,
        }
    }

    impl TestApp {
        async fn send(&self, method: Method, uri: &str, caller: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
            let mut request = Request::builder().method(method).uri(uri);
            if let Some(caller) = caller {
                request = request.header(MEMBER_HEADER, caller);
            }
            let request = match body {
                Some(body) => request
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
                None => request.body(Body::empty()).unwrap(),
            };

            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let value = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap()
            };
            (status, value)
        }

        async fn create(&self, caller: &str, duration: i64) -> (StatusCode, Value) {
            self.send(
                Method::POST,
                "/api/proposals",
                Some(caller),
                Some(json!({ "description": "Fund the audit", "duration": duration, "category": "FUNDING" })),
            )
            .await
        }
    }

    #[tokio::test]
    async fn test_health() {
        let app = app();
        let (status, body) = app.send(Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
    }

    #[tokio::test]
    async fn test_full_lifecycle() {
        let app = app();

        let (status, body) = app.create("0xAlice", 60).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["proposalId"], 1);
        assert_eq!(body["proposal"]["category"], "FUNDING");
        assert_eq!(body["proposal"]["status"], "pending");

        let (status, body) = app.send(Method::POST, "/api/proposals/1/vote", Some("0xAlice"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["voteCount"], 1);

        let (_, body) = app.send(Method::POST, "/api/proposals/1/vote", Some("0xBob"), None).await;
        assert_eq!(body["voteCount"], 3);

        let (_, body) = app.send(Method::GET, "/api/proposals/1/voters/0xbob", None, None).await;
        assert_eq!(body["hasVoted"], true);

        app.clock.advance_secs(60);
        let (_, body) = app.send(Method::GET, "/api/proposals/1/remaining", None, None).await;
        assert_eq!(body["remainingSeconds"], 0);

        let (status, body) = app
            .send(Method::POST, "/api/proposals/1/execute", Some("0xOwner"), Some(json!({ "quorumThreshold": 3 })))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"]["approved"], true);
        assert_eq!(body["outcome"]["voteCount"], 3);

        let (status, body) = app.send(Method::POST, "/api/proposals/1/vote", Some("0xCarol"), None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "ALREADY_EXECUTED");

        let (_, body) = app.send(Method::GET, "/api/audit?proposalId=1", None, None).await;
        let actions: Vec<&str> = body["entries"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["action"].as_str().unwrap())
            .collect();
        assert_eq!(actions, vec!["proposal_executed", "vote_cast", "vote_cast", "proposal_created"]);
    }

    #[tokio::test]
    async fn test_error_codes() {
        let app = app();

        let (status, body) = app.send(Method::POST, "/api/proposals", None, Some(json!({ "description": "x", "duration": 5 }))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "MISSING_CALLER");

        let (status, body) = app.create("0xMallory", 60).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "NOT_A_MEMBER");

        let (status, body) = app.create("0xAlice", 0).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_INPUT");

        let (status, body) = app.send(Method::GET, "/api/proposals/42", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "PROPOSAL_NOT_FOUND");

        app.create("0xAlice", 1).await;
        app.send(Method::POST, "/api/proposals/1/vote", Some("0xBob"), None).await;
        let (status, body) = app.send(Method::POST, "/api/proposals/1/vote", Some("0xBob"), None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "ALREADY_VOTED");

        let (status, body) = app
            .send(Method::POST, "/api/proposals/1/execute", Some("0xOwner"), Some(json!({ "quorumThreshold": 1 })))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "VOTING_OPEN");

        app.clock.advance_secs(2);
        let (status, body) = app.send(Method::POST, "/api/proposals/1/vote", Some("0xAlice"), None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "VOTING_CLOSED");

        let (status, body) = app
            .send(Method::POST, "/api/proposals/1/execute", Some("0xOwner"), Some(json!({ "quorumThreshold": -1 })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_INPUT");

        let (status, body) = app
            .send(Method::POST, "/api/proposals/1/execute", Some("0xAlice"), Some(json!({ "quorumThreshold": 1 })))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_winner_and_listing() {
        let app = app();

        let (_, body) = app.send(Method::GET, "/api/proposals/winner", None, None).await;
        assert_eq!(body["winner"], Value::Null);

        app.create("0xAlice", 60).await;
        app.create("0xBob", 60).await;
        app.send(Method::POST, "/api/proposals/2/vote", Some("0xCarol"), None).await;

        let (_, body) = app.send(Method::GET, "/api/proposals/winner", None, None).await;
        assert_eq!(body["winner"]["id"], 2);
        assert_eq!(body["winner"]["voteCount"], 5);

        let (_, body) = app.send(Method::GET, "/api/proposals", None, None).await;
        assert_eq!(body["proposalCount"], 2);
        assert_eq!(body["proposals"][0]["id"], 1);
        assert_eq!(body["proposals"][1]["voteCount"], 5);
    }

    #[tokio::test]
    async fn test_delegation_changes_vote_weight() {
        let app = app();

        let (status, body) = app
            .send(Method::POST, "/api/delegate", Some("0xCarol"), Some(json!({ "to": "0xAlice" })))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["previousDelegate"], "0xcarol");
        assert_eq!(body["delegateVotingWeight"], 6);

        // Proposals opened after the move see the new split
        app.clock.advance_secs(1);

        let (_, body) = app.send(Method::GET, "/api/members/0xCarol", None, None).await;
        assert_eq!(body["balance"], 5);
        assert_eq!(body["votingWeight"], 0);
        assert_eq!(body["delegate"], "0xalice");

        app.create("0xBob", 60).await;
        let (_, body) = app.send(Method::POST, "/api/proposals/1/vote", Some("0xAlice"), None).await;
        assert_eq!(body["voteCount"], 6);

        let (status, body) = app
            .send(Method::POST, "/api/delegate", Some("0xStranger"), Some(json!({ "to": "0xAlice" })))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "NO_VOTING_ACCOUNT");
    }

    #[tokio::test]
    async fn test_dao_info() {
        let app = app();
        let (_, body) = app.send(Method::GET, "/api/dao", None, None).await;
        assert_eq!(body["tokenSymbol"], "GOV");
        assert_eq!(body["totalSupply"], 8);
        assert_eq!(body["weightMode"], "weighted");
        assert_eq!(body["owner"], "0xowner");
        assert_eq!(body["members"].as_array().unwrap().len(), 4);
        assert_eq!(body["proposalCount"], 0);
    }
    #[tokio::test]
    async fn test_malformed_input_gets_json_error() {
        let app = app();

        let (status, body) = app.send(Method::GET, "/api/proposals/-1", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "MALFORMED_REQUEST");

        let (status, body) = app
            .send(Method::POST, "/api/proposals", Some("0xAlice"), Some(json!({ "description": "No duration" })))
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "MALFORMED_REQUEST");

        let (status, body) = app.send(Method::GET, "/api/audit?limit=lots", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "MALFORMED_REQUEST");
    }

    #[tokio::test]
    async fn test_delegated_balance_counts_once_per_proposal() {
        let app = app();
        app.create("0xAlice", 60).await;

        let (_, body) = app.send(Method::POST, "/api/proposals/1/vote", Some("0xCarol"), None).await;
        assert_eq!(body["voteCount"], 5);

        app.clock.advance_secs(1);
        app.send(Method::POST, "/api/delegate", Some("0xCarol"), Some(json!({ "to": "0xBob" }))).await;

        let (_, body) = app.send(Method::POST, "/api/proposals/1/vote", Some("0xBob"), None).await;
        assert_eq!(body["voteCount"], 7);

        let (_, dao) = app.send(Method::GET, "/api/dao", None, None).await;
        assert!(body["voteCount"].as_u64().unwrap() <= dao["totalSupply"].as_u64().unwrap());
    }
}
