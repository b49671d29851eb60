use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
};

use axum::{
    extract::{DefaultBodyLimit, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const INTENT_NAME: &str = "restaurant_search";
pub const SERVICE_VERSION: &str = "0.13.8";
pub const MINIMUM_COMPATIBLE_VERSION: &str = "0.13.0";

/// Largest request body the mock accepts; training sets can be large.
pub const MAX_REQUEST_BYTES: usize = 64 * 1024 * 1024;

/// Credentials every request must present as `project` / `token` query
/// parameters.
#[derive(Clone, Debug)]
pub struct MockConfig {
    pub project: String,
    pub token: String,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            project: "myProject".to_string(),
            token: "my123Token".to_string(),
        }
    }
}

pub struct MockState {
    config: MockConfig,
    models: RwLock<BTreeSet<String>>,
}

pub type Shared = Arc<MockState>;
type Params = Query<HashMap<String, String>>;

/// A non-200 answer in the service's `{error, code, body}` shape.
pub struct Failure {
    status: StatusCode,
    payload: Value,
}

impl Failure {
    fn new(status: StatusCode, payload: Value) -> Self {
        Self { status, payload }
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        (self.status, Json(self.payload)).into_response()
    }
}

type Reply = Result<Json<Value>, Failure>;

pub fn app(config: MockConfig) -> Router {
    let state: Shared = Arc::new(MockState {
        config,
        models: RwLock::new(BTreeSet::new()),
    });
    Router::new()
        .route("/train", post(train))
        .route("/evaluate", post(evaluate))
        .route("/parse", post(parse))
        .route("/status", get(status))
        .route("/version", get(version))
        .route("/config", get(config_info))
        .route("/models", delete(delete_model))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES))
        .with_state(state)
}

pub async fn run(listener: TcpListener, config: MockConfig) -> Result<(), std::io::Error> {
    axum::serve(listener, app(config)).await
}

fn authorize(state: &MockState, params: &HashMap<String, String>) -> Result<(), Failure> {
    let project = params.get("project").map(String::as_str);
    let token = params.get("token").map(String::as_str);
    if project == Some(state.config.project.as_str()) && token == Some(state.config.token.as_str()) {
        return Ok(());
    }
    tracing::warn!(?project, "rejecting request with bad credentials");
    Err(Failure::new(
        StatusCode::UNAUTHORIZED,
        json!({"error": "unauthorized", "code": 401, "body": "Invalid project or token"}),
    ))
}

fn has_training_data(body: &Value) -> bool {
    body.get("rasa_nlu_data").is_some()
}

async fn train(State(state): State<Shared>, Query(params): Params, Json(body): Json<Value>) -> Reply {
    authorize(&state, &params)?;
    if !has_training_data(&body) {
        tracing::warn!("train request without rasa_nlu_data");
        return Err(Failure::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({"error": 100, "body": "Train Error"}),
        ));
    }
    let model = format!("model_{}", Uuid::new_v4().simple());
    state.models.write().await.insert(model.clone());
    Ok(Json(json!({"info": "Success", "model": model})))
}

async fn evaluate(
    State(state): State<Shared>,
    Query(params): Params,
    Json(body): Json<Value>,
) -> Reply {
    authorize(&state, &params)?;
    if !has_training_data(&body) {
        tracing::warn!("evaluate request without rasa_nlu_data");
        return Err(Failure::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({"error": 200, "body": "Evaluate Error"}),
        ));
    }
    let predictions: Vec<Value> = body["rasa_nlu_data"]["common_examples"]
        .as_array()
        .map(|examples| {
            examples
                .iter()
                .map(|example| {
                    json!({
                        "text": example["text"],
                        "intent": example["intent"],
                        "predicted": INTENT_NAME,
                        "confidence": 0.9,
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    Ok(Json(json!({
        "intent_evaluation": {
            "report": "",
            "predictions": predictions,
            "precision": 0,
            "f1_score": 0,
            "accuracy": 0,
        }
    })))
}

async fn parse(State(state): State<Shared>, Query(params): Params, Json(body): Json<Value>) -> Reply {
    authorize(&state, &params)?;
    let text = body.get("q").and_then(Value::as_str).unwrap_or_default();
    let project = body.get("project").and_then(Value::as_str);
    if text.is_empty() || project != Some(state.config.project.as_str()) {
        tracing::warn!(?project, "parse request with missing text or wrong project");
        return Err(Failure::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({"error": 200, "body": "Parse Error"}),
        ));
    }
    if let Some(model) = body.get("model").and_then(Value::as_str) {
        if !state.models.read().await.contains(model) {
            return Err(Failure::new(
                StatusCode::NOT_FOUND,
                json!({"error": format!("No model found with name '{model}'"), "code": 404}),
            ));
        }
    }
    Ok(Json(json!({
        "text": text,
        "project": state.config.project,
        "intent_ranking": [],
        "entities": [],
        "intent": {
            "name": INTENT_NAME,
            "confidence": 0.9,
        },
    })))
}

async fn status(State(state): State<Shared>, Query(params): Params) -> Reply {
    authorize(&state, &params)?;
    let models: Vec<String> = state.models.read().await.iter().cloned().collect();
    Ok(Json(json!({
        "available_projects": {
            state.config.project.clone(): {
                "status": "ready",
                "available_models": models,
            }
        }
    })))
}

async fn version(State(state): State<Shared>, Query(params): Params) -> Reply {
    authorize(&state, &params)?;
    Ok(Json(json!({
        "version": SERVICE_VERSION,
        "minimum_compatible_version": MINIMUM_COMPATIBLE_VERSION,
    })))
}

async fn config_info(State(state): State<Shared>, Query(params): Params) -> Reply {
    authorize(&state, &params)?;
    Ok(Json(json!({
        "language": "en",
        "pipeline": "supervised_embeddings",
        "project": state.config.project,
    })))
}

async fn delete_model(State(state): State<Shared>, Query(params): Params) -> Reply {
    authorize(&state, &params)?;
    let Some(model) = params.get("model") else {
        return Err(Failure::new(
            StatusCode::BAD_REQUEST,
            json!({"error": "missing model parameter", "code": 400}),
        ));
    };
    if state.models.write().await.remove(model) {
        Ok(Json(json!({"info": format!("model {model} deleted")})))
    } else {
        Err(Failure::new(
            StatusCode::NOT_FOUND,
            json!({"error": format!("No model found with name '{model}'"), "code": 404}),
        ))
    }
}

async fn not_found() -> Failure {
    Failure::new(
        StatusCode::NOT_FOUND,
        json!({"error": "not found", "code": 404}),
    )
}
