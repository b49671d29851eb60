//! End-to-end tests against the live mock NLU service.
//!
//! # Design
//! Starts the mock server on a random port, then drives every `NluClient`
//! operation over real HTTP through the default `UreqTransport`.

use std::net::SocketAddr;

use mock_server::{MockConfig, INTENT_NAME};
use nlu_client::{NluClient, NluConfig, NluError, RequestDescriptor, Resource};
use serde_json::json;

const TOKEN: &str = "my123Token";
const PROJECT: &str = "myProject";
const TEXT: &str = "i'm looking for a place in the north of town";

/// Start the mock server on its own runtime thread and return its address.
fn start_mock() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(
                listener,
                MockConfig {
                    project: PROJECT.to_string(),
                    token: TOKEN.to_string(),
                },
            )
            .await
        })
        .unwrap();
    });

    addr
}

fn training_data() -> serde_json::Value {
    json!({
        "rasa_nlu_data": {
            "common_examples": [
                {"text": "show me chinese restaurants", "intent": "restaurant_search", "entities": []}
            ]
        }
    })
}

fn service_error(err: NluError) -> nlu_client::ServiceError {
    match err {
        NluError::Service(e) => e,
        other => panic!("expected service error, got {other:?}"),
    }
}

#[test]
fn train_returns_info_and_model() {
    let addr = start_mock();
    let client = NluClient::new(&format!("http://{addr}"), PROJECT, TOKEN);

    let res = client.train(&training_data()).unwrap();
    assert!(res.is_object());
    assert_eq!(res["info"], "Success");
    assert!(res["model"].is_string());
}

#[test]
fn train_rejects_unrecognized_payload() {
    let addr = start_mock();
    let client = NluClient::new(&format!("http://{addr}"), PROJECT, TOKEN);

    let err = service_error(client.train(&json!({"data": []})).unwrap_err());
    assert_eq!(err.status, 500);
    assert_eq!(err.message(), "100");
    assert_eq!(err.body, Some(json!("Train Error")));
}

#[test]
fn evaluate_returns_intent_evaluation() {
    let addr = start_mock();
    let client = NluClient::new(&format!("http://{addr}"), PROJECT, TOKEN);

    let res = client.evaluate(&training_data()).unwrap();
    let evaluation = &res["intent_evaluation"];
    for key in ["report", "predictions", "precision", "f1_score", "accuracy"] {
        assert!(evaluation.get(key).is_some(), "missing {key}");
    }
}

#[test]
fn parse_echoes_text_and_project() {
    let addr = start_mock();
    let client = NluClient::new(&format!("http://{addr}"), PROJECT, TOKEN);

    let res = client.parse(TEXT).unwrap();
    assert_eq!(res["text"], TEXT);
    assert_eq!(res["project"], PROJECT);
    assert_eq!(res["intent"]["name"], INTENT_NAME);
    assert!(res["intent"].get("confidence").is_some());
    assert!(res["intent_ranking"].is_array());
    assert!(res["entities"].is_array());
}

#[test]
fn get_reads_named_resources() {
    let addr = start_mock();
    let client = NluClient::new(&format!("http://{addr}"), PROJECT, TOKEN);

    let status = client.get(Resource::Status).unwrap();
    assert!(status.get("available_projects").is_some());

    let version = client.get("version").unwrap();
    assert!(version.get("version").is_some());
    assert!(version.get("minimum_compatible_version").is_some());

    let config = client.get(Resource::Config).unwrap();
    assert!(config.is_object());

    let err = service_error(client.get("undefined_path").unwrap_err());
    assert_eq!(err.status, 404);
}

#[test]
fn wrong_token_is_rejected() {
    let addr = start_mock();
    let client = NluClient::new(&format!("http://{addr}"), PROJECT, "not-the-token");

    let err = service_error(client.get(Resource::Version).unwrap_err());
    assert_eq!(err.status, 401);
    assert_eq!(err.message(), "unauthorized");
    assert_eq!(err.code, Some(json!(401)));
}

#[test]
fn query_override_replaces_default_project() {
    let addr = start_mock();
    let client = NluClient::new(&format!("http://{addr}"), PROJECT, TOKEN);

    // The override wins over the default, so the mock sees the wrong project.
    let descriptor = RequestDescriptor::get("/status").query("project", "someone-else");
    let err = service_error(client.request(descriptor).unwrap_err());
    assert_eq!(err.status, 401);
}

#[test]
fn model_lifecycle() {
    let addr = start_mock();
    let config = NluConfig {
        timeout_secs: Some(10),
        ..NluConfig::new(&format!("http://{addr}"), PROJECT, TOKEN)
    };
    let client = NluClient::from_config(&config);

    // Step 1: deleting a model that was never trained fails.
    let err = service_error(client.delete("undefined_model").unwrap_err());
    assert_eq!(err.status, 404);

    // Step 2: train and pick up the new model's name.
    let trained = client.train(&training_data()).unwrap();
    let model = trained["model"].as_str().unwrap().to_string();

    // Step 3: status lists it.
    let status = client.get(Resource::Status).unwrap();
    let models = &status["available_projects"][PROJECT]["available_models"];
    assert_eq!(models, &json!([model]));

    // Step 4: parse against that model.
    let res = client.parse_with_model(TEXT, &model).unwrap();
    assert_eq!(res["intent"]["name"], INTENT_NAME);

    // Step 5: delete it.
    assert!(client.delete(&model).is_ok());

    // Step 6: deleting again fails.
    let err = service_error(client.delete(&model).unwrap_err());
    assert_eq!(err.status, 404);
}

#[test]
fn refused_connection_is_a_transport_error() {
    // Bind then drop to get a port nothing listens on.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let client = NluClient::new(&format!("http://{addr}"), PROJECT, TOKEN);

    let err = client.get(Resource::Status).unwrap_err();
    assert!(matches!(err, NluError::Transport(_)), "got {err:?}");
}

#[test]
fn client_is_shareable_across_threads() {
    let addr = start_mock();
    let client = std::sync::Arc::new(NluClient::new(&format!("http://{addr}"), PROJECT, TOKEN));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let client = client.clone();
            std::thread::spawn(move || client.parse(TEXT).unwrap())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap()["text"], TEXT);
    }
}

#[test]
fn evaluation_report_larger_than_ten_mib_is_read() {
    let addr = start_mock();
    let client = NluClient::new(&format!("http://{addr}"), PROJECT, TOKEN);

    let text = "is there a moderately priced restaurant somewhere around the north side of town tonight please";
    let examples: Vec<serde_json::Value> = (0..80_000)
        .map(|i| json!({"text": format!("{text} #{i}"), "intent": "restaurant_search", "entities": []}))
        .collect();
    let data = json!({"rasa_nlu_data": {"common_examples": examples}});

    let res = client.evaluate(&data).unwrap();
    assert!(res.to_string().len() > 10 * 1024 * 1024);
    let predictions = res["intent_evaluation"]["predictions"].as_array().unwrap();
    assert_eq!(predictions.len(), 80_000);
    assert_eq!(predictions[79_999]["text"], format!("{text} #79999"));
}
