//! Integration tests for the Hugging Face client using wiremock HTTP mocks.

use std::sync::Arc;

use foodprint_inference::{
    Classifier, ClassifierHandle, HuggingFaceClient, HuggingFaceLoader, InferenceConfig,
    InferenceError, Label,
};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL: &str = "distilbert-base-uncased-finetuned-sst-2-english";

fn config(base_url: &str) -> InferenceConfig {
    InferenceConfig {
        base_url: base_url.to_string(),
        model: MODEL.to_string(),
        api_token: "hf_test".to_string(),
        timeout_secs: 5,
        load_timeout_secs: 3,
    }
}

fn model_path() -> String {
    format!("/models/{MODEL}")
}

#[tokio::test]
async fn infer_returns_top_label() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(model_path()))
        .and(header("authorization", "Bearer hf_test"))
        .and(body_json(serde_json::json!({
            "inputs": "tomato is in season in Madrid, Spain during July"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([[
            { "label": "POSITIVE", "score": 0.93 },
            { "label": "NEGATIVE", "score": 0.07 }
        ]])))
        .mount(&server)
        .await;

    let client = HuggingFaceClient::new(&config(&server.uri())).unwrap();
    let c = client
        .infer("tomato is in season in Madrid, Spain during July")
        .await
        .expect("classification");
    assert_eq!(c.label, Label::Positive);
    assert!((c.score - 0.93).abs() < 1e-9);
}

#[tokio::test]
async fn flat_response_shape_is_accepted() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(model_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "label": "NEGATIVE", "score": 0.8 },
            { "label": "POSITIVE", "score": 0.2 }
        ])))
        .mount(&server)
        .await;

    let client = HuggingFaceClient::new(&config(&server.uri())).unwrap();
    let c = client.infer("kiwi is grown locally in Oslo").await.unwrap();
    assert_eq!(c.label, Label::Negative);
    assert!((c.yes_probability() - 0.2).abs() < 1e-9);
}

#[tokio::test]
async fn unauthorized_is_credential_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(model_path()))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(serde_json::json!({ "error": "Invalid credentials in Authorization header" })),
        )
        .mount(&server)
        .await;

    let client = HuggingFaceClient::new(&config(&server.uri())).unwrap();
    let err = client.infer("anything").await.unwrap_err();
    assert!(err.is_credential_error(), "got {err:?}");
}

#[tokio::test]
async fn loader_polls_until_model_is_warm() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(model_path()))
        .respond_with(ResponseTemplate::new(503).set_body_json(serde_json::json!({
            "error": "Model is currently loading",
            "estimated_time": 0.1
        })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(model_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([[
            { "label": "POSITIVE", "score": 0.6 }
        ]])))
        .mount(&server)
        .await;

    let handle = ClassifierHandle::new(Arc::new(HuggingFaceLoader::new(config(&server.uri()))));
    assert!(!handle.is_loaded());
    let classifier = handle.acquire().await.expect("model should load");
    assert!(handle.is_loaded());
    let c = classifier.infer("banana is artificially ripened").await.unwrap();
    assert_eq!(c.label, Label::Positive);
}

#[tokio::test]
async fn loader_gives_up_after_load_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(model_path()))
        .respond_with(ResponseTemplate::new(503).set_body_json(serde_json::json!({
            "error": "Model is currently loading",
            "estimated_time": 0.2
        })))
        .mount(&server)
        .await;

    let mut cfg = config(&server.uri());
    cfg.load_timeout_secs = 1;
    let handle = ClassifierHandle::new(Arc::new(HuggingFaceLoader::new(cfg)));
    let err = handle.acquire().await.err().expect("load should time out");
    assert!(matches!(err, InferenceError::ModelUnavailable(_)), "got {err:?}");
    assert!(!handle.is_loaded());
}

#[tokio::test]
async fn loader_surfaces_rejected_credential() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(model_path()))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({ "error": "forbidden" })))
        .mount(&server)
        .await;

    let handle = ClassifierHandle::new(Arc::new(HuggingFaceLoader::new(config(&server.uri()))));
    let err = handle.acquire().await.err().unwrap();
    assert!(matches!(err, InferenceError::Unauthorized(_)));
}
