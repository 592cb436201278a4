use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use prediction_engine::{
    ClassifierModel, CsrMatrix, DecisionTreeClassifier, FittedVocabulary, ModelBundle,
    ModelRegistry, Predictor,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceExt;
use web_app::{router, AppState};

const HOME: &str = "<html><body>classifier</body></html>";

/// Predicts 1 when "good" appears in the comment.
fn bundle() -> ModelBundle {
    let vocabulary: HashMap<String, usize> = [("good", 0), ("bad", 1)]
        .into_iter()
        .map(|(term, column)| (term.to_string(), column))
        .collect();
    ModelBundle {
        classifier: ClassifierModel::DecisionTree(DecisionTreeClassifier {
            n_features: 10,
            classes: vec![0, 1],
            children_left: vec![1, -1, -1],
            children_right: vec![2, -1, -1],
            feature: vec![0, -2, -2],
            threshold: vec![0.5, -2.0, -2.0],
            value: vec![vec![1.0, 1.0], vec![1.0, 0.0], vec![0.0, 1.0]],
        }),
        vectorizer: FittedVocabulary { vocabulary },
        fitted_matrix: CsrMatrix::empty(2),
    }
}

fn app() -> Router {
    let mut bundles = HashMap::new();
    bundles.insert("science".to_string(), bundle());
    let registry =
        ModelRegistry::new(vec!["science".to_string(), "politics".to_string()], bundles).unwrap();

    router(AppState {
        predictor: Arc::new(Predictor::new(Arc::new(registry))),
        home_page: Arc::from(HOME),
    })
}

async fn post_class(body: &str) -> (StatusCode, Value) {
    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/class")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_home_page_is_served_verbatim() {
    let response = app()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], HOME.as_bytes());
}

#[tokio::test]
async fn test_classify_with_numeric_string_minutes() {
    let (status, body) = post_class(r#"{"comment": ["good good good", "5", "science"]}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"pred": 1}));
    assert_eq!(body.as_object().unwrap().len(), 1);
}

#[tokio::test]
async fn test_classify_with_number_minutes() {
    let (status, body) = post_class(r#"{"comment": ["meh", 5.9, "science"]}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pred"], 0);
}

#[tokio::test]
async fn test_malformed_requests_are_bad_requests() {
    for body in [
        "not json",
        r#"{"comment": "good"}"#,
        r#"{"comment": ["good", 5]}"#,
        r#"{"comment": ["good", "five", "science"]}"#,
    ] {
        let (status, response) = post_class(body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {}", body);
        assert_eq!(response["error"], "INVALID_REQUEST");
    }
}

#[tokio::test]
async fn test_comment_without_terms_is_unprocessable() {
    for comment in ["", "a b c", "de la"] {
        let body = json!({"comment": [comment, 1, "science"]}).to_string();
        let (status, response) = post_class(&body).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "comment {:?}", comment);
        assert_eq!(response["error"], "EMPTY_VOCABULARY");
    }
}

#[tokio::test]
async fn test_unknown_community_is_not_found() {
    for community in ["politics", "cooking"] {
        let body = json!({"comment": ["good", 1, community]}).to_string();
        let (status, response) = post_class(&body).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(response["error"], "UNKNOWN_COMMUNITY");
        assert!(response["message"].as_str().unwrap().contains(community));
    }
}

#[tokio::test]
async fn test_subreddits_lists_registry_communities() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/subreddits")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let names: Vec<String> = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(names, ["science", "politics"]);
}

#[test]
fn test_load_home_page() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("home.html");
    std::fs::write(&path, HOME).unwrap();
    assert_eq!(&*web_app::load_home_page(&path).unwrap(), HOME);
    assert!(web_app::load_home_page(&dir.path().join("missing.html")).is_err());
}
