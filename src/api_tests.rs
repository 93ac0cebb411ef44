// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Tests for the HTTP surface.

#[cfg(test)]
mod tests {
    use crate::api::{build_router, ApiState};
    use crate::batch::BatchChangeService;
    use crate::config::Config;
    use crate::converter::QueueingBatchConverter;
    use crate::repository::memory::{
        InMemoryBatchChangeRepository, InMemoryRecordSetRepository, InMemoryZoneRepository,
    };
    use crate::types::{BatchChange, Zone};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use std::sync::Arc;
    use tower::util::ServiceExt;

    async fn test_router() -> Router {
        let zone_repo = Arc::new(InMemoryZoneRepository::new());
        zone_repo
            .put_zone(Zone::new("example.com.", "", "dns-admins"))
            .await;
        let record_set_repo = Arc::new(InMemoryRecordSetRepository::new());
        let batch_repo = Arc::new(InMemoryBatchChangeRepository::new());
        let (sender, mut receiver) = tokio::sync::mpsc::unbounded_channel();
        tokio::spawn(async move { while receiver.recv().await.is_some() {} });
        let converter = Arc::new(QueueingBatchConverter::new(batch_repo.clone(), sender));
        let service = BatchChangeService::new(
            zone_repo,
            record_set_repo,
            batch_repo,
            converter,
            Arc::new(Config::default()),
        )
        .unwrap();
        build_router(Arc::new(ApiState { service }))
    }

    fn post_batch(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/zones/batchrecordchanges")
            .header("content-type", "application/json")
            .header("x-user-id", "alice")
            .header("x-user-name", "Alice")
            .header("x-user-groups", "dns-admins")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_ping() {
        let router = test_router().await;
        let response = router
            .oneshot(Request::get("/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"PONG");
    }

    #[tokio::test]
    async fn test_metrics_endpoint_responds() {
        let router = test_router().await;
        let response = router
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_create_batch_change_accepted() {
        let router = test_router().await;
        let body = r#"{
            "comments": "add web",
            "changes": [
                {"changeType": "Add", "inputName": "web.example.com.", "type": "A",
                 "ttl": 300, "record": {"address": "10.0.0.1"}}
            ]
        }"#;
        let response = router.oneshot(post_batch(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let batch: BatchChange = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(batch.changes.len(), 1);
        assert_eq!(batch.changes[0].zone_name, "example.com.");
    }

    #[tokio::test]
    async fn test_create_batch_change_requires_identity() {
        let router = test_router().await;
        let request = Request::builder()
            .method("POST")
            .uri("/zones/batchrecordchanges")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"changes": []}"#))
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_create_batch_change_validation_failure_echoes_input() {
        let router = test_router().await;
        let body = r#"{
            "comments": "bad batch",
            "changes": [
                {"changeType": "Add", "inputName": "web.nowhere.net.", "type": "A",
                 "ttl": 300, "record": {"address": "10.0.0.1"}}
            ]
        }"#;
        let response = router.oneshot(post_batch(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        // Same shape as the submission, with per-position errors merged in
        let json = body_json(response).await;
        assert_eq!(json["comments"], "bad batch");
        let changes = json["changes"].as_array().unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0]["inputName"], "web.nowhere.net.");
        assert!(!changes[0]["errors"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_batch_is_bad_request() {
        let router = test_router().await;
        let response = router
            .oneshot(post_batch(r#"{"changes": []}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_batch_change_not_found() {
        let router = test_router().await;
        let request = Request::get("/zones/batchrecordchanges/no-such-id")
            .header("x-user-id", "alice")
            .body(Body::empty())
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_batch_changes_empty() {
        let router = test_router().await;
        let request = Request::get("/zones/batchrecordchanges?maxItems=10")
            .header("x-user-id", "alice")
            .body(Body::empty())
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["batchChanges"].as_array().unwrap().len(), 0);
        assert_eq!(json["maxItems"], 10);
    }
}
