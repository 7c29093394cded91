//! End-to-end tests through the HTTP router

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use axum::response::Response;
    use axum::Router;
    use std::sync::Arc;
    use tower::util::ServiceExt;

    use crate::config::{ServerConfig, VirtualHostConfig};
    use crate::http::create_router;
    use crate::integration::fixtures::{test_state, MockProvider};
    use crate::state::AppState;
    use crate::types::{PublisherType, SegmentDataType, SegmentItem};

    async fn send(app: &Router, method: Method, uri: &str, body: Body) -> Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .unwrap();
        app.clone().oneshot(request).await.unwrap()
    }

    async fn get(app: &Router, uri: &str) -> Response {
        send(app, Method::GET, uri, Body::empty()).await
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    async fn create_live_stream(app: &Router) {
        let response = send(
            app,
            Method::POST,
            "/api/v1/streams",
            Body::from(r#"{"app":"app","stream":"live"}"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_publish_and_play_manifest() {
        let state = test_state();
        let app = create_router(state.clone());
        create_live_stream(&app).await;

        // Not ready until a manifest is published
        let response = get(&app, "/app/live/manifest.mpd").await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(response.headers().get(header::CACHE_CONTROL).is_none());
        assert_eq!(body_bytes(response).await, b"stream is not ready");

        let response = send(
            &app,
            Method::PUT,
            "/api/v1/streams/app/live/manifest/manifest.mpd",
            Body::from("<MPD/>"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = get(&app, "/app/live/manifest.mpd").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/dash+xml"
        );
        assert_eq!(
            response.headers()[header::CACHE_CONTROL],
            "no-cache, no-store, must-revalidate"
        );
        assert_eq!(response.headers()[header::PRAGMA], "no-cache");
        assert_eq!(response.headers()[header::EXPIRES], "0");
        assert_eq!(body_bytes(response).await, b"<MPD/>");

        let stream = state.store.stream("default", "app", "live").unwrap();
        let metrics = state.metrics.lookup(stream.info()).unwrap();
        assert!(metrics.bytes_out(PublisherType::Dash) > b"<MPD/>".len() as u64);
    }

    #[tokio::test]
    async fn test_publish_and_play_segments() {
        let state = test_state();
        let app = create_router(state.clone());
        create_live_stream(&app).await;

        let response = send(
            &app,
            Method::PUT,
            "/api/v1/streams/app/live/segments/video_1.m4s",
            Body::from(vec![0x00u8, 0x01, 0x02]),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let response = send(
            &app,
            Method::PUT,
            "/api/v1/streams/app/live/segments/audio_1.m4s?kind=audio",
            Body::from(vec![0x10u8, 0x11]),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = get(&app, "/app/live/video_1.m4s").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "video/mp4");
        assert_eq!(body_bytes(response).await, vec![0x00, 0x01, 0x02]);

        let response = get(&app, "/app/live/audio_1.m4s").await;
        assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/mp4");
        assert_eq!(body_bytes(response).await, vec![0x10, 0x11]);

        let response = get(&app, "/app/live/video_2.m4s").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_bytes(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_extension_never_reaches_providers() {
        let state = test_state();
        let probe = Arc::new(MockProvider::new("probe").with_playlist("<MPD/>"));
        state.providers.register(probe.clone());
        let app = create_router(state);

        for uri in ["/app/live/stream.xyz", "/app/live/manifest", "/app/live/MANIFEST.MPD"] {
            let response = get(&app, uri).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
            assert!(body_bytes(response).await.is_empty());
        }

        use std::sync::atomic::Ordering;
        assert_eq!(probe.playlist_calls.load(Ordering::SeqCst), 0);
        assert_eq!(probe.segment_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_stream_is_not_found() {
        let app = create_router(test_state());

        let response = get(&app, "/app/missing/manifest.mpd").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_bytes(response).await.is_empty());

        let response = get(&app, "/too/short").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_runtime_provider_falls_back_after_memory() {
        let state = test_state();
        let external = Arc::new(
            MockProvider::new("external")
                .with_playlist("<MPD id=\"external\"/>")
                .with_segment(SegmentItem::new(SegmentDataType::Video, vec![9u8; 4])),
        );
        state.providers.register(external);
        let app = create_router(state.clone());

        let response = get(&app, "/app/other/manifest.mpd").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, b"<MPD id=\"external\"/>");

        state.providers.deregister("external");
        let response = get(&app, "/app/other/manifest.mpd").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_virtual_host_scoping() {
        let state = Arc::new(AppState::new(ServerConfig {
            virtual_hosts: vec![VirtualHostConfig {
                name: "sports".to_string(),
                domains: vec!["sports.example.com".to_string()],
            }],
            ..Default::default()
        }));
        state.store.create_stream("sports", "app", "live").unwrap();
        state
            .store
            .publish_manifest("sports", "app", "live", "manifest.mpd", "<MPD/>".into())
            .unwrap();
        let app = create_router(state);

        let request = Request::builder()
            .uri("/app/live/manifest.mpd")
            .header(header::HOST, "sports.example.com:3333")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = get(&app, "/app/live/manifest.mpd").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_stream_management() {
        let app = create_router(test_state());
        create_live_stream(&app).await;

        let response = send(
            &app,
            Method::POST,
            "/api/v1/streams",
            Body::from(r#"{"app":"app","stream":"live"}"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = get(&app, "/api/v1/streams").await;
        assert_eq!(response.status(), StatusCode::OK);
        let list: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(list["count"], 1);
        assert!(list["streams"][0]["manifest_path"].is_null());
        assert_eq!(list["streams"][0]["ready"], false);

        let response = send(&app, Method::DELETE, "/api/v1/streams/app/live", Body::empty()).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let response = send(&app, Method::DELETE, "/api/v1/streams/app/live", Body::empty()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = send(
            &app,
            Method::PUT,
            "/api/v1/streams/app/live/segments/video_1.m4s?kind=text",
            Body::from(vec![1u8]),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_listed_manifest_path_is_playable() {
        let app = create_router(test_state());
        create_live_stream(&app).await;

        let response = send(
            &app,
            Method::PUT,
            "/api/v1/streams/app/live/manifest/stream.mpd",
            Body::from("<MPD/>"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = get(&app, "/api/v1/streams").await;
        let list: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(list["streams"][0]["ready"], true);
        let path = list["streams"][0]["manifest_path"].as_str().unwrap().to_string();
        assert_eq!(path, "/app/live/stream.mpd");

        let response = get(&app, &path).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, b"<MPD/>");

        let response = get(&app, "/app/live/manifest.mpd").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        // Not a playlist name
        let response = send(
            &app,
            Method::PUT,
            "/api/v1/streams/app/live/manifest/stream.txt",
            Body::from("<MPD/>"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let state = test_state();
        let app = create_router(state);
        create_live_stream(&app).await;
        send(
            &app,
            Method::PUT,
            "/api/v1/streams/app/live/segments/video_1.m4s",
            Body::from(vec![0u8; 100]),
        )
        .await;
        get(&app, "/app/live/video_1.m4s").await;
        get(&app, "/app/live/video_2.m4s").await;

        let response = get(&app, "/metrics").await;
        assert_eq!(response.status(), StatusCode::OK);
        let text = String::from_utf8(body_bytes(response).await).unwrap();
        assert!(text.contains("dash_requests_by_endpoint{endpoint=\"stream\"} 2"));
        assert!(text.contains("dash_responses_total{status=\"404\"} 1"));
        assert!(text.contains(
            "dash_stream_bytes_out_total{vhost=\"default\",app=\"app\",stream=\"live\",publisher=\"dash\"}"
        ));
    }

    #[tokio::test]
    async fn test_served_over_tcp() {
        let state = test_state();
        state.store.create_stream("default", "app", "live").unwrap();
        state
            .store
            .publish_manifest("default", "app", "live", "manifest.mpd", "<MPD/>".into())
            .unwrap();
        let app = create_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let response = reqwest::get(format!("http://{}/app/live/manifest.mpd", addr))
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);
        assert_eq!(
            response.headers()["content-type"].to_str().unwrap(),
            "application/dash+xml"
        );
        assert_eq!(response.text().await.unwrap(), "<MPD/>");
    }
}
