//! Integration tests for the reqwest transport.
//!
//! These tests run a real HTTP mock server (`wiremock`) and check what
//! actually goes over the wire: method, path, headers, and body encoding.

#[cfg(feature = "reqwest")]
mod reqwest_transport {
    use serde_json::json;
    use tourney_transport::{
        ApiRequest, HttpTransport, ReqwestTransport, TransportError,
    };
    use wiremock::matchers::{
        bearer_token, body_json, body_string, header, method, path,
    };
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_send_get_returns_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tournaments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let transport = ReqwestTransport::new(&server.uri()).unwrap();
        let response = transport
            .send(ApiRequest::get("/api/tournaments"))
            .await
            .expect("request should succeed");

        assert_eq!(response.status, 200);
        assert!(response.is_success());
        assert_eq!(response.body, b"[]");
    }

    #[tokio::test]
    async fn test_send_form_is_url_encoded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string("username=alice&password=s3cret%21"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "access_token": "abc" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let transport = ReqwestTransport::new(&server.uri()).unwrap();
        let response = transport
            .send(
                ApiRequest::post("/token")
                    .form([("username", "alice"), ("password", "s3cret!")]),
            )
            .await
            .unwrap();

        assert_eq!(response.status, 200);
    }

    #[tokio::test]
    async fn test_send_json_with_bearer_header() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/tournaments/7"))
            .and(bearer_token("tok-123"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({ "name": "Cup" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "7" })))
            .expect(1)
            .mount(&server)
            .await;

        let transport = ReqwestTransport::new(&server.uri()).unwrap();
        let body = serde_json::to_vec(&json!({ "name": "Cup" })).unwrap();
        let response = transport
            .send(
                ApiRequest::put("/api/tournaments/7")
                    .bearer("tok-123")
                    .json(body),
            )
            .await
            .unwrap();

        assert!(response.is_success());
    }

    #[tokio::test]
    async fn test_send_error_status_is_not_a_transport_error() {
        // A 500 is a valid response. Interpreting it is the caller's job.
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/tournaments/1"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(json!({ "detail": "boom" })),
            )
            .mount(&server)
            .await;

        let transport = ReqwestTransport::new(&server.uri()).unwrap();
        let response = transport
            .send(ApiRequest::delete("/api/tournaments/1"))
            .await
            .expect("should still be Ok");

        assert_eq!(response.status, 500);
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn test_send_unreachable_host_returns_request_failed() {
        // Port 1 is reserved and nothing listens there.
        let transport = ReqwestTransport::new("http://127.0.0.1:1").unwrap();

        let result = transport.send(ApiRequest::get("/api/tournaments")).await;

        assert!(
            matches!(result, Err(TransportError::RequestFailed(_))),
            "expected RequestFailed, got {result:?}"
        );
    }
}
