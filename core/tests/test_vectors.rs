//! Drive `RpcClient::invoke_dynamic` with the cases in `test-vectors/invoke.json`.
//!
//! Each case names an endpoint, method, parameter, optional wildcard and
//! token, the request the client must send, a simulated response and the
//! expected outcome. A scripted transport records the request and replays the
//! simulated response. Bodies are compared as parsed JSON so key order does
//! not matter.

use std::sync::Mutex;

use serde_json::Value;
use typed_rpc::{
    ClientConfig, EndpointMap, HttpMethod, HttpRequest, HttpResponse, MemoryLogger, RpcClient,
    RpcError, Transport, TransportError,
};

/// Replays one response and keeps every request it was asked to send.
struct Scripted {
    response: HttpResponse,
    sent: Mutex<Vec<HttpRequest>>,
}

impl Scripted {
    fn new(response: HttpResponse) -> Self {
        Self {
            response,
            sent: Mutex::new(Vec::new()),
        }
    }

    fn sent(&self) -> Vec<HttpRequest> {
        self.sent.lock().unwrap().clone()
    }
}

impl Transport for Scripted {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.sent.lock().unwrap().push(request.clone());
        Ok(self.response.clone())
    }
}

fn load() -> Value {
    let raw = include_str!("../../test-vectors/invoke.json");
    serde_json::from_str(raw).unwrap()
}

fn scripted_client(host: &str, case: &Value) -> (RpcClient<Scripted>, MemoryLogger) {
    let sim = &case["simulated_response"];
    let response = HttpResponse::new(
        sim["status"].as_u64().unwrap() as u16,
        sim["body"].as_str().unwrap(),
    );
    let logger = MemoryLogger::new(false);
    let client = RpcClient::with_transport(
        ClientConfig::new(host),
        Scripted::new(response),
        logger.clone(),
    );
    client.set_token(case["token"].as_str().map(str::to_string));
    (client, logger)
}

fn declared(case: &Value) -> EndpointMap {
    let method = HttpMethod::parse(case["method"].as_str().unwrap()).unwrap();
    EndpointMap::new().with(case["endpoint"].as_str().unwrap(), method)
}

#[test]
fn invoke_test_vectors() {
    let vectors = load();
    let host = vectors["host"].as_str().unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let (client, logger) = scripted_client(host, case);

        let result = client.invoke_dynamic(
            &declared(case),
            case["endpoint"].as_str().unwrap(),
            case["method"].as_str().unwrap(),
            case["param"].clone(),
            case["wildcard"].as_str(),
        );

        // Verify the request that went out
        let sent = client.transport().sent();
        assert_eq!(sent.len(), 1, "{name}: requests sent");
        let req = &sent[0];
        let expected_req = &case["expected_request"];
        assert_eq!(req.method.as_str(), expected_req["method"].as_str().unwrap(), "{name}: method");
        assert_eq!(req.url, format!("{host}{}", expected_req["url"].as_str().unwrap()), "{name}: url");

        let expected_headers: Vec<(String, String)> = expected_req["headers"]
            .as_array()
            .unwrap()
            .iter()
            .map(|h| {
                let arr = h.as_array().unwrap();
                (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
            })
            .collect();
        assert_eq!(req.headers, expected_headers, "{name}: headers");

        match req.body.as_deref() {
            Some(body) => {
                let body: Value = serde_json::from_str(body).unwrap();
                assert_eq!(body, expected_req["body"], "{name}: body");
            }
            None => assert!(expected_req["body"].is_null(), "{name}: body should be present"),
        }

        // Verify the outcome
        if let Some(expected_error) = case.get("expected_error") {
            let err = result.unwrap_err();
            match expected_error["kind"].as_str().unwrap() {
                "server" => assert_eq!(
                    err,
                    RpcError::Server {
                        status: expected_error["status"].as_u64().unwrap() as u16,
                        message: expected_error["message"].as_str().unwrap().to_string(),
                    },
                    "{name}: error"
                ),
                "parse" => assert!(matches!(err, RpcError::Parse(_)), "{name}: expected parse error"),
                other => panic!("{name}: unknown error kind {other}"),
            }
            assert_eq!(logger.errors(), vec![err.detail()], "{name}: error log");
        } else {
            assert_eq!(result.unwrap(), case["expected_value"], "{name}: value");
            assert!(logger.errors().is_empty(), "{name}: no error logged");
        }
    }
}

#[test]
fn wildcard_vectors_require_a_value() {
    let vectors = load();
    let host = vectors["host"].as_str().unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let endpoint = case["endpoint"].as_str().unwrap();
        if !endpoint.contains('*') {
            continue;
        }
        let (client, logger) = scripted_client(host, case);
        let err = client
            .invoke_dynamic(
                &declared(case),
                endpoint,
                case["method"].as_str().unwrap(),
                case["param"].clone(),
                None,
            )
            .unwrap_err();

        assert!(matches!(err, RpcError::Configuration(_)), "{}", case["name"]);
        assert!(client.transport().sent().is_empty(), "{}: nothing sent", case["name"]);
        assert_eq!(logger.errors().len(), 1);
    }
}
