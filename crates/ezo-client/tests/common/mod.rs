//! Shared fixtures for the wiremock-backed client tests.

#![allow(dead_code)]

use ezo_client::EzoClient;
use ezo_config::EzoConfig;
use wiremock::{MockServer, Request};

pub const TOKEN: &str = "test-token";

pub fn client_for(server: &MockServer) -> EzoClient {
    EzoClient::new(EzoConfig::new(server.uri(), TOKEN)).expect("client builds")
}

pub async fn requests(server: &MockServer) -> Vec<Request> {
    server
        .received_requests()
        .await
        .expect("request recording is enabled")
}

/// Decoded query pairs in the order they were sent.
pub fn query_pairs(req: &Request) -> Vec<(String, String)> {
    req.url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

/// Decoded `application/x-www-form-urlencoded` body pairs.
pub fn form_pairs(req: &Request) -> Vec<(String, String)> {
    let body = String::from_utf8(req.body.clone()).expect("utf-8 form body");
    body.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode(name), decode(value))
        })
        .collect()
}

fn decode(raw: &str) -> String {
    urlencoding::decode(&raw.replace('+', " "))
        .expect("valid percent-encoding")
        .into_owned()
}
