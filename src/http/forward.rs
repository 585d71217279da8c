//! Forwarding requests to upstream origins.
//!
//! # Responsibilities
//! - Rebuild the request URI against the upstream origin
//! - Rewrite the Host header when the rule asks for it
//! - Bound connect time and time-to-response-head
//! - Stream bodies both ways
//!
//! # Design Decisions
//! - One pooled client shared by every request
//! - Exactly one upstream attempt per request; failures are never retried
//! - Dropping the returned response (client went away) drops the upstream
//!   body and with it the upstream connection

use std::time::Duration;

use axum::body::Body;
use axum::http::{header, HeaderValue, Request, Uri};
use axum::response::Response;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::{TokioExecutor, TokioTimer},
};

use crate::config::UpstreamConfig;
use crate::http::response::GatewayError;
use crate::routing::Forward;

type HttpsClient = Client<HttpsConnector<HttpConnector>, Body>;

/// HTTP(S) client for proxy rules.
#[derive(Clone)]
pub struct UpstreamClient {
    client: HttpsClient,
    response_timeout: Duration,
}

impl UpstreamClient {
    /// Build the pooled client. TLS uses the ring provider explicitly so the
    /// result does not depend on which rustls providers are compiled in.
    pub fn new(config: &UpstreamConfig) -> Result<Self, rustls::Error> {
        let mut http = HttpConnector::new();
        http.enforce_http(false);
        http.set_connect_timeout(Some(Duration::from_millis(config.connect_timeout_ms)));

        let https = HttpsConnectorBuilder::new()
            .with_provider_and_webpki_roots(rustls::crypto::ring::default_provider())?
            .https_or_http()
            .enable_http1()
            .wrap_connector(http);

        let client = Client::builder(TokioExecutor::new())
            .pool_timer(TokioTimer::new())
            .retry_canceled_requests(false)
            .build(https);

        Ok(Self {
            client,
            response_timeout: Duration::from_millis(config.response_timeout_ms),
        })
    }

    /// Send `request` to the rule's upstream and stream the answer back.
    pub async fn forward(
        &self,
        forward: &Forward<'_>,
        request: Request<Body>,
    ) -> Result<Response, GatewayError> {
        let origin = forward.origin().to_string();
        let (mut parts, body) = request.into_parts();

        let target = forward.target(parts.uri.query());
        let uri: Uri = target.parse().map_err(|e: axum::http::uri::InvalidUri| {
            GatewayError::InvalidTarget {
                target: target.clone(),
                reason: e.to_string(),
            }
        })?;

        if forward.change_origin() {
            let host = host_header(&uri).ok_or_else(|| GatewayError::InvalidTarget {
                target: target.clone(),
                reason: "no usable host for Host header".to_string(),
            })?;
            parts.headers.insert(header::HOST, host);
        }
        parts.uri = uri;

        tracing::debug!(
            upstream = %target,
            change_origin = forward.change_origin(),
            "Forwarding request"
        );

        let request = Request::from_parts(parts, body);
        let response = match tokio::time::timeout(self.response_timeout, self.client.request(request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(source)) => {
                return Err(GatewayError::Unreachable { origin, source });
            }
            Err(_) => {
                return Err(GatewayError::Timeout {
                    origin,
                    after: self.response_timeout,
                });
            }
        };

        let (parts, body) = response.into_parts();
        Ok(Response::from_parts(parts, Body::new(body)))
    }
}

/// `host[:port]` of `uri`, as sent in a Host header.
fn host_header(uri: &Uri) -> Option<HeaderValue> {
    let host = uri.host()?;
    let value = match uri.port_u16() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };
    HeaderValue::from_str(&value).ok()
}
