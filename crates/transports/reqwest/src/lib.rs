use crate::ai_sdk_core::error::{display_body_for_error, TransportError};
use crate::ai_sdk_core::transport::{ByteStream, HttpTransport, TransportConfig};
use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use serde_json::Value;
use std::error::Error as StdError;
use std::time::{Duration, Instant};
use tracing::debug;

const LOG_TARGET: &str = "copilot_boost::transport::reqwest";

/// Header names whose values never reach the logs.
const SECRET_HEADERS: &[&str] = &["authorization", "x-api-key", "x-goog-api-key"];

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    fn configure_builder(
        mut builder: reqwest::ClientBuilder,
        cfg: &TransportConfig,
    ) -> reqwest::ClientBuilder {
        builder = builder
            .tcp_keepalive(Some(Duration::from_secs(60)))
            .pool_idle_timeout(Duration::from_secs(90));
        if let Some(req_timeout) = cfg.request_timeout {
            builder = builder.timeout(req_timeout);
        }
        builder.connect_timeout(cfg.connect_timeout)
    }

    fn try_new_with_builder(
        cfg: &TransportConfig,
        builder: reqwest::ClientBuilder,
    ) -> Result<Self, TransportError> {
        let builder = Self::configure_builder(builder, cfg);
        let client = builder.build().map_err(|err| {
            TransportError::Other(format!(
                "reqwest client build failed: {}",
                format_reqwest_error_chain(&err)
            ))
        })?;
        Ok(Self { client })
    }

    pub fn try_new(cfg: &TransportConfig) -> Result<Self, TransportError> {
        Self::try_new_with_builder(cfg, Client::builder())
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    type StreamResponse = (ByteStream, Vec<(String, String)>);

    fn into_stream(resp: Self::StreamResponse) -> (ByteStream, Vec<(String, String)>) {
        resp
    }

    async fn post_json_stream(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &Value,
        cfg: &TransportConfig,
    ) -> Result<Self::StreamResponse, TransportError> {
        let mut req = self.client.post(url).json(body);
        for (k, v) in headers {
            // .json() already sets it
            if !k.eq_ignore_ascii_case("content-type") {
                req = req.header(k, v);
            }
        }
        debug!(
            target: LOG_TARGET,
            url,
            headers = ?redacted_headers(headers),
            "POST stream"
        );

        let started = Instant::now();
        let resp = match req.send().await {
            Ok(r) => r,
            Err(e) => {
                let detail = format_reqwest_error_chain(&e);
                debug!(target: LOG_TARGET, %detail, "reqwest send failed");
                return Err(if e.is_connect() {
                    TransportError::Network(format!("connect: {detail}"))
                } else if e.is_timeout() {
                    TransportError::ConnectTimeout(cfg.connect_timeout)
                } else {
                    TransportError::Network(detail)
                });
            }
        };

        let status = resp.status();
        let res_headers = header_pairs(resp.headers());
        debug!(
            target: LOG_TARGET,
            status = status.as_u16(),
            latency_ms = started.elapsed().as_millis() as u64,
            "response headers received"
        );

        if !status.is_success() {
            let retry_after_ms = resp
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|h| h.to_str().ok())
                .and_then(parse_retry_after_ms);
            let body_text = resp.text().await.unwrap_or_default();
            let sanitized = display_body_for_error(&body_text);
            return Err(TransportError::HttpStatus {
                status: status.as_u16(),
                body: body_text,
                retry_after_ms,
                sanitized,
                headers: res_headers,
            });
        }

        let idle = cfg.idle_read_timeout;
        let mut inner = resp.bytes_stream();
        let s = async_stream::try_stream! {
            loop {
                match tokio::time::timeout(idle, inner.next()).await {
                    Err(_) => Err(TransportError::IdleReadTimeout(idle))?,
                    Ok(None) => break,
                    Ok(Some(Err(e))) => {
                        if e.is_timeout() {
                            Err(TransportError::IdleReadTimeout(idle))?;
                        } else {
                            Err(TransportError::BodyRead(e.to_string()))?;
                        }
                    }
                    Ok(Some(Ok(bytes))) => yield bytes,
                }
            }
        };
        Ok((Box::pin(s), res_headers))
    }
}

fn redacted_headers(headers: &[(String, String)]) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(k, v)| {
            let secret = SECRET_HEADERS.iter().any(|s| k.eq_ignore_ascii_case(s));
            (k.clone(), if secret { "***".to_string() } else { v.clone() })
        })
        .collect()
}

fn header_pairs(headers: &http::HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .filter_map(|(k, v)| v.to_str().ok().map(|s| (k.to_string(), s.to_string())))
        .collect()
}

fn parse_retry_after_ms(s: &str) -> Option<u64> {
    // delta-seconds only; HTTP dates are ignored
    s.trim().parse::<u64>().ok().map(|secs| secs * 1000)
}

fn format_reqwest_error_chain(err: &reqwest::Error) -> String {
    let mut out = err.to_string();
    let mut current = err.source();
    while let Some(src) = current {
        out.push_str(": ");
        out.push_str(&src.to_string());
        current = src.source();
    }
    out
}
