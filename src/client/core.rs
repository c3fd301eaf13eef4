// File: src/client/core.rs
use anyhow::{Context, Result, anyhow};
use http::{Request, Uri, header};
use http_body_util::BodyExt;
use hyper_rustls::HttpsConnectorBuilder;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use std::time::Duration;

const USER_AGENT: &str = concat!("inkdesk/", env!("CARGO_PKG_VERSION"));

type HttpsClient = Client<hyper_rustls::HttpsConnector<HttpConnector>, String>;

/// Shared HTTPS client for feed and weather fetches. Built once at startup;
/// cloning is cheap and safe across concurrent cycles.
#[derive(Clone)]
pub struct HttpFetcher {
    client: HttpsClient,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let mut root_store = rustls::RootCertStore::empty();
        let result = rustls_native_certs::load_native_certs();
        root_store.add_parsable_certificates(result.certs);
        if root_store.is_empty() {
            // Only https sources need roots; keep going so plain-http
            // setups on a LAN still work.
            log::warn!("No valid system certificates found; https fetches will fail");
        }

        let tls_config = rustls::ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();

        let https_connector = HttpsConnectorBuilder::new()
            .with_tls_config(tls_config)
            .https_or_http()
            .enable_http1()
            .build();

        let client = Client::builder(TokioExecutor::new()).build(https_connector);

        Ok(Self { client, timeout })
    }

    /// GET a URL and return the body as text. Transport errors, timeouts and
    /// non-success statuses are all failures; callers decide whether a given
    /// failure is recoverable.
    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        let uri: Uri = url
            .parse()
            .with_context(|| format!("Invalid URL '{}'", url))?;

        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .header(header::USER_AGENT, USER_AGENT)
            .header(header::ACCEPT, "*/*")
            .body(String::new())?;

        let response = tokio::time::timeout(self.timeout, self.client.request(request))
            .await
            .map_err(|_| anyhow!("Request to '{}' timed out", url))?
            .with_context(|| format!("Request to '{}' failed", url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("'{}' returned status {}", url, status));
        }

        let body = response
            .into_body()
            .collect()
            .await
            .with_context(|| format!("Failed to read body from '{}'", url))?
            .to_bytes();

        String::from_utf8(body.to_vec())
            .with_context(|| format!("Body from '{}' is not valid UTF-8", url))
    }
}
