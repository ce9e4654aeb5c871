
use anyhow::Result;
use bytes::Bytes;
use http::{header, Method, Request, StatusCode};
use log::debug;
use osdsync_aws_v4::{EnvCredentialProvider, RequestSigner, SigningTransport};
use osdsync_core::{Context, HttpSend, OsEnv};
use osdsync_http_send_reqwest::ReqwestHttpSend;
use std::env;
use std::sync::Arc;

/// Initialize test environment.
///
/// Returns the transport and the dashboards url, `{OS_BASE_URL}{OS_PATH_PREFIX}`.
pub fn init_signing_test() -> Option<(SigningTransport, String)> {
    let _ = env_logger::builder().is_test(true).try_init();
    let _ = dotenv::dotenv();

    if env::var("OSDSYNC_TEST").as_deref() != Ok("on") {
        return None;
    }

    let base_url = env::var("OS_BASE_URL").expect("OS_BASE_URL must be set");
    let path_prefix = env::var("OS_PATH_PREFIX").unwrap_or_else(|_| "/_dashboards".to_string());
    let region = env::var("AWS_REGION").expect("AWS_REGION must be set");

    let ctx = Context::new().with_env(OsEnv);
    let transport = SigningTransport::new(
        ctx,
        EnvCredentialProvider::new(),
        RequestSigner::new("es", &region),
        Arc::new(ReqwestHttpSend::default()),
    );

    Some((transport, format!("{base_url}{path_prefix}")))
}

/// Send a dashboards api request through the signing transport.
pub async fn send_signed_request(
    transport: &SigningTransport,
    method: Method,
    url: &str,
    body: &'static str,
) -> Result<(StatusCode, String)> {
    let req = Request::builder()
        .method(method)
        .uri(url)
        .header("osd-xsrf", "true")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Bytes::from_static(body.as_bytes()))?;

    let resp = transport.http_send(req).await?;
    let status = resp.status();
    let body = String::from_utf8_lossy(resp.body()).to_string();

    debug!("response status: {status}, body: {body}");
    Ok((status, body))
}
