use bytes::Bytes;
use http::{header, Method, Request, Response, StatusCode};
use log::debug;
use osdsync_core::{Context, Error, Result};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::de::DeserializeOwned;

/// Header that lets dashboards accept a request without an XSRF token.
pub(crate) const XSRF_HEADER: &str = "osd-xsrf";

/// Everything but the unreserved characters is escaped in a path segment.
const PATH_SEGMENT_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

pub(crate) fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, &PATH_SEGMENT_ENCODE_SET).to_string()
}

/// Build `{base_url}{path_prefix}{path}` with surplus slashes trimmed.
pub(crate) fn join_url(base_url: &str, path_prefix: &str, path: &str) -> String {
    format!(
        "{}{}{}",
        base_url.trim_end_matches('/'),
        path_prefix.trim_end_matches('/'),
        path
    )
}

/// Send a dashboards api request with the required headers.
pub(crate) async fn send(
    ctx: &Context,
    method: Method,
    url: &str,
    body: Bytes,
) -> Result<Response<Bytes>> {
    let req = Request::builder()
        .method(method.clone())
        .uri(url)
        .header(XSRF_HEADER, "true")
        .header(header::CONTENT_TYPE, "application/json")
        .body(body)
        .map_err(|e| {
            Error::request_invalid(format!("cannot build request to {method} '{url}'"))
                .with_source(e)
        })?;

    debug!("{method} {url}");
    let resp = ctx.http_send(req).await?;
    debug!("{method} {url} responded {}", resp.status());
    Ok(resp)
}

/// Turn an unexpected response into a remote error.
///
/// A body that isn't valid UTF-8 is dropped, the status is kept.
pub(crate) fn unexpected_status(method: &Method, url: &str, resp: Response<Bytes>) -> Error {
    let status = resp.status();
    let body = String::from_utf8(resp.into_body().to_vec()).ok();
    Error::remote(format!("{method} '{url}'"), status, body)
}

pub(crate) fn decode_body<T: DeserializeOwned>(
    method: &Method,
    url: &str,
    resp: &Response<Bytes>,
) -> Result<T> {
    serde_json::from_slice(resp.body()).map_err(|e| {
        Error::decode(format!("cannot decode response body of {method} '{url}'")).with_source(e)
    })
}

pub(crate) fn is_ok(resp: &Response<Bytes>) -> bool {
    resp.status() == StatusCode::OK
}
