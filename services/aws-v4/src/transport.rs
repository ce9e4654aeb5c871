use crate::constants::{AWS_QUERY_ENCODE_SET, SIGNATURE_HEADERS};
use crate::{Credential, RequestSigner};
use async_trait::async_trait;
use bytes::Bytes;
use http::uri::PathAndQuery;
use http::{HeaderMap, HeaderName, Request, Response, Uri};
use log::debug;
use osdsync_core::{Context, Error, HttpSend, ProvideCredential, Result, Signer};
use percent_encoding::{percent_decode_str, utf8_percent_encode};
use std::sync::Arc;

/// SigningTransport signs every outgoing request with SigV4 and forwards it
/// to the wrapped [`HttpSend`].
///
/// The caller's request is never mutated. A fresh copy is built, signed with the
/// current time and handed to the next transport, so the same request can be
/// sent again and is signed anew each time. The response of the next transport
/// is returned as is.
#[derive(Clone, Debug)]
pub struct SigningTransport {
    signer: Signer<Credential>,
    next: Arc<dyn HttpSend>,
}

impl SigningTransport {
    /// Create a new signing transport.
    ///
    /// `ctx` is used to resolve credentials, `next` receives the signed requests.
    pub fn new(
        ctx: Context,
        provider: impl ProvideCredential<Credential = Credential>,
        signer: RequestSigner,
        next: Arc<dyn HttpSend>,
    ) -> Self {
        debug!(
            "signing requests for service {} in region {}",
            signer.service(),
            signer.region()
        );
        Self {
            signer: Signer::new(ctx, provider, signer),
            next,
        }
    }

    /// Build a signed copy of `req`.
    pub async fn sign(&self, req: &Request<Bytes>) -> Result<Request<Bytes>> {
        let body = req.body().clone();

        let (mut parts, ()) = Request::builder()
            .method(req.method().clone())
            .uri(canonicalize_uri(req.uri())?)
            .version(req.version())
            .body(())?
            .into_parts();
        parts.headers = req
            .headers()
            .iter()
            .filter(|(k, _)| !is_signature_header(k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        self.signer.sign(&mut parts, &body).await?;
        merge_headers(&mut parts.headers, req.headers());

        debug!("signed request: {} {}", parts.method, parts.uri);
        Ok(Request::from_parts(parts, body))
    }
}

#[async_trait]
impl HttpSend for SigningTransport {
    async fn http_send(&self, req: Request<Bytes>) -> Result<Response<Bytes>> {
        let signed = self.sign(&req).await?;
        self.next.http_send(signed).await
    }
}

fn is_signature_header(name: &HeaderName) -> bool {
    SIGNATURE_HEADERS.contains(&name.as_str())
}

/// Re-escape every path segment the canonical way.
///
/// Each segment is decoded and encoded again, so `a,b` and `a%2cb` are both
/// sent as `a%2Cb` while an escaped `/` inside a segment stays escaped.
fn canonicalize_uri(uri: &Uri) -> Result<Uri> {
    let path = uri
        .path()
        .split('/')
        .map(|segment| {
            let decoded = percent_decode_str(segment).decode_utf8().map_err(|e| {
                Error::request_invalid(format!("path segment {segment} is not valid utf-8"))
                    .with_source(e)
            })?;
            Ok(utf8_percent_encode(&decoded, &AWS_QUERY_ENCODE_SET).to_string())
        })
        .collect::<Result<Vec<_>>>()?
        .join("/");

    let paq = match uri.query() {
        Some(query) => format!("{path}?{query}"),
        None => path,
    };

    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(PathAndQuery::try_from(paq)?);
    Ok(Uri::from_parts(parts)?)
}

/// Restore the caller's headers on top of the signed ones.
///
/// Ordinary headers keep the caller's values. Headers owned by the signature
/// are only copied when the signer didn't produce them.
fn merge_headers(signed: &mut HeaderMap, original: &HeaderMap) {
    for name in original.keys() {
        if is_signature_header(name) {
            if signed.contains_key(name) {
                continue;
            }
        } else {
            signed.remove(name);
        }

        for value in original.get_all(name) {
            signed.append(name.clone(), value.clone());
        }
    }
}
