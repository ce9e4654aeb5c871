use std::mem;

use http::request::Parts;
use http::uri::{Authority, Scheme};
use http::{HeaderMap, Method, Uri};

use crate::{Error, Result};

/// SigningRequest is the mutable view of a request while it is being signed.
///
/// [`SigningRequest::build`] moves the uri and headers out of the request
/// parts, [`SigningRequest::apply`] moves them back.
#[derive(Debug)]
pub struct SigningRequest {
    /// HTTP method.
    pub method: Method,
    /// HTTP scheme, `http` when the uri has none.
    pub scheme: Scheme,
    /// HTTP authority.
    pub authority: Authority,
    /// HTTP path, as escaped on the wire.
    pub path: String,
    /// Decoded query pairs in request order.
    pub query: Vec<(String, String)>,
    /// HTTP headers.
    pub headers: HeaderMap,
}

impl SigningRequest {
    /// Take the uri and headers out of `parts`.
    ///
    /// A request without authority can't be signed.
    pub fn build(parts: &mut Parts) -> Result<Self> {
        let uri = mem::take(&mut parts.uri);
        let authority = uri.authority().cloned().ok_or_else(|| {
            Error::request_invalid(format!("request to {uri} has no authority to sign"))
        })?;

        Ok(SigningRequest {
            method: parts.method.clone(),
            scheme: uri.scheme().cloned().unwrap_or(Scheme::HTTP),
            authority,
            path: match uri.path() {
                "" => "/".to_string(),
                path => path.to_string(),
            },
            query: uri
                .query()
                .map(|q| {
                    form_urlencoded::parse(q.as_bytes())
                        .into_owned()
                        .collect()
                })
                .unwrap_or_default(),
            headers: mem::take(&mut parts.headers),
        })
    }

    /// Write method, uri and headers back into `parts`.
    ///
    /// Query pairs are written as they are, callers escape them first.
    pub fn apply(self, parts: &mut Parts) -> Result<()> {
        let mut path_and_query = self.path;
        for (idx, (k, v)) in self.query.iter().enumerate() {
            path_and_query.push(if idx == 0 { '?' } else { '&' });
            path_and_query.push_str(k);
            if !v.is_empty() {
                path_and_query.push('=');
                path_and_query.push_str(v);
            }
        }

        parts.uri = Uri::builder()
            .scheme(self.scheme)
            .authority(self.authority)
            .path_and_query(path_and_query)
            .build()?;
        parts.method = self.method;
        parts.headers = self.headers;
        Ok(())
    }

    /// Canonical form of the header `name` as it enters the signature.
    ///
    /// Every value is trimmed and inner runs of whitespace collapse into one
    /// space. Multiple values are joined with `,` in the order they were added.
    pub fn canonical_header_value(&self, name: &str) -> Result<String> {
        let values = self
            .headers
            .get_all(name)
            .iter()
            .map(|v| -> Result<String> {
                Ok(v.to_str()?.split_whitespace().collect::<Vec<_>>().join(" "))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(values.join(","))
    }

    /// Names of all headers, lowercase and sorted.
    pub fn signed_headers(&self) -> Vec<&str> {
        let mut names = self
            .headers
            .keys()
            .map(|k| k.as_str())
            .collect::<Vec<_>>();
        names.sort_unstable();
        names
    }
}
