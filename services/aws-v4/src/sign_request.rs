use crate::constants::{
    AWS_QUERY_ENCODE_SET, AWS_URI_ENCODE_SET, X_AMZ_CONTENT_SHA_256, X_AMZ_DATE,
    X_AMZ_SECURITY_TOKEN,
};
use crate::Credential;
use async_trait::async_trait;
use http::request::Parts;
use http::{header, HeaderValue};
use log::debug;
use osdsync_core::hash::{hex_hmac_sha256, hex_sha256, hmac_sha256};
use osdsync_core::time::{format_date, format_iso8601, now, DateTime};
use osdsync_core::{Context, Error, Result, SignRequest, SigningRequest};
use percent_encoding::{percent_decode_str, utf8_percent_encode};
use std::fmt::Write;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// RequestSigner computes AWS SigV4 header signatures.
///
/// See [Signature Version 4 signing process](https://docs.aws.amazon.com/general/latest/gr/signature-version-4.html).
///
/// The payload is always part of the signature: `x-amz-content-sha256` holds
/// the hex SHA-256 of the exact body bytes, an absent body hashes as empty.
#[derive(Debug, Clone)]
pub struct RequestSigner {
    service: String,
    region: String,

    time: Option<DateTime>,
}

impl RequestSigner {
    /// Create a new signer for the given service and region.
    pub fn new(service: &str, region: &str) -> Self {
        Self {
            service: service.to_string(),
            region: region.to_string(),
            time: None,
        }
    }

    /// Pin the signing time. Only meant for tests.
    #[cfg(test)]
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Service name used in the credential scope.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Region used in the credential scope.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Build the canonical URI for the escaped request path.
    ///
    /// S3 signs the path escaped once. Every other service, OpenSearch included,
    /// signs the path as sent escaped a second time.
    fn canonical_path(&self, path: &str) -> Result<String> {
        if self.service != "s3" {
            return Ok(utf8_percent_encode(path, &AWS_URI_ENCODE_SET).to_string());
        }

        let path = percent_decode_str(path).decode_utf8().map_err(|e| {
            Error::request_invalid(format!("failed to decode path {path}")).with_source(e)
        })?;
        Ok(utf8_percent_encode(&path, &AWS_URI_ENCODE_SET).to_string())
    }

    /// `<date>/<region>/<service>/aws4_request`
    fn scope(&self, now: DateTime) -> String {
        format!(
            "{}/{}/{}/aws4_request",
            format_date(now),
            self.region,
            self.service
        )
    }

    fn signing_key(&self, secret: &str, now: DateTime) -> Vec<u8> {
        let key = format!("AWS4{secret}");
        [
            self.region.as_bytes(),
            self.service.as_bytes(),
            b"aws4_request".as_slice(),
        ]
        .iter()
        .fold(
            hmac_sha256(key.as_bytes(), format_date(now).as_bytes()),
            |key, part| hmac_sha256(&key, part),
        )
    }
}

#[async_trait]
impl SignRequest for RequestSigner {
    type Credential = Credential;

    fn validate(&self) -> Result<()> {
        if self.service.is_empty() {
            return Err(Error::request_invalid("signing service must not be empty"));
        }
        if self.region.is_empty() {
            return Err(Error::request_invalid("signing region must not be empty"));
        }
        Ok(())
    }

    async fn sign_request(
        &self,
        _: &Context,
        req: &mut Parts,
        body: &[u8],
        cred: &Self::Credential,
    ) -> Result<()> {
        self.validate()?;

        let now = self.time.unwrap_or_else(now);
        let mut signing = SigningRequest::build(req)?;

        prepare_headers(&mut signing, cred, body, now)?;
        encode_query(&mut signing);

        let canonical_path = self.canonical_path(&signing.path)?;
        let canonical_request = canonical_request(&signing, &canonical_path)?;

        let scope = self.scope(now);
        let string_to_sign = format!(
            "{ALGORITHM}\n{}\n{scope}\n{}",
            format_iso8601(now),
            hex_sha256(canonical_request.as_bytes())
        );
        debug!("string to sign: {string_to_sign}");

        let signature = hex_hmac_sha256(
            &self.signing_key(&cred.secret_access_key, now),
            string_to_sign.as_bytes(),
        );

        let mut authorization = HeaderValue::from_str(&format!(
            "{ALGORITHM} Credential={}/{scope}, SignedHeaders={}, Signature={signature}",
            cred.access_key_id,
            signing.signed_headers().join(";"),
        ))?;
        authorization.set_sensitive(true);
        signing.headers.insert(header::AUTHORIZATION, authorization);

        signing.apply(req)
    }
}

/// Method, path, query, headers, signed header list and payload hash,
/// one per line.
fn canonical_request(req: &SigningRequest, path: &str) -> Result<String> {
    let mut out = String::with_capacity(256);

    writeln!(out, "{}", req.method)?;
    writeln!(out, "{path}")?;

    let query = req
        .query
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>();
    writeln!(out, "{}", query.join("&"))?;

    let signed_headers = req.signed_headers();
    for name in &signed_headers {
        writeln!(out, "{name}:{}", req.canonical_header_value(name)?)?;
    }
    writeln!(out)?;
    writeln!(out, "{}", signed_headers.join(";"))?;
    write!(out, "{}", req.headers[X_AMZ_CONTENT_SHA_256].to_str()?)?;

    Ok(out)
}

fn prepare_headers(
    req: &mut SigningRequest,
    cred: &Credential,
    body: &[u8],
    now: DateTime,
) -> Result<()> {
    if !req.headers.contains_key(header::HOST) {
        let host = HeaderValue::from_str(req.authority.as_str())?;
        req.headers.insert(header::HOST, host);
    }

    req.headers
        .insert(X_AMZ_DATE, HeaderValue::try_from(format_iso8601(now))?);
    req.headers
        .insert(X_AMZ_CONTENT_SHA_256, HeaderValue::try_from(hex_sha256(body))?);

    match &cred.session_token {
        Some(token) => {
            let mut value = HeaderValue::from_str(token)?;
            value.set_sensitive(true);
            req.headers.insert(X_AMZ_SECURITY_TOKEN, value);
        }
        None => {
            req.headers.remove(X_AMZ_SECURITY_TOKEN);
        }
    }

    Ok(())
}

/// Sort the query by key then value and escape both sides.
fn encode_query(req: &mut SigningRequest) {
    req.query.sort();
    for (k, v) in req.query.iter_mut() {
        *k = utf8_percent_encode(k, &AWS_QUERY_ENCODE_SET).to_string();
        *v = utf8_percent_encode(v, &AWS_QUERY_ENCODE_SET).to_string();
    }
}
