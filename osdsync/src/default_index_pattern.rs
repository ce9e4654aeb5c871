use crate::request::{decode_body, is_ok, join_url, send, unexpected_status};
use bytes::Bytes;
use http::{Method, StatusCode};
use log::debug;
use osdsync_core::{Context, Error, FieldViolation, Result};
use serde::{Deserialize, Serialize};

/// Id under which the default index pattern is tracked as a resource.
///
/// There is only one default index pattern per dashboards tenant.
pub const DEFAULT_INDEX_PATTERN_ID: &str = "default-pattern";

#[derive(Debug, Serialize)]
struct SettingsChange<'a> {
    changes: DefaultIndexChange<'a>,
}

#[derive(Debug, Serialize)]
struct DefaultIndexChange<'a> {
    #[serde(rename = "defaultIndex")]
    default_index: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct SettingsResponse {
    #[serde(default)]
    changes: Option<ChangedSettings>,
    #[serde(default)]
    settings: Option<UserSettings>,
}

#[derive(Debug, Deserialize)]
struct ChangedSettings {
    #[serde(rename = "defaultIndex", default)]
    default_index: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserSettings {
    #[serde(rename = "defaultIndex", default)]
    default_index: Option<UserValue>,
}

#[derive(Debug, Deserialize)]
struct UserValue {
    #[serde(rename = "userValue", default)]
    user_value: Option<String>,
}

impl SettingsResponse {
    /// The `changes` envelope wins, a full settings listing is the fallback.
    fn default_index(self) -> Option<String> {
        match self.changes {
            Some(changes) => changes.default_index,
            None => self
                .settings
                .and_then(|s| s.default_index)
                .and_then(|v| v.user_value),
        }
    }
}

/// DefaultIndexPatternClient reads and writes the default index pattern of
/// dashboards via `{base_url}{path_prefix}/api/opensearch-dashboards/settings`.
#[derive(Clone, Debug)]
pub struct DefaultIndexPatternClient {
    ctx: Context,
    url: String,
}

impl DefaultIndexPatternClient {
    /// Create a new client. `ctx` sends the requests.
    pub fn new(ctx: Context, base_url: &str, path_prefix: &str) -> Self {
        Self {
            ctx,
            url: join_url(base_url, path_prefix, "/api/opensearch-dashboards/settings"),
        }
    }

    /// Get the id of the default index pattern.
    ///
    /// Returns `Ok(None)` when no default is set or the settings are not found.
    pub async fn get(&self) -> Result<Option<String>> {
        let resp = send(&self.ctx, Method::GET, &self.url, Bytes::new()).await?;
        if resp.status() == StatusCode::NOT_FOUND {
            debug!("default index pattern settings are absent");
            return Ok(None);
        }
        if !is_ok(&resp) {
            return Err(unexpected_status(&Method::GET, &self.url, resp));
        }

        let settings: SettingsResponse = decode_body(&Method::GET, &self.url, &resp)?;
        Ok(settings.default_index())
    }

    /// Point the default index pattern at `index_pattern_id`, or unset it with `None`.
    pub async fn set(&self, index_pattern_id: Option<&str>) -> Result<()> {
        if index_pattern_id == Some("") {
            return Err(Error::validation_failed(vec![FieldViolation::new(
                "index_pattern_id",
                "must not be empty",
            )]));
        }

        let body = serde_json::to_vec(&SettingsChange {
            changes: DefaultIndexChange {
                default_index: index_pattern_id,
            },
        })
        .map_err(|e| Error::unexpected("cannot encode settings change").with_source(e))?;
        let body = Bytes::from(body);

        let resp = send(&self.ctx, Method::POST, &self.url, body.clone()).await?;
        if !is_ok(&resp) {
            return Err(unexpected_status(&Method::POST, &self.url, resp)
                .with_request_body(String::from_utf8_lossy(&body)));
        }
        Ok(())
    }

    /// Unset the default index pattern.
    pub async fn clear(&self) -> Result<()> {
        self.set(None).await
    }
}
