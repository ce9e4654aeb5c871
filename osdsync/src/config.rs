use osdsync_core::utils::Redact;
use osdsync_core::{Context, Error, FieldViolation, Result};
use osdsync_http_send_reqwest::ReqwestHttpSend;
use std::fmt::{Debug, Formatter};
use std::time::Duration;

/// Env name of the dashboards base url.
pub const OS_BASE_URL: &str = "OS_BASE_URL";
/// Env name of the index pattern field sync flag.
pub const OS_SYNC_INDEX_PATTERN_FIELDS: &str = "OS_SYNC_INDEX_PATTERN_FIELDS";
/// Env name of the authentication switch.
pub const OS_DISABLE_AUTHENTICATION: &str = "OS_DISABLE_AUTHENTICATION";
const AWS_REGION: &str = "AWS_REGION";
const AWS_DEFAULT_REGION: &str = "AWS_DEFAULT_REGION";

/// Path under which dashboards is served on managed OpenSearch domains.
pub const DEFAULT_PATH_PREFIX: &str = "/_dashboards";
/// Signing service of managed OpenSearch domains.
pub const DEFAULT_SERVICE: &str = "es";

/// Config for an OpenSearch Dashboards client.
#[derive(Clone)]
pub struct Config {
    /// Base url of the domain, e.g. `https://search-logs.eu-central-1.es.amazonaws.com`.
    pub base_url: String,
    /// Prefix put in front of every api path, `/_dashboards` by default.
    ///
    /// Must be empty or start with `/`.
    pub path_prefix: String,
    /// Keep the `fields` attribute of index patterns when reading them.
    pub sync_index_pattern_fields: bool,
    /// Send requests unsigned. Only meant for local clusters.
    pub disable_authentication: bool,
    /// Signing region, required unless authentication is disabled.
    pub region: Option<String>,
    /// Signing service, `es` by default.
    pub service: String,
    /// Timeout applied to every request.
    pub timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            path_prefix: DEFAULT_PATH_PREFIX.to_string(),
            sync_index_pattern_fields: false,
            disable_authentication: false,
            region: None,
            service: DEFAULT_SERVICE.to_string(),
            timeout: None,
        }
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &Redact::from(&self.base_url))
            .field("path_prefix", &self.path_prefix)
            .field("sync_index_pattern_fields", &self.sync_index_pattern_fields)
            .field("disable_authentication", &self.disable_authentication)
            .field("region", &self.region)
            .field("service", &self.service)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Config {
    /// Create a new config for the given base url.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the path prefix.
    pub fn with_path_prefix(mut self, path_prefix: impl Into<String>) -> Self {
        self.path_prefix = path_prefix.into();
        self
    }

    /// Keep the `fields` attribute of index patterns.
    pub fn with_sync_index_pattern_fields(mut self) -> Self {
        self.sync_index_pattern_fields = true;
        self
    }

    /// Send requests unsigned.
    pub fn with_disable_authentication(mut self) -> Self {
        self.disable_authentication = true;
        self
    }

    /// Set the signing region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Set the signing service.
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Fill the fields that are still unset from the environment.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        if self.base_url.is_empty() {
            if let Some(v) = ctx.env_var(OS_BASE_URL) {
                self.base_url = v;
            }
        }
        if !self.sync_index_pattern_fields {
            self.sync_index_pattern_fields =
                is_enabled(ctx.env_var(OS_SYNC_INDEX_PATTERN_FIELDS));
        }
        if !self.disable_authentication {
            self.disable_authentication = is_enabled(ctx.env_var(OS_DISABLE_AUTHENTICATION));
        }
        if self.region.is_none() {
            self.region = ctx
                .env_var(AWS_REGION)
                .or_else(|| ctx.env_var(AWS_DEFAULT_REGION));
        }

        self
    }

    /// Check the config, reporting every problem at once.
    pub fn validate(&self) -> Result<()> {
        let mut violations = Vec::new();

        if self.base_url.is_empty() {
            violations.push(FieldViolation::new(
                "base_url",
                format!("must be set, or provided via {OS_BASE_URL}"),
            ));
        } else if !(self.base_url.starts_with("https://") || self.base_url.starts_with("http://"))
        {
            violations.push(FieldViolation::new(
                "base_url",
                "must start with http:// or https://",
            ));
        }

        if !self.path_prefix.is_empty() && !self.path_prefix.starts_with('/') {
            violations.push(FieldViolation::new("path_prefix", "must start with /"));
        }

        if !self.disable_authentication {
            if self.region.as_deref().unwrap_or_default().is_empty() {
                violations.push(FieldViolation::new(
                    "region",
                    format!("must be set, or provided via {AWS_REGION}"),
                ));
            }
            if self.service.is_empty() {
                violations.push(FieldViolation::new("service", "must not be empty"));
            }
        }

        if violations.is_empty() {
            return Ok(());
        }
        let message = violations
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        Err(Error::config_invalid(message).with_violations(violations))
    }

    /// Build a reqwest backed [`HttpSend`](osdsync_core::HttpSend) honoring the timeout.
    pub fn http_send(&self) -> Result<ReqwestHttpSend> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| Error::config_invalid("failed to build http client").with_source(e))?;
        Ok(ReqwestHttpSend::new(client))
    }
}

fn is_enabled(value: Option<String>) -> bool {
    value.is_some_and(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "on" | "yes"))
}
