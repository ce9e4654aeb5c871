use crate::{Config, DefaultIndexPatternClient, SavedObjectsClient};
use log::debug;
use osdsync_aws_v4::{Credential, EnvCredentialProvider, RequestSigner, SigningTransport};
use osdsync_core::{Context, ProvideCredential, Result};

/// DashboardsClient bundles the reconcilers of one dashboards endpoint.
///
/// Requests are sent through the [`HttpSend`](osdsync_core::HttpSend) of the given
/// context. Unless authentication is disabled, that sender is wrapped in a
/// [`SigningTransport`] so every request is SigV4 signed.
///
/// ```no_run
/// use osdsync::{Config, Context, DashboardsClient, OsEnv};
///
/// # async fn example() -> osdsync::Result<()> {
/// let ctx = Context::new().with_env(OsEnv);
/// let config = Config::default().from_env(&ctx);
/// let ctx = ctx.with_http_send(config.http_send()?);
///
/// let client = DashboardsClient::new(ctx, config)?;
/// let pattern = client.default_index_pattern().get().await?;
/// println!("default index pattern: {pattern:?}");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct DashboardsClient {
    saved_objects: SavedObjectsClient,
    default_index_pattern: DefaultIndexPatternClient,
}

impl DashboardsClient {
    /// Create a new client, loading credentials from the environment.
    pub fn new(ctx: Context, config: Config) -> Result<Self> {
        Self::with_credential_provider(ctx, config, EnvCredentialProvider::new())
    }

    /// Create a new client with the given credential provider.
    ///
    /// The provider is consulted for every request.
    pub fn with_credential_provider(
        ctx: Context,
        config: Config,
        provider: impl ProvideCredential<Credential = Credential>,
    ) -> Result<Self> {
        config.validate()?;

        let ctx = if config.disable_authentication {
            debug!("authentication is disabled, requests are sent unsigned");
            ctx
        } else {
            // validate() guarantees a region here.
            let region = config.region.as_deref().unwrap_or_default();
            let transport = SigningTransport::new(
                ctx.clone(),
                provider,
                RequestSigner::new(&config.service, region),
                ctx.http(),
            );
            ctx.with_http_send(transport)
        };

        Ok(Self {
            saved_objects: SavedObjectsClient::new(
                ctx.clone(),
                &config.base_url,
                &config.path_prefix,
            )
            .with_sync_index_pattern_fields(config.sync_index_pattern_fields),
            default_index_pattern: DefaultIndexPatternClient::new(
                ctx,
                &config.base_url,
                &config.path_prefix,
            ),
        })
    }

    /// Client for saved objects.
    pub fn saved_objects(&self) -> &SavedObjectsClient {
        &self.saved_objects
    }

    /// Client for the default index pattern.
    pub fn default_index_pattern(&self) -> &DefaultIndexPatternClient {
        &self.default_index_pattern
    }
}
