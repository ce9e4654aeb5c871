use crate::{Context, Error, ProvideCredential, Result, SignRequest, SigningCredential};
use std::sync::Arc;

/// Signer is the main struct used to sign the request.
///
/// Credentials are resolved again for every request, nothing is cached between calls.
#[derive(Clone, Debug)]
pub struct Signer<K: SigningCredential> {
    ctx: Context,
    provider: Arc<dyn ProvideCredential<Credential = K>>,
    signer: Arc<dyn SignRequest<Credential = K>>,
}

impl<K: SigningCredential> Signer<K> {
    /// Create a new signer.
    pub fn new(
        ctx: Context,
        provider: impl ProvideCredential<Credential = K>,
        signer: impl SignRequest<Credential = K>,
    ) -> Self {
        Self {
            ctx,
            provider: Arc::new(provider),
            signer: Arc::new(signer),
        }
    }

    /// Signing request.
    pub async fn sign(&self, req: &mut http::request::Parts, body: &[u8]) -> Result<()> {
        self.signer.validate()?;

        let cred = self
            .provider
            .provide_credential(&self.ctx)
            .await
            .map_err(|err| {
                if err.is_signing_error() {
                    err
                } else {
                    Error::credential_invalid("failed to resolve credential").with_source(err)
                }
            })?;
        let Some(cred) = cred.filter(|c| c.is_valid()) else {
            return Err(Error::credential_invalid(
                "no valid credential found for signing",
            ));
        };

        self.signer
            .sign_request(&self.ctx, req, body, &cred)
            .await
    }
}
