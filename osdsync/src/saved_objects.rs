use crate::object::{validate_identity, DeclaredObject, SavedObject};
use crate::request::{decode_body, encode_segment, is_ok, join_url, send, unexpected_status};
use bytes::Bytes;
use http::{Method, StatusCode};
use log::debug;
use osdsync_core::{Context, Error, Result};

/// SavedObjectsClient reconciles saved objects against
/// `{base_url}{path_prefix}/api/saved_objects/{type}/{id}`.
///
/// Every call is a single request. Nothing is cached: the server is the only
/// source of truth.
#[derive(Clone, Debug)]
pub struct SavedObjectsClient {
    ctx: Context,
    base: String,
    sync_index_pattern_fields: bool,
}

impl SavedObjectsClient {
    /// Create a new client. `ctx` sends the requests.
    pub fn new(ctx: Context, base_url: &str, path_prefix: &str) -> Self {
        Self {
            ctx,
            base: join_url(base_url, path_prefix, "/api/saved_objects"),
            sync_index_pattern_fields: false,
        }
    }

    /// Keep the `fields` attribute of index patterns returned by [`Self::get`].
    pub fn with_sync_index_pattern_fields(mut self, sync: bool) -> Self {
        self.sync_index_pattern_fields = sync;
        self
    }

    fn url(&self, object_type: &str, id: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base,
            encode_segment(object_type),
            encode_segment(id)
        )
    }

    /// Fetch an object.
    ///
    /// Returns `Ok(None)` when the server answers 404. Unless field sync is
    /// enabled, the `fields` attribute of an index pattern is dropped before the
    /// attributes are rendered.
    pub async fn get(&self, object_type: &str, id: &str) -> Result<Option<DeclaredObject>> {
        validate_identity(object_type, id)?;

        let url = self.url(object_type, id);
        let resp = send(&self.ctx, Method::GET, &url, Bytes::new()).await?;
        if resp.status() == StatusCode::NOT_FOUND {
            debug!("saved object {object_type}/{id} is absent");
            return Ok(None);
        }
        if !is_ok(&resp) {
            return Err(unexpected_status(&Method::GET, &url, resp));
        }

        let mut obj: SavedObject = decode_body(&Method::GET, &url, &resp)?;
        if !self.sync_index_pattern_fields {
            obj.strip_index_pattern_fields();
        }

        DeclaredObject::try_from(obj).map(Some)
    }

    /// Create or overwrite an object.
    ///
    /// The request uses `overwrite=true`, so saving the same object twice leaves
    /// the same remote state behind.
    pub async fn save(&self, obj: &SavedObject) -> Result<()> {
        obj.validate()?;

        let url = format!("{}?overwrite=true", self.url(&obj.object_type, &obj.id));
        let body = serde_json::to_vec(&obj.payload()).map_err(|e| {
            Error::unexpected(format!(
                "cannot encode saved object {}/{}",
                obj.object_type, obj.id
            ))
            .with_source(e)
        })?;
        let body = Bytes::from(body);

        let resp = send(&self.ctx, Method::POST, &url, body.clone()).await?;
        if !is_ok(&resp) {
            return Err(unexpected_status(&Method::POST, &url, resp)
                .with_request_body(String::from_utf8_lossy(&body)));
        }
        Ok(())
    }

    /// Delete an object.
    ///
    /// Any status but 200 is an error, a 404 included.
    pub async fn delete(&self, object_type: &str, id: &str) -> Result<()> {
        validate_identity(object_type, id)?;

        let url = self.url(object_type, id);
        let resp = send(&self.ctx, Method::DELETE, &url, Bytes::new()).await?;
        if !is_ok(&resp) {
            return Err(unexpected_status(&Method::DELETE, &url, resp));
        }
        Ok(())
    }
}
