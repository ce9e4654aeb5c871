// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use crate::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use http::{Request, Response};
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Context bundles the HTTP sender and the environment a client runs with.
///
/// Nothing is wired up by default: a fresh context fails every request with a
/// transport error and sees an empty environment. Install the pieces you need:
///
/// ```
/// use osdsync_core::{Context, OsEnv};
///
/// let ctx = Context::new().with_env(OsEnv);
/// assert!(ctx.env_var("OSDSYNC_SURELY_UNSET").is_none());
/// ```
///
/// Cloning is cheap, the sender and the environment are shared.
#[derive(Clone)]
pub struct Context {
    http: Arc<dyn HttpSend>,
    env: Arc<dyn Env>,
}

impl Debug for Context {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("http", &self.http)
            .field("env", &self.env)
            .finish()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    /// Create a context without sender and environment.
    pub fn new() -> Self {
        Self {
            http: Arc::new(NoopHttpSend),
            env: Arc::new(NoopEnv),
        }
    }

    /// Send requests with `http`.
    pub fn with_http_send(self, http: impl HttpSend) -> Self {
        self.with_shared_http_send(Arc::new(http))
    }

    /// Send requests with an already shared `http`.
    pub fn with_shared_http_send(mut self, http: Arc<dyn HttpSend>) -> Self {
        self.http = http;
        self
    }

    /// Read environment variables from `env`.
    pub fn with_env(mut self, env: impl Env) -> Self {
        self.env = Arc::new(env);
        self
    }

    /// The sender requests go through, used to wrap it in another sender.
    pub fn http(&self) -> Arc<dyn HttpSend> {
        self.http.clone()
    }

    /// Send a request and wait for the full response.
    pub async fn http_send(&self, req: Request<Bytes>) -> Result<Response<Bytes>> {
        self.http.http_send(req).await
    }

    /// Look up an environment variable. Unset and non UTF-8 values are `None`.
    pub fn env_var(&self, key: &str) -> Option<String> {
        self.env.var(key)
    }
}

/// HttpSend sends one request and returns the buffered response.
///
/// Senders compose: [`SigningTransport`] of `osdsync-aws-v4` signs a request
/// and passes it on to the sender it wraps.
///
/// [`SigningTransport`]: https://docs.rs/osdsync-aws-v4
#[async_trait]
pub trait HttpSend: Debug + Send + Sync + 'static {
    /// Send `req`. Any status is a successful response, only failing to get
    /// one is an error.
    async fn http_send(&self, req: Request<Bytes>) -> Result<Response<Bytes>>;
}

/// Env gives access to environment variables.
pub trait Env: Debug + Send + Sync + 'static {
    /// Look up `key`. Unset and non UTF-8 values are `None`.
    fn var(&self, key: &str) -> Option<String>;
}

/// The environment of the current process.
#[derive(Debug, Copy, Clone)]
pub struct OsEnv;

impl Env for OsEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// A fixed set of variables, mostly for tests.
#[derive(Debug, Clone, Default)]
pub struct StaticEnv {
    /// Variables by name.
    pub envs: HashMap<String, String>,
}

impl Env for StaticEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.envs.get(key).cloned()
    }
}

/// Sender of a context that has none configured. Fails every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHttpSend;

#[async_trait]
impl HttpSend for NoopHttpSend {
    async fn http_send(&self, _: Request<Bytes>) -> Result<Response<Bytes>> {
        Err(Error::transport("no http sender configured"))
    }
}

/// Environment of a context that has none configured. Always empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEnv;

impl Env for NoopEnv {
    fn var(&self, _: &str) -> Option<String> {
        None
    }
}
