//! Reconcile OpenSearch Dashboards saved objects and the default index pattern.
//!
//! The crate maps desired state onto single REST calls against dashboards:
//!
//! - [`SavedObjectsClient`] gets, saves (upsert with `overwrite=true`) and deletes
//!   saved objects. A missing object is `Ok(None)`, never an error.
//! - [`DefaultIndexPatternClient`] reads and writes the default index pattern.
//! - [`DashboardsClient`] wires both from a [`Config`], signing every request
//!   with AWS SigV4 unless authentication is disabled.
//!
//! Core types such as [`Context`], [`Error`] and [`Result`] are re-exported from
//! `osdsync-core`, the signing pieces live in [`aws`].

#![warn(missing_docs)]

pub use osdsync_core::*;

/// AWS SigV4 signing.
pub mod aws {
    pub use osdsync_aws_v4::*;
}

mod client;
pub use client::DashboardsClient;

mod config;
pub use config::*;

mod default_index_pattern;
pub use default_index_pattern::{DefaultIndexPatternClient, DEFAULT_INDEX_PATTERN_ID};

mod object;
pub use object::*;

mod request;

mod saved_objects;
pub use saved_objects::SavedObjectsClient;
