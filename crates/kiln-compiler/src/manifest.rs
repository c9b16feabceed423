//! Client assets manifest.
//!
//! Produced by the separate client build and treated by this pipeline as
//! an opaque value: the only thing the server compiler does with it is
//! serialize it into the manifest-injection module.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Manifest describing the client build's emitted assets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetsManifest {
    /// Content-derived manifest version.
    pub version: String,
    /// Public URL the manifest itself is served from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Client entry chunk.
    pub entry: ManifestEntry,
    /// Per-route chunks, keyed by route id.
    pub routes: FxHashMap<String, ManifestRoute>,
}

/// The client entry module and its static imports.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub module: String,
    #[serde(default)]
    pub imports: Vec<String>,
}

/// Asset metadata for one route.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestRoute {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default)]
    pub index: bool,
    pub module: String,
    #[serde(default)]
    pub imports: Vec<String>,
    #[serde(default)]
    pub has_action: bool,
    #[serde(default)]
    pub has_loader: bool,
    #[serde(default)]
    pub has_error_boundary: bool,
}
