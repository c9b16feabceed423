//! Bundler plugins for the server compilation pipeline.
//!
//! Each plugin is a thin `rolldown_plugin::Plugin` implementation with a
//! single job; the ordering that makes them cooperate lives in
//! [`crate::builder`], not here.

pub mod app_alias;
pub mod assets_manifest;
pub mod bare_imports;
pub mod css_file;
pub mod define;
pub mod deprecated;
pub mod empty_client;
pub mod entry_module;
pub mod mdx;
pub mod node_polyfill;
pub mod route_modules;
pub mod url_imports;

pub use app_alias::AppAliasPlugin;
pub use assets_manifest::AssetsManifestPlugin;
pub use bare_imports::BareImportsPlugin;
pub use css_file::CssFilePlugin;
pub use define::DefinePlugin;
pub use deprecated::DeprecatedImportsPlugin;
pub use empty_client::EmptyClientModulesPlugin;
pub use entry_module::ServerEntryPlugin;
pub use mdx::MdxPlugin;
pub use node_polyfill::NodePolyfillPlugin;
pub use route_modules::RouteModulesPlugin;
pub use url_imports::UrlImportsPlugin;

use rolldown_common::ModuleType;
use std::path::Path;

/// Virtual module id of the bundler entry when the entry is synthesized
/// from config rather than read from disk.
pub const SERVER_ENTRY_ID: &str = "kiln:server-entry";

/// Virtual module id of the generated server build module that wires
/// routes and the assets manifest together.
pub const SERVER_BUILD_ID: &str = "kiln:server-build";

/// Virtual module id carrying the serialized client assets manifest.
pub const ASSETS_MANIFEST_ID: &str = "kiln:assets-manifest";

/// URI scheme tagging route modules so the loader (and later the
/// source-map fixup) can tell them apart from ordinary files.
pub const ROUTE_SCHEME: &str = "route:";

/// Infers module type from file extension.
pub(crate) fn infer_module_type(id: &str) -> ModuleType {
    match Path::new(id).extension().and_then(|e| e.to_str()) {
        Some("tsx") => ModuleType::Tsx,
        Some("ts") => ModuleType::Ts,
        Some("jsx") => ModuleType::Jsx,
        Some("mdx") | Some("md") => ModuleType::Jsx,
        Some("css") => ModuleType::Css,
        Some("json") => ModuleType::Json,
        _ => ModuleType::Js,
    }
}
