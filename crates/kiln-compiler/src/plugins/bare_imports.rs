//! Bare-import externalizer.
//!
//! Last plugin in the chain: every scheme-tagged or relative specifier
//! has been claimed by now, so whatever bare package names remain are
//! decided here. On plain Node the bundle can `require` from
//! `node_modules` at runtime, so bare imports stay external; worker and
//! Deno runtimes have no package store, so bare imports get bundled.
//! Style and asset files inside packages are always bundled since they
//! cannot be required at runtime.

use std::borrow::Cow;

use rolldown_common::ResolvedExternal;
use rolldown_plugin::{
    HookResolveIdArgs, HookResolveIdOutput, HookResolveIdReturn, Plugin, PluginContext,
};

use crate::target::ServerPlatform;

const BUNDLED_ASSET_EXTENSIONS: &[&str] = &[".css", ".json", ".svg", ".png", ".jpg", ".woff2"];

/// Externalizes bare package imports on runtimes with a package store.
#[derive(Debug, Clone)]
pub struct BareImportsPlugin {
    platform: ServerPlatform,
}

impl BareImportsPlugin {
    pub fn new(platform: ServerPlatform) -> Self {
        Self { platform }
    }
}

impl Plugin for BareImportsPlugin {
    fn name(&self) -> Cow<'static, str> {
        "kiln:bare-imports".into()
    }

    fn register_hook_usage(&self) -> rolldown_plugin::HookUsage {
        rolldown_plugin::HookUsage::ResolveId
    }

    fn resolve_id(
        &self,
        _ctx: &PluginContext,
        args: &HookResolveIdArgs,
    ) -> impl std::future::Future<Output = HookResolveIdReturn> + Send {
        let specifier = args.specifier.to_string();
        let platform = self.platform;

        async move {
            if !should_externalize(platform, &specifier) {
                return Ok(None);
            }
            Ok(Some(HookResolveIdOutput {
                id: specifier.into(),
                external: Some(ResolvedExternal::Bool(true)),
                ..Default::default()
            }))
        }
    }
}

/// A bare specifier names a package rather than a path or a tagged
/// virtual module.
pub(crate) fn is_bare_import(specifier: &str) -> bool {
    !(specifier.starts_with('.')
        || specifier.starts_with('/')
        || specifier.starts_with("~/")
        || specifier.contains(':'))
}

pub(crate) fn should_externalize(platform: ServerPlatform, specifier: &str) -> bool {
    if !platform.is_node() || !is_bare_import(specifier) {
        return false;
    }
    // Runtime require() cannot load these; bundle them instead.
    !BUNDLED_ASSET_EXTENSIONS
        .iter()
        .any(|ext| specifier.ends_with(ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_detection() {
        assert!(is_bare_import("react"));
        assert!(is_bare_import("@scope/pkg"));
        assert!(is_bare_import("pkg/subpath"));
        assert!(!is_bare_import("./local"));
        assert!(!is_bare_import("../up"));
        assert!(!is_bare_import("/abs"));
        assert!(!is_bare_import("~/app-module"));
        assert!(!is_bare_import("route:app/routes/home.tsx"));
        assert!(!is_bare_import("kiln:server-build"));
        assert!(!is_bare_import("https://esm.sh/react"));
    }

    #[test]
    fn node_externalizes_packages_but_not_assets() {
        assert!(should_externalize(ServerPlatform::Node, "react"));
        assert!(!should_externalize(ServerPlatform::Node, "pkg/styles.css"));
        assert!(!should_externalize(ServerPlatform::Node, "./local"));
    }

    #[test]
    fn workers_bundle_everything() {
        assert!(!should_externalize(ServerPlatform::Cloudflare, "react"));
        assert!(!should_externalize(ServerPlatform::Deno, "react"));
    }
}
