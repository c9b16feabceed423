//! URL-style import handling.
//!
//! `import "https://esm.sh/foo"` style specifiers are left to the target
//! runtime: they are marked external so the bundler neither fetches nor
//! tries to resolve them on disk.

use std::borrow::Cow;

use rolldown_common::ResolvedExternal;
use rolldown_plugin::{
    HookResolveIdArgs, HookResolveIdOutput, HookResolveIdReturn, Plugin, PluginContext,
};

/// Externalizes `http(s)://` imports.
#[derive(Debug, Clone, Default)]
pub struct UrlImportsPlugin;

impl UrlImportsPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl Plugin for UrlImportsPlugin {
    fn name(&self) -> Cow<'static, str> {
        "kiln:url-imports".into()
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

        async move {
            if !is_url_import(&specifier) {
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

pub(crate) fn is_url_import(specifier: &str) -> bool {
    specifier.starts_with("http://") || specifier.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_http_and_https_only() {
        assert!(is_url_import("https://esm.sh/react"));
        assert!(is_url_import("http://localhost:3000/mod.js"));
        assert!(!is_url_import("react"));
        assert!(!is_url_import("./https-helper"));
        assert!(!is_url_import("route:app/routes/home.tsx"));
    }
}
