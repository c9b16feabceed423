//! Route-module loader.
//!
//! Route files are imported through a synthetic `route:` scheme so this
//! loader (and later the source-map fixup) can tell them apart from
//! ordinary imports. The scheme wraps a path; resolution turns relative
//! paths absolute against the project root, and loading reads the file
//! and strips nothing else.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use anyhow::Context;
use path_clean::PathClean;
use rolldown_common::ResolvedExternal;
use rolldown_plugin::{
    HookLoadArgs, HookLoadOutput, HookLoadReturn, HookResolveIdArgs, HookResolveIdOutput,
    HookResolveIdReturn, Plugin, PluginContext,
};

use super::{ROUTE_SCHEME, infer_module_type};

/// Serves `route:`-tagged route modules from disk.
#[derive(Debug, Clone)]
pub struct RouteModulesPlugin {
    root: PathBuf,
}

impl RouteModulesPlugin {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Plugin for RouteModulesPlugin {
    fn name(&self) -> Cow<'static, str> {
        "kiln:route-modules".into()
    }

    fn register_hook_usage(&self) -> rolldown_plugin::HookUsage {
        rolldown_plugin::HookUsage::ResolveId | rolldown_plugin::HookUsage::Load
    }

    fn resolve_id(
        &self,
        _ctx: &PluginContext,
        args: &HookResolveIdArgs,
    ) -> impl std::future::Future<Output = HookResolveIdReturn> + Send {
        let specifier = args.specifier.to_string();
        let root = self.root.clone();

        async move {
            let Some(tagged) = resolve_route_id(&root, &specifier) else {
                return Ok(None);
            };
            Ok(Some(HookResolveIdOutput {
                id: tagged.into(),
                external: Some(ResolvedExternal::Bool(false)),
                ..Default::default()
            }))
        }
    }

    fn load(
        &self,
        _ctx: &PluginContext,
        args: &HookLoadArgs<'_>,
    ) -> impl std::future::Future<Output = HookLoadReturn> + Send {
        let id = args.id.to_string();

        async move {
            let Some(path) = id.strip_prefix(ROUTE_SCHEME) else {
                return Ok(None);
            };

            let source = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read route module: {path}"))?;

            Ok(Some(HookLoadOutput {
                code: source.into(),
                module_type: Some(infer_module_type(path)),
                ..Default::default()
            }))
        }
    }
}

/// Normalize a `route:` specifier to a tagged absolute path.
pub(crate) fn resolve_route_id(root: &Path, specifier: &str) -> Option<String> {
    let rest = specifier.strip_prefix(ROUTE_SCHEME)?;
    let path = Path::new(rest);
    let absolute = if path.is_absolute() {
        path.to_path_buf().clean()
    } else {
        root.join(path).clean()
    };
    Some(format!("{ROUTE_SCHEME}{}", absolute.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignores_untagged_specifiers() {
        assert!(resolve_route_id(Path::new("/app"), "./routes/home.tsx").is_none());
        assert!(resolve_route_id(Path::new("/app"), "react").is_none());
    }

    #[test]
    fn relative_routes_resolve_against_root() {
        let id = resolve_route_id(Path::new("/app"), "route:routes/home.tsx").unwrap();
        assert_eq!(id, "route:/app/routes/home.tsx");
    }

    #[test]
    fn absolute_routes_keep_their_path() {
        let id = resolve_route_id(Path::new("/app"), "route:/srv/app/routes/a.tsx").unwrap();
        assert_eq!(id, "route:/srv/app/routes/a.tsx");
    }
}
