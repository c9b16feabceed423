//! Application alias resolution.
//!
//! This is the framework's integration point into the bundler: it runs
//! ahead of every other plugin so `~/` imports are rewritten before any
//! of them see the specifier. `~/foo` resolves against the project root,
//! with extension probing for extensionless imports.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use rolldown_common::ResolvedExternal;
use rolldown_plugin::{
    HookResolveIdArgs, HookResolveIdOutput, HookResolveIdReturn, Plugin, PluginContext,
};

const PROBE_EXTENSIONS: &[&str] = &["", ".tsx", ".ts", ".jsx", ".js", ".mdx", ".md"];

/// Resolves `~/`-prefixed imports against the project root.
#[derive(Debug, Clone)]
pub struct AppAliasPlugin {
    root: PathBuf,
}

impl AppAliasPlugin {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Plugin for AppAliasPlugin {
    fn name(&self) -> Cow<'static, str> {
        "kiln:app-alias".into()
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
        let root = self.root.clone();

        async move {
            let Some(resolved) = resolve_app_alias(&root, &specifier) else {
                return Ok(None);
            };
            Ok(Some(HookResolveIdOutput {
                id: resolved.to_string_lossy().into_owned().into(),
                external: Some(ResolvedExternal::Bool(false)),
                ..Default::default()
            }))
        }
    }
}

/// Resolve a `~/` specifier to an existing file under `root`.
///
/// Probes common script extensions for extensionless imports. Returns
/// `None` for non-alias specifiers and for aliases that match no file,
/// leaving the bundler to produce its own unresolved-import diagnostic.
pub(crate) fn resolve_app_alias(root: &Path, specifier: &str) -> Option<PathBuf> {
    let rest = specifier.strip_prefix("~/")?;
    let base = root.join(rest);
    for ext in PROBE_EXTENSIONS {
        let candidate = if ext.is_empty() {
            base.clone()
        } else {
            PathBuf::from(format!("{}{ext}", base.display()))
        };
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn ignores_non_alias_specifiers() {
        let dir = tempfile::tempdir().unwrap();
        assert!(resolve_app_alias(dir.path(), "./relative").is_none());
        assert!(resolve_app_alias(dir.path(), "react").is_none());
    }

    #[test]
    fn resolves_exact_and_probed_extensions() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("routes")).unwrap();
        fs::write(dir.path().join("routes/home.tsx"), "export {}").unwrap();

        let exact = resolve_app_alias(dir.path(), "~/routes/home.tsx").unwrap();
        assert_eq!(exact, dir.path().join("routes/home.tsx"));

        let probed = resolve_app_alias(dir.path(), "~/routes/home").unwrap();
        assert_eq!(probed, dir.path().join("routes/home.tsx"));
    }

    #[test]
    fn missing_files_stay_unresolved() {
        let dir = tempfile::tempdir().unwrap();
        assert!(resolve_app_alias(dir.path(), "~/nope").is_none());
    }
}
