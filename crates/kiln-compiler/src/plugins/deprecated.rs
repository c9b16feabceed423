//! Deprecated umbrella-package warner.
//!
//! Imports from the legacy `kiln` umbrella package still resolve (the
//! package re-exports the scoped packages), but each one costs dead
//! weight in the server bundle. This plugin reports them through the
//! warning sink and otherwise stays out of the way. It must sit before
//! the resolution plugins in the chain so it sees the original specifier
//! rather than a rewritten one.

use std::borrow::Cow;

use rolldown_plugin::{HookResolveIdArgs, HookResolveIdReturn, Plugin, PluginContext};

use crate::options::WarningSink;

const UMBRELLA_PACKAGE: &str = "kiln";

/// Warns on imports of the deprecated umbrella package.
pub struct DeprecatedImportsPlugin {
    sink: WarningSink,
}

impl DeprecatedImportsPlugin {
    pub fn new(sink: WarningSink) -> Self {
        Self { sink }
    }
}

impl std::fmt::Debug for DeprecatedImportsPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeprecatedImportsPlugin")
            .finish_non_exhaustive()
    }
}

impl Plugin for DeprecatedImportsPlugin {
    fn name(&self) -> Cow<'static, str> {
        "kiln:deprecated-imports".into()
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
        let sink = self.sink.clone();

        async move {
            if is_deprecated_specifier(&specifier) {
                (sink)(&deprecation_message(&specifier));
            }
            // Never claims the module; resolution continues normally.
            Ok(None)
        }
    }
}

pub(crate) fn is_deprecated_specifier(specifier: &str) -> bool {
    specifier == UMBRELLA_PACKAGE
        || specifier
            .strip_prefix(UMBRELLA_PACKAGE)
            .is_some_and(|rest| rest.starts_with('/'))
}

fn deprecation_message(specifier: &str) -> String {
    format!(
        "importing from the \"{specifier}\" package is deprecated; \
         import from the scoped runtime package for your platform instead"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_umbrella_and_subpaths_only() {
        assert!(is_deprecated_specifier("kiln"));
        assert!(is_deprecated_specifier("kiln/server"));
        assert!(!is_deprecated_specifier("@kiln/node"));
        assert!(!is_deprecated_specifier("kiln-sync"));
        assert!(!is_deprecated_specifier("./kiln"));
        // Virtual module ids use a scheme, not a subpath.
        assert!(!is_deprecated_specifier("kiln:server-build"));
    }

    #[test]
    fn message_names_the_specifier() {
        assert!(deprecation_message("kiln/server").contains("\"kiln/server\""));
    }
}
