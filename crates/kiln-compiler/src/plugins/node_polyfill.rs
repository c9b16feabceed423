//! Node built-in stubs for non-Node runtimes.
//!
//! Worker and Deno targets have no `fs`, `net`, etc. Rather than let the
//! resolver fail on a bare `crypto` import deep inside a dependency, this
//! plugin claims every Node built-in specifier and serves a stub module
//! whose members throw on use. Code paths that never touch the built-in
//! keep working; code paths that do fail with a pointed message instead
//! of an unresolved-import diagnostic.

use std::borrow::Cow;

use rolldown_common::{ModuleType, ResolvedExternal};
use rolldown_plugin::{
    HookLoadArgs, HookLoadOutput, HookLoadReturn, HookResolveIdArgs, HookResolveIdOutput,
    HookResolveIdReturn, Plugin, PluginContext,
};

const POLYFILL_PREFIX: &str = "kiln:polyfill:";

const NODE_BUILTINS: &[&str] = &[
    "assert",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "dns",
    "domain",
    "events",
    "fs",
    "fs/promises",
    "http",
    "http2",
    "https",
    "module",
    "net",
    "os",
    "path",
    "path/posix",
    "path/win32",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "repl",
    "stream",
    "stream/promises",
    "stream/web",
    "string_decoder",
    "sys",
    "timers",
    "timers/promises",
    "tls",
    "tty",
    "url",
    "util",
    "v8",
    "vm",
    "worker_threads",
    "zlib",
];

/// Serves throwing stubs for Node built-in modules.
#[derive(Debug, Clone, Default)]
pub struct NodePolyfillPlugin;

impl NodePolyfillPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl Plugin for NodePolyfillPlugin {
    fn name(&self) -> Cow<'static, str> {
        "kiln:node-polyfill".into()
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

        async move {
            let Some(builtin) = node_builtin_name(&specifier) else {
                return Ok(None);
            };
            Ok(Some(HookResolveIdOutput {
                id: format!("{POLYFILL_PREFIX}{builtin}").into(),
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
            let Some(builtin) = id.strip_prefix(POLYFILL_PREFIX) else {
                return Ok(None);
            };
            Ok(Some(HookLoadOutput {
                code: stub_source(builtin).into(),
                module_type: Some(ModuleType::Js),
                ..Default::default()
            }))
        }
    }
}

/// Return the built-in name for a specifier, accepting the `node:`
/// scheme, or `None` when the specifier is not a Node built-in.
pub(crate) fn node_builtin_name(specifier: &str) -> Option<&str> {
    let name = specifier.strip_prefix("node:").unwrap_or(specifier);
    NODE_BUILTINS.contains(&name).then_some(name)
}

/// CommonJS stub whose members throw when touched. CommonJS so that any
/// named import goes through interop instead of failing ESM linking.
fn stub_source(builtin: &str) -> String {
    format!(
        "\"use strict\";\n\
         module.exports = new Proxy({{}}, {{\n\
         \u{20} get(_target, prop) {{\n\
         \u{20}   if (prop === \"__esModule\" || prop === \"default\") return undefined;\n\
         \u{20}   return function () {{\n\
         \u{20}     throw new Error(\"Node built-in '{builtin}.\" + String(prop) + \"' is not available in this runtime\");\n\
         \u{20}   }};\n\
         \u{20} }},\n\
         }});\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_builtins_with_and_without_scheme() {
        assert_eq!(node_builtin_name("fs"), Some("fs"));
        assert_eq!(node_builtin_name("node:fs"), Some("fs"));
        assert_eq!(node_builtin_name("fs/promises"), Some("fs/promises"));
        assert_eq!(node_builtin_name("react"), None);
        assert_eq!(node_builtin_name("./fs"), None);
    }

    #[test]
    fn stub_mentions_the_builtin() {
        let source = stub_source("crypto");
        assert!(source.contains("'crypto."));
        assert!(source.starts_with("\"use strict\";"));
    }
}
