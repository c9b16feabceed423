//! Client-only module stubs.
//!
//! Files named `*.client.*` are browser-only by convention; the server
//! bundle must never carry their code. Any module matching the suffix
//! pattern loads as an empty module, so imports of it type-check and
//! link while its body disappears from the output.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use rolldown_plugin::{HookLoadArgs, HookLoadOutput, HookLoadReturn, Plugin, PluginContext};

use super::infer_module_type;

static CLIENT_ONLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\.client(\.[jt]sx?)?$").expect("client-only suffix pattern is valid")
});

/// Empties `*.client.*` modules out of the server bundle.
#[derive(Debug, Clone, Default)]
pub struct EmptyClientModulesPlugin;

impl EmptyClientModulesPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl Plugin for EmptyClientModulesPlugin {
    fn name(&self) -> Cow<'static, str> {
        "kiln:empty-client-modules".into()
    }

    fn register_hook_usage(&self) -> rolldown_plugin::HookUsage {
        rolldown_plugin::HookUsage::Load
    }

    fn load(
        &self,
        _ctx: &PluginContext,
        args: &HookLoadArgs<'_>,
    ) -> impl std::future::Future<Output = HookLoadReturn> + Send {
        let id = args.id.to_string();

        async move {
            if !is_client_only(&id) {
                return Ok(None);
            }
            Ok(Some(HookLoadOutput {
                code: "export {};\n".to_string().into(),
                module_type: Some(infer_module_type(&id)),
                ..Default::default()
            }))
        }
    }
}

pub(crate) fn is_client_only(id: &str) -> bool {
    CLIENT_ONLY.is_match(id)
}
