//! Assets-manifest injection.
//!
//! Serves the client build's manifest as a virtual module. The plugin is
//! constructed with the already-read manifest value, never the channel:
//! by the time the chain is assembled, the one cross-build suspension
//! point has already happened.

use std::borrow::Cow;
use std::sync::Arc;

use rolldown_common::{ModuleType, ResolvedExternal};
use rolldown_plugin::{
    HookLoadArgs, HookLoadOutput, HookLoadReturn, HookResolveIdArgs, HookResolveIdOutput,
    HookResolveIdReturn, Plugin, PluginContext,
};

use super::ASSETS_MANIFEST_ID;
use crate::Result;
use crate::manifest::AssetsManifest;

/// Serves the serialized assets manifest as a virtual module.
#[derive(Debug, Clone)]
pub struct AssetsManifestPlugin {
    source: String,
}

impl AssetsManifestPlugin {
    pub fn new(manifest: &Arc<AssetsManifest>) -> Result<Self> {
        Ok(Self {
            source: manifest_module_source(manifest)?,
        })
    }
}

impl Plugin for AssetsManifestPlugin {
    fn name(&self) -> Cow<'static, str> {
        "kiln:assets-manifest".into()
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
            if specifier != ASSETS_MANIFEST_ID {
                return Ok(None);
            }
            Ok(Some(HookResolveIdOutput {
                id: specifier.into(),
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
        let source = self.source.clone();

        async move {
            if id != ASSETS_MANIFEST_ID {
                return Ok(None);
            }
            Ok(Some(HookLoadOutput {
                code: source.into(),
                module_type: Some(ModuleType::Js),
                ..Default::default()
            }))
        }
    }
}

pub(crate) fn manifest_module_source(manifest: &AssetsManifest) -> Result<String> {
    let json = serde_json::to_string(manifest)
        .map_err(|e| crate::Error::InvalidConfig(format!("assets manifest is unserializable: {e}")))?;
    Ok(format!("export default {json};\n"))
}
