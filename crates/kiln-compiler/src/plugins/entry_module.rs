//! Server entry synthesis.
//!
//! Serves two virtual modules: the bundler entry itself (when the
//! project has no entry file on disk) and the generated server build
//! module that wires the route table and the assets manifest into one
//! importable surface.

use std::borrow::Cow;

use rolldown_common::{ModuleType, ResolvedExternal};
use rolldown_plugin::{
    HookLoadArgs, HookLoadOutput, HookLoadReturn, HookResolveIdArgs, HookResolveIdOutput,
    HookResolveIdReturn, Plugin, PluginContext,
};

use super::{ASSETS_MANIFEST_ID, ROUTE_SCHEME, SERVER_BUILD_ID, SERVER_ENTRY_ID};
use crate::config::ProjectConfig;

/// Serves the synthesized entry and the generated server build module.
#[derive(Debug, Clone)]
pub struct ServerEntryPlugin {
    entry_source: String,
    build_source: String,
}

impl ServerEntryPlugin {
    pub fn new(project: &ProjectConfig) -> Self {
        Self {
            entry_source: project.server_entry_module.clone(),
            build_source: synthesize_server_build(project),
        }
    }
}

impl Plugin for ServerEntryPlugin {
    fn name(&self) -> Cow<'static, str> {
        "kiln:server-entry".into()
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
            if specifier != SERVER_ENTRY_ID && specifier != SERVER_BUILD_ID {
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
        let entry_source = self.entry_source.clone();
        let build_source = self.build_source.clone();

        async move {
            let code = match id.as_str() {
                SERVER_ENTRY_ID => entry_source,
                SERVER_BUILD_ID => build_source,
                _ => return Ok(None),
            };
            // Entry sources are TypeScript-flavored with no on-disk file.
            Ok(Some(HookLoadOutput {
                code: code.into(),
                module_type: Some(ModuleType::Ts),
                ..Default::default()
            }))
        }
    }
}

/// Generate the server build module from the project's route table.
///
/// Routes are imported through the `route:` scheme so the route loader
/// claims them; the manifest comes from the injection plugin's virtual
/// module.
pub(crate) fn synthesize_server_build(project: &ProjectConfig) -> String {
    let mut module = String::new();
    module.push_str(&format!(
        "export {{ default as assetsManifest }} from \"{ASSETS_MANIFEST_ID}\";\n"
    ));

    for (index, route) in project.routes.iter().enumerate() {
        let file = project.root_directory.join(&route.file);
        module.push_str(&format!(
            "import * as route{index} from \"{ROUTE_SCHEME}{}\";\n",
            file.display()
        ));
    }

    module.push_str("export const routes = {\n");
    for (index, route) in project.routes.iter().enumerate() {
        let id = serde_json::to_string(&route.id).expect("route id serializes");
        module.push_str(&format!("  {id}: {{ id: {id}, module: route{index} }},\n"));
    }
    module.push_str("};\n");
    module
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProjectConfig;

    #[test]
    fn empty_route_table_still_exports_surface() {
        let module = synthesize_server_build(&ProjectConfig::new("/app"));
        assert!(module.contains("export { default as assetsManifest }"));
        assert!(module.contains("export const routes = {\n};"));
    }

    #[test]
    fn routes_import_through_the_scheme() {
        let project = ProjectConfig::new("/app")
            .route("routes/home", "app/routes/home.tsx")
            .route("routes/about", "app/routes/about.tsx");
        let module = synthesize_server_build(&project);

        assert!(module.contains("import * as route0 from \"route:/app/app/routes/home.tsx\";"));
        assert!(module.contains("import * as route1 from \"route:/app/app/routes/about.tsx\";"));
        assert!(module.contains("\"routes/home\": { id: \"routes/home\", module: route0 },"));
        assert!(module.contains("\"routes/about\": { id: \"routes/about\", module: route1 },"));
    }
}
