//! Build configuration assembly.
//!
//! [`build_server_config`] turns a validated [`ProjectConfig`] plus one
//! set of [`CompileOptions`] into the complete recipe for a bundler run:
//! entry selection, resolution settings for the target platform, the
//! compile-time defines, and the plugin chain in its required order.
//! Assembly is pure; nothing here touches the filesystem or the bundler.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::chain::PluginChain;
use crate::config::{ModuleFormat, ProjectConfig};
use crate::manifest::AssetsManifest;
use crate::options::CompileOptions;
use crate::plugins::{
    AppAliasPlugin, AssetsManifestPlugin, BareImportsPlugin, CssFilePlugin, DefinePlugin,
    DeprecatedImportsPlugin, EmptyClientModulesPlugin, MdxPlugin, NodePolyfillPlugin,
    RouteModulesPlugin, SERVER_ENTRY_ID, ServerEntryPlugin, UrlImportsPlugin,
};
use crate::target::ServerPlatform;
use crate::Result;

/// Naming template for assets the bundler emits alongside the server
/// chunk. They are re-rooted into the public assets directory after the
/// build.
pub const ASSET_NAMES: &str = "_assets/[name]-[hash]";

/// How the bundler entry is supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEntry {
    /// An on-disk entry file, absolute.
    File(PathBuf),
    /// The virtual entry module synthesized from configuration.
    Virtual,
}

impl ServerEntry {
    /// Import specifier handed to the bundler.
    pub fn import(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Virtual => SERVER_ENTRY_ID.to_string(),
        }
    }
}

/// Fully assembled configuration for one server build.
///
/// Everything the executor needs, with the platform-dependent choices
/// already made.
pub struct ServerBuildConfig {
    /// Bundler entry.
    pub entry: ServerEntry,
    /// Chunk name for the entry, derived from the outfile stem.
    pub entry_name: String,
    /// Classified target platform.
    pub platform: ServerPlatform,
    /// Output module format.
    pub format: ModuleFormat,
    /// Absolute path the server bundle is written to.
    pub outfile: PathBuf,
    /// Export condition names, when the platform narrows them.
    pub conditions: Option<&'static [&'static str]>,
    /// Main-field priority for package resolution.
    pub main_fields: &'static [&'static str],
    /// Whole-bundle minification. Only production Cloudflare builds,
    /// where worker size limits apply.
    pub minify: bool,
    /// Whether to emit source maps.
    pub sourcemap: bool,
    /// Working directory for the bundler, the project root.
    pub cwd: PathBuf,
    /// Optional tsconfig forwarded to resolution.
    pub tsconfig: Option<PathBuf>,
    /// Compile-time constant substitutions.
    pub defines: Vec<(String, String)>,
    /// Ordered plugin chain.
    pub chain: PluginChain,
}

impl ServerBuildConfig {
    /// Directory the bundle lands in.
    pub fn out_dir(&self) -> &Path {
        self.outfile.parent().unwrap_or(Path::new("."))
    }

    /// Plugin names in execution order, for auditing.
    pub fn plugin_names(&self) -> Vec<&str> {
        self.chain.names()
    }
}

impl std::fmt::Debug for ServerBuildConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerBuildConfig")
            .field("entry", &self.entry)
            .field("platform", &self.platform)
            .field("format", &self.format)
            .field("outfile", &self.outfile)
            .field("minify", &self.minify)
            .field("sourcemap", &self.sourcemap)
            .field("plugins", &self.chain.names())
            .finish_non_exhaustive()
    }
}

/// Assemble the build configuration for one compile.
///
/// The manifest must already be in hand; this function is only called
/// after the manifest channel has delivered a value, so configuration
/// assembly never blocks.
pub fn build_server_config(
    project: &ProjectConfig,
    manifest: &Arc<AssetsManifest>,
    options: &CompileOptions,
) -> Result<ServerBuildConfig> {
    project.validate()?;

    let platform = ServerPlatform::classify(&project.server_build_target);
    let format = project.server_module_format;
    let outfile = absolute_in(&project.root_directory, &project.server_build_path);

    let entry = match &project.server_entry_point {
        Some(path) => ServerEntry::File(absolute_in(&project.root_directory, path)),
        None => ServerEntry::Virtual,
    };
    let entry_name = outfile
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("index")
        .to_string();

    // Full minification only where bundle size is a hard limit. Syntax
    // minification stays on in the executor for every build.
    let minify = options.mode.is_production() && platform == ServerPlatform::Cloudflare;

    let defines = vec![
        (
            "process.env.NODE_ENV".to_string(),
            format!("\"{}\"", options.mode.as_str()),
        ),
        (
            "process.env.KILN_DEV_SERVER_WS_PORT".to_string(),
            project.dev_server_port.to_string(),
        ),
    ];

    let mut chain = PluginChain::new();
    chain.push(DeprecatedImportsPlugin::new(Arc::clone(&options.on_warning)));
    chain.push(CssFilePlugin::new(minify));
    chain.push(UrlImportsPlugin::new());
    chain.push(MdxPlugin::new());
    chain.push(EmptyClientModulesPlugin::new());
    chain.push(RouteModulesPlugin::new(&project.root_directory));
    chain.push(ServerEntryPlugin::new(project));
    chain.push(AssetsManifestPlugin::new(manifest)?);
    chain.push(DefinePlugin::new(&defines)?);
    chain.push(BareImportsPlugin::new(platform));
    // Runtimes without Node builtins get throwing stubs for them.
    if !platform.is_node() {
        chain.prepend(NodePolyfillPlugin::new());
    }
    // The application alias must win over every other resolver.
    chain.prepend(AppAliasPlugin::new(&project.root_directory));

    Ok(ServerBuildConfig {
        entry,
        entry_name,
        platform,
        format,
        outfile,
        conditions: platform.conditions(),
        main_fields: platform.main_fields(format),
        minify,
        sourcemap: options.sourcemap,
        cwd: project.root_directory.clone(),
        tsconfig: project
            .tsconfig_path
            .as_ref()
            .map(|p| absolute_in(&project.root_directory, p)),
        defines,
        chain,
    })
}

/// Resolve `path` against `root` unless already absolute.
fn absolute_in(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerTarget;
    use crate::options::BuildMode;

    fn manifest() -> Arc<AssetsManifest> {
        Arc::new(AssetsManifest::default())
    }

    fn dev() -> CompileOptions {
        CompileOptions::new(BuildMode::Development)
    }

    #[test]
    fn virtual_entry_when_no_entry_point() {
        let project = ProjectConfig::new("/app");
        let config = build_server_config(&project, &manifest(), &dev()).unwrap();
        assert_eq!(config.entry, ServerEntry::Virtual);
        assert_eq!(config.entry.import(), "kiln:server-entry");
        assert_eq!(config.entry_name, "index");
    }

    #[test]
    fn file_entry_is_made_absolute() {
        let project = ProjectConfig::new("/app").server_entry_point("server.ts");
        let config = build_server_config(&project, &manifest(), &dev()).unwrap();
        assert_eq!(config.entry, ServerEntry::File(PathBuf::from("/app/server.ts")));
    }

    #[test]
    fn node_build_keeps_default_conditions() {
        let project = ProjectConfig::new("/app");
        let config = build_server_config(&project, &manifest(), &dev()).unwrap();
        assert!(config.conditions.is_none());
        assert_eq!(config.main_fields, ["module", "main"]);
        assert!(!config.minify);
    }

    #[test]
    fn cloudflare_production_minifies_and_uses_worker_conditions() {
        let project =
            ProjectConfig::new("/app").server_build_target(ServerTarget::CloudflareWorkers);
        let options = CompileOptions::new(BuildMode::Production);
        let config = build_server_config(&project, &manifest(), &options).unwrap();
        assert_eq!(config.conditions, Some(&["worker"][..]));
        assert_eq!(config.main_fields, ["browser", "module", "main"]);
        assert!(config.minify);
    }

    #[test]
    fn cloudflare_development_does_not_minify() {
        let project =
            ProjectConfig::new("/app").server_build_target(ServerTarget::CloudflarePages);
        let config = build_server_config(&project, &manifest(), &dev()).unwrap();
        assert!(!config.minify);
    }

    #[test]
    fn node_production_does_not_minify() {
        let project = ProjectConfig::new("/app");
        let options = CompileOptions::new(BuildMode::Production);
        let config = build_server_config(&project, &manifest(), &options).unwrap();
        assert!(!config.minify);
    }

    #[test]
    fn plugin_chain_order_for_node() {
        let project = ProjectConfig::new("/app");
        let config = build_server_config(&project, &manifest(), &dev()).unwrap();
        assert_eq!(
            config.plugin_names(),
            [
                "kiln:app-alias",
                "kiln:deprecated-imports",
                "kiln:css-file",
                "kiln:url-imports",
                "kiln:mdx",
                "kiln:empty-client-modules",
                "kiln:route-modules",
                "kiln:server-entry",
                "kiln:assets-manifest",
                "kiln:define",
                "kiln:bare-imports",
            ]
        );
    }

    #[test]
    fn non_node_platforms_get_the_polyfill_after_the_alias() {
        let project = ProjectConfig::new("/app").server_build_target(ServerTarget::Deno);
        let config = build_server_config(&project, &manifest(), &dev()).unwrap();
        let names = config.plugin_names();
        assert_eq!(names[0], "kiln:app-alias");
        assert_eq!(names[1], "kiln:node-polyfill");
        assert_eq!(*names.last().unwrap(), "kiln:bare-imports");
    }

    #[test]
    fn defines_carry_mode_and_port() {
        let project = ProjectConfig::new("/app").dev_server_port(4004);
        let config = build_server_config(&project, &manifest(), &dev()).unwrap();
        assert!(config.defines.contains(&(
            "process.env.NODE_ENV".to_string(),
            "\"development\"".to_string()
        )));
        assert!(config.defines.contains(&(
            "process.env.KILN_DEV_SERVER_WS_PORT".to_string(),
            "4004".to_string()
        )));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let project = ProjectConfig::new("/app").server_entry_module("");
        assert!(build_server_config(&project, &manifest(), &dev()).is_err());
    }

    #[test]
    fn outfile_and_tsconfig_are_rooted() {
        let project = ProjectConfig::new("/app")
            .server_build_path("out/server.js")
            .tsconfig_path("tsconfig.json");
        let config = build_server_config(&project, &manifest(), &dev()).unwrap();
        assert_eq!(config.outfile, PathBuf::from("/app/out/server.js"));
        assert_eq!(config.out_dir(), Path::new("/app/out"));
        assert_eq!(config.entry_name, "server");
        assert_eq!(config.tsconfig, Some(PathBuf::from("/app/tsconfig.json")));
    }
}
