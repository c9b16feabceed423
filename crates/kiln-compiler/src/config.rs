//! Project configuration types.
//!
//! A [`ProjectConfig`] is the immutable description of one build: where
//! the sources live, which runtime the bundle targets, and where outputs
//! land. It is supplied once per compile and never mutated during a build.

use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Runtime the server bundle will execute on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerTarget {
    /// Plain Node.js.
    Node,
    /// Deno runtime.
    Deno,
    /// Cloudflare Pages functions.
    CloudflarePages,
    /// Cloudflare Workers.
    CloudflareWorkers,
    /// Anything else; treated like Node for resolution purposes.
    Other(String),
}

impl ServerTarget {
    /// Parse a target name as it appears in project configuration files.
    pub fn parse(name: &str) -> Self {
        match name {
            "node" => Self::Node,
            "deno" => Self::Deno,
            "cloudflare-pages" => Self::CloudflarePages,
            "cloudflare-workers" => Self::CloudflareWorkers,
            other => Self::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for ServerTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Node => write!(f, "node"),
            Self::Deno => write!(f, "deno"),
            Self::CloudflarePages => write!(f, "cloudflare-pages"),
            Self::CloudflareWorkers => write!(f, "cloudflare-workers"),
            Self::Other(s) => write!(f, "{s}"),
        }
    }
}

/// Module format of the emitted server bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModuleFormat {
    #[default]
    Esm,
    Cjs,
}

/// One application route module.
///
/// The id is the route's stable identifier (e.g. `routes/home`); the file
/// is its source module relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteModule {
    pub id: String,
    pub file: PathBuf,
}

impl RouteModule {
    pub fn new(id: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            file: file.into(),
        }
    }
}

/// Immutable description of a server build.
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    /// Project root; all relative paths resolve against this.
    pub root_directory: PathBuf,

    /// Explicit server entry file. When set it is the sole bundler entry.
    pub server_entry_point: Option<PathBuf>,

    /// Source text of the synthesized entry module, used when no explicit
    /// entry point is configured. Treated as TypeScript with no on-disk
    /// file, resolved against the project root.
    pub server_entry_module: String,

    /// Target runtime for the bundle.
    pub server_build_target: ServerTarget,

    /// Output module format.
    pub server_module_format: ModuleFormat,

    /// Path of the emitted server bundle.
    pub server_build_path: PathBuf,

    /// Directory that public (client-served) assets are written to.
    pub assets_build_directory: PathBuf,

    /// Public URL prefix for emitted assets.
    pub public_path: String,

    /// Dev-server websocket port, injected as a compile-time constant.
    pub dev_server_port: u16,

    /// Optional tsconfig path forwarded to module resolution.
    pub tsconfig_path: Option<PathBuf>,

    /// Application route table; feeds the route-module loader and the
    /// synthesized server entry.
    pub routes: Vec<RouteModule>,
}

impl ProjectConfig {
    /// Create a config with conventional defaults rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            server_entry_point: None,
            server_entry_module: default_entry_module(),
            server_build_target: ServerTarget::Node,
            server_module_format: ModuleFormat::Esm,
            server_build_path: root.join("build/index.js"),
            assets_build_directory: root.join("public/build"),
            public_path: "/build/".to_string(),
            dev_server_port: 8002,
            tsconfig_path: None,
            routes: Vec::new(),
            root_directory: root,
        }
    }

    /// Use an explicit entry file instead of the synthesized entry.
    pub fn server_entry_point(mut self, path: impl Into<PathBuf>) -> Self {
        self.server_entry_point = Some(path.into());
        self
    }

    /// Replace the synthesized entry module source.
    pub fn server_entry_module(mut self, source: impl Into<String>) -> Self {
        self.server_entry_module = source.into();
        self
    }

    /// Set the target runtime.
    pub fn server_build_target(mut self, target: ServerTarget) -> Self {
        self.server_build_target = target;
        self
    }

    /// Set the output module format.
    pub fn server_module_format(mut self, format: ModuleFormat) -> Self {
        self.server_module_format = format;
        self
    }

    /// Set the emitted bundle path.
    pub fn server_build_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.server_build_path = path.into();
        self
    }

    /// Set the public assets directory.
    pub fn assets_build_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.assets_build_directory = dir.into();
        self
    }

    /// Set the public URL prefix.
    pub fn public_path(mut self, prefix: impl Into<String>) -> Self {
        self.public_path = prefix.into();
        self
    }

    /// Set the dev-server websocket port.
    pub fn dev_server_port(mut self, port: u16) -> Self {
        self.dev_server_port = port;
        self
    }

    /// Forward a tsconfig path to resolution.
    pub fn tsconfig_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.tsconfig_path = Some(path.into());
        self
    }

    /// Add a route module.
    pub fn route(mut self, id: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        self.routes.push(RouteModule::new(id, file.into()));
        self
    }

    /// Replace the whole route table.
    pub fn routes(mut self, routes: Vec<RouteModule>) -> Self {
        self.routes = routes;
        self
    }

    /// Directory the server bundle is written into.
    pub fn server_build_directory(&self) -> &Path {
        self.server_build_path.parent().unwrap_or(Path::new("."))
    }

    /// Check the config for contradictions.
    ///
    /// A build needs either an explicit entry point or a non-empty
    /// synthesized entry module.
    pub fn validate(&self) -> Result<()> {
        if self.server_entry_point.is_none() && self.server_entry_module.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "no server entry point and no entry module source to synthesize one from".into(),
            ));
        }
        Ok(())
    }
}

/// Default synthesized entry: re-export the generated server build module.
fn default_entry_module() -> String {
    "export * from \"kiln:server-build\";\n".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_targets() {
        assert_eq!(ServerTarget::parse("node"), ServerTarget::Node);
        assert_eq!(ServerTarget::parse("deno"), ServerTarget::Deno);
        assert_eq!(
            ServerTarget::parse("cloudflare-pages"),
            ServerTarget::CloudflarePages
        );
        assert_eq!(
            ServerTarget::parse("cloudflare-workers"),
            ServerTarget::CloudflareWorkers
        );
        assert_eq!(
            ServerTarget::parse("netlify"),
            ServerTarget::Other("netlify".to_string())
        );
    }

    #[test]
    fn defaults_are_rooted_at_project() {
        let config = ProjectConfig::new("/app");
        assert_eq!(config.server_build_path, PathBuf::from("/app/build/index.js"));
        assert_eq!(
            config.assets_build_directory,
            PathBuf::from("/app/public/build")
        );
        assert_eq!(config.server_build_directory(), Path::new("/app/build"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_entry() {
        let config = ProjectConfig::new("/app").server_entry_module("   ");
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn explicit_entry_point_satisfies_validation() {
        let config = ProjectConfig::new("/app")
            .server_entry_module("")
            .server_entry_point("/app/server.ts");
        assert!(config.validate().is_ok());
    }
}
