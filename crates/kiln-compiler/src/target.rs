//! Platform classification for the server bundle.
//!
//! The configured [`ServerTarget`](crate::config::ServerTarget) collapses
//! into one of three resolution behaviors: plain Node, Deno, or a
//! Cloudflare worker runtime. The classification picks the export
//! condition names and main-field priority the resolver uses.

use crate::config::{ModuleFormat, ServerTarget};

/// Resolution-relevant grouping of server targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerPlatform {
    Node,
    Deno,
    Cloudflare,
}

impl ServerPlatform {
    /// Classify a configured target.
    ///
    /// Unknown targets behave like Node; they get no worker conditions
    /// and keep Node's builtins.
    pub fn classify(target: &ServerTarget) -> Self {
        match target {
            ServerTarget::CloudflarePages | ServerTarget::CloudflareWorkers => Self::Cloudflare,
            ServerTarget::Deno => Self::Deno,
            ServerTarget::Node | ServerTarget::Other(_) => Self::Node,
        }
    }

    /// Whether the runtime ships Node's built-in modules natively.
    pub fn is_node(&self) -> bool {
        matches!(self, Self::Node)
    }

    /// Export condition names for module resolution, or `None` for plain
    /// Node where the resolver defaults apply.
    pub fn conditions(&self) -> Option<&'static [&'static str]> {
        match self {
            Self::Cloudflare => Some(&["worker"]),
            Self::Deno => Some(&["deno", "worker"]),
            Self::Node => None,
        }
    }

    /// Main-field priority order for package resolution.
    ///
    /// Worker runtimes prefer browser builds; otherwise the order follows
    /// the output module format.
    pub fn main_fields(&self, format: ModuleFormat) -> &'static [&'static str] {
        match self {
            Self::Cloudflare => &["browser", "module", "main"],
            Self::Deno | Self::Node => match format {
                ModuleFormat::Esm => &["module", "main"],
                ModuleFormat::Cjs => &["main", "module"],
            },
        }
    }
}
