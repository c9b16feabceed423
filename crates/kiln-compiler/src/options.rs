//! Per-invocation compile options.

use std::sync::Arc;

/// Build mode, supplied explicitly by the caller.
///
/// The pipeline never reads `NODE_ENV` or any other ambient process
/// state; mode flows in through here and out through the define plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildMode {
    #[default]
    Development,
    Production,
}

impl BuildMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Caller-supplied sink for build warnings.
///
/// Warnings never hit process output directly; everything goes through
/// this callback.
pub type WarningSink = Arc<dyn Fn(&str) + Send + Sync>;

/// Settings for a single `compile` call. Immutable for its duration.
#[derive(Clone)]
pub struct CompileOptions {
    /// Build mode.
    pub mode: BuildMode,
    /// Whether to emit source maps.
    pub sourcemap: bool,
    /// Minification/syntax target identifier (e.g. `es2022`).
    pub target: Option<String>,
    /// Warning sink callback.
    pub on_warning: WarningSink,
}

impl CompileOptions {
    pub fn new(mode: BuildMode) -> Self {
        Self {
            mode,
            sourcemap: false,
            target: None,
            // Default sink forwards to tracing so warnings are never lost
            // when no callback is installed.
            on_warning: Arc::new(|message| tracing::warn!("{message}")),
        }
    }

    pub fn sourcemap(mut self, enabled: bool) -> Self {
        self.sourcemap = enabled;
        self
    }

    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn on_warning(mut self, sink: WarningSink) -> Self {
        self.on_warning = sink;
        self
    }

    /// Report a warning through the sink.
    pub fn warn(&self, message: &str) {
        (self.on_warning)(message);
    }
}

impl std::fmt::Debug for CompileOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompileOptions")
            .field("mode", &self.mode)
            .field("sourcemap", &self.sourcemap)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}
