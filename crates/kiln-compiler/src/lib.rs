//! # kiln-compiler
//!
//! Rolldown-based server-bundle compiler for route-based applications.
//!
//! The pipeline turns a project description ([`ProjectConfig`]) and the
//! client build's assets manifest into a single server bundle on disk:
//!
//! 1. [`ServerCompiler::compile`] awaits the manifest on a
//!    [`kiln_sync`] channel, so server and client builds can start
//!    concurrently.
//! 2. [`builder::build_server_config`] assembles entry, resolution
//!    settings, and the ordered plugin chain for the target runtime.
//! 3. [`executor::execute`] runs Rolldown in memory.
//! 4. [`output::materialize`] applies source-map fixups and writes the
//!    bundle, its maps, and re-rooted assets to disk.
//!
//! ```no_run
//! use kiln_compiler::{
//!     AssetsManifest, BuildMode, CompileOptions, ProjectConfig, ServerCompiler,
//! };
//!
//! # async fn build() -> kiln_compiler::Result<()> {
//! let (manifest_tx, manifest_rx) = kiln_sync::channel::<AssetsManifest>();
//!
//! let compiler = ServerCompiler::new(
//!     ProjectConfig::new("/srv/app"),
//!     CompileOptions::new(BuildMode::Production),
//! );
//!
//! // Elsewhere, the client compiler publishes its manifest:
//! manifest_tx.publish(AssetsManifest::default());
//!
//! compiler.compile(&manifest_rx).await?;
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

pub mod builder;
pub mod chain;
pub mod config;
pub mod diagnostics;
pub mod executor;
pub mod manifest;
pub mod options;
pub mod output;
pub mod plugins;
pub mod server;
pub mod target;

#[cfg(feature = "logging")]
pub mod logging;

#[cfg(feature = "logging")]
pub use logging::{LogLevel, init_logging, init_logging_from_env};

pub use builder::{ServerBuildConfig, ServerEntry, build_server_config};
pub use chain::PluginChain;
pub use config::{ModuleFormat, ProjectConfig, RouteModule, ServerTarget};
pub use executor::{ArtifactContents, BuildOutputArtifact};
pub use manifest::{AssetsManifest, ManifestEntry, ManifestRoute};
pub use options::{BuildMode, CompileOptions, WarningSink};
pub use server::ServerCompiler;
pub use target::ServerPlatform;

// Re-export the manifest channel so embedders need only this crate.
pub use kiln_sync::{ChannelClosed, ReadChannel, WriteChannel, channel};

/// Errors produced by the compilation pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The bundler reported one or more diagnostics.
    #[error("bundler error: {}", format_bundler_error(.0))]
    Bundler(Vec<diagnostics::ExtractedDiagnostic>),

    /// The project configuration is contradictory or incomplete.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The assets manifest channel closed before publishing, meaning
    /// the client build died.
    #[error("assets manifest unavailable: {0}")]
    ManifestClosed(#[from] ChannelClosed),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A bundler output name escaped its output directory.
    #[error("invalid output path: {0}")]
    InvalidOutputPath(String),

    /// Writing a build output to disk failed.
    #[error("failed to write {}: {source}", path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

fn format_bundler_error(diagnostics: &[diagnostics::ExtractedDiagnostic]) -> String {
    match diagnostics {
        [] => "unknown bundler error".to_string(),
        [single] => format!("{}: {}", single.kind, single.message),
        many => format!(
            "{} errors: {}",
            many.len(),
            many.iter()
                .map(|d| format!("{}: {}", d.kind, d.message))
                .collect::<Vec<_>>()
                .join("; ")
        ),
    }
}

impl miette::Diagnostic for Error {
    fn code(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        Some(Box::new(match self {
            Error::Bundler(_) => "BUNDLER_ERROR",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
            Error::ManifestClosed(_) => "MANIFEST_CLOSED",
            Error::Io(_) => "IO_ERROR",
            Error::InvalidOutputPath(_) => "INVALID_OUTPUT_PATH",
            Error::WriteFailure { .. } => "WRITE_FAILURE",
        }))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(miette::Severity::Error)
    }

    fn help(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        match self {
            Error::InvalidConfig(msg) => Some(Box::new(format!(
                "Check the project configuration.\nError: {msg}"
            ))),
            Error::ManifestClosed(_) => Some(Box::new(
                "The client build must publish its assets manifest before the server \
                 build can finish. Check the client compiler's output for errors.",
            )),
            Error::InvalidOutputPath(path) => Some(Box::new(format!(
                "The output path '{path}' resolves outside the build directory. \
                 Output names must stay within it."
            ))),
            Error::WriteFailure { path, .. } => Some(Box::new(format!(
                "Failed to write '{}'. Check disk space and permissions.",
                path.display()
            ))),
            Error::Bundler(diagnostics) => match diagnostics.as_slice() {
                [single] => single
                    .help
                    .as_ref()
                    .map(|h| Box::new(h.clone()) as Box<dyn std::fmt::Display>),
                _ => None,
            },
            Error::Io(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diagnostics::{DiagnosticKind, DiagnosticSeverity, ExtractedDiagnostic};
    use miette::Diagnostic as _;

    fn diag(message: &str) -> ExtractedDiagnostic {
        ExtractedDiagnostic {
            kind: DiagnosticKind::UnresolvedImport,
            severity: DiagnosticSeverity::Error,
            message: message.to_string(),
            file: None,
            line: None,
            column: None,
            help: None,
        }
    }

    #[test]
    fn bundler_error_formats_single_and_many() {
        let one = Error::Bundler(vec![diag("cannot resolve \"x\"")]);
        assert!(one.to_string().contains("unresolved import"));

        let many = Error::Bundler(vec![diag("a"), diag("b")]);
        assert!(many.to_string().contains("2 errors"));
    }

    #[test]
    fn error_codes_are_stable() {
        let err = Error::InvalidConfig("bad".into());
        assert_eq!(err.code().unwrap().to_string(), "INVALID_CONFIG");

        let err = Error::ManifestClosed(ChannelClosed);
        assert_eq!(err.code().unwrap().to_string(), "MANIFEST_CLOSED");
    }
}
