//! The server compiler facade.
//!
//! [`ServerCompiler`] owns a project configuration and compile options
//! and exposes one operation: `compile`, which awaits the client
//! compiler's assets manifest and then runs the full pipeline through
//! to files on disk. The handle is cheap to keep around across dev
//! server rebuilds; each call runs an independent build.

use std::path::PathBuf;

use kiln_sync::ReadChannel;

use crate::builder::build_server_config;
use crate::config::ProjectConfig;
use crate::executor;
use crate::manifest::AssetsManifest;
use crate::options::CompileOptions;
use crate::output::materialize;
use crate::Result;

/// Handle for running server builds.
#[derive(Debug)]
pub struct ServerCompiler {
    project: ProjectConfig,
    options: CompileOptions,
}

impl ServerCompiler {
    pub fn new(project: ProjectConfig, options: CompileOptions) -> Self {
        Self { project, options }
    }

    /// The project this compiler builds.
    pub fn project(&self) -> &ProjectConfig {
        &self.project
    }

    /// Run one server build.
    ///
    /// Suspends until the assets manifest is published, then assembles
    /// the build configuration, bundles, and writes the outputs.
    /// Returns the written paths.
    pub async fn compile(
        &self,
        manifest: &ReadChannel<AssetsManifest>,
    ) -> Result<Vec<PathBuf>> {
        let manifest = manifest.read().await?;
        tracing::debug!(version = %manifest.version, "assets manifest received");

        let config = build_server_config(&self.project, &manifest, &self.options)?;
        let artifacts = executor::execute(config, &self.options).await?;
        let written = materialize(&artifacts, &self.project)?;

        tracing::info!(
            files = written.len(),
            outfile = %self.project.server_build_path.display(),
            "server build written"
        );
        Ok(written)
    }

    /// Release the compiler.
    ///
    /// Builds hold no background resources, so this only consumes the
    /// handle. It exists so callers can make teardown explicit.
    pub fn dispose(self) {}
}
