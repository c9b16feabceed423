//! Bundler execution.
//!
//! Takes an assembled [`ServerBuildConfig`], runs Rolldown in memory,
//! and returns the produced files as [`BuildOutputArtifact`]s. Nothing
//! is written to disk here; materialization is a separate stage so the
//! post-processing rewrites happen before any file lands.

use std::path::Path;

use rolldown::{
    BundlerBuilder, BundlerOptions, InputItem, OutputFormat, Platform, RawMinifyOptions,
    ResolveOptions, SourceMapType,
};
use rolldown_common::{Output, StrOrBytes};

use crate::builder::{ServerBuildConfig, ServerEntry};
use crate::config::ModuleFormat;
use crate::diagnostics;
use crate::options::CompileOptions;
use crate::target::ServerPlatform;
use crate::{Error, Result};

/// One file produced by the bundler, still in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutputArtifact {
    /// Path relative to the server build directory.
    pub file_name: String,
    pub contents: ArtifactContents,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactContents {
    Text(String),
    Bytes(Vec<u8>),
}

impl BuildOutputArtifact {
    pub fn text(file_name: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            contents: ArtifactContents::Text(contents.into()),
        }
    }

    pub fn bytes(file_name: impl Into<String>, contents: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            contents: ArtifactContents::Bytes(contents),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match &self.contents {
            ArtifactContents::Text(s) => s.as_bytes(),
            ArtifactContents::Bytes(b) => b,
        }
    }
}

/// Run the bundler for one assembled configuration.
pub async fn execute(
    config: ServerBuildConfig,
    options: &CompileOptions,
) -> Result<Vec<BuildOutputArtifact>> {
    let ServerBuildConfig {
        entry,
        entry_name,
        platform,
        format,
        outfile,
        conditions,
        main_fields,
        minify,
        sourcemap,
        cwd,
        tsconfig,
        defines: _,
        chain,
    } = config;

    if let Some(tsconfig) = &tsconfig {
        tracing::debug!(path = %tsconfig.display(), "tsconfig configured for resolution");
    }

    let bundler_options = BundlerOptions {
        input: Some(vec![InputItem {
            name: Some(entry_name),
            import: entry.import(),
        }]),
        cwd: Some(cwd.clone()),
        format: Some(match format {
            ModuleFormat::Esm => OutputFormat::Esm,
            ModuleFormat::Cjs => OutputFormat::Cjs,
        }),
        platform: Some(match platform {
            ServerPlatform::Cloudflare => Platform::Browser,
            ServerPlatform::Node | ServerPlatform::Deno => Platform::Node,
        }),
        sourcemap: sourcemap.then_some(SourceMapType::File),
        minify: minify.then(|| RawMinifyOptions::from(true)),
        resolve: Some(configure_resolution(&cwd, conditions, main_fields)),
        ..Default::default()
    };

    tracing::debug!(
        entry = %match &entry {
            ServerEntry::File(path) => path.display().to_string(),
            ServerEntry::Virtual => "<synthesized>".to_string(),
        },
        outfile = %outfile.display(),
        "starting server bundle"
    );

    let mut bundler = BundlerBuilder::default()
        .with_options(bundler_options)
        .with_plugins(chain.into_plugins())
        .build()
        .map_err(|e| Error::Bundler(diagnostics::extract_from_rolldown_error(&e)))?;

    let bundle = bundler
        .generate()
        .await
        .map_err(|e| Error::Bundler(diagnostics::extract_from_rolldown_error(&e)))?;

    if !bundle.warnings.is_empty() {
        options.warn(&format!(
            "server build completed with {} warning(s)",
            bundle.warnings.len()
        ));
    }

    let mut artifacts = Vec::with_capacity(bundle.assets.len());
    for output in &bundle.assets {
        match output {
            Output::Chunk(chunk) => {
                artifacts.push(BuildOutputArtifact::text(
                    chunk.filename.to_string(),
                    chunk.code.clone(),
                ));
                if sourcemap {
                    if let Some(map) = &chunk.map {
                        artifacts.push(BuildOutputArtifact::text(
                            format!("{}.map", chunk.filename),
                            map.to_json_string(),
                        ));
                    }
                }
            }
            Output::Asset(asset) => {
                let file_name = asset.filename.to_string();
                artifacts.push(match &asset.source {
                    StrOrBytes::Str(s) => BuildOutputArtifact::text(file_name, s.clone()),
                    StrOrBytes::Bytes(b) => BuildOutputArtifact::bytes(file_name, b.clone()),
                });
            }
        }
    }

    // A chunk's in-memory map and an emitted .map asset can name the
    // same file; keep the first occurrence.
    dedup_by_file_name(&mut artifacts);

    tracing::debug!(artifacts = artifacts.len(), "server bundle generated");
    Ok(artifacts)
}

fn dedup_by_file_name(artifacts: &mut Vec<BuildOutputArtifact>) {
    let mut seen = rustc_hash::FxHashSet::default();
    artifacts.retain(|artifact| seen.insert(artifact.file_name.clone()));
}

/// Module resolution settings for the server build.
fn configure_resolution(
    cwd: &Path,
    conditions: Option<&'static [&'static str]>,
    main_fields: &'static [&'static str],
) -> ResolveOptions {
    // Walk node_modules from the project root upward, npm-style.
    let mut modules = Vec::new();
    let mut current = cwd;
    loop {
        modules.push(current.join("node_modules").to_string_lossy().into_owned());
        match current.parent() {
            Some(parent) => current = parent,
            None => break,
        }
    }
    modules.push("node_modules".to_string());

    ResolveOptions {
        main_fields: Some(main_fields.iter().map(|s| s.to_string()).collect()),
        condition_names: conditions.map(|c| c.iter().map(|s| s.to_string()).collect()),
        extensions: Some(
            [".tsx", ".ts", ".jsx", ".js", ".json", ".mjs", ".mdx", ".md"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        ),
        modules: Some(modules),
        symlinks: Some(true),
        ..Default::default()
    }
}
