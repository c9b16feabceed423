//! Stylesheet file loader.
//!
//! Intercepts `.css` loading and runs the sheet through lightningcss so
//! the bundler emits it as a hashed asset the server bundle can
//! reference by URL. Minification follows the build mode.

use std::borrow::Cow;
use std::path::Path;

use anyhow::Context;
use lightningcss::{
    printer::PrinterOptions,
    stylesheet::{MinifyOptions, ParserOptions, StyleSheet},
};
use rolldown_common::ModuleType;
use rolldown_plugin::{HookLoadArgs, HookLoadOutput, HookLoadReturn, Plugin, PluginContext};

/// Loads and processes `.css` files.
#[derive(Debug, Clone)]
pub struct CssFilePlugin {
    minify: bool,
}

impl CssFilePlugin {
    pub fn new(minify: bool) -> Self {
        Self { minify }
    }
}

impl Plugin for CssFilePlugin {
    fn name(&self) -> Cow<'static, str> {
        "kiln:css-file".into()
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
        let minify = self.minify;

        async move {
            if !id.ends_with(".css") {
                return Ok(None);
            }

            let source = tokio::fs::read_to_string(&id)
                .await
                .with_context(|| format!("failed to read stylesheet: {id}"))?;

            let processed = process_css(Path::new(&id), &source, minify)?;

            Ok(Some(HookLoadOutput {
                code: processed.into(),
                module_type: Some(ModuleType::Css),
                ..Default::default()
            }))
        }
    }
}

/// Parse, optionally minify, and reprint a stylesheet.
pub(crate) fn process_css(path: &Path, source: &str, minify: bool) -> anyhow::Result<String> {
    let mut stylesheet = StyleSheet::parse(
        source,
        ParserOptions {
            filename: path.to_string_lossy().to_string(),
            ..Default::default()
        },
    )
    .map_err(|e| anyhow::anyhow!("failed to parse CSS from {}: {e:?}", path.display()))?;

    if minify {
        stylesheet
            .minify(MinifyOptions::default())
            .map_err(|e| anyhow::anyhow!("failed to minify CSS from {}: {e:?}", path.display()))?;
    }

    let result = stylesheet
        .to_css(PrinterOptions {
            minify,
            ..Default::default()
        })
        .map_err(|e| anyhow::anyhow!("failed to print CSS from {}: {e:?}", path.display()))?;

    Ok(result.code)
}
