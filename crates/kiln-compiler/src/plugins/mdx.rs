//! Markdown/MDX route loader.
//!
//! Compiles `.md`/`.mdx` files into JavaScript modules at load time so
//! markdown documents can act as route modules. Frontmatter is split off
//! and exported as `attributes`; the body compiles to HTML exported both
//! as a string and as the default component.

use std::borrow::Cow;

use anyhow::Context;
use rolldown_common::ModuleType;
use rolldown_plugin::{HookLoadArgs, HookLoadOutput, HookLoadReturn, Plugin, PluginContext};

/// Compiles markdown documents into route modules.
#[derive(Debug, Clone, Default)]
pub struct MdxPlugin;

impl MdxPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl Plugin for MdxPlugin {
    fn name(&self) -> Cow<'static, str> {
        "kiln:mdx".into()
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

        async move {
            if !(id.ends_with(".md") || id.ends_with(".mdx")) {
                return Ok(None);
            }

            let source = tokio::fs::read_to_string(&id)
                .await
                .with_context(|| format!("failed to read markdown module: {id}"))?;

            let code =
                compile_markdown_module(&source).with_context(|| format!("failed to compile {id}"))?;

            Ok(Some(HookLoadOutput {
                code: code.into(),
                module_type: Some(ModuleType::Js),
                ..Default::default()
            }))
        }
    }
}

/// Split a leading `---` frontmatter block from the body.
pub(crate) fn split_frontmatter(source: &str) -> (Option<&str>, &str) {
    let Some(rest) = source.strip_prefix("---\n") else {
        return (None, source);
    };
    match rest.split_once("\n---\n") {
        Some((frontmatter, body)) => (Some(frontmatter), body),
        // Unterminated frontmatter is treated as body.
        None => (None, source),
    }
}

/// Compile a markdown document into a JS module.
pub(crate) fn compile_markdown_module(source: &str) -> anyhow::Result<String> {
    let (frontmatter, body) = split_frontmatter(source);

    let html = markdown::to_html_with_options(body, &markdown::Options::gfm())
        .map_err(|e| anyhow::anyhow!("markdown compilation failed: {e}"))?;

    let attributes = serde_json::to_string(frontmatter.unwrap_or(""))?;
    let html_literal = serde_json::to_string(&html)?;

    Ok(format!(
        "export const attributes = {attributes};\n\
         export const html = {html_literal};\n\
         export default function MarkdownRoute() {{\n\
         \u{20} return html;\n\
         }}\n"
    ))
}
