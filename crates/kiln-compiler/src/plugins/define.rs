//! Compile-time constant injection.
//!
//! Replaces configured tokens (`process.env.NODE_ENV`, the dev-server
//! websocket port) with literal values during the transform phase. Mode
//! and port come in as explicit configuration; the pipeline never reads
//! process environment itself.

use std::borrow::Cow;
use std::sync::Arc;

use regex::Regex;
use rolldown_common::ModuleType;
use rolldown_plugin::{
    HookTransformArgs, HookTransformOutput, HookTransformReturn, Plugin,
    SharedTransformPluginContext,
};

use crate::{Error, Result};

/// One token replacement compiled into a boundary-safe pattern.
#[derive(Debug, Clone)]
struct Define {
    pattern: Regex,
    replacement: String,
}

/// Rewrites configured tokens to literal values.
#[derive(Debug, Clone)]
pub struct DefinePlugin {
    defines: Arc<Vec<Define>>,
}

impl DefinePlugin {
    /// Build from `(token, literal)` pairs. The literal is substituted
    /// verbatim, so string values must arrive pre-quoted.
    pub fn new(defines: &[(String, String)]) -> Result<Self> {
        let compiled = defines
            .iter()
            .map(|(token, value)| {
                let escaped = regex::escape(token);
                // Token must not be part of a longer member path or
                // identifier on either side.
                let pattern = Regex::new(&format!(
                    r"(?P<pre>^|[^\w$.]){escaped}(?P<post>$|[^\w$])"
                ))
                .map_err(|e| Error::InvalidConfig(format!("invalid define token {token:?}: {e}")))?;
                Ok(Define {
                    pattern,
                    replacement: value.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            defines: Arc::new(compiled),
        })
    }
}

impl Plugin for DefinePlugin {
    fn name(&self) -> Cow<'static, str> {
        "kiln:define".into()
    }

    fn register_hook_usage(&self) -> rolldown_plugin::HookUsage {
        rolldown_plugin::HookUsage::Transform
    }

    fn transform(
        &self,
        _ctx: SharedTransformPluginContext,
        args: &HookTransformArgs<'_>,
    ) -> impl std::future::Future<Output = HookTransformReturn> + Send {
        let code = args.code.to_string();
        let module_type = args.module_type.clone();
        let defines = Arc::clone(&self.defines);

        async move {
            if !matches!(
                module_type,
                ModuleType::Js | ModuleType::Jsx | ModuleType::Ts | ModuleType::Tsx
            ) {
                return Ok(None);
            }
            let Some(rewritten) = apply_defines(&code, &defines) else {
                return Ok(None);
            };
            Ok(Some(HookTransformOutput {
                code: Some(rewritten),
                map: None,
                side_effects: None,
                module_type: None,
            }))
        }
    }
}

/// Apply every define; `None` when nothing matched.
fn apply_defines(code: &str, defines: &[Define]) -> Option<String> {
    let mut current = Cow::Borrowed(code);
    let mut changed = false;
    for define in defines {
        let replaced = define
            .pattern
            .replace_all(&current, format!("${{pre}}{}${{post}}", define.replacement));
        if let Cow::Owned(owned) = replaced {
            current = Cow::Owned(owned);
            changed = true;
        }
    }
    changed.then(|| current.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plugin(pairs: &[(&str, &str)]) -> DefinePlugin {
        let owned: Vec<_> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        DefinePlugin::new(&owned).unwrap()
    }

    #[test]
    fn replaces_node_env_token() {
        let p = plugin(&[("process.env.NODE_ENV", "\"production\"")]);
        let out = apply_defines(
            "if (process.env.NODE_ENV === \"development\") { debug(); }",
            &p.defines,
        )
        .unwrap();
        assert_eq!(out, "if (\"production\" === \"development\") { debug(); }");
    }

    #[test]
    fn does_not_touch_longer_member_paths() {
        let p = plugin(&[("process.env.NODE_ENV", "\"production\"")]);
        assert!(apply_defines("process.env.NODE_ENV_SUFFIX", &p.defines).is_none());
        assert!(apply_defines("my.process.env.NODE_ENV", &p.defines).is_none());
    }

    #[test]
    fn multiple_defines_apply_together() {
        let p = plugin(&[
            ("process.env.NODE_ENV", "\"development\""),
            ("process.env.KILN_DEV_SERVER_WS_PORT", "8002"),
        ]);
        let out = apply_defines(
            "connect(process.env.KILN_DEV_SERVER_WS_PORT); mode(process.env.NODE_ENV);",
            &p.defines,
        )
        .unwrap();
        assert_eq!(out, "connect(8002); mode(\"development\");");
    }

    #[test]
    fn untouched_code_reports_no_change() {
        let p = plugin(&[("process.env.NODE_ENV", "\"production\"")]);
        assert!(apply_defines("const x = 1;", &p.defines).is_none());
    }
}
