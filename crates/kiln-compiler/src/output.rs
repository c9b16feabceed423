//! Output materialization.
//!
//! Writes the in-memory build artifacts to their final on-disk layout,
//! applying the post-processing the raw bundler output still needs:
//!
//! - `.js` files get their `sourceMappingURL` comment rewritten to the
//!   map's bare filename, since the bundle may be served from a path
//!   other than the directory it was emitted into.
//! - `.map` files have the `route:` scheme stripped from source names
//!   so debuggers resolve breakpoints against the real files.
//! - Everything else is a content-addressed asset and is re-rooted from
//!   the server build directory into the public assets directory.

use std::fs;
use std::path::{Path, PathBuf};

use path_clean::PathClean;
use regex::Regex;

use crate::config::ProjectConfig;
use crate::executor::{ArtifactContents, BuildOutputArtifact};
use crate::plugins::ROUTE_SCHEME;
use crate::{Error, Result};

/// Write all artifacts to disk. Returns the written paths in artifact
/// order.
pub fn materialize(
    artifacts: &[BuildOutputArtifact],
    project: &ProjectConfig,
) -> Result<Vec<PathBuf>> {
    let build_dir = project.server_build_directory();
    create_dir(build_dir)?;

    let mut written = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        let path = if artifact.file_name.ends_with(".js") {
            let target = resolve_target(build_dir, &artifact.file_name)?;
            let code = text_contents(artifact);
            write_file(&target, fix_sourcemap_url(&code, &artifact.file_name).as_bytes())?;
            target
        } else if artifact.file_name.ends_with(".map") {
            let target = resolve_target(build_dir, &artifact.file_name)?;
            let map = text_contents(artifact);
            write_file(&target, strip_route_scheme(&map).as_bytes())?;
            target
        } else {
            // Assets land next to the client build so the public URL
            // space stays consistent between the two bundles.
            let target = resolve_target(&project.assets_build_directory, &artifact.file_name)?;
            write_file(&target, artifact.as_bytes())?;
            target
        };
        tracing::trace!(path = %path.display(), "wrote build output");
        written.push(path);
    }
    Ok(written)
}

/// Rewrite the trailing `sourceMappingURL` comment so it references the
/// map by bare filename, stripping whatever directory prefix the
/// bundler put in front of it.
fn fix_sourcemap_url(code: &str, file_name: &str) -> String {
    let base_name = file_name.rsplit('/').next().unwrap_or(file_name);
    let pattern = format!(
        "(//# sourceMappingURL=)(.*){}\\.map",
        regex::escape(base_name)
    );
    let Ok(re) = Regex::new(&pattern) else {
        return code.to_string();
    };
    re.replace(code, |caps: &regex::Captures<'_>| {
        format!("{}{base_name}.map", &caps[1])
    })
    .into_owned()
}

/// Remove the route module scheme from quoted source names in a map.
fn strip_route_scheme(map: &str) -> String {
    map.replace(&format!("\"{ROUTE_SCHEME}"), "\"")
}

fn text_contents(artifact: &BuildOutputArtifact) -> String {
    match &artifact.contents {
        ArtifactContents::Text(s) => s.clone(),
        ArtifactContents::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
    }
}

/// Join a bundler-relative file name onto a base directory, refusing
/// anything that escapes it.
fn resolve_target(base: &Path, file_name: &str) -> Result<PathBuf> {
    if file_name.contains('\0') {
        return Err(Error::InvalidOutputPath(
            "output file name contains a null byte".to_string(),
        ));
    }
    let target = base.join(Path::new(file_name).clean()).clean();
    if !target.starts_with(base) {
        return Err(Error::InvalidOutputPath(format!(
            "output file name {file_name:?} escapes {}",
            base.display()
        )));
    }
    Ok(target)
}

fn create_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|source| Error::WriteFailure {
        path: dir.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir(parent)?;
    }
    fs::write(path, contents).map_err(|source| Error::WriteFailure {
        path: path.to_path_buf(),
        source,
    })
}
