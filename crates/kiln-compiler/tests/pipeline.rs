//! End-to-end tests over the public pipeline surface, short of running
//! the bundler itself: configuration assembly, the plugin chain, and
//! output materialization.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use kiln_compiler::{
    AssetsManifest, BuildMode, BuildOutputArtifact, CompileOptions, ManifestRoute, ModuleFormat,
    ProjectConfig, ServerCompiler, ServerEntry, ServerTarget, build_server_config,
    output::materialize,
};

fn manifest() -> Arc<AssetsManifest> {
    Arc::new(AssetsManifest::default())
}

#[test]
fn node_and_worker_builds_differ_only_where_the_platform_demands() {
    let node = ProjectConfig::new("/app");
    let worker = ProjectConfig::new("/app").server_build_target(ServerTarget::CloudflareWorkers);
    let production = CompileOptions::new(BuildMode::Production);

    let node_config = build_server_config(&node, &manifest(), &production).unwrap();
    let worker_config = build_server_config(&worker, &manifest(), &production).unwrap();

    // Same entry and outputs.
    assert_eq!(node_config.entry, ServerEntry::Virtual);
    assert_eq!(worker_config.entry, ServerEntry::Virtual);
    assert_eq!(node_config.outfile, worker_config.outfile);

    // Platform-dependent choices diverge.
    assert!(node_config.conditions.is_none());
    assert_eq!(worker_config.conditions, Some(&["worker"][..]));
    assert!(!node_config.minify);
    assert!(worker_config.minify);
    assert!(!node_config.plugin_names().contains(&"kiln:node-polyfill"));
    assert!(worker_config.plugin_names().contains(&"kiln:node-polyfill"));
}

#[test]
fn chain_boundaries_hold_on_every_platform() {
    for target in [
        ServerTarget::Node,
        ServerTarget::Deno,
        ServerTarget::CloudflarePages,
        ServerTarget::Other("fastly".into()),
    ] {
        let project = ProjectConfig::new("/app").server_build_target(target);
        let config = build_server_config(
            &project,
            &manifest(),
            &CompileOptions::new(BuildMode::Development),
        )
        .unwrap();
        let names = config.plugin_names();
        assert_eq!(names[0], "kiln:app-alias");
        assert_eq!(*names.last().unwrap(), "kiln:bare-imports");
    }
}

#[test]
fn cjs_format_flips_main_field_priority() {
    let project = ProjectConfig::new("/app").server_module_format(ModuleFormat::Cjs);
    let config = build_server_config(
        &project,
        &manifest(),
        &CompileOptions::new(BuildMode::Development),
    )
    .unwrap();
    assert_eq!(config.main_fields, ["main", "module"]);
}

#[test]
fn manifest_serializes_in_camel_case() {
    let mut manifest = AssetsManifest::default();
    manifest.version = "abc123".to_string();
    manifest.routes.insert(
        "routes/home".to_string(),
        ManifestRoute {
            id: "routes/home".to_string(),
            parent_id: Some("root".to_string()),
            has_loader: true,
            ..Default::default()
        },
    );

    let json = serde_json::to_string(&manifest).unwrap();
    assert!(json.contains("\"parentId\":\"root\""));
    assert!(json.contains("\"hasLoader\":true"));
    assert!(!json.contains("parent_id"));
}

#[test]
fn materialized_tree_matches_the_configured_layout() {
    let tmp = tempfile::tempdir().unwrap();
    let project = ProjectConfig::new(tmp.path())
        .server_build_path(tmp.path().join("dist/server/index.js"))
        .assets_build_directory(tmp.path().join("public/assets"));

    let artifacts = vec![
        BuildOutputArtifact::text(
            "index.js",
            "serve();\n//# sourceMappingURL=dist/server/index.js.map\n",
        ),
        BuildOutputArtifact::text(
            "index.js.map",
            r#"{"sources":["route:app/routes/home.tsx","app/entry.server.tsx"]}"#,
        ),
        BuildOutputArtifact::bytes("_assets/font-1a2b3c.woff2", b"woff2".to_vec()),
    ];

    let written = materialize(&artifacts, &project).unwrap();
    assert_eq!(
        written,
        vec![
            tmp.path().join("dist/server/index.js"),
            tmp.path().join("dist/server/index.js.map"),
            tmp.path().join("public/assets/_assets/font-1a2b3c.woff2"),
        ]
    );

    let bundle = fs::read_to_string(&written[0]).unwrap();
    assert!(bundle.ends_with("//# sourceMappingURL=index.js.map\n"));

    let map = fs::read_to_string(&written[1]).unwrap();
    assert_eq!(
        map,
        r#"{"sources":["app/routes/home.tsx","app/entry.server.tsx"]}"#
    );
}

#[tokio::test]
async fn compiler_surfaces_a_dead_manifest_producer() {
    let (tx, rx) = kiln_compiler::channel::<AssetsManifest>();
    drop(tx);

    let compiler = ServerCompiler::new(
        ProjectConfig::new(PathBuf::from("/nonexistent")),
        CompileOptions::new(BuildMode::Development),
    );
    let err = compiler.compile(&rx).await.unwrap_err();
    assert!(matches!(err, kiln_compiler::Error::ManifestClosed(_)));
}
