mod common;

use std::{path::PathBuf, sync::Arc};

use serde_json::json;
use tempfile::tempdir;
use textsync::{Error, FsWriter, Pipeline, ProjectConfig};

use common::{FakeApi, MemoryWriter, StaticTokenSource, component, ctx, text_item};

fn config(value: serde_json::Value) -> ProjectConfig {
    ProjectConfig::from_value(value).expect("valid config")
}

fn pipeline(api: Arc<FakeApi>, writer: Arc<MemoryWriter>) -> Pipeline {
    Pipeline::new(api, writer)
}

#[tokio::test]
async fn test_json_single_item_writes_file_and_empty_variables() {
    let api = Arc::new(FakeApi {
        text_items: vec![text_item("t1", "p1", None, "Hi")],
        ..Default::default()
    });
    let writer = Arc::new(MemoryWriter::default());
    let config = config(json!({
        "projects": [{ "id": "p1" }],
        "outputs": [{ "format": "json", "outDir": "out" }]
    }));

    let report = pipeline(api, writer.clone()).run(&ctx(), &config).await.unwrap();

    assert!(report.is_success());
    assert_eq!(
        writer.get("out/p1___base.json").unwrap(),
        "{\n  \"t1\": \"Hi\"\n}\n"
    );
    assert_eq!(writer.get("out/variables.json").unwrap(), "{}\n");
    assert_eq!(writer.paths().len(), 2);
}

#[tokio::test]
async fn test_json_rich_text_from_output() {
    let mut item = text_item("t1", "p1", None, "Hi");
    item.rich_text = Some("<b>Hi</b>".to_string());
    let api = Arc::new(FakeApi {
        text_items: vec![item],
        ..Default::default()
    });
    let writer = Arc::new(MemoryWriter::default());
    let config = config(json!({
        "projects": [{ "id": "p1" }],
        "outputs": [{ "format": "json", "outDir": "out", "richText": "html" }]
    }));

    pipeline(api.clone(), writer.clone())
        .run(&ctx(), &config)
        .await
        .unwrap();

    assert_eq!(
        writer.get("out/p1___base.json").unwrap(),
        "{\n  \"t1\": \"<b>Hi</b>\"\n}\n"
    );
    assert!(api.calls().contains(&"textItems rich=true".to_string()));
}

#[tokio::test]
async fn test_output_rich_text_false_overrides_project() {
    let mut item = text_item("t1", "p1", None, "Hi");
    item.rich_text = Some("<b>Hi</b>".to_string());
    let api = Arc::new(FakeApi {
        text_items: vec![item],
        ..Default::default()
    });
    let writer = Arc::new(MemoryWriter::default());
    let config = config(json!({
        "projects": [{ "id": "p1" }],
        "richText": "html",
        "outputs": [{ "format": "json", "outDir": "out", "richText": false }]
    }));

    pipeline(api, writer.clone()).run(&ctx(), &config).await.unwrap();

    assert_eq!(
        writer.get("out/p1___base.json").unwrap(),
        "{\n  \"t1\": \"Hi\"\n}\n"
    );
}

#[tokio::test]
async fn test_items_sharing_project_and_variant_share_one_file() {
    let api = Arc::new(FakeApi {
        text_items: vec![
            text_item("t1", "p1", Some("fr"), "Salut"),
            text_item("t2", "p1", Some("fr"), "Au revoir"),
        ],
        ..Default::default()
    });
    let writer = Arc::new(MemoryWriter::default());
    let config = config(json!({
        "projects": [{ "id": "p1" }],
        "variants": [{ "id": "fr" }],
        "outputs": [{ "format": "json", "outDir": "out" }]
    }));

    pipeline(api, writer.clone()).run(&ctx(), &config).await.unwrap();

    let written: serde_json::Value =
        serde_json::from_str(&writer.get("out/p1___fr.json").unwrap()).unwrap();
    assert_eq!(written, json!({ "t1": "Salut", "t2": "Au revoir" }));
    assert_eq!(
        writer.paths(),
        vec![PathBuf::from("out/p1___fr.json"), PathBuf::from("out/variables.json")]
    );
}

#[tokio::test]
async fn test_i18next_driver_exports_each_variant() {
    let api = Arc::new(FakeApi {
        text_items: vec![
            text_item("t1", "p1", None, "Hi"),
            text_item("t1", "p1", Some("fr"), "Salut"),
        ],
        ..Default::default()
    });
    let writer = Arc::new(MemoryWriter::default());
    let config = config(json!({
        "projects": [{ "id": "p1" }],
        "outputs": [{ "format": "json", "outDir": "out", "framework": "i18next" }]
    }));

    pipeline(api, writer.clone()).run(&ctx(), &config).await.unwrap();

    let driver = writer.get("out/index.js").unwrap();
    assert!(driver.contains("import p1___base_json from \"./p1___base.json\";"));
    assert!(driver.contains("import p1___fr_json from \"./p1___fr.json\";"));
    assert!(driver.contains(
        "export default {\n  base: {\n    ...p1___base_json,\n  },\n  fr: {\n    ...p1___fr_json,\n  },\n};\n"
    ));
    assert!(!driver.contains("variables"));
}

#[tokio::test]
async fn test_vue_i18n_rewrites_interpolation_and_uses_commonjs() {
    let api = Arc::new(FakeApi {
        text_items: vec![text_item("t1", "p1", None, "Hi {{name}}")],
        components: vec![component("c1", None, "{{count}} left")],
        ..Default::default()
    });
    let writer = Arc::new(MemoryWriter::default());
    let config = config(json!({
        "projects": [{ "id": "p1" }],
        "components": {},
        "outputs": [{ "format": "json", "outDir": "web", "framework": "vue-i18n" }]
    }));

    pipeline(api, writer.clone()).run(&ctx(), &config).await.unwrap();

    assert_eq!(
        writer.get("web/p1___base.json").unwrap(),
        "{\n  \"t1\": \"Hi {name}\"\n}\n"
    );
    assert_eq!(
        writer.get("web/components___base.json").unwrap(),
        "{\n  \"c1\": \"{count} left\"\n}\n"
    );
    let driver = writer.get("web/index.js").unwrap();
    assert!(driver.contains("module.exports = {"));
    assert!(driver.contains("    ...components___base_json,\n    ...p1___base_json,\n"));
}

#[tokio::test]
async fn test_android_export_fans_out_over_projects_and_variants() {
    let api = Arc::new(FakeApi {
        variants: vec![textsync::types::Variant {
            id: "fr".to_string(),
            name: Some("French".to_string()),
        }],
        ..Default::default()
    });
    let writer = Arc::new(MemoryWriter::default());
    let config = config(json!({
        "projects": [{ "id": "p1" }, { "id": "p2" }],
        "variants": [{ "id": "all" }],
        "components": { "folders": [{ "id": "f1" }] },
        "outputs": [{ "format": "android", "outDir": "res" }]
    }));

    pipeline(api.clone(), writer.clone())
        .run(&ctx(), &config)
        .await
        .unwrap();

    let mut paths: Vec<_> = writer
        .paths()
        .into_iter()
        .map(|p| p.display().to_string())
        .collect();
    paths.sort();
    assert_eq!(
        paths,
        vec![
            "res/components___base.xml",
            "res/components___fr.xml",
            "res/p1___base.xml",
            "res/p1___fr.xml",
            "res/p2___base.xml",
            "res/p2___fr.xml",
            "res/variables.json",
        ]
    );
    assert_eq!(writer.get("res/p2___fr.xml").unwrap(), "p2:fr:android\n");
    assert_eq!(
        api.calls().iter().filter(|c| c.as_str() == "variants").count(),
        1
    );
}

#[tokio::test]
async fn test_ios_strings_use_locale_directories() {
    let api = Arc::new(FakeApi::default());
    let writer = Arc::new(MemoryWriter::default());
    let config = config(json!({
        "projects": [{ "id": "p1" }],
        "variants": [{ "id": "fr" }, { "id": "de" }],
        "iosLocales": [{ "base": "en" }, { "fr": "fr-FR" }],
        "outputs": [{ "format": "ios-strings", "outDir": "ios" }]
    }));

    pipeline(api, writer.clone()).run(&ctx(), &config).await.unwrap();

    assert_eq!(
        writer.get("ios/fr-FR.lproj/p1___fr.strings").unwrap(),
        "p1:fr:ios-strings\n"
    );
    assert_eq!(
        writer.get("ios/p1___de.strings").unwrap(),
        "p1:de:ios-strings\n"
    );
}

#[tokio::test]
async fn test_icu_export_writes_json_maps() {
    let api = Arc::new(FakeApi::default());
    let writer = Arc::new(MemoryWriter::default());
    let config = config(json!({
        "projects": [{ "id": "p1" }],
        "outputs": [{ "format": "json_icu", "outDir": "icu" }]
    }));

    pipeline(api, writer.clone()).run(&ctx(), &config).await.unwrap();

    assert_eq!(
        writer.get("icu/p1___base.json").unwrap(),
        "{\n  \"p1_key\": \"p1:base\"\n}\n"
    );
}

#[tokio::test]
async fn test_swift_driver_output() {
    let api = Arc::new(FakeApi::default());
    let writer = Arc::new(MemoryWriter::default());
    let config = config(json!({
        "projects": [{ "id": "p1" }],
        "outputs": [{ "format": "ios-swift", "outDir": "Sources" }]
    }));

    pipeline(api, writer.clone()).run(&ctx(), &config).await.unwrap();

    let source = writer.get("Sources/Strings.swift").unwrap();
    assert!(source.starts_with("// projects: {\"projects\":[{\"id\":\"p1\"}]}"));
    assert!(source.ends_with("import Foundation\n"));
}

#[tokio::test]
async fn test_failed_output_does_not_stop_other_outputs() {
    let api = Arc::new(FakeApi {
        text_items: vec![text_item("t1", "p1", None, "Hi")],
        rejected_projects: vec!["p2".to_string()],
        ..Default::default()
    });
    let writer = Arc::new(MemoryWriter::default());
    let config = config(json!({
        "projects": [{ "id": "p1" }],
        "outputs": [
            { "format": "android", "outDir": "res", "projects": [{ "id": "p1" }, { "id": "p2" }] },
            { "format": "json", "outDir": "out" }
        ]
    }));

    let report = pipeline(api, writer.clone()).run(&ctx(), &config).await.unwrap();

    assert!(!report.is_success());
    assert!(matches!(
        report.outputs[0].result,
        Err(Error::FilterRejected(_))
    ));
    assert!(report.outputs[1].is_success());
    assert!(writer.paths().iter().all(|p| p.starts_with("out")));
}

#[tokio::test]
async fn test_write_failure_is_reported_per_file() {
    let api = Arc::new(FakeApi {
        text_items: vec![text_item("t1", "p1", None, "Hi")],
        ..Default::default()
    });
    let writer = Arc::new(MemoryWriter {
        fail: vec![PathBuf::from("out/variables.json")],
        ..Default::default()
    });
    let config = config(json!({
        "projects": [{ "id": "p1" }],
        "outputs": [{ "format": "json", "outDir": "out" }]
    }));

    let report = pipeline(api, writer.clone()).run(&ctx(), &config).await.unwrap();

    let output = &report.outputs[0];
    assert_eq!(output.write_failures.len(), 1);
    assert_eq!(
        output.result.as_ref().unwrap(),
        &vec![PathBuf::from("out/p1___base.json")]
    );
    assert!(writer.get("out/p1___base.json").is_some());
}

#[tokio::test]
async fn test_auth_failure_collects_token_and_retries_once() {
    let api = Arc::new(FakeApi {
        text_items: vec![text_item("t1", "p1", None, "Hi")],
        valid_token: Some("fresh-token".to_string()),
        ..Default::default()
    });
    let writer = Arc::new(MemoryWriter::default());
    let config = config(json!({
        "projects": [{ "id": "p1" }],
        "outputs": [{ "format": "json", "outDir": "out" }]
    }));

    let report = pipeline(api, writer.clone())
        .with_token_source(Arc::new(StaticTokenSource("fresh-token")))
        .run(&ctx(), &config)
        .await
        .unwrap();

    assert!(report.is_success());
    assert!(writer.get("out/p1___base.json").is_some());
}

#[tokio::test]
async fn test_rejected_new_token_is_not_retried() {
    let api = Arc::new(FakeApi {
        valid_token: Some("fresh-token".to_string()),
        ..Default::default()
    });
    let writer = Arc::new(MemoryWriter::default());
    let config = config(json!({
        "projects": [{ "id": "p1" }],
        "outputs": [{ "format": "json" }]
    }));

    let report = pipeline(api.clone(), writer.clone())
        .with_token_source(Arc::new(StaticTokenSource("still-wrong")))
        .run(&ctx(), &config)
        .await
        .unwrap();

    assert!(matches!(report.outputs[0].result, Err(Error::Auth)));
    assert_eq!(
        api.calls().iter().filter(|c| c.as_str() == "token-check").count(),
        1
    );
    assert_eq!(
        api.calls().iter().filter(|c| c.as_str() == "variables").count(),
        1
    );
}

#[tokio::test]
async fn test_rejected_filter_does_not_collect_a_token() {
    let api = Arc::new(FakeApi {
        rejected_projects: vec!["p9".to_string()],
        ..Default::default()
    });
    let writer = Arc::new(MemoryWriter::default());
    let config = config(json!({
        "projects": [{ "id": "p9" }],
        "outputs": [{ "format": "android" }]
    }));

    let report = pipeline(api.clone(), writer)
        .with_token_source(Arc::new(StaticTokenSource("fresh-token")))
        .run(&ctx(), &config)
        .await
        .unwrap();

    assert!(matches!(report.outputs[0].result, Err(Error::FilterRejected(_))));
    assert!(!api.calls().contains(&"token-check".to_string()));
}

#[tokio::test]
async fn test_variables_are_fetched_once_per_run() {
    let api = Arc::new(FakeApi {
        text_items: vec![text_item("t1", "p1", None, "Hi")],
        ..Default::default()
    });
    let writer = Arc::new(MemoryWriter::default());
    let config = config(json!({
        "projects": [{ "id": "p1" }],
        "outputs": [
            { "format": "json", "outDir": "web" },
            { "format": "android", "outDir": "res" },
            { "format": "ios-swift", "outDir": "Sources" }
        ]
    }));

    let report = pipeline(api.clone(), writer.clone())
        .run(&ctx(), &config)
        .await
        .unwrap();

    assert!(report.is_success());
    assert_eq!(
        api.calls().iter().filter(|c| c.as_str() == "variables").count(),
        1
    );
    assert!(writer.get("web/variables.json").is_some());
    assert!(writer.get("res/variables.json").is_some());
}

#[tokio::test]
async fn test_auth_failure_without_token_source_is_reported() {
    let api = Arc::new(FakeApi {
        valid_token: Some("fresh-token".to_string()),
        ..Default::default()
    });
    let writer = Arc::new(MemoryWriter::default());
    let config = config(json!({
        "projects": [{ "id": "p1" }],
        "outputs": [{ "format": "json" }]
    }));

    let report = pipeline(api, writer.clone()).run(&ctx(), &config).await.unwrap();

    assert!(matches!(report.outputs[0].result, Err(Error::Auth)));
    assert!(writer.paths().is_empty());
}

#[tokio::test]
async fn test_invalid_configuration_aborts_before_fetching() {
    let api = Arc::new(FakeApi::default());
    let writer = Arc::new(MemoryWriter::default());
    let config = ProjectConfig::default();

    let result = pipeline(api.clone(), writer).run(&ctx(), &config).await;

    assert!(matches!(result, Err(Error::Configuration(_))));
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_fs_writer_end_to_end() {
    let dir = tempdir().unwrap();
    let out_dir = dir.path().join("locales");
    let api = Arc::new(FakeApi {
        text_items: vec![text_item("t1", "p1", None, "Hi")],
        ..Default::default()
    });
    let config = config(json!({
        "projects": [{ "id": "p1" }],
        "outputs": [{ "format": "json", "outDir": out_dir, "framework": { "framework": "i18next", "typescript": true } }]
    }));

    let report = Pipeline::new(api, Arc::new(FsWriter))
        .run(&ctx(), &config)
        .await
        .unwrap();

    assert_eq!(report.written().len(), 3);
    assert_eq!(
        std::fs::read_to_string(out_dir.join("p1___base.json")).unwrap(),
        "{\n  \"t1\": \"Hi\"\n}\n"
    );
    assert!(out_dir.join("index.ts").exists());
}
