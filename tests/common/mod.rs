#![allow(dead_code)]

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::Mutex,
};

use async_trait::async_trait;
use textsync::{
    client::{ContentApi, ExportOptions, RequestContext, SwiftDriverRequest, TokenSource},
    error::Error,
    filter::{ComponentFilter, TextItemFilter},
    types::{Component, ExportPayload, Project, Status, TextItem, Variable, Variant},
    writer::FileWriter,
};

/// In-memory content API. Structured calls return the configured entities,
/// export calls render `prefix/variant/format` so tests can check routing.
#[derive(Default)]
pub struct FakeApi {
    pub text_items: Vec<TextItem>,
    pub components: Vec<Component>,
    pub variables: Vec<Variable>,
    pub projects: Vec<Project>,
    pub variants: Vec<Variant>,
    /// Token the API accepts; any token is accepted when `None`.
    pub valid_token: Option<String>,
    /// Projects whose export fails with a rejected filter.
    pub rejected_projects: Vec<String>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeApi {
    fn check(&self, ctx: &RequestContext, call: String) -> Result<(), Error> {
        self.calls.lock().unwrap().push(call);
        match &self.valid_token {
            Some(token) if *token != ctx.token => Err(Error::Auth),
            _ => Ok(()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentApi for FakeApi {
    async fn fetch_text_items(
        &self,
        ctx: &RequestContext,
        filter: &TextItemFilter,
        rich_text: bool,
    ) -> Result<Vec<TextItem>, Error> {
        self.check(ctx, format!("textItems rich={}", rich_text))?;
        let projects: Option<Vec<&str>> = filter
            .projects
            .as_ref()
            .map(|p| p.iter().map(|r| r.id.as_str()).collect());
        Ok(self
            .text_items
            .iter()
            .filter(|item| {
                projects
                    .as_ref()
                    .is_none_or(|ids| ids.contains(&item.project_id.as_str()))
            })
            .cloned()
            .collect())
    }

    async fn fetch_components(
        &self,
        ctx: &RequestContext,
        _filter: &ComponentFilter,
        rich_text: bool,
    ) -> Result<Vec<Component>, Error> {
        self.check(ctx, format!("components rich={}", rich_text))?;
        Ok(self.components.clone())
    }

    async fn fetch_variables(&self, ctx: &RequestContext) -> Result<Vec<Variable>, Error> {
        self.check(ctx, "variables".to_string())?;
        Ok(self.variables.clone())
    }

    async fn fetch_projects(&self, ctx: &RequestContext) -> Result<Vec<Project>, Error> {
        self.check(ctx, "projects".to_string())?;
        Ok(self.projects.clone())
    }

    async fn fetch_variants(&self, ctx: &RequestContext) -> Result<Vec<Variant>, Error> {
        self.check(ctx, "variants".to_string())?;
        Ok(self.variants.clone())
    }

    async fn export_text_items(
        &self,
        ctx: &RequestContext,
        filter: &TextItemFilter,
        options: &ExportOptions,
    ) -> Result<ExportPayload, Error> {
        let project = filter.projects.as_ref().unwrap()[0].id.clone();
        self.check(
            ctx,
            format!("export {}/{}/{}", project, options.variant_id, options.format),
        )?;
        if self.rejected_projects.contains(&project) {
            return Err(Error::filter_rejected(None));
        }
        Ok(render(&project, options))
    }

    async fn export_components(
        &self,
        ctx: &RequestContext,
        _filter: &ComponentFilter,
        options: &ExportOptions,
    ) -> Result<ExportPayload, Error> {
        self.check(
            ctx,
            format!("export components/{}/{}", options.variant_id, options.format),
        )?;
        Ok(render("components", options))
    }

    async fn generate_swift_driver(
        &self,
        ctx: &RequestContext,
        request: &SwiftDriverRequest,
    ) -> Result<String, Error> {
        self.check(ctx, "swift".to_string())?;
        Ok(format!(
            "// projects: {}\nimport Foundation",
            serde_json::to_string(&request.projects).unwrap()
        ))
    }

    async fn check_token(&self, ctx: &RequestContext) -> Result<(), Error> {
        self.check(ctx, "token-check".to_string())
    }
}

fn render(prefix: &str, options: &ExportOptions) -> ExportPayload {
    if options.format == "json_icu" {
        ExportPayload::Map(BTreeMap::from([(
            format!("{}_key", prefix),
            format!("{}:{}", prefix, options.variant_id),
        )]))
    } else {
        ExportPayload::Text(format!("{}:{}:{}", prefix, options.variant_id, options.format))
    }
}

pub struct StaticTokenSource(pub &'static str);

#[async_trait]
impl TokenSource for StaticTokenSource {
    async fn collect_token(&self) -> Result<String, Error> {
        Ok(self.0.to_string())
    }
}

/// Keeps written files in memory; paths listed in `fail` are refused.
#[derive(Default)]
pub struct MemoryWriter {
    pub files: Mutex<BTreeMap<PathBuf, String>>,
    pub fail: Vec<PathBuf>,
}

impl MemoryWriter {
    pub fn get(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files.lock().unwrap().get(path.as_ref()).cloned()
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.lock().unwrap().keys().cloned().collect()
    }
}

impl FileWriter for MemoryWriter {
    fn write_file(&self, path: &Path, content: &str) -> Result<(), Error> {
        if self.fail.iter().any(|p| p == path) {
            return Err(Error::Write {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            });
        }
        self.files.lock().unwrap().insert(
            path.to_path_buf(),
            textsync::writer::with_trailing_newline(content).into_owned(),
        );
        Ok(())
    }
}

pub fn ctx() -> RequestContext {
    RequestContext::new("http://localhost:4000", "good-token").with_client_id("tests")
}

pub fn text_item(id: &str, project: &str, variant: Option<&str>, text: &str) -> TextItem {
    TextItem {
        id: id.to_string(),
        text: text.to_string(),
        rich_text: None,
        status: Status::Final,
        notes: String::new(),
        tags: vec![],
        variable_ids: vec![],
        variant_id: variant.map(str::to_string),
        plural_form: None,
        project_id: project.to_string(),
    }
}

pub fn component(id: &str, variant: Option<&str>, text: &str) -> Component {
    Component {
        id: id.to_string(),
        text: text.to_string(),
        rich_text: None,
        status: Status::Final,
        notes: String::new(),
        tags: vec![],
        variable_ids: vec![],
        variant_id: variant.map(str::to_string),
        plural_form: None,
        folder_id: None,
    }
}
