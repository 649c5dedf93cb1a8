//! Resolution of request filters from the project configuration and one output.
//!
//! Every field present on an [`Output`] replaces the project-level field as a whole;
//! lists are never merged element by element.

use serde::Serialize;

use crate::{
    config::{Output, ProjectConfig, RichText},
    error::Error,
    types::{IdRef, Status},
};

/// Filter sent with text item requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TextItemFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projects: Option<Vec<IdRef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variants: Option<Vec<IdRef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statuses: Option<Vec<Status>>,
}

/// Filter sent with component requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComponentFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folders: Option<Vec<IdRef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variants: Option<Vec<IdRef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statuses: Option<Vec<Status>>,
}

/// Canonical string form of a filter.
///
/// Fields are emitted in declaration order and absent fields are omitted, so the
/// same filter always yields the same string. It is sent to the API and used as
/// the trace key of fetch log events.
pub trait FilterKey: Serialize {
    fn to_filter_key(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }
}

impl FilterKey for TextItemFilter {}
impl FilterKey for ComponentFilter {}

impl TextItemFilter {
    /// Narrows the filter to one project for an export call; the variant travels separately.
    pub fn for_project(&self, project: &IdRef) -> Self {
        TextItemFilter {
            projects: Some(vec![project.clone()]),
            variants: None,
            statuses: self.statuses.clone(),
        }
    }
}

impl ComponentFilter {
    /// Drops the variant list for an export call; the variant travels separately.
    pub fn without_variants(&self) -> Self {
        ComponentFilter {
            folders: self.folders.clone(),
            variants: None,
            statuses: self.statuses.clone(),
        }
    }
}

/// Everything the fetchers need to know about one output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFilters {
    pub text_items: TextItemFilter,
    pub components: ComponentFilter,
    /// Whether components should be requested at all.
    pub include_components: bool,
    pub rich_text: Option<RichText>,
}

impl ResolvedFilters {
    pub fn rich_text_enabled(&self) -> bool {
        self.rich_text.is_some_and(RichText::is_enabled)
    }
}

/// Merges the project configuration with one output's overrides.
pub fn resolve(config: &ProjectConfig, output: &Output) -> ResolvedFilters {
    let variants = output.variants.clone().or_else(|| config.variants.clone());
    let statuses = output.statuses.clone().or_else(|| config.statuses.clone());
    let folders = output.folders.clone().or_else(|| config.folders().cloned());

    ResolvedFilters {
        text_items: TextItemFilter {
            projects: output.projects.clone().or_else(|| config.projects.clone()),
            variants: variants.clone(),
            statuses: statuses.clone(),
        },
        components: ComponentFilter {
            folders,
            variants,
            statuses,
        },
        include_components: config.components.is_some() || output.folders.is_some(),
        rich_text: resolve_rich_text(config, output),
    }
}

/// `false` on the output wins over an enabled project setting; otherwise the
/// output value falls back to the project value.
pub fn resolve_rich_text(config: &ProjectConfig, output: &Output) -> Option<RichText> {
    output.rich_text.or(config.rich_text)
}
