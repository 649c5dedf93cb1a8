//! Entity fetchers.
//!
//! Two families exist. Structured fetches return every matching entity in one
//! call per entity kind. Export fetches let the server render the target format
//! and therefore need one call per (project, variant) pair, plus one per variant
//! for the component library.
//!
//! Calls belonging to one output are dispatched together and joined. Every call
//! is allowed to settle; the first failure in dispatch order is returned.
//!
//! Variables do not depend on any filter. They are fetched once per run with
//! [`fetch_variables`] and handed to every output.

use std::collections::BTreeMap;

use futures::future::{self, BoxFuture, FutureExt};
use tracing::debug;

use crate::{
    client::{ContentApi, ExportOptions, RequestContext},
    error::Error,
    expand,
    filter::{FilterKey, ResolvedFilters},
    types::{COMPONENTS_PREFIX, Component, ExportPayload, TextItem, Variable},
};

/// Variables indexed by id.
pub type VariableIndex = BTreeMap<String, Variable>;

/// Result of a structured fetch.
#[derive(Debug, Clone, Default)]
pub struct StructuredContent {
    pub text_items: Vec<TextItem>,
    pub components: Vec<Component>,
    pub variables: VariableIndex,
}

/// One rendered payload returned by an export call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedPayload {
    /// Project id, or `components` for the component library.
    pub prefix: String,
    pub variant_id: String,
    pub payload: ExportPayload,
}

/// Result of an export fetch.
#[derive(Debug, Clone, Default)]
pub struct ExportContent {
    pub payloads: Vec<ExportedPayload>,
    pub variables: VariableIndex,
}

/// Fetches variables once and indexes them by id.
pub async fn fetch_variables(
    api: &dyn ContentApi,
    ctx: &RequestContext,
) -> Result<VariableIndex, Error> {
    let variables = api.fetch_variables(ctx).await?;
    debug!(count = variables.len(), "fetched variables");
    Ok(variables
        .into_iter()
        .map(|variable| (variable.id.clone(), variable))
        .collect())
}

/// Fetches text items and components concurrently.
pub async fn fetch_structured(
    api: &dyn ContentApi,
    ctx: &RequestContext,
    filters: &ResolvedFilters,
    variables: &VariableIndex,
) -> Result<StructuredContent, Error> {
    let rich_text = filters.rich_text_enabled();
    debug!(
        filter = %filters.text_items.to_filter_key()?,
        rich_text,
        "fetching text items"
    );

    let text_items = api.fetch_text_items(ctx, &filters.text_items, rich_text);
    let components = async {
        if !filters.include_components {
            return Ok(Vec::new());
        }
        debug!(
            filter = %filters.components.to_filter_key()?,
            rich_text,
            "fetching components"
        );
        api.fetch_components(ctx, &filters.components, rich_text)
            .await
    };
    let (text_items, components) = futures::join!(text_items, components);

    Ok(StructuredContent {
        text_items: text_items?,
        components: components?,
        variables: variables.clone(),
    })
}

/// Fetches one rendered payload per (project, variant) and per component variant.
pub async fn fetch_exports(
    api: &dyn ContentApi,
    ctx: &RequestContext,
    filters: &ResolvedFilters,
    format: &'static str,
    variables: &VariableIndex,
) -> Result<ExportContent, Error> {
    let (projects, variants) = futures::join!(
        expand::resolve_projects(api, ctx, filters.text_items.projects.as_deref()),
        expand::resolve_variants(api, ctx, filters.text_items.variants.as_deref()),
    );
    let (projects, variants) = (projects?, variants?);
    let rich_text = filters.rich_text_enabled();

    let mut calls: Vec<BoxFuture<'_, Result<ExportedPayload, Error>>> = Vec::new();

    for project in &projects {
        for variant in &variants {
            let filter = filters.text_items.for_project(project);
            let options = ExportOptions {
                variant_id: variant.id.clone(),
                format,
                rich_text,
            };
            let prefix = project.id.clone();
            calls.push(
                async move {
                    debug!(
                        filter = %filter.to_filter_key()?,
                        variant = %options.variant_id,
                        format,
                        "exporting text items"
                    );
                    let payload = api.export_text_items(ctx, &filter, &options).await?;
                    Ok(ExportedPayload {
                        prefix,
                        variant_id: options.variant_id,
                        payload,
                    })
                }
                .boxed(),
            );
        }
    }

    if filters.include_components {
        let filter = filters.components.without_variants();
        for variant in &variants {
            let filter = filter.clone();
            let options = ExportOptions {
                variant_id: variant.id.clone(),
                format,
                rich_text,
            };
            calls.push(
                async move {
                    debug!(
                        filter = %filter.to_filter_key()?,
                        variant = %options.variant_id,
                        format,
                        "exporting components"
                    );
                    let payload = api.export_components(ctx, &filter, &options).await?;
                    Ok(ExportedPayload {
                        prefix: COMPONENTS_PREFIX.to_string(),
                        variant_id: options.variant_id,
                        payload,
                    })
                }
                .boxed(),
            );
        }
    }

    let payloads = future::join_all(calls)
        .await
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ExportContent {
        payloads,
        variables: variables.clone(),
    })
}
