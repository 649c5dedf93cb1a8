//! Swift driver: a complete Swift source file generated by the API.

use std::path::Path;

use tracing::debug;

use crate::{
    client::{ContentApi, RequestContext, SwiftDriverRequest},
    error::Error,
    filter::ResolvedFilters,
    types::{FileContent, OutputFile},
};

/// Name of the generated Swift file, without extension.
pub const SWIFT_DRIVER_FILENAME: &str = "Strings";

/// Builds the request body from the resolved filters.
pub fn driver_request(filters: &ResolvedFilters) -> SwiftDriverRequest {
    SwiftDriverRequest {
        projects: filters.text_items.clone(),
        components: filters
            .include_components
            .then(|| filters.components.clone()),
    }
}

/// Requests the Swift driver and wraps it in an [`OutputFile`].
pub async fn generate(
    api: &dyn ContentApi,
    ctx: &RequestContext,
    filters: &ResolvedFilters,
    out_dir: &Path,
) -> Result<Vec<OutputFile>, Error> {
    let request = driver_request(filters);
    debug!(out_dir = %out_dir.display(), "requesting Swift driver");
    let source = api.generate_swift_driver(ctx, &request).await?;
    Ok(vec![OutputFile::new(
        SWIFT_DRIVER_FILENAME,
        out_dir,
        "swift",
        FileContent::Text(source),
        None,
    )])
}
