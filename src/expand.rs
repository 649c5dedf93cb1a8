//! Expansion of variant and project lists for export formats.
//!
//! Export endpoints render one project and one variant per call, so `all` has to
//! be turned into concrete ids on the client side.

use crate::{
    client::{ContentApi, RequestContext},
    error::Error,
    types::{IdRef, Project, Variant},
};

/// Expands a configured variant list against the variant catalog.
///
/// - a list containing `all` becomes the catalog followed by `base`
/// - an empty or missing list becomes `[base]`
/// - anything else is returned as is
///
/// ```rust
/// use textsync::{expand::expand_variants, types::{IdRef, Variant}};
/// let catalog = vec![Variant { id: "fr".into(), name: None }];
/// let expanded = expand_variants(Some(&[IdRef::new("all")]), &catalog);
/// assert_eq!(expanded, vec![IdRef::new("fr"), IdRef::base()]);
/// assert_eq!(expand_variants(None, &catalog), vec![IdRef::base()]);
/// ```
pub fn expand_variants(configured: Option<&[IdRef]>, catalog: &[Variant]) -> Vec<IdRef> {
    match configured {
        None | Some([]) => vec![IdRef::base()],
        Some(list) if list.iter().any(IdRef::is_all) => catalog
            .iter()
            .map(|variant| IdRef::new(variant.id.clone()))
            .chain(std::iter::once(IdRef::base()))
            .collect(),
        Some(list) => list.to_vec(),
    }
}

/// Expands a configured project list against the project catalog.
///
/// A list containing `all` becomes the catalog; a missing list yields no projects.
pub fn expand_projects(configured: Option<&[IdRef]>, catalog: &[Project]) -> Vec<IdRef> {
    match configured {
        Some(list) if list.iter().any(IdRef::is_all) => catalog
            .iter()
            .map(|project| IdRef::new(project.id.clone()))
            .collect(),
        Some(list) => list.to_vec(),
        None => Vec::new(),
    }
}

/// Whether expanding `configured` needs the remote catalog.
pub fn needs_catalog(configured: Option<&[IdRef]>) -> bool {
    configured.is_some_and(|list| list.iter().any(IdRef::is_all))
}

/// Resolves the variants an export output iterates over, fetching the catalog only when needed.
pub async fn resolve_variants(
    api: &dyn ContentApi,
    ctx: &RequestContext,
    configured: Option<&[IdRef]>,
) -> Result<Vec<IdRef>, Error> {
    let catalog = if needs_catalog(configured) {
        api.fetch_variants(ctx).await?
    } else {
        Vec::new()
    };
    Ok(expand_variants(configured, &catalog))
}

/// Resolves the projects an export output iterates over, fetching the catalog only when needed.
pub async fn resolve_projects(
    api: &dyn ContentApi,
    ctx: &RequestContext,
    configured: Option<&[IdRef]>,
) -> Result<Vec<IdRef>, Error> {
    let catalog = if needs_catalog(configured) {
        api.fetch_projects(ctx).await?
    } else {
        Vec::new()
    };
    Ok(expand_projects(configured, &catalog))
}
