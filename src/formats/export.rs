//! Output for formats the server renders itself.
//!
//! Each exported payload becomes one file; the client never touches the text.

use serde_json::Map;

use crate::{
    error::Error,
    fetch::ExportContent,
    formats::{FormatStrategy, OutputSet, json::collect_variables, variables_file},
    types::{FileContent, OutputFile},
};

/// Turns exported payloads into files, one per `{prefix}___{variant}`.
pub fn transform(
    content: ExportContent,
    strategy: &dyn FormatStrategy,
) -> Result<Vec<OutputFile>, Error> {
    let mut set = OutputSet::new(strategy);

    for exported in content.payloads {
        let mut payload = Some(exported.payload);
        set.get_or_create(&exported.prefix, &exported.variant_id, || {
            payload.take().map(FileContent::from).unwrap_or(FileContent::Text(String::new()))
        });
        if payload.is_some() {
            tracing::warn!(
                prefix = %exported.prefix,
                variant = %exported.variant_id,
                "duplicate export payload ignored"
            );
        }
    }

    let ids: Vec<String> = content.variables.keys().cloned().collect();
    let mut variables = Map::new();
    collect_variables(&ids, &content.variables, &mut variables)?;
    set.insert_shared(variables_file(strategy.out_dir(), variables));

    Ok(set.into_files())
}
