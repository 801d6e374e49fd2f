use crate::chunks::collect_flight_chunks;
use crate::error::{ExtractError, Result};
use crate::refs::ReferenceTable;
use crate::resolve::{resolve_descriptors, scan_descriptors};
use crate::types::{Extraction, UnresolvedRef};

/// Decode a rendered preview page into its embedded source files.
///
/// Fatal failures are structural: no flight chunks in the markup, no file
/// descriptors in the decoded payload, or descriptors that all fail to
/// resolve. A descriptor that fails individually lands in
/// [`Extraction::unresolved`] without aborting the call.
pub fn extract_files(html: &str) -> Result<Extraction> {
    let decoded = collect_flight_chunks(html)?;

    let descriptors = scan_descriptors(&decoded);
    if descriptors.is_empty() {
        return Err(ExtractError::NoFileDescriptors);
    }
    log::debug!("Found {} file descriptors", descriptors.len());

    let refs = ReferenceTable::build(&decoded);
    let (files, unresolved) = resolve_descriptors(&descriptors, &refs);

    if files.is_empty() {
        return Err(ExtractError::NoResolvedFiles {
            unresolved: unresolved.iter().map(UnresolvedRef::describe).collect(),
        });
    }

    log::info!(
        "Resolved {} of {} file descriptors",
        files.len(),
        descriptors.len()
    );
    Ok(Extraction { files, unresolved })
}
