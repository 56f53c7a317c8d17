//! Splices a merged representations array into the template document.

use serde_json::value::RawValue;

use super::extract::extract_representations;
use super::types::AssemblyError;

/// Writes `template` to `output` with its representations array replaced by
/// `[e0,e1,...]` built from `elements`.
///
/// Everything outside the array is copied byte for byte. Nothing is written
/// when the template has no representations path.
pub fn assemble(
    output: &mut Vec<u8>,
    template: &[u8],
    elements: &[&RawValue],
) -> Result<(), AssemblyError> {
    let span = extract_representations(template)
        .map_err(AssemblyError::PathNotFound)?
        .span();

    let array_len = elements.iter().map(|e| e.get().len()).sum::<usize>()
        + elements.len().saturating_sub(1)
        + 2;
    output.reserve(template.len() - span.len() + array_len);

    output.extend_from_slice(&template[..span.start]);
    output.push(b'[');
    for (index, element) in elements.iter().enumerate() {
        if index > 0 {
            output.push(b',');
        }
        output.extend_from_slice(element.get().as_bytes());
    }
    output.push(b']');
    output.extend_from_slice(&template[span.end..]);

    Ok(())
}
