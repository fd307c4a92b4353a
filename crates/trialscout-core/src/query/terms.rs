use crate::concept::CodedConcept;

/// Derives search terms from a coded concept.
///
/// Coding display labels win over free text: if any coding carries a
/// non-empty `display`, every such display is returned in coding order
/// (duplicates kept) and `text` is ignored. Otherwise a non-empty `text`
/// becomes the single term. An absent concept yields no terms.
pub fn extract_terms(concept: Option<&CodedConcept>) -> Vec<String> {
    let Some(concept) = concept else {
        return Vec::new();
    };

    let displays: Vec<String> = concept
        .codings()
        .filter_map(|c| c.display.as_deref())
        .filter(|d| !d.is_empty())
        .map(str::to_owned)
        .collect();
    if !displays.is_empty() {
        return displays;
    }

    match concept.text.as_deref() {
        Some(text) if !text.is_empty() => vec![text.to_owned()],
        _ => Vec::new(),
    }
}
