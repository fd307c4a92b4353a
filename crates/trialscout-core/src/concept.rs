use serde::{Deserialize, Serialize};

/// A single vocabulary coding (e.g. SNOMED CT) of a medical concept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

/// A coded medical concept: zero or more codings plus optional free text.
///
/// Mirrors the FHIR `CodeableConcept` shape. Both `coding` and `text` accept
/// `null` as well as being absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodedConcept {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coding: Option<Vec<Coding>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl CodedConcept {
    /// Iterates over the codings, treating an absent list as empty.
    pub fn codings(&self) -> impl Iterator<Item = &Coding> {
        self.coding.iter().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_nulls_as_absent() {
        let concept: CodedConcept = serde_json::from_value(serde_json::json!({
            "coding": null,
            "text": null
        }))
        .unwrap();
        assert_eq!(concept, CodedConcept::default());
        assert_eq!(concept.codings().count(), 0);
    }

    #[test]
    fn deserializes_partial_codings() {
        let concept: CodedConcept = serde_json::from_value(serde_json::json!({
            "coding": [
                { "system": "http://snomed.info/sct", "code": "29857009", "display": "Chest pain" },
                { "system": null, "code": null }
            ],
            "text": "Chest pain"
        }))
        .unwrap();
        let codings: Vec<_> = concept.codings().collect();
        assert_eq!(codings.len(), 2);
        assert_eq!(codings[0].display.as_deref(), Some("Chest pain"));
        assert_eq!(codings[1].display, None);
    }
}
