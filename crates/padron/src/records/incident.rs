//! Dated incident entries attached to an identity owner.

use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, RegistryResult};
use crate::util::time::is_date_literal;

pub const KIND_MAX: usize = 50;
pub const DESCRIPTION_MAX: usize = 200;

/// One incident entry. `sequence_id` is 1-based and kept dense within the
/// owner's list: deletions renumber the survivors. Serialized field names
/// match the pre-existing documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Incident {
    #[serde(rename = "id")]
    pub sequence_id: u32,
    #[serde(rename = "tipo")]
    pub kind: String,
    #[serde(rename = "fecha")]
    pub date: String,
    #[serde(rename = "descripcion")]
    pub description: String,
}

/// Caller-supplied fields for a new incident, before validation.
#[derive(Debug, Clone)]
pub struct IncidentDraft {
    pub kind: String,
    pub date: String,
    pub description: String,
}

impl IncidentDraft {
    /// Trim and bound-check every field. The description may be empty.
    pub fn validate(self) -> RegistryResult<IncidentDraft> {
        let kind = self.kind.trim().to_string();
        if kind.is_empty() || kind.chars().count() > KIND_MAX {
            return Err(RegistryError::Validation(format!(
                "incident kind must be 1 to {KIND_MAX} characters"
            )));
        }

        let date = self.date.trim().to_string();
        if !is_date_literal(&date) {
            return Err(RegistryError::Validation(
                "incident date must use DD/MM/YYYY".to_string(),
            ));
        }

        let description = self.description.trim().to_string();
        if description.chars().count() > DESCRIPTION_MAX {
            return Err(RegistryError::Validation(format!(
                "incident description must be at most {DESCRIPTION_MAX} characters"
            )));
        }

        Ok(IncidentDraft {
            kind,
            date,
            description,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_description_is_allowed() {
        let draft = IncidentDraft {
            kind: "Robo".to_string(),
            date: "05/05/2025".to_string(),
            description: "".to_string(),
        };
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn rejects_empty_kind_and_bad_date() {
        let draft = IncidentDraft {
            kind: "  ".to_string(),
            date: "05/05/2025".to_string(),
            description: String::new(),
        };
        assert!(draft.validate().is_err());

        let draft = IncidentDraft {
            kind: "Robo".to_string(),
            date: "5/5/25".to_string(),
            description: String::new(),
        };
        assert!(matches!(
            draft.validate(),
            Err(RegistryError::Validation(_))
        ));
    }

    #[test]
    fn rejects_oversized_description() {
        let draft = IncidentDraft {
            kind: "Robo".to_string(),
            date: "05/05/2025".to_string(),
            description: "x".repeat(DESCRIPTION_MAX + 1),
        };
        assert!(draft.validate().is_err());
    }
}
