//! The per-user identity record and its creation-time validation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, RegistryResult};
use crate::util::time::{is_date_literal, validity_window};

pub const GIVEN_NAME_MAX: usize = 30;
pub const SURNAMES_MAX: usize = 60;
pub const NATIONALITY_LEN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    H,
    M,
}

impl std::fmt::Display for Sex {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sex::H => write!(formatter, "H"),
            Sex::M => write!(formatter, "M"),
        }
    }
}

/// One identity record. The owner's user id is the key it is stored under,
/// not a field. Serialized field names match the pre-existing documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(rename = "nombre")]
    pub given_name: String,
    #[serde(rename = "apellidos")]
    pub surnames: String,
    #[serde(rename = "dni")]
    pub national_id: String,
    #[serde(rename = "nacimiento")]
    pub birth_date: String,
    #[serde(rename = "sexo")]
    pub sex: Sex,
    #[serde(rename = "nacionalidad")]
    pub nationality: String,
    #[serde(rename = "expedicion")]
    pub issued_on: String,
    #[serde(rename = "caducidad")]
    pub expires_on: String,
}

/// Caller-supplied fields for a new identity, before validation.
#[derive(Debug, Clone)]
pub struct IdentityDraft {
    pub given_name: String,
    pub surnames: String,
    pub national_id: String,
    pub birth_date: String,
    pub sex: String,
    pub nationality: String,
}

impl IdentityDraft {
    /// Validate every field and compute the validity window from `issued`.
    /// Nothing is mutated on failure; the error names the violated rule.
    pub fn validate(self, issued: NaiveDate) -> RegistryResult<Identity> {
        let given_name = self.given_name.trim().to_string();
        if given_name.is_empty() || given_name.chars().count() > GIVEN_NAME_MAX {
            return Err(RegistryError::Validation(format!(
                "name must be 1 to {GIVEN_NAME_MAX} characters"
            )));
        }

        let surnames = self.surnames.trim().to_string();
        if surnames.is_empty() || surnames.chars().count() > SURNAMES_MAX {
            return Err(RegistryError::Validation(format!(
                "surnames must be 1 to {SURNAMES_MAX} characters"
            )));
        }

        let national_id = self.national_id.trim().to_ascii_uppercase();
        if !is_national_id(&national_id) {
            return Err(RegistryError::Validation(
                "national id must be 9 digits followed by one letter".to_string(),
            ));
        }

        let birth_date = self.birth_date.trim().to_string();
        if !is_date_literal(&birth_date) {
            return Err(RegistryError::Validation(
                "birth date must use DD/MM/YYYY".to_string(),
            ));
        }

        let sex = match self.sex.trim().to_ascii_uppercase().as_str() {
            "H" => Sex::H,
            "M" => Sex::M,
            _ => {
                return Err(RegistryError::Validation(
                    "sex must be H or M".to_string(),
                ))
            }
        };

        let nationality = self.nationality.trim().to_ascii_uppercase();
        if nationality.len() != NATIONALITY_LEN
            || !nationality.bytes().all(|byte| byte.is_ascii_uppercase())
        {
            return Err(RegistryError::Validation(
                "nationality must be 3 letters".to_string(),
            ));
        }

        let (issued_on, expires_on) = validity_window(issued);
        Ok(Identity {
            given_name,
            surnames,
            national_id,
            birth_date,
            sex,
            nationality,
            issued_on,
            expires_on,
        })
    }
}

fn is_national_id(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() == 10
        && bytes[..9].iter().all(|byte| byte.is_ascii_digit())
        && bytes[9].is_ascii_uppercase()
}
