use log::debug;
use thiserror::Error;

use crate::models::{DocumentFormat, MrzCandidate, ValidatedMrz, ValidationRules};
use crate::validation::expiry::{DateDefect, MrzDate};
use crate::validation::mrz::MrzValidator;

/// Why a structurally matched candidate was not accepted. A rejection is an
/// ordinary outcome for a noisy frame, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("document number is empty")]
    EmptyDocumentNumber,

    #[error("{format} document number has {len} characters, at least {min} required")]
    DocumentNumberTooShort {
        format: DocumentFormat,
        len: usize,
        min: usize,
    },

    #[error("{field} '{value}' is not a date: {defect}")]
    MalformedDate {
        field: &'static str,
        value: String,
        defect: DateDefect,
    },

    #[error("{field} check digit '{found}' does not match computed {expected}")]
    CheckDigitMismatch {
        field: &'static str,
        found: char,
        expected: u32,
    },
}

pub struct FieldValidator {
    rules: ValidationRules,
}

impl FieldValidator {
    pub fn new(rules: ValidationRules) -> Self {
        FieldValidator { rules }
    }

    pub fn validate(&self, candidate: MrzCandidate) -> Result<ValidatedMrz, Rejection> {
        let min = self.rules.min_document_number_len(candidate.format);
        self.validate_with_minimum(candidate, min)
    }

    /// Typed entries use the manual-entry minimum instead of the format's.
    pub fn validate_manual(&self, candidate: MrzCandidate) -> Result<ValidatedMrz, Rejection> {
        self.validate_with_minimum(candidate, self.rules.manual_entry_min_len())
    }

    fn validate_with_minimum(
        &self,
        candidate: MrzCandidate,
        min: usize,
    ) -> Result<ValidatedMrz, Rejection> {
        let number_len = candidate.document_number.chars().count();
        if number_len == 0 {
            return Err(Rejection::EmptyDocumentNumber);
        }

        if number_len < min {
            return Err(Rejection::DocumentNumberTooShort {
                format: candidate.format,
                len: number_len,
                min,
            });
        }

        Self::check_date("date of birth", &candidate.date_of_birth)?;
        Self::check_date("date of expiry", &candidate.date_of_expiry)?;

        if self.rules.verify_check_digits {
            let checks = &candidate.check_digits;
            Self::check_digit(
                "document number",
                &candidate.printed_document_number,
                checks.document_number,
            )?;
            Self::check_digit("date of birth", &candidate.date_of_birth, checks.date_of_birth)?;
            Self::check_digit("date of expiry", &candidate.date_of_expiry, checks.date_of_expiry)?;
        }

        debug!("{} candidate accepted", candidate.format);
        Ok(ValidatedMrz::from_candidate(candidate))
    }

    fn check_date(field: &'static str, value: &str) -> Result<(), Rejection> {
        MrzDate::parse(value)
            .map(|_| ())
            .map_err(|defect| Rejection::MalformedDate {
                field,
                value: value.to_string(),
                defect,
            })
    }

    fn check_digit(field: &'static str, data: &str, check: Option<char>) -> Result<(), Rejection> {
        match (MrzValidator::verify(data, check), check) {
            (Some(false), Some(found)) => Err(Rejection::CheckDigitMismatch {
                field,
                found,
                expected: MrzValidator::check_digit(data),
            }),
            _ => Ok(()),
        }
    }
}
