use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::validation::expiry::MrzDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentFormat {
    #[serde(rename = "TD3")]
    PassportTD3,
    #[serde(rename = "TD1")]
    IdCardTD1,
    #[serde(rename = "TD2")]
    IdCardTD2,
}

impl DocumentFormat {
    pub fn label(&self) -> &'static str {
        match self {
            DocumentFormat::PassportTD3 => "TD3",
            DocumentFormat::IdCardTD1 => "TD1",
            DocumentFormat::IdCardTD2 => "TD2",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Check characters printed next to the extracted fields.
/// `None` means the column was missing from the OCR line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckDigits {
    pub document_number: Option<char>,
    pub date_of_birth: Option<char>,
    pub date_of_expiry: Option<char>,
}

/// Fields pulled out of one frame by the cascade, not yet validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MrzCandidate {
    pub format: DocumentFormat,
    pub document_number: String,
    /// Document number columns as printed, fillers included. The check digit
    /// is computed over this, not over the cleaned number.
    pub printed_document_number: String,
    pub date_of_birth: String,
    pub date_of_expiry: String,
    pub check_digits: CheckDigits,
}

/// A candidate that passed field validation. This is the only value that ever
/// reaches a result listener, and it cannot be built outside the crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatedMrz {
    format: DocumentFormat,
    document_number: String,
    date_of_birth: String,
    date_of_expiry: String,
}

impl ValidatedMrz {
    pub(crate) fn from_candidate(candidate: MrzCandidate) -> Self {
        ValidatedMrz {
            format: candidate.format,
            document_number: candidate.document_number,
            date_of_birth: candidate.date_of_birth,
            date_of_expiry: candidate.date_of_expiry,
        }
    }

    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    pub fn document_number(&self) -> &str {
        &self.document_number
    }

    /// Date of birth as printed, `YYMMDD`.
    pub fn date_of_birth(&self) -> &str {
        &self.date_of_birth
    }

    /// Date of expiry as printed, `YYMMDD`.
    pub fn date_of_expiry(&self) -> &str {
        &self.date_of_expiry
    }

    /// Calendar date of birth, or `None` for a day the month doesn't have
    /// (the validator accepts day 31 in every month).
    pub fn birth_date(&self, today: NaiveDate) -> Option<NaiveDate> {
        MrzDate::parse(&self.date_of_birth).ok()?.to_naive_date(today)
    }

    pub fn expiry_date(&self, today: NaiveDate) -> Option<NaiveDate> {
        MrzDate::parse(&self.date_of_expiry).ok()?.to_naive_date(today)
    }

    /// `None` when the expiry date is not a real calendar day.
    pub fn is_expired(&self, today: NaiveDate) -> Option<bool> {
        self.expiry_date(today).map(|expiry| expiry < today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ValidatedMrz {
        ValidatedMrz::from_candidate(MrzCandidate {
            format: DocumentFormat::PassportTD3,
            document_number: "L898902C3".to_string(),
            printed_document_number: "L898902C3".to_string(),
            date_of_birth: "740812".to_string(),
            date_of_expiry: "120415".to_string(),
            check_digits: CheckDigits::default(),
        })
    }

    #[test]
    fn test_format_labels() {
        assert_eq!(DocumentFormat::PassportTD3.to_string(), "TD3");
        assert_eq!(DocumentFormat::IdCardTD1.to_string(), "TD1");
        assert_eq!(DocumentFormat::IdCardTD2.label(), "TD2");
    }

    #[test]
    fn test_calendar_dates() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let mrz = sample();
        assert_eq!(mrz.birth_date(today), NaiveDate::from_ymd_opt(1974, 8, 12));
        assert_eq!(mrz.expiry_date(today), NaiveDate::from_ymd_opt(2012, 4, 15));
        assert_eq!(mrz.is_expired(today), Some(true));
    }

    #[test]
    fn test_serializes_to_json() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["format"], "TD3");
        assert_eq!(json["document_number"], "L898902C3");
        assert_eq!(json["date_of_expiry"], "120415");
    }
}
