use log::{debug, warn};

use crate::models::{CheckDigits, DocumentFormat, MrzCandidate, ValidatedMrz, ValidationRules};
use crate::processing::{CascadeMatcher, DocumentTypeDetector, TextNormalizer};
use crate::utils::ScanError;
use crate::validation::{FieldValidator, Rejection};

/// What a single frame produced. Only `Accepted` carries an identity.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// No marker and no MRZ-shaped line: nothing to scan in this frame.
    NoFormat,
    /// A format was detected but none of its grammars matched.
    NoMatch,
    Rejected(DocumentFormat, Rejection),
    /// Extraction failed internally; treated like a non-match.
    Fault(String),
    Accepted(ValidatedMrz),
}

impl FrameOutcome {
    pub fn into_validated(self) -> Option<ValidatedMrz> {
        match self {
            FrameOutcome::Accepted(mrz) => Some(mrz),
            _ => None,
        }
    }
}

/// Stateless per-frame pipeline: normalize, detect, match, validate.
pub struct MrzScanner {
    validator: FieldValidator,
}

impl Default for MrzScanner {
    fn default() -> Self {
        MrzScanner::new(ValidationRules::default())
    }
}

impl MrzScanner {
    pub fn new(rules: ValidationRules) -> Self {
        MrzScanner {
            validator: FieldValidator::new(rules),
        }
    }

    pub fn process(&self, raw: &str) -> FrameOutcome {
        let text = TextNormalizer::normalize(raw);
        if text.is_blank() {
            return FrameOutcome::NoFormat;
        }

        let detection = match DocumentTypeDetector::detect(&text) {
            Some(detection) => detection,
            None => return FrameOutcome::NoFormat,
        };
        debug!("Detected {:?}, trying {:?}", detection.reason, detection.formats);

        let candidate = match CascadeMatcher::extract(&text, detection.formats) {
            Ok(Some(candidate)) => candidate,
            Ok(None) => return FrameOutcome::NoMatch,
            Err(e) => {
                warn!("MRZ extraction fault: {}", e);
                return FrameOutcome::Fault(e.to_string());
            }
        };

        let format = candidate.format;
        match self.validator.validate(candidate) {
            Ok(mrz) => FrameOutcome::Accepted(mrz),
            Err(rejection) => {
                debug!("{} candidate rejected: {}", format, rejection);
                FrameOutcome::Rejected(format, rejection)
            }
        }
    }

    /// Validate a typed `DOCUMENTNUMBER,YYMMDD,YYMMDD` entry. It is recorded as
    /// a passport but checked against the manual-entry minimum.
    pub fn manual_entry(&self, entry: &str) -> Result<ValidatedMrz, ScanError> {
        let parts: Vec<&str> = entry.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(ScanError::ManualEntry(format!(
                "expected DOCUMENTNUMBER,YYMMDD,YYMMDD, got {} field(s)",
                parts.len()
            )));
        }

        let document_number = parts[0].to_uppercase().replace('<', "").replace('O', "0");
        let candidate = MrzCandidate {
            format: DocumentFormat::PassportTD3,
            printed_document_number: document_number.clone(),
            document_number,
            date_of_birth: parts[1].to_string(),
            date_of_expiry: parts[2].to_string(),
            check_digits: CheckDigits::default(),
        };

        self.validator
            .validate_manual(candidate)
            .map_err(|rejection| ScanError::ManualEntry(rejection.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::DateDefect;

    const PASSPORT: &str = "P<NNNDOE<<JOHN<<<<<<<<<<<<<<<<<<<<<<<<<<<<\nAB1234567NNN9001015M3001017<<<<<<<<<<<<<<04";

    #[test]
    fn test_passport_frame_accepted() {
        let mrz = MrzScanner::default().process(PASSPORT).into_validated().unwrap();

        assert_eq!(mrz.format(), DocumentFormat::PassportTD3);
        assert_eq!(mrz.document_number(), "AB1234567");
        assert_eq!(mrz.date_of_birth(), "900101");
        assert_eq!(mrz.date_of_expiry(), "300101");
    }

    #[test]
    fn test_lowercase_ocr_with_confusables() {
        let raw = "noise line\np<utoeriksson<<anna<maria<<<<<<<<<<<<<<<<<<<\nl898902c36utO7408122f1204159ze184226b<<<<<10";
        let mrz = MrzScanner::default().process(raw).into_validated().unwrap();

        assert_eq!(mrz.document_number(), "L898902C3");
        assert_eq!(mrz.date_of_birth(), "740812");
        assert_eq!(mrz.date_of_expiry(), "120415");
    }

    #[test]
    fn test_short_passport_number_rejected() {
        let raw = "P<UTOERIKSSON<<ANNA<MARIA<<<<<<<<<<<<<<<<<<<\nAB12345<<6UTO7408122F1204159<<<<<<<<<<<<<<04";
        let outcome = MrzScanner::default().process(raw);

        assert!(matches!(
            outcome,
            FrameOutcome::Rejected(
                DocumentFormat::PassportTD3,
                Rejection::DocumentNumberTooShort { len: 7, min: 8, .. }
            )
        ));
    }

    #[test]
    fn test_impossible_month_rejected_in_every_format() {
        let frames = [
            "P<UTOERIKSSON<<ANNA<MARIA<<<<<<<<<<<<<<<<<<<\nL898902C36UTO9913012F1204159<<<<<<<<<<<<<<04",
            "I<UTOD231458907<<<<<<<<<<<<<<<\n9913012F1204159UTO<<<<<<<<<<<6\nERIKSSON<<ANNA<MARIA<<<<<<<<<<",
            "I<UTOERIKSSON<<ANNA<MARIA<<<<<<<<<<<\nD231458907UTO9913012F1204159<<<<<<<6",
        ];
        let expected = [
            DocumentFormat::PassportTD3,
            DocumentFormat::IdCardTD1,
            DocumentFormat::IdCardTD2,
        ];

        for (raw, format) in frames.iter().zip(expected) {
            match MrzScanner::default().process(raw) {
                FrameOutcome::Rejected(found, Rejection::MalformedDate { defect, .. }) => {
                    assert_eq!(found, format);
                    assert_eq!(defect, DateDefect::Month(13));
                }
                other => panic!("unexpected outcome for {}: {:?}", format, other),
            }
        }
    }

    #[test]
    fn test_id_card_without_marker() {
        let raw = "1<UTOD231458907<<<<<<<<<<<<<<<\n7408122F1204159UTO<<<<<<<<<<<6\nERIKSSON<<ANNA<MARIA<<<<<<<<<<";
        // The structural fallback picks the ID cascade, but TD1 needs its `I` line 1
        assert_eq!(MrzScanner::default().process(raw), FrameOutcome::NoMatch);

        let raw = "UT0 IDENTITY CARD\nD231458907UTO7408122F1204159<<<<<<<6";
        let mrz = MrzScanner::default().process(raw).into_validated().unwrap();
        assert_eq!(mrz.format(), DocumentFormat::IdCardTD2);
        assert_eq!(mrz.document_number(), "D23145890");
    }

    #[test]
    fn test_frames_without_mrz() {
        let scanner = MrzScanner::default();
        assert_eq!(scanner.process(""), FrameOutcome::NoFormat);
        assert_eq!(scanner.process("   \n  "), FrameOutcome::NoFormat);
        assert_eq!(scanner.process("Boarding pass\nGate 12"), FrameOutcome::NoFormat);
        assert_eq!(scanner.process("P<UTOERIKSSON<<ANNA"), FrameOutcome::NoMatch);
    }

    #[test]
    fn test_strict_check_digits() {
        let scanner = MrzScanner::new(ValidationRules {
            verify_check_digits: true,
            ..ValidationRules::default()
        });

        let good = "P<UTOERIKSSON<<ANNA<MARIA<<<<<<<<<<<<<<<<<<<\nL898902C36UTO7408122F1204159ZE184226B<<<<<10";
        assert!(scanner.process(good).into_validated().is_some());

        // Birth date check digit misread as 5
        assert!(matches!(
            scanner.process(PASSPORT),
            FrameOutcome::Rejected(_, Rejection::CheckDigitMismatch { .. })
        ));
    }

    #[test]
    fn test_manual_entry() {
        let scanner = MrzScanner::default();

        let mrz = scanner.manual_entry(" ab1234567 , 900101, 300101 ").unwrap();
        assert_eq!(mrz.format(), DocumentFormat::PassportTD3);
        assert_eq!(mrz.document_number(), "AB1234567");
        assert_eq!(mrz.date_of_expiry(), "300101");

        // Typed numbers only need five characters
        let mrz = scanner.manual_entry("ab123,900101,300101").unwrap();
        assert_eq!(mrz.document_number(), "AB123");
        assert!(matches!(
            scanner.manual_entry("AB12,900101,300101"),
            Err(ScanError::ManualEntry(_))
        ));

        assert!(matches!(
            scanner.manual_entry("AB1234567,900101"),
            Err(ScanError::ManualEntry(_))
        ));
        assert!(matches!(
            scanner.manual_entry("AB1234567,901301,300101"),
            Err(ScanError::ManualEntry(_))
        ));
    }
}
