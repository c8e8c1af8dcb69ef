use crate::models::DocumentFormat;

/// Acceptance rules applied by the field validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationRules {
    pub passport_min_document_number: usize,
    pub id_card_min_document_number: usize,
    /// Minimum for typed `DOC,YYMMDD,YYMMDD` entries, which may come from
    /// either document type.
    pub manual_entry_min_document_number: usize,
    /// ICAO 9303 check-digit verification. Off by default: turning it on
    /// rejects frames that the date and length checks alone would accept.
    pub verify_check_digits: bool,
}

impl Default for ValidationRules {
    fn default() -> Self {
        ValidationRules {
            passport_min_document_number: 8,
            id_card_min_document_number: 1,
            manual_entry_min_document_number: 5,
            verify_check_digits: false,
        }
    }
}

impl ValidationRules {
    pub fn min_document_number_len(&self, format: DocumentFormat) -> usize {
        // An empty number never passes, whatever the configured minimum
        let min = match format {
            DocumentFormat::PassportTD3 => self.passport_min_document_number,
            DocumentFormat::IdCardTD1 | DocumentFormat::IdCardTD2 => {
                self.id_card_min_document_number
            }
        };
        min.max(1)
    }

    pub fn manual_entry_min_len(&self) -> usize {
        self.manual_entry_min_document_number.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimums_per_format() {
        let rules = ValidationRules::default();
        assert_eq!(rules.min_document_number_len(DocumentFormat::PassportTD3), 8);
        assert_eq!(rules.min_document_number_len(DocumentFormat::IdCardTD1), 1);
        assert_eq!(rules.min_document_number_len(DocumentFormat::IdCardTD2), 1);
        assert_eq!(rules.manual_entry_min_len(), 5);

        let zero = ValidationRules {
            id_card_min_document_number: 0,
            ..ValidationRules::default()
        };
        assert_eq!(zero.min_document_number_len(DocumentFormat::IdCardTD2), 1);
    }
}
