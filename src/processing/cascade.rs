use log::debug;

use crate::models::{CheckDigits, DocumentFormat, MrzCandidate};
use crate::processing::grammar::{Field, FormatGrammar, LineMatch};
use crate::processing::NormalizedText;
use crate::utils::ScanError;

/// CascadeMatcher tries each candidate format in priority order and extracts
/// the first one whose required lines all match.
pub struct CascadeMatcher;

impl CascadeMatcher {
    /// Returns the candidate of the first format that matches structurally.
    /// The cascade stops there even if that candidate later fails validation:
    /// retrying a lower-priority format on the same frame can produce a
    /// plausible but wrong identity.
    pub fn extract(
        text: &NormalizedText,
        formats: &[DocumentFormat],
    ) -> Result<Option<MrzCandidate>, ScanError> {
        for format in formats {
            let matches = match Self::match_grammar(text, format.grammar()) {
                Some(matches) => matches,
                None => {
                    debug!("{} grammar did not match", format);
                    continue;
                }
            };

            let candidate = Self::build_candidate(*format, &matches)?;
            debug!(
                "{} candidate - Doc: '{}', DOB: '{}', Exp: '{}'",
                format,
                candidate.document_number,
                candidate.date_of_birth,
                candidate.date_of_expiry
            );
            return Ok(Some(candidate));
        }

        Ok(None)
    }

    /// Each required line must match on its own OCR line, in MRZ order.
    fn match_grammar(text: &NormalizedText, grammar: &FormatGrammar) -> Option<Vec<LineMatch>> {
        let mut next_line = 0;
        let mut matches = Vec::with_capacity(grammar.lines().len());

        for line_grammar in grammar.lines() {
            let found = text
                .lines()
                .iter()
                .enumerate()
                .skip(next_line)
                .find_map(|(index, line)| line_grammar.find(index, line))?;

            next_line = found.line_index + 1;
            matches.push(found);
        }

        Some(matches)
    }

    fn build_candidate(
        format: DocumentFormat,
        matches: &[LineMatch],
    ) -> Result<MrzCandidate, ScanError> {
        // TD1 carries the number on line 1 and the dates on line 2,
        // the other layouts carry everything on their data line
        let (number_line, date_line) = match format {
            DocumentFormat::IdCardTD1 => (
                Self::line(format, matches, 0)?,
                Self::line(format, matches, 1)?,
            ),
            DocumentFormat::PassportTD3 | DocumentFormat::IdCardTD2 => {
                let line = Self::line(format, matches, 0)?;
                (line, line)
            }
        };

        let (raw_number, number_check) = match format {
            DocumentFormat::IdCardTD1 => Self::td1_document_number(number_line)?,
            DocumentFormat::PassportTD3 | DocumentFormat::IdCardTD2 => (
                Self::required(format, number_line, Field::DocumentNumber)?.to_string(),
                Self::check_char(number_line, Field::DocumentNumberCheck),
            ),
        };

        Ok(MrzCandidate {
            format,
            document_number: Self::clean_document_number(&raw_number),
            printed_document_number: raw_number,
            date_of_birth: Self::required(format, date_line, Field::DateOfBirth)?
                .trim()
                .to_string(),
            date_of_expiry: Self::required(format, date_line, Field::DateOfExpiry)?
                .trim()
                .to_string(),
            check_digits: CheckDigits {
                document_number: number_check,
                date_of_birth: Self::check_char(date_line, Field::DateOfBirthCheck),
                date_of_expiry: Self::check_char(date_line, Field::DateOfExpiryCheck),
            },
        })
    }

    /// TD1 line 1 holds the number in columns 5-14. Numbers longer than nine
    /// characters put `<` in the check column and continue into the optional
    /// data, where the last character before the next filler is the check digit.
    fn td1_document_number(line: &LineMatch) -> Result<(String, Option<char>), ScanError> {
        let format = DocumentFormat::IdCardTD1;
        let number = Self::required(format, line, Field::DocumentNumber)?;
        let check = Self::required(format, line, Field::DocumentNumberCheck)?;

        if check != "<" {
            return Ok((number.to_string(), check.chars().next()));
        }

        let optional = line.get(Field::OptionalData).unwrap_or("");
        let continuation = optional.split('<').next().unwrap_or("");
        if continuation.len() < 2 {
            return Ok((number.to_string(), None));
        }

        let (rest, long_check) = continuation.split_at(continuation.len() - 1);
        Ok((format!("{}{}", number, rest), long_check.chars().next()))
    }

    fn line<'a>(
        format: DocumentFormat,
        matches: &'a [LineMatch],
        index: usize,
    ) -> Result<&'a LineMatch, ScanError> {
        matches.get(index).ok_or_else(|| {
            ScanError::Extraction(format!("{} match is missing line {}", format, index + 1))
        })
    }

    fn required<'a>(
        format: DocumentFormat,
        line: &'a LineMatch,
        field: Field,
    ) -> Result<&'a str, ScanError> {
        line.get(field).ok_or_else(|| {
            ScanError::Extraction(format!(
                "{} line {} has no {} column",
                format,
                line.line_index,
                field.group_name()
            ))
        })
    }

    fn check_char(line: &LineMatch, field: Field) -> Option<char> {
        line.get(field).and_then(|value| value.chars().next())
    }

    /// Document numbers are read in a numeric context: fillers go, O becomes 0.
    fn clean_document_number(number: &str) -> String {
        number.replace('<', "").replace('O', "0").trim().to_string()
    }
}
