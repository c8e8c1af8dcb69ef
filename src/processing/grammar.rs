// Fixed-column MRZ grammars for the three ICAO 9303 layouts.
//
// Each line is an ordered list of fixed-width fields with a character class.
// The field list is compiled into one regex per line with a named group per
// field, so a misread character only breaks the match when it breaks the class
// of its column.
use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::models::DocumentFormat;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    Literal(char),
    Digit,
    LetterOrFill,
    DigitOrFill,
    AlphaNumOrFill,
    Sex,
}

impl CharClass {
    fn pattern(&self) -> String {
        match self {
            CharClass::Literal(c) => regex::escape(&c.to_string()),
            CharClass::Digit => "[0-9]".to_string(),
            // The normalizer has already turned every O into 0
            CharClass::LetterOrFill => "[A-Z0<]".to_string(),
            CharClass::DigitOrFill => "[0-9<]".to_string(),
            CharClass::AlphaNumOrFill => "[A-Z0-9<]".to_string(),
            CharClass::Sex => "[MFX<]".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    DocumentCode,
    DocumentSubtype,
    IssuingState,
    DocumentNumber,
    DocumentNumberCheck,
    Nationality,
    DateOfBirth,
    DateOfBirthCheck,
    Sex,
    DateOfExpiry,
    DateOfExpiryCheck,
    OptionalData,
    OptionalDataCheck,
    CompositeCheck,
    Name,
}

impl Field {
    pub fn group_name(&self) -> &'static str {
        match self {
            Field::DocumentCode => "document_code",
            Field::DocumentSubtype => "document_subtype",
            Field::IssuingState => "issuing_state",
            Field::DocumentNumber => "document_number",
            Field::DocumentNumberCheck => "document_number_check",
            Field::Nationality => "nationality",
            Field::DateOfBirth => "date_of_birth",
            Field::DateOfBirthCheck => "date_of_birth_check",
            Field::Sex => "sex",
            Field::DateOfExpiry => "date_of_expiry",
            Field::DateOfExpiryCheck => "date_of_expiry_check",
            Field::OptionalData => "optional_data",
            Field::OptionalDataCheck => "optional_data_check",
            Field::CompositeCheck => "composite_check",
            Field::Name => "name",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub field: Field,
    pub width: usize,
    pub class: CharClass,
    /// The column may be missing entirely from the OCR line.
    pub droppable: bool,
}

const fn col(field: Field, width: usize, class: CharClass) -> FieldSpec {
    FieldSpec { field, width, class, droppable: false }
}

const fn droppable(field: Field, width: usize, class: CharClass) -> FieldSpec {
    FieldSpec { field, width, class, droppable: true }
}

const TD3_LINE_2: &[FieldSpec] = &[
    col(Field::DocumentNumber, 9, CharClass::AlphaNumOrFill),
    droppable(Field::DocumentNumberCheck, 1, CharClass::DigitOrFill),
    col(Field::Nationality, 3, CharClass::LetterOrFill),
    col(Field::DateOfBirth, 6, CharClass::Digit),
    col(Field::DateOfBirthCheck, 1, CharClass::Digit),
    col(Field::Sex, 1, CharClass::Sex),
    col(Field::DateOfExpiry, 6, CharClass::Digit),
    col(Field::DateOfExpiryCheck, 1, CharClass::Digit),
    col(Field::OptionalData, 14, CharClass::AlphaNumOrFill),
    col(Field::OptionalDataCheck, 1, CharClass::DigitOrFill),
    col(Field::CompositeCheck, 1, CharClass::Digit),
];

const TD1_LINE_1: &[FieldSpec] = &[
    col(Field::DocumentCode, 1, CharClass::Literal('I')),
    col(Field::DocumentSubtype, 1, CharClass::AlphaNumOrFill),
    col(Field::IssuingState, 3, CharClass::LetterOrFill),
    col(Field::DocumentNumber, 9, CharClass::AlphaNumOrFill),
    col(Field::DocumentNumberCheck, 1, CharClass::DigitOrFill),
    col(Field::OptionalData, 15, CharClass::AlphaNumOrFill),
];

const TD1_LINE_2: &[FieldSpec] = &[
    col(Field::DateOfBirth, 6, CharClass::Digit),
    col(Field::DateOfBirthCheck, 1, CharClass::Digit),
    col(Field::Sex, 1, CharClass::Sex),
    col(Field::DateOfExpiry, 6, CharClass::Digit),
    col(Field::DateOfExpiryCheck, 1, CharClass::Digit),
    col(Field::Nationality, 3, CharClass::LetterOrFill),
    col(Field::OptionalData, 11, CharClass::AlphaNumOrFill),
    col(Field::CompositeCheck, 1, CharClass::Digit),
];

const TD1_LINE_3: &[FieldSpec] = &[col(Field::Name, 30, CharClass::LetterOrFill)];

const TD2_LINE_2: &[FieldSpec] = &[
    col(Field::DocumentNumber, 9, CharClass::AlphaNumOrFill),
    droppable(Field::DocumentNumberCheck, 1, CharClass::DigitOrFill),
    col(Field::Nationality, 3, CharClass::LetterOrFill),
    col(Field::DateOfBirth, 6, CharClass::Digit),
    col(Field::DateOfBirthCheck, 1, CharClass::Digit),
    col(Field::Sex, 1, CharClass::Sex),
    col(Field::DateOfExpiry, 6, CharClass::Digit),
    col(Field::DateOfExpiryCheck, 1, CharClass::Digit),
    col(Field::OptionalData, 7, CharClass::AlphaNumOrFill),
    col(Field::CompositeCheck, 1, CharClass::Digit),
];

lazy_static! {
    static ref TD3_GRAMMAR: FormatGrammar =
        FormatGrammar::compile(&[(2, TD3_LINE_2)]);
    static ref TD1_GRAMMAR: FormatGrammar =
        FormatGrammar::compile(&[(1, TD1_LINE_1), (2, TD1_LINE_2), (3, TD1_LINE_3)]);
    static ref TD2_GRAMMAR: FormatGrammar =
        FormatGrammar::compile(&[(2, TD2_LINE_2)]);
}

impl DocumentFormat {
    /// The lines that must match for this format to count as found.
    /// TD3 and TD2 name lines carry nothing the scanner extracts, so only
    /// their data line is required.
    pub fn grammar(&self) -> &'static FormatGrammar {
        match self {
            DocumentFormat::PassportTD3 => &TD3_GRAMMAR,
            DocumentFormat::IdCardTD1 => &TD1_GRAMMAR,
            DocumentFormat::IdCardTD2 => &TD2_GRAMMAR,
        }
    }
}

#[derive(Debug)]
pub struct FormatGrammar {
    lines: Vec<LineGrammar>,
}

impl FormatGrammar {
    fn compile(lines: &[(usize, &'static [FieldSpec])]) -> Self {
        FormatGrammar {
            lines: lines
                .iter()
                .map(|(line_no, fields)| LineGrammar::compile(*line_no, fields))
                .collect(),
        }
    }

    pub fn lines(&self) -> &[LineGrammar] {
        &self.lines
    }

    /// Grammar for the given 1-based MRZ line, if that line is required.
    pub fn line(&self, line_no: usize) -> Option<&LineGrammar> {
        self.lines.iter().find(|line| line.line_no == line_no)
    }
}

#[derive(Debug)]
pub struct LineGrammar {
    line_no: usize,
    fields: &'static [FieldSpec],
    regex: Regex,
}

impl LineGrammar {
    fn compile(line_no: usize, fields: &'static [FieldSpec]) -> Self {
        let regex = Regex::new(&Self::pattern(fields)).expect("MRZ grammar pattern");
        LineGrammar { line_no, fields, regex }
    }

    fn pattern(fields: &[FieldSpec]) -> String {
        fields
            .iter()
            .map(|spec| {
                let group = format!(
                    "(?P<{}>{}{{{}}})",
                    spec.field.group_name(),
                    spec.class.pattern(),
                    spec.width
                );
                if spec.droppable {
                    format!("{}?", group)
                } else {
                    group
                }
            })
            .collect()
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.captures_in(text).is_some()
    }

    /// Search one OCR line for this grammar. The match may start anywhere on
    /// the line so leading noise is skipped.
    pub fn find(&self, line_index: usize, line: &str) -> Option<LineMatch> {
        let caps = self.captures_in(line)?;
        let start = caps.get(0).map(|m| m.start()).unwrap_or(0);
        let values = self
            .fields
            .iter()
            .filter_map(|spec| {
                caps.name(spec.field.group_name())
                    .map(|m| (spec.field, m.as_str().to_string()))
            })
            .collect();

        Some(LineMatch { line_index, start, values })
    }

    fn captures_in<'t>(&self, text: &'t str) -> Option<Captures<'t>> {
        self.regex
            .captures_iter(text)
            .find(|caps| match caps.name(Field::Name.group_name()) {
                Some(name) => is_name_field(name.as_str()),
                None => true,
            })
    }
}

/// Primary and secondary identifiers separated by `<<`, starting with a letter.
fn is_name_field(value: &str) -> bool {
    let starts_with_letter = value
        .chars()
        .next()
        .map_or(false, |c| c.is_ascii_uppercase() || c == '0');
    starts_with_letter && value.contains("<<")
}

/// Field values captured from one OCR line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMatch {
    pub line_index: usize,
    /// Column in the OCR line where the MRZ line begins.
    pub start: usize,
    values: Vec<(Field, String)>,
}

impl LineMatch {
    /// `None` when the field is not part of this line or its column was dropped.
    pub fn get(&self, field: Field) -> Option<&str> {
        self.values
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, value)| value.as_str())
    }
}
