/// OCR text after canonicalization, one entry per input line.
/// Empty lines are kept so line indices match the raw frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    lines: Vec<String>,
}

impl NormalizedText {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn joined(&self) -> String {
        self.lines.join("\n")
    }

    pub fn is_blank(&self) -> bool {
        self.lines.iter().all(|line| line.trim().is_empty())
    }
}

pub struct TextNormalizer;

impl TextNormalizer {
    /// Uppercase, fold the letter O into zero and split into lines.
    /// Fill characters are left in place for the extractors to strip.
    pub fn normalize(raw: &str) -> NormalizedText {
        let folded = raw.to_uppercase().replace('O', "0");

        let lines = folded
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
            .collect();

        NormalizedText { lines }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_and_confusables() {
        let text = TextNormalizer::normalize("p<utodoe<<john");
        assert_eq!(text.lines(), ["P<UT0D0E<<J0HN"]);
    }

    #[test]
    fn test_empty_lines_preserved() {
        let text = TextNormalizer::normalize("first\n\nthird\r\n");
        assert_eq!(text.lines(), ["FIRST", "", "THIRD", ""]);
        assert_eq!(text.joined(), "FIRST\n\nTHIRD\n");
    }

    #[test]
    fn test_empty_input() {
        let text = TextNormalizer::normalize("");
        assert_eq!(text.lines(), [""]);
        assert!(text.is_blank());
    }
}
