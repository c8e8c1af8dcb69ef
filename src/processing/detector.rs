use log::debug;

use crate::models::DocumentFormat;
use crate::processing::NormalizedText;

pub const PASSPORT_MARKER: &str = "P<";
pub const ID_CARD_MARKERS: [&str; 2] = ["I<", "ID"];

const PASSPORT_CASCADE: &[DocumentFormat] = &[DocumentFormat::PassportTD3];
const ID_CARD_CASCADE: &[DocumentFormat] = &[DocumentFormat::IdCardTD1, DocumentFormat::IdCardTD2];

/// Which rule classified the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionReason {
    PassportMarker { line: usize },
    IdCardMarker { line: usize },
    /// No readable marker, but a TD1 or TD2 date line is present.
    DateLineShape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    pub formats: &'static [DocumentFormat],
    pub reason: DetectionReason,
}

pub struct DocumentTypeDetector;

impl DocumentTypeDetector {
    /// Pick the formats worth trying on this frame, in priority order.
    /// `None` means the frame has no MRZ in view.
    pub fn detect(text: &NormalizedText) -> Option<Detection> {
        let lines = text.lines();

        // Markers are authoritative, passport first across every line
        if let Some(line) = Self::find_marker(lines, &[PASSPORT_MARKER]) {
            debug!("Passport marker on line {}", line);
            return Some(Detection {
                formats: PASSPORT_CASCADE,
                reason: DetectionReason::PassportMarker { line },
            });
        }

        if let Some(line) = Self::find_marker(lines, &ID_CARD_MARKERS) {
            debug!("ID card marker on line {}", line);
            return Some(Detection {
                formats: ID_CARD_CASCADE,
                reason: DetectionReason::IdCardMarker { line },
            });
        }

        // Markers are often misread; fall back to the shape of a real date line
        if Self::has_id_card_date_line(&text.joined()) {
            debug!("No marker, ID card date line found by shape");
            return Some(Detection {
                formats: ID_CARD_CASCADE,
                reason: DetectionReason::DateLineShape,
            });
        }

        None
    }

    fn find_marker(lines: &[String], markers: &[&str]) -> Option<usize> {
        lines.iter().position(|line| {
            let line = line.trim_start();
            markers.iter().any(|marker| line.starts_with(marker))
        })
    }

    fn has_id_card_date_line(text: &str) -> bool {
        ID_CARD_CASCADE.iter().any(|format| {
            format
                .grammar()
                .line(2)
                .map_or(false, |date_line| date_line.is_match(text))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::TextNormalizer;

    fn detect(raw: &str) -> Option<Detection> {
        DocumentTypeDetector::detect(&TextNormalizer::normalize(raw))
    }

    #[test]
    fn test_passport_marker() {
        let detection = detect("REPUBLIC OF UTOPIA\nP<UTOERIKSSON<<ANNA<MARIA\nL898902C36UTO").unwrap();
        assert_eq!(detection.formats, &[DocumentFormat::PassportTD3]);
        assert_eq!(detection.reason, DetectionReason::PassportMarker { line: 1 });
    }

    #[test]
    fn test_passport_marker_wins_over_id_marker() {
        let detection = detect("I<UTOD231458907\nP<UTOERIKSSON").unwrap();
        assert_eq!(detection.formats, &[DocumentFormat::PassportTD3]);
    }

    #[test]
    fn test_id_card_markers() {
        let detection = detect("i<utod231458907<<<<<<<<<<<<<<<").unwrap();
        assert_eq!(
            detection.formats,
            &[DocumentFormat::IdCardTD1, DocumentFormat::IdCardTD2]
        );
        assert_eq!(detection.reason, DetectionReason::IdCardMarker { line: 0 });

        let detection = detect("noise\n  IDKAZ0123456789").unwrap();
        assert_eq!(detection.reason, DetectionReason::IdCardMarker { line: 1 });
    }

    #[test]
    fn test_date_line_shape_without_marker() {
        // Marker line misread as "1<UTO..."
        let raw = "1<UTOD231458907<<<<<<<<<<<<<<<\n7408122F1204159UTO<<<<<<<<<<<6\nERIKSSON<<ANNA<MARIA<<<<<<<<<<";
        let detection = detect(raw).unwrap();
        assert_eq!(detection.reason, DetectionReason::DateLineShape);
        assert_eq!(detection.formats[0], DocumentFormat::IdCardTD1);
    }

    #[test]
    fn test_no_candidate() {
        assert_eq!(detect(""), None);
        assert_eq!(detect("Boarding pass\nGate 12 Seat 14C\nPRIORITY"), None);
    }
}
