pub mod cascade;
pub mod detector;
pub mod grammar;
pub mod normalizer;
pub mod recognizer;

pub use cascade::CascadeMatcher;
pub use detector::{Detection, DetectionReason, DocumentTypeDetector};
pub use grammar::{Field, FormatGrammar, LineGrammar, LineMatch};
pub use normalizer::{NormalizedText, TextNormalizer};
pub use recognizer::{Frame, FrameMetadata, PassthroughRecognizer, TextRecognizer};
