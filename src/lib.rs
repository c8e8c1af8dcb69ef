pub mod models;
pub mod processing;
pub mod scanner;
pub mod session;
pub mod utils;
pub mod validation;

pub use models::{DocumentFormat, ScannerConfig, ValidatedMrz};
pub use processing::{Frame, FrameMetadata, PassthroughRecognizer, TextRecognizer};
pub use scanner::{FrameOutcome, MrzScanner};
pub use session::{Admission, ResultListener, ScanSession, SessionState};
pub use utils::{ErrorKind, ScanError};
