pub mod config;
pub mod data;
pub mod rules;

pub use config::ScannerConfig;
pub use data::{CheckDigits, DocumentFormat, MrzCandidate, ValidatedMrz};
pub use rules::ValidationRules;
