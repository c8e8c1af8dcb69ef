pub mod expiry;
pub mod format;
pub mod mrz;

pub use expiry::{DateDefect, MrzDate};
pub use format::{FieldValidator, Rejection};
pub use mrz::MrzValidator;
