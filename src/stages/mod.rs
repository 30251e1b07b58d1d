pub mod extraction;
pub mod recognition;
pub mod validation;

pub use extraction::MetadataExtractor;
pub use recognition::{RecognitionError, Recognizer, SimulatedRecognizer};
pub use validation::{validate, ValidationOutcome};
