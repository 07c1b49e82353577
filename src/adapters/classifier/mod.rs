//! Document classifier adapters.

mod http_classifier;
mod mock_classifier;

pub use http_classifier::{HttpClassifier, HttpClassifierConfig};
pub use mock_classifier::MockClassifier;
