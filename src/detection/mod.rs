//! PHP ecosystem detection
//!
//! - [`signatures`]: static dependency and marker-file signature tables plus the matcher
//! - [`result`]: the [`DetectionResult`] record and its right-biased merge
//! - [`detector`]: [`EcosystemDetector`], which ties manifest parsing and matching together

pub mod detector;
pub mod result;
pub mod signatures;

pub use detector::{DetectionError, EcosystemDetector};
pub use result::{merge, DetectionResult, LabelSet};
pub use signatures::{
    match_frameworks, match_quality_tools, match_testing_tools, DependencySignature,
    FileSignature, MatchRule,
};
