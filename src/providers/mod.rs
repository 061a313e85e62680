pub mod ai_detection;
pub mod case_store;
pub mod plagiarism;
pub mod similarity;
pub mod style;

pub use ai_detection::{GenerativeTextDetector, HttpGenerativeTextDetector};
pub use case_store::{CaseStore, HttpCaseStore};
pub use plagiarism::{HttpPlagiarismMatcher, PlagiarismCheckRequest, PlagiarismMatcher};
pub use similarity::{HttpSimilarityAnalyzer, SimilarityAnalyzer};
pub use style::{HttpStyleProfiler, StyleProfiler};
