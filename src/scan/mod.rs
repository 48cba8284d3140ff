//! Expanding-window onset search over lazily separated vocals
//!
//! - [`window`]: search windows centered on the expected gap and their expansion
//! - [`chunk_iterator`]: which ranges to separate for each window
//! - [`cache`]: per-song memo of separated ranges
//! - [`source`]: the separation capability the scan consumes
//! - [`scanner`]: the scan state machine

pub mod cache;
pub mod chunk_iterator;
pub mod scanner;
pub mod source;
pub mod window;

pub use cache::VocalsCache;
pub use scanner::{ScanReport, ScanState, Scanner};
pub use source::{InMemoryVocals, SeparationSource};
pub use window::{ExpansionStrategy, SearchWindow};
