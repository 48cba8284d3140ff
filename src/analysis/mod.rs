//! Gap selection and result aggregation
//!
//! Turns silence periods and onset energy into the final answer:
//! - Gap candidate selection
//! - Confidence scoring
//! - Result types
//! - Metadata

pub mod candidate;
pub mod confidence;
pub mod metadata;
pub mod result;
