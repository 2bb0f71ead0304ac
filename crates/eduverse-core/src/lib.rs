//! eduverse-core: submission grading core.
//!
//! This crate defines the curriculum data model, the level-aware content
//! resolver, the request validator and the verdict interpreter, plus the
//! grading service that drives a submission from request to verdict.

pub mod combiner;
pub mod error;
pub mod grader;
pub mod log;
pub mod model;
pub mod parser;
pub mod resolver;
pub mod results;
pub mod traits;
pub mod validator;
pub mod verdict;
