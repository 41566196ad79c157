//! Expertise engine: classify and extract submitted registry documents,
//! cross-check them, and reduce the findings to a verdict.

pub mod address;
pub mod aggregate;
pub mod case;
pub mod classifier;
mod error;
pub mod extract;
mod pipeline;
pub mod rules;
pub mod xml;

#[cfg(test)]
mod testdata;

pub use aggregate::aggregate;
pub use case::{DocumentOutcome, build_case, case_findings, process_document};
pub use classifier::{Classified, classify};
pub use error::ExpertiseError;
pub use extract::{ExtractionError, extract};
pub use pipeline::Expertise;
pub use rules::ConsistencyEngine;
pub use xml::XmlError;
