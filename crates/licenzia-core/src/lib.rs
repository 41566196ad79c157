//! Core types for license-application expertise: submitted documents,
//! extracted records, findings, the address registry contract, and shared
//! configuration.

pub mod address;
pub mod config;
pub mod document;
pub mod finding;
pub mod money;
pub mod record;

pub use address::{AddressResolution, AddressStatus, AddressValidator, ValidatorError};
pub use config::{ConfigError, ExpertiseConfig, RegistryConfig, RulesConfig};
pub use document::{ClassificationResult, ConfidenceSource, DocumentKind, RawDocument};
pub use finding::{ExpertiseResult, Finding, OverallStatus, Recommendation, Severity};
pub use money::Amount;
pub use record::{
    ApplicationRecord, CadastralRecord, CaseError, CaseRecord, CaseRecordBuilder, CaseStage,
    CompanyRegistryRecord, CompanyStatus, DeclaredObject, DocumentTrace, DutyPaymentRecord,
    ExtractedRecord, Superseded, TaxDebtRecord,
};
