//! Address registry collaborator: live portal lookups (feature `http`) with a
//! reference-table fallback.

pub mod fallback;
#[cfg(feature = "http")]
pub mod portal;
mod validator;

pub use fallback::{FallbackEntry, FallbackTable};
#[cfg(feature = "http")]
pub use portal::{PortalClient, PortalError};
pub use validator::RegistryValidator;
