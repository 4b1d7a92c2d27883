//! Network catalog subsystem.
//!
//! # Data Flow
//! ```text
//! config file [[networks]] (or built-in catalog)
//!     → types.rs (NetworkDescriptor, ChainId normalization)
//!     → registry.rs (ordered, indexed, immutable)
//!     → shared via Arc with the switcher and account state
//! ```

pub mod registry;
pub mod types;

pub use registry::{NetworkRegistry, RegistryError};
pub use types::{ChainId, ChainIdParseError, NativeCurrency, NetworkDescriptor};
