//! Pythia Tools - capability registry and builtin capabilities
//!
//! This crate provides the capability seam of the research engine:
//! - Registry: `Capability` trait, category lookup, invoke-by-name
//! - Builtins: web search and weather capabilities
//!
//! The engine never assumes a specific capability implementation; it only
//! relies on category lookup and the uniform invoke contract.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod builtins;
pub mod error;
pub mod registry;

pub use error::{Error, Result};
pub use registry::{Capability, CapabilityCategory, CapabilityDefinition, CapabilityRegistry};
