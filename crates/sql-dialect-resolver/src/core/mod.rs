//! Core abstractions for dialect resolution.
//!
//! This module contains the database-agnostic pieces:
//!
//! - [`Capability`] / [`CapabilitySet`]: typed SQL-generation flags
//! - [`Overlay`]: a named partial set of flags and behaviors
//! - [`CapabilityDescriptor`]: the composed result for one backend
//! - [`DialectRegistry`]: ordered factory entries and descriptor specs
//! - [`MetadataProbe`]: the seam to the caller's live connection

pub mod capability;
pub mod catalog;
mod compose;
pub mod descriptor;
pub mod identity;
pub mod overlay;
pub mod probe;
pub mod refine;

pub use capability::{Capability, CapabilitySet};
pub use catalog::{
    DescriptorBuilder, DescriptorSpec, DialectRegistry, FactoryEntry, Guard, ProductPattern,
    RegistryBuilder, VersionGate,
};
pub use compose::IMPLIED_FLAGS;
pub use descriptor::{CapabilityDescriptor, DescriptorSummary};
pub use identity::{ConnectionIdentity, MetadataSnapshot, ProductVersion};
pub use overlay::{
    Behavior, Behaviors, BooleanLiteral, NullsOrdering, Overlay, QuoteStyle, StringLiteralStyle,
    TemporalLiteral,
};
pub use probe::{MetadataProbe, ProbeQuery, RecordedProbe};
pub use refine::ImpersonationRule;
