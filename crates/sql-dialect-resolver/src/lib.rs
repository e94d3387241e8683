//! # sql-dialect-resolver
//!
//! Dialect resolution and capability descriptors for SQL-generating engines.
//!
//! This library lets one SQL generator target many relational backends:
//!
//! - **Resolution** of a connection's reported product identity to a
//!   capability descriptor, first match wins in registration order
//! - **Override composition**: each backend is an overlay of only the flags
//!   and behaviors where it differs from its base, down to an ANSI root
//! - **Identity refinement** for engines hiding behind another engine's
//!   driver (MariaDB, Greenplum, Redshift, ...)
//! - **Inline value tables** rendered as `VALUES` lists or `UNION ALL`
//!   selects, with typed casts
//! - **Type mapping** from raw column type codes to logical types
//!
//! ## Example
//!
//! ```rust
//! use sql_dialect_resolver::{ConnectionIdentity, DialectRegistry, InlineValueTable, LogicalType};
//!
//! # fn main() -> sql_dialect_resolver::Result<()> {
//! let registry = DialectRegistry::with_builtins()?;
//! let dialect = registry.resolve(&ConnectionIdentity::new("PostgreSQL", "16.2"))?;
//!
//! let mut table =
//!     InlineValueTable::new(["id", "name"], [LogicalType::Integer, LogicalType::String]);
//! table.push_row(["1", "a"]);
//! let sql = dialect.generate_inline(&table)?;
//! assert!(sql.starts_with("SELECT * FROM (VALUES"));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod dialects;
pub mod error;
pub mod inline;
pub mod typemap;

// Re-exports for convenient access
pub use config::{Config, ConnectionConfig, ProbeConfig, ResolverConfig};
pub use crate::core::{
    Capability, CapabilityDescriptor, CapabilitySet, ConnectionIdentity, DescriptorSpec,
    DialectRegistry, FactoryEntry, ImpersonationRule, MetadataProbe, MetadataSnapshot, Overlay,
    ProbeQuery, ProductVersion, RecordedProbe, RegistryBuilder,
};
pub use error::{DialectError, Result};
pub use inline::InlineValueTable;
pub use typemap::{ColumnMetadata, LogicalType, ResultDescription, SqlTypeCode};
