//! Built-in dialect catalog.
//!
//! Each module contributes descriptor specs (an overlay on top of its base)
//! and factory entries. [`register_builtins`] adds them in resolution order:
//! within a family the specific engines come before the generic one.
//!
//! | Family | Entries, in order |
//! |---|---|
//! | MySQL | infobright, mariadb, mysql |
//! | PostgreSQL | greenplum, redshift, netezza, postgresql |
//! | SQL Server | sybase, mssql |
//! | Oracle | oracle |
//! | DB2 | db2_as400, db2 |
//! | Embedded | derby, hsqldb, h2 |
//! | Others | informix, teradata |
//! | LucidDB | sqlstream, luciddb |
//! | Warehouse | hive, impala, snowflake, vertica, clickhouse |
//! | Interbase | firebird, interbase |
//!
//! # Adding a dialect
//!
//! 1. Write an overlay listing only what differs from its base.
//! 2. Register a [`DescriptorSpec`](crate::core::DescriptorSpec) and a
//!    [`FactoryEntry`](crate::core::FactoryEntry) ahead of any more generic
//!    entry whose patterns would also match.
//! 3. If the engine hides behind another engine's driver, add an
//!    impersonation rule to that engine's overlay.

pub mod ansi;
mod db2;
mod embedded;
mod firebird;
mod informix;
mod luciddb;
mod mssql;
mod mysql;
pub mod oracle;
mod postgres;
mod teradata;
mod warehouse;

use crate::core::{DialectRegistry, RegistryBuilder};
use crate::error::Result;

/// Add every built-in spec and entry to `builder`.
pub fn register_builtins(builder: &mut RegistryBuilder) {
    ansi::register(builder);
    mysql::register(builder);
    postgres::register(builder);
    mssql::register(builder);
    oracle::register(builder);
    db2::register(builder);
    embedded::register(builder);
    informix::register(builder);
    teradata::register(builder);
    luciddb::register(builder);
    warehouse::register(builder);
    firebird::register(builder);
}

impl DialectRegistry {
    /// Create a registry with the built-in dialect catalog.
    pub fn with_builtins() -> Result<Self> {
        let mut builder = RegistryBuilder::new();
        register_builtins(&mut builder);
        builder.build()
    }
}
