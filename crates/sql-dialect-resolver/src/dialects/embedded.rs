//! Embedded Java databases: Derby, HSQLDB and H2.

use crate::core::{Capability, DescriptorSpec, FactoryEntry, Overlay, RegistryBuilder};
use crate::typemap::LogicalType;

use super::ansi;

fn derby() -> Overlay {
    Overlay::new("derby")
        .set(Capability::SupportsValuesList, true)
        .set(Capability::RequiresAliasForFromQuery, true)
        .set(Capability::SupportsGroupByExpressions, false)
        .dummy_table(Some("SYSIBM.SYSDUMMY1"))
        .cast_type(LogicalType::Double, "DOUBLE")
}

fn hsqldb() -> Overlay {
    Overlay::new("hsqldb")
        .set(Capability::SupportsValuesList, true)
        .set(Capability::SupportsMultiValueInExpr, true)
        .set(Capability::AllowsDdl, true)
        .dummy_table(Some("INFORMATION_SCHEMA.SYSTEM_USERS"))
        .cast_type(LogicalType::Double, "DOUBLE")
}

fn h2() -> Overlay {
    Overlay::new("h2")
        .set(Capability::SupportsValuesList, true)
        .set(Capability::RequiresAliasForFromQuery, true)
        .set(Capability::SupportsMultiValueInExpr, true)
        .set(Capability::AllowsDdl, true)
        .set(Capability::AllowsRegexInWhere, true)
        .cast_type(LogicalType::Double, "DOUBLE")
}

pub(crate) fn register(builder: &mut RegistryBuilder) {
    builder
        .spec(DescriptorSpec::new("derby", ansi::TAG, derby()))
        .spec(DescriptorSpec::new("hsqldb", ansi::TAG, hsqldb()))
        .spec(DescriptorSpec::new("h2", ansi::TAG, h2()));

    builder
        .entry(FactoryEntry::new("derby").contains("derby"))
        .entry(FactoryEntry::new("hsqldb").contains("hsql"))
        .entry(FactoryEntry::new("h2").equals("h2"));
}
