//! PostgreSQL family: PostgreSQL, Greenplum, Redshift and Netezza.
//!
//! The derived engines all answer the PostgreSQL wire protocol. When their
//! driver reports "PostgreSQL", the version banner still names them.

use crate::core::{
    Capability, DescriptorSpec, FactoryEntry, ImpersonationRule, Overlay, ProbeQuery,
    ProductVersion, RegistryBuilder,
};
use crate::typemap::LogicalType;

use super::ansi;

fn postgresql() -> Overlay {
    Overlay::new("postgresql")
        .set(Capability::SupportsValuesList, true)
        .set(Capability::RequiresAliasForFromQuery, true)
        .set(Capability::SupportsMultiValueInExpr, true)
        .set(Capability::SupportsGroupingSets, true)
        .set(Capability::AllowsRegexInWhere, true)
        .set(Capability::AllowsDdl, true)
        .cast_type(LogicalType::Numeric, "NUMERIC({precision}, {scale})")
        .impersonation(ImpersonationRule::new(ProbeQuery::VersionBanner, "Greenplum", "greenplum"))
        .impersonation(ImpersonationRule::new(ProbeQuery::VersionBanner, "Redshift", "redshift"))
        .impersonation(ImpersonationRule::new(ProbeQuery::VersionBanner, "Netezza", "netezza"))
}

fn postgresql_pre_82() -> Overlay {
    Overlay::new("postgresql<8.2").set(Capability::SupportsValuesList, false)
}

fn postgresql_pre_95() -> Overlay {
    Overlay::new("postgresql<9.5").set(Capability::SupportsGroupingSets, false)
}

fn greenplum() -> Overlay {
    Overlay::new("greenplum")
        .set(Capability::RequiresGroupByAlias, true)
        .set(Capability::AllowsMultipleCountDistinct, false)
}

fn redshift() -> Overlay {
    Overlay::new("redshift")
        .set(Capability::SupportsValuesList, false)
        .set(Capability::SupportsGroupingSets, false)
        .cast_type(LogicalType::Double, "FLOAT8")
}

fn netezza() -> Overlay {
    Overlay::new("netezza")
        .set(Capability::SupportsValuesList, false)
        .set(Capability::SupportsGroupingSets, false)
        .set(Capability::AllowsRegexInWhere, false)
}

pub(crate) fn register(builder: &mut RegistryBuilder) {
    builder
        .spec(
            DescriptorSpec::new("postgresql", ansi::TAG, postgresql())
                .gate(ProductVersion::new(8, 2), postgresql_pre_82())
                .gate(ProductVersion::new(9, 5), postgresql_pre_95()),
        )
        .spec(DescriptorSpec::new("greenplum", "postgresql", greenplum()))
        .spec(DescriptorSpec::new("redshift", "postgresql", redshift()))
        .spec(DescriptorSpec::new("netezza", "postgresql", netezza()));

    builder
        .entry(FactoryEntry::new("greenplum").contains("greenplum"))
        .entry(FactoryEntry::new("redshift").contains("redshift"))
        .entry(FactoryEntry::new("netezza").contains("netezza"))
        .entry(FactoryEntry::new("postgresql").contains("postgres"));
}
