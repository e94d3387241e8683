//! MySQL family: MySQL, MariaDB and Infobright.
//!
//! MariaDB and Infobright ship drivers that report "MySQL" as the product
//! name, so the MySQL overlay carries impersonation rules that re-tag the
//! connection once the server variables give the real engine away.

use crate::core::{
    Capability, ConnectionIdentity, DescriptorSpec, FactoryEntry, ImpersonationRule,
    NullsOrdering, Overlay, ProbeQuery, ProductVersion, QuoteStyle, RegistryBuilder,
    StringLiteralStyle,
};
use crate::typemap::LogicalType;

use super::ansi;

fn mysql() -> Overlay {
    Overlay::new("mysql")
        .quote_style(QuoteStyle::Backtick)
        .set(Capability::RequiresAliasForFromQuery, true)
        .set(Capability::AllowsCompoundCountDistinct, true)
        .set(Capability::SupportsMultiValueInExpr, true)
        .set(Capability::AllowsSelectNotInGroupBy, true)
        .set(Capability::AllowsRegexInWhere, true)
        .set(Capability::AllowsDdl, true)
        .string_literal(StringLiteralStyle {
            prefix: "",
            escape_backslash: true,
        })
        .nulls_ordering(NullsOrdering::IsNullFunction)
        // CAST only accepts a narrow set of target names.
        .cast_type(LogicalType::String, "CHAR({len})")
        .cast_type(LogicalType::Object, "CHAR({len})")
        .cast_type(LogicalType::Integer, "SIGNED")
        .cast_type(LogicalType::Long, "SIGNED")
        .cast_type(LogicalType::Boolean, "SIGNED")
        .cast_type(LogicalType::Double, "DOUBLE")
        .cast_type(LogicalType::Timestamp, "DATETIME")
        .impersonation(ImpersonationRule::new(
            ProbeQuery::variable("version"),
            "MariaDB",
            "mariadb",
        ))
        .impersonation(ImpersonationRule::new(
            ProbeQuery::variable("version_comment"),
            "Infobright",
            "infobright",
        ))
}

/// Before 4.1 there are no sub-queries at all.
fn mysql_pre_41() -> Overlay {
    Overlay::new("mysql<4.1")
        .set(Capability::AllowsFromQuery, false)
        .set(Capability::RequiresAliasForFromQuery, false)
        .dummy_table(Some("DUAL"))
}

fn mariadb() -> Overlay {
    Overlay::new("mariadb").set(Capability::SupportsGroupingSets, false)
}

fn infobright() -> Overlay {
    Overlay::new("infobright")
        .set(Capability::AllowsCompoundCountDistinct, false)
        .set(Capability::SupportsGroupByExpressions, false)
        .set(Capability::RequiresOrderByAlias, true)
        .set(Capability::AllowsDdl, false)
}

fn is_infobright(identity: &ConnectionIdentity) -> bool {
    identity
        .snapshot_answer(&ProbeQuery::variable("version_comment"))
        .is_some_and(|comment| comment.to_lowercase().contains("infobright"))
}

pub(crate) fn register(builder: &mut RegistryBuilder) {
    builder
        .spec(
            DescriptorSpec::new("mysql", ansi::TAG, mysql())
                .gate(ProductVersion::new(4, 1), mysql_pre_41()),
        )
        .spec(DescriptorSpec::new("mariadb", "mysql", mariadb()))
        .spec(DescriptorSpec::new("infobright", "mysql", infobright()));

    builder
        .entry(
            FactoryEntry::new("infobright")
                .contains("mysql")
                .guarded(is_infobright),
        )
        .entry(FactoryEntry::new("mariadb").contains("mariadb"))
        .entry(FactoryEntry::new("mysql").contains("mysql"));
}
