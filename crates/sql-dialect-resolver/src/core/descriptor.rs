//! The capability descriptor handed back by resolution.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use super::capability::{Capability, CapabilitySet};
use super::compose::Composition;
use super::identity::{ConnectionIdentity, ProductVersion};
use super::overlay::{Behavior, Behaviors, NullsOrdering};
use super::refine::ImpersonationRule;
use crate::error::Result;
use crate::inline::literal;
use crate::typemap::{self, ColumnMetadata, LogicalType, TypeRule};

/// Flags and generation behaviors for one backend.
///
/// Immutable once built. The flag values come from a composed overlay chain
/// shared by every descriptor built for the same tag and version range.
#[derive(Debug, Clone)]
pub struct CapabilityDescriptor {
    tag: &'static str,
    identity: ConnectionIdentity,
    version: Option<ProductVersion>,
    impersonated_via: Option<&'static str>,
    composition: Arc<Composition>,
}

impl CapabilityDescriptor {
    pub(crate) fn new(
        tag: &'static str,
        identity: &ConnectionIdentity,
        composition: Arc<Composition>,
    ) -> Self {
        Self {
            tag,
            identity: identity.clone(),
            version: identity.version(),
            impersonated_via: None,
            composition,
        }
    }

    pub(crate) fn impersonating(mut self, original: &'static str) -> Self {
        self.impersonated_via = Some(original);
        self
    }

    /// Canonical lowercase name of this dialect.
    pub fn identity_tag(&self) -> &'static str {
        self.tag
    }

    pub fn product_name(&self) -> &str {
        &self.identity.product_name
    }

    pub fn product_version(&self) -> &str {
        &self.identity.product_version
    }

    /// Parsed product version, when the version string had one.
    pub fn version(&self) -> Option<ProductVersion> {
        self.version
    }

    /// Tag of the factory that originally matched, when refinement re-tagged
    /// this descriptor to a different engine.
    pub fn impersonated_via(&self) -> Option<&'static str> {
        self.impersonated_via
    }

    /// Names of the overlays this descriptor was composed from, root first.
    pub fn chain(&self) -> &[&'static str] {
        &self.composition.chain
    }

    pub fn flags(&self) -> &CapabilitySet {
        &self.composition.flags
    }

    pub fn flag(&self, capability: Capability) -> bool {
        self.composition.flags.get(capability)
    }

    /// Overlay that supplied the value of `capability`.
    pub fn provenance(&self, capability: Capability) -> &'static str {
        self.composition.flag_origin[capability.index()]
    }

    /// Overlay that supplied the value of `behavior`.
    pub fn behavior_provenance(&self, behavior: Behavior) -> Option<&'static str> {
        self.composition.behavior_origin.get(&behavior).copied()
    }

    pub fn behaviors(&self) -> &Behaviors {
        &self.composition.behaviors
    }

    /// Type-mapping overrides, nearest overlay first.
    pub fn type_rules(&self) -> &[TypeRule] {
        &self.composition.type_rules
    }

    /// Impersonation rules, nearest overlay first.
    pub fn impersonation_rules(&self) -> &[ImpersonationRule] {
        &self.composition.impersonations
    }

    pub fn allows_as(&self) -> bool {
        self.flag(Capability::AllowsAs)
    }

    pub fn allows_from_query(&self) -> bool {
        self.flag(Capability::AllowsFromQuery)
    }

    pub fn requires_alias_for_from_query(&self) -> bool {
        self.flag(Capability::RequiresAliasForFromQuery)
    }

    pub fn requires_order_by_alias(&self) -> bool {
        self.flag(Capability::RequiresOrderByAlias)
    }

    pub fn requires_having_alias(&self) -> bool {
        self.flag(Capability::RequiresHavingAlias)
    }

    pub fn requires_union_order_by_ordinal(&self) -> bool {
        self.flag(Capability::RequiresUnionOrderByOrdinal)
    }

    pub fn supports_multi_value_in_expr(&self) -> bool {
        self.flag(Capability::SupportsMultiValueInExpr)
    }

    pub fn supports_unlimited_value_list(&self) -> bool {
        self.flag(Capability::SupportsUnlimitedValueList)
    }

    pub fn supports_values_list(&self) -> bool {
        self.flag(Capability::SupportsValuesList)
    }

    pub fn allows_multiple_distinct_measures(&self) -> bool {
        self.flag(Capability::AllowsMultipleDistinctMeasures)
    }

    /// Quote a single identifier.
    pub fn quote_identifier(&self, name: &str) -> String {
        self.behaviors().quote_style.quote(name)
    }

    /// Quote each part of a qualified name and join with dots. Empty parts
    /// (e.g. no schema) are skipped.
    pub fn quote_qualified(&self, parts: &[&str]) -> String {
        parts
            .iter()
            .filter(|p| !p.is_empty())
            .map(|p| self.quote_identifier(p))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Render `value` as a literal of `logical` type.
    pub fn quote_literal(&self, value: &str, logical: LogicalType) -> Result<String> {
        literal::format_literal(self.behaviors(), self.flags(), value, logical)
    }

    /// Cast target template for a logical type.
    pub fn cast_template(&self, logical: LogicalType) -> &'static str {
        self.behaviors()
            .cast_types
            .get(&logical)
            .copied()
            .unwrap_or("VARCHAR({len})")
    }

    /// Wrap `sql` as a derived table.
    ///
    /// An alias is emitted when one is supplied or the dialect requires it
    /// (falling back to `t`); `AS` is used only where the dialect allows it.
    pub fn from_query(&self, sql: &str, alias: Option<&str>) -> String {
        let alias = match alias {
            Some(a) => Some(a),
            None if self.requires_alias_for_from_query() => Some("t"),
            None => None,
        };

        match alias {
            Some(a) if self.allows_as() => format!("({}) AS {}", sql, self.quote_identifier(a)),
            Some(a) => format!("({}) {}", sql, self.quote_identifier(a)),
            None => format!("({})", sql),
        }
    }

    /// One ORDER BY item, emulating null ordering where the dialect lacks
    /// `NULLS FIRST`/`NULLS LAST`.
    pub fn generate_order_item(
        &self,
        expr: &str,
        nullable: bool,
        ascending: bool,
        nulls_last: bool,
    ) -> String {
        let direction = if ascending { "ASC" } else { "DESC" };
        if !nullable {
            return format!("{} {}", expr, direction);
        }

        let null_direction = if nulls_last { "ASC" } else { "DESC" };
        match self.behaviors().nulls_ordering {
            NullsOrdering::Ansi => format!(
                "{} {} NULLS {}",
                expr,
                direction,
                if nulls_last { "LAST" } else { "FIRST" }
            ),
            NullsOrdering::IsNullFunction => {
                format!("ISNULL({}) {}, {} {}", expr, null_direction, expr, direction)
            }
            NullsOrdering::CaseExpression => format!(
                "CASE WHEN {} IS NULL THEN 1 ELSE 0 END {}, {} {}",
                expr, null_direction, expr, direction
            ),
        }
    }

    /// Largest value list a single statement should carry, if bounded.
    pub fn max_value_list_len(&self) -> Option<usize> {
        self.behaviors().max_value_list
    }

    /// Classify column `index` of `metadata`.
    pub fn map_type(&self, metadata: &dyn ColumnMetadata, index: usize) -> Result<LogicalType> {
        typemap::map_type(self.type_rules(), metadata, index)
    }

    /// Serializable view for reporting.
    pub fn summary(&self) -> DescriptorSummary<'_> {
        DescriptorSummary {
            tag: self.tag,
            product_name: self.product_name(),
            product_version: self.product_version(),
            version: self.version.map(|v| v.to_string()),
            impersonated_via: self.impersonated_via,
            chain: self.chain(),
            flags: self.flags(),
            flag_origin: Capability::ALL
                .into_iter()
                .map(|c| (c.name(), self.provenance(c)))
                .collect(),
            behaviors: self.behaviors(),
            behavior_origin: self
                .composition
                .behavior_origin
                .iter()
                .map(|(b, o)| (b.to_string(), *o))
                .collect(),
        }
    }
}

/// JSON/YAML friendly snapshot of a descriptor.
#[derive(Debug, Serialize)]
pub struct DescriptorSummary<'a> {
    pub tag: &'a str,
    pub product_name: &'a str,
    pub product_version: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impersonated_via: Option<&'a str>,
    pub chain: &'a [&'static str],
    pub flags: &'a CapabilitySet,
    pub flag_origin: BTreeMap<&'static str, &'static str>,
    pub behaviors: &'a Behaviors,
    pub behavior_origin: BTreeMap<String, &'static str>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::DialectRegistry;

    fn descriptor(tag: &str) -> Arc<CapabilityDescriptor> {
        let registry = DialectRegistry::with_builtins().unwrap();
        registry
            .resolve_tag(tag, &ConnectionIdentity::default())
            .unwrap()
    }

    #[test]
    fn test_quote_qualified() {
        let mysql = descriptor("mysql");
        assert_eq!(mysql.quote_qualified(&["sales", "", "fact"]), "`sales`.`fact`");
        let ansi = descriptor("ansi");
        assert_eq!(ansi.quote_qualified(&["s", "t"]), "\"s\".\"t\"");
    }

    #[test]
    fn test_from_query_alias_rules() {
        let ansi = descriptor("ansi");
        assert_eq!(ansi.from_query("SELECT 1", None), "(SELECT 1)");
        assert_eq!(ansi.from_query("SELECT 1", Some("q")), "(SELECT 1) AS \"q\"");

        let postgres = descriptor("postgresql");
        assert_eq!(postgres.from_query("SELECT 1", None), "(SELECT 1) AS \"t\"");

        let oracle = descriptor("oracle");
        assert_eq!(
            oracle.from_query("SELECT 1 FROM DUAL", Some("q")),
            "(SELECT 1 FROM DUAL) \"q\""
        );
    }

    #[test]
    fn test_order_item_styles() {
        let ansi = descriptor("ansi");
        assert_eq!(ansi.generate_order_item("x", true, true, true), "x ASC NULLS LAST");
        assert_eq!(ansi.generate_order_item("x", false, false, true), "x DESC");

        let mysql = descriptor("mysql");
        assert_eq!(
            mysql.generate_order_item("`x`", true, true, true),
            "ISNULL(`x`) ASC, `x` ASC"
        );

        let mssql = descriptor("mssql");
        assert_eq!(
            mssql.generate_order_item("[x]", true, false, false),
            "CASE WHEN [x] IS NULL THEN 1 ELSE 0 END DESC, [x] DESC"
        );
    }

    #[test]
    fn test_provenance_names_winning_overlay() {
        let mysql = descriptor("mysql");
        assert_eq!(mysql.provenance(Capability::RequiresAliasForFromQuery), "mysql");
        assert_eq!(mysql.provenance(Capability::AllowsJoinOn), "ansi");
        assert_eq!(mysql.behavior_provenance(Behavior::QuoteStyle), Some("mysql"));
    }

    #[test]
    fn test_summary_serializes() {
        let oracle = descriptor("oracle");
        let json = serde_json::to_value(oracle.summary()).unwrap();
        assert_eq!(json["tag"], "oracle");
        assert_eq!(json["flags"]["allows_as"], false);
        assert_eq!(json["flag_origin"]["allows_as"], "oracle");
        assert_eq!(json["behaviors"]["dummy_table"], "DUAL");
        assert_eq!(json["chain"][0], "ansi");
    }
}
