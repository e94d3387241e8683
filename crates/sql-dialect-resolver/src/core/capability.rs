//! Boolean capability flags carried by every descriptor.

use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::error::{DialectError, Result};

/// A typed SQL-generation flag.
///
/// Every flag has a value in the root (ANSI) overlay; concrete dialects
/// patch only the flags where they differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Capability {
    /// `AS` may be used before table and column aliases.
    AllowsAs,
    /// Sub-queries are allowed in the FROM clause.
    AllowsFromQuery,
    /// FROM-clause sub-queries must carry an alias.
    RequiresAliasForFromQuery,
    /// `COUNT(DISTINCT x)` is supported.
    AllowsCountDistinct,
    /// `COUNT(DISTINCT x, y)` is supported.
    AllowsCompoundCountDistinct,
    /// More than one `COUNT(DISTINCT ...)` per SELECT.
    AllowsMultipleCountDistinct,
    /// More than one distinct SQL measure per SELECT.
    AllowsMultipleDistinctMeasures,
    /// `COUNT(DISTINCT ...)` may be mixed with other aggregates.
    AllowsCountDistinctWithOtherAggs,
    /// ORDER BY must reference select-list aliases.
    RequiresOrderByAlias,
    /// ORDER BY may reference select-list aliases.
    AllowsOrderByAlias,
    /// HAVING must reference select-list aliases.
    RequiresHavingAlias,
    /// GROUP BY must reference select-list aliases.
    RequiresGroupByAlias,
    /// ORDER BY on a UNION must use ordinals.
    RequiresUnionOrderByOrdinal,
    /// ORDER BY expressions on a UNION must appear in the select list.
    RequiresUnionOrderByExprInSelect,
    /// GROUP BY accepts arbitrary expressions.
    SupportsGroupByExpressions,
    /// `GROUPING SETS` is supported.
    SupportsGroupingSets,
    /// `(a, b) IN ((1, 2), (3, 4))` is supported.
    SupportsMultiValueInExpr,
    /// IN-lists of any length are accepted.
    SupportsUnlimitedValueList,
    /// `(VALUES (...), (...)) AS t (c1, c2)` row constructors are supported.
    SupportsValuesList,
    /// Non-aggregated columns may appear outside GROUP BY.
    AllowsSelectNotInGroupBy,
    /// Explicit `JOIN ... ON` syntax.
    AllowsJoinOn,
    /// DDL statements may be issued.
    AllowsDdl,
    /// Regular expressions are supported in WHERE.
    AllowsRegexInWhere,
    /// Fractional numeric literals need an explicit exponent (`1.5E0`).
    RequiresExponentLiteral,
}

impl Capability {
    pub const COUNT: usize = 24;

    pub const ALL: [Capability; Capability::COUNT] = [
        Capability::AllowsAs,
        Capability::AllowsFromQuery,
        Capability::RequiresAliasForFromQuery,
        Capability::AllowsCountDistinct,
        Capability::AllowsCompoundCountDistinct,
        Capability::AllowsMultipleCountDistinct,
        Capability::AllowsMultipleDistinctMeasures,
        Capability::AllowsCountDistinctWithOtherAggs,
        Capability::RequiresOrderByAlias,
        Capability::AllowsOrderByAlias,
        Capability::RequiresHavingAlias,
        Capability::RequiresGroupByAlias,
        Capability::RequiresUnionOrderByOrdinal,
        Capability::RequiresUnionOrderByExprInSelect,
        Capability::SupportsGroupByExpressions,
        Capability::SupportsGroupingSets,
        Capability::SupportsMultiValueInExpr,
        Capability::SupportsUnlimitedValueList,
        Capability::SupportsValuesList,
        Capability::AllowsSelectNotInGroupBy,
        Capability::AllowsJoinOn,
        Capability::AllowsDdl,
        Capability::AllowsRegexInWhere,
        Capability::RequiresExponentLiteral,
    ];

    /// Snake-case name, stable for configuration and JSON output.
    pub fn name(self) -> &'static str {
        match self {
            Capability::AllowsAs => "allows_as",
            Capability::AllowsFromQuery => "allows_from_query",
            Capability::RequiresAliasForFromQuery => "requires_alias_for_from_query",
            Capability::AllowsCountDistinct => "allows_count_distinct",
            Capability::AllowsCompoundCountDistinct => "allows_compound_count_distinct",
            Capability::AllowsMultipleCountDistinct => "allows_multiple_count_distinct",
            Capability::AllowsMultipleDistinctMeasures => "allows_multiple_distinct_measures",
            Capability::AllowsCountDistinctWithOtherAggs => {
                "allows_count_distinct_with_other_aggs"
            }
            Capability::RequiresOrderByAlias => "requires_order_by_alias",
            Capability::AllowsOrderByAlias => "allows_order_by_alias",
            Capability::RequiresHavingAlias => "requires_having_alias",
            Capability::RequiresGroupByAlias => "requires_group_by_alias",
            Capability::RequiresUnionOrderByOrdinal => "requires_union_order_by_ordinal",
            Capability::RequiresUnionOrderByExprInSelect => {
                "requires_union_order_by_expr_in_select"
            }
            Capability::SupportsGroupByExpressions => "supports_group_by_expressions",
            Capability::SupportsGroupingSets => "supports_grouping_sets",
            Capability::SupportsMultiValueInExpr => "supports_multi_value_in_expr",
            Capability::SupportsUnlimitedValueList => "supports_unlimited_value_list",
            Capability::SupportsValuesList => "supports_values_list",
            Capability::AllowsSelectNotInGroupBy => "allows_select_not_in_group_by",
            Capability::AllowsJoinOn => "allows_join_on",
            Capability::AllowsDdl => "allows_ddl",
            Capability::AllowsRegexInWhere => "allows_regex_in_where",
            Capability::RequiresExponentLiteral => "requires_exponent_literal",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Capability {
    type Err = DialectError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        Capability::ALL
            .into_iter()
            .find(|c| c.name() == wanted)
            .ok_or_else(|| DialectError::Config(format!("unknown capability '{}'", s)))
    }
}

/// A fully resolved value for every [`Capability`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CapabilitySet {
    values: [bool; Capability::COUNT],
}

impl CapabilitySet {
    pub(crate) fn from_values(values: [bool; Capability::COUNT]) -> Self {
        Self { values }
    }

    /// Value of one flag.
    pub fn get(&self, capability: Capability) -> bool {
        self.values[capability.index()]
    }

    /// Iterate `(flag, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (Capability, bool)> + '_ {
        Capability::ALL.into_iter().map(move |c| (c, self.get(c)))
    }
}

impl Serialize for CapabilitySet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Capability::COUNT))?;
        for (capability, value) in self.iter() {
            map.serialize_entry(capability.name(), &value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_is_in_index_order() {
        for (i, c) in Capability::ALL.iter().enumerate() {
            assert_eq!(c.index(), i, "{} out of order", c);
        }
    }

    #[test]
    fn test_names_round_trip() {
        for c in Capability::ALL {
            assert_eq!(c.name().parse::<Capability>().unwrap(), c);
        }
        assert_eq!(
            "Requires-Order-By-Alias".parse::<Capability>().unwrap(),
            Capability::RequiresOrderByAlias
        );
        assert!("supports_time_travel".parse::<Capability>().is_err());
    }

    #[test]
    fn test_set_serializes_by_name() {
        let mut values = [false; Capability::COUNT];
        values[Capability::AllowsAs.index()] = true;
        let set = CapabilitySet::from_values(values);
        let json = serde_json::to_value(set).unwrap();
        assert_eq!(json["allows_as"], true);
        assert_eq!(json["supports_values_list"], false);
    }
}
