//! Named overlays: the deltas a descriptor chain is composed from.
//!
//! A descriptor is never a subclass of another. It is a root overlay (the
//! ANSI defaults) plus an ordered list of named overlays applied on top,
//! root first. Each overlay sets only the flags and behaviors where its
//! backend differs; anything it leaves unset falls through to the overlay
//! below it.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::capability::Capability;
use super::refine::ImpersonationRule;
use crate::typemap::{LogicalType, TypeRule};

/// How identifiers are quoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStyle {
    /// `"name"` (ANSI)
    DoubleQuote,
    /// `` `name` `` (MySQL, Hive)
    Backtick,
    /// `[name]` (SQL Server, Access)
    Bracket,
}

impl QuoteStyle {
    /// Quote one identifier, doubling any embedded closing quote.
    pub fn quote(self, name: &str) -> String {
        match self {
            QuoteStyle::DoubleQuote => format!("\"{}\"", name.replace('"', "\"\"")),
            QuoteStyle::Backtick => format!("`{}`", name.replace('`', "``")),
            QuoteStyle::Bracket => format!("[{}]", name.replace(']', "]]")),
        }
    }
}

/// How string literals are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StringLiteralStyle {
    /// Prefix before the opening quote (`N` for national character literals).
    pub prefix: &'static str,
    /// Backslash is an escape character and must itself be doubled.
    pub escape_backslash: bool,
}

impl StringLiteralStyle {
    pub const STANDARD: StringLiteralStyle = StringLiteralStyle {
        prefix: "",
        escape_backslash: false,
    };
}

/// How boolean literals are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BooleanLiteral {
    /// `TRUE` / `FALSE`
    Keyword,
    /// `1` / `0`
    Numeric,
}

/// How date, time and timestamp literals are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TemporalLiteral {
    /// `DATE '2024-01-31'`
    Typed,
    /// `'2024-01-31'` (the surrounding CAST supplies the type)
    Quoted,
}

/// How "nulls last" ordering is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NullsOrdering {
    /// `expr ASC NULLS LAST`
    Ansi,
    /// `ISNULL(expr) ASC, expr ASC`
    IsNullFunction,
    /// `CASE WHEN expr IS NULL THEN 1 ELSE 0 END ASC, expr ASC`
    CaseExpression,
}

/// Non-boolean behaviors, fully resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Behaviors {
    pub quote_style: QuoteStyle,
    /// Table to select from when a SELECT has no natural FROM clause.
    pub dummy_table: Option<&'static str>,
    pub string_literal: StringLiteralStyle,
    pub boolean_literal: BooleanLiteral,
    pub temporal_literal: TemporalLiteral,
    /// Per-type exceptions to `temporal_literal`.
    pub temporal_overrides: BTreeMap<LogicalType, TemporalLiteral>,
    /// Wraps the cast target of a NULL value, e.g. `Nullable({type})`.
    pub null_cast: Option<&'static str>,
    pub nulls_ordering: NullsOrdering,
    /// Largest value list callers should hand to a single statement.
    pub max_value_list: Option<usize>,
    /// Cast target per logical type. Templates may contain `{len}`,
    /// `{precision}` and `{scale}`.
    pub cast_types: BTreeMap<LogicalType, &'static str>,
}

impl Behaviors {
    /// Literal style for one temporal type.
    pub fn temporal_style(&self, logical: LogicalType) -> TemporalLiteral {
        self.temporal_overrides
            .get(&logical)
            .copied()
            .unwrap_or(self.temporal_literal)
    }

    /// Cast target for a NULL value, given the resolved target for its column.
    pub fn null_cast_target(&self, target: &str) -> String {
        match self.null_cast {
            Some(wrapper) => wrapper.replace("{type}", target),
            None => target.to_string(),
        }
    }
}

/// Identifies one non-boolean behavior, for provenance reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Behavior {
    QuoteStyle,
    DummyTable,
    StringLiteral,
    BooleanLiteral,
    TemporalLiteral,
    TemporalLiteralFor(LogicalType),
    NullCast,
    NullsOrdering,
    MaxValueList,
    CastType(LogicalType),
}

impl fmt::Display for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Behavior::QuoteStyle => f.write_str("quote_style"),
            Behavior::DummyTable => f.write_str("dummy_table"),
            Behavior::StringLiteral => f.write_str("string_literal"),
            Behavior::BooleanLiteral => f.write_str("boolean_literal"),
            Behavior::TemporalLiteral => f.write_str("temporal_literal"),
            Behavior::TemporalLiteralFor(t) => write!(f, "temporal_literal[{}]", t),
            Behavior::NullCast => f.write_str("null_cast"),
            Behavior::NullsOrdering => f.write_str("nulls_ordering"),
            Behavior::MaxValueList => f.write_str("max_value_list"),
            Behavior::CastType(t) => write!(f, "cast_type[{}]", t),
        }
    }
}

/// A named, partial set of flag and behavior values.
#[derive(Debug, Clone, Default)]
pub struct Overlay {
    pub(crate) name: &'static str,
    pub(crate) flags: BTreeMap<Capability, bool>,
    pub(crate) quote_style: Option<QuoteStyle>,
    pub(crate) dummy_table: Option<Option<&'static str>>,
    pub(crate) string_literal: Option<StringLiteralStyle>,
    pub(crate) boolean_literal: Option<BooleanLiteral>,
    pub(crate) temporal_literal: Option<TemporalLiteral>,
    pub(crate) temporal_overrides: BTreeMap<LogicalType, TemporalLiteral>,
    pub(crate) null_cast: Option<Option<&'static str>>,
    pub(crate) nulls_ordering: Option<NullsOrdering>,
    pub(crate) max_value_list: Option<Option<usize>>,
    pub(crate) cast_types: BTreeMap<LogicalType, &'static str>,
    pub(crate) type_rules: Vec<TypeRule>,
    pub(crate) impersonations: Vec<ImpersonationRule>,
}

impl Overlay {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Flags this overlay sets explicitly.
    pub fn flags(&self) -> &BTreeMap<Capability, bool> {
        &self.flags
    }

    /// Whether this overlay sets `capability` explicitly.
    pub fn sets(&self, capability: Capability) -> bool {
        self.flags.contains_key(&capability)
    }

    pub fn set(mut self, capability: Capability, value: bool) -> Self {
        self.flags.insert(capability, value);
        self
    }

    pub fn quote_style(mut self, style: QuoteStyle) -> Self {
        self.quote_style = Some(style);
        self
    }

    pub fn dummy_table(mut self, table: Option<&'static str>) -> Self {
        self.dummy_table = Some(table);
        self
    }

    pub fn string_literal(mut self, style: StringLiteralStyle) -> Self {
        self.string_literal = Some(style);
        self
    }

    pub fn boolean_literal(mut self, style: BooleanLiteral) -> Self {
        self.boolean_literal = Some(style);
        self
    }

    pub fn temporal_literal(mut self, style: TemporalLiteral) -> Self {
        self.temporal_literal = Some(style);
        self
    }

    /// Override `temporal_literal` for one logical type.
    pub fn temporal_literal_for(mut self, logical: LogicalType, style: TemporalLiteral) -> Self {
        self.temporal_overrides.insert(logical, style);
        self
    }

    pub fn null_cast(mut self, wrapper: Option<&'static str>) -> Self {
        self.null_cast = Some(wrapper);
        self
    }

    pub fn nulls_ordering(mut self, style: NullsOrdering) -> Self {
        self.nulls_ordering = Some(style);
        self
    }

    pub fn max_value_list(mut self, max: Option<usize>) -> Self {
        self.max_value_list = Some(max);
        self
    }

    pub fn cast_type(mut self, logical: LogicalType, template: &'static str) -> Self {
        self.cast_types.insert(logical, template);
        self
    }

    /// Add a type-mapping override. Rules of one overlay are checked in the
    /// order they were added.
    pub fn type_rule(mut self, rule: TypeRule) -> Self {
        self.type_rules.push(rule);
        self
    }

    /// Add an impersonation rule, checked during identity refinement.
    pub fn impersonation(mut self, rule: ImpersonationRule) -> Self {
        self.impersonations.push(rule);
        self
    }
}
