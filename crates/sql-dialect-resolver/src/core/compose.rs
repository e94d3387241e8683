//! Folding an overlay chain into fully resolved flags and behaviors.

use std::collections::BTreeMap;

use super::capability::{Capability, CapabilitySet};
use super::overlay::{Behavior, Behaviors, Overlay};
use super::refine::ImpersonationRule;
use crate::error::{DialectError, Result};
use crate::typemap::{LogicalType, TypeRule};

/// Pairs of flags where the first being true requires the second to be true.
pub const IMPLIED_FLAGS: [(Capability, Capability); 4] = [
    (Capability::RequiresOrderByAlias, Capability::AllowsOrderByAlias),
    (Capability::RequiresAliasForFromQuery, Capability::AllowsFromQuery),
    (Capability::AllowsMultipleCountDistinct, Capability::AllowsCountDistinct),
    (Capability::AllowsCompoundCountDistinct, Capability::AllowsCountDistinct),
];

/// The result of applying a chain of overlays, root first.
#[derive(Debug, Clone)]
pub(crate) struct Composition {
    pub chain: Vec<&'static str>,
    pub flags: CapabilitySet,
    pub flag_origin: [&'static str; Capability::COUNT],
    pub behaviors: Behaviors,
    pub behavior_origin: BTreeMap<Behavior, &'static str>,
    /// Nearest overlay's rules first.
    pub type_rules: Vec<TypeRule>,
    /// Nearest overlay's rules first.
    pub impersonations: Vec<ImpersonationRule>,
}

/// Tracks the winning value of one slot and the overlay that set it.
struct Slot<T> {
    value: Option<(T, &'static str)>,
}

impl<T: Copy> Slot<T> {
    fn new() -> Self {
        Self { value: None }
    }

    fn apply(&mut self, value: Option<T>, origin: &'static str) {
        if let Some(v) = value {
            self.value = Some((v, origin));
        }
    }

    fn finish(
        self,
        tag: &str,
        behavior: Behavior,
        origins: &mut BTreeMap<Behavior, &'static str>,
    ) -> Result<T> {
        let (value, origin) = self.value.ok_or_else(|| {
            DialectError::validation(
                tag,
                format!("no overlay in the chain defines {}", behavior),
            )
        })?;
        origins.insert(behavior, origin);
        Ok(value)
    }
}

/// Compose `layers` (root first) into a [`Composition`].
///
/// Fails when any flag or behavior is left undefined by every layer, or when
/// the composed flags violate [`IMPLIED_FLAGS`].
pub(crate) fn compose(tag: &str, layers: &[&Overlay]) -> Result<Composition> {
    let mut flags: [Option<(bool, &'static str)>; Capability::COUNT] =
        [None; Capability::COUNT];
    let mut quote_style = Slot::new();
    let mut dummy_table = Slot::new();
    let mut string_literal = Slot::new();
    let mut boolean_literal = Slot::new();
    let mut temporal_literal = Slot::new();
    let mut null_cast = Slot::new();
    let mut nulls_ordering = Slot::new();
    let mut max_value_list = Slot::new();
    let mut cast_types: BTreeMap<LogicalType, (&'static str, &'static str)> = BTreeMap::new();
    let mut temporal_overrides = BTreeMap::new();

    for layer in layers {
        for (capability, value) in &layer.flags {
            flags[capability.index()] = Some((*value, layer.name));
        }
        quote_style.apply(layer.quote_style, layer.name);
        dummy_table.apply(layer.dummy_table, layer.name);
        string_literal.apply(layer.string_literal, layer.name);
        boolean_literal.apply(layer.boolean_literal, layer.name);
        temporal_literal.apply(layer.temporal_literal, layer.name);
        null_cast.apply(layer.null_cast, layer.name);
        nulls_ordering.apply(layer.nulls_ordering, layer.name);
        max_value_list.apply(layer.max_value_list, layer.name);
        for (logical, template) in &layer.cast_types {
            cast_types.insert(*logical, (*template, layer.name));
        }
        for (logical, style) in &layer.temporal_overrides {
            temporal_overrides.insert(*logical, (*style, layer.name));
        }
    }

    let mut values = [false; Capability::COUNT];
    let mut flag_origin = [""; Capability::COUNT];
    for capability in Capability::ALL {
        let (value, origin) = flags[capability.index()].ok_or_else(|| {
            DialectError::validation(
                tag,
                format!("no overlay in the chain defines flag {}", capability),
            )
        })?;
        values[capability.index()] = value;
        flag_origin[capability.index()] = origin;
    }

    let mut behavior_origin = BTreeMap::new();
    let mut casts = BTreeMap::new();
    for logical in LogicalType::ALL {
        let (template, origin) = cast_types.get(&logical).copied().ok_or_else(|| {
            DialectError::validation(
                tag,
                format!("no overlay in the chain defines {}", Behavior::CastType(logical)),
            )
        })?;
        casts.insert(logical, template);
        behavior_origin.insert(Behavior::CastType(logical), origin);
    }

    let mut temporal_styles = BTreeMap::new();
    for (logical, (style, origin)) in temporal_overrides {
        temporal_styles.insert(logical, style);
        behavior_origin.insert(Behavior::TemporalLiteralFor(logical), origin);
    }

    let behaviors = Behaviors {
        quote_style: quote_style.finish(tag, Behavior::QuoteStyle, &mut behavior_origin)?,
        dummy_table: dummy_table.finish(tag, Behavior::DummyTable, &mut behavior_origin)?,
        string_literal: string_literal.finish(
            tag,
            Behavior::StringLiteral,
            &mut behavior_origin,
        )?,
        boolean_literal: boolean_literal.finish(
            tag,
            Behavior::BooleanLiteral,
            &mut behavior_origin,
        )?,
        temporal_literal: temporal_literal.finish(
            tag,
            Behavior::TemporalLiteral,
            &mut behavior_origin,
        )?,
        temporal_overrides: temporal_styles,
        null_cast: null_cast.finish(tag, Behavior::NullCast, &mut behavior_origin)?,
        nulls_ordering: nulls_ordering.finish(
            tag,
            Behavior::NullsOrdering,
            &mut behavior_origin,
        )?,
        max_value_list: max_value_list.finish(
            tag,
            Behavior::MaxValueList,
            &mut behavior_origin,
        )?,
        cast_types: casts,
    };

    let flags = CapabilitySet::from_values(values);
    check_implied_flags(tag, &flags)?;

    Ok(Composition {
        chain: layers.iter().map(|l| l.name).collect(),
        flags,
        flag_origin,
        behaviors,
        behavior_origin,
        type_rules: layers
            .iter()
            .rev()
            .flat_map(|l| l.type_rules.iter().copied())
            .collect(),
        impersonations: layers
            .iter()
            .rev()
            .flat_map(|l| l.impersonations.iter().cloned())
            .collect(),
    })
}

fn check_implied_flags(tag: &str, flags: &CapabilitySet) -> Result<()> {
    for (requires, implied) in IMPLIED_FLAGS {
        if flags.get(requires) && !flags.get(implied) {
            return Err(DialectError::validation(
                tag,
                format!("{} is set but {} is not", requires, implied),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::overlay::{
        BooleanLiteral, NullsOrdering, QuoteStyle, StringLiteralStyle, TemporalLiteral,
    };
    use crate::typemap::SqlTypeCode;

    fn root() -> Overlay {
        let mut overlay = Overlay::new("root")
            .quote_style(QuoteStyle::DoubleQuote)
            .dummy_table(None)
            .string_literal(StringLiteralStyle::STANDARD)
            .boolean_literal(BooleanLiteral::Keyword)
            .temporal_literal(TemporalLiteral::Typed)
            .null_cast(None)
            .nulls_ordering(NullsOrdering::Ansi)
            .max_value_list(None);
        for c in Capability::ALL {
            overlay = overlay.set(c, !c.name().starts_with("requires"));
        }
        for t in LogicalType::ALL {
            overlay = overlay.cast_type(t, "VARCHAR({len})");
        }
        overlay
    }

    #[test]
    fn test_nearest_overlay_wins() {
        let root = root();
        let middle = Overlay::new("middle")
            .set(Capability::AllowsAs, false)
            .quote_style(QuoteStyle::Backtick);
        let leaf = Overlay::new("leaf").set(Capability::AllowsAs, true);

        let c = compose("leaf", &[&root, &middle, &leaf]).unwrap();
        assert_eq!(c.chain, vec!["root", "middle", "leaf"]);
        assert!(c.flags.get(Capability::AllowsAs));
        assert_eq!(c.flag_origin[Capability::AllowsAs.index()], "leaf");
        assert_eq!(c.behaviors.quote_style, QuoteStyle::Backtick);
        assert_eq!(c.behavior_origin[&Behavior::QuoteStyle], "middle");
        assert_eq!(c.behavior_origin[&Behavior::DummyTable], "root");
    }

    #[test]
    fn test_missing_root_value_is_rejected() {
        let partial = Overlay::new("partial").set(Capability::AllowsAs, true);
        let err = compose("partial", &[&partial]).unwrap_err();
        assert!(matches!(err, DialectError::CapabilityValidation { .. }));
    }

    #[test]
    fn test_implied_flag_violation() {
        let root = root();
        let bad = Overlay::new("bad")
            .set(Capability::RequiresOrderByAlias, true)
            .set(Capability::AllowsOrderByAlias, false);
        let err = compose("bad", &[&root, &bad]).unwrap_err();
        assert!(err.to_string().contains("requires_order_by_alias"));
    }

    #[test]
    fn test_rules_collected_nearest_first() {
        let root = root().type_rule(TypeRule::new(SqlTypeCode::Decimal, LogicalType::Numeric));
        let leaf = Overlay::new("leaf")
            .type_rule(TypeRule::new(SqlTypeCode::Decimal, LogicalType::Object));
        let c = compose("leaf", &[&root, &leaf]).unwrap();
        assert_eq!(c.type_rules[0].logical, LogicalType::Object);
        assert_eq!(c.type_rules[1].logical, LogicalType::Numeric);
    }

    #[test]
    fn test_temporal_override_per_type() {
        let root = root();
        let middle = Overlay::new("middle")
            .temporal_literal_for(LogicalType::Time, TemporalLiteral::Quoted);
        let leaf = Overlay::new("leaf").temporal_literal(TemporalLiteral::Typed);

        let c = compose("leaf", &[&root, &middle, &leaf]).unwrap();
        assert_eq!(c.behaviors.temporal_style(LogicalType::Time), TemporalLiteral::Quoted);
        assert_eq!(c.behaviors.temporal_style(LogicalType::Date), TemporalLiteral::Typed);
        assert_eq!(
            c.behavior_origin[&Behavior::TemporalLiteralFor(LogicalType::Time)],
            "middle"
        );
        assert!(!c
            .behavior_origin
            .contains_key(&Behavior::TemporalLiteralFor(LogicalType::Date)));
    }

    #[test]
    fn test_null_cast_falls_through() {
        let root = root();
        let leaf = Overlay::new("leaf").null_cast(Some("Nullable({type})"));
        let c = compose("leaf", &[&root, &leaf]).unwrap();
        assert_eq!(c.behaviors.null_cast_target("Int32"), "Nullable(Int32)");
        assert_eq!(c.behavior_origin[&Behavior::NullCast], "leaf");

        let c = compose("root", &[&root]).unwrap();
        assert_eq!(c.behaviors.null_cast_target("Int32"), "Int32");
    }
}
