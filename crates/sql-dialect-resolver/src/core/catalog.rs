//! Dialect registry for explicit, deterministic resolution.
//!
//! The [`DialectRegistry`] is built once from descriptor specs and factory
//! entries, validated up front, and never mutated afterwards. There is no
//! global state: callers construct a registry (usually with
//! [`DialectRegistry::with_builtins`]) and pass it to whatever needs it.
//!
//! Resolution walks the factory entries in registration order and uses the
//! first one whose predicate accepts the connection identity. More specific
//! entries (e.g. MariaDB) must therefore be registered before the generic
//! entry of their family (MySQL).

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::compose::{compose, Composition};
use super::descriptor::CapabilityDescriptor;
use super::identity::{ConnectionIdentity, ProductVersion};
use super::overlay::Overlay;
use super::probe::MetadataProbe;
use super::refine::{self, ImpersonationRule};
use crate::error::{DialectError, Result};

/// A declarative test against the reported product name.
///
/// All comparisons are case-insensitive and ignore surrounding whitespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductPattern {
    Equals(&'static str),
    StartsWith(&'static str),
    Contains(&'static str),
}

impl ProductPattern {
    pub fn matches(&self, product_name: &str) -> bool {
        let name = product_name.trim().to_lowercase();
        match self {
            ProductPattern::Equals(p) => name == p.to_lowercase(),
            ProductPattern::StartsWith(p) => name.starts_with(&p.to_lowercase()),
            ProductPattern::Contains(p) => name.contains(&p.to_lowercase()),
        }
    }
}

impl fmt::Display for ProductPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductPattern::Equals(p) => write!(f, "= {:?}", p),
            ProductPattern::StartsWith(p) => write!(f, "^ {:?}", p),
            ProductPattern::Contains(p) => write!(f, "~ {:?}", p),
        }
    }
}

/// Extra predicate over the full identity, checked after a pattern matched.
pub type Guard = fn(&ConnectionIdentity) -> bool;

/// Builds a descriptor for one identity.
pub type DescriptorBuilder = Arc<dyn Fn(&ConnectionIdentity) -> CapabilityDescriptor + Send + Sync>;

/// A registered factory: which identities it accepts, and the tag it builds.
#[derive(Debug, Clone)]
pub struct FactoryEntry {
    pub tag: &'static str,
    pub patterns: Vec<ProductPattern>,
    pub guard: Option<Guard>,
}

impl FactoryEntry {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            patterns: Vec::new(),
            guard: None,
        }
    }

    pub fn equals(mut self, name: &'static str) -> Self {
        self.patterns.push(ProductPattern::Equals(name));
        self
    }

    pub fn starts_with(mut self, prefix: &'static str) -> Self {
        self.patterns.push(ProductPattern::StartsWith(prefix));
        self
    }

    pub fn contains(mut self, needle: &'static str) -> Self {
        self.patterns.push(ProductPattern::Contains(needle));
        self
    }

    pub fn guarded(mut self, guard: Guard) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Whether this entry accepts `identity`: any pattern matches the product
    /// name, and the guard (if any) holds.
    pub fn matches(&self, identity: &ConnectionIdentity) -> bool {
        self.patterns
            .iter()
            .any(|p| p.matches(&identity.product_name))
            && self.guard.map_or(true, |guard| guard(identity))
    }
}

/// An overlay applied only when the product version is below `below`.
#[derive(Debug, Clone)]
pub struct VersionGate {
    pub below: ProductVersion,
    pub overlay: Overlay,
}

/// How to compose the descriptor for one tag.
#[derive(Debug, Clone)]
pub struct DescriptorSpec {
    pub tag: &'static str,
    /// Tag of the spec this one overlays; `None` for a root.
    pub base: Option<&'static str>,
    pub overlay: Overlay,
    /// Gates of this spec only; gates are not inherited by specs built on
    /// top of it.
    pub version_gates: Vec<VersionGate>,
}

impl DescriptorSpec {
    pub fn root(tag: &'static str, overlay: Overlay) -> Self {
        Self {
            tag,
            base: None,
            overlay,
            version_gates: Vec::new(),
        }
    }

    pub fn new(tag: &'static str, base: &'static str, overlay: Overlay) -> Self {
        Self {
            tag,
            base: Some(base),
            overlay,
            version_gates: Vec::new(),
        }
    }

    /// Apply `overlay` when the product version is below `below`. When
    /// several gates apply, the one with the lowest threshold wins.
    pub fn gate(mut self, below: ProductVersion, overlay: Overlay) -> Self {
        self.version_gates.push(VersionGate { below, overlay });
        self
    }
}

/// Collects specs and entries, then validates them into a [`DialectRegistry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    specs: Vec<DescriptorSpec>,
    entries: Vec<FactoryEntry>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spec(&mut self, spec: DescriptorSpec) -> &mut Self {
        self.specs.push(spec);
        self
    }

    /// Append a factory entry. Entries are tried in the order added.
    pub fn entry(&mut self, entry: FactoryEntry) -> &mut Self {
        self.entries.push(entry);
        self
    }

    /// Validate everything and freeze the registry.
    ///
    /// Fails with [`DialectError::CapabilityValidation`] on duplicate or
    /// non-canonical tags, unknown bases, inheritance cycles, flags or
    /// behaviors no overlay defines, conflicting flags (for every version
    /// gate combination), entries without patterns or spec, and impersonation
    /// rules naming an unregistered tag.
    pub fn build(self) -> Result<DialectRegistry> {
        let RegistryBuilder {
            mut specs,
            entries,
        } = self;

        let mut spec_index = HashMap::new();
        for (i, spec) in specs.iter_mut().enumerate() {
            check_tag(spec.tag)?;
            if spec_index.insert(spec.tag, i).is_some() {
                return Err(DialectError::validation(spec.tag, "duplicate descriptor tag"));
            }
            spec.version_gates.sort_by_key(|g| g.below);
            if spec
                .version_gates
                .windows(2)
                .any(|w| w[0].below == w[1].below)
            {
                return Err(DialectError::validation(
                    spec.tag,
                    "two version gates share a threshold",
                ));
            }
        }

        let mut builders = HashMap::new();
        for spec in &specs {
            let lineage = lineage(&specs, &spec_index, spec.tag)?;
            let compositions = compose_gated(&specs, &lineage)?;
            for composition in &compositions {
                for rule in &composition.impersonations {
                    if !spec_index.contains_key(rule.detected) {
                        return Err(DialectError::validation(
                            spec.tag,
                            format!(
                                "impersonation rule names unregistered dialect '{}'",
                                rule.detected
                            ),
                        ));
                    }
                }
            }
            let thresholds: Vec<ProductVersion> =
                spec.version_gates.iter().map(|g| g.below).collect();
            builders.insert(spec.tag, make_builder(spec.tag, thresholds, compositions));
        }

        let mut seen = HashSet::new();
        for entry in &entries {
            check_tag(entry.tag)?;
            if !seen.insert(entry.tag) {
                return Err(DialectError::validation(entry.tag, "duplicate factory entry"));
            }
            if entry.patterns.is_empty() {
                return Err(DialectError::validation(
                    entry.tag,
                    "factory entry has no product patterns",
                ));
            }
            if !spec_index.contains_key(entry.tag) {
                return Err(DialectError::validation(
                    entry.tag,
                    "factory entry has no descriptor spec",
                ));
            }
        }

        debug!(
            specs = specs.len(),
            entries = entries.len(),
            "dialect registry built"
        );

        Ok(DialectRegistry {
            specs,
            spec_index,
            builders,
            entries,
        })
    }
}

fn check_tag(tag: &str) -> Result<()> {
    if tag.is_empty() || tag != tag.trim() || tag.chars().any(|c| c.is_uppercase()) {
        return Err(DialectError::validation(
            tag,
            "tags must be non-empty, lowercase and unpadded",
        ));
    }
    Ok(())
}

/// Spec indices from the root down to `tag`.
fn lineage(
    specs: &[DescriptorSpec],
    index: &HashMap<&'static str, usize>,
    tag: &'static str,
) -> Result<Vec<usize>> {
    let mut chain = Vec::new();
    let mut visited = HashSet::new();
    let mut current = Some(tag);

    while let Some(t) = current {
        if !visited.insert(t) {
            return Err(DialectError::validation(
                tag,
                format!("inheritance cycle through '{}'", t),
            ));
        }
        let i = *index.get(t).ok_or_else(|| {
            DialectError::validation(tag, format!("unknown base dialect '{}'", t))
        })?;
        chain.push(i);
        current = specs[i].base;
    }

    chain.reverse();
    Ok(chain)
}

/// One composition per gate suffix: element `k` applies gates `k..`, the
/// last element applies none. Gates are layered highest threshold first so
/// the lowest applicable threshold wins.
fn compose_gated(specs: &[DescriptorSpec], lineage: &[usize]) -> Result<Vec<Arc<Composition>>> {
    let own = lineage
        .last()
        .map(|&i| &specs[i])
        .ok_or_else(|| DialectError::validation("", "empty lineage"))?;
    let base: Vec<&Overlay> = lineage.iter().map(|&i| &specs[i].overlay).collect();
    let gates = &own.version_gates;

    (0..=gates.len())
        .map(|k| {
            let mut layers = base.clone();
            layers.extend(gates[k..].iter().rev().map(|g| &g.overlay));
            compose(own.tag, &layers).map(Arc::new)
        })
        .collect()
}

fn make_builder(
    tag: &'static str,
    thresholds: Vec<ProductVersion>,
    compositions: Vec<Arc<Composition>>,
) -> DescriptorBuilder {
    Arc::new(move |identity: &ConnectionIdentity| {
        let ungated = thresholds.len();
        let k = match identity.version() {
            Some(v) => thresholds.iter().position(|t| v < *t).unwrap_or(ungated),
            None => {
                if !thresholds.is_empty() && !identity.product_version.trim().is_empty() {
                    warn!(
                        dialect = tag,
                        version = %identity.product_version,
                        "unparsable product version; no version gates applied"
                    );
                }
                ungated
            }
        };
        CapabilityDescriptor::new(tag, identity, Arc::clone(&compositions[k]))
    })
}

/// Immutable registry of descriptor specs and factory entries.
pub struct DialectRegistry {
    specs: Vec<DescriptorSpec>,
    spec_index: HashMap<&'static str, usize>,
    builders: HashMap<&'static str, DescriptorBuilder>,
    entries: Vec<FactoryEntry>,
}

impl DialectRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Resolve `identity`, refining only from its metadata snapshot.
    pub fn resolve(&self, identity: &ConnectionIdentity) -> Result<Arc<CapabilityDescriptor>> {
        let descriptor = self.match_identity(identity)?;
        let rules = pending_rules(&descriptor);
        match refine::detect_from_snapshot(&rules, identity) {
            Some(rule) => self.retag(descriptor, rule, identity),
            None => Ok(Arc::new(descriptor)),
        }
    }

    /// Resolve `identity`, probing the live connection for refinement
    /// answers the snapshot lacks. Probe failures surface as
    /// [`DialectError::Connection`] and are not retried.
    pub async fn resolve_connection(
        &self,
        identity: &ConnectionIdentity,
        probe: &dyn MetadataProbe,
    ) -> Result<Arc<CapabilityDescriptor>> {
        let descriptor = self.match_identity(identity)?;
        let rules = pending_rules(&descriptor);
        match refine::detect_with_probe(&rules, identity, probe).await? {
            Some(rule) => self.retag(descriptor, rule, identity),
            None => Ok(Arc::new(descriptor)),
        }
    }

    /// Resolve `identity` by predicate only, skipping refinement.
    pub fn resolve_unrefined(
        &self,
        identity: &ConnectionIdentity,
    ) -> Result<Arc<CapabilityDescriptor>> {
        self.match_identity(identity).map(Arc::new)
    }

    /// Build the descriptor registered under `tag`, bypassing predicates and
    /// refinement.
    pub fn resolve_tag(
        &self,
        tag: &str,
        identity: &ConnectionIdentity,
    ) -> Result<Arc<CapabilityDescriptor>> {
        let builder = self.builders.get(tag).ok_or_else(|| {
            DialectError::unsupported(
                format!("{} (forced)", tag),
                identity.product_version.clone(),
            )
        })?;
        debug!(dialect = tag, "building forced dialect");
        Ok(Arc::new(builder(identity)))
    }

    /// Factory entry tags in registration order.
    pub fn tags(&self) -> Vec<&'static str> {
        self.entries.iter().map(|e| e.tag).collect()
    }

    /// Every descriptor spec tag, including ones without a factory entry.
    pub fn spec_tags(&self) -> Vec<&'static str> {
        self.specs.iter().map(|s| s.tag).collect()
    }

    pub fn entries(&self) -> &[FactoryEntry] {
        &self.entries
    }

    pub fn entry(&self, tag: &str) -> Option<&FactoryEntry> {
        self.entries.iter().find(|e| e.tag == tag)
    }

    pub fn spec(&self, tag: &str) -> Option<&DescriptorSpec> {
        self.spec_index.get(tag).map(|&i| &self.specs[i])
    }

    /// Check if a descriptor is registered under `tag`.
    pub fn has_dialect(&self, tag: &str) -> bool {
        self.spec_index.contains_key(tag)
    }

    fn match_identity(&self, identity: &ConnectionIdentity) -> Result<CapabilityDescriptor> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.matches(identity))
            .ok_or_else(|| {
                DialectError::unsupported(
                    identity.product_name.clone(),
                    identity.product_version.clone(),
                )
            })?;

        debug!(
            dialect = entry.tag,
            product = %identity.product_name,
            version = %identity.product_version,
            "matched factory entry"
        );

        let builder = self.builders.get(entry.tag).ok_or_else(|| {
            DialectError::validation(entry.tag, "factory entry has no descriptor spec")
        })?;
        Ok(builder(identity))
    }

    fn retag(
        &self,
        original: CapabilityDescriptor,
        rule: &ImpersonationRule,
        identity: &ConnectionIdentity,
    ) -> Result<Arc<CapabilityDescriptor>> {
        let builder = self.builders.get(rule.detected).ok_or_else(|| {
            DialectError::validation(rule.detected, "impersonation target is not registered")
        })?;
        info!(
            matched = original.identity_tag(),
            detected = rule.detected,
            probe = %rule.probe,
            "refined connection identity"
        );
        Ok(Arc::new(
            builder(identity).impersonating(original.identity_tag()),
        ))
    }
}

/// Rules that would re-tag `descriptor` to a different engine.
fn pending_rules(descriptor: &CapabilityDescriptor) -> Vec<ImpersonationRule> {
    descriptor
        .impersonation_rules()
        .iter()
        .filter(|r| r.detected != descriptor.identity_tag())
        .cloned()
        .collect()
}

impl fmt::Debug for DialectRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialectRegistry")
            .field("specs", &self.spec_tags())
            .field("entries", &self.tags())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::capability::Capability;
    use crate::core::probe::ProbeQuery;
    use crate::dialects::ansi;

    fn base_builder() -> RegistryBuilder {
        let mut builder = RegistryBuilder::new();
        builder.spec(DescriptorSpec::root("ansi", ansi::overlay()));
        builder
    }

    fn validation_message(result: Result<DialectRegistry>) -> String {
        match result {
            Err(DialectError::CapabilityValidation { message, .. }) => message,
            other => panic!("expected validation error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_product_patterns() {
        assert!(ProductPattern::Equals("h2").matches(" H2 "));
        assert!(!ProductPattern::Equals("h2").matches("H2 Database"));
        assert!(ProductPattern::StartsWith("db2").matches("DB2/NT64"));
        assert!(!ProductPattern::StartsWith("db2").matches("IBM DB2"));
        assert!(ProductPattern::Contains("sql server").matches("Microsoft SQL Server"));
    }

    #[test]
    fn test_first_matching_entry_wins() {
        let mut builder = base_builder();
        builder
            .spec(DescriptorSpec::new("specific", "ansi", Overlay::new("specific")))
            .spec(DescriptorSpec::new("generic", "ansi", Overlay::new("generic")))
            .entry(FactoryEntry::new("specific").contains("engine x"))
            .entry(FactoryEntry::new("generic").contains("engine"));
        let registry = builder.build().unwrap();

        let x = ConnectionIdentity::new("Engine X", "1.0");
        let y = ConnectionIdentity::new("Engine Y", "1.0");
        assert_eq!(registry.resolve(&x).unwrap().identity_tag(), "specific");
        assert_eq!(registry.resolve(&y).unwrap().identity_tag(), "generic");
        assert_eq!(registry.tags(), vec!["specific", "generic"]);
    }

    #[test]
    fn test_guard_rejects_after_pattern_match() {
        fn never(_: &ConnectionIdentity) -> bool {
            false
        }
        let mut builder = base_builder();
        builder
            .spec(DescriptorSpec::new("guarded", "ansi", Overlay::new("guarded")))
            .entry(FactoryEntry::new("guarded").contains("engine").guarded(never));
        let registry = builder.build().unwrap();

        let err = registry
            .resolve(&ConnectionIdentity::new("Engine", "1"))
            .unwrap_err();
        assert!(matches!(err, DialectError::UnsupportedDialect { .. }));
    }

    #[test]
    fn test_duplicate_tag_rejected() {
        let mut builder = base_builder();
        builder.spec(DescriptorSpec::root("ansi", ansi::overlay()));
        assert!(validation_message(builder.build()).contains("duplicate"));
    }

    #[test]
    fn test_non_canonical_tag_rejected() {
        let mut builder = base_builder();
        builder.spec(DescriptorSpec::new("MySQL", "ansi", Overlay::new("MySQL")));
        assert!(validation_message(builder.build()).contains("lowercase"));
    }

    #[test]
    fn test_unknown_base_rejected() {
        let mut builder = base_builder();
        builder.spec(DescriptorSpec::new("orphan", "nowhere", Overlay::new("orphan")));
        assert!(validation_message(builder.build()).contains("unknown base"));
    }

    #[test]
    fn test_cycle_rejected() {
        let mut builder = base_builder();
        builder
            .spec(DescriptorSpec::new("a", "b", Overlay::new("a")))
            .spec(DescriptorSpec::new("b", "a", Overlay::new("b")));
        assert!(validation_message(builder.build()).contains("cycle"));
    }

    #[test]
    fn test_root_must_define_everything() {
        let mut builder = RegistryBuilder::new();
        builder.spec(DescriptorSpec::root(
            "thin",
            Overlay::new("thin").set(Capability::AllowsAs, true),
        ));
        assert!(validation_message(builder.build()).contains("defines"));
    }

    #[test]
    fn test_conflicting_flags_rejected_in_gates() {
        let mut builder = base_builder();
        builder.spec(
            DescriptorSpec::new("gated", "ansi", Overlay::new("gated")).gate(
                ProductVersion::new(2, 0),
                Overlay::new("gated<2").set(Capability::AllowsFromQuery, false).set(
                    Capability::RequiresAliasForFromQuery,
                    true,
                ),
            ),
        );
        assert!(validation_message(builder.build()).contains("allows_from_query"));
    }

    #[test]
    fn test_impersonation_target_must_exist() {
        let mut builder = base_builder();
        builder.spec(DescriptorSpec::new(
            "host",
            "ansi",
            Overlay::new("host").impersonation(ImpersonationRule::new(
                ProbeQuery::VersionBanner,
                "Ghost",
                "ghost",
            )),
        ));
        assert!(validation_message(builder.build()).contains("ghost"));
    }

    #[test]
    fn test_entry_needs_patterns_and_spec() {
        let mut builder = base_builder();
        builder.entry(FactoryEntry::new("ansi"));
        assert!(validation_message(builder.build()).contains("no product patterns"));

        let mut builder = base_builder();
        builder.entry(FactoryEntry::new("missing").equals("missing"));
        assert!(validation_message(builder.build()).contains("no descriptor spec"));
    }

    #[test]
    fn test_lowest_applicable_gate_wins() {
        let mut builder = base_builder();
        builder
            .spec(
                DescriptorSpec::new("engine", "ansi", Overlay::new("engine"))
                    .gate(
                        ProductVersion::new(3, 0),
                        Overlay::new("engine<3").max_value_list(Some(300)),
                    )
                    .gate(
                        ProductVersion::new(2, 0),
                        Overlay::new("engine<2").max_value_list(Some(200)),
                    ),
            )
            .entry(FactoryEntry::new("engine").equals("engine"));
        let registry = builder.build().unwrap();

        let at = |v: &str| {
            registry
                .resolve(&ConnectionIdentity::new("Engine", v))
                .unwrap()
                .max_value_list_len()
        };
        assert_eq!(at("1.5"), Some(200));
        assert_eq!(at("2.1"), Some(300));
        assert_eq!(at("3.0"), None);
        assert_eq!(at("n/a"), None);
    }

    #[test]
    fn test_descriptors_are_independent_per_call() {
        let mut builder = base_builder();
        builder
            .spec(DescriptorSpec::new("engine", "ansi", Overlay::new("engine")))
            .entry(FactoryEntry::new("engine").equals("engine"));
        let registry = builder.build().unwrap();

        let a = registry.resolve(&ConnectionIdentity::new("engine", "1.0")).unwrap();
        let b = registry.resolve(&ConnectionIdentity::new("engine", "2.0")).unwrap();
        assert_eq!(a.product_version(), "1.0");
        assert_eq!(b.product_version(), "2.0");
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_registry_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DialectRegistry>();
        assert_send_sync::<CapabilityDescriptor>();
    }
}
