//! LucidDB and SQLstream, which is built on it.

use crate::core::{Capability, DescriptorSpec, FactoryEntry, Overlay, RegistryBuilder};
use crate::typemap::LogicalType;

use super::ansi;

fn luciddb() -> Overlay {
    Overlay::new("luciddb")
        .set(Capability::SupportsValuesList, true)
        .set(Capability::RequiresAliasForFromQuery, true)
        .set(Capability::RequiresExponentLiteral, true)
        .set(Capability::AllowsMultipleDistinctMeasures, false)
        .set(Capability::SupportsUnlimitedValueList, true)
        .set(Capability::SupportsMultiValueInExpr, true)
        .cast_type(LogicalType::Double, "DOUBLE")
}

/// Inherits everything else, including the distinct-measure restriction.
fn sqlstream() -> Overlay {
    Overlay::new("sqlstream").set(Capability::SupportsUnlimitedValueList, false)
}

pub(crate) fn register(builder: &mut RegistryBuilder) {
    builder
        .spec(DescriptorSpec::new("luciddb", ansi::TAG, luciddb()))
        .spec(DescriptorSpec::new("sqlstream", "luciddb", sqlstream()));

    builder
        .entry(FactoryEntry::new("sqlstream").contains("sqlstream"))
        .entry(FactoryEntry::new("luciddb").contains("luciddb"));
}
