//! Structural kind classification.

use std::fmt;

use crate::builder::DeepCopy;

/// Structural category that selects the copy strategy for a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumCopyKind {
    /// Numbers, booleans, characters and other plain values.
    Scalar,
    /// Immutable character data. Copied into fresh storage every time.
    Text,
    /// Fixed-size sequence embedded by value (`[T; N]`).
    FixedAggregate,
    /// Growable sequence with its own backing store.
    DynamicAggregate,
    /// Key -> value mapping or set.
    KeyedAggregate,
    /// Fixed named or positional fields.
    Record,
    /// Single-target indirection, possibly shared.
    Reference,
    /// Live runtime resource that cannot be duplicated.
    OpaqueHandle,
    /// Raw memory address that must never be dereferenced.
    Unrepresentable,
}

impl EnumCopyKind {
    /// Leaves are copied without recursion and without tracker interaction.
    pub fn is_leaf(self) -> bool {
        matches!(
            self,
            Self::Scalar | Self::Text | Self::OpaqueHandle | Self::Unrepresentable
        )
    }

    /// Aggregates and records hold children copied by value.
    pub fn is_composite(self) -> bool {
        matches!(
            self,
            Self::FixedAggregate | Self::DynamicAggregate | Self::KeyedAggregate | Self::Record
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::Text => "text",
            Self::FixedAggregate => "fixed_aggregate",
            Self::DynamicAggregate => "dynamic_aggregate",
            Self::KeyedAggregate => "keyed_aggregate",
            Self::Record => "record",
            Self::Reference => "reference",
            Self::OpaqueHandle => "opaque_handle",
            Self::Unrepresentable => "unrepresentable",
        }
    }
}

impl fmt::Display for EnumCopyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a value. Depends only on its type.
pub fn classify<T: DeepCopy>(_value: &T) -> EnumCopyKind {
    T::KIND
}
