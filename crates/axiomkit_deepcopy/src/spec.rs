//! Deep copy specification models and top-level error types.

use crate::kind::EnumCopyKind;

////////////////////////////////////////////////////////////////////////////////
// #region EnumsInit

/// Handling policy for values that wrap a live runtime resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumOpaqueHandleStrategy {
    /// Return the same handle (channel endpoint, function pointer) in the copy.
    Passthrough,
    /// Fail the copy with [`DeepCopyError::UnsupportedKind`].
    Reject,
}

/// Handling policy for raw, unmanaged memory addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumRawAddressStrategy {
    /// Keep the same bit pattern; the pointee is never dereferenced.
    Passthrough,
    /// Fail the copy with [`DeepCopyError::UnsupportedKind`].
    Reject,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region StructsAndErrors

/// Input options for [`crate::deep_copy_with_options`] and friends.
#[derive(Debug, Clone)]
pub struct SpecDeepCopyOptions {
    /// Policy for channels, function pointers and [`crate::Opaque`] values.
    pub rule_opaque_handle: EnumOpaqueHandleStrategy,
    /// Policy for `*const T`, `*mut T` and `NonNull<T>`.
    pub rule_raw_address: EnumRawAddressStrategy,
    /// Optional maximum nesting depth of composite/reference values.
    pub depth_limit: Option<usize>,
    /// Maximum worker threads for [`crate::deep_copy_batch`].
    pub num_workers_max: Option<usize>,
}

impl Default for SpecDeepCopyOptions {
    fn default() -> Self {
        Self {
            rule_opaque_handle: EnumOpaqueHandleStrategy::Passthrough,
            rule_raw_address: EnumRawAddressStrategy::Passthrough,
            depth_limit: None,
            num_workers_max: None,
        }
    }
}

impl SpecDeepCopyOptions {
    /// Reject option combinations that can never produce a copy.
    pub fn validate(&self) -> Result<(), DeepCopyError> {
        if self.depth_limit == Some(0) {
            return Err(DeepCopyError::InvalidDepthLimit(
                "Arg `depth_limit` must be >= 1 or None.".to_string(),
            ));
        }
        Ok(())
    }
}

/// Failure of one top-level copy call. No partial result is ever returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeepCopyError {
    /// No safe copy strategy exists for this value, or policy rejected it.
    #[error("unsupported {kind} value of type `{type_name}`")]
    UnsupportedKind {
        /// Rust type name of the offending value.
        type_name: &'static str,
        /// Kind the value was classified as.
        kind: EnumCopyKind,
    },
    /// Nesting exceeded [`SpecDeepCopyOptions::depth_limit`].
    #[error("copy depth exceeded limit of {depth_limit}")]
    DepthLimitExceeded {
        /// Configured limit.
        depth_limit: usize,
    },
    /// An interior-mutable source value is exclusively held by someone else.
    #[error("source `{type_name}` is exclusively borrowed")]
    BorrowConflict {
        /// Rust type name of the cell that could not be read.
        type_name: &'static str,
    },
    /// Invalid depth option.
    #[error("{0}")]
    InvalidDepthLimit(String),
}

impl DeepCopyError {
    pub(crate) fn unsupported<T: ?Sized>(kind: EnumCopyKind) -> Self {
        Self::UnsupportedKind {
            type_name: std::any::type_name::<T>(),
            kind,
        }
    }

    pub(crate) fn borrow_conflict<T: ?Sized>() -> Self {
        Self::BorrowConflict {
            type_name: std::any::type_name::<T>(),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_reject_zero_depth_limit() {
        let spec_options = SpecDeepCopyOptions {
            depth_limit: Some(0),
            ..SpecDeepCopyOptions::default()
        };
        let err = spec_options.validate().expect_err("zero depth must fail");
        assert!(matches!(err, DeepCopyError::InvalidDepthLimit(_)));
        assert!(SpecDeepCopyOptions::default().validate().is_ok());
    }

    #[test]
    fn unsupported_kind_message_names_type_and_kind() {
        let err = DeepCopyError::unsupported::<std::sync::mpsc::Receiver<u8>>(
            EnumCopyKind::OpaqueHandle,
        );
        let txt = err.to_string();
        assert!(txt.starts_with("unsupported opaque_handle value of type"));
        assert!(txt.contains("Receiver<u8>"));
    }
}
