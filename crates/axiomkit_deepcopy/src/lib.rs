//! `axiomkit_deepcopy` v1:
//! Rust-side deep copy engine for in-memory value graphs.
//!
//! Architecture:
//! - `copy`    : traversal engine and top-level entry points
//! - `builder` : per-type value construction (`DeepCopy` impls)
//! - `kind`    : structural kind classification
//! - `tracker` : identity tracking for shared allocations
//! - `spec`    : enums/options/errors
//! - `report`  : run-time report model
//! - `util`    : shared helper functions
#![deny(unsafe_op_in_unsafe_fn)]

pub mod builder;
pub mod copy;
pub mod kind;
pub mod report;
pub mod spec;
pub mod tracker;
mod util;

pub use builder::{DeepCopy, DynDeepCopy, Opaque};
pub use copy::{
    CopyContext, deep_copy, deep_copy_any, deep_copy_batch, deep_copy_with_options,
    deep_copy_with_report,
};
pub use kind::{EnumCopyKind, classify};
pub use report::{ReportDeepCopy, ReportDeepCopyBuilder};
pub use spec::{
    DeepCopyError, EnumOpaqueHandleStrategy, EnumRawAddressStrategy, SpecDeepCopyOptions,
};
pub use tracker::{IdentityKey, IdentityTracker};
