//! Per-type value construction.
//!
//! Every copyable type implements [`DeepCopy`], exposing its kind and how to
//! rebuild itself from children copied through a [`CopyContext`]:
//! - `scalar`    : numbers, booleans and other plain values
//! - `text`      : owned and shared string data
//! - `aggregate` : arrays, sequences, maps and sets
//! - `reference` : boxes, shared pointers and weak pointers
//! - `cell`      : interior-mutable wrappers
//! - `handle`    : channels, function pointers and raw addresses
//! - `record`    : tuples, `Result` and the `deep_copy_record!` macro
//! - `dynamic`   : type-erased values

mod aggregate;
mod cell;
mod dynamic;
mod handle;
mod record;
mod reference;
mod scalar;
mod text;

pub use dynamic::DynDeepCopy;
pub use handle::Opaque;
pub(crate) use reference::SharedAllocation;

use crate::copy::CopyContext;
use crate::kind::EnumCopyKind;
use crate::spec::DeepCopyError;

/// Describe-and-decompose capability required by the traversal engine.
///
/// Implementations must route every child through [`CopyContext::copy`] so that
/// identity tracking, policies and depth accounting apply to it. Use
/// [`crate::deep_copy_record!`] for plain structs.
///
/// # Shells
/// A copied `Rc`/`Arc` returned by [`CopyContext::copy`] may still be a shell:
/// its contents are overwritten in place once its own pointee has been copied.
/// The engine relies on no reference into such a shell being live at that
/// point, so implementations may only store, clone or downgrade copied shared
/// handles. They must not dereference them, and must not keep a `&T` borrowed
/// from one across another call into the context. Values that are hashed or
/// ordered by their container go through [`CopyContext::copy_key`].
pub trait DeepCopy: Sized {
    /// Structural category of every value of this type.
    const KIND: EnumCopyKind;

    /// Build an independent copy of `self`.
    fn deep_copy_in(&self, ctx: &mut CopyContext) -> Result<Self, DeepCopyError>;

    /// Build a placeholder of the same type without copying any children.
    ///
    /// Shells let a shared allocation be registered before its contents exist.
    /// A shell is always overwritten before the copy call returns, so it may
    /// hold empty containers, `None` or shallow handles into the original.
    fn copy_shell(&self) -> Result<Self, DeepCopyError>;
}

/// Implement [`DeepCopy`] for a struct, field by field.
///
/// Expand it in the struct's own module so private fields are reachable.
///
/// ```
/// use axiomkit_deepcopy::{deep_copy, deep_copy_record};
///
/// #[derive(Debug, PartialEq)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
/// deep_copy_record!(Point { x, y });
///
/// #[derive(Debug, PartialEq)]
/// struct Meters(f64);
/// deep_copy_record!(Meters(0));
///
/// #[derive(Debug, PartialEq)]
/// struct Labeled<T> {
///     label: String,
///     value: T,
/// }
/// deep_copy_record!(impl [T: axiomkit_deepcopy::DeepCopy] Labeled<T> { label, value });
///
/// let p = Point { x: 1, y: 2 };
/// assert_eq!(deep_copy(&p).unwrap(), p);
/// assert_eq!(deep_copy(&Meters(3.5)).unwrap(), Meters(3.5));
/// let l = Labeled { label: "a".to_string(), value: vec![1_u8] };
/// assert_eq!(deep_copy(&l).unwrap(), l);
/// ```
#[macro_export]
macro_rules! deep_copy_record {
    (impl [$($generics:tt)*] $ty:ty { $($field:ident),* $(,)? }) => {
        impl<$($generics)*> $crate::DeepCopy for $ty {
            const KIND: $crate::EnumCopyKind = $crate::EnumCopyKind::Record;

            fn deep_copy_in(
                &self,
                ctx: &mut $crate::CopyContext,
            ) -> ::core::result::Result<Self, $crate::DeepCopyError> {
                ::core::result::Result::Ok(Self {
                    $($field: ctx.copy(&self.$field)?,)*
                })
            }

            fn copy_shell(&self) -> ::core::result::Result<Self, $crate::DeepCopyError> {
                ::core::result::Result::Ok(Self {
                    $($field: $crate::DeepCopy::copy_shell(&self.$field)?,)*
                })
            }
        }
    };
    ($name:ident { $($field:ident),* $(,)? }) => {
        $crate::deep_copy_record!(impl [] $name { $($field),* });
    };
    ($name:ident ( $($index:tt),* $(,)? )) => {
        impl $crate::DeepCopy for $name {
            const KIND: $crate::EnumCopyKind = $crate::EnumCopyKind::Record;

            fn deep_copy_in(
                &self,
                ctx: &mut $crate::CopyContext,
            ) -> ::core::result::Result<Self, $crate::DeepCopyError> {
                ::core::result::Result::Ok(Self($(ctx.copy(&self.$index)?,)*))
            }

            fn copy_shell(&self) -> ::core::result::Result<Self, $crate::DeepCopyError> {
                ::core::result::Result::Ok(Self($($crate::DeepCopy::copy_shell(&self.$index)?,)*))
            }
        }
    };
}
