//! Values that are passed through instead of duplicated.

use std::ops::Deref;
use std::ptr::NonNull;
use std::sync::mpsc::{Receiver, Sender, SyncSender};

use super::DeepCopy;
use crate::copy::CopyContext;
use crate::kind::EnumCopyKind;
use crate::spec::DeepCopyError;

////////////////////////////////////////////////////////////////////////////////
// #region OpaqueHandles

/// Marks a value as non-duplicable: copies share the same underlying resource.
///
/// Cloning the wrapped value must yield another handle to that resource, as with
/// `Arc<dyn Fn(..)>` or a connection pool handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Opaque<T>(pub T);

impl<T> Opaque<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Opaque<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: Clone> DeepCopy for Opaque<T> {
    const KIND: EnumCopyKind = EnumCopyKind::OpaqueHandle;

    fn deep_copy_in(&self, _ctx: &mut CopyContext) -> Result<Self, DeepCopyError> {
        Ok(self.clone())
    }

    fn copy_shell(&self) -> Result<Self, DeepCopyError> {
        Ok(self.clone())
    }
}

impl<T> DeepCopy for Sender<T> {
    const KIND: EnumCopyKind = EnumCopyKind::OpaqueHandle;

    fn deep_copy_in(&self, _ctx: &mut CopyContext) -> Result<Self, DeepCopyError> {
        Ok(self.clone())
    }

    fn copy_shell(&self) -> Result<Self, DeepCopyError> {
        Ok(self.clone())
    }
}

impl<T> DeepCopy for SyncSender<T> {
    const KIND: EnumCopyKind = EnumCopyKind::OpaqueHandle;

    fn deep_copy_in(&self, _ctx: &mut CopyContext) -> Result<Self, DeepCopyError> {
        Ok(self.clone())
    }

    fn copy_shell(&self) -> Result<Self, DeepCopyError> {
        Ok(self.clone())
    }
}

// A receiver has exactly one owner; there is no second handle to give out.
impl<T> DeepCopy for Receiver<T> {
    const KIND: EnumCopyKind = EnumCopyKind::OpaqueHandle;

    fn deep_copy_in(&self, _ctx: &mut CopyContext) -> Result<Self, DeepCopyError> {
        Err(DeepCopyError::unsupported::<Self>(Self::KIND))
    }

    fn copy_shell(&self) -> Result<Self, DeepCopyError> {
        Err(DeepCopyError::unsupported::<Self>(Self::KIND))
    }
}

macro_rules! impl_deep_copy_fn_pointer {
    ($($arg:ident),*) => {
        impl<Ret, $($arg),*> DeepCopy for fn($($arg),*) -> Ret {
            const KIND: EnumCopyKind = EnumCopyKind::OpaqueHandle;

            fn deep_copy_in(&self, _ctx: &mut CopyContext) -> Result<Self, DeepCopyError> {
                Ok(*self)
            }

            fn copy_shell(&self) -> Result<Self, DeepCopyError> {
                Ok(*self)
            }
        }
    };
}

impl_deep_copy_fn_pointer!();
impl_deep_copy_fn_pointer!(A);
impl_deep_copy_fn_pointer!(A, B);
impl_deep_copy_fn_pointer!(A, B, C);
impl_deep_copy_fn_pointer!(A, B, C, D);

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region RawAddresses

// Raw addresses keep their bit pattern and are never dereferenced.

impl<T: ?Sized> DeepCopy for *const T {
    const KIND: EnumCopyKind = EnumCopyKind::Unrepresentable;

    fn deep_copy_in(&self, _ctx: &mut CopyContext) -> Result<Self, DeepCopyError> {
        Ok(*self)
    }

    fn copy_shell(&self) -> Result<Self, DeepCopyError> {
        Ok(*self)
    }
}

impl<T: ?Sized> DeepCopy for *mut T {
    const KIND: EnumCopyKind = EnumCopyKind::Unrepresentable;

    fn deep_copy_in(&self, _ctx: &mut CopyContext) -> Result<Self, DeepCopyError> {
        Ok(*self)
    }

    fn copy_shell(&self) -> Result<Self, DeepCopyError> {
        Ok(*self)
    }
}

impl<T: ?Sized> DeepCopy for NonNull<T> {
    const KIND: EnumCopyKind = EnumCopyKind::Unrepresentable;

    fn deep_copy_in(&self, _ctx: &mut CopyContext) -> Result<Self, DeepCopyError> {
        Ok(*self)
    }

    fn copy_shell(&self) -> Result<Self, DeepCopyError> {
        Ok(*self)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::mpsc;

    use super::Opaque;
    use crate::{DeepCopyError, EnumCopyKind, deep_copy};

    #[test]
    fn sender_copy_talks_to_the_same_channel() {
        let (tx, rx) = mpsc::channel::<u32>();
        let copied = deep_copy(&tx).expect("sender");
        copied.send(11).expect("send through copy");
        assert_eq!(rx.recv().expect("recv"), 11);
    }

    #[test]
    fn receiver_cannot_be_duplicated() {
        let (_tx, rx) = mpsc::channel::<()>();
        let err = deep_copy(&rx).expect_err("receiver must fail");
        assert!(matches!(
            err,
            DeepCopyError::UnsupportedKind {
                kind: EnumCopyKind::OpaqueHandle,
                ..
            }
        ));
    }

    #[test]
    fn function_pointer_is_passed_through() {
        fn double(x: i32) -> i32 {
            x * 2
        }
        let f: fn(i32) -> i32 = double;
        let copied = deep_copy(&f).expect("fn pointer");
        assert_eq!(copied(21), 42);
        assert!(std::ptr::fn_addr_eq(copied, f));
    }

    #[test]
    fn opaque_wrapper_shares_the_resource() {
        let handle: Opaque<Arc<dyn Fn(u8) -> u8 + Send + Sync>> = Opaque(Arc::new(|x: u8| x + 1));
        let copied = deep_copy(&handle).expect("opaque");
        assert!(Arc::ptr_eq(&copied.0, &handle.0));
        assert_eq!((copied.0)(1), 2);
    }

    #[test]
    fn raw_address_keeps_bit_pattern() {
        let a_valid_address = [0_u64; 2];
        let ptr = a_valid_address.as_ptr();
        let copied = deep_copy(&ptr).expect("raw pointer");
        assert_eq!(copied, ptr);

        let mut slot = 3_i32;
        let ptr_mut = std::ptr::NonNull::from(&mut slot);
        assert_eq!(deep_copy(&ptr_mut).expect("non null"), ptr_mut);
    }
}
