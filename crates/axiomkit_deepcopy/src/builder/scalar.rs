use std::marker::PhantomData;
use std::num::{
    NonZeroI8, NonZeroI16, NonZeroI32, NonZeroI64, NonZeroI128, NonZeroIsize, NonZeroU8,
    NonZeroU16, NonZeroU32, NonZeroU64, NonZeroU128, NonZeroUsize,
};
use std::time::Duration;

use super::DeepCopy;
use crate::copy::CopyContext;
use crate::kind::EnumCopyKind;
use crate::spec::DeepCopyError;

macro_rules! impl_deep_copy_scalar {
    ($($ty:ty),* $(,)?) => {$(
        impl DeepCopy for $ty {
            const KIND: EnumCopyKind = EnumCopyKind::Scalar;

            #[inline]
            fn deep_copy_in(&self, _ctx: &mut CopyContext) -> Result<Self, DeepCopyError> {
                Ok(*self)
            }

            #[inline]
            fn copy_shell(&self) -> Result<Self, DeepCopyError> {
                Ok(*self)
            }
        }
    )*};
}

impl_deep_copy_scalar!(
    bool, char, (),
    i8, i16, i32, i64, i128, isize,
    u8, u16, u32, u64, u128, usize,
    f32, f64,
    NonZeroI8, NonZeroI16, NonZeroI32, NonZeroI64, NonZeroI128, NonZeroIsize,
    NonZeroU8, NonZeroU16, NonZeroU32, NonZeroU64, NonZeroU128, NonZeroUsize,
    Duration,
);

impl<T: ?Sized> DeepCopy for PhantomData<T> {
    const KIND: EnumCopyKind = EnumCopyKind::Scalar;

    fn deep_copy_in(&self, _ctx: &mut CopyContext) -> Result<Self, DeepCopyError> {
        Ok(PhantomData)
    }

    fn copy_shell(&self) -> Result<Self, DeepCopyError> {
        Ok(PhantomData)
    }
}
