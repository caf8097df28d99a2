//! Text values. Every copy gets fresh storage, including shared buffers.

use std::ffi::{CString, OsString};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;

use super::DeepCopy;
use crate::copy::CopyContext;
use crate::kind::EnumCopyKind;
use crate::spec::DeepCopyError;

macro_rules! impl_deep_copy_owned_text {
    ($($ty:ty),* $(,)?) => {$(
        impl DeepCopy for $ty {
            const KIND: EnumCopyKind = EnumCopyKind::Text;

            fn deep_copy_in(&self, _ctx: &mut CopyContext) -> Result<Self, DeepCopyError> {
                Ok(self.clone())
            }

            fn copy_shell(&self) -> Result<Self, DeepCopyError> {
                Ok(<$ty>::default())
            }
        }
    )*};
}

impl_deep_copy_owned_text!(String, Box<str>, PathBuf, OsString, CString);

// Shared text is re-allocated rather than tracked: two views of one buffer
// become two independent buffers.
impl DeepCopy for Rc<str> {
    const KIND: EnumCopyKind = EnumCopyKind::Text;

    fn deep_copy_in(&self, _ctx: &mut CopyContext) -> Result<Self, DeepCopyError> {
        Ok(Rc::from(&**self))
    }

    fn copy_shell(&self) -> Result<Self, DeepCopyError> {
        Ok(Rc::from(""))
    }
}

impl DeepCopy for Arc<str> {
    const KIND: EnumCopyKind = EnumCopyKind::Text;

    fn deep_copy_in(&self, _ctx: &mut CopyContext) -> Result<Self, DeepCopyError> {
        Ok(Arc::from(&**self))
    }

    fn copy_shell(&self) -> Result<Self, DeepCopyError> {
        Ok(Arc::from(""))
    }
}
