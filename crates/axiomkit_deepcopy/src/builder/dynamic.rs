//! Type-erased values.

use std::any::Any;

use super::DeepCopy;
use crate::copy::CopyContext;
use crate::kind::EnumCopyKind;
use crate::spec::DeepCopyError;

/// Object-safe form of [`DeepCopy`], implemented for every `DeepCopy + 'static` type.
///
/// `Box<dyn DynDeepCopy>` is itself [`DeepCopy`], so heterogeneous values can be
/// stored in ordinary containers and copied with the same engine.
pub trait DynDeepCopy: Any {
    fn copy_kind(&self) -> EnumCopyKind;

    fn deep_copy_dyn(&self, ctx: &mut CopyContext) -> Result<Box<dyn DynDeepCopy>, DeepCopyError>;

    fn copy_shell_dyn(&self) -> Result<Box<dyn DynDeepCopy>, DeepCopyError>;

    fn as_any(&self) -> &dyn Any;
}

impl<T: DeepCopy + 'static> DynDeepCopy for T {
    fn copy_kind(&self) -> EnumCopyKind {
        T::KIND
    }

    fn deep_copy_dyn(&self, ctx: &mut CopyContext) -> Result<Box<dyn DynDeepCopy>, DeepCopyError> {
        Ok(Box::new(ctx.copy(self)?))
    }

    fn copy_shell_dyn(&self) -> Result<Box<dyn DynDeepCopy>, DeepCopyError> {
        Ok(Box::new(self.copy_shell()?))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl dyn DynDeepCopy {
    pub fn is<T: Any>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

// Calls go through `**self`; on `self` they would resolve to the box's own impl.
impl DeepCopy for Box<dyn DynDeepCopy> {
    const KIND: EnumCopyKind = EnumCopyKind::Reference;

    fn deep_copy_in(&self, ctx: &mut CopyContext) -> Result<Self, DeepCopyError> {
        (**self).deep_copy_dyn(ctx)
    }

    fn copy_shell(&self) -> Result<Self, DeepCopyError> {
        (**self).copy_shell_dyn()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::rc::Rc;

    use super::DynDeepCopy;
    use crate::{EnumCopyKind, deep_copy, deep_copy_any};

    #[test]
    fn erased_value_copies_to_the_same_concrete_type() {
        let value: Box<dyn DynDeepCopy> = Box::new(vec![1_u8, 2]);
        assert_eq!((*value).copy_kind(), EnumCopyKind::DynamicAggregate);

        let copied = deep_copy_any(value.as_ref()).expect("erased vec");
        assert!(copied.is::<Vec<u8>>());
        assert_eq!(copied.downcast_ref::<Vec<u8>>(), Some(&vec![1, 2]));
        assert!(copied.downcast_ref::<String>().is_none());
    }

    #[test]
    fn heterogeneous_container_is_copied() {
        let mut dict_values: HashMap<String, Box<dyn DynDeepCopy>> = HashMap::new();
        dict_values.insert("n".to_string(), Box::new(5_i64));
        dict_values.insert("s".to_string(), Box::new("text".to_string()));
        dict_values.insert("l".to_string(), Box::new(vec![1.5_f64]));

        let copied = deep_copy(&dict_values).expect("erased map");
        assert_eq!(copied.len(), 3);
        assert_eq!(copied["n"].downcast_ref::<i64>(), Some(&5));
        assert_eq!(copied["s"].downcast_ref::<String>().map(String::as_str), Some("text"));
        assert_eq!(copied["l"].downcast_ref::<Vec<f64>>(), Some(&vec![1.5]));
    }

    #[test]
    fn erased_values_keep_shared_targets_shared() {
        let shared = Rc::new(vec![3_u32]);
        let l_values: Vec<Box<dyn DynDeepCopy>> =
            vec![Box::new(Rc::clone(&shared)), Box::new(Rc::clone(&shared))];

        let copied = deep_copy(&l_values).expect("erased rcs");
        let first = copied[0].downcast_ref::<Rc<Vec<u32>>>().expect("rc");
        let second = copied[1].downcast_ref::<Rc<Vec<u32>>>().expect("rc");
        assert!(Rc::ptr_eq(first, second));
        assert!(!Rc::ptr_eq(first, &shared));
    }
}
