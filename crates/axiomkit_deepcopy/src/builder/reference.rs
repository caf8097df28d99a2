//! Boxes, shared pointers and weak pointers.
//!
//! Shared allocations (`Rc`, `Arc` and their slice forms) are copied through
//! [`CopyContext::copy_shared`]: a shell is allocated and recorded first, then
//! populated in place once the pointee has been copied. A cycle back to an
//! allocation still being populated resolves to its shell.

use std::rc::{self, Rc};
use std::sync::{self, Arc};

use super::DeepCopy;
use crate::copy::CopyContext;
use crate::kind::EnumCopyKind;
use crate::spec::DeepCopyError;
use crate::tracker::IdentityKey;
use crate::util::overwrite_shell_slot;

/// A reference-counted allocation whose copy is tracked by identity.
pub(crate) trait SharedAllocation: Clone + 'static {
    fn identity(&self) -> IdentityKey;

    /// New allocation of the same shape holding placeholder contents.
    fn allocate_shell(&self) -> Result<Self, DeepCopyError>;

    /// Copy the original's contents into `shell`.
    fn populate_shell(&self, shell: &Self, ctx: &mut CopyContext) -> Result<(), DeepCopyError>;
}

////////////////////////////////////////////////////////////////////////////////
// #region SharedAllocations

// SAFETY (all `overwrite_shell_slot` calls below): `shell` was created by
// `allocate_shell` during this copy call. While it is being populated the engine
// only clones and downgrades handles to it, so no reference into it is live.

impl<T: DeepCopy + 'static> SharedAllocation for Rc<T> {
    fn identity(&self) -> IdentityKey {
        IdentityKey::of::<Self, _>(Rc::as_ptr(self))
    }

    fn allocate_shell(&self) -> Result<Self, DeepCopyError> {
        Ok(Rc::new((**self).copy_shell()?))
    }

    fn populate_shell(&self, shell: &Self, ctx: &mut CopyContext) -> Result<(), DeepCopyError> {
        let value = ctx.copy(&**self)?;
        unsafe { overwrite_shell_slot(Rc::as_ptr(shell).cast_mut(), value) };
        Ok(())
    }
}

impl<T: DeepCopy + 'static> SharedAllocation for Arc<T> {
    fn identity(&self) -> IdentityKey {
        IdentityKey::of::<Self, _>(Arc::as_ptr(self))
    }

    fn allocate_shell(&self) -> Result<Self, DeepCopyError> {
        Ok(Arc::new((**self).copy_shell()?))
    }

    fn populate_shell(&self, shell: &Self, ctx: &mut CopyContext) -> Result<(), DeepCopyError> {
        let value = ctx.copy(&**self)?;
        unsafe { overwrite_shell_slot(Arc::as_ptr(shell).cast_mut(), value) };
        Ok(())
    }
}

impl<T: DeepCopy + 'static> SharedAllocation for Rc<[T]> {
    fn identity(&self) -> IdentityKey {
        IdentityKey::of::<Self, _>(Rc::as_ptr(self))
    }

    fn allocate_shell(&self) -> Result<Self, DeepCopyError> {
        self.iter().map(T::copy_shell).collect()
    }

    fn populate_shell(&self, shell: &Self, ctx: &mut CopyContext) -> Result<(), DeepCopyError> {
        let slot_base = Rc::as_ptr(shell).cast::<T>().cast_mut();
        for (idx, item) in self.iter().enumerate() {
            let value = ctx.copy(item)?;
            unsafe { overwrite_shell_slot(slot_base.add(idx), value) };
        }
        Ok(())
    }
}

impl<T: DeepCopy + 'static> SharedAllocation for Arc<[T]> {
    fn identity(&self) -> IdentityKey {
        IdentityKey::of::<Self, _>(Arc::as_ptr(self))
    }

    fn allocate_shell(&self) -> Result<Self, DeepCopyError> {
        self.iter().map(T::copy_shell).collect()
    }

    fn populate_shell(&self, shell: &Self, ctx: &mut CopyContext) -> Result<(), DeepCopyError> {
        let slot_base = Arc::as_ptr(shell).cast::<T>().cast_mut();
        for (idx, item) in self.iter().enumerate() {
            let value = ctx.copy(item)?;
            unsafe { overwrite_shell_slot(slot_base.add(idx), value) };
        }
        Ok(())
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region DeepCopyImpls

macro_rules! impl_deep_copy_shared {
    ($kind:expr => $($ty:ty),* $(,)?) => {$(
        impl<T: DeepCopy + 'static> DeepCopy for $ty {
            const KIND: EnumCopyKind = $kind;

            fn deep_copy_in(&self, ctx: &mut CopyContext) -> Result<Self, DeepCopyError> {
                ctx.copy_shared(self)
            }

            fn copy_shell(&self) -> Result<Self, DeepCopyError> {
                Ok(self.clone())
            }
        }
    )*};
}

impl_deep_copy_shared!(EnumCopyKind::Reference => Rc<T>, Arc<T>);
impl_deep_copy_shared!(EnumCopyKind::DynamicAggregate => Rc<[T]>, Arc<[T]>);

/// A dead weak reference copies to an empty `Weak`; a live one copies its target.
impl<T: DeepCopy + 'static> DeepCopy for rc::Weak<T> {
    const KIND: EnumCopyKind = EnumCopyKind::Reference;

    fn deep_copy_in(&self, ctx: &mut CopyContext) -> Result<Self, DeepCopyError> {
        match self.upgrade() {
            None => Ok(rc::Weak::new()),
            Some(target) => {
                let target_copied = ctx.copy(&target)?;
                Ok(Rc::downgrade(&target_copied))
            }
        }
    }

    fn copy_shell(&self) -> Result<Self, DeepCopyError> {
        Ok(rc::Weak::new())
    }
}

impl<T: DeepCopy + 'static> DeepCopy for sync::Weak<T> {
    const KIND: EnumCopyKind = EnumCopyKind::Reference;

    fn deep_copy_in(&self, ctx: &mut CopyContext) -> Result<Self, DeepCopyError> {
        match self.upgrade() {
            None => Ok(sync::Weak::new()),
            Some(target) => {
                let target_copied = ctx.copy(&target)?;
                Ok(Arc::downgrade(&target_copied))
            }
        }
    }

    fn copy_shell(&self) -> Result<Self, DeepCopyError> {
        Ok(sync::Weak::new())
    }
}

// A `Box` is the only owner of its pointee, so it never needs identity tracking.
impl<T: DeepCopy> DeepCopy for Box<T> {
    const KIND: EnumCopyKind = EnumCopyKind::Reference;

    fn deep_copy_in(&self, ctx: &mut CopyContext) -> Result<Self, DeepCopyError> {
        Ok(Box::new(ctx.copy(&**self)?))
    }

    fn copy_shell(&self) -> Result<Self, DeepCopyError> {
        Ok(Box::new((**self).copy_shell()?))
    }
}

/// `None` is the null reference. The kind is the content's kind.
impl<T: DeepCopy> DeepCopy for Option<T> {
    const KIND: EnumCopyKind = T::KIND;

    fn deep_copy_in(&self, ctx: &mut CopyContext) -> Result<Self, DeepCopyError> {
        match self {
            None => Ok(None),
            Some(value) => Ok(Some(value.deep_copy_in(ctx)?)),
        }
    }

    fn copy_shell(&self) -> Result<Self, DeepCopyError> {
        Ok(None)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::{Rc, Weak};
    use std::sync::Arc;

    use crate::{deep_copy, deep_copy_record};

    #[test]
    fn box_copy_points_to_new_storage() {
        let ptr = Box::new(5_i32);
        let copied = deep_copy(&ptr).expect("box");
        assert_eq!(*copied, *ptr);
        assert!(!std::ptr::eq(&*copied, &*ptr));
    }

    #[test]
    fn null_reference_stays_null() {
        let ptr: Option<Box<i32>> = None;
        assert!(deep_copy(&ptr).expect("none").is_none());

        let ptr: Option<Rc<i32>> = Some(Rc::new(9));
        let copied = deep_copy(&ptr).expect("some").expect("still some");
        assert_eq!(*copied, 9);
    }

    #[test]
    fn rc_copy_is_new_allocation() {
        let original = Rc::new(vec![1_u8, 2, 3]);
        let copied = deep_copy(&original).expect("rc");
        assert_eq!(copied, original);
        assert!(!Rc::ptr_eq(&copied, &original));
        assert_eq!(Rc::strong_count(&original), 1);
        assert_eq!(Rc::strong_count(&copied), 1);
    }

    #[test]
    fn shared_targets_stay_shared() {
        let target = Rc::new(RefCell::new(1_i32));
        let l_refs = vec![Rc::clone(&target), Rc::new(RefCell::new(1)), Rc::clone(&target)];

        let copied = deep_copy(&l_refs).expect("vec of rc");
        assert!(Rc::ptr_eq(&copied[0], &copied[2]));
        assert!(!Rc::ptr_eq(&copied[0], &copied[1]));
        assert!(!Rc::ptr_eq(&copied[0], &target));

        *copied[0].borrow_mut() = 42;
        assert_eq!(*copied[2].borrow(), 42);
        assert_eq!(*target.borrow(), 1);
    }

    #[test]
    fn shared_slices_stay_shared() {
        let slice: Arc<[String]> = Arc::from(vec!["a".to_string(), "b".to_string()]);
        let pair = (Arc::clone(&slice), Arc::clone(&slice));

        let copied = deep_copy(&pair).expect("pair of slices");
        assert!(Arc::ptr_eq(&copied.0, &copied.1));
        assert!(!Arc::ptr_eq(&copied.0, &slice));
        assert_eq!(&*copied.0, &*slice);
    }

    struct TreeNode {
        value: i32,
        parent: RefCell<Weak<TreeNode>>,
        children: RefCell<Vec<Rc<TreeNode>>>,
    }
    deep_copy_record!(TreeNode { value, parent, children });

    #[test]
    fn weak_parent_links_point_into_the_copy() {
        let root = Rc::new(TreeNode {
            value: 0,
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(Vec::new()),
        });
        for value in 1..=2 {
            let child = Rc::new(TreeNode {
                value,
                parent: RefCell::new(Rc::downgrade(&root)),
                children: RefCell::new(Vec::new()),
            });
            root.children.borrow_mut().push(child);
        }

        let copied = deep_copy(&root).expect("tree");
        assert!(!Rc::ptr_eq(&copied, &root));
        assert!(copied.parent.borrow().upgrade().is_none());

        let children = copied.children.borrow();
        assert_eq!(children.len(), 2);
        for (idx, child) in children.iter().enumerate() {
            assert_eq!(child.value, idx as i32 + 1);
            let parent = child.parent.borrow().upgrade().expect("parent alive");
            assert!(Rc::ptr_eq(&parent, &copied));
        }
        assert_eq!(Rc::weak_count(&copied), 2);
        assert_eq!(Rc::strong_count(&copied), 1);
    }

    #[test]
    fn dead_weak_copies_to_empty_weak() {
        let weak = {
            let target = Rc::new(3_u8);
            Rc::downgrade(&target)
        };
        let copied = deep_copy(&weak).expect("weak");
        assert!(copied.upgrade().is_none());
    }
}
