//! Interior-mutable wrappers.
//!
//! Wrappers report the kind of their content and are read without blocking: a
//! source that is exclusively held fails with [`DeepCopyError::BorrowConflict`].
//! A poisoned lock still owns valid data and is copied as-is.

use std::cell::{Cell, OnceCell, RefCell};
use std::sync::{Mutex, RwLock, TryLockError};

use super::DeepCopy;
use crate::copy::CopyContext;
use crate::kind::EnumCopyKind;
use crate::spec::DeepCopyError;

impl<T: DeepCopy + Copy> DeepCopy for Cell<T> {
    const KIND: EnumCopyKind = T::KIND;

    fn deep_copy_in(&self, ctx: &mut CopyContext) -> Result<Self, DeepCopyError> {
        Ok(Cell::new(self.get().deep_copy_in(ctx)?))
    }

    fn copy_shell(&self) -> Result<Self, DeepCopyError> {
        Ok(Cell::new(self.get().copy_shell()?))
    }
}

impl<T: DeepCopy> DeepCopy for RefCell<T> {
    const KIND: EnumCopyKind = T::KIND;

    fn deep_copy_in(&self, ctx: &mut CopyContext) -> Result<Self, DeepCopyError> {
        let guard = self
            .try_borrow()
            .map_err(|_| DeepCopyError::borrow_conflict::<Self>())?;
        Ok(RefCell::new(guard.deep_copy_in(ctx)?))
    }

    fn copy_shell(&self) -> Result<Self, DeepCopyError> {
        let guard = self
            .try_borrow()
            .map_err(|_| DeepCopyError::borrow_conflict::<Self>())?;
        Ok(RefCell::new(guard.copy_shell()?))
    }
}

impl<T: DeepCopy> DeepCopy for OnceCell<T> {
    const KIND: EnumCopyKind = T::KIND;

    fn deep_copy_in(&self, ctx: &mut CopyContext) -> Result<Self, DeepCopyError> {
        match self.get() {
            None => Ok(OnceCell::new()),
            Some(value) => Ok(OnceCell::from(value.deep_copy_in(ctx)?)),
        }
    }

    fn copy_shell(&self) -> Result<Self, DeepCopyError> {
        Ok(OnceCell::new())
    }
}

impl<T: DeepCopy> DeepCopy for Mutex<T> {
    const KIND: EnumCopyKind = T::KIND;

    fn deep_copy_in(&self, ctx: &mut CopyContext) -> Result<Self, DeepCopyError> {
        let guard = match self.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(err)) => err.into_inner(),
            Err(TryLockError::WouldBlock) => return Err(DeepCopyError::borrow_conflict::<Self>()),
        };
        Ok(Mutex::new(guard.deep_copy_in(ctx)?))
    }

    fn copy_shell(&self) -> Result<Self, DeepCopyError> {
        let guard = match self.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(err)) => err.into_inner(),
            Err(TryLockError::WouldBlock) => return Err(DeepCopyError::borrow_conflict::<Self>()),
        };
        Ok(Mutex::new(guard.copy_shell()?))
    }
}

impl<T: DeepCopy> DeepCopy for RwLock<T> {
    const KIND: EnumCopyKind = T::KIND;

    fn deep_copy_in(&self, ctx: &mut CopyContext) -> Result<Self, DeepCopyError> {
        let guard = match self.try_read() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(err)) => err.into_inner(),
            Err(TryLockError::WouldBlock) => return Err(DeepCopyError::borrow_conflict::<Self>()),
        };
        Ok(RwLock::new(guard.deep_copy_in(ctx)?))
    }

    fn copy_shell(&self) -> Result<Self, DeepCopyError> {
        let guard = match self.try_read() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(err)) => err.into_inner(),
            Err(TryLockError::WouldBlock) => return Err(DeepCopyError::borrow_conflict::<Self>()),
        };
        Ok(RwLock::new(guard.copy_shell()?))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, OnceCell, RefCell};
    use std::sync::{Arc, Mutex, RwLock};

    use crate::{DeepCopyError, deep_copy};

    #[test]
    fn refcell_copy_is_independent() {
        let original = RefCell::new(vec![1_i32, 2]);
        let copied = deep_copy(&original).expect("refcell");
        copied.borrow_mut().push(3);
        assert_eq!(*original.borrow(), vec![1, 2]);
        assert_eq!(*copied.borrow(), vec![1, 2, 3]);
    }

    #[test]
    fn exclusively_borrowed_refcell_fails_closed() {
        let original = RefCell::new(5_u8);
        let _guard = original.borrow_mut();
        let err = deep_copy(&original).expect_err("borrowed cell must fail");
        assert!(matches!(err, DeepCopyError::BorrowConflict { .. }));
    }

    #[test]
    fn locked_mutex_fails_closed() {
        let original = Mutex::new(vec![1_u8]);
        let _guard = original.lock().expect("lock");
        let err = deep_copy(&original).expect_err("locked mutex must fail");
        assert!(matches!(err, DeepCopyError::BorrowConflict { .. }));
    }

    #[test]
    fn poisoned_mutex_is_still_copied() {
        let original = Arc::new(Mutex::new(7_i32));
        let poisoner = Arc::clone(&original);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.lock().expect("lock");
            panic!("poison the lock");
        })
        .join();
        assert!(original.is_poisoned());

        let copied = deep_copy(&original).expect("poisoned mutex");
        let value = *copied.lock().expect("fresh mutex is not poisoned");
        assert_eq!(value, 7);
    }

    #[test]
    fn cell_once_cell_and_rwlock_copy() {
        let cell = Cell::new(4_u16);
        assert_eq!(deep_copy(&cell).expect("cell").get(), 4);

        let once: OnceCell<String> = OnceCell::new();
        assert!(deep_copy(&once).expect("empty once").get().is_none());
        once.set("set".to_string()).expect("first set");
        assert_eq!(deep_copy(&once).expect("once").get().map(String::as_str), Some("set"));

        let lock = RwLock::new(vec![9_u8]);
        let copied = deep_copy(&lock).expect("rwlock");
        assert_eq!(*copied.read().expect("read"), vec![9]);
    }
}
