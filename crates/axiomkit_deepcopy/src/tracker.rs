//! Identity tracking for shared allocations within one copy call.

use std::any::{Any, TypeId};
use std::collections::HashMap;

/// Storage-slot identity of an original shared allocation.
///
/// Two allocations with equal contents are distinct keys. The handle type is
/// part of the key so an `Rc<T>` and an `Arc<U>` can never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    address: usize,
    type_id: TypeId,
}

impl IdentityKey {
    /// Build a key from the pointee address of a handle of type `P`.
    pub fn of<P: 'static, T: ?Sized>(ptr: *const T) -> Self {
        Self {
            address: ptr.cast::<()>() as usize,
            type_id: TypeId::of::<P>(),
        }
    }

    pub fn address(&self) -> usize {
        self.address
    }
}

/// Original identity -> produced copy, live for one top-level call.
///
/// Each recorded copy is a strong handle, so every copy stays alive until the
/// tracker is dropped even if only weak references to it exist in the result so far.
#[derive(Default)]
pub struct IdentityTracker {
    dict_copies: HashMap<IdentityKey, Box<dyn Any>>,
}

impl IdentityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy already produced for `key`, if any.
    ///
    /// Returns `None` when the recorded copy has a different handle type than `P`,
    /// which cannot happen for keys built with [`IdentityKey::of::<P, _>`].
    pub fn lookup<P: Clone + 'static>(&self, key: IdentityKey) -> Option<P> {
        self.dict_copies
            .get(&key)
            .and_then(|boxed| boxed.downcast_ref::<P>())
            .cloned()
    }

    /// Register the copy of `key`. Must happen before the original's children are copied.
    ///
    /// Returns `false` if the key was already recorded; the earlier copy is kept.
    pub fn record<P: 'static>(&mut self, key: IdentityKey, copy: P) -> bool {
        if self.dict_copies.contains_key(&key) {
            return false;
        }
        self.dict_copies.insert(key, Box::new(copy));
        true
    }

    pub fn len(&self) -> usize {
        self.dict_copies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dict_copies.is_empty()
    }
}

impl std::fmt::Debug for IdentityTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityTracker")
            .field("len", &self.dict_copies.len())
            .finish()
    }
}
