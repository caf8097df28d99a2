//! Arrays, growable sequences, maps and sets.

use std::collections::{BTreeMap, BTreeSet, BinaryHeap, HashMap, HashSet, VecDeque};
use std::hash::{BuildHasher, Hash};

use super::DeepCopy;
use crate::copy::CopyContext;
use crate::kind::EnumCopyKind;
use crate::spec::DeepCopyError;

////////////////////////////////////////////////////////////////////////////////
// #region Sequences

impl<T: DeepCopy, const N: usize> DeepCopy for [T; N] {
    const KIND: EnumCopyKind = EnumCopyKind::FixedAggregate;

    fn deep_copy_in(&self, ctx: &mut CopyContext) -> Result<Self, DeepCopyError> {
        let l_copied = self
            .iter()
            .map(|item| ctx.copy(item))
            .collect::<Result<Vec<T>, _>>()?;
        into_array(l_copied)
    }

    fn copy_shell(&self) -> Result<Self, DeepCopyError> {
        let l_shells = self
            .iter()
            .map(T::copy_shell)
            .collect::<Result<Vec<T>, _>>()?;
        into_array(l_shells)
    }
}

fn into_array<T, const N: usize>(l_items: Vec<T>) -> Result<[T; N], DeepCopyError> {
    <[T; N]>::try_from(l_items)
        .map_err(|_| DeepCopyError::unsupported::<[T; N]>(EnumCopyKind::FixedAggregate))
}

impl<T: DeepCopy> DeepCopy for Vec<T> {
    const KIND: EnumCopyKind = EnumCopyKind::DynamicAggregate;

    fn deep_copy_in(&self, ctx: &mut CopyContext) -> Result<Self, DeepCopyError> {
        let mut l_copied = Vec::with_capacity(self.len());
        for item in self {
            l_copied.push(ctx.copy(item)?);
        }
        Ok(l_copied)
    }

    fn copy_shell(&self) -> Result<Self, DeepCopyError> {
        Ok(Vec::new())
    }
}

impl<T: DeepCopy> DeepCopy for VecDeque<T> {
    const KIND: EnumCopyKind = EnumCopyKind::DynamicAggregate;

    fn deep_copy_in(&self, ctx: &mut CopyContext) -> Result<Self, DeepCopyError> {
        let mut l_copied = VecDeque::with_capacity(self.len());
        for item in self {
            l_copied.push_back(ctx.copy(item)?);
        }
        Ok(l_copied)
    }

    fn copy_shell(&self) -> Result<Self, DeepCopyError> {
        Ok(VecDeque::new())
    }
}

impl<T: DeepCopy> DeepCopy for Box<[T]> {
    const KIND: EnumCopyKind = EnumCopyKind::DynamicAggregate;

    fn deep_copy_in(&self, ctx: &mut CopyContext) -> Result<Self, DeepCopyError> {
        let mut l_copied = Vec::with_capacity(self.len());
        for item in self.iter() {
            l_copied.push(ctx.copy(item)?);
        }
        Ok(l_copied.into_boxed_slice())
    }

    fn copy_shell(&self) -> Result<Self, DeepCopyError> {
        Ok(Vec::new().into_boxed_slice())
    }
}

impl<T: DeepCopy + Ord> DeepCopy for BinaryHeap<T> {
    const KIND: EnumCopyKind = EnumCopyKind::DynamicAggregate;

    fn deep_copy_in(&self, ctx: &mut CopyContext) -> Result<Self, DeepCopyError> {
        let mut l_copied = Vec::with_capacity(self.len());
        for item in self.iter() {
            l_copied.push(ctx.copy_key(item)?);
        }
        Ok(BinaryHeap::from(l_copied))
    }

    fn copy_shell(&self) -> Result<Self, DeepCopyError> {
        Ok(BinaryHeap::new())
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region KeyedAggregates

// Keys go through the same traversal as values, so shared keys stay shared.
// They are copied with `copy_key`: a key is hashed or ordered on insert, so it
// must not reach an allocation that is still a shell.

impl<K, V, S> DeepCopy for HashMap<K, V, S>
where
    K: DeepCopy + Eq + Hash,
    V: DeepCopy,
    S: BuildHasher + Clone,
{
    const KIND: EnumCopyKind = EnumCopyKind::KeyedAggregate;

    fn deep_copy_in(&self, ctx: &mut CopyContext) -> Result<Self, DeepCopyError> {
        let mut dict_copied = HashMap::with_capacity_and_hasher(self.len(), self.hasher().clone());
        for (key, value) in self {
            let key_copied = ctx.copy_key(key)?;
            let value_copied = ctx.copy(value)?;
            dict_copied.insert(key_copied, value_copied);
        }
        Ok(dict_copied)
    }

    fn copy_shell(&self) -> Result<Self, DeepCopyError> {
        Ok(HashMap::with_hasher(self.hasher().clone()))
    }
}

impl<K, V> DeepCopy for BTreeMap<K, V>
where
    K: DeepCopy + Ord,
    V: DeepCopy,
{
    const KIND: EnumCopyKind = EnumCopyKind::KeyedAggregate;

    fn deep_copy_in(&self, ctx: &mut CopyContext) -> Result<Self, DeepCopyError> {
        let mut dict_copied = BTreeMap::new();
        for (key, value) in self {
            let key_copied = ctx.copy_key(key)?;
            let value_copied = ctx.copy(value)?;
            dict_copied.insert(key_copied, value_copied);
        }
        Ok(dict_copied)
    }

    fn copy_shell(&self) -> Result<Self, DeepCopyError> {
        Ok(BTreeMap::new())
    }
}

impl<K, S> DeepCopy for HashSet<K, S>
where
    K: DeepCopy + Eq + Hash,
    S: BuildHasher + Clone,
{
    const KIND: EnumCopyKind = EnumCopyKind::KeyedAggregate;

    fn deep_copy_in(&self, ctx: &mut CopyContext) -> Result<Self, DeepCopyError> {
        let mut set_copied = HashSet::with_capacity_and_hasher(self.len(), self.hasher().clone());
        for key in self {
            set_copied.insert(ctx.copy_key(key)?);
        }
        Ok(set_copied)
    }

    fn copy_shell(&self) -> Result<Self, DeepCopyError> {
        Ok(HashSet::with_hasher(self.hasher().clone()))
    }
}

impl<K> DeepCopy for BTreeSet<K>
where
    K: DeepCopy + Ord,
{
    const KIND: EnumCopyKind = EnumCopyKind::KeyedAggregate;

    fn deep_copy_in(&self, ctx: &mut CopyContext) -> Result<Self, DeepCopyError> {
        let mut set_copied = BTreeSet::new();
        for key in self {
            set_copied.insert(ctx.copy_key(key)?);
        }
        Ok(set_copied)
    }

    fn copy_shell(&self) -> Result<Self, DeepCopyError> {
        Ok(BTreeSet::new())
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
