//! Value graph traversal and copy orchestration.

use std::collections::HashSet;

use rayon::ThreadPoolBuilder;
use rayon::prelude::*;

use crate::builder::{DeepCopy, DynDeepCopy, SharedAllocation};
use crate::kind::EnumCopyKind;
use crate::report::{ReportDeepCopy, ReportDeepCopyBuilder};
use crate::spec::{
    DeepCopyError, EnumOpaqueHandleStrategy, EnumRawAddressStrategy, SpecDeepCopyOptions,
};
use crate::tracker::{IdentityKey, IdentityTracker};
use crate::util::calculate_worker_limit;

/// Traversal state of one top-level copy call.
///
/// Created per call and dropped on return, so nothing is shared between calls.
#[derive(Debug)]
pub struct CopyContext {
    spec_options: SpecDeepCopyOptions,
    tracker: IdentityTracker,
    builder_report: ReportDeepCopyBuilder,
    n_depth: usize,
    set_in_progress: HashSet<IdentityKey>,
    n_key_scopes: usize,
    l_pending_hits: Vec<IdentityKey>,
}

impl CopyContext {
    pub fn new(spec_options: SpecDeepCopyOptions) -> Result<Self, DeepCopyError> {
        spec_options.validate()?;
        Ok(Self::from_validated(spec_options))
    }

    fn from_validated(spec_options: SpecDeepCopyOptions) -> Self {
        Self {
            spec_options,
            tracker: IdentityTracker::new(),
            builder_report: ReportDeepCopyBuilder::default(),
            n_depth: 0,
            set_in_progress: HashSet::new(),
            n_key_scopes: 0,
            l_pending_hits: Vec::new(),
        }
    }

    pub fn options(&self) -> &SpecDeepCopyOptions {
        &self.spec_options
    }

    pub fn tracker(&self) -> &IdentityTracker {
        &self.tracker
    }

    /// Copy one child value.
    ///
    /// Leaves are built directly. Opaque handles and raw addresses are subject to
    /// the configured policies. Every other kind counts one level of depth.
    pub fn copy<T: DeepCopy>(&mut self, value: &T) -> Result<T, DeepCopyError> {
        self.builder_report.add_visited();
        match T::KIND {
            EnumCopyKind::Scalar | EnumCopyKind::Text => value.deep_copy_in(self),
            EnumCopyKind::OpaqueHandle => {
                if self.spec_options.rule_opaque_handle == EnumOpaqueHandleStrategy::Reject {
                    return Err(DeepCopyError::unsupported::<T>(T::KIND));
                }
                let copied = value.deep_copy_in(self)?;
                self.builder_report.add_passthrough();
                Ok(copied)
            }
            EnumCopyKind::Unrepresentable => {
                if self.spec_options.rule_raw_address == EnumRawAddressStrategy::Reject {
                    return Err(DeepCopyError::unsupported::<T>(T::KIND));
                }
                let copied = value.deep_copy_in(self)?;
                self.builder_report.add_passthrough();
                Ok(copied)
            }
            EnumCopyKind::FixedAggregate
            | EnumCopyKind::DynamicAggregate
            | EnumCopyKind::KeyedAggregate
            | EnumCopyKind::Record
            | EnumCopyKind::Reference => {
                self.enter_depth()?;
                let res_copy = value.deep_copy_in(self);
                self.n_depth -= 1;
                res_copy
            }
        }
    }

    /// Copy a shared allocation at most once per call.
    ///
    /// The shell is recorded before the pointee is copied, so a cycle back to
    /// `original` resolves to the shell that is being populated.
    pub(crate) fn copy_shared<P: SharedAllocation>(
        &mut self,
        original: &P,
    ) -> Result<P, DeepCopyError> {
        let key = original.identity();
        if let Some(copy_existing) = self.tracker.lookup::<P>(key) {
            self.builder_report.add_shared_hit();
            if self.n_key_scopes > 0 && self.set_in_progress.contains(&key) {
                self.l_pending_hits.push(key);
            }
            tracing::trace!(
                address = key.address(),
                type_name = std::any::type_name::<P>(),
                "shared allocation already copied"
            );
            return Ok(copy_existing);
        }

        let shell = original.allocate_shell()?;
        self.tracker.record(key, shell.clone());
        self.builder_report.add_allocated();
        self.set_in_progress.insert(key);
        let res_populate = original.populate_shell(&shell, self);
        self.set_in_progress.remove(&key);
        res_populate?;
        Ok(shell)
    }

    /// Copy a value whose hash or ordering is read by its container.
    ///
    /// Map and set keys and heap elements go through here. A key whose copy
    /// reaches a shared allocation that is still being populated would be hashed
    /// or ordered by placeholder contents, so it fails with
    /// [`DeepCopyError::UnsupportedKind`] instead.
    pub fn copy_key<K: DeepCopy>(&mut self, key: &K) -> Result<K, DeepCopyError> {
        let n_mark = self.l_pending_hits.len();
        self.n_key_scopes += 1;
        let res_copy = self.copy(key);
        self.n_key_scopes -= 1;

        let if_reaches_shell = self.l_pending_hits[n_mark..]
            .iter()
            .any(|identity| self.set_in_progress.contains(identity));
        if self.n_key_scopes == 0 {
            self.l_pending_hits.clear();
        }

        let copied = res_copy?;
        if if_reaches_shell {
            tracing::debug!(
                type_name = std::any::type_name::<K>(),
                "key reaches an allocation that is still being copied"
            );
            return Err(DeepCopyError::unsupported::<K>(K::KIND));
        }
        Ok(copied)
    }

    fn enter_depth(&mut self) -> Result<(), DeepCopyError> {
        let n_depth = self.n_depth + 1;
        if let Some(depth_limit) = self.spec_options.depth_limit {
            if n_depth > depth_limit {
                return Err(DeepCopyError::DepthLimitExceeded { depth_limit });
            }
        }
        self.n_depth = n_depth;
        self.builder_report.observe_depth(n_depth);
        Ok(())
    }

    /// Finish the call and release every tracked copy.
    pub fn into_report(self) -> ReportDeepCopy {
        self.builder_report.build()
    }
}

/// Produce an independent copy of `value` with default options.
///
/// The input is never mutated. The result shares no storage with it except
/// opaque handles and raw addresses, which are passed through.
pub fn deep_copy<T: DeepCopy>(value: &T) -> Result<T, DeepCopyError> {
    deep_copy_with_options(value, SpecDeepCopyOptions::default())
}

pub fn deep_copy_with_options<T: DeepCopy>(
    value: &T,
    spec_options: SpecDeepCopyOptions,
) -> Result<T, DeepCopyError> {
    deep_copy_with_report(value, spec_options).map(|(copied, _)| copied)
}

/// Copy `value` and return the run's [`ReportDeepCopy`] alongside it.
///
/// Fails only as a whole: the first error aborts the call and no partial copy
/// is returned.
pub fn deep_copy_with_report<T: DeepCopy>(
    value: &T,
    spec_options: SpecDeepCopyOptions,
) -> Result<(T, ReportDeepCopy), DeepCopyError> {
    let mut ctx = CopyContext::new(spec_options)?;
    tracing::debug!(
        type_name = std::any::type_name::<T>(),
        kind = %T::KIND,
        "deep copy started"
    );

    let copied = match ctx.copy(value) {
        Ok(copied) => copied,
        Err(err) => {
            tracing::debug!(error = %err, "deep copy failed");
            return Err(err);
        }
    };
    let report = ctx.into_report();
    tracing::debug!(
        cnt_visited = report.cnt_visited,
        cnt_allocated = report.cnt_allocated,
        cnt_shared_hits = report.cnt_shared_hits,
        cnt_passthrough = report.cnt_passthrough,
        n_depth_max = report.n_depth_max,
        "deep copy finished"
    );
    Ok((copied, report))
}

/// Copy a type-erased value with default options.
pub fn deep_copy_any(value: &dyn DynDeepCopy) -> Result<Box<dyn DynDeepCopy>, DeepCopyError> {
    let mut ctx = CopyContext::new(SpecDeepCopyOptions::default())?;
    value.deep_copy_dyn(&mut ctx)
}

/// Copy many independent values, in parallel when more than one worker is allowed.
///
/// Each value gets its own traversal state, so sharing between two items of
/// `l_values` is not preserved in the results. A failing item does not affect
/// the others. Returns [`DeepCopyError`] only for invalid options.
pub fn deep_copy_batch<T>(
    l_values: &[T],
    spec_options: SpecDeepCopyOptions,
) -> Result<(Vec<Result<T, DeepCopyError>>, ReportDeepCopy), DeepCopyError>
where
    T: DeepCopy + Send + Sync,
{
    spec_options.validate()?;
    let n_workers_max = calculate_worker_limit(spec_options.num_workers_max);
    let mut builder_report = ReportDeepCopyBuilder::default();

    let copy_serial = |spec_options: &SpecDeepCopyOptions| {
        l_values
            .iter()
            .map(|value| copy_batch_item(value, spec_options))
            .collect::<Vec<_>>()
    };

    let l_outcomes = if n_workers_max <= 1 || l_values.len() <= 1 {
        copy_serial(&spec_options)
    } else {
        match ThreadPoolBuilder::new().num_threads(n_workers_max).build() {
            Ok(thread_pool) => thread_pool.install(|| {
                l_values
                    .par_iter()
                    .map(|value| copy_batch_item(value, &spec_options))
                    .collect::<Vec<_>>()
            }),
            Err(err) => {
                tracing::warn!(workers = n_workers_max, error = %err, "thread pool unavailable");
                builder_report.add_warning(format!(
                    "Failed to initialize thread pool (workers={n_workers_max}); fallback to serial copy."
                ));
                copy_serial(&spec_options)
            }
        }
    };

    let mut l_results = Vec::with_capacity(l_outcomes.len());
    for (res_copy, report_item) in l_outcomes {
        builder_report.merge(&report_item);
        l_results.push(res_copy);
    }
    Ok((l_results, builder_report.build()))
}

fn copy_batch_item<T: DeepCopy>(
    value: &T,
    spec_options: &SpecDeepCopyOptions,
) -> (Result<T, DeepCopyError>, ReportDeepCopy) {
    let mut ctx = CopyContext::from_validated(spec_options.clone());
    let res_copy = ctx.copy(value);
    (res_copy, ctx.into_report())
}
