pub(crate) fn calculate_worker_limit(num_workers_max: Option<usize>) -> usize {
    let n_cpu = std::thread::available_parallelism()
        .map(|v| v.get())
        .unwrap_or(1);

    match num_workers_max {
        Some(n) => n.clamp(1, n_cpu),
        None => n_cpu.clamp(1, 8),
    }
}

/// Overwrite one slot of a freshly allocated copy shell.
///
/// The placeholder previously stored in the slot is dropped.
///
/// # Safety
/// `slot` must be valid for reads and writes and point at an initialized `T`
/// inside a shell allocated by the current copy call. No `&T` or `&mut T` to the
/// slot may be live; other `Rc`/`Arc` handles to the allocation may exist.
pub(crate) unsafe fn overwrite_shell_slot<T>(slot: *mut T, value: T) {
    let placeholder = unsafe { std::ptr::replace(slot, value) };
    drop(placeholder);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_limit_is_clamped_to_at_least_one() {
        assert_eq!(calculate_worker_limit(Some(0)), 1);
        assert!(calculate_worker_limit(None) >= 1);
        assert!(calculate_worker_limit(None) <= 8);
    }

    #[test]
    fn overwrite_shell_slot_replaces_value() {
        let mut slot = vec![String::from("placeholder")];
        unsafe { overwrite_shell_slot(slot.as_mut_ptr(), String::from("value")) };
        assert_eq!(slot, vec!["value".to_string()]);
    }
}
