//! Parser warnings routed through `tracing`.
//!
//! Provides deduplication to avoid spamming the same warning multiple times.
//! Used by the tree builder and input stream to report constructs that are
//! parsed but not fully supported.
//!
//! The set is process-wide and shared by every thread. Parsing never clears
//! it; an application that wants each document to report its warnings again
//! calls [`clear_warnings`] itself.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Global set of warnings we've already emitted (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Warn about an unsupported feature (emits once per unique message)
///
/// # Example
/// ```
/// use kestrel_common::warning::warn_once;
///
/// warn_once("HTML Parser", "<template> contents are parsed as ordinary children");
/// ```
pub fn warn_once(component: &str, message: &str) {
    let key = format!("[{component}] {message}");
    let should_emit = WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key);

    if should_emit {
        tracing::warn!(component, "{message}");
    }
}

/// Returns true if `warn_once` has already emitted this message.
#[must_use]
pub fn was_warned(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
        .is_some_and(|set| set.contains(&key))
}

/// Clear all recorded warnings, for every thread
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warn_once_records_message() {
        warn_once("Test", "first message");
        assert!(was_warned("Test", "first message"));
        assert!(!was_warned("Test", "never emitted"));
    }

    #[test]
    fn test_same_message_different_component_is_distinct() {
        warn_once("Tokenizer", "shared text");
        assert!(was_warned("Tokenizer", "shared text"));
        assert!(!was_warned("Parser", "shared text"));
    }
}
