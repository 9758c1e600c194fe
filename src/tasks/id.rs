//! Task ID generation.
//!
//! IDs are the slugified task name followed by a short random suffix, e.g.
//! `book-the-venue-3f9a12c4`. Nameless tasks get a `task-` prefix.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Counter for deterministic IDs in tests.
static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Whether to use deterministic IDs.
static USE_DETERMINISTIC_IDS: AtomicBool = AtomicBool::new(false);

/// Maximum slug length before the suffix.
const MAX_SLUG_LEN: usize = 40;

/// Enable deterministic ID generation for testing.
///
/// When enabled, suffixes come from a counter starting at zero instead of
/// random data.
pub fn enable_deterministic_ids() {
    USE_DETERMINISTIC_IDS.store(true, Ordering::SeqCst);
    TEST_COUNTER.store(0, Ordering::SeqCst);
}

/// Disable deterministic ID generation.
pub fn disable_deterministic_ids() {
    USE_DETERMINISTIC_IDS.store(false, Ordering::SeqCst);
}

/// Convert a task name to a slug.
///
/// Lowercases ASCII alphanumerics, turns every other run of characters into
/// a single hyphen, trims hyphens at both ends and truncates to 40 characters.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_was_hyphen = true;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }

    if slug.len() > MAX_SLUG_LEN {
        slug.truncate(MAX_SLUG_LEN);
    }
    while slug.ends_with('-') {
        slug.pop();
    }

    slug
}

fn suffix() -> String {
    if USE_DETERMINISTIC_IDS.load(Ordering::SeqCst) {
        let count = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        format!("{count:08x}")
    } else {
        let uuid = uuid::Uuid::new_v4().simple().to_string();
        uuid[..8].to_string()
    }
}

/// Generate a fresh task ID from a task name.
#[must_use]
pub fn generate_task_id(name: &str) -> String {
    let slug = slugify(name);
    let suffix = suffix();

    if slug.is_empty() {
        format!("task-{suffix}")
    } else {
        format!("{slug}-{suffix}")
    }
}
