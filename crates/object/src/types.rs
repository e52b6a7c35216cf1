use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Unique identifier for an object (renderable or view node).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub Uuid);

impl ObjectId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// First eight hex digits, for log lines and debug labels.
    pub fn short(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short())
    }
}

/// Stable identifier naming one capability or node kind.
///
/// Tags are compared by name, so two crates that agree on a name agree on
/// the tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeTag(&'static str);

impl TypeTag {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Process-wide modified-time clock. Shared by every object so times taken
/// from different objects are comparable.
static CLOCK: AtomicU64 = AtomicU64::new(0);

/// Advance the clock and return the new time.
pub fn next_mtime() -> u64 {
    CLOCK.fetch_add(1, Ordering::Relaxed) + 1
}

/// Latest time handed out by [`next_mtime`].
pub fn current_mtime() -> u64 {
    CLOCK.load(Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_id_uniqueness() {
        let a = ObjectId::new();
        let b = ObjectId::new();
        assert_ne!(a, b);
        assert_eq!(a.short().len(), 8);
    }

    #[test]
    fn tags_compare_by_name() {
        assert_eq!(TypeTag::new("Actor"), TypeTag::new("Actor"));
        assert_ne!(TypeTag::new("Actor"), TypeTag::new("Volume"));
        assert_eq!(TypeTag::new("Renderer").to_string(), "Renderer");
    }

    #[test]
    fn clock_is_monotonic() {
        let a = next_mtime();
        let b = next_mtime();
        assert!(b > a);
        assert!(current_mtime() >= b);
    }
}
