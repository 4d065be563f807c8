use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Interner shared by every element id.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Monotonic suffix shared by every generated ID.
static COUNTER: AtomicU64 = AtomicU64::new(0);

/// A lightweight, interned identifier for placed elements.
/// Wraps a `Spur`, so ids are `Copy` and compare by index.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(Spur);

impl ElementId {
    /// Intern a string as an ElementId, or return the existing one.
    pub fn intern(s: &str) -> Self {
        ElementId(INTERNER.get_or_intern(s))
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    /// Generate an ID with a shape-type prefix (e.g. `signal_3`, `track_12`).
    /// An empty prefix falls back to `element`.
    pub fn with_prefix(prefix: &str) -> Self {
        let prefix = if prefix.is_empty() { "element" } else { prefix };
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        Self::intern(&format!("{prefix}_{n}"))
    }

    /// Generate a prefixed ID that `taken` reports as unused.
    ///
    /// Lists loaded from elsewhere may already hold IDs matching the
    /// generator's pattern, so candidates are drawn until one is free.
    pub fn fresh(prefix: &str, taken: impl Fn(ElementId) -> bool) -> Self {
        loop {
            let id = Self::with_prefix(prefix);
            if !taken(id) {
                return id;
            }
            log::trace!("id {} already in use, drawing another", id.as_str());
        }
    }
}

impl fmt::Debug for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ElementId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ElementId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(ElementId::intern(&s))
    }
}
