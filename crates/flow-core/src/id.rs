use lasso::{Spur, ThreadedRodeo};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

/// Global string interner for element IDs.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// A lightweight, interned identifier for flowchart elements.
/// Internally a 4-byte `Spur` index.
///
/// Hosts hand us ids as either strings or integers. Both are interned as
/// text; an id whose text is a canonical non-negative integer is written
/// back out as a JSON number so documents round-trip unchanged.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(Spur);

impl ElementId {
    /// Intern a new string as an ElementId, or return existing if already interned.
    pub fn intern(s: &str) -> Self {
        ElementId(INTERNER.get_or_intern(s))
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    /// The id as an integer, when its text is a canonical integer.
    pub fn as_number(&self) -> Option<u64> {
        let s = self.as_str();
        s.parse::<u64>().ok().filter(|n| n.to_string() == s)
    }

    /// Generate an ID with a type prefix (e.g. `task_1`, `connector_2`).
    /// Callers that need uniqueness within a graph must check for clashes
    /// with ids loaded from JSON.
    pub fn with_prefix(prefix: &str) -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        Self::intern(&format!("{prefix}_{n}"))
    }
}

impl fmt::Debug for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.as_str())
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ElementId {
    fn from(s: &str) -> Self {
        Self::intern(s)
    }
}

impl Serialize for ElementId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_number() {
            Some(n) => serializer.serialize_u64(n),
            None => serializer.serialize_str(self.as_str()),
        }
    }
}

struct ElementIdVisitor;

impl Visitor<'_> for ElementIdVisitor {
    type Value = ElementId;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string or integer element id")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<ElementId, E> {
        Ok(ElementId::intern(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<ElementId, E> {
        Ok(ElementId::intern(&v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<ElementId, E> {
        Ok(ElementId::intern(&v.to_string()))
    }
}

impl<'de> Deserialize<'de> for ElementId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ElementIdVisitor)
    }
}
