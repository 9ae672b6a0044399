//! Participant identifiers backed by a process-wide string interner.
//!
//! Lifelines, tiles and resolved layouts refer to participants through [`Id`],
//! a `Copy` handle that compares in constant time. Interning is shared by all
//! layout sessions; it holds no per-diagram state.

use std::{
    fmt,
    sync::{Mutex, MutexGuard, OnceLock, PoisonError},
};

use string_interner::{DefaultStringInterner, DefaultSymbol};

static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

/// Locks the interner. A poisoned lock still guards a consistent table since
/// interning never leaves it half-written, so the guard is recovered.
fn interner() -> MutexGuard<'static, DefaultStringInterner> {
    INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Interned participant identifier.
///
/// # Examples
///
/// ```
/// use tessera_core::identifier::Id;
///
/// let alice = Id::new("alice");
/// assert_eq!(alice, Id::new("alice"));
/// assert_eq!(alice, "alice");
/// assert_eq!(alice.to_string(), "alice");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Interns `name` and returns its identifier.
    pub fn new(name: &str) -> Self {
        Self(interner().get_or_intern(name))
    }

    /// Returns the interned string for this identifier.
    pub fn as_string(&self) -> String {
        interner()
            .resolve(self.0)
            .map(str::to_owned)
            .unwrap_or_default()
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}

impl From<&str> for Id {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    fn eq(&self, other: &str) -> bool {
        interner().resolve(self.0) == Some(other)
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_name_same_id() {
        assert_eq!(Id::new("bob"), Id::new("bob"));
        assert_ne!(Id::new("bob"), Id::new("carol"));
    }

    #[test]
    fn test_compare_with_str() {
        let id: Id = "server".into();
        assert!(id == "server");
        assert!(id != "client");
    }

    #[test]
    fn test_display_round_trips_name() {
        assert_eq!(format!("{}", Id::new("db::primary")), "db::primary");
    }
}
