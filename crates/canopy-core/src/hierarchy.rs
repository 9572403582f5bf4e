//! Parent identity translation for grouped directory objects.
//!
//! Storage records an object attached directly under the top of the
//! hierarchy with no parent at all, while every caller of the directory
//! sees an explicit parent: [`ROOT_IDENTIFIER`]. [`ParentIdentity`] is the
//! only place the two vocabularies meet.

/// Identifier of the synthetic root node of the hierarchy.
///
/// Stored object identifiers are UUID strings, so this value can never
/// name a real object.
pub const ROOT_IDENTIFIER: &str = "ROOT";

/// Returns `true` if `identifier` names the root node.
pub fn is_root(identifier: &str) -> bool {
    identifier == ROOT_IDENTIFIER
}

/// Translate a stored parent reference into the identifier callers see.
pub fn to_effective(stored: Option<&str>) -> &str {
    stored.unwrap_or(ROOT_IDENTIFIER)
}

/// Translate an effective parent identifier into its stored form.
pub fn to_stored(effective: &str) -> Option<&str> {
    if is_root(effective) {
        None
    } else {
        Some(effective)
    }
}

/// The parent of a grouped object, plus the parent it had when loaded.
///
/// A value can only be obtained through [`ParentIdentity::from_stored`],
/// so the initial-parent snapshot always exists and is taken exactly once.
/// Later calls to [`ParentIdentity::set_effective`] never touch it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentIdentity {
    stored: Option<String>,
    initial: String,
}

impl ParentIdentity {
    /// Wrap the parent reference of a freshly loaded or newly built record.
    pub fn from_stored(stored: Option<String>) -> Self {
        let initial = to_effective(stored.as_deref()).to_owned();
        Self { stored, initial }
    }

    /// The parent identifier as seen by callers. Never empty of meaning:
    /// an absent stored parent reads as [`ROOT_IDENTIFIER`].
    pub fn effective(&self) -> &str {
        to_effective(self.stored.as_deref())
    }

    /// Move the object under `identifier`. Passing [`ROOT_IDENTIFIER`]
    /// clears the stored reference.
    pub fn set_effective(&mut self, identifier: impl Into<String>) {
        let identifier = identifier.into();
        self.stored = if is_root(&identifier) {
            None
        } else {
            Some(identifier)
        };
    }

    /// The effective parent captured at construction.
    pub fn initial(&self) -> &str {
        &self.initial
    }

    /// The parent reference in storage form.
    pub fn stored(&self) -> Option<&str> {
        self.stored.as_deref()
    }

    /// Whether the object has been moved since it was loaded.
    pub fn has_moved(&self) -> bool {
        self.effective() != self.initial
    }
}
