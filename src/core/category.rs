use serde::{Deserialize, Serialize};

/// Default category for new documents. Always present.
pub const GENERAL: &str = "General";

/// Scratch category for unnamed work. Always present.
pub const DRAFTS: &str = "Drafts";

/// Protected categories exist from the start and cannot be deleted or
/// renamed.
pub fn is_protected(name: &str) -> bool {
    name == GENERAL || name == DRAFTS
}

/// The tracked list of known category names.
///
/// Insertion order is preserved; the protected defaults always occupy the
/// first two slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySet {
    names: Vec<String>,
}

impl Default for CategorySet {
    fn default() -> Self {
        Self {
            names: vec![GENERAL.to_string(), DRAFTS.to_string()],
        }
    }
}

impl CategorySet {
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Add a category. Duplicates and empty names are ignored.
    pub fn add(&mut self, name: &str) -> bool {
        if name.is_empty() || self.contains(name) {
            return false;
        }
        self.names.push(name.to_string());
        true
    }

    /// Remove a category. No-op on protected or unknown names.
    pub fn remove(&mut self, name: &str) -> bool {
        if is_protected(name) || !self.contains(name) {
            return false;
        }
        self.names.retain(|n| n != name);
        true
    }

    /// Rename a category. No-op when either end is protected, the source is
    /// unknown, or the target already exists.
    pub fn rename(&mut self, old: &str, new: &str) -> bool {
        if is_protected(old) || is_protected(new) || new.is_empty() || self.contains(new) {
            return false;
        }
        match self.names.iter_mut().find(|n| *n == old) {
            Some(slot) => {
                *slot = new.to_string();
                true
            }
            None => false,
        }
    }

    /// Re-register a name seen on a document, e.g. one pulled from the
    /// backend under a category this client has not tracked yet.
    pub fn ensure(&mut self, name: &str) {
        self.add(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_present_and_protected() {
        let cats = CategorySet::default();
        assert_eq!(cats.names(), &[GENERAL.to_string(), DRAFTS.to_string()]);
        assert!(is_protected(GENERAL));
        assert!(is_protected(DRAFTS));
    }

    #[test]
    fn removing_protected_is_a_noop() {
        let mut cats = CategorySet::default();
        assert!(!cats.remove(GENERAL));
        assert!(!cats.remove(DRAFTS));
        assert_eq!(cats.names().len(), 2);
    }

    #[test]
    fn renaming_protected_is_a_noop() {
        let mut cats = CategorySet::default();
        assert!(!cats.rename(DRAFTS, "Scratch"));
        assert!(!cats.rename("Work", GENERAL));
        assert_eq!(cats.names(), &[GENERAL.to_string(), DRAFTS.to_string()]);
    }

    #[test]
    fn add_remove_rename_plain_categories() {
        let mut cats = CategorySet::default();
        assert!(cats.add("Work"));
        assert!(!cats.add("Work"));
        assert!(cats.rename("Work", "Projects"));
        assert!(cats.contains("Projects"));
        assert!(cats.remove("Projects"));
        assert!(!cats.contains("Projects"));
    }

    #[test]
    fn rename_to_existing_name_is_rejected() {
        let mut cats = CategorySet::default();
        cats.add("Work");
        cats.add("Home");
        assert!(!cats.rename("Work", "Home"));
        assert!(cats.contains("Work"));
    }
}
