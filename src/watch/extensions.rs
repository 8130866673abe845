// src/watch/extensions.rs

//! Normalised allow-list of watched file extensions.

use std::fmt;

/// Sentinel entry meaning "every extension".
pub const WILDCARD: &str = "*";

/// Delimiter every normalised extension starts with.
pub const DELIMITER: char = '.';

/// Allow-list of file extensions, e.g. `[".go", ".tmpl"]`.
///
/// Entries are normalised on construction:
/// - empty strings are dropped,
/// - `"go"` becomes `".go"`,
/// - the wildcard `"*"` is kept verbatim.
///
/// An empty set is valid; it simply never matches anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionSet {
    exts: Vec<String>,
}

impl ExtensionSet {
    pub fn normalize<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut exts: Vec<String> = Vec::new();
        for ext in raw {
            let ext = ext.as_ref().trim();
            if ext.is_empty() {
                continue;
            }
            let ext = if ext == WILDCARD || ext.starts_with(DELIMITER) {
                ext.to_string()
            } else {
                format!("{DELIMITER}{ext}")
            };
            if !exts.contains(&ext) {
                exts.push(ext);
            }
        }
        Self { exts }
    }

    /// Whether the wildcard sentinel is present.
    pub fn is_wildcard(&self) -> bool {
        self.exts.iter().any(|e| e == WILDCARD)
    }

    pub fn is_empty(&self) -> bool {
        self.exts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.exts.iter().map(String::as_str)
    }

    /// True if `path` ends with any configured extension, or the set holds
    /// the wildcard.
    pub fn matches(&self, path: &str) -> bool {
        for ext in &self.exts {
            if ext == WILDCARD {
                return true;
            }
            if path.ends_with(ext.as_str()) {
                return true;
            }
        }
        false
    }
}

impl fmt::Display for ExtensionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.exts.join(", "))
    }
}
