//! Resolution of the replacement debounce-listener class.
//!
//! Generated click wiring casts the handler to a `DebouncingOnClickListener`
//! that must come from the project itself, not from the framework being
//! removed. The engine depends only on the [`ListenerLookup`] capability;
//! the project-wide scan lives here and a fixed-result implementation backs
//! both configuration overrides and tests.

use std::fs;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::constants::{
    get_listener_decl_re, get_package_re, DEBOUNCING_LISTENER, FRAMEWORK_MARKER, JAVA_EXTENSION,
};

/// A resolved replacement listener class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerClass {
    /// Simple class name, e.g. `DebouncingOnClickListener`.
    pub simple_name: String,
    /// Fully qualified name used for the generated import.
    pub qualified_name: String,
}

impl ListenerClass {
    /// Build a listener class from its fully qualified name.
    #[must_use]
    pub fn from_qualified(qualified_name: &str) -> Self {
        let simple_name = qualified_name
            .rsplit('.')
            .next()
            .unwrap_or(qualified_name)
            .to_owned();
        Self {
            simple_name,
            qualified_name: qualified_name.to_owned(),
        }
    }
}

/// Capability to locate the replacement listener type.
///
/// Injected into the engine so the core stays testable with a stub; the
/// result is memoized per batch run by the caller.
pub trait ListenerLookup {
    /// Find a same-named listener class outside the framework's package, or
    /// `None` when the project has no replacement.
    fn find_replacement(&self) -> Option<ListenerClass>;
}

/// Lookup returning a fixed, pre-resolved class.
///
/// Backs the `listener_class` configuration override and unit tests.
#[derive(Debug, Clone)]
pub struct FixedListener(pub Option<ListenerClass>);

impl ListenerLookup for FixedListener {
    fn find_replacement(&self) -> Option<ListenerClass> {
        self.0.clone()
    }
}

/// Project-wide search for a non-framework `DebouncingOnClickListener`.
#[derive(Debug)]
pub struct ProjectListenerScan {
    root: PathBuf,
}

impl ProjectListenerScan {
    /// Create a scan rooted at the project directory.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn scan_file(path: &Path) -> Option<ListenerClass> {
        let content = fs::read_to_string(path).ok()?;
        if !get_listener_decl_re().is_match(&content) {
            return None;
        }
        let package = get_package_re()
            .captures(&content)
            .map(|c| c[1].to_owned())?;
        let qualified_name = format!("{package}.{DEBOUNCING_LISTENER}");
        if qualified_name.to_lowercase().contains(FRAMEWORK_MARKER) {
            return None;
        }
        Some(ListenerClass {
            simple_name: DEBOUNCING_LISTENER.to_owned(),
            qualified_name,
        })
    }
}

impl ListenerLookup for ProjectListenerScan {
    fn find_replacement(&self) -> Option<ListenerClass> {
        let walker = WalkBuilder::new(&self.root).build();
        for entry in walker.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(JAVA_EXTENSION) {
                continue;
            }
            if let Some(found) = Self::scan_file(path) {
                return Some(found);
            }
        }
        None
    }
}
