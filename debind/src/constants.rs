//! Shared marker tokens and lazily compiled regex patterns.

use regex::Regex;
use std::sync::OnceLock;

/// Lowercase token identifying the framework in import statements.
pub const FRAMEWORK_MARKER: &str = "butterknife";

/// Leading-call shape of a framework bind statement.
pub const BIND_CALL_MARKER: &str = "ButterKnife.bind(";

/// Token guarding anchor-statement deletion in the cleanup pass.
pub const FRAMEWORK_TYPE_MARKER: &str = "ButterKnife";

/// Declared-type token of the teardown field.
pub const UNBINDER_TYPE: &str = "Unbinder";

/// Simple name of the debounce listener interface to replace.
pub const DEBOUNCING_LISTENER: &str = "DebouncingOnClickListener";

/// Qualified name of the framework's own debounce listener import.
pub const DEBOUNCING_IMPORT: &str = "butterknife.internal.DebouncingOnClickListener";

/// Reference-binding annotation simple name.
pub const BIND_VIEW_ANNOTATION: &str = "BindView";

/// Click-binding annotation simple name.
pub const ON_CLICK_ANNOTATION: &str = "OnClick";

/// Name of the generated view-binding method.
pub const BIND_VIEWS_METHOD: &str = "__bindViews";

/// Name of the generated click-binding method.
pub const BIND_CLICKS_METHOD: &str = "__bindClicks";

/// Configuration file looked up at the project root.
pub const CONFIG_FILENAME: &str = ".debind.toml";

/// File extension of eligible compilation units.
pub const JAVA_EXTENSION: &str = "java";

/// Folders excluded from traversal unless overridden in configuration.
pub const DEFAULT_EXCLUDE_FOLDERS: &[&str] = &["build", "out", ".git", ".gradle", "generated"];

/// Regex matching a class or interface declaration of the debounce listener.
///
/// # Panics
///
/// Panics if the regex pattern is invalid.
pub fn get_listener_decl_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::expect_used)]
    RE.get_or_init(|| {
        Regex::new(r"\b(?:class|interface)\s+DebouncingOnClickListener\b")
            .expect("Invalid listener declaration regex pattern")
    })
}

/// Regex extracting the package name of a Java source file.
///
/// # Panics
///
/// Panics if the regex pattern is invalid.
pub fn get_package_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::expect_used)]
    RE.get_or_init(|| {
        Regex::new(r"(?m)^\s*package\s+([\w.]+)\s*;").expect("Invalid package regex pattern")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listener_decl_re_matches_class_and_interface() {
        assert!(get_listener_decl_re().is_match("public abstract class DebouncingOnClickListener implements View.OnClickListener {"));
        assert!(get_listener_decl_re().is_match("interface DebouncingOnClickListener {"));
        assert!(!get_listener_decl_re().is_match("class MyDebouncingOnClickListenerAdapter {"));
    }

    #[test]
    fn package_re_extracts_name() {
        let caps = get_package_re()
            .captures("// header\npackage com.example.widget;\n")
            .unwrap();
        assert_eq!(&caps[1], "com.example.widget");
    }
}
