//! Extension filtering for directory expansion.

use std::path::Path;

use crate::domain::model::FilterSpec;

/// Predicate built from a [`FilterSpec`].
///
/// An entry matches a file when the file name ends with it, so single extensions (`.ts`) and
/// compound ones (`.d.ts`) both work. Exclusion always wins over inclusion.
#[derive(Debug, Clone, Default)]
pub struct ExtensionFilter {
    include: Vec<String>,
    exclude: Vec<String>,
}

impl ExtensionFilter {
    pub fn new(spec: &FilterSpec) -> Self {
        Self {
            include: normalize_all(&spec.include),
            exclude: normalize_all(&spec.exclude),
        }
    }

    /// Returns whether a file found during a directory walk should be captured.
    pub fn accepts(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            return self.include.is_empty();
        };

        let included = self.include.is_empty() || self.include.iter().any(|ext| matches(name, ext));
        let excluded = self.exclude.iter().any(|ext| matches(name, ext));
        included && !excluded
    }
}

/// Parse a comma-separated extension list such as `".ts, js"` into normalized entries.
pub fn parse_extension_list(raw: &str) -> Vec<String> {
    raw.split(',').filter_map(normalize_extension).collect()
}

fn normalize_all(entries: &[String]) -> Vec<String> {
    entries
        .iter()
        .filter_map(|entry| normalize_extension(entry))
        .collect()
}

fn normalize_extension(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "." {
        return None;
    }
    if trimmed.starts_with('.') {
        Some(trimmed.to_owned())
    } else {
        Some(format!(".{trimmed}"))
    }
}

fn matches(name: &str, ext: &str) -> bool {
    name.len() > ext.len() && name.ends_with(ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(include: &[&str], exclude: &[&str]) -> ExtensionFilter {
        ExtensionFilter::new(&FilterSpec {
            include: include.iter().map(|s| s.to_string()).collect(),
            exclude: exclude.iter().map(|s| s.to_string()).collect(),
        })
    }

    #[test]
    fn empty_spec_accepts_everything() {
        let filter = filter(&[], &[]);
        assert!(filter.accepts(Path::new("src/a.ts")));
        assert!(filter.accepts(Path::new("Makefile")));
    }

    #[test]
    fn include_restricts_to_listed_extensions() {
        let filter = filter(&[".ts", "rs"], &[]);
        assert!(filter.accepts(Path::new("a.ts")));
        assert!(filter.accepts(Path::new("lib.rs")));
        assert!(!filter.accepts(Path::new("b.js")));
        assert!(!filter.accepts(Path::new("Makefile")));
    }

    #[test]
    fn exclude_wins_over_include() {
        let filter1 = filter(&[".ts"], &[".ts"]);
        assert!(!filter1.accepts(Path::new("a.ts")));

        let filter2 = filter(&[".ts"], &[".d.ts"]);
        assert!(filter2.accepts(Path::new("a.ts")));
        assert!(!filter2.accepts(Path::new("types.d.ts")));
    }

    #[test]
    fn bare_dotfile_is_not_an_extension_match() {
        let filter = filter(&[".env"], &[]);
        assert!(!filter.accepts(Path::new(".env")));
        assert!(filter.accepts(Path::new("local.env")));
    }

    #[test]
    fn parses_comma_separated_lists() {
        assert_eq!(
            parse_extension_list(" .ts, js ,, ."),
            vec![".ts".to_string(), ".js".to_string()]
        );
        assert!(parse_extension_list("").is_empty());
    }
}
