//! Gitattributes-style matching of paths against [`AttributeRule`]s.

use std::path::{Component, Path};

use ignore::gitignore::{Gitignore, GitignoreBuilder};

use crate::config::{AttributeRule, Eol};
use crate::error::{FilterError, FilterResult};

/// Attributes in effect for one path after all matching rules are applied.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PathAttributes {
    pub text: Option<bool>,
    pub eol: Option<Eol>,
    pub ident: bool,
    pub filter: Option<String>,
}

/// Compiled attribute rules.
pub struct Attributes {
    rules: Vec<(Gitignore, AttributeRule)>,
}

impl Attributes {
    /// Compile `rules`; patterns use gitignore glob syntax.
    pub fn compile(rules: &[AttributeRule]) -> FilterResult<Self> {
        let mut compiled = Vec::with_capacity(rules.len());
        for rule in rules {
            compiled.push((compile_pattern(&rule.pattern)?, rule.clone()));
        }
        Ok(Self { rules: compiled })
    }

    /// Resolve the attributes for a repository-relative path.
    ///
    /// Empty, absolute and `..`-bearing paths are rejected.
    pub fn for_path(&self, path: &str) -> FilterResult<PathAttributes> {
        if !is_repo_relative(path) {
            return Err(FilterError::InvalidPath(path.to_string()));
        }
        let mut attrs = PathAttributes::default();
        for (matcher, rule) in &self.rules {
            if !matcher.matched_path_or_any_parents(path, false).is_ignore() {
                continue;
            }
            if rule.text.is_some() {
                attrs.text = rule.text;
            }
            if rule.eol.is_some() {
                attrs.eol = rule.eol;
            }
            if let Some(ident) = rule.ident {
                attrs.ident = ident;
            }
            if rule.filter.is_some() {
                attrs.filter = rule.filter.clone();
            }
        }
        Ok(attrs)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl std::fmt::Debug for Attributes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attributes")
            .field("rules", &self.rules.len())
            .finish()
    }
}

fn is_repo_relative(path: &str) -> bool {
    !path.is_empty()
        && Path::new(path)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}

fn compile_pattern(pattern: &str) -> FilterResult<Gitignore> {
    let invalid = |reason: String| FilterError::InvalidPattern {
        pattern: pattern.to_string(),
        reason,
    };
    if pattern.trim().is_empty() || pattern.starts_with('!') {
        return Err(invalid("pattern must be a non-negated glob".into()));
    }

    let mut builder = GitignoreBuilder::new(".");
    builder
        .add_line(None, pattern)
        .map_err(|e| invalid(e.to_string()))?;
    builder.build().map_err(|e| invalid(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(rules: Vec<AttributeRule>) -> Attributes {
        Attributes::compile(&rules).unwrap()
    }

    #[test]
    fn basename_glob_matches_anywhere() {
        let a = attrs(vec![AttributeRule::new("*.txt").text(true)]);
        assert_eq!(a.for_path("a.txt").unwrap().text, Some(true));
        assert_eq!(a.for_path("deep/dir/b.txt").unwrap().text, Some(true));
        assert_eq!(a.for_path("c.bin").unwrap().text, None);
    }

    #[test]
    fn directory_pattern_covers_children() {
        let a = attrs(vec![AttributeRule::new("vendor/").text(false)]);
        assert_eq!(a.for_path("vendor/lib/x.c").unwrap().text, Some(false));
        assert_eq!(a.for_path("src/x.c").unwrap().text, None);
    }

    #[test]
    fn later_rules_override_field_by_field() {
        let a = attrs(vec![
            AttributeRule::new("*").text(true).ident(true),
            AttributeRule::new("*.png").text(false),
            AttributeRule::new("*.png").filter("media"),
        ]);
        let png = a.for_path("img/logo.png").unwrap();
        assert_eq!(png.text, Some(false));
        assert!(png.ident);
        assert_eq!(png.filter.as_deref(), Some("media"));

        let txt = a.for_path("notes.txt").unwrap();
        assert_eq!(txt.text, Some(true));
        assert!(txt.filter.is_none());
    }

    #[test]
    fn negated_and_empty_patterns_rejected() {
        for pattern in ["!*.txt", "  "] {
            let err = Attributes::compile(&[AttributeRule::new(pattern)]).unwrap_err();
            assert!(matches!(err, FilterError::InvalidPattern { .. }));
        }
    }

    #[test]
    fn rooted_and_escaping_paths_rejected() {
        let a = attrs(vec![AttributeRule::new("*.txt").text(true)]);
        for path in ["/etc/hosts", "/abs.txt", "../up.txt", "a/../../b.txt", ""] {
            let err = a.for_path(path).unwrap_err();
            assert!(matches!(err, FilterError::InvalidPath(ref p) if p == path), "{path}");
        }
    }

    #[test]
    fn no_rules_means_defaults() {
        let a = attrs(Vec::new());
        assert!(a.is_empty());
        assert_eq!(a.for_path("x").unwrap(), PathAttributes::default());
    }
}
