use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Line-ending conversion applied to content with no explicit `text`
/// attribute.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutoCrlf {
    /// No conversion unless an attribute asks for it.
    #[default]
    False,
    /// Normalise to LF on the way in, write CRLF on the way out.
    True,
    /// Normalise to LF on the way in only.
    Input,
}

/// Line ending written to the working tree for text content.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Eol {
    Lf,
    Crlf,
    /// CRLF on Windows, LF elsewhere.
    #[default]
    Native,
}

impl Eol {
    pub fn is_crlf(self) -> bool {
        match self {
            Self::Lf => false,
            Self::Crlf => true,
            Self::Native => cfg!(windows),
        }
    }
}

/// One gitattributes-style line: a glob plus the attributes it sets.
///
/// Unset fields leave whatever an earlier matching rule decided.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeRule {
    pub pattern: String,
    /// `Some(true)` forces text handling, `Some(false)` marks binary.
    pub text: Option<bool>,
    pub eol: Option<Eol>,
    pub ident: Option<bool>,
    /// Name of a driver in [`FilterConfig::drivers`].
    pub filter: Option<String>,
}

impl AttributeRule {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            ..Default::default()
        }
    }

    pub fn text(mut self, text: bool) -> Self {
        self.text = Some(text);
        self
    }

    pub fn eol(mut self, eol: Eol) -> Self {
        self.eol = Some(eol);
        self
    }

    pub fn ident(mut self, ident: bool) -> Self {
        self.ident = Some(ident);
        self
    }

    pub fn filter(mut self, driver: impl Into<String>) -> Self {
        self.filter = Some(driver.into());
        self
    }
}

/// External clean/smudge commands for a named driver.
///
/// Commands run through the platform shell; `%f` is replaced by the quoted
/// path being filtered.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Command run when content moves into storage.
    pub clean: Option<String>,
    /// Command run when content moves into the working tree.
    pub smudge: Option<String>,
    /// When set, a missing command or a failing process is an error instead
    /// of a pass-through.
    pub required: bool,
}

/// Filter configuration for a repository.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub auto_crlf: AutoCrlf,
    pub eol: Eol,
    /// Rules in file order; later matches override earlier ones.
    pub attributes: Vec<AttributeRule>,
    pub drivers: BTreeMap<String, DriverConfig>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_do_nothing() {
        let config = FilterConfig::default();
        assert_eq!(config.auto_crlf, AutoCrlf::False);
        assert_eq!(config.eol, Eol::Native);
        assert!(config.attributes.is_empty());
        assert!(config.drivers.is_empty());
    }

    #[test]
    fn parses_from_toml() {
        let config: FilterConfig = toml::from_str(
            r#"
            auto_crlf = "input"

            [[attributes]]
            pattern = "*.txt"
            text = true
            eol = "crlf"

            [[attributes]]
            pattern = "*.psd"
            filter = "media"

            [drivers.media]
            clean = "media-tool clean %f"
            required = true
            "#,
        )
        .unwrap();

        assert_eq!(config.auto_crlf, AutoCrlf::Input);
        assert_eq!(config.attributes.len(), 2);
        assert_eq!(config.attributes[0], AttributeRule::new("*.txt").text(true).eol(Eol::Crlf));
        assert_eq!(config.attributes[1].filter.as_deref(), Some("media"));
        let media = &config.drivers["media"];
        assert!(media.required);
        assert!(media.smudge.is_none());
    }

    #[test]
    fn eol_resolution() {
        assert!(Eol::Crlf.is_crlf());
        assert!(!Eol::Lf.is_crlf());
        assert_eq!(Eol::Native.is_crlf(), cfg!(windows));
    }
}
