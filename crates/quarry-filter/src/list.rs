//! Filter lists: the transforms that apply to one path in one direction.

use std::path::Path;

use quarry_types::ObjectId;
use tracing::{debug, trace};

use crate::attributes::{Attributes, PathAttributes};
use crate::config::{AutoCrlf, FilterConfig};
use crate::crlf::{CrlfFilter, TextDetection};
use crate::driver::DriverFilter;
use crate::error::{FilterError, FilterResult};
use crate::ident::IdentFilter;

/// Which way content is moving.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// From storage into the working tree (checkout, smudge).
    ToWorktree,
    /// From the working tree into storage (staging, clean).
    ToStore,
}

/// What is being filtered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterSource {
    /// Repository-relative path the content belongs to.
    pub path: String,
    pub direction: Direction,
    /// Blob id of the content, when known (checkout).
    pub object_id: Option<ObjectId>,
}

impl FilterSource {
    pub fn new(path: impl Into<String>, direction: Direction) -> Self {
        Self {
            path: path.into(),
            direction,
            object_id: None,
        }
    }

    pub fn with_object_id(mut self, id: ObjectId) -> Self {
        self.object_id = Some(id);
        self
    }
}

/// A single content transform.
pub trait Filter: Send + Sync {
    fn name(&self) -> &str;

    /// Transform `input`. Filters that do not apply to the content return
    /// it unchanged.
    fn apply(&self, source: &FilterSource, input: Vec<u8>) -> FilterResult<Vec<u8>>;
}

/// Ordered filters for one path and direction.
pub struct FilterList {
    source: FilterSource,
    filters: Vec<Box<dyn Filter>>,
}

impl FilterList {
    /// A list that passes content through unchanged.
    pub fn empty(path: impl Into<String>, direction: Direction) -> Self {
        Self {
            source: FilterSource::new(path, direction),
            filters: Vec::new(),
        }
    }

    pub fn push(&mut self, filter: Box<dyn Filter>) {
        self.filters.push(filter);
    }

    /// Attach the blob id used by filters that embed it (ident).
    pub fn with_object_id(mut self, id: ObjectId) -> Self {
        self.source.object_id = Some(id);
        self
    }

    pub fn source(&self) -> &FilterSource {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Filter names in application order.
    pub fn names(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    /// Run every filter over `input` in order.
    pub fn apply_to_data(&self, input: Vec<u8>) -> FilterResult<Vec<u8>> {
        self.filters.iter().try_fold(input, |data, filter| {
            trace!(filter = filter.name(), path = %self.source.path, len = data.len(), "applying filter");
            filter.apply(&self.source, data)
        })
    }

    /// Read `file` from disk and run every filter over its content.
    pub fn apply_to_file(&self, file: &Path) -> FilterResult<Vec<u8>> {
        let data = std::fs::read(file).map_err(|source| FilterError::Io {
            path: file.to_path_buf(),
            source,
        })?;
        self.apply_to_data(data)
    }
}

impl std::fmt::Debug for FilterList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterList")
            .field("source", &self.source)
            .field("filters", &self.names())
            .finish()
    }
}

/// Compiled filter configuration for a repository.
#[derive(Debug)]
pub struct Filters {
    config: FilterConfig,
    attributes: Attributes,
}

impl Filters {
    pub fn new(config: FilterConfig) -> FilterResult<Self> {
        let attributes = Attributes::compile(&config.attributes)?;
        Ok(Self { config, attributes })
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn attributes_for(&self, path: &str) -> FilterResult<PathAttributes> {
        self.attributes.for_path(path)
    }

    /// Build the filter list for `path` moving in `direction`.
    ///
    /// Into storage the order is driver, ident, crlf; into the working tree
    /// it is reversed.
    pub fn load(&self, path: &str, direction: Direction) -> FilterResult<FilterList> {
        let attrs = self.attributes.for_path(path)?;
        let mut stages: Vec<Box<dyn Filter>> = Vec::with_capacity(3);

        if let Some(driver) = self.driver_for(&attrs, direction)? {
            stages.push(Box::new(driver));
        }
        if attrs.ident {
            stages.push(Box::new(IdentFilter));
        }
        if let Some(crlf) = self.crlf_for(&attrs) {
            stages.push(Box::new(crlf));
        }
        if direction == Direction::ToWorktree {
            stages.reverse();
        }

        let mut list = FilterList::empty(path, direction);
        for stage in stages {
            list.push(stage);
        }
        debug!(path, ?direction, filters = ?list.names(), "filter list loaded");
        Ok(list)
    }

    fn driver_for(
        &self,
        attrs: &PathAttributes,
        direction: Direction,
    ) -> FilterResult<Option<DriverFilter>> {
        let Some(name) = attrs.filter.as_deref() else {
            return Ok(None);
        };
        let Some(driver) = self.config.drivers.get(name) else {
            debug!(driver = name, "no such filter driver configured; ignoring");
            return Ok(None);
        };
        let command = match direction {
            Direction::ToStore => driver.clean.as_deref(),
            Direction::ToWorktree => driver.smudge.as_deref(),
        };
        match command {
            Some(command) => Ok(Some(DriverFilter::new(name, command, driver.required))),
            None if driver.required => Err(FilterError::DriverNotConfigured(name.to_string())),
            None => Ok(None),
        }
    }

    fn crlf_for(&self, attrs: &PathAttributes) -> Option<CrlfFilter> {
        let auto_crlf = self.config.auto_crlf;
        let detection = match (attrs.text, attrs.eol) {
            (Some(false), _) => return None,
            (Some(true), _) | (None, Some(_)) => TextDetection::Declared,
            (None, None) if auto_crlf != AutoCrlf::False => TextDetection::Auto,
            (None, None) => return None,
        };
        let crlf_worktree = match (attrs.eol, auto_crlf) {
            (Some(eol), _) => eol.is_crlf(),
            (None, AutoCrlf::True) => true,
            (None, AutoCrlf::Input) => false,
            (None, AutoCrlf::False) => self.config.eol.is_crlf(),
        };
        Some(CrlfFilter::new(detection, crlf_worktree))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AttributeRule, DriverConfig, Eol};

    fn filters(config: FilterConfig) -> Filters {
        Filters::new(config).unwrap()
    }

    #[test]
    fn default_config_loads_empty_lists() {
        let f = filters(FilterConfig::default());
        let list = f.load("a.txt", Direction::ToStore).unwrap();
        assert!(list.is_empty());
        assert_eq!(list.apply_to_data(b"a\r\n".to_vec()).unwrap(), b"a\r\n");
    }

    #[test]
    fn auto_crlf_input_normalises_text() {
        let f = filters(FilterConfig {
            auto_crlf: AutoCrlf::Input,
            ..Default::default()
        });
        let list = f.load("b.txt", Direction::ToStore).unwrap();
        assert_eq!(list.names(), ["crlf"]);
        assert_eq!(list.apply_to_data(b"line1\r\n".to_vec()).unwrap(), b"line1\n");
    }

    #[test]
    fn binary_attribute_disables_crlf() {
        let f = filters(FilterConfig {
            auto_crlf: AutoCrlf::True,
            attributes: vec![AttributeRule::new("*.bin").text(false)],
            ..Default::default()
        });
        assert!(f.load("x.bin", Direction::ToStore).unwrap().is_empty());
        assert!(!f.load("x.txt", Direction::ToStore).unwrap().is_empty());
    }

    #[test]
    fn eol_attribute_declares_text() {
        let f = filters(FilterConfig {
            attributes: vec![AttributeRule::new("*.bat").eol(Eol::Crlf)],
            ..Default::default()
        });
        let out = f
            .load("run.bat", Direction::ToWorktree)
            .unwrap()
            .apply_to_data(b"echo\n".to_vec())
            .unwrap();
        assert_eq!(out, b"echo\r\n");
    }

    #[test]
    fn order_reverses_by_direction() {
        let mut drivers = std::collections::BTreeMap::new();
        drivers.insert(
            "media".to_string(),
            DriverConfig {
                clean: Some("cat".into()),
                smudge: Some("cat".into()),
                required: false,
            },
        );
        let f = filters(FilterConfig {
            attributes: vec![AttributeRule::new("*.c")
                .text(true)
                .ident(true)
                .filter("media")],
            drivers,
            ..Default::default()
        });
        assert_eq!(
            f.load("m.c", Direction::ToStore).unwrap().names(),
            ["media", "ident", "crlf"]
        );
        assert_eq!(
            f.load("m.c", Direction::ToWorktree).unwrap().names(),
            ["crlf", "ident", "media"]
        );
    }

    #[test]
    fn required_driver_without_command_fails_to_load() {
        let mut drivers = std::collections::BTreeMap::new();
        drivers.insert(
            "lfs".to_string(),
            DriverConfig {
                clean: None,
                smudge: Some("cat".into()),
                required: true,
            },
        );
        let f = filters(FilterConfig {
            attributes: vec![AttributeRule::new("*.psd").filter("lfs")],
            drivers,
            ..Default::default()
        });
        assert!(matches!(
            f.load("art.psd", Direction::ToStore),
            Err(FilterError::DriverNotConfigured(name)) if name == "lfs"
        ));
        assert_eq!(f.load("art.psd", Direction::ToWorktree).unwrap().len(), 1);
    }

    #[test]
    fn unknown_driver_is_ignored() {
        let f = filters(FilterConfig {
            attributes: vec![AttributeRule::new("*").filter("ghost")],
            ..Default::default()
        });
        assert!(f.load("x", Direction::ToStore).unwrap().is_empty());
    }

    #[test]
    fn apply_to_file_reports_io() {
        let dir = tempfile::tempdir().unwrap();
        let list = FilterList::empty("missing.txt", Direction::ToStore);
        let err = list.apply_to_file(&dir.path().join("missing.txt")).unwrap_err();
        assert!(err.is_io());
    }

    #[test]
    fn apply_to_file_reads_and_filters() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("b.txt");
        std::fs::write(&file, b"line1\r\n").unwrap();
        let f = filters(FilterConfig {
            attributes: vec![AttributeRule::new("*.txt").text(true)],
            ..Default::default()
        });
        let out = f
            .load("b.txt", Direction::ToStore)
            .unwrap()
            .apply_to_file(&file)
            .unwrap();
        assert_eq!(out, b"line1\n");
    }
}
