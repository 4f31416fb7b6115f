//! Localized path segments.
//!
//! # Responsibilities
//! - Map canonical segments to the active locale's display text
//! - Map display text back to canonical segments
//!
//! # Design Decisions
//! - The active locale is fixed at construction
//! - Without a mapping for the active locale both directions are identity

use std::collections::{BTreeMap, HashMap};

use crate::routing::params::Params;
use crate::routing::path::{join, tokenize, SEPARATOR};
use crate::routing::target::PARAM_MARKER;

/// Bidirectional segment mapping for one locale.
#[derive(Debug, Clone, Default)]
pub struct Localizer {
    locale: String,
    root: String,
    forward: HashMap<String, String>,
    reverse: HashMap<String, String>,
}

impl Localizer {
    /// Selects `locale` out of all configured localizations.
    pub fn new(
        locale: &str,
        root: &str,
        localizations: &BTreeMap<String, BTreeMap<String, String>>,
    ) -> Self {
        let mut localizer = Self {
            locale: locale.to_string(),
            root: root.to_string(),
            ..Self::default()
        };
        if let Some(map) = localizations.get(locale) {
            for (canonical, localized) in map {
                localizer.forward.insert(canonical.clone(), localized.clone());
                // First canonical key wins on duplicate values.
                localizer
                    .reverse
                    .entry(localized.clone())
                    .or_insert_with(|| canonical.clone());
            }
        }
        localizer
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn is_identity(&self) -> bool {
        self.forward.is_empty()
    }

    /// Canonical route to a user-facing path under the root.
    ///
    /// `$name` segments are replaced by `params[name]` when supplied.
    pub fn localize(&self, route: &str, params: Option<&Params>) -> String {
        if self.is_identity() {
            return route.to_string();
        }
        let parts: Vec<String> = tokenize(route)
            .into_iter()
            .map(|segment| match segment.strip_prefix(PARAM_MARKER) {
                Some(name) => params
                    .and_then(|p| p.get(name))
                    .unwrap_or(segment)
                    .to_string(),
                None => self
                    .forward
                    .get(segment)
                    .cloned()
                    .unwrap_or_else(|| segment.to_string()),
            })
            .collect();
        format!("{}{}{}", self.root, SEPARATOR, join(&parts))
    }

    /// User-facing path back to canonical segments.
    pub fn unlocalize(&self, path: &str) -> String {
        if self.is_identity() {
            return path.to_string();
        }
        let parts: Vec<&str> = tokenize(path)
            .into_iter()
            .map(|segment| self.unlocalize_segment(segment))
            .collect();
        join(&parts)
    }

    /// Reverse lookup of a single segment; unmapped segments pass through.
    pub fn unlocalize_segment<'a>(&'a self, segment: &'a str) -> &'a str {
        self.reverse
            .get(segment)
            .map(String::as_str)
            .unwrap_or(segment)
    }
}
