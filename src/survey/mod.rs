//! Survey requests, data categories, and prefix resolution.

mod resolver;

pub use resolver::{Resolution, ResolvedSurvey, SURVEY_DEPTH, SurveyResolver};

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::store::DELIMITER;

/// Invalid survey request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    /// No survey names were supplied.
    #[error("at least one survey name is required")]
    Empty,

    /// A name is blank.
    #[error("survey names must not be blank")]
    BlankName,

    /// A name contains the key delimiter and can never match a survey prefix.
    #[error("invalid survey name '{name}': names must not contain '{DELIMITER}'")]
    ContainsDelimiter {
        /// The rejected name.
        name: String,
    },
}

/// Distinct survey names to resolve, in the order first given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyRequest {
    names: Vec<String>,
}

impl SurveyRequest {
    /// Builds a request, dropping repeated names.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError`] when no names are given or a name is blank or
    /// contains the delimiter.
    pub fn new<I, S>(names: I) -> Result<Self, RequestError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            if name.trim().is_empty() {
                return Err(RequestError::BlankName);
            }
            if name.contains(DELIMITER) {
                return Err(RequestError::ContainsDelimiter { name });
            }
            if unique.contains(&name) {
                warn!(survey = %name, "ignoring repeated survey name");
                continue;
            }
            unique.push(name);
        }

        if unique.is_empty() {
            return Err(RequestError::Empty);
        }
        Ok(Self { names: unique })
    }

    /// Requested names.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of distinct names requested.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Always false; kept for the `len`/`is_empty` pairing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Category of survey data available for download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DataType {
    /// Multibeam bathymetry (`mb/`).
    Multibeam,
    /// Crowdsourced bathymetry.
    Crowdsourced,
    /// Water column sonar data.
    WaterColumn,
    /// Trackline geophysics.
    Trackline,
}

impl DataType {
    /// Namespace root for this category, or `None` when retrieval is not
    /// available yet.
    #[must_use]
    pub fn namespace_root(self) -> Option<&'static str> {
        match self {
            Self::Multibeam => Some("mb/"),
            Self::Crowdsourced | Self::WaterColumn | Self::Trackline => None,
        }
    }

    /// Human-readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Multibeam => "multibeam bathymetry",
            Self::Crowdsourced => "crowdsourced bathymetry",
            Self::WaterColumn => "water column",
            Self::Trackline => "trackline",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_request_keeps_first_occurrence_order() {
        let request = SurveyRequest::new(["b", "a", "b", "c", "a"]).unwrap();
        assert_eq!(request.names(), ["b", "a", "c"]);
        assert_eq!(request.len(), 3);
        assert!(!request.is_empty());
    }

    #[test]
    fn test_request_rejects_empty() {
        let names: Vec<String> = Vec::new();
        assert_eq!(SurveyRequest::new(names), Err(RequestError::Empty));
    }

    #[test]
    fn test_request_rejects_blank_name() {
        assert_eq!(
            SurveyRequest::new(["H12345", " "]),
            Err(RequestError::BlankName)
        );
    }

    #[test]
    fn test_request_rejects_delimiter_in_name() {
        let result = SurveyRequest::new(["mb/ship/H12345"]);
        assert!(matches!(
            result,
            Err(RequestError::ContainsDelimiter { ref name }) if name == "mb/ship/H12345"
        ));
    }

    #[test]
    fn test_only_multibeam_has_namespace() {
        assert_eq!(DataType::Multibeam.namespace_root(), Some("mb/"));
        assert_eq!(DataType::Crowdsourced.namespace_root(), None);
        assert_eq!(DataType::WaterColumn.namespace_root(), None);
        assert_eq!(DataType::Trackline.namespace_root(), None);
    }

    #[test]
    fn test_data_type_display() {
        assert_eq!(DataType::WaterColumn.to_string(), "water column");
    }
}
