use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::catalog::{Catalog, Position};

/// A (chapter, section) pair marking one end of a test range
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RangeEndpoint {
    pub chapter: String,
    pub section: String,
}

impl RangeEndpoint {
    pub fn new(chapter: impl Into<String>, section: impl Into<String>) -> Self {
        Self {
            chapter: chapter.into(),
            section: section.into(),
        }
    }

    /// Resolve against a catalog, failing if the pair is not in it
    pub fn locate(&self, catalog: &Catalog) -> Result<Position, RangeError> {
        catalog
            .position(&self.chapter, &self.section)
            .ok_or_else(|| RangeError::EndpointNotFound {
                chapter: self.chapter.clone(),
                section: self.section.clone(),
            })
    }
}

impl fmt::Display for RangeEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.chapter, self.section)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("{chapter} {section} is not in the catalog")]
    EndpointNotFound { chapter: String, section: String },

    #[error("range end ({end}) comes before its start ({start})")]
    InvalidRange {
        start: RangeEndpoint,
        end: RangeEndpoint,
    },
}

/// A validated start/end pair. Start never comes after end in book order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeSelection {
    pub start: RangeEndpoint,
    pub end: RangeEndpoint,
}

impl RangeSelection {
    /// Validate an endpoint pair against a catalog
    pub fn new(
        catalog: &Catalog,
        start: RangeEndpoint,
        end: RangeEndpoint,
    ) -> Result<Self, RangeError> {
        check_order(catalog, &start, &end)?;
        Ok(Self { start, end })
    }

    pub fn is_single_section(&self) -> bool {
        self.start == self.end
    }
}

impl fmt::Display for RangeSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} から {} まで", self.start, self.end)
    }
}

/// Turn the four picks of the range picker into a validated selection
pub fn select_range(
    catalog: &Catalog,
    start_chapter: &str,
    start_section: &str,
    end_chapter: &str,
    end_section: &str,
) -> Result<RangeSelection, RangeError> {
    RangeSelection::new(
        catalog,
        RangeEndpoint::new(start_chapter, start_section),
        RangeEndpoint::new(end_chapter, end_section),
    )
}

/// Locate both endpoints and require `start <= end`. Returns their positions.
pub(crate) fn check_order(
    catalog: &Catalog,
    start: &RangeEndpoint,
    end: &RangeEndpoint,
) -> Result<(Position, Position), RangeError> {
    let start_pos = start.locate(catalog)?;
    let end_pos = end.locate(catalog)?;

    if end_pos < start_pos {
        return Err(RangeError::InvalidRange {
            start: start.clone(),
            end: end.clone(),
        });
    }

    Ok((start_pos, end_pos))
}
