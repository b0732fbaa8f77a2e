//! Options for best-effort filling

use serde::Deserialize;

/// What to do with raw input left over once every slot is filled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeftoverPolicy {
    /// Drop the excess and still report a complete fill
    #[default]
    Discard,
    /// Report the fill as incomplete when alphanumeric input is left over
    Reject,
}

/// Configuration for [`fill_from_raw`](super::fill_from_raw)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillOptions {
    /// Character used to pad slots the raw input could not fill
    pub sentinel: char,

    /// Handling of unconsumed raw input
    pub leftover: LeftoverPolicy,
}

impl Default for FillOptions {
    fn default() -> Self {
        Self {
            sentinel: '_',
            leftover: LeftoverPolicy::Discard,
        }
    }
}

impl FillOptions {
    /// Create options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the padding character
    pub fn with_sentinel(mut self, sentinel: char) -> Self {
        self.sentinel = sentinel;
        self
    }

    /// Set the leftover input policy
    pub fn with_leftover(mut self, leftover: LeftoverPolicy) -> Self {
        self.leftover = leftover;
        self
    }
}
