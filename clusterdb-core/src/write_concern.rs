//! Write concern.
//!
//! The retry core only cares whether a write concern is acknowledged; the
//! remaining fields are carried so callers can build and validate a full
//! write concern in one place.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How many nodes must acknowledge a write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Acknowledgment {
    /// A number of nodes. `0` requests no acknowledgment at all.
    Nodes(u32),
    /// A majority of voting nodes, or a named tag set.
    Custom(String),
}

impl Acknowledgment {
    /// Majority acknowledgment.
    pub fn majority() -> Self {
        Self::Custom("majority".to_string())
    }
}

impl From<u32> for Acknowledgment {
    fn from(nodes: u32) -> Self {
        Self::Nodes(nodes)
    }
}

impl From<&str> for Acknowledgment {
    fn from(tag: &str) -> Self {
        Self::Custom(tag.to_string())
    }
}

/// Write concern for a single write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteConcern {
    /// Requested acknowledgment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub w: Option<Acknowledgment>,

    /// Whether the write must reach the journal.
    #[serde(rename = "j", skip_serializing_if = "Option::is_none")]
    pub journal: Option<bool>,

    /// How long the server waits for acknowledgment.
    #[serde(
        rename = "wtimeout",
        default,
        skip_serializing_if = "Option::is_none",
        with = "option_duration_ms_serde"
    )]
    pub w_timeout: Option<Duration>,
}

impl WriteConcern {
    /// Create an empty (server default, acknowledged) write concern.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Unacknowledged write concern (`w: 0`).
    #[must_use]
    pub fn unacknowledged() -> Self {
        Self::new().w(0)
    }

    /// Majority write concern.
    #[must_use]
    pub fn majority() -> Self {
        Self::new().w(Acknowledgment::majority())
    }

    /// Set `w`.
    #[must_use]
    pub fn w(mut self, w: impl Into<Acknowledgment>) -> Self {
        self.w = Some(w.into());
        self
    }

    /// Set `j`.
    #[must_use]
    pub fn journal(mut self, journal: bool) -> Self {
        self.journal = Some(journal);
        self
    }

    /// Set `wtimeout`.
    #[must_use]
    pub fn w_timeout(mut self, timeout: Duration) -> Self {
        self.w_timeout = Some(timeout);
        self
    }

    /// Whether the server will acknowledge writes under this concern.
    ///
    /// Only `w: 0` without journaling is unacknowledged.
    #[must_use]
    pub fn is_acknowledged(&self) -> bool {
        !(self.w == Some(Acknowledgment::Nodes(0)) && self.journal != Some(true))
    }

    /// Reject contradictory combinations.
    pub fn validate(&self) -> Result<()> {
        if self.w == Some(Acknowledgment::Nodes(0)) && self.journal == Some(true) {
            return Err(Error::Configuration(
                "write concern cannot request journaling with w: 0".to_string(),
            ));
        }
        if matches!(self.w, Some(Acknowledgment::Custom(ref tag)) if tag.is_empty()) {
            return Err(Error::Configuration(
                "write concern tag must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

mod option_duration_ms_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => u64::try_from(d.as_millis())
                .unwrap_or(u64::MAX)
                .serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt: Option<u64> = Option::deserialize(deserializer)?;
        Ok(opt.map(Duration::from_millis))
    }
}
