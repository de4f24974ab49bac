//! Closed enums used across the data model
//!
//! Per the design note on dynamic dispatch over source families: this is a
//! closed tagged set, not an open class hierarchy. Adding a fifth source
//! family is a deliberate design change, not a plugin.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Origin family for a [`crate::RawItem`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFamily {
    Rss,
    Gdelt,
    Bluesky,
    Reddit,
}

impl SourceFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFamily::Rss => "rss",
            SourceFamily::Gdelt => "gdelt",
            SourceFamily::Bluesky => "bluesky",
            SourceFamily::Reddit => "reddit",
        }
    }
}

impl fmt::Display for SourceFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SourceFamily {
    type Err = crate::ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rss" => Ok(SourceFamily::Rss),
            "gdelt" => Ok(SourceFamily::Gdelt),
            "bluesky" => Ok(SourceFamily::Bluesky),
            "reddit" => Ok(SourceFamily::Reddit),
            other => Err(crate::ParseEnumError(other.to_string())),
        }
    }
}

/// Entity type extracted by the LLM enrichment signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Person,
    Org,
    Place,
    Event,
}

impl std::str::FromStr for EntityType {
    type Err = crate::ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "person" => Ok(EntityType::Person),
            "org" => Ok(EntityType::Org),
            "place" => Ok(EntityType::Place),
            "event" => Ok(EntityType::Event),
            other => Err(crate::ParseEnumError(other.to_string())),
        }
    }
}

/// Role an entity plays within the narrative of a single item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityRole {
    Subject,
    Target,
    Source,
    Location,
    Mentioned,
}

impl std::str::FromStr for EntityRole {
    type Err = crate::ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "subject" => Ok(EntityRole::Subject),
            "target" => Ok(EntityRole::Target),
            "source" => Ok(EntityRole::Source),
            "location" => Ok(EntityRole::Location),
            "mentioned" => Ok(EntityRole::Mentioned),
            other => Err(crate::ParseEnumError(other.to_string())),
        }
    }
}

/// Narrative cluster lifecycle status
///
/// `Dead` is part of the schema for forward compatibility but no operation
/// in this pipeline currently assigns it — clusters only ever move
/// emerging -> active -> fading (see DESIGN.md).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterStatus {
    Emerging,
    Active,
    Fading,
    Dead,
}

impl ClusterStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClusterStatus::Emerging => "emerging",
            ClusterStatus::Active => "active",
            ClusterStatus::Fading => "fading",
            ClusterStatus::Dead => "dead",
        }
    }
}

impl fmt::Display for ClusterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ClusterStatus {
    type Err = crate::ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "emerging" => Ok(ClusterStatus::Emerging),
            "active" => Ok(ClusterStatus::Active),
            "fading" => Ok(ClusterStatus::Fading),
            "dead" => Ok(ClusterStatus::Dead),
            other => Err(crate::ParseEnumError(other.to_string())),
        }
    }
}
