//! Fixture loading and management.
//!
//! A fixture case is a scripted request stream: a set of named protocol
//! objects, the popups that registered a `repositioned` handler, and the
//! requests issued against them in order, each with the outcome the guard is
//! expected to produce.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use positioner_guard_membrane::GuardMode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid fixture json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("case `{case}` step {step}: unknown object `{name}`")]
    UnknownObject {
        case: String,
        step: usize,
        name: String,
    },
    #[error("case `{case}`: listener registered on unknown object `{name}`")]
    UnknownListener { case: String, name: String },
}

/// Mode(s) a case applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseMode {
    Enforce,
    Off,
    Both,
}

impl CaseMode {
    #[must_use]
    pub fn includes(self, mode: GuardMode) -> bool {
        match self {
            Self::Both => true,
            Self::Enforce => mode == GuardMode::Enforce,
            Self::Off => mode == GuardMode::Off,
        }
    }
}

/// One request argument. Objects are referred to by fixture name; `null`
/// is the null object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixtureArg {
    Int(i32),
    Uint(u32),
    Object(Option<String>),
}

/// What the caller observes for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepOutcome {
    Forwarded,
    Suppressed,
}

impl StepOutcome {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Forwarded => "forwarded",
            Self::Suppressed => "suppressed",
        }
    }
}

/// A `repositioned` event delivered to a popup's handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureEvent {
    pub popup: String,
    pub token: u32,
}

/// One outgoing request and its expected effect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureStep {
    /// Name of the target object.
    pub target: String,
    pub opcode: u32,
    /// Arguments in wire order. `null` means the request has no argument array.
    pub args: Option<Vec<FixtureArg>>,
    pub expect: StepOutcome,
    /// Events the client must see, in order, before this request goes out.
    #[serde(default)]
    pub events_before: Vec<FixtureEvent>,
}

/// A single fixture test case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureCase {
    /// Case identifier.
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub mode: CaseMode,
    /// Object name to interface name; `null` for an object whose interface
    /// cannot be determined.
    pub objects: BTreeMap<String, Option<String>>,
    /// Popups with a `repositioned` handler.
    #[serde(default)]
    pub listeners: Vec<String>,
    pub steps: Vec<FixtureStep>,
}

/// A collection of fixture cases for one scenario family.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureSet {
    /// Schema version.
    pub version: String,
    pub family: String,
    pub cases: Vec<FixtureCase>,
}

impl FixtureSet {
    /// Load fixture set from JSON string.
    pub fn from_json(json: &str) -> Result<Self, FixtureError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize fixture set to JSON string.
    pub fn to_json(&self) -> Result<String, FixtureError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load fixture set from a file path.
    pub fn from_file(path: &Path) -> Result<Self, FixtureError> {
        let content = std::fs::read_to_string(path).map_err(|source| FixtureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Load every `*.json` set in `dir`, sorted by file name.
    pub fn load_dir(dir: &Path) -> Result<Vec<(PathBuf, Self)>, FixtureError> {
        let io_err = |source| FixtureError::Io {
            path: dir.to_path_buf(),
            source,
        };
        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
            .map_err(io_err)?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("json"))
            .collect();
        paths.sort();
        paths
            .into_iter()
            .map(|path| Self::from_file(&path).map(|set| (path, set)))
            .collect()
    }
}
