//! Precedence ranks for setting sources

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where a setting value came from.
///
/// Ranks are totally ordered. `Override` is the absolute rank: an update
/// carrying it always wins, and a value set by it can only be replaced by
/// another `Override`. For every other rank, regular properties keep the
/// value from the highest rank seen so far while policy properties keep the
/// value from the lowest.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Override = 0,
    #[default]
    Base = 1,
    Org = 2,
    Entity = 3,
    Project = 4,
    User = 5,
    System = 6,
    Workspace = 7,
    Env = 8,
    Setup = 9,
    Login = 10,
    Init = 11,
    Settings = 12,
    Args = 13,
}

impl Source {
    /// Every rank, lowest first
    pub const ALL: [Source; 14] = [
        Source::Override,
        Source::Base,
        Source::Org,
        Source::Entity,
        Source::Project,
        Source::User,
        Source::System,
        Source::Workspace,
        Source::Env,
        Source::Setup,
        Source::Login,
        Source::Init,
        Source::Settings,
        Source::Args,
    ];

    /// Numeric rank of this source
    #[must_use]
    pub fn rank(self) -> u8 {
        self as u8
    }

    /// Look up a source by its numeric rank
    #[must_use]
    pub fn from_rank(rank: u8) -> Option<Self> {
        Self::ALL.get(usize::from(rank)).copied()
    }

    /// Lowercase name, as used in serialized form
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Source::Override => "override",
            Source::Base => "base",
            Source::Org => "org",
            Source::Entity => "entity",
            Source::Project => "project",
            Source::User => "user",
            Source::System => "system",
            Source::Workspace => "workspace",
            Source::Env => "env",
            Source::Setup => "setup",
            Source::Login => "login",
            Source::Init => "init",
            Source::Settings => "settings",
            Source::Args => "args",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|source| source.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownSource(s.to_string()))
    }
}
