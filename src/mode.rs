//! UI mode and photo pose.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Top-level UI state: editing the avatar or posing it for a photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Customize,
    Photo,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Customize => write!(f, "customize"),
            Mode::Photo => write!(f, "photo"),
        }
    }
}

/// Named animation poses. Only meaningful in [`Mode::Photo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Pose {
    #[default]
    Idle,
    Chill,
    Cool,
    Punch,
    Ninja,
    King,
    Busy,
}

impl Pose {
    /// All poses in menu order.
    pub const ALL: [Pose; 7] = [
        Pose::Idle,
        Pose::Chill,
        Pose::Cool,
        Pose::Punch,
        Pose::Ninja,
        Pose::King,
        Pose::Busy,
    ];

    /// Animation clip name for this pose.
    pub fn name(&self) -> &'static str {
        match self {
            Pose::Idle => "Idle",
            Pose::Chill => "Chill",
            Pose::Cool => "Cool",
            Pose::Punch => "Punch",
            Pose::Ninja => "Ninja",
            Pose::King => "King",
            Pose::Busy => "Busy",
        }
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Pose {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pose::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown pose `{}`", s))
    }
}
