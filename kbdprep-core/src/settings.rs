/// Per-scene tool settings
use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_DISSOLVE_ANGLE, DISSOLVE_ANGLE_RANGE};
use crate::error::PrepError;

/// Limited-dissolve angle in whole degrees, always within `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DissolveAngle(u8);

impl DissolveAngle {
    pub fn degrees(self) -> u8 {
        self.0
    }

    pub fn radians(self) -> f64 {
        f64::from(self.0).to_radians()
    }
}

impl Default for DissolveAngle {
    fn default() -> Self {
        Self(DEFAULT_DISSOLVE_ANGLE)
    }
}

impl TryFrom<u8> for DissolveAngle {
    type Error = PrepError;

    fn try_from(degrees: u8) -> Result<Self, Self::Error> {
        if DISSOLVE_ANGLE_RANGE.contains(&degrees) {
            Ok(Self(degrees))
        } else {
            Err(PrepError::InvalidSetting(format!(
                "dissolve angle {degrees} outside {}..={}",
                DISSOLVE_ANGLE_RANGE.start(),
                DISSOLVE_ANGLE_RANGE.end()
            )))
        }
    }
}

impl From<DissolveAngle> for u8 {
    fn from(angle: DissolveAngle) -> Self {
        angle.0
    }
}

/// Settings the UI layer reads and the operators receive
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSettings {
    /// Last-used dissolve angle.
    #[serde(default)]
    pub dissolve_angle: DissolveAngle,
    /// Export destination; opaque, resolved by the host.
    #[serde(default)]
    pub export_path: String,
}
