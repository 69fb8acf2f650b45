use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Category of data a source provides, used by the Gateway for routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataCategory {
    Crypto,
    Sports,
    Weather,
    Economics,
    Finance,
    Forex,
    Onchain,
    Social,
    Prediction,
    News,
    Custom,
}

impl DataCategory {
    pub const ALL: [Self; 11] = [
        Self::Crypto,
        Self::Sports,
        Self::Weather,
        Self::Economics,
        Self::Finance,
        Self::Forex,
        Self::Onchain,
        Self::Social,
        Self::Prediction,
        Self::News,
        Self::Custom,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Crypto => "crypto",
            Self::Sports => "sports",
            Self::Weather => "weather",
            Self::Economics => "economics",
            Self::Finance => "finance",
            Self::Forex => "forex",
            Self::Onchain => "onchain",
            Self::Social => "social",
            Self::Prediction => "prediction",
            Self::News => "news",
            Self::Custom => "custom",
        }
    }
}

impl Display for DataCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataCategory {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == normalized)
            .ok_or(ValidationError::InvalidCategory { value: normalized })
    }
}
