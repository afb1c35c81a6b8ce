use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

/// Plans sold by the checkout flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
pub enum Plan {
    #[serde(rename = "10d")]
    #[strum(serialize = "10d")]
    TenDays,
    #[serde(rename = "28d")]
    #[strum(serialize = "28d")]
    TwentyEightDays,
}

impl Plan {
    pub fn days(&self) -> i64 {
        match self {
            Plan::TenDays => 10,
            Plan::TwentyEightDays => 28,
        }
    }
}
