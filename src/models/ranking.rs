use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RankPeriod {
    Daily,
    Weekly,
    Monthly,
}

impl RankPeriod {
    pub fn parse(value: &str) -> Option<RankPeriod> {
        match value {
            "daily" => Some(RankPeriod::Daily),
            "weekly" => Some(RankPeriod::Weekly),
            "monthly" => Some(RankPeriod::Monthly),
            _ => None,
        }
    }

    pub fn days(&self) -> i64 {
        match self {
            RankPeriod::Daily => 1,
            RankPeriod::Weekly => 7,
            RankPeriod::Monthly => 30,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RankedUser {
    pub rank: u32,
    pub id: String,
    pub identification: String,
    pub name: String,
    pub avatar_url: String,
    pub level: i64,
    /// Contribution score for the period, in diamonds.
    pub value: i64,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TopFan {
    pub id: String,
    pub identification: String,
    pub name: String,
    pub avatar: String,
    pub amount: i64,
    pub is_vip: bool,
}
