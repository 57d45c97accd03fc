use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamQuality {
    Sd,
    Hd,
    FullHd,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Stream {
    pub id: String,
    pub host_id: String,
    /// Host display name, denormalized for listings.
    pub name: String,
    pub avatar: String,
    pub title: String,
    pub category: String,
    pub country: String,
    pub viewers: u32,
    pub quality: StreamQuality,
    pub received_diamonds: i64,
    pub started_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NewStream {
    pub title: String,
    pub category: String,
    pub country: String,
    pub quality: Option<StreamQuality>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct StreamPatch {
    pub title: Option<String>,
    pub category: Option<String>,
    pub viewers: Option<u32>,
}
