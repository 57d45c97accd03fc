use serde::{Deserialize, Serialize};

use super::users::PublicUser;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GiftCategory {
    Popular,
    Luxury,
    Vip,
}

/// Catalog entry. Prices are in diamonds.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Gift {
    pub name: String,
    pub price: i64,
    pub category: GiftCategory,
    pub icon: String,
}

/// Gallery entry: a gift a user has received, with the accumulated count.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct OwnedGift {
    #[serde(flatten)]
    pub gift: Gift,
    pub count: i64,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct GiftPayload {
    pub from_user: PublicUser,
    pub to_user: PublicUser,
    pub gift: Gift,
    pub quantity: i64,
    pub room_id: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SendGift {
    pub stream_id: String,
    pub gift_name: String,
    pub count: i64,
    /// Defaults to the stream host when absent.
    pub target_id: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SendGiftResponse {
    pub updated_sender: super::users::User,
    pub leveled_up: bool,
}
