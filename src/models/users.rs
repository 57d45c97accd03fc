use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Diamonds of xp required per level.
const XP_PER_LEVEL: i64 = 5000;
const MAX_LEVEL: i64 = 99;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Female,
    Male,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct NotificationSettings {
    pub new_messages: bool,
    pub streamer_live: bool,
    pub new_follower: bool,
    pub gift_alerts: bool,
    pub gift_sounds: bool,
    pub push: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        NotificationSettings {
            new_messages: true,
            streamer_live: true,
            new_follower: false,
            gift_alerts: true,
            gift_sounds: true,
            push: true,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct WithdrawalMethod {
    pub method: String,
    pub email: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct User {
    pub id: String,
    /// Public short id shown in profiles and search.
    pub identification: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_digest: String,
    pub avatar_url: String,
    pub cover_url: String,
    pub country: String,
    pub gender: Gender,
    pub age: u8,
    pub level: i64,
    pub xp: i64,
    pub diamonds: i64,
    /// Withdrawable diamonds credited from received gifts.
    pub earnings: i64,
    pub earnings_withdrawn: i64,
    pub sent_diamonds: i64,
    pub received_diamonds: i64,
    /// Fee revenue, in cents. Only meaningful on the platform account.
    pub platform_earnings_cents: i64,
    pub is_admin: bool,
    pub is_live: bool,
    pub following: Vec<String>,
    pub blocked: Vec<String>,
    pub fans: i64,
    pub notification_settings: NotificationSettings,
    pub withdrawal_method: Option<WithdrawalMethod>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn level_for_xp(xp: i64) -> i64 {
        (1 + xp / XP_PER_LEVEL).min(MAX_LEVEL)
    }

    /// Recomputes the level from xp. Returns whether the user leveled up.
    pub fn refresh_level(&mut self) -> bool {
        let level = Self::level_for_xp(self.xp);
        let leveled_up = level > self.level;
        self.level = level;
        leveled_up
    }

    pub fn summary(&self) -> PublicUser {
        PublicUser {
            id: self.id.clone(),
            identification: self.identification.clone(),
            name: self.name.clone(),
            avatar_url: self.avatar_url.clone(),
            level: self.level,
        }
    }
}

/// The slice of a profile that is safe to put on the wire for other users.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PublicUser {
    pub id: String,
    pub identification: String,
    pub name: String,
    pub avatar_url: String,
    pub level: i64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

/// Partial profile update. Absent fields are left untouched.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct UserPatch {
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub cover_url: Option<String>,
    pub country: Option<String>,
    pub gender: Option<Gender>,
    pub age: Option<u8>,
    pub notification_settings: Option<NotificationSettings>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Reminder {
    pub id: String,
    pub name: String,
    pub avatar: String,
    pub is_live: bool,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct WatchHistoryEntry {
    pub id: String,
    pub name: String,
    pub avatar: String,
    pub is_live: bool,
    pub last_watched_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::User;

    #[test]
    fn level_grows_with_xp_and_caps() {
        assert_eq!(User::level_for_xp(0), 1);
        assert_eq!(User::level_for_xp(4999), 1);
        assert_eq!(User::level_for_xp(5000), 2);
        assert_eq!(User::level_for_xp(5000 * 200), 99);
    }
}
