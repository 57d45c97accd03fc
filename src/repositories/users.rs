use std::sync::Arc;

use anyhow::bail;
use chrono::Utc;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::store::MemoryStore;
use crate::models::users::{
    AuthResponse, Credentials, NewUser, NotificationSettings, Reminder, User, UserPatch,
    WatchHistoryEntry,
};

pub fn digest_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Public short id derived from the entity id, stable per user.
fn derive_identification(id: &Uuid) -> String {
    let sum = id
        .as_bytes()
        .iter()
        .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(*b as u64));
    format!("{}", 1_000_000 + sum % 9_000_000)
}

fn byte_sum(value: &str) -> u64 {
    value.bytes().fold(0u64, |acc, b| acc + b as u64)
}

#[derive(Clone)]
pub struct UserRepository {
    store: Arc<MemoryStore>,
}

impl UserRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    pub fn register(&self, new_user: NewUser) -> Result<AuthResponse, anyhow::Error> {
        if new_user.name.trim().is_empty() || new_user.email.trim().is_empty() {
            bail!("name and email are required");
        }
        if self
            .store
            .users
            .iter()
            .any(|u| u.email.eq_ignore_ascii_case(&new_user.email))
        {
            bail!("email already registered");
        }

        let id = Uuid::new_v4();
        let now = Utc::now();
        let identification = derive_identification(&id);
        let avatar_seed = identification.clone();

        let user = User {
            id: id.hyphenated().to_string(),
            identification,
            name: new_user.name,
            email: new_user.email,
            password_digest: digest_password(&new_user.password),
            avatar_url: format!("https://picsum.photos/seed/{avatar_seed}/200"),
            cover_url: format!("https://picsum.photos/seed/{avatar_seed}/800/1200"),
            country: "br".to_string(),
            gender: crate::models::users::Gender::Female,
            age: 18,
            level: 1,
            xp: 0,
            diamonds: 0,
            earnings: 0,
            earnings_withdrawn: 0,
            sent_diamonds: 0,
            received_diamonds: 0,
            platform_earnings_cents: 0,
            is_admin: false,
            is_live: false,
            following: Vec::new(),
            blocked: Vec::new(),
            fans: 0,
            notification_settings: NotificationSettings::default(),
            withdrawal_method: None,
            created_at: now,
            updated_at: now,
        };

        self.store.users.insert(user.id.clone(), user.clone());
        let token = self.open_session(&user.id, &user.email);

        Ok(AuthResponse { user, token })
    }

    pub fn login(&self, credentials: Credentials) -> Result<AuthResponse, anyhow::Error> {
        let digest = digest_password(&credentials.password);
        let user = self
            .store
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(&credentials.email))
            .map(|u| u.clone());

        match user {
            Some(user) if user.password_digest == digest => {
                let token = self.open_session(&user.id, &user.email);
                Ok(AuthResponse { user, token })
            }
            _ => bail!("invalid credentials"),
        }
    }

    fn open_session(&self, user_id: &str, email: &str) -> String {
        let token = Uuid::new_v4().hyphenated().to_string();
        self.store
            .sessions
            .insert(token.clone(), user_id.to_string());
        *self
            .store
            .last_login_email
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(email.to_string());
        token
    }

    pub fn logout(&self, token: &str) {
        self.store.sessions.remove(token);
    }

    pub fn session_user(&self, token: &str) -> Option<String> {
        self.store.sessions.get(token).map(|id| id.clone())
    }

    pub fn last_email(&self) -> Option<String> {
        self.store
            .last_login_email
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn save_last_email(&self, email: String) {
        *self
            .store
            .last_login_email
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(email);
    }

    /// Lookup by entity id, falling back to the public identification.
    pub fn get(&self, id: &str) -> Result<User, anyhow::Error> {
        let by_id = self.store.users.get(id).map(|u| u.clone());
        if let Some(user) = by_id {
            return Ok(user);
        }

        match self
            .store
            .users
            .iter()
            .find(|u| u.identification == id)
            .map(|u| u.clone())
        {
            Some(user) => Ok(user),
            None => bail!("user not found"),
        }
    }

    pub fn update(&self, id: &str, patch: UserPatch) -> Result<User, anyhow::Error> {
        let mut entry = match self.store.users.get_mut(id) {
            Some(entry) => entry,
            None => bail!("user not found"),
        };

        if let Some(name) = patch.name {
            entry.name = name;
        }
        if let Some(avatar_url) = patch.avatar_url {
            entry.avatar_url = avatar_url;
        }
        if let Some(cover_url) = patch.cover_url {
            entry.cover_url = cover_url;
        }
        if let Some(country) = patch.country {
            entry.country = country;
        }
        if let Some(gender) = patch.gender {
            entry.gender = gender;
        }
        if let Some(age) = patch.age {
            entry.age = age;
        }
        if let Some(settings) = patch.notification_settings {
            entry.notification_settings = settings;
        }
        entry.updated_at = Utc::now();

        Ok(entry.clone())
    }

    pub fn search(&self, query: &str) -> Vec<User> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        // Numeric queries match public ids, anything else matches names.
        if query.chars().all(|c| c.is_ascii_digit()) {
            self.store
                .users
                .iter()
                .filter(|u| u.identification.contains(query))
                .map(|u| u.clone())
                .collect()
        } else {
            let lowered = query.to_lowercase();
            self.store
                .users
                .iter()
                .filter(|u| u.name.to_lowercase().contains(&lowered))
                .map(|u| u.clone())
                .collect()
        }
    }

    /// Viewer list for a room. The order is deterministic per room so a
    /// client sees a stable audience between calls.
    pub fn online_users(&self, room_id: &str) -> Vec<User> {
        let mut users: Vec<User> = self
            .store
            .users
            .iter()
            .filter(|u| !u.is_admin && u.id != "u-support")
            .map(|u| u.clone())
            .collect();

        if room_id == "global" {
            users.sort_by(|a, b| b.level.cmp(&a.level));
            return users;
        }

        let stream = match self.store.streams.get(room_id) {
            Some(stream) => stream.clone(),
            None => return Vec::new(),
        };

        let seed = byte_sum(room_id);
        users.sort_by_key(|u| (byte_sum(&u.id) + seed) % 101);
        users.retain(|u| u.id != stream.host_id);

        let capacity = (stream.viewers as usize).min(users.len());
        users.truncate(capacity);

        if let Some(host) = self.store.users.get(&stream.host_id) {
            users.insert(0, host.clone());
        }

        users
    }

    /// Toggles the follow edge. Returns whether the caller now follows the
    /// target.
    pub fn toggle_follow(&self, me: &str, target: &str) -> Result<bool, anyhow::Error> {
        if me == target {
            bail!("cannot follow yourself");
        }
        if !self.store.users.contains_key(target) {
            bail!("user not found");
        }

        let now_following = {
            let mut entry = match self.store.users.get_mut(me) {
                Some(entry) => entry,
                None => bail!("user not found"),
            };

            if let Some(position) = entry.following.iter().position(|id| id == target) {
                entry.following.remove(position);
                false
            } else {
                entry.following.push(target.to_string());
                true
            }
        };

        if let Some(mut entry) = self.store.users.get_mut(target) {
            entry.fans += if now_following { 1 } else { -1 };
            entry.fans = entry.fans.max(0);
        }

        Ok(now_following)
    }

    pub fn fans(&self, id: &str) -> Vec<User> {
        self.store
            .users
            .iter()
            .filter(|u| u.following.iter().any(|f| f == id))
            .map(|u| u.clone())
            .collect()
    }

    pub fn following_users(&self, id: &str) -> Result<Vec<User>, anyhow::Error> {
        let following = self.get(id)?.following;
        Ok(following
            .iter()
            .filter_map(|f| self.store.users.get(f).map(|u| u.clone()))
            .collect())
    }

    /// Mutual follows.
    pub fn friends(&self, id: &str) -> Result<Vec<User>, anyhow::Error> {
        let following = self.get(id)?.following;
        Ok(following
            .iter()
            .filter_map(|f| self.store.users.get(f).map(|u| u.clone()))
            .filter(|u| u.following.iter().any(|f| f == id))
            .collect())
    }

    pub fn block(&self, me: &str, target: &str) -> Result<(), anyhow::Error> {
        if me == target {
            bail!("cannot block yourself");
        }
        if !self.store.users.contains_key(target) {
            bail!("user not found");
        }

        {
            let mut entry = match self.store.users.get_mut(me) {
                Some(entry) => entry,
                None => bail!("user not found"),
            };
            if !entry.blocked.iter().any(|id| id == target) {
                entry.blocked.push(target.to_string());
            }
            entry.following.retain(|id| id != target);
        }

        // Blocking severs the edge in both directions.
        if let Some(mut entry) = self.store.users.get_mut(target) {
            entry.following.retain(|id| id != me);
        }

        Ok(())
    }

    pub fn unblock(&self, me: &str, target: &str) -> Result<(), anyhow::Error> {
        let mut entry = match self.store.users.get_mut(me) {
            Some(entry) => entry,
            None => bail!("user not found"),
        };
        entry.blocked.retain(|id| id != target);
        Ok(())
    }

    pub fn blocklist(&self, me: &str) -> Result<Vec<User>, anyhow::Error> {
        let blocked = self.get(me)?.blocked;
        Ok(blocked
            .iter()
            .filter_map(|id| self.store.users.get(id).map(|u| u.clone()))
            .collect())
    }

    pub fn set_language(&self, me: &str, code: String) -> Result<User, anyhow::Error> {
        let mut entry = match self.store.users.get_mut(me) {
            Some(entry) => entry,
            None => bail!("user not found"),
        };
        entry.country = code;
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    pub fn reminders(&self, me: &str) -> Vec<Reminder> {
        self.store
            .reminders
            .get(me)
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn remove_reminder(&self, me: &str, reminder_id: &str) -> Result<(), anyhow::Error> {
        let mut entry = match self.store.reminders.get_mut(me) {
            Some(entry) => entry,
            None => bail!("reminder not found"),
        };
        let before = entry.len();
        entry.retain(|r| r.id != reminder_id);
        if entry.len() == before {
            bail!("reminder not found");
        }
        Ok(())
    }

    pub fn watch_history(&self, me: &str) -> Vec<WatchHistoryEntry> {
        let mut history = self
            .store
            .watch_history
            .get(me)
            .map(|h| h.clone())
            .unwrap_or_default();
        history.sort_by(|a, b| b.last_watched_at.cmp(&a.last_watched_at));
        history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Economy;

    fn repository() -> UserRepository {
        let economy = Economy {
            diamonds_per_unit: 3000,
            unit_value_cents: 2500,
            platform_fee_bps: 2000,
            earnings_share_bps: 5000,
            recharge_pack_diamonds: 5000,
        };
        UserRepository::new(MemoryStore::seeded(economy))
    }

    #[test]
    fn register_rejects_duplicate_email() {
        let repo = repository();
        let result = repo.register(NewUser {
            name: "Clone".to_string(),
            email: "admin@livego.com".to_string(),
            password: "pw".to_string(),
        });
        assert!(result.is_err());
    }

    #[test]
    fn login_round_trip_and_session() {
        let repo = repository();
        let auth = repo
            .login(Credentials {
                email: "admin@livego.com".to_string(),
                password: "livego".to_string(),
            })
            .unwrap();

        assert_eq!(repo.session_user(&auth.token).unwrap(), auth.user.id);
        repo.logout(&auth.token);
        assert!(repo.session_user(&auth.token).is_none());
    }

    #[test]
    fn follow_toggle_updates_fan_count() {
        let repo = repository();
        assert!(repo.toggle_follow("u-admin", "u-mirella").unwrap());
        assert_eq!(repo.get("u-mirella").unwrap().fans, 1);
        assert!(!repo.toggle_follow("u-admin", "u-mirella").unwrap());
        assert_eq!(repo.get("u-mirella").unwrap().fans, 0);
    }

    #[test]
    fn room_audience_is_deterministic_and_host_first() {
        let repo = repository();
        let first = repo.online_users("s-mirella");
        let second = repo.online_users("s-mirella");

        assert_eq!(first.len(), second.len());
        assert_eq!(first[0].id, "u-mirella");
        assert!(first
            .iter()
            .zip(second.iter())
            .all(|(a, b)| a.id == b.id));
    }

    #[test]
    fn numeric_search_matches_identification() {
        let repo = repository();
        let hits = repo.search("1122334");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "u-gamer");
    }
}
