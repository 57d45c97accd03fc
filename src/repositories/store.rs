use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};
use dashmap::DashMap;

use crate::models::chat::{ChatMessage, Conversation};
use crate::models::gifts::{Gift, GiftCategory};
use crate::models::streams::{Stream, StreamQuality};
use crate::models::transactions::{LedgerRecord, RecordKind, RecordStatus};
use crate::models::users::{
    Gender, NotificationSettings, Reminder, User, WatchHistoryEntry, WithdrawalMethod,
};
use crate::settings::Economy;

/// Process-lifetime document store. Explicitly owned and passed into the
/// repositories; nothing in here is a global. Collections carry no
/// durability guarantees and the ledger is append-only in principle.
pub struct MemoryStore {
    pub economy: Economy,
    pub users: DashMap<String, User>,
    pub streams: DashMap<String, Stream>,
    pub conversations: DashMap<String, Conversation>,
    /// Per-user follow reminders shown behind the bell.
    pub reminders: DashMap<String, Vec<Reminder>>,
    pub watch_history: DashMap<String, Vec<WatchHistoryEntry>>,
    /// Received gift counts per user, keyed by gift name.
    pub galleries: DashMap<String, HashMap<String, i64>>,
    /// Session token -> user id.
    pub sessions: DashMap<String, String>,
    pub ledger: Mutex<Vec<LedgerRecord>>,
    pub gift_catalog: Vec<Gift>,
    pub last_login_email: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new(economy: Economy) -> Arc<Self> {
        Arc::new(MemoryStore {
            economy,
            users: DashMap::new(),
            streams: DashMap::new(),
            conversations: DashMap::new(),
            reminders: DashMap::new(),
            watch_history: DashMap::new(),
            galleries: DashMap::new(),
            sessions: DashMap::new(),
            ledger: Mutex::new(Vec::new()),
            gift_catalog: gift_catalog(),
            last_login_email: Mutex::new(None),
        })
    }

    /// Store preloaded with the fixture data set used by the mock facade and
    /// by a freshly started server.
    pub fn seeded(economy: Economy) -> Arc<Self> {
        let store = MemoryStore::new(economy);
        seed(&store);
        store
    }

    pub fn append_ledger(&self, record: LedgerRecord) {
        let mut ledger = self
            .ledger
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        ledger.push(record);
    }

    pub fn ledger_snapshot(&self) -> Vec<LedgerRecord> {
        let ledger = self
            .ledger
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        ledger.clone()
    }
}

fn gift_catalog() -> Vec<Gift> {
    let entry = |name: &str, price: i64, category: GiftCategory, icon: &str| Gift {
        name: name.to_string(),
        price,
        category,
        icon: format!("/assets/gifts/{icon}.png"),
    };

    vec![
        entry("Rose", 1, GiftCategory::Popular, "rose"),
        entry("Heart", 5, GiftCategory::Popular, "heart"),
        entry("Lipstick", 10, GiftCategory::Popular, "lipstick"),
        entry("Perfume", 20, GiftCategory::Popular, "perfume"),
        entry("Teddy Bear", 99, GiftCategory::Popular, "teddy"),
        entry("Rocket", 500, GiftCategory::Luxury, "rocket"),
        entry("Sports Car", 1200, GiftCategory::Luxury, "sports-car"),
        entry("Yacht", 3000, GiftCategory::Luxury, "yacht"),
        entry("Lion", 5000, GiftCategory::Vip, "lion"),
        entry("Castle", 10000, GiftCategory::Vip, "castle"),
    ]
}

struct SeedUser {
    id: &'static str,
    identification: &'static str,
    name: &'static str,
    email: &'static str,
    avatar_seed: &'static str,
    country: &'static str,
    gender: Gender,
    age: u8,
    xp: i64,
    diamonds: i64,
    earnings: i64,
    is_live: bool,
}

fn seed_user(seed: &SeedUser) -> User {
    let now = Utc::now();

    User {
        id: seed.id.to_string(),
        identification: seed.identification.to_string(),
        name: seed.name.to_string(),
        email: seed.email.to_string(),
        password_digest: crate::repositories::users::digest_password("livego"),
        avatar_url: format!("https://picsum.photos/seed/{}/200", seed.avatar_seed),
        cover_url: format!("https://picsum.photos/seed/{}/800/1200", seed.avatar_seed),
        country: seed.country.to_string(),
        gender: seed.gender,
        age: seed.age,
        level: User::level_for_xp(seed.xp),
        xp: seed.xp,
        diamonds: seed.diamonds,
        earnings: seed.earnings,
        earnings_withdrawn: 0,
        sent_diamonds: 0,
        received_diamonds: seed.earnings * 2,
        platform_earnings_cents: 0,
        is_admin: false,
        is_live: seed.is_live,
        following: Vec::new(),
        blocked: Vec::new(),
        fans: 0,
        notification_settings: NotificationSettings::default(),
        withdrawal_method: None,
        created_at: now,
        updated_at: now,
    }
}

fn seed(store: &MemoryStore) {
    let users = [
        SeedUser {
            id: "u-mirella",
            identification: "9928374",
            name: "Mirella Oficial",
            email: "mirella@livego.app",
            avatar_seed: "9928374",
            country: "br",
            gender: Gender::Female,
            age: 24,
            xp: 62_000,
            diamonds: 1_200,
            earnings: 8_400,
            is_live: true,
        },
        SeedUser {
            id: "u-arromba",
            identification: "5561902",
            name: "DJ Arromba",
            email: "arromba@livego.app",
            avatar_seed: "5561902",
            country: "br",
            gender: Gender::Male,
            age: 31,
            xp: 27_500,
            diamonds: 340,
            earnings: 2_100,
            is_live: true,
        },
        SeedUser {
            id: "u-gamer",
            identification: "1122334",
            name: "Gamer Master",
            email: "gamer@livego.app",
            avatar_seed: "1122334",
            country: "us",
            gender: Gender::Male,
            age: 27,
            xp: 18_000,
            diamonds: 950,
            earnings: 1_300,
            is_live: true,
        },
        SeedUser {
            id: "u-alice",
            identification: "7743210",
            name: "Alice Star",
            email: "alice@livego.app",
            avatar_seed: "7743210",
            country: "us",
            gender: Gender::Female,
            age: 22,
            xp: 9_000,
            diamonds: 15_000,
            earnings: 450,
            is_live: false,
        },
        SeedUser {
            id: "u-juliana",
            identification: "8827361",
            name: "Juliana P.",
            email: "juliana@livego.app",
            avatar_seed: "8827361",
            country: "br",
            gender: Gender::Female,
            age: 29,
            xp: 51_000,
            diamonds: 48_000,
            earnings: 120,
            is_live: false,
        },
        SeedUser {
            id: "u-ricardo",
            identification: "3456754",
            name: "Ricardo G.",
            email: "ricardo@livego.app",
            avatar_seed: "3456754",
            country: "br",
            gender: Gender::Male,
            age: 35,
            xp: 12_000,
            diamonds: 27_000,
            earnings: 0,
            is_live: false,
        },
        SeedUser {
            id: "u-marcos",
            identification: "9921823",
            name: "Marcos Dev",
            email: "marcos@livego.app",
            avatar_seed: "9921823",
            country: "us",
            gender: Gender::Male,
            age: 33,
            xp: 33_000,
            diamonds: 8_200,
            earnings: 75,
            is_live: false,
        },
    ];

    for seed in &users {
        store.users.insert(seed.id.to_string(), seed_user(seed));
    }

    let mut admin = seed_user(&SeedUser {
        id: "u-admin",
        identification: "1000001",
        name: "LiveGo Admin",
        email: "admin@livego.com",
        avatar_seed: "admin",
        country: "br",
        gender: Gender::Female,
        age: 30,
        xp: 495_000,
        diamonds: 9_999,
        earnings: 3_000,
        is_live: false,
    });
    admin.is_admin = true;
    admin.platform_earnings_cents = 125_075;
    admin.withdrawal_method = Some(WithdrawalMethod {
        method: "email".to_string(),
        email: "admin@livego.com".to_string(),
    });
    store.users.insert(admin.id.clone(), admin);

    let support = seed_user(&SeedUser {
        id: "u-support",
        identification: "0000001",
        name: "LiveGo Support",
        email: "support@livego.com",
        avatar_seed: "support",
        country: "br",
        gender: Gender::Female,
        age: 30,
        xp: 495_000,
        diamonds: 0,
        earnings: 0,
        is_live: false,
    });
    store.users.insert(support.id.clone(), support);

    seed_streams(store);
    seed_reminders(store);
    seed_watch_history(store);
    seed_support_conversation(store);
    seed_ledger(store);

    *store
        .last_login_email
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some("admin@livego.com".to_string());
}

fn seed_streams(store: &MemoryStore) {
    let stream = |id: &str, host: &str, name: &str, seed: &str, title: &str, category: &str,
                  country: &str, viewers: u32, minutes_ago: i64| Stream {
        id: id.to_string(),
        host_id: host.to_string(),
        name: name.to_string(),
        avatar: format!("https://picsum.photos/seed/{seed}/200"),
        title: title.to_string(),
        category: category.to_string(),
        country: country.to_string(),
        viewers,
        quality: StreamQuality::Hd,
        received_diamonds: 0,
        started_at: Utc::now() - Duration::minutes(minutes_ago),
    };

    for entry in [
        stream(
            "s-mirella",
            "u-mirella",
            "Mirella Oficial",
            "9928374",
            "Friday night live",
            "popular",
            "br",
            1520,
            42,
        ),
        stream(
            "s-arromba",
            "u-arromba",
            "DJ Arromba",
            "5561902",
            "Set ao vivo",
            "music",
            "br",
            430,
            15,
        ),
        stream(
            "s-gamer",
            "u-gamer",
            "Gamer Master",
            "1122334",
            "Ranked grind",
            "games",
            "us",
            260,
            90,
        ),
    ] {
        store.streams.insert(entry.id.clone(), entry);
    }
}

fn seed_reminders(store: &MemoryStore) {
    store.reminders.insert(
        "u-admin".to_string(),
        vec![
            Reminder {
                id: "rem-1".to_string(),
                name: "Mirella Oficial".to_string(),
                avatar: "https://picsum.photos/seed/rem1/200".to_string(),
                is_live: true,
            },
            Reminder {
                id: "rem-2".to_string(),
                name: "DJ Arromba".to_string(),
                avatar: "https://picsum.photos/seed/rem2/200".to_string(),
                is_live: false,
            },
            Reminder {
                id: "rem-3".to_string(),
                name: "Gamer Master".to_string(),
                avatar: "https://picsum.photos/seed/rem3/200".to_string(),
                is_live: true,
            },
        ],
    );
}

fn seed_watch_history(store: &MemoryStore) {
    store.watch_history.insert(
        "u-admin".to_string(),
        vec![
            WatchHistoryEntry {
                id: "u-mirella".to_string(),
                name: "Mirella Oficial".to_string(),
                avatar: "https://picsum.photos/seed/9928374/200".to_string(),
                is_live: true,
                last_watched_at: Utc::now() - Duration::hours(4),
            },
            WatchHistoryEntry {
                id: "u-gamer".to_string(),
                name: "Gamer Master".to_string(),
                avatar: "https://picsum.photos/seed/1122334/200".to_string(),
                is_live: true,
                last_watched_at: Utc::now() - Duration::hours(16),
            },
        ],
    );
}

fn seed_support_conversation(store: &MemoryStore) {
    store.conversations.insert(
        "conv-support".to_string(),
        Conversation {
            id: "conv-support".to_string(),
            participants: vec!["u-admin".to_string(), "u-support".to_string()],
            messages: vec![ChatMessage {
                id: "msg-welcome".to_string(),
                sender_id: "u-support".to_string(),
                text: "Welcome to LiveGo! How can we help?".to_string(),
                sent_at: Utc::now() - Duration::days(1),
            }],
            unread_count: 1,
            updated_at: Utc::now() - Duration::days(1),
        },
    );
}

fn seed_ledger(store: &MemoryStore) {
    let record = |n: i64, user: &str, related: Option<&str>, cents: i64, kind: RecordKind,
                  status: RecordStatus, description: &str| LedgerRecord {
        id: format!("seed-led-{n}"),
        user_id: user.to_string(),
        counterparty_id: None,
        related_user_name: related.map(str::to_string),
        amount_cents: cents,
        diamonds: 0,
        kind,
        status,
        description: description.to_string(),
        created_at: Utc::now() - Duration::hours(4 * n),
    };

    for entry in [
        record(
            1,
            "u-admin",
            Some("Mirella Oficial"),
            1_750,
            RecordKind::Fee,
            RecordStatus::Completed,
            "Withdrawal fee - Mirella Oficial",
        ),
        record(
            2,
            "u-admin",
            Some("DJ Arromba"),
            420,
            RecordKind::Fee,
            RecordStatus::Completed,
            "Withdrawal fee - DJ Arromba",
        ),
        record(
            3,
            "u-admin",
            None,
            98_000,
            RecordKind::Withdrawal,
            RecordStatus::Pending,
            "Withdrawal to admin@livego.com",
        ),
        record(
            4,
            "u-admin",
            Some("Gamer Master"),
            260,
            RecordKind::Fee,
            RecordStatus::Processing,
            "Withdrawal fee - Gamer Master",
        ),
        record(
            5,
            "u-mirella",
            None,
            7_000,
            RecordKind::Withdrawal,
            RecordStatus::Completed,
            "Withdrawal to pix",
        ),
    ] {
        store.append_ledger(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn economy() -> Economy {
        Economy {
            diamonds_per_unit: 3000,
            unit_value_cents: 2500,
            platform_fee_bps: 2000,
            earnings_share_bps: 5000,
            recharge_pack_diamonds: 5000,
        }
    }

    #[test]
    fn seeded_store_has_admin_and_live_streams() {
        let store = MemoryStore::seeded(economy());

        let admin = store.users.get("u-admin").unwrap();
        assert!(admin.is_admin);
        assert_eq!(admin.platform_earnings_cents, 125_075);

        assert_eq!(store.streams.len(), 3);
        assert!(store.streams.iter().all(|s| s.viewers > 0));
        assert!(!store.gift_catalog.is_empty());
    }
}
