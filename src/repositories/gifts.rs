use std::sync::Arc;

use anyhow::bail;
use chrono::Utc;
use uuid::Uuid;

use super::store::MemoryStore;
use crate::models::gifts::{Gift, GiftCategory, GiftPayload, OwnedGift};
use crate::models::transactions::{LedgerRecord, RecordKind, RecordStatus};

pub struct GiftDelivery {
    pub updated_sender: crate::models::users::User,
    pub leveled_up: bool,
    pub payload: GiftPayload,
}

#[derive(Clone)]
pub struct GiftRepository {
    store: Arc<MemoryStore>,
}

impl GiftRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    /// Catalog slice. `category` is a named category, a numeric price
    /// ceiling, or absent for the popular shelf.
    pub fn catalog(&self, category: Option<&str>) -> Vec<Gift> {
        let catalog = &self.store.gift_catalog;

        match category {
            None | Some("all") | Some("popular") => catalog
                .iter()
                .filter(|g| g.category == GiftCategory::Popular)
                .cloned()
                .collect(),
            Some(raw) if raw.chars().all(|c| c.is_ascii_digit()) => {
                let ceiling: i64 = raw.parse().unwrap_or(0);
                catalog.iter().filter(|g| g.price <= ceiling).cloned().collect()
            }
            Some("luxury") => catalog
                .iter()
                .filter(|g| g.category == GiftCategory::Luxury)
                .cloned()
                .collect(),
            Some("vip") => catalog
                .iter()
                .filter(|g| g.category == GiftCategory::Vip)
                .cloned()
                .collect(),
            Some(_) => Vec::new(),
        }
    }

    pub fn gallery(&self, user_id: &str) -> Vec<OwnedGift> {
        let counts = match self.store.galleries.get(user_id) {
            Some(counts) => counts.clone(),
            None => return Vec::new(),
        };

        let mut owned: Vec<OwnedGift> = self
            .store
            .gift_catalog
            .iter()
            .filter_map(|gift| {
                counts.get(&gift.name).map(|count| OwnedGift {
                    gift: gift.clone(),
                    count: *count,
                })
            })
            .collect();

        owned.sort_by(|a, b| b.count.cmp(&a.count));
        owned
    }

    /// The gifting transaction: optimistic in-memory arithmetic with a
    /// balance check at call time. Debits the sender, credits the receiver's
    /// earnings and gallery, bumps the stream total and appends a ledger row.
    pub fn send(
        &self,
        sender_id: &str,
        stream_id: &str,
        gift_name: &str,
        count: i64,
        target_id: Option<&str>,
    ) -> Result<GiftDelivery, anyhow::Error> {
        if count <= 0 {
            bail!("gift count must be positive");
        }

        let gift = match self
            .store
            .gift_catalog
            .iter()
            .find(|g| g.name == gift_name)
        {
            Some(gift) => gift.clone(),
            None => bail!("gift not found"),
        };

        let receiver_id = match target_id {
            Some(id) => id.to_string(),
            None => match self.store.streams.get(stream_id) {
                Some(stream) => stream.host_id.clone(),
                None => bail!("stream not found"),
            },
        };
        if receiver_id == sender_id {
            bail!("cannot gift yourself");
        }

        let total = gift.price * count;

        let (updated_sender, leveled_up) = {
            let mut sender = match self.store.users.get_mut(sender_id) {
                Some(entry) => entry,
                None => bail!("user not found"),
            };
            if sender.diamonds < total {
                bail!("insufficient diamonds");
            }

            sender.diamonds -= total;
            sender.sent_diamonds += total;
            sender.xp += total;
            let leveled_up = sender.refresh_level();
            sender.updated_at = Utc::now();
            (sender.clone(), leveled_up)
        };

        let receiver = {
            let mut receiver = match self.store.users.get_mut(&receiver_id) {
                Some(entry) => entry,
                None => bail!("recipient not found"),
            };
            receiver.received_diamonds += total;
            receiver.earnings += self.store.economy.earnings_share(total);
            receiver.summary()
        };

        if let Some(mut stream) = self.store.streams.get_mut(stream_id) {
            stream.received_diamonds += total;
        }

        self.store
            .galleries
            .entry(receiver_id.clone())
            .or_default()
            .entry(gift.name.clone())
            .and_modify(|c| *c += count)
            .or_insert(count);

        self.store.append_ledger(LedgerRecord {
            id: format!("gift-{}", Uuid::new_v4().hyphenated()),
            user_id: sender_id.to_string(),
            counterparty_id: Some(receiver_id),
            related_user_name: Some(receiver.name.clone()),
            amount_cents: self.store.economy.gross_cents(total),
            diamonds: total,
            kind: RecordKind::Gift,
            status: RecordStatus::Completed,
            description: format!("{} x{}", gift.name, count),
            created_at: Utc::now(),
        });

        let payload = GiftPayload {
            from_user: updated_sender.summary(),
            to_user: receiver,
            gift,
            quantity: count,
            room_id: stream_id.to_string(),
        };

        Ok(GiftDelivery {
            updated_sender,
            leveled_up,
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Economy;

    fn repository() -> GiftRepository {
        let economy = Economy {
            diamonds_per_unit: 3000,
            unit_value_cents: 2500,
            platform_fee_bps: 2000,
            earnings_share_bps: 5000,
            recharge_pack_diamonds: 5000,
        };
        GiftRepository::new(MemoryStore::seeded(economy))
    }

    #[test]
    fn sending_a_gift_moves_diamonds_and_credits_earnings() {
        let repo = repository();
        let sender_before = repo.store.users.get("u-admin").unwrap().clone();
        let host_before = repo.store.users.get("u-mirella").unwrap().clone();

        let delivery = repo
            .send("u-admin", "s-mirella", "Rocket", 2, None)
            .unwrap();

        assert_eq!(delivery.updated_sender.diamonds, sender_before.diamonds - 1000);
        assert_eq!(delivery.updated_sender.xp, sender_before.xp + 1000);

        let host = repo.store.users.get("u-mirella").unwrap();
        assert_eq!(host.received_diamonds, host_before.received_diamonds + 1000);
        assert_eq!(host.earnings, host_before.earnings + 500);

        let stream = repo.store.streams.get("s-mirella").unwrap();
        assert_eq!(stream.received_diamonds, 1000);
        assert_eq!(delivery.payload.to_user.id, "u-mirella");
    }

    #[test]
    fn insufficient_diamonds_is_rejected_without_mutation() {
        let repo = repository();
        let before = repo.store.users.get("u-arromba").unwrap().clone();

        let result = repo.send("u-arromba", "s-mirella", "Castle", 1, None);
        assert!(result.is_err());

        let after = repo.store.users.get("u-arromba").unwrap();
        assert_eq!(after.diamonds, before.diamonds);
        assert_eq!(after.xp, before.xp);
    }

    #[test]
    fn gallery_accumulates_received_gifts() {
        let repo = repository();
        repo.send("u-admin", "s-mirella", "Rose", 15, None).unwrap();
        repo.send("u-admin", "s-mirella", "Rose", 5, None).unwrap();

        let gallery = repo.gallery("u-mirella");
        assert_eq!(gallery.len(), 1);
        assert_eq!(gallery[0].gift.name, "Rose");
        assert_eq!(gallery[0].count, 20);
    }

    #[test]
    fn numeric_category_is_a_price_ceiling() {
        let repo = repository();
        let cheap = repo.catalog(Some("20"));
        assert!(cheap.iter().all(|g| g.price <= 20));
        assert!(!cheap.is_empty());
    }
}
