use std::collections::HashMap;
use std::sync::Arc;

use anyhow::bail;
use chrono::Utc;
use uuid::Uuid;

use super::store::MemoryStore;
use crate::models::streams::{NewStream, Stream, StreamPatch, StreamQuality};
use crate::models::transactions::RecordKind;
use crate::models::users::User;

#[derive(Clone)]
pub struct StreamRepository {
    store: Arc<MemoryStore>,
}

impl StreamRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    pub fn list(&self, category: &str, region: Option<&str>) -> Vec<Stream> {
        let mut streams: Vec<Stream> = self
            .store
            .streams
            .iter()
            .filter(|s| category == "all" || category == "popular" || s.category == category)
            .filter(|s| match region {
                Some(region) if region != "global" => s.country == region,
                _ => true,
            })
            .map(|s| s.clone())
            .collect();

        streams.sort_by(|a, b| b.viewers.cmp(&a.viewers));
        streams
    }

    /// Go live. A host has at most one active stream.
    pub fn create(&self, host_id: &str, new_stream: NewStream) -> Result<Stream, anyhow::Error> {
        if self.store.streams.iter().any(|s| s.host_id == host_id) {
            bail!("host is already live");
        }

        let host = {
            let mut entry = match self.store.users.get_mut(host_id) {
                Some(entry) => entry,
                None => bail!("user not found"),
            };
            entry.is_live = true;
            entry.clone()
        };

        let stream = Stream {
            id: Uuid::new_v4().hyphenated().to_string(),
            host_id: host.id.clone(),
            name: host.name.clone(),
            avatar: host.avatar_url.clone(),
            title: new_stream.title,
            category: new_stream.category,
            country: new_stream.country,
            viewers: 0,
            quality: new_stream.quality.unwrap_or(StreamQuality::Hd),
            received_diamonds: 0,
            started_at: Utc::now(),
        };

        self.store.streams.insert(stream.id.clone(), stream.clone());
        Ok(stream)
    }

    /// End stream. Only the host may end it; the record is destroyed.
    pub fn end(&self, id: &str, host_id: &str) -> Result<(), anyhow::Error> {
        let stream = match self.store.streams.get(id) {
            Some(stream) => stream.clone(),
            None => bail!("stream not found"),
        };
        if stream.host_id != host_id {
            bail!("only the host can end a stream");
        }

        self.store.streams.remove(id);
        if let Some(mut entry) = self.store.users.get_mut(host_id) {
            entry.is_live = false;
        }
        Ok(())
    }

    pub fn patch(&self, id: &str, patch: StreamPatch) -> Result<Stream, anyhow::Error> {
        let mut entry = match self.store.streams.get_mut(id) {
            Some(entry) => entry,
            None => bail!("stream not found"),
        };

        if let Some(title) = patch.title {
            entry.title = title;
        }
        if let Some(category) = patch.category {
            entry.category = category;
        }
        if let Some(viewers) = patch.viewers {
            entry.viewers = viewers;
        }

        Ok(entry.clone())
    }

    pub fn set_quality(
        &self,
        id: &str,
        quality: StreamQuality,
    ) -> Result<Stream, anyhow::Error> {
        let mut entry = match self.store.streams.get_mut(id) {
            Some(entry) => entry,
            None => bail!("stream not found"),
        };
        entry.quality = quality;
        Ok(entry.clone())
    }

    pub fn search(&self, query: &str) -> Vec<Stream> {
        let lowered = query.trim().to_lowercase();
        if lowered.is_empty() {
            return Vec::new();
        }

        self.store
            .streams
            .iter()
            .filter(|s| {
                s.name.to_lowercase().contains(&lowered)
                    || s.title.to_lowercase().contains(&lowered)
            })
            .map(|s| s.clone())
            .collect()
    }

    /// Users who gifted the stream's host, largest total first.
    pub fn donors(&self, stream_id: &str) -> Result<Vec<User>, anyhow::Error> {
        let stream = match self.store.streams.get(stream_id) {
            Some(stream) => stream.clone(),
            None => bail!("stream not found"),
        };

        let mut totals: HashMap<String, i64> = HashMap::new();
        for record in self.store.ledger_snapshot() {
            if record.kind == RecordKind::Gift
                && record.counterparty_id.as_deref() == Some(stream.host_id.as_str())
            {
                *totals.entry(record.user_id).or_default() += record.diamonds;
            }
        }

        let mut ranked: Vec<(String, i64)> = totals.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));

        Ok(ranked
            .into_iter()
            .filter_map(|(id, _)| self.store.users.get(&id).map(|u| u.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Economy;

    fn repository() -> StreamRepository {
        let economy = Economy {
            diamonds_per_unit: 3000,
            unit_value_cents: 2500,
            platform_fee_bps: 2000,
            earnings_share_bps: 5000,
            recharge_pack_diamonds: 5000,
        };
        StreamRepository::new(MemoryStore::seeded(economy))
    }

    #[test]
    fn region_filter_narrows_listing() {
        let repo = repository();
        assert_eq!(repo.list("all", None).len(), 3);
        assert_eq!(repo.list("all", Some("us")).len(), 1);
        assert_eq!(repo.list("music", Some("br")).len(), 1);
    }

    #[test]
    fn go_live_then_end_stream_destroys_it() {
        let repo = repository();
        let stream = repo
            .create(
                "u-alice",
                NewStream {
                    title: "First live".to_string(),
                    category: "popular".to_string(),
                    country: "us".to_string(),
                    quality: None,
                },
            )
            .unwrap();

        assert!(repo.create("u-alice", NewStream {
            title: "Second".to_string(),
            category: "popular".to_string(),
            country: "us".to_string(),
            quality: None,
        }).is_err());

        assert!(repo.end(&stream.id, "u-gamer").is_err());
        repo.end(&stream.id, "u-alice").unwrap();
        assert_eq!(repo.list("all", Some("us")).len(), 1);
    }
}
