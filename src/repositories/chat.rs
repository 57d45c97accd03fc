use std::sync::Arc;

use anyhow::bail;
use chrono::Utc;
use uuid::Uuid;

use super::store::MemoryStore;
use crate::models::chat::{Conversation, ConversationView, FriendSummary};

#[derive(Clone)]
pub struct ChatRepository {
    store: Arc<MemoryStore>,
}

impl ChatRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    fn view_for(&self, conversation: &Conversation, viewer: &str) -> Option<ConversationView> {
        let other = conversation
            .participants
            .iter()
            .find(|id| id.as_str() != viewer)?;
        let friend = self.store.users.get(other)?;

        Some(ConversationView {
            id: conversation.id.clone(),
            friend: FriendSummary {
                id: friend.id.clone(),
                name: friend.name.clone(),
                avatar_url: friend.avatar_url.clone(),
                is_online: friend.is_live,
                level: friend.level,
            },
            last_message: conversation
                .messages
                .last()
                .map(|m| m.text.clone())
                .unwrap_or_default(),
            unread_count: conversation.unread_count,
            updated_at: conversation.updated_at,
        })
    }

    pub fn conversations(&self, viewer: &str) -> Vec<ConversationView> {
        let mut views: Vec<ConversationView> = self
            .store
            .conversations
            .iter()
            .filter(|c| c.participants.iter().any(|id| id == viewer))
            .filter_map(|c| self.view_for(&c, viewer))
            .collect();

        views.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        views
    }

    /// Opens a thread with `peer`, reusing an existing one.
    pub fn start(&self, viewer: &str, peer: &str) -> Result<ConversationView, anyhow::Error> {
        if viewer == peer {
            bail!("cannot chat with yourself");
        }
        if !self.store.users.contains_key(peer) {
            bail!("user not found");
        }

        let existing = self
            .store
            .conversations
            .iter()
            .find(|c| {
                c.participants.iter().any(|id| id == viewer)
                    && c.participants.iter().any(|id| id == peer)
            })
            .map(|c| c.clone());

        let conversation = match existing {
            Some(conversation) => conversation,
            None => {
                let conversation = Conversation {
                    id: format!("conv-{}", Uuid::new_v4().hyphenated()),
                    participants: vec![viewer.to_string(), peer.to_string()],
                    messages: Vec::new(),
                    unread_count: 0,
                    updated_at: Utc::now(),
                };
                self.store
                    .conversations
                    .insert(conversation.id.clone(), conversation.clone());
                conversation
            }
        };

        match self.view_for(&conversation, viewer) {
            Some(view) => Ok(view),
            None => bail!("user not found"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Economy;

    fn repository() -> ChatRepository {
        let economy = Economy {
            diamonds_per_unit: 3000,
            unit_value_cents: 2500,
            platform_fee_bps: 2000,
            earnings_share_bps: 5000,
            recharge_pack_diamonds: 5000,
        };
        ChatRepository::new(MemoryStore::seeded(economy))
    }

    #[test]
    fn admin_sees_the_support_welcome_thread() {
        let repo = repository();
        let views = repo.conversations("u-admin");
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].friend.id, "u-support");
        assert_eq!(views[0].unread_count, 1);
    }

    #[test]
    fn starting_a_thread_twice_reuses_it() {
        let repo = repository();
        let first = repo.start("u-admin", "u-mirella").unwrap();
        let second = repo.start("u-admin", "u-mirella").unwrap();
        assert_eq!(first.id, second.id);
    }
}
