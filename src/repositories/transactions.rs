use std::collections::HashMap;
use std::sync::Arc;

use anyhow::bail;
use chrono::{Duration, Utc};
use uuid::Uuid;

use super::store::MemoryStore;
use crate::models::ranking::{RankPeriod, RankedUser, TopFan};
use crate::models::transactions::{
    EarningsBreakdown, LedgerRecord, RecordKind, RecordStatus, WalletBalance, WithdrawQuote,
};
use crate::models::users::{User, WithdrawalMethod};

const VIP_LEVEL: i64 = 25;

#[derive(Clone)]
pub struct LedgerRepository {
    store: Arc<MemoryStore>,
}

impl LedgerRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    fn user(&self, user_id: &str) -> Result<User, anyhow::Error> {
        match self.store.users.get(user_id) {
            Some(user) => Ok(user.clone()),
            None => bail!("user not found"),
        }
    }

    pub fn balance(&self, user_id: &str) -> Result<WalletBalance, anyhow::Error> {
        let user = self.user(user_id)?;
        let economy = self.store.economy;

        let gross_cents = economy.gross_cents(user.earnings);
        let platform_fee_cents = economy.fee_cents(gross_cents);

        Ok(WalletBalance {
            diamonds: user.diamonds,
            user_earnings: EarningsBreakdown {
                available_diamonds: user.earnings,
                gross_cents,
                platform_fee_cents,
                net_cents: gross_cents - platform_fee_cents,
            },
        })
    }

    pub fn quote(&self, amount: i64) -> WithdrawQuote {
        let economy = self.store.economy;
        let gross_cents = economy.gross_cents(amount.max(0));
        let platform_fee_cents = economy.fee_cents(gross_cents);

        WithdrawQuote {
            gross_cents,
            platform_fee_cents,
            net_cents: gross_cents - platform_fee_cents,
        }
    }

    pub fn purchase(
        &self,
        user_id: &str,
        diamonds: i64,
        price_cents: i64,
    ) -> Result<User, anyhow::Error> {
        if diamonds <= 0 {
            bail!("purchase amount must be positive");
        }

        let user = {
            let mut entry = match self.store.users.get_mut(user_id) {
                Some(entry) => entry,
                None => bail!("user not found"),
            };
            entry.diamonds += diamonds;
            entry.updated_at = Utc::now();
            entry.clone()
        };

        self.store.append_ledger(LedgerRecord {
            id: format!("rec-{}", Uuid::new_v4().hyphenated()),
            user_id: user_id.to_string(),
            counterparty_id: None,
            related_user_name: None,
            amount_cents: price_cents,
            diamonds,
            kind: RecordKind::Recharge,
            status: RecordStatus::Completed,
            description: format!("Diamond recharge x{diamonds}"),
            created_at: Utc::now(),
        });

        Ok(user)
    }

    pub fn recharge(&self, user_id: &str) -> Result<User, anyhow::Error> {
        let pack = self.store.economy.recharge_pack_diamonds;
        let price = self.store.economy.gross_cents(pack);
        self.purchase(user_id, pack, price)
    }

    /// Converts `amount` earned diamonds into a pending payout. The platform
    /// keeps the fee and books it on the admin account immediately.
    pub fn withdraw(&self, user_id: &str, amount: i64) -> Result<(), anyhow::Error> {
        if amount <= 0 {
            bail!("withdrawal amount must be positive");
        }

        let quote = self.quote(amount);
        let (name, destination) = {
            let mut entry = match self.store.users.get_mut(user_id) {
                Some(entry) => entry,
                None => bail!("user not found"),
            };
            if entry.earnings < amount {
                bail!("insufficient earnings");
            }

            entry.earnings -= amount;
            entry.earnings_withdrawn += amount;
            entry.updated_at = Utc::now();
            (
                entry.name.clone(),
                entry
                    .withdrawal_method
                    .as_ref()
                    .map(|m| m.email.clone())
                    .unwrap_or_else(|| "account not set".to_string()),
            )
        };

        let platform_id = self.platform_account()?;
        if let Some(mut platform) = self.store.users.get_mut(&platform_id) {
            platform.platform_earnings_cents += quote.platform_fee_cents;
        }

        self.store.append_ledger(LedgerRecord {
            id: format!("wd-{}", Uuid::new_v4().hyphenated()),
            user_id: user_id.to_string(),
            counterparty_id: None,
            related_user_name: None,
            amount_cents: quote.net_cents,
            diamonds: amount,
            kind: RecordKind::Withdrawal,
            status: RecordStatus::Pending,
            description: format!("Withdrawal to {destination}"),
            created_at: Utc::now(),
        });
        self.store.append_ledger(LedgerRecord {
            id: format!("fee-{}", Uuid::new_v4().hyphenated()),
            user_id: platform_id,
            counterparty_id: Some(user_id.to_string()),
            related_user_name: Some(name.clone()),
            amount_cents: quote.platform_fee_cents,
            diamonds: 0,
            kind: RecordKind::Fee,
            status: RecordStatus::Completed,
            description: format!("Withdrawal fee - {name}"),
            created_at: Utc::now(),
        });

        Ok(())
    }

    pub fn update_method(
        &self,
        user_id: &str,
        method: WithdrawalMethod,
    ) -> Result<User, anyhow::Error> {
        let mut entry = match self.store.users.get_mut(user_id) {
            Some(entry) => entry,
            None => bail!("user not found"),
        };
        entry.withdrawal_method = Some(method);
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    /// Withdrawal and recharge rows for one user, newest first.
    pub fn history(
        &self,
        user_id: &str,
        status: Option<RecordStatus>,
    ) -> Vec<LedgerRecord> {
        let mut records: Vec<LedgerRecord> = self
            .store
            .ledger_snapshot()
            .into_iter()
            .filter(|r| r.user_id == user_id)
            .filter(|r| matches!(r.kind, RecordKind::Withdrawal | RecordKind::Recharge))
            .filter(|r| status.map(|s| r.status == s).unwrap_or(true))
            .collect();

        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records
    }

    fn platform_account(&self) -> Result<String, anyhow::Error> {
        match self.store.users.iter().find(|u| u.is_admin) {
            Some(user) => Ok(user.id.clone()),
            None => bail!("platform account not configured"),
        }
    }

    /// Fee and payout rows booked on the platform account, newest first.
    pub fn admin_history(&self) -> Result<Vec<LedgerRecord>, anyhow::Error> {
        let platform_id = self.platform_account()?;
        let mut records: Vec<LedgerRecord> = self
            .store
            .ledger_snapshot()
            .into_iter()
            .filter(|r| r.user_id == platform_id)
            .collect();

        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    /// Drains the platform fee balance into a pending payout.
    pub fn admin_withdraw(&self, user_id: &str) -> Result<(), anyhow::Error> {
        let (amount_cents, name, destination) = {
            let mut entry = match self.store.users.get_mut(user_id) {
                Some(entry) => entry,
                None => bail!("user not found"),
            };
            if !entry.is_admin {
                bail!("not a platform account");
            }
            if entry.platform_earnings_cents <= 0 {
                bail!("insufficient balance");
            }

            let amount = entry.platform_earnings_cents;
            entry.platform_earnings_cents = 0;
            entry.updated_at = Utc::now();
            (
                amount,
                entry.name.clone(),
                entry
                    .withdrawal_method
                    .as_ref()
                    .map(|m| m.email.clone())
                    .unwrap_or_else(|| "account not set".to_string()),
            )
        };

        self.store.append_ledger(LedgerRecord {
            id: format!("adm-wd-{}", Uuid::new_v4().hyphenated()),
            user_id: user_id.to_string(),
            counterparty_id: None,
            related_user_name: Some(name),
            amount_cents,
            diamonds: 0,
            kind: RecordKind::Withdrawal,
            status: RecordStatus::Pending,
            description: format!("Withdrawal to {destination}"),
            created_at: Utc::now(),
        });

        Ok(())
    }

    pub fn admin_method(&self, user_id: &str, email: String) -> Result<(), anyhow::Error> {
        let mut entry = match self.store.users.get_mut(user_id) {
            Some(entry) => entry,
            None => bail!("user not found"),
        };
        if !entry.is_admin {
            bail!("not a platform account");
        }
        entry.withdrawal_method = Some(WithdrawalMethod {
            method: "email".to_string(),
            email,
        });
        Ok(())
    }

    /// Gift spending aggregated per sender inside the period window.
    pub fn ranking(&self, period: RankPeriod) -> Vec<RankedUser> {
        let cutoff = Utc::now() - Duration::days(period.days());

        let mut totals: HashMap<String, i64> = HashMap::new();
        for record in self.store.ledger_snapshot() {
            if record.kind == RecordKind::Gift && record.created_at >= cutoff {
                *totals.entry(record.user_id).or_default() += record.diamonds;
            }
        }

        let mut ranked: Vec<(String, i64)> = totals.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(20);

        ranked
            .into_iter()
            .enumerate()
            .filter_map(|(index, (id, value))| {
                self.store.users.get(&id).map(|user| RankedUser {
                    rank: index as u32 + 1,
                    id: user.id.clone(),
                    identification: user.identification.clone(),
                    name: user.name.clone(),
                    avatar_url: user.avatar_url.clone(),
                    level: user.level,
                    value,
                })
            })
            .collect()
    }

    /// All-time biggest gifters across the platform.
    pub fn top_fans(&self) -> Vec<TopFan> {
        let mut totals: HashMap<String, i64> = HashMap::new();
        for record in self.store.ledger_snapshot() {
            if record.kind == RecordKind::Gift {
                *totals.entry(record.user_id).or_default() += record.diamonds;
            }
        }

        let mut ranked: Vec<(String, i64)> = totals.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(10);

        ranked
            .into_iter()
            .filter_map(|(id, amount)| {
                self.store.users.get(&id).map(|user| TopFan {
                    id: user.id.clone(),
                    identification: user.identification.clone(),
                    name: user.name.clone(),
                    avatar: user.avatar_url.clone(),
                    amount,
                    is_vip: user.level >= VIP_LEVEL,
                })
            })
            .collect()
    }
}
