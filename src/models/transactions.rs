use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Gift,
    Recharge,
    Withdrawal,
    Fee,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Completed,
    Pending,
    Processing,
    Cancelled,
    Failed,
}

impl RecordStatus {
    pub fn parse(value: &str) -> Option<RecordStatus> {
        match value {
            "completed" => Some(RecordStatus::Completed),
            "pending" => Some(RecordStatus::Pending),
            "processing" => Some(RecordStatus::Processing),
            "cancelled" => Some(RecordStatus::Cancelled),
            "failed" => Some(RecordStatus::Failed),
            _ => None,
        }
    }
}

/// Append-only ledger entry. Money amounts are cents; `diamonds` carries the
/// virtual-currency volume for gift rows and is zero elsewhere.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct LedgerRecord {
    pub id: String,
    pub user_id: String,
    pub counterparty_id: Option<String>,
    pub related_user_name: Option<String>,
    pub amount_cents: i64,
    pub diamonds: i64,
    pub kind: RecordKind,
    pub status: RecordStatus,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EarningsBreakdown {
    pub available_diamonds: i64,
    pub gross_cents: i64,
    pub platform_fee_cents: i64,
    pub net_cents: i64,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct WalletBalance {
    pub diamonds: i64,
    pub user_earnings: EarningsBreakdown,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct WithdrawQuote {
    pub gross_cents: i64,
    pub platform_fee_cents: i64,
    pub net_cents: i64,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PurchaseRequest {
    pub diamonds: i64,
    pub price_cents: i64,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct WithdrawRequest {
    pub amount: i64,
}
