//! New response to legacy response conversion

use super::is_present;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Response in the new enveloped format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewResponse {
    #[serde(default)]
    pub metadata: ResponseMetadata,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub data: Value,
    /// Explicit result classification. When absent the kind is detected from `data`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_kind: Option<ResultKind>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResponseMetadata {
    pub client_id: Value,
    pub request_id: Value,
    pub timestamp: Value,
}

/// The kinds of result a new-format response can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResultKind {
    AccountDetails,
    Transactions,
    PaymentResult,
    Subscription,
}

impl ResultKind {
    /// Detection precedence when a response does not name its kind
    pub const PRECEDENCE: [ResultKind; 4] = [
        ResultKind::AccountDetails,
        ResultKind::Transactions,
        ResultKind::PaymentResult,
        ResultKind::Subscription,
    ];

    /// Key of this result inside the response `data` object
    pub fn data_key(self) -> &'static str {
        match self {
            ResultKind::AccountDetails => "accountDetails",
            ResultKind::Transactions => "transactions",
            ResultKind::PaymentResult => "paymentResult",
            ResultKind::Subscription => "subscription",
        }
    }

    /// Classify a response: the explicit `resultKind` wins, otherwise the first
    /// present data key in [`ResultKind::PRECEDENCE`] order.
    pub fn classify(response: &NewResponse) -> Option<ResultKind> {
        if let Some(kind) = response.result_kind {
            return Some(kind);
        }

        let present: Vec<ResultKind> = Self::PRECEDENCE
            .into_iter()
            .filter(|kind| is_present(&response.data[kind.data_key()]))
            .collect();

        if present.len() > 1 {
            warn!(
                candidates = ?present,
                chosen = ?present[0],
                "Response data matches several result kinds"
            );
        }
        present.first().copied()
    }
}

/// Response in the legacy flat format
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegacyResponse {
    #[serde(rename = "userID")]
    pub user_id: Value,
    #[serde(rename = "requestID")]
    pub request_id: Value,
    pub timestamp: Value,
    pub status: String,
    pub data: LegacyData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LegacyData {
    Account {
        account: LegacyAccount,
    },
    Transactions {
        transactions: Vec<LegacyTransaction>,
        pagination: LegacyPagination,
    },
    Payment(LegacyPayment),
    Subscription(LegacySubscription),
    Raw(Value),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyAccount {
    pub id: Value,
    pub name: Value,
    pub email: Value,
    pub phone: Value,
    pub address: Option<LegacyAddress>,
    pub created_at: Value,
    pub last_updated: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegacyAddress {
    pub street: Value,
    pub city: Value,
    pub state: Value,
    pub zip: Value,
    pub country: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegacyTransaction {
    pub id: Value,
    pub date: Value,
    pub amount: Value,
    pub currency: Value,
    pub description: Value,
    pub category: Value,
    pub status: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyPagination {
    pub total: Value,
    pub limit: Value,
    pub offset: Value,
    pub has_more: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyPayment {
    pub payment_id: Value,
    pub status: Value,
    pub amount: Value,
    pub currency: Value,
    pub timestamp: Value,
    pub confirmation_code: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacySubscription {
    pub subscription_id: Value,
    pub plan_id: Value,
    pub status: Value,
    pub start_date: Value,
    pub next_billing_date: Value,
    pub auto_renew: Value,
}

/// Map a new API status to its legacy token. Unknown statuses are lower-cased.
pub fn map_status(status: &str) -> String {
    match status {
        "SUCCESS" => "success".to_string(),
        "FAILURE" => "error".to_string(),
        "PENDING" => "pending".to_string(),
        "PARTIAL" => "partial".to_string(),
        other => other.to_lowercase(),
    }
}

/// Convert a new-format response back into the legacy format.
pub fn to_legacy_format(response: &NewResponse) -> LegacyResponse {
    let kind = ResultKind::classify(response);
    debug!(result_kind = ?kind, "Converting new response");

    let data = &response.data;
    let legacy_data = match kind {
        Some(ResultKind::AccountDetails) => LegacyData::Account {
            account: convert_account(&data["accountDetails"]),
        },
        Some(ResultKind::Transactions) => {
            let transactions = data["transactions"]
                .as_array()
                .map(|items| items.iter().map(convert_transaction).collect())
                .unwrap_or_default();
            let pagination = &data["pagination"];
            LegacyData::Transactions {
                transactions,
                pagination: LegacyPagination {
                    total: pagination["total"].clone(),
                    limit: pagination["limit"].clone(),
                    offset: pagination["offset"].clone(),
                    has_more: pagination["hasMore"].clone(),
                },
            }
        }
        Some(ResultKind::PaymentResult) => {
            let payment = &data["paymentResult"];
            LegacyData::Payment(LegacyPayment {
                payment_id: payment["paymentId"].clone(),
                status: payment["status"].clone(),
                amount: payment["amount"].clone(),
                currency: payment["currency"].clone(),
                timestamp: payment["timestamp"].clone(),
                confirmation_code: payment["confirmationCode"].clone(),
            })
        }
        Some(ResultKind::Subscription) => {
            let subscription = &data["subscription"];
            LegacyData::Subscription(LegacySubscription {
                subscription_id: subscription["id"].clone(),
                plan_id: subscription["planId"].clone(),
                status: subscription["status"].clone(),
                start_date: subscription["startDate"].clone(),
                next_billing_date: subscription["nextBillingDate"].clone(),
                auto_renew: subscription["autoRenew"].clone(),
            })
        }
        None => LegacyData::Raw(data.clone()),
    };

    LegacyResponse {
        user_id: response.metadata.client_id.clone(),
        request_id: response.metadata.request_id.clone(),
        timestamp: response.metadata.timestamp.clone(),
        status: map_status(&response.status),
        data: legacy_data,
    }
}

fn convert_account(details: &Value) -> LegacyAccount {
    let address = &details["address"];
    LegacyAccount {
        id: details["id"].clone(),
        name: details["name"].clone(),
        email: details["email"].clone(),
        phone: details["phone"].clone(),
        address: is_present(address).then(|| LegacyAddress {
            street: address["street"].clone(),
            city: address["city"].clone(),
            state: address["state"].clone(),
            zip: address["zipCode"].clone(),
            country: address["country"].clone(),
        }),
        created_at: details["createdAt"].clone(),
        last_updated: details["lastUpdated"].clone(),
    }
}

fn convert_transaction(tx: &Value) -> LegacyTransaction {
    LegacyTransaction {
        id: tx["id"].clone(),
        date: tx["date"].clone(),
        amount: tx["amount"].clone(),
        currency: tx["currency"].clone(),
        description: tx["description"].clone(),
        category: tx["category"].clone(),
        status: tx["status"].clone(),
    }
}
