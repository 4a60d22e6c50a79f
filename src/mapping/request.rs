//! Legacy request to new request conversion

use super::{generate_request_id, is_present, or_default, or_null};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::debug;

/// Request in the legacy flat format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyRequest {
    #[serde(rename = "userID")]
    pub user_id: Value,
    #[serde(rename = "requestType")]
    pub request_type: String,
    #[serde(rename = "requestData", default)]
    pub request_data: Value,
}

/// Legacy request types with a dedicated payload mapping
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OperationKind {
    GetAccountDetails,
    UpdatePersonalInfo,
    GetTransactionHistory,
    ProcessPayment,
    CreateSubscription,
    /// Any other request type; its data is copied through unchanged.
    Other(String),
}

impl OperationKind {
    pub const KNOWN: [OperationKind; 5] = [
        OperationKind::GetAccountDetails,
        OperationKind::UpdatePersonalInfo,
        OperationKind::GetTransactionHistory,
        OperationKind::ProcessPayment,
        OperationKind::CreateSubscription,
    ];

    pub fn from_request_type(request_type: &str) -> Self {
        match request_type {
            "get_account_details" => Self::GetAccountDetails,
            "update_personal_info" => Self::UpdatePersonalInfo,
            "get_transaction_history" => Self::GetTransactionHistory,
            "process_payment" => Self::ProcessPayment,
            "create_subscription" => Self::CreateSubscription,
            other => Self::Other(other.to_string()),
        }
    }

    /// The legacy `requestType` token
    pub fn request_type(&self) -> &str {
        match self {
            Self::GetAccountDetails => "get_account_details",
            Self::UpdatePersonalInfo => "update_personal_info",
            Self::GetTransactionHistory => "get_transaction_history",
            Self::ProcessPayment => "process_payment",
            Self::CreateSubscription => "create_subscription",
            Self::Other(raw) => raw,
        }
    }

    /// The new API `operation` token
    pub fn operation_name(&self) -> String {
        match self {
            Self::GetAccountDetails => "GET_ACCOUNT".to_string(),
            Self::UpdatePersonalInfo => "UPDATE_ACCOUNT".to_string(),
            Self::GetTransactionHistory => "GET_TRANSACTIONS".to_string(),
            Self::ProcessPayment => "PROCESS_PAYMENT".to_string(),
            Self::CreateSubscription => "CREATE_SUBSCRIPTION".to_string(),
            Self::Other(raw) => raw.to_uppercase(),
        }
    }
}

impl From<&str> for OperationKind {
    fn from(request_type: &str) -> Self {
        Self::from_request_type(request_type)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.request_type())
    }
}

/// Request in the new enveloped format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRequest {
    pub metadata: RequestMetadata,
    pub operation: String,
    pub payload: Payload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestMetadata {
    pub client_id: Value,
    pub request_id: String,
    pub timestamp: String,
}

/// Operation-specific payload of a new-format request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Payload {
    AccountQuery(AccountQuery),
    AccountUpdate(AccountUpdate),
    TransactionQuery(TransactionQuery),
    PaymentRequest(PaymentRequest),
    SubscriptionRequest(SubscriptionRequest),
    #[serde(untagged)]
    PassThrough(Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountQuery {
    pub user_id: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountUpdate {
    pub user_id: Value,
    pub personal_info: PersonalInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub name: Value,
    pub email: Value,
    pub phone: Value,
    pub address: Option<Address>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: Value,
    pub city: Value,
    pub state: Value,
    pub zip_code: Value,
    pub country: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionQuery {
    pub user_id: Value,
    pub filters: TransactionFilters,
    pub pagination: Pagination,
    pub sort_by: Value,
    pub sort_order: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFilters {
    pub start_date: Value,
    pub end_date: Value,
    pub category: Value,
    pub min_amount: Value,
    pub max_amount: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pagination {
    pub limit: Value,
    pub offset: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub user_id: Value,
    pub payment_details: PaymentDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    pub amount: Value,
    pub currency: Value,
    pub description: Value,
    pub method: Value,
    pub source_id: Value,
    pub recipient: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRequest {
    pub user_id: Value,
    pub plan_id: Value,
    pub start_date: Value,
    pub payment_method: Value,
    pub auto_renew: Value,
}

/// Ambient inputs of a conversion: the generated request id and the clock reading.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestContext {
    pub request_id: String,
    pub now: DateTime<Utc>,
}

impl RequestContext {
    /// Fresh request id and the current time
    pub fn current() -> Self {
        Self {
            request_id: generate_request_id(),
            now: Utc::now(),
        }
    }

    fn timestamp(&self) -> String {
        self.now.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// Convert a legacy request into the new format using a fresh request id and the
/// current time.
pub fn to_new_format(legacy: &LegacyRequest) -> NewRequest {
    to_new_format_with(legacy, &RequestContext::current())
}

/// Convert a legacy request into the new format with explicit ambient inputs.
pub fn to_new_format_with(legacy: &LegacyRequest, ctx: &RequestContext) -> NewRequest {
    let kind = OperationKind::from_request_type(&legacy.request_type);
    let user_id = legacy.user_id.clone();
    let data = &legacy.request_data;

    debug!(request_type = %kind, "Converting legacy request");

    let payload = match &kind {
        OperationKind::GetAccountDetails => Payload::AccountQuery(AccountQuery { user_id }),
        OperationKind::UpdatePersonalInfo => Payload::AccountUpdate(AccountUpdate {
            user_id,
            personal_info: PersonalInfo {
                name: data["name"].clone(),
                email: data["email"].clone(),
                phone: or_null(&data["phone"]),
                address: convert_address(&data["address"]),
            },
        }),
        OperationKind::GetTransactionHistory => Payload::TransactionQuery(TransactionQuery {
            user_id,
            filters: TransactionFilters {
                start_date: or_null(&data["dateRange"]["start"]),
                end_date: or_null(&data["dateRange"]["end"]),
                category: or_null(&data["category"]),
                min_amount: or_null(&data["amountRange"]["min"]),
                max_amount: or_null(&data["amountRange"]["max"]),
            },
            pagination: Pagination {
                limit: or_default(&data["limit"], 50),
                offset: or_default(&data["offset"], 0),
            },
            sort_by: or_default(&data["sortBy"], "date"),
            sort_order: or_default(&data["sortOrder"], "desc"),
        }),
        OperationKind::ProcessPayment => Payload::PaymentRequest(PaymentRequest {
            user_id,
            payment_details: PaymentDetails {
                amount: data["amount"].clone(),
                currency: or_default(&data["currency"], "USD"),
                description: or_default(&data["description"], ""),
                method: or_default(&data["paymentMethod"], "card"),
                source_id: data["sourceId"].clone(),
                recipient: or_null(&data["recipient"]),
            },
        }),
        OperationKind::CreateSubscription => Payload::SubscriptionRequest(SubscriptionRequest {
            user_id,
            plan_id: data["planId"].clone(),
            start_date: or_default(&data["startDate"], ctx.timestamp()),
            payment_method: or_default(&data["paymentMethod"], "card"),
            // Only a missing flag selects the default; an explicit `false` is kept.
            auto_renew: match &data["autoRenew"] {
                Value::Null => Value::Bool(true),
                explicit => explicit.clone(),
            },
        }),
        OperationKind::Other(_) => Payload::PassThrough(shallow_copy(data)),
    };

    NewRequest {
        metadata: RequestMetadata {
            client_id: legacy.user_id.clone(),
            request_id: ctx.request_id.clone(),
            timestamp: ctx.timestamp(),
        },
        operation: kind.operation_name(),
        payload,
    }
}

fn convert_address(address: &Value) -> Option<Address> {
    if !is_present(address) {
        return None;
    }
    Some(Address {
        street: address["street"].clone(),
        city: address["city"].clone(),
        state: address["state"].clone(),
        zip_code: address["zip"].clone(),
        country: address["country"].clone(),
    })
}

/// Spreading a non-object yields an empty object.
fn shallow_copy(data: &Value) -> Value {
    match data {
        Value::Object(map) => Value::Object(map.clone()),
        _ => Value::Object(serde_json::Map::new()),
    }
}
