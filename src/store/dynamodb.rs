//! DynamoDB index store
//!
//! Executes transactions with `TransactWriteItems`. Items are marshaled from
//! the JSON item representation into `AttributeValue` maps; conditions are
//! rendered against the `SK` attribute.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::transact_write_items::TransactWriteItemsError;
use aws_sdk_dynamodb::types::{
    AttributeValue, CancellationReason as DynamoCancellationReason, ConditionCheck, Delete, Put,
    TransactWriteItem,
};
use aws_sdk_dynamodb::Client;
use aws_smithy_types::timeout::TimeoutConfig;
use serde_json::Value;

use super::errors::{CancellationCode, CancellationReason, StoreError, StoreResult};
use super::transaction::{TransactWriteRequest, WriteOp};
use super::IndexStore;
use crate::config::DynamoDbConfig;
use crate::model::schema::{ATTR_PK, ATTR_SK};
use crate::model::{Item, ItemKey};

/// Placeholder bound to the sort key in condition expressions
const SK_PLACEHOLDER: &str = "#sk";

/// Index store backed by a DynamoDB table with `PK`/`SK` string keys
#[derive(Clone)]
pub struct DynamoDbIndexStore {
    client: Client,
}

impl std::fmt::Debug for DynamoDbIndexStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamoDbIndexStore").finish_non_exhaustive()
    }
}

impl DynamoDbIndexStore {
    /// Create a store inheriting HTTP client, retry and credentials from `sdk_config`
    pub fn new(sdk_config: &aws_config::SdkConfig, config: DynamoDbConfig) -> Self {
        let mut builder = aws_sdk_dynamodb::config::Builder::from(sdk_config);

        if let Some(region) = config.region {
            builder = builder.region(aws_sdk_dynamodb::config::Region::new(region));
        }

        if let Some(endpoint) = config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        if let Some(timeout_ms) = config.timeout_ms {
            let timeout_config = TimeoutConfig::builder()
                .operation_timeout(Duration::from_millis(timeout_ms))
                .build();
            builder = builder.timeout_config(timeout_config);
        }

        Self {
            client: Client::from_conf(builder.build()),
        }
    }

    /// Load the SDK configuration from the environment, then build the store
    pub async fn from_env(config: DynamoDbConfig) -> Self {
        let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(&sdk_config, config)
    }

    /// Create from a pre-built client (for testing)
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    fn key_attributes(key: &ItemKey) -> HashMap<String, AttributeValue> {
        HashMap::from([
            (ATTR_PK.to_string(), AttributeValue::S(key.pk.clone())),
            (ATTR_SK.to_string(), AttributeValue::S(key.sk.clone())),
        ])
    }

    fn item_attributes(item: &Item) -> HashMap<String, AttributeValue> {
        item.iter()
            .map(|(name, value)| (name.clone(), json_to_attribute(value)))
            .collect()
    }

    fn to_transact_item(table: &str, op: &WriteOp) -> StoreResult<TransactWriteItem> {
        let invalid = |e: aws_sdk_dynamodb::error::BuildError| {
            StoreError::InvalidRequest(format!("{} build failed: {}", op.kind(), e))
        };

        let item = match op {
            WriteOp::ConditionCheck { key, condition } => {
                let check = ConditionCheck::builder()
                    .table_name(table)
                    .set_key(Some(Self::key_attributes(key)))
                    .condition_expression(condition.expression())
                    .expression_attribute_names(SK_PLACEHOLDER, ATTR_SK)
                    .build()
                    .map_err(invalid)?;
                TransactWriteItem::builder().condition_check(check).build()
            }
            WriteOp::Put { item, condition } => {
                let mut put = Put::builder()
                    .table_name(table)
                    .set_item(Some(Self::item_attributes(item)));
                if let Some(condition) = condition {
                    put = put
                        .condition_expression(condition.expression())
                        .expression_attribute_names(SK_PLACEHOLDER, ATTR_SK);
                }
                TransactWriteItem::builder()
                    .put(put.build().map_err(invalid)?)
                    .build()
            }
            WriteOp::Delete { key, condition } => {
                let mut delete = Delete::builder()
                    .table_name(table)
                    .set_key(Some(Self::key_attributes(key)));
                if let Some(condition) = condition {
                    delete = delete
                        .condition_expression(condition.expression())
                        .expression_attribute_names(SK_PLACEHOLDER, ATTR_SK);
                }
                TransactWriteItem::builder()
                    .delete(delete.build().map_err(invalid)?)
                    .build()
            }
        };
        Ok(item)
    }

    fn map_error(err: SdkError<TransactWriteItemsError>) -> StoreError {
        match err {
            SdkError::ServiceError(service_err) => Self::map_service_error(service_err.into_err()),
            other => StoreError::Transport(format!("DynamoDB TransactWriteItems failed: {}", other)),
        }
    }

    /// Cancellation reasons stay positional: reason `i` belongs to item `i`
    fn map_service_error(err: TransactWriteItemsError) -> StoreError {
        match err {
            TransactWriteItemsError::TransactionCanceledException(e) => StoreError::Cancelled {
                reasons: e.cancellation_reasons().iter().map(map_reason).collect(),
            },
            TransactWriteItemsError::TransactionInProgressException(e) => {
                StoreError::Conflict(e.to_string())
            }
            other => StoreError::Transport(format!("DynamoDB TransactWriteItems failed: {}", other)),
        }
    }
}

fn map_reason(reason: &DynamoCancellationReason) -> CancellationReason {
    CancellationReason::new(
        CancellationCode::parse(reason.code().unwrap_or("None")),
        reason.message().map(str::to_string),
    )
}

/// Convert a JSON value into a DynamoDB attribute
fn json_to_attribute(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::Array(values) => AttributeValue::L(values.iter().map(json_to_attribute).collect()),
        Value::Object(map) => AttributeValue::M(
            map.iter()
                .map(|(k, v)| (k.clone(), json_to_attribute(v)))
                .collect(),
        ),
    }
}

#[async_trait]
impl IndexStore for DynamoDbIndexStore {
    async fn transact_write(&self, request: &TransactWriteRequest) -> StoreResult<()> {
        request.validate()?;

        let items = request
            .items
            .iter()
            .map(|op| Self::to_transact_item(&request.table_name, op))
            .collect::<StoreResult<Vec<_>>>()?;

        self.client
            .transact_write_items()
            .set_transact_items(Some(items))
            .send()
            .await
            .map(|_| ())
            .map_err(Self::map_error)
    }
}
