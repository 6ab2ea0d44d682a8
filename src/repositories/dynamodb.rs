use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Error as DynamoDbError;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::error;

use crate::models::{RepositoryError, RepositoryResult};

/// Create a DynamoDB client span carrying X-Ray and OpenTelemetry attributes
pub(crate) fn dynamodb_span(operation: &str, table_name: &str, region: &str) -> tracing::Span {
    tracing::info_span!(
        "DynamoDB",
        // AWS X-Ray specific attributes
        "aws.service" = "DynamoDB",
        "aws.operation" = operation,
        "aws.region" = %region,
        "aws.dynamodb.table_name" = %table_name,
        "aws.request_id" = tracing::field::Empty,
        "aws.agent" = "rust-aws-sdk",

        // Resource identification for X-Ray
        "aws.remote.service" = "AWS::DynamoDB",
        "aws.remote.operation" = operation,
        "aws.remote.resource.type" = "AWS::DynamoDB::Table",
        "aws.remote.resource.identifier" = %table_name,

        // OpenTelemetry semantic conventions
        "otel.kind" = "client",
        "otel.name" = format!("DynamoDB.{}", operation),

        // RPC semantic conventions for AWS API calls
        "rpc.system" = "aws-api",
        "rpc.service" = "AmazonDynamoDBv2",
        "rpc.method" = operation,

        // Database semantic conventions
        "db.system" = "dynamodb",
        "db.name" = %table_name,
        "db.operation" = operation,

        "http.status_code" = tracing::field::Empty,
        "component" = "aws-sdk-dynamodb",
    )
}

/// Convert DynamoDB error to RepositoryError
pub(crate) fn map_dynamodb_error(error: DynamoDbError, table_name: &str) -> RepositoryError {
    error!("DynamoDB error: {:?}", error);

    if let DynamoDbError::ResourceNotFoundException(_) = error {
        return RepositoryError::TableNotFound {
            table_name: table_name.to_string(),
        };
    }

    RepositoryError::AwsSdk {
        message: error.to_string(),
    }
}

pub(crate) fn required_string(
    item: &HashMap<String, AttributeValue>,
    field: &str,
) -> RepositoryResult<String> {
    item.get(field)
        .and_then(|v| v.as_s().ok())
        .cloned()
        .ok_or_else(|| RepositoryError::InvalidData {
            message: format!("Missing {}", field),
        })
}

pub(crate) fn required_number<T: std::str::FromStr>(
    item: &HashMap<String, AttributeValue>,
    field: &str,
) -> RepositoryResult<T> {
    item.get(field)
        .and_then(|v| v.as_n().ok())
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| RepositoryError::InvalidData {
            message: format!("Invalid {}", field),
        })
}

pub(crate) fn optional_timestamp(
    item: &HashMap<String, AttributeValue>,
    field: &str,
) -> Option<DateTime<Utc>> {
    item.get(field)
        .and_then(|v| v.as_s().ok())
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

pub(crate) fn required_timestamp(
    item: &HashMap<String, AttributeValue>,
    field: &str,
) -> RepositoryResult<DateTime<Utc>> {
    optional_timestamp(item, field).ok_or_else(|| RepositoryError::InvalidData {
        message: format!("Invalid {}", field),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_helpers() {
        let now = Utc::now();
        let mut item = HashMap::new();
        item.insert("id".to_string(), AttributeValue::S("P001".to_string()));
        item.insert("quantity".to_string(), AttributeValue::N("12".to_string()));
        item.insert(
            "created_at".to_string(),
            AttributeValue::S(now.to_rfc3339()),
        );

        assert_eq!(required_string(&item, "id").unwrap(), "P001");
        assert_eq!(required_number::<u32>(&item, "quantity").unwrap(), 12);
        assert_eq!(required_timestamp(&item, "created_at").unwrap(), now);
        assert!(optional_timestamp(&item, "updated_at").is_none());
    }

    #[test]
    fn test_missing_fields_are_invalid_data() {
        let item = HashMap::new();

        match required_string(&item, "user_id") {
            Err(RepositoryError::InvalidData { message }) => {
                assert_eq!(message, "Missing user_id");
            }
            other => panic!("Expected InvalidData error, got {:?}", other),
        }
        assert!(required_number::<u32>(&item, "quantity").is_err());
    }
}
