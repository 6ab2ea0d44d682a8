use thiserror::Error;

/// Service-level errors that can occur in cart business logic
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Product not found: {product_id}")]
    ProductNotFound { product_id: String },

    #[error("Cart not found for user: {user_id}")]
    CartNotFound { user_id: String },

    #[error("Cart item not found: product_id={product_id}, user_id={user_id}")]
    CartItemNotFound { product_id: String, user_id: String },

    #[error("Insufficient stock: requested={requested}, available={available}")]
    InsufficientStock { requested: u32, available: u32 },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Repository error: {source}")]
    Repository {
        #[from]
        source: RepositoryError,
    },
}

/// Coarse classification used at the HTTP boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidRequest,
    Unexpected,
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::ProductNotFound { .. }
            | ServiceError::CartNotFound { .. }
            | ServiceError::CartItemNotFound { .. } => ErrorKind::NotFound,
            ServiceError::InsufficientStock { .. }
            | ServiceError::ValidationError { .. } => ErrorKind::InvalidRequest,
            ServiceError::Repository { .. } => ErrorKind::Unexpected,
        }
    }
}

/// Repository-level errors for data access operations
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database connection failed")]
    ConnectionFailed,

    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },

    #[error("AWS SDK error: {message}")]
    AwsSdk { message: String },

    #[error("DynamoDB table not found: {table_name}. Ensure the table exists and IAM permissions are correct.")]
    TableNotFound { table_name: String },

    #[error("Invalid stored data: {message}")]
    InvalidData { message: String },
}

/// Validation errors for request payloads
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredField { field: String },

    #[error("Invalid field value: {field}={value}, reason={reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Field too long: {field}, max_length={max_length}, actual_length={actual_length}")]
    TooLong {
        field: String,
        max_length: usize,
        actual_length: usize,
    },

    #[error("Value out of range: {field}, min={min}, max={max}, value={value}")]
    OutOfRange {
        field: String,
        min: String,
        max: String,
        value: String,
    },
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::ValidationError {
            message: err.to_string(),
        }
    }
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Result type alias for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Result type alias for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;
