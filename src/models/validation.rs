use super::{
    AddToCartRequest, RemoveFromCartRequest, UpdateCartItemRequest, ValidationError,
    ValidationResult,
};

/// Trait for validating input models
pub trait Validate {
    fn validate(&self) -> ValidationResult<()>;
}

/// Validation constants
pub const MAX_PRODUCT_ID_LENGTH: usize = 128;
pub const MIN_CART_QUANTITY: u32 = 1;

impl Validate for AddToCartRequest {
    fn validate(&self) -> ValidationResult<()> {
        validate_product_id(&self.product_id)?;
        validate_cart_quantity(self.quantity)?;
        Ok(())
    }
}

impl Validate for UpdateCartItemRequest {
    fn validate(&self) -> ValidationResult<()> {
        validate_product_id(&self.product_id)?;
        validate_cart_quantity(self.quantity)?;
        Ok(())
    }
}

impl Validate for RemoveFromCartRequest {
    fn validate(&self) -> ValidationResult<()> {
        validate_product_id(&self.product_id)
    }
}

/// Validate a product identifier
pub fn validate_product_id(product_id: &str) -> ValidationResult<()> {
    let trimmed = product_id.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::RequiredField {
            field: "productId".to_string(),
        });
    }

    if product_id.len() > MAX_PRODUCT_ID_LENGTH {
        return Err(ValidationError::TooLong {
            field: "productId".to_string(),
            max_length: MAX_PRODUCT_ID_LENGTH,
            actual_length: product_id.len(),
        });
    }

    if product_id.chars().any(char::is_control) {
        return Err(ValidationError::InvalidValue {
            field: "productId".to_string(),
            value: product_id.escape_default().to_string(),
            reason: "Contains invalid control characters".to_string(),
        });
    }

    Ok(())
}

/// Validate a cart line quantity. Any positive `u32` is accepted; stock is
/// the only practical ceiling.
pub fn validate_cart_quantity(quantity: u32) -> ValidationResult<()> {
    if quantity < MIN_CART_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: MIN_CART_QUANTITY.to_string(),
            max: u32::MAX.to_string(),
            value: quantity.to_string(),
        });
    }

    Ok(())
}
