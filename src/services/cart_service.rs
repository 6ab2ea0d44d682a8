use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::models::{
    AddToCartRequest, Cart, PopulatedCart, PopulatedCartItem, Product, RemoveFromCartRequest,
    ServiceError, ServiceResult, UpdateCartItemRequest, Validate,
};
use crate::repositories::{CartRepository, ProductRepository};

/// Cart mutations and the stock adjustments paired with them.
///
/// Each operation is a read-modify-write against the two stores with no
/// transaction spanning them: stock written before a failing cart save is
/// not rolled back, and concurrent calls for the same user or product can
/// interleave between the stock check and the write.
pub struct CartService {
    cart_repository: Arc<dyn CartRepository>,
    product_repository: Arc<dyn ProductRepository>,
}

impl CartService {
    /// Create a new CartService
    pub fn new(
        cart_repository: Arc<dyn CartRepository>,
        product_repository: Arc<dyn ProductRepository>,
    ) -> Self {
        Self {
            cart_repository,
            product_repository,
        }
    }

    /// Get a user's cart with every line resolved to its product record.
    /// Returns `None` when the user has no cart.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn get_cart(&self, user_id: &str) -> ServiceResult<Option<PopulatedCart>> {
        info!("Getting cart for user");

        let cart = match self.cart_repository.find_cart(user_id).await? {
            Some(cart) => cart,
            None => {
                info!("No cart exists for user");
                return Ok(None);
            }
        };

        let populated = self.populate(cart).await?;

        info!("Cart retrieved with {} items", populated.items.len());
        Ok(Some(populated))
    }

    /// Reserve stock for a product and add it to the user's cart, creating
    /// the cart on first use
    #[instrument(skip(self, request), fields(user_id = %user_id, product_id = %request.product_id, quantity = request.quantity))]
    pub async fn add_to_cart(&self, user_id: &str, request: AddToCartRequest) -> ServiceResult<Cart> {
        info!("Adding item to cart");

        request.validate()?;

        let mut cart = match self.cart_repository.find_cart(user_id).await? {
            Some(cart) => cart,
            None => {
                info!("Cart not found, creating new cart");
                Cart::new(user_id.to_string())
            }
        };

        let mut product = self.require_product(&request.product_id).await?;

        if !product.has_stock_for(request.quantity) {
            warn!(
                available = product.quantity,
                "Not enough stock to add item to cart"
            );
            return Err(ServiceError::InsufficientStock {
                requested: request.quantity,
                available: product.quantity,
            });
        }

        product.take_stock(request.quantity);
        self.product_repository.save(product).await?;

        cart.add_item(request.product_id, request.quantity);
        let cart = self.cart_repository.save_cart(cart).await?;

        info!("Item added to cart successfully");
        Ok(cart)
    }

    /// Set the quantity of an existing cart line.
    ///
    /// Lowering the quantity returns the difference to stock. Raising it does
    /// not take any extra stock.
    #[instrument(skip(self, request), fields(user_id = %user_id, product_id = %request.product_id, quantity = request.quantity))]
    pub async fn update_cart_item(
        &self,
        user_id: &str,
        request: UpdateCartItemRequest,
    ) -> ServiceResult<Cart> {
        info!("Updating cart item quantity");

        request.validate()?;

        let mut cart = self.require_cart(user_id).await?;
        let current_quantity = self.require_item_quantity(&cart, &request.product_id)?;
        let mut product = self.require_product(&request.product_id).await?;

        if request.quantity < current_quantity {
            let released = current_quantity - request.quantity;
            product.return_stock(released);
            self.product_repository.save(product).await?;
            info!(released, "Returned stock for reduced quantity");
        }

        cart.set_item_quantity(&request.product_id, request.quantity);
        let cart = self.cart_repository.save_cart(cart).await?;

        info!("Cart item updated successfully");
        Ok(cart)
    }

    /// Remove a line from the cart and return its full quantity to stock
    #[instrument(skip(self, request), fields(user_id = %user_id, product_id = %request.product_id))]
    pub async fn remove_from_cart(
        &self,
        user_id: &str,
        request: RemoveFromCartRequest,
    ) -> ServiceResult<Cart> {
        info!("Removing item from cart");

        request.validate()?;

        let mut cart = self.require_cart(user_id).await?;
        let quantity = self.require_item_quantity(&cart, &request.product_id)?;
        let mut product = self.require_product(&request.product_id).await?;

        product.return_stock(quantity);
        self.product_repository.save(product).await?;

        cart.remove_item(&request.product_id);
        let cart = self.cart_repository.save_cart(cart).await?;

        info!("Item removed from cart successfully");
        Ok(cart)
    }

    /// Empty the cart, returning every line's quantity to stock. Lines whose
    /// product no longer exists are skipped.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn clear_cart(&self, user_id: &str) -> ServiceResult<Cart> {
        info!("Clearing cart");

        let mut cart = self.require_cart(user_id).await?;

        for item in cart.clear() {
            if let Some(mut product) = self.product_repository.find_by_id(&item.product_id).await? {
                product.return_stock(item.quantity);
                self.product_repository.save(product).await?;
            }
        }

        let cart = self.cart_repository.save_cart(cart).await?;

        info!("Cart cleared successfully");
        Ok(cart)
    }

    async fn require_cart(&self, user_id: &str) -> ServiceResult<Cart> {
        self.cart_repository
            .find_cart(user_id)
            .await?
            .ok_or_else(|| ServiceError::CartNotFound {
                user_id: user_id.to_string(),
            })
    }

    async fn require_product(&self, product_id: &str) -> ServiceResult<Product> {
        self.product_repository
            .find_by_id(product_id)
            .await?
            .ok_or_else(|| ServiceError::ProductNotFound {
                product_id: product_id.to_string(),
            })
    }

    fn require_item_quantity(&self, cart: &Cart, product_id: &str) -> ServiceResult<u32> {
        cart.find_item(product_id)
            .map(|item| item.quantity)
            .ok_or_else(|| ServiceError::CartItemNotFound {
                product_id: product_id.to_string(),
                user_id: cart.user_id.clone(),
            })
    }

    /// Resolve each cart line to its product record
    async fn populate(&self, cart: Cart) -> ServiceResult<PopulatedCart> {
        let mut items = Vec::with_capacity(cart.items.len());

        for item in cart.items {
            let product = self.product_repository.find_by_id(&item.product_id).await?;
            if product.is_none() {
                warn!("Product not found for cart item: {}", item.product_id);
            }
            items.push(PopulatedCartItem {
                product_id: item.product_id,
                product,
                quantity: item.quantity,
            });
        }

        Ok(PopulatedCart {
            user_id: cart.user_id,
            items,
            created_at: cart.created_at,
            updated_at: cart.updated_at,
        })
    }
}
