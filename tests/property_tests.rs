use std::collections::HashMap;
use std::sync::Arc;

use cart_rs::models::{
    validate_cart_quantity, validate_product_id, AddToCartRequest, Cart, Product,
    RemoveFromCartRequest, UpdateCartItemRequest,
};
use cart_rs::repositories::{CartRepository, InMemoryCartRepository, InMemoryProductRepository};
use cart_rs::services::CartService;
use proptest::prelude::*;
use rust_decimal_macros::dec;

const PRODUCT_IDS: [&str; 3] = ["P001", "P002", "P003"];

#[derive(Debug, Clone)]
enum CartAction {
    Add(usize, u32),
    Decrease(usize, u32),
    Remove(usize),
    Clear,
}

prop_compose! {
    fn arb_product_index()(index in 0..PRODUCT_IDS.len()) -> usize {
        index
    }
}

fn arb_action() -> impl Strategy<Value = CartAction> {
    prop_oneof![
        (arb_product_index(), 1u32..15).prop_map(|(i, q)| CartAction::Add(i, q)),
        (arb_product_index(), 1u32..15).prop_map(|(i, q)| CartAction::Decrease(i, q)),
        arb_product_index().prop_map(CartAction::Remove),
        Just(CartAction::Clear),
    ]
}

prop_compose! {
    fn arb_initial_stock()(stock in prop::collection::vec(0u32..50, PRODUCT_IDS.len())) -> Vec<u32> {
        stock
    }
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

/// Run a sequence of actions and return (initial, final stock, final cart quantities)
async fn run_actions(
    initial: &[u32],
    actions: Vec<CartAction>,
) -> (HashMap<String, u32>, HashMap<String, u32>) {
    let products: Vec<Product> = PRODUCT_IDS
        .iter()
        .zip(initial)
        .map(|(id, stock)| {
            let mut product = Product::new(id.to_string(), String::new(), dec!(1.00), *stock);
            product.id = id.to_string();
            product
        })
        .collect();

    let carts = InMemoryCartRepository::new();
    let product_store = InMemoryProductRepository::with_products(products);
    let service = CartService::new(Arc::new(carts.clone()), Arc::new(product_store.clone()));

    for action in actions {
        // Rejected actions are part of the sequence; their errors are ignored
        let _ = match action {
            CartAction::Add(i, quantity) => {
                let request = AddToCartRequest {
                    product_id: PRODUCT_IDS[i].to_string(),
                    quantity,
                };
                service.add_to_cart("user", request).await.map(|_| ())
            }
            CartAction::Decrease(i, by) => {
                let current = carts
                    .find_cart("user")
                    .await
                    .unwrap()
                    .and_then(|cart| cart.find_item(PRODUCT_IDS[i]).map(|item| item.quantity));
                match current {
                    Some(current) if current > by => {
                        let request = UpdateCartItemRequest {
                            product_id: PRODUCT_IDS[i].to_string(),
                            quantity: current - by,
                        };
                        service.update_cart_item("user", request).await.map(|_| ())
                    }
                    _ => Ok(()),
                }
            }
            CartAction::Remove(i) => {
                let request = RemoveFromCartRequest {
                    product_id: PRODUCT_IDS[i].to_string(),
                };
                service.remove_from_cart("user", request).await.map(|_| ())
            }
            CartAction::Clear => service.clear_cart("user").await.map(|_| ()),
        };
    }

    let mut stock = HashMap::new();
    for id in PRODUCT_IDS {
        stock.insert(id.to_string(), product_store.stock_of(id).await.unwrap());
    }

    let in_cart = carts
        .find_cart("user")
        .await
        .unwrap()
        .map(|cart: Cart| {
            cart.items
                .into_iter()
                .map(|item| (item.product_id, item.quantity))
                .collect()
        })
        .unwrap_or_default();

    (stock, in_cart)
}

proptest! {
    #[test]
    fn test_stock_is_conserved_without_increases(
        initial in arb_initial_stock(),
        actions in prop::collection::vec(arb_action(), 0..25)
    ) {
        let (stock, in_cart) = runtime().block_on(run_actions(&initial, actions));

        for (index, id) in PRODUCT_IDS.iter().enumerate() {
            let reserved = in_cart.get(*id).copied().unwrap_or(0);
            prop_assert_eq!(stock[*id] + reserved, initial[index]);
        }
    }

    #[test]
    fn test_cart_lines_are_unique_and_positive(
        initial in arb_initial_stock(),
        actions in prop::collection::vec(arb_action(), 0..25)
    ) {
        let (_, in_cart) = runtime().block_on(run_actions(&initial, actions));

        prop_assert!(in_cart.len() <= PRODUCT_IDS.len());
        for quantity in in_cart.values() {
            prop_assert!(*quantity > 0);
        }
    }

    #[test]
    fn test_add_beyond_stock_is_rejected(stock in 0u32..20, extra in 1u32..20) {
        let (final_stock, in_cart) = runtime().block_on(run_actions(
            &[stock, 0, 0],
            vec![CartAction::Add(0, stock + extra)],
        ));

        prop_assert_eq!(final_stock["P001"], stock);
        prop_assert!(in_cart.is_empty());
    }

    #[test]
    fn test_positive_quantities_pass_validation(quantity in 1u32..) {
        prop_assert!(validate_cart_quantity(quantity).is_ok());
    }

    #[test]
    fn test_large_add_within_stock_is_accepted(quantity in 1001u32..5000) {
        let (final_stock, in_cart) = runtime().block_on(run_actions(
            &[5000, 0, 0],
            vec![CartAction::Add(0, quantity)],
        ));

        prop_assert_eq!(final_stock["P001"], 5000 - quantity);
        prop_assert_eq!(in_cart.get("P001").copied(), Some(quantity));
    }

    #[test]
    fn test_product_ids_validation(id in "[A-Za-z0-9-]{1,128}") {
        prop_assert!(validate_product_id(&id).is_ok());
    }

    #[test]
    fn test_blank_product_ids_fail_validation(id in " {0,10}") {
        prop_assert!(validate_product_id(&id).is_err());
    }
}
