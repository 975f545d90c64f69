//! Store adapters against a migrated `PostgreSQL` database.
//!
//! ```bash
//! export STOREFRONT_DATABASE_URL=postgres://localhost/cartwright_test
//! cargo run -p cartwright-cli -- migrate
//! cargo test -p cartwright-integration-tests --test postgres -- --ignored
//! ```

#![allow(clippy::unwrap_used)]

use secrecy::SecretString;
use sqlx::PgPool;

use cartwright_core::{Email, Price, Quantity, UserId};
use cartwright_storefront::db::{
    RepositoryError, Stores, create_pool, products::PgCatalogRepository,
};
use cartwright_storefront::models::{NewProduct, NewUser, PostalAddress, Product};
use cartwright_storefront::services::{CartService, CheckoutService, OrderService, ShopError};

async fn pool() -> PgPool {
    let url = std::env::var("STOREFRONT_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("STOREFRONT_DATABASE_URL must be set");
    create_pool(&SecretString::from(url), 4).await.unwrap()
}

/// Unique per run so tests can share one database.
fn unique(label: &str) -> String {
    format!("{label}-{}", uuid::Uuid::new_v4().simple())
}

async fn create_user(stores: &Stores) -> UserId {
    let email = format!("{}@example.com", unique("pg"));
    stores
        .users
        .create_user(
            &NewUser {
                email: Email::parse(&email).unwrap(),
                first_name: Some("Ada".to_owned()),
                last_name: None,
                phone: None,
                address: PostalAddress {
                    address: Some("1 Main St".to_owned()),
                    city: Some("Springfield".to_owned()),
                    state: Some("IL".to_owned()),
                    zip_code: Some("62701".to_owned()),
                },
            },
            "hash",
        )
        .await
        .unwrap()
        .id
}

async fn create_product(stores: &Stores, cents: i64) -> Product {
    stores
        .catalog
        .insert_product(&NewProduct {
            name: unique("Widget"),
            description: None,
            category: unique("category"),
            price: Price::from_cents(cents),
            stock_quantity: 5,
        })
        .await
        .unwrap()
}

#[tokio::test]
#[ignore = "Requires PostgreSQL - set STOREFRONT_DATABASE_URL"]
async fn test_checkout_round_trip() {
    let pool = pool().await;
    let stores = Stores::postgres(&pool);
    let carts = CartService::new(&stores);
    let checkout = CheckoutService::new(&stores);
    let orders = OrderService::new(&stores);

    let user = create_user(&stores).await;
    let widget = create_product(&stores, 1000).await;
    let gadget = create_product(&stores, 500).await;

    carts.add_item(user, widget.id, 1).await.unwrap();
    carts.add_item(user, widget.id, 1).await.unwrap();
    carts.add_item(user, gadget.id, 1).await.unwrap();

    let view = carts.view_cart(user).await.unwrap();
    assert_eq!(view.items.len(), 2);
    assert_eq!(view.subtotal, Price::from_cents(2500));

    let order = checkout.checkout(view.cart.id, user).await.unwrap();
    assert_eq!(order.total_amount, Price::from_cents(2500));
    assert_eq!(
        order.billing_address.as_deref(),
        Some("1 Main St, Springfield, IL 62701")
    );

    let again = checkout.checkout(view.cart.id, user).await;
    assert!(matches!(again, Err(ShopError::EmptyCart)));

    let detail = orders.get_order(user, order.id).await.unwrap().unwrap();
    assert_eq!(detail.items.len(), 2);
    let widget_line = detail
        .items
        .iter()
        .find(|i| i.product_id == widget.id)
        .unwrap();
    assert_eq!(widget_line.quantity, Quantity::new(2).unwrap());
    assert_eq!(widget_line.price, Price::from_cents(1000));

    let stranger = create_user(&stores).await;
    assert!(orders.get_order(stranger, order.id).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL - set STOREFRONT_DATABASE_URL"]
async fn test_concurrent_checkout_places_one_order() {
    let pool = pool().await;
    let stores = Stores::postgres(&pool);
    let carts = CartService::new(&stores);
    let checkout = CheckoutService::new(&stores);
    let orders = OrderService::new(&stores);

    let user = create_user(&stores).await;
    let widget = create_product(&stores, 1000).await;
    carts.add_item(user, widget.id, 2).await.unwrap();
    let cart = carts.get_cart(user).await.unwrap().unwrap();

    let (a, b) = tokio::join!(checkout.checkout(cart.id, user), checkout.checkout(cart.id, user));
    assert_eq!(usize::from(a.is_ok()) + usize::from(b.is_ok()), 1);
    assert_eq!(orders.list_for_user(user).await.unwrap().len(), 1);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL - set STOREFRONT_DATABASE_URL"]
async fn test_duplicate_email_conflicts() {
    let pool = pool().await;
    let stores = Stores::postgres(&pool);

    let email = Email::parse(&format!("{}@example.com", unique("dup"))).unwrap();
    let new_user = NewUser {
        email,
        first_name: None,
        last_name: None,
        phone: None,
        address: PostalAddress::default(),
    };
    stores.users.create_user(&new_user, "hash").await.unwrap();

    let second = stores.users.create_user(&new_user, "hash").await;
    assert!(matches!(second, Err(RepositoryError::Conflict(_))));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL - set STOREFRONT_DATABASE_URL"]
async fn test_seed_upsert_updates_in_place() {
    let pool = pool().await;
    let repo = PgCatalogRepository::new(pool);

    let mut seed = NewProduct {
        name: unique("Mug"),
        description: None,
        category: "kitchen".to_owned(),
        price: Price::from_cents(750),
        stock_quantity: 3,
    };
    let (first, inserted) = repo.upsert_by_name(&seed).await.unwrap();
    assert!(inserted);

    seed.price = Price::from_cents(800);
    let (second, inserted) = repo.upsert_by_name(&seed).await.unwrap();
    assert!(!inserted);
    assert_eq!(second.id, first.id);
    assert_eq!(second.price, Price::from_cents(800));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL - set STOREFRONT_DATABASE_URL"]
async fn test_quantity_overflow_is_invalid_input() {
    let pool = pool().await;
    let stores = Stores::postgres(&pool);
    let carts = CartService::new(&stores);

    let user = create_user(&stores).await;
    let widget = create_product(&stores, 1000).await;

    carts
        .add_item(user, widget.id, i64::from(i32::MAX))
        .await
        .unwrap();
    let err = carts.add_item(user, widget.id, 1).await.unwrap_err();
    assert!(matches!(err, ShopError::InvalidInput(_)), "{err:?}");
}
