//! Shared fixtures for unit tests.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use cartwright_core::{Email, Price};

use crate::db::{CatalogStore, MemoryStore, Stores, UserStore};
use crate::models::{NewProduct, NewUser, PostalAddress, Product, User};

/// An in-memory store seeded with one user and three products.
pub struct Fixture {
    pub memory: Arc<MemoryStore>,
    pub stores: Stores,
    pub user: User,
    /// 10.00, category `tools`.
    pub widget: Product,
    /// 5.00, category `tools`.
    pub gadget: Product,
    /// 7.50, category `kitchen`.
    pub mug: Product,
}

impl Fixture {
    pub async fn new() -> Self {
        let memory = Arc::new(MemoryStore::new());
        let stores = Stores::memory(&memory);

        let user = memory
            .create_user(
                &NewUser {
                    email: Email::parse("ada@example.com").unwrap(),
                    first_name: Some("Ada".to_owned()),
                    last_name: Some("Lovelace".to_owned()),
                    phone: None,
                    address: PostalAddress {
                        address: Some("1 Main St".to_owned()),
                        city: Some("Springfield".to_owned()),
                        state: Some("IL".to_owned()),
                        zip_code: Some("62701".to_owned()),
                    },
                },
                "not-a-real-hash",
            )
            .await
            .unwrap();

        let widget = insert(&memory, "Widget", "tools", 1000).await;
        let gadget = insert(&memory, "Gadget", "tools", 500).await;
        let mug = insert(&memory, "Mug", "kitchen", 750).await;

        Self {
            memory,
            stores,
            user,
            widget,
            gadget,
            mug,
        }
    }

    /// Add another user with no address.
    pub async fn add_user(&self, email: &str) -> User {
        self.memory
            .create_user(
                &NewUser {
                    email: Email::parse(email).unwrap(),
                    first_name: None,
                    last_name: None,
                    phone: None,
                    address: PostalAddress::default(),
                },
                "not-a-real-hash",
            )
            .await
            .unwrap()
    }
}

async fn insert(memory: &MemoryStore, name: &str, category: &str, cents: i64) -> Product {
    memory
        .insert_product(&NewProduct {
            name: name.to_owned(),
            description: Some(format!("A {name}")),
            category: category.to_owned(),
            price: Price::from_cents(cents),
            stock_quantity: 10,
        })
        .await
        .unwrap()
}
