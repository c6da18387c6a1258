//! Storage for drinks.
//!
//! `DrinkStore` is the seam between the HTTP layer and persistence:
//! - `PgDrinkStore` keeps drinks in PostgreSQL
//! - `MemoryDrinkStore` keeps them in process memory, for tests and for
//!   running without a database

pub mod memory;
pub mod postgres;

pub use memory::MemoryDrinkStore;
pub use postgres::PgDrinkStore;

use async_trait::async_trait;
use coffee_shop_core::{Drink, DrinkChanges, DrinkId, NewDrink, Result};
use std::fmt;

/// Errors from storage operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The database rejected or failed the operation.
    Database { details: String },
    /// Another drink already has this title.
    DuplicateTitle { title: String },
    /// A stored recipe could not be decoded.
    CorruptRecipe { id: DrinkId, details: String },
    /// A recipe could not be encoded for storage.
    Encode { details: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Database { details } => write!(f, "drink database error: {details}"),
            Self::DuplicateTitle { title } => {
                write!(f, "a drink titled '{title}' already exists")
            }
            Self::CorruptRecipe { id, details } => {
                write!(f, "recipe of drink {id} is unusable: {details}")
            }
            Self::Encode { details } => write!(f, "failed to encode recipe: {details}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Persistence for drinks.
///
/// Title uniqueness is enforced by every implementation. Operations on a
/// missing drink return `None` and change nothing.
#[async_trait]
pub trait DrinkStore: Send + Sync {
    /// Lists every drink, ordered by id.
    async fn list_all(&self) -> Result<Vec<Drink>, StoreError>;

    /// Stores a new drink and returns it with its assigned id.
    async fn create(&self, drink: NewDrink) -> Result<Drink, StoreError>;

    /// Applies `changes` to the drink with `id`.
    async fn update(&self, id: DrinkId, changes: DrinkChanges)
    -> Result<Option<Drink>, StoreError>;

    /// Removes the drink with `id`, returning the id if it existed.
    async fn delete(&self, id: DrinkId) -> Result<Option<DrinkId>, StoreError>;

    /// Removes every drink and stores [`NewDrink::seed`] as the only one.
    async fn reset_with_seed(&self) -> Result<Drink, StoreError>;
}
