//! Core domain types for the coffee shop drinks API.
//!
//! This crate provides the drink entity, its recipe model, the two
//! serialization projections (short and long views), and the shared
//! `Result` alias used across the workspace.

pub mod drink;
pub mod error;
pub mod id;

pub use drink::{
    Drink, DrinkChanges, DrinkLong, DrinkShort, Ingredient, InvalidDrink, NewDrink, Recipe,
    RecipeError, ShortIngredient, TITLE_MAX_LEN,
};
pub use error::Result;
pub use id::{DrinkId, ParseIdError};
