//! The drink entity and its recipe model.
//!
//! A drink's recipe is persisted as JSON text and decoded on every read.
//! Two projections exist for responses: the short view hides ingredient
//! names, the long view carries everything.

use crate::id::DrinkId;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Maximum length of a drink title, in characters.
pub const TITLE_MAX_LEN: usize = 80;

/// A single ingredient of a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Ingredient name, e.g. "milk".
    pub name: String,
    /// Display color used when drawing the drink.
    pub color: String,
    /// Relative quantity of this ingredient.
    pub parts: u32,
}

impl Ingredient {
    /// Creates a new ingredient.
    #[must_use]
    pub fn new(name: impl Into<String>, color: impl Into<String>, parts: u32) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
            parts,
        }
    }
}

/// An ingredient with its name stripped, as shown in the short view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortIngredient {
    pub color: String,
    pub parts: u32,
}

impl From<&Ingredient> for ShortIngredient {
    fn from(ingredient: &Ingredient) -> Self {
        Self {
            color: ingredient.color.clone(),
            parts: ingredient.parts,
        }
    }
}

/// Ordered list of ingredients making up a drink.
///
/// Deserialization accepts either a list of ingredients or a single
/// ingredient object; the latter becomes a one-element recipe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Recipe(Vec<Ingredient>);

#[derive(Deserialize)]
#[serde(untagged)]
enum RecipeRepr {
    Many(Vec<Ingredient>),
    One(Ingredient),
}

impl<'de> Deserialize<'de> for Recipe {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match RecipeRepr::deserialize(deserializer)? {
            RecipeRepr::Many(ingredients) => Self(ingredients),
            RecipeRepr::One(ingredient) => Self(vec![ingredient]),
        })
    }
}

impl Recipe {
    /// Creates a recipe from a list of ingredients.
    #[must_use]
    pub fn new(ingredients: Vec<Ingredient>) -> Self {
        Self(ingredients)
    }

    /// Returns the recipe with ingredient names removed.
    #[must_use]
    pub fn short(&self) -> Vec<ShortIngredient> {
        self.0.iter().map(ShortIngredient::from).collect()
    }

    /// Encodes the recipe as the JSON text stored alongside a drink.
    pub fn to_stored(&self) -> Result<String, RecipeError> {
        serde_json::to_string(&self.0).map_err(|e| RecipeError::Encode {
            reason: e.to_string(),
        })
    }

    /// Decodes a recipe from its stored JSON text.
    pub fn from_stored(text: &str) -> Result<Self, RecipeError> {
        serde_json::from_str(text).map_err(|e| RecipeError::Decode {
            reason: e.to_string(),
        })
    }
}

impl From<Vec<Ingredient>> for Recipe {
    fn from(ingredients: Vec<Ingredient>) -> Self {
        Self(ingredients)
    }
}

/// Errors converting a recipe to or from its stored text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipeError {
    /// Stored text is not a valid recipe.
    Decode { reason: String },
    /// Recipe could not be serialized.
    Encode { reason: String },
}

impl fmt::Display for RecipeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode { reason } => write!(f, "stored recipe is not valid: {reason}"),
            Self::Encode { reason } => write!(f, "failed to encode recipe: {reason}"),
        }
    }
}

impl std::error::Error for RecipeError {}

/// Errors from validating drink input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidDrink {
    /// Title is empty or only whitespace.
    EmptyTitle,
    /// Title exceeds [`TITLE_MAX_LEN`] characters.
    TitleTooLong { length: usize },
    /// An update carried no fields.
    NoChanges,
}

impl fmt::Display for InvalidDrink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title must not be empty"),
            Self::TitleTooLong { length } => {
                write!(
                    f,
                    "title is {length} characters, at most {TITLE_MAX_LEN} allowed"
                )
            }
            Self::NoChanges => write!(f, "update must change title or recipe"),
        }
    }
}

impl std::error::Error for InvalidDrink {}

fn validate_title(title: &str) -> Result<(), InvalidDrink> {
    if title.trim().is_empty() {
        return Err(InvalidDrink::EmptyTitle);
    }
    let length = title.chars().count();
    if length > TITLE_MAX_LEN {
        return Err(InvalidDrink::TitleTooLong { length });
    }
    Ok(())
}

/// A persisted drink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drink {
    pub id: DrinkId,
    pub title: String,
    pub recipe: Recipe,
}

impl Drink {
    /// Creates a drink record.
    #[must_use]
    pub fn new(id: DrinkId, title: impl Into<String>, recipe: Recipe) -> Self {
        Self {
            id,
            title: title.into(),
            recipe,
        }
    }

    /// Returns the public projection, without ingredient names.
    #[must_use]
    pub fn short(&self) -> DrinkShort {
        DrinkShort {
            id: self.id,
            title: self.title.clone(),
            recipe: self.recipe.short(),
        }
    }

    /// Returns the full projection.
    #[must_use]
    pub fn long(&self) -> DrinkLong {
        DrinkLong {
            id: self.id,
            title: self.title.clone(),
            recipe: self.recipe.clone(),
        }
    }

    /// Applies the given changes in place.
    pub fn apply(&mut self, changes: DrinkChanges) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(recipe) = changes.recipe {
            self.recipe = recipe;
        }
    }
}

/// Short view of a drink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrinkShort {
    pub id: DrinkId,
    pub title: String,
    pub recipe: Vec<ShortIngredient>,
}

/// Long view of a drink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrinkLong {
    pub id: DrinkId,
    pub title: String,
    pub recipe: Recipe,
}

/// Input for creating a drink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDrink {
    title: String,
    recipe: Recipe,
}

impl NewDrink {
    /// Validates and creates drink input.
    pub fn new(title: impl Into<String>, recipe: Recipe) -> Result<Self, InvalidDrink> {
        let title = title.into();
        validate_title(&title)?;
        Ok(Self { title, recipe })
    }

    /// The drink a freshly reset store starts with: plain water.
    #[must_use]
    pub fn seed() -> Self {
        Self {
            title: "water".to_string(),
            recipe: Recipe::new(vec![Ingredient::new("water", "blue", 1)]),
        }
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn recipe(&self) -> &Recipe {
        &self.recipe
    }

    /// Builds the stored drink once an ID has been assigned.
    #[must_use]
    pub fn into_drink(self, id: DrinkId) -> Drink {
        Drink::new(id, self.title, self.recipe)
    }
}

/// Partial update of a drink. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrinkChanges {
    title: Option<String>,
    recipe: Option<Recipe>,
}

impl DrinkChanges {
    /// Validates and creates an update. At least one field must be set.
    pub fn new(title: Option<String>, recipe: Option<Recipe>) -> Result<Self, InvalidDrink> {
        if title.is_none() && recipe.is_none() {
            return Err(InvalidDrink::NoChanges);
        }
        if let Some(title) = &title {
            validate_title(title)?;
        }
        Ok(Self { title, recipe })
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    #[must_use]
    pub fn recipe(&self) -> Option<&Recipe> {
        self.recipe.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn water() -> Recipe {
        Recipe::new(vec![Ingredient::new("Water", "blue", 1)])
    }

    #[test]
    fn short_view_omits_names() {
        let drink = Drink::new(
            DrinkId::new(1),
            "Flat White",
            Recipe::new(vec![
                Ingredient::new("espresso", "brown", 1),
                Ingredient::new("milk", "white", 2),
            ]),
        );

        let json = serde_json::to_value(drink.short()).expect("serialize");

        assert_eq!(
            json,
            serde_json::json!({
                "id": 1,
                "title": "Flat White",
                "recipe": [
                    {"color": "brown", "parts": 1},
                    {"color": "white", "parts": 2}
                ]
            })
        );
    }

    #[test]
    fn long_view_keeps_names() {
        let drink = Drink::new(DrinkId::new(3), "Water", water());

        let json = serde_json::to_value(drink.long()).expect("serialize");

        assert_eq!(json["recipe"][0]["name"], "Water");
        assert_eq!(json["id"], 3);
    }

    #[test]
    fn stored_recipe_decodes_to_same_structure() {
        let stored = water().to_stored().expect("encode");
        assert_eq!(stored, r#"[{"name":"Water","color":"blue","parts":1}]"#);
        assert_eq!(Recipe::from_stored(&stored).expect("decode"), water());
    }

    #[test]
    fn corrupt_stored_recipe_is_rejected() {
        let err = Recipe::from_stored("not json").unwrap_err();
        assert!(matches!(err, RecipeError::Decode { .. }));
    }

    #[test]
    fn single_ingredient_object_becomes_list() {
        let recipe: Recipe =
            serde_json::from_str(r#"{"name":"Water","color":"blue","parts":1}"#).expect("parse");
        assert_eq!(recipe, water());
    }

    #[test]
    fn ingredient_missing_field_is_rejected() {
        let result: Result<Recipe, _> = serde_json::from_str(r#"[{"name":"Water","parts":1}]"#);
        assert!(result.is_err());
    }

    #[test]
    fn new_drink_rejects_blank_title() {
        assert_eq!(
            NewDrink::new("   ", water()).unwrap_err(),
            InvalidDrink::EmptyTitle
        );
    }

    #[test]
    fn new_drink_rejects_long_title() {
        let title = "x".repeat(TITLE_MAX_LEN + 1);
        assert!(matches!(
            NewDrink::new(title, water()).unwrap_err(),
            InvalidDrink::TitleTooLong { length } if length == TITLE_MAX_LEN + 1
        ));
    }

    #[test]
    fn changes_require_a_field() {
        assert_eq!(
            DrinkChanges::new(None, None).unwrap_err(),
            InvalidDrink::NoChanges
        );
    }

    #[test]
    fn apply_only_touches_provided_fields() {
        let mut drink = Drink::new(DrinkId::new(1), "Water", water());
        let changes = DrinkChanges::new(Some("Still Water".to_string()), None).expect("valid");

        drink.apply(changes);

        assert_eq!(drink.title, "Still Water");
        assert_eq!(drink.recipe, water());
    }
}
