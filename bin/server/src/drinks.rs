//! Handlers for the drinks resource.

use crate::app::AppState;
use crate::error::ApiError;
use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
};
use coffee_shop_access::ClaimSet;
use coffee_shop_core::{DrinkChanges, DrinkId, DrinkLong, DrinkShort, NewDrink, Recipe};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Permission required to list drinks with full recipes.
pub const GET_DRINKS_DETAIL: &str = "get:drinks-detail";
/// Permission required to create drinks.
pub const POST_DRINKS: &str = "post:drinks";
/// Permission required to modify drinks.
pub const PATCH_DRINKS: &str = "patch:drinks";
/// Permission required to delete drinks.
pub const DELETE_DRINKS: &str = "delete:drinks";

/// Success envelope for every drinks response.
#[derive(Debug, Serialize)]
pub struct DrinksBody<T> {
    success: bool,
    drinks: T,
}

impl<T> DrinksBody<T> {
    fn ok(drinks: T) -> Json<Self> {
        Json(Self {
            success: true,
            drinks,
        })
    }
}

/// Body of create and update requests. Create needs both fields; update
/// needs at least one.
#[derive(Debug, Deserialize)]
pub struct DrinkRequest {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    recipe: Option<Recipe>,
}

/// `GET /drinks`: every drink in the short view.
pub async fn list_drinks(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DrinksBody<Vec<DrinkShort>>>, ApiError> {
    let drinks = state.store.list_all().await?;
    Ok(DrinksBody::ok(drinks.iter().map(|d| d.short()).collect()))
}

/// `GET /drinks-detail`: every drink in the long view.
pub async fn list_drinks_detail(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DrinksBody<Vec<DrinkLong>>>, ApiError> {
    let drinks = state.store.list_all().await?;
    Ok(DrinksBody::ok(drinks.iter().map(|d| d.long()).collect()))
}

/// `POST /drinks`
pub async fn create_drink(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<ClaimSet>,
    body: Result<Json<DrinkRequest>, JsonRejection>,
) -> Result<Json<DrinksBody<Vec<DrinkLong>>>, ApiError> {
    let Json(request) = body?;
    let (Some(title), Some(recipe)) = (request.title, request.recipe) else {
        return Err(ApiError::unprocessable("title and recipe are required"));
    };
    let new_drink = NewDrink::new(title, recipe)?;

    let drink = state.store.create(new_drink).await?;
    info!(drink = %drink.id, subject = claims.subject(), "drink created");

    Ok(DrinksBody::ok(vec![drink.long()]))
}

/// `PATCH /drinks/{id}`
pub async fn update_drink(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<ClaimSet>,
    Path(id): Path<String>,
    body: Result<Json<DrinkRequest>, JsonRejection>,
) -> Result<Json<DrinksBody<Vec<DrinkLong>>>, ApiError> {
    let id: DrinkId = id.parse()?;
    let Json(request) = body?;
    let changes = DrinkChanges::new(request.title, request.recipe)?;

    let drink = state
        .store
        .update(id, changes)
        .await?
        .ok_or(ApiError::NotFound)?;
    info!(drink = %drink.id, subject = claims.subject(), "drink updated");

    Ok(DrinksBody::ok(vec![drink.long()]))
}

/// `DELETE /drinks/{id}`
pub async fn delete_drink(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<ClaimSet>,
    Path(id): Path<String>,
) -> Result<Json<DrinksBody<DrinkId>>, ApiError> {
    let id: DrinkId = id.parse()?;

    let deleted = state.store.delete(id).await?.ok_or(ApiError::NotFound)?;
    info!(drink = %deleted, subject = claims.subject(), "drink deleted");

    Ok(DrinksBody::ok(deleted))
}
