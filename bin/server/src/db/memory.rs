//! In-memory drink store.

use super::{DrinkStore, StoreError};
use async_trait::async_trait;
use coffee_shop_core::{Drink, DrinkChanges, DrinkId, NewDrink, Result};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

struct State {
    drinks: BTreeMap<DrinkId, Drink>,
    next_id: DrinkId,
}

impl State {
    fn title_taken(&self, title: &str, except: Option<DrinkId>) -> bool {
        self.drinks
            .values()
            .any(|d| d.title == title && Some(d.id) != except)
    }
}

/// Keeps drinks in process memory. Ids are never reused until a reset.
pub struct MemoryDrinkStore {
    state: RwLock<State>,
}

impl MemoryDrinkStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State {
                drinks: BTreeMap::new(),
                next_id: DrinkId::new(1),
            }),
        }
    }
}

impl Default for MemoryDrinkStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DrinkStore for MemoryDrinkStore {
    async fn list_all(&self) -> Result<Vec<Drink>, StoreError> {
        Ok(self.state.read().await.drinks.values().cloned().collect())
    }

    async fn create(&self, drink: NewDrink) -> Result<Drink, StoreError> {
        let mut state = self.state.write().await;
        if state.title_taken(drink.title(), None) {
            return Err(StoreError::DuplicateTitle {
                title: drink.title().to_string(),
            }
            .into());
        }

        let id = state.next_id;
        state.next_id = id.next();
        let drink = drink.into_drink(id);
        state.drinks.insert(id, drink.clone());
        Ok(drink)
    }

    async fn update(
        &self,
        id: DrinkId,
        changes: DrinkChanges,
    ) -> Result<Option<Drink>, StoreError> {
        let mut state = self.state.write().await;
        if !state.drinks.contains_key(&id) {
            return Ok(None);
        }
        if let Some(title) = changes.title() {
            if state.title_taken(title, Some(id)) {
                return Err(StoreError::DuplicateTitle {
                    title: title.to_string(),
                }
                .into());
            }
        }

        Ok(state.drinks.get_mut(&id).map(|drink| {
            drink.apply(changes);
            drink.clone()
        }))
    }

    async fn delete(&self, id: DrinkId) -> Result<Option<DrinkId>, StoreError> {
        Ok(self
            .state
            .write()
            .await
            .drinks
            .remove(&id)
            .map(|drink| drink.id))
    }

    async fn reset_with_seed(&self) -> Result<Drink, StoreError> {
        let mut state = self.state.write().await;
        let id = DrinkId::new(1);
        let drink = NewDrink::seed().into_drink(id);
        state.drinks.clear();
        state.drinks.insert(id, drink.clone());
        state.next_id = id.next();
        Ok(drink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coffee_shop_core::{Ingredient, Recipe};

    fn new_drink(title: &str) -> NewDrink {
        NewDrink::new(
            title,
            Recipe::new(vec![Ingredient::new("espresso", "brown", 1)]),
        )
        .expect("valid drink")
    }

    #[tokio::test]
    async fn create_assigns_increasing_ids() {
        let store = MemoryDrinkStore::new();

        let a = store.create(new_drink("Espresso")).await.expect("create");
        let b = store.create(new_drink("Ristretto")).await.expect("create");

        assert_eq!(a.id, DrinkId::new(1));
        assert_eq!(b.id, DrinkId::new(2));
        assert_eq!(store.list_all().await.expect("list"), vec![a, b]);
    }

    #[tokio::test]
    async fn duplicate_title_is_rejected() {
        let store = MemoryDrinkStore::new();
        store.create(new_drink("Espresso")).await.expect("create");

        let result = store.create(new_drink("Espresso")).await;

        assert!(result.is_err());
        assert_eq!(store.list_all().await.expect("list").len(), 1);
    }

    #[tokio::test]
    async fn update_changes_only_given_fields() {
        let store = MemoryDrinkStore::new();
        let drink = store.create(new_drink("Espresso")).await.expect("create");

        let changes = DrinkChanges::new(Some("Doppio".to_string()), None).expect("valid");
        let updated = store
            .update(drink.id, changes)
            .await
            .expect("update")
            .expect("exists");

        assert_eq!(updated.title, "Doppio");
        assert_eq!(updated.recipe, drink.recipe);
    }

    #[tokio::test]
    async fn update_to_taken_title_is_rejected() {
        let store = MemoryDrinkStore::new();
        store.create(new_drink("Espresso")).await.expect("create");
        let other = store.create(new_drink("Latte")).await.expect("create");

        let changes = DrinkChanges::new(Some("Espresso".to_string()), None).expect("valid");

        assert!(store.update(other.id, changes).await.is_err());
        let titles: Vec<String> = store
            .list_all()
            .await
            .expect("list")
            .into_iter()
            .map(|d| d.title)
            .collect();
        assert_eq!(titles, vec!["Espresso", "Latte"]);
    }

    #[tokio::test]
    async fn update_keeping_own_title_is_allowed() {
        let store = MemoryDrinkStore::new();
        let drink = store.create(new_drink("Espresso")).await.expect("create");

        let changes = DrinkChanges::new(Some("Espresso".to_string()), None).expect("valid");

        assert!(store.update(drink.id, changes).await.expect("update").is_some());
    }

    #[tokio::test]
    async fn update_missing_returns_none() {
        let store = MemoryDrinkStore::new();
        let changes = DrinkChanges::new(Some("Doppio".to_string()), None).expect("valid");

        let result = store.update(DrinkId::new(9), changes).await.expect("update");

        assert!(result.is_none());
        assert!(store.list_all().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn update_missing_with_taken_title_returns_none() {
        let store = MemoryDrinkStore::new();
        let latte = store.create(new_drink("Latte")).await.expect("create");
        let changes = DrinkChanges::new(Some("Latte".to_string()), None).expect("valid");

        let result = store.update(DrinkId::new(42), changes).await.expect("update");

        assert!(result.is_none());
        assert_eq!(store.list_all().await.expect("list"), vec![latte]);
    }

    #[tokio::test]
    async fn delete_removes_and_returns_id() {
        let store = MemoryDrinkStore::new();
        let drink = store.create(new_drink("Espresso")).await.expect("create");

        assert_eq!(store.delete(drink.id).await.expect("delete"), Some(drink.id));
        assert_eq!(store.delete(drink.id).await.expect("delete"), None);
        assert!(store.list_all().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let store = MemoryDrinkStore::new();
        let first = store.create(new_drink("Espresso")).await.expect("create");
        store.delete(first.id).await.expect("delete");

        let second = store.create(new_drink("Latte")).await.expect("create");

        assert_eq!(second.id, DrinkId::new(2));
    }

    #[tokio::test]
    async fn reset_leaves_only_seed() {
        let store = MemoryDrinkStore::new();
        store.create(new_drink("Espresso")).await.expect("create");
        store.create(new_drink("Latte")).await.expect("create");

        let seed = store.reset_with_seed().await.expect("reset");

        assert_eq!(seed.title, "water");
        assert_eq!(store.list_all().await.expect("list"), vec![seed]);
        let next = store.create(new_drink("Mocha")).await.expect("create");
        assert_eq!(next.id, DrinkId::new(2));
    }
}
