use spendify_domain::{normalize_category_name, Category, Session};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    backend::Backend,
    keystore::{load_json, save_json, SecureStore, CATEGORIES_KEY},
    CoreError,
};

pub struct CategoryService;

impl CategoryService {
    pub fn add(backend: &dyn Backend, user: &Session, name: &str) -> Result<Category, CoreError> {
        let name = normalize_category_name(name)
            .ok_or_else(|| CoreError::Validation("Category name cannot be empty".into()))?;
        let existing = backend.list_categories(user.user_id)?;
        if existing.iter().any(|category| category.matches_name(&name)) {
            return Err(CoreError::Validation(format!(
                "Category `{name}` already exists"
            )));
        }
        let category = backend.insert_category(user.user_id, &name)?;
        info!(category_id = %category.id, name = %category.name, "category added");
        Ok(category)
    }

    /// The user's categories sorted by name, ignoring case.
    pub fn list(backend: &dyn Backend, user: &Session) -> Result<Vec<Category>, CoreError> {
        let mut categories = backend.list_categories(user.user_id)?;
        categories.sort_by_key(|category| category.name.to_lowercase());
        debug!(count = categories.len(), "categories listed");
        Ok(categories)
    }

    /// Deletes the category's expenses first, then the category itself.
    /// Returns the number of expenses removed.
    pub fn delete(backend: &dyn Backend, category_id: Uuid) -> Result<usize, CoreError> {
        let removed = backend.delete_expenses_by_category(category_id)?;
        backend.delete_category(category_id)?;
        info!(%category_id, expenses = removed, "category deleted");
        Ok(removed)
    }

    /// Reloads the category list and caches it on the device for offline use.
    pub fn refresh_cache(
        backend: &dyn Backend,
        store: &dyn SecureStore,
        user: &Session,
    ) -> Result<Vec<Category>, CoreError> {
        let categories = Self::list(backend, user)?;
        save_json(store, CATEGORIES_KEY, &categories)?;
        Ok(categories)
    }

    pub fn cached(store: &dyn SecureStore) -> Result<Option<Vec<Category>>, CoreError> {
        load_json(store, CATEGORIES_KEY)
    }

    /// Finds a category by user-typed name (trimmed, case-insensitive).
    pub fn resolve<'a>(categories: &'a [Category], name: &str) -> Option<&'a Category> {
        categories.iter().find(|category| category.matches_name(name))
    }

    /// Like [`CategoryService::resolve`] but fails with `CategoryNotFound`.
    pub fn require<'a>(categories: &'a [Category], name: &str) -> Result<&'a Category, CoreError> {
        Self::resolve(categories, name)
            .ok_or_else(|| CoreError::CategoryNotFound(name.trim().to_string()))
    }
}
