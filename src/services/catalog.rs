use std::sync::Arc;

use crate::domain::{Booth, BoothUpdate, Menu, MenuFilter, MenuUpdate, NewBooth, NewMenu};
use crate::ports::{CatalogRepository, RepositoryError};
use crate::services::errors::CatalogError;
use crate::validation::{
    clean_booth_name, clean_category, clean_contact, clean_menu_name, sanitize_string,
    validate_positive,
};

/// Booth and menu management for the storefront and the back office.
pub struct CatalogService {
    repo: Arc<dyn CatalogRepository>,
}

impl CatalogService {
    pub fn new(repo: Arc<dyn CatalogRepository>) -> Self {
        Self { repo }
    }

    pub async fn list_menus(&self, filter: &MenuFilter) -> Result<Vec<Menu>, CatalogError> {
        Ok(self.repo.list_menus(filter).await?)
    }

    pub async fn list_booths(&self, active_only: bool) -> Result<Vec<Booth>, CatalogError> {
        Ok(self.repo.list_booths(active_only).await?)
    }

    pub async fn get_menu(&self, id: i64) -> Result<Menu, CatalogError> {
        self.repo
            .find_menu_by_id(id)
            .await
            .map_err(|e| not_found_as(e, CatalogError::MenuNotFound(id)))
    }

    pub async fn create_booth(&self, input: NewBooth) -> Result<Booth, CatalogError> {
        let booth = NewBooth {
            name: clean_booth_name(&input.name)?,
            contact: clean_contact(&input.contact)?,
            is_active: input.is_active,
        };
        self.ensure_booth_name_free(&booth.name, None).await?;

        let created = self.repo.create_booth(&booth).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => CatalogError::BoothNameTaken(booth.name.clone()),
            other => CatalogError::Storage(other),
        })?;

        tracing::info!(booth_id = created.id, name = %created.name, "Booth created");
        Ok(created)
    }

    pub async fn update_booth(&self, id: i64, input: BoothUpdate) -> Result<Booth, CatalogError> {
        let update = BoothUpdate {
            name: input.name.as_deref().map(clean_booth_name).transpose()?,
            contact: input.contact.as_deref().map(clean_contact).transpose()?,
            is_active: input.is_active,
        };
        if let Some(name) = &update.name {
            self.ensure_booth_name_free(name, Some(id)).await?;
        }

        let booth = self.repo.update_booth(id, &update).await.map_err(|e| match e {
            RepositoryError::NotFound(_) => CatalogError::BoothNotFound(id),
            RepositoryError::Conflict(_) => {
                CatalogError::BoothNameTaken(update.name.clone().unwrap_or_default())
            }
            other => CatalogError::Storage(other),
        })?;

        tracing::info!(booth_id = id, is_active = booth.is_active, "Booth updated");
        Ok(booth)
    }

    pub async fn delete_booth(&self, id: i64) -> Result<(), CatalogError> {
        self.repo.delete_booth(id).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => CatalogError::InUse(format!("booth {}", id)),
            other => not_found_as(other, CatalogError::BoothNotFound(id)),
        })?;
        tracing::info!(booth_id = id, "Booth deleted");
        Ok(())
    }

    pub async fn create_menu(&self, input: NewMenu) -> Result<Menu, CatalogError> {
        validate_positive("price", input.price)?;
        self.ensure_booth_exists(input.booth_id).await?;

        let menu = NewMenu {
            booth_id: input.booth_id,
            name: clean_menu_name(&input.name)?,
            price: input.price,
            is_available: input.is_available,
            category: clean_category(&input.category)?,
            description: sanitize_string(&input.description),
            image_path: input.image_path,
        };

        let created = self.repo.create_menu(&menu).await?;
        tracing::info!(menu_id = created.id, booth_id = created.booth_id, "Menu created");
        Ok(created)
    }

    pub async fn update_menu(&self, id: i64, input: MenuUpdate) -> Result<Menu, CatalogError> {
        if let Some(price) = input.price {
            validate_positive("price", price)?;
        }
        if let Some(booth_id) = input.booth_id {
            self.ensure_booth_exists(booth_id).await?;
        }

        let update = MenuUpdate {
            booth_id: input.booth_id,
            name: input.name.as_deref().map(clean_menu_name).transpose()?,
            price: input.price,
            is_available: input.is_available,
            category: input.category.as_deref().map(clean_category).transpose()?,
            description: input.description.as_deref().map(sanitize_string),
            image_path: input.image_path,
        };

        let menu = self
            .repo
            .update_menu(id, &update)
            .await
            .map_err(|e| not_found_as(e, CatalogError::MenuNotFound(id)))?;
        tracing::info!(menu_id = id, is_available = menu.is_available, "Menu updated");
        Ok(menu)
    }

    pub async fn delete_menu(&self, id: i64) -> Result<(), CatalogError> {
        self.repo.delete_menu(id).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => CatalogError::InUse(format!("menu {}", id)),
            other => not_found_as(other, CatalogError::MenuNotFound(id)),
        })?;
        tracing::info!(menu_id = id, "Menu deleted");
        Ok(())
    }

    async fn ensure_booth_exists(&self, id: i64) -> Result<(), CatalogError> {
        self.repo
            .find_booth_by_id(id)
            .await
            .map(|_| ())
            .map_err(|e| not_found_as(e, CatalogError::BoothNotFound(id)))
    }

    async fn ensure_booth_name_free(&self, name: &str, except: Option<i64>) -> Result<(), CatalogError> {
        match self.repo.find_booth_by_name(name).await? {
            Some(existing) if Some(existing.id) != except => {
                Err(CatalogError::BoothNameTaken(name.to_string()))
            }
            _ => Ok(()),
        }
    }
}

fn not_found_as(err: RepositoryError, not_found: CatalogError) -> CatalogError {
    match err {
        RepositoryError::NotFound(_) => not_found,
        other => CatalogError::Storage(other),
    }
}
