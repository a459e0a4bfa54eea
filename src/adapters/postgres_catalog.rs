//! Postgres implementation of the catalog ports.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::domain::{Booth, BoothUpdate, Menu, MenuFilter, MenuUpdate, NewBooth, NewMenu};
use crate::ports::{CatalogGateway, CatalogRepository, RepositoryError, RepositoryResult};

const MENU_SELECT: &str = r#"
    SELECT m.id, m.booth_id, m.name, m.price, m.is_available, m.category, m.description,
           m.image_path, b.name AS booth_name, b.contact AS booth_contact,
           b.is_active AS booth_is_active, b.created_at AS booth_created_at,
           b.updated_at AS booth_updated_at
    FROM menus m
    JOIN booths b ON b.id = m.booth_id
"#;

const BOOTH_COLUMNS: &str = "id, name, contact, is_active, created_at, updated_at";

#[derive(Clone)]
pub struct PostgresCatalog {
    pool: PgPool,
}

impl PostgresCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogGateway for PostgresCatalog {
    async fn find_menu_by_id(&self, id: i64) -> RepositoryResult<Menu> {
        let row = sqlx::query_as::<_, MenuRow>(&format!("{} WHERE m.id = $1", MENU_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::from)?;

        row.map(|r| r.into_domain())
            .ok_or_else(|| RepositoryError::NotFound(format!("menu {}", id)))
    }
}

#[async_trait]
impl CatalogRepository for PostgresCatalog {
    async fn list_menus(&self, filter: &MenuFilter) -> RepositoryResult<Vec<Menu>> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(MENU_SELECT);
        query.push(" WHERE TRUE");

        if !filter.include_unavailable {
            query.push(" AND m.is_available AND b.is_active");
        }
        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", search);
            query
                .push(" AND (m.name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR m.description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(category) = filter.category.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            query.push(" AND m.category = ").push_bind(category.to_lowercase());
        }
        if let Some(booth_id) = filter.booth_id {
            query.push(" AND m.booth_id = ").push_bind(booth_id);
        }
        query.push(" ORDER BY b.name, m.name");

        let rows = query
            .build_query_as::<MenuRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(RepositoryError::from)?;

        Ok(rows.into_iter().map(MenuRow::into_domain).collect())
    }

    async fn list_booths(&self, active_only: bool) -> RepositoryResult<Vec<Booth>> {
        let rows = sqlx::query_as::<_, BoothRow>(&format!(
            "SELECT {} FROM booths WHERE ($1 = FALSE OR is_active) ORDER BY name",
            BOOTH_COLUMNS
        ))
        .bind(active_only)
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok(rows.into_iter().map(BoothRow::into_domain).collect())
    }

    async fn find_booth_by_id(&self, id: i64) -> RepositoryResult<Booth> {
        let row = sqlx::query_as::<_, BoothRow>(&format!(
            "SELECT {} FROM booths WHERE id = $1",
            BOOTH_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        row.map(BoothRow::into_domain)
            .ok_or_else(|| RepositoryError::NotFound(format!("booth {}", id)))
    }

    async fn find_booth_by_name(&self, name: &str) -> RepositoryResult<Option<Booth>> {
        let row = sqlx::query_as::<_, BoothRow>(&format!(
            "SELECT {} FROM booths WHERE LOWER(name) = LOWER($1)",
            BOOTH_COLUMNS
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok(row.map(BoothRow::into_domain))
    }

    async fn create_booth(&self, booth: &NewBooth) -> RepositoryResult<Booth> {
        let row = sqlx::query_as::<_, BoothRow>(&format!(
            "INSERT INTO booths (name, contact, is_active) VALUES ($1, $2, $3) RETURNING {}",
            BOOTH_COLUMNS
        ))
        .bind(&booth.name)
        .bind(&booth.contact)
        .bind(booth.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok(row.into_domain())
    }

    async fn update_booth(&self, id: i64, update: &BoothUpdate) -> RepositoryResult<Booth> {
        let row = sqlx::query_as::<_, BoothRow>(&format!(
            r#"
            UPDATE booths SET
                name = COALESCE($2, name),
                contact = COALESCE($3, contact),
                is_active = COALESCE($4, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            BOOTH_COLUMNS
        ))
        .bind(id)
        .bind(&update.name)
        .bind(&update.contact)
        .bind(update.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        row.map(BoothRow::into_domain)
            .ok_or_else(|| RepositoryError::NotFound(format!("booth {}", id)))
    }

    async fn delete_booth(&self, id: i64) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM booths WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::from)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("booth {}", id)));
        }
        Ok(())
    }

    async fn create_menu(&self, menu: &NewMenu) -> RepositoryResult<Menu> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO menus (booth_id, name, price, is_available, category, description, image_path)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(menu.booth_id)
        .bind(&menu.name)
        .bind(menu.price)
        .bind(menu.is_available)
        .bind(&menu.category)
        .bind(&menu.description)
        .bind(&menu.image_path)
        .fetch_one(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        self.find_menu_by_id(id).await
    }

    async fn update_menu(&self, id: i64, update: &MenuUpdate) -> RepositoryResult<Menu> {
        let result = sqlx::query(
            r#"
            UPDATE menus SET
                booth_id = COALESCE($2, booth_id),
                name = COALESCE($3, name),
                price = COALESCE($4, price),
                is_available = COALESCE($5, is_available),
                category = COALESCE($6, category),
                description = COALESCE($7, description),
                image_path = COALESCE($8, image_path),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(update.booth_id)
        .bind(&update.name)
        .bind(update.price)
        .bind(update.is_available)
        .bind(&update.category)
        .bind(&update.description)
        .bind(&update.image_path)
        .execute(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("menu {}", id)));
        }
        self.find_menu_by_id(id).await
    }

    async fn delete_menu(&self, id: i64) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM menus WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::from)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("menu {}", id)));
        }
        Ok(())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct BoothRow {
    id: i64,
    name: String,
    contact: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl BoothRow {
    fn into_domain(self) -> Booth {
        Booth {
            id: self.id,
            name: self.name,
            contact: self.contact,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MenuRow {
    id: i64,
    booth_id: i64,
    name: String,
    price: i64,
    is_available: bool,
    category: String,
    description: String,
    image_path: Option<String>,
    booth_name: String,
    booth_contact: String,
    booth_is_active: bool,
    booth_created_at: DateTime<Utc>,
    booth_updated_at: DateTime<Utc>,
}

impl MenuRow {
    fn into_domain(self) -> Menu {
        Menu {
            id: self.id,
            booth_id: self.booth_id,
            name: self.name,
            price: self.price,
            is_available: self.is_available,
            category: self.category,
            description: self.description,
            image_path: self.image_path,
            booth: Booth {
                id: self.booth_id,
                name: self.booth_name,
                contact: self.booth_contact,
                is_active: self.booth_is_active,
                created_at: self.booth_created_at,
                updated_at: self.booth_updated_at,
            },
        }
    }
}
