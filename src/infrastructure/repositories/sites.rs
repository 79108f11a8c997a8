use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, query_as};

use crate::domain::RepositoryError;
use crate::domain::favicons::{
    FAVICON_CONTENT_TYPE, FAVICON_DATA, FAVICON_FETCHED_AT, FAVICON_LAST_ATTEMPT_AT,
    FAVICON_ORIGIN, FaviconUpdate,
};
use crate::domain::ids::SiteId;
use crate::domain::repositories::SiteRepository;
use crate::domain::sites::{NewSite, Site, SiteFaviconState};
use crate::infrastructure::database::DatabasePool;

const SITE_COLUMNS: &str = "id, name, origin, favicon_origin, favicon_last_attempt_at, \
     favicon_data, favicon_content_type, favicon_fetched_at, created_at";

#[derive(Clone)]
pub struct SqlSiteRepository {
    pool: DatabasePool,
}

impl SqlSiteRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    fn into_domain(record: SiteRecord) -> Site {
        Site {
            id: SiteId::new(record.id),
            name: record.name,
            origin: record.origin,
            favicon: SiteFaviconState {
                data: record.favicon_data,
                content_type: record.favicon_content_type,
                fetched_at: record.favicon_fetched_at,
            },
            favicon_origin: record.favicon_origin,
            favicon_last_attempt_at: record.favicon_last_attempt_at,
            created_at: record.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SiteRecord {
    id: i64,
    name: String,
    origin: Option<String>,
    favicon_origin: Option<String>,
    favicon_last_attempt_at: Option<DateTime<Utc>>,
    favicon_data: Vec<u8>,
    favicon_content_type: String,
    favicon_fetched_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

#[async_trait]
impl SiteRepository for SqlSiteRepository {
    async fn insert(&self, site: NewSite) -> Result<Site, RepositoryError> {
        let site = site.normalize();
        let record = query_as::<_, SiteRecord>(&format!(
            "INSERT INTO sites (name, origin, created_at) VALUES (?, ?, ?) RETURNING {SITE_COLUMNS}"
        ))
        .bind(&site.name)
        .bind(&site.origin)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepositoryError::unexpected(e.to_string()))?;

        Ok(Self::into_domain(record))
    }

    async fn get(&self, id: SiteId) -> Result<Site, RepositoryError> {
        let record =
            query_as::<_, SiteRecord>(&format!("SELECT {SITE_COLUMNS} FROM sites WHERE id = ?"))
                .bind(id.into_inner())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| RepositoryError::unexpected(e.to_string()))?
                .ok_or(RepositoryError::NotFound)?;

        Ok(Self::into_domain(record))
    }

    async fn list_with_origin(&self) -> Result<Vec<Site>, RepositoryError> {
        let records = query_as::<_, SiteRecord>(&format!(
            "SELECT {SITE_COLUMNS} FROM sites WHERE origin IS NOT NULL AND trim(origin) != '' ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::unexpected(e.to_string()))?;

        Ok(records.into_iter().map(Self::into_domain).collect())
    }

    async fn apply_favicon_update(
        &self,
        id: SiteId,
        update: &FaviconUpdate,
    ) -> Result<(), RepositoryError> {
        if update.is_empty() {
            return Ok(());
        }

        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE sites SET ");
        let mut set = qb.separated(", ");
        if let Some(origin) = &update.origin {
            set.push(format!("{FAVICON_ORIGIN} = "));
            set.push_bind_unseparated(origin.clone());
        }
        if let Some(attempted_at) = update.last_attempt_at {
            set.push(format!("{FAVICON_LAST_ATTEMPT_AT} = "));
            set.push_bind_unseparated(attempted_at);
        }
        if let Some(data) = &update.data {
            set.push(format!("{FAVICON_DATA} = "));
            set.push_bind_unseparated(data.clone());
        }
        if let Some(content_type) = &update.content_type {
            set.push(format!("{FAVICON_CONTENT_TYPE} = "));
            set.push_bind_unseparated(content_type.clone());
        }
        if let Some(fetched_at) = update.fetched_at {
            set.push(format!("{FAVICON_FETCHED_AT} = "));
            set.push_bind_unseparated(fetched_at);
        }
        qb.push(" WHERE id = ");
        qb.push_bind(id.into_inner());

        let result = qb
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::unexpected(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
