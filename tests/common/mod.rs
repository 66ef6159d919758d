#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use novel_ssr::app::head::SiteMeta;
use novel_ssr::catalog::{Chapter, Novel, NovelSource, NovelSummary, StaticCatalog};
use novel_ssr::error::CatalogError;
use novel_ssr::i18n::LocaleTable;
use novel_ssr::render::RenderEnv;

pub const SHELL: &str = include_str!("../../web/index.html");
pub const CATALOG: &str = include_str!("../../data/catalog.json");

pub fn site() -> SiteMeta {
    SiteMeta {
        title: "Novel Hall".to_string(),
        base_url: "https://novels.example".to_string(),
        keywords: "novels".to_string(),
        description: "Read novels online".to_string(),
        image: "/favicon.png".to_string(),
    }
}

pub fn catalog() -> StaticCatalog {
    StaticCatalog::from_json(CATALOG).unwrap()
}

pub fn env_with(source: impl NovelSource + 'static) -> RenderEnv {
    RenderEnv::new(Arc::new(LocaleTable::builtin().unwrap()), Arc::new(source), site())
}

pub fn env() -> RenderEnv {
    env_with(catalog())
}

/// Yields to the scheduler before every lookup so concurrent renders
/// interleave.
pub struct Yielding(pub StaticCatalog);

#[async_trait]
impl NovelSource for Yielding {
    async fn list(&self) -> Result<Vec<NovelSummary>, CatalogError> {
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }
        self.0.list().await
    }

    async fn novel(&self, id: &str) -> Result<Option<Novel>, CatalogError> {
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }
        self.0.novel(id).await
    }

    async fn chapter(&self, novel_id: &str, chapter_id: &str) -> Result<Option<Chapter>, CatalogError> {
        tokio::task::yield_now().await;
        self.0.chapter(novel_id, chapter_id).await
    }
}

/// Takes `.0` to answer anything.
pub struct Sleepy(pub Duration);

#[async_trait]
impl NovelSource for Sleepy {
    async fn list(&self) -> Result<Vec<NovelSummary>, CatalogError> {
        tokio::time::sleep(self.0).await;
        Ok(Vec::new())
    }

    async fn novel(&self, _: &str) -> Result<Option<Novel>, CatalogError> {
        tokio::time::sleep(self.0).await;
        Ok(None)
    }

    async fn chapter(&self, _: &str, _: &str) -> Result<Option<Chapter>, CatalogError> {
        tokio::time::sleep(self.0).await;
        Ok(None)
    }
}

/// Every lookup fails.
pub struct Offline;

#[async_trait]
impl NovelSource for Offline {
    async fn list(&self) -> Result<Vec<NovelSummary>, CatalogError> {
        Err(CatalogError::Backend("database offline".to_string()))
    }

    async fn novel(&self, _: &str) -> Result<Option<Novel>, CatalogError> {
        Err(CatalogError::Backend("database offline".to_string()))
    }

    async fn chapter(&self, _: &str, _: &str) -> Result<Option<Chapter>, CatalogError> {
        Err(CatalogError::Backend("database offline".to_string()))
    }
}
