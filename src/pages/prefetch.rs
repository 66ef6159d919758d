use async_trait::async_trait;
use serde_json::Value;

use crate::app::router::{GuardContext, NavigationGuard, RouteMatch};
use crate::error::{CatalogError, GuardError};

/// State store keys written by [`PrefetchGuard`].
pub mod keys {
    pub const NOVELS: &str = "novels";
    pub const NOVEL: &str = "novel";
    pub const CHAPTER: &str = "chapter";
}

/// Loads the data a route's page needs into the state store.
///
/// Missing records are stored as `null` so the page can render its own
/// not-found state; source errors fail the navigation.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrefetchGuard;

fn load_error(what: String) -> impl FnOnce(CatalogError) -> GuardError {
    move |e| GuardError::Load {
        what,
        message: e.to_string(),
    }
}

fn to_value<T: serde::Serialize>(value: Option<T>) -> Value {
    value
        .and_then(|v| serde_json::to_value(v).ok())
        .unwrap_or(Value::Null)
}

#[async_trait]
impl NavigationGuard for PrefetchGuard {
    async fn before_each(&self, to: &RouteMatch, cx: GuardContext<'_>) -> Result<(), GuardError> {
        let catalog = cx.catalog;

        match to.name {
            "root" | "home" => {
                let novels = catalog
                    .list()
                    .await
                    .map_err(load_error("novel list".to_string()))?;
                cx.store.set(keys::NOVELS, to_value(Some(novels)));
            }
            "novel" | "chapter" => {
                let novel_id = to.param("novel").unwrap_or_default();
                let novel = catalog
                    .novel(novel_id)
                    .await
                    .map_err(load_error(format!("novel {novel_id}")))?;
                cx.store.set(keys::NOVEL, to_value(novel));

                if let Some(chapter_id) = to.param("chapter") {
                    let chapter = catalog
                        .chapter(novel_id, chapter_id)
                        .await
                        .map_err(load_error(format!("chapter {novel_id}/{chapter_id}")))?;
                    cx.store.set(keys::CHAPTER, to_value(chapter));
                }
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::store::StateStore;
    use crate::catalog::{Chapter, Novel, NovelSource, NovelSummary, SAMPLE, StaticCatalog};
    use crate::i18n::LocaleTable;

    struct Failing;

    #[async_trait]
    impl NovelSource for Failing {
        async fn list(&self) -> Result<Vec<NovelSummary>, CatalogError> {
            Err(CatalogError::Backend("offline".to_string()))
        }

        async fn novel(&self, _: &str) -> Result<Option<Novel>, CatalogError> {
            Err(CatalogError::Backend("offline".to_string()))
        }

        async fn chapter(&self, _: &str, _: &str) -> Result<Option<Chapter>, CatalogError> {
            Err(CatalogError::Backend("offline".to_string()))
        }
    }

    async fn run(url: &str, catalog: &dyn NovelSource) -> (StateStore, Result<(), GuardError>) {
        let table = crate::pages::routes();
        let to = table.resolve(url).unwrap();
        let store = StateStore::new();
        let locales = LocaleTable::builtin().unwrap();
        let cx = GuardContext {
            store: &store,
            catalog,
            locales: &locales,
        };
        let res = PrefetchGuard.before_each(&to, cx).await;
        (store, res)
    }

    #[tokio::test]
    async fn test_home_loads_list() {
        let catalog = StaticCatalog::from_json(SAMPLE).unwrap();
        let (store, res) = run("/en/", &catalog).await;
        res.unwrap();
        let novels: Vec<NovelSummary> = store.get_as(keys::NOVELS).unwrap();
        assert_eq!(novels.len(), 2);
    }

    #[tokio::test]
    async fn test_chapter_loads_novel_and_chapter() {
        let catalog = StaticCatalog::from_json(SAMPLE).unwrap();
        let (store, res) = run("/en/novel/moonfang/2", &catalog).await;
        res.unwrap();
        let chapter: Chapter = store.get_as(keys::CHAPTER).unwrap();
        assert_eq!(chapter.title, "Crossing");
        assert!(store.get_as::<Novel>(keys::NOVEL).is_some());
    }

    #[tokio::test]
    async fn test_missing_novel_is_null() {
        let catalog = StaticCatalog::from_json(SAMPLE).unwrap();
        let (store, res) = run("/en/novel/nope", &catalog).await;
        res.unwrap();
        assert_eq!(store.get(keys::NOVEL), Some(Value::Null));
    }

    #[tokio::test]
    async fn test_source_error_fails_navigation() {
        let (_, res) = run("/ja/novel/moonfang", &Failing).await;
        let err = res.unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to load novel moonfang: catalog backend error: offline"
        );
    }

    #[tokio::test]
    async fn test_not_found_route_loads_nothing() {
        let (store, res) = run("/en/a/b", &Failing).await;
        res.unwrap();
        assert!(store.keys().is_empty());
    }
}
