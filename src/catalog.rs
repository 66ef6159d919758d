//! Novel data source.
//!
//! Pages never talk to a backend directly; route guards load what a page
//! needs through a [`NovelSource`] and park it in the request's state store.
//! [`StaticCatalog`] serves a JSON file loaded at startup.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::CatalogError;

/// Entry in the novel list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NovelSummary {
    pub id: String,
    pub title: String,
    pub author: String,
    pub chapter_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
}

/// Table-of-contents entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterRef {
    pub id: String,
    pub title: String,
}

/// A novel with its table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Novel {
    pub id: String,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    pub chapters: Vec<ChapterRef>,
}

/// A chapter's text plus its neighbours in reading order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: String,
    pub novel_id: String,
    pub title: String,
    pub paragraphs: Vec<String>,
    pub prev: Option<String>,
    pub next: Option<String>,
}

/// Read access to novels.
#[async_trait]
pub trait NovelSource: Send + Sync {
    async fn list(&self) -> Result<Vec<NovelSummary>, CatalogError>;

    async fn novel(&self, id: &str) -> Result<Option<Novel>, CatalogError>;

    async fn chapter(&self, novel_id: &str, chapter_id: &str)
    -> Result<Option<Chapter>, CatalogError>;
}

#[derive(Debug, Clone, Deserialize)]
struct StoredChapter {
    id: String,
    title: String,
    #[serde(default)]
    paragraphs: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct StoredNovel {
    id: String,
    title: String,
    author: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    cover: Option<String>,
    #[serde(default)]
    chapters: Vec<StoredChapter>,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    novels: Vec<StoredNovel>,
}

/// In-memory catalog loaded from a JSON document.
#[derive(Debug, Default)]
pub struct StaticCatalog {
    novels: Vec<StoredNovel>,
}

impl StaticCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Ok(Self { novels: file.novels })
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path).await?;
        let catalog = Self::from_json(&json)?;
        info!(
            name: "catalog.loaded",
            path = %path.display(),
            novels = catalog.novels.len(),
            "Catalog loaded"
        );
        Ok(catalog)
    }

    fn find(&self, id: &str) -> Option<&StoredNovel> {
        self.novels.iter().find(|n| n.id == id)
    }
}

#[async_trait]
impl NovelSource for StaticCatalog {
    async fn list(&self) -> Result<Vec<NovelSummary>, CatalogError> {
        Ok(self
            .novels
            .iter()
            .map(|n| NovelSummary {
                id: n.id.clone(),
                title: n.title.clone(),
                author: n.author.clone(),
                chapter_count: n.chapters.len(),
                cover: n.cover.clone(),
            })
            .collect())
    }

    async fn novel(&self, id: &str) -> Result<Option<Novel>, CatalogError> {
        Ok(self.find(id).map(|n| Novel {
            id: n.id.clone(),
            title: n.title.clone(),
            author: n.author.clone(),
            summary: n.summary.clone(),
            cover: n.cover.clone(),
            chapters: n
                .chapters
                .iter()
                .map(|c| ChapterRef {
                    id: c.id.clone(),
                    title: c.title.clone(),
                })
                .collect(),
        }))
    }

    async fn chapter(
        &self,
        novel_id: &str,
        chapter_id: &str,
    ) -> Result<Option<Chapter>, CatalogError> {
        let Some(novel) = self.find(novel_id) else {
            return Ok(None);
        };
        let Some(pos) = novel.chapters.iter().position(|c| c.id == chapter_id) else {
            return Ok(None);
        };

        let chapter = &novel.chapters[pos];
        Ok(Some(Chapter {
            id: chapter.id.clone(),
            novel_id: novel.id.clone(),
            title: chapter.title.clone(),
            paragraphs: chapter.paragraphs.clone(),
            prev: pos
                .checked_sub(1)
                .map(|i| novel.chapters[i].id.clone()),
            next: novel.chapters.get(pos + 1).map(|c| c.id.clone()),
        }))
    }
}

#[cfg(test)]
pub(crate) const SAMPLE: &str = r#"{
  "novels": [
    {
      "id": "moonfang",
      "title": "Moonfang",
      "author": "Lan",
      "summary": "A wolf & a river.",
      "chapters": [
        {"id": "1", "title": "Arrival", "paragraphs": ["The river ran cold.", "He waited."]},
        {"id": "2", "title": "Crossing", "paragraphs": ["Night fell."]},
        {"id": "3", "title": "Home", "paragraphs": []}
      ]
    },
    {"id": "ember", "title": "Ember Tail", "author": "Kiro"}
  ]
}"#;
