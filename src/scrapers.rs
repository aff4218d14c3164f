//! Scraper orchestration and stash-box queries.

use serde::Deserialize;
use serde_json::{Value, json};

use crate::client::{StashClient, decode_at};
use crate::error::StashError;
use crate::types::{
    Gallery, Scene, ScrapedGallery, ScrapedMovie, ScrapedPerformer, ScrapedScene,
};

/// Scrape operation kinds a scraper can support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapeKind {
    Fragment,
    Name,
    Url,
}

impl ScrapeKind {
    fn as_str(self) -> &'static str {
        match self {
            ScrapeKind::Fragment => "FRAGMENT",
            ScrapeKind::Name => "NAME",
            ScrapeKind::Url => "URL",
        }
    }
}

impl std::fmt::Display for ScrapeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct ScraperEntry {
    id: String,
    #[serde(default)]
    scene: Option<ScraperCapability>,
    #[serde(default)]
    performer: Option<ScraperCapability>,
    #[serde(default)]
    gallery: Option<ScraperCapability>,
    #[serde(default)]
    movie: Option<ScraperCapability>,
}

#[derive(Debug, Deserialize)]
struct ScraperCapability {
    #[serde(default)]
    supported_scrapes: Vec<String>,
}

fn supporting_ids(
    entries: Vec<ScraperEntry>,
    kind: ScrapeKind,
    capability: impl Fn(&ScraperEntry) -> Option<&ScraperCapability>,
) -> Vec<String> {
    entries
        .into_iter()
        .filter(|entry| {
            capability(entry)
                .map(|c| c.supported_scrapes.iter().any(|s| s == kind.as_str()))
                .unwrap_or(false)
        })
        .map(|entry| entry.id)
        .collect()
}

impl StashClient {
    /// Reload scraper definitions on the server.
    pub async fn reload_scrapers(&self) -> Result<bool, StashError> {
        let query = r#"
            mutation ReloadScrapers {
                reloadScrapers
            }
        "#;
        let data = self.call(query, None).await?;
        decode_at(&data, "/reloadScrapers")
    }

    /// Ids of scene scrapers supporting the given scrape kind.
    pub async fn list_scene_scrapers(&self, kind: ScrapeKind) -> Result<Vec<String>, StashError> {
        let query = r#"
            query ListSceneScrapers {
                listSceneScrapers {
                    id
                    name
                    scene { supported_scrapes }
                }
            }
        "#;
        let data = self.call(query, None).await?;
        let entries: Vec<ScraperEntry> = decode_at(&data, "/listSceneScrapers")?;
        Ok(supporting_ids(entries, kind, |e| e.scene.as_ref()))
    }

    /// Ids of performer scrapers supporting the given scrape kind.
    pub async fn list_performer_scrapers(
        &self,
        kind: ScrapeKind,
    ) -> Result<Vec<String>, StashError> {
        let query = r#"
            query ListPerformerScrapers {
                listPerformerScrapers {
                    id
                    name
                    performer { supported_scrapes }
                }
            }
        "#;
        let data = self.call(query, None).await?;
        let entries: Vec<ScraperEntry> = decode_at(&data, "/listPerformerScrapers")?;
        Ok(supporting_ids(entries, kind, |e| e.performer.as_ref()))
    }

    /// Ids of gallery scrapers supporting the given scrape kind.
    pub async fn list_gallery_scrapers(&self, kind: ScrapeKind) -> Result<Vec<String>, StashError> {
        let query = r#"
            query ListGalleryScrapers {
                listGalleryScrapers {
                    id
                    name
                    gallery { supported_scrapes }
                }
            }
        "#;
        let data = self.call(query, None).await?;
        let entries: Vec<ScraperEntry> = decode_at(&data, "/listGalleryScrapers")?;
        Ok(supporting_ids(entries, kind, |e| e.gallery.as_ref()))
    }

    /// Ids of movie scrapers supporting the given scrape kind.
    pub async fn list_movie_scrapers(&self, kind: ScrapeKind) -> Result<Vec<String>, StashError> {
        let query = r#"
            query ListMovieScrapers {
                listMovieScrapers {
                    id
                    name
                    movie { supported_scrapes }
                }
            }
        "#;
        let data = self.call(query, None).await?;
        let entries: Vec<ScraperEntry> = decode_at(&data, "/listMovieScrapers")?;
        Ok(supporting_ids(entries, kind, |e| e.movie.as_ref()))
    }

    /// Run a fragment scrape of a scene through a specific scraper.
    pub async fn scrape_scene(
        &self,
        scraper_id: &str,
        scene: &Scene,
    ) -> Result<Option<ScrapedScene>, StashError> {
        let query = r#"
            query ScrapeSingleScene($source: ScraperSourceInput!, $input: ScrapeSingleSceneInput!) {
                scrapeSingleScene(source: $source, input: $input) { ...scrapedScene }
            }
        "#;
        let variables = json!({
            "source": { "scraper_id": scraper_id },
            "input": {
                "query": null,
                "scene_id": scene.id,
                "scene_input": {
                    "title": scene.title,
                    "details": scene.details,
                    "url": scene.url,
                    "date": scene.date,
                    "remote_site_id": null,
                },
            },
        });
        let data = self.call(query, Some(variables)).await?;
        let mut scenes: Vec<ScrapedScene> = decode_at(&data, "/scrapeSingleScene")?;
        if scenes.is_empty() {
            Ok(None)
        } else {
            Ok(Some(scenes.remove(0)))
        }
    }

    /// Run a fragment scrape of a gallery through a specific scraper.
    pub async fn scrape_gallery(
        &self,
        scraper_id: &str,
        gallery: &Gallery,
    ) -> Result<Option<ScrapedGallery>, StashError> {
        let query = r#"
            query ScrapeGallery($scraper_id: ID!, $gallery: GalleryUpdateInput!) {
                scrapeGallery(scraper_id: $scraper_id, gallery: $gallery) { ...scrapedGallery }
            }
        "#;
        let variables = json!({
            "scraper_id": scraper_id,
            "gallery": {
                "id": gallery.id,
                "title": gallery.title,
                "url": gallery.url,
                "date": gallery.date,
                "details": gallery.details,
                "rating": gallery.rating,
                "scene_ids": [],
                "studio_id": null,
                "tag_ids": [],
                "performer_ids": [],
            },
        });
        let data = self.call(query, Some(variables)).await?;
        decode_at(&data, "/scrapeGallery")
    }

    /// Run a fragment scrape of a performer through a specific scraper.
    pub async fn scrape_performer(
        &self,
        scraper_id: &str,
        performer: &ScrapedPerformer,
    ) -> Result<Option<ScrapedPerformer>, StashError> {
        let query = r#"
            query ScrapePerformer($scraper_id: ID!, $performer: ScrapedPerformerInput!) {
                scrapePerformer(scraper_id: $scraper_id, performer: $performer) {
                    ...scrapedPerformer
                }
            }
        "#;
        let variables = json!({
            "scraper_id": scraper_id,
            "performer": {
                "name": performer.name,
                "url": performer.url,
            },
        });
        let data = self.call(query, Some(variables)).await?;
        decode_at(&data, "/scrapePerformer")
    }

    /// Scrape a scene from a URL, re-resolving scraped performers against
    /// the catalog where possible.
    pub async fn scrape_scene_url(&self, url: &str) -> Result<Option<ScrapedScene>, StashError> {
        let query = r#"
            query ScrapeSceneUrl($url: String!) {
                scrapeSceneURL(url: $url) { ...scrapedScene }
            }
        "#;
        let data = self.call(query, Some(json!({ "url": url }))).await?;
        let Some(mut scene) = decode_at::<Option<ScrapedScene>>(&data, "/scrapeSceneURL")? else {
            return Ok(None);
        };

        for performer in &mut scene.performers {
            let Some(name) = performer.name.clone() else {
                continue;
            };
            if let Some(known) = self.find_performer(&name, false).await? {
                performer.stored_id = Some(known.id.clone());
                performer.name = Some(known.name.clone());
            }
        }
        Ok(Some(scene))
    }

    /// Scrape a movie from a URL.
    pub async fn scrape_movie_url(&self, url: &str) -> Result<Option<ScrapedMovie>, StashError> {
        let query = r#"
            query ScrapeMovieUrl($url: String!) {
                scrapeMovieURL(url: $url) { ...scrapedMovie }
            }
        "#;
        let data = self.call(query, Some(json!({ "url": url }))).await?;
        decode_at(&data, "/scrapeMovieURL")
    }

    /// Scrape a gallery from a URL.
    pub async fn scrape_gallery_url(
        &self,
        url: &str,
    ) -> Result<Option<ScrapedGallery>, StashError> {
        let query = r#"
            query ScrapeGalleryUrl($url: String!) {
                scrapeGalleryURL(url: $url) { ...scrapedGallery }
            }
        "#;
        let data = self.call(query, Some(json!({ "url": url }))).await?;
        decode_at(&data, "/scrapeGalleryURL")
    }

    /// Scrape a performer from a URL.
    pub async fn scrape_performer_url(
        &self,
        url: &str,
    ) -> Result<Option<ScrapedPerformer>, StashError> {
        let query = r#"
            query ScrapePerformerUrl($url: String!) {
                scrapePerformerURL(url: $url) { ...scrapedPerformer }
            }
        "#;
        let data = self.call(query, Some(json!({ "url": url }))).await?;
        decode_at(&data, "/scrapePerformerURL")
    }

    /// Query a configured stash-box instance for scenes by id.
    pub async fn stashbox_scene_scraper(
        &self,
        scene_ids: &[String],
        stashbox_index: usize,
    ) -> Result<Vec<ScrapedScene>, StashError> {
        let query = r#"
            query QueryStashBoxScene($input: StashBoxSceneQueryInput!) {
                queryStashBoxScene(input: $input) { ...scrapedScene }
            }
        "#;
        let variables = json!({
            "input": {
                "scene_ids": scene_ids,
                "stash_box_index": stashbox_index,
            }
        });
        let data = self.call(query, Some(variables)).await?;
        decode_at(&data, "/queryStashBoxScene")
    }

    /// Submit scene fingerprints to a stash-box instance.
    pub async fn stashbox_submit_fingerprints(
        &self,
        scene_ids: &[String],
        stashbox_index: usize,
    ) -> Result<bool, StashError> {
        let query = r#"
            mutation SubmitStashBoxFingerprints($input: StashBoxFingerprintSubmissionInput!) {
                submitStashBoxFingerprints(input: $input)
            }
        "#;
        let variables = json!({
            "input": {
                "scene_ids": scene_ids,
                "stash_box_index": stashbox_index,
            }
        });
        let data = self.call(query, Some(variables)).await?;
        decode_at(&data, "/submitStashBoxFingerprints")
    }
}
