//! Wire types for the Stash GraphQL API.
//!
//! Server fields that may be absent or null are modeled with
//! `#[serde(default)]` so a partially-populated response still
//! deserializes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::matcher::{self, NamedEntity};

/// JSON body of a GraphQL POST request.
#[derive(Debug, Serialize)]
pub struct GraphQlRequest<'a> {
    pub query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<Value>,
}

/// Top-level GraphQL response envelope.
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

/// A single server-reported GraphQL error.
#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
    #[serde(default)]
    pub path: Option<Value>,
}

/// List filter accepted by the find* queries.
#[derive(Debug, Clone, Serialize)]
pub struct FindFilter {
    pub q: String,
    pub per_page: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
}

impl FindFilter {
    /// Unpaged filter for a free-text query, sorted by name ascending.
    pub fn by_name(q: &str) -> Self {
        Self {
            q: q.to_string(),
            per_page: -1,
            sort: Some("name".to_string()),
            direction: Some("ASC".to_string()),
        }
    }

    /// Unpaged filter for a free-text query, sorted by path ascending.
    pub fn by_path(q: &str) -> Self {
        Self {
            q: q.to_string(),
            per_page: -1,
            sort: Some("path".to_string()),
            direction: Some("ASC".to_string()),
        }
    }

    /// Unpaged filter with no query and no explicit sort.
    pub fn unpaged() -> Self {
        Self {
            q: String::new(),
            per_page: -1,
            sort: None,
            direction: None,
        }
    }
}

/// Allowed perceptual-hash distance when searching for duplicate scenes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhashDistance {
    Exact,
    High,
    Medium,
    Low,
}

impl PhashDistance {
    pub fn value(self) -> i64 {
        match self {
            PhashDistance::Exact => 0,
            PhashDistance::High => 4,
            PhashDistance::Medium => 8,
            PhashDistance::Low => 10,
        }
    }
}

/// Reference to an entity by id only.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IdRef {
    pub id: String,
}

/// A cross-instance identifier from a stash-box endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StashId {
    pub endpoint: String,
    pub stash_id: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Tag {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub image_path: Option<String>,
    #[serde(default)]
    pub scene_count: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Performer {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub checksum: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub twitter: Option<String>,
    #[serde(default)]
    pub instagram: Option<String>,
    #[serde(default)]
    pub birthdate: Option<String>,
    #[serde(default)]
    pub ethnicity: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub eye_color: Option<String>,
    #[serde(default)]
    pub height: Option<String>,
    #[serde(default)]
    pub measurements: Option<String>,
    #[serde(default)]
    pub fake_tits: Option<String>,
    #[serde(default)]
    pub career_length: Option<String>,
    #[serde(default)]
    pub tattoos: Option<String>,
    #[serde(default)]
    pub piercings: Option<String>,
    /// Raw alias string as stored server-side; split with
    /// [`alias_list`](Self::alias_list) before matching.
    #[serde(default)]
    pub aliases: Option<String>,
    #[serde(default)]
    pub favorite: Option<bool>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub image_path: Option<String>,
    #[serde(default)]
    pub scene_count: Option<i64>,
    #[serde(default)]
    pub image_count: Option<i64>,
    #[serde(default)]
    pub gallery_count: Option<i64>,
    #[serde(default)]
    pub stash_ids: Vec<StashId>,
    #[serde(default)]
    pub rating: Option<i64>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub death_date: Option<String>,
    #[serde(default)]
    pub hair_color: Option<String>,
    #[serde(default)]
    pub weight: Option<i64>,
}

impl Performer {
    /// Aliases split out of the raw server-side alias string.
    pub fn alias_list(&self) -> Vec<String> {
        self.aliases
            .as_deref()
            .map(matcher::split_alias_list)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Studio {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub rating: Option<i64>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub stash_ids: Vec<StashId>,
    #[serde(default)]
    pub parent_studio: Option<ParentStudio>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ParentStudio {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Movie {
    pub id: String,
    pub name: String,
    /// Single raw alias string, matched as-is.
    #[serde(default)]
    pub aliases: Option<String>,
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub rating: Option<i64>,
    #[serde(default)]
    pub studio: Option<IdRef>,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(default)]
    pub synopsis: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub scene_count: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SceneFile {
    #[serde(default)]
    pub size: Option<Value>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub video_codec: Option<String>,
    #[serde(default)]
    pub audio_codec: Option<String>,
    #[serde(default)]
    pub width: Option<i64>,
    #[serde(default)]
    pub height: Option<i64>,
    #[serde(default)]
    pub framerate: Option<f64>,
    #[serde(default)]
    pub bitrate: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SceneMarker {
    pub id: String,
    #[serde(default)]
    pub scene: Option<IdRef>,
    pub title: String,
    pub seconds: f64,
    pub primary_tag: Tag,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

/// Gallery summary as nested inside a scene.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SceneGallery {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub image_count: Option<i64>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Scene {
    pub id: String,
    #[serde(default)]
    pub checksum: Option<String>,
    #[serde(default)]
    pub oshash: Option<String>,
    #[serde(default)]
    pub phash: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub rating: Option<i64>,
    #[serde(default)]
    pub organized: Option<bool>,
    #[serde(default)]
    pub o_counter: Option<i64>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub file: Option<SceneFile>,
    #[serde(default)]
    pub galleries: Vec<SceneGallery>,
    #[serde(default)]
    pub performers: Vec<Performer>,
    #[serde(default)]
    pub scene_markers: Vec<SceneMarker>,
    #[serde(default)]
    pub studio: Option<Studio>,
    #[serde(default)]
    pub stash_ids: Vec<StashId>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Gallery {
    pub id: String,
    #[serde(default)]
    pub checksum: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub rating: Option<i64>,
    #[serde(default)]
    pub organized: Option<bool>,
    #[serde(default)]
    pub image_count: Option<i64>,
    #[serde(default)]
    pub studio: Option<ParentStudio>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub performers: Vec<Performer>,
    #[serde(default)]
    pub scenes: Vec<SceneSummary>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SceneSummary {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ScrapedTag {
    #[serde(default)]
    pub stored_id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ScrapedStudio {
    #[serde(default)]
    pub stored_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub remote_site_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ScrapedPerformer {
    #[serde(default)]
    pub stored_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub twitter: Option<String>,
    #[serde(default)]
    pub instagram: Option<String>,
    #[serde(default)]
    pub birthdate: Option<String>,
    #[serde(default)]
    pub ethnicity: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub eye_color: Option<String>,
    #[serde(default)]
    pub height: Option<String>,
    #[serde(default)]
    pub measurements: Option<String>,
    #[serde(default)]
    pub fake_tits: Option<String>,
    #[serde(default)]
    pub career_length: Option<String>,
    #[serde(default)]
    pub tattoos: Option<String>,
    #[serde(default)]
    pub piercings: Option<String>,
    #[serde(default)]
    pub aliases: Option<String>,
    #[serde(default)]
    pub tags: Vec<ScrapedTag>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub death_date: Option<String>,
    #[serde(default)]
    pub hair_color: Option<String>,
    #[serde(default)]
    pub weight: Option<String>,
    #[serde(default)]
    pub remote_site_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ScrapedMovie {
    #[serde(default)]
    pub stored_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub aliases: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub rating: Option<String>,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(default)]
    pub synopsis: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub studio: Option<ScrapedStudio>,
    #[serde(default)]
    pub front_image: Option<String>,
    #[serde(default)]
    pub back_image: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ScrapedScene {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub studio: Option<ScrapedStudio>,
    #[serde(default)]
    pub tags: Vec<ScrapedTag>,
    #[serde(default)]
    pub performers: Vec<ScrapedPerformer>,
    #[serde(default)]
    pub movies: Vec<ScrapedMovie>,
    #[serde(default)]
    pub duration: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ScrapedGallery {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub studio: Option<ScrapedStudio>,
    #[serde(default)]
    pub tags: Vec<ScrapedTag>,
    #[serde(default)]
    pub performers: Vec<ScrapedPerformer>,
}

impl NamedEntity for Tag {
    fn id(&self) -> &str {
        &self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn aliases(&self) -> Vec<String> {
        self.aliases.clone()
    }
}

impl NamedEntity for Performer {
    fn id(&self) -> &str {
        &self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn aliases(&self) -> Vec<String> {
        self.alias_list()
    }
}

impl NamedEntity for Studio {
    fn id(&self) -> &str {
        &self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn aliases(&self) -> Vec<String> {
        self.aliases.clone()
    }
}

impl NamedEntity for Movie {
    fn id(&self) -> &str {
        &self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn aliases(&self) -> Vec<String> {
        self.aliases.clone().into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phash_distance_values() {
        assert_eq!(PhashDistance::Exact.value(), 0);
        assert_eq!(PhashDistance::High.value(), 4);
        assert_eq!(PhashDistance::Medium.value(), 8);
        assert_eq!(PhashDistance::Low.value(), 10);
    }

    #[test]
    fn test_find_filter_serializes_without_unset_sort() {
        let json = serde_json::to_value(FindFilter::unpaged()).unwrap();
        assert_eq!(json["per_page"], -1);
        assert!(json.get("sort").is_none());
    }

    #[test]
    fn test_performer_alias_list_splits_raw_string() {
        let performer = Performer {
            id: "5".to_string(),
            name: "Jane Doe".to_string(),
            aliases: Some("JD/Janie".to_string()),
            ..Default::default()
        };
        assert_eq!(performer.alias_list(), vec!["JD", "Janie"]);
    }

    #[test]
    fn test_movie_alias_is_single_entry() {
        let json = serde_json::json!({ "id": "3", "name": "Trilogy", "aliases": "The Trilogy" });
        let movie: Movie = serde_json::from_value(json).unwrap();
        assert_eq!(movie.aliases(), vec!["The Trilogy"]);
    }
}
