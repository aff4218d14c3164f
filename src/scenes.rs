//! Scene, gallery, and library-maintenance operations.

use serde::Deserialize;
use serde_json::{Value, json};

use crate::client::{StashClient, decode_at};
use crate::error::StashError;
use crate::types::{FindFilter, Gallery, IdRef, PhashDistance, Scene};

/// Marker fields needed to copy a marker between scenes.
#[derive(Debug, Deserialize)]
struct MarkerMeta {
    title: String,
    seconds: f64,
    primary_tag: IdRef,
    #[serde(default)]
    tags: Vec<IdRef>,
}

/// Relationship fields transferred when merging scenes.
#[derive(Debug, Deserialize)]
struct SceneMeta {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    studio: Option<IdRef>,
    #[serde(default)]
    galleries: Vec<IdRef>,
    #[serde(default)]
    performers: Vec<IdRef>,
    #[serde(default)]
    tags: Vec<IdRef>,
    #[serde(default)]
    movies: Vec<SceneMovie>,
}

#[derive(Debug, Deserialize)]
struct SceneMovie {
    movie: IdRef,
}

impl StashClient {
    /// Trigger a metadata scan over the given library paths. Phash
    /// generation is enabled; preview and sprite generation are not.
    pub async fn metadata_scan(&self, paths: &[String]) -> Result<Value, StashError> {
        let query = r#"
            mutation MetadataScan($input: ScanMetadataInput!) {
                metadataScan(input: $input)
            }
        "#;
        let variables = json!({
            "input": {
                "paths": paths,
                "useFileMetadata": false,
                "stripFileExtension": false,
                "scanGeneratePreviews": false,
                "scanGenerateImagePreviews": false,
                "scanGenerateSprites": false,
                "scanGeneratePhashes": true,
            }
        });
        self.call(query, Some(variables)).await
    }

    /// Fetch a single scene with full details.
    pub async fn find_scene(&self, scene_id: &str) -> Result<Option<Scene>, StashError> {
        let query = r#"
            query FindScene($scene_id: ID) {
                findScene(id: $scene_id) { ...stashScene }
            }
        "#;
        let data = self
            .call(query, Some(json!({ "scene_id": scene_id })))
            .await?;
        decode_at(&data, "/findScene")
    }

    /// List scenes matching a server-side filter.
    pub async fn find_scenes(&self, scene_filter: Option<Value>) -> Result<Vec<Scene>, StashError> {
        let query = r#"
            query FindScenes($filter: FindFilterType, $scene_filter: SceneFilterType) {
                findScenes(filter: $filter, scene_filter: $scene_filter) {
                    count
                    scenes { ...stashScene }
                }
            }
        "#;
        let variables = json!({
            "filter": FindFilter::unpaged(),
            "scene_filter": scene_filter.unwrap_or_else(|| json!({})),
        });
        let data = self.call(query, Some(variables)).await?;
        decode_at(&data, "/findScenes/scenes")
    }

    /// Update a scene from a SceneUpdateInput payload; returns the scene id.
    pub async fn update_scene(&self, input: Value) -> Result<String, StashError> {
        let query = r#"
            mutation SceneUpdate($input: SceneUpdateInput!) {
                sceneUpdate(input: $input) { id }
            }
        "#;
        let data = self.call(query, Some(json!({ "input": input }))).await?;
        decode_at(&data, "/sceneUpdate/id")
    }

    /// Bulk-update scenes from a BulkSceneUpdateInput payload; returns the
    /// updated scene ids.
    pub async fn update_scenes(&self, input: Value) -> Result<Vec<String>, StashError> {
        let query = r#"
            mutation BulkSceneUpdate($input: BulkSceneUpdateInput!) {
                bulkSceneUpdate(input: $input) { id }
            }
        "#;
        let data = self.call(query, Some(json!({ "input": input }))).await?;
        let refs: Vec<IdRef> = decode_at(&data, "/bulkSceneUpdate")?;
        Ok(refs.into_iter().map(|r| r.id).collect())
    }

    /// Delete a scene, optionally including its file. Generated artifacts
    /// are always removed.
    pub async fn destroy_scene(
        &self,
        scene_id: &str,
        delete_file: bool,
    ) -> Result<bool, StashError> {
        let query = r#"
            mutation SceneDestroy($input: SceneDestroyInput!) {
                sceneDestroy(input: $input)
            }
        "#;
        let variables = json!({
            "input": {
                "delete_file": delete_file,
                "delete_generated": true,
                "id": scene_id,
            }
        });
        let data = self.call(query, Some(variables)).await?;
        decode_at(&data, "/sceneDestroy")
    }

    /// Delete multiple scenes, optionally including their files.
    pub async fn destroy_scenes(
        &self,
        scene_ids: &[String],
        delete_file: bool,
    ) -> Result<bool, StashError> {
        let query = r#"
            mutation ScenesDestroy($input: ScenesDestroyInput!) {
                scenesDestroy(input: $input)
            }
        "#;
        let variables = json!({
            "input": {
                "delete_file": delete_file,
                "delete_generated": true,
                "ids": scene_ids,
            }
        });
        let data = self.call(query, Some(variables)).await?;
        decode_at(&data, "/scenesDestroy")
    }

    /// Groups of scenes whose perceptual hashes are within `distance` of
    /// each other.
    pub async fn find_duplicate_scenes(
        &self,
        distance: PhashDistance,
    ) -> Result<Vec<Vec<Scene>>, StashError> {
        let query = r#"
            query FindDuplicateScenes($distance: Int) {
                findDuplicateScenes(distance: $distance) {
                    ...SlimSceneData
                    __typename
                }
            }
            fragment SlimSceneData on Scene {
                id
                title
                path
                oshash
                phash
                file {
                    size
                    duration
                    video_codec
                    width
                    height
                    framerate
                    bitrate
                    __typename
                }
                __typename
            }
        "#;
        let data = self
            .call(query, Some(json!({ "distance": distance.value() })))
            .await?;
        decode_at(&data, "/findDuplicateScenes")
    }

    /// List galleries matching a free-text query and optional filter.
    pub async fn find_galleries(
        &self,
        q: &str,
        gallery_filter: Option<Value>,
    ) -> Result<Vec<Gallery>, StashError> {
        let query = r#"
            query FindGalleries($filter: FindFilterType, $gallery_filter: GalleryFilterType) {
                findGalleries(gallery_filter: $gallery_filter, filter: $filter) {
                    count
                    galleries { ...stashGallery }
                }
            }
        "#;
        let variables = json!({
            "filter": FindFilter::by_path(q),
            "gallery_filter": gallery_filter.unwrap_or_else(|| json!({})),
        });
        let data = self.call(query, Some(variables)).await?;
        decode_at(&data, "/findGalleries/galleries")
    }

    /// Update a gallery from a GalleryUpdateInput payload; returns the
    /// gallery id.
    pub async fn update_gallery(&self, input: Value) -> Result<String, StashError> {
        let query = r#"
            mutation GalleryUpdate($input: GalleryUpdateInput!) {
                galleryUpdate(input: $input) { id }
            }
        "#;
        let data = self.call(query, Some(json!({ "input": input }))).await?;
        decode_at(&data, "/galleryUpdate/id")
    }

    /// Copy markers from source scenes onto the target, skipping timestamps
    /// the target already has. Returns the created marker ids.
    pub async fn merge_scene_markers(
        &self,
        target_scene_id: &str,
        source_scene_ids: &[String],
    ) -> Result<Vec<String>, StashError> {
        let existing = self.scene_markers(target_scene_id).await?;

        let mut created = Vec::new();
        for source_id in source_scene_ids {
            for marker in self.scene_markers(source_id).await? {
                if existing.iter().any(|m| m.seconds == marker.seconds) {
                    // TODO merge missing data between markers at equal timestamps
                    continue;
                }
                let tag_ids: Vec<String> = marker.tags.into_iter().map(|t| t.id).collect();
                let id = self
                    .create_scene_marker(json!({
                        "title": marker.title,
                        "seconds": marker.seconds,
                        "scene_id": target_scene_id,
                        "primary_tag_id": marker.primary_tag.id,
                        "tag_ids": tag_ids,
                    }))
                    .await?;
                created.push(id);
            }
        }
        Ok(created)
    }

    /// Merge markers and relationships from source scenes into the target.
    ///
    /// Gallery, performer, tag, and movie links are added; the earliest
    /// date wins, and a source's studio and URL replace the target's when
    /// present. Returns the updated scene ids.
    pub async fn merge_scenes(
        &self,
        target_scene_id: &str,
        source_scene_ids: &[String],
    ) -> Result<Vec<String>, StashError> {
        let merged = self
            .merge_scene_markers(target_scene_id, source_scene_ids)
            .await?;
        log::info!(
            "merged {} markers from {:?} to {}",
            merged.len(),
            source_scene_ids,
            target_scene_id
        );

        let target = self.scene_meta(target_scene_id).await?;

        let mut updated = Vec::new();
        for source_id in source_scene_ids {
            let source = self.scene_meta(source_id).await?;
            let mut update = json!({
                "ids": [target_scene_id],
                "gallery_ids": {
                    "ids": source.galleries.iter().map(|g| g.id.clone()).collect::<Vec<_>>(),
                    "mode": "ADD",
                },
                "performer_ids": {
                    "ids": source.performers.iter().map(|p| p.id.clone()).collect::<Vec<_>>(),
                    "mode": "ADD",
                },
                "tag_ids": {
                    "ids": source.tags.iter().map(|t| t.id.clone()).collect::<Vec<_>>(),
                    "mode": "ADD",
                },
                "movie_ids": {
                    "ids": source.movies.iter().map(|m| m.movie.id.clone()).collect::<Vec<_>>(),
                    "mode": "ADD",
                },
            });
            if let Some(studio) = &source.studio {
                update["studio_id"] = json!(studio.id);
            }
            if let Some(date) = source.date.as_deref().filter(|d| !d.is_empty()) {
                let target_date = target.date.as_deref().unwrap_or("9999-99-99");
                if target_date > date {
                    update["date"] = json!(date);
                }
            }
            if let Some(url) = source.url.as_deref().filter(|u| !u.is_empty()) {
                update["url"] = json!(url);
            }
            updated = self.update_scenes(update).await?;
        }
        Ok(updated)
    }

    async fn scene_markers(&self, scene_id: &str) -> Result<Vec<MarkerMeta>, StashError> {
        let query = r#"
            query GetSceneMarkers($scene_id: ID) {
                findScene(id: $scene_id) {
                    scene_markers {
                        title
                        seconds
                        primary_tag { id }
                        tags { id }
                    }
                }
            }
        "#;
        let data = self
            .call(query, Some(json!({ "scene_id": scene_id })))
            .await?;
        decode_at(&data, "/findScene/scene_markers")
    }

    async fn create_scene_marker(&self, input: Value) -> Result<String, StashError> {
        let query = r#"
            mutation SceneMarkerCreate($marker_input: SceneMarkerCreateInput!) {
                sceneMarkerCreate(input: $marker_input) { id }
            }
        "#;
        let data = self
            .call(query, Some(json!({ "marker_input": input })))
            .await?;
        decode_at(&data, "/sceneMarkerCreate/id")
    }

    async fn scene_meta(&self, scene_id: &str) -> Result<SceneMeta, StashError> {
        let query = r#"
            query FindScene($scene_id: ID) {
                findScene(id: $scene_id) {
                    title
                    details
                    url
                    date
                    rating
                    studio { id }
                    galleries { id }
                    performers { id }
                    tags { id }
                    movies { movie { id } scene_index }
                }
            }
        "#;
        let data = self
            .call(query, Some(json!({ "scene_id": scene_id })))
            .await?;
        decode_at(&data, "/findScene")
    }
}
