//! Find-or-create flows for tags, performers, studios, and movies.
//!
//! Each flow fetches name-search candidates from the server and resolves
//! them with the alias matcher; entities are only created when nothing
//! matched and the caller asked for it.

use serde_json::{Value, json};

use crate::client::{StashClient, decode_at};
use crate::error::StashError;
use crate::matcher::{self, AliasMode, MatchOutcome};
use crate::types::{FindFilter, Movie, Performer, Studio, Tag};

impl StashClient {
    // --- Tags ---

    /// List tags matching a free-text query and optional server-side filter.
    pub async fn find_tags(&self, q: &str, tag_filter: Option<Value>) -> Result<Vec<Tag>, StashError> {
        let query = r#"
            query FindTags($filter: FindFilterType, $tag_filter: TagFilterType) {
                findTags(filter: $filter, tag_filter: $tag_filter) {
                    count
                    tags { ...stashTag }
                }
            }
        "#;
        let variables = json!({
            "filter": FindFilter::by_name(q),
            "tag_filter": tag_filter.unwrap_or_else(|| json!({})),
        });
        let data = self.call(query, Some(variables)).await?;
        decode_at(&data, "/findTags/tags")
    }

    /// Find a tag whose name or alias equals `name` case-insensitively,
    /// optionally creating it when nothing matches.
    pub async fn find_tag(&self, name: &str, create: bool) -> Result<Option<Tag>, StashError> {
        let name = name.trim();
        if name.is_empty() {
            log::warn!("find_tag called with an empty name");
            return Ok(None);
        }

        let needle = name.to_lowercase();
        for tag in self.find_tags(name, None).await? {
            if tag.name.to_lowercase() == needle
                || tag.aliases.iter().any(|a| a.to_lowercase() == needle)
            {
                return Ok(Some(tag));
            }
        }

        if create {
            log::info!("creating missing tag \"{name}\"");
            return self.create_tag(json!({ "name": name })).await.map(Some);
        }
        Ok(None)
    }

    /// Create a tag from a TagCreateInput payload.
    pub async fn create_tag(&self, input: Value) -> Result<Tag, StashError> {
        let query = r#"
            mutation TagCreate($input: TagCreateInput!) {
                tagCreate(input: $input) { ...stashTag }
            }
        "#;
        let data = self.call(query, Some(json!({ "input": input }))).await?;
        decode_at(&data, "/tagCreate")
    }

    /// Delete a tag by id.
    pub async fn destroy_tag(&self, tag_id: &str) -> Result<(), StashError> {
        let query = r#"
            mutation TagDestroy($input: TagDestroyInput!) {
                tagDestroy(input: $input)
            }
        "#;
        self.call(query, Some(json!({ "input": { "id": tag_id } })))
            .await?;
        Ok(())
    }

    // --- Performers ---

    /// List performers matching a free-text query and optional filter.
    pub async fn find_performers(
        &self,
        q: &str,
        performer_filter: Option<Value>,
    ) -> Result<Vec<Performer>, StashError> {
        let query = r#"
            query FindPerformers($filter: FindFilterType, $performer_filter: PerformerFilterType) {
                findPerformers(filter: $filter, performer_filter: $performer_filter) {
                    count
                    performers { ...stashPerformer }
                }
            }
        "#;
        let variables = json!({
            "filter": FindFilter::by_name(q),
            "performer_filter": performer_filter.unwrap_or_else(|| json!({})),
        });
        let data = self.call(query, Some(variables)).await?;
        decode_at(&data, "/findPerformers/performers")
    }

    /// Find a performer by name or alias.
    ///
    /// Aliases are split out of the raw server-side string and compared on
    /// their post-colon suffix. More than one match on a single-word name
    /// stays unresolved.
    pub async fn find_performer(
        &self,
        name: &str,
        create: bool,
    ) -> Result<Option<Performer>, StashError> {
        let name = name.trim();
        if name.is_empty() {
            log::warn!("find_performer called with an empty name");
            return Ok(None);
        }

        let performers = self.find_performers(name, None).await?;
        let matches = matcher::match_name(name, &performers, AliasMode::ColonSuffix);
        match matcher::disambiguate(name, matches) {
            MatchOutcome::Unique(performer) => Ok(Some(performer.clone())),
            MatchOutcome::Ambiguous => {
                log::info!("multiple performers matched single-word name \"{name}\", using none");
                Ok(None)
            }
            MatchOutcome::NoMatch if create => {
                log::info!("creating missing performer \"{name}\"");
                self.create_performer(json!({ "name": name })).await.map(Some)
            }
            MatchOutcome::NoMatch => Ok(None),
        }
    }

    /// Create a performer from a PerformerCreateInput payload.
    pub async fn create_performer(&self, input: Value) -> Result<Performer, StashError> {
        let query = r#"
            mutation PerformerCreate($input: PerformerCreateInput!) {
                performerCreate(input: $input) { ...stashPerformer }
            }
        "#;
        let data = self.call(query, Some(json!({ "input": input }))).await?;
        decode_at(&data, "/performerCreate")
    }

    /// Update a performer from a PerformerUpdateInput payload.
    pub async fn update_performer(&self, input: Value) -> Result<Performer, StashError> {
        let query = r#"
            mutation PerformerUpdate($input: PerformerUpdateInput!) {
                performerUpdate(input: $input) { ...stashPerformer }
            }
        "#;
        let data = self.call(query, Some(json!({ "input": input }))).await?;
        decode_at(&data, "/performerUpdate")
    }

    // --- Studios ---

    /// List studios matching a free-text query and optional filter.
    pub async fn find_studios(
        &self,
        q: &str,
        studio_filter: Option<Value>,
    ) -> Result<Vec<Studio>, StashError> {
        let query = r#"
            query FindStudios($filter: FindFilterType, $studio_filter: StudioFilterType) {
                findStudios(filter: $filter, studio_filter: $studio_filter) {
                    count
                    studios { ...stashStudio }
                }
            }
        "#;
        let variables = json!({
            "filter": FindFilter::by_name(q),
            "studio_filter": studio_filter.unwrap_or_else(|| json!({})),
        });
        let data = self.call(query, Some(variables)).await?;
        decode_at(&data, "/findStudios/studios")
    }

    /// Find a studio by name, alias, or URL domain.
    ///
    /// When the name looks like a domain, studios whose URL contains it are
    /// included alongside name and alias matches before the ambiguity
    /// tie-break. `input` is a StudioCreateInput payload whose `name` field
    /// drives the search.
    pub async fn find_studio(
        &self,
        input: Value,
        create: bool,
    ) -> Result<Option<Studio>, StashError> {
        let Some(name) = input
            .get("name")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
        else {
            log::warn!("find_studio requires a \"name\" field");
            return Ok(None);
        };
        let name = name.as_str();

        let mut matches: Vec<Studio> = Vec::new();

        if matcher::looks_like_domain(name) {
            let url_results = self
                .find_studios(
                    "",
                    Some(json!({ "url": { "value": name, "modifier": "INCLUDES" } })),
                )
                .await?;
            for studio in url_results {
                let url = studio.url.clone().unwrap_or_default();
                if url.contains(name) {
                    log::info!("matched \"{name}\" to {url} using URL");
                    matches.push(studio);
                }
            }
        }

        let name_results = self.find_studios(name, None).await?;
        for studio in matcher::match_name(name, &name_results, AliasMode::Plain) {
            if !matches.iter().any(|m| m.id == studio.id) {
                matches.push(studio.clone());
            }
        }

        match matcher::disambiguate(name, matches) {
            MatchOutcome::Unique(studio) => Ok(Some(studio)),
            MatchOutcome::Ambiguous => {
                log::info!("multiple studios matched single-word name \"{name}\", using none");
                Ok(None)
            }
            MatchOutcome::NoMatch if create => {
                log::info!("creating missing studio \"{name}\"");
                self.create_studio(input).await.map(Some)
            }
            MatchOutcome::NoMatch => Ok(None),
        }
    }

    /// Create a studio by name, then push the remaining input fields with
    /// an update.
    pub async fn create_studio(&self, mut input: Value) -> Result<Studio, StashError> {
        let name = input
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| StashError::Config("studio input requires a name".to_string()))?;

        let query = r#"
            mutation StudioCreate($name: String!) {
                studioCreate(input: { name: $name }) { id }
            }
        "#;
        let data = self.call(query, Some(json!({ "name": name }))).await?;
        let id: String = decode_at(&data, "/studioCreate/id")?;

        input["id"] = json!(id);
        self.update_studio(input).await
    }

    /// Update a studio from a StudioUpdateInput payload.
    pub async fn update_studio(&self, input: Value) -> Result<Studio, StashError> {
        let query = r#"
            mutation StudioUpdate($input: StudioUpdateInput!) {
                studioUpdate(input: $input) { ...stashStudio }
            }
        "#;
        let data = self.call(query, Some(json!({ "input": input }))).await?;
        decode_at(&data, "/studioUpdate")
    }

    /// Fetch a studio by id, optionally walking up to its root parent.
    pub async fn get_studio(
        &self,
        studio_id: &str,
        root_parent: bool,
    ) -> Result<Option<Studio>, StashError> {
        let query = r#"
            query FindStudio($studio_id: ID!) {
                findStudio(id: $studio_id) { ...stashStudio }
            }
        "#;
        let data = self
            .call(query, Some(json!({ "studio_id": studio_id })))
            .await?;
        let mut studio: Option<Studio> = decode_at(&data, "/findStudio")?;

        if root_parent {
            while let Some(parent) = studio.as_ref().and_then(|s| s.parent_studio.as_ref()) {
                let parent_id = parent.id.clone();
                let data = self
                    .call(query, Some(json!({ "studio_id": parent_id })))
                    .await?;
                studio = decode_at(&data, "/findStudio")?;
            }
        }
        Ok(studio)
    }

    // --- Movies ---

    /// List movies matching a free-text query and optional filter.
    pub async fn find_movies(
        &self,
        q: &str,
        movie_filter: Option<Value>,
    ) -> Result<Vec<Movie>, StashError> {
        let query = r#"
            query FindMovies($filter: FindFilterType, $movie_filter: MovieFilterType) {
                findMovies(filter: $filter, movie_filter: $movie_filter) {
                    count
                    movies { ...stashMovie }
                }
            }
        "#;
        let variables = json!({
            "filter": FindFilter::by_name(q),
            "movie_filter": movie_filter.unwrap_or_else(|| json!({})),
        });
        let data = self.call(query, Some(variables)).await?;
        decode_at(&data, "/findMovies/movies")
    }

    /// Find a movie by name or alias. Multiple matches are never resolved;
    /// `input` is a MovieCreateInput payload whose `name` drives the search.
    pub async fn find_movie(
        &self,
        input: Value,
        create: bool,
    ) -> Result<Option<Movie>, StashError> {
        let Some(name) = input
            .get("name")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
        else {
            log::warn!("find_movie requires a \"name\" field");
            return Ok(None);
        };
        let name = name.as_str();

        let movies = self.find_movies(name, None).await?;
        let matches = matcher::match_name(name, &movies, AliasMode::Plain);
        match matches.len() {
            1 => Ok(Some(matches[0].clone())),
            0 if create => {
                log::info!("creating missing movie \"{name}\"");
                self.create_movie(input).await.map(Some)
            }
            0 => Ok(None),
            _ => {
                log::warn!("too many matches for movie \"{name}\"");
                Ok(None)
            }
        }
    }

    /// Create a movie by name, then push the remaining input fields with an
    /// update.
    pub async fn create_movie(&self, mut input: Value) -> Result<Movie, StashError> {
        let name = input
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| StashError::Config("movie input requires a name".to_string()))?;

        let query = r#"
            mutation MovieCreate($name: String!) {
                movieCreate(input: { name: $name }) { id }
            }
        "#;
        let data = self.call(query, Some(json!({ "name": name }))).await?;
        let id: String = decode_at(&data, "/movieCreate/id")?;

        input["id"] = json!(id);
        self.update_movie(input).await
    }

    /// Update a movie from a MovieUpdateInput payload.
    pub async fn update_movie(&self, input: Value) -> Result<Movie, StashError> {
        let query = r#"
            mutation MovieUpdate($input: MovieUpdateInput!) {
                movieUpdate(input: $input) { ...stashMovie }
            }
        "#;
        let data = self.call(query, Some(json!({ "input": input }))).await?;
        decode_at(&data, "/movieUpdate")
    }
}
