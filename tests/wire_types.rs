use serde_json::json;
use stash_client::types::GraphQlResponse;
use stash_client::{
    AliasMode, MatchOutcome, NamedEntity, Performer, Scene, ScrapedScene, Studio, Tag, matcher,
};

#[test]
fn response_with_partial_data_and_errors_deserializes() {
    let body = r#"{
        "errors": [
            { "message": "loading scene 42: not found", "path": ["findScene"] }
        ],
        "data": { "findScene": null, "version": { "version": "v0.7.0" } }
    }"#;
    let response: GraphQlResponse = serde_json::from_str(body).unwrap();
    assert_eq!(response.errors.len(), 1);
    assert_eq!(
        response.errors[0].message,
        "loading scene 42: not found"
    );
    assert!(response.data.is_some());
}

#[test]
fn response_without_errors_field_deserializes() {
    let body = r#"{ "data": { "reloadScrapers": true } }"#;
    let response: GraphQlResponse = serde_json::from_str(body).unwrap();
    assert!(response.errors.is_empty());
}

#[test]
fn tag_from_server_json() {
    let tag: Tag = serde_json::from_value(json!({
        "id": "17",
        "name": "outdoors",
        "aliases": ["outside"],
        "image_path": "http://localhost:9999/tag/17/image",
        "scene_count": 3,
        "__typename": "Tag"
    }))
    .unwrap();
    assert_eq!(tag.id(), "17");
    assert_eq!(tag.aliases(), vec!["outside"]);
}

#[test]
fn performer_with_raw_alias_string() {
    let performer: Performer = serde_json::from_value(json!({
        "id": "5",
        "name": "Jane Doe",
        "aliases": "JD / Janie Doe / studio:Jane D",
        "favorite": false,
        "tags": [],
        "stash_ids": [],
        "__typename": "Performer"
    }))
    .unwrap();
    let candidates = [performer];
    // The colon-prefixed alias matches on its suffix only.
    let matches = matcher::match_name("jane d", &candidates, AliasMode::ColonSuffix);
    assert_eq!(matches.len(), 1);
}

#[test]
fn performer_with_null_aliases_matches_primary_name_only() {
    let performer: Performer = serde_json::from_value(json!({
        "id": "5",
        "name": "Jane Doe",
        "aliases": null
    }))
    .unwrap();
    let candidates = [performer];
    assert_eq!(
        matcher::match_name("Jane Doe", &candidates, AliasMode::ColonSuffix).len(),
        1
    );
    assert!(matcher::match_name("JD", &candidates, AliasMode::ColonSuffix).is_empty());
}

#[test]
fn studio_with_parent_and_url() {
    let studio: Studio = serde_json::from_value(json!({
        "id": "2",
        "name": "Example Studio",
        "url": "https://www.example.com/studio",
        "aliases": [],
        "parent_studio": { "id": "1", "name": "Example Network" },
        "__typename": "Studio"
    }))
    .unwrap();
    assert_eq!(studio.parent_studio.as_ref().unwrap().id, "1");
    assert!(studio.url.unwrap().contains("example.com"));
}

#[test]
fn studio_domain_search_unions_with_name_matches() {
    // Mirrors the find_studio flow once candidates are fetched: a URL hit
    // and a name hit for the same studio collapse to one match.
    let by_url: Studio = serde_json::from_value(json!({
        "id": "2",
        "name": "Totally Different Name",
        "url": "https://example.com"
    }))
    .unwrap();
    let by_name: Studio = serde_json::from_value(json!({
        "id": "3",
        "name": "example.com"
    }))
    .unwrap();

    assert!(matcher::looks_like_domain("example.com"));
    let mut matches: Vec<Studio> = Vec::new();
    for studio in [by_url] {
        if studio.url.as_deref().unwrap_or("").contains("example.com") {
            matches.push(studio);
        }
    }
    let name_results = [by_name];
    for studio in matcher::match_name("example.com", &name_results, AliasMode::Plain) {
        if !matches.iter().any(|m| m.id == studio.id) {
            matches.push(studio.clone());
        }
    }
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].id, "2");
    // Single-word term with two matches stays unresolved.
    assert!(matches!(
        matcher::disambiguate("example.com", matches),
        MatchOutcome::Ambiguous
    ));
}

#[test]
fn scene_with_nested_entities() {
    let scene: Scene = serde_json::from_value(json!({
        "id": "42",
        "title": "Sample",
        "path": "/library/sample.mp4",
        "rating": 4,
        "organized": true,
        "o_counter": 0,
        "tags": [{ "id": "17", "name": "outdoors", "aliases": [] }],
        "file": { "size": "1048576", "duration": 360.5, "width": 1920, "height": 1080 },
        "galleries": [],
        "performers": [{ "id": "5", "name": "Jane Doe", "aliases": "JD" }],
        "scene_markers": [],
        "studio": { "id": "2", "name": "Example Studio" },
        "stash_ids": [{ "endpoint": "https://stashdb.org/graphql", "stash_id": "abc" }]
    }))
    .unwrap();
    assert_eq!(scene.tags[0].name, "outdoors");
    assert_eq!(scene.performers[0].alias_list(), vec!["JD"]);
    assert_eq!(scene.file.unwrap().duration, Some(360.5));
    assert_eq!(scene.stash_ids[0].stash_id, "abc");
}

#[test]
fn scraped_scene_with_missing_fields() {
    let scraped: ScrapedScene = serde_json::from_value(json!({
        "title": "Scraped Title",
        "url": "https://example.com/scene",
        "studio": { "stored_id": null, "name": "Example Studio" },
        "performers": [{ "name": "Jane Doe" }],
        "tags": []
    }))
    .unwrap();
    assert_eq!(scraped.title.as_deref(), Some("Scraped Title"));
    assert!(scraped.movies.is_empty());
    assert_eq!(scraped.performers[0].name.as_deref(), Some("Jane Doe"));
    assert!(scraped.performers[0].stored_id.is_none());
}
