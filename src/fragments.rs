use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::StashError;

/// Matches a fragment spread token: `...Name`. The GraphQL keyword `on`
/// also follows `...` in inline fragments and is filtered out separately.
static SPREAD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.\.\.([A-Za-z_][A-Za-z0-9_]*)").unwrap());

/// Matches a fragment definition header: `fragment Name`.
static DEFINITION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"fragment\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap());

/// Named GraphQL fragment definitions, looked up while resolving a query
/// into a self-contained document.
///
/// `Default` pre-populates the registry with the built-in Stash entity
/// fragments. Additional definitions can be inserted before the registry is
/// handed to a client; after that it is used read-only.
#[derive(Debug, Clone)]
pub struct FragmentRegistry {
    fragments: HashMap<String, String>,
}

impl Default for FragmentRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        for (name, body) in BUILTIN_FRAGMENTS {
            registry.insert(*name, *body);
        }
        registry
    }
}

impl FragmentRegistry {
    /// A registry with no definitions at all.
    pub fn empty() -> Self {
        Self {
            fragments: HashMap::new(),
        }
    }

    /// Insert or replace a fragment definition.
    pub fn insert(&mut self, name: impl Into<String>, body: impl Into<String>) {
        self.fragments.insert(name.into(), body.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fragments.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fragments.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Merge another registry into this one. Definitions from `other` win
    /// on name collision.
    pub fn extend(&mut self, other: FragmentRegistry) {
        self.fragments.extend(other.fragments);
    }

    /// Expand `query` into a document that defines every fragment it
    /// references.
    ///
    /// Referenced-but-undefined fragments are looked up in the registry and
    /// appended; appended definitions may reference further fragments, so
    /// the scan repeats until the document is closed under its own spreads.
    /// A query with no spreads, or one that already defines everything it
    /// references, is returned unchanged.
    ///
    /// Fails with [`StashError::UndefinedFragment`] when a referenced name
    /// is absent from both the document and the registry, or when the
    /// registered body does not actually define the name it is keyed under
    /// (appending such a body could never close the document). The registry
    /// must be free of cyclic fragment references.
    pub fn resolve(&self, query: &str) -> Result<String, StashError> {
        let mut doc = query.to_string();
        loop {
            let defined = definition_names(&doc);
            let missing: Vec<String> = spread_references(&doc)
                .into_iter()
                .filter(|name| !defined.contains(name.as_str()))
                .collect();
            if missing.is_empty() {
                return Ok(doc);
            }
            for name in missing {
                let body = self
                    .get(&name)
                    .ok_or_else(|| StashError::UndefinedFragment(name.clone()))?;
                if !definition_names(body).contains(name.as_str()) {
                    return Err(StashError::UndefinedFragment(name));
                }
                doc.push('\n');
                doc.push_str(body);
            }
        }
    }
}

/// Distinct fragment names referenced by spreads, in first-seen order.
fn spread_references(doc: &str) -> Vec<String> {
    let mut names = Vec::new();
    for cap in SPREAD_RE.captures_iter(doc) {
        let name = &cap[1];
        // `... on Type` is an inline fragment, not a spread
        if name == "on" {
            continue;
        }
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Names of every fragment defined in `doc`.
fn definition_names(doc: &str) -> HashSet<&str> {
    DEFINITION_RE
        .captures_iter(doc)
        .map(|cap| cap.get(1).map_or("", |m| m.as_str()))
        .collect()
}

/// Fragments for the entity shapes this crate's queries select, keyed by
/// fragment name.
const BUILTIN_FRAGMENTS: &[(&str, &str)] = &[
    (
        "stashTag",
        r#"fragment stashTag on Tag {
  id
  name
  aliases
  image_path
  scene_count
  __typename
}"#,
    ),
    (
        "stashPerformer",
        r#"fragment stashPerformer on Performer {
  id
  checksum
  name
  url
  gender
  twitter
  instagram
  birthdate
  ethnicity
  country
  eye_color
  height
  measurements
  fake_tits
  career_length
  tattoos
  piercings
  aliases
  favorite
  tags { ...stashTag }
  image_path
  scene_count
  image_count
  gallery_count
  stash_ids {
    stash_id
    endpoint
    __typename
  }
  rating
  details
  death_date
  hair_color
  weight
  __typename
}"#,
    ),
    (
        "stashStudio",
        r#"fragment stashStudio on Studio {
  id
  name
  url
  aliases
  rating
  details
  stash_ids {
    endpoint
    stash_id
    __typename
  }
  parent_studio {
    id
    name
  }
  __typename
}"#,
    ),
    (
        "stashMovie",
        r#"fragment stashMovie on Movie {
  id
  name
  aliases
  duration
  date
  rating
  studio { id }
  director
  synopsis
  url
  created_at
  updated_at
  scene_count
  __typename
}"#,
    ),
    (
        "stashSceneMarker",
        r#"fragment stashSceneMarker on SceneMarker {
  id
  scene { id }
  title
  seconds
  primary_tag { ...stashTag }
  tags { ...stashTag }
  __typename
}"#,
    ),
    (
        "stashScene",
        r#"fragment stashScene on Scene {
  id
  checksum
  oshash
  phash
  title
  details
  url
  date
  rating
  organized
  o_counter
  path
  tags {
    ...stashTag
  }
  file {
    size
    duration
    video_codec
    audio_codec
    width
    height
    framerate
    bitrate
    __typename
  }
  galleries {
    id
    checksum
    path
    title
    url
    date
    details
    rating
    organized
    studio {
      id
      name
      url
      __typename
    }
    image_count
    tags {
      ...stashTag
    }
  }
  performers {
    ...stashPerformer
  }
  scene_markers {
    ...stashSceneMarker
  }
  studio {
    ...stashStudio
  }
  stash_ids {
    endpoint
    stash_id
    __typename
  }
  __typename
}"#,
    ),
    (
        "stashGallery",
        r#"fragment stashGallery on Gallery {
  id
  checksum
  path
  title
  date
  url
  details
  rating
  organized
  image_count
  cover {
    paths {
      thumbnail
    }
  }
  studio {
    id
    name
    __typename
  }
  tags {
    ...stashTag
  }
  performers {
    ...stashPerformer
  }
  scenes {
    id
    title
    __typename
  }
  images {
    id
    title
  }
  __typename
}"#,
    ),
    (
        "scrapedTag",
        r#"fragment scrapedTag on ScrapedTag {
  stored_id
  name
  __typename
}"#,
    ),
    (
        "scrapedStudio",
        r#"fragment scrapedStudio on ScrapedStudio {
  stored_id
  name
  url
  remote_site_id
  __typename
}"#,
    ),
    (
        "scrapedPerformer",
        r#"fragment scrapedPerformer on ScrapedPerformer {
  stored_id
  name
  gender
  url
  twitter
  instagram
  birthdate
  ethnicity
  country
  eye_color
  height
  measurements
  fake_tits
  career_length
  tattoos
  piercings
  aliases
  tags { ...scrapedTag }
  images
  details
  death_date
  hair_color
  weight
  remote_site_id
  __typename
}"#,
    ),
    (
        "scrapedMovie",
        r#"fragment scrapedMovie on ScrapedMovie {
  stored_id
  name
  aliases
  duration
  date
  rating
  director
  synopsis
  url
  studio {
    ...scrapedStudio
  }
  front_image
  back_image
  __typename
}"#,
    ),
    (
        "scrapedScene",
        r#"fragment scrapedScene on ScrapedScene {
  title
  details
  url
  date
  image
  studio {
    ...scrapedStudio
  }
  tags {
    ...scrapedTag
  }
  performers {
    ...scrapedPerformer
  }
  movies {
    ...scrapedMovie
  }
  duration
  __typename
}"#,
    ),
    (
        "scrapedGallery",
        r#"fragment scrapedGallery on ScrapedGallery {
  title
  details
  url
  date
  studio {
    ...scrapedStudio
  }
  tags { ...scrapedTag }
  performers {
    ...scrapedPerformer
  }
  __typename
}"#,
    ),
    (
        "ConfigData",
        r#"fragment ConfigData on ConfigResult {
  general {
    ...ConfigGeneralData
  }
  interface {
    ...ConfigInterfaceData
  }
  dlna {
    ...ConfigDLNAData
  }
}"#,
    ),
    (
        "ConfigGeneralData",
        r#"fragment ConfigGeneralData on ConfigGeneralResult {
  stashes {
    path
    excludeVideo
    excludeImage
  }
  databasePath
  generatedPath
  configFilePath
  cachePath
  calculateMD5
  videoFileNamingAlgorithm
  parallelTasks
  previewAudio
  previewSegments
  previewSegmentDuration
  previewExcludeStart
  previewExcludeEnd
  previewPreset
  maxTranscodeSize
  maxStreamingTranscodeSize
  apiKey
  username
  password
  maxSessionAge
  logFile
  logOut
  logLevel
  logAccess
  createGalleriesFromFolders
  videoExtensions
  imageExtensions
  galleryExtensions
  excludes
  imageExcludes
  scraperUserAgent
  scraperCertCheck
  scraperCDPPath
  stashBoxes {
    name
    endpoint
    api_key
  }
}"#,
    ),
    (
        "ConfigInterfaceData",
        r#"fragment ConfigInterfaceData on ConfigInterfaceResult {
  menuItems
  soundOnPreview
  wallShowTitle
  wallPlayback
  maximumLoopDuration
  autostartVideo
  showStudioAsText
  css
  cssEnabled
  language
  slideshowDelay
  handyKey
}"#,
    ),
    (
        "ConfigDLNAData",
        r#"fragment ConfigDLNAData on ConfigDLNAResult {
  serverName
  enabled
  whitelistedIPs
  interfaces
}"#,
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_spreads_returns_unchanged() {
        let registry = FragmentRegistry::default();
        let query = "query Version { version { version } }";
        assert_eq!(registry.resolve(query).unwrap(), query);
    }

    #[test]
    fn test_appends_referenced_fragment() {
        let mut registry = FragmentRegistry::empty();
        registry.insert("tagFields", "fragment tagFields on Tag { id name }");
        let resolved = registry
            .resolve("query { findTags { tags { ...tagFields } } }")
            .unwrap();
        assert!(resolved.contains("fragment tagFields on Tag"));
    }

    #[test]
    fn test_duplicate_spreads_append_once() {
        let mut registry = FragmentRegistry::empty();
        registry.insert("tagFields", "fragment tagFields on Tag { id }");
        let resolved = registry
            .resolve("query { a { ...tagFields } b { ...tagFields } }")
            .unwrap();
        assert_eq!(resolved.matches("fragment tagFields").count(), 1);
    }

    #[test]
    fn test_nested_references_are_followed() {
        let mut registry = FragmentRegistry::empty();
        registry.insert("outer", "fragment outer on Scene { tags { ...inner } }");
        registry.insert("inner", "fragment inner on Tag { id name }");
        let resolved = registry.resolve("query { scenes { ...outer } }").unwrap();
        assert!(resolved.contains("fragment outer on Scene"));
        assert!(resolved.contains("fragment inner on Tag"));
    }

    #[test]
    fn test_undefined_fragment_fails() {
        let registry = FragmentRegistry::empty();
        let err = registry.resolve("query { tags { ...nowhere } }").unwrap_err();
        match err {
            StashError::UndefinedFragment(name) => assert_eq!(name, "nowhere"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_mismatched_registry_body_fails_instead_of_looping() {
        // A body that defines some other name can never satisfy the spread
        // it was registered for; appending it forever must not happen.
        let mut registry = FragmentRegistry::empty();
        registry.insert("broken", "fragment other on Tag { id }");
        let err = registry.resolve("query { tags { ...broken } }").unwrap_err();
        match err {
            StashError::UndefinedFragment(name) => assert_eq!(name, "broken"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_first_missing_fragment_is_reported() {
        let mut registry = FragmentRegistry::empty();
        registry.insert("known", "fragment known on Tag { id }");
        let err = registry
            .resolve("query { a { ...missing } b { ...known } }")
            .unwrap_err();
        match err {
            StashError::UndefinedFragment(name) => assert_eq!(name, "missing"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_definition_in_query_is_not_looked_up() {
        let registry = FragmentRegistry::empty();
        let query = "query { tags { ...local } }\nfragment local on Tag { id }";
        assert_eq!(registry.resolve(query).unwrap(), query);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let mut registry = FragmentRegistry::empty();
        registry.insert("outer", "fragment outer on Scene { tags { ...inner } }");
        registry.insert("inner", "fragment inner on Tag { id name }");
        let once = registry.resolve("query { scenes { ...outer } }").unwrap();
        let twice = registry.resolve(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_inline_fragments_are_not_spreads() {
        let registry = FragmentRegistry::empty();
        let query = "query { node { ... on Tag { id } } }";
        assert_eq!(registry.resolve(query).unwrap(), query);
    }

    #[test]
    fn test_prefix_names_do_not_shadow() {
        // A definition for "tag" must not satisfy a reference to "tagFields".
        let mut registry = FragmentRegistry::empty();
        registry.insert("tagFields", "fragment tagFields on Tag { id }");
        let query = "query { t { ...tagFields } }\nfragment tag on Tag { id }";
        let resolved = registry.resolve(query).unwrap();
        assert!(resolved.contains("fragment tagFields on Tag"));
    }

    #[test]
    fn test_user_fragment_overrides_builtin() {
        let mut registry = FragmentRegistry::default();
        registry.insert("stashTag", "fragment stashTag on Tag { id }");
        let resolved = registry.resolve("query { tags { ...stashTag } }").unwrap();
        assert!(resolved.contains("fragment stashTag on Tag { id }"));
    }

    #[test]
    fn test_builtin_registry_closes_over_itself() {
        // Every spread inside a built-in fragment must resolve from the
        // built-in set.
        let registry = FragmentRegistry::default();
        for (name, _) in BUILTIN_FRAGMENTS {
            let query = format!("query {{ x {{ ...{name} }} }}");
            registry.resolve(&query).unwrap();
        }
    }
}
