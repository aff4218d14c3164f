//! Name and alias matching for catalog entities.
//!
//! The matching core is synchronous and pure: it operates on candidate
//! lists the transport layer has already fetched. The find-or-create
//! methods on [`StashClient`](crate::StashClient) drive it per entity kind.

use once_cell::sync::Lazy;
use regex::Regex;

/// Anchored pattern for names that look like a bare URL domain, e.g.
/// "example.com" or "example.co.uk".
static DOMAIN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^.]*\.[^.]{2,3}(?:\.[^.]{2,3})?$").unwrap());

/// Delimiters that may separate aliases stored as a single raw string.
static ALIAS_DELIM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(/|\n|,|;)").unwrap());

/// A catalog entity that can be matched by primary name or alias.
pub trait NamedEntity {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    /// Alias strings as stored on the server, not yet normalized.
    fn aliases(&self) -> Vec<String>;
}

/// How alias strings are normalized before comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasMode {
    /// Trim surrounding whitespace only.
    Plain,
    /// Trim, and when the alias carries a `source:value` prefix, compare
    /// only the part after the last colon.
    ColonSuffix,
}

/// Outcome of resolving a search term against its matched candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome<T> {
    /// Exactly one acceptable candidate.
    Unique(T),
    /// Nothing matched.
    NoMatch,
    /// Multiple candidates matched a single-word term; deliberately left
    /// unresolved to avoid false positives on short names.
    Ambiguous,
}

/// Candidates whose primary name or any normalized alias equals `search`,
/// compared case-insensitively over the full string.
///
/// Results keep first-match order and are deduplicated by id.
pub fn match_name<'a, T: NamedEntity>(
    search: &str,
    candidates: &'a [T],
    mode: AliasMode,
) -> Vec<&'a T> {
    let needle = search.trim().to_lowercase();
    let mut matched: Vec<&T> = Vec::new();
    for candidate in candidates {
        if matched.iter().any(|m| m.id() == candidate.id()) {
            continue;
        }
        if candidate.name().to_lowercase() == needle {
            log::debug!(
                "matched \"{}\" to \"{}\" ({}) using primary name",
                search,
                candidate.name(),
                candidate.id()
            );
            matched.push(candidate);
            continue;
        }
        if candidate
            .aliases()
            .iter()
            .any(|alias| normalize_alias(alias, mode).to_lowercase() == needle)
        {
            log::info!(
                "matched \"{}\" to \"{}\" ({}) using alias",
                search,
                candidate.name(),
                candidate.id()
            );
            matched.push(candidate);
        }
    }
    matched
}

/// Normalize an alias string for comparison.
pub fn normalize_alias(alias: &str, mode: AliasMode) -> String {
    match mode {
        AliasMode::Plain => alias.trim().to_string(),
        AliasMode::ColonSuffix => match alias.rsplit_once(':') {
            Some((_, suffix)) => suffix.trim().to_string(),
            None => alias.trim().to_string(),
        },
    }
}

/// Apply the find-or-create tie-break to a list of matches.
///
/// A single-word search term with multiple matches stays unresolved; a
/// term containing whitespace is assumed specific enough that the first
/// match is accepted.
pub fn disambiguate<T>(search: &str, mut matches: Vec<T>) -> MatchOutcome<T> {
    match matches.len() {
        0 => MatchOutcome::NoMatch,
        1 => MatchOutcome::Unique(matches.remove(0)),
        _ if !search.contains(' ') => MatchOutcome::Ambiguous,
        _ => MatchOutcome::Unique(matches.remove(0)),
    }
}

/// Split a raw alias string into individual aliases.
///
/// Performer aliases arrive as one free-text string; the first delimiter
/// character found (`/`, newline, `,` or `;`) decides how to split it. A
/// non-empty string without delimiters is a single alias.
pub fn split_alias_list(raw: &str) -> Vec<String> {
    if let Some(delim) = ALIAS_DELIM_RE.find(raw) {
        raw.split(delim.as_str()).map(str::to_string).collect()
    } else if !raw.is_empty() {
        vec![raw.to_string()]
    } else {
        log::warn!("could not determine delimiter for aliases \"{raw}\"");
        Vec::new()
    }
}

/// Whether a studio search term looks like a bare URL domain.
pub fn looks_like_domain(name: &str) -> bool {
    DOMAIN_RE.is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Entity {
        id: String,
        name: String,
        aliases: Vec<String>,
    }

    impl Entity {
        fn new(id: &str, name: &str, aliases: &[&str]) -> Self {
            Self {
                id: id.to_string(),
                name: name.to_string(),
                aliases: aliases.iter().map(|a| a.to_string()).collect(),
            }
        }
    }

    impl NamedEntity for Entity {
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

    #[test]
    fn test_primary_name_match_is_case_insensitive() {
        let candidates = [Entity::new("1", "Jane Doe", &[])];
        let matches = match_name("jane doe", &candidates, AliasMode::Plain);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, "1");
    }

    #[test]
    fn test_no_substring_matches() {
        let candidates = [Entity::new("1", "Jane Doe", &[])];
        assert!(match_name("Jane", &candidates, AliasMode::Plain).is_empty());
        assert!(match_name("Jane Doe Jr", &candidates, AliasMode::Plain).is_empty());
    }

    #[test]
    fn test_colon_alias_matches_suffix_only() {
        let candidates = [
            Entity::new("1", "Jane Doe", &[]),
            Entity::new("2", "Someone Else", &["studio:Jane Doe"]),
        ];
        let matches = match_name("Jane Doe", &candidates, AliasMode::ColonSuffix);
        let ids: Vec<&str> = matches.iter().map(|m| m.id()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn test_plain_mode_keeps_colon_prefix() {
        let candidates = [Entity::new("1", "Someone", &["studio:Jane Doe"])];
        assert!(match_name("Jane Doe", &candidates, AliasMode::Plain).is_empty());
        let matches = match_name("studio:Jane Doe", &candidates, AliasMode::Plain);
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn test_colon_suffix_uses_last_colon() {
        assert_eq!(normalize_alias("a:b:c", AliasMode::ColonSuffix), "c");
        assert_eq!(normalize_alias("  padded  ", AliasMode::ColonSuffix), "padded");
        assert_eq!(normalize_alias("site: Jane Doe ", AliasMode::ColonSuffix), "Jane Doe");
    }

    #[test]
    fn test_duplicate_ids_are_collapsed() {
        let candidates = [
            Entity::new("1", "Anna", &[]),
            Entity::new("1", "Anna", &["anna"]),
        ];
        let matches = match_name("Anna", &candidates, AliasMode::Plain);
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn test_entity_without_aliases_is_skipped_quietly() {
        let candidates = [Entity::new("1", "Other Name", &[])];
        assert!(match_name("Anna", &candidates, AliasMode::Plain).is_empty());
    }

    #[test]
    fn test_single_word_with_two_matches_is_ambiguous() {
        let candidates = [
            Entity::new("1", "Anna", &[]),
            Entity::new("2", "Annie", &["anna"]),
        ];
        let matches = match_name("Anna", &candidates, AliasMode::Plain);
        assert_eq!(matches.len(), 2);
        assert_eq!(disambiguate("Anna", matches), MatchOutcome::Ambiguous);
    }

    #[test]
    fn test_multi_word_with_two_matches_takes_first() {
        let candidates = [
            Entity::new("1", "Anna Lee", &[]),
            Entity::new("2", "Annie", &["anna lee"]),
        ];
        let matches = match_name("Anna Lee", &candidates, AliasMode::Plain);
        assert_eq!(matches.len(), 2);
        match disambiguate("Anna Lee", matches) {
            MatchOutcome::Unique(entity) => assert_eq!(entity.id, "1"),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_single_match_is_unique_regardless_of_spaces() {
        let candidates = [Entity::new("1", "Anna", &[])];
        let matches = match_name("Anna", &candidates, AliasMode::Plain);
        match disambiguate("Anna", matches) {
            MatchOutcome::Unique(entity) => assert_eq!(entity.id, "1"),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_no_match_outcome() {
        let matches: Vec<&Entity> = Vec::new();
        assert_eq!(disambiguate("Anna", matches), MatchOutcome::NoMatch);
    }

    #[test]
    fn test_split_alias_list_picks_first_delimiter() {
        assert_eq!(
            split_alias_list("Jane Doe / JD, Janie"),
            vec!["Jane Doe ", " JD, Janie"]
        );
        assert_eq!(split_alias_list("a, b; c"), vec!["a", " b; c"]);
        assert_eq!(split_alias_list("a\nb"), vec!["a", "b"]);
    }

    #[test]
    fn test_split_alias_list_single_alias() {
        assert_eq!(split_alias_list("Jane Doe"), vec!["Jane Doe"]);
    }

    #[test]
    fn test_split_alias_list_empty_string() {
        assert!(split_alias_list("").is_empty());
    }

    #[test]
    fn test_split_then_match_trims_parts() {
        let aliases = split_alias_list("Jane Doe / JD ");
        let candidates = [Entity::new(
            "1",
            "Someone",
            &aliases.iter().map(String::as_str).collect::<Vec<_>>(),
        )];
        assert_eq!(match_name("JD", &candidates, AliasMode::Plain).len(), 1);
    }

    #[test]
    fn test_domain_detection() {
        assert!(looks_like_domain("example.com"));
        assert!(looks_like_domain("example.co.uk"));
        assert!(!looks_like_domain("Example Studio"));
        assert!(!looks_like_domain("example"));
    }
}
