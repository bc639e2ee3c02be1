/// Botanical name decomposition.
///
/// Pure transforms over name strings: marker canonicalization, inline
/// subgenus/section annotation capture, and rank inference from the
/// priority-ordered marker table. No side effects; everything the
/// caller needs comes back in `ParsedName`.
use crate::model::Rank;
use crate::rules::RuleSet;
use crate::{HerbariumError, Result};
use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    /// Display name with markers canonicalized and annotations removed.
    pub name: String,
    pub generic_name: String,
    pub specific_name: Option<String>,
    pub infra_name: Option<String>,
    pub rank: Rank,
    /// Captured from an inline "subg. Xxx" annotation, if any.
    pub subgenus: Option<String>,
    /// Captured from an inline "sect. Xxx" annotation, if any.
    pub section: Option<String>,
}

fn subgenus_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\(?\bsubg(?:en)?\.\s+([A-Z][A-Za-z-]*)\)?\s*").expect("subgenus pattern")
    })
}

fn section_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\(?\bsect\.\s+([A-Z][A-Za-z-]*)\)?\s*").expect("section pattern")
    })
}

/// Strips one annotation kind out of the name, returning the captured
/// value. Only the first occurrence is honored.
fn strip_annotation(name: &str, re: &Regex) -> (String, Option<String>) {
    match re.captures(name) {
        Some(caps) => {
            let value = caps.get(1).map(|m| m.as_str().to_string());
            let stripped = re.replace(name, " ").to_string();
            (stripped, value)
        }
        None => (name.to_string(), None),
    }
}

/// Parses a full scientific name into epithets and an inferred rank.
///
/// Rank inference walks the marker table in priority order; the first
/// marker with a hit in the token list decides both the rank and the
/// split point between the species epithet and the infraspecific
/// epithet. A name with no marker is a species. Names that provide
/// neither a genus token nor a species epithet are rejected.
pub fn parse_name(raw: &str, rules: &RuleSet) -> Result<ParsedName> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(HerbariumError::Parse("empty name".to_string()));
    }

    let (without_subg, subgenus) = strip_annotation(trimmed, subgenus_re());
    let (without_sect, section) = strip_annotation(&without_subg, section_re());

    // Canonicalize marker spellings token by token, so substring
    // collisions between spellings ("sp." inside "ssp.") cannot occur.
    let tokens: Vec<String> = without_sect
        .split_whitespace()
        .map(|t| match rules.marker_for_spelling(t) {
            Some(marker) => marker.canonical.clone(),
            None => t.to_string(),
        })
        .collect();

    if tokens.is_empty() {
        return Err(HerbariumError::Parse(format!("no name tokens in '{raw}'")));
    }

    let name = tokens.join(" ");

    let hit = rules.markers.iter().find_map(|marker| {
        tokens
            .iter()
            .position(|t| *t == marker.canonical)
            .map(|idx| (marker, idx))
    });

    let generic_name = tokens[0].clone();
    if rules.marker_for_spelling(&generic_name).is_some() {
        return Err(HerbariumError::Parse(format!("no genus token in '{raw}'")));
    }

    let (rank, specific_name, infra_name) = match hit {
        Some((marker, idx)) if marker.rank.is_infraspecific() => {
            if idx < 2 {
                return Err(HerbariumError::Parse(format!(
                    "no species epithet before '{}' in '{raw}'",
                    marker.canonical
                )));
            }
            let infra = tokens.get(idx + 1).cloned().ok_or_else(|| {
                HerbariumError::Parse(format!(
                    "no infraspecific epithet after '{}' in '{raw}'",
                    marker.canonical
                ))
            })?;
            (marker.rank, Some(tokens[1].clone()), Some(infra))
        }
        Some((marker, idx)) => {
            // Species-qualifier marker: the epithet, when present,
            // follows the marker ("Drosera cf. regia").
            let specific = tokens.get(idx + 1).cloned();
            (marker.rank, specific, None)
        }
        None => {
            let specific = tokens.get(1).cloned().ok_or_else(|| {
                HerbariumError::Parse(format!("no species epithet in '{raw}'"))
            })?;
            (Rank::Species, Some(specific), None)
        }
    };

    Ok(ParsedName {
        name,
        generic_name,
        specific_name,
        infra_name,
        rank,
        subgenus,
        section,
    })
}
