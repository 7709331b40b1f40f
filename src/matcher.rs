//! Loose employer-name matching.
//!
//! A candidate matches when it is a case-insensitive substring of any
//! reference name. This is a plain containment scan over every reference;
//! nothing is indexed.

/// True if `candidate` is a case-insensitive substring of any name in
/// `references`. A missing candidate never matches.
pub fn partial_match<S: AsRef<str>>(candidate: Option<&str>, references: &[S]) -> bool {
    contains_folded(
        candidate,
        references.iter().map(|name| name.as_ref().to_lowercase()),
    )
}

/// Containment test against names that are already lower-cased.
fn contains_folded<I, S>(candidate: Option<&str>, folded: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let Some(candidate) = candidate else {
        return false;
    };
    let needle = candidate.to_lowercase();
    folded.into_iter().any(|name| name.as_ref().contains(&needle))
}

/// A reference list with its names lower-cased once, for matching many
/// candidates against the same list.
#[derive(Debug, Clone, Default)]
pub struct LooseMatcher {
    folded: Vec<String>,
}

impl LooseMatcher {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            folded: names
                .into_iter()
                .map(|n| n.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Same result as [`partial_match`] against the original names.
    pub fn matches(&self, candidate: Option<&str>) -> bool {
        contains_folded(candidate, &self.folded)
    }

    pub fn len(&self) -> usize {
        self.folded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.folded.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOTABLE: &[&str] = &["Alphabet Inc.", "JPMorgan Chase & Co", "Toyota Motor"];

    #[test]
    fn substring_is_case_insensitive() {
        assert!(partial_match(Some("alphabet"), NOTABLE));
        assert!(partial_match(Some("JPMORGAN"), NOTABLE));
        assert!(partial_match(Some("Motor"), NOTABLE));
    }

    #[test]
    fn containment_is_one_directional() {
        // the candidate must sit inside a reference name, not the reverse
        assert!(!partial_match(Some("Toyota Motor North America"), NOTABLE));
        assert!(!partial_match(Some("Google"), NOTABLE));
    }

    #[test]
    fn missing_candidate_never_matches() {
        assert!(!partial_match(None, NOTABLE));
        assert!(!LooseMatcher::new(NOTABLE.iter()).matches(None));
    }

    #[test]
    fn empty_reference_list_matches_nothing() {
        let empty: &[&str] = &[];
        assert!(!partial_match(Some("Acme"), empty));
        assert!(LooseMatcher::new(empty.iter()).is_empty());
    }

    #[test]
    fn matcher_agrees_with_partial_match() {
        let matcher = LooseMatcher::new(NOTABLE.iter());
        assert_eq!(matcher.len(), 3);
        for candidate in ["alphabet", "Chase", "TOYOTA", "Google", "Inc.", "Toyota Motors"] {
            assert_eq!(
                matcher.matches(Some(candidate)),
                partial_match(Some(candidate), NOTABLE),
                "{candidate}"
            );
        }
    }
}
