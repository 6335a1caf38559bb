pub mod index;

pub use index::PeerIndex;

use crate::peer::Peer;

/// One term of a parsed search query.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum QueryTerm {
    Exact(String),
    /// Written as `term*`
    Prefix(String),
}

/// Lowercased alphanumeric runs of `text`, first occurrence order, no duplicates.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut terms: Vec<String> = vec![];
    for token in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
    {
        let token = token.to_lowercase();
        if !terms.contains(&token) {
            terms.push(token);
        }
    }
    terms
}

/// Every distinct term of the peer's text fields.
pub fn peer_terms(peer: &Peer) -> Vec<String> {
    let mut terms: Vec<String> = vec![];
    for field in peer.text_fields() {
        for term in tokenize(field) {
            if !terms.contains(&term) {
                terms.push(term);
            }
        }
    }
    terms
}

/// Split free text into query terms. Words are OR'ed together. A trailing `*` makes the
/// last token of the word a prefix match.
pub fn parse_query(text: &str) -> Vec<QueryTerm> {
    let mut terms = vec![];
    for word in text.split_whitespace() {
        let prefix = word.ends_with('*');
        let mut tokens = tokenize(word.trim_end_matches('*'));
        let last = match prefix {
            true => tokens.pop().map(QueryTerm::Prefix),
            false => None,
        };
        for term in tokens.into_iter().map(QueryTerm::Exact).chain(last) {
            if !terms.contains(&term) {
                terms.push(term);
            }
        }
    }
    terms
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_lowercases_and_dedups() {
        assert_eq!(
            tokenize("Ada ada@Example.org, Lovelace!"),
            vec!["ada", "example", "org", "lovelace"]
        );
        assert!(tokenize(" -- ").is_empty());
    }

    #[test]
    fn peer_terms_cover_text_fields() {
        let peer = Peer::new("Ada Lovelace")
            .with_email("ada@example.org")
            .with_bio("Wrote the first program");
        let terms = peer_terms(&peer);
        for expected in ["ada", "lovelace", "example", "org", "wrote", "program"] {
            assert!(terms.contains(&expected.to_string()), "missing {expected}");
        }
        assert_eq!(terms.iter().filter(|t| *t == "ada").count(), 1);
    }

    #[test]
    fn trailing_star_is_prefix() {
        assert_eq!(
            parse_query("math lov* x-ray*"),
            vec![
                QueryTerm::Exact("math".into()),
                QueryTerm::Prefix("lov".into()),
                QueryTerm::Exact("x".into()),
                QueryTerm::Prefix("ray".into()),
            ]
        );
    }

    #[test]
    fn blank_query_has_no_terms() {
        assert!(parse_query("").is_empty());
        assert!(parse_query("   * ").is_empty());
    }
}
