//! Boolean query evaluation over inverted entries.

use crate::client::Keys;
use crate::error::{Error, ParseOperatorError};
use crate::store::{by_score_desc, Store};
use crate::tokenizer::distinct_terms;
use crate::{DocId, Posting, Score};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// How per-term postings lists are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    /// Documents containing every query term.
    And,
    /// Documents containing at least one query term.
    Or,
}

impl FromStr for Operator {
    type Err = ParseOperatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "and" => Ok(Operator::And),
            "or" => Ok(Operator::Or),
            _ => Err(ParseOperatorError(s.to_string())),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::And => f.write_str("and"),
            Operator::Or => f.write_str("or"),
        }
    }
}

/// Evaluate `text` and return matching documents with their summed scores, best first.
pub(crate) fn evaluate<S: Store + ?Sized>(
    store: &S,
    keys: &Keys,
    text: &str,
    op: Operator,
) -> Result<Vec<(DocId, Score)>, Error> {
    let terms = distinct_terms(text);
    if terms.is_empty() {
        return Ok(Vec::new());
    }

    let mut lists: Vec<Vec<Posting>> = Vec::with_capacity(terms.len());
    for term in &terms {
        let postings: Vec<Posting> = store
            .range_by_score_desc(&keys.term(term))?
            .into_iter()
            .map(Posting::from)
            .collect();
        // an empty list empties the intersection, no need to fetch the rest
        if postings.is_empty() && op == Operator::And {
            tracing::debug!(namespace = keys.namespace(), term = term.as_str(), "and-query short-circuited");
            return Ok(Vec::new());
        }
        lists.push(postings);
    }

    let combined = match op {
        Operator::Or => union(&lists),
        Operator::And => intersection(&lists),
    };
    let ranked = rank(combined);
    tracing::debug!(namespace = keys.namespace(), terms = terms.len(), %op, hits = ranked.len(), "evaluated query");
    Ok(ranked)
}

/// Every document in any list, scores summed across lists.
pub fn union(lists: &[Vec<Posting>]) -> HashMap<DocId, Score> {
    let mut scores: HashMap<DocId, Score> = HashMap::new();
    for p in lists.iter().flatten() {
        *scores.entry(p.doc_id.clone()).or_insert(0.0) += p.score;
    }
    scores
}

/// Documents present in every list, scores summed across lists.
pub fn intersection(lists: &[Vec<Posting>]) -> HashMap<DocId, Score> {
    let Some(smallest) = lists.iter().min_by_key(|l| l.len()) else {
        return HashMap::new();
    };
    let maps: Vec<HashMap<&str, Score>> = lists
        .iter()
        .map(|l| l.iter().map(|p| (p.doc_id.as_str(), p.score)).collect())
        .collect();

    let mut scores = HashMap::with_capacity(smallest.len());
    'docs: for p in smallest {
        let mut total = 0.0;
        for m in &maps {
            match m.get(p.doc_id.as_str()) {
                Some(s) => total += s,
                None => continue 'docs,
            }
        }
        scores.insert(p.doc_id.clone(), total);
    }
    scores
}

/// Order by score descending, then document id bytes descending.
pub fn rank(scores: HashMap<DocId, Score>) -> Vec<(DocId, Score)> {
    let mut ranked: Vec<(DocId, Score)> = scores.into_iter().collect();
    ranked.sort_by(by_score_desc);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(entries: &[(&str, f64)]) -> Vec<Posting> {
        entries
            .iter()
            .map(|(d, s)| Posting { doc_id: d.to_string(), score: *s })
            .collect()
    }

    #[test]
    fn parse_operator() {
        assert_eq!("AND".parse::<Operator>().unwrap(), Operator::And);
        assert_eq!("or".parse::<Operator>().unwrap(), Operator::Or);
        assert!("xor".parse::<Operator>().is_err());
        assert_eq!(Operator::And.to_string(), "and");
    }

    #[test]
    fn union_sums_scores() {
        let lists = vec![list(&[("1", 1.0), ("2", 2.0)]), list(&[("2", 1.0), ("3", 1.0)])];
        let u = union(&lists);
        assert_eq!(u.len(), 3);
        assert_eq!(u["2"], 3.0);
    }

    #[test]
    fn intersection_keeps_common_only() {
        let lists = vec![
            list(&[("1", 1.0), ("2", 2.0), ("4", 1.0)]),
            list(&[("2", 1.0), ("4", 5.0)]),
        ];
        let i = intersection(&lists);
        assert_eq!(i.len(), 2);
        assert_eq!(i["2"], 3.0);
        assert_eq!(i["4"], 6.0);
        assert!(intersection(&[]).is_empty());
        assert!(intersection(&[list(&[("1", 1.0)]), Vec::new()]).is_empty());
    }

    #[test]
    fn rank_breaks_ties_by_id_descending() {
        let scores: HashMap<DocId, Score> = [("1", 2.0), ("4", 2.0), ("3", 1.0), ("10", 2.0)]
            .into_iter()
            .map(|(d, s)| (d.to_string(), s))
            .collect();
        let ids: Vec<DocId> = rank(scores).into_iter().map(|(d, _)| d).collect();
        assert_eq!(ids, vec!["4", "10", "1", "3"]);
    }
}
