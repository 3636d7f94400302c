//! Property-based checks of the invariants every constructed `Pen` must
//! satisfy, independent of which corpus produced it.

use proptest::prelude::*;
use suffix_pen::{Comparer, Pen, Token};

fn arb_token() -> impl Strategy<Value = Token> {
    prop_oneof![
        3 => "[a-c]{1,2}".prop_map(Some),
        1 => Just(None),
    ]
}

fn arb_corpus() -> impl Strategy<Value = Vec<Token>> {
    prop::collection::vec(arb_token(), 0..40)
}

proptest! {
    /// Invariant 1: |P| = C + 1 and P is a permutation of {0,...,C}.
    #[test]
    fn positions_is_a_permutation_of_0_to_c(corpus in arb_corpus()) {
        let pen = Pen::new(corpus.clone(), Comparer::Ordinal, None, false);
        let mut all = pen.positions_of(&[]);
        prop_assert_eq!(all.len(), corpus.len() + 1);
        all.sort_unstable();
        prop_assert_eq!(all, (0..=corpus.len()).collect::<Vec<_>>());
    }

    /// Invariant 4: count(empty) = C + 1.
    #[test]
    fn count_of_empty_prefix_is_corpus_len_plus_one(corpus in arb_corpus()) {
        let pen = Pen::new(corpus.clone(), Comparer::Ordinal, None, false);
        prop_assert_eq!(pen.count(&[]), corpus.len() + 1);
    }

    /// Invariant 5: for a prefix that actually occurs, count/positions_of
    /// match a naive linear scan.
    #[test]
    fn occurring_prefix_matches_naive_scan(corpus in arb_corpus(), start in 0usize..40, len in 1usize..4) {
        prop_assume!(start < corpus.len());
        let end = (start + len).min(corpus.len());
        prop_assume!(end > start);
        let prefix: Vec<Token> = corpus[start..end].to_vec();

        let pen = Pen::new(corpus.clone(), Comparer::Ordinal, None, false);
        let expected: Vec<usize> = (0..=corpus.len().saturating_sub(prefix.len()))
            .filter(|&i| corpus[i..i + prefix.len()] == prefix[..])
            .collect();

        prop_assert_eq!(pen.count(&prefix), expected.len());
        let mut got = pen.positions_of(&prefix);
        got.sort_unstable();
        prop_assert_eq!(got, expected);
    }

    /// Invariant 6: a prefix that never occurs has count 0 and no positions.
    #[test]
    fn non_occurring_prefix_is_empty(corpus in arb_corpus()) {
        let pen = Pen::new(corpus, Comparer::Ordinal, None, false);
        let absent = vec![Some("zzzzz-never-present".to_string())];
        prop_assert_eq!(pen.count(&absent), 0);
        prop_assert!(pen.positions_of(&absent).is_empty());
    }

    /// Invariant 2, restated via positions_of: suffix order is monotonic —
    /// consecutive suffix-sorted positions never regress under the
    /// comparer's notion of a prefix of growing length.
    #[test]
    fn longer_prefix_range_is_nested_in_shorter_prefix_range(corpus in arb_corpus()) {
        prop_assume!(corpus.len() >= 2);
        let pen = Pen::new(corpus.clone(), Comparer::Ordinal, None, false);
        let one = vec![corpus[0].clone()];
        let two = vec![corpus[0].clone(), corpus[1].clone()];
        let (lo1, hi1) = pen.range(&one);
        let (lo2, hi2) = pen.range(&two);
        prop_assert!(lo2 >= lo1 && hi2 <= hi1);
    }
}

#[test]
fn case_insensitive_comparer_merges_differently_cased_occurrences() {
    let corpus: Vec<Token> = vec!["To", "be", "TO", "not"]
        .into_iter()
        .map(|s| Some(s.to_string()))
        .collect();
    let pen = Pen::new(corpus, Comparer::OrdinalIgnoreCase, None, false);
    assert_eq!(pen.count(&[Some("to".to_string())]), 2);
}
