//! The Pen: an immutable suffix-sorted index over a token corpus.
//!
//! A [`Pen`] answers, in `O(log C)` time, "which corpus positions have a
//! suffix starting with this query?" via a forward suffix-sorted array, and
//! keeps a second, context-sorted array to drive [`Pen::render`], a lazy
//! stream of tokens resampled from the corpus.

use std::cmp::Ordering;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use crate::comparer::Comparer;
use crate::error::PenError;
use crate::token::{Token, TokenRef};

type StoredToken = Option<Arc<str>>;

/// An immutable suffix-sorted index over a token corpus.
///
/// Construction sorts an array `P` of `C + 1` positions; every query
/// thereafter is read-only and safe to call concurrently from any number of
/// threads — `Pen` is `Send + Sync`.
#[derive(Debug, Clone)]
pub struct Pen {
    corpus: Vec<StoredToken>,
    /// `P`: a permutation of `0..=corpus.len()`, sorted by suffix-at-position.
    /// Drives `range`/`count`/`positions_of`.
    positions: Vec<usize>,
    /// A second permutation of `0..=corpus.len()`, sorted by the tokens that
    /// *precede* each position (most recent first) rather than by what
    /// follows it. `render` queries this one: picking a successor for a
    /// trailing window has to group candidates by the context that led to
    /// them, which is the opposite direction from a forward suffix sort.
    render_positions: Vec<usize>,
    comparer: Comparer,
    sentinel: Option<StoredToken>,
    interned: bool,
    all_sentinels: bool,
}

impl Pen {
    /// Builds a `Pen` over `corpus`. Construction never fails: even an empty
    /// corpus is legal.
    ///
    /// If `intern` is set, repeated token values share one allocation.
    pub fn new(corpus: Vec<Token>, comparer: Comparer, sentinel: Option<Token>, intern: bool) -> Self {
        let c = corpus.len();
        log::debug!(
            "building Pen over {c} tokens (intern={intern}, sentinel={})",
            sentinel.is_some()
        );

        let stored = if intern {
            let mut interner: HashMap<String, Arc<str>> = HashMap::new();
            corpus
                .into_iter()
                .map(|t| t.map(|s| intern_one(&mut interner, s)))
                .collect::<Vec<_>>()
        } else {
            corpus
                .into_iter()
                .map(|t| t.map(|s| Arc::from(s.as_str())))
                .collect::<Vec<_>>()
        };
        let sentinel = sentinel.map(|t| t.map(|s| Arc::from(s.as_str())));

        let mut pen = Pen {
            corpus: stored,
            positions: (0..=c).collect(),
            render_positions: (0..=c).collect(),
            comparer,
            sentinel,
            interned: intern,
            all_sentinels: false,
        };

        // Sort detached copies so the comparator closures can borrow `pen`
        // immutably while we still own the fields exclusively.
        let mut positions = std::mem::take(&mut pen.positions);
        positions.sort_unstable_by(|&a, &b| pen.suffix_cmp(a, b));
        pen.positions = positions;

        let mut render_positions = std::mem::take(&mut pen.render_positions);
        render_positions.sort_unstable_by(|&a, &b| pen.context_cmp(a, b));
        pen.render_positions = render_positions;

        pen.all_sentinels = pen
            .corpus
            .iter()
            .all(|t| pen.is_sentinel(t.as_deref()));

        log::trace!("Pen built; all_sentinels={}", pen.all_sentinels);
        pen
    }

    /// Number of tokens in the corpus (`C`).
    pub fn len(&self) -> usize {
        self.corpus.len()
    }

    /// True if the corpus is empty.
    pub fn is_empty(&self) -> bool {
        self.corpus.is_empty()
    }

    /// True iff tokens were deduplicated behind shared allocations at
    /// construction time.
    pub fn is_interned(&self) -> bool {
        self.interned
    }

    /// True iff every corpus token is equal to the configured sentinel
    /// under the comparer (vacuously true for an empty corpus). A non-empty
    /// corpus with this flag set renders the empty sequence unconditionally.
    pub fn all_sentinels(&self) -> bool {
        self.all_sentinels
    }

    /// The comparer this `Pen` was built with.
    pub fn comparer(&self) -> &Comparer {
        &self.comparer
    }

    fn corpus_token(&self, idx: usize) -> TokenRef<'_> {
        self.corpus[idx].as_deref()
    }

    fn sentinel_ref(&self) -> Option<TokenRef<'_>> {
        self.sentinel.as_ref().map(|t| t.as_deref())
    }

    fn is_sentinel(&self, t: TokenRef<'_>) -> bool {
        match self.sentinel_ref() {
            None => false,
            Some(sentinel) => self.comparer.token_eq(t, sentinel),
        }
    }

    /// Orders two tokens, applying the sentinel-sorts-first tie-break before
    /// falling back to the configured comparer.
    fn token_order(&self, a: TokenRef<'_>, b: TokenRef<'_>) -> Ordering {
        match (self.is_sentinel(a), self.is_sentinel(b)) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => self.comparer.token_cmp(a, b),
        }
    }

    /// The suffix-at-position comparator: compares `corpus[a..]` against
    /// `corpus[b..]`, with the empty suffix and proper-prefix tie-breaks.
    fn suffix_cmp(&self, a: usize, b: usize) -> Ordering {
        let c = self.corpus.len();
        let mut depth = 0usize;
        loop {
            let left = (a + depth < c).then(|| self.corpus_token(a + depth));
            let right = (b + depth < c).then(|| self.corpus_token(b + depth));
            match (left, right) {
                (None, None) => return Ordering::Equal,
                (None, Some(_)) => return Ordering::Less,
                (Some(_), None) => return Ordering::Greater,
                (Some(x), Some(y)) => {
                    let ord = self.token_order(x, y);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
            }
            depth += 1;
        }
    }

    /// Compares the suffix starting at `pos` against `prefix`, stopping at
    /// `prefix.len()` tokens. A suffix shorter than `prefix` always sorts
    /// less, matching the full suffix-at-position order.
    fn suffix_cmp_prefix(&self, pos: usize, prefix: &[TokenRef<'_>]) -> Ordering {
        let c = self.corpus.len();
        for (depth, &want) in prefix.iter().enumerate() {
            if pos + depth >= c {
                return Ordering::Less;
            }
            let have = self.corpus_token(pos + depth);
            let ord = self.token_order(have, want);
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }

    /// The half-open interval `[lo, hi)` into `positions` whose suffixes all
    /// start with `prefix`.
    fn range_raw(&self, prefix: &[TokenRef<'_>]) -> (usize, usize) {
        let lo = self
            .positions
            .partition_point(|&p| self.suffix_cmp_prefix(p, prefix) == Ordering::Less);
        let hi = self
            .positions
            .partition_point(|&p| self.suffix_cmp_prefix(p, prefix) != Ordering::Greater);
        (lo, hi)
    }

    /// The backward-context comparator: compares the tokens immediately
    /// preceding `a` against those preceding `b`, walking toward the start
    /// of the corpus. Mirrors `suffix_cmp` with the walk direction reversed;
    /// position `0` has no predecessor and sorts like an empty suffix does
    /// in `suffix_cmp`.
    fn context_cmp(&self, a: usize, b: usize) -> Ordering {
        let mut depth = 0usize;
        loop {
            let left = (depth < a).then(|| self.corpus_token(a - 1 - depth));
            let right = (depth < b).then(|| self.corpus_token(b - 1 - depth));
            match (left, right) {
                (None, None) => return Ordering::Equal,
                (None, Some(_)) => return Ordering::Less,
                (Some(_), None) => return Ordering::Greater,
                (Some(x), Some(y)) => {
                    let ord = self.token_order(x, y);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
            }
            depth += 1;
        }
    }

    /// Compares the context preceding `pos` against `recent`, where
    /// `recent[0]` is the token immediately before `pos`, `recent[1]` the
    /// one before that, and so on — most-recent-first, the reverse of
    /// `suffix_cmp_prefix`'s forward reading.
    fn context_cmp_prefix(&self, pos: usize, recent: &[TokenRef<'_>]) -> Ordering {
        for (depth, &want) in recent.iter().enumerate() {
            if depth >= pos {
                return Ordering::Less;
            }
            let have = self.corpus_token(pos - 1 - depth);
            let ord = self.token_order(have, want);
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }

    /// The half-open interval `[lo, hi)` into `render_positions` whose
    /// preceding context starts (most-recent-first) with `recent`.
    fn range_rev_raw(&self, recent: &[TokenRef<'_>]) -> (usize, usize) {
        let lo = self
            .render_positions
            .partition_point(|&p| self.context_cmp_prefix(p, recent) == Ordering::Less);
        let hi = self
            .render_positions
            .partition_point(|&p| self.context_cmp_prefix(p, recent) != Ordering::Greater);
        (lo, hi)
    }

    fn as_refs<'a>(prefix: &'a [Token]) -> Vec<TokenRef<'a>> {
        prefix.iter().map(|t| t.as_deref()).collect()
    }

    /// The half-open `[lo, hi)` range into `positions` (not corpus
    /// positions) of suffixes starting with `prefix`. `k = 0` yields the
    /// full range `[0, C + 1)`.
    pub fn range(&self, prefix: &[Token]) -> (usize, usize) {
        let refs = Self::as_refs(prefix);
        self.range_raw(&refs)
    }

    /// Number of corpus positions whose suffix starts with `prefix`.
    pub fn count(&self, prefix: &[Token]) -> usize {
        let (lo, hi) = self.range(prefix);
        hi - lo
    }

    /// Corpus positions whose suffix starts with `prefix`, in suffix-sorted
    /// order. Returns `C` itself when `prefix` is empty and matches the
    /// past-the-end marker.
    pub fn positions_of(&self, prefix: &[Token]) -> Vec<usize> {
        let (lo, hi) = self.range(prefix);
        self.positions[lo..hi].to_vec()
    }

    /// Builds a lazy render stream. `n` is the maximum suffix length
    /// considered; `picker(m)` must return a value in `[0, max(m, 1))` each
    /// time it is called during enumeration.
    ///
    /// Each step queries `render_positions` for the corpus positions whose
    /// *preceding* context matches the current trailing window, picks one
    /// via `picker`, and emits the token found there directly (see
    /// DESIGN.md for why this must be a context-ordered query rather than
    /// the same forward-suffix order `count`/`positions_of` use). Rendering
    /// terminates when `picker` selects the past-the-end position or when
    /// the picked token equals the configured sentinel.
    ///
    /// Negative `n` is rejected eagerly — this is a plain bounds check, not
    /// enumeration work, so there is no reason to defer it (see DESIGN.md).
    /// A `picker` that returns an out-of-range value surfaces as an `Err`
    /// from the returned iterator's `next()`.
    pub fn render<F>(&self, n: i64, picker: F) -> Result<Render<'_, F>, PenError>
    where
        F: FnMut(usize) -> usize,
    {
        if n < 0 {
            return Err(PenError::InvalidN { n });
        }
        Ok(Render {
            pen: self,
            n: n as usize,
            picker,
            suffix: VecDeque::with_capacity(n as usize),
            state: RenderState::Active,
        })
    }
}

fn intern_one(interner: &mut HashMap<String, Arc<str>>, s: String) -> Arc<str> {
    if let Some(existing) = interner.get(s.as_str()) {
        return existing.clone();
    }
    let arc: Arc<str> = Arc::from(s.as_str());
    interner.insert(s, arc.clone());
    arc
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RenderState {
    Active,
    Terminated,
}

/// The lazy token stream returned by [`Pen::render`]. Implements
/// [`Iterator`] over `Result<Token, PenError>`; once it yields `None` or an
/// `Err`, it is terminated and yields nothing further.
pub struct Render<'a, F> {
    pen: &'a Pen,
    n: usize,
    picker: F,
    suffix: VecDeque<StoredToken>,
    state: RenderState,
}

impl<'a, F> Iterator for Render<'a, F>
where
    F: FnMut(usize) -> usize,
{
    type Item = Result<Token, PenError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state == RenderState::Terminated {
            return None;
        }

        // Most-recent-first: `recent[0]` must equal the token immediately
        // before the candidate position, matching `context_cmp_prefix`.
        let recent: Vec<TokenRef<'_>> = self.suffix.iter().rev().map(|t| t.as_deref()).collect();
        let (lo, hi) = self.pen.range_rev_raw(&recent);
        let m = hi - lo;
        debug_assert!(m >= 1, "a window built from real emissions always matches somewhere");

        let bound = m.max(1);
        let r = (self.picker)(m);
        if r >= bound {
            self.state = RenderState::Terminated;
            return Some(Err(PenError::PickerOutOfRange { n: m, returned: r }));
        }

        let picked = self.pen.render_positions[lo + r];
        if picked == self.pen.corpus.len() {
            self.state = RenderState::Terminated;
            log::trace!("render terminated: past-the-end position picked");
            return None;
        }

        let candidate = self.pen.corpus_token(picked);
        if self.pen.is_sentinel(candidate) {
            self.state = RenderState::Terminated;
            log::trace!("render terminated: sentinel token picked");
            return None;
        }

        let emitted: Token = candidate.map(|s| s.to_string());
        self.suffix.push_back(self.pen.corpus[picked].clone());
        if self.suffix.len() > self.n {
            self.suffix.pop_front();
        }
        Some(Ok(emitted))
    }
}

/// Ergonomic construction for [`Pen`] when comparer, sentinel, and interning
/// aren't all known at a single call site. Purely additive sugar over
/// [`Pen::new`].
#[derive(Debug, Clone)]
pub struct PenBuilder {
    corpus: Vec<Token>,
    comparer: Comparer,
    sentinel: Option<Token>,
    intern: bool,
}

impl PenBuilder {
    /// Starts a builder with the ordinal comparer, no sentinel, and no
    /// interning — override any of those with the other methods.
    pub fn new(corpus: Vec<Token>) -> Self {
        Self {
            corpus,
            comparer: Comparer::Ordinal,
            sentinel: None,
            intern: false,
        }
    }

    pub fn comparer(mut self, comparer: Comparer) -> Self {
        self.comparer = comparer;
        self
    }

    pub fn sentinel(mut self, sentinel: Token) -> Self {
        self.sentinel = Some(sentinel);
        self
    }

    pub fn intern(mut self, intern: bool) -> Self {
        self.intern = intern;
        self
    }

    pub fn build(self) -> Pen {
        Pen::new(self.corpus, self.comparer, self.sentinel, self.intern)
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::*;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Wire format for a `Pen`. Deserialization trusts these invariants and
    /// does not re-sort.
    #[derive(Serialize, Deserialize)]
    struct PenWire {
        interned: bool,
        comparer: Comparer,
        positions: Vec<usize>,
        render_positions: Vec<usize>,
        corpus: Vec<Token>,
        sentinel: Option<Token>,
        all_sentinels: bool,
    }

    impl Serialize for Pen {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let wire = PenWire {
                interned: self.interned,
                comparer: self.comparer.clone(),
                positions: self.positions.clone(),
                render_positions: self.render_positions.clone(),
                corpus: self
                    .corpus
                    .iter()
                    .map(|t| t.as_deref().map(|s| s.to_string()))
                    .collect(),
                sentinel: self
                    .sentinel
                    .as_ref()
                    .map(|t| t.as_deref().map(|s| s.to_string())),
                all_sentinels: self.all_sentinels,
            };
            wire.serialize(serializer)
        }
    }

    impl<'de> Deserialize<'de> for Pen {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let wire = PenWire::deserialize(deserializer)?;
            Ok(Pen {
                corpus: wire
                    .corpus
                    .into_iter()
                    .map(|t| t.map(|s| Arc::from(s.as_str())))
                    .collect(),
                positions: wire.positions,
                render_positions: wire.render_positions,
                comparer: wire.comparer,
                sentinel: wire.sentinel.map(|t| t.map(|s| Arc::from(s.as_str()))),
                interned: wire.interned,
                all_sentinels: wire.all_sentinels,
            })
        }
    }
}
