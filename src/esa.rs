// mumr: Find maximal unique matches with an enhanced suffix array
//
// Copyright 2025 mumr contributors.

// Copyrights in this project are retained by contributors. No copyright assignment
// is required to contribute to this project.

// Except as otherwise noted (below and/or in individual files), this
// project is licensed under the Apache License, Version 2.0
// <LICENSE-APACHE> or <http://www.apache.org/licenses/LICENSE-2.0> or
// the MIT license, <LICENSE-MIT> or <http://opensource.org/licenses/MIT>,
// at your option.
//
//! The enhanced suffix array over the reference text.
//!
//! An [Esa] bundles the suffix array, the LCP array and the child table
//! of Abouelhoda, Kurtz & Ohlebusch (2004), which together support the
//! same top-down traversals as a suffix tree in linear space. A small
//! precomputed lookup table resolves the first few characters of every
//! query in a single read.
//!
//! The only query operation is [Esa::get_match_cached]: given a query
//! suffix it returns the lcp-interval of the longest prefix of the query
//! that occurs anywhere in the reference.

use crate::error::Error;
use crate::sequence::bases_match;

/// Characters resolved through the prefix lookup table by default. The
/// table has `4^k` entries, so 10 costs 12 MB and is a good trade for
/// genome-sized references.
const DEFAULT_PREFIX_PRECALC: usize = 10;

const CODE_TO_BASE: [u8; 4] = [b'A', b'C', b'G', b'T'];

// Below 'A' and distinct from the normalized alphabet; only ever
// appended for suffix sorting, never stored.
const SENTINEL: u8 = b'$';

/// Parameters for index construction.
#[derive(Clone, Debug)]
pub struct BuildOpts {
    /// Depth of the precomputed prefix lookup table; 0 disables it.
    pub prefix_precalc: usize,
}
// Defaults
impl Default for BuildOpts {
    fn default() -> BuildOpts {
        BuildOpts {
            prefix_precalc: DEFAULT_PREFIX_PRECALC,
        }
    }
}

/// An lcp-interval: the suffixes at suffix array positions `i..=j` share
/// a prefix of length `l`.
///
/// A singleton interval (`i == j`) means the prefix occurs exactly once
/// in the reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LcpInterval {
    pub i: i32,
    pub j: i32,
    pub l: i32,
}

impl LcpInterval {
    const EMPTY: LcpInterval = LcpInterval { i: -1, j: -1, l: 0 };

    pub fn is_singleton(&self) -> bool {
        self.i == self.j
    }

    fn is_empty(&self) -> bool {
        self.i < 0
    }
}

/// The enhanced suffix array.
///
/// Borrows the reference text and owns the derived arrays. Construction
/// is the only mutating phase; afterwards the index is read-only and can
/// be shared freely between worker threads.
pub struct Esa<'a> {
    text: &'a [u8],
    /// Lexicographic permutation of the suffix start positions.
    sa: Vec<i32>,
    /// `lcp[i]` is the longest common prefix of the suffixes at ranks
    /// `i - 1` and `i`; `lcp[0]` and `lcp[n]` hold -1 sentinels.
    lcp: Vec<i32>,
    /// Child table with the up, down and next-l-index fields folded into
    /// one slot per rank.
    child: Vec<i32>,
    /// Lookup table from 2-bit encoded prefixes of length
    /// `prefix_precalc` to the interval of their longest matching prefix.
    cache: Vec<LcpInterval>,
    prefix_precalc: usize,
}

impl<'a> Esa<'a> {
    /// Builds the index over `text`.
    ///
    /// `text` must be normalized (see [crate::sequence]) and non-empty.
    /// Fails with [Error::AllocationFailed] if the arrays cannot be
    /// reserved; the caller reports any failure as a fatal index build
    /// error.
    pub fn new(text: &'a [u8], opts: &BuildOpts) -> Result<Esa<'a>, Error> {
        if text.is_empty() {
            return Err(Error::InvalidInput(
                "cannot index an empty sequence".to_string(),
            ));
        }

        let sa = build_sa(text)?;
        let lcp = build_lcp(text, &sa)?;
        let child = build_child_table(&lcp)?;

        let mut esa = Esa {
            text,
            sa,
            lcp,
            child,
            cache: Vec::new(),
            prefix_precalc: opts.prefix_precalc,
        };
        esa.fill_cache()?;

        Ok(esa)
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn text(&self) -> &'a [u8] {
        self.text
    }

    /// Start position in the text of the suffix with rank `rank`.
    pub fn suffix_position(&self, rank: i32) -> usize {
        self.sa[rank as usize] as usize
    }

    /// Longest prefix of `query` that occurs in the reference, resolved
    /// through the prefix lookup table.
    ///
    /// Returns the lcp-interval `(i, j, l)` of that prefix: `l` is its
    /// length and `i..=j` the suffix array ranks it covers, so `i == j`
    /// says the prefix is unique in the reference.
    ///
    /// The table consumes the first `prefix_precalc` characters in one
    /// read when the query is long enough and free of `N`; a table entry
    /// that already ends short of the full prefix is returned as is,
    /// because the query cannot match past it either.
    pub fn get_match_cached(&self, query: &[u8]) -> LcpInterval {
        let k = self.prefix_precalc;
        if k == 0 || query.len() < k {
            return self.get_match(query);
        }

        let mut code = 0usize;
        for &b in &query[..k] {
            let c = match b {
                b'A' => 0,
                b'C' => 1,
                b'G' => 2,
                b'T' => 3,
                _ => return self.get_match(query),
            };
            code = (code << 2) | c;
        }

        let inter = self.cache[code];
        if inter.is_empty() {
            return self.get_match(query);
        }
        if (inter.l as usize) < k {
            // The table prefix itself only matches up to inter.l, so the
            // query stops there too.
            return inter;
        }

        self.match_from(inter.i, inter.j, k, query)
    }

    /// Longest matching prefix of `query` by a plain descent from the
    /// root interval.
    pub fn get_match(&self, query: &[u8]) -> LcpInterval {
        self.match_from(0, self.text.len() as i32 - 1, 0, query)
    }

    /// The interval walk: starting from the interval `i..=j` of which the
    /// first `l` query characters are already known to match, extend the
    /// match as far as possible.
    fn match_from(&self, mut i: i32, mut j: i32, mut l: usize, query: &[u8]) -> LcpInterval {
        let n = self.text.len();
        let qlen = query.len();

        loop {
            if i == j {
                // Unique suffix: extend by direct comparison.
                let p = self.sa[i as usize] as usize;
                while l < qlen && p + l < n && bases_match(self.text[p + l], query[l]) {
                    l += 1;
                }
                return LcpInterval { i, j, l: l as i32 };
            }

            let d = self.interval_lcp(i, j) as usize;
            if l < d {
                // Inside the edge leading into this interval: all member
                // suffixes agree up to d, compare against the first one.
                let p = self.sa[i as usize] as usize;
                let stop = d.min(qlen);
                while l < stop && bases_match(self.text[p + l], query[l]) {
                    l += 1;
                }
                if l < stop {
                    return LcpInterval { i, j, l: l as i32 };
                }
            }
            if l == qlen {
                return LcpInterval { i, j, l: l as i32 };
            }

            match self.child_interval(i, j, d as i32, query[l]) {
                Some((ci, cj)) => {
                    i = ci;
                    j = cj;
                    l += 1;
                }
                None => return LcpInterval { i, j, l: l as i32 },
            }
        }
    }

    /// First l-index of the non-singleton interval `i..=j`.
    ///
    /// `child[j]` holds the up value of `j + 1` exactly when it points
    /// into `(i, j]`; otherwise the down value at `i` applies.
    fn first_l_index(&self, i: i32, j: i32) -> i32 {
        let k = self.child[j as usize];
        if k > i && k <= j {
            k
        } else {
            self.child[i as usize]
        }
    }

    /// The lcp value of the non-singleton interval `i..=j`.
    fn interval_lcp(&self, i: i32, j: i32) -> i32 {
        self.lcp[self.first_l_index(i, j) as usize]
    }

    /// Child of `i..=j` whose edge starts with character `c` at offset
    /// `d`, the lcp value of `i..=j`. Child boundaries are the l-indices,
    /// chained through the child table in constant time per child.
    fn child_interval(&self, i: i32, j: i32, d: i32, c: u8) -> Option<(i32, i32)> {
        let n = self.text.len();
        let mut p = i;
        let mut li = self.first_l_index(i, j);

        loop {
            let pos = self.sa[p as usize] as usize + d as usize;
            if pos < n && bases_match(self.text[pos], c) {
                return Some((p, li - 1));
            }
            p = li;
            let nx = self.child[li as usize];
            if nx > li && nx <= j && self.lcp[nx as usize] == d {
                li = nx;
            } else {
                break;
            }
        }

        let pos = self.sa[p as usize] as usize + d as usize;
        if pos < n && bases_match(self.text[pos], c) {
            return Some((p, j));
        }
        None
    }

    /// All child intervals of the non-singleton interval `i..=j`, in
    /// left-to-right order.
    #[cfg(test)]
    fn children(&self, i: i32, j: i32) -> Vec<(i32, i32)> {
        let d = self.interval_lcp(i, j);
        let mut out = Vec::new();
        let mut p = i;
        let mut li = self.first_l_index(i, j);

        loop {
            out.push((p, li - 1));
            p = li;
            let nx = self.child[li as usize];
            if nx > li && nx <= j && self.lcp[nx as usize] == d {
                li = nx;
            } else {
                break;
            }
        }
        out.push((p, j));

        out
    }

    /// Extends a partial match state by exactly one character. Used by
    /// the cache construction, which walks the index character by
    /// character instead of edge by edge.
    fn extend_one(&self, cur: LcpInterval, c: u8) -> Option<LcpInterval> {
        let n = self.text.len();
        let l = cur.l as usize;

        if cur.is_singleton() {
            let p = self.sa[cur.i as usize] as usize;
            if p + l < n && bases_match(self.text[p + l], c) {
                return Some(LcpInterval { l: cur.l + 1, ..cur });
            }
            return None;
        }

        let d = self.interval_lcp(cur.i, cur.j) as usize;
        if l < d {
            let p = self.sa[cur.i as usize] as usize;
            if bases_match(self.text[p + l], c) {
                return Some(LcpInterval { l: cur.l + 1, ..cur });
            }
            return None;
        }

        self.child_interval(cur.i, cur.j, d as i32, c)
            .map(|(ci, cj)| LcpInterval {
                i: ci,
                j: cj,
                l: cur.l + 1,
            })
    }

    /// Precomputes the interval of every ACGT prefix of length
    /// `prefix_precalc` by one depth-first walk over the top of the
    /// index.
    fn fill_cache(&mut self) -> Result<(), Error> {
        let k = self.prefix_precalc;
        if k == 0 {
            return Ok(());
        }

        let size = 1usize << (2 * k);
        let mut cache = Vec::new();
        cache
            .try_reserve_exact(size)
            .map_err(|_| Error::AllocationFailed)?;
        cache.resize(size, LcpInterval::EMPTY);
        self.cache = cache;

        let root = LcpInterval {
            i: 0,
            j: self.text.len() as i32 - 1,
            l: 0,
        };
        self.cache_dfs(0, 0, root);

        Ok(())
    }

    fn cache_dfs(&mut self, code: usize, depth: usize, state: LcpInterval) {
        if depth == self.prefix_precalc {
            self.cache[code] = state;
            return;
        }

        for c in 0..4usize {
            let sub = (code << 2) | c;
            match self.extend_one(state, CODE_TO_BASE[c]) {
                Some(next) => self.cache_dfs(sub, depth + 1, next),
                None => {
                    // Every longer prefix on this dead branch shares the
                    // same longest-matching-prefix interval. Depth 0 means
                    // the first character never occurs at all.
                    let fill = if depth == 0 { LcpInterval::EMPTY } else { state };
                    let shift = 2 * (self.prefix_precalc - depth - 1);
                    let lo = sub << shift;
                    let hi = lo + (1usize << shift);
                    self.cache[lo..hi].fill(fill);
                }
            }
        }
    }
}

/// Sorts the suffixes of `text`.
///
/// Delegates to the SAIS implementation in the `bio` crate, which needs a
/// unique smallest sentinel at the end of the text; the sentinel row is
/// dropped again so the result covers exactly the suffixes of `text` in
/// raw byte order.
fn build_sa(text: &[u8]) -> Result<Vec<i32>, Error> {
    use bio::data_structures::suffix_array::suffix_array;

    let n = text.len();

    let mut terminated = Vec::new();
    terminated
        .try_reserve_exact(n + 1)
        .map_err(|_| Error::AllocationFailed)?;
    terminated.extend_from_slice(text);
    terminated.push(SENTINEL);

    let raw = suffix_array(&terminated);
    debug_assert_eq!(raw[0], n);

    let mut sa = Vec::new();
    sa.try_reserve_exact(n).map_err(|_| Error::AllocationFailed)?;
    sa.extend(raw[1..].iter().map(|&p| p as i32));

    Ok(sa)
}

/// Builds the LCP array with the linear-time algorithm of Kasai et al.
///
/// The inverse permutation is only needed during construction and is
/// dropped when this returns. `lcp[0]` and `lcp[n]` carry -1 sentinels so
/// interval walks terminate without bounds checks.
fn build_lcp(text: &[u8], sa: &[i32]) -> Result<Vec<i32>, Error> {
    let n = text.len();

    let mut lcp = Vec::new();
    lcp.try_reserve_exact(n + 1)
        .map_err(|_| Error::AllocationFailed)?;
    lcp.resize(n + 1, 0);
    lcp[0] = -1;
    lcp[n] = -1;

    let mut isa = Vec::new();
    isa.try_reserve_exact(n)
        .map_err(|_| Error::AllocationFailed)?;
    isa.resize(n, 0i32);
    for (rank, &pos) in sa.iter().enumerate() {
        isa[pos as usize] = rank as i32;
    }

    let mut h: usize = 0;
    for i in 0..n {
        let rank = isa[i] as usize;
        if rank > 0 {
            let j = sa[rank - 1] as usize;
            while i + h < n && j + h < n && text[i + h] == text[j + h] {
                h += 1;
            }
            lcp[rank] = h as i32;
            h = h.saturating_sub(1);
        } else {
            h = 0;
        }
    }

    Ok(lcp)
}

/// Builds the child table in two linear passes over the LCP array.
///
/// The first pass computes the up and down fields with a stack that is
/// monotone in the lcp value, the second pass chains the l-indices of
/// each interval. All three fields share one array: at most one of them
/// is needed per slot, and the interval walks above know which one they
/// are looking at.
fn build_child_table(lcp: &[i32]) -> Result<Vec<i32>, Error> {
    let n = lcp.len() - 1;

    let mut child = Vec::new();
    child
        .try_reserve_exact(n)
        .map_err(|_| Error::AllocationFailed)?;
    child.resize(n, 0i32);
    if n == 0 {
        return Ok(child);
    }

    // up and down pass
    let mut stack: Vec<i32> = Vec::with_capacity(64);
    stack.push(0);
    let mut last: i32 = -1;
    for k in 1..=n {
        while lcp[k] < lcp[*stack.last().unwrap() as usize] {
            last = stack.pop().unwrap();
            let top = *stack.last().unwrap();
            if lcp[k] <= lcp[top as usize] && lcp[top as usize] != lcp[last as usize] {
                child[top as usize] = last; // down
            }
        }
        if last >= 0 {
            child[k - 1] = last; // up
            last = -1;
        }
        stack.push(k as i32);
    }

    // next l-index pass
    stack.clear();
    stack.push(0);
    for k in 1..=n {
        while lcp[k] < lcp[*stack.last().unwrap() as usize] {
            stack.pop();
        }
        if let Some(&top) = stack.last() {
            if lcp[k] == lcp[top as usize] {
                stack.pop();
                child[top as usize] = k as i32; // next l-index
            }
        }
        stack.push(k as i32);
    }

    Ok(child)
}

////////////////////////////////////////////////////////////////////////////////
// Tests
//
#[cfg(test)]
mod tests {
    use super::*;

    const TEXTS: &[&[u8]] = &[
        b"ACGTACGTACGTACGT",
        b"AAAACGTAAAA",
        b"ACACACAC",
        b"GTGTGACGTNNACGTACCCCGT",
        b"A",
        b"AT",
        b"AAAAAAAAAA",
        b"ACGGTCACGGGTTTACGGTCAAAGGCCTTATATATGCGGCCTAACGCGT",
        b"TTTTACGTAGCAGCAGGGGGTACCACGTTTTT",
    ];

    const QUERIES: &[&[u8]] = &[
        b"ACGT",
        b"TTTTTTT",
        b"GACGTACCC",
        b"CGTAA",
        b"N",
        b"ANA",
        b"ACGTACGTACGTACGTACGT",
        b"CCCC",
        b"G",
        b"TATATAT",
        b"GGCCTAACG",
    ];

    fn small_opts() -> BuildOpts {
        BuildOpts { prefix_precalc: 3 }
    }

    fn naive_lcp(a: &[u8], b: &[u8]) -> usize {
        a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
    }

    // Longest prefix of query that occurs in text under the matching
    // rules, together with its occurrence count.
    fn naive_longest_match(text: &[u8], query: &[u8]) -> (usize, usize) {
        let mut best = 0;
        for start in 0..text.len() {
            let mut l = 0;
            while start + l < text.len()
                && l < query.len()
                && bases_match(text[start + l], query[l])
            {
                l += 1;
            }
            best = best.max(l);
        }
        if best == 0 {
            return (0, 0);
        }
        let count = text.windows(best).filter(|w| *w == &query[..best]).count();
        (best, count)
    }

    fn collect_leaves(esa: &Esa, i: i32, j: i32, out: &mut Vec<i32>) {
        if i == j {
            out.push(i);
            return;
        }
        for (p, q) in esa.children(i, j) {
            collect_leaves(esa, p, q, out);
        }
    }

    #[test]
    fn suffix_array_is_a_permutation() {
        for text in TEXTS {
            let esa = Esa::new(text, &small_opts()).unwrap();
            let mut sorted = esa.sa.clone();
            sorted.sort_unstable();
            let expected: Vec<i32> = (0..text.len() as i32).collect();
            assert_eq!(sorted, expected, "text {:?}", text);
        }
    }

    #[test]
    fn suffix_array_is_sorted() {
        for text in TEXTS {
            let esa = Esa::new(text, &small_opts()).unwrap();
            for w in esa.sa.windows(2) {
                assert!(
                    text[w[0] as usize..] < text[w[1] as usize..],
                    "suffixes {} and {} out of order for {:?}",
                    w[0],
                    w[1],
                    text
                );
            }
        }
    }

    #[test]
    fn lcp_matches_naive_computation() {
        for text in TEXTS {
            let esa = Esa::new(text, &small_opts()).unwrap();
            let n = text.len();
            assert_eq!(esa.lcp[0], -1);
            assert_eq!(esa.lcp[n], -1);
            for rank in 1..n {
                let a = &text[esa.sa[rank - 1] as usize..];
                let b = &text[esa.sa[rank] as usize..];
                assert_eq!(
                    esa.lcp[rank] as usize,
                    naive_lcp(a, b),
                    "rank {} of {:?}",
                    rank,
                    text
                );
            }
        }
    }

    #[test]
    fn child_table_reaches_every_suffix_once() {
        for text in TEXTS {
            let esa = Esa::new(text, &small_opts()).unwrap();
            let mut leaves = Vec::new();
            collect_leaves(&esa, 0, text.len() as i32 - 1, &mut leaves);
            // A depth-first walk enumerates the ranks in order.
            let expected: Vec<i32> = (0..text.len() as i32).collect();
            assert_eq!(leaves, expected, "text {:?}", text);
        }
    }

    #[test]
    fn cache_agrees_with_root_descent() {
        let k = 3;
        for text in TEXTS {
            let esa = Esa::new(text, &BuildOpts { prefix_precalc: k }).unwrap();
            for code in 0..(1usize << (2 * k)) {
                let mut w = Vec::with_capacity(k);
                for shift in (0..k).rev() {
                    w.push(CODE_TO_BASE[(code >> (2 * shift)) & 3]);
                }
                let expected = esa.get_match(&w);
                let entry = esa.cache[code];
                if entry.is_empty() {
                    assert_eq!(expected.l, 0, "kmer {:?} of {:?}", w, text);
                } else {
                    assert_eq!(entry, expected, "kmer {:?} of {:?}", w, text);
                }
            }
        }
    }

    #[test]
    fn match_engine_finds_longest_prefix() {
        for text in TEXTS {
            let esa = Esa::new(text, &small_opts()).unwrap();
            for query in QUERIES {
                let got = esa.get_match_cached(query);
                let (best, count) = naive_longest_match(text, query);
                assert_eq!(
                    got.l as usize, best,
                    "length for query {:?} against {:?}",
                    query, text
                );
                if best > 0 {
                    assert_eq!(
                        (got.j - got.i + 1) as usize,
                        count,
                        "interval width for query {:?} against {:?}",
                        query,
                        text
                    );
                    let p = esa.suffix_position(got.i);
                    assert_eq!(&text[p..p + best], &query[..best]);
                }
            }
        }
    }

    #[test]
    fn cached_and_plain_matching_agree() {
        for text in TEXTS {
            let cached = Esa::new(text, &BuildOpts { prefix_precalc: 4 }).unwrap();
            let plain = Esa::new(text, &BuildOpts { prefix_precalc: 0 }).unwrap();
            for query in QUERIES {
                assert_eq!(
                    cached.get_match_cached(query),
                    plain.get_match_cached(query),
                    "query {:?} against {:?}",
                    query,
                    text
                );
            }
        }
    }

    #[test]
    fn matching_never_crosses_an_n() {
        let esa = Esa::new(b"ACGNACGT", &small_opts()).unwrap();
        // The query N does not even match the reference N.
        let inter = esa.get_match_cached(b"ACGNA");
        assert_eq!(inter.l, 3);
        let inter = esa.get_match_cached(b"NNN");
        assert_eq!(inter.l, 0);
    }

    #[test]
    fn singleton_interval_means_unique() {
        let esa = Esa::new(b"AAAACGTAAAA", &small_opts()).unwrap();
        let unique = esa.get_match_cached(b"CGT");
        assert!(unique.is_singleton());
        assert_eq!(unique.l, 3);
        assert_eq!(esa.suffix_position(unique.i), 4);

        let repeated = esa.get_match_cached(b"AAA");
        assert!(!repeated.is_singleton());
        assert_eq!(repeated.l, 3);
    }

    #[test]
    fn empty_text_is_rejected() {
        assert!(Esa::new(b"", &small_opts()).is_err());
    }
}
