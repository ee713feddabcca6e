// src/symbols/similarity.rs
//! Weighted-ratio string similarity for fuzzy company name matching.
//!
//! Scores are on a 0-100 scale. The building block is the normalized Indel
//! similarity (`2 * LCS / (len1 + len2)`); on top of it sit the token-aware
//! variants (sorted tokens, token sets) and the partial variants that align the
//! shorter string against windows of the longer one. `weighted_ratio` picks the
//! best of them, scaled down by how different the two lengths are.

use std::collections::{BTreeSet, HashSet};

const UNBASE_SCALE: f64 = 0.95;

/// Row buffers for the LCS table, reused across the many windows a partial
/// alignment scores.
#[derive(Debug, Default)]
struct LcsRows {
    prev: Vec<usize>,
    cur: Vec<usize>,
}

impl LcsRows {
    /// Length of the longest common subsequence of two char slices.
    fn lcs_len(&mut self, a: &[char], b: &[char]) -> usize {
        if a.is_empty() || b.is_empty() {
            return 0;
        }
        self.prev.clear();
        self.prev.resize(b.len() + 1, 0);
        self.cur.clear();
        self.cur.resize(b.len() + 1, 0);
        for &ca in a {
            for (j, &cb) in b.iter().enumerate() {
                self.cur[j + 1] = if ca == cb {
                    self.prev[j] + 1
                } else {
                    self.cur[j].max(self.prev[j + 1])
                };
            }
            std::mem::swap(&mut self.prev, &mut self.cur);
        }
        self.prev[b.len()]
    }

    fn indel_distance(&mut self, a: &[char], b: &[char]) -> usize {
        a.len() + b.len() - 2 * self.lcs_len(a, b)
    }

    fn ratio(&mut self, a: &[char], b: &[char]) -> f64 {
        normalized(self.indel_distance(a, b), a.len() + b.len())
    }
}

fn normalized(distance: usize, lensum: usize) -> f64 {
    if lensum == 0 {
        return 100.0;
    }
    100.0 * (1.0 - distance as f64 / lensum as f64)
}

fn chars(s: &str) -> Vec<char> {
    s.chars().collect()
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Plain normalized Indel similarity.
pub fn ratio(s1: &str, s2: &str) -> f64 {
    LcsRows::default().ratio(&chars(s1), &chars(s2))
}

pub fn token_sort_ratio(s1: &str, s2: &str) -> f64 {
    ratio(&sorted_tokens(s1), &sorted_tokens(s2))
}

/// Compares the shared tokens plus each side's leftovers, so extra words on one
/// side do not drag the score down.
pub fn token_set_ratio(s1: &str, s2: &str) -> f64 {
    let a: BTreeSet<&str> = s1.split_whitespace().collect();
    let b: BTreeSet<&str> = s2.split_whitespace().collect();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let intersection: Vec<&str> = a.intersection(&b).copied().collect();
    let diff_ab: Vec<&str> = a.difference(&b).copied().collect();
    let diff_ba: Vec<&str> = b.difference(&a).copied().collect();

    if !intersection.is_empty() && (diff_ab.is_empty() || diff_ba.is_empty()) {
        return 100.0;
    }

    let diff_ab_joined = chars(&diff_ab.join(" "));
    let diff_ba_joined = chars(&diff_ba.join(" "));
    let ab_len = diff_ab_joined.len();
    let ba_len = diff_ba_joined.len();
    let sect_len = intersection.join(" ").chars().count();

    // one extra space joins the intersection to the leftovers
    let sep = usize::from(sect_len != 0);
    let sect_ab_len = sect_len + sep + ab_len;
    let sect_ba_len = sect_len + sep + ba_len;

    let result = normalized(
        LcsRows::default().indel_distance(&diff_ab_joined, &diff_ba_joined),
        sect_ab_len + sect_ba_len,
    );
    if sect_len == 0 {
        return result;
    }

    let sect_ab_ratio = normalized(sep + ab_len, sect_len + sect_ab_len);
    let sect_ba_ratio = normalized(sep + ba_len, sect_len + sect_ba_len);
    result.max(sect_ab_ratio).max(sect_ba_ratio)
}

pub fn token_ratio(s1: &str, s2: &str) -> f64 {
    token_sort_ratio(s1, s2).max(token_set_ratio(s1, s2))
}

/// Best alignment of `needle` against prefixes, full-width windows and suffixes
/// of `haystack`. Windows whose boundary char is absent from the needle are skipped.
fn partial_short_needle(needle: &[char], haystack: &[char], rows: &mut LcsRows) -> f64 {
    let n = needle.len();
    let m = haystack.len();
    let needle_chars: HashSet<char> = needle.iter().copied().collect();
    let mut best = 0.0_f64;

    for i in 1..n {
        if !needle_chars.contains(&haystack[i - 1]) {
            continue;
        }
        best = best.max(rows.ratio(needle, &haystack[..i]));
        if best >= 100.0 {
            return 100.0;
        }
    }

    for i in 0..(m - n) {
        if !needle_chars.contains(&haystack[i]) {
            continue;
        }
        best = best.max(rows.ratio(needle, &haystack[i..i + n]));
        if best >= 100.0 {
            return 100.0;
        }
    }

    for i in (m - n)..m {
        if !needle_chars.contains(&haystack[i]) {
            continue;
        }
        best = best.max(rows.ratio(needle, &haystack[i..]));
        if best >= 100.0 {
            return 100.0;
        }
    }

    best
}

pub fn partial_ratio(s1: &str, s2: &str) -> f64 {
    let a = chars(s1);
    let b = chars(s2);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let (short, long) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };
    let mut rows = LcsRows::default();
    let mut best = partial_short_needle(short, long, &mut rows);
    if a.len() == b.len() && best < 100.0 {
        best = best.max(partial_short_needle(long, short, &mut rows));
    }
    best
}

pub fn partial_token_ratio(s1: &str, s2: &str) -> f64 {
    let a: BTreeSet<&str> = s1.split_whitespace().collect();
    let b: BTreeSet<&str> = s2.split_whitespace().collect();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a.intersection(&b).next().is_some() {
        return 100.0;
    }
    partial_ratio(&sorted_tokens(s1), &sorted_tokens(s2))
}

/// Weighted ratio: the best of the plain, token and partial scores, with partial
/// scores penalised more as the length difference grows.
pub fn weighted_ratio(s1: &str, s2: &str) -> f64 {
    if s1.is_empty() || s2.is_empty() {
        return 0.0;
    }

    let len1 = s1.chars().count();
    let len2 = s2.chars().count();
    let len_ratio = len1.max(len2) as f64 / len1.min(len2) as f64;

    let end_ratio = ratio(s1, s2);
    if len_ratio < 1.5 {
        return end_ratio.max(token_ratio(s1, s2) * UNBASE_SCALE);
    }

    let partial_scale = if len_ratio < 8.0 { 0.9 } else { 0.6 };
    let end_ratio = end_ratio.max(partial_ratio(s1, s2) * partial_scale);
    end_ratio.max(partial_token_ratio(s1, s2) * UNBASE_SCALE * partial_scale)
}
