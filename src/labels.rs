//! Short, mutually distinguishing labels for configuration directories.
//!
//! The default strategy compares every pair of directory names, strips the
//! text they share and keeps, per directory, the longest leftover. The
//! alternate token strategy drops `_`-separated words common to all names.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::config::{LabelConfig, LabelStrategy};
use crate::error::{DataError, Result};

/// A block of text common to two strings: `a[a_start..a_start+len]` equals
/// `b[b_start..b_start+len]`. Offsets are in chars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchingBlock {
    pub a_start: usize,
    pub b_start: usize,
    pub len: usize,
}

// ---------------------------------------------------------------------------
// SourceLabelResolver
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct SourceLabelResolver {
    config: LabelConfig,
}

impl SourceLabelResolver {
    pub fn new(config: LabelConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Map each directory to a short label and return `label → directory`.
    ///
    /// Repeated paths are collapsed. A single directory is labelled with its
    /// basename, as is any directory whose derived label comes out empty.
    /// Two directories ending up with the same label is an error.
    pub fn resolve<P: AsRef<Path>>(&self, paths: &[P]) -> Result<BTreeMap<String, PathBuf>> {
        let mut seen = HashSet::new();
        let dirs: Vec<PathBuf> = paths
            .iter()
            .map(|p| p.as_ref().to_path_buf())
            .filter(|p| seen.insert(p.clone()))
            .collect();
        let names: Vec<String> = dirs.iter().map(|d| basename(d)).collect();

        let labels = match (names.len(), self.config.strategy) {
            (0 | 1, _) => names.clone(),
            (_, LabelStrategy::Residual) => self.residual_labels(&names),
            (_, LabelStrategy::Tokens) => token_labels(&names),
        };

        let mut resolved: BTreeMap<String, PathBuf> = BTreeMap::new();
        for ((label, name), dir) in labels.into_iter().zip(&names).zip(dirs) {
            let label = if label.is_empty() { name.clone() } else { label };
            if let Some(first) = resolved.get(&label) {
                return Err(DataError::AmbiguousLabel {
                    label,
                    first: first.clone(),
                    second: dir,
                });
            }
            log::debug!("label '{label}' -> {}", dir.display());
            resolved.insert(label, dir);
        }
        Ok(resolved)
    }

    /// Longest pairwise residual per name. Ties keep the first one seen.
    fn residual_labels(&self, names: &[String]) -> Vec<String> {
        let chars: Vec<Vec<char>> = names.iter().map(|n| n.chars().collect()).collect();
        let mut best: Vec<Option<Vec<char>>> = vec![None; names.len()];

        for i in 0..chars.len() {
            for j in (i + 1)..chars.len() {
                let blocks = matching_blocks(
                    &chars[i],
                    &chars[j],
                    self.config.min_common_len,
                    self.config.word_boundaries,
                );
                let left = remove_blocks(&chars[i], blocks.iter().map(|b| (b.a_start, b.len)));
                let right = remove_blocks(&chars[j], blocks.iter().map(|b| (b.b_start, b.len)));

                for (slot, residual) in [(i, left), (j, right)] {
                    let longer = best[slot]
                        .as_ref()
                        .map_or(true, |current| residual.len() > current.len());
                    if longer {
                        best[slot] = Some(residual);
                    }
                }
            }
        }

        best.into_iter()
            .map(|r| r.unwrap_or_default().into_iter().collect())
            .collect()
    }
}

/// Resolve labels with the default residual strategy.
pub fn resolve_labels<P: AsRef<Path>>(paths: &[P]) -> Result<BTreeMap<String, PathBuf>> {
    SourceLabelResolver::default().resolve(paths)
}

/// Final path component, ignoring trailing separators; the whole path when
/// there is none (e.g. `..`).
pub fn basename(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

// ---------------------------------------------------------------------------
// Matching blocks
// ---------------------------------------------------------------------------

/// Common blocks of `a` and `b`, ordered by position.
///
/// Finds the longest common substring of the whole range (earliest in `a`
/// on ties, then earliest in `b`), then recurses into the ranges left and
/// right of it. With `word_boundaries`, each block is trimmed so it neither
/// starts nor ends inside a word of either string. Blocks shorter than
/// `min_len` after trimming are not reported.
pub fn matching_blocks(
    a: &[char],
    b: &[char],
    min_len: usize,
    word_boundaries: bool,
) -> Vec<MatchingBlock> {
    let mut blocks = Vec::new();
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let raw = longest_match(a, alo, ahi, b, blo, bhi);
        if raw.len == 0 || raw.len < min_len {
            continue;
        }

        let block = if word_boundaries {
            snap_to_words(a, b, raw)
        } else {
            raw
        };
        if block.len >= min_len {
            blocks.push(block);
        }

        let (i, j, k) = (raw.a_start, raw.b_start, raw.len);
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            pending.push((i + k, ahi, j + k, bhi));
        }
    }

    blocks.sort_by_key(|b| (b.a_start, b.b_start));
    blocks
}

/// Longest common substring of `a[alo..ahi]` and `b[blo..bhi]`.
fn longest_match(
    a: &[char],
    alo: usize,
    ahi: usize,
    b: &[char],
    blo: usize,
    bhi: usize,
) -> MatchingBlock {
    let mut best = MatchingBlock {
        a_start: alo,
        b_start: blo,
        len: 0,
    };
    // run[j - blo + 1] = length of the common suffix ending at a[i], b[j]
    let width = bhi.saturating_sub(blo);
    let mut prev = vec![0usize; width + 1];
    let mut curr = vec![0usize; width + 1];

    for i in alo..ahi {
        for j in blo..bhi {
            let col = j - blo + 1;
            curr[col] = if a[i] == b[j] { prev[col - 1] + 1 } else { 0 };
            let k = curr[col];
            if k > best.len {
                best = MatchingBlock {
                    a_start: i + 1 - k,
                    b_start: j + 1 - k,
                    len: k,
                };
            }
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    best
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric()
}

/// Whether a block may start at `pos` without cutting a word.
fn starts_cleanly(s: &[char], pos: usize) -> bool {
    pos == 0 || !is_word_char(s[pos - 1]) || !is_word_char(s[pos])
}

/// Whether a block may end just before `end` without cutting a word.
fn ends_cleanly(s: &[char], end: usize) -> bool {
    end == s.len() || !is_word_char(s[end]) || !is_word_char(s[end - 1])
}

fn snap_to_words(a: &[char], b: &[char], mut block: MatchingBlock) -> MatchingBlock {
    while block.len > 0
        && !(starts_cleanly(a, block.a_start) && starts_cleanly(b, block.b_start))
    {
        block.a_start += 1;
        block.b_start += 1;
        block.len -= 1;
    }
    while block.len > 0
        && !(ends_cleanly(a, block.a_start + block.len) && ends_cleanly(b, block.b_start + block.len))
    {
        block.len -= 1;
    }
    block
}

/// Remove `(start, len)` spans from `s`, rightmost first so earlier offsets
/// stay valid. A span with text on both sides becomes a single space.
pub fn remove_blocks<I>(s: &[char], spans: I) -> Vec<char>
where
    I: DoubleEndedIterator<Item = (usize, usize)>,
{
    let mut out = s.to_vec();
    for (start, len) in spans.rev() {
        let end = start + len;
        let internal = start > 0 && end < out.len();
        let tail = out.split_off(end);
        out.truncate(start);
        if internal {
            out.push(' ');
        }
        out.extend(tail);
    }
    out
}

// ---------------------------------------------------------------------------
// Token strategy
// ---------------------------------------------------------------------------

fn tokens(name: &str) -> Vec<&str> {
    name.split(|c: char| c == '_' || !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Drop words that appear in every name and join the rest with `_`.
fn token_labels(names: &[String]) -> Vec<String> {
    let mut presence: HashMap<&str, usize> = HashMap::new();
    for name in names {
        let distinct: HashSet<&str> = tokens(name).into_iter().collect();
        for token in distinct {
            *presence.entry(token).or_default() += 1;
        }
    }

    names
        .iter()
        .map(|name| {
            tokens(name)
                .into_iter()
                .filter(|t| presence.get(t).copied().unwrap_or(0) < names.len())
                .collect::<Vec<_>>()
                .join("_")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn residual_pair(a: &str, b: &str, min_len: usize, words: bool) -> (String, String) {
        let (a, b) = (chars(a), chars(b));
        let blocks = matching_blocks(&a, &b, min_len, words);
        let left = remove_blocks(&a, blocks.iter().map(|m| (m.a_start, m.len)));
        let right = remove_blocks(&b, blocks.iter().map(|m| (m.b_start, m.len)));
        (left.into_iter().collect(), right.into_iter().collect())
    }

    #[test]
    fn test_longest_match_prefers_earliest() {
        let m = longest_match(&chars("abXab"), 0, 5, &chars("ab"), 0, 2);
        assert_eq!(
            m,
            MatchingBlock {
                a_start: 0,
                b_start: 0,
                len: 2
            }
        );
    }

    #[test]
    fn test_character_blocks_without_word_snapping() {
        let blocks = matching_blocks(&chars("run_alpha_v1"), &chars("run_beta_v1"), 1, false);
        let lens: Vec<_> = blocks.iter().map(|b| (b.a_start, b.b_start, b.len)).collect();
        assert_eq!(lens, vec![(0, 0, 4), (8, 7, 4)]);
        assert_eq!(
            residual_pair("run_alpha_v1", "run_beta_v1", 1, false),
            ("alph".to_string(), "bet".to_string())
        );
    }

    #[test]
    fn test_word_snapping_keeps_whole_words() {
        assert_eq!(
            residual_pair("run_alpha_v1", "run_beta_v1", 1, true),
            ("alpha".to_string(), "beta".to_string())
        );
        assert_eq!(
            residual_pair("pop100_mut01_xo", "pop200_mut01_xo", 1, true),
            ("pop100".to_string(), "pop200".to_string())
        );
    }

    #[test]
    fn test_internal_removal_leaves_space() {
        assert_eq!(
            residual_pair("p_x_q_z", "p_y_q_w", 1, true),
            ("x z".to_string(), "y w".to_string())
        );
    }

    #[test]
    fn test_remove_blocks_edges() {
        let s = chars("abcdef");
        let out: String = remove_blocks(&s, [(0, 2), (4, 2)].into_iter()).into_iter().collect();
        assert_eq!(out, "cd");
        let out: String = remove_blocks(&s, [(2, 2)].into_iter()).into_iter().collect();
        assert_eq!(out, "ab ef");
    }

    #[test]
    fn test_min_len_filters_short_blocks() {
        let blocks = matching_blocks(&chars("xaz"), &chars("yaw"), 2, false);
        assert!(blocks.is_empty());
    }

    #[test]
    fn test_equal_length_residual_keeps_first_pair() {
        let names: Vec<String> = ["a_x", "a_y", "b_x"].iter().map(|s| s.to_string()).collect();
        // "a_x" gets "x" against "a_y", then an equally long "a" against "b_x".
        assert_eq!(
            SourceLabelResolver::default().residual_labels(&names),
            vec!["x", "a y", "b x"]
        );
    }

    #[test]
    fn test_token_labels_drop_shared_words() {
        let names = vec![
            "ga_pop100_mut01".to_string(),
            "ga_pop200_mut01".to_string(),
            "ga_pop100_mut05".to_string(),
        ];
        assert_eq!(
            token_labels(&names),
            vec!["pop100_mut01", "pop200_mut01", "pop100_mut05"]
        );
    }

    #[test]
    fn test_basename_ignores_trailing_separator() {
        assert_eq!(basename(Path::new("/data/run_alpha/")), "run_alpha");
        assert_eq!(basename(Path::new("run_beta")), "run_beta");
        assert_eq!(basename(Path::new("..")), "..");
    }

    #[test]
    fn test_resolve_single_and_empty() {
        let labels = resolve_labels(&["/data/only_one"]).unwrap();
        assert_eq!(labels.get("only_one"), Some(&PathBuf::from("/data/only_one")));
        assert!(resolve_labels::<&str>(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_resolve_collapses_duplicate_paths() {
        let labels = resolve_labels(&["/d/run_a", "/d/run_a", "/d/run_b"]).unwrap();
        assert_eq!(labels.len(), 2);
        assert!(labels.contains_key("a"));
        assert!(labels.contains_key("b"));
    }

    #[test]
    fn test_resolve_empty_residual_falls_back_to_basename() {
        let labels = resolve_labels(&["/d/base", "/d/base_extra"]).unwrap();
        assert_eq!(labels.get("base"), Some(&PathBuf::from("/d/base")));
        assert_eq!(labels.get("_extra"), Some(&PathBuf::from("/d/base_extra")));
    }

    #[test]
    fn test_resolve_collision_is_error() {
        let err = resolve_labels(&["/p/exp", "/q/exp", "/r/other"]).unwrap_err();
        assert!(matches!(err, DataError::AmbiguousLabel { ref label, .. } if label == "exp"));
    }
}
