use icu_collator::{Collator, CollatorOptions, Strength};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::table::Row;

/// Recommendation categories, lowest rank first.
pub const DEFAULT_CATEGORY_ORDER: [&str; 6] = [
    "Very Necessary",
    "Required",
    "Unnecessary",
    "Special Class",
    "Complete Prerequisites",
    "Not Started",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumericMode {
    /// The whole trimmed cell must be a finite decimal.
    #[default]
    Strict,
    /// Leading-number parse: `"85%"` reads as 85.
    Prefix,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRanking {
    order: Vec<String>,
    rank: HashMap<String, usize>,
}

impl CategoryRanking {
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut order: Vec<String> = Vec::new();
        let mut rank: HashMap<String, usize> = HashMap::new();
        for tag in tags {
            let tag = tag.into();
            // First occurrence wins.
            if rank.contains_key(&tag) {
                continue;
            }
            rank.insert(tag.clone(), order.len());
            order.push(tag);
        }
        Self { order, rank }
    }

    pub fn rank_of(&self, tag: &str) -> Option<usize> {
        self.rank.get(tag).copied()
    }

    pub fn tags(&self) -> &[String] {
        &self.order
    }
}

impl Default for CategoryRanking {
    fn default() -> Self {
        Self::new(DEFAULT_CATEGORY_ORDER)
    }
}

/// Per-table sort configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SortProfile {
    pub category_column: Option<usize>,
    pub ranking: CategoryRanking,
}

/// Ascending comparison of two rows at `column`. Callers reverse it for
/// descending order.
pub fn compare_rows(
    a: &Row,
    b: &Row,
    column: usize,
    profile: &SortProfile,
    numeric: NumericMode,
) -> Ordering {
    if profile.category_column == Some(column) {
        let ranks = (
            a.category.as_deref().and_then(|t| profile.ranking.rank_of(t)),
            b.category.as_deref().and_then(|t| profile.ranking.rank_of(t)),
        );
        if let (Some(ra), Some(rb)) = ranks {
            return ra.cmp(&rb);
        }
    }

    compare_cells(a.cell(column), b.cell(column), numeric)
}

pub fn compare_cells(a: &str, b: &str, numeric: NumericMode) -> Ordering {
    let a = a.trim();
    let b = b.trim();
    if let (Some(x), Some(y)) = (parse_number(a, numeric), parse_number(b, numeric)) {
        return x.partial_cmp(&y).unwrap_or(Ordering::Equal);
    }
    locale_compare(a, b)
}

pub fn parse_number(s: &str, mode: NumericMode) -> Option<f64> {
    let text = match mode {
        NumericMode::Strict => s,
        NumericMode::Prefix => numeric_prefix(s),
    };
    if text.is_empty() {
        return None;
    }
    // Rust's float grammar also accepts "inf"/"NaN"; only finite values count.
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Longest prefix shaped like `[+-]?(digits[.digits]|.digits)([eE][+-]?digits)?`.
fn numeric_prefix(s: &str) -> &str {
    let bytes = s.as_bytes();
    let mut i = 0;
    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
        i += 1;
    }
    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;
    if i < bytes.len() && bytes[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if digits > 0 || j > frac_start {
            digits += j - frac_start;
            i = j;
        }
    }
    if digits == 0 {
        return "";
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }
    &s[..i]
}

thread_local! {
    static ROOT_COLLATOR: Option<Collator> = root_collator();
}

fn root_collator() -> Option<Collator> {
    let mut options = CollatorOptions::new();
    options.strength = Some(Strength::Tertiary);
    match Collator::try_new(&Default::default(), options) {
        Ok(c) => Some(c),
        Err(e) => {
            log::warn!("root collator unavailable, using case-folded order: {:?}", e);
            None
        }
    }
}

/// Case-sensitive text ordering under the root locale at tertiary strength:
/// accents and case only matter once the base letters tie, and lowercase
/// sorts before uppercase.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    ROOT_COLLATOR.with(|collator| match collator {
        Some(c) => c.compare(a, b),
        None => fold_compare(a, b),
    })
}

fn fold_compare(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    if folded != Ordering::Equal {
        return folded;
    }

    for (ca, cb) in a.chars().zip(b.chars()) {
        if ca == cb {
            continue;
        }
        match (ca.is_lowercase(), cb.is_lowercase()) {
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => return ca.cmp(&cb),
        }
    }
    a.len().cmp(&b.len())
}

/// Stable bottom-up merge sort of `0..len`, returning the sorted positions.
///
/// Mixed numeric/text columns make the row comparator non-transitive, and
/// `slice::sort_by` may panic on such comparators, so the sort is done here.
pub fn stable_order_by<F>(len: usize, mut cmp: F) -> Vec<usize>
where
    F: FnMut(usize, usize) -> Ordering,
{
    let mut src: Vec<usize> = (0..len).collect();
    let mut dst: Vec<usize> = Vec::with_capacity(len);
    let mut width = 1;
    while width < len {
        dst.clear();
        let mut start = 0;
        while start < len {
            let mid = (start + width).min(len);
            let end = (start + 2 * width).min(len);
            let (mut l, mut r) = (start, mid);
            while l < mid && r < end {
                if cmp(src[l], src[r]) == Ordering::Greater {
                    dst.push(src[r]);
                    r += 1;
                } else {
                    dst.push(src[l]);
                    l += 1;
                }
            }
            dst.extend_from_slice(&src[l..mid]);
            dst.extend_from_slice(&src[r..end]);
            start = end;
        }
        std::mem::swap(&mut src, &mut dst);
        width *= 2;
    }
    src
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str], category: Option<&str>) -> Row {
        Row {
            row_id: cells.join("|"),
            cells: cells.iter().map(|c| c.to_string()).collect(),
            category: category.map(str::to_string),
            hidden: false,
        }
    }

    #[test]
    fn numbers_compare_numerically_not_lexicographically() {
        let mut vals = vec!["10", "9", "2"];
        vals.sort_by(|a, b| compare_cells(a, b, NumericMode::Strict));
        assert_eq!(vals, vec!["2", "9", "10"]);
    }

    #[test]
    fn strict_mode_rejects_suffixed_numbers() {
        assert_eq!(parse_number("85%", NumericMode::Strict), None);
        assert_eq!(parse_number("85%", NumericMode::Prefix), Some(85.0));
        assert_eq!(parse_number("-1.5e2 pts", NumericMode::Prefix), Some(-150.0));
        assert_eq!(parse_number(".5", NumericMode::Prefix), Some(0.5));
        assert_eq!(parse_number("abc", NumericMode::Prefix), None);
        assert_eq!(parse_number(".", NumericMode::Prefix), None);
    }

    #[test]
    fn non_finite_text_is_not_numeric() {
        assert_eq!(parse_number("inf", NumericMode::Strict), None);
        assert_eq!(parse_number("NaN", NumericMode::Strict), None);
        assert_eq!(parse_number("Infinity", NumericMode::Prefix), None);
        assert_eq!(parse_number("", NumericMode::Strict), None);
    }

    #[test]
    fn blank_cells_sort_before_text() {
        assert_eq!(compare_cells("   ", "Amy", NumericMode::Strict), Ordering::Less);
        assert_eq!(compare_cells("", "0", NumericMode::Strict), Ordering::Less);
        assert_eq!(compare_cells(" \t", "", NumericMode::Strict), Ordering::Equal);
    }

    #[test]
    fn locale_compare_is_case_blind_first_then_lowercase_first() {
        assert_eq!(locale_compare("apple", "Banana"), Ordering::Less);
        assert_eq!(locale_compare("Zed", "alpha"), Ordering::Greater);
        assert_eq!(locale_compare("amy", "Amy"), Ordering::Less);
        assert_eq!(locale_compare("Amy", "Amy"), Ordering::Equal);
        assert_eq!(locale_compare("Am", "Amy"), Ordering::Less);
    }

    #[test]
    fn accented_letters_sort_beside_their_base_letter() {
        assert_eq!(locale_compare("Élan", "Zed"), Ordering::Less);
        assert_eq!(locale_compare("Zed", "Élan"), Ordering::Greater);
        assert_eq!(locale_compare("éclair", "ezra"), Ordering::Less);
        assert_eq!(locale_compare("ezra", "éclair"), Ordering::Greater);
        assert_eq!(locale_compare("Çelik", "Dewi"), Ordering::Less);

        // Accent only breaks a tie between otherwise equal letters.
        assert_eq!(locale_compare("elan", "élan"), Ordering::Less);
        assert_eq!(locale_compare("élan", "elan"), Ordering::Greater);

        let mut names = vec!["Zed", "Élan", "ezra", "Amy", "éclair"];
        names.sort_by(|a, b| compare_cells(a, b, NumericMode::Strict));
        assert_eq!(names, vec!["Amy", "éclair", "Élan", "ezra", "Zed"]);
    }

    #[test]
    fn category_column_uses_ranking_when_both_tags_known() {
        let profile = SortProfile {
            category_column: Some(3),
            ranking: CategoryRanking::default(),
        };
        let a = row(&["x", "x", "x", "zzz"], Some("Very Necessary"));
        let b = row(&["x", "x", "x", "aaa"], Some("Not Started"));
        assert_eq!(
            compare_rows(&a, &b, 3, &profile, NumericMode::Strict),
            Ordering::Less
        );

        // Unknown tag falls through to the cell text.
        let c = row(&["x", "x", "x", "aaa"], Some("Mystery"));
        assert_eq!(
            compare_rows(&a, &c, 3, &profile, NumericMode::Strict),
            Ordering::Greater
        );

        // Other columns ignore tags.
        assert_eq!(
            compare_rows(&a, &b, 0, &profile, NumericMode::Strict),
            Ordering::Equal
        );
    }

    #[test]
    fn missing_cells_read_as_empty() {
        let profile = SortProfile::default();
        let short = row(&["Amy"], None);
        let full = row(&["Bob", "12"], None);
        assert_eq!(
            compare_rows(&short, &full, 1, &profile, NumericMode::Strict),
            Ordering::Less
        );
    }

    #[test]
    fn merge_order_is_stable_and_survives_intransitive_comparators() {
        let keys = [2, 1, 2, 1, 0, 2];
        let order = stable_order_by(keys.len(), |a, b| keys[a].cmp(&keys[b]));
        assert_eq!(order, vec![4, 1, 3, 0, 2, 5]);

        // "2" < "10" numerically, "10" < "1a" and "1a" < "2" as text.
        let cells = ["2", "10", "1a", "2", "10"];
        let order = stable_order_by(cells.len(), |a, b| {
            compare_cells(cells[a], cells[b], NumericMode::Strict)
        });
        let mut seen = order.clone();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn ranking_ignores_duplicate_tags() {
        let r = CategoryRanking::new(["A", "B", "A", "C"]);
        assert_eq!(r.tags(), &["A".to_string(), "B".to_string(), "C".to_string()]);
        assert_eq!(r.rank_of("C"), Some(2));
        assert_eq!(r.rank_of("D"), None);
    }
}
