//! Label selection for image classification outputs.

use alloc::string::String;
use alloc::vec::Vec;

/// The `count` highest-scoring labels whose score is at least `threshold`.
///
/// Results are ordered by descending score, ties by ascending label. NaN
/// scores never qualify.
///
/// ```
/// use tensorio::top_n;
///
/// let scores = [("cat", 0.7), ("dog", 0.2), ("car", 0.05)];
/// let top = top_n(scores, 5, 0.1);
/// assert_eq!(top, [("cat".to_string(), 0.7), ("dog".to_string(), 0.2)]);
/// ```
pub fn top_n<I, K>(classifications: I, count: usize, threshold: f32) -> Vec<(String, f32)>
where
    I: IntoIterator<Item = (K, f32)>,
    K: Into<String>,
{
    let mut selected: Vec<(String, f32)> = classifications
        .into_iter()
        .filter(|&(_, score)| score >= threshold)
        .map(|(label, score)| (label.into(), score))
        .collect();
    selected.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    selected.truncate(count);
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::collections::BTreeMap;
    use alloc::string::ToString;

    fn labels(top: &[(String, f32)]) -> Vec<&str> {
        top.iter().map(|(l, _)| l.as_str()).collect()
    }

    #[test]
    fn orders_and_truncates() {
        let scores = [("a", 0.1), ("b", 0.9), ("c", 0.5), ("d", 0.7)];
        assert_eq!(labels(&top_n(scores, 2, 0.0)), ["b", "d"]);
        assert_eq!(labels(&top_n(scores, 10, 0.0)), ["b", "d", "c", "a"]);
    }

    #[test]
    fn threshold_is_inclusive() {
        let scores = [("a", 0.1), ("b", 0.2), ("c", 0.3)];
        assert_eq!(labels(&top_n(scores, 5, 0.2)), ["c", "b"]);
        assert!(top_n(scores, 5, 0.5).is_empty());
    }

    #[test]
    fn ties_break_by_label() {
        let scores = [("zebra", 0.5), ("ant", 0.5), ("moth", 0.5)];
        assert_eq!(labels(&top_n(scores, 3, 0.0)), ["ant", "moth", "zebra"]);
    }

    #[test]
    fn nan_and_zero_count() {
        let scores = [("a", f32::NAN), ("b", 0.4)];
        assert_eq!(labels(&top_n(scores, 5, 0.0)), ["b"]);
        assert!(top_n(scores, 0, 0.0).is_empty());
        assert!(top_n(scores, 5, f32::NAN).is_empty());
    }

    #[test]
    fn from_map() {
        let mut map = BTreeMap::new();
        map.insert("background".to_string(), 0.02f32);
        map.insert("tabby".to_string(), 0.81);
        map.insert("tiger cat".to_string(), 0.12);
        let top = top_n(map, 5, 0.1);
        assert_eq!(
            top,
            [("tabby".to_string(), 0.81), ("tiger cat".to_string(), 0.12)]
        );
    }
}
