//! Natural ordering for image filenames: `IMG_9.jpg` sorts before
//! `IMG_10.jpg`.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

/// Sort paths by natural order of their file names, full path as tie-break.
pub fn natural_sort(mut paths: Vec<PathBuf>) -> Vec<PathBuf> {
    paths.sort_by(|a, b| natural_cmp(a, b));
    paths
}

fn natural_cmp(a: &Path, b: &Path) -> Ordering {
    let base_a = a.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    let base_b = b.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();

    let segments_a = split_segments(&base_a);
    let segments_b = split_segments(&base_b);

    let mut iter_a = segments_a.iter();
    let mut iter_b = segments_b.iter();
    loop {
        match (iter_a.next(), iter_b.next()) {
            (None, None) => break,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(seg_a), Some(seg_b)) => {
                let ord = compare_segments(seg_a, seg_b);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }

    a.cmp(b)
}

fn compare_segments(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(num_a), Ok(num_b)) => num_a.cmp(&num_b),
        // Numbers sort before text.
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Split into alternating text and numeric segments:
/// `"IMG_9.jpg"` -> `["IMG_", "9", ".jpg"]`.
fn split_segments(s: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut current_is_digit = false;

    for ch in s.chars() {
        let is_digit = ch.is_ascii_digit();
        if current.is_empty() || is_digit == current_is_digit {
            current_is_digit = is_digit;
            current.push(ch);
        } else {
            segments.push(std::mem::take(&mut current));
            current_is_digit = is_digit;
            current.push(ch);
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(names: &[&str]) -> Vec<String> {
        natural_sort(names.iter().map(PathBuf::from).collect())
            .into_iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn numeric_segments_compare_numerically() {
        assert_eq!(
            sorted(&["IMG_10.jpg", "IMG_9.jpg", "IMG_100.jpg"]),
            ["IMG_9.jpg", "IMG_10.jpg", "IMG_100.jpg"]
        );
    }

    #[test]
    fn plain_lexicographic_for_text() {
        assert_eq!(sorted(&["b.png", "a.png"]), ["a.png", "b.png"]);
    }

    #[test]
    fn zero_padded_and_bare_numbers_interleave() {
        assert_eq!(
            sorted(&["page2.png", "page10.png", "page1.png"]),
            ["page1.png", "page2.png", "page10.png"]
        );
    }

    #[test]
    fn numbers_sort_before_text() {
        assert_eq!(sorted(&["abc.png", "1.png"]), ["1.png", "abc.png"]);
    }

    #[test]
    fn compares_file_names_not_directories() {
        assert_eq!(
            sorted(&["z/IMG_2.jpg", "a/IMG_10.jpg"]),
            ["z/IMG_2.jpg", "a/IMG_10.jpg"]
        );
    }

    #[test]
    fn split_segments_alternates() {
        assert_eq!(split_segments("IMG_9.jpg"), ["IMG_", "9", ".jpg"]);
        assert_eq!(split_segments("123"), ["123"]);
        assert_eq!(split_segments(""), Vec::<String>::new());
    }

    #[test]
    fn huge_numbers_fall_back_to_text_compare() {
        // Beyond u64 range the segment is treated as text.
        let huge = "99999999999999999999999999";
        assert_eq!(compare_segments(huge, huge), Ordering::Equal);
    }
}
