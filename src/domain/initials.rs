//! Alphabetical index keys for directory listings.
//!
//! Chinese names are keyed by the first letter of the pinyin of their first
//! character (`pinyin` crate), so “张伟” lands under `Z`. ASCII letters are
//! used as-is; anything else falls into the trailing `#` bucket.

use std::collections::BTreeMap;

use pinyin::ToPinyin;

/// Bucket used for names that start with neither a letter nor a hanzi.
pub const OTHER_INITIAL: char = '#';

/// Derive the uppercase index letter for a display name.
pub fn initial_of(name: &str) -> char {
    let Some(first) = name.trim().chars().next() else {
        return OTHER_INITIAL;
    };

    if first.is_ascii_alphabetic() {
        return first.to_ascii_uppercase();
    }

    match first.to_pinyin() {
        Some(py) => py
            .plain()
            .chars()
            .next()
            .filter(char::is_ascii_alphabetic)
            .map(|ch| ch.to_ascii_uppercase())
            .unwrap_or(OTHER_INITIAL),
        None => OTHER_INITIAL,
    }
}

/// Group items by the initial of their name.
///
/// Groups come back ordered `A..=Z` followed by `#`; items inside a group keep
/// their input order.
pub fn group_by_initial<T, F>(items: Vec<T>, name: F) -> Vec<(char, Vec<T>)>
where
    F: Fn(&T) -> &str,
{
    let mut letters: BTreeMap<char, Vec<T>> = BTreeMap::new();
    let mut others = Vec::new();

    for item in items {
        match initial_of(name(&item)) {
            OTHER_INITIAL => others.push(item),
            letter => letters.entry(letter).or_default().push(item),
        }
    }

    let mut groups: Vec<(char, Vec<T>)> = letters.into_iter().collect();
    if !others.is_empty() {
        groups.push((OTHER_INITIAL, others));
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_of_transliterates_hanzi() {
        assert_eq!(initial_of("张伟"), 'Z');
        assert_eq!(initial_of("李娜"), 'L');
        assert_eq!(initial_of("  王芳"), 'W');
    }

    #[test]
    fn initial_of_handles_ascii_and_symbols() {
        assert_eq!(initial_of("alice"), 'A');
        assert_eq!(initial_of("Bob"), 'B');
        assert_eq!(initial_of("123"), OTHER_INITIAL);
        assert_eq!(initial_of(""), OTHER_INITIAL);
    }

    #[test]
    fn groups_are_sorted_with_other_bucket_last() {
        let names = vec!["王芳", "007", "艾米", "吴军", "Zed"];
        let groups = group_by_initial(names, |name| name);

        let keys: Vec<char> = groups.iter().map(|(key, _)| *key).collect();
        assert_eq!(keys, ['A', 'W', 'Z', '#']);
        assert_eq!(groups[1].1, vec!["王芳", "吴军"]);
        assert_eq!(groups[3].1, vec!["007"]);
    }
}
