//! Synthetic field values for fixtures and newly created records.
//!
//! Every generator draws from the caller's [`Rng`], so a seeded `StdRng`
//! reproduces the same values; only the wall-clock parts of ids and
//! timestamps vary between runs.

use rand::Rng;
use time::{Duration, OffsetDateTime, format_description::well_known::Rfc3339};

use crate::domain::error::DomainError;

const MAX_ID_ATTEMPTS: usize = 32;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

const SURNAMES: &[&str] = &[
    "王", "李", "张", "刘", "陈", "杨", "黄", "赵", "吴", "周", "徐", "孙", "马", "朱", "胡", "郭",
    "何", "高", "林", "罗",
];

const GIVEN_NAMES: &[&str] = &[
    "伟", "芳", "娜", "敏", "静", "丽", "强", "磊", "军", "洋", "勇", "艳", "杰", "娟", "涛", "明",
    "超", "秀英", "霞", "平", "刚", "桂英", "建华", "文博", "子涵", "雨轩",
];

const PHONE_PREFIXES: &[&str] = &[
    "130", "131", "132", "135", "136", "137", "138", "139", "150", "151", "152", "155", "158",
    "159", "176", "177", "180", "181", "186", "187", "188", "189",
];

const COMMUNITIES: &[&str] = &["阳光花园", "翠湖苑", "金色家园", "锦绣华庭", "滨江壹号"];

/// Pick one element of a non-empty slice.
pub fn pick<'a, T>(rng: &mut impl Rng, items: &'a [T]) -> &'a T {
    &items[rng.gen_range(0..items.len())]
}

/// `PREFIX_<base36 millis>_<RANDOM6>`, uppercased.
///
/// Collisions are possible in principle; use [`generate_unique_id`] where the
/// id becomes a primary key.
pub fn generate_id(prefix: &str, rng: &mut impl Rng) -> String {
    let millis = (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000).max(0) as u64;
    let suffix: String = (0..6)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{prefix}_{}_{suffix}", to_base36(millis)).to_uppercase()
}

/// Generate an id that `exists` reports as unused, regenerating on collision.
pub fn generate_unique_id<F>(
    prefix: &str,
    rng: &mut impl Rng,
    exists: F,
) -> Result<String, DomainError>
where
    F: Fn(&str) -> bool,
{
    for _ in 0..MAX_ID_ATTEMPTS {
        let candidate = generate_id(prefix, rng);
        if !exists(&candidate) {
            return Ok(candidate);
        }
    }
    Err(DomainError::invariant(format!(
        "exhausted {MAX_ID_ATTEMPTS} attempts to allocate a unique `{prefix}` id"
    )))
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

/// Uniformly sample an instant between `now + start_days` and `now + end_days`.
pub fn generate_time_range(start_days: i64, end_days: i64, rng: &mut impl Rng) -> OffsetDateTime {
    let (low, high) = if start_days <= end_days {
        (start_days, end_days)
    } else {
        (end_days, start_days)
    };
    let span_secs = (high - low) * 86_400;
    let offset = if span_secs > 0 {
        rng.gen_range(0..=span_secs)
    } else {
        0
    };
    truncate_to_seconds(now() + Duration::days(low) + Duration::seconds(offset))
}

/// Current UTC time at second precision.
pub fn now() -> OffsetDateTime {
    truncate_to_seconds(OffsetDateTime::now_utc())
}

fn truncate_to_seconds(instant: OffsetDateTime) -> OffsetDateTime {
    instant.replace_nanosecond(0).unwrap_or(instant)
}

/// RFC 3339 rendering used for client-facing time strings.
pub fn format_timestamp(instant: OffsetDateTime) -> String {
    instant
        .format(&Rfc3339)
        .unwrap_or_else(|_| instant.unix_timestamp().to_string())
}

pub fn random_name(rng: &mut impl Rng) -> String {
    format!("{}{}", pick(rng, SURNAMES), pick(rng, GIVEN_NAMES))
}

pub fn random_phone(rng: &mut impl Rng) -> String {
    format!(
        "{}{:08}",
        pick(rng, PHONE_PREFIXES),
        rng.gen_range(0..100_000_000u32)
    )
}

pub fn random_address(rng: &mut impl Rng) -> String {
    format!(
        "{}{}栋{}单元{}{:02}室",
        pick(rng, COMMUNITIES),
        rng.gen_range(1..=12),
        rng.gen_range(1..=4),
        rng.gen_range(1..=30),
        rng.gen_range(1..=6)
    )
}

/// Amount in yuan with two decimals, within `[min, max]`.
pub fn random_amount(min: f64, max: f64, rng: &mut impl Rng) -> f64 {
    let low = (min * 100.0).round() as i64;
    let high = (max * 100.0).round() as i64;
    if high <= low {
        return low as f64 / 100.0;
    }
    rng.gen_range(low..=high) as f64 / 100.0
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn generate_id_has_expected_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        let id = generate_id("act", &mut rng);
        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "ACT");
        assert_eq!(parts[2].len(), 6);
        assert_eq!(id, id.to_uppercase());
    }

    #[test]
    fn unique_id_skips_taken_candidates() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut taken = HashSet::new();
        for _ in 0..200 {
            let id = generate_unique_id("R", &mut rng, |candidate| taken.contains(candidate))
                .expect("id");
            assert!(taken.insert(id));
        }
    }

    #[test]
    fn unique_id_exhaustion_is_an_invariant_error() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = generate_unique_id("R", &mut rng, |_| true).expect_err("always taken");
        assert!(matches!(err, DomainError::Invariant { .. }));
    }

    #[test]
    fn time_range_stays_within_bounds() {
        let mut rng = StdRng::seed_from_u64(3);
        let lower = now() - Duration::days(30) - Duration::seconds(1);
        for _ in 0..100 {
            let instant = generate_time_range(-30, 10, &mut rng);
            let upper = now() + Duration::days(10) + Duration::seconds(1);
            assert!(instant >= lower && instant <= upper);
            assert_eq!(instant.nanosecond(), 0);
        }
    }

    #[test]
    fn seeded_generators_are_reproducible() {
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        assert_eq!(random_name(&mut a), random_name(&mut b));
        assert_eq!(random_phone(&mut a), random_phone(&mut b));
        assert_eq!(random_address(&mut a), random_address(&mut b));
    }

    #[test]
    fn phone_numbers_have_eleven_digits() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..50 {
            let phone = random_phone(&mut rng);
            assert_eq!(phone.len(), 11);
            assert!(phone.starts_with('1'));
            assert!(phone.chars().all(|ch| ch.is_ascii_digit()));
        }
    }

    #[test]
    fn amounts_have_two_decimals_and_respect_bounds() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..50 {
            let amount = random_amount(10.0, 20.5, &mut rng);
            assert!((10.0..=20.5).contains(&amount));
            assert!(((amount * 100.0).round() - amount * 100.0).abs() < 1e-6);
        }
    }

    #[test]
    fn base36_encoding() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }
}
