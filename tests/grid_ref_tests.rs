use battleships::{GridRef, GridRefError, CELL_COUNT};
use proptest::prelude::*;

#[test]
fn test_valid_references() {
    let cases = [("A1", 0), ("c5", 24), ("j10", 99), ("B3", 12), ("a10", 9), ("J1", 90)];
    for (reference, expected) in cases {
        let parsed: GridRef = reference.parse().unwrap();
        assert_eq!(parsed.index(), expected, "reference {}", reference);
    }
}

#[test]
fn test_invalid_references() {
    let cases = [
        ("", GridRefError::TooShort),
        ("a", GridRefError::TooShort),
        ("ab12", GridRefError::TooLong),
        ("k5", GridRefError::RowOutOfBounds),
        ("15", GridRefError::RowOutOfBounds),
        ("a11", GridRefError::ColumnOutOfBounds),
        ("a0", GridRefError::ColumnOutOfBounds),
        ("ab", GridRefError::InvalidColumn),
        ("a+5", GridRefError::InvalidColumn),
        ("a-1", GridRefError::InvalidColumn),
    ];
    for (reference, expected) in cases {
        assert_eq!(
            reference.parse::<GridRef>().unwrap_err(),
            expected,
            "reference {:?}",
            reference
        );
    }
}

#[test]
fn test_addressing_is_a_bijection() {
    let mut seen = [false; CELL_COUNT];
    for row in b'A'..=b'J' {
        for col in 1..=10 {
            let reference = format!("{}{}", row as char, col);
            let index = reference.parse::<GridRef>().unwrap().index();
            assert!(!seen[index], "{} maps to an index already used", reference);
            seen[index] = true;

            let lower = reference.to_ascii_lowercase();
            assert_eq!(lower.parse::<GridRef>().unwrap().index(), index);
        }
    }
    assert!(seen.iter().all(|s| *s));
}

#[test]
fn test_display_round_trip() {
    for index in 0..CELL_COUNT {
        let reference = GridRef::from_index(index).unwrap();
        let reparsed: GridRef = reference.to_string().parse().unwrap();
        assert_eq!(reparsed, reference);
        assert_eq!(reparsed.index(), index);
    }
    assert!(GridRef::from_index(CELL_COUNT).is_none());
    assert_eq!(GridRef::from_index(12).unwrap().to_string(), "B3");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn parse_accepts_exactly_letter_and_column(s in "[a-zA-Z][0-9]{0,3}") {
        let letter = s.as_bytes()[0].to_ascii_lowercase();
        let digits = &s[1..];
        let expected_ok = (1..=2).contains(&digits.len())
            && (b'a'..=b'j').contains(&letter)
            && digits.parse::<usize>().map(|c| (1..=10).contains(&c)).unwrap_or(false);
        prop_assert_eq!(s.parse::<GridRef>().is_ok(), expected_ok);
    }

    #[test]
    fn parse_never_panics(s in "\\PC{0,6}") {
        let _ = s.parse::<GridRef>();
    }
}
