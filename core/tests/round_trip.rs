//! Text/decimal round-trip laws over a seeded corpus.
//!
//!   parse(format(d)) == d            (value and scale)
//!   format(parse(s)) == normalize(s) (canonical grouping)

use awreport_core::decimal::{format_decimal, normalize, DualDecimal};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use rust_decimal::Decimal;

const SEED: u64 = 0xAD5_2024_0105;
const SAMPLES: usize = 5_000;

fn corpus() -> Vec<Decimal> {
    let mut rng = Pcg64::seed_from_u64(SEED);
    let mut values = vec![
        Decimal::ZERO,
        Decimal::new(0, 2),
        Decimal::new(-1, 0),
        Decimal::new(123_450, 2),
        Decimal::new(-987_654_321, 3),
        Decimal::new(i64::MAX, 0),
        Decimal::new(i64::MIN + 1, 4),
    ];
    for _ in 0..SAMPLES {
        let magnitude: u32 = rng.gen_range(0..=15);
        let bound = 10i64.pow(magnitude);
        let mantissa = rng.gen_range(-bound..=bound);
        let scale = rng.gen_range(0..=6);
        values.push(Decimal::new(mantissa, scale));
    }
    values
}

#[test]
fn parse_of_format_is_identity() {
    for d in corpus() {
        let text = DualDecimal::from_decimal(d).formatted();
        assert_eq!(text, format_decimal(&d));
        let back = DualDecimal::parse(&text)
            .unwrap_or_else(|e| panic!("{d} formatted as {text:?} did not parse: {e}"))
            .raw()
            .expect("formatted value parsed as absent");
        assert_eq!(back, d, "value drifted through {text:?}");
        assert_eq!(back.scale(), d.scale(), "scale drifted through {text:?}");
    }
}

#[test]
fn format_of_parse_is_normalize() {
    for d in corpus() {
        // Ungrouped text, as a plain decimal prints.
        let plain = d.to_string();
        let canonical = format_decimal(&d);
        assert_eq!(normalize(&plain).unwrap(), canonical, "for input {plain:?}");
        assert_eq!(DualDecimal::parse(&plain).unwrap().formatted(), canonical);

        // Already-canonical text is a fixed point.
        assert_eq!(normalize(&canonical).unwrap(), canonical);
    }
}

#[test]
fn formatted_text_uses_fixed_separators() {
    for d in corpus() {
        let text = format_decimal(&d);
        let unsigned = text.strip_prefix('-').unwrap_or(&text);
        let int_part = unsigned.split('.').next().unwrap();
        let groups: Vec<&str> = int_part.split(',').collect();
        assert!(groups[0].len() <= 3 && !groups[0].is_empty(), "{text}");
        assert!(groups[1..].iter().all(|g| g.len() == 3), "{text}");
        assert!(text.matches('.').count() <= 1, "{text}");
    }
}

#[test]
fn absent_state_round_trips_through_empty_text() {
    let absent = DualDecimal::parse("").unwrap();
    assert!(absent.is_absent());
    assert_eq!(absent.formatted(), "");
    assert!(DualDecimal::parse(&absent.formatted()).unwrap().is_absent());
    assert_eq!(normalize("--").unwrap(), "");
}

#[test]
fn report_text_examples() {
    assert_eq!(DualDecimal::parse("1,234.50").unwrap().formatted(), "1,234.50");
    assert_eq!(normalize("-1234.5").unwrap(), "-1,234.5");
    assert_eq!(normalize("0").unwrap(), "0");
    assert_eq!(normalize("12.34%").unwrap(), "12.34");
}
