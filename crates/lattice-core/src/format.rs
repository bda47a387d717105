//! Display formatting for counts and byte sizes.
//!
//! `format_number` and `format_bytes` take already-floored integers;
//! callers decide truncation. Fixed-precision output goes through
//! `to_fixed`, which rounds exact ties away from zero.

const KB: u64 = 1_000;
const MB: u64 = 1_000_000;
const GB: u64 = 1_000_000_000;

/// Groups digits with commas (US convention): `1234567` -> `"1,234,567"`.
pub fn format_number(value: u64) -> String {
    let raw = value.to_string();
    let mut out = String::with_capacity(raw.len() + raw.len() / 3);
    for (index, ch) in raw.chars().rev().enumerate() {
        if index > 0 && index % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.chars().rev().collect()
}

/// Renders `value` with exactly `decimals` fractional digits.
///
/// Rounds on the exact binary value with ties going away from zero, so
/// `1.125` becomes `"1.13"` while `1.005` (stored just below) stays
/// `"1.00"`. `{:.N}` would round the tie to even instead.
pub fn to_fixed(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    // Every finite f64 has at most 1074 fractional digits, so this is exact.
    let exact = format!("{:.1074}", value.abs());
    let (whole, fraction) = exact.split_once('.').unwrap_or((exact.as_str(), ""));
    let fraction = fraction.as_bytes();

    let mut digits: Vec<u8> = whole.bytes().collect();
    digits.extend((0..decimals).map(|i| fraction.get(i).copied().unwrap_or(b'0')));
    if fraction.get(decimals).is_some_and(|d| *d >= b'5') {
        round_up(&mut digits);
    }

    let split = digits.len() - decimals;
    let mut out = String::with_capacity(digits.len() + 2);
    if value.is_sign_negative() && value != 0.0 {
        out.push('-');
    }
    out.push_str(&String::from_utf8_lossy(&digits[..split]));
    if decimals > 0 {
        out.push('.');
        out.push_str(&String::from_utf8_lossy(&digits[split..]));
    }
    out
}

/// Adds one to an ASCII decimal digit string, growing it on overflow.
fn round_up(digits: &mut Vec<u8>) {
    for digit in digits.iter_mut().rev() {
        if *digit == b'9' {
            *digit = b'0';
        } else {
            *digit += 1;
            return;
        }
    }
    digits.insert(0, b'1');
}

/// Scales a byte count to the largest decimal unit it reaches.
///
/// GB and MB get two decimals, KB one, plain bytes none. There is no
/// promotion across a unit boundary by rounding: `999_999` stays in KB.
pub fn format_bytes(bytes: u64) -> String {
    if bytes >= GB {
        format!("{} GB", to_fixed(bytes as f64 / GB as f64, 2))
    } else if bytes >= MB {
        format!("{} MB", to_fixed(bytes as f64 / MB as f64, 2))
    } else if bytes >= KB {
        format!("{} KB", to_fixed(bytes as f64 / KB as f64, 1))
    } else {
        format!("{bytes} B")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number_groups_thousands() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1_000), "1,000");
        assert_eq!(format_number(1_234_567), "1,234,567");
        assert_eq!(format_number(187_500_000), "187,500,000");
    }

    #[test]
    fn test_format_bytes_unit_boundaries() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(999), "999 B");
        assert_eq!(format_bytes(1_000), "1.0 KB");
        assert_eq!(format_bytes(999_999), "1000.0 KB");
        assert_eq!(format_bytes(1_000_000), "1.00 MB");
        assert_eq!(format_bytes(1_000_000_000), "1.00 GB");
    }

    #[test]
    fn test_format_bytes_precision_per_unit() {
        assert_eq!(format_bytes(187_500), "187.5 KB");
        assert_eq!(format_bytes(1_875_000), "1.88 MB");
        assert_eq!(format_bytes(3_750_000_000), "3.75 GB");
    }

    #[test]
    fn test_format_bytes_rounds_ties_up() {
        assert_eq!(format_bytes(1_250), "1.3 KB");
        assert_eq!(format_bytes(1_125_000), "1.13 MB");
        assert_eq!(format_bytes(1_125_000_000), "1.13 GB");
        assert_eq!(format_bytes(2_625_000), "2.63 MB");
    }

    #[test]
    fn test_to_fixed_ties_and_carries() {
        assert_eq!(to_fixed(0.5, 0), "1");
        assert_eq!(to_fixed(2.5, 0), "3");
        assert_eq!(to_fixed(1.125, 2), "1.13");
        assert_eq!(to_fixed(9.9999, 2), "10.00");
        assert_eq!(to_fixed(0.123_456, 4), "0.1235");
        assert_eq!(to_fixed(-1.25, 1), "-1.3");
        assert_eq!(to_fixed(42.0, 3), "42.000");
        assert_eq!(to_fixed(0.0, 2), "0.00");
    }

    #[test]
    fn test_to_fixed_uses_stored_value() {
        // 1.005 is stored as 1.00499999999999989...
        assert_eq!(to_fixed(1.005, 2), "1.00");
        assert_eq!(to_fixed(0.1 + 0.2, 1), "0.3");
    }
}
