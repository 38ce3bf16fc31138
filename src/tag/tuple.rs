//! Lenient parsing of the numeric values stored in the track (`trkn`), disc (`disk`) and bpm
//! (`tmpo`) atoms.
//!
//! Values are read like C's `atoi`: leading whitespace and an optional `+` are skipped, then as
//! many decimal digits as present are read. Anything else yields 0. Values larger than
//! `u16::MAX` are clamped.

/// Parses the leading number of the string.
pub fn parse_number(value: &str) -> u16 {
    let digits = value.trim_start().strip_prefix('+').unwrap_or_else(|| value.trim_start());

    let mut number: u32 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        number = number.saturating_mul(10).saturating_add((b - b'0') as u32);
    }

    number.min(u16::MAX as u32) as u16
}

/// Parses a number and total pair. The total is taken from the separate `total` value if
/// present, otherwise from a `number/total` notation of the value itself. A missing total is 0.
pub fn parse_tuple(value: &str, total: Option<&str>) -> (u16, u16) {
    let number = parse_number(value);
    let total = match total {
        Some(t) => parse_number(t),
        None => value.split_once('/').map_or(0, |(_, t)| parse_number(t)),
    };

    (number, total)
}
