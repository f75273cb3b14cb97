use std::time::Duration;

use crate::table;

/// Encode text into a flat string of dot/dash/space symbols.
///
/// Characters without a table entry are skipped. The codes of the
/// remaining characters are joined with a single space, the same token
/// that separates letters on the air.
pub fn encode(text: &str) -> String {
    let codes: Vec<&str> = text.chars().filter_map(table::code_for).collect();
    codes.join(" ")
}

/// One dot unit at the given speed.
///
/// PARIS standard: 50 units per word, so one unit = 60 / (WPM * 50)
/// seconds, i.e. 1200 / WPM milliseconds.
pub fn unit_duration(wpm: f32) -> Duration {
    let wpm = wpm.max(1.0);
    Duration::from_secs_f32(60.0 / (wpm * 50.0))
}

/// Physical duration of one symbol token at the given speed.
///
/// A dot is one unit; a dash is three. Any other token is a separator and
/// holds the line low for three units, the standard letter gap.
pub fn symbol_duration(symbol: char, wpm: f32) -> Duration {
    let units = match symbol {
        '.' => 1,
        '-' => 3,
        _ => 3,
    };
    unit_duration(wpm) * units
}
