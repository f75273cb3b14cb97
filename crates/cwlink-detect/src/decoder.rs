use std::time::{Duration, Instant};

use log::debug;

use cwlink_code::{char_for, unit_duration};

/// Gap and element duration thresholds driving the decoder.
///
/// A tone shorter than `dot_max` is a dot, anything longer a dash. A gap
/// of `letter_gap` or more closes the accumulated letter; `word_gap` or
/// more additionally emits a space. Durations exactly at a threshold
/// resolve to the longer classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GapTiming {
    pub dot_max: Duration,
    pub letter_gap: Duration,
    pub word_gap: Duration,
}

impl Default for GapTiming {
    fn default() -> Self {
        Self {
            dot_max: Duration::from_millis(200),
            letter_gap: Duration::from_millis(300),
            word_gap: Duration::from_millis(700),
        }
    }
}

impl GapTiming {
    /// Thresholds derived from the dot unit of a known sender speed:
    /// 2 units splits dots from dashes, 3 closes a letter, 7 a word.
    pub fn for_wpm(wpm: f32) -> Self {
        let unit = unit_duration(wpm);
        Self {
            dot_max: unit * 2,
            letter_gap: unit * 3,
            word_gap: unit * 7,
        }
    }
}

/// Timing state machine turning a boolean tone stream into characters.
///
/// Edge-triggered: state is touched only when the flag flips, and the
/// elapsed time since the previous flip classifies what just ended. An
/// accumulated code with no table entry is dropped without emitting
/// anything.
pub struct MorseDecoder {
    timing: GapTiming,
    last_tone: bool,
    last_change: Instant,
    code: String,
}

impl MorseDecoder {
    pub fn new(timing: GapTiming) -> Self {
        Self {
            timing,
            last_tone: false,
            last_change: Instant::now(),
            code: String::new(),
        }
    }

    /// Feed one tone flag with its observation time. Returns the
    /// characters decoded by this transition, in order; the batch is
    /// empty unless the flag flipped. A single off→on edge can close a
    /// letter and open a word gap at once, yielding two characters.
    pub fn push(&mut self, tone: bool, now: Instant) -> Vec<char> {
        let mut decoded = Vec::new();
        if tone == self.last_tone {
            return decoded;
        }

        let elapsed = now.saturating_duration_since(self.last_change);
        if self.last_tone {
            self.code
                .push(if elapsed < self.timing.dot_max { '.' } else { '-' });
        } else {
            if elapsed >= self.timing.letter_gap && !self.code.is_empty() {
                match char_for(&self.code) {
                    Some(ch) => decoded.push(ch),
                    None => debug!("dropping unmatched code {:?}", self.code),
                }
                self.code.clear();
            }
            if elapsed >= self.timing.word_gap {
                decoded.push(' ');
            }
        }

        self.last_change = now;
        self.last_tone = tone;
        decoded
    }

    /// Discard any partially accumulated letter and restart the clock.
    pub fn reset(&mut self, now: Instant) {
        self.last_tone = false;
        self.last_change = now;
        self.code.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(start: Instant, ms: u64) -> Instant {
        start + Duration::from_millis(ms)
    }

    #[test]
    fn repeated_state_is_ignored() {
        let mut decoder = MorseDecoder::new(GapTiming::default());
        let start = Instant::now();
        assert!(decoder.push(false, at(start, 1000)).is_empty());
        assert!(decoder.push(false, at(start, 2000)).is_empty());
    }

    #[test]
    fn short_tone_is_a_dot_long_tone_a_dash() {
        let mut decoder = MorseDecoder::new(GapTiming::default());
        let start = Instant::now();
        // ".-" with a 199 ms dot and a 201 ms dash, flushed by a letter gap.
        decoder.push(true, at(start, 0));
        decoder.push(false, at(start, 199));
        decoder.push(true, at(start, 299));
        decoder.push(false, at(start, 500));
        assert_eq!(decoder.push(true, at(start, 900)), vec!['A']);
    }

    #[test]
    fn tone_exactly_at_the_boundary_is_a_dash() {
        let mut decoder = MorseDecoder::new(GapTiming::default());
        let start = Instant::now();
        decoder.push(true, at(start, 0));
        decoder.push(false, at(start, 200));
        assert_eq!(decoder.push(true, at(start, 600)), vec!['T']);
    }

    #[test]
    fn letter_closes_only_after_the_letter_gap() {
        let mut decoder = MorseDecoder::new(GapTiming::default());
        let start = Instant::now();
        // Three 150 ms dots with 150 ms gaps stay in the accumulator.
        decoder.push(true, at(start, 0));
        decoder.push(false, at(start, 150));
        assert!(decoder.push(true, at(start, 300)).is_empty());
        decoder.push(false, at(start, 450));
        assert!(decoder.push(true, at(start, 600)).is_empty());
        decoder.push(false, at(start, 750));
        // The run decodes as one letter once the gap exceeds 300 ms.
        assert_eq!(decoder.push(true, at(start, 1151)), vec!['S']);
    }

    #[test]
    fn word_gap_emits_one_space_even_with_an_empty_accumulator() {
        let mut decoder = MorseDecoder::new(GapTiming::default());
        let start = Instant::now();
        assert_eq!(decoder.push(true, at(start, 800)), vec![' ']);
    }

    #[test]
    fn word_gap_after_a_letter_yields_letter_then_space() {
        let mut decoder = MorseDecoder::new(GapTiming::default());
        let start = Instant::now();
        decoder.push(true, at(start, 0));
        decoder.push(false, at(start, 100));
        assert_eq!(decoder.push(true, at(start, 900)), vec!['E', ' ']);
    }

    #[test]
    fn unmatched_code_is_dropped_silently() {
        let mut decoder = MorseDecoder::new(GapTiming::default());
        let start = Instant::now();
        // Seven dots match nothing in the table.
        let mut ms = 0;
        for _ in 0..7 {
            decoder.push(true, at(start, ms));
            decoder.push(false, at(start, ms + 100));
            ms += 200;
        }
        assert!(decoder.push(true, at(start, ms + 400)).is_empty());
        // The stream keeps decoding afterwards.
        decoder.push(false, at(start, ms + 500));
        assert_eq!(decoder.push(true, at(start, ms + 900)), vec!['E']);
    }

    #[test]
    fn reset_discards_the_partial_letter() {
        let mut decoder = MorseDecoder::new(GapTiming::default());
        let start = Instant::now();
        decoder.push(true, at(start, 0));
        decoder.push(false, at(start, 100));
        decoder.reset(at(start, 150));
        assert!(decoder.push(true, at(start, 600)).is_empty());
    }

    #[test]
    fn wpm_timing_scales_with_the_dot_unit() {
        let timing = GapTiming::for_wpm(20.0);
        let unit = unit_duration(20.0);
        assert_eq!(timing.dot_max, unit * 2);
        assert_eq!(timing.letter_gap, unit * 3);
        assert_eq!(timing.word_gap, unit * 7);
    }
}
