use phf::phf_map;

/// Inter-word marker: the code mapped to the space character.
pub const WORD_GAP_CODE: &str = "/";

/// ITU Morse table, keyed by uppercase character.
static MORSE_TABLE: phf::Map<&'static str, &'static str> = phf_map! {
    "A" => ".-",
    "B" => "-...",
    "C" => "-.-.",
    "D" => "-..",
    "E" => ".",
    "F" => "..-.",
    "G" => "--.",
    "H" => "....",
    "I" => "..",
    "J" => ".---",
    "K" => "-.-",
    "L" => ".-..",
    "M" => "--",
    "N" => "-.",
    "O" => "---",
    "P" => ".--.",
    "Q" => "--.-",
    "R" => ".-.",
    "S" => "...",
    "T" => "-",
    "U" => "..-",
    "V" => "...-",
    "W" => ".--",
    "X" => "-..-",
    "Y" => "-.--",
    "Z" => "--..",
    "0" => "-----",
    "1" => ".----",
    "2" => "..---",
    "3" => "...--",
    "4" => "....-",
    "5" => ".....",
    "6" => "-....",
    "7" => "--...",
    "8" => "---..",
    "9" => "----.",
    "." => ".-.-.-",
    "," => "--..--",
    "?" => "..--..",
    "'" => ".----.",
    "!" => "-.-.--",
    "/" => "-..-.",
    "(" => "-.--.",
    ")" => "-.--.-",
    "&" => ".-...",
    ":" => "---...",
    ";" => "-.-.-.",
    "=" => "-...-",
    "+" => ".-.-.",
    "-" => "-....-",
    "_" => "..--.-",
    "\"" => ".-..-.",
    "$" => "...-..-",
    "@" => ".--.-.",
    " " => "/",
};

/// Look up the code for a character. Lookup is case-insensitive.
pub fn code_for(ch: char) -> Option<&'static str> {
    let key = ch.to_ascii_uppercase().to_string();
    MORSE_TABLE.get(key.as_str()).copied()
}

/// Reverse lookup: resolve a dot/dash code to its character.
///
/// Codes are unique within the table, so a linear scan finds the only
/// possible match.
pub fn char_for(code: &str) -> Option<char> {
    MORSE_TABLE
        .entries()
        .find(|(_, mapped)| **mapped == code)
        .and_then(|(key, _)| key.chars().next())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(code_for('s'), Some("..."));
        assert_eq!(code_for('S'), Some("..."));
        assert_eq!(code_for('q'), Some("--.-"));
    }

    #[test]
    fn space_maps_to_word_gap_code() {
        assert_eq!(code_for(' '), Some(WORD_GAP_CODE));
    }

    #[test]
    fn unmapped_characters_have_no_code() {
        assert_eq!(code_for('#'), None);
        assert_eq!(code_for('\t'), None);
        assert_eq!(code_for('ä'), None);
    }

    #[test]
    fn every_entry_reverse_resolves_to_itself() {
        for (key, code) in MORSE_TABLE.entries() {
            let ch = key.chars().next().unwrap();
            assert_eq!(char_for(code), Some(ch), "code {:?}", code);
        }
    }

    #[test]
    fn unknown_code_resolves_to_nothing() {
        assert_eq!(char_for("......."), None);
        assert_eq!(char_for(""), None);
    }
}
