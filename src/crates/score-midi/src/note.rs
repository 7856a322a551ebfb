/// Spellings used for the twelve pitch classes, flats written with `-`
const PITCH_NAMES: [&str; 12] = [
    "C", "C#", "D", "E-", "E", "F", "F#", "G", "G#", "A", "B-", "B",
];

/// Convert a MIDI key number to a pitch descriptor (e.g. "C4", "F#5", "B-3")
///
/// Middle C (60) is `C4`.
pub fn key_to_pitch(key: u8) -> String {
    let name = PITCH_NAMES[(key % 12) as usize];
    let octave = (key / 12) as i32 - 1;

    format!("{}{}", name, octave)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_to_pitch() {
        assert_eq!(key_to_pitch(60), "C4"); // Middle C
        assert_eq!(key_to_pitch(69), "A4"); // A440
        assert_eq!(key_to_pitch(61), "C#4");
        assert_eq!(key_to_pitch(63), "E-4");
        assert_eq!(key_to_pitch(70), "B-4");
        assert_eq!(key_to_pitch(0), "C-1");
        assert_eq!(key_to_pitch(127), "G9");
    }
}
