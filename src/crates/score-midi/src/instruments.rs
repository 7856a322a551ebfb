//! General MIDI program numbers mapped to performer-facing instrument names.
//!
//! Closely related programs share a name (all acoustic pianos are "Piano"),
//! so a corpus groups by instrument rather than by patch variant.

/// MIDI channel 10 (index 9) is reserved for percussion
pub const PERCUSSION_CHANNEL: u8 = 9;

/// Name reported for parts on the percussion channel
pub const PERCUSSION_NAME: &str = "Percussion";

/// Map a MIDI program number (0-127) to an instrument name
pub fn program_instrument_name(program: u8) -> &'static str {
    match program {
        // Piano (0-7)
        0..=2 => "Piano",
        3 => "Honky-Tonk Piano",
        4..=5 => "Electric Piano",
        6 => "Harpsichord",
        7 => "Clavichord",

        // Chromatic Percussion (8-15)
        8 => "Celesta",
        9 => "Glockenspiel",
        10 => "Music Box",
        11 => "Vibraphone",
        12 => "Marimba",
        13 => "Xylophone",
        14 => "Tubular Bells",
        15 => "Dulcimer",

        // Organ (16-23)
        16..=18 => "Electric Organ",
        19 => "Pipe Organ",
        20 => "Reed Organ",
        21 | 23 => "Accordion",
        22 => "Harmonica",

        // Guitar (24-31)
        24..=25 => "Acoustic Guitar",
        26..=31 => "Electric Guitar",

        // Bass (32-39)
        32 => "Acoustic Bass",
        33..=34 | 36..=39 => "Electric Bass",
        35 => "Fretless Bass",

        // Strings (40-47)
        40 => "Violin",
        41 => "Viola",
        42 => "Violoncello",
        43 => "Contrabass",
        44..=45 => "Strings",
        46 => "Harp",
        47 => "Timpani",

        // Ensemble (48-55)
        48..=51 => "String Ensemble",
        52..=53 => "Choir",
        54 => "Vocalist",
        55 => "Orchestra Hit",

        // Brass (56-63)
        56 | 59 => "Trumpet",
        57 => "Trombone",
        58 => "Tuba",
        60 => "Horn",
        61..=63 => "Brass",

        // Reed (64-71)
        64 => "Soprano Saxophone",
        65 => "Alto Saxophone",
        66 => "Tenor Saxophone",
        67 => "Baritone Saxophone",
        68 => "Oboe",
        69 => "English Horn",
        70 => "Bassoon",
        71 => "Clarinet",

        // Pipe (72-79)
        72 => "Piccolo",
        73 => "Flute",
        74 => "Recorder",
        75 => "Pan Flute",
        76 => "Bottle",
        77 => "Shakuhachi",
        78 => "Whistle",
        79 => "Ocarina",

        // Synth Lead, Pad and Effects (80-103)
        80..=87 => "Synth Lead",
        88..=95 => "Synth Pad",
        96..=103 => "Synth Effects",

        // Ethnic (104-111)
        104 => "Sitar",
        105 => "Banjo",
        106 => "Shamisen",
        107 => "Koto",
        108 => "Kalimba",
        109 => "Bagpipes",
        110 => "Fiddle",
        111 => "Shehnai",

        // Percussive (112-119)
        112 => "Handbells",
        113 => "Agogo",
        114 => "Steel Drum",
        115 => "Woodblock",
        116 => "Taiko Drum",
        117 => "Tom-Tom",
        118 => "Synth Drum",
        119 => "Cymbal",

        // Sound Effects (120-127)
        _ => "Sound Effects",
    }
}

/// Pick the name for a part: percussion channel first, then the GM program,
/// then the track name. `None` means nothing usable was found.
pub fn part_instrument_name(
    channel: u8,
    program: Option<u8>,
    track_name: Option<&str>,
) -> Option<String> {
    if channel == PERCUSSION_CHANNEL {
        return Some(PERCUSSION_NAME.to_string());
    }

    if let Some(prog) = program {
        return Some(program_instrument_name(prog).to_string());
    }

    track_name
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_names() {
        assert_eq!(program_instrument_name(0), "Piano");
        assert_eq!(program_instrument_name(1), "Piano");
        assert_eq!(program_instrument_name(40), "Violin");
        assert_eq!(program_instrument_name(42), "Violoncello");
        assert_eq!(program_instrument_name(73), "Flute");
        assert_eq!(program_instrument_name(127), "Sound Effects");
    }

    #[test]
    fn test_part_name_precedence() {
        assert_eq!(
            part_instrument_name(9, Some(0), Some("Drums")).as_deref(),
            Some("Percussion")
        );
        assert_eq!(
            part_instrument_name(0, Some(40), Some("Lead Line")).as_deref(),
            Some("Violin")
        );
        assert_eq!(
            part_instrument_name(0, None, Some("  Lead Line ")).as_deref(),
            Some("Lead Line")
        );
        assert_eq!(part_instrument_name(0, None, Some("   ")), None);
        assert_eq!(part_instrument_name(0, None, None), None);
    }
}
