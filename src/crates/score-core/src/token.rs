use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Separator between chord pitches
pub const PITCH_SEPARATOR: char = '.';

/// Separator between a chord's pitches and its duration
pub const DURATION_SEPARATOR: char = ';';

/// Tolerance used when snapping quarter lengths to simple fractions
const SNAP_EPSILON: f64 = 1e-6;

/// Canonical string identity of a note or chord.
///
/// Two events that render to the same string are the same token, whichever
/// file or part they came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

/// Why an element could not be turned into a token
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TokenError {
    #[error("empty pitch descriptor")]
    EmptyPitch,

    #[error("pitch descriptor '{0}' contains a reserved character")]
    InvalidPitch(String),

    #[error("chord has no pitches")]
    EmptyChord,

    #[error("chord duration {0} is not a positive finite value")]
    InvalidDuration(f64),
}

impl Token {
    /// Wrap an already canonical string (e.g. one read back from an artifact)
    pub fn new(value: impl Into<String>) -> Self {
        Token(value.into())
    }

    /// Token for a single note: the pitch descriptor itself
    pub fn note(pitch: &str) -> Result<Self, TokenError> {
        validate_pitch(pitch)?;
        Ok(Token(pitch.to_string()))
    }

    /// Token for a chord: `C4.E4.G4;1.0`
    pub fn chord<S: AsRef<str>>(pitches: &[S], duration: f64) -> Result<Self, TokenError> {
        if pitches.is_empty() {
            return Err(TokenError::EmptyChord);
        }
        if !duration.is_finite() || duration <= 0.0 {
            return Err(TokenError::InvalidDuration(duration));
        }

        let mut value = String::new();
        for (i, pitch) in pitches.iter().enumerate() {
            let pitch = pitch.as_ref();
            validate_pitch(pitch)?;
            if i > 0 {
                value.push(PITCH_SEPARATOR);
            }
            value.push_str(pitch);
        }
        value.push(DURATION_SEPARATOR);
        value.push_str(&format_quarter_length(duration));

        Ok(Token(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Whether this token was derived from a chord
    pub fn is_chord(&self) -> bool {
        self.0.contains(DURATION_SEPARATOR)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Token {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Token::new(value)
    }
}

impl From<String> for Token {
    fn from(value: String) -> Self {
        Token(value)
    }
}

fn validate_pitch(pitch: &str) -> Result<(), TokenError> {
    if pitch.is_empty() {
        return Err(TokenError::EmptyPitch);
    }
    if pitch
        .chars()
        .any(|c| c == PITCH_SEPARATOR || c == DURATION_SEPARATOR || c.is_whitespace())
    {
        return Err(TokenError::InvalidPitch(pitch.to_string()));
    }
    Ok(())
}

/// Render a quarter length the way it appears inside chord tokens.
///
/// Binary fractions print as decimals with at least one fractional digit
/// (`1.0`, `0.5`, `0.25`), tuplet values as a reduced fraction (`1/3`), and
/// anything else as the shortest round-trip decimal.
pub fn format_quarter_length(quarters: f64) -> String {
    let eighths = quarters * 8.0;
    if (eighths - eighths.round()).abs() < SNAP_EPSILON {
        let snapped = eighths.round() / 8.0;
        return if snapped.fract() == 0.0 {
            format!("{:.1}", snapped)
        } else {
            format!("{}", snapped)
        };
    }

    for denominator in [3_i64, 6, 12] {
        let scaled = quarters * denominator as f64;
        if (scaled - scaled.round()).abs() < SNAP_EPSILON {
            let numerator = scaled.round() as i64;
            let divisor = gcd(numerator.abs(), denominator);
            return format!("{}/{}", numerator / divisor, denominator / divisor);
        }
    }

    format!("{}", quarters)
}

fn gcd(mut a: i64, mut b: i64) -> i64 {
    while b != 0 {
        let temp = b;
        b = a % b;
        a = temp;
    }
    a
}
