//! Token extraction: walks a score's elements and emits annotated tokens.

use log::warn;

use crate::element::{resolve_instrument_name, AnnotatedEvent, ScoreElement, UNKNOWN_INSTRUMENT};
use crate::error::ElementError;
use crate::token::Token;

/// State carried through a single score traversal.
///
/// Each score gets a fresh instance, so nothing leaks between files.
#[derive(Debug, Clone)]
pub struct TraversalState {
    current_instrument: String,
}

impl TraversalState {
    pub fn new() -> Self {
        TraversalState {
            current_instrument: UNKNOWN_INSTRUMENT.to_string(),
        }
    }

    pub fn current_instrument(&self) -> &str {
        &self.current_instrument
    }
}

impl Default for TraversalState {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything produced by walking one score
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Annotated tokens in traversal order
    pub events: Vec<AnnotatedEvent>,
    /// Instruments declared by markers, first-seen order, no duplicates
    pub instruments: Vec<String>,
    /// Elements that were skipped because they could not be tokenized
    pub skipped: Vec<ElementError>,
}

/// Walk `elements` in order and emit an [`AnnotatedEvent`] per note or chord.
///
/// Malformed elements are logged and recorded in [`Extraction::skipped`];
/// they never stop the traversal.
pub fn extract_tokens<I>(elements: I) -> Extraction
where
    I: IntoIterator<Item = ScoreElement>,
{
    let mut state = TraversalState::new();
    let mut extraction = Extraction::default();

    for (index, element) in elements.into_iter().enumerate() {
        match visit(&mut state, &mut extraction.instruments, element) {
            Ok(Some(event)) => extraction.events.push(event),
            Ok(None) => {}
            Err(reason) => {
                let error = ElementError {
                    index,
                    instrument: state.current_instrument.clone(),
                    reason,
                };
                warn!("Skipping {}", error);
                extraction.skipped.push(error);
            }
        }
    }

    extraction
}

fn visit(
    state: &mut TraversalState,
    instruments: &mut Vec<String>,
    element: ScoreElement,
) -> Result<Option<AnnotatedEvent>, String> {
    match element {
        ScoreElement::Instrument { name } => {
            let name = resolve_instrument_name(name.as_deref());
            if !instruments.contains(&name) {
                instruments.push(name.clone());
            }
            state.current_instrument = name;
            Ok(None)
        }
        ScoreElement::Note { pitch, offset } => {
            check_offset(offset)?;
            let token = Token::note(&pitch).map_err(|e| e.to_string())?;
            Ok(Some(AnnotatedEvent::new(
                token,
                offset,
                state.current_instrument.as_str(),
            )))
        }
        ScoreElement::Chord {
            pitches,
            duration,
            offset,
        } => {
            check_offset(offset)?;
            let token = Token::chord(&pitches, duration).map_err(|e| e.to_string())?;
            Ok(Some(AnnotatedEvent::new(
                token,
                offset,
                state.current_instrument.as_str(),
            )))
        }
    }
}

fn check_offset(offset: f64) -> Result<(), String> {
    if offset.is_finite() && offset >= 0.0 {
        Ok(())
    } else {
        Err(format!("offset {} is not a non-negative finite value", offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(extraction: &Extraction) -> Vec<(&str, f64, &str)> {
        extraction
            .events
            .iter()
            .map(|e| (e.token.as_str(), e.offset, e.instrument.as_str()))
            .collect()
    }

    #[test]
    fn test_notes_before_any_marker_are_unknown() {
        let extraction = extract_tokens(vec![ScoreElement::note("C4", 0.0)]);
        assert_eq!(tokens(&extraction), vec![("C4", 0.0, "Unknown")]);
        assert!(extraction.instruments.is_empty());
    }

    #[test]
    fn test_marker_switches_instrument() {
        let extraction = extract_tokens(vec![
            ScoreElement::instrument("Piano"),
            ScoreElement::note("C4", 0.0),
            ScoreElement::chord(["C4", "E4", "G4"], 1.0, 1.0),
            ScoreElement::instrument("Violin"),
            ScoreElement::note("A4", 0.5),
        ]);

        assert_eq!(
            tokens(&extraction),
            vec![
                ("C4", 0.0, "Piano"),
                ("C4.E4.G4;1.0", 1.0, "Piano"),
                ("A4", 0.5, "Violin"),
            ]
        );
        assert_eq!(extraction.instruments, vec!["Piano", "Violin"]);
        assert!(extraction.skipped.is_empty());
    }

    #[test]
    fn test_unnamed_marker_falls_back_to_unknown() {
        let extraction = extract_tokens(vec![
            ScoreElement::instrument("Flute"),
            ScoreElement::Instrument { name: None },
            ScoreElement::note("D5", 2.0),
        ]);
        assert_eq!(tokens(&extraction), vec![("D5", 2.0, "Unknown")]);
        assert_eq!(extraction.instruments, vec!["Flute", "Unknown"]);
    }

    #[test]
    fn test_malformed_elements_are_skipped() {
        let extraction = extract_tokens(vec![
            ScoreElement::instrument("Piano"),
            ScoreElement::note("C4", 0.0),
            ScoreElement::note("", 1.0),
            ScoreElement::chord(Vec::<String>::new(), 1.0, 2.0),
            ScoreElement::note("E4", f64::NAN),
            ScoreElement::note("G4", -1.0),
            ScoreElement::chord(["C4", "E4"], 0.0, 3.0),
            ScoreElement::note("D4", 4.0),
        ]);

        assert_eq!(
            tokens(&extraction),
            vec![("C4", 0.0, "Piano"), ("D4", 4.0, "Piano")]
        );
        let indices: Vec<usize> = extraction.skipped.iter().map(|e| e.index).collect();
        assert_eq!(indices, vec![2, 3, 4, 5, 6]);
        assert!(extraction.skipped.iter().all(|e| e.instrument == "Piano"));
    }

    #[test]
    fn test_offsets_are_preserved() {
        let extraction = extract_tokens(vec![
            ScoreElement::note("C4", 0.0),
            ScoreElement::note("C4", 0.333),
            ScoreElement::note("C4", 12.75),
        ]);
        let offsets: Vec<f64> = extraction.events.iter().map(|e| e.offset).collect();
        assert_eq!(offsets, vec![0.0, 0.333, 12.75]);
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let elements = vec![
            ScoreElement::instrument("Piano"),
            ScoreElement::note("C4", 0.0),
            ScoreElement::chord(["C4", "E4"], 0.5, 1.0),
            ScoreElement::note("", 1.5),
        ];
        let a = extract_tokens(elements.clone());
        let b = extract_tokens(elements);
        assert_eq!(a.events, b.events);
        assert_eq!(a.skipped, b.skipped);
    }
}
