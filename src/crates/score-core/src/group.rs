//! Partition of annotated events by the instrument that produced them.

use log::info;
use std::collections::HashMap;

use crate::element::AnnotatedEvent;
use crate::token::Token;

/// A token and its offset within its source piece
pub type TimedToken = (Token, f64);

/// Ordered mapping from instrument name to its timed tokens.
///
/// Instruments are kept in order of first appearance and every group holds at
/// least one event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstrumentGroups {
    groups: Vec<(String, Vec<TimedToken>)>,
    index: HashMap<String, usize>,
}

impl InstrumentGroups {
    fn push(&mut self, event: AnnotatedEvent) {
        let slot = match self.index.get(&event.instrument) {
            Some(&slot) => slot,
            None => {
                let slot = self.groups.len();
                self.index.insert(event.instrument.clone(), slot);
                self.groups.push((event.instrument, Vec::new()));
                slot
            }
        };
        self.groups[slot].1.push((event.token, event.offset));
    }

    pub fn get(&self, instrument: &str) -> Option<&[TimedToken]> {
        self.index
            .get(instrument)
            .map(|&slot| self.groups[slot].1.as_slice())
    }

    pub fn contains(&self, instrument: &str) -> bool {
        self.index.contains_key(instrument)
    }

    /// Instrument names in first-appearance order
    pub fn instruments(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[TimedToken])> {
        self.groups
            .iter()
            .map(|(name, events)| (name.as_str(), events.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of events across all instruments
    pub fn event_count(&self) -> usize {
        self.groups.iter().map(|(_, events)| events.len()).sum()
    }
}

impl IntoIterator for InstrumentGroups {
    type Item = (String, Vec<TimedToken>);
    type IntoIter = std::vec::IntoIter<(String, Vec<TimedToken>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}

/// Result of grouping a corpus
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grouping {
    pub groups: InstrumentGroups,
    /// Declared instruments that contributed no events, in declaration order
    pub omitted: Vec<String>,
}

/// Incrementally groups events while remembering every declared instrument
#[derive(Debug, Default)]
pub struct InstrumentGrouper {
    groups: InstrumentGroups,
    declared: Vec<String>,
}

impl InstrumentGrouper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Note that an instrument exists even if it never produces an event
    pub fn declare(&mut self, instrument: &str) {
        if !self.declared.iter().any(|d| d == instrument) {
            self.declared.push(instrument.to_string());
        }
    }

    pub fn push(&mut self, event: AnnotatedEvent) {
        self.groups.push(event);
    }

    pub fn extend<I: IntoIterator<Item = AnnotatedEvent>>(&mut self, events: I) {
        for event in events {
            self.push(event);
        }
    }

    pub fn finish(self) -> Grouping {
        let omitted: Vec<String> = self
            .declared
            .into_iter()
            .filter(|name| !self.groups.contains(name))
            .collect();

        for name in &omitted {
            info!("Instrument {} has no events, no group produced", name);
        }

        Grouping {
            groups: self.groups,
            omitted,
        }
    }
}

/// Group a flat event sequence by instrument, preserving encounter order
pub fn group_by_instrument<I>(events: I) -> InstrumentGroups
where
    I: IntoIterator<Item = AnnotatedEvent>,
{
    let mut grouper = InstrumentGrouper::new();
    grouper.extend(events);
    grouper.finish().groups
}
