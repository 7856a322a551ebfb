//! Categorical encoding of one instrument's token stream.
//!
//! Codes are handed out in first-encounter order starting at 0. The mapping
//! keeps two aligned tables (token to code, code to token) so every code that
//! was ever emitted can be inverted.

use std::collections::HashMap;

use crate::error::{FeatureError, Result};
use crate::token::Token;

/// Bijection between tokens and their integer codes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CodeMapping {
    codes: HashMap<Token, u32>,
    tokens: Vec<Token>,
}

impl CodeMapping {
    /// Rebuild a mapping from an inverse table, where position is the code
    pub fn from_inverse<I>(tokens: I) -> Result<Self>
    where
        I: IntoIterator<Item = Token>,
    {
        let mut mapping = CodeMapping::default();
        for token in tokens {
            if mapping.codes.contains_key(&token) {
                return Err(FeatureError::DuplicateToken(token.into_string()));
            }
            mapping.insert(token)?;
        }
        Ok(mapping)
    }

    fn insert(&mut self, token: Token) -> Result<u32> {
        let code = next_code(self.tokens.len())?;
        self.codes.insert(token.clone(), code);
        self.tokens.push(token);
        Ok(code)
    }

    fn code_or_insert(&mut self, token: &Token) -> Result<u32> {
        match self.codes.get(token) {
            Some(&code) => Ok(code),
            None => self.insert(token.clone()),
        }
    }

    /// Code assigned to `token`, if it was seen
    pub fn code(&self, token: &str) -> Option<u32> {
        self.codes.get(token).copied()
    }

    /// Token for `code`; fails for codes this mapping never assigned
    pub fn decode(&self, code: u32) -> Result<&Token> {
        self.tokens
            .get(code as usize)
            .ok_or(FeatureError::UnknownCode {
                code,
                len: self.tokens.len(),
            })
    }

    pub fn decode_all(&self, codes: &[u32]) -> Result<Vec<&Token>> {
        codes.iter().map(|&code| self.decode(code)).collect()
    }

    /// The full inverse table, indexed by code
    pub fn inverse(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Code for the token after `assigned` distinct ones
fn next_code(assigned: usize) -> Result<u32> {
    u32::try_from(assigned).map_err(|_| FeatureError::VocabularyOverflow)
}

/// Codes for a token sequence plus the mapping that produced them
#[derive(Debug, Clone, PartialEq)]
pub struct Encoded {
    pub codes: Vec<u32>,
    pub mapping: CodeMapping,
}

/// Assign codes in first-encounter order and encode `tokens` in input order
pub fn encode<'a, I>(tokens: I) -> Result<Encoded>
where
    I: IntoIterator<Item = &'a Token>,
{
    let mut mapping = CodeMapping::default();
    let codes = tokens
        .into_iter()
        .map(|token| mapping.code_or_insert(token))
        .collect::<Result<Vec<u32>>>()?;

    if codes.is_empty() {
        return Err(FeatureError::EmptyGroup(String::new()));
    }

    Ok(Encoded { codes, mapping })
}
