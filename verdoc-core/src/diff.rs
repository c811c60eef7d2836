//! Positional character diff.
//!
//! The codec compares two strings index by index. It never realigns, so an
//! insertion near the start makes every later position look changed. Stored
//! patches and golden outputs depend on exactly this behaviour.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Token {
    /// Same character at this position in both texts.
    Keep(char),
    /// Character present in the old text only.
    Remove(char),
    /// Character present in the new text only.
    Insert(char),
}

impl Token {
    pub fn is_change(&self) -> bool {
        !matches!(self, Token::Keep(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Patch {
    tokens: Vec<Token>,
}

impl Patch {
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn change_count(&self) -> usize {
        self.tokens.iter().filter(|t| t.is_change()).count()
    }
}

impl From<Vec<Token>> for Patch {
    fn from(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }
}

impl fmt::Display for Patch {
    /// Classic bracket form: `ab[-c][+x]d`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.tokens {
            match token {
                Token::Keep(c) => write!(f, "{}", c)?,
                Token::Remove(c) => write!(f, "[-{}]", c)?,
                Token::Insert(c) => write!(f, "[+{}]", c)?,
            }
        }
        Ok(())
    }
}

/// Encodes the difference between `old` and `new`.
pub fn encode(old: &str, new: &str) -> Patch {
    let mut old_chars = old.chars();
    let mut new_chars = new.chars();
    let mut tokens = Vec::with_capacity(old.len().max(new.len()));

    loop {
        match (old_chars.next(), new_chars.next()) {
            (None, None) => break,
            (Some(o), Some(n)) if o == n => tokens.push(Token::Keep(o)),
            (o, n) => {
                if let Some(o) = o {
                    tokens.push(Token::Remove(o));
                }
                if let Some(n) = n {
                    tokens.push(Token::Insert(n));
                }
            }
        }
    }

    Patch { tokens }
}

/// Replays `patch`. Kept characters are taken from the patch itself, so the
/// result does not read `base`; the argument keeps the call sites honest
/// about which text a patch was derived against.
pub fn decode(_base: &str, patch: &Patch) -> String {
    patch
        .tokens
        .iter()
        .filter_map(|token| match token {
            Token::Keep(c) | Token::Insert(c) => Some(*c),
            Token::Remove(_) => None,
        })
        .collect()
}
