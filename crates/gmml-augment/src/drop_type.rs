//! Replacement strategies for corrupted blocks.
//!
//! A [`DropTypeSet`] is parsed from a `-`-delimited string such as
//! `"noise-zeros-rand"`. One [`DropStrategy`] is drawn from it per dropper
//! call. Its cardinality also sets how often batch corruption reuses a
//! prior result, see [`DropTypeSet::reuse_probability`].
//!
//! ```rust
//! use gmml_augment::{DropStrategy, DropTypeSet};
//!
//! let set: DropTypeSet = "noise-zeros-rand".parse().unwrap();
//! assert_eq!(set.len(), 3);
//! assert_eq!(set.strategies(), vec![DropStrategy::Noise, DropStrategy::Zeros, DropStrategy::SelfCopy]);
//! assert_eq!(set.reuse_probability(), 0.25);
//! ```

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Token delimiter in drop-type strings.
pub const DROP_TYPE_DELIMITER: char = '-';

/// What a corrupted block is filled with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropStrategy {
    /// Independent standard-normal samples.
    Noise,
    /// Zeros.
    Zeros,
    /// Content copied from another aligned position of the same image.
    SelfCopy,
}

impl DropStrategy {
    /// Maps a token to a strategy.
    ///
    /// `"noise"` and `"zeros"` are synthetic fills; `"rand"` and every
    /// unrecognized token mean self-copy.
    pub fn from_token(token: &str) -> Self {
        match token {
            "noise" => Self::Noise,
            "zeros" => Self::Zeros,
            _ => Self::SelfCopy,
        }
    }

    /// Returns the canonical token for this strategy.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Noise => "noise",
            Self::Zeros => "zeros",
            Self::SelfCopy => "rand",
        }
    }
}

impl fmt::Display for DropStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered set of drop-type tokens.
///
/// Tokens are kept verbatim so the set prints back the way it was written.
/// An empty string parses to an empty set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct DropTypeSet {
    tokens: Vec<String>,
}

impl DropTypeSet {
    /// Creates a set from individual tokens.
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses a delimited string. Never fails.
    pub fn parse(s: &str) -> Self {
        if s.is_empty() {
            return Self::default();
        }
        Self::new(s.split(DROP_TYPE_DELIMITER))
    }

    /// Number of tokens.
    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns `true` if the set has no tokens.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Raw tokens in order.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Strategies in token order.
    pub fn strategies(&self) -> Vec<DropStrategy> {
        self.tokens.iter().map(|t| DropStrategy::from_token(t)).collect()
    }

    /// Draws one strategy uniformly from the tokens.
    ///
    /// An empty set yields [`DropStrategy::SelfCopy`], the same fall-through
    /// an unrecognized token gets.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> DropStrategy {
        self.tokens
            .choose(rng)
            .map(|t| DropStrategy::from_token(t))
            .unwrap_or(DropStrategy::SelfCopy)
    }

    /// Probability that batch corruption reuses a prior result:
    /// `1 / (len + 1)`, or `1` for an empty set.
    pub fn reuse_probability(&self) -> f64 {
        if self.is_empty() {
            1.0
        } else {
            1.0 / (self.len() as f64 + 1.0)
        }
    }
}

impl FromStr for DropTypeSet {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<String> for DropTypeSet {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<&str> for DropTypeSet {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<DropTypeSet> for String {
    fn from(set: DropTypeSet) -> Self {
        set.to_string()
    }
}

impl fmt::Display for DropTypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for token in &self.tokens {
            if !first {
                write!(f, "{}", DROP_TYPE_DELIMITER)?;
            }
            f.write_str(token)?;
            first = false;
        }
        Ok(())
    }
}
