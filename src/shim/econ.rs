// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::str::FromStr;

use num_bigint::{BigInt, Sign};
use num_traits::Zero as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An amount of the network's native token, denominated in its smallest unit.
///
/// Amounts are never negative. They render as plain decimal integers and are
/// serialized as decimal strings so that arbitrarily large values survive JSON.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct TokenAmount(BigInt);

impl TokenAmount {
    pub fn from_atto(atto: impl Into<BigInt>) -> Self {
        let atto = atto.into();
        debug_assert!(atto.sign() != Sign::Minus, "token amounts are non-negative");
        TokenAmount(atto)
    }

    pub fn atto(&self) -> &BigInt {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl std::fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseTokenAmountError {
    #[error("invalid token amount {0:?}: not a decimal integer")]
    NotDecimal(String),
    #[error("invalid token amount {0:?}: must not be negative")]
    Negative(String),
}

impl FromStr for TokenAmount {
    type Err = ParseTokenAmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit() || b == b'-') {
            return Err(ParseTokenAmountError::NotDecimal(s.to_owned()));
        }
        let atto = BigInt::from_str(trimmed)
            .map_err(|_| ParseTokenAmountError::NotDecimal(s.to_owned()))?;
        if atto.sign() == Sign::Minus {
            return Err(ParseTokenAmountError::Negative(s.to_owned()));
        }
        Ok(TokenAmount(atto))
    }
}

impl Serialize for TokenAmount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TokenAmount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
impl quickcheck::Arbitrary for TokenAmount {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        TokenAmount::from_atto(u64::arbitrary(g))
    }
}
