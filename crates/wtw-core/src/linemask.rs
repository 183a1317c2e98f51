//! Bit-vector encoding of line numbers.
//!
//! Line `n` is bit `n % 8` of byte `n / 8`, so line 0 is the lowest bit of the
//! first byte. Coverage baselines store their `numbits` column in the same
//! layout, which lets a staged diff mask be tested against recorded coverage
//! without decoding either side.

use crate::{EncodingError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineMask(Vec<u8>);

impl LineMask {
    /// Encodes `lines` into the smallest mask that covers the highest line.
    ///
    /// # Errors
    ///
    /// Returns [`EncodingError::EmptyLineSet`] if `lines` yields nothing.
    pub fn encode<I>(lines: I) -> Result<Self>
    where
        I: IntoIterator<Item = u32>,
    {
        let lines: Vec<u32> = lines.into_iter().collect();
        let highest = lines
            .iter()
            .copied()
            .max()
            .ok_or(EncodingError::EmptyLineSet)?;

        let mut bytes = vec![0u8; highest as usize / 8 + 1];
        for line in lines {
            bytes[line as usize / 8] |= 1u8 << (line % 8);
        }

        Ok(Self(bytes))
    }

    #[must_use]
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Decodes the mask back into ascending line numbers.
    pub fn lines(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().zip(0u32..).flat_map(|(byte, index)| {
            (0..8u32)
                .filter(move |bit| byte & (1u8 << bit) != 0)
                .map(move |bit| index * 8 + bit)
        })
    }

    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        intersects(&self.0, &other.0)
    }

    #[must_use]
    pub fn contains(&self, line: u32) -> bool {
        contains(&self.0, i64::from(line))
    }
}

/// True iff some bit is set in both masks. The shorter mask behaves as if it
/// were zero-padded to the length of the longer one.
#[must_use]
pub fn intersects(a: &[u8], b: &[u8]) -> bool {
    a.iter().zip(b).any(|(x, y)| x & y != 0)
}

/// True iff `line` is set in `mask`. Negative lines never match; baselines
/// use them for arc entry and exit points.
#[must_use]
pub fn contains(mask: &[u8], line: i64) -> bool {
    let Ok(line) = usize::try_from(line) else {
        return false;
    };
    mask.get(line / 8)
        .is_some_and(|byte| byte & (1u8 << (line % 8)) != 0)
}
