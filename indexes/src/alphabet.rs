// Byte alphabet handling for sentinel-terminated texts.
// The indexes reserve 0 and 1: 1 is the terminator appended to every text,
// 0 stays unused. A text containing either value is remapped bijectively
// into [2, 255] in increasing byte order before construction.
use log::debug;
use rayon::prelude::*;

use crate::{IndexError, Result};

/// Terminator appended to every indexed text.
pub const SENTINEL: u8 = 1;

/// Largest number of distinct bytes a remapped text may contain.
pub const MAX_REMAPPED: usize = 253;

/// Marks an unmapped entry in the forward table; never a valid image.
const ABSENT: u8 = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlphabetMap {
    forward: [u8; 256],
    inverse: [u8; 256],
    identity: bool,
}

impl Default for AlphabetMap {
    fn default() -> Self {
        Self::identity()
    }
}

impl AlphabetMap {
    /// Leaves bytes 2..=255 untouched. Bytes 0 and 1 have no image.
    pub fn identity() -> Self {
        let mut forward = [ABSENT; 256];
        let mut inverse = [0u8; 256];
        for b in 2..=255u8 {
            forward[b as usize] = b;
            inverse[b as usize] = b;
        }
        Self {
            forward,
            inverse,
            identity: true,
        }
    }

    /// Chooses the identity when the text avoids 0 and 1, a dense remapping
    /// otherwise.
    pub fn for_text(text: &[u8]) -> Result<Self> {
        let present = presence(text);
        if !present[0] && !present[1] {
            return Ok(Self::identity());
        }
        Self::remapping(&present)
    }

    /// Dense remapping of every present byte into [2, 255].
    pub fn remapping(present: &[bool; 256]) -> Result<Self> {
        let distinct = present.iter().filter(|&&p| p).count();
        if distinct > MAX_REMAPPED {
            return Err(IndexError::AlphabetTooLarge {
                distinct,
                max: MAX_REMAPPED,
            });
        }

        let mut forward = [ABSENT; 256];
        let mut inverse = [0u8; 256];
        let mut next = 2u8;
        for (byte, _) in present.iter().enumerate().filter(|(_, p)| **p) {
            forward[byte] = next;
            inverse[next as usize] = byte as u8;
            next += 1;
        }
        debug!("alphabet: remapping {} distinct bytes into [2, {}]", distinct, next - 1);

        Ok(Self {
            forward,
            inverse,
            identity: false,
        })
    }

    pub fn is_identity(&self) -> bool {
        self.identity
    }

    pub fn map_byte(&self, byte: u8) -> Option<u8> {
        match self.forward[byte as usize] {
            ABSENT => None,
            mapped => Some(mapped),
        }
    }

    pub fn unmap_byte(&self, mapped: u8) -> u8 {
        self.inverse[mapped as usize]
    }

    /// Maps `pattern` into `out`. Returns false if some byte has no image,
    /// in which case the pattern cannot occur in the text.
    pub fn map_pattern(&self, pattern: &[u8], out: &mut Vec<u8>) -> bool {
        out.clear();
        for &b in pattern {
            match self.map_byte(b) {
                Some(m) => out.push(m),
                None => return false,
            }
        }
        true
    }

    pub fn apply(&self, text: &mut [u8]) {
        if self.identity {
            return;
        }
        text.par_iter_mut()
            .for_each(|b| *b = self.forward[*b as usize]);
    }

    pub fn invert(&self, text: &mut [u8]) {
        if self.identity {
            return;
        }
        text.par_iter_mut()
            .for_each(|b| *b = self.inverse[*b as usize]);
    }

    /// Serialized form: the 256-entry forward table.
    pub fn to_bytes(&self) -> [u8; 256] {
        self.forward
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != 256 {
            return None;
        }
        let identity = Self::identity();
        if bytes == identity.forward.as_slice() {
            return Some(identity);
        }

        let mut forward = [ABSENT; 256];
        let mut inverse = [0u8; 256];
        let mut seen = [false; 256];
        for (byte, &mapped) in bytes.iter().enumerate() {
            if mapped == ABSENT {
                continue;
            }
            if mapped == 1 || seen[mapped as usize] {
                return None;
            }
            seen[mapped as usize] = true;
            forward[byte] = mapped;
            inverse[mapped as usize] = byte as u8;
        }

        Some(Self {
            forward,
            inverse,
            identity: false,
        })
    }
}

/// Byte presence table. Each rayon worker fills its own table, the tables
/// are merged at the end.
pub fn presence(text: &[u8]) -> [bool; 256] {
    text.par_chunks(1 << 16)
        .fold(
            || [false; 256],
            |mut acc, chunk| {
                for &b in chunk {
                    acc[b as usize] = true;
                }
                acc
            },
        )
        .reduce(
            || [false; 256],
            |mut a, b| {
                for i in 0..256 {
                    a[i] |= b[i];
                }
                a
            },
        )
}

/// Copies `text`, remaps it if needed and appends the sentinel.
pub fn terminated(text: &[u8]) -> Result<(Vec<u8>, AlphabetMap)> {
    let map = AlphabetMap::for_text(text)?;
    let mut out = Vec::with_capacity(text.len() + 1);
    out.extend_from_slice(text);
    map.apply(&mut out);
    out.push(SENTINEL);
    Ok((out, map))
}
