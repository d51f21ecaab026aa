//! Zobrist keys, generated at compile time from a splitmix64 stream.

use super::{Color, Piece};

pub struct ZobristKeys {
    /// `[color][piece][square]`; piece index 0 is unused.
    pub pieces: [[[u64; 64]; 7]; 2],
    pub white_move: u64,
    /// White king side, white queen side, black king side, black queen side.
    pub castling: [u64; 4],
    /// Indexed by file of the en-passant target, a-file first.
    pub en_passant: [u64; 8],
}

/// Singular-extension searches store under `key ^ EXCLUSION_KEY`.
pub const EXCLUSION_KEY: u64 = 0x5472_a279_25a2_a2f5;

const fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

const fn build() -> ZobristKeys {
    let mut seed = 0xF00D_F00D_DEAD_BEEF;
    let mut pieces = [[[0u64; 64]; 7]; 2];
    let mut c = 0;
    while c < 2 {
        let mut p = 1;
        while p < 7 {
            let mut sq = 0;
            while sq < 64 {
                seed = splitmix64(seed);
                pieces[c][p][sq] = seed;
                sq += 1;
            }
            p += 1;
        }
        c += 1;
    }
    seed = splitmix64(seed);
    let white_move = seed;
    let mut castling = [0u64; 4];
    let mut i = 0;
    while i < 4 {
        seed = splitmix64(seed);
        castling[i] = seed;
        i += 1;
    }
    let mut en_passant = [0u64; 8];
    let mut f = 0;
    while f < 8 {
        seed = splitmix64(seed);
        en_passant[f] = seed;
        f += 1;
    }
    ZobristKeys { pieces, white_move, castling, en_passant }
}

pub static KEYS: ZobristKeys = build();

#[inline]
pub fn piece_key(color: Color, piece: Piece, sq: u8) -> u64 {
    KEYS.pieces[color.index()][piece.index()][sq as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_distinct_and_nonzero() {
        let mut all: Vec<u64> = KEYS.pieces.iter().flatten().flatten().copied().filter(|&k| k != 0).collect();
        all.push(KEYS.white_move);
        all.extend_from_slice(&KEYS.castling);
        all.extend_from_slice(&KEYS.en_passant);
        assert_eq!(all.len(), 2 * 6 * 64 + 1 + 4 + 8);
        let mut sorted = all.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), all.len());
    }
}
