//! Plain `u64` bitboards and square helpers.

pub type Bitboard = u64;

pub const FILE_H: Bitboard = 0x0101_0101_0101_0101;
pub const FILE_G: Bitboard = FILE_H << 1;
pub const FILE_B: Bitboard = FILE_H << 6;
pub const FILE_A: Bitboard = FILE_H << 7;

pub const RANK_1: Bitboard = 0x0000_0000_0000_00ff;
pub const RANK_2: Bitboard = RANK_1 << 8;
pub const RANK_3: Bitboard = RANK_1 << 16;
pub const RANK_6: Bitboard = RANK_1 << 40;
pub const RANK_7: Bitboard = RANK_1 << 48;
pub const RANK_8: Bitboard = RANK_1 << 56;

pub const LIGHT_SQUARES: Bitboard = 0x55aa_55aa_55aa_55aa;
pub const DARK_SQUARES: Bitboard = !LIGHT_SQUARES;

#[inline]
pub fn bit(sq: u8) -> Bitboard { 1u64 << sq }

#[inline]
pub fn lsb(bb: Bitboard) -> u8 { bb.trailing_zeros() as u8 }

#[inline]
pub fn popcount(bb: Bitboard) -> u32 { bb.count_ones() }

/// File index, 0 for the a-file.
#[inline]
pub fn file_of(sq: u8) -> u8 { 7 - (sq & 7) }

/// Rank index, 0 for the first rank.
#[inline]
pub fn rank_of(sq: u8) -> u8 { sq >> 3 }

#[inline]
pub fn square(file: u8, rank: u8) -> u8 { rank * 8 + 7 - file }

pub fn square_name(sq: u8) -> String {
    let mut s = String::with_capacity(2);
    s.push((b'a' + file_of(sq)) as char);
    s.push((b'1' + rank_of(sq)) as char);
    s
}

pub fn parse_square(s: &str) -> Option<u8> {
    let b = s.as_bytes();
    if b.len() != 2 { return None; }
    let (f, r) = (b[0], b[1]);
    if !(b'a'..=b'h').contains(&f) || !(b'1'..=b'8').contains(&r) { return None; }
    Some(square(f - b'a', r - b'1'))
}

/// Iterates the set squares of a bitboard from bit 0 upwards.
#[derive(Clone, Copy, Debug)]
pub struct Squares(pub Bitboard);

impl Iterator for Squares {
    type Item = u8;

    #[inline]
    fn next(&mut self) -> Option<u8> {
        if self.0 == 0 { return None; }
        let sq = lsb(self.0);
        self.0 &= self.0 - 1;
        Some(sq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_names_follow_h1_zero_layout() {
        assert_eq!(square_name(0), "h1");
        assert_eq!(square_name(7), "a1");
        assert_eq!(square_name(63), "a8");
        assert_eq!(parse_square("e1"), Some(3));
        assert_eq!(parse_square("e8"), Some(59));
        assert_eq!(parse_square("i9"), None);
    }

    #[test]
    fn light_squares_include_h1_not_a1() {
        assert!(LIGHT_SQUARES & bit(0) != 0);
        assert!(DARK_SQUARES & bit(7) != 0);
        assert_eq!(Squares(0b1011).collect::<Vec<_>>(), vec![0, 1, 3]);
    }
}
