//! Attack lookups for every piece kind.
//!
//! Leaper tables are flat per-square arrays. Sliders go through a
//! [`SliderAttacks`] implementation; production code uses [`MagicAttacks`],
//! whose tables are filled from [`RayAttacks`] once at construction.

use log::debug;

use super::bitboard::{bit, lsb, Bitboard};
use super::magic::{BISHOP_INDEX_BITS, BISHOP_MAGICS, ROOK_INDEX_BITS, ROOK_MAGICS};
use super::position::Position;
use super::Color;

const ROOK_DIRS: [(i8, i8); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];
const BISHOP_DIRS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const KNIGHT_STEPS: [(i8, i8); 8] = [(1, 2), (2, 1), (2, -1), (1, -2), (-1, -2), (-2, -1), (-2, 1), (-1, 2)];
const KING_STEPS: [(i8, i8); 8] = [(0, 1), (1, 1), (1, 0), (1, -1), (0, -1), (-1, -1), (-1, 0), (-1, 1)];

/// Sliding-piece attacks for a square under a given occupancy.
pub trait SliderAttacks: Send + Sync {
    fn rook(&self, sq: u8, occ: Bitboard) -> Bitboard;
    fn bishop(&self, sq: u8, occ: Bitboard) -> Bitboard;

    #[inline]
    fn queen(&self, sq: u8, occ: Bitboard) -> Bitboard { self.rook(sq, occ) | self.bishop(sq, occ) }
}

// File/rank coordinates in the h1 = 0 layout; file 0 is the a-file.
fn coords(sq: u8) -> (i8, i8) { ((7 - (sq & 7)) as i8, (sq >> 3) as i8) }

fn on_board(f: i8, r: i8) -> bool { (0..8).contains(&f) && (0..8).contains(&r) }

fn to_square(f: i8, r: i8) -> u8 { (r as u8) * 8 + 7 - f as u8 }

fn ray_cast(sq: u8, occ: Bitboard, dirs: &[(i8, i8)]) -> Bitboard {
    let (f0, r0) = coords(sq);
    let mut out = 0;
    for &(df, dr) in dirs {
        let (mut f, mut r) = (f0 + df, r0 + dr);
        while on_board(f, r) {
            let b = bit(to_square(f, r));
            out |= b;
            if occ & b != 0 { break; }
            f += df;
            r += dr;
        }
    }
    out
}

// Squares whose occupancy can change the slider's attack set: every ray
// square except the last one before the board edge.
fn relevant_mask(sq: u8, dirs: &[(i8, i8)]) -> Bitboard {
    let (f0, r0) = coords(sq);
    let mut out = 0;
    for &(df, dr) in dirs {
        let (mut f, mut r) = (f0 + df, r0 + dr);
        while on_board(f + df, r + dr) {
            out |= bit(to_square(f, r));
            f += df;
            r += dr;
        }
    }
    out
}

fn step_table(steps: &[(i8, i8)]) -> [Bitboard; 64] {
    let mut t = [0u64; 64];
    for (sq, entry) in t.iter_mut().enumerate() {
        let (f, r) = coords(sq as u8);
        for &(df, dr) in steps {
            if on_board(f + df, r + dr) { *entry |= bit(to_square(f + df, r + dr)); }
        }
    }
    t
}

/// Brute-force ray casting. Used to seed the magic tables and as a
/// reference in tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct RayAttacks;

impl SliderAttacks for RayAttacks {
    fn rook(&self, sq: u8, occ: Bitboard) -> Bitboard { ray_cast(sq, occ, &ROOK_DIRS) }
    fn bishop(&self, sq: u8, occ: Bitboard) -> Bitboard { ray_cast(sq, occ, &BISHOP_DIRS) }
}

#[derive(Clone, Copy, Debug, Default)]
struct MagicEntry {
    mask: Bitboard,
    magic: u64,
    shift: u32,
    offset: usize,
}

impl MagicEntry {
    #[inline]
    fn index(&self, occ: Bitboard) -> usize {
        self.offset + ((occ & self.mask).wrapping_mul(self.magic) >> self.shift) as usize
    }
}

/// Magic-bitboard slider lookups over fixed multipliers.
#[derive(Clone, Debug)]
pub struct MagicAttacks {
    rook: [MagicEntry; 64],
    bishop: [MagicEntry; 64],
    table: Box<[Bitboard]>,
}

// Maps `index` onto a subset of `mask`: bit i of the index selects the
// i-th lowest set bit of the mask.
fn blocker_subset(index: usize, bits: u32, mut mask: Bitboard) -> Bitboard {
    let mut out = 0;
    for i in 0..bits {
        let low = mask & mask.wrapping_neg();
        mask ^= low;
        if index & (1 << i) != 0 { out |= low; }
    }
    out
}

impl MagicAttacks {
    pub fn new() -> Self {
        let reference = RayAttacks;
        let mut rook = [MagicEntry::default(); 64];
        let mut bishop = [MagicEntry::default(); 64];
        let mut size = 0usize;
        for sq in 0..64usize {
            rook[sq] = MagicEntry {
                mask: relevant_mask(sq as u8, &ROOK_DIRS),
                magic: ROOK_MAGICS[sq],
                shift: 64 - ROOK_INDEX_BITS[sq],
                offset: size,
            };
            size += 1 << ROOK_INDEX_BITS[sq];
        }
        for sq in 0..64usize {
            bishop[sq] = MagicEntry {
                mask: relevant_mask(sq as u8, &BISHOP_DIRS),
                magic: BISHOP_MAGICS[sq],
                shift: 64 - BISHOP_INDEX_BITS[sq],
                offset: size,
            };
            size += 1 << BISHOP_INDEX_BITS[sq];
        }
        let mut table = vec![0u64; size].into_boxed_slice();
        for sq in 0..64u8 {
            let e = rook[sq as usize];
            let bits = ROOK_INDEX_BITS[sq as usize];
            for i in 0..(1usize << bits) {
                let occ = blocker_subset(i, bits, e.mask);
                table[e.index(occ)] = reference.rook(sq, occ);
            }
            let e = bishop[sq as usize];
            let bits = BISHOP_INDEX_BITS[sq as usize];
            for i in 0..(1usize << bits) {
                let occ = blocker_subset(i, bits, e.mask);
                table[e.index(occ)] = reference.bishop(sq, occ);
            }
        }
        debug!("magic attack tables built: {} entries", size);
        Self { rook, bishop, table }
    }
}

impl Default for MagicAttacks {
    fn default() -> Self { Self::new() }
}

impl SliderAttacks for MagicAttacks {
    #[inline]
    fn rook(&self, sq: u8, occ: Bitboard) -> Bitboard { self.table[self.rook[sq as usize].index(occ)] }

    #[inline]
    fn bishop(&self, sq: u8, occ: Bitboard) -> Bitboard { self.table[self.bishop[sq as usize].index(occ)] }
}

/// Immutable attack tables, built once and shared behind an `Arc` by every
/// position and search that needs them.
#[derive(Clone, Debug)]
pub struct AttackTables<S: SliderAttacks = MagicAttacks> {
    sliders: S,
    pawn: [[Bitboard; 64]; 2],
    knight: [Bitboard; 64],
    king: [Bitboard; 64],
}

impl AttackTables<MagicAttacks> {
    pub fn new() -> Self { Self::with_sliders(MagicAttacks::new()) }
}

impl Default for AttackTables<MagicAttacks> {
    fn default() -> Self { Self::new() }
}

impl<S: SliderAttacks> AttackTables<S> {
    pub fn with_sliders(sliders: S) -> Self {
        Self {
            sliders,
            pawn: [step_table(&[(1, 1), (-1, 1)]), step_table(&[(1, -1), (-1, -1)])],
            knight: step_table(&KNIGHT_STEPS),
            king: step_table(&KING_STEPS),
        }
    }

    /// Squares a pawn of `color` standing on `sq` attacks.
    #[inline]
    pub fn pawn(&self, color: Color, sq: u8) -> Bitboard { self.pawn[color.index()][sq as usize] }

    #[inline]
    pub fn knight(&self, sq: u8) -> Bitboard { self.knight[sq as usize] }

    #[inline]
    pub fn king(&self, sq: u8) -> Bitboard { self.king[sq as usize] }

    #[inline]
    pub fn rook(&self, sq: u8, occ: Bitboard) -> Bitboard { self.sliders.rook(sq, occ) }

    #[inline]
    pub fn bishop(&self, sq: u8, occ: Bitboard) -> Bitboard { self.sliders.bishop(sq, occ) }

    #[inline]
    pub fn queen(&self, sq: u8, occ: Bitboard) -> Bitboard { self.sliders.queen(sq, occ) }

    /// Every piece of either colour attacking `sq` under occupancy `occ`.
    pub fn attackers_to(&self, pos: &Position, sq: u8, occ: Bitboard) -> Bitboard {
        (self.pawn(Color::White, sq) & pos.pawns() & pos.black())
            | (self.pawn(Color::Black, sq) & pos.pawns() & pos.white())
            | (self.knight(sq) & pos.knights())
            | (self.king(sq) & pos.kings())
            | (self.rook(sq, occ) & (pos.rooks() | pos.queens()))
            | (self.bishop(sq, occ) & (pos.bishops() | pos.queens()))
    }

    /// Sliders behind already-removed pieces that now see `sq`.
    pub fn xray_attackers(&self, pos: &Position, sq: u8, occ: Bitboard) -> Bitboard {
        ((self.rook(sq, occ) & (pos.rooks() | pos.queens()))
            | (self.bishop(sq, occ) & (pos.bishops() | pos.queens())))
            & occ
    }

    pub fn is_square_attacked(&self, pos: &Position, sq: u8, by: Color) -> bool {
        let them = pos.color_bb(by);
        let occ = pos.all();
        self.pawn(by.flip(), sq) & pos.pawns() & them != 0
            || self.knight(sq) & pos.knights() & them != 0
            || self.king(sq) & pos.kings() & them != 0
            || self.rook(sq, occ) & (pos.rooks() | pos.queens()) & them != 0
            || self.bishop(sq, occ) & (pos.bishops() | pos.queens()) & them != 0
    }

    /// Whether the king of `color` is attacked.
    pub fn king_attacked(&self, pos: &Position, color: Color) -> bool {
        let k = pos.kings() & pos.color_bb(color);
        k != 0 && self.is_square_attacked(pos, lsb(k), color.flip())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magic_lookup_matches_ray_cast() {
        let magic = MagicAttacks::new();
        let mut seed = 0x2545_F491_4F6C_DD1Du64;
        for _ in 0..2000 {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            let occ = seed & (seed >> 3);
            for sq in 0..64u8 {
                assert_eq!(magic.rook(sq, occ), RayAttacks.rook(sq, occ), "rook sq={sq}");
                assert_eq!(magic.bishop(sq, occ), RayAttacks.bishop(sq, occ), "bishop sq={sq}");
            }
        }
    }

    #[test]
    fn masks_exclude_edges() {
        assert_eq!(relevant_mask(0, &ROOK_DIRS).count_ones(), 12);
        assert_eq!(relevant_mask(27, &BISHOP_DIRS).count_ones(), 9);
    }

    #[test]
    fn leaper_tables() {
        let t = AttackTables::new();
        // knight on g1 (sq 1): e2, f3, h3
        assert_eq!(t.knight(1).count_ones(), 3);
        assert_eq!(t.king(3).count_ones(), 5);
        // white pawn on e2 (sq 11) hits d3 and f3
        assert_eq!(t.pawn(Color::White, 11), bit(20) | bit(18));
    }
}
