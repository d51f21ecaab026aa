//! Fixed magic multipliers and index widths for the h1 = 0 square layout.
//!
//! Each table is indexed by square. The index width of a square equals the
//! number of relevant blocker squares for that slider, which keeps every
//! table a perfect hash of its blocker subsets.

pub const ROOK_INDEX_BITS: [u32; 64] = [
    12, 11, 11, 11, 11, 11, 11, 12,
    11, 10, 10, 10, 10, 10, 10, 11,
    11, 10, 10, 10, 10, 10, 10, 11,
    11, 10, 10, 10, 10, 10, 10, 11,
    11, 10, 10, 10, 10, 10, 10, 11,
    11, 10, 10, 10, 10, 10, 10, 11,
    11, 10, 10, 10, 10, 10, 10, 11,
    12, 11, 11, 11, 11, 11, 11, 12,
];

pub const BISHOP_INDEX_BITS: [u32; 64] = [
    6, 5, 5, 5, 5, 5, 5, 6,
    5, 5, 5, 5, 5, 5, 5, 5,
    5, 5, 7, 7, 7, 7, 5, 5,
    5, 5, 7, 9, 9, 7, 5, 5,
    5, 5, 7, 9, 9, 7, 5, 5,
    5, 5, 7, 7, 7, 7, 5, 5,
    5, 5, 5, 5, 5, 5, 5, 5,
    6, 5, 5, 5, 5, 5, 5, 6,
];

pub const ROOK_MAGICS: [u64; 64] = [
    0x1080108000400020, 0x40200010004000, 0x100082000441100, 0x480041000080080,
    0x100080005000210, 0x100020801000400, 0x280010000800200, 0x100008020420100,
    0x400800080400020, 0x401000402000, 0x100801000200080, 0x801000800800,
    0x800400080080, 0x800200800400, 0x1000200040100, 0x4840800041000080,
    0x20008080004000, 0x404010002000, 0x808010002000, 0x828010000800,
    0x808004000800, 0x14008002000480, 0x40002100801, 0x20001004084,
    0x802080004000, 0x200080400080, 0x810001080200080, 0x10008080080010,
    0x4000080080040080, 0x40080020080, 0x1000100040200, 0x80008200004124,
    0x804000800020, 0x804000802000, 0x801000802000, 0x2000801000800804,
    0x80080800400, 0x80040080800200, 0x800100800200, 0x8042000104,
    0x208040008008, 0x10500020004000, 0x100020008080, 0x2000100008008080,
    0x200040008008080, 0x8020004008080, 0x1000200010004, 0x100040080420001,
    0x80004000200040, 0x200040100140, 0x20004800100040, 0x100080080280,
    0x8100800400080080, 0x8004020080040080, 0x9001000402000100, 0x40080410200,
    0x208040110202, 0x800810022004012, 0x1000820004011, 0x1002004100009,
    0x41001002480005, 0x81000208040001, 0x4000008201100804, 0x2841008402,
];

pub const BISHOP_MAGICS: [u64; 64] = [
    0x1020041000484080, 0x20204010a0000, 0x8020420240000, 0x404040085006400,
    0x804242000000108, 0x8901008800000, 0x1010110400080, 0x402401084004,
    0x1000200810208082, 0x20802208200, 0x4200100102082000, 0x1024081040020,
    0x20210000000, 0x8210400100, 0x10110022000, 0x80090088010820,
    0x8001002480800, 0x8102082008200, 0x41001000408100, 0x88000082004000,
    0x204000200940000, 0x410201100100, 0x2000101012000, 0x40201008200c200,
    0x10100004204200, 0x2080020010440, 0x480004002400, 0x2008008008202,
    0x1010080104000, 0x1020001004106, 0x1040200520800, 0x8410000840101,
    0x1201000200400, 0x2029000021000, 0x4002400080840, 0x5000020080080080,
    0x1080200002200, 0x4008202028800, 0x2080210010080, 0x800809200008200,
    0x1082004001000, 0x1080202411080, 0x840048010101, 0x40004010400200,
    0x500811020800400, 0x20200040800040, 0x1008012800830a00, 0x1041102001040,
    0x11010120200000, 0x2020222020c00, 0x400002402080800, 0x20880000,
    0x1122020400, 0x11100248084000, 0x210111000908000, 0x2048102020080,
    0x1000108208024000, 0x1004100882000, 0x41044100, 0x840400,
    0x4208204, 0x80000200282020c, 0x8a001240100, 0x2040104040080,
];
