use std::fmt;
use std::sync::OnceLock;

use crate::action::Direction;

/// Merge reward earned by a slide.
pub type Reward = u32;
/// A cell's tile exponent; `0` is empty, otherwise the tile is `2^exponent`.
pub type Exponent = u8;

type BoardRaw = u64;
type Line = u64;

/// Number of cells on the board.
pub const CELLS: usize = 16;
/// Largest exponent a nibble can hold.
pub const MAX_EXPONENT: Exponent = 15;
/// Largest exponent a merge can produce (a 16384 tile); two of these never merge.
pub const MAX_TILE: Exponent = MAX_EXPONENT - 1;

const LINE_TABLE_SIZE: usize = 0x1_0000; // 65,536 possible 16-bit rows

struct Stores {
    slide_left: Box<[u16]>,
    slide_right: Box<[u16]>,
    reward_left: Box<[Reward]>,
    reward_right: Box<[Reward]>,
}

/// Packed 4x4 board as 16 4-bit exponents in a `u64`.
///
/// Cell 0 is the top-left corner and lives in the most significant nibble;
/// cells are numbered row-major, so cell `4 * row + col`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Board(BoardRaw);

impl Board {
    /// A constant empty board (all zeros).
    pub const EMPTY: Board = Board(0);

    /// Construct a `Board` from its raw packed representation.
    #[inline]
    pub fn from_raw(raw: BoardRaw) -> Self { Board(raw) }

    /// Borrow the raw packed `u64` for this `Board`.
    #[inline]
    pub fn raw(&self) -> BoardRaw { self.0 }

    /// Build a board from row-major exponents.
    pub fn from_cells(cells: [Exponent; CELLS]) -> Self {
        let mut board = Board::EMPTY;
        for (idx, &exponent) in cells.iter().enumerate() {
            board.place(idx, exponent);
        }
        board
    }

    /// Row-major exponents.
    pub fn cells(&self) -> [Exponent; CELLS] {
        let mut out = [0; CELLS];
        for (idx, slot) in out.iter_mut().enumerate() {
            *slot = self.cell(idx);
        }
        out
    }

    /// Exponent stored at `idx` (0..16, row-major).
    #[inline]
    pub fn cell(&self, idx: usize) -> Exponent {
        debug_assert!(idx < CELLS, "cell index {idx} out of range");
        ((self.0 >> ((15 - idx) * 4)) & 0xf) as Exponent
    }

    /// Overwrite the exponent at `idx`.
    #[inline]
    pub fn place(&mut self, idx: usize, exponent: Exponent) {
        debug_assert!(idx < CELLS, "cell index {idx} out of range");
        debug_assert!(exponent <= MAX_EXPONENT, "exponent {exponent} does not fit a nibble");
        let shift = (15 - idx) * 4;
        self.0 = (self.0 & !(0xf << shift)) | (((exponent & 0xf) as BoardRaw) << shift);
    }

    /// Slide/merge tiles toward `dir`.
    ///
    /// Returns the merge reward, or `None` if nothing moved. An unchanged
    /// slide leaves the board as it was.
    ///
    /// ```
    /// use ntuple_2048::action::Direction;
    /// use ntuple_2048::board::Board;
    /// let mut b = Board::from_cells([1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    /// assert_eq!(b.slide(Direction::Left), Some(4));
    /// assert_eq!(b.cell(0), 2);
    /// assert_eq!(b.slide(Direction::Left), None);
    /// ```
    pub fn slide(&mut self, dir: Direction) -> Option<Reward> {
        let s = stores();
        let (moved, reward) = match dir {
            Direction::Left => slide_rows(self.0, &s.slide_left, &s.reward_left),
            Direction::Right => slide_rows(self.0, &s.slide_right, &s.reward_right),
            Direction::Up => {
                let (moved, reward) = slide_rows(transpose(self.0), &s.slide_left, &s.reward_left);
                (transpose(moved), reward)
            }
            Direction::Down => {
                let (moved, reward) = slide_rows(transpose(self.0), &s.slide_right, &s.reward_right);
                (transpose(moved), reward)
            }
        };
        if moved == self.0 {
            return None;
        }
        self.0 = moved;
        Some(reward)
    }

    /// Rotate clockwise by `times` quarter turns (negative turns go counter-clockwise).
    pub fn rotate(&mut self, times: i32) {
        for _ in 0..times.rem_euclid(4) {
            self.0 = reflect_rows(transpose(self.0));
        }
    }

    /// Mirror columns: column `c` swaps with column `3 - c`.
    #[inline]
    pub fn reflect_horizontal(&mut self) { self.0 = reflect_rows(self.0); }

    /// True if no direction changes the board.
    pub fn is_terminal(&self) -> bool {
        Direction::ALL.iter().all(|&dir| {
            let mut probe = *self;
            probe.slide(dir).is_none()
        })
    }

    /// Largest exponent on the board (0 for an empty board).
    pub fn max_exponent(&self) -> Exponent {
        (0..CELLS).map(|idx| self.cell(idx)).max().unwrap_or(0)
    }

    /// Count the number of empty cells on the board.
    pub fn count_empty(&self) -> usize {
        let mut occupied = self.0;
        occupied |= occupied >> 1;
        occupied |= occupied >> 2;
        occupied &= 0x1111_1111_1111_1111;
        CELLS - occupied.count_ones() as usize
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({:#018x})", self.0)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells = self.cells();
        for (row, chunk) in cells.chunks(4).enumerate() {
            if row > 0 {
                writeln!(f, "-------------------------------")?;
            }
            let line: Vec<String> = chunk.iter().map(format_val).collect();
            writeln!(f, "{}", line.join("|"))?;
        }
        Ok(())
    }
}

impl From<BoardRaw> for Board { fn from(v: BoardRaw) -> Self { Board::from_raw(v) } }
impl From<Board> for BoardRaw { fn from(b: Board) -> Self { b.raw() } }

static STORES: OnceLock<Stores> = OnceLock::new();

#[inline(always)]
fn stores() -> &'static Stores { STORES.get_or_init(create_stores) }

fn create_stores() -> Stores {
    let mut slide_left = vec![0u16; LINE_TABLE_SIZE];
    let mut slide_right = vec![0u16; LINE_TABLE_SIZE];
    let mut reward_left = vec![0 as Reward; LINE_TABLE_SIZE];
    let mut reward_right = vec![0 as Reward; LINE_TABLE_SIZE];

    for val in 0..LINE_TABLE_SIZE {
        let tiles = line_to_tiles(val as Line);

        let (left, left_reward) = merge_toward_front(tiles);
        slide_left[val] = tiles_to_line(left) as u16;
        reward_left[val] = left_reward;

        let mut reversed = tiles;
        reversed.reverse();
        let (mut right, right_reward) = merge_toward_front(reversed);
        right.reverse();
        slide_right[val] = tiles_to_line(right) as u16;
        reward_right[val] = right_reward;
    }

    Stores {
        slide_left: slide_left.into_boxed_slice(),
        slide_right: slide_right.into_boxed_slice(),
        reward_left: reward_left.into_boxed_slice(),
        reward_right: reward_right.into_boxed_slice(),
    }
}

/// Compact a line toward index 0, merging each equal pair at most once.
/// Tiles already at `MAX_TILE` stay put, so the sentinel exponent never appears.
fn merge_toward_front(tiles: [Exponent; 4]) -> ([Exponent; 4], Reward) {
    let mut out = [0; 4];
    let mut len = 0;
    let mut reward = 0;
    let mut held: Option<Exponent> = None;
    for &tile in tiles.iter().filter(|&&t| t != 0) {
        match held {
            Some(h) if h == tile && tile < MAX_TILE => {
                let merged = tile + 1;
                out[len] = merged;
                len += 1;
                reward += (1 as Reward) << merged;
                held = None;
            }
            Some(h) => {
                out[len] = h;
                len += 1;
                held = Some(tile);
            }
            None => held = Some(tile),
        }
    }
    if let Some(h) = held {
        out[len] = h;
    }
    (out, reward)
}

fn line_to_tiles(line: Line) -> [Exponent; 4] {
    [
        ((line >> 12) & 0xf) as Exponent,
        ((line >> 8) & 0xf) as Exponent,
        ((line >> 4) & 0xf) as Exponent,
        (line & 0xf) as Exponent,
    ]
}

fn tiles_to_line(tiles: [Exponent; 4]) -> Line {
    (tiles[0] as Line) << 12 | (tiles[1] as Line) << 8 | (tiles[2] as Line) << 4 | tiles[3] as Line
}

#[inline(always)]
fn extract_line(board: BoardRaw, row: u64) -> Line {
    (board >> ((3 - row) * 16)) & 0xffff
}

#[inline(always)]
fn slide_rows(board: BoardRaw, lines: &[u16], rewards: &[Reward]) -> (BoardRaw, Reward) {
    (0..4).fold((0, 0), |(moved, reward), row| {
        let line = extract_line(board, row) as usize;
        (moved | (lines[line] as BoardRaw) << ((3 - row) * 16), reward + rewards[line])
    })
}

// Credit to Nneonneo
fn transpose(x: BoardRaw) -> BoardRaw {
    let a1 = x & 0xF0F00F0FF0F00F0F;
    let a2 = x & 0x0000F0F00000F0F0;
    let a3 = x & 0x0F0F00000F0F0000;
    let a = a1 | (a2 << 12) | (a3 >> 12);
    let b1 = a & 0xFF00FF0000FF00FF;
    let b2 = a & 0x00FF00FF00000000;
    let b3 = a & 0x00000000FF00FF00;
    b1 | (b2 >> 24) | (b3 << 24)
}

/// Reverse the nibble order of every row.
fn reflect_rows(x: BoardRaw) -> BoardRaw {
    ((x & 0x000F_000F_000F_000F) << 12)
        | ((x & 0x00F0_00F0_00F0_00F0) << 4)
        | ((x >> 4) & 0x00F0_00F0_00F0_00F0)
        | ((x >> 12) & 0x000F_000F_000F_000F)
}

fn format_val(val: &Exponent) -> String {
    match val {
        0 => " ".repeat(7),
        &x => format!("{:^7}", 1u32 << x),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slid(raw: BoardRaw, dir: Direction) -> (Board, Option<Reward>) {
        let mut b = Board::from_raw(raw);
        let reward = b.slide(dir);
        (b, reward)
    }

    #[test]
    fn it_merges_toward_front() {
        assert_eq!(merge_toward_front([0, 0, 0, 0]), ([0, 0, 0, 0], 0));
        assert_eq!(merge_toward_front([1, 2, 1, 2]), ([1, 2, 1, 2], 0));
        assert_eq!(merge_toward_front([1, 1, 2, 2]), ([2, 3, 0, 0], 12));
        assert_eq!(merge_toward_front([1, 0, 0, 1]), ([2, 0, 0, 0], 4));
        assert_eq!(merge_toward_front([2, 2, 2, 0]), ([3, 2, 0, 0], 8));
        assert_eq!(merge_toward_front([3, 3, 3, 3]), ([4, 4, 0, 0], 32));
        assert_eq!(merge_toward_front([13, 13, 0, 0]), ([14, 0, 0, 0], 1 << 14));
        assert_eq!(merge_toward_front([14, 14, 0, 0]), ([14, 14, 0, 0], 0));
        assert_eq!(merge_toward_front([14, 14, 2, 2]), ([14, 14, 3, 0], 8));
    }

    #[test]
    fn largest_tiles_never_merge() {
        let mut cells = [0; CELLS];
        cells[0] = MAX_TILE;
        cells[1] = MAX_TILE;
        let b = Board::from_cells(cells);
        assert_eq!(slid(b.raw(), Direction::Left), (b, None));
        let (right, reward) = slid(b.raw(), Direction::Right);
        assert_eq!(reward, Some(0));
        assert_eq!(&right.cells()[..4], &[0, 0, MAX_TILE, MAX_TILE]);
        for dir in Direction::ALL {
            let (after, _) = slid(b.raw(), dir);
            assert!(after.max_exponent() <= MAX_TILE, "{dir}: {after:?}");
        }
    }

    #[test]
    fn test_move_left() {
        let (b, reward) = slid(0x1234133220021002, Direction::Left);
        assert_eq!(b, Board::from_raw(0x1234142030001200));
        assert_eq!(reward, Some(16 + 8));
    }

    #[test]
    fn test_move_right() {
        let (b, reward) = slid(0x1234133220021002, Direction::Right);
        assert_eq!(b, Board::from_raw(0x1234014200030012));
        assert_eq!(reward, Some(16 + 8));
    }

    #[test]
    fn test_move_up() {
        let (b, _) = slid(0x1121230033004222, Direction::Up);
        assert_eq!(b, Board::from_raw(0x1131240232004000));
    }

    #[test]
    fn test_move_down() {
        let (b, _) = slid(0x1121230033004222, Direction::Down);
        assert_eq!(b, Board::from_raw(0x1000210034014232));
    }

    #[test]
    fn unchanged_slide_is_invalid_and_leaves_board() {
        let raw = 0x1234_0000_0000_0000;
        let (b, reward) = slid(raw, Direction::Left);
        assert_eq!(reward, None);
        assert_eq!(b, Board::from_raw(raw));
        let (_, reward) = slid(raw, Direction::Up);
        assert_eq!(reward, None);
        let (_, reward) = slid(raw, Direction::Down);
        assert_eq!(reward, Some(0));
    }

    #[test]
    fn cell_and_place() {
        let game = Board::from_raw(0x0123456789abcdef);
        assert_eq!(game.cell(0), 0);
        assert_eq!(game.cell(3), 3);
        assert_eq!(game.cell(10), 10);
        assert_eq!(game.cell(15), 15);
        let mut b = game;
        b.place(0, 7);
        b.place(15, 0);
        assert_eq!(b, Board::from_raw(0x7123456789abcde0));
    }

    #[test]
    fn rotate_clockwise_moves_corners() {
        let mut b = Board::EMPTY;
        b.place(0, 1);
        b.place(1, 2);
        b.rotate(1);
        // top-left -> top-right, its right neighbour -> below it
        assert_eq!(b.cell(3), 1);
        assert_eq!(b.cell(7), 2);
        b.rotate(-1);
        assert_eq!(b.cell(0), 1);
        assert_eq!(b.cell(1), 2);
    }

    #[test]
    fn four_rotations_and_double_reflection_are_identity() {
        let start = Board::from_raw(0x0123456789abcdef);
        let mut b = start;
        b.rotate(4);
        assert_eq!(b, start);
        for _ in 0..4 {
            b.rotate(1);
        }
        assert_eq!(b, start);
        b.reflect_horizontal();
        assert_eq!(b, Board::from_raw(0x32107654ba98fedc));
        b.reflect_horizontal();
        assert_eq!(b, start);
    }

    #[test]
    fn it_count_empty() {
        assert_eq!(Board::from_raw(0x1111000011110000).count_empty(), 8);
        assert_eq!(Board::from_raw(0x1100000000000000).count_empty(), 14);
        assert_eq!(Board::EMPTY.count_empty(), 16);
    }

    #[test]
    fn max_exponent_and_terminal() {
        assert_eq!(Board::EMPTY.max_exponent(), 0);
        assert!(Board::EMPTY.is_terminal());
        let checker = Board::from_raw(0x1212212112122121);
        assert!(checker.is_terminal());
        assert_eq!(checker.max_exponent(), 2);
        assert!(!Board::from_raw(0x1100000000000000).is_terminal());
    }

    #[test]
    fn from_cells_round_trips() {
        let cells = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 0];
        assert_eq!(Board::from_cells(cells).cells(), cells);
    }
}
