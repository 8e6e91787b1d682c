use crate::error::{GridError, InvalidReason, SearchError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;

/// A cell coordinate inside a building snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub x: usize,
    pub y: usize,
    pub floor: usize,
}

impl Position {
    pub const fn new(x: usize, y: usize, floor: usize) -> Self {
        Position { x, y, floor }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.floor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Open,
    Wall,
    /// Cell currently on fire.
    Hazard,
    /// Stairway; links the same (x, y) on adjacent floors.
    Transit,
    Exit,
}

impl Cell {
    /// Cells a search may step onto.
    pub fn is_walkable(self) -> bool {
        matches!(self, Cell::Open | Cell::Transit)
    }

    fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            '.' => Some(Cell::Open),
            '#' => Some(Cell::Wall),
            'F' | '*' => Some(Cell::Hazard),
            'S' | '=' => Some(Cell::Transit),
            'E' => Some(Cell::Exit),
            _ => None,
        }
    }

    fn glyph(self) -> char {
        match self {
            Cell::Open => '.',
            Cell::Wall => '#',
            Cell::Hazard => 'F',
            Cell::Transit => 'S',
            Cell::Exit => 'E',
        }
    }
}

/// Relative in-plane moves, king-move order.
const PLANAR_DIRECTIONS: [(i64, i64); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Immutable occupancy snapshot of a multi-floor building.
///
/// Cells are stored floor-major, then row-major: index `(floor * height + y) * width + x`.
/// Hazard spread happens outside the engine; a new snapshot is taken before the next search.
#[derive(Debug, Clone, PartialEq)]
pub struct GridSnapshot {
    width: usize,
    height: usize,
    floors: usize,
    cells: Vec<Cell>,
}

/// Aggregate counts used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSummary {
    pub dimensions: (usize, usize, usize),
    pub walkable_area: usize,
    pub hazard_area: usize,
    pub exits: usize,
    pub transit_cells: usize,
}

impl GridSnapshot {
    /// Creates a snapshot where every cell holds `cell`.
    pub fn filled(width: usize, height: usize, floors: usize, cell: Cell) -> Result<Self, GridError> {
        if width == 0 || height == 0 || floors == 0 {
            return Err(GridError::Empty);
        }
        Ok(GridSnapshot {
            width,
            height,
            floors,
            cells: vec![cell; width * height * floors],
        })
    }

    /// Parses an ASCII snapshot.
    ///
    /// Each line is a row (`y` grows downwards), each glyph a cell (`x` grows rightwards).
    /// Floors are separated by blank lines, ground floor first. Glyphs:
    /// `.` open, `#` wall, `F`/`*` hazard, `S`/`=` transit, `E` exit.
    pub fn from_ascii(text: &str) -> Result<Self, GridError> {
        let mut floors: Vec<Vec<Vec<Cell>>> = Vec::new();
        let mut current: Vec<Vec<Cell>> = Vec::new();

        for line in text.lines().map(str::trim) {
            if line.is_empty() {
                if !current.is_empty() {
                    floors.push(std::mem::take(&mut current));
                }
                continue;
            }
            let floor = floors.len();
            let y = current.len();
            let row = line
                .chars()
                .enumerate()
                .map(|(x, glyph)| {
                    Cell::from_glyph(glyph).ok_or(GridError::UnknownGlyph { glyph, x, y, floor })
                })
                .collect::<Result<Vec<_>, _>>()?;
            current.push(row);
        }
        if !current.is_empty() {
            floors.push(current);
        }

        let first = floors.first().ok_or(GridError::Empty)?;
        let height = first.len();
        let width = first.first().map_or(0, Vec::len);
        if width == 0 {
            return Err(GridError::Empty);
        }

        let mut grid = GridSnapshot::filled(width, height, floors.len(), Cell::Open)?;
        for (floor, rows) in floors.iter().enumerate() {
            if rows.len() != height {
                return Err(GridError::FloorMismatch {
                    floor,
                    expected: height,
                    found: rows.len(),
                });
            }
            for (y, row) in rows.iter().enumerate() {
                if row.len() != width {
                    return Err(GridError::RaggedRow {
                        floor,
                        y,
                        expected: width,
                        found: row.len(),
                    });
                }
                for (x, &cell) in row.iter().enumerate() {
                    grid.set_cell(Position::new(x, y, floor), cell);
                }
            }
        }
        Ok(grid)
    }

    /// Generates a seeded test layout: a perimeter wall, `num_walls` scattered walls
    /// and one transit column in the centre linking every floor.
    pub fn random(
        width: usize,
        height: usize,
        floors: usize,
        num_walls: usize,
        seed: u64,
    ) -> Result<Self, GridError> {
        let mut grid = GridSnapshot::filled(width, height, floors, Cell::Open)?;
        let mut rng = StdRng::seed_from_u64(seed);

        for floor in 0..floors {
            for x in 0..width {
                grid.set_cell(Position::new(x, 0, floor), Cell::Wall);
                grid.set_cell(Position::new(x, height - 1, floor), Cell::Wall);
            }
            for y in 0..height {
                grid.set_cell(Position::new(0, y, floor), Cell::Wall);
                grid.set_cell(Position::new(width - 1, y, floor), Cell::Wall);
            }
        }

        let stair = (width / 2, height / 2);
        if floors > 1 {
            for floor in 0..floors {
                grid.set_cell(Position::new(stair.0, stair.1, floor), Cell::Transit);
            }
        }

        // Place walls randomly, never on the stair column
        let mut walls_placed = 0;
        let mut attempts = 0;
        while walls_placed < num_walls && attempts < num_walls * 3 {
            let pos = Position::new(
                rng.gen_range(0..width),
                rng.gen_range(0..height),
                rng.gen_range(0..floors),
            );
            if (pos.x, pos.y) != stair && grid.cell(pos) == Some(Cell::Open) {
                grid.set_cell(pos, Cell::Wall);
                walls_placed += 1;
            }
            attempts += 1;
        }

        Ok(grid)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn floors(&self) -> usize {
        self.floors
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x < self.width && pos.y < self.height && pos.floor < self.floors
    }

    fn index(&self, pos: Position) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| (pos.floor * self.height + pos.y) * self.width + pos.x)
    }

    pub fn cell(&self, pos: Position) -> Option<Cell> {
        self.index(pos).map(|i| self.cells[i])
    }

    /// Overwrites a cell. Out-of-range positions are ignored.
    ///
    /// Meant for assembling a snapshot; an engine owns its own copy and never sees this.
    pub fn set_cell(&mut self, pos: Position, cell: Cell) {
        if let Some(i) = self.index(pos) {
            self.cells[i] = cell;
        }
    }

    pub fn is_walkable(&self, pos: Position) -> bool {
        self.cell(pos).is_some_and(Cell::is_walkable)
    }

    /// Checks that `pos` can serve as a search endpoint.
    pub fn validate_endpoint(&self, pos: Position) -> Result<(), SearchError> {
        match self.cell(pos) {
            None => Err(SearchError::InvalidCoordinate {
                position: pos,
                reason: InvalidReason::OutOfBounds,
            }),
            Some(cell) if !cell.is_walkable() => Err(SearchError::InvalidCoordinate {
                position: pos,
                reason: InvalidReason::NotWalkable(cell),
            }),
            Some(_) => Ok(()),
        }
    }

    /// Offsets `pos` within its floor, returning `None` when the result leaves the grid.
    pub fn offset(&self, pos: Position, dx: i64, dy: i64) -> Option<Position> {
        let x = pos.x as i64 + dx;
        let y = pos.y as i64 + dy;
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        Some(Position::new(x as usize, y as usize, pos.floor))
    }

    /// Positions reachable from `pos` in one step.
    ///
    /// The 8 king moves on the same floor onto walkable cells, plus the same (x, y)
    /// one floor up or down when both cells are `Transit`.
    pub fn neighbors(&self, pos: Position) -> Vec<Position> {
        let mut neighbors = Vec::with_capacity(10);

        for &(dx, dy) in &PLANAR_DIRECTIONS {
            if let Some(next) = self.offset(pos, dx, dy) {
                if self.is_walkable(next) {
                    neighbors.push(next);
                }
            }
        }

        if self.cell(pos) == Some(Cell::Transit) {
            let below = pos.floor.checked_sub(1);
            let above = Some(pos.floor + 1);
            for floor in [below, above].into_iter().flatten() {
                let next = Position::new(pos.x, pos.y, floor);
                if self.cell(next) == Some(Cell::Transit) {
                    neighbors.push(next);
                }
            }
        }

        neighbors
    }

    pub fn are_adjacent(&self, a: Position, b: Position) -> bool {
        self.neighbors(a).contains(&b)
    }

    /// All cells matching `predicate`, in storage order.
    fn positions_where(&self, predicate: impl Fn(Cell) -> bool) -> Vec<Position> {
        let mut found = Vec::new();
        for floor in 0..self.floors {
            for y in 0..self.height {
                for x in 0..self.width {
                    let pos = Position::new(x, y, floor);
                    if self.cell(pos).is_some_and(&predicate) {
                        found.push(pos);
                    }
                }
            }
        }
        found
    }

    pub fn walkable_positions(&self) -> Vec<Position> {
        self.positions_where(Cell::is_walkable)
    }

    pub fn exits(&self) -> Vec<Position> {
        self.positions_where(|cell| cell == Cell::Exit)
    }

    pub fn hazards(&self) -> Vec<Position> {
        self.positions_where(|cell| cell == Cell::Hazard)
    }

    /// True when any position on `path` is currently on fire.
    pub fn is_path_blocked_by_hazard(&self, path: &[Position]) -> bool {
        path.iter().any(|&pos| self.cell(pos) == Some(Cell::Hazard))
    }

    pub fn summary(&self) -> GridSummary {
        let count = |wanted: Cell| self.cells.iter().filter(|&&c| c == wanted).count();
        GridSummary {
            dimensions: (self.width, self.height, self.floors),
            walkable_area: self.cells.iter().filter(|c| c.is_walkable()).count(),
            hazard_area: count(Cell::Hazard),
            exits: count(Cell::Exit),
            transit_cells: count(Cell::Transit),
        }
    }

    /// Print every floor, overlaying `path` with `o` and its endpoints with `A`/`G`.
    pub fn print_grid(&self, path: Option<&[Position]>) {
        println!("Legend: A=Start, G=Goal, o=Path, #=Wall, F=Fire, S=Stairs, E=Exit, .=Open");
        let path = path.unwrap_or(&[]);

        for floor in 0..self.floors {
            println!("Floor {}:", floor);
            print!("   ");
            for x in 0..self.width {
                print!("{:2}", x % 10);
            }
            println!();

            for y in 0..self.height {
                print!("{:2} ", y);
                for x in 0..self.width {
                    let pos = Position::new(x, y, floor);
                    let glyph = if path.first() == Some(&pos) {
                        'A'
                    } else if path.last() == Some(&pos) {
                        'G'
                    } else if path.contains(&pos) {
                        'o'
                    } else {
                        self.cell(pos).map_or('?', Cell::glyph)
                    };
                    print!("{} ", glyph);
                }
                println!();
            }
            println!();
        }
    }
}
