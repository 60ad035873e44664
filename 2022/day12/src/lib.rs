use std::{
    collections::{HashSet, VecDeque},
    error,
    fmt::Display,
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;

#[derive(Debug)]
pub enum Error {
    InvalidChar(char),
    InconsistentRow(usize, usize),
    EmptyMap,
    MissingStart,
    MissingEnd,
    DuplicateStart(Position, Position),
    DuplicateEnd(Position, Position),
    Unreachable(Position, Position),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidChar(c) => write!(f, "Invalid character({}) in height map text.", c),
            Error::InconsistentRow(expect_col_n, this_col_n) => write!(
                f,
                "Expect {} character(s) in one row, given {}.",
                expect_col_n, this_col_n
            ),
            Error::EmptyMap => write!(f, "Given height map has no square."),
            Error::MissingStart => write!(f, "Can't find the start square(S) in height map."),
            Error::MissingEnd => write!(f, "Can't find the end square(E) in height map."),
            Error::DuplicateStart(first, second) => write!(
                f,
                "Found more than one start square(S) in height map, at {} and {}.",
                first, second
            ),
            Error::DuplicateEnd(first, second) => write!(
                f,
                "Found more than one end square(E) in height map, at {} and {}.",
                first, second
            ),
            Error::Unreachable(from, to) => {
                write!(f, "There's no path from {} to {} in height map.", from, to)
            }
        }
    }
}

impl error::Error for Error {}

#[derive(Debug, Parser)]
pub struct CLIArgs {
    #[arg(default_value = "inputs.txt")]
    pub input_path: PathBuf,
}

#[derive(Debug, Clone, Copy)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    pub fn all_dirs() -> &'static [Direction] {
        static ALL_DIRECTIONS: [Direction; 4] = [
            Direction::Up,
            Direction::Right,
            Direction::Down,
            Direction::Left,
        ];

        &ALL_DIRECTIONS
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Position {
    r: usize,
    c: usize,
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.r, self.c)
    }
}

impl Position {
    pub fn new(r: usize, c: usize) -> Self {
        Self { r, c }
    }

    pub fn neighbor(&self, dir: Direction) -> Option<Self> {
        match dir {
            Direction::Up if self.r > 0 => Some(Position::new(self.r - 1, self.c)),
            Direction::Right => Some(Position::new(self.r, self.c + 1)),
            Direction::Down => Some(Position::new(self.r + 1, self.c)),
            Direction::Left if self.c > 0 => Some(Position::new(self.r, self.c - 1)),
            _ => None,
        }
    }
}

pub const LOWEST_ELEVATION: u8 = 0;
pub const HIGHEST_ELEVATION: u8 = b'z' - b'a';

/// Elevation of one square, `S` counts as `a` and `E` counts as `z`.
pub fn elevation_of(c: char) -> Option<u8> {
    match c {
        'S' => Some(LOWEST_ELEVATION),
        'E' => Some(HIGHEST_ELEVATION),
        'a'..='z' => Some(c as u8 - b'a'),
        _ => None,
    }
}

#[derive(Debug)]
pub struct Map {
    elevations: Vec<u8>,
    row_n: usize,
    col_n: usize,
    start: Position,
    end: Position,
}

impl TryFrom<&str> for Map {
    type Error = Error;

    fn try_from(value: &str) -> std::result::Result<Self, Self::Error> {
        let mut builder = MapBuilder::new();
        for line in value.lines() {
            builder.add_row(line)?;
        }

        builder.build()
    }
}

impl Map {
    pub fn start(&self) -> &Position {
        &self.start
    }

    pub fn end(&self) -> &Position {
        &self.end
    }

    pub fn row_n(&self) -> usize {
        self.row_n
    }

    pub fn col_n(&self) -> usize {
        self.col_n
    }

    pub fn elevation(&self, pos: &Position) -> Option<u8> {
        self.pos_to_ind(pos)
            .and_then(|ind| self.elevations.get(ind))
            .copied()
    }

    /// Whether one step from `from` to `to` climbs at most one level.
    pub fn can_step(&self, from: &Position, to: &Position) -> bool {
        match (self.elevation(from), self.elevation(to)) {
            (Some(from_elev), Some(to_elev)) => to_elev <= from_elev + 1,
            _ => false,
        }
    }

    pub fn neighbors<'a>(&'a self, pos: &'a Position) -> impl Iterator<Item = Position> + 'a {
        Direction::all_dirs()
            .iter()
            .filter_map(move |dir| pos.neighbor(*dir))
            .filter(move |next_pos| self.is_inside(next_pos))
    }

    pub fn shortest_path_len(&self) -> Result<usize, Error> {
        self.min_steps_n(&self.start, &self.end)
            .ok_or_else(|| Error::Unreachable(self.start.clone(), self.end.clone()))
    }

    pub fn min_steps_n(&self, from: &Position, to: &Position) -> Option<usize> {
        if !self.is_inside(from) || !self.is_inside(to) {
            return None;
        }

        let mut search_positions = VecDeque::from([(0, from.clone())]);
        let mut searched_positions = HashSet::from([from.clone()]);
        while let Some((cur_steps_n, cur_pos)) = search_positions.pop_front() {
            if cur_pos == *to {
                return Some(cur_steps_n);
            }

            for next_pos in self
                .neighbors(&cur_pos)
                .filter(|next_pos| self.can_step(&cur_pos, next_pos))
            {
                if searched_positions.insert(next_pos.clone()) {
                    search_positions.push_back((cur_steps_n + 1, next_pos));
                }
            }
        }

        None
    }

    /// Fewest steps to the end square from any square at the lowest elevation.
    /// Searches backwards from the end, so every step is checked reversed.
    pub fn min_steps_n_from_lowest(&self) -> Option<usize> {
        let mut search_positions = VecDeque::from([(0, self.end.clone())]);
        let mut searched_positions = HashSet::from([self.end.clone()]);
        while let Some((cur_steps_n, cur_pos)) = search_positions.pop_front() {
            if self.elevation(&cur_pos) == Some(LOWEST_ELEVATION) {
                return Some(cur_steps_n);
            }

            for prev_pos in self
                .neighbors(&cur_pos)
                .filter(|prev_pos| self.can_step(prev_pos, &cur_pos))
            {
                if searched_positions.insert(prev_pos.clone()) {
                    search_positions.push_back((cur_steps_n + 1, prev_pos));
                }
            }
        }

        None
    }

    pub fn min_steps_n_from_lowest_or_err(&self) -> Result<usize, Error> {
        self.min_steps_n_from_lowest().ok_or_else(|| {
            let lowest_pos = self
                .positions()
                .find(|pos| self.elevation(pos) == Some(LOWEST_ELEVATION))
                .unwrap_or_else(|| self.start.clone());
            Error::Unreachable(lowest_pos, self.end.clone())
        })
    }

    fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.row_n).flat_map(move |r| (0..self.col_n).map(move |c| Position::new(r, c)))
    }

    fn pos_to_ind(&self, pos: &Position) -> Option<usize> {
        if self.is_inside(pos) {
            Some(pos.r * self.col_n + pos.c)
        } else {
            None
        }
    }

    fn is_inside(&self, pos: &Position) -> bool {
        pos.r < self.row_n && pos.c < self.col_n
    }
}

struct MapBuilder {
    elevations: Vec<u8>,
    row_n: usize,
    col_n: Option<usize>,
    start: Option<Position>,
    end: Option<Position>,
}

impl MapBuilder {
    pub fn new() -> Self {
        Self {
            elevations: Vec::new(),
            row_n: 0,
            col_n: None,
            start: None,
            end: None,
        }
    }

    pub fn add_row(&mut self, text: &str) -> Result<(), Error> {
        let text = text.trim_end();
        if text.is_empty() {
            return Ok(());
        }

        let this_col_n = text.chars().count();
        let expect_col_n = *self.col_n.get_or_insert(this_col_n);
        if expect_col_n != this_col_n {
            return Err(Error::InconsistentRow(expect_col_n, this_col_n));
        }

        for (c_ind, c) in text.chars().enumerate() {
            let pos = Position::new(self.row_n, c_ind);
            match c {
                'S' => {
                    if let Some(first) = self.start.replace(pos.clone()) {
                        return Err(Error::DuplicateStart(first, pos));
                    }
                }
                'E' => {
                    if let Some(first) = self.end.replace(pos.clone()) {
                        return Err(Error::DuplicateEnd(first, pos));
                    }
                }
                _ => (),
            }

            self.elevations
                .push(elevation_of(c).ok_or(Error::InvalidChar(c))?);
        }
        self.row_n += 1;

        Ok(())
    }

    pub fn build(self) -> Result<Map, Error> {
        if self.elevations.is_empty() {
            return Err(Error::EmptyMap);
        }

        Ok(Map {
            elevations: self.elevations,
            row_n: self.row_n,
            col_n: self.col_n.unwrap_or(0),
            start: self.start.ok_or(Error::MissingStart)?,
            end: self.end.ok_or(Error::MissingEnd)?,
        })
    }
}

pub fn read_map<P: AsRef<Path>>(path: P) -> Result<Map> {
    let file = File::open(&path)
        .with_context(|| format!("Failed to open given file({}).", path.as_ref().display()))?;
    let reader = BufReader::new(file);
    let mut builder = MapBuilder::new();
    for (ind, line) in reader.lines().enumerate() {
        let line = line.with_context(|| {
            format!(
                "Failed to read line {} of given file({}).",
                ind + 1,
                path.as_ref().display()
            )
        })?;
        builder
            .add_row(line.as_str())
            .with_context(|| format!("Failed to parse line {} of height map.", ind + 1))?;
    }

    Ok(builder.build()?)
}

#[cfg(test)]
const SAMPLE_MAP: &str = "Sabqponm
abcryxxl
accszExk
acctuvwj
abdefghi
";

#[test]
fn test_sample_map_locates_start_and_end() {
    let map = Map::try_from(SAMPLE_MAP).unwrap();

    assert_eq!(map.start(), &Position::new(0, 0));
    assert_eq!(map.end(), &Position::new(2, 5));
    assert_eq!((map.row_n(), map.col_n()), (5, 8));
    assert_eq!(map.elevation(&Position::new(0, 0)), Some(0));
    assert_eq!(map.elevation(&Position::new(2, 5)), Some(25));
    assert_eq!(map.elevation(&Position::new(1, 4)), Some(24));
}

#[test]
fn test_sample_map_steps() {
    let map = Map::try_from(SAMPLE_MAP).unwrap();

    assert_eq!(map.shortest_path_len().unwrap(), 31);
    assert_eq!(map.min_steps_n_from_lowest(), Some(29));
}

#[test]
fn test_single_row_takes_width_minus_one_steps() {
    let climb = "bcdefghijklmnopqrstuvwxyz";
    for n in 27..40 {
        let flat = "a".repeat(n - 27);
        let left_to_right = format!("S{}{}E", flat, climb);
        let right_to_left = format!("E{}{}S", climb.chars().rev().collect::<String>(), flat);
        for text in [left_to_right, right_to_left] {
            let map = Map::try_from(text.as_str()).unwrap();

            assert_eq!((map.row_n(), map.col_n()), (1, n));
            assert_eq!(map.shortest_path_len().unwrap(), n - 1, "map: {}", text);
        }
    }
}

#[test]
fn test_flat_row_never_climbs_to_end() {
    for n in 3..10 {
        let map = Map::try_from(format!("S{}E", "a".repeat(n - 2)).as_str()).unwrap();

        assert_eq!(
            map.min_steps_n(&Position::new(0, 0), &Position::new(0, n - 2)),
            Some(n - 2)
        );
        assert!(matches!(
            map.shortest_path_len(),
            Err(Error::Unreachable(_, _))
        ));
    }
}

#[test]
fn test_climbing_two_levels_at_once_is_unreachable() {
    let map = Map::try_from("SbdE").unwrap();

    assert!(matches!(
        map.shortest_path_len(),
        Err(Error::Unreachable(from, to)) if from == Position::new(0, 0) && to == Position::new(0, 3)
    ));
    assert!(map.min_steps_n_from_lowest().is_none());
}

#[test]
fn test_descending_any_number_of_levels() {
    let map = Map::try_from("SbcdefghijklmnopqrstuvwxyzE").unwrap();
    let b_pos = Position::new(0, 1);
    let z_pos = Position::new(0, 25);

    assert_eq!(map.shortest_path_len().unwrap(), 26);
    assert!(map.can_step(&z_pos, &b_pos));
    assert!(!map.can_step(&b_pos, &z_pos));
}

#[test]
fn test_start_counts_as_lowest_when_stepped_onto() {
    let map = Map::try_from("bSE").unwrap();
    let b_pos = Position::new(0, 0);
    let s_pos = Position::new(0, 1);

    assert_eq!(map.elevation(&s_pos), Some(0));
    assert!(map.can_step(&b_pos, &s_pos));
    assert!(map.can_step(&s_pos, &b_pos));
}

#[test]
fn test_end_counts_as_highest() {
    let map = Map::try_from("SyE").unwrap();

    assert!(map.can_step(&Position::new(0, 1), &Position::new(0, 2)));
    assert!(!map.can_step(&Position::new(0, 0), &Position::new(0, 1)));
}

#[test]
fn test_trailing_whitespace_and_blank_lines() {
    let map = Map::try_from("Sab  \n\nbcE\t\n").unwrap();

    assert_eq!((map.row_n(), map.col_n()), (2, 3));
    assert_eq!(map.end(), &Position::new(1, 2));
}

#[test]
fn test_invalid_maps() {
    assert!(matches!(Map::try_from("Sa1E"), Err(Error::InvalidChar('1'))));
    assert!(matches!(
        Map::try_from("SaaE\naa"),
        Err(Error::InconsistentRow(4, 2))
    ));
    assert!(matches!(Map::try_from("aaaE"), Err(Error::MissingStart)));
    assert!(matches!(Map::try_from("Saaa"), Err(Error::MissingEnd)));
    assert!(matches!(
        Map::try_from("SaSE"),
        Err(Error::DuplicateStart(_, _))
    ));
    assert!(matches!(
        Map::try_from("SEaE"),
        Err(Error::DuplicateEnd(_, _))
    ));
    assert!(matches!(Map::try_from(""), Err(Error::EmptyMap)));
}

#[cfg(test)]
fn relaxed_steps_n(map: &Map, from: &Position) -> std::collections::HashMap<Position, usize> {
    let mut steps = std::collections::HashMap::from([(from.clone(), 0)]);
    loop {
        let mut changed = false;
        for pos in map.positions() {
            let Some(cur_steps_n) = steps.get(&pos).copied() else {
                continue;
            };

            for next_pos in map.neighbors(&pos) {
                if map.can_step(&pos, &next_pos)
                    && steps.get(&next_pos).map_or(true, |n| *n > cur_steps_n + 1)
                {
                    steps.insert(next_pos, cur_steps_n + 1);
                    changed = true;
                }
            }
        }

        if !changed {
            return steps;
        }
    }
}

#[cfg(test)]
fn random_map_text(rng: &mut rand::rngs::StdRng) -> String {
    use rand::Rng;

    let row_n = rng.gen_range(1..6);
    let col_n = rng.gen_range(2..7);
    let mut squares = (0..row_n * col_n)
        .map(|_| char::from(b'a' + rng.gen_range(0..4)))
        .collect::<Vec<_>>();
    let start_ind = rng.gen_range(0..squares.len());
    let mut end_ind = rng.gen_range(0..squares.len());
    while end_ind == start_ind {
        end_ind = rng.gen_range(0..squares.len());
    }
    squares[start_ind] = 'S';
    squares[end_ind] = 'E';

    squares
        .chunks(col_n)
        .map(|row| row.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn test_bfs_matches_exhaustive_relaxation() {
    use rand::{rngs::StdRng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(12);
    for _ in 0..300 {
        let text = random_map_text(&mut rng);
        let map = Map::try_from(text.as_str()).unwrap();
        let steps = relaxed_steps_n(&map, map.start());

        assert_eq!(
            map.shortest_path_len().ok(),
            steps.get(map.end()).copied(),
            "map:\n{}",
            text
        );
    }
}
