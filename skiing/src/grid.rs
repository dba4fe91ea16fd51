use std::str::FromStr;

use itertools::iproduct;
use nom::{
    character::complete::{multispace0, space0, space1},
    multi::separated_list0,
    sequence::delimited,
    IResult,
};
use nom_supreme::error::ErrorTree;
use thiserror::Error;
use util::{parse_line, parse_number, LineError, Span};

/// West, south, east, north.
static DIRECTIONS: [(isize, isize); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub pos: Position,
    pub elevation: i32,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedInput {
    #[error("missing header line")]
    MissingHeader,

    #[error("line {line}: expected 2 header values, found {found}")]
    HeaderTokens { line: usize, found: usize },

    #[error("line {line}: grid dimension must be positive, found {value}")]
    BadDimension { line: usize, value: i64 },

    #[error("line {line}: invalid token")]
    BadToken {
        line: usize,
        #[source]
        source: LineError,
    },

    #[error("line {line}: expected {expected} elevations, found {found}")]
    RowLength {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: elevation {value} does not fit in 32 bits")]
    OutOfRange { line: usize, value: i64 },

    #[error("expected {expected} rows, found {found}")]
    MissingRows { expected: usize, found: usize },

    #[error("line {line}: unexpected data after the last row")]
    TrailingData { line: usize },

    #[error("a {rows}x{cols} grid cannot hold {cells} elevations")]
    Shape {
        rows: usize,
        cols: usize,
        cells: usize,
    },
}

/// Elevations in row-major order. Fixed once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    elevations: Vec<i32>,
}

impl Grid {
    pub fn new(rows: usize, cols: usize, elevations: Vec<i32>) -> Result<Self, MalformedInput> {
        if rows == 0 || cols == 0 || rows.checked_mul(cols) != Some(elevations.len()) {
            return Err(MalformedInput::Shape {
                rows,
                cols,
                cells: elevations.len(),
            });
        }

        Ok(Self {
            rows,
            cols,
            elevations,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.elevations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elevations.is_empty()
    }

    pub fn ind(&self, pos: Position) -> usize {
        pos.row * self.cols + pos.col
    }

    pub fn get(&self, pos: Position) -> Option<Cell> {
        (pos.row < self.rows && pos.col < self.cols).then(|| Cell {
            pos,
            elevation: self.elevations[self.ind(pos)],
        })
    }

    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        iproduct!(0..self.rows, 0..self.cols).map(|(row, col)| Cell {
            pos: Position::new(row, col),
            elevation: self.elevations[row * self.cols + col],
        })
    }

    pub fn neighbours(&self, pos: Position) -> impl Iterator<Item = Cell> + '_ {
        DIRECTIONS.iter().filter_map(move |&(dr, dc)| {
            let row = pos.row.checked_add_signed(dr)?;
            let col = pos.col.checked_add_signed(dc)?;
            self.get(Position::new(row, col))
        })
    }
}

fn numbers(i: Span) -> IResult<Span, Vec<i64>, ErrorTree<Span>> {
    delimited(space0, separated_list0(space1, parse_number), multispace0)(i)
}

fn parse_numbers(line: usize, l: &str) -> Result<Vec<i64>, MalformedInput> {
    parse_line(l, numbers).map_err(|source| MalformedInput::BadToken { line, source })
}

fn dimension(line: usize, value: i64) -> Result<usize, MalformedInput> {
    usize::try_from(value)
        .ok()
        .filter(|&v| v > 0)
        .ok_or(MalformedInput::BadDimension { line, value })
}

impl FromStr for Grid {
    type Err = MalformedInput;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut lines = s.lines().enumerate().map(|(i, l)| (i + 1, l));

        let (line, header) = lines.next().ok_or(MalformedInput::MissingHeader)?;
        let [rows, cols]: [i64; 2] = parse_numbers(line, header)?
            .try_into()
            .map_err(|v: Vec<_>| MalformedInput::HeaderTokens {
                line,
                found: v.len(),
            })?;
        let (rows, cols) = (dimension(line, rows)?, dimension(line, cols)?);

        let mut elevations = Vec::new();
        for row in 0..rows {
            let (line, l) = lines.next().ok_or(MalformedInput::MissingRows {
                expected: rows,
                found: row,
            })?;
            let values = parse_numbers(line, l)?;

            if values.len() != cols {
                return Err(MalformedInput::RowLength {
                    line,
                    expected: cols,
                    found: values.len(),
                });
            }

            for value in values {
                elevations.push(
                    i32::try_from(value).map_err(|_| MalformedInput::OutOfRange { line, value })?,
                );
            }
        }

        if let Some((line, _)) = lines.find(|(_, l)| !l.trim().is_empty()) {
            return Err(MalformedInput::TrailingData { line });
        }

        Grid::new(rows, cols, elevations)
    }
}
