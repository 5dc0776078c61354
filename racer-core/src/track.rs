use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::{DRAFT_DEFAULT_HEIGHT, DRAFT_DEFAULT_WIDTH};
use crate::error::{DraftError, TrackError};

/// Tile type a legend code maps to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileKind {
    Road,
    Wall,
    Mud,
    Start,
    Finish,
    Checkpoint,
}

impl TileKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Road => "road",
            Self::Wall => "wall",
            Self::Mud => "mud",
            Self::Start => "start",
            Self::Finish => "finish",
            Self::Checkpoint => "checkpoint",
        }
    }
}

/// Grid coordinate of a tile. Signed so out-of-bounds lookups stay expressible.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
}

impl TilePos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// One row of tile codes: either `"1000"` or `["1", "0", "0", "0"]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TileRow {
    Text(String),
    Cells(Vec<String>),
}

impl TileRow {
    /// Tile codes of row `row`. A cell must hold exactly one character.
    fn codes(&self, row: usize) -> Result<Vec<char>, TrackError> {
        match self {
            Self::Text(text) => Ok(text.chars().collect()),
            Self::Cells(cells) => cells
                .iter()
                .enumerate()
                .map(|(column, cell)| {
                    let mut chars = cell.chars();
                    match (chars.next(), chars.next()) {
                        (Some(code), None) => Ok(code),
                        _ => Err(TrackError::BadCell {
                            row,
                            column,
                            cell: cell.clone(),
                        }),
                    }
                })
                .collect(),
        }
    }
}

/// On-disk track layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackFile {
    pub width: usize,
    pub height: usize,
    pub tiles: Vec<TileRow>,
    pub legend: BTreeMap<String, TileKind>,
    #[serde(default)]
    pub start_angle: f64,
}

/// Legend used by the editor and the bundled maps.
pub fn standard_legend() -> BTreeMap<char, TileKind> {
    BTreeMap::from([
        ('0', TileKind::Road),
        ('1', TileKind::Wall),
        ('2', TileKind::Mud),
        ('3', TileKind::Start),
        ('4', TileKind::Finish),
        ('5', TileKind::Checkpoint),
    ])
}

/// Validated, immutable track.
#[derive(Clone, Debug, PartialEq)]
pub struct Track {
    width: usize,
    height: usize,
    tiles: Vec<Vec<char>>,
    legend: BTreeMap<char, TileKind>,
    start: TilePos,
    finish: TilePos,
    checkpoints: Vec<TilePos>,
    start_angle: f64,
}

impl Track {
    pub fn from_json(text: &str) -> Result<Self, TrackError> {
        let file: TrackFile = serde_json::from_str(text).map_err(|err| TrackError::Parse {
            message: err.to_string(),
        })?;
        Self::from_file(&file)
    }

    pub fn from_file(file: &TrackFile) -> Result<Self, TrackError> {
        let mut legend = BTreeMap::new();
        for (code, kind) in &file.legend {
            let mut chars = code.chars();
            match (chars.next(), chars.next()) {
                (Some(ch), None) => {
                    legend.insert(ch, *kind);
                }
                _ => {
                    return Err(TrackError::Parse {
                        message: format!("legend code {code:?} must be a single character"),
                    })
                }
            }
        }

        let tiles = file
            .tiles
            .iter()
            .enumerate()
            .map(|(row, cells)| cells.codes(row))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_parts(
            file.width,
            file.height,
            tiles,
            legend,
            file.start_angle,
        )
    }

    fn from_parts(
        width: usize,
        height: usize,
        tiles: Vec<Vec<char>>,
        legend: BTreeMap<char, TileKind>,
        start_angle: f64,
    ) -> Result<Self, TrackError> {
        if tiles.len() != height {
            return Err(TrackError::RowCountMismatch {
                expected: height,
                actual: tiles.len(),
            });
        }

        let mut starts = Vec::new();
        let mut finishes = Vec::new();
        let mut checkpoints = Vec::new();

        for (y, row) in tiles.iter().enumerate() {
            if row.len() != width {
                return Err(TrackError::ColumnCountMismatch {
                    row: y,
                    expected: width,
                    actual: row.len(),
                });
            }
            for (x, code) in row.iter().enumerate() {
                let pos = TilePos::new(x as i32, y as i32);
                match legend.get(code) {
                    Some(TileKind::Start) => starts.push(pos),
                    Some(TileKind::Finish) => finishes.push(pos),
                    Some(TileKind::Checkpoint) => checkpoints.push(pos),
                    _ => {}
                }
            }
        }

        if starts.len() != 1 {
            return Err(TrackError::StartCount {
                found: starts.len(),
            });
        }
        if finishes.len() != 1 {
            return Err(TrackError::FinishCount {
                found: finishes.len(),
            });
        }

        Ok(Self {
            width,
            height,
            tiles,
            legend,
            start: starts[0],
            finish: finishes[0],
            checkpoints,
            start_angle,
        })
    }

    /// Serializes back to the file layout, one cell per string.
    pub fn to_file(&self) -> TrackFile {
        TrackFile {
            width: self.width,
            height: self.height,
            tiles: self
                .tiles
                .iter()
                .map(|row| TileRow::Cells(row.iter().map(|code| code.to_string()).collect()))
                .collect(),
            legend: self
                .legend
                .iter()
                .map(|(code, kind)| (code.to_string(), *kind))
                .collect(),
            start_angle: self.start_angle,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn start(&self) -> TilePos {
        self.start
    }

    pub fn finish(&self) -> TilePos {
        self.finish
    }

    pub fn checkpoints(&self) -> &[TilePos] {
        &self.checkpoints
    }

    pub fn start_angle(&self) -> f64 {
        self.start_angle
    }

    pub fn legend(&self) -> &BTreeMap<char, TileKind> {
        &self.legend
    }

    pub fn in_bounds(&self, pos: TilePos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    pub fn tile_code(&self, pos: TilePos) -> Option<char> {
        if !self.in_bounds(pos) {
            return None;
        }
        Some(self.tiles[pos.y as usize][pos.x as usize])
    }

    /// Out of bounds reads as wall, codes missing from the legend as road.
    pub fn kind_at_tile(&self, pos: TilePos) -> TileKind {
        match self.tile_code(pos) {
            None => TileKind::Wall,
            Some(code) => self.legend.get(&code).copied().unwrap_or(TileKind::Road),
        }
    }

    pub fn kind_at(&self, x: f64, y: f64, tile_size: f64) -> TileKind {
        self.kind_at_tile(tile_of(x, y, tile_size))
    }

    pub fn is_wall_tile(&self, pos: TilePos) -> bool {
        self.kind_at_tile(pos) == TileKind::Wall
    }

    pub fn is_finish_at(&self, x: f64, y: f64, tile_size: f64) -> bool {
        let pos = tile_of(x, y, tile_size);
        self.in_bounds(pos) && self.kind_at_tile(pos) == TileKind::Finish
    }
}

/// World position to tile coordinate by floor division.
pub fn tile_of(x: f64, y: f64, tile_size: f64) -> TilePos {
    TilePos::new(
        (x / tile_size).floor() as i32,
        (y / tile_size).floor() as i32,
    )
}

/// Mutable grid the editor paints on before it becomes a [`Track`].
#[derive(Clone, Debug, PartialEq)]
pub struct TrackDraft {
    pub tiles: Vec<Vec<char>>,
    pub legend: BTreeMap<char, TileKind>,
    pub start_angle: f64,
}

impl Default for TrackDraft {
    fn default() -> Self {
        Self::blank(DRAFT_DEFAULT_WIDTH, DRAFT_DEFAULT_HEIGHT)
    }
}

impl TrackDraft {
    /// Road grid with a one-tile wall border, standard legend.
    pub fn blank(width: usize, height: usize) -> Self {
        let tiles = (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| {
                        if x == 0 || y == 0 || x + 1 == width || y + 1 == height {
                            '1'
                        } else {
                            '0'
                        }
                    })
                    .collect()
            })
            .collect();
        Self {
            tiles,
            legend: standard_legend(),
            start_angle: 0.0,
        }
    }

    pub fn from_track(track: &Track) -> Self {
        Self {
            tiles: track.tiles.clone(),
            legend: track.legend.clone(),
            start_angle: track.start_angle,
        }
    }

    pub fn width(&self) -> usize {
        self.tiles.first().map_or(0, Vec::len)
    }

    pub fn height(&self) -> usize {
        self.tiles.len()
    }

    fn kind_of(&self, code: char) -> TileKind {
        self.legend.get(&code).copied().unwrap_or(TileKind::Road)
    }

    fn road_code(&self) -> char {
        self.legend
            .iter()
            .find(|(_, kind)| **kind == TileKind::Road)
            .map_or('0', |(code, _)| *code)
    }

    fn find(&self, kind: TileKind) -> Option<TilePos> {
        self.tiles.iter().enumerate().find_map(|(y, row)| {
            row.iter()
                .position(|code| self.kind_of(*code) == kind)
                .map(|x| TilePos::new(x as i32, y as i32))
        })
    }

    pub fn start(&self) -> Option<TilePos> {
        self.find(TileKind::Start)
    }

    pub fn finish(&self) -> Option<TilePos> {
        self.find(TileKind::Finish)
    }

    /// Paints one cell. A start or finish code first clears the previous one.
    /// Returns false when `pos` lies outside the grid.
    pub fn paint(&mut self, pos: TilePos, code: char) -> bool {
        if pos.x < 0 || pos.y < 0 || pos.y as usize >= self.height() {
            return false;
        }
        let (x, y) = (pos.x as usize, pos.y as usize);
        if x >= self.tiles[y].len() {
            return false;
        }

        let kind = self.kind_of(code);
        if matches!(kind, TileKind::Start | TileKind::Finish) {
            let road = self.road_code();
            for row in &mut self.tiles {
                for cell in row.iter_mut() {
                    if self.legend.get(cell).copied() == Some(kind) {
                        *cell = road;
                    }
                }
            }
        }
        self.tiles[y][x] = code;
        true
    }

    /// Turns the start heading a quarter turn clockwise.
    pub fn rotate_start(&mut self) -> Result<(), DraftError> {
        if self.start().is_none() {
            return Err(DraftError::MissingStart);
        }
        self.start_angle = (self.start_angle + std::f64::consts::FRAC_PI_2) % std::f64::consts::TAU;
        Ok(())
    }

    pub fn build(&self) -> Result<Track, DraftError> {
        if self.start().is_none() || self.finish().is_none() {
            return Err(DraftError::MissingStartOrFinish);
        }
        Track::from_parts(
            self.width(),
            self.height(),
            self.tiles.clone(),
            self.legend.clone(),
            self.start_angle,
        )
        .map_err(DraftError::Invalid)
    }
}
