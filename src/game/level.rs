use bevy::prelude::*;
use std::fmt;

use crate::game::simulation::{BoundingBox, ObstacleKind, StaticObstacle};
use crate::game::structures::{GridGeometry, OccupancyGrid};
use crate::game::unit::Owner;

pub const DEFAULT_LEVEL_PATH: &str = "assets/levels/skirmish.txt";

const ALLOWED_SYMBOLS: [char; 6] = ['.', 'W', 'P', 'X', 'C', 'T'];

/// Why a level file was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelError {
    WrongRowCount { expected: usize, found: usize },
    WrongColumnCount { row: usize, expected: usize, found: usize },
    InvalidSymbol { symbol: char, x: usize, y: usize },
    OpenBorder,
    MissingPlayerCastle,
    MissingAiCastle,
    MalformedStructure { symbol: char, x: usize, y: usize },
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelError::WrongRowCount { expected, found } => {
                write!(f, "expected {} rows, found {}", expected, found)
            }
            LevelError::WrongColumnCount { row, expected, found } => {
                write!(f, "row {} has {} columns, expected {}", row, found, expected)
            }
            LevelError::InvalidSymbol { symbol, x, y } => {
                write!(f, "invalid symbol '{}' at ({}, {})", symbol, x, y)
            }
            LevelError::OpenBorder => write!(f, "the border of the map is not all wall"),
            LevelError::MissingPlayerCastle => write!(f, "no player castle present"),
            LevelError::MissingAiCastle => write!(f, "no AI castle present"),
            LevelError::MalformedStructure { symbol, x, y } => {
                write!(f, "invalid square around '{}' at ({}, {})", symbol, x, y)
            }
        }
    }
}

impl std::error::Error for LevelError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureKind {
    PlayerCastle,
    AiCastle,
    Crystals,
    Wood,
}

impl StructureKind {
    fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            'P' => Some(Self::PlayerCastle),
            'X' => Some(Self::AiCastle),
            'C' => Some(Self::Crystals),
            'T' => Some(Self::Wood),
            _ => None,
        }
    }

    /// Side length of the square block, in cells.
    pub fn size(self) -> usize {
        match self {
            Self::PlayerCastle | Self::AiCastle => 3,
            Self::Crystals | Self::Wood => 2,
        }
    }

    pub fn obstacle_kind(self) -> ObstacleKind {
        match self {
            Self::PlayerCastle | Self::AiCastle => ObstacleKind::Castle,
            Self::Crystals | Self::Wood => ObstacleKind::ResourceDeposit,
        }
    }
}

/// One multi-cell structure, addressed by its top-left cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Structure {
    pub kind: StructureKind,
    pub cell: IVec2,
}

/// A validated level: fixed-size symbol rows plus the structures found in them.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelLayout {
    rows: Vec<String>,
    structures: Vec<Structure>,
}

impl LevelLayout {
    /// Parse a level file.
    ///
    /// Lines starting with `//` and empty lines are skipped and a trailing
    /// `\r` is dropped. The remaining rows must form a `columns`×`rows`
    /// rectangle of known symbols, enclosed by walls, with at least one
    /// player and one AI castle. Castles are 3×3 blocks and resources 2×2
    /// blocks, each surrounded by open ground.
    pub fn parse(text: &str, columns: usize, rows: usize) -> Result<Self, LevelError> {
        let lines: Vec<String> = text
            .lines()
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .filter(|line| !line.is_empty() && !line.starts_with("//"))
            .map(str::to_owned)
            .collect();

        if lines.len() != rows {
            return Err(LevelError::WrongRowCount { expected: rows, found: lines.len() });
        }

        let grid: Vec<Vec<char>> = lines.iter().map(|line| line.chars().collect()).collect();

        for (y, row) in grid.iter().enumerate() {
            if row.len() != columns {
                return Err(LevelError::WrongColumnCount { row: y, expected: columns, found: row.len() });
            }
            if let Some(x) = row.iter().position(|c| !ALLOWED_SYMBOLS.contains(c)) {
                return Err(LevelError::InvalidSymbol { symbol: row[x], x, y });
            }
        }

        if !has_wall_border(&grid) {
            return Err(LevelError::OpenBorder);
        }

        let contains = |symbol: char| grid.iter().any(|row| row.contains(&symbol));
        if !contains('P') {
            return Err(LevelError::MissingPlayerCastle);
        }
        if !contains('X') {
            return Err(LevelError::MissingAiCastle);
        }

        let mut structures = Vec::new();
        for (y, row) in grid.iter().enumerate() {
            for (x, &symbol) in row.iter().enumerate() {
                let Some(kind) = StructureKind::from_symbol(symbol) else {
                    continue;
                };
                // Interior cells of a block already validated from its corner.
                let continues_left = x > 0 && grid[y][x - 1] == symbol;
                let continues_up = y > 0 && grid[y - 1][x] == symbol;
                if continues_left || continues_up {
                    continue;
                }
                if !is_complete_block(&grid, x, y, kind.size(), symbol) {
                    return Err(LevelError::MalformedStructure { symbol, x, y });
                }
                structures.push(Structure {
                    kind,
                    cell: IVec2::new(x as i32, y as i32),
                });
            }
        }

        Ok(Self { rows: lines, structures })
    }

    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn structures(&self) -> &[Structure] {
        &self.structures
    }

    pub fn walls(&self) -> impl Iterator<Item = IVec2> + '_ {
        self.rows.iter().enumerate().flat_map(|(y, row)| {
            row.chars()
                .enumerate()
                .filter(|(_, symbol)| *symbol == 'W')
                .map(move |(x, _)| IVec2::new(x as i32, y as i32))
        })
    }
}

fn has_wall_border(grid: &[Vec<char>]) -> bool {
    let (Some(first), Some(last)) = (grid.first(), grid.last()) else {
        return false;
    };
    let all_walls = |row: &Vec<char>| row.iter().all(|&c| c == 'W');

    all_walls(first)
        && all_walls(last)
        && grid
            .iter()
            .all(|row| row.first() == Some(&'W') && row.last() == Some(&'W'))
}

/// `size`×`size` cells of `symbol` starting at (x, y), ringed by open ground.
fn is_complete_block(grid: &[Vec<char>], x: usize, y: usize, size: usize, symbol: char) -> bool {
    let (x, y, size) = (x as i64, y as i64, size as i64);

    for dy in -1..=size {
        for dx in -1..=size {
            let (cx, cy) = (x + dx, y + dy);
            if cx < 0 || cy < 0 {
                return false;
            }
            let Some(&c) = grid.get(cy as usize).and_then(|row| row.get(cx as usize)) else {
                return false;
            };

            let inside = (0..size).contains(&dx) && (0..size).contains(&dy);
            if inside && c != symbol {
                return false;
            }
            if !inside && c != '.' {
                return false;
            }
        }
    }
    true
}

/// A castle placed by the level, for spawning units around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastleSite {
    pub owner: Owner,
    pub bounds: BoundingBox,
}

/// Load the occupancy grid and spawn every static obstacle of `layout`.
///
/// Player castles belong to [`Owner::PLAYER`]; AI castles are numbered from
/// [`Owner::AI`] upwards in reading order.
pub fn spawn_level(world: &mut World, layout: &LevelLayout, geometry: &GridGeometry) -> Vec<CastleSite> {
    world.get_resource_or_insert_with(OccupancyGrid::default).load(layout.rows());

    let cell = geometry.cell_size;
    let mut walls = 0usize;
    for wall in layout.walls() {
        let pixel = geometry.cell_to_pixel(wall).as_ivec2();
        world.spawn((
            StaticObstacle { kind: ObstacleKind::Wall },
            BoundingBox::new(pixel.x, pixel.y, cell, cell),
        ));
        walls += 1;
    }

    let mut castles = Vec::new();
    let mut next_ai = Owner::AI.0;
    for structure in layout.structures() {
        let pixel = geometry.cell_to_pixel(structure.cell).as_ivec2();
        let side = structure.kind.size() as i32 * cell;
        let bounds = BoundingBox::new(pixel.x, pixel.y, side, side);

        world.spawn((StaticObstacle { kind: structure.kind.obstacle_kind() }, bounds));

        let owner = match structure.kind {
            StructureKind::PlayerCastle => Owner::PLAYER,
            StructureKind::AiCastle => {
                let owner = Owner(next_ai);
                next_ai = next_ai.saturating_add(1);
                owner
            }
            StructureKind::Crystals | StructureKind::Wood => continue,
        };
        castles.push(CastleSite { owner, bounds });
    }

    info!(
        "[LEVEL] Spawned {} walls, {} structures, {} castles",
        walls,
        layout.structures().len(),
        castles.len()
    );

    castles
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 10×11 level with a castle for each side and one of each resource.
    fn small_level() -> Vec<String> {
        vec![
            "WWWWWWWWWW".into(),
            "W........W".into(),
            "W.PPP....W".into(),
            "W.PPP.CC.W".into(),
            "W.PPP.CC.W".into(),
            "W........W".into(),
            "W.XXX.TT.W".into(),
            "W.XXX.TT.W".into(),
            "W.XXX....W".into(),
            "W........W".into(),
            "WWWWWWWWWW".into(),
        ]
    }

    fn parse(rows: &[String]) -> Result<LevelLayout, LevelError> {
        LevelLayout::parse(&rows.join("\n"), 10, rows.len())
    }

    #[test]
    fn test_valid_level_finds_structure_corners() {
        let layout = parse(&small_level()).expect("level should be valid");

        let corners: Vec<(StructureKind, IVec2)> =
            layout.structures().iter().map(|s| (s.kind, s.cell)).collect();
        assert_eq!(
            corners,
            vec![
                (StructureKind::PlayerCastle, IVec2::new(2, 2)),
                (StructureKind::Crystals, IVec2::new(6, 3)),
                (StructureKind::AiCastle, IVec2::new(2, 6)),
                (StructureKind::Wood, IVec2::new(6, 6)),
            ]
        );
        assert_eq!(layout.walls().count(), 10 * 2 + 9 * 2);
    }

    #[test]
    fn test_comments_blank_lines_and_carriage_returns_are_skipped() {
        let text = format!("// skirmish\r\n\n{}\r\n", small_level().join("\r\n"));
        let layout = LevelLayout::parse(&text, 10, 11).expect("level should be valid");
        assert_eq!(layout.rows().len(), 11);
        assert!(layout.rows().iter().all(|row| !row.ends_with('\r')));
    }

    #[test]
    fn test_wrong_dimensions_are_rejected() {
        let mut rows = small_level();
        assert_eq!(
            LevelLayout::parse(&rows.join("\n"), 10, 12),
            Err(LevelError::WrongRowCount { expected: 12, found: 11 })
        );

        rows[5] = "W.........W".into();
        assert_eq!(
            parse(&rows),
            Err(LevelError::WrongColumnCount { row: 5, expected: 10, found: 11 })
        );
    }

    #[test]
    fn test_unknown_symbol_is_rejected() {
        let mut rows = small_level();
        rows[1] = "W...?....W".into();
        assert_eq!(parse(&rows), Err(LevelError::InvalidSymbol { symbol: '?', x: 4, y: 1 }));
    }

    #[test]
    fn test_open_border_is_rejected() {
        let mut rows = small_level();
        rows[9] = ".........W".into();
        assert_eq!(parse(&rows), Err(LevelError::OpenBorder));
    }

    #[test]
    fn test_missing_castles_are_rejected() {
        let mut rows = small_level();
        for row in rows.iter_mut() {
            *row = row.replace('X', ".");
        }
        assert_eq!(parse(&rows), Err(LevelError::MissingAiCastle));

        let mut rows = small_level();
        for row in rows.iter_mut() {
            *row = row.replace('P', ".");
        }
        assert_eq!(parse(&rows), Err(LevelError::MissingPlayerCastle));
    }

    #[test]
    fn test_incomplete_block_is_rejected() {
        let mut rows = small_level();
        rows[4] = "W.PP..CC.W".into();
        assert_eq!(
            parse(&rows),
            Err(LevelError::MalformedStructure { symbol: 'P', x: 2, y: 2 })
        );
    }

    #[test]
    fn test_block_touching_a_wall_is_rejected() {
        let mut rows = small_level();
        rows[3] = "W.PPP.CCWW".into();
        assert_eq!(
            parse(&rows),
            Err(LevelError::MalformedStructure { symbol: 'C', x: 6, y: 3 })
        );
    }

    #[test]
    fn test_spawn_level_builds_grid_and_obstacles() {
        let layout = parse(&small_level()).expect("level should be valid");
        let geometry = GridGeometry::default();
        let mut world = World::new();

        let castles = spawn_level(&mut world, &layout, &geometry);

        let grid = world.resource::<OccupancyGrid>();
        assert_eq!((grid.width(), grid.height()), (10, 11));
        assert!(!grid.is_accessible(0, 0));
        assert!(!grid.is_accessible(3, 3));
        assert!(grid.is_accessible(1, 1));

        assert_eq!(
            castles,
            vec![
                CastleSite { owner: Owner::PLAYER, bounds: BoundingBox::new(32, 120, 48, 48) },
                CastleSite { owner: Owner::AI, bounds: BoundingBox::new(32, 184, 48, 48) },
            ]
        );

        let mut obstacles = world.query::<(&StaticObstacle, &BoundingBox)>();
        let resources: Vec<BoundingBox> = obstacles
            .iter(&world)
            .filter(|(o, _)| o.kind == ObstacleKind::ResourceDeposit)
            .map(|(_, b)| *b)
            .collect();
        assert_eq!(resources.len(), 2);
        assert!(resources.iter().all(|b| b.size() == IVec2::new(32, 32)));
        assert_eq!(obstacles.iter(&world).count(), 38 + 4);
    }
}
