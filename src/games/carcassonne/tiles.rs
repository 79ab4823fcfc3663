//! Tile model (edges, intra-tile connectivity, rotation) and the base-game
//! tile catalog (24 types, 72 tiles).

use std::fmt;

use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::types::*;

use Area::{City as C, Grass as G, Road as R};
use Side::{Down, Left, Right, Up};

// --- Connectivity ---

/// Bit index of each unordered edge pair; the diagonal is unused.
const PAIR_BIT: [[u8; 4]; 4] = [
    [0xff, 0, 1, 2],
    [0, 0xff, 3, 4],
    [1, 3, 0xff, 5],
    [2, 4, 5, 0xff],
];

const PAIRS: [(usize, usize); 6] = [(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)];

/// Which pairs of edges are linked through the tile interior, one bit per
/// unordered pair (6 bits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Connections(u8);

impl Connections {
    pub const NONE: Connections = Connections(0);
    pub const ALL: Connections = Connections(0b11_1111);

    /// Connect every pair of sides in `sides`.
    pub fn group(sides: &[Side]) -> Self {
        Self::NONE.with_group(sides)
    }

    pub fn with_group(self, sides: &[Side]) -> Self {
        let mut bits = self.0;
        for (i, a) in sides.iter().enumerate() {
            for b in &sides[i + 1..] {
                if let (Some(a), Some(b)) = (a.index(), b.index()) {
                    if a != b {
                        bits |= 1 << PAIR_BIT[a][b];
                    }
                }
            }
        }
        Connections(bits)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == Self::NONE.0
    }

    /// Every side reaches every other side directly.
    #[inline]
    pub fn is_full(self) -> bool {
        self.0 == Self::ALL.0
    }

    pub fn connected(self, a: Side, b: Side) -> bool {
        match (a.index(), b.index()) {
            (Some(a), Some(b)) if a != b => self.0 & (1 << PAIR_BIT[a][b]) != 0,
            _ => false,
        }
    }

    /// Sides linked to `side` through the interior, excluding `side` itself.
    pub fn partners(self, side: Side) -> impl Iterator<Item = Side> {
        let mask = if self.is_empty() || side.index().is_none() {
            0u8
        } else if self.is_full() {
            0b1111 & !side_bit(side)
        } else {
            EDGE_SIDES
                .iter()
                .filter(|&&other| self.connected(side, other))
                .fold(0u8, |acc, &other| acc | side_bit(other))
        };
        EDGE_SIDES
            .into_iter()
            .filter(move |&other| mask & side_bit(other) != 0)
    }

    /// Remap every pair for a quarter turn: `(a, b)` becomes `(a+1, b+1)`.
    pub fn rotated(self) -> Self {
        if self.is_empty() || self.is_full() {
            return self;
        }
        let mut bits = 0u8;
        for (bit, &(a, b)) in PAIRS.iter().enumerate() {
            if self.0 & (1 << bit) != 0 {
                bits |= 1 << PAIR_BIT[(a + 1) % 4][(b + 1) % 4];
            }
        }
        Connections(bits)
    }
}

/// Single-bit mask for an edge side; `Center` maps to no bit.
#[inline]
pub fn side_bit(side: Side) -> u8 {
    side.index().map_or(0, |i| 1 << i)
}

// --- Tile ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    /// Tile type index; physical copies of one type share it.
    pub id: u8,
    /// Edge terrain indexed Left, Down, Right, Up.
    pub edges: [Area; 4],
    pub cloister: bool,
    pub emblem: bool,
    pub connections: Connections,
    pub meeple: Option<Meeple>,
}

impl Tile {
    pub fn new(id: u8, edges: [Area; 4], connections: Connections) -> Self {
        Self {
            id,
            edges,
            cloister: false,
            emblem: false,
            connections,
            meeple: None,
        }
    }

    pub fn with_cloister(mut self) -> Self {
        self.cloister = true;
        self
    }

    pub fn with_emblem(mut self) -> Self {
        self.emblem = true;
        self
    }

    pub fn with_meeple(mut self, meeple: Meeple) -> Self {
        self.meeple = Some(meeple);
        self
    }

    /// Terrain at an edge side. `Center` is never part of a structure edge.
    #[inline]
    pub fn edge(&self, side: Side) -> Area {
        side.index().map_or(Area::Grass, |i| self.edges[i])
    }

    /// A copy turned one quarter: the edge at side `s` moves to `s+1`,
    /// connectivity and an edge token follow, a `Center` token stays put.
    pub fn rotate(&self) -> Tile {
        let mut tile = *self;
        tile.edges = [self.edges[3], self.edges[0], self.edges[1], self.edges[2]];
        tile.connections = self.connections.rotated();
        tile.meeple = self
            .meeple
            .map(|m| Meeple::new(m.player, m.side.rotated()));
        tile
    }

    pub fn rotated_by(&self, quarter_turns: usize) -> Tile {
        (0..quarter_turns % 4).fold(*self, |tile, _| tile.rotate())
    }

    pub fn has_no_connections(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn all_sides_connected(&self) -> bool {
        self.connections.is_full()
    }

    pub fn has_connection_at_side(&self, side: Side) -> bool {
        if self.has_no_connections() {
            return false;
        }
        if self.all_sides_connected() {
            return true;
        }
        self.connections.partners(side).next().is_some()
    }

    /// Bit mask of `side` and every side internally connected to it.
    pub fn facet_mask(&self, side: Side) -> u8 {
        self.connections
            .partners(side)
            .fold(side_bit(side), |acc, other| acc | side_bit(other))
    }

    /// Owner of the token sitting on the facet that contains `side`, if any.
    pub fn meeple_on_facet(&self, side: Side) -> Option<Meeple> {
        let meeple = self.meeple?;
        if meeple.side != Side::Center && self.facet_mask(side) & side_bit(meeple.side) != 0 {
            Some(meeple)
        } else {
            None
        }
    }

    /// Facing edges of two edge-adjacent tiles must carry the same terrain.
    /// `side` is the side of `self` that touches `other`.
    pub fn fits_against(&self, side: Side, other: &Tile) -> bool {
        self.edge(side) == other.edge(side.opposite())
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Tile({} [{:?} {:?} {:?} {:?}] {:06b}",
            tile_index_to_type(self.id),
            self.edges[0],
            self.edges[1],
            self.edges[2],
            self.edges[3],
            self.connections.bits(),
        )?;
        if self.cloister {
            write!(f, " cloister")?;
        }
        if self.emblem {
            write!(f, " emblem")?;
        }
        if let Some(m) = self.meeple {
            write!(f, " meeple(p{} {:?})", m.player, m.side)?;
        }
        write!(f, ")")
    }
}

// --- Tile type ID conversion ---

const TILE_TYPE_STRINGS: [&str; 24] = [
    "A", "B", "C", "D", "E", "F", "G", "H", "I", "J",
    "K", "L", "M", "N", "O", "P", "Q", "R", "S", "T",
    "U", "V", "W", "X",
];

/// Convert tile type ID string (e.g. "A") to u8 index (0–23).
#[inline]
pub fn tile_type_to_index(id: &str) -> u8 {
    id.as_bytes()[0] - b'A'
}

/// Convert tile type u8 index to string ID; ids outside the catalog render as "?".
#[inline]
pub fn tile_index_to_type(idx: u8) -> &'static str {
    TILE_TYPE_STRINGS.get(idx as usize).copied().unwrap_or("?")
}

// --- Catalog ---

#[derive(Debug, Clone)]
pub struct TileDefinition {
    pub tile: Tile,
    pub count: u32,
}

fn def(tile_type: &str, edges: [Area; 4], connections: Connections, count: u32) -> TileDefinition {
    TileDefinition {
        tile: Tile::new(tile_type_to_index(tile_type), edges, connections),
        count,
    }
}

fn def_emblem(tile_type: &str, edges: [Area; 4], connections: Connections, count: u32) -> TileDefinition {
    let mut d = def(tile_type, edges, connections, count);
    d.tile = d.tile.with_emblem();
    d
}

fn def_cloister(tile_type: &str, edges: [Area; 4], count: u32) -> TileDefinition {
    let mut d = def(tile_type, edges, Connections::NONE, count);
    d.tile = d.tile.with_cloister();
    d
}

fn group(sides: &[Side]) -> Connections {
    Connections::group(sides)
}

/// Edges are listed Left, Down, Right, Up.
pub static TILE_CATALOG: Lazy<Vec<TileDefinition>> = Lazy::new(|| {
    vec![
        // A: cloister with road down (x2)
        def_cloister("A", [G, R, G, G], 2),
        // B: cloister (x4)
        def_cloister("B", [G, G, G, G], 4),
        // C: full city with emblem (x1)
        def_emblem("C", [C, C, C, C], Connections::ALL, 1),
        // D: city up, straight road left-right (x4), the start tile
        def("D", [R, G, R, C], group(&[Left, Right]), 4),
        // E: city up (x5)
        def("E", [G, G, G, C], Connections::NONE, 5),
        // F: city left-right with emblem (x2)
        def_emblem("F", [C, G, C, G], group(&[Left, Right]), 2),
        // G: city up-down (x1)
        def("G", [G, C, G, C], group(&[Down, Up]), 1),
        // H: separate cities up and down (x3)
        def("H", [G, C, G, C], Connections::NONE, 3),
        // I: separate cities up and left (x2)
        def("I", [C, G, G, C], Connections::NONE, 2),
        // J: city up, road right-down curve (x3)
        def("J", [G, R, R, C], group(&[Down, Right]), 3),
        // K: city up, road left-down curve (x3)
        def("K", [R, R, G, C], group(&[Left, Down]), 3),
        // L: city up, three-way road junction (x3)
        def("L", [R, R, R, C], Connections::NONE, 3),
        // M: city up-left with emblem (x2)
        def_emblem("M", [C, G, G, C], group(&[Left, Up]), 2),
        // N: city up-left (x3)
        def("N", [C, G, G, C], group(&[Left, Up]), 3),
        // O: city up-left with emblem, road right-down (x2)
        def_emblem("O", [C, R, R, C], group(&[Left, Up]).with_group(&[Down, Right]), 2),
        // P: city up-left, road right-down (x3)
        def("P", [C, R, R, C], group(&[Left, Up]).with_group(&[Down, Right]), 3),
        // Q: city left-right-up with emblem (x2)
        def_emblem("Q", [C, G, C, C], group(&[Left, Right, Up]), 2),
        // R: city left-right-up with emblem, road down (x2)
        def_emblem("R", [C, R, C, C], group(&[Left, Right, Up]), 2),
        // S: city left-right-up (x2)
        def("S", [C, G, C, C], group(&[Left, Right, Up]), 2),
        // T: city left-right-up, road down (x1)
        def("T", [C, R, C, C], group(&[Left, Right, Up]), 1),
        // U: straight road up-down (x8)
        def("U", [G, R, G, R], group(&[Down, Up]), 8),
        // V: road curve left-down (x9)
        def("V", [R, R, G, G], group(&[Left, Down]), 9),
        // W: three-way road junction (x4)
        def("W", [R, R, G, R], Connections::NONE, 4),
        // X: four-way crossroads (x1)
        def("X", [R, R, R, R], Connections::NONE, 1),
    ]
});

pub const STARTING_TILE_ID: &str = "D";

/// Catalog tile for a type string, without a token.
pub fn tile_by_type(tile_type: &str) -> Option<Tile> {
    TILE_CATALOG
        .iter()
        .find(|d| tile_index_to_type(d.tile.id) == tile_type)
        .map(|d| d.tile)
}

/// The start tile placed at the origin.
pub fn starting_tile() -> Tile {
    let id = tile_type_to_index(STARTING_TILE_ID);
    TILE_CATALOG
        .iter()
        .map(|d| d.tile)
        .find(|t| t.id == id)
        .unwrap_or_else(|| Tile::new(id, [R, G, R, C], group(&[Left, Right])))
}

/// Build the draw bag in catalog order. Excludes one copy of the starting tile.
pub fn build_tile_bag() -> Vec<Tile> {
    let start_id = tile_type_to_index(STARTING_TILE_ID);
    let mut bag = Vec::with_capacity(71);
    for tile_def in TILE_CATALOG.iter() {
        let count = if tile_def.tile.id == start_id {
            tile_def.count - 1
        } else {
            tile_def.count
        };
        for _ in 0..count {
            bag.push(tile_def.tile);
        }
    }
    bag
}

/// `copies` concatenated draw bags, shuffled with a seeded RNG.
pub fn shuffled_deck(seed: u64, copies: usize) -> Vec<Tile> {
    let mut deck: Vec<Tile> = (0..copies).flat_map(|_| build_tile_bag()).collect();
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    deck.shuffle(&mut rng);
    deck
}

/// Total number of tiles in the base game.
pub fn get_tile_total() -> u32 {
    TILE_CATALOG.iter().map(|t| t.count).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_catalog_count() {
        assert_eq!(TILE_CATALOG.len(), 24);
    }

    #[test]
    fn test_total_tiles() {
        assert_eq!(get_tile_total(), 72);
    }

    #[test]
    fn test_tile_bag_size() {
        assert_eq!(build_tile_bag().len(), 71);
    }

    #[test]
    fn test_catalog_ids_match_types() {
        for (i, d) in TILE_CATALOG.iter().enumerate() {
            assert_eq!(d.tile.id as usize, i);
        }
        assert_eq!(tile_by_type("X").map(|t| t.id), Some(23));
        assert!(tile_by_type("Z").is_none());
    }

    #[test]
    fn test_catalog_never_connects_grass() {
        for d in TILE_CATALOG.iter() {
            for side in EDGE_SIDES {
                for other in d.tile.connections.partners(side) {
                    assert_ne!(d.tile.edge(side), Area::Grass, "{}", d.tile);
                    assert_eq!(d.tile.edge(side), d.tile.edge(other), "{}", d.tile);
                }
            }
        }
    }

    #[test]
    fn test_starting_tile_is_d() {
        let tile = starting_tile();
        assert_eq!(tile.edge(Side::Up), Area::City);
        assert_eq!(tile.edge(Side::Right), Area::Road);
        assert_eq!(tile.edge(Side::Down), Area::Grass);
        assert_eq!(tile.edge(Side::Left), Area::Road);
        assert!(tile.connections.connected(Side::Left, Side::Right));
    }

    #[test]
    fn test_rotate_shifts_edges() {
        let tile = starting_tile().rotate();
        // city moves from Up to Left, road now runs Down-Up
        assert_eq!(tile.edges, [C, R, G, R]);
        assert!(tile.connections.connected(Side::Down, Side::Up));
        assert!(!tile.connections.connected(Side::Left, Side::Right));
    }

    #[test]
    fn test_rotate_curve_connections() {
        // V: road Left-Down becomes Down-Right
        let tile = tile_by_type("V").map(|t| t.rotate());
        let tile = tile.expect("catalog tile");
        assert_eq!(tile.edges, [G, R, R, G]);
        assert!(tile.connections.connected(Side::Down, Side::Right));
        assert!(!tile.connections.connected(Side::Left, Side::Down));
    }

    #[test]
    fn test_rotate_four_times_is_identity() {
        for d in TILE_CATALOG.iter() {
            let tile = d.tile.with_meeple(Meeple::new(1, Side::Down));
            assert_eq!(tile.rotated_by(4), tile);
            assert_eq!(tile.rotate().rotate().rotate().rotate(), tile);
        }
    }

    #[test]
    fn test_rotate_moves_meeple_but_not_center() {
        let tile = starting_tile().with_meeple(Meeple::new(0, Side::Up));
        assert_eq!(tile.rotate().meeple, Some(Meeple::new(0, Side::Left)));

        let cloister = tile_by_type("B")
            .expect("catalog tile")
            .with_meeple(Meeple::new(2, Side::Center));
        assert_eq!(cloister.rotate().meeple, Some(Meeple::new(2, Side::Center)));
    }

    #[test]
    fn test_has_connection_at_side() {
        let d = starting_tile();
        assert!(d.has_connection_at_side(Side::Left));
        assert!(d.has_connection_at_side(Side::Right));
        assert!(!d.has_connection_at_side(Side::Up));

        let full = tile_by_type("C").expect("catalog tile");
        assert!(full.all_sides_connected());
        for side in EDGE_SIDES {
            assert!(full.has_connection_at_side(side));
            assert_eq!(full.connections.partners(side).count(), 3);
        }

        let crossroads = tile_by_type("X").expect("catalog tile");
        assert!(crossroads.has_no_connections());
        assert!(!crossroads.has_connection_at_side(Side::Up));
    }

    #[test]
    fn test_meeple_on_facet() {
        let tile = starting_tile().with_meeple(Meeple::new(1, Side::Right));
        assert_eq!(tile.meeple_on_facet(Side::Left), Some(Meeple::new(1, Side::Right)));
        assert_eq!(tile.meeple_on_facet(Side::Up), None);
    }

    #[test]
    fn test_fits_against_is_symmetric() {
        let d = starting_tile();
        let e = tile_by_type("E").expect("catalog tile").rotated_by(2);
        // e has its city facing Down; d's city faces Up
        assert!(e.fits_against(Side::Down, &d));
        assert!(d.fits_against(Side::Up, &e));
        assert!(!d.fits_against(Side::Left, &e));
    }

    #[test]
    fn test_shuffled_deck_is_deterministic() {
        let a = shuffled_deck(7, 2);
        let b = shuffled_deck(7, 2);
        assert_eq!(a.len(), 142);
        assert_eq!(a, b);
    }
}
