use std::collections::{BTreeMap, BTreeSet, HashMap};

use itertools::Itertools;
use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use rand::thread_rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::coords::{CubeCoord, Direction};
use crate::types::Resource;

pub mod overlay;

pub type VertexId = u16;
pub type EdgeId = (VertexId, VertexId);

pub fn normalize_edge(edge: EdgeId) -> EdgeId {
    if edge.0 <= edge.1 {
        edge
    } else {
        (edge.1, edge.0)
    }
}

pub fn edge_contains(edge: EdgeId, vertex: VertexId) -> bool {
    edge.0 == vertex || edge.1 == vertex
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hex {
    pub id: u16,
    pub resource: Option<Resource>,
    pub number: Option<u8>,
    pub vertices: [VertexId; 6],
    pub edges: [EdgeId; 6],
}

#[derive(Debug, Clone)]
pub struct BoardTemplate {
    pub resources: Vec<Option<Resource>>,
    pub numbers: Vec<u8>,
}

impl BoardTemplate {
    pub fn standard() -> &'static BoardTemplate {
        &STANDARD_TEMPLATE
    }
}

// Corners clockwise from the top; sides connect consecutive corners.
const NORTH: usize = 0;
const NORTH_EAST: usize = 1;
const SOUTH_EAST: usize = 2;
const SOUTH: usize = 3;
const SOUTH_WEST: usize = 4;
const NORTH_WEST: usize = 5;

// Each corner is shared with up to two neighbor hexes; the pairs give the
// direction of the neighbor and which of its corners coincides with ours.
const CORNER_SHARING: [[(Direction, usize); 2]; 6] = [
    [
        (Direction::NorthWest, SOUTH_EAST),
        (Direction::NorthEast, SOUTH_WEST),
    ],
    [(Direction::East, NORTH_WEST), (Direction::NorthEast, SOUTH)],
    [(Direction::East, SOUTH_WEST), (Direction::SouthEast, NORTH)],
    [
        (Direction::SouthEast, NORTH_WEST),
        (Direction::SouthWest, NORTH_EAST),
    ],
    [(Direction::West, SOUTH_EAST), (Direction::SouthWest, NORTH)],
    [(Direction::West, NORTH_EAST), (Direction::NorthWest, SOUTH)],
];

#[derive(Debug, Clone)]
pub struct BoardGraph {
    hexes: BTreeMap<u16, Hex>,
    edges: BTreeSet<EdgeId>,
    vertex_neighbors: HashMap<VertexId, SmallVec<[VertexId; 3]>>,
    vertex_edges: HashMap<VertexId, SmallVec<[EdgeId; 3]>>,
    adjacent_hexes: HashMap<VertexId, SmallVec<[u16; 3]>>,
    resource_vertices: HashMap<Resource, BTreeSet<VertexId>>,
    vertex_production: HashMap<VertexId, BTreeMap<Resource, f64>>,
    vertex_pips: HashMap<VertexId, u32>,
    scarcity: HashMap<Resource, f64>,
}

impl BoardGraph {
    pub fn standard() -> Self {
        Self::from_template(BoardTemplate::standard())
    }

    pub fn shuffled() -> Self {
        let mut rng = thread_rng();
        Self::shuffled_with_rng(&mut rng)
    }

    pub fn shuffled_with_rng(rng: &mut impl rand::Rng) -> Self {
        let template = BoardTemplate::standard();
        let mut resources = template.resources.clone();
        resources.shuffle(rng);
        let mut numbers = template.numbers.clone();
        numbers.shuffle(rng);
        Self::from_template(&BoardTemplate { resources, numbers })
    }

    pub fn from_template(template: &BoardTemplate) -> Self {
        assert_eq!(
            template.resources.len(),
            HEX_COORDS.len(),
            "template must assign a resource slot to every hex"
        );

        let mut corner_ids: HashMap<CubeCoord, [VertexId; 6]> = HashMap::new();
        let mut vertex_autoinc: VertexId = 0;
        let mut hexes: BTreeMap<u16, Hex> = BTreeMap::new();
        let mut numbers = template.numbers.iter().copied();

        for (idx, (coord, resource)) in HEX_COORDS
            .iter()
            .zip(template.resources.iter().copied())
            .enumerate()
        {
            let mut corners: [Option<VertexId>; 6] = [None; 6];
            for (corner, slot) in corners.iter_mut().enumerate() {
                for (direction, their_corner) in CORNER_SHARING[corner] {
                    if let Some(theirs) = corner_ids.get(&coord.neighbor(direction)) {
                        *slot = Some(theirs[their_corner]);
                        break;
                    }
                }
                if slot.is_none() {
                    *slot = Some(vertex_autoinc);
                    vertex_autoinc += 1;
                }
            }
            let vertices = corners.map(|slot| slot.expect("corner id missing"));
            corner_ids.insert(*coord, vertices);

            let mut edges = [(0, 0); 6];
            for (side, edge) in edges.iter_mut().enumerate() {
                *edge = normalize_edge((vertices[side], vertices[(side + 1) % 6]));
            }

            let number = if resource.is_some() {
                Some(numbers.next().expect("not enough numbers for template"))
            } else {
                None
            };
            let id = idx as u16;
            hexes.insert(
                id,
                Hex {
                    id,
                    resource,
                    number,
                    vertices,
                    edges,
                },
            );
        }

        Self::from_hexes(hexes)
    }

    fn from_hexes(hexes: BTreeMap<u16, Hex>) -> Self {
        let mut edges: BTreeSet<EdgeId> = BTreeSet::new();
        let mut vertex_neighbors: HashMap<VertexId, SmallVec<[VertexId; 3]>> = HashMap::new();
        let mut vertex_edges: HashMap<VertexId, SmallVec<[EdgeId; 3]>> = HashMap::new();
        let mut adjacent_hexes: HashMap<VertexId, SmallVec<[u16; 3]>> = HashMap::new();

        for hex in hexes.values() {
            for vertex in hex.vertices {
                adjacent_hexes.entry(vertex).or_default().push(hex.id);
            }
            for edge in hex.edges {
                if edges.insert(edge) {
                    let (a, b) = edge;
                    vertex_neighbors.entry(a).or_default().push(b);
                    vertex_neighbors.entry(b).or_default().push(a);
                    vertex_edges.entry(a).or_default().push(edge);
                    vertex_edges.entry(b).or_default().push(edge);
                }
            }
        }

        let mut resource_vertices: HashMap<Resource, BTreeSet<VertexId>> = Resource::ALL
            .into_iter()
            .map(|resource| (resource, BTreeSet::new()))
            .collect();
        let mut vertex_production: HashMap<VertexId, BTreeMap<Resource, f64>> = vertex_edges
            .keys()
            .map(|vertex| (*vertex, BTreeMap::new()))
            .collect();
        let mut vertex_pips: HashMap<VertexId, u32> =
            vertex_edges.keys().map(|vertex| (*vertex, 0)).collect();

        for hex in hexes.values() {
            let (Some(resource), Some(number)) = (hex.resource, hex.number) else {
                continue;
            };
            for vertex in hex.vertices {
                resource_vertices
                    .get_mut(&resource)
                    .expect("resource index missing")
                    .insert(vertex);
                *vertex_production
                    .get_mut(&vertex)
                    .expect("production index missing")
                    .entry(resource)
                    .or_default() += number_probability(number);
                *vertex_pips.get_mut(&vertex).expect("pip index missing") += Self::pip(number);
            }
        }

        let mut resource_pips: HashMap<Resource, u32> =
            Resource::ALL.into_iter().map(|r| (r, 0)).collect();
        for hex in hexes.values() {
            if let (Some(resource), Some(number)) = (hex.resource, hex.number) {
                *resource_pips.get_mut(&resource).expect("pip tally missing") += Self::pip(number);
            }
        }
        let total_pips: u32 = resource_pips.values().sum();
        let scarcity = Resource::ALL
            .into_iter()
            .map(|resource| {
                let pips = resource_pips[&resource];
                let value = if pips == 0 {
                    SCARCITY_CAP
                } else {
                    (total_pips as f64 / (Resource::ALL.len() as f64 * pips as f64))
                        .min(SCARCITY_CAP)
                };
                (resource, value)
            })
            .collect();

        Self {
            hexes,
            edges,
            vertex_neighbors,
            vertex_edges,
            adjacent_hexes,
            resource_vertices,
            vertex_production,
            vertex_pips,
            scarcity,
        }
    }

    pub fn hex(&self, id: u16) -> &Hex {
        self.hexes.get(&id).expect("unknown hex id")
    }

    pub fn hexes(&self) -> impl Iterator<Item = &Hex> {
        self.hexes.values()
    }

    pub fn hex_count(&self) -> usize {
        self.hexes.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_edges.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.vertex_edges.keys().copied().sorted()
    }

    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges.iter().copied()
    }

    pub fn contains_vertex(&self, vertex: VertexId) -> bool {
        self.vertex_edges.contains_key(&vertex)
    }

    pub fn contains_edge(&self, edge: EdgeId) -> bool {
        self.edges.contains(&normalize_edge(edge))
    }

    pub fn neighbors(&self, vertex: VertexId) -> &[VertexId] {
        self.vertex_neighbors
            .get(&vertex)
            .expect("unknown vertex id")
    }

    pub fn edges_of(&self, vertex: VertexId) -> &[EdgeId] {
        self.vertex_edges.get(&vertex).expect("unknown vertex id")
    }

    pub fn adjacent_hexes(&self, vertex: VertexId) -> &[u16] {
        self.adjacent_hexes.get(&vertex).expect("unknown vertex id")
    }

    pub fn other_end(&self, edge: EdgeId, vertex: VertexId) -> VertexId {
        assert!(self.contains_edge(edge), "unknown edge id");
        if edge.0 == vertex {
            edge.1
        } else if edge.1 == vertex {
            edge.0
        } else {
            panic!("vertex is not an endpoint of edge");
        }
    }

    pub fn vertices_for_resource(&self, resource: Resource) -> &BTreeSet<VertexId> {
        self.resource_vertices
            .get(&resource)
            .expect("resource index missing")
    }

    pub fn vertex_production(&self, vertex: VertexId) -> &BTreeMap<Resource, f64> {
        self.vertex_production
            .get(&vertex)
            .expect("unknown vertex id")
    }

    pub fn vertex_pips(&self, vertex: VertexId) -> u32 {
        *self.vertex_pips.get(&vertex).expect("unknown vertex id")
    }

    pub fn vertex_resources(&self, vertex: VertexId) -> Vec<Resource> {
        self.vertex_production(vertex).keys().copied().collect()
    }

    pub fn scarcity(&self, resource: Resource) -> f64 {
        *self
            .scarcity
            .get(&resource)
            .expect("scarcity index missing")
    }

    pub fn pip(number: u8) -> u32 {
        (6 - (7 - number as i32).abs()).max(0) as u32
    }
}

const SCARCITY_CAP: f64 = 5.0;

fn number_probability(number: u8) -> f64 {
    *DICE_PROBABILITIES.get(&number).unwrap_or(&0.0)
}

static DICE_PROBABILITIES: Lazy<HashMap<u8, f64>> = Lazy::new(|| {
    let mut probas: HashMap<u8, f64> = HashMap::new();
    for i in 1..=6 {
        for j in 1..=6 {
            let total = (i + j) as u8;
            *probas.entry(total).or_insert(0.0) += 1.0 / 36.0;
        }
    }
    probas
});

// Center tile first, then the inner and outer rings.
const HEX_COORDS: [CubeCoord; 19] = [
    CubeCoord { x: 0, y: 0, z: 0 },
    CubeCoord { x: 1, y: -1, z: 0 },
    CubeCoord { x: 0, y: -1, z: 1 },
    CubeCoord { x: -1, y: 0, z: 1 },
    CubeCoord { x: -1, y: 1, z: 0 },
    CubeCoord { x: 0, y: 1, z: -1 },
    CubeCoord { x: 1, y: 0, z: -1 },
    CubeCoord { x: 2, y: -2, z: 0 },
    CubeCoord { x: 1, y: -2, z: 1 },
    CubeCoord { x: 0, y: -2, z: 2 },
    CubeCoord { x: -1, y: -1, z: 2 },
    CubeCoord { x: -2, y: 0, z: 2 },
    CubeCoord { x: -2, y: 1, z: 1 },
    CubeCoord { x: -2, y: 2, z: 0 },
    CubeCoord { x: -1, y: 2, z: -1 },
    CubeCoord { x: 0, y: 2, z: -2 },
    CubeCoord { x: 1, y: 1, z: -2 },
    CubeCoord { x: 2, y: 0, z: -2 },
    CubeCoord { x: 2, y: -1, z: -1 },
];

static STANDARD_TEMPLATE: Lazy<BoardTemplate> = Lazy::new(|| BoardTemplate {
    resources: vec![
        Some(Resource::Ore),
        Some(Resource::Wool),
        Some(Resource::Lumber),
        Some(Resource::Grain),
        Some(Resource::Brick),
        Some(Resource::Wool),
        Some(Resource::Brick),
        Some(Resource::Grain),
        Some(Resource::Lumber),
        None,
        Some(Resource::Lumber),
        Some(Resource::Ore),
        Some(Resource::Lumber),
        Some(Resource::Ore),
        Some(Resource::Grain),
        Some(Resource::Wool),
        Some(Resource::Brick),
        Some(Resource::Grain),
        Some(Resource::Wool),
    ],
    numbers: vec![
        10, 2, 9, 12, 6, 4, 10, 9, 11, 3, 8, 8, 3, 4, 5, 5, 6, 11,
    ],
});
