//! Region geometry, boolean clipping and terrain-aware routing
//!
//! A standalone library for strategy-map style worlds: a plane divided into
//! countries and provinces, a regular grid of cells over the same extent, and
//! a pathfinder that moves units across either one.
//!
//! # Quick Start
//!
//! ```rust
//! use region_atlas::*;
//! use glam::Vec2;
//!
//! // Generate a world with Perlin terrain
//! let config = WorldConfigBuilder::new()
//!     .grid_size(32, 32).unwrap()
//!     .terrain_seed(42)
//!     .build().unwrap();
//! let mut world = World::generate(config).unwrap();
//!
//! // Route a flying unit across the grid, avoiding one cell
//! let blocked = world.grid().cell_index(16, 16).unwrap();
//! world.set_cost_override(blocked, IMPASSABLE).unwrap();
//! let query = RouteQuery::new(TerrainCapability::OnlyAir);
//! let route = world
//!     .find_route(Vec2::new(-0.45, -0.45), Vec2::new(0.45, 0.45), &query)
//!     .unwrap();
//! assert!(route.is_some());
//!
//! // Clip two boundaries
//! let a = Polygon::from(Contour::rectangle(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0)));
//! let b = Polygon::from(Contour::rectangle(Vec2::new(0.5, 0.0), Vec2::new(1.5, 1.0)));
//! let merged = clip(&a, &b, ClipOperation::Union);
//! assert!((merged.area() - 1.5).abs() < 1e-5);
//! ```
//!
//! # Features
//!
//! - `spatial-index` (default): KD-tree nearest-region lookups
//! - `serde`: Serialization support for configuration, geometry and routes
//!
//! # Threading
//!
//! Every operation is synchronous. A world, region map or cost matrix must
//! not be mutated while a search over it runs on another thread.

// Modules
pub mod error;
pub mod config;
pub mod geometry;
pub mod clip;
pub mod region;
pub mod atlas;
pub mod grid;
pub mod terrain;
pub mod pathfinding;
pub mod world;

#[cfg(feature = "spatial-index")]
pub mod spatial;

// Re-export core types for convenience
pub use error::{Result, WorldError};
pub use config::{Connectivity, WorldConfig, WorldConfigBuilder, WorldExtent};
pub use geometry::{intersects, Contour, Point2D, Polygon, Rect, Segment, EPSILON};
pub use clip::{clip, clip_with_diagnostics, ClipDiagnostic, ClipOperation, ClipOutcome};
pub use region::{Entity, EntityId, EntityKind, Region, RegionId};
pub use atlas::{BoundarySource, RegionMap};
pub use grid::{build_grid, Cell, EdgeRef, Grid};
pub use terrain::{
    FlatTerrainSampler, PerlinConfig, PerlinTerrainSampler, TerrainCapability, TerrainSample, TerrainSampler,
    TerrainType,
};
pub use pathfinding::{
    find_route, find_route_between, CostMatrix, NodeId, Route, RouteGraph, RouteQuery, IMPASSABLE,
};
pub use world::World;

#[cfg(feature = "spatial-index")]
pub use spatial::SpatialIndex;

// Re-export glam::Vec2 for convenience
pub use glam::Vec2;
