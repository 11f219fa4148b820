//! Terrain classification and sampling
//!
//! Every routing node carries a terrain type and a normalized altitude.
//! Units declare which terrain they may enter through a
//! [`TerrainCapability`].

mod perlin;

pub use perlin::{sample_perlin_2d, sample_perlin_fbm, PerlinConfig};

use glam::Vec2;

/// Surface type of a cell or region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TerrainType {
    /// Land
    #[default]
    Ground,
    /// Sea, lakes and rivers
    Water,
}

impl TerrainType {
    /// Check if this terrain is water
    pub fn is_water(&self) -> bool {
        matches!(self, TerrainType::Water)
    }
}

/// Which terrain a moving unit may enter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TerrainCapability {
    /// Any terrain
    #[default]
    Any,
    /// Land units
    OnlyGround,
    /// Naval units
    OnlyWater,
    /// Flying units; terrain is ignored, altitude bounds still apply
    OnlyAir,
}

impl TerrainCapability {
    /// Check whether a unit with this capability may enter `terrain`
    pub fn allows(&self, terrain: TerrainType) -> bool {
        match self {
            TerrainCapability::Any | TerrainCapability::OnlyAir => true,
            TerrainCapability::OnlyGround => terrain == TerrainType::Ground,
            TerrainCapability::OnlyWater => terrain == TerrainType::Water,
        }
    }
}

/// Terrain and altitude at one location
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TerrainSample {
    /// Surface type
    pub terrain: TerrainType,
    /// Normalized altitude in 0..=1
    pub altitude: f32,
}

/// Trait for assigning terrain to world positions
pub trait TerrainSampler {
    /// Sample terrain at a world position
    fn sample(&self, position: Vec2) -> TerrainSample;
}

/// Default sampler: fBm altitude, water below sea level
#[derive(Debug, Clone, Copy)]
pub struct PerlinTerrainSampler {
    /// Seed for noise generation
    pub seed: u32,
    /// Altitude below which terrain is water (default: 0.35)
    pub sea_level: f32,
    /// Perlin noise configuration
    pub config: PerlinConfig,
}

impl Default for PerlinTerrainSampler {
    fn default() -> Self {
        Self {
            seed: 0,
            sea_level: crate::config::DEFAULT_SEA_LEVEL,
            config: PerlinConfig::default(),
        }
    }
}

impl PerlinTerrainSampler {
    /// Create a new sampler with the given seed
    pub fn new(seed: u32) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }

    /// Create a sampler with a custom sea level and noise configuration
    pub fn with_config(seed: u32, sea_level: f32, config: PerlinConfig) -> Self {
        Self {
            seed,
            sea_level,
            config,
        }
    }
}

impl TerrainSampler for PerlinTerrainSampler {
    fn sample(&self, position: Vec2) -> TerrainSample {
        let altitude = sample_perlin_2d(position, self.seed, &self.config);
        let terrain = if altitude < self.sea_level {
            TerrainType::Water
        } else {
            TerrainType::Ground
        };
        TerrainSample { terrain, altitude }
    }
}

/// Sampler returning the same terrain everywhere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatTerrainSampler {
    /// Terrain and altitude assigned to every position
    pub sample: TerrainSample,
}

impl FlatTerrainSampler {
    /// Ground at the given altitude
    pub fn ground(altitude: f32) -> Self {
        Self {
            sample: TerrainSample {
                terrain: TerrainType::Ground,
                altitude,
            },
        }
    }
}

impl Default for FlatTerrainSampler {
    fn default() -> Self {
        Self::ground(0.5)
    }
}

impl TerrainSampler for FlatTerrainSampler {
    fn sample(&self, _position: Vec2) -> TerrainSample {
        self.sample
    }
}
