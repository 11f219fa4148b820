//! 2D Perlin noise
//!
//! Classic gradient noise over the plane using Ken Perlin's permutation
//! table, layered into fractal Brownian motion for altitude maps.

use glam::Vec2;

/// Configuration for Perlin noise generation
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PerlinConfig {
    /// Base frequency controls feature size (lower = larger features)
    pub base_frequency: f32,
    /// Number of octaves for fractal detail layers
    pub octaves: usize,
    /// Amplitude decay per octave (controls roughness)
    pub persistence: f32,
    /// Frequency multiplier per octave
    pub lacunarity: f32,
}

impl Default for PerlinConfig {
    fn default() -> Self {
        Self {
            base_frequency: 3.0,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
        }
    }
}

// Ken Perlin's reference permutation. Changing it changes every generated map.
const PERM: [u32; 256] = [
    151, 160, 137, 91, 90, 15, 131, 13, 201, 95, 96, 53, 194, 233, 7, 225, 140, 36, 103, 30, 69,
    142, 8, 99, 37, 240, 21, 10, 23, 190, 6, 148, 247, 120, 234, 75, 0, 26, 197, 62, 94, 252, 219,
    203, 117, 35, 11, 32, 57, 177, 33, 88, 237, 149, 56, 87, 174, 20, 125, 136, 171, 168, 68, 175,
    74, 165, 71, 134, 139, 48, 27, 166, 77, 146, 158, 231, 83, 111, 229, 122, 60, 211, 133, 230,
    220, 105, 92, 41, 55, 46, 245, 40, 244, 102, 143, 54, 65, 25, 63, 161, 1, 216, 80, 73, 209, 76,
    132, 187, 208, 89, 18, 169, 200, 196, 135, 130, 116, 188, 159, 86, 164, 100, 109, 198, 173,
    186, 3, 64, 52, 217, 226, 250, 124, 123, 5, 202, 38, 147, 118, 126, 255, 82, 85, 212, 207, 206,
    59, 227, 47, 16, 58, 17, 182, 189, 28, 42, 223, 183, 170, 213, 119, 248, 152, 2, 44, 154, 163,
    70, 221, 153, 101, 155, 167, 43, 172, 9, 129, 22, 39, 253, 19, 98, 108, 110, 79, 113, 224, 232,
    178, 185, 112, 104, 218, 246, 97, 228, 251, 34, 242, 193, 238, 210, 144, 12, 191, 179, 162,
    241, 81, 51, 145, 235, 249, 14, 239, 107, 49, 192, 214, 31, 181, 199, 106, 157, 184, 84, 204,
    176, 115, 121, 50, 45, 127, 4, 150, 254, 138, 236, 205, 93, 222, 114, 67, 29, 24, 72, 243, 141,
    128, 195, 78, 66, 215, 61, 156, 180,
];

/// Corner hash mixing the lattice coordinates with the seed
#[inline]
fn hash(x: i32, y: i32, seed: u32) -> u32 {
    let seed_hash = (seed.wrapping_mul(1103515245).wrapping_add(12345)) >> 16;
    let ix = ((x as u32) ^ seed_hash) & 255;
    let iy = ((y as u32) ^ (seed_hash >> 8)) & 255;
    let a = PERM[ix as usize];
    PERM[((a + iy) & 255) as usize]
}

/// Dot product of the offset with one of eight lattice gradients
#[inline]
fn gradient(hash_value: u32, x: f32, y: f32) -> f32 {
    match hash_value & 7 {
        0 => x + y,
        1 => -x + y,
        2 => x - y,
        3 => -x - y,
        4 => x,
        5 => -x,
        6 => y,
        _ => -y,
    }
}

/// Quintic fade curve 6t⁵ - 15t⁴ + 10t³
#[inline]
fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + t * (b - a)
}

/// Raw 2D Perlin noise in [-1, 1]; zero on every lattice point
fn perlin_2d(pos: Vec2, seed: u32) -> f32 {
    let x0 = pos.x.floor() as i32;
    let y0 = pos.y.floor() as i32;
    let xf = pos.x - pos.x.floor();
    let yf = pos.y - pos.y.floor();

    let u = fade(xf);
    let v = fade(yf);

    let g00 = gradient(hash(x0, y0, seed), xf, yf);
    let g10 = gradient(hash(x0 + 1, y0, seed), xf - 1.0, yf);
    let g01 = gradient(hash(x0, y0 + 1, seed), xf, yf - 1.0);
    let g11 = gradient(hash(x0 + 1, y0 + 1, seed), xf - 1.0, yf - 1.0);

    lerp(lerp(g00, g10, u), lerp(g01, g11, u), v).clamp(-1.0, 1.0)
}

/// Sample layered Perlin noise, normalized to [0, 1]
pub fn sample_perlin_2d(position: Vec2, seed: u32, config: &PerlinConfig) -> f32 {
    let raw = sample_perlin_fbm(
        position * config.base_frequency,
        seed,
        config.octaves,
        config.persistence,
        config.lacunarity,
    );
    ((raw + 1.0) / 2.0).clamp(0.0, 1.0)
}

/// Raw fractal Brownian motion in approximately [-1, 1]
pub fn sample_perlin_fbm(
    position: Vec2,
    seed: u32,
    octaves: usize,
    persistence: f32,
    lacunarity: f32,
) -> f32 {
    let mut total = 0.0;
    let mut amplitude = 1.0;
    let mut frequency = 1.0;
    let mut max_value = 0.0;

    for _ in 0..octaves {
        total += perlin_2d(position * frequency, seed) * amplitude;
        max_value += amplitude;
        amplitude *= persistence;
        frequency *= lacunarity;
    }

    if max_value == 0.0 {
        return 0.0;
    }
    total / max_value
}
