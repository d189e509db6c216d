// src/world.rs
//! Мир хоста: тайлы карты и внешние проверки движка
//!
//! Генератор не владеет картой. Всё, что ему нужно от движка сервера, описано двумя трейтами:
//! - [`TileSource`]: чтение тайлов суши и статики по координате
//! - [`SeaHost`]: прямоугольники «заворота» кораблей, особые регионы,
//!   проверка появления плавающего существа и границы морской карты
//!
//! [`TileMatrix`] хранит мир в памяти. Используется CLI (синтетический мир из шума) и тестами.

use crate::config::{SpecialRegion, SyntheticWorldSettings};
use crate::geometry::{Point2D, Rect2D};
use crate::water::WaterTileSet;
use fastnoise_lite::{FastNoiseLite, FractalType, NoiseType};
use std::collections::HashMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Тайл суши (нижний слой карты)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LandTile {
    pub id: u16,
    pub z: i8,
}

/// Статический тайл поверх суши
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticTile {
    pub id: u16,
    pub z: i8,
}

pub const GRASS_TILE: LandTile = LandTile { id: 0x0003, z: 0 };
pub const SAND_TILE_ID: u16 = 0x0016;
pub const WATER_TILE_ID: u16 = 0x00A8;
pub const WATER_STATIC_ID: u16 = 0x5797;

/// Чтение тайлов карты
pub trait TileSource: Sync {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn land_tile(&self, x: u32, y: u32) -> LandTile;
    fn static_tiles(&self, x: u32, y: u32) -> &[StaticTile];
}

/// Внешние проверки движка, нужные валидатору пинов
pub trait SeaHost: TileSource {
    /// Прямоугольники, в которых корабль может плавать в этой точке карты
    fn sail_wraps(&self, p: Point2D) -> &[Rect2D];

    /// Точка внутри региона с правилами Angel Island или подземелья
    fn in_special_region(&self, p: Point2D) -> bool;

    /// Может ли здесь появиться плавающее существо на высоте `z`
    fn can_spawn_swimmer(&self, p: Point2D, z: i8) -> bool;

    /// Границы рисунка карты сокровищ размером `2 × dist` вокруг `center`.
    ///
    /// Квадрат сдвигается (не сжимается), чтобы остаться внутри карты.
    fn map_bounds(&self, center: Point2D, dist: i32) -> Rect2D {
        let side = dist * 2;
        let clamp_axis = |c: i32, limit: i32| -> i32 {
            let mut start = c - dist;
            if start + side > limit {
                start = limit - side;
            }
            start.max(0)
        };
        Rect2D::new(
            clamp_axis(center.x, self.width() as i32),
            clamp_axis(center.y, self.height() as i32),
            side,
            side,
        )
    }
}

/// Карта тайлов в памяти
#[derive(Debug, Clone)]
pub struct TileMatrix {
    width: u32,
    height: u32,
    land: Vec<LandTile>,
    statics: HashMap<usize, Vec<StaticTile>>,
    wraps: Vec<Rect2D>,
    special_regions: Vec<SpecialRegion>,
    water_tiles: WaterTileSet,
}

impl TileMatrix {
    /// Карта, целиком заполненная одним тайлом. Корабли могут плавать везде.
    #[must_use]
    pub fn new(width: u32, height: u32, fill: LandTile) -> Self {
        Self {
            width,
            height,
            land: vec![fill; (width * height) as usize],
            statics: HashMap::new(),
            wraps: vec![Rect2D::new(0, 0, width as i32, height as i32)],
            special_regions: Vec::new(),
            water_tiles: WaterTileSet::default(),
        }
    }

    /// Генерирует мир из шума: острова суши в океане с заданной долей суши
    #[must_use]
    pub fn synthetic(settings: &SyntheticWorldSettings, water_z: i8) -> Self {
        let width = settings.width;
        let height = settings.height;

        let mut noise = FastNoiseLite::new();
        noise.set_seed(Some(settings.seed as i32));
        noise.set_noise_type(Some(NoiseType::OpenSimplex2));
        noise.set_fractal_type(Some(FractalType::FBm));
        noise.set_fractal_octaves(Some(4));
        noise.set_frequency(Some(settings.frequency));

        let sample = |i: u32| -> f32 {
            let x = (i % width) as f32;
            let y = (i / width) as f32;
            (noise.get_noise_2d(x, y) + 1.0) * 0.5
        };

        #[cfg(feature = "parallel")]
        let values: Vec<f32> = (0..(width * height)).into_par_iter().map(sample).collect();
        #[cfg(not(feature = "parallel"))]
        let values: Vec<f32> = (0..(width * height)).map(sample).collect();

        let threshold = land_threshold(&values, settings.land_ratio);
        // Полоса мелководья под порогом суши: дно песчаное, вода задана статикой
        let shallow = threshold - 0.02;

        let water = LandTile {
            id: WATER_TILE_ID,
            z: water_z,
        };
        let mut matrix = Self::new(width, height, water);
        for (idx, &v) in values.iter().enumerate() {
            if v >= threshold {
                matrix.land[idx] = GRASS_TILE;
            } else if v >= shallow {
                matrix.land[idx] = LandTile {
                    id: SAND_TILE_ID,
                    z: water_z,
                };
                matrix.statics.insert(
                    idx,
                    vec![StaticTile {
                        id: WATER_STATIC_ID,
                        z: water_z,
                    }],
                );
            }
        }

        let inset = settings.wrap_inset;
        matrix.wraps = vec![Rect2D::new(
            inset,
            inset,
            width as i32 - inset * 2,
            height as i32 - inset * 2,
        )];
        matrix.special_regions = settings.special_regions.clone();
        matrix
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y * self.width + x) as usize
    }

    pub fn set_land(&mut self, x: u32, y: u32, tile: LandTile) {
        let idx = self.index(x, y);
        self.land[idx] = tile;
    }

    /// Заливает прямоугольник `[x0, x1) × [y0, y1)` одним тайлом
    pub fn fill_rect(&mut self, x0: u32, y0: u32, x1: u32, y1: u32, tile: LandTile) {
        for y in y0..y1.min(self.height) {
            for x in x0..x1.min(self.width) {
                self.set_land(x, y, tile);
            }
        }
    }

    pub fn add_static(&mut self, x: u32, y: u32, tile: StaticTile) {
        let idx = self.index(x, y);
        self.statics.entry(idx).or_default().push(tile);
    }

    pub fn set_wraps(&mut self, wraps: Vec<Rect2D>) {
        self.wraps = wraps;
    }

    pub fn add_special_region(&mut self, region: SpecialRegion) {
        self.special_regions.push(region);
    }

    fn in_bounds(&self, p: Point2D) -> bool {
        p.x >= 0 && p.y >= 0 && (p.x as u32) < self.width && (p.y as u32) < self.height
    }
}

/// Порог шума, выше которого лежит доля `land_ratio` клеток (гистограмма на 1024 корзины)
fn land_threshold(values: &[f32], land_ratio: f32) -> f32 {
    const BUCKETS: usize = 1024;
    if values.is_empty() {
        return 1.0;
    }
    let mut histogram = [0usize; BUCKETS];
    for &v in values {
        let b = ((v.clamp(0.0, 1.0)) * (BUCKETS - 1) as f32) as usize;
        histogram[b] += 1;
    }
    let target = (values.len() as f32 * land_ratio.clamp(0.0, 1.0)) as usize;
    let mut above = 0;
    for b in (0..BUCKETS).rev() {
        above += histogram[b];
        if above >= target {
            return b as f32 / (BUCKETS - 1) as f32;
        }
    }
    0.0
}

impl TileSource for TileMatrix {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn land_tile(&self, x: u32, y: u32) -> LandTile {
        self.land[self.index(x, y)]
    }

    fn static_tiles(&self, x: u32, y: u32) -> &[StaticTile] {
        self.statics
            .get(&self.index(x, y))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl SeaHost for TileMatrix {
    fn sail_wraps(&self, _p: Point2D) -> &[Rect2D] {
        &self.wraps
    }

    fn in_special_region(&self, p: Point2D) -> bool {
        self.special_regions.iter().any(|r| r.area.contains(p))
    }

    fn can_spawn_swimmer(&self, p: Point2D, z: i8) -> bool {
        if !self.in_bounds(p) {
            return false;
        }
        let (x, y) = (p.x as u32, p.y as u32);
        let statics = self.static_tiles(x, y);
        // Любая не-водная статика на этой высоте или выше перекрывает воду
        if statics
            .iter()
            .any(|s| s.z >= z && !self.water_tiles.is_water_static(s.id))
        {
            return false;
        }
        self.water_tiles
            .is_water_at(self.land_tile(x, y), statics, z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RegionRules;

    fn water(z: i8) -> LandTile {
        LandTile {
            id: WATER_TILE_ID,
            z,
        }
    }

    #[test]
    fn map_bounds_shift_inside_map() {
        let matrix = TileMatrix::new(1000, 800, water(-5));
        let centered = matrix.map_bounds(Point2D::new(500, 400), 100);
        assert_eq!(centered, Rect2D::new(400, 300, 200, 200));

        let corner = matrix.map_bounds(Point2D::new(10, 790), 100);
        assert_eq!(corner, Rect2D::new(0, 600, 200, 200));
        assert!(corner.contains(Point2D::new(10, 790)));
    }

    #[test]
    fn swimmer_needs_water_and_no_blocking_static() {
        let mut matrix = TileMatrix::new(4, 4, water(-5));
        matrix.set_land(0, 0, GRASS_TILE);
        matrix.add_static(1, 1, StaticTile { id: 0x1234, z: 0 });
        matrix.set_land(2, 2, LandTile {
            id: SAND_TILE_ID,
            z: -5,
        });
        matrix.add_static(2, 2, StaticTile {
            id: WATER_STATIC_ID,
            z: -5,
        });

        assert!(!matrix.can_spawn_swimmer(Point2D::new(0, 0), -5));
        assert!(!matrix.can_spawn_swimmer(Point2D::new(1, 1), -5));
        assert!(matrix.can_spawn_swimmer(Point2D::new(2, 2), -5));
        assert!(matrix.can_spawn_swimmer(Point2D::new(3, 3), -5));
        assert!(!matrix.can_spawn_swimmer(Point2D::new(3, 3), 0));
        assert!(!matrix.can_spawn_swimmer(Point2D::new(4, 0), -5));
    }

    #[test]
    fn special_regions_from_settings() {
        let settings = SyntheticWorldSettings {
            width: 64,
            height: 64,
            special_regions: vec![SpecialRegion {
                name: "Jail".to_string(),
                rules: RegionRules::AngelIsland,
                area: Rect2D::new(0, 0, 8, 8),
            }],
            ..SyntheticWorldSettings::default()
        };
        let matrix = TileMatrix::synthetic(&settings, -5);
        assert!(matrix.in_special_region(Point2D::new(3, 3)));
        assert!(!matrix.in_special_region(Point2D::new(30, 30)));
        assert_eq!(matrix.sail_wraps(Point2D::new(30, 30)), &[Rect2D::new(16, 16, 32, 32)]);
    }

    #[test]
    fn synthetic_world_roughly_matches_land_ratio() {
        let settings = SyntheticWorldSettings {
            width: 200,
            height: 200,
            seed: 3,
            frequency: 0.02,
            land_ratio: 0.3,
            ..SyntheticWorldSettings::default()
        };
        let matrix = TileMatrix::synthetic(&settings, -5);
        let land = matrix.land.iter().filter(|t| **t == GRASS_TILE).count();
        let ratio = land as f32 / matrix.land.len() as f32;
        assert!((0.2..0.4).contains(&ratio), "land ratio {ratio}");
    }
}
