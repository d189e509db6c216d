// src/treasure/generator.rs
//! Расстановка цепочек пинов
//!
//! Для каждого уровня:
//! 1. Собираем все стартовые точки, прошедшие проверку как первый пин
//! 2. Берём случайную неиспользованную стартовую точку и «выращиваем» цепочку
//!    случайными шагами, проверяя каждый новый пин
//! 3. Повторяем, пока не набрано `locations_per_level` цепочек,
//!    не кончились стартовые точки или не исчерпан бюджет итераций
//!
//! Нехватка цепочек на уровне не ошибка: уровень просто получит меньше вариантов.

use crate::config::SeaTreasureParams;
use crate::distance::DistanceField;
use crate::geometry::Point2D;
use crate::treasure::PinChain;
use crate::world::SeaHost;
use rand::Rng;
use serde::Serialize;
use std::f64::consts::FRAC_PI_2;
use thiserror::Error;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Почему не удалось вырастить цепочку от стартовой точки
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("level {0} is not in the level table")]
    InvalidLevel(usize),

    #[error("no valid position for pin {pin_index}")]
    NoValidPin { pin_index: usize },
}

/// Итог генерации одного уровня
#[derive(Debug, Clone, Serialize)]
pub struct LevelOutcome {
    pub level: usize,
    pub chains: Vec<PinChain>,
    /// Размер пула стартовых точек
    pub candidates: usize,
    pub iterations: usize,
}

pub struct PlacementGenerator<'a, H: SeaHost + ?Sized> {
    host: &'a H,
    distances: &'a DistanceField,
    params: &'a SeaTreasureParams,
}

impl<'a, H: SeaHost + ?Sized> PlacementGenerator<'a, H> {
    pub fn new(host: &'a H, distances: &'a DistanceField, params: &'a SeaTreasureParams) -> Self {
        Self {
            host,
            distances,
            params,
        }
    }

    /// Проверяет пин `pins[pin_index]` цепочки уровня `level` (уровни с 1).
    ///
    /// Пины до `pin_index` считаются уже принятыми.
    #[must_use]
    pub fn validate(&self, level: usize, pins: &[Point2D], pin_index: usize) -> bool {
        let (Some(data), Some(chart_dist)) =
            (self.params.level(level), self.params.chart_distance(level))
        else {
            return false;
        };
        let Some(&p) = pins.get(pin_index) else {
            return false;
        };

        if p.x < 0
            || p.y < 0
            || p.x >= self.host.width() as i32
            || p.y >= self.host.height() as i32
        {
            return false;
        }

        if !self.host.sail_wraps(p).iter().any(|r| r.contains(p)) {
            return false;
        }

        let Some(dist) = self.distances.at(p) else {
            return false;
        };
        if dist < self.params.min_shore_distance {
            return false;
        }

        if pin_index == 0 {
            if !data.band_contains(dist) {
                return false;
            }
        } else {
            let min = i64::from(self.params.pin_dist_min);
            if p.dist_sq(pins[pin_index - 1]) < min * min {
                return false;
            }
            if pins[..pin_index].contains(&p) {
                return false;
            }
        }

        // Весь рисунок карты должен уместиться вокруг первого пина
        if !self.host.map_bounds(pins[0], chart_dist).contains(p) {
            return false;
        }

        if self.host.in_special_region(p) {
            return false;
        }

        self.host.can_spawn_swimmer(p, self.params.water_z)
    }

    /// Все точки карты, годные как первый пин уровня
    #[must_use]
    pub fn find_start_candidates(&self, level: usize) -> Vec<Point2D> {
        let width = self.host.width().min(self.distances.width);
        let height = self.host.height().min(self.distances.height);

        let scan_row = |y: u32| -> Vec<Point2D> {
            (0..width)
                .map(|x| Point2D::new(x as i32, y as i32))
                .filter(|&p| self.validate(level, &[p], 0))
                .collect()
        };

        #[cfg(feature = "parallel")]
        let rows: Vec<Vec<Point2D>> = (0..height).into_par_iter().map(scan_row).collect();
        #[cfg(not(feature = "parallel"))]
        let rows: Vec<Vec<Point2D>> = (0..height).map(scan_row).collect();

        rows.concat()
    }

    /// Случайный шаг от `from`: радиус `sqrt(u) * pin_dist_max` смещён к внешнему краю круга
    fn propose<R: Rng + ?Sized>(&self, from: Point2D, rng: &mut R) -> Point2D {
        let radius = rng.gen_range(0.0f64..1.0).sqrt() * f64::from(self.params.pin_dist_max);
        let angle = rng.gen_range(0.0..FRAC_PI_2);
        let mut dx = (angle.cos() * radius) as i32;
        let mut dy = (angle.sin() * radius) as i32;
        if rng.gen_bool(0.5) {
            dx = -dx;
        }
        if rng.gen_bool(0.5) {
            dy = -dy;
        }
        Point2D::new(from.x + dx, from.y + dy)
    }

    /// Выращивает цепочку `num_pins` пинов от стартовой точки
    pub fn grow_chain<R: Rng + ?Sized>(
        &self,
        level: usize,
        start: Point2D,
        rng: &mut R,
    ) -> Result<PinChain, ChainError> {
        let data = self
            .params
            .level(level)
            .ok_or(ChainError::InvalidLevel(level))?;

        let mut pins = Vec::with_capacity(data.num_pins);
        pins.push(start);

        while pins.len() < data.num_pins {
            let pin_index = pins.len();
            let last = pins[pin_index - 1];
            let mut placed = false;

            for _ in 0..self.params.pin_attempts {
                pins.push(self.propose(last, rng));
                if self.validate(level, &pins, pin_index) {
                    placed = true;
                    break;
                }
                pins.pop();
            }

            if !placed {
                return Err(ChainError::NoValidPin { pin_index });
            }
        }

        Ok(PinChain::new(pins))
    }

    /// Генерирует цепочки одного уровня
    pub fn generate_level<R: Rng + ?Sized>(&self, level: usize, rng: &mut R) -> LevelOutcome {
        let target = self.params.locations_per_level;
        let mut candidates = self.find_start_candidates(level);
        let pool = candidates.len();
        log::info!("Уровень {level}: {pool} стартовых точек");

        let mut chains = Vec::new();
        let mut iterations = 0;

        while chains.len() < target
            && !candidates.is_empty()
            && iterations < self.params.max_iterations
        {
            iterations += 1;
            // Стартовая точка используется один раз, даже если цепочка не выросла
            let start = candidates.swap_remove(rng.gen_range(0..candidates.len()));
            match self.grow_chain(level, start, rng) {
                Ok(chain) => chains.push(chain),
                Err(err) => log::trace!("level {level}: start {start} dropped: {err}"),
            }
        }

        if chains.len() < target {
            log::warn!(
                "Failed generation for level {level}: {} of {target} locations \
                 ({pool} candidates, {iterations} iterations)",
                chains.len()
            );
        } else {
            log::info!("Уровень {level}: {} цепочек за {iterations} итераций", chains.len());
        }

        LevelOutcome {
            level,
            chains,
            candidates: pool,
            iterations,
        }
    }

    /// Генерирует все уровни таблицы по порядку
    pub fn generate_all<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<LevelOutcome> {
        (1..=self.params.levels.len())
            .map(|level| self.generate_level(level, rng))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RegionRules, SpecialRegion};
    use crate::geometry::Rect2D;
    use crate::water::{WaterTileSet, generate_water_map};
    use crate::world::{GRASS_TILE, LandTile, TileMatrix, WATER_TILE_ID};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    /// 200×200 океан с островом 20×20 в центре
    fn island_world() -> TileMatrix {
        let mut matrix = TileMatrix::new(
            200,
            200,
            LandTile {
                id: WATER_TILE_ID,
                z: -5,
            },
        );
        matrix.fill_rect(90, 90, 110, 110, GRASS_TILE);
        matrix
    }

    fn small_params() -> SeaTreasureParams {
        SeaTreasureParams {
            pin_dist_min: 20,
            pin_dist_max: 40,
            locations_per_level: 10,
            chart_distances: vec![60, 60, 70, 80, 90],
            ..SeaTreasureParams::default()
        }
    }

    fn distances(matrix: &TileMatrix) -> DistanceField {
        let water = generate_water_map(Some(matrix), 200, 200, -5, &WaterTileSet::default());
        DistanceField::from_water_map(&water)
    }

    #[test]
    fn validate_first_pin_rules() {
        let matrix = island_world();
        let field = distances(&matrix);
        let params = small_params();
        let generator = PlacementGenerator::new(&matrix, &field, &params);

        assert_eq!(field.at(Point2D::new(80, 100)), Some(10));
        assert!(generator.validate(1, &[Point2D::new(80, 100)], 0));
        // Слишком близко к берегу
        assert!(!generator.validate(1, &[Point2D::new(86, 100)], 0));
        // Вне полосы уровня 2
        assert!(!generator.validate(2, &[Point2D::new(80, 100)], 0));
        // Уровни вне таблицы
        assert!(!generator.validate(0, &[Point2D::new(80, 100)], 0));
        assert!(!generator.validate(6, &[Point2D::new(80, 100)], 0));
        // Вне карты
        assert!(!generator.validate(1, &[Point2D::new(-1, 5)], 0));
        assert!(!generator.validate(1, &[Point2D::new(200, 5)], 0));
        // Индекс пина вне цепочки
        assert!(!generator.validate(1, &[Point2D::new(80, 100)], 1));
    }

    #[test]
    fn validate_follow_up_pin_rules() {
        let matrix = island_world();
        let field = distances(&matrix);
        let params = small_params();
        let generator = PlacementGenerator::new(&matrix, &field, &params);

        let start = Point2D::new(80, 100);
        assert!(generator.validate(1, &[start, Point2D::new(80, 60)], 1));
        // Ближе pin_dist_min к предыдущему
        assert!(!generator.validate(1, &[start, Point2D::new(80, 110)], 1));
        // Повтор более раннего пина
        assert!(!generator.validate(2, &[start, Point2D::new(80, 60), start], 2));
        // За границей рисунка карты (60 тайлов от первого пина)
        assert!(!generator.validate(1, &[start, Point2D::new(80, 170)], 1));
    }

    #[test]
    fn validate_rejects_special_region_and_wraps() {
        let mut matrix = island_world();
        matrix.add_special_region(SpecialRegion {
            name: "Jail".to_string(),
            rules: RegionRules::AngelIsland,
            area: Rect2D::new(70, 95, 5, 10),
        });
        let field = distances(&matrix);
        let params = small_params();

        {
            let generator = PlacementGenerator::new(&matrix, &field, &params);
            assert!(!generator.validate(1, &[Point2D::new(72, 100)], 0));
            assert!(generator.validate(1, &[Point2D::new(80, 100)], 0));
        }

        matrix.set_wraps(vec![Rect2D::new(81, 0, 119, 200)]);
        let generator = PlacementGenerator::new(&matrix, &field, &params);
        assert!(!generator.validate(1, &[Point2D::new(80, 100)], 0));
    }

    #[test]
    fn grow_chain_reports_invalid_level() {
        let matrix = island_world();
        let field = distances(&matrix);
        let params = small_params();
        let generator = PlacementGenerator::new(&matrix, &field, &params);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(
            generator.grow_chain(9, Point2D::new(80, 100), &mut rng),
            Err(ChainError::InvalidLevel(9))
        );
    }

    #[test]
    fn generated_chains_hold_invariants() {
        let matrix = island_world();
        let field = distances(&matrix);
        let params = small_params();
        let generator = PlacementGenerator::new(&matrix, &field, &params);
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        for level in 1..=3 {
            let outcome = generator.generate_level(level, &mut rng);
            let data = params.level(level).unwrap();
            assert_eq!(outcome.chains.len(), 10, "level {level}");
            assert!(outcome.candidates > 0);

            for chain in &outcome.chains {
                assert_eq!(chain.len(), data.num_pins);
                let start = chain.start().unwrap();
                assert!(data.band_contains(field.at(start).unwrap()));
                for i in 1..chain.len() {
                    assert!(chain.pins[i].dist_sq(chain.pins[i - 1]) >= 20 * 20);
                    assert!(!chain.pins[..i].contains(&chain.pins[i]));
                    assert!(field.at(chain.pins[i]).unwrap() >= 6);
                }
            }
        }
    }

    #[test]
    fn generation_is_deterministic_for_seed() {
        let matrix = island_world();
        let field = distances(&matrix);
        let params = small_params();
        let generator = PlacementGenerator::new(&matrix, &field, &params);

        let a = generator.generate_level(1, &mut ChaCha8Rng::seed_from_u64(9));
        let b = generator.generate_level(1, &mut ChaCha8Rng::seed_from_u64(9));
        assert_eq!(a.chains, b.chains);
    }
}
