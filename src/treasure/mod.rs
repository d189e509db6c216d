pub mod catalog;
pub mod generator;
pub mod png;
pub mod storage;

use crate::geometry::Point2D;
use serde::{Deserialize, Serialize};

/// Имя бинарного кэша пинов
pub const BIN_FILE_NAME: &str = "seatreasure.bin";
/// Имя текстовой копии для просмотра человеком
pub const TXT_FILE_NAME: &str = "seatreasure.txt";

/// Параметры уровня карты сокровищ
///
/// Первый пин цепочки лежит в полосе `[dist_min, dist_max]` тайлов от берега,
/// всего в цепочке `num_pins` пинов.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelData {
    pub dist_min: u16,
    pub dist_max: u16,
    pub num_pins: usize,
}

impl LevelData {
    #[must_use]
    pub const fn new(dist_min: u16, dist_max: u16, num_pins: usize) -> Self {
        Self {
            dist_min,
            dist_max,
            num_pins,
        }
    }

    #[must_use]
    pub fn band_contains(&self, distance: u16) -> bool {
        distance >= self.dist_min && distance <= self.dist_max
    }
}

/// Цепочка пинов одной карты сокровищ
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PinChain {
    pub pins: Vec<Point2D>,
}

impl PinChain {
    #[must_use]
    pub fn new(pins: Vec<Point2D>) -> Self {
        Self { pins }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pins.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    #[must_use]
    pub fn start(&self) -> Option<Point2D> {
        self.pins.first().copied()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Point2D] {
        &self.pins
    }
}

/// Все найденные цепочки: индекс = уровень - 1
pub type LevelTable = Vec<Vec<PinChain>>;
