// src/config.rs
//! Конфигурация генерации морских сокровищ
//!
//! Этот модуль определяет все параметры, управляющие расстановкой пинов:
//! - Таблица уровней карт сокровищ (полоса расстояния от берега и число пинов)
//! - Ограничения на расстояние между соседними пинами
//! - Бюджеты попыток генератора
//! - Настройки синтетического мира, который заменяет карту хоста в CLI и тестах
//!
//! Все структуры поддерживают сериализацию в TOML для удобной настройки через конфигурационные файлы.

use crate::error::{Result, SeaTreasureError};
use crate::geometry::{Point2D, Rect2D};
use crate::treasure::LevelData;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Правила особого региона, в котором сокровища не прячут
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegionRules {
    /// Тюремный остров (Angel Island)
    AngelIsland,
    /// Подземелье
    Dungeon,
}

/// Особый регион мира: прямоугольник с правилами
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialRegion {
    pub name: String,
    pub rules: RegionRules,
    pub area: Rect2D,
}

/// Настройки синтетического мира
///
/// Настоящая карта принадлежит движку сервера, поэтому CLI и тесты строят
/// воду и сушу из шума с заданной долей суши.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntheticWorldSettings {
    /// Ширина карты в тайлах (по умолчанию 5120)
    #[serde(default = "default_width")]
    pub width: u32,

    /// Высота карты в тайлах (по умолчанию 4096)
    #[serde(default = "default_height")]
    pub height: u32,

    /// Сид шума суши
    #[serde(default)]
    pub seed: u64,

    /// Частота шума: меньше значение → крупнее острова
    #[serde(default = "default_frequency")]
    pub frequency: f32,

    /// Целевая доля суши (0.0 = сплошной океан, 1.0 = сплошная суша)
    #[serde(default = "default_land_ratio")]
    pub land_ratio: f32,

    /// Отступ прямоугольника, по которому корабли «заворачивают» у края карты
    #[serde(default = "default_wrap_inset")]
    pub wrap_inset: i32,

    #[serde(default)]
    pub special_regions: Vec<SpecialRegion>,
}

fn default_width() -> u32 {
    5120
}
fn default_height() -> u32 {
    4096
}
fn default_frequency() -> f32 {
    0.004
}
fn default_land_ratio() -> f32 {
    0.3
}
fn default_wrap_inset() -> i32 {
    16
}

impl Default for SyntheticWorldSettings {
    fn default() -> Self {
        Self {
            width: 5120,
            height: 4096,
            seed: 0,
            frequency: 0.004,
            land_ratio: 0.3,
            wrap_inset: 16,
            special_regions: Vec::new(),
        }
    }
}

/// Основные параметры генерации пинов
///
/// Полная конфигурация одного прогона `GenMapPoints`. Поддерживает загрузку из TOML-файлов.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeaTreasureParams {
    /// Сид генератора случайных чисел (детерминированная генерация)
    #[serde(default)]
    pub seed: u64,

    /// Высота поверхности воды
    #[serde(default = "default_water_z")]
    pub water_z: i8,

    /// Минимальное расстояние между соседними пинами цепочки
    #[serde(default = "default_pin_dist_min")]
    pub pin_dist_min: i32,

    /// Максимальный радиус шага к следующему пину
    #[serde(default = "default_pin_dist_max")]
    pub pin_dist_max: i32,

    /// Минимальное расстояние до берега для любого пина
    #[serde(default = "default_min_shore_distance")]
    pub min_shore_distance: u16,

    /// Сколько цепочек искать на каждом уровне
    #[serde(default = "default_locations_per_level")]
    pub locations_per_level: usize,

    /// Внешний бюджет итераций на уровень
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Попыток на поиск каждого следующего пина
    #[serde(default = "default_pin_attempts")]
    pub pin_attempts: usize,

    /// Таблица уровней 1..=N
    #[serde(default = "default_levels")]
    pub levels: Vec<LevelData>,

    /// Радиус морской карты для уровня (индекс = уровень - 1)
    #[serde(default = "default_chart_distances")]
    pub chart_distances: Vec<i32>,

    /// Клетки, где двухпроходное преобразование ошибается из-за данных карты.
    /// После заполнения им принудительно ставится расстояние 1.
    #[serde(default)]
    pub patched_cells: Vec<[u32; 2]>,

    #[serde(default)]
    pub world: SyntheticWorldSettings,
}

fn default_water_z() -> i8 {
    -5
}
fn default_pin_dist_min() -> i32 {
    150
}
fn default_pin_dist_max() -> i32 {
    250
}
fn default_min_shore_distance() -> u16 {
    6
}
fn default_locations_per_level() -> usize {
    500
}
fn default_max_iterations() -> usize {
    10_000
}
fn default_pin_attempts() -> usize {
    100
}
fn default_levels() -> Vec<LevelData> {
    vec![
        LevelData::new(6, 20, 2),
        LevelData::new(21, 30, 3),
        LevelData::new(31, 40, 4),
        LevelData::new(41, 50, 5),
        LevelData::new(50, 64, 6),
    ]
}
fn default_chart_distances() -> Vec<i32> {
    vec![250, 300, 350, 400, 450]
}

impl SeaTreasureParams {
    /// Загружает параметры из TOML-файла
    ///
    /// # Пример
    /// ```toml
    /// seed = 42
    /// pin_dist_min = 150
    ///
    /// [world]
    /// width = 1024
    /// height = 1024
    /// ```
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let params: Self = toml::from_str(&contents)?;
        params.validate()?;
        Ok(params)
    }

    /// Проверяет согласованность таблицы уровней и ограничений
    pub fn validate(&self) -> Result<()> {
        if self.levels.is_empty() {
            return Err(SeaTreasureError::InvalidConfig(
                "level table is empty".to_string(),
            ));
        }
        for (i, level) in self.levels.iter().enumerate() {
            if level.dist_min > level.dist_max {
                return Err(SeaTreasureError::InvalidConfig(format!(
                    "level {}: dist_min {} > dist_max {}",
                    i + 1,
                    level.dist_min,
                    level.dist_max
                )));
            }
            if level.num_pins < 2 {
                return Err(SeaTreasureError::InvalidConfig(format!(
                    "level {}: num_pins must be at least 2, got {}",
                    i + 1,
                    level.num_pins
                )));
            }
        }
        if self.chart_distances.len() < self.levels.len() {
            return Err(SeaTreasureError::InvalidConfig(format!(
                "chart_distances has {} entries for {} levels",
                self.chart_distances.len(),
                self.levels.len()
            )));
        }
        if self.pin_dist_min > self.pin_dist_max {
            return Err(SeaTreasureError::InvalidConfig(format!(
                "pin_dist_min {} > pin_dist_max {}",
                self.pin_dist_min, self.pin_dist_max
            )));
        }
        Ok(())
    }

    /// Данные уровня (1-based). `None` для уровня вне таблицы.
    #[must_use]
    pub fn level(&self, level: usize) -> Option<&LevelData> {
        level.checked_sub(1).and_then(|i| self.levels.get(i))
    }

    /// Радиус морской карты уровня (аналог `SeaChart.GetDist`)
    #[must_use]
    pub fn chart_distance(&self, level: usize) -> Option<i32> {
        level
            .checked_sub(1)
            .and_then(|i| self.chart_distances.get(i))
            .copied()
    }

    #[must_use]
    pub fn patched_points(&self) -> Vec<Point2D> {
        self.patched_cells
            .iter()
            .map(|&[x, y]| Point2D::new(x as i32, y as i32))
            .collect()
    }
}

impl Default for SeaTreasureParams {
    fn default() -> Self {
        Self {
            seed: 0,
            water_z: -5,
            pin_dist_min: 150,
            pin_dist_max: 250,
            min_shore_distance: 6,
            locations_per_level: 500,
            max_iterations: 10_000,
            pin_attempts: 100,
            levels: default_levels(),
            chart_distances: default_chart_distances(),
            patched_cells: Vec::new(),
            world: SyntheticWorldSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_level_table() {
        let params = SeaTreasureParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.levels.len(), 5);
        assert_eq!(params.level(1), Some(&LevelData::new(6, 20, 2)));
        assert_eq!(params.level(5), Some(&LevelData::new(50, 64, 6)));
        assert_eq!(params.level(0), None);
        assert_eq!(params.level(6), None);
        assert_eq!(params.chart_distance(3), Some(350));
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let params: SeaTreasureParams = toml::from_str(
            r#"
            seed = 7
            pin_dist_min = 20
            pin_dist_max = 40
            patched_cells = [[10, 12]]

            [world]
            width = 256
            height = 128

            [[world.special_regions]]
            name = "Jail"
            rules = "AngelIsland"
            area = { x = 0, y = 0, width = 10, height = 10 }
            "#,
        )
        .unwrap();
        assert_eq!(params.seed, 7);
        assert_eq!(params.water_z, -5);
        assert_eq!(params.locations_per_level, 500);
        assert_eq!(params.world.width, 256);
        assert_eq!(params.world.wrap_inset, 16);
        assert_eq!(params.world.special_regions.len(), 1);
        assert_eq!(params.patched_points(), vec![Point2D::new(10, 12)]);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn validate_rejects_inverted_band() {
        let mut params = SeaTreasureParams::default();
        params.levels[2] = LevelData::new(40, 31, 4);
        assert!(matches!(
            params.validate(),
            Err(SeaTreasureError::InvalidConfig(_))
        ));

        let mut params = SeaTreasureParams::default();
        params.levels[0].num_pins = 1;
        assert!(params.validate().is_err());

        let mut params = SeaTreasureParams::default();
        params.chart_distances.pop();
        assert!(params.validate().is_err());
    }
}
