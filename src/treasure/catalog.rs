// src/treasure/catalog.rs
use crate::error::Result;
use crate::geometry::Point2D;
use crate::treasure::{LevelTable, PinChain, storage};
use rand::Rng;
use std::path::Path;

/// Таблица цепочек пинов, из которой карты сокровищ берут точки.
///
/// Заменяется целиком при перезагрузке. Если загрузка не удалась,
/// остаётся прежнее содержимое.
#[derive(Debug, Clone, Default)]
pub struct TreasureMapCatalog {
    levels: LevelTable,
}

impl TreasureMapCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_levels(levels: LevelTable) -> Self {
        Self { levels }
    }

    /// Загружает каталог из бинарного файла
    pub fn load(path: &Path) -> Result<Self> {
        storage::load(path).map(Self::from_levels)
    }

    /// Перечитывает файл; при ошибке каталог не меняется
    pub fn reload(&mut self, path: &Path) -> Result<()> {
        self.levels = storage::load(path)?;
        Ok(())
    }

    #[must_use]
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    #[must_use]
    pub fn locations(&self, level: i32) -> &[PinChain] {
        usize::try_from(level)
            .ok()
            .and_then(|l| l.checked_sub(1))
            .and_then(|i| self.levels.get(i))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    #[must_use]
    pub fn location_count(&self, level: i32) -> usize {
        self.locations(level).len()
    }

    /// Пины случайной локации уровня; пустой срез, если уровня нет или он пуст
    pub fn get_random_pins<R: Rng + ?Sized>(&self, level: i32, rng: &mut R) -> &[Point2D] {
        let locations = self.locations(level);
        if locations.is_empty() {
            return &[];
        }
        locations[rng.gen_range(0..locations.len())].as_slice()
    }

    #[must_use]
    pub fn levels(&self) -> &LevelTable {
        &self.levels
    }
}
