// src/pipeline.rs
//! Полный прогон `GenMapPoints`
//!
//! Классификация воды → карта расстояний → расстановка цепочек → запись `.bin`/`.txt` → перезагрузка.
//! Карта расстояний (до 42 МБ на полной карте) живёт только внутри прогона.

use crate::config::SeaTreasureParams;
use crate::distance::DistanceField;
use crate::error::Result;
use crate::treasure::catalog::TreasureMapCatalog;
use crate::treasure::generator::PlacementGenerator;
use crate::treasure::{LevelTable, png, storage};
use crate::water::{WaterTileSet, generate_water_map};
use crate::world::SeaHost;
use rand::Rng;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Куда складывать результаты прогона
#[derive(Debug, Clone)]
pub struct GenerationOptions {
    pub out_dir: PathBuf,
    /// PNG с картой расстояний и пинами
    pub preview: Option<PathBuf>,
}

impl GenerationOptions {
    #[must_use]
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            preview: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LevelReport {
    pub level: usize,
    pub requested: usize,
    pub found: usize,
    pub candidates: usize,
    pub iterations: usize,
}

/// Сводка прогона, CLI может сохранить её в JSON
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub width: u32,
    pub height: u32,
    pub water_tiles: usize,
    pub patched_cells: usize,
    pub levels: Vec<LevelReport>,
    pub elapsed_ms: u128,
    pub bin_path: PathBuf,
    pub txt_path: PathBuf,
}

impl GenerationReport {
    /// Все уровни набрали нужное число локаций
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.levels.iter().all(|l| l.found >= l.requested)
    }

    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Результат прогона: сводка и каталог, перечитанный из только что записанного файла
#[derive(Debug)]
pub struct GenerationRun {
    pub report: GenerationReport,
    pub catalog: TreasureMapCatalog,
}

/// Строит карту расстояний по карте хоста с учётом заплаток из конфигурации
#[must_use]
pub fn build_distance_field<H: SeaHost + ?Sized>(
    host: &H,
    params: &SeaTreasureParams,
) -> (DistanceField, usize) {
    let water = generate_water_map(
        Some(host),
        host.width(),
        host.height(),
        params.water_z,
        &WaterTileSet::default(),
    );
    log::info!(
        "Маска воды {}×{}: {} водных тайлов",
        water.width,
        water.height,
        water.water_count()
    );
    let mut field = DistanceField::from_water_map(&water);
    let patched = field.apply_patches(&params.patched_points());
    log::info!(
        "Карта расстояний готова: максимум {}, заплаток {patched}",
        field.max_distance()
    );
    (field, patched)
}

/// Полный прогон генерации
pub fn generate_map_points<H: SeaHost + ?Sized, R: Rng + ?Sized>(
    host: &H,
    params: &SeaTreasureParams,
    options: &GenerationOptions,
    rng: &mut R,
) -> Result<GenerationRun> {
    params.validate()?;
    let started = Instant::now();
    log::info!(
        "Генерация морских сокровищ: карта {}×{}, {} уровней",
        host.width(),
        host.height(),
        params.levels.len()
    );

    let (field, patched_cells) = build_distance_field(host, params);
    let water_tiles = field.data.iter().filter(|&&d| d != 0).count();

    let generator = PlacementGenerator::new(host, &field, params);
    let outcomes = generator.generate_all(rng);

    let levels: Vec<LevelReport> = outcomes
        .iter()
        .map(|o| LevelReport {
            level: o.level,
            requested: params.locations_per_level,
            found: o.chains.len(),
            candidates: o.candidates,
            iterations: o.iterations,
        })
        .collect();
    let table: LevelTable = outcomes.into_iter().map(|o| o.chains).collect();

    if let Some(preview) = &options.preview {
        png::save_preview(&field, &table, preview)?;
        log::info!("Превью сохранено в {}", preview.display());
    }
    drop(field);

    let (bin_path, txt_path) = storage::save(&options.out_dir, &table)?;
    log::info!("Записано: {} и {}", bin_path.display(), txt_path.display());

    // Перечитываем только что записанный файл: каталог берётся с диска, а не из памяти
    let catalog = TreasureMapCatalog::load(&bin_path)?;
    if catalog.levels() != &table {
        log::error!("Перечитанная таблица не совпала с записанной");
    }

    let elapsed_ms = started.elapsed().as_millis();
    log::info!("Генерация завершена за {:.1} с", elapsed_ms as f64 / 1000.0);

    Ok(GenerationRun {
        report: GenerationReport {
            width: host.width(),
            height: host.height(),
            water_tiles,
            patched_cells,
            levels,
            elapsed_ms,
            bin_path,
            txt_path,
        },
        catalog,
    })
}
