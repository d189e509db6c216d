// src/water.rs
use crate::world::{LandTile, StaticTile, TileSource};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Пары `(low, high)` ID водных тайлов суши
pub const WATER_LAND_RANGES: [u16; 4] = [0x00A8, 0x00AB, 0x0136, 0x0137];

/// Пары `(low, high)` ID водной статики
pub const WATER_STATIC_RANGES: [u16; 8] = [
    0x5797, 0x579C, 0x746E, 0x7485, 0x7490, 0x74AB, 0x74B5, 0x75D5,
];

/// Белый список ID водных тайлов
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaterTileSet {
    pub land_ranges: Vec<u16>,
    pub static_ranges: Vec<u16>,
}

impl Default for WaterTileSet {
    fn default() -> Self {
        Self {
            land_ranges: WATER_LAND_RANGES.to_vec(),
            static_ranges: WATER_STATIC_RANGES.to_vec(),
        }
    }
}

/// `id` попадает в одну из пар `(low, high)` плоского массива (включительно)
#[must_use]
pub fn in_range(id: u16, ranges: &[u16]) -> bool {
    ranges
        .chunks_exact(2)
        .any(|pair| id >= pair[0] && id <= pair[1])
}

impl WaterTileSet {
    #[must_use]
    pub fn is_water_land(&self, id: u16) -> bool {
        in_range(id, &self.land_ranges)
    }

    #[must_use]
    pub fn is_water_static(&self, id: u16) -> bool {
        in_range(id, &self.static_ranges)
    }

    /// Вода на высоте `z`: водный тайл суши или хотя бы одна водная статика
    #[must_use]
    pub fn is_water_at(&self, land: LandTile, statics: &[StaticTile], z: i8) -> bool {
        (land.z == z && self.is_water_land(land.id))
            || statics
                .iter()
                .any(|s| s.z == z && self.is_water_static(s.id))
    }
}

/// Маска воды: 1 для воды, 0 для суши. Индекс `y * width + x`.
#[derive(Debug, Clone)]
pub struct WaterMap {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl WaterMap {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            data: Vec::new(),
        }
    }

    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.data[(y * self.width + x) as usize]
    }

    #[must_use]
    pub fn water_count(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }
}

/// Размечает каждую клетку `[0, width) × [0, height)` как воду или сушу.
///
/// Без карты возвращает пустую маску 0×0: для вызывающего это «воды нет».
#[must_use]
pub fn generate_water_map<M: TileSource + ?Sized>(
    map: Option<&M>,
    width: u32,
    height: u32,
    water_z: i8,
    tiles: &WaterTileSet,
) -> WaterMap {
    let Some(map) = map else {
        return WaterMap::empty();
    };
    let width = width.min(map.width());
    let height = height.min(map.height());

    let classify_row = |y: u32| -> Vec<u8> {
        (0..width)
            .map(|x| {
                let land = map.land_tile(x, y);
                let statics = map.static_tiles(x, y);
                u8::from(tiles.is_water_at(land, statics, water_z))
            })
            .collect()
    };

    #[cfg(feature = "parallel")]
    let rows: Vec<Vec<u8>> = (0..height).into_par_iter().map(classify_row).collect();
    #[cfg(not(feature = "parallel"))]
    let rows: Vec<Vec<u8>> = (0..height).map(classify_row).collect();

    WaterMap {
        width,
        height,
        data: rows.concat(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{GRASS_TILE, TileMatrix, WATER_STATIC_ID, WATER_TILE_ID};

    #[test]
    fn in_range_is_inclusive_on_pairs() {
        let ranges = [10, 20, 30, 30];
        assert!(in_range(10, &ranges));
        assert!(in_range(20, &ranges));
        assert!(in_range(30, &ranges));
        assert!(!in_range(21, &ranges));
        assert!(!in_range(9, &ranges));
        assert!(!in_range(5, &[]));
    }

    #[test]
    fn classifier_marks_whitelisted_water_at_target_z() {
        let mut matrix = TileMatrix::new(6, 3, GRASS_TILE);
        // (0,0): водный тайл на нужной высоте
        matrix.set_land(0, 0, LandTile {
            id: WATER_TILE_ID,
            z: -5,
        });
        // (1,0): водный тайл, но не на той высоте
        matrix.set_land(1, 0, LandTile {
            id: 0x0136,
            z: 0,
        });
        // (2,1): суша, но водная статика на нужной высоте
        matrix.add_static(2, 1, StaticTile {
            id: WATER_STATIC_ID,
            z: -5,
        });
        // (3,1): не-водная статика
        matrix.add_static(3, 1, StaticTile { id: 0x0EED, z: -5 });
        // (5,2): водный ID на границе второго диапазона
        matrix.set_land(5, 2, LandTile { id: 0x0137, z: -5 });

        let water = generate_water_map(
            Some(&matrix),
            6,
            3,
            -5,
            &WaterTileSet::default(),
        );
        assert_eq!((water.width, water.height), (6, 3));
        for y in 0..3 {
            for x in 0..6 {
                let expected = u8::from(matches!((x, y), (0, 0) | (2, 1) | (5, 2)));
                assert_eq!(water.get(x, y), expected, "cell ({x}, {y})");
            }
        }
        assert_eq!(water.water_count(), 3);
    }

    #[test]
    fn missing_map_yields_empty_grid() {
        let water = generate_water_map::<TileMatrix>(None, 5120, 4096, -5, &WaterTileSet::default());
        assert_eq!((water.width, water.height), (0, 0));
        assert!(water.data.is_empty());
    }
}
