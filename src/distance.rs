// src/distance.rs
//! Карта расстояний до суши
//!
//! Для каждой водной клетки хранится расстояние Чебышёва (в тайлах) до ближайшей суши.
//! Считается двумя линейными проходами (chamfer), без BFS:
//! 1. Прямой проход (сверху-слева вниз-направо): соседи сверху, слева, сверху-слева и сверху-справа
//! 2. Обратный проход (снизу-справа вверх-налево): соседи снизу, справа, снизу-справа и снизу-слева
//!
//! Это приближение. На некоторых данных карты отдельные клетки получаются неверными,
//! такие клетки правятся списком `patched_cells` из конфигурации.

use crate::geometry::Point2D;
use crate::water::WaterMap;

#[derive(Debug, Clone)]
pub struct DistanceField {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u16>,
}

impl DistanceField {
    /// Строит и заполняет карту расстояний по маске воды
    #[must_use]
    pub fn from_water_map(water: &WaterMap) -> Self {
        let mut field = Self {
            width: water.width,
            height: water.height,
            data: water.data.iter().map(|&w| u16::from(w != 0)).collect(),
        };
        fill(&mut field.data, field.height as usize, field.width as usize);
        field
    }

    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> u16 {
        self.data[(y * self.width + x) as usize]
    }

    /// Расстояние до берега в точке; `None` вне карты
    #[must_use]
    pub fn at(&self, p: Point2D) -> Option<u16> {
        if p.x < 0 || p.y < 0 || p.x as u32 >= self.width || p.y as u32 >= self.height {
            return None;
        }
        Some(self.get(p.x as u32, p.y as u32))
    }

    /// Принудительно ставит расстояние 1 в известных плохих клетках
    pub fn apply_patches(&mut self, cells: &[Point2D]) -> usize {
        let mut patched = 0;
        for &p in cells {
            if self.at(p).is_some() {
                let idx = (p.y as u32 * self.width + p.x as u32) as usize;
                self.data[idx] = 1;
                patched += 1;
            }
        }
        patched
    }

    #[must_use]
    pub fn max_distance(&self) -> u16 {
        self.data.iter().copied().max().unwrap_or(0)
    }
}

/// Заменяет ненулевые клетки сетки `rows × cols` расстоянием до ближайшего нуля.
/// Нули (суша) не меняются.
pub fn fill(matrix: &mut [u16], rows: usize, cols: usize) {
    debug_assert_eq!(matrix.len(), rows * cols);
    let seed = rows.max(cols).min(u16::MAX as usize) as u16;

    // Прямой проход
    for y in 0..rows {
        for x in 0..cols {
            let idx = y * cols + x;
            if matrix[idx] == 0 {
                continue;
            }
            let mut v = seed;
            for &(dy, dx) in &[(-1, 0), (0, -1), (-1, -1), (-1, 1)] {
                v = v.min(neighbor_distance(matrix, rows, cols, y as isize + dy, x as isize + dx));
            }
            matrix[idx] = v;
        }
    }

    // Обратный проход
    for y in (0..rows).rev() {
        for x in (0..cols).rev() {
            let idx = y * cols + x;
            if matrix[idx] == 0 {
                continue;
            }
            let mut v = matrix[idx];
            for &(dy, dx) in &[(1, 0), (0, 1), (1, 1), (1, -1)] {
                v = v.min(neighbor_distance(matrix, rows, cols, y as isize + dy, x as isize + dx));
            }
            matrix[idx] = v;
        }
    }
}

/// Расстояние соседа +1, или `u16::MAX` за пределами сетки
fn neighbor_distance(matrix: &[u16], rows: usize, cols: usize, y: isize, x: isize) -> u16 {
    if y < 0 || x < 0 || y >= rows as isize || x >= cols as isize {
        return u16::MAX;
    }
    matrix[y as usize * cols + x as usize].saturating_add(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: usize, cols: usize, land: &[(usize, usize)]) -> Vec<u16> {
        let mut m = vec![1u16; rows * cols];
        for &(y, x) in land {
            m[y * cols + x] = 0;
        }
        m
    }

    #[test]
    fn single_land_cell_gives_chebyshev_rings() {
        let (rows, cols) = (11, 11);
        let mut m = grid(rows, cols, &[(5, 5)]);
        fill(&mut m, rows, cols);
        for y in 0..rows {
            for x in 0..cols {
                let expected = (y as i32 - 5).abs().max((x as i32 - 5).abs()) as u16;
                assert_eq!(m[y * cols + x], expected, "cell ({x}, {y})");
            }
        }
    }

    #[test]
    fn all_land_stays_zero() {
        let mut m = vec![0u16; 6 * 4];
        fill(&mut m, 6, 4);
        assert!(m.iter().all(|&v| v == 0));
    }

    #[test]
    fn all_water_keeps_seed_value() {
        let mut m = vec![1u16; 7 * 9];
        fill(&mut m, 7, 9);
        assert!(m.iter().all(|&v| v == 9));
    }

    #[test]
    fn distance_grows_away_from_shore_column() {
        let (rows, cols) = (5, 20);
        let land: Vec<(usize, usize)> = (0..rows).map(|y| (y, 0)).collect();
        let mut m = grid(rows, cols, &land);
        fill(&mut m, rows, cols);
        for y in 0..rows {
            assert_eq!(m[y * cols], 0);
            for x in 1..cols {
                assert_eq!(m[y * cols + x], x as u16);
                assert!(m[y * cols + x] >= m[y * cols + x - 1]);
            }
        }
    }

    #[test]
    fn field_from_water_map_and_patches() {
        let water = WaterMap {
            width: 4,
            height: 3,
            data: vec![0, 1, 1, 1, 0, 1, 1, 1, 0, 1, 1, 1],
        };
        let mut field = DistanceField::from_water_map(&water);
        assert_eq!(field.get(0, 1), 0);
        assert_eq!(field.get(3, 2), 3);
        assert_eq!(field.at(Point2D::new(4, 0)), None);
        assert_eq!(field.max_distance(), 3);

        let patched = field.apply_patches(&[Point2D::new(3, 2), Point2D::new(-1, 0)]);
        assert_eq!(patched, 1);
        assert_eq!(field.get(3, 2), 1);
    }
}
