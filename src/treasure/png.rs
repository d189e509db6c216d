// src/treasure/png.rs
//! Превью сгенерированных пинов
//!
//! Карта расстояний рисуется оттенками синего (суша чёрная, вдали от берега цвет светлее),
//! поверх неё рисуются цепочки пинов: отрезки между соседними пинами и кружки на самих пинах.
//! Цвет зависит от уровня карты.

use crate::distance::DistanceField;
use crate::error::Result;
use crate::treasure::LevelTable;
use image::{ImageBuffer, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};
use std::path::Path;

/// Расстояние, начиная с которого вода рисуется максимально светлой
const DEPTH_SATURATION: u16 = 64;

const LEVEL_COLORS: [[u8; 3]; 6] = [
    [255, 255, 0],
    [0, 255, 128],
    [255, 128, 0],
    [255, 0, 255],
    [255, 0, 0],
    [255, 255, 255],
];

#[must_use]
pub fn level_color(level: usize) -> Rgb<u8> {
    Rgb(LEVEL_COLORS[level.saturating_sub(1) % LEVEL_COLORS.len()])
}

/// Рисует карту расстояний без пинов
#[must_use]
pub fn render_distance_field(field: &DistanceField) -> RgbImage {
    ImageBuffer::from_fn(field.width, field.height, |x, y| {
        let d = field.get(x, y);
        if d == 0 {
            return Rgb([0, 0, 0]);
        }
        let t = u32::from(d.min(DEPTH_SATURATION)) * 255 / u32::from(DEPTH_SATURATION);
        Rgb([0, (t / 2) as u8, (64 + t * 3 / 4) as u8])
    })
}

/// Наносит цепочки всех уровней на изображение
pub fn draw_chains(img: &mut RgbImage, levels: &LevelTable) {
    let radius = (img.width().max(img.height()) / 512).max(2) as i32;
    for (i, chains) in levels.iter().enumerate() {
        let color = level_color(i + 1);
        for chain in chains {
            for pair in chain.pins.windows(2) {
                draw_line_segment_mut(
                    img,
                    (pair[0].x as f32, pair[0].y as f32),
                    (pair[1].x as f32, pair[1].y as f32),
                    color,
                );
            }
            for p in &chain.pins {
                draw_filled_circle_mut(img, (p.x, p.y), radius, color);
            }
        }
    }
}

pub fn save_preview(field: &DistanceField, levels: &LevelTable, path: &Path) -> Result<()> {
    let mut img = render_distance_field(field);
    draw_chains(&mut img, levels);
    img.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point2D;
    use crate::treasure::PinChain;
    use crate::water::WaterMap;

    #[test]
    fn land_is_black_and_pins_are_drawn() {
        let mut data = vec![1u8; 32 * 32];
        data[0] = 0;
        let field = DistanceField::from_water_map(&WaterMap {
            width: 32,
            height: 32,
            data,
        });
        let mut img = render_distance_field(&field);
        assert_eq!(img.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert_ne!(img.get_pixel(20, 20), &Rgb([0, 0, 0]));

        let levels = vec![vec![PinChain::new(vec![
            Point2D::new(10, 10),
            Point2D::new(25, 10),
        ])]];
        draw_chains(&mut img, &levels);
        assert_eq!(img.get_pixel(10, 10), &level_color(1));
        assert_eq!(img.get_pixel(18, 10), &level_color(1));
    }
}
