// src/treasure/storage.rs
//! Бинарный кэш пинов `seatreasure.bin` и его текстовая копия `seatreasure.txt`
//!
//! Формат бинарного файла (все целые в little-endian `i32`):
//! ```text
//! string  "seatreasurebin"      // bool-флаг, длина 7-битным кодом, байты UTF-8
//! i32     version               // 0
//! i32     levelCount
//!   i32   locationCount         // для каждого уровня
//!     i32 pinCount              // для каждой локации
//!       i32 x, i32 y            // для каждого пина
//! ```
//!
//! Текстовый файл только для чтения человеком: строка `<level>\t<pin0>\t...\t<pinN>` на локацию.

use crate::error::{Result, SeaTreasureError};
use crate::geometry::Point2D;
use crate::treasure::{BIN_FILE_NAME, LevelTable, PinChain, TXT_FILE_NAME};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

pub const HEADER: &str = "seatreasurebin";
pub const VERSION: i32 = 0;

/// Заголовок длиннее этого считается мусором
const MAX_STRING_LEN: usize = 4096;
/// Потолок предварительного резервирования памяти под счётчики из файла
const MAX_PREALLOC: usize = 4096;

fn write_i32<W: Write + ?Sized>(w: &mut W, value: i32) -> io::Result<()> {
    w.write_all(&value.to_le_bytes())
}

fn read_i32<R: Read + ?Sized>(r: &mut R) -> io::Result<i32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

fn write_point<W: Write + ?Sized>(w: &mut W, p: Point2D) -> io::Result<()> {
    write_i32(w, p.x)?;
    write_i32(w, p.y)
}

fn read_point<R: Read + ?Sized>(r: &mut R) -> io::Result<Point2D> {
    let x = read_i32(r)?;
    let y = read_i32(r)?;
    Ok(Point2D::new(x, y))
}

fn write_encoded_len<W: Write + ?Sized>(w: &mut W, mut len: usize) -> io::Result<()> {
    while len >= 0x80 {
        w.write_all(&[(len as u8 & 0x7F) | 0x80])?;
        len >>= 7;
    }
    w.write_all(&[len as u8])
}

fn read_encoded_len<R: Read + ?Sized>(r: &mut R) -> io::Result<usize> {
    let mut len = 0usize;
    let mut shift = 0;
    loop {
        let mut byte = [0u8; 1];
        r.read_exact(&mut byte)?;
        len |= usize::from(byte[0] & 0x7F) << shift;
        if byte[0] & 0x80 == 0 {
            return Ok(len);
        }
        shift += 7;
        if shift >= 35 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "bad 7-bit encoded length",
            ));
        }
    }
}

/// Строка с флагом наличия: `0` для null, `1` и затем длина с UTF-8 байтами
pub fn write_string<W: Write + ?Sized>(w: &mut W, value: Option<&str>) -> io::Result<()> {
    match value {
        None => w.write_all(&[0]),
        Some(s) => {
            w.write_all(&[1])?;
            write_encoded_len(w, s.len())?;
            w.write_all(s.as_bytes())
        }
    }
}

pub fn read_string<R: Read + ?Sized>(r: &mut R) -> io::Result<Option<String>> {
    let mut flag = [0u8; 1];
    r.read_exact(&mut flag)?;
    if flag[0] == 0 {
        return Ok(None);
    }
    let len = read_encoded_len(r)?;
    if len > MAX_STRING_LEN {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("string length {len} is too large"),
        ));
    }
    let mut bytes = vec![0u8; len];
    r.read_exact(&mut bytes)?;
    String::from_utf8(bytes)
        .map(Some)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn to_i32(count: usize, what: &'static str) -> Result<i32> {
    i32::try_from(count).map_err(|_| {
        SeaTreasureError::InvalidConfig(format!("{what} count {count} does not fit in i32"))
    })
}

fn read_count<R: Read + ?Sized>(r: &mut R, what: &'static str) -> Result<usize> {
    let count = read_i32(r)?;
    usize::try_from(count).map_err(|_| SeaTreasureError::NegativeCount { what, count })
}

/// Пишет таблицу уровней в бинарном формате
pub fn write_bin<W: Write + ?Sized>(w: &mut W, levels: &LevelTable) -> Result<()> {
    write_string(w, Some(HEADER))?;
    write_i32(w, VERSION)?;
    write_i32(w, to_i32(levels.len(), "level")?)?;
    for chains in levels {
        write_i32(w, to_i32(chains.len(), "location")?)?;
        for chain in chains {
            write_i32(w, to_i32(chain.len(), "pin")?)?;
            for &p in &chain.pins {
                write_point(w, p)?;
            }
        }
    }
    Ok(())
}

/// Читает таблицу уровней. Чужой заголовок или неизвестная версия дают ошибку.
pub fn read_bin<R: Read + ?Sized>(r: &mut R) -> Result<LevelTable> {
    let header = read_string(r)?;
    if header.as_deref() != Some(HEADER) {
        return Err(SeaTreasureError::BadHeader { found: header });
    }
    let version = read_i32(r)?;
    if version != VERSION {
        return Err(SeaTreasureError::UnsupportedVersion(version));
    }

    let level_count = read_count(r, "level")?;
    let mut levels = Vec::with_capacity(level_count.min(MAX_PREALLOC));
    for _ in 0..level_count {
        let location_count = read_count(r, "location")?;
        let mut chains = Vec::with_capacity(location_count.min(MAX_PREALLOC));
        for _ in 0..location_count {
            let pin_count = read_count(r, "pin")?;
            let mut pins = Vec::with_capacity(pin_count.min(MAX_PREALLOC));
            for _ in 0..pin_count {
                pins.push(read_point(r)?);
            }
            chains.push(PinChain::new(pins));
        }
        levels.push(chains);
    }
    Ok(levels)
}

/// Пишет текстовую копию: одна строка на локацию, уровни с 1
pub fn write_txt<W: Write + ?Sized>(w: &mut W, levels: &LevelTable) -> io::Result<()> {
    for (i, chains) in levels.iter().enumerate() {
        for chain in chains {
            write!(w, "{}", i + 1)?;
            for p in &chain.pins {
                write!(w, "\t{p}")?;
            }
            writeln!(w)?;
        }
    }
    Ok(())
}

/// Сохраняет `seatreasure.bin` и `seatreasure.txt` в каталог `dir`
pub fn save(dir: &Path, levels: &LevelTable) -> Result<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(dir)?;
    let bin_path = dir.join(BIN_FILE_NAME);
    let txt_path = dir.join(TXT_FILE_NAME);

    let mut bin = BufWriter::new(File::create(&bin_path)?);
    write_bin(&mut bin, levels)?;
    bin.flush()?;

    let mut txt = BufWriter::new(File::create(&txt_path)?);
    write_txt(&mut txt, levels)?;
    txt.flush()?;

    Ok((bin_path, txt_path))
}

pub fn load(path: &Path) -> Result<LevelTable> {
    let mut reader = BufReader::new(File::open(path)?);
    read_bin(&mut reader)
}
