// src/error.rs
use thiserror::Error;

use crate::commands::AccessLevel;

/// Ошибки генерации, загрузки и сохранения таблицы морских сокровищ.
#[derive(Debug, Error)]
pub enum SeaTreasureError {
    /// Ошибки ввода-вывода (нет файла, обрезанный поток и т.д.)
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Заголовок бинарного файла не совпал с `seatreasurebin`
    #[error("bad seatreasure header: {found:?}")]
    BadHeader { found: Option<String> },

    #[error("unsupported seatreasure version {0}")]
    UnsupportedVersion(i32),

    /// Отрицательный счётчик в бинарном файле
    #[error("negative {what} count: {count}")]
    NegativeCount { what: &'static str, count: i32 },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("permission denied: requires {required:?}, have {actual:?}")]
    PermissionDenied {
        required: AccessLevel,
        actual: AccessLevel,
    },

    #[error("unknown command: {0}")]
    UnknownCommand(String),
}

pub type Result<T> = std::result::Result<T, SeaTreasureError>;
