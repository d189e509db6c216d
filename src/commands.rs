// src/commands.rs
use crate::config::SeaTreasureParams;
use crate::error::{Result, SeaTreasureError};
use crate::pipeline::{GenerationOptions, GenerationReport, generate_map_points};
use crate::treasure::BIN_FILE_NAME;
use crate::treasure::catalog::TreasureMapCatalog;
use crate::world::SeaHost;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Префикс команд в чате
pub const COMMAND_PREFIX: char = '[';

/// Уровень доступа игрока к командам
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AccessLevel {
    Player,
    Counselor,
    GameMaster,
    Seer,
    Administrator,
    Developer,
    Owner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminCommand {
    /// Перечитать `seatreasure.bin` в каталог
    LoadMapPoints,
    /// Полная генерация с записью и перечитыванием
    GenMapPoints,
}

impl AdminCommand {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            AdminCommand::LoadMapPoints => "LoadMapPoints",
            AdminCommand::GenMapPoints => "GenMapPoints",
        }
    }

    #[must_use]
    pub fn required_access(self) -> AccessLevel {
        AccessLevel::Administrator
    }
}

/// Разбирает `[LoadMapPoints` / `[GenMapPoints` (регистр не важен).
/// Сообщение без префикса командой не считается.
pub fn parse_admin_command(message: &str) -> Result<Option<AdminCommand>> {
    let Some(rest) = message.trim().strip_prefix(COMMAND_PREFIX) else {
        return Ok(None);
    };
    let name = rest.split_whitespace().next().unwrap_or_default();
    let command = match name.to_ascii_lowercase().as_str() {
        "loadmappoints" => AdminCommand::LoadMapPoints,
        "genmappoints" => AdminCommand::GenMapPoints,
        _ => return Err(SeaTreasureError::UnknownCommand(name.to_string())),
    };
    Ok(Some(command))
}

/// Ответ оператору, вызвавшему команду
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReport {
    pub success: bool,
    pub message: String,
}

impl CommandReport {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Владелец каталога пинов и всего, что нужно для его перегенерации
pub struct SeaTreasureService<H: SeaHost> {
    host: H,
    params: SeaTreasureParams,
    data_dir: PathBuf,
    catalog: TreasureMapCatalog,
    rng: ChaCha8Rng,
    preview: Option<PathBuf>,
    last_report: Option<GenerationReport>,
}

impl<H: SeaHost> SeaTreasureService<H> {
    /// Сервис с пустым каталогом
    pub fn new(host: H, params: SeaTreasureParams, data_dir: impl Into<PathBuf>) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(params.seed);
        Self {
            host,
            params,
            data_dir: data_dir.into(),
            catalog: TreasureMapCatalog::new(),
            rng,
            preview: None,
            last_report: None,
        }
    }

    /// PNG-превью, которое будет писать `GenMapPoints`
    pub fn set_preview(&mut self, path: Option<PathBuf>) {
        self.preview = path;
    }

    #[must_use]
    pub fn catalog(&self) -> &TreasureMapCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn bin_path(&self) -> PathBuf {
        self.data_dir.join(BIN_FILE_NAME)
    }

    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    #[must_use]
    pub fn last_report(&self) -> Option<&GenerationReport> {
        self.last_report.as_ref()
    }

    pub fn rng(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    /// Перечитывает бинарный файл; возвращает число загруженных локаций
    pub fn load_map_points(&mut self) -> Result<usize> {
        let path = self.bin_path();
        self.catalog.reload(&path)?;
        let total = self.catalog.levels().iter().map(Vec::len).sum();
        log::info!(
            "Загружено {total} локаций ({} уровней) из {}",
            self.catalog.level_count(),
            path.display()
        );
        Ok(total)
    }

    /// Генерирует пины, пишет файлы и подменяет каталог перечитанным
    pub fn gen_map_points(&mut self) -> Result<&GenerationReport> {
        let options = GenerationOptions {
            out_dir: self.data_dir.clone(),
            preview: self.preview.clone(),
        };
        let run = generate_map_points(&self.host, &self.params, &options, &mut self.rng)?;
        self.catalog = run.catalog;
        Ok(&*self.last_report.insert(run.report))
    }

    /// Выполняет команду с проверкой доступа. Ошибки не пробрасываются,
    /// а логируются и возвращаются оператору текстом.
    pub fn execute(&mut self, command: AdminCommand, access: AccessLevel) -> CommandReport {
        let required = command.required_access();
        if access < required {
            let err = SeaTreasureError::PermissionDenied {
                required,
                actual: access,
            };
            log::warn!("{}: {err}", command.name());
            return CommandReport::failed(err.to_string());
        }

        let result = match command {
            AdminCommand::LoadMapPoints => self
                .load_map_points()
                .map(|total| format!("Map points loaded: {total} locations.")),
            AdminCommand::GenMapPoints => self.gen_map_points().map(summarize),
        };

        match result {
            Ok(message) => CommandReport::ok(message),
            Err(err) => {
                log::error!("{} failed: {err}", command.name());
                CommandReport::failed(format!("{} failed: {err}", command.name()))
            }
        }
    }

    /// Разбирает и выполняет сообщение из чата; `None`, если это не команда
    pub fn handle_message(&mut self, message: &str, access: AccessLevel) -> Option<CommandReport> {
        match parse_admin_command(message) {
            Ok(Some(command)) => Some(self.execute(command, access)),
            Ok(None) => None,
            Err(err) => Some(CommandReport::failed(err.to_string())),
        }
    }
}

fn summarize(report: &GenerationReport) -> String {
    let mut message = format!(
        "Map points generated in {:.1}s:",
        report.elapsed_ms as f64 / 1000.0
    );
    for level in &report.levels {
        message.push_str(&format!(
            " L{}={}/{}",
            level.level, level.found, level.requested
        ));
    }
    let short: Vec<String> = report
        .levels
        .iter()
        .filter(|l| l.found < l.requested)
        .map(|l| l.level.to_string())
        .collect();
    if !short.is_empty() {
        message.push_str(&format!(" (failed generation for level {})", short.join(", ")));
    }
    message
}
