use clap::{Parser, Subcommand};
use seatreasure::world::GRASS_TILE;
use seatreasure::{AccessLevel, AdminCommand, SeaTreasureParams, SeaTreasureService, TileMatrix};
use std::io::Write;
use std::path::PathBuf;

/// Генератор пинов морских карт сокровищ
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Путь к конфигурационному файлу в формате TOML (по умолчанию встроенные параметры)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Каталог с seatreasure.bin / seatreasure.txt
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,

    /// Подробность логов (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// GenMapPoints: полная генерация и перезагрузка
    Gen {
        /// Переопределить сид генератора
        #[arg(long)]
        seed: Option<u64>,

        /// Сохранить PNG с картой расстояний и пинами
        #[arg(long)]
        preview: Option<PathBuf>,

        /// Сохранить сводку прогона в JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// LoadMapPoints: перечитать seatreasure.bin и показать число локаций
    Load,
    /// Показать случайную цепочку пинов уровня
    Pins {
        #[arg(short, long)]
        level: i32,
    },
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {}",
                buf.timestamp_seconds(),
                record.level(),
                record.args()
            )
        })
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    println!("🔍 Загрузка конфигурации...");
    let mut params = match &cli.config {
        Some(path) => SeaTreasureParams::from_toml_file(path)?,
        None => SeaTreasureParams::default(),
    };
    if let Command::Gen { seed: Some(seed), .. } = &cli.command {
        params.seed = *seed;
    }

    // Карта нужна только генерации, загрузке хватает пустой
    let world = if matches!(cli.command, Command::Gen { .. }) {
        println!(
            "Построение мира (размер: {}×{})...",
            params.world.width, params.world.height
        );
        TileMatrix::synthetic(&params.world, params.water_z)
    } else {
        TileMatrix::new(0, 0, GRASS_TILE)
    };
    let mut service = SeaTreasureService::new(world, params, &cli.data_dir);

    match cli.command {
        Command::Gen {
            preview, report, ..
        } => {
            service.set_preview(preview);
            let outcome = service.execute(AdminCommand::GenMapPoints, AccessLevel::Administrator);
            println!("{}", outcome.message);
            if !outcome.success {
                return Err(outcome.message.into());
            }
            if let (Some(path), Some(summary)) = (report, service.last_report()) {
                summary.save_json(&path)?;
                println!("Сводка сохранена в {}", path.display());
            }
            println!("\nГотово! Пины сохранены в {}", service.data_dir().display());
        }
        Command::Load => {
            let outcome = service.execute(AdminCommand::LoadMapPoints, AccessLevel::Administrator);
            println!("{}", outcome.message);
            if !outcome.success {
                return Err(outcome.message.into());
            }
            let catalog = service.catalog();
            for level in 1..=catalog.level_count() as i32 {
                println!("  уровень {level}: {} локаций", catalog.location_count(level));
            }
        }
        Command::Pins { level } => {
            let outcome = service.execute(AdminCommand::LoadMapPoints, AccessLevel::Administrator);
            if !outcome.success {
                return Err(outcome.message.into());
            }
            let catalog = service.catalog().clone();
            let pins = catalog.get_random_pins(level, service.rng());
            if pins.is_empty() {
                println!("Для уровня {level} нет локаций");
            } else {
                let line: Vec<String> = pins.iter().map(ToString::to_string).collect();
                println!("{level}\t{}", line.join("\t"));
            }
        }
    }

    Ok(())
}
