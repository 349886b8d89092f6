//! planmark command line: replay an edit script and export the result.

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::path::{Path, PathBuf};
    use std::process::ExitCode;

    use clap::Parser;
    use planmark::config::{ConfigError, EditorConfig};
    use planmark::constants::EXPORT_FILENAME;
    use planmark::export::export_png;
    use planmark::script::{EditScript, run_script};
    use planmark::Session;
    use planmark_raster::GlyphFont;

    /// Headless floor-plan editor.
    ///
    /// Replays a JSON edit script (uploads, fills, text labels, undo/redo)
    /// and writes the selected image as PNG.
    #[derive(Parser, Debug)]
    #[command(name = "planmark", version, about)]
    pub struct Args {
        /// Edit script (JSON). Image paths inside are relative to it.
        pub script: PathBuf,

        /// Output PNG path
        #[arg(short, long, default_value = EXPORT_FILENAME)]
        pub output: PathBuf,

        /// Configuration file; defaults to the platform config directory
        #[arg(short, long, value_name = "FILE")]
        pub config: Option<PathBuf>,

        /// TrueType/OpenType font used to measure and draw text labels;
        /// defaults to an installed sans-serif font
        #[arg(short, long, value_name = "FONT")]
        pub font: Option<PathBuf>,
    }

    fn load_config(path: Option<&Path>) -> Result<EditorConfig, ConfigError> {
        match path {
            Some(path) => EditorConfig::load_from_path(path),
            None => Ok(EditorConfig::load_from_default_path().unwrap_or_default()),
        }
    }

    fn init_logging(config: &EditorConfig) {
        let level = config.preferences.log_level.to_level_filter().to_string();
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    }

    pub fn run(args: Args) -> ExitCode {
        let config = match load_config(args.config.as_deref()) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("error: {}", e);
                return ExitCode::FAILURE;
            }
        };
        init_logging(&config);

        let font = match &args.font {
            Some(path) => match std::fs::read(path)
                .map_err(|e| e.to_string())
                .and_then(|bytes| GlyphFont::from_bytes(bytes).map_err(|e| e.to_string()))
            {
                Ok(font) => Some(font),
                Err(e) => {
                    log::error!("Failed to load font {:?}: {}", path, e);
                    return ExitCode::FAILURE;
                }
            },
            None => {
                let font = GlyphFont::system_sans();
                if font.is_none() {
                    log::warn!("No system font found, text labels cannot be exported");
                }
                font
            }
        };

        let mut session = Session::from_config(&config);
        if let Some(font) = &font {
            session = session.with_measure(Box::new(font.clone()));
        }

        let script = match EditScript::load(&args.script) {
            Ok(script) => script,
            Err(e) => {
                log::error!("{}", e);
                return ExitCode::FAILURE;
            }
        };
        let base_dir = args.script.parent().unwrap_or_else(|| Path::new("."));
        match run_script(&script, base_dir, &mut session) {
            Ok(steps) => log::info!("Replayed {} steps", steps),
            Err(e) => {
                log::error!("{}", e);
                return ExitCode::FAILURE;
            }
        }

        let bytes = match export_png(&session, font.as_ref()) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::error!("Export failed: {}", e);
                return ExitCode::FAILURE;
            }
        };
        if let Err(e) = std::fs::write(&args.output, bytes) {
            log::error!("Failed to write {:?}: {}", args.output, e);
            return ExitCode::FAILURE;
        }
        log::info!("Wrote {:?}", args.output);
        ExitCode::SUCCESS
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    use clap::Parser;

    cli::run(cli::Args::parse())
}

#[cfg(target_arch = "wasm32")]
fn main() {}
