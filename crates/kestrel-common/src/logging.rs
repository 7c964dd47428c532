use chrono::Local;
use log::{Level, LevelFilter, Metadata, Record};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::paths::kestrel_log_dir;

static SESSION_DIR: Mutex<Option<PathBuf>> = Mutex::new(None);

fn level_char(level: Level) -> char {
    match level {
        Level::Error => 'E',
        Level::Warn => 'W',
        Level::Info => 'I',
        Level::Debug => 'D',
        Level::Trace => 'T',
    }
}

/// Writes info and above to `kestrel.log`, debug and trace to
/// `kestrel.dbg.log`, inside a fresh `session-N` directory.
pub struct FileLogger {
    main_file: Mutex<File>,
    debug_file: Mutex<File>,
}

impl FileLogger {
    pub fn init() -> Result<(), Box<dyn std::error::Error>> {
        Self::init_in(&kestrel_log_dir())
    }

    pub fn init_in(log_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
        fs::create_dir_all(log_dir)?;

        let session_num = next_session_number(log_dir);
        let session_dir = log_dir.join(format!("session-{}", session_num));
        fs::create_dir_all(&session_dir)?;

        let logger = FileLogger {
            main_file: Mutex::new(open_log_file(&session_dir, "kestrel.log")?),
            debug_file: Mutex::new(open_log_file(&session_dir, "kestrel.dbg.log")?),
        };

        log::set_logger(Box::leak(Box::new(logger)))
            .map_err(|e| format!("Failed to set logger: {}", e))?;
        log::set_max_level(LevelFilter::Debug);

        if let Ok(mut guard) = SESSION_DIR.lock() {
            *guard = Some(session_dir.clone());
        }

        log::info!("=== Kestrel session {} ===", session_num);
        log::info!("Log directory: {}", session_dir.display());
        log::info!("Started at: {}", Local::now().format("%Y-%m-%d %H:%M:%S"));

        Ok(())
    }
}

fn open_log_file(dir: &Path, name: &str) -> Result<File, Box<dyn std::error::Error>> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(dir.join(name))?;
    Ok(file)
}

fn next_session_number(log_dir: &Path) -> u32 {
    let latest = fs::read_dir(log_dir)
        .into_iter()
        .flatten()
        .flatten()
        .filter_map(|entry| {
            entry
                .file_name()
                .to_string_lossy()
                .strip_prefix("session-")
                .and_then(|rest| rest.parse::<u32>().ok())
        })
        .max()
        .unwrap_or(0);
    latest + 1
}

impl log::Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Debug
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let timestamp = Local::now().format("%H:%M:%S%.3f");
        let line = format!("{} {} {}\n", timestamp, record.target(), record.args());

        let file = if record.level() >= Level::Debug {
            &self.debug_file
        } else {
            &self.main_file
        };

        if let Ok(mut file) = file.lock() {
            let _ = file.write_all(line.as_bytes());
            let _ = file.flush();
        }

        eprint!("{} {} {}", timestamp, level_char(record.level()), line);
    }

    fn flush(&self) {
        let _ = self.main_file.lock().map(|mut f| f.flush());
        let _ = self.debug_file.lock().map(|mut f| f.flush());
    }
}

pub fn current_session_dir() -> Option<PathBuf> {
    SESSION_DIR.lock().ok()?.clone()
}

/// Fallback used when the log directory cannot be created.
pub struct StderrLogger {
    level: LevelFilter,
}

impl StderrLogger {
    pub fn init(level: LevelFilter) -> Result<(), log::SetLoggerError> {
        log::set_logger(Box::leak(Box::new(StderrLogger { level })))?;
        log::set_max_level(level);
        Ok(())
    }
}

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!(
                "{} {} {} {}",
                Local::now().format("%H:%M:%S%.3f"),
                level_char(record.level()),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_numbers_follow_the_highest_existing() {
        let dir = std::env::temp_dir().join(format!("kestrel-log-test-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(dir.join("session-3")).unwrap();
        fs::create_dir_all(dir.join("session-11")).unwrap();
        fs::create_dir_all(dir.join("unrelated")).unwrap();

        assert_eq!(next_session_number(&dir), 12);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn empty_log_dir_starts_at_one() {
        let dir = std::env::temp_dir().join(format!("kestrel-log-empty-{}", std::process::id()));
        assert_eq!(next_session_number(&dir), 1);
    }
}
