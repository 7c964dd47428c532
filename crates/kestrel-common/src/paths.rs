use std::path::PathBuf;

fn xdg_dir(var: &str, home_relative: &[&str]) -> PathBuf {
    if let Some(dir) = std::env::var_os(var).filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }
    match std::env::var_os("HOME") {
        Some(home) => home_relative
            .iter()
            .fold(PathBuf::from(home), |path, part| path.join(part)),
        None => PathBuf::from("/tmp"),
    }
}

pub fn config_dir() -> PathBuf {
    xdg_dir("XDG_CONFIG_HOME", &[".config"])
}

pub fn data_dir() -> PathBuf {
    xdg_dir("XDG_DATA_HOME", &[".local", "share"])
}

pub fn kestrel_config_dir() -> PathBuf {
    config_dir().join("kestrel")
}

pub fn kestrel_data_dir() -> PathBuf {
    data_dir().join("kestrel")
}

pub fn kestrel_log_dir() -> PathBuf {
    kestrel_data_dir().join("logs")
}
