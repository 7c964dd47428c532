//! Status-bar text, refreshed on a background thread.

use std::io::{self, Read};
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::config::StatusBlock;

/// Longest text a single block keeps.
pub const MAX_BLOCK_LEN: usize = 127;

const STOP_POLL: Duration = Duration::from_millis(100);

/// Block texts shared between the refresher and the renderer. The whole set
/// is swapped under one lock, so readers never see a mix of two refreshes.
#[derive(Clone, Debug, Default)]
pub struct StatusBlocks {
    inner: Arc<Mutex<Vec<String>>>,
}

impl StatusBlocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.lock().clone()
    }

    pub fn replace(&self, blocks: Vec<String>) {
        *self.lock() = blocks;
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Runs every producer once. Commands are all started before any output is
/// read, so they run in parallel.
pub fn refresh_once(blocks: &[StatusBlock]) -> Vec<String> {
    let children: Vec<Option<Child>> = blocks
        .iter()
        .map(|block| match block {
            StatusBlock::Command(command) => match spawn_producer(command) {
                Ok(child) => Some(child),
                Err(e) => {
                    log::debug!("[status] Failed to run {}: {}", command, e);
                    None
                }
            },
            _ => None,
        })
        .collect();

    blocks
        .iter()
        .zip(children)
        .map(|(block, child)| match block {
            StatusBlock::DateTime => datetime(),
            StatusBlock::Memory => std::fs::read_to_string("/proc/meminfo")
                .ok()
                .and_then(|meminfo| memory_usage(&meminfo))
                .unwrap_or_default(),
            StatusBlock::Command(_) => child.map(read_producer).unwrap_or_default(),
        })
        .collect()
}

fn spawn_producer(command: &str) -> io::Result<Child> {
    Command::new("/bin/sh")
        .arg("-c")
        .arg(command)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
}

/// Reads until a line ends, the pipe closes or the block is full.
fn read_producer(mut child: Child) -> String {
    let mut buf = [0u8; MAX_BLOCK_LEN];
    let mut len = 0;
    if let Some(stdout) = child.stdout.as_mut() {
        while len < buf.len() {
            match stdout.read(&mut buf[len..]) {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    len += n;
                    if buf[..len].contains(&b'\n') {
                        break;
                    }
                }
            }
        }
    }
    let _ = child.kill();
    let _ = child.wait();
    first_line(&buf[..len])
}

/// Text up to the first newline or NUL.
pub fn first_line(bytes: &[u8]) -> String {
    let end = bytes
        .iter()
        .position(|&b| b == b'\n' || b == 0)
        .unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

pub fn datetime() -> String {
    chrono::Utc::now().format("%a %d %T").to_string()
}

/// `used/total` in GB from the contents of `/proc/meminfo`.
pub fn memory_usage(meminfo: &str) -> Option<String> {
    let field = |name: &str| -> Option<u64> {
        meminfo
            .lines()
            .find(|line| line.split(':').next() == Some(name))?
            .split_whitespace()
            .nth(1)?
            .parse()
            .ok()
    };
    let total = field("MemTotal")?;
    let free = field("MemFree").unwrap_or(0);
    let reclaimable = field("SReclaimable").unwrap_or(0);
    let buffers = field("Buffers").unwrap_or(0);
    let cached = field("Cached").unwrap_or(0);
    let used = total.saturating_sub(free + reclaimable + buffers + cached);

    let gb = |kb: u64| kb as f64 / 1024.0 / 1024.0;
    Some(format!("{:.1}/{:.1}GB", gb(used), gb(total)))
}

/// Background thread refreshing [`StatusBlocks`] every `interval`.
pub struct StatusRefresher {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl StatusRefresher {
    pub fn spawn(blocks: Vec<StatusBlock>, status: StatusBlocks, interval: Duration) -> io::Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name("kestrel-status".to_string())
            .spawn(move || {
                log::info!("[status] Refreshing {} blocks every {:?}", blocks.len(), interval);
                while !thread_stop.load(Ordering::Relaxed) {
                    status.replace(refresh_once(&blocks));
                    let deadline = Instant::now() + interval;
                    while !thread_stop.load(Ordering::Relaxed) {
                        let now = Instant::now();
                        if now >= deadline {
                            break;
                        }
                        thread::sleep((deadline - now).min(STOP_POLL));
                    }
                }
                log::debug!("[status] Refresher stopped");
            })?;

        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("[status] Refresher thread panicked");
            }
        }
    }
}

impl Drop for StatusRefresher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MEMINFO: &str = "MemTotal:       16777216 kB
MemFree:         4194304 kB
MemAvailable:    8388608 kB
Buffers:          524288 kB
Cached:          2097152 kB
SwapCached:            0 kB
SReclaimable:     524288 kB
";

    #[test]
    fn memory_usage_subtracts_reclaimable() {
        assert_eq!(memory_usage(MEMINFO).as_deref(), Some("9.0/16.0GB"));
        assert_eq!(memory_usage("garbage"), None);
    }

    #[test]
    fn first_line_stops_at_newline_or_nul() {
        assert_eq!(first_line(b"hello\nworld"), "hello");
        assert_eq!(first_line(b"abc\0def"), "abc");
        assert_eq!(first_line(b"plain"), "plain");
        assert_eq!(first_line(b""), "");
    }

    #[test]
    fn command_blocks_keep_first_line() {
        let blocks = vec![
            StatusBlock::Command("printf 'one\\ntwo\\n'".to_string()),
            StatusBlock::Command("exit 3".to_string()),
        ];
        let texts = refresh_once(&blocks);
        assert_eq!(texts, vec!["one".to_string(), String::new()]);
    }

    #[test]
    fn long_output_is_truncated() {
        let blocks = vec![StatusBlock::Command("printf '%0200d' 0".to_string())];
        let texts = refresh_once(&blocks);
        assert_eq!(texts[0].len(), MAX_BLOCK_LEN);
    }

    #[test]
    fn refresher_fills_blocks_and_stops() {
        let status = StatusBlocks::new();
        let refresher = StatusRefresher::spawn(
            vec![StatusBlock::Command("echo ready".to_string())],
            status.clone(),
            Duration::from_secs(60),
        )
        .unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while status.snapshot().is_empty() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        refresher.stop();
        assert_eq!(status.snapshot(), vec!["ready".to_string()]);
    }
}
