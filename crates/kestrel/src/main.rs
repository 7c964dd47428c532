use std::path::PathBuf;
use std::time::Duration;

use calloop::channel::{self, Channel};
use calloop::timer::{TimeoutAction, Timer};
use calloop::EventLoop;
use clap::Parser;
use kestrel::output::Mode;
use kestrel::status::StatusRefresher;
use kestrel::{Config, Event, HeadlessBackend, State};
use kestrel_common::{FileLogger, StderrLogger};

const DEFAULT_FRAME: Duration = Duration::from_millis(16);

#[derive(Parser, Debug)]
#[command(name = "kestrel")]
#[command(about = "Tiling window manager core with nine views per output")]
#[command(version)]
struct Args {
    /// Configuration file; defaults to the user then the system config
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of virtual outputs to create
    #[arg(long, default_value_t = 1)]
    outputs: usize,

    /// Stop after this many frame ticks
    #[arg(long)]
    frames: Option<u64>,

    /// Do not start the status refresher
    #[arg(long)]
    no_status: bool,
}

struct LoopData {
    state: State<HeadlessBackend>,
    frames: u64,
    max_frames: Option<u64>,
}

impl LoopData {
    fn dispatch(&mut self, event: Event) {
        self.state.dispatch(event);
        loop {
            let echoed = self.state.backend.take_events();
            if echoed.is_empty() {
                break;
            }
            for event in echoed {
                self.state.dispatch(event);
            }
        }
    }

    fn frame(&mut self) {
        let ids: Vec<_> = self.state.outputs.iter().map(|o| o.id).collect();
        for output in ids {
            self.dispatch(Event::OutputFrame { output });
        }
        self.frames += 1;
        if self.max_frames.is_some_and(|max| self.frames >= max) {
            log::info!("[render] Frame limit reached after {} frames", self.frames);
            self.state.running = false;
        }
    }

    /// Tick length matching the fastest output.
    fn frame_interval(&self) -> Duration {
        self.state
            .outputs
            .iter()
            .map(|o| o.state.mode.refresh)
            .filter(|&refresh| refresh > 0)
            .max()
            .map_or(DEFAULT_FRAME, |refresh| {
                Duration::from_micros(1_000_000_000 / refresh as u64)
            })
    }
}

fn virtual_modes(config: &Config, index: usize) -> (String, Vec<Mode>) {
    let mut fallback = Mode::new(1920, 1080, 60_000);
    fallback.preferred = true;
    match config.outputs.get(index) {
        Some(entry) => (
            entry.name.clone(),
            vec![fallback, Mode::new(entry.width, entry.height, entry.refresh * 1000)],
        ),
        None => (format!("HEADLESS-{}", index + 1), vec![fallback]),
    }
}

fn main() {
    let args = Args::parse();

    if let Err(e) = FileLogger::init() {
        let _ = StderrLogger::init(log::LevelFilter::Info);
        log::warn!("File logging unavailable: {}", e);
    }

    let config = match &args.config {
        Some(path) => Config::load_from_path(path).unwrap_or_else(|e| {
            log::error!("{}", e);
            Config::default()
        }),
        None => Config::load(),
    };

    let mut backend = HeadlessBackend::new();
    backend.echo_commits = true;
    let mut state = State::new(config, backend);

    let refresher = if args.no_status {
        None
    } else {
        let interval = Duration::from_secs(state.config.status.interval_seconds.max(1));
        match StatusRefresher::spawn(state.config.status_blocks(), state.status.clone(), interval) {
            Ok(refresher) => Some(refresher),
            Err(e) => {
                log::error!("[status] Failed to start refresher: {}", e);
                None
            }
        }
    };

    let (sender, source): (channel::Sender<Event>, Channel<Event>) = channel::channel();
    for index in 0..args.outputs {
        let (name, modes) = virtual_modes(&state.config, index);
        let event = state.backend.add_output(&name, modes);
        if sender.send(event).is_err() {
            log::error!("[output] Event channel closed before start-up");
        }
    }

    let mut event_loop = EventLoop::<LoopData>::try_new().expect("Failed to create event loop");
    let handle = event_loop.handle();

    handle
        .insert_source(source, |event, _, data| {
            if let channel::Event::Msg(event) = event {
                data.dispatch(event);
            }
        })
        .expect("Failed to insert event channel");

    handle
        .insert_source(Timer::immediate(), |_deadline, _: &mut (), data| {
            data.frame();
            TimeoutAction::ToDuration(data.frame_interval())
        })
        .expect("Failed to insert frame timer");

    let mut data = LoopData {
        state,
        frames: 0,
        max_frames: args.frames,
    };

    log::info!("kestrel running with {} outputs", args.outputs);
    while data.state.running {
        event_loop
            .dispatch(Some(DEFAULT_FRAME), &mut data)
            .expect("Event loop error");
    }

    drop(sender);
    if let Some(refresher) = refresher {
        refresher.stop();
    }
    log::info!("kestrel exited");
}
