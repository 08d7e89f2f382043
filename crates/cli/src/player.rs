use crate::commands::Session;
use anyhow::{Context, Result};
use console::{style, Key, Term};
use playback_engine::{
    EngineSettings, FailurePolicy, PlaybackEngine, PlaybackStatus, PlayerEvent, PlayerHandle,
    ProgressTimer, StreamOutput,
};
use resonance_config::{FailurePolicySetting, PlayerConfig};
use resonance_core::{Duration as CoreDuration, Profile, RecentlyPlayed, Timestamp, Track};
use resonance_database::queries::{increment_play_count, record_play};
use resonance_database::DbPool;
use resonance_resilience::RetryPolicy;
use std::thread;
use std::time::Duration as StdDuration;
use tokio::sync::mpsc;

const BAR_WIDTH: usize = 40;

/// Maps the player config section onto engine settings
pub fn engine_settings(config: &PlayerConfig) -> EngineSettings {
    EngineSettings {
        progress_interval: StdDuration::from_millis(config.progress_interval_ms),
        default_track_secs: config.default_track_secs,
        simulate_missing_audio: config.simulate_missing_audio,
        // The first load is an attempt too
        retry: RetryPolicy::new(config.load_retry_attempts as usize + 1)
            .with_initial_delay(StdDuration::from_millis(config.retry_initial_delay_ms)),
        failure_policy: match config.failure_policy {
            FailurePolicySetting::Skip => FailurePolicy::Skip,
            FailurePolicySetting::Stay => FailurePolicy::Stay,
        },
    }
}

/// What a key press asks the player to do
#[derive(Debug, Clone, Copy, PartialEq)]
enum Control {
    Toggle,
    Next,
    Previous,
    SeekBy(f64),
    Quit,
}

fn control_for(key: &Key, seek_step: f64) -> Option<Control> {
    match key {
        Key::Char(' ') => Some(Control::Toggle),
        Key::Char('n') | Key::Char('N') => Some(Control::Next),
        Key::Char('p') | Key::Char('P') => Some(Control::Previous),
        Key::ArrowLeft => Some(Control::SeekBy(-seek_step)),
        Key::ArrowRight => Some(Control::SeekBy(seek_step)),
        Key::Char('q') | Key::Char('Q') | Key::Escape => Some(Control::Quit),
        _ => None,
    }
}

/// Plays `queue` from `start_index` until the user quits
pub async fn start_playback(
    session: &Session,
    profile: &Profile,
    queue: Vec<Track>,
    start_index: usize,
) -> Result<()> {
    let settings = engine_settings(&session.config.player);
    let seek_step = f64::from(session.config.player.seek_step_secs);
    let interval = settings.progress_interval;

    let handle = PlayerHandle::new(PlaybackEngine::new(StreamOutput::new(), settings));
    let events = handle.subscribe();
    let mut timer = ProgressTimer::start(&handle, interval).context("Failed to start progress timer")?;

    let (plays_tx, plays_rx) = mpsc::unbounded_channel();
    let recorder = tokio::spawn(record_plays(session.pool.clone(), profile.id, plays_rx));

    let term = Term::stdout();
    let render_term = term.clone();
    let renderer = thread::Builder::new()
        .name("player-render".to_string())
        .spawn(move || render_loop(&render_term, events, plays_tx))
        .context("Failed to start player display")?;

    handle.set_queue(queue, start_index);

    if term.hide_cursor().is_err() {
        log::warn!("Failed to hide cursor");
    }
    let keys = handle.clone();
    let result = tokio::task::spawn_blocking(move || key_loop(&term, &keys, seek_step))
        .await
        .context("Player input stopped unexpectedly")?;

    timer.stop();
    // Dropping the last handle drops the engine, which closes the event stream
    drop(handle);
    if renderer.join().is_err() {
        log::error!("Player display panicked");
    }
    if recorder.await.is_err() {
        log::error!("Play history recorder panicked");
    }

    let _ = Term::stdout().show_cursor();
    result
}

fn key_loop(term: &Term, handle: &PlayerHandle, seek_step: f64) -> Result<()> {
    loop {
        let key = term.read_key().context("Failed to read key")?;
        match control_for(&key, seek_step) {
            Some(Control::Toggle) => handle.toggle_play(),
            Some(Control::Next) => handle.next_track(),
            Some(Control::Previous) => handle.previous_track(),
            Some(Control::SeekBy(delta)) => handle.seek_to(handle.progress() + delta),
            Some(Control::Quit) => return Ok(()),
            None => {}
        }
    }
}

fn render_loop(
    term: &Term,
    events: crossbeam_channel::Receiver<PlayerEvent>,
    plays: mpsc::UnboundedSender<Track>,
) {
    let mut screen = NowPlaying::new();

    // Ends once the engine is dropped
    for event in events.iter() {
        if let Some(track) = screen.apply(&event) {
            let _ = plays.send(track);
        }
        if term.clear_screen().is_err() {
            continue;
        }
        for line in screen.lines() {
            if term.write_line(&line).is_err() {
                break;
            }
        }
    }
}

/// Adds each started track to the listener's history and play count
async fn record_plays(
    pool: DbPool,
    user_id: resonance_core::ProfileId,
    mut plays: mpsc::UnboundedReceiver<Track>,
) {
    while let Some(track) = plays.recv().await {
        let play = RecentlyPlayed {
            user_id,
            track_id: Some(track.id),
            album_id: track.album_id,
            played_at: Timestamp::now(),
        };
        if let Err(e) = record_play(&pool, &play).await {
            log::warn!("Failed to record play of '{}': {}", track.title, e);
        }
        if let Err(e) = increment_play_count(&pool, track.id).await {
            log::warn!("Failed to count play of '{}': {}", track.title, e);
        }
    }
}

/// The player screen, rebuilt from engine events
struct NowPlaying {
    track: Option<Track>,
    index: Option<usize>,
    queue_len: usize,
    status: PlaybackStatus,
    position: f64,
    duration: f64,
    notice: Option<String>,
    ended: bool,
}

impl NowPlaying {
    fn new() -> Self {
        Self {
            track: None,
            index: None,
            queue_len: 0,
            status: PlaybackStatus::Idle,
            position: 0.0,
            duration: 0.0,
            notice: None,
            ended: false,
        }
    }

    /// Updates the screen; returns the track if this event started a new play
    fn apply(&mut self, event: &PlayerEvent) -> Option<Track> {
        match event {
            PlayerEvent::TrackChanged { track, index } => {
                // Retries reload the same queue entry without a new play
                let new_play = self.ended
                    || self.index != *index
                    || self.track.as_ref().map_or(true, |t| t.id != track.id);
                self.track = Some(track.clone());
                self.index = *index;
                self.position = 0.0;
                self.duration = f64::from(track.duration_secs);
                self.ended = false;
                self.notice = None;
                return new_play.then(|| track.clone());
            }
            PlayerEvent::StatusChanged(status) => self.status = *status,
            PlayerEvent::Progress { position, duration } => {
                self.position = *position;
                self.duration = *duration;
            }
            PlayerEvent::QueueReplaced { len, index } => {
                self.queue_len = *len;
                self.index = *index;
            }
            PlayerEvent::QueueEnded => {
                self.ended = true;
                self.notice = Some("End of queue".to_string());
            }
            PlayerEvent::Failed {
                message, retrying, ..
            } => {
                self.notice = Some(if *retrying {
                    format!("{} (retrying)", message)
                } else {
                    message.clone()
                });
            }
            PlayerEvent::SeekFailed { message, .. } => {
                self.notice = Some(format!("Seek failed: {}", message));
            }
        }
        None
    }

    fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();

        match &self.track {
            Some(track) => {
                lines.push(format!("\n  {}", style(&track.title).bold().cyan()));
                lines.push(format!("  by {}", style(&track.artist_name).dim()));
            }
            None => lines.push(format!("\n  {}", style("Nothing playing").dim())),
        }
        if let Some(index) = self.index {
            lines.push(format!("  Track {} of {}", index + 1, self.queue_len));
        }
        lines.push(String::new());

        lines.push(format!(
            "  {} / {}",
            CoreDuration::from_secs_f64(self.position).as_clock(),
            CoreDuration::from_secs_f64(self.duration).as_clock()
        ));
        let filled = progress_cells(self.position, self.duration);
        lines.push(format!(
            "  [{}{}]",
            "=".repeat(filled),
            " ".repeat(BAR_WIDTH - filled)
        ));
        lines.push(String::new());

        let status = match self.status {
            PlaybackStatus::Playing => style("Playing").green(),
            PlaybackStatus::Paused => style("Paused").yellow(),
            PlaybackStatus::Failed => style("Failed").red(),
            PlaybackStatus::Idle => style("Idle").dim(),
        };
        lines.push(format!("  Status: {}", status));
        if let Some(notice) = &self.notice {
            lines.push(format!("  {}", style(notice).yellow()));
        }
        lines.push(String::new());
        lines.push("  Space play/pause   n/p next/previous   ←/→ seek   q quit".to_string());
        lines
    }
}

fn progress_cells(position: f64, duration: f64) -> usize {
    if duration <= 0.0 {
        return 0;
    }
    let fraction = (position / duration).clamp(0.0, 1.0);
    (fraction * BAR_WIDTH as f64).round() as usize
}
