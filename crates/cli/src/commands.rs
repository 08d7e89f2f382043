use anyhow::{anyhow, bail, Context, Result};
use clap::ArgMatches;
use console::{style, Term};
use resonance_config::{Config, ConfigManager};
use resonance_core::{
    AlbumId, AppError, AudioSource, ParentalControls, PlaylistId, Profile, ProfileId, Track,
    TrackId,
};
use resonance_database::queries::{get_album_with_tracks, get_playlist, get_playlist_tracks, get_profile, get_track, list_album_tracks};
use resonance_database::{close, DbPool, SearchLimits};
use std::path::Path;

pub mod albums;
pub mod discover;
pub mod library;
pub mod playlists;
pub mod profile;

#[cfg(test)]
mod tests;

/// Everything a command needs: the store, the loaded config and who is acting
pub struct Session {
    pub pool: DbPool,
    pub config: Config,
    pub manager: ConfigManager,
    profile_override: Option<ProfileId>,
}

impl Session {
    pub fn new(
        pool: DbPool,
        config: Config,
        manager: ConfigManager,
        profile_override: Option<ProfileId>,
    ) -> Self {
        Self {
            pool,
            config,
            manager,
            profile_override,
        }
    }

    /// The profile selected with `--profile`, else the configured active one
    pub fn active_profile_id(&self) -> Result<ProfileId> {
        if let Some(id) = self.profile_override {
            return Ok(id);
        }

        let raw = self.config.app.active_profile.as_deref().ok_or_else(|| {
            anyhow!("No active profile. Create one with `resonance profile create <NAME>`")
        })?;
        parse_id(raw, ProfileId::from_string, "profile")
    }

    pub async fn active_profile(&self) -> Result<Profile> {
        let id = self.active_profile_id()?;
        get_profile(&self.pool, id).await.map_err(user_error)
    }

    /// The active profile, which must have its artist profile switched on
    pub async fn active_artist(&self) -> Result<Profile> {
        let profile = self.active_profile().await?;
        if !profile.is_artist {
            bail!(
                "{} is not an artist profile. Enable it with `resonance profile artist --name <NAME>`",
                profile.label()
            );
        }
        Ok(profile)
    }

    pub fn search_limits(&self) -> SearchLimits {
        SearchLimits {
            tracks: self.config.content.track_search_limit,
            albums: self.config.content.album_search_limit,
            artists: self.config.content.artist_search_limit,
        }
    }

    pub async fn close(self) {
        close(self.pool).await;
    }
}

/// Parses an identifier argument, naming the entity in the error
pub fn parse_id<T, E>(raw: &str, parse: impl FnOnce(&str) -> Result<T, E>, entity: &str) -> Result<T>
where
    E: std::error::Error + Send + Sync + 'static,
{
    parse(raw.trim()).with_context(|| format!("Invalid {} ID: {}", entity, raw))
}

/// Turns a store error into a message fit for the terminal
pub fn user_error(error: AppError) -> anyhow::Error {
    log::debug!("{:?}", error);
    match error {
        // These carry the reason the user needs to see
        AppError::AccessDenied { reason } => anyhow!(reason),
        AppError::InvalidArgument { reason, .. } => anyhow!(reason),
        other => anyhow!(other.user_message()),
    }
}

pub fn arg<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("Missing argument: {}", name))
}

/// Builds a track from the shared `--audio/--duration/--explicit/--video` flags
pub fn track_from_args(matches: &ArgMatches, title: &str, artist: &Profile) -> Result<Track> {
    let mut track = Track::new(title.trim().to_string(), artist.id, artist.label().to_string());

    if let Some(reference) = matches.get_one::<String>("audio") {
        let source = AudioSource::parse(reference)
            .ok_or_else(|| anyhow!("Audio reference cannot be empty"))?;
        track = track.with_source(source);
    }
    if let Some(secs) = matches.get_one::<u32>("duration") {
        track = track.with_duration_secs(*secs);
    }
    if matches.get_flag("explicit") {
        track = track.explicit();
    }
    if let Some(video) = matches.get_one::<String>("video") {
        track.has_music_video = true;
        track.music_video_url = Some(video.clone());
    }

    Ok(track)
}

/// Write the default config file and report where things live
pub fn init(session: &Session, db_path: &Path) -> Result<()> {
    let created = session
        .manager
        .initialize()
        .context("Failed to write default config")?;

    if created {
        println!(
            "{} Config written to {}",
            style("✓").green().bold(),
            session.manager.config_path().display()
        );
    } else {
        println!("Config: {}", session.manager.config_path().display());
    }
    println!("Database initialized at {}", db_path.display());
    Ok(())
}

/// Play an album, playlist or single track
pub async fn play(session: &Session, matches: &ArgMatches) -> Result<()> {
    let profile = session.active_profile().await?;
    let kind = arg(matches, "kind")?;
    let id = arg(matches, "id")?;
    let start = matches.get_one::<usize>("start").copied().unwrap_or(1);

    let (title, queue, start_index) = match kind {
        "album" => {
            let album = get_album_with_tracks(&session.pool, parse_id(id, AlbumId::from_string, "album")?)
                .await
                .map_err(user_error)?;
            (album.album.title, album.tracks, start.saturating_sub(1))
        }
        "playlist" => {
            let playlist_id = parse_id(id, PlaylistId::from_string, "playlist")?;
            let playlist = get_playlist(&session.pool, playlist_id).await.map_err(user_error)?;
            let tracks = get_playlist_tracks(&session.pool, playlist_id)
                .await
                .map_err(user_error)?;
            (playlist.name, tracks, start.saturating_sub(1))
        }
        _ => {
            let track = get_track(&session.pool, parse_id(id, TrackId::from_string, "track")?)
                .await
                .map_err(user_error)?;

            // A track plays within its album when it has one
            let queue = match track.album_id {
                Some(album_id) => list_album_tracks(&session.pool, album_id)
                    .await
                    .map_err(user_error)?,
                None => vec![track.clone()],
            };
            let index = queue.iter().position(|t| t.id == track.id).unwrap_or(0);
            (track.title, queue, index)
        }
    };

    if queue.is_empty() {
        bail!("'{}' has no tracks to play", title);
    }

    let pin = match matches.get_one::<String>("pin") {
        Some(pin) => Some(pin.clone()),
        None => prompt_pin_if_needed(&profile.parental, &queue)?,
    };
    profile
        .parental
        .authorize(&queue, pin.as_deref())
        .map_err(user_error)?;

    println!("\n{} {}", style("▶").green().bold(), style(&title).bold());
    crate::player::start_playback(session, &profile, queue, start_index).await
}

/// Asks for the PIN on the terminal when the queue holds blocked tracks
fn prompt_pin_if_needed(controls: &ParentalControls, queue: &[Track]) -> Result<Option<String>> {
    let term = Term::stdout();
    if !controls.requires_pin(queue) || !term.is_term() {
        return Ok(None);
    }

    term.write_str("Parental PIN: ")?;
    let input = term.read_secure_line().context("Failed to read PIN")?;
    Ok(Some(ParentalControls::sanitize_pin(&input)))
}

pub fn print_track_line(position: usize, track: &Track, controls: &ParentalControls) {
    let mut line = format!(
        "  {:>2}. {} - {} ({})",
        position,
        style(&track.title).bold(),
        track.artist_name,
        track.duration().as_clock()
    );
    if track.is_explicit {
        line.push_str(&format!(" {}", style("[E]").red()));
    }
    if controls.video_for(track).is_some() {
        line.push_str(&format!(" {}", style("[video]").cyan()));
    }
    if !track.is_playable() {
        line.push_str(&format!(" {}", style("(no audio)").dim()));
    }
    println!("{}", line);
    println!("      {}", style(track.id).dim());
}

pub fn heading(text: &str) {
    println!("\n{}", style(text).bold().cyan());
    println!("{}", "=".repeat(60));
}

pub fn success(message: impl std::fmt::Display) {
    println!("{} {}", style("✓").green().bold(), message);
}
