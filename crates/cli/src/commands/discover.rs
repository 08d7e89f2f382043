//! Search, search history and recently played

use super::{heading, print_track_line, success, user_error, Session};
use anyhow::Result;
use clap::ArgMatches;
use console::style;
use resonance_core::ParentalControls;
use resonance_database::queries::{clear_search_history, list_search_history, recent_tracks};

pub async fn search(session: &Session, matches: &ArgMatches) -> Result<()> {
    let query = matches
        .get_many::<String>("query")
        .map(|words| words.map(String::as_str).collect::<Vec<_>>().join(" "))
        .unwrap_or_default();

    // Searching works without a profile; history is kept only with one
    let viewer = session.active_profile().await.ok();
    let results = resonance_database::search(
        &session.pool,
        viewer.as_ref().map(|p| p.id),
        &query,
        session.search_limits(),
    )
    .await
    .map_err(user_error)?;

    if results.is_empty() {
        println!("Nothing found for '{}'", query.trim());
        return Ok(());
    }

    let controls = viewer.map(|p| p.parental).unwrap_or_else(ParentalControls::default);

    if !results.tracks.is_empty() {
        heading(&format!("Songs ({})", results.tracks.len()));
        for (i, track) in results.tracks.iter().enumerate() {
            print_track_line(i + 1, track, &controls);
        }
    }
    if !results.albums.is_empty() {
        heading(&format!("Albums ({})", results.albums.len()));
        for album in &results.albums {
            let kind = if album.is_single { " (single)" } else { "" };
            println!("{}{}  {}", style(&album.title).bold(), style(kind).dim(), style(album.id).dim());
        }
    }
    if !results.artists.is_empty() {
        heading(&format!("Artists ({})", results.artists.len()));
        for artist in &results.artists {
            println!("{}  {}", style(artist.label()).bold(), style(artist.id).dim());
        }
    }
    Ok(())
}

pub async fn history(session: &Session, matches: &ArgMatches) -> Result<()> {
    let profile = session.active_profile().await?;

    if matches.get_flag("clear") {
        let removed = clear_search_history(&session.pool, profile.id)
            .await
            .map_err(user_error)?;
        success(format!("Cleared {} searches", removed));
        return Ok(());
    }

    let entries = list_search_history(
        &session.pool,
        profile.id,
        session.config.content.search_history_limit,
    )
    .await
    .map_err(user_error)?;

    if entries.is_empty() {
        println!("No recent searches.");
        return Ok(());
    }

    heading("Recent searches");
    for entry in entries {
        println!("  {}", entry.query);
    }
    Ok(())
}

pub async fn recent(session: &Session) -> Result<()> {
    let profile = session.active_profile().await?;
    let limit = u32::try_from(session.config.app.max_recent_tracks).unwrap_or(u32::MAX);
    let tracks = recent_tracks(&session.pool, profile.id, limit)
        .await
        .map_err(user_error)?;

    if tracks.is_empty() {
        println!("Nothing played yet.");
        return Ok(());
    }

    heading("Recently played");
    for (i, track) in tracks.iter().enumerate() {
        print_track_line(i + 1, track, &profile.parental);
    }
    Ok(())
}
