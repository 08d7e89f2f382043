//! `resonance playlist ...`

use super::{arg, heading, parse_id, print_track_line, success, user_error, Session};
use anyhow::{bail, Context, Result};
use clap::ArgMatches;
use console::style;
use resonance_core::{Playlist, PlaylistId, Profile, TrackId};
use resonance_database::queries::{
    add_track_to_playlist, create_playlist, delete_playlist, get_playlist, get_playlist_tracks,
    get_track, list_playlists, remove_track_from_playlist, rename_playlist,
};

pub async fn run(session: &Session, matches: &ArgMatches) -> Result<()> {
    let profile = session.active_profile().await?;

    match matches.subcommand() {
        Some(("create", sub)) => {
            let playlist = Playlist::new(profile.id, arg(sub, "name")?.trim().to_string());
            create_playlist(&session.pool, &playlist)
                .await
                .map_err(user_error)?;
            success(format!("Playlist '{}' created", playlist.name));
            println!("  ID: {}", playlist.id);
            Ok(())
        }
        Some(("list", _)) => list(session, &profile).await,
        Some(("show", sub)) => show(session, &profile, sub).await,
        Some(("rename", sub)) => {
            let playlist = owned_playlist(session, &profile, sub).await?;
            let renamed = rename_playlist(&session.pool, playlist.id, arg(sub, "name")?)
                .await
                .map_err(user_error)?;
            success(format!("'{}' renamed to '{}'", playlist.name, renamed.name));
            Ok(())
        }
        Some(("delete", sub)) => {
            let playlist = owned_playlist(session, &profile, sub).await?;
            if !sub.get_flag("force") && !confirm(&format!("Delete '{}'?", playlist.name))? {
                println!("Deletion cancelled.");
                return Ok(());
            }
            delete_playlist(&session.pool, playlist.id)
                .await
                .map_err(user_error)?;
            success(format!("Playlist deleted: {}", playlist.name));
            Ok(())
        }
        Some(("add", sub)) => {
            let playlist = owned_playlist(session, &profile, sub).await?;
            let track_id = parse_id(arg(sub, "track")?, TrackId::from_string, "track")?;
            let track = get_track(&session.pool, track_id).await.map_err(user_error)?;
            let entry = add_track_to_playlist(&session.pool, playlist.id, track.id)
                .await
                .map_err(user_error)?;
            success(format!(
                "'{}' added to '{}' at position {}",
                track.title,
                playlist.name,
                entry.position + 1
            ));
            Ok(())
        }
        Some(("remove", sub)) => {
            let playlist = owned_playlist(session, &profile, sub).await?;
            let track_id = parse_id(arg(sub, "track")?, TrackId::from_string, "track")?;
            if remove_track_from_playlist(&session.pool, playlist.id, track_id)
                .await
                .map_err(user_error)?
            {
                success(format!("Track removed from '{}'", playlist.name));
            } else {
                println!("That track is not in '{}'.", playlist.name);
            }
            Ok(())
        }
        _ => bail!("Missing playlist subcommand"),
    }
}

async fn list(session: &Session, profile: &Profile) -> Result<()> {
    let playlists = list_playlists(&session.pool, profile.id)
        .await
        .map_err(user_error)?;

    if playlists.is_empty() {
        println!("No playlists yet. Use 'playlist create' to make one.");
        return Ok(());
    }

    heading(&format!("{} Playlists", playlists.len()));
    for playlist in playlists {
        let count = get_playlist_tracks(&session.pool, playlist.id)
            .await
            .map_err(user_error)?
            .len();
        println!("{}  {}", style(&playlist.name).bold(), style(format!("{} tracks", count)).dim());
        println!("  {}", style(playlist.id).dim());
    }
    Ok(())
}

async fn show(session: &Session, profile: &Profile, matches: &ArgMatches) -> Result<()> {
    let playlist = owned_playlist(session, profile, matches).await?;
    let tracks = get_playlist_tracks(&session.pool, playlist.id)
        .await
        .map_err(user_error)?;

    heading(&playlist.name);
    if tracks.is_empty() {
        println!("This playlist is empty.");
    }
    for (i, track) in tracks.iter().enumerate() {
        print_track_line(i + 1, track, &profile.parental);
    }
    Ok(())
}

/// Loads the playlist named by the `id` or `playlist` argument; only its owner may use it
async fn owned_playlist(session: &Session, profile: &Profile, matches: &ArgMatches) -> Result<Playlist> {
    let raw = matches
        .try_get_one::<String>("id")
        .ok()
        .flatten()
        .map(String::as_str)
        .map_or_else(|| arg(matches, "playlist"), Ok)?;
    let id = parse_id(raw, PlaylistId::from_string, "playlist")?;
    let playlist = get_playlist(&session.pool, id).await.map_err(user_error)?;

    if playlist.user_id != profile.id {
        bail!("'{}' belongs to another profile", playlist.name);
    }
    Ok(playlist)
}

fn confirm(question: &str) -> Result<bool> {
    println!("{} (y/N)", question);
    let mut input = String::new();
    std::io::stdin()
        .read_line(&mut input)
        .context("Failed to read input")?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}
