//! `resonance library ...`

use super::{arg, heading, parse_id, print_track_line, success, user_error, Session};
use anyhow::{bail, Result};
use clap::ArgMatches;
use console::style;
use resonance_core::{AlbumId, LibraryItem, LibraryTarget, ProfileId, TrackId};
use resonance_database::queries::{
    add_to_library, get_album, get_profile, get_track, library_albums, library_artists,
    library_tracks, remove_from_library,
};

pub async fn run(session: &Session, matches: &ArgMatches) -> Result<()> {
    let profile = session.active_profile().await?;

    match matches.subcommand() {
        Some(("add", sub)) => {
            let target = target_from_args(sub)?;
            let name = describe(session, &target).await?;
            if add_to_library(&session.pool, &LibraryItem::new(profile.id, target))
                .await
                .map_err(user_error)?
            {
                success(format!("{} saved to your library", name));
            } else {
                println!("{} is already in your library.", name);
            }
            Ok(())
        }
        Some(("remove", sub)) => {
            let target = target_from_args(sub)?;
            if remove_from_library(&session.pool, profile.id, &target)
                .await
                .map_err(user_error)?
            {
                success(format!("Removed {} from your library", target.kind()));
            } else {
                println!("That {} is not in your library.", target.kind());
            }
            Ok(())
        }
        Some(("list", sub)) => {
            let only = sub.get_one::<String>("kind").map(String::as_str);
            let wants = |kind: &str| only.map_or(true, |k| k == kind);

            if wants("track") {
                let tracks = library_tracks(&session.pool, profile.id)
                    .await
                    .map_err(user_error)?;
                heading(&format!("Songs ({})", tracks.len()));
                for (i, track) in tracks.iter().enumerate() {
                    print_track_line(i + 1, track, &profile.parental);
                }
            }
            if wants("album") {
                let albums = library_albums(&session.pool, profile.id)
                    .await
                    .map_err(user_error)?;
                heading(&format!("Albums ({})", albums.len()));
                for album in albums {
                    println!("{}  {}", style(&album.title).bold(), style(album.id).dim());
                }
            }
            if wants("artist") {
                let artists = library_artists(&session.pool, profile.id)
                    .await
                    .map_err(user_error)?;
                heading(&format!("Artists ({})", artists.len()));
                for artist in artists {
                    println!("{}  {}", style(artist.label()).bold(), style(artist.id).dim());
                }
            }
            Ok(())
        }
        _ => bail!("Missing library subcommand"),
    }
}

fn target_from_args(matches: &ArgMatches) -> Result<LibraryTarget> {
    let id = arg(matches, "id")?;
    let target = match arg(matches, "kind")? {
        "track" => LibraryTarget::Track(parse_id(id, TrackId::from_string, "track")?),
        "album" => LibraryTarget::Album(parse_id(id, AlbumId::from_string, "album")?),
        "artist" => LibraryTarget::Artist(parse_id(id, ProfileId::from_string, "artist")?),
        other => bail!("Unknown library kind: {}", other),
    };
    Ok(target)
}

/// Looks the target up so only existing items are saved
async fn describe(session: &Session, target: &LibraryTarget) -> Result<String> {
    let name = match target {
        LibraryTarget::Track(id) => get_track(&session.pool, *id).await.map(|t| t.title),
        LibraryTarget::Album(id) => get_album(&session.pool, *id).await.map(|a| a.title),
        LibraryTarget::Artist(id) => {
            let profile = get_profile(&session.pool, *id).await.map_err(user_error)?;
            if !profile.is_artist {
                bail!("{} is not an artist", profile.label());
            }
            Ok(profile.label().to_string())
        }
    };
    Ok(format!("'{}'", name.map_err(user_error)?))
}
