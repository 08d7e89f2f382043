//! `resonance album ...`

use super::{arg, heading, parse_id, print_track_line, success, track_from_args, user_error, Session};
use anyhow::{bail, Result};
use clap::ArgMatches;
use console::style;
use resonance_core::{Album, AlbumId, ProfileId, Validator};
use resonance_database::queries::{
    create_album, create_single, create_track, get_album, get_album_with_tracks, get_profile,
    list_albums_by_artist,
};

pub async fn run(session: &Session, matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("create", sub)) => create(session, sub).await,
        Some(("single", sub)) => single(session, sub).await,
        Some(("add-track", sub)) => add_track(session, sub).await,
        Some(("list", sub)) => list(session, sub).await,
        Some(("show", sub)) => show(session, sub).await,
        _ => bail!("Missing album subcommand"),
    }
}

async fn create(session: &Session, matches: &ArgMatches) -> Result<()> {
    let artist = session.active_artist().await?;

    let mut album = Album::new(arg(matches, "title")?.trim().to_string(), artist.id);
    album.cover_url = matches.get_one::<String>("cover").cloned();
    create_album(&session.pool, &album).await.map_err(user_error)?;

    success(format!("Album '{}' created", album.title));
    println!("  ID: {}", album.id);
    Ok(())
}

async fn single(session: &Session, matches: &ArgMatches) -> Result<()> {
    let artist = session.active_artist().await?;

    let track = track_from_args(matches, arg(matches, "title")?, &artist)?;
    if let Err(errors) = track.validate() {
        bail!(errors.join(" "));
    }
    let (album, track) = Album::new_single(track, matches.get_one::<String>("cover").cloned());
    create_single(&session.pool, &album, &track)
        .await
        .map_err(user_error)?;

    success(format!("Single '{}' released", album.title));
    println!("  Album ID: {}", album.id);
    println!("  Track ID: {}", track.id);
    Ok(())
}

async fn add_track(session: &Session, matches: &ArgMatches) -> Result<()> {
    let artist = session.active_artist().await?;
    let album_id = parse_id(arg(matches, "album")?, AlbumId::from_string, "album")?;
    let album = get_album(&session.pool, album_id).await.map_err(user_error)?;

    if album.artist_id != artist.id {
        bail!("'{}' belongs to another artist", album.title);
    }
    if album.is_single {
        bail!("'{}' is a single and cannot take more tracks", album.title);
    }

    let mut track = track_from_args(matches, arg(matches, "title")?, &artist)?;
    track.album_id = Some(album.id);
    if track.cover_url.is_none() {
        track.cover_url = album.cover_url.clone();
    }
    create_track(&session.pool, &track).await.map_err(user_error)?;

    success(format!("'{}' added to '{}'", track.title, album.title));
    println!("  Track ID: {}", track.id);
    Ok(())
}

async fn list(session: &Session, matches: &ArgMatches) -> Result<()> {
    let artist_id = match matches.get_one::<String>("artist") {
        Some(raw) => parse_id(raw, ProfileId::from_string, "artist")?,
        None => session.active_profile_id()?,
    };
    let artist = get_profile(&session.pool, artist_id)
        .await
        .map_err(user_error)?;
    let albums = list_albums_by_artist(&session.pool, artist_id)
        .await
        .map_err(user_error)?;

    if albums.is_empty() {
        println!("{} has no albums yet.", artist.label());
        return Ok(());
    }

    heading(&format!("Albums by {}", artist.label()));
    for album in albums {
        let kind = if album.is_single { " (single)" } else { "" };
        println!("{}{}", style(&album.title).bold(), style(kind).dim());
        println!("  {}", style(album.id).dim());
    }
    Ok(())
}

async fn show(session: &Session, matches: &ArgMatches) -> Result<()> {
    let album_id = parse_id(arg(matches, "id")?, AlbumId::from_string, "album")?;
    let album = get_album_with_tracks(&session.pool, album_id)
        .await
        .map_err(user_error)?;
    let artist = get_profile(&session.pool, album.album.artist_id)
        .await
        .map_err(user_error)?;

    // Videos and explicit tags follow the viewer's parental settings
    let controls = match session.active_profile().await {
        Ok(viewer) => viewer.parental,
        Err(_) => Default::default(),
    };

    heading(&album.album.title);
    println!("by {}", artist.label());
    println!(
        "{} tracks, {}",
        album.tracks.len(),
        resonance_core::Duration::from_seconds(album.total_duration_secs()).as_clock()
    );
    if album.has_explicit() {
        println!("{}", style("Contains explicit content").red());
    }
    if let Some(cover) = &album.album.cover_url {
        println!("Cover: {}", cover);
    }
    println!();

    for (i, track) in album.tracks.iter().enumerate() {
        print_track_line(i + 1, track, &controls);
    }
    Ok(())
}
