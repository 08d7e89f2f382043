use super::*;
use clap::{Arg, ArgAction, Command};
use resonance_core::ProfilePatch;
use resonance_database::queries::create_profile;
use resonance_database::{connect, run_migrations, DatabaseConfig};
use tempfile::TempDir;

async fn setup_session(dir: &TempDir) -> Session {
    let manager = ConfigManager::with_directory(dir.path().to_path_buf()).unwrap();
    let config = manager.load_or_default();
    let pool = connect(DatabaseConfig::new(
        manager.database_path(&config).to_string_lossy(),
    ))
    .await
    .unwrap();
    run_migrations(&pool).await.unwrap();

    Session::new(pool, config, manager, None)
}

fn track_matches(args: &[&str]) -> ArgMatches {
    Command::new("single")
        .arg(Arg::new("audio").long("audio"))
        .arg(Arg::new("duration").long("duration").value_parser(clap::value_parser!(u32)))
        .arg(Arg::new("explicit").long("explicit").action(ArgAction::SetTrue))
        .arg(Arg::new("video").long("video"))
        .try_get_matches_from(args)
        .unwrap()
}

#[tokio::test]
async fn test_no_active_profile_is_explained() {
    let dir = TempDir::new().unwrap();
    let session = setup_session(&dir).await;

    let error = session.active_profile().await.unwrap_err();
    assert!(error.to_string().contains("profile create"));
}

#[tokio::test]
async fn test_active_profile_comes_from_config() {
    let dir = TempDir::new().unwrap();
    let mut session = setup_session(&dir).await;

    let profile = Profile::new(Some("Sam".to_string()));
    create_profile(&session.pool, &profile).await.unwrap();
    session.config.app.active_profile = Some(profile.id.as_string());

    assert_eq!(session.active_profile().await.unwrap().id, profile.id);
    assert!(session.active_artist().await.is_err());
}

#[tokio::test]
async fn test_profile_override_wins() {
    let dir = TempDir::new().unwrap();
    let base = setup_session(&dir).await;

    let mut artist = Profile::new(None);
    artist.apply(&ProfilePatch::ArtistProfile {
        is_artist: true,
        artist_name: Some("Vela".to_string()),
        artist_bio: None,
    });
    create_profile(&base.pool, &artist).await.unwrap();

    let session = Session::new(base.pool, base.config, base.manager, Some(artist.id));
    assert_eq!(session.active_artist().await.unwrap().label(), "Vela");
}

#[tokio::test]
async fn test_search_limits_follow_config() {
    let dir = TempDir::new().unwrap();
    let mut session = setup_session(&dir).await;
    session.config.content.track_search_limit = 5;

    let limits = session.search_limits();
    assert_eq!(limits.tracks, 5);
    assert_eq!(limits.albums, session.config.content.album_search_limit);
}

#[test]
fn test_track_from_args() {
    let artist = Profile::new(Some("Vela".to_string()));
    let matches = track_matches(&[
        "single",
        "--audio",
        "https://cdn.example.com/lanterns.mp3",
        "--duration",
        "214",
        "--explicit",
        "--video",
        "https://cdn.example.com/lanterns.mp4",
    ]);

    let track = track_from_args(&matches, "  Lanterns ", &artist).unwrap();
    assert_eq!(track.title, "Lanterns");
    assert_eq!(track.artist_name, "Vela");
    assert_eq!(track.duration_secs, 214);
    assert!(track.is_explicit);
    assert!(track.is_playable());
    assert!(track.has_music_video);
}

#[test]
fn test_parse_id_names_the_entity() {
    let error = parse_id("not-a-uuid", AlbumId::from_string, "album").unwrap_err();
    assert!(error.to_string().contains("Invalid album ID"));

    let id = AlbumId::new();
    assert_eq!(parse_id(&format!(" {} ", id), AlbumId::from_string, "album").unwrap(), id);
}

#[test]
fn test_access_denied_keeps_reason() {
    let error = user_error(AppError::AccessDenied {
        reason: "Incorrect PIN".to_string(),
    });
    assert_eq!(error.to_string(), "Incorrect PIN");

    let missing = user_error(AppError::RecordNotFound {
        entity: "Album".to_string(),
        identifier: "x".to_string(),
    });
    assert_eq!(missing.to_string(), "Album was not found.");
}
