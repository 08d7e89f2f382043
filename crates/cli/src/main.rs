use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use resonance_config::{ColorMode, ConfigManager};
use resonance_database::{connect, run_migrations, DatabaseConfig};
use std::path::PathBuf;

mod autosave;
mod commands;
mod player;

use commands::Session;

fn id_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).required(true).value_name("ID").help(help)
}

fn track_args(command: Command) -> Command {
    command
        .arg(Arg::new("audio").short('a').long("audio").value_name("FILE_OR_URL").help("Audio file path or URL"))
        .arg(
            Arg::new("duration")
                .short('d')
                .long("duration")
                .value_name("SECS")
                .value_parser(clap::value_parser!(u32))
                .help("Track length in seconds"),
        )
        .arg(Arg::new("explicit").long("explicit").help("Mark the track explicit").action(ArgAction::SetTrue))
        .arg(Arg::new("video").long("video").value_name("URL").help("Music video reference"))
}

fn build_cli() -> Command {
    Command::new("resonance")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Music library, playlists and playback for listeners and artists")
        .subcommand_required(false)
        .arg(
            Arg::new("database")
                .long("database")
                .value_name("PATH")
                .help("Database file to use instead of the configured one")
                .global(true),
        )
        .arg(
            Arg::new("profile")
                .long("profile")
                .value_name("ID")
                .help("Act as this profile instead of the active one")
                .global(true),
        )
        .subcommand(Command::new("init").about("Write the default config and create the database"))
        .subcommand(
            Command::new("profile")
                .about("Manage profiles")
                .subcommand_required(true)
                .subcommand(
                    Command::new("create")
                        .about("Create a profile and make it active")
                        .arg(Arg::new("name").required(true).value_name("NAME").help("Display name")),
                )
                .subcommand(Command::new("show").about("Show the active profile"))
                .subcommand(
                    Command::new("use")
                        .about("Make another profile active")
                        .arg(id_arg("id", "Profile ID")),
                )
                .subcommand(
                    Command::new("rename")
                        .about("Change the display name")
                        .arg(Arg::new("name").required(true).value_name("NAME")),
                )
                .subcommand(
                    Command::new("artist")
                        .about("Turn the artist profile on or off")
                        .arg(Arg::new("name").long("name").value_name("NAME").help("Artist name"))
                        .arg(Arg::new("bio").long("bio").value_name("TEXT").help("Artist bio"))
                        .arg(Arg::new("off").long("off").help("Stop being an artist").action(ArgAction::SetTrue)),
                )
                .subcommand(
                    Command::new("parental")
                        .about("Configure parental controls")
                        .arg(Arg::new("enable").long("enable").action(ArgAction::SetTrue).conflicts_with("disable"))
                        .arg(Arg::new("disable").long("disable").action(ArgAction::SetTrue))
                        .arg(Arg::new("pin").long("pin").value_name("PIN").help("4 to 6 digit PIN"))
                        .arg(
                            Arg::new("explicit")
                                .long("explicit")
                                .value_name("on|off")
                                .value_parser(["on", "off"])
                                .help("Allow explicit content"),
                        )
                        .arg(
                            Arg::new("videos")
                                .long("videos")
                                .value_name("on|off")
                                .value_parser(["on", "off"])
                                .help("Allow music videos"),
                        ),
                )
                .subcommand(
                    Command::new("theme")
                        .about("Choose the theme")
                        .arg(
                            Arg::new("theme")
                                .required(true)
                                .value_parser(["light", "dark", "system"]),
                        ),
                ),
        )
        .subcommand(
            Command::new("album")
                .about("Publish and browse albums")
                .subcommand_required(true)
                .subcommand(
                    Command::new("create")
                        .about("Create an empty album for the active artist")
                        .arg(Arg::new("title").required(true).value_name("TITLE"))
                        .arg(Arg::new("cover").long("cover").value_name("URL")),
                )
                .subcommand(track_args(
                    Command::new("single")
                        .about("Release a single track as its own album")
                        .arg(Arg::new("title").required(true).value_name("TITLE"))
                        .arg(Arg::new("cover").long("cover").value_name("URL")),
                ))
                .subcommand(track_args(
                    Command::new("add-track")
                        .about("Add a song to one of your albums")
                        .arg(id_arg("album", "Album ID"))
                        .arg(Arg::new("title").required(true).value_name("TITLE")),
                ))
                .subcommand(
                    Command::new("list")
                        .about("List an artist's albums")
                        .arg(Arg::new("artist").long("artist").value_name("ID").help("Artist profile ID")),
                )
                .subcommand(
                    Command::new("show")
                        .about("Show an album and its tracks")
                        .arg(id_arg("id", "Album ID")),
                ),
        )
        .subcommand(
            Command::new("playlist")
                .about("Manage your playlists")
                .subcommand_required(true)
                .subcommand(
                    Command::new("create")
                        .about("Create a playlist")
                        .arg(Arg::new("name").required(true).value_name("NAME")),
                )
                .subcommand(Command::new("list").about("List your playlists"))
                .subcommand(
                    Command::new("show")
                        .about("Show a playlist's tracks")
                        .arg(id_arg("id", "Playlist ID")),
                )
                .subcommand(
                    Command::new("rename")
                        .about("Rename a playlist")
                        .arg(id_arg("id", "Playlist ID"))
                        .arg(Arg::new("name").required(true).value_name("NAME")),
                )
                .subcommand(
                    Command::new("delete")
                        .about("Delete a playlist")
                        .arg(id_arg("id", "Playlist ID"))
                        .arg(Arg::new("force").short('f').long("force").help("Skip confirmation prompt").action(ArgAction::SetTrue)),
                )
                .subcommand(
                    Command::new("add")
                        .about("Append a track")
                        .arg(id_arg("playlist", "Playlist ID"))
                        .arg(id_arg("track", "Track ID")),
                )
                .subcommand(
                    Command::new("remove")
                        .about("Remove a track")
                        .arg(id_arg("playlist", "Playlist ID"))
                        .arg(id_arg("track", "Track ID")),
                ),
        )
        .subcommand(
            Command::new("library")
                .about("Saved tracks, albums and artists")
                .subcommand_required(true)
                .subcommand(
                    Command::new("add")
                        .about("Save an item")
                        .arg(Arg::new("kind").required(true).value_parser(["track", "album", "artist"]))
                        .arg(id_arg("id", "Item ID")),
                )
                .subcommand(
                    Command::new("remove")
                        .about("Remove a saved item")
                        .arg(Arg::new("kind").required(true).value_parser(["track", "album", "artist"]))
                        .arg(id_arg("id", "Item ID")),
                )
                .subcommand(
                    Command::new("list")
                        .about("List saved items")
                        .arg(
                            Arg::new("kind")
                                .long("kind")
                                .value_parser(["track", "album", "artist"])
                                .help("Only this kind"),
                        ),
                ),
        )
        .subcommand(
            Command::new("search")
                .about("Search tracks, albums and artists")
                .arg(Arg::new("query").required(true).num_args(1..).value_name("QUERY")),
        )
        .subcommand(
            Command::new("history")
                .about("Show recent searches")
                .arg(Arg::new("clear").long("clear").help("Delete search history").action(ArgAction::SetTrue)),
        )
        .subcommand(Command::new("recent").about("Show recently played tracks"))
        .subcommand(
            Command::new("play")
                .about("Play an album, playlist or track")
                .arg(Arg::new("kind").required(true).value_parser(["album", "playlist", "track"]))
                .arg(id_arg("id", "Album, playlist or track ID"))
                .arg(Arg::new("pin").long("pin").value_name("PIN").help("Parental control PIN"))
                .arg(
                    Arg::new("start")
                        .long("start")
                        .value_name("N")
                        .value_parser(clap::value_parser!(usize))
                        .help("Start at the Nth track (1-based)"),
                ),
        )
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = build_cli().get_matches();

    let manager = ConfigManager::new().context("Failed to locate config directory")?;
    let config = manager
        .load_with_env_overrides()
        .context("Failed to load configuration")?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.app.effective_log_level().as_filter()),
    )
    .init();

    match config.app.color {
        ColorMode::Always => console::set_colors_enabled(true),
        ColorMode::Never => console::set_colors_enabled(false),
        ColorMode::Auto => {}
    }

    let db_path = matches
        .get_one::<String>("database")
        .map(PathBuf::from)
        .unwrap_or_else(|| manager.database_path(&config));
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let pool = connect(DatabaseConfig::new(db_path.to_string_lossy()))
        .await
        .context("Failed to connect to database")?;
    run_migrations(&pool)
        .await
        .context("Failed to apply database migrations")?;

    let profile_override = matches
        .get_one::<String>("profile")
        .map(|id| commands::parse_id(id, resonance_core::ProfileId::from_string, "profile"))
        .transpose()?;

    let session = Session::new(pool, config, manager, profile_override);

    let result = match matches.subcommand() {
        Some(("init", _)) => commands::init(&session, &db_path),
        Some(("profile", sub)) => commands::profile::run(&session, sub).await,
        Some(("album", sub)) => commands::albums::run(&session, sub).await,
        Some(("playlist", sub)) => commands::playlists::run(&session, sub).await,
        Some(("library", sub)) => commands::library::run(&session, sub).await,
        Some(("search", sub)) => commands::discover::search(&session, sub).await,
        Some(("history", sub)) => commands::discover::history(&session, sub).await,
        Some(("recent", _)) => commands::discover::recent(&session).await,
        Some(("play", sub)) => commands::play(&session, sub).await,
        _ => {
            build_cli().print_help()?;
            Ok(())
        }
    };

    session.close().await;
    result
}
