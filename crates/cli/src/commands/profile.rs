//! `resonance profile ...`

use super::{arg, heading, parse_id, success, user_error, Session};
use crate::autosave::ProfileAutosave;
use anyhow::{bail, Context, Result};
use clap::ArgMatches;
use console::style;
use resonance_core::{ParentalControls, Profile, ProfileId, ProfilePatch, ThemePreference, Validator};
use resonance_database::queries::{create_profile, get_profile};

pub async fn run(session: &Session, matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("create", sub)) => create(session, arg(sub, "name")?).await,
        Some(("show", _)) => show(session).await,
        Some(("use", sub)) => switch(session, arg(sub, "id")?).await,
        Some((name, sub)) => {
            let profile = session.active_profile().await?;
            let patch = patch_from_args(name, sub, &profile)?;
            edit(session, profile, patch).await
        }
        None => bail!("Missing profile subcommand"),
    }
}

async fn create(session: &Session, name: &str) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        bail!("Display name cannot be empty");
    }

    let profile = Profile::new(Some(name.to_string()));
    create_profile(&session.pool, &profile)
        .await
        .map_err(user_error)?;
    set_active(session, profile.id)?;

    success(format!("Profile '{}' created and active", name));
    println!("  ID: {}", profile.id);
    Ok(())
}

async fn switch(session: &Session, raw: &str) -> Result<()> {
    let id = parse_id(raw, ProfileId::from_string, "profile")?;
    let profile = get_profile(&session.pool, id).await.map_err(user_error)?;
    set_active(session, id)?;
    success(format!("Now acting as {}", profile.label()));
    Ok(())
}

fn set_active(session: &Session, id: ProfileId) -> Result<()> {
    session
        .manager
        .update(|config| config.app.active_profile = Some(id.as_string()))
        .context("Failed to save active profile")
}

async fn show(session: &Session) -> Result<()> {
    let profile = session.active_profile().await?;
    print_profile(&profile);
    Ok(())
}

/// Validates the edit against the current profile, then saves it through
/// the autosave queue
async fn edit(session: &Session, profile: Profile, patch: ProfilePatch) -> Result<()> {
    let mut preview = profile.clone();
    preview.apply(&patch);
    if let Err(errors) = preview.validate() {
        bail!(errors.join(" "));
    }

    let autosave = ProfileAutosave::new(session.pool.clone(), profile.id, &session.config.content);
    autosave.save(patch);
    autosave.finish().await?;

    success("Profile updated");
    print_profile(&preview);
    Ok(())
}

/// Turns an edit subcommand into the patch it describes
fn patch_from_args(name: &str, matches: &ArgMatches, profile: &Profile) -> Result<ProfilePatch> {
    let patch = match name {
        "rename" => {
            let name = arg(matches, "name")?.trim();
            if name.is_empty() {
                bail!("Display name cannot be empty");
            }
            ProfilePatch::DisplayName(name.to_string())
        }
        "artist" => {
            if matches.get_flag("off") {
                ProfilePatch::ArtistProfile {
                    is_artist: false,
                    artist_name: profile.artist_name.clone(),
                    artist_bio: profile.artist_bio.clone(),
                }
            } else {
                ProfilePatch::ArtistProfile {
                    is_artist: true,
                    artist_name: matches
                        .get_one::<String>("name")
                        .map(|n| n.trim().to_string())
                        .or_else(|| profile.artist_name.clone()),
                    artist_bio: matches
                        .get_one::<String>("bio")
                        .cloned()
                        .or_else(|| profile.artist_bio.clone()),
                }
            }
        }
        "parental" => {
            let mut controls = profile.parental.clone();
            if matches.get_flag("enable") {
                controls.enabled = true;
            }
            if matches.get_flag("disable") {
                controls.enabled = false;
            }
            if let Some(pin) = matches.get_one::<String>("pin") {
                controls.pin = Some(ParentalControls::sanitize_pin(pin));
            }
            if let Some(explicit) = matches.get_one::<String>("explicit") {
                controls.explicit_content_enabled = explicit == "on";
            }
            if let Some(videos) = matches.get_one::<String>("videos") {
                controls.music_videos_enabled = videos == "on";
            }
            ProfilePatch::ParentalControls(controls)
        }
        "theme" => ProfilePatch::Theme(
            arg(matches, "theme")?
                .parse::<ThemePreference>()
                .map_err(user_error)?,
        ),
        other => bail!("Unknown profile subcommand: {}", other),
    };
    Ok(patch)
}

fn on_off(value: bool) -> console::StyledObject<&'static str> {
    if value {
        style("on").green()
    } else {
        style("off").dim()
    }
}

fn print_profile(profile: &Profile) {
    heading(profile.label());
    println!("ID: {}", profile.id);
    if let Some(name) = &profile.display_name {
        println!("Display name: {}", name);
    }
    if let Some(avatar) = &profile.avatar_url {
        println!("Avatar: {}", avatar);
    }
    println!("Artist profile: {}", on_off(profile.is_artist));
    if profile.is_artist {
        if let Some(bio) = &profile.artist_bio {
            println!("  Bio: {}", bio);
        }
    }
    println!("Theme: {}", profile.theme);

    let parental = &profile.parental;
    println!("\nParental controls: {}", on_off(parental.enabled));
    if parental.enabled {
        println!("  PIN: {}", if parental.pin.is_some() { "set" } else { "not set" });
        println!("  Explicit content: {}", on_off(parental.explicit_content_enabled));
        println!("  Music videos: {}", on_off(parental.music_videos_enabled));
    }
}
