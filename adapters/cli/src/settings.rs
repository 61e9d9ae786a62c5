use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use strata_maze_system_lifecycle::SessionSettings;
use strata_maze_system_tick::Pacing;

const SUPPORTED_SETTINGS_VERSION: u32 = 1;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    version: u32,
    #[serde(default)]
    pacing: PacingSection,
    #[serde(default)]
    display: DisplaySection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PacingSection {
    input_delay_ms: Option<u64>,
    forced_move_delay_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct DisplaySection {
    player_token: Option<char>,
}

/// Loads session settings from the provided file, or the defaults when no file is given.
pub(crate) fn load_settings(path: Option<&Path>) -> Result<SessionSettings> {
    let Some(path) = path else {
        return Ok(SessionSettings::default());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings at {}", path.display()))?;
    parse_settings(&contents)
        .with_context(|| format!("invalid settings in {}", path.display()))
}

fn parse_settings(contents: &str) -> Result<SessionSettings> {
    let file: SettingsFile =
        toml::from_str(contents).context("failed to parse settings toml contents")?;
    if file.version != SUPPORTED_SETTINGS_VERSION {
        bail!(
            "unsupported settings version {}; expected {}",
            file.version,
            SUPPORTED_SETTINGS_VERSION
        );
    }

    let defaults = SessionSettings::default();
    let input_delay = file
        .pacing
        .input_delay_ms
        .map_or(defaults.pacing().input_delay(), Duration::from_millis);
    let forced_move_delay = file
        .pacing
        .forced_move_delay_ms
        .map_or(defaults.pacing().forced_move_delay(), Duration::from_millis);
    if forced_move_delay >= input_delay {
        bail!(
            "forced move delay ({} ms) must be shorter than the input delay ({} ms)",
            forced_move_delay.as_millis(),
            input_delay.as_millis()
        );
    }

    let player_token = file
        .display
        .player_token
        .unwrap_or(defaults.player_token());
    if player_token.is_whitespace() || player_token.is_control() {
        bail!("player token {player_token:?} would be invisible");
    }

    Ok(SessionSettings::new(
        Pacing::new(input_delay, forced_move_delay),
        player_token,
    ))
}
