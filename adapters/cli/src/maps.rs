use std::{
    collections::BTreeMap,
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use log::{debug, info};
use strata_maze_core::{MapData, MapSource, MapSourceError};

const MAP_EXTENSION: &str = "json";

const BUILTIN_MAPS: [&str; 2] = [
    include_str!("../../../maps/training_hall.json"),
    include_str!("../../../maps/the_well.json"),
];

/// Decodes a single JSON map file.
pub(crate) fn parse_map(contents: &str) -> Result<MapData> {
    let map: MapData = serde_json::from_str(contents).context("failed to parse map json")?;
    if map.name.trim().is_empty() {
        bail!("map has no name");
    }
    Ok(map)
}

fn unavailable(context: impl Into<String>, error: anyhow::Error) -> MapSourceError {
    MapSourceError::Unavailable {
        context: context.into(),
        source: error.into(),
    }
}

/// Maps stored as `*.json` files in one directory, listed by map name.
#[derive(Debug)]
pub(crate) struct DirectoryMaps {
    root: PathBuf,
    index: BTreeMap<String, PathBuf>,
}

impl DirectoryMaps {
    pub(crate) fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            index: BTreeMap::new(),
        }
    }

    fn scan(&self) -> Result<BTreeMap<String, PathBuf>> {
        let entries = fs::read_dir(&self.root)
            .with_context(|| format!("failed to list maps in {}", self.root.display()))?;

        let mut index = BTreeMap::new();
        for entry in entries {
            let path = entry
                .with_context(|| format!("failed to list maps in {}", self.root.display()))?
                .path();
            if path.extension() != Some(OsStr::new(MAP_EXTENSION)) {
                continue;
            }
            let map = read_map(&path)?;
            debug!("found map `{}` in {}", map.name, path.display());
            if let Some(previous) = index.insert(map.name.clone(), path.clone()) {
                bail!(
                    "map name `{}` is used by both {} and {}",
                    map.name,
                    previous.display(),
                    path.display()
                );
            }
        }
        Ok(index)
    }
}

fn read_map(path: &Path) -> Result<MapData> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read map at {}", path.display()))?;
    parse_map(&contents).with_context(|| format!("invalid map file {}", path.display()))
}

impl MapSource for DirectoryMaps {
    fn list_map_names(&mut self) -> Result<Vec<String>, MapSourceError> {
        self.index = self
            .scan()
            .map_err(|error| unavailable("listing maps", error))?;
        info!(
            "{} map(s) available in {}",
            self.index.len(),
            self.root.display()
        );
        Ok(self.index.keys().cloned().collect())
    }

    fn get_map(&mut self, name: &str) -> Result<MapData, MapSourceError> {
        let path = self
            .index
            .get(name)
            .ok_or_else(|| MapSourceError::NotFound {
                name: name.to_owned(),
            })?;
        let map = read_map(path).map_err(|error| unavailable(format!("loading `{name}`"), error))?;
        if map.name != name {
            return Err(MapSourceError::NotFound {
                name: name.to_owned(),
            });
        }
        Ok(map)
    }
}

/// Maps compiled into the binary.
#[derive(Debug)]
pub(crate) struct BuiltinMaps {
    maps: Vec<MapData>,
}

impl BuiltinMaps {
    pub(crate) fn load() -> Result<Self> {
        let maps = BUILTIN_MAPS
            .iter()
            .map(|contents| parse_map(contents))
            .collect::<Result<Vec<_>>>()
            .context("built-in maps are corrupt")?;
        Ok(Self { maps })
    }
}

impl MapSource for BuiltinMaps {
    fn list_map_names(&mut self) -> Result<Vec<String>, MapSourceError> {
        Ok(self.maps.iter().map(|map| map.name.clone()).collect())
    }

    fn get_map(&mut self, name: &str) -> Result<MapData, MapSourceError> {
        self.maps
            .iter()
            .find(|map| map.name == name)
            .cloned()
            .ok_or_else(|| MapSourceError::NotFound {
                name: name.to_owned(),
            })
    }
}
