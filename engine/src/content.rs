use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::{AmmoProfile, CharacterProfile, GunProfile};

pub fn builtin_characters() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        ("recruit", include_str!("../content/characters/recruit.json")),
        ("veteran", include_str!("../content/characters/veteran.json")),
    ])
}

pub fn builtin_guns() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        (
            "service_pistol",
            include_str!("../content/guns/service_pistol.json"),
        ),
        (
            "hunting_rifle",
            include_str!("../content/guns/hunting_rifle.json"),
        ),
        (
            "combat_shotgun",
            include_str!("../content/guns/combat_shotgun.json"),
        ),
        ("recurve_bow", include_str!("../content/guns/recurve_bow.json")),
    ])
}

pub fn builtin_ammo() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        ("9mm", include_str!("../content/ammo/9mm.json")),
        ("308", include_str!("../content/ammo/308.json")),
        ("00_buckshot", include_str!("../content/ammo/00_buckshot.json")),
        ("field_arrow", include_str!("../content/ammo/field_arrow.json")),
    ])
}

pub fn builtin_character(id: &str) -> Result<CharacterProfile> {
    parse_builtin(&builtin_characters(), id, "character")
}

pub fn builtin_gun(id: &str) -> Result<GunProfile> {
    parse_builtin(&builtin_guns(), id, "gun")
}

pub fn builtin_ammo_profile(id: &str) -> Result<AmmoProfile> {
    parse_builtin(&builtin_ammo(), id, "ammo")
}

fn parse_builtin<T: serde::de::DeserializeOwned>(
    map: &HashMap<&'static str, &'static str>,
    id: &str,
    kind: &str,
) -> Result<T> {
    let text = map
        .get(id)
        .copied()
        .with_context(|| format!("unknown builtin {kind} '{id}'"))?;
    serde_json::from_str(text).with_context(|| format!("invalid builtin {kind} '{id}'"))
}

pub fn load_character(path: &Path) -> Result<CharacterProfile> {
    load_profile(path, "character")
}

pub fn load_gun(path: &Path) -> Result<GunProfile> {
    load_profile(path, "gun")
}

pub fn load_ammo(path: &Path) -> Result<AmmoProfile> {
    load_profile(path, "ammo")
}

/// JSON by default; `.yaml`/`.yml` files go through the YAML parser.
fn load_profile<T: serde::de::DeserializeOwned>(path: &Path, kind: &str) -> Result<T> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {kind} profile: {}", path.display()))?;
    let yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    if yaml {
        serde_yaml::from_str(&text)
            .with_context(|| format!("failed to parse {kind} YAML: {}", path.display()))
    } else {
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse {kind} JSON: {}", path.display()))
    }
}
