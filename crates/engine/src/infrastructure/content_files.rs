//! Loading rule data and character snapshots from JSON files.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use heroforge_domain::{CharacterSnapshot, RuleData};

pub fn load_rule_data(path: &Path) -> Result<RuleData> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read rule data {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse rule data {}", path.display()))
}

/// Every `*.json` file in `dir`, parsed as a character snapshot, in file name order.
pub fn load_characters(dir: &Path) -> Result<Vec<CharacterSnapshot>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)
        .with_context(|| format!("failed to list characters in {}", dir.display()))?
    {
        let path = entry
            .with_context(|| format!("failed to list characters in {}", dir.display()))?
            .path();
        if path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }
    paths.sort();

    paths
        .iter()
        .map(|path| {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read character {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("failed to parse character {}", path.display()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use heroforge_domain::{CharacterId, ExperienceLevel};

    #[test]
    fn rule_data_round_trips_through_a_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("rules.json");
        let rules = RuleData::new()
            .with_attribute("ATTR_1", "Courage")
            .with_experience_level(ExperienceLevel::average("EL_3"));
        fs::write(&path, serde_json::to_string(&rules).expect("json")).expect("write");

        assert_eq!(load_rule_data(&path).expect("load"), rules);
    }

    #[test]
    fn characters_are_read_in_file_name_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let first = CharacterSnapshot::new(CharacterId::new(), "Alrik", "EL_3");
        let second = CharacterSnapshot::new(CharacterId::new(), "Boronian", "EL_3");
        fs::write(dir.path().join("b.json"), serde_json::to_string(&second).expect("json"))
            .expect("write");
        fs::write(dir.path().join("a.json"), serde_json::to_string(&first).expect("json"))
            .expect("write");
        fs::write(dir.path().join("notes.txt"), "ignored").expect("write");

        let loaded = load_characters(dir.path()).expect("load");
        assert_eq!(loaded, vec![first, second]);
    }

    #[test]
    fn a_broken_character_names_its_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("broken.json"), "{}").expect("write");

        let err = load_characters(dir.path()).expect_err("must fail");
        assert!(format!("{err:#}").contains("broken.json"));
    }
}
