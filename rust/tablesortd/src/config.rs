use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::compare::{CategoryRanking, NumericMode, SortProfile};

pub const DEFAULT_PROFILE: &str = "default";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub markers: Markers,
    pub sort: SortSection,
    pub profiles: BTreeMap<String, ProfileDef>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Markers {
    pub sortable_class: String,
    pub no_sort_class: String,
    pub category_attribute: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SortSection {
    pub numeric: NumericMode,
    pub default_profile: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileDef {
    #[serde(default)]
    pub category_column: Option<usize>,
    #[serde(default)]
    pub category_order: Option<Vec<String>>,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            sortable_class: "sortable".to_string(),
            no_sort_class: "no-sort".to_string(),
            category_attribute: "category".to_string(),
        }
    }
}

impl Default for SortSection {
    fn default() -> Self {
        Self {
            numeric: NumericMode::Strict,
            default_profile: DEFAULT_PROFILE.to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert(DEFAULT_PROFILE.to_string(), ProfileDef::default());
        // Recommendation tables carry the category in their fourth column.
        profiles.insert(
            "recommendations".to_string(),
            ProfileDef {
                category_column: Some(3),
                category_order: None,
            },
        );
        Self {
            markers: Markers::default(),
            sort: SortSection::default(),
            profiles,
        }
    }
}

impl ProfileDef {
    pub fn resolve(&self) -> SortProfile {
        let ranking = match &self.category_order {
            Some(order) => CategoryRanking::new(order.iter().cloned()),
            None => CategoryRanking::default(),
        };
        SortProfile {
            category_column: self.category_column,
            ranking,
        }
    }
}

impl Config {
    pub fn profile(&self, name: &str) -> Option<SortProfile> {
        self.profiles.get(name).map(ProfileDef::resolve)
    }

    fn validate(&self) -> Result<()> {
        if self.markers.sortable_class.trim().is_empty() {
            anyhow::bail!("markers.sortable_class must not be empty");
        }
        if !self.profiles.contains_key(&self.sort.default_profile) {
            anyhow::bail!(
                "sort.default_profile '{}' is not a configured profile",
                self.sort.default_profile
            );
        }
        for (name, p) in &self.profiles {
            if let Some(order) = &p.category_order {
                if order.is_empty() {
                    anyhow::bail!("profiles.{name}.category_order must not be empty");
                }
            }
        }
        Ok(())
    }
}

pub fn parse_config(content: &str) -> Result<Config> {
    let mut config: Config = toml::from_str(content)?;
    config
        .profiles
        .entry(DEFAULT_PROFILE.to_string())
        .or_default();
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_page_markers() {
        let c = Config::default();
        assert_eq!(c.markers.sortable_class, "sortable");
        assert_eq!(c.markers.no_sort_class, "no-sort");
        assert_eq!(c.sort.numeric, NumericMode::Strict);
        let rec = c.profile("recommendations").expect("recommendations profile");
        assert_eq!(rec.category_column, Some(3));
        assert_eq!(rec.ranking.rank_of("Not Started"), Some(5));
    }

    #[test]
    fn file_profiles_keep_a_default_profile() {
        let c = parse_config(
            r#"
            [sort]
            numeric = "prefix"

            [profiles.chapters]
            category_column = 1
            category_order = ["high", "low"]
            "#,
        )
        .expect("parse");
        assert_eq!(c.sort.numeric, NumericMode::Prefix);
        assert!(c.profiles.contains_key(DEFAULT_PROFILE));
        assert!(!c.profiles.contains_key("recommendations"));
        let p = c.profile("chapters").expect("chapters");
        assert_eq!(p.ranking.rank_of("low"), Some(1));
        assert_eq!(c.markers.category_attribute, "category");
    }

    #[test]
    fn rejects_missing_default_profile_and_empty_orders() {
        assert!(parse_config("[sort]\ndefault_profile = \"nope\"\n").is_err());
        assert!(parse_config("[profiles.x]\ncategory_order = []\n").is_err());
        assert!(parse_config("[sort]\nnumeric = \"fuzzy\"\n").is_err());
    }
}
