use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::standards::{FacilityCategory, ScoringStandard};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub standard: StandardOverrides,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_provider_kind")]
    pub kind: String,
    #[serde(default)]
    pub kakao_api_key: String,
    #[serde(default = "default_kakao_base_url")]
    pub kakao_base_url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Caps every category's search radius when set.
    #[serde(default)]
    pub search_radius_m: Option<f64>,
}

/// Partial per-category threshold overrides merged over the LH defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StandardOverrides {
    #[serde(default)]
    pub school: Option<ThresholdOverride>,
    #[serde(default)]
    pub hospital: Option<ThresholdOverride>,
    #[serde(default)]
    pub convenience: Option<ThresholdOverride>,
    #[serde(default)]
    pub subway: Option<ThresholdOverride>,
}

impl StandardOverrides {
    fn get(&self, category: FacilityCategory) -> Option<&ThresholdOverride> {
        match category {
            FacilityCategory::School => self.school.as_ref(),
            FacilityCategory::Hospital => self.hospital.as_ref(),
            FacilityCategory::Convenience => self.convenience.as_ref(),
            FacilityCategory::Subway => self.subway.as_ref(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThresholdOverride {
    pub excellent_m: Option<f64>,
    pub good_m: Option<f64>,
    pub fair_m: Option<f64>,
    pub weight: Option<f64>,
    pub max_search_radius_m: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub provider_kind: Option<String>,
    pub kakao_api_key: Option<String>,
    pub search_radius_m: Option<f64>,
}

impl Config {
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config/proximity-oracle/config.toml")
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(|p| p.to_path_buf())
            .unwrap_or_else(Self::default_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed reading config: {}", path.display()))?;
        let parsed: Self = toml::from_str(&data)
            .with_context(|| format!("failed parsing TOML config: {}", path.display()))?;
        Ok(parsed)
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(kind) = overrides.provider_kind {
            self.provider.kind = kind;
        }
        if let Some(key) = overrides.kakao_api_key {
            self.provider.kakao_api_key = key;
        }
        if let Some(radius) = overrides.search_radius_m {
            self.analysis.search_radius_m = Some(radius);
        }
    }

    /// The scoring standard with file overrides applied and validated.
    pub fn resolved_standard(&self) -> Result<ScoringStandard> {
        let mut standard = ScoringStandard::lh_default();
        for category in FacilityCategory::ALL {
            let Some(patch) = self.standard.get(category) else {
                continue;
            };
            let Some(thresholds) = standard.categories.get_mut(&category) else {
                continue;
            };
            if let Some(v) = patch.excellent_m {
                thresholds.excellent_m = v;
            }
            if let Some(v) = patch.good_m {
                thresholds.good_m = v;
            }
            if let Some(v) = patch.fair_m {
                thresholds.fair_m = v;
            }
            if let Some(v) = patch.weight {
                thresholds.weight = v;
            }
            if let Some(v) = patch.max_search_radius_m {
                thresholds.max_search_radius_m = v;
            }
        }
        if let Some(cap) = self.analysis.search_radius_m {
            for thresholds in standard.categories.values_mut() {
                thresholds.max_search_radius_m = thresholds.max_search_radius_m.min(cap);
            }
        }
        standard
            .validate()
            .context("configured scoring standard is invalid")?;
        Ok(standard)
    }

    pub fn write_template(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed creating config directory: {}", parent.display())
            })?;
        }
        fs::write(path, Self::default_template())
            .with_context(|| format!("failed writing config template: {}", path.display()))
    }

    pub fn default_template() -> String {
        let template = r#"[provider]
# "sample" uses the built-in deterministic fixtures; "kakao" queries the
# Kakao Local API and requires an API key.
kind = "sample"
kakao_api_key = ""
kakao_base_url = "https://dapi.kakao.com"

[analysis]
# Optional cap applied to every category's search radius (meters).
# search_radius_m = 1500.0

# Per-category distance bounds (meters) and weights. Omitted fields keep
# the LH defaults; bounds must stay strictly ascending.
[standard.school]
excellent_m = 300.0
good_m = 600.0
fair_m = 1000.0
weight = 30.0
max_search_radius_m = 1500.0

[standard.hospital]
excellent_m = 500.0
good_m = 1000.0
fair_m = 2000.0
weight = 25.0
max_search_radius_m = 3000.0

[standard.convenience]
excellent_m = 200.0
good_m = 400.0
fair_m = 800.0
weight = 20.0
max_search_radius_m = 1000.0

[standard.subway]
excellent_m = 500.0
good_m = 800.0
fair_m = 1200.0
weight = 25.0
max_search_radius_m = 1500.0
"#;
        template.to_string()
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: default_provider_kind(),
            kakao_api_key: String::new(),
            kakao_base_url: default_kakao_base_url(),
        }
    }
}

fn default_provider_kind() -> String {
    "sample".to_string()
}

fn default_kakao_base_url() -> String {
    "https://dapi.kakao.com".to_string()
}
