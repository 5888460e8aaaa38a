use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::auth::AuthorizationContext;
use crate::inputs::{ClientMarginPolicy, GlobalParameters};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub globals: GlobalsConfig,
    #[serde(default)]
    pub policy_defaults: PolicyDefaultsConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalsConfig {
    #[serde(default = "default_employer_rate")]
    pub employer_rate_pct: f64,
    #[serde(default)]
    pub indirect_costs_annual: f64,
    #[serde(default = "default_billable_hours")]
    pub billable_hours_per_year: u32,
    #[serde(default = "default_workday_hours")]
    pub workday_hours: f64,
    #[serde(default = "default_version")]
    pub version: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyDefaultsConfig {
    #[serde(default = "default_target_margin")]
    pub target_margin_pct: f64,
    #[serde(default = "default_min_margin")]
    pub min_margin_pct: f64,
    #[serde(default)]
    pub discount_pct: f64,
    #[serde(default)]
    pub forced_vacation_days: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_sweep_step")]
    pub sweep_step: f64,
    #[serde(default = "default_max_sweep_rungs")]
    pub max_sweep_rungs: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default)]
    pub business_units: Vec<String>,
}

// CLI flags that take precedence over the config file for one run.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub employer_rate_pct: Option<f64>,
    pub indirect_costs_annual: Option<f64>,
    pub billable_hours_per_year: Option<u32>,
    pub target_margin_pct: Option<f64>,
    pub min_margin_pct: Option<f64>,
    pub discount_pct: Option<f64>,
    pub forced_vacation_days: Option<f64>,
}

impl Config {
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config/margin-oracle/config.toml")
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
        if let Some(v) = overrides.employer_rate_pct {
            self.globals.employer_rate_pct = v;
        }
        if let Some(v) = overrides.indirect_costs_annual {
            self.globals.indirect_costs_annual = v;
        }
        if let Some(v) = overrides.billable_hours_per_year {
            self.globals.billable_hours_per_year = v;
        }
        if let Some(v) = overrides.target_margin_pct {
            self.policy_defaults.target_margin_pct = v;
        }
        if let Some(v) = overrides.min_margin_pct {
            self.policy_defaults.min_margin_pct = v;
        }
        if let Some(v) = overrides.discount_pct {
            self.policy_defaults.discount_pct = v;
        }
        if let Some(v) = overrides.forced_vacation_days {
            self.policy_defaults.forced_vacation_days = v;
        }
    }

    // One immutable parameter record per run; the resolver never reaches
    // back into the config.
    pub fn global_parameters(&self) -> GlobalParameters {
        GlobalParameters {
            employer_rate_pct: self.globals.employer_rate_pct,
            indirect_costs_annual: self.globals.indirect_costs_annual,
            billable_hours_per_year: self.globals.billable_hours_per_year,
            workday_hours: self.globals.workday_hours,
            version: self.globals.version,
        }
    }

    pub fn default_policy(&self) -> ClientMarginPolicy {
        ClientMarginPolicy {
            target_margin_pct: self.policy_defaults.target_margin_pct,
            min_margin_pct: self.policy_defaults.min_margin_pct,
            discount_pct: self.policy_defaults.discount_pct,
            forced_vacation_days: self.policy_defaults.forced_vacation_days,
        }
    }

    pub fn authorization_context(&self) -> AuthorizationContext {
        let role = self.auth.role.trim().to_ascii_lowercase();
        AuthorizationContext {
            is_admin: role == "admin",
            is_cfo: role == "cfo",
            business_unit_codes: self.auth.business_units.iter().cloned().collect(),
        }
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
        let template = r#"[globals]
employer_rate_pct = 45.0
indirect_costs_annual = 0.0
billable_hours_per_year = 1600
workday_hours = 8.0
version = 1

[policy_defaults]
target_margin_pct = 30.0
min_margin_pct = 20.0
discount_pct = 0.0
forced_vacation_days = 0.0

[auth]
role = "member"
business_units = []

[analysis]
sweep_step = 5.0
max_sweep_rungs = 10000
"#;
        template.to_string()
    }
}

impl Default for GlobalsConfig {
    fn default() -> Self {
        Self {
            employer_rate_pct: default_employer_rate(),
            indirect_costs_annual: 0.0,
            billable_hours_per_year: default_billable_hours(),
            workday_hours: default_workday_hours(),
            version: default_version(),
        }
    }
}

impl Default for PolicyDefaultsConfig {
    fn default() -> Self {
        Self {
            target_margin_pct: default_target_margin(),
            min_margin_pct: default_min_margin(),
            discount_pct: 0.0,
            forced_vacation_days: 0.0,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sweep_step: default_sweep_step(),
            max_sweep_rungs: default_max_sweep_rungs(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            role: default_role(),
            business_units: Vec::new(),
        }
    }
}

fn default_employer_rate() -> f64 {
    45.0
}

fn default_billable_hours() -> u32 {
    1600
}

fn default_workday_hours() -> f64 {
    8.0
}

fn default_version() -> u32 {
    1
}

fn default_target_margin() -> f64 {
    30.0
}

fn default_min_margin() -> f64 {
    20.0
}

fn default_sweep_step() -> f64 {
    5.0
}

fn default_max_sweep_rungs() -> usize {
    10_000
}

fn default_role() -> String {
    "member".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_round_trips_through_toml() {
        let parsed: Config =
            toml::from_str(&Config::default_template()).expect("template must parse");
        assert_eq!(parsed.globals.billable_hours_per_year, 1600);
        assert_eq!(parsed.policy_defaults.target_margin_pct, 30.0);
        assert_eq!(parsed.auth.role, "member");
        assert_eq!(parsed.analysis.sweep_step, 5.0);
        assert_eq!(parsed.analysis.max_sweep_rungs, 10_000);
    }

    #[test]
    fn overrides_take_precedence() {
        let mut config = Config::default();
        config.apply_overrides(ConfigOverrides {
            discount_pct: Some(7.5),
            billable_hours_per_year: Some(1500),
            ..ConfigOverrides::default()
        });
        assert_eq!(config.policy_defaults.discount_pct, 7.5);
        assert_eq!(config.global_parameters().billable_hours_per_year, 1500);
    }

    #[test]
    fn role_resolves_authorization_context() {
        let mut config = Config::default();
        config.auth.role = "CFO".to_string();
        assert!(config.authorization_context().is_cfo);

        config.auth.role = "member".to_string();
        config.auth.business_units = vec!["NA-DELIVERY".to_string()];
        let ctx = config.authorization_context();
        assert!(!ctx.is_admin && !ctx.is_cfo);
        assert!(ctx.may_view(Some("NA-DELIVERY")));
    }
}
