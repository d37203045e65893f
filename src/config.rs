use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

static POPULATION_URL: &str =
    "https://pxdata.stat.fi/PxWeb/api/v1/fi/StatFin/vaerak/statfin_vaerak_pxt_11ra.px";
static EMPLOYMENT_URL: &str =
    "https://pxdata.stat.fi/PxWeb/api/v1/fi/StatFin/tyokay/statfin_tyokay_pxt_115b.px";

/// Locale used for number formatting in the rendered table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    Fi,
    En,
}

/// How high/low rate rows are visually marked: colors written directly into
/// `style` attributes, or CSS classes resolved by the page stylesheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Highlight {
    InlineColor,
    CssClass,
}

/// Run configuration. Every field has a default matching the StatFin setup,
/// so an absent or partial YAML file still yields a runnable config.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub population_url: Url,
    pub employment_url: Url,
    pub population_query: PathBuf,
    pub employment_query: PathBuf,
    pub out_path: PathBuf,
    pub locale: Locale,
    pub highlight: Highlight,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            population_url: Url::parse(POPULATION_URL).expect("static URL should be valid"),
            employment_url: Url::parse(EMPLOYMENT_URL).expect("static URL should be valid"),
            population_query: PathBuf::from("queries/population_query.json"),
            employment_query: PathBuf::from("queries/employment_query.json"),
            out_path: PathBuf::from("regions.html"),
            locale: Locale::Fi,
            highlight: Highlight::InlineColor,
        }
    }
}

impl Config {
    /// Load config from a YAML file. A missing file is not an error; it means
    /// all defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let cfg = serde_yaml::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn missing_file_yields_defaults() -> Result<()> {
        let cfg = Config::load(Path::new("does/not/exist.yaml"))?;
        assert_eq!(cfg.locale, Locale::Fi);
        assert_eq!(cfg.highlight, Highlight::InlineColor);
        assert_eq!(cfg.out_path, PathBuf::from("regions.html"));
        assert!(cfg.population_url.as_str().contains("statfin_vaerak"));
        Ok(())
    }

    #[test]
    fn partial_yaml_overrides_only_named_fields() -> Result<()> {
        let mut f = NamedTempFile::new()?;
        writeln!(f, "locale: en")?;
        writeln!(f, "highlight: css-class")?;
        writeln!(f, "out_path: out/table.html")?;
        let cfg = Config::load(f.path())?;
        assert_eq!(cfg.locale, Locale::En);
        assert_eq!(cfg.highlight, Highlight::CssClass);
        assert_eq!(cfg.out_path, PathBuf::from("out/table.html"));
        // untouched fields keep defaults
        assert!(cfg.employment_url.as_str().contains("statfin_tyokay"));
        Ok(())
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(f, "locale: en").unwrap();
        writeln!(f, "retries: 3").unwrap();
        assert!(Config::load(f.path()).is_err());
    }
}
