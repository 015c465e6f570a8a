//! Configuration loading and parsing

use anyhow::{Context, Result};
use secs_log_decoder::{DecoderConfig, KpiConfig, ReferenceTables};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration (loaded from config.toml)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub input: InputConfig,
    #[serde(default)]
    pub decoder: DecoderConfig,
    #[serde(default)]
    pub kpi: KpiConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InputConfig {
    pub files: Vec<PathBuf>,
    /// Site tables merged over the built-in loadport tables
    pub tables: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    /// Write `<stem>_report.<ext>` files here instead of stdout
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Txt,
    Json,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Txt => "txt",
            OutputFormat::Json => "json",
        }
    }
}

/// Reference tables file; integer-keyed sections carry their keys as strings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TablesFile {
    #[serde(default)]
    pub event_codes: BTreeMap<String, String>,
    #[serde(default)]
    pub alarms: BTreeMap<String, String>,
    #[serde(default)]
    pub status_variables: BTreeMap<String, String>,
    #[serde(default)]
    pub commands: BTreeMap<String, String>,
    #[serde(default)]
    pub messages: BTreeMap<String, String>,
    #[serde(default)]
    pub port_states: BTreeMap<String, String>,
    #[serde(default)]
    pub result_codes: BTreeMap<String, String>,
}

impl TablesFile {
    /// Convert into library tables, rejecting non-integer codes
    pub fn into_tables(self) -> Result<ReferenceTables> {
        let mut tables = ReferenceTables::new();
        tables.event_codes.extend(parse_codes("event_codes", self.event_codes)?);
        tables.alarms.extend(parse_codes("alarms", self.alarms)?);
        tables
            .status_variables
            .extend(parse_codes("status_variables", self.status_variables)?);
        tables.commands.extend(self.commands);
        tables.messages.extend(self.messages);
        tables.port_states.extend(self.port_states);
        tables.result_codes.extend(self.result_codes);
        Ok(tables)
    }
}

fn parse_codes(section: &str, entries: BTreeMap<String, String>) -> Result<Vec<(u32, String)>> {
    entries
        .into_iter()
        .map(|(key, value)| {
            let code = key
                .trim()
                .parse::<u32>()
                .with_context(|| format!("Invalid code {:?} in [{}]", key, section))?;
            Ok((code, value))
        })
        .collect()
}

/// Load configuration from a TOML file
///
/// Relative input paths are resolved against the config file's directory.
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    if let Some(base) = path.parent() {
        config.input.files = config.input.files.iter().map(|f| resolve(base, f)).collect();
        config.input.tables = config.input.tables.as_deref().map(|t| resolve(base, t));
        config.output.output_dir = config.output.output_dir.as_deref().map(|d| resolve(base, d));
    }

    config
        .decoder
        .validate()
        .with_context(|| format!("Invalid [decoder] section in {:?}", path))?;

    Ok(config)
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Load a tables file and merge it over the built-in loadport tables
pub fn load_tables(path: &Path) -> Result<ReferenceTables> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read tables file: {:?}", path))?;

    let file: TablesFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse tables file: {:?}", path))?;

    let site = file
        .into_tables()
        .with_context(|| format!("Invalid tables file: {:?}", path))?;
    site.validate()
        .with_context(|| format!("Invalid tables file: {:?}", path))?;

    log::debug!(
        "Loaded {} event codes, {} commands from {:?}",
        site.event_codes.len(),
        site.commands.len(),
        path
    );

    let mut tables = ReferenceTables::loadport();
    tables.merge(site);
    Ok(tables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_config_deserialization() {
        let toml_content = r#"
            [input]
            files = ["AOP101ULD.txt"]

            [decoder]
            send_marker = "Host:Send"

            [kpi]
            cycle_start_code = 200

            [output]
            format = "json"
        "#;

        let config: AppConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.input.files.len(), 1);
        assert!(config.input.tables.is_none());
        assert_eq!(config.decoder.send_marker, "Host:Send");
        assert_eq!(config.decoder.receive_marker, "Core:Receive");
        assert_eq!(config.kpi.cycle_start_code, 200);
        assert_eq!(config.kpi.cycle_end_code, 132);
        assert_eq!(config.output.format, OutputFormat::Json);
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: AppConfig = toml::from_str("[input]\nfiles = []\n").unwrap();
        assert_eq!(config.decoder, DecoderConfig::default());
        assert_eq!(config.kpi, KpiConfig::default());
        assert_eq!(config.output.format, OutputFormat::Txt);
        assert!(config.output.output_dir.is_none());
    }

    #[test]
    fn test_load_config_resolves_relative_paths() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[input]\nfiles = [\"logs/a.txt\"]\ntables = \"site.toml\"\n\n[output]\noutput_dir = \"reports\"\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.input.files, vec![dir.path().join("logs/a.txt")]);
        assert_eq!(config.input.tables, Some(dir.path().join("site.toml")));
        assert_eq!(config.output.output_dir, Some(dir.path().join("reports")));
    }

    #[test]
    fn test_load_config_rejects_bad_markers() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[input]\nfiles = []\n\n[decoder]\nsend_marker = \"Core:Receive\"").unwrap();
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("[decoder]"));
    }

    #[test]
    fn test_load_tables_merges_over_builtin() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[event_codes]
"4242" = "VendorSpecific"
"141" = "PortStateChanged"

[commands]
RECALIBRATE = "Recalibrate the mapping sensor."
"#
        )
        .unwrap();

        let tables = load_tables(file.path()).unwrap();
        assert_eq!(tables.event_name(4242), Some("VendorSpecific"));
        assert_eq!(tables.event_name(141), Some("PortStateChanged"));
        assert_eq!(tables.event_name(181), Some("MagazineDocked"));
        assert!(tables.command_description("RECALIBRATE").is_some());
    }

    #[test]
    fn test_load_tables_rejects_non_integer_code() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[alarms]\nALM1 = \"Door open\"").unwrap();
        let err = load_tables(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("Invalid code \"ALM1\" in [alarms]"));
    }

    #[test]
    fn test_output_format_extension() {
        assert_eq!(OutputFormat::Txt.extension(), "txt");
        assert_eq!(OutputFormat::Json.extension(), "json");
    }
}
