//! Configuration settings for Agn.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub agent: AgentSettings,
    pub classifier: ClassifierSettings,
    pub translation: TranslationSettings,
    pub mail: MailSettings,
    pub export: ExportSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.agn".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Agent loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    /// Chat model driving the tool-calling loop.
    pub model: String,
    /// Maximum tool-calling iterations before the run is aborted.
    pub max_iterations: usize,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            max_iterations: 15,
        }
    }
}

/// Phishing classifier settings.
///
/// Two independently trained models back the comparison tool; each declares
/// which output label means "phishing" since the models disagree on naming.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierSettings {
    /// Primary classification model id.
    pub primary_model: String,
    /// Label the primary model emits for phishing.
    pub primary_phishing_label: String,
    /// Secondary classification model id.
    pub secondary_model: String,
    /// Label the secondary model emits for phishing.
    pub secondary_phishing_label: String,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            primary_model: "ealvaradob/bert-finetuned-phishing".to_string(),
            primary_phishing_label: "phishing".to_string(),
            secondary_model: "ElSlay/BERT-Phishing-Email-Model".to_string(),
            secondary_phishing_label: "LABEL_1".to_string(),
        }
    }
}

/// Spanish-to-English translation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationSettings {
    /// Sequence-to-sequence translation model id.
    pub model: String,
    /// Beam width for decoding.
    pub beam_width: u32,
    /// Maximum output length in tokens.
    pub max_length: u32,
}

impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            model: "Helsinki-NLP/opus-mt-es-en".to_string(),
            beam_width: 4,
            max_length: 512,
        }
    }
}

/// Mailbox settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailSettings {
    /// Default search query when none is given.
    pub default_query: String,
    /// Default result cap for searches.
    pub default_max_results: u32,
}

impl Default for MailSettings {
    fn default() -> Self {
        Self {
            default_query: "in:inbox".to_string(),
            default_max_results: 3,
        }
    }
}

/// Bulk HTML export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Directory where exported HTML files are written.
    pub output_dir: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            output_dir: "~/.agn/exported_html".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::AgnError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("agn")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded HTML export directory path.
    pub fn export_dir(&self) -> PathBuf {
        Self::expand_path(&self.export.output_dir)
    }
}
