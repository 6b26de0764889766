//! Configuration module for Agn.
//!
//! Handles loading and managing application settings.

mod settings;

pub use settings::{
    AgentSettings, ClassifierSettings, ExportSettings, GeneralSettings, MailSettings, Settings,
    TranslationSettings,
};
