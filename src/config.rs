use std::fs;
use std::path::Path;
use serde::{Deserialize, Serialize};
use anyhow::{Result, Context};

/// Main configuration structure for vee
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Assistant behavior configuration
    #[serde(default)]
    pub assistant: AssistantConfig,

    /// Web search configuration
    #[serde(default)]
    pub search: SearchConfig,

    /// Voice dictation configuration
    #[serde(default)]
    pub dictation: DictationConfig,

    /// UI display configuration
    #[serde(default)]
    pub ui: UIConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Display name used for assistant bubbles
    #[serde(default = "default_assistant_name")]
    pub name: String,

    /// Lower bound of the simulated thinking delay, in milliseconds
    #[serde(default = "default_thinking_delay_min_ms")]
    pub thinking_delay_min_ms: u64,

    /// Upper bound of the simulated thinking delay, in milliseconds
    #[serde(default = "default_thinking_delay_max_ms")]
    pub thinking_delay_max_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Whether real web lookups are performed; the stub answers otherwise
    #[serde(default = "default_search_enabled")]
    pub enabled: bool,

    /// Instant-answer API endpoint
    #[serde(default = "default_search_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_search_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DictationConfig {
    /// Whether a dictation backend is available on this machine
    #[serde(default = "default_dictation_enabled")]
    pub enabled: bool,

    /// Utterances replayed by the scripted backend
    #[serde(default = "default_dictation_script")]
    pub script: Vec<String>,

    /// Delay between scripted words, in milliseconds
    #[serde(default = "default_dictation_word_delay_ms")]
    pub word_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UIConfig {
    /// Enable colorful output
    #[serde(default = "default_colorful")]
    pub colorful: bool,

    /// Show command suggestions on an empty transcript
    #[serde(default = "default_suggestions")]
    pub suggestions: bool,

    /// Show message timestamps
    #[serde(default = "default_timestamps")]
    pub timestamps: bool,
}

// Default value functions
fn default_assistant_name() -> String { "V".to_string() }
fn default_thinking_delay_min_ms() -> u64 { 1000 }
fn default_thinking_delay_max_ms() -> u64 { 3000 }
fn default_search_enabled() -> bool { true }
fn default_search_base_url() -> String { "https://api.duckduckgo.com/".to_string() }
fn default_search_timeout_secs() -> u64 { 10 }
fn default_dictation_enabled() -> bool { true }
fn default_dictation_script() -> Vec<String> {
    vec![
        "this is a scripted dictation demo".to_string(),
        "the transcript can be copied to the clipboard".to_string(),
    ]
}
fn default_dictation_word_delay_ms() -> u64 { 250 }
fn default_colorful() -> bool { true }
fn default_suggestions() -> bool { true }
fn default_timestamps() -> bool { true }

impl Default for AssistantConfig {
    fn default() -> Self {
        AssistantConfig {
            name: default_assistant_name(),
            thinking_delay_min_ms: default_thinking_delay_min_ms(),
            thinking_delay_max_ms: default_thinking_delay_max_ms(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            enabled: default_search_enabled(),
            base_url: default_search_base_url(),
            timeout_secs: default_search_timeout_secs(),
        }
    }
}

impl Default for DictationConfig {
    fn default() -> Self {
        DictationConfig {
            enabled: default_dictation_enabled(),
            script: default_dictation_script(),
            word_delay_ms: default_dictation_word_delay_ms(),
        }
    }
}

impl Default for UIConfig {
    fn default() -> Self {
        UIConfig {
            colorful: default_colorful(),
            suggestions: default_suggestions(),
            timestamps: default_timestamps(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            assistant: AssistantConfig::default(),
            search: SearchConfig::default(),
            dictation: DictationConfig::default(),
            ui: UIConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))
    }

    /// Load configuration from command line argument or default locations
    pub fn load(config_path: &Option<String>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::from_file(path);
        }

        // Try loading from default locations
        let default_paths = vec![
            "vee.toml",
            ".vee.toml",
            "~/.config/vee/config.toml",
        ];

        for path in default_paths {
            let expanded_path = shellexpand::tilde(path);
            if Path::new(expanded_path.as_ref()).exists() {
                match Self::from_file(expanded_path.as_ref()) {
                    Ok(config) => return Ok(config),
                    Err(e) => eprintln!("Warning: Failed to load config from {}: {}", path, e),
                }
            }
        }

        // Return default config if no file found
        Ok(Self::default())
    }

    /// Save configuration to a file
    #[allow(dead_code)]
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize configuration")?;

        fs::write(path.as_ref(), contents)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Merge with command-line arguments (CLI args take precedence)
    pub fn merge_with_args(&mut self, headless: bool, _verbose: bool) {
        if headless {
            self.ui.colorful = false;
            self.ui.suggestions = false;
            self.ui.timestamps = false;
        }
    }

    /// The thinking-delay bounds as a half-open range, already sanitized so
    /// a misconfigured max below min cannot panic the sampler.
    pub fn thinking_delay_ms(&self) -> std::ops::Range<u64> {
        let min = self.assistant.thinking_delay_min_ms;
        let max = self.assistant.thinking_delay_max_ms.max(min);
        min..max
    }
}
