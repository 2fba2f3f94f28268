use std::path::Path;

use anyhow::Context;

/// Board settings for a game.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub height: usize,
    pub width: usize,
    pub mines: usize,
    /// Seed for mine placement and guesses. Random when absent.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            height: 8,
            width: 8,
            mines: 8,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Reads a TOML file. Missing keys fall back to the defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: GameConfig = toml::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.height == 0 || self.width == 0 {
            anyhow::bail!(
                "board dimensions must be non-zero, got {}x{}",
                self.height,
                self.width
            );
        }
        if self.mines >= self.height * self.width {
            anyhow::bail!(
                "{} mines do not fit on a {}x{} board",
                self.mines,
                self.height,
                self.width
            );
        }
        Ok(())
    }
}
