use serde::Deserialize;

use tether_core::error::{Result, TetherError};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    pub version: u32,

    #[serde(default)]
    pub engine: EngineSection,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(TetherError::InvalidArgument(format!(
                "unsupported config version {}",
                self.version
            )));
        }

        self.engine.validate()?;

        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            version: 1,
            engine: EngineSection::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineSection {
    /// Cap on simultaneously outstanding outbound requests.
    #[serde(default = "default_max_pending")]
    pub max_pending: usize,

    /// Queue depth of the bundled reply channel.
    #[serde(default = "default_reply_queue_depth")]
    pub reply_queue_depth: usize,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            max_pending: default_max_pending(),
            reply_queue_depth: default_reply_queue_depth(),
        }
    }
}

impl EngineSection {
    pub fn validate(&self) -> Result<()> {
        if !(1..=65536).contains(&self.max_pending) {
            return Err(TetherError::InvalidArgument(
                "engine.max_pending must be between 1 and 65536".into(),
            ));
        }
        if !(1..=65536).contains(&self.reply_queue_depth) {
            return Err(TetherError::InvalidArgument(
                "engine.reply_queue_depth must be between 1 and 65536".into(),
            ));
        }
        Ok(())
    }
}

fn default_max_pending() -> usize {
    256
}
fn default_reply_queue_depth() -> usize {
    1024
}
