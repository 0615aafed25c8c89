use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{ProbeError, ProbeResult};

/// 分代堆配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeapConfig {
    /// 新生代配置
    pub young: YoungGenConfig,
    /// 老生代配置
    pub old: OldGenConfig,
    /// 直接在老生代分配的对象大小下限（字节）
    ///
    /// `None` 时只有超过整个 Eden 区的对象才直接进入老生代
    pub pretenure_threshold: Option<usize>,
}

/// 新生代配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct YoungGenConfig {
    /// Eden 区大小（字节）
    pub eden_size: usize,
}

/// 老生代配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OldGenConfig {
    /// 老生代大小（字节）
    pub old_gen_size: usize,
}

impl Default for HeapConfig {
    fn default() -> Self {
        Self {
            young: YoungGenConfig::default(),
            old: OldGenConfig::default(),
            pretenure_threshold: None,
        }
    }
}

impl Default for YoungGenConfig {
    fn default() -> Self {
        Self {
            eden_size: 8 * 1024 * 1024,
        }
    }
}

impl Default for OldGenConfig {
    fn default() -> Self {
        Self {
            old_gen_size: 64 * 1024 * 1024,
        }
    }
}

impl HeapConfig {
    /// 从 TOML 文本解析配置
    pub fn from_toml_str(text: &str) -> ProbeResult<Self> {
        let config: Self = toml::from_str(text)
            .map_err(|e| ProbeError::invalid_config(format!("heap config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// 从 TOML 文件加载配置
    pub fn from_file(path: &Path) -> ProbeResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// 检查配置是否有效
    pub fn validate(&self) -> ProbeResult<()> {
        if self.young.eden_size == 0 {
            return Err(ProbeError::invalid_config("eden size must be positive"));
        }
        if self.old.old_gen_size == 0 {
            return Err(ProbeError::invalid_config("old generation size must be positive"));
        }
        if self.pretenure_threshold == Some(0) {
            return Err(ProbeError::invalid_config(
                "pretenure threshold must be positive",
            ));
        }
        Ok(())
    }
}
