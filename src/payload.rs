//! # 负载描述模块
//!
//! 秘密文件的扩展名随负载一起隐写，解码时用于识别恢复出的文件类型。

use crate::constants::MAX_EXTENSION_LEN;
use std::fmt;
use std::path::Path;

/// 经过校验的文件扩展名，形如 `.txt`。
///
/// 必须以 '.' 开头，总长度 2..=[`MAX_EXTENSION_LEN`] 字节，且只包含可见 ASCII 字符。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension(String);

impl Extension {
    /// 校验原始字节，失败时返回描述原因的字符串，由调用方决定映射成哪种错误。
    pub fn parse(raw: &[u8]) -> Result<Self, String> {
        if raw.len() < 2 || raw.len() > MAX_EXTENSION_LEN {
            return Err(format!(
                "length {} is outside 2..={}",
                raw.len(),
                MAX_EXTENSION_LEN
            ));
        }
        if raw[0] != b'.' {
            return Err("it does not start with '.'".to_string());
        }
        if !raw[1..].iter().all(|b| b.is_ascii_graphic() && *b != b'.') {
            return Err(format!(
                "'{}' contains characters outside printable ASCII",
                String::from_utf8_lossy(raw)
            ));
        }
        // 上面已保证是 ASCII
        Ok(Self(String::from_utf8_lossy(raw).into_owned()))
    }

    /// 从秘密文件的路径中取出扩展名。
    pub fn from_path(path: &Path) -> Result<Self, String> {
        let ext = path
            .extension()
            .ok_or_else(|| format!("'{}' has no file extension", path.display()))?;
        let ext = ext
            .to_str()
            .ok_or_else(|| format!("extension of '{}' is not valid UTF-8", path.display()))?;
        Self::parse(format!(".{ext}").as_bytes())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
