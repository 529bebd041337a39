//! # 容量规划模块
//!
//! 计算图像可用的载体字节数以及一次隐写需要消耗的载体字节数，
//! 在写入任何数据之前决定操作能否进行。

use crate::constants::{BYTE_CARRIER_LEN, LENGTH_CARRIER_LEN, MAGIC_MARKER_LEN};
use crate::error::{Result, StegoError};

/// 标记字段消耗的载体字节数 (2 字节 × 8)。
pub const MAGIC_CARRIER_BYTES: u64 = (MAGIC_MARKER_LEN * BYTE_CARRIER_LEN) as u64;

/// 与负载内容无关的固定开销：标记 + 扩展名长度 + 负载长度。
pub const FIXED_OVERHEAD_BYTES: u64 = MAGIC_CARRIER_BYTES + 2 * LENGTH_CARRIER_LEN as u64;

/// 图像的载体容量：`width × height × bytes_per_pixel`。
pub fn image_capacity_bytes(width: u32, height: u32, bytes_per_pixel: u64) -> u64 {
    u64::from(width) * u64::from(height) * bytes_per_pixel
}

/// 一次隐写需要改写最低位的载体字节数。
///
/// 54 字节的 BMP 头部只被复制，不计入这里的预算。
/// 只有在结果超出 `u64` 时才返回 `None`。
pub fn required_capacity_bytes(extension_len: u64, payload_len: u64) -> Option<u64> {
    let per_byte = BYTE_CARRIER_LEN as u64;
    extension_len
        .checked_mul(per_byte)?
        .checked_add(payload_len.checked_mul(per_byte)?)?
        .checked_add(FIXED_OVERHEAD_BYTES)
}

pub fn has_capacity(image_capacity: u64, required: u64) -> bool {
    image_capacity >= required
}

/// 在给定扩展名长度下，图像最多能容纳的负载字节数。
pub fn max_payload_bytes(image_capacity: u64, extension_len: u64) -> u64 {
    let overhead =
        FIXED_OVERHEAD_BYTES.saturating_add(extension_len.saturating_mul(BYTE_CARRIER_LEN as u64));
    let max = image_capacity.saturating_sub(overhead) / BYTE_CARRIER_LEN as u64;
    max.min(u64::from(u32::MAX))
}

/// 单次编码尝试的容量评估结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityReport {
    pub available_bytes: u64,
    pub required_bytes: u64,
    pub sufficient: bool,
}

impl CapacityReport {
    /// 计算容量报告。负载长度必须能放进 32 位长度字段，否则视为容量不足。
    pub fn plan(image_capacity: u64, extension_len: usize, payload_len: u64) -> Self {
        let required = if payload_len > u64::from(u32::MAX) {
            None
        } else {
            required_capacity_bytes(extension_len as u64, payload_len)
        };

        match required {
            Some(required_bytes) => Self {
                available_bytes: image_capacity,
                required_bytes,
                sufficient: has_capacity(image_capacity, required_bytes),
            },
            None => Self {
                available_bytes: image_capacity,
                required_bytes: u64::MAX,
                sufficient: false,
            },
        }
    }

    /// 容量不足时转换为 [`StegoError::CapacityExceeded`]。
    pub fn ensure_sufficient(self) -> Result<Self> {
        if self.sufficient {
            Ok(self)
        } else {
            Err(StegoError::CapacityExceeded {
                required: self.required_bytes,
                available: self.available_bytes,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::BYTES_PER_PIXEL;

    #[test]
    fn capacity_of_hundred_by_hundred_image() {
        assert_eq!(image_capacity_bytes(100, 100, BYTES_PER_PIXEL), 30_000);
    }

    #[test]
    fn required_bytes_for_short_text_secret() {
        // 16 + 32 + 8 * 4 + 32 + 8 * 2
        assert_eq!(required_capacity_bytes(4, 2), Some(128));
        assert_eq!(required_capacity_bytes(4, 0), Some(112));
    }

    #[test]
    fn boundary_is_inclusive() {
        assert!(has_capacity(128, 128));
        assert!(!has_capacity(127, 128));

        assert!(CapacityReport::plan(128, 4, 2).sufficient);
        let report = CapacityReport::plan(127, 4, 2);
        assert!(!report.sufficient);
        assert!(matches!(
            report.ensure_sufficient(),
            Err(StegoError::CapacityExceeded { required: 128, available: 127 })
        ));
    }

    #[test]
    fn oversized_payload_is_a_capacity_failure() {
        let report = CapacityReport::plan(u64::MAX, 4, u64::from(u32::MAX) + 1);
        assert!(!report.sufficient);
        assert!(required_capacity_bytes(u64::MAX, 1).is_none());
    }

    #[test]
    fn max_payload_fills_the_image_exactly() {
        let capacity = image_capacity_bytes(4, 10, BYTES_PER_PIXEL);
        let max = max_payload_bytes(capacity, 4);
        assert_eq!(max, 1);
        assert!(CapacityReport::plan(capacity, 4, max).sufficient);
        assert!(!CapacityReport::plan(capacity, 4, max + 1).sufficient);
        assert_eq!(max_payload_bytes(10, 4), 0);
    }
}
