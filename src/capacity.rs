//! # 容量规划模块
//!
//! 在任何写入发生之前检查载体能否容纳嵌入头与载荷。

use crate::bitmap::BitmapImage;
use crate::constants::HEADER_BITS;
use crate::error::{Result, StegoError};

/// 检查 `header_bits + payload_bits` 是否能放入 `image_capacity_bits` 个位槽。
///
/// 恰好填满是允许的。成功时返回载荷可用的位槽数 (不含嵌入头)。
pub fn plan(image_capacity_bits: usize, header_bits: usize, payload_bits: usize) -> Result<usize> {
    let needed = header_bits
        .checked_add(payload_bits)
        .ok_or(StegoError::Capacity {
            needed: usize::MAX,
            available: image_capacity_bits,
        })?;
    if needed > image_capacity_bits {
        return Err(StegoError::Capacity {
            needed,
            available: image_capacity_bits,
        });
    }
    log::debug!("capacity plan: {needed}/{image_capacity_bits} bits");
    Ok(image_capacity_bits - header_bits)
}

/// 载荷字节数对应的位数，溢出时返回 `None`。
pub fn payload_bits(len: usize) -> Option<usize> {
    len.checked_mul(8)
}

/// 一个载体的容量概览。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityReport {
    pub total_bits: usize,
    pub header_bits: usize,
    /// 扣除嵌入头后可容纳的最大载荷字节数。
    pub payload_bytes: usize,
}

impl CapacityReport {
    pub fn for_image(image: &BitmapImage) -> Self {
        let total_bits = image.color_byte_count();
        Self {
            total_bits,
            header_bits: HEADER_BITS,
            payload_bytes: total_bits.saturating_sub(HEADER_BITS) / 8,
        }
    }
}
