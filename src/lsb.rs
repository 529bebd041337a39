//! # 最低有效位打包模块
//!
//! 将一个字节写入 8 个连续载体字节的最低位，或将一个 32 位长度写入 32 个载体字节的最低位，
//! 以及对应的逆操作。位序均为高位在前。这里的函数都是纯函数，不做任何 I/O。

use crate::constants::{BYTE_CARRIER_LEN, LENGTH_CARRIER_LEN};

/// 把 `value` 的低 `carrier.len()` 位按高位在前写入每个载体字节的最低位。
/// 载体字节的其余 7 位保持不变。
fn embed(value: u64, carrier: &mut [u8]) {
    let width = carrier.len();
    for (i, byte) in carrier.iter_mut().enumerate() {
        let bit = ((value >> (width - 1 - i)) & 0x1) as u8;
        *byte = (*byte & 0xFE) | bit;
    }
}

fn extract(carrier: &[u8]) -> u64 {
    carrier
        .iter()
        .fold(0, |acc, &byte| (acc << 1) | u64::from(byte & 0x1))
}

/// 把一个字节隐写到 8 个载体字节中。
pub fn pack_byte(value: u8, carrier: &mut [u8; BYTE_CARRIER_LEN]) {
    embed(u64::from(value), carrier);
}

/// 从 8 个载体字节中恢复一个字节，是 [`pack_byte`] 的逆操作。
pub fn unpack_byte(carrier: &[u8; BYTE_CARRIER_LEN]) -> u8 {
    extract(carrier) as u8
}

/// 把一个 32 位长度隐写到 32 个载体字节中。
pub fn pack_length(value: u32, carrier: &mut [u8; LENGTH_CARRIER_LEN]) {
    embed(u64::from(value), carrier);
}

/// 从 32 个载体字节中恢复长度，是 [`pack_length`] 的逆操作。
pub fn unpack_length(carrier: &[u8; LENGTH_CARRIER_LEN]) -> u32 {
    extract(carrier) as u32
}

/// 批量版本的 [`pack_byte`]：`data[i]` 写入 `carrier[8 * i..8 * i + 8]`。
///
/// # Panics
///
/// 当 `carrier.len() != data.len() * 8` 时 panic，调用方负责按负载长度准备载体窗口。
pub fn pack_bytes(data: &[u8], carrier: &mut [u8]) {
    assert_eq!(carrier.len(), data.len() * BYTE_CARRIER_LEN);
    data.iter()
        .zip(carrier.chunks_exact_mut(BYTE_CARRIER_LEN))
        .for_each(|(&value, window)| embed(u64::from(value), window));
}

/// 批量版本的 [`unpack_byte`]，结果写入 `out`。
///
/// # Panics
///
/// 当 `carrier.len() != out.len() * 8` 时 panic。
pub fn unpack_bytes(carrier: &[u8], out: &mut [u8]) {
    assert_eq!(carrier.len(), out.len() * BYTE_CARRIER_LEN);
    out.iter_mut()
        .zip(carrier.chunks_exact(BYTE_CARRIER_LEN))
        .for_each(|(value, window)| *value = extract(window) as u8);
}
