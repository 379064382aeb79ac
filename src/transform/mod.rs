//! # XOR 变换
//!
//! 8 字节循环密钥的逐字节 XOR。变换自逆：同一密钥、同一偏移再做一次即还原，
//! 所以编码和解码是同一个操作。
//!
//! ## 密钥解析
//! 密钥以 16 个十六进制字符给出。解码结果不是恰好 8 字节时（非法字符、
//! 奇数长度、长度不对），宽松模式退化为全零密钥，变换变成原样复制，
//! 批处理照常进行而不是报错。这是有意保留的行为。
//!
//! ## 依赖关系
//! - 被 `batch/transformer.rs` 调用
//! - 使用 `hex` 解码密钥

use crate::error::{Result, XorBatchError};

use std::fmt;
use tracing::warn;

/// 密钥长度（字节）
pub const KEY_LEN: usize = 8;

/// 8 字节循环 XOR 密钥
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct XorKey([u8; KEY_LEN]);

impl XorKey {
    /// 全零密钥（变换为原样复制）
    pub const ZERO: XorKey = XorKey([0u8; KEY_LEN]);

    /// 严格解析十六进制密钥，必须恰好解码为 8 字节
    pub fn parse_hex(hex_str: &str) -> Result<Self> {
        let bytes = hex::decode(hex_str.trim()).map_err(|e| {
            XorBatchError::InvalidArgument(format!("invalid XOR key '{}': {}", hex_str, e))
        })?;
        let array: [u8; KEY_LEN] = bytes.as_slice().try_into().map_err(|_| {
            XorBatchError::InvalidArgument(format!(
                "XOR key must be {} bytes ({} hex chars), got {}",
                KEY_LEN,
                KEY_LEN * 2,
                bytes.len()
            ))
        })?;
        Ok(Self(array))
    }

    /// 宽松解析：任何解析失败都退化为全零密钥
    pub fn from_hex_lenient(hex_str: &str) -> Self {
        match Self::parse_hex(hex_str) {
            Ok(key) => key,
            Err(e) => {
                warn!("{}; falling back to zero key", e);
                Self::ZERO
            }
        }
    }

    pub fn bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; KEY_LEN]
    }

    /// 对 `buf` 原地做 XOR，`base_offset` 是 `buf[0]` 在整个文件流中的绝对偏移
    ///
    /// 偏移跨块累加，密钥相位在整个文件上保持连续，不会在每个块开头重置。
    pub fn apply(&self, buf: &mut [u8], base_offset: u64) {
        if self.is_zero() {
            return;
        }
        let phase = (base_offset % KEY_LEN as u64) as usize;
        for (i, byte) in buf.iter_mut().enumerate() {
            *byte ^= self.0[(phase + i) % KEY_LEN];
        }
    }
}

impl From<[u8; KEY_LEN]> for XorKey {
    fn from(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for XorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode_upper(self.bytes()))
    }
}
