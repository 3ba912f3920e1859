//! # 调用边界结果模块
//!
//! 为外层调用方 (命令行、网页外壳等) 提供与语言无关的结果结构：
//! `success` 标志、可原样展示的 `message`，以及成功时的输出缓冲区。

use crate::codec::{self, DecodedSecret};
use crate::error::Result;

/// `encode` 的边界结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeReport {
    pub success: bool,
    pub message: String,
    pub output_bytes: Option<Vec<u8>>,
}

/// `decode` 的边界结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeReport {
    pub success: bool,
    pub message: String,
    pub payload_bytes: Option<Vec<u8>>,
    pub payload_extension: Option<String>,
}

impl From<Result<Vec<u8>>> for EncodeReport {
    fn from(result: Result<Vec<u8>>) -> Self {
        match result {
            Ok(bytes) => Self {
                success: true,
                message: "Encoding successful.".to_owned(),
                output_bytes: Some(bytes),
            },
            Err(e) => Self {
                success: false,
                message: e.to_string(),
                output_bytes: None,
            },
        }
    }
}

impl From<Result<DecodedSecret>> for DecodeReport {
    fn from(result: Result<DecodedSecret>) -> Self {
        match result {
            Ok(secret) => Self {
                success: true,
                message: "Decoding successful.".to_owned(),
                payload_bytes: Some(secret.payload),
                payload_extension: Some(secret.extension),
            },
            Err(e) => Self {
                success: false,
                message: e.to_string(),
                payload_bytes: None,
                payload_extension: None,
            },
        }
    }
}

/// 边界版 `encode`：错误以 `success == false` 与消息的形式返回。
pub fn encode(
    carrier_bytes: &[u8],
    secret_bytes: &[u8],
    secret_extension: &str,
    password: &str,
) -> EncodeReport {
    codec::encode(carrier_bytes, secret_bytes, secret_extension, password).into()
}

/// 边界版 `decode`。
pub fn decode(carrier_bytes: &[u8], password: &str) -> DecodeReport {
    codec::decode(carrier_bytes, password).into()
}
