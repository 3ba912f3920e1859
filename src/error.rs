//! # 错误类型模块
//!
//! 隐写编解码器的全部错误都以值的形式返回，绝不会终止宿主进程。

use thiserror::Error;

/// 编解码过程中可能出现的错误。
///
/// `Display` 输出即是呈现给用户的消息，外层调用方应原样展示。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StegoError {
    /// 载体格式不受支持或已损坏，或者解码时未找到嵌入标识。
    #[error("{0}")]
    Format(String),

    /// 载体容量不足以容纳嵌入头和载荷。
    #[error("carrier too small: need {needed} bits, have {available}")]
    Capacity { needed: usize, available: usize },

    /// 空密码、过长扩展名、空载体等参数错误。
    #[error("{0}")]
    InvalidArgument(String),

    /// 密码错误或载体被篡改。两者刻意不加区分。
    #[error("wrong password or corrupted image")]
    Authentication,

    /// 嵌入头结构不一致，例如声明的长度超出剩余容量。
    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

impl StegoError {
    pub(crate) fn format(msg: impl Into<String>) -> Self {
        StegoError::Format(msg.into())
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        StegoError::InvalidArgument(msg.into())
    }

    pub(crate) fn corrupted(msg: impl Into<String>) -> Self {
        StegoError::CorruptedData(msg.into())
    }
}

pub type Result<T, E = StegoError> = std::result::Result<T, E>;
