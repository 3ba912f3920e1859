//! # lsb_hide 库
//!
//! 本库包含基于密码的 LSB 隐写编解码器，以及包装它的命令行逻辑。
//! 编解码器 (`codec`) 只处理内存中的字节缓冲区；文件读写由 `handler` 负责。

// 声明库包含的所有模块。

pub mod bitmap;
pub mod capacity;
pub mod cli;
pub mod codec;
pub mod constants;
pub mod error;
pub mod frame;
pub mod handler;
pub mod keys;
pub mod report;
pub mod steganography;

pub use codec::{DecodedSecret, decode, encode};
pub use error::StegoError;
