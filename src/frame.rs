//! # 载荷分帧模块
//!
//! 构建与解析 "嵌入头 + 载荷" 位流。嵌入头布局固定 (64 字节)：
//!
//! | 字段   | 宽度 | 内容                               |
//! |--------|------|------------------------------------|
//! | marker | 8    | `LSBHIDE` + 格式版本               |
//! | length | 8    | 载荷字节数，`u64` 大端序           |
//! | ext    | 16   | 原始扩展名，NUL 填充               |
//! | tag    | 32   | 未掩码载荷的完整性标签             |
//!
//! 每个字节按最低位在前的顺序展开为位。

use crate::constants::{
    EXTENSION_FIELD_LEN, FORMAT_VERSION, HEADER_BITS, HEADER_BYTES, LENGTH_FIELD_LEN, MAGIC,
    MARKER_LEN, MAX_EXTENSION_LEN, TAG_LEN,
};
use crate::error::{Result, StegoError};

const LENGTH_AT: usize = MARKER_LEN;
const EXTENSION_AT: usize = LENGTH_AT + LENGTH_FIELD_LEN;
const TAG_AT: usize = EXTENSION_AT + EXTENSION_FIELD_LEN;

/// 固定位置的嵌入头，不需要密码即可读取。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedHeader {
    pub length: u64,
    pub extension: String,
    pub tag: [u8; TAG_LEN],
}

/// 将扩展名编码为定宽字段。过长的扩展名直接拒绝，而不是截断。
pub fn extension_field(extension: &str) -> Result<[u8; EXTENSION_FIELD_LEN]> {
    let bytes = extension.as_bytes();
    if bytes.len() > MAX_EXTENSION_LEN {
        return Err(StegoError::invalid("extension too long"));
    }
    if bytes.contains(&0) {
        return Err(StegoError::invalid("extension must not contain NUL bytes"));
    }
    let mut field = [0u8; EXTENSION_FIELD_LEN];
    field[..bytes.len()].copy_from_slice(bytes);
    Ok(field)
}

fn parse_extension(field: &[u8]) -> Result<String> {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    if end > MAX_EXTENSION_LEN || field[end..].iter().any(|&b| b != 0) {
        return Err(StegoError::corrupted("malformed extension field"));
    }
    String::from_utf8(field[..end].to_vec())
        .map_err(|_| StegoError::corrupted("extension is not valid UTF-8"))
}

impl EmbeddedHeader {
    pub fn new(length: u64, extension: &str, tag: [u8; TAG_LEN]) -> Result<Self> {
        extension_field(extension)?;
        Ok(Self {
            length,
            extension: extension.to_owned(),
            tag,
        })
    }

    pub fn to_bytes(&self) -> Result<[u8; HEADER_BYTES]> {
        let mut buffer = [0u8; HEADER_BYTES];
        buffer[..MAGIC.len()].copy_from_slice(&MAGIC);
        buffer[MAGIC.len()] = FORMAT_VERSION;
        buffer[LENGTH_AT..EXTENSION_AT].copy_from_slice(&self.length.to_be_bytes());
        buffer[EXTENSION_AT..TAG_AT].copy_from_slice(&extension_field(&self.extension)?);
        buffer[TAG_AT..].copy_from_slice(&self.tag);
        Ok(buffer)
    }

    /// 解析嵌入头。
    ///
    /// # Errors
    ///
    /// * 标识不匹配：`Format("no hidden data detected")`。
    /// * 版本不同：`Format("unsupported embedding version")`。
    /// * 扩展名字段非法：`CorruptedData`。
    pub fn from_bytes(data: &[u8; HEADER_BYTES]) -> Result<Self> {
        if data[..MAGIC.len()] != MAGIC {
            return Err(StegoError::format("no hidden data detected"));
        }
        if data[MAGIC.len()] != FORMAT_VERSION {
            return Err(StegoError::format("unsupported embedding version"));
        }

        let mut length = [0u8; LENGTH_FIELD_LEN];
        length.copy_from_slice(&data[LENGTH_AT..EXTENSION_AT]);
        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(&data[TAG_AT..]);

        Ok(Self {
            length: u64::from_be_bytes(length),
            extension: parse_extension(&data[EXTENSION_AT..TAG_AT])?,
            tag,
        })
    }
}

/// 将字节展开为位，每字节最低位在前。
pub fn to_bits(bytes: &[u8]) -> Vec<u8> {
    bytes
        .iter()
        .flat_map(|&byte| (0..8).map(move |i| (byte >> i) & 1))
        .collect()
}

/// `to_bits` 的逆操作。位数不足 8 的末尾部分被忽略。
pub fn from_bits(bits: &[u8]) -> Vec<u8> {
    bits.chunks_exact(8)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .fold(0u8, |acc, (i, &bit)| acc | ((bit & 1) << i))
        })
        .collect()
}

/// 构建 "嵌入头位 ++ 载荷位"。`payload` 此时应已完成掩码。
pub fn frame(header: &EmbeddedHeader, payload: &[u8]) -> Result<Vec<u8>> {
    let mut bits = to_bits(&header.to_bytes()?);
    bits.extend(to_bits(payload));
    Ok(bits)
}

/// 拆分位流，返回嵌入头与剩余的载荷位。
pub fn unframe(bits: &[u8]) -> Result<(EmbeddedHeader, &[u8])> {
    if bits.len() < HEADER_BITS {
        return Err(StegoError::format("no hidden data detected"));
    }
    let mut header = [0u8; HEADER_BYTES];
    header.copy_from_slice(&from_bits(&bits[..HEADER_BITS]));
    Ok((EmbeddedHeader::from_bytes(&header)?, &bits[HEADER_BITS..]))
}
