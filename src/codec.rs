//! # 编解码编排模块
//!
//! 把位图容器、密钥派生、容量规划、分帧与位嵌入组合为两个入口：`encode` 与 `decode`。
//! 两者都只操作调用方提供的内存缓冲区，不访问文件系统，不保留任何跨调用状态。
//! 编码在工作副本上进行，只有全部成功才返回结果。

use crate::bitmap::BitmapImage;
use crate::capacity::{self, CapacityReport};
use crate::constants::HEADER_BITS;
use crate::error::{Result, StegoError};
use crate::frame::{self, EmbeddedHeader};
use crate::keys::KeyMaterial;
use crate::steganography::{embed, extract, header_positions, mask, payload_positions};
use subtle::ConstantTimeEq;

/// 解码得到的秘密文件。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedSecret {
    pub payload: Vec<u8>,
    pub extension: String,
}

/// 无需密码即可获得的载体信息。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inspection {
    pub capacity: CapacityReport,
    /// 检测到嵌入标识时为 `Some`。
    pub hidden: Option<EmbeddedHeader>,
}

/// 将 `secret` 隐藏到 `carrier` 中，返回新的 BMP 文件字节。
///
/// # Errors
///
/// * `InvalidArgument`：载体为空、密码为空或扩展名过长。
/// * `Format`：载体不是未压缩的 24 位 BMP。
/// * `Capacity`：载体容量不足。此时不会发生任何写入。
pub fn encode(carrier: &[u8], secret: &[u8], extension: &str, password: &str) -> Result<Vec<u8>> {
    let mut image = BitmapImage::parse(carrier)?;
    let keys = KeyMaterial::derive(password)?;

    let extension_field = frame::extension_field(extension)?;
    let length = secret.len() as u64;
    let tag = keys.tag(length, &extension_field, secret);
    let header = EmbeddedHeader::new(length, extension, tag)?;

    let total_slots = image.color_byte_count();
    let payload_bits = capacity::payload_bits(secret.len()).ok_or(StegoError::Capacity {
        needed: usize::MAX,
        available: total_slots,
    })?;
    capacity::plan(total_slots, HEADER_BITS, payload_bits)?;

    let mut masked = secret.to_vec();
    let keystream = keys.keystream(masked.len());
    mask(&mut masked, &keystream);

    let bits = frame::frame(&header, &masked)?;
    let (header_bits, body_bits) = bits.split_at(HEADER_BITS);
    embed(&mut image, &header_positions(), header_bits)?;
    embed(
        &mut image,
        &payload_positions(&keys, total_slots, payload_bits),
        body_bits,
    )?;

    log::info!(
        "embedded {} bytes (.{}) into {}x{} carrier",
        secret.len(),
        extension,
        image.width(),
        image.height()
    );
    Ok(image.to_bytes())
}

fn read_header(image: &BitmapImage) -> Result<EmbeddedHeader> {
    if image.color_byte_count() < HEADER_BITS {
        return Err(StegoError::format("no hidden data detected"));
    }
    let bits = extract(image, &header_positions(), HEADER_BITS)?;
    let (header, _) = frame::unframe(&bits)?;
    Ok(header)
}

/// 使用密码从 `carrier` 中恢复秘密文件。
///
/// # Errors
///
/// * `Format`：载体不受支持，或没有检测到嵌入标识 (与密码无关)。
/// * `CorruptedData`：嵌入头声明的长度超出剩余容量。
/// * `Authentication`：密码错误或载体被篡改。
pub fn decode(carrier: &[u8], password: &str) -> Result<DecodedSecret> {
    let image = BitmapImage::parse(carrier)?;
    let keys = KeyMaterial::derive(password)?;
    let header = read_header(&image)?;

    let total_slots = image.color_byte_count();
    let payload_bits = usize::try_from(header.length)
        .ok()
        .and_then(capacity::payload_bits)
        .filter(|&bits| bits <= total_slots - HEADER_BITS)
        .ok_or_else(|| {
            StegoError::corrupted("declared payload length exceeds carrier capacity")
        })?;

    let bits = extract(
        &image,
        &payload_positions(&keys, total_slots, payload_bits),
        payload_bits,
    )?;
    let mut payload = frame::from_bits(&bits);
    let keystream = keys.keystream(payload.len());
    mask(&mut payload, &keystream);

    let extension_field = frame::extension_field(&header.extension)?;
    let tag = keys.tag(header.length, &extension_field, &payload);
    if tag[..].ct_eq(&header.tag[..]).unwrap_u8() != 1 {
        log::warn!("integrity tag mismatch on {} byte payload", payload.len());
        return Err(StegoError::Authentication);
    }

    log::info!(
        "recovered {} bytes (.{}) from {}x{} carrier",
        payload.len(),
        header.extension,
        image.width(),
        image.height()
    );
    Ok(DecodedSecret {
        payload,
        extension: header.extension,
    })
}

/// 检查载体的容量以及是否带有嵌入头，不需要密码。
pub fn inspect(carrier: &[u8]) -> Result<Inspection> {
    let image = BitmapImage::parse(carrier)?;
    let hidden = match read_header(&image) {
        Ok(header) => Some(header),
        Err(StegoError::Format(_)) => None,
        Err(e) => return Err(e),
    };
    Ok(Inspection {
        capacity: CapacityReport::for_image(&image),
        hidden,
    })
}
