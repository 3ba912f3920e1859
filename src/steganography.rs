use crate::bitmap::BitmapImage;
use crate::constants::HEADER_BITS;
use crate::error::{Result, StegoError};
use crate::keys::KeyMaterial;

fn check_region(image: &BitmapImage, positions: &[usize], count: usize) -> Result<()> {
    if count > positions.len() {
        return Err(StegoError::invalid(
            "Not enough bit positions for the requested number of bits.",
        ));
    }
    let limit = image.color_byte_count();
    if positions[..count].iter().any(|&p| p >= limit) {
        return Err(StegoError::invalid(
            "The steganographic region extends beyond the image data boundary.",
        ));
    }
    Ok(())
}

/// 嵌入头使用的固定位槽：未置换索引空间中的前 `HEADER_BITS` 个。
pub fn header_positions() -> Vec<usize> {
    (0..HEADER_BITS).collect()
}

/// 载荷使用的位槽：嵌入头之后区域的密码置换，取前 `count` 个。
pub fn payload_positions(keys: &KeyMaterial, total_slots: usize, count: usize) -> Vec<usize> {
    let mut order = keys.permutation(total_slots.saturating_sub(HEADER_BITS), count);
    order.iter_mut().for_each(|p| *p += HEADER_BITS);
    order
}

/// 按 `positions` 给出的顺序，把 `bits` 逐一写入对应颜色字节的最低位。
pub fn embed(image: &mut BitmapImage, positions: &[usize], bits: &[u8]) -> Result<()> {
    check_region(image, positions, bits.len())?;
    for (&position, &bit) in positions.iter().zip(bits) {
        image.set_lsb(position, bit);
    }
    Ok(())
}

/// 按 `positions` 给出的顺序读取 `count` 个最低位。
pub fn extract(image: &BitmapImage, positions: &[usize], count: usize) -> Result<Vec<u8>> {
    check_region(image, positions, count)?;
    Ok(positions[..count].iter().map(|&p| image.lsb(p)).collect())
}

/// 以密钥流对数据做异或掩码。对称且不改变长度，密钥流不足时循环使用。
pub fn mask(data: &mut [u8], keystream: &[u8]) {
    if keystream.is_empty() {
        return;
    }
    data.iter_mut()
        .zip(keystream.iter().cycle())
        .for_each(|(byte, key)| *byte ^= key);
}
