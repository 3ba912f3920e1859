//! # 位图容器模块
//!
//! 解析并校验未压缩的 24 位 BMP，向编解码器的其余部分暴露一个扁平的颜色字节索引空间。
//! 行填充字节从不参与嵌入；像素数组之前和之后的字节在序列化时原样保留。

use crate::constants::{
    BI_RGB, BITS_PER_PIXEL, BMP_FILE_HEADER_SIZE, BMP_MIN_DIB_HEADER_SIZE, BYTES_PER_PIXEL,
};
use crate::error::{Result, StegoError};
use image::ImageFormat;
use std::io::Cursor;

const UNSUPPORTED: &str = "unsupported bitmap variant";

/// 一张已解析的 24 位位图。
///
/// `pixels` 的长度始终等于 `row_stride * height`；只有颜色字节的最低位会被修改。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitmapImage {
    width: u32,
    height: u32,
    top_down: bool,
    row_stride: usize,
    prefix: Vec<u8>,
    pixels: Vec<u8>,
    suffix: Vec<u8>,
}

fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// 每行字节数向上对齐到 4 字节边界。
pub fn row_stride(width: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(BYTES_PER_PIXEL)?
        .checked_add(3)
        .map(|n| n / 4 * 4)
}

impl BitmapImage {
    /// 从完整的 BMP 文件字节中解析位图。
    ///
    /// # Errors
    ///
    /// * 输入为空时返回 `InvalidArgument`。
    /// * 签名错误、非 24 位、带压缩或数据被截断时返回 `Format`。
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(StegoError::invalid("empty carrier"));
        }
        if bytes.len() < BMP_FILE_HEADER_SIZE + BMP_MIN_DIB_HEADER_SIZE || &bytes[0..2] != b"BM" {
            return Err(StegoError::format(UNSUPPORTED));
        }

        let data_offset = read_u32(bytes, 10) as usize;
        let dib_size = read_u32(bytes, 14) as usize;
        let raw_width = read_u32(bytes, 18) as i32;
        let raw_height = read_u32(bytes, 22) as i32;
        let planes = read_u16(bytes, 26);
        let bits_per_pixel = read_u16(bytes, 28);
        let compression = read_u32(bytes, 30);

        if dib_size < BMP_MIN_DIB_HEADER_SIZE
            || planes != 1
            || bits_per_pixel != BITS_PER_PIXEL
            || compression != BI_RGB
        {
            return Err(StegoError::format(UNSUPPORTED));
        }
        if raw_width <= 0 || raw_height == 0 {
            return Err(StegoError::format("malformed bitmap: invalid dimensions"));
        }

        let width = raw_width as u32;
        let height = raw_height.unsigned_abs();
        let row_stride =
            row_stride(width).ok_or_else(|| StegoError::format("malformed bitmap: image too large"))?;
        let pixel_len = row_stride
            .checked_mul(height as usize)
            .ok_or_else(|| StegoError::format("malformed bitmap: image too large"))?;

        let pixel_end = data_offset
            .checked_add(pixel_len)
            .filter(|&end| end <= bytes.len());
        let headers_end = BMP_FILE_HEADER_SIZE.checked_add(dib_size);
        let pixel_end = match (pixel_end, headers_end) {
            (Some(end), Some(headers_end)) if data_offset >= headers_end => end,
            _ => return Err(StegoError::format("malformed bitmap: truncated pixel data")),
        };

        log::debug!(
            "parsed bitmap {}x{} (stride {}, {})",
            width,
            height,
            row_stride,
            if raw_height < 0 { "top-down" } else { "bottom-up" }
        );

        Ok(Self {
            width,
            height,
            top_down: raw_height < 0,
            row_stride,
            prefix: bytes[..data_offset].to_vec(),
            pixels: bytes[data_offset..pixel_end].to_vec(),
            suffix: bytes[pixel_end..].to_vec(),
        })
    }

    /// 重新序列化为 BMP 文件字节。
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.prefix.len() + self.pixels.len() + self.suffix.len());
        out.extend_from_slice(&self.prefix);
        out.extend_from_slice(&self.pixels);
        out.extend_from_slice(&self.suffix);
        out
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_top_down(&self) -> bool {
        self.top_down
    }

    pub fn row_stride(&self) -> usize {
        self.row_stride
    }

    /// 原始像素数组，包含行填充字节。
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// 颜色字节总数，即可用位槽总数 `3 * width * height`。
    pub fn color_byte_count(&self) -> usize {
        self.row_len() * self.height as usize
    }

    fn row_len(&self) -> usize {
        self.width as usize * BYTES_PER_PIXEL
    }

    /// 将扁平颜色字节索引映射到像素数组中的偏移，跳过行填充。
    fn offset(&self, index: usize) -> usize {
        let row_len = self.row_len();
        (index / row_len) * self.row_stride + index % row_len
    }

    /// 读取第 `index` 个颜色字节的最低位。
    ///
    /// 调用方需保证 `index < color_byte_count()`。
    pub fn lsb(&self, index: usize) -> u8 {
        self.pixels[self.offset(index)] & 1
    }

    /// 将第 `index` 个颜色字节的最低位设置为 `bit`，其余 7 位保持不变。
    pub fn set_lsb(&mut self, index: usize, bit: u8) {
        let offset = self.offset(index);
        let byte = &mut self.pixels[offset];
        *byte = (*byte & 0xFE) | (bit & 1);
    }
}

/// 将 `image` 能解码的任意图像转换为未压缩的 24 位 BMP。
///
/// 透明通道会被丢弃。编码流程不会自动调用此函数，转换必须由用户显式发起。
pub fn convert_to_bmp(bytes: &[u8]) -> Result<Vec<u8>> {
    if bytes.is_empty() {
        return Err(StegoError::invalid("empty image"));
    }
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| StegoError::format(format!("unable to decode image: {e}")))?;
    let rgb = image::DynamicImage::ImageRgb8(decoded.to_rgb8());

    let mut out = Cursor::new(Vec::new());
    rgb.write_to(&mut out, ImageFormat::Bmp)
        .map_err(|e| StegoError::format(format!("unable to encode bitmap: {e}")))?;
    let out = out.into_inner();

    // 确认编码结果确实是本模块接受的变体
    BitmapImage::parse(&out)?;
    Ok(out)
}
