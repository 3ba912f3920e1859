/// BMP 文件头 (BITMAPFILEHEADER) 的大小 (字节)。
pub const BMP_FILE_HEADER_SIZE: usize = 14;

/// 支持的最小 DIB 头大小，即 BITMAPINFOHEADER。
/// V4 (108) 和 V5 (124) 头都以它为前缀，因此同样被接受。
pub const BMP_MIN_DIB_HEADER_SIZE: usize = 40;

/// 载体图像唯一支持的像素位深。
pub const BITS_PER_PIXEL: u16 = 24;

/// 每个像素的颜色字节数 (B, G, R)。
pub const BYTES_PER_PIXEL: usize = 3;

/// 未压缩 RGB 的压缩类型标识 (BI_RGB)。
pub const BI_RGB: u32 = 0;

/// 嵌入数据的标识符，前 7 字节固定，最后 1 字节为格式版本。
pub const MAGIC: [u8; 7] = *b"LSBHIDE";

/// 当前嵌入格式的版本号。
pub const FORMAT_VERSION: u8 = 1;

/// 头部中标识符字段的宽度 (字节)。
pub const MARKER_LEN: usize = MAGIC.len() + 1;

/// 载荷长度字段的宽度，`u64` 大端序。
pub const LENGTH_FIELD_LEN: usize = 8;

/// 扩展名字段的宽度，不足部分以 NUL 填充。
pub const EXTENSION_FIELD_LEN: usize = 16;

/// 扩展名的最大字节数，保证字段内至少有一个 NUL 结尾。
pub const MAX_EXTENSION_LEN: usize = EXTENSION_FIELD_LEN - 1;

/// 完整性标签的宽度 (SHA-256 输出)。
pub const TAG_LEN: usize = 32;

/// 嵌入头的总字节数。
pub const HEADER_BYTES: usize = MARKER_LEN + LENGTH_FIELD_LEN + EXTENSION_FIELD_LEN + TAG_LEN;

/// 嵌入头占用的位槽数。每个颜色字节的 LSB 存储 1 bit。
pub const HEADER_BITS: usize = HEADER_BYTES * 8;

/// HKDF 的固定盐值。
pub const KDF_SALT: &[u8] = b"LSBHIDE-KDF-V1";

/// 标签密钥的域分离标签。
pub const INFO_TAG: &[u8] = b"lsb_hide/tag";

/// 置换种子的域分离标签。
pub const INFO_PERMUTATION: &[u8] = b"lsb_hide/permutation";

/// 掩码密钥流种子的域分离标签。
pub const INFO_KEYSTREAM: &[u8] = b"lsb_hide/keystream";
