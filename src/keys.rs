//! # 密钥派生模块
//!
//! 由"魔术字符串" (密码) 派生出三条相互独立的材料：完整性标签密钥、位槽置换种子与掩码密钥流种子。
//! 同一密码总是得到同一组材料，不引入任何外部熵。

use crate::constants::{INFO_KEYSTREAM, INFO_PERMUTATION, INFO_TAG, KDF_SALT, TAG_LEN};
use crate::error::{Result, StegoError};
use hkdf::Hkdf;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;

/// 一次编解码操作所需的全部密钥材料。
pub struct KeyMaterial {
    tag_key: [u8; 32],
    permutation_seed: [u8; 32],
    keystream_seed: [u8; 32],
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial").finish_non_exhaustive()
    }
}

fn expand(hk: &Hkdf<Sha256>, info: &[u8]) -> Result<[u8; 32]> {
    let mut okm = [0u8; 32];
    hk.expand(info, &mut okm)
        .map_err(|_| StegoError::invalid("key derivation failed"))?;
    Ok(okm)
}

impl KeyMaterial {
    /// 使用 HKDF-SHA256 从密码派生密钥材料。
    ///
    /// # Errors
    ///
    /// 密码为空时返回 `InvalidArgument`。
    pub fn derive(password: &str) -> Result<Self> {
        if password.is_empty() {
            return Err(StegoError::invalid("magic string must not be empty"));
        }

        let hk = Hkdf::<Sha256>::new(Some(KDF_SALT), password.as_bytes());
        let material = Self {
            tag_key: expand(&hk, INFO_TAG)?,
            permutation_seed: expand(&hk, INFO_PERMUTATION)?,
            keystream_seed: expand(&hk, INFO_KEYSTREAM)?,
        };
        log::debug!("derived key material");
        Ok(material)
    }

    /// 计算载荷的完整性标签。
    ///
    /// 标签覆盖长度字段、扩展名字段和未掩码的载荷，并以标签密钥为前缀，
    /// 因此嵌入头不会暴露秘密内容的无密钥摘要。
    pub fn tag(&self, length: u64, extension_field: &[u8], payload: &[u8]) -> [u8; TAG_LEN] {
        let mut hasher = Sha256::new();
        hasher.update(self.tag_key);
        hasher.update(length.to_be_bytes());
        hasher.update(extension_field);
        hasher.update(payload);
        hasher.finalize().into()
    }

    /// 返回 `0..slot_count` 的确定性随机排列的前 `count` 项 (正向 Fisher–Yates)。
    ///
    /// 只执行 `count` 次交换，被换出的位置记录在稀疏表中，时间与内存都只与 `count` 成正比。
    /// 较短的结果总是较长结果的前缀；`count == slot_count` 即完整排列。
    /// 随机范围使用 `u64`，保证 32 位与 64 位平台得到相同的排列。
    pub fn permutation(&self, slot_count: usize, count: usize) -> Vec<usize> {
        let mut rng = ChaCha20Rng::from_seed(self.permutation_seed);
        let n = slot_count as u64;
        let count = count.min(slot_count);
        let mut displaced: HashMap<u64, u64> = HashMap::with_capacity(count);
        let mut order = Vec::with_capacity(count);
        for i in 0..count as u64 {
            let j = rng.random_range(i..n);
            let at_j = displaced.get(&j).copied().unwrap_or(j);
            let at_i = displaced.get(&i).copied().unwrap_or(i);
            displaced.insert(j, at_i);
            order.push(at_j as usize);
        }
        order
    }

    /// 生成长度为 `len` 的掩码密钥流。
    pub fn keystream(&self, len: usize) -> Vec<u8> {
        let mut rng = ChaCha20Rng::from_seed(self.keystream_seed);
        let mut stream = vec![0u8; len];
        rng.fill_bytes(&mut stream);
        stream
    }
}
