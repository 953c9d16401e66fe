//! 配置内容解密模块
//!
//! 对标记为加密的配置负载执行解密：Base64密文，AES-128-CBC，PKCS7填充。
//! 密钥与IV由密钥字符串的UTF-8字节右侧补零/截断到16字节确定性导出，
//! 生产端必须使用相同的密钥导出方式加密。

use crate::error::DecodeError;
use aes::Aes128;
use base64::{engine::general_purpose::STANDARD, Engine};
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, KeyIvInit};

type Aes128CbcDec = cbc::Decryptor<Aes128>;

/// 视为"空对象"的哨兵值，约定永远不会被加密
const EMPTY_SENTINELS: [&str; 3] = ["", "{}", "[]"];

/// 解密配置内容
///
/// 哨兵值（空串、`{}`、`[]`）原样返回，与密钥无关。其余内容按
/// Base64 + AES-128-CBC解密，失败（密钥错误、密文损坏）为硬错误。
///
/// # 参数
/// * `secret` - 配置的解密密钥
/// * `content` - 待解密内容
///
/// # 返回
/// * `Result<String, DecodeError>` - 解密后的明文
pub fn decrypt(secret: &str, content: &str) -> Result<String, DecodeError> {
    if EMPTY_SENTINELS.contains(&content) {
        return Ok(content.to_string());
    }

    let ciphertext = STANDARD
        .decode(content)
        .map_err(|e| DecodeError::Decrypt(format!("Base64解码失败: {}", e)))?;

    let key = fill_key(secret);
    let plaintext = Aes128CbcDec::new(&key.into(), &key.into())
        .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
        .map_err(|e| DecodeError::Decrypt(format!("AES解密失败: {}", e)))?;

    String::from_utf8(plaintext)
        .map_err(|e| DecodeError::Decrypt(format!("明文不是合法UTF-8: {}", e)))
}

/// 将密钥字符串确定性填充到16字节
fn fill_key(secret: &str) -> [u8; 16] {
    let mut key = [0u8; 16];
    let bytes = secret.as_bytes();
    let len = bytes.len().min(16);
    key[..len].copy_from_slice(&bytes[..len]);
    key
}
