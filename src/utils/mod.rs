pub mod ip;
pub mod url_validator;

/// 追踪器 id 字符集
const ID_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

pub fn generate_random_code(length: usize) -> String {
    std::iter::repeat_with(|| ID_CHARSET[rand::random_range(0..ID_CHARSET.len())] as char)
        .take(length)
        .collect()
}
