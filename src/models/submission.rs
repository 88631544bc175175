//! 用户提交的题目
//!
//! 一次提交 = 一段备注文字 + 一张可选图片

use std::fmt;

/// 图片数据（原始字节 + 声明的 mime 类型）
#[derive(Clone, PartialEq, Eq)]
pub struct ImageData {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl ImageData {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    /// 根据文件扩展名推断 mime 类型
    pub fn mime_from_extension(ext: &str) -> &'static str {
        match ext.to_ascii_lowercase().as_str() {
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "webp" => "image/webp",
            "gif" => "image/gif",
            "heic" => "image/heic",
            "heif" => "image/heif",
            _ => "application/octet-stream",
        }
    }
}

// 图片字节可能很大，日志里只打印长度
impl fmt::Debug for ImageData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageData")
            .field("len", &self.bytes.len())
            .field("mime_type", &self.mime_type)
            .finish()
    }
}

/// 一次题目提交
///
/// 构造后不可变。文字为空白且没有图片时视为空提交，
/// 由解析流程拒绝。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Submission {
    note_text: String,
    image: Option<ImageData>,
}

impl Submission {
    pub fn new(note_text: impl Into<String>, image: Option<ImageData>) -> Self {
        Self {
            note_text: note_text.into(),
            image,
        }
    }

    /// 只有文字的提交
    pub fn text(note_text: impl Into<String>) -> Self {
        Self::new(note_text, None)
    }

    pub fn note_text(&self) -> &str {
        &self.note_text
    }

    pub fn image(&self) -> Option<&ImageData> {
        self.image.as_ref()
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    /// 文字为空白且没有图片
    pub fn is_empty(&self) -> bool {
        self.note_text.trim().is_empty() && self.image.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_submission() {
        assert!(Submission::text("").is_empty());
        assert!(Submission::text("   \n\t").is_empty());
        assert!(Submission::default().is_empty());
    }

    #[test]
    fn test_image_only_submission_is_not_empty() {
        let image = ImageData::new(vec![0x89, 0x50], "image/png");
        let submission = Submission::new("", Some(image));
        assert!(!submission.is_empty());
        assert!(submission.has_image());
    }

    #[test]
    fn test_text_submission_is_not_empty() {
        assert!(!Submission::text("đạo hàm").is_empty());
    }

    #[test]
    fn test_mime_from_extension() {
        assert_eq!(ImageData::mime_from_extension("PNG"), "image/png");
        assert_eq!(ImageData::mime_from_extension("jpeg"), "image/jpeg");
        assert_eq!(ImageData::mime_from_extension("jpg"), "image/jpeg");
        assert_eq!(
            ImageData::mime_from_extension("bmpx"),
            "application/octet-stream"
        );
    }

    #[test]
    fn test_image_debug_hides_bytes() {
        let image = ImageData::new(vec![1, 2, 3], "image/png");
        let printed = format!("{:?}", image);
        assert!(printed.contains("len: 3"));
        assert!(!printed.contains("[1, 2, 3]"));
    }
}
