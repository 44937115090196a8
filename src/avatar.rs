use std::path::Path;

use crate::error::{ClientError, Result};

pub const DEFAULT_EXTENSION: &str = "jpeg";

fn extension_of(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .filter(|ext| !ext.is_empty())
}

fn is_image_extension(ext: &str) -> bool {
    matches!(ext, "jpg" | "jpeg" | "png" | "webp" | "gif" | "heic")
}

pub fn content_type_for(ext: &str) -> &'static str {
    match ext {
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "heic" => "image/heic",
        _ => "image/jpeg",
    }
}

/// Object name for a new avatar: `{unix_millis}.{ext}`.
pub fn object_path(file_name: &str, unix_millis: i64) -> Result<String> {
    let ext = extension_of(file_name).unwrap_or_else(|| DEFAULT_EXTENSION.to_string());
    if !is_image_extension(&ext) {
        return Err(ClientError::validation(format!(
            "unsupported avatar format: .{ext}"
        )));
    }
    Ok(format!("{unix_millis}.{ext}"))
}
