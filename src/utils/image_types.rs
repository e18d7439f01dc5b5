// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use url::Url;

/// 支持的图片扩展名
pub const SUPPORTED_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "webp", "gif", "bmp"];

/// 无法识别扩展名时压缩包条目使用的扩展名
pub const DEFAULT_EXTENSION: &str = "jpg";

/// 判断 URL 是否指向受支持的图片类型
///
/// 忽略查询串和片段，按文件名扩展名（不区分大小写）判断。
/// 下载前的校验以此为准，未通过的 URL 不会发起请求。
pub fn is_image(url: &str) -> bool {
    image_extension(url).is_some()
}

/// 返回 URL 对应的受支持扩展名（小写）
pub fn image_extension(url: &str) -> Option<&'static str> {
    let ext = trailing_extension(url)?;
    SUPPORTED_EXTENSIONS
        .iter()
        .copied()
        .find(|supported| supported.eq_ignore_ascii_case(&ext))
}

/// 压缩包条目使用的扩展名，无法识别时回退为 `jpg`
pub fn archive_extension(url: &str) -> &'static str {
    image_extension(url).unwrap_or(DEFAULT_EXTENSION)
}

fn trailing_extension(url: &str) -> Option<String> {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.split(['?', '#']).next().unwrap_or_default().to_string(),
    };

    let file_name = path.rsplit('/').next()?;
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() && ext.is_empty() {
        return None;
    }
    Some(ext.to_string())
}
