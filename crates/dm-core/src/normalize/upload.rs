/// Resolve a stored candidate upload path to its file-serving URL.
/// 将候选人上传文件的存储路径解析为文件访问 URL。
///
/// Uploads are stored as `uploads/<dir>/<file>` (sometimes with a leading
/// slash); the API serves them from `<api base>/forms/files/<dir>/<file>`.
pub fn upload_file_url(api_base_url: &str, file_path: &str) -> Option<String> {
    if file_path.is_empty() {
        return None;
    }

    let clean_path = file_path
        .strip_prefix("uploads/")
        .or_else(|| file_path.strip_prefix("/uploads/"))
        .unwrap_or(file_path);

    Some(format!(
        "{}/forms/files/{}",
        api_base_url.trim_end_matches('/'),
        clean_path
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const API: &str = "http://localhost:8000/api";

    #[test]
    fn test_strips_uploads_prefix() {
        assert_eq!(
            upload_file_url(API, "uploads/candidate_forms/sig.jpg").as_deref(),
            Some("http://localhost:8000/api/forms/files/candidate_forms/sig.jpg")
        );
        assert_eq!(
            upload_file_url(API, "/uploads/candidate_forms/sig.jpg").as_deref(),
            Some("http://localhost:8000/api/forms/files/candidate_forms/sig.jpg")
        );
    }

    #[test]
    fn test_keeps_paths_without_prefix() {
        assert_eq!(
            upload_file_url(API, "candidate_forms/sig.jpg").as_deref(),
            Some("http://localhost:8000/api/forms/files/candidate_forms/sig.jpg")
        );
    }

    #[test]
    fn test_empty_path_has_no_url() {
        assert_eq!(upload_file_url(API, ""), None);
    }
}
