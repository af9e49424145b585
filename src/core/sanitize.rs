fn is_allowed(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '-' | '_' | ' ')
}

/// 移除檔名中不允許的字元（只保留字母、數字、`-`、`_` 與空白），不做替換
pub fn sanitize_filename_part(text: &str) -> String {
    text.chars().filter(|&c| is_allowed(c)).collect()
}

/// `"<name> - <department>.png"`; empty components are kept as-is.
pub fn output_filename(name: &str, department: &str) -> String {
    format!(
        "{} - {}.png",
        sanitize_filename_part(name),
        sanitize_filename_part(department)
    )
}
