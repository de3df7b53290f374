use crate::server::error::ApiError;
use axum::body::Bytes;
use axum::extract::Multipart;

pub struct Upload {
    pub filename: String,
    pub data: Bytes,
}

/// First multipart field called `name`, if any.
pub async fn read_field(mut multipart: Multipart, name: &str) -> Result<Option<Upload>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::new(e.status(), e.body_text()))?
    {
        if field.name() != Some(name) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::new(e.status(), e.body_text()))?;
        return Ok(Some(Upload { filename, data }));
    }
    Ok(None)
}

/// Reduces a client supplied file name to `[A-Za-z0-9._-]`, with path
/// separators and whitespace turned into `_`. `None` if nothing is left.
pub fn secure_filename(name: &str) -> Option<String> {
    let spaced: String = name
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let filtered: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    let trimmed = filtered.trim_matches(|c: char| c == '.' || c == '_');

    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secure_filename() {
        assert_eq!(secure_filename("My Rose.JPG").as_deref(), Some("My_Rose.JPG"));
        assert_eq!(
            secure_filename("../../etc/passwd").as_deref(),
            Some("etc_passwd")
        );
        assert_eq!(
            secure_filename("C:\\photos\\tulip.png").as_deref(),
            Some("C_photos_tulip.png")
        );
        assert_eq!(secure_filename("bunga-mawar_01.png").as_deref(), Some("bunga-mawar_01.png"));
        assert_eq!(secure_filename("mawar merah.gif").as_deref(), Some("mawar_merah.gif"));
        assert_eq!(secure_filename("..."), None);
        assert_eq!(secure_filename("花.png").as_deref(), Some("png"));
    }
}
