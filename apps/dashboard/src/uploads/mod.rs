//! Upload forwarding: reads a browser multipart form and hands its files and
//! report toggles to the analysis service.

pub mod handlers;

use axum::extract::Multipart;
use tracing::debug;

use crate::analysis_client::{AnalysisOptions, Upload};
use crate::errors::AppError;

/// Files and options read from one multipart request.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub files: Vec<Upload>,
    pub options: AnalysisOptions,
}

/// Reads every part of `multipart`. Parts named `file_field` become uploads;
/// parts named after an [`AnalysisOptions`] field set that option. Anything
/// else is ignored.
pub async fn read_form(mut multipart: Multipart, file_field: &str) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == file_field {
            let file_name = field
                .file_name()
                .filter(|n| !n.trim().is_empty())
                .map(str::to_string)
                .ok_or_else(|| AppError::Validation(format!("'{file_field}' must be a file")))?;
            let content_type = field.content_type().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Could not read {file_name}: {e}")))?;
            if bytes.is_empty() {
                return Err(AppError::Validation(format!("{file_name} is empty")));
            }
            form.files.push(Upload {
                file_name,
                content_type,
                bytes,
            });
            continue;
        }

        let text = field
            .text()
            .await
            .map_err(|e| AppError::Validation(format!("Could not read field '{name}': {e}")))?;
        match parse_flag(&text) {
            Some(value) if form.options.set(&name, value) => {}
            None if AnalysisOptions::is_option(&name) => {
                return Err(AppError::Validation(format!(
                    "'{name}' must be true or false, got '{}'",
                    text.trim()
                )));
            }
            _ => debug!(field = %name, "Ignoring unknown form field"),
        }
    }

    if form.files.is_empty() {
        return Err(AppError::Validation(format!("No '{file_field}' file provided")));
    }
    Ok(form)
}

/// Lenient boolean reading for HTML form values.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Some(true),
        "false" | "0" | "off" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::Request;

    const BOUNDARY: &str = "X-DASHBOARD-BOUNDARY";

    enum Part<'a> {
        File(&'a str, &'a str, &'a str),
        Text(&'a str, &'a str),
    }

    async fn multipart(parts: &[Part<'_>]) -> Multipart {
        let mut body = String::new();
        for part in parts {
            body.push_str(&format!("--{BOUNDARY}\r\n"));
            match part {
                Part::File(name, file_name, content) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                     Content-Type: application/pdf\r\n\r\n{content}\r\n"
                )),
                Part::Text(name, value) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )),
            }
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));

        let request = Request::builder()
            .method("POST")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        Multipart::from_request(request, &()).await.unwrap()
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("true"), Some(true));
        assert_eq!(parse_flag(" ON "), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("False"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[tokio::test]
    async fn test_reads_files_and_options() {
        let body = multipart(&[
            Part::File("files", "a.pdf", "%PDF-a"),
            Part::File("files", "b.pdf", "%PDF-b"),
            Part::Text("generate_report", "true"),
            Part::Text("generate_visuals", "off"),
            Part::Text("theme", "dark"),
        ])
        .await;

        let form = read_form(body, "files").await.unwrap();
        let names: Vec<_> = form.files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.pdf", "b.pdf"]);
        assert_eq!(form.files[0].content_type.as_deref(), Some("application/pdf"));
        assert_eq!(&form.files[1].bytes[..], b"%PDF-b");
        assert_eq!(form.options.generate_report, Some(true));
        assert_eq!(form.options.generate_visuals, Some(false));
        assert_eq!(form.options.generate_dashboard, None);
    }

    #[tokio::test]
    async fn test_missing_file_is_rejected() {
        let body = multipart(&[Part::Text("generate_report", "true")]).await;
        let err = read_form(body, "file_path").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("file_path")));
    }

    #[tokio::test]
    async fn test_invalid_option_is_rejected() {
        let body = multipart(&[
            Part::File("file_path", "a.pdf", "%PDF"),
            Part::Text("generate_dashboard", "sometimes"),
        ])
        .await;
        let err = read_form(body, "file_path").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("generate_dashboard")));
    }

    #[tokio::test]
    async fn test_empty_file_is_rejected() {
        let body = multipart(&[Part::File("file_path", "empty.pdf", "")]).await;
        let err = read_form(body, "file_path").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("empty.pdf")));
    }
}
