//! Input adaptation: produce one text blob from a document file.
//!
//! The rest of the pipeline never sees the input format — it operates on a
//! single `String` regardless of whether the source was a PDF, a DOCX, or a
//! legacy DOC. Format is decided by extension, matching what users expect
//! from a CLI tool (and what the downstream format readers can actually
//! verify better than a magic-byte sniff here could).
//!
//! ## Legacy .doc handling
//!
//! The .doc binary format is an OLE2 container with no maintained pure-Rust
//! reader. A `.doc` input is converted to `.docx` by LibreOffice
//! (`soffice --headless --convert-to docx`) into a temporary directory, then
//! fed through the same docx reader. The `TempDir` guard keeps the converted
//! file alive until extraction finishes and removes it afterwards, even if
//! the read fails.

use crate::error::Doc2TableError;
use docx_rs::read_docx;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;
use tracing::{debug, info};

/// Extract the full text content of a document.
///
/// Dispatches on the (lowercased) file extension: `.pdf`, `.docx`, `.doc`.
/// Any other extension is an [`Doc2TableError::UnsupportedFormat`].
///
/// This function does blocking file and subprocess work; the async pipeline
/// calls it through `spawn_blocking`.
pub fn extract_text(path: &Path) -> Result<String, Doc2TableError> {
    if !path.exists() {
        return Err(Doc2TableError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => extract_pdf(path),
        "docx" => extract_docx(path),
        "doc" => {
            let (converted, _guard) = convert_doc_to_docx(path)?;
            extract_docx(&converted)
        }
        _ => Err(Doc2TableError::UnsupportedFormat {
            path: path.to_path_buf(),
            extension: if extension.is_empty() {
                "(none)".to_string()
            } else {
                format!(".{extension}")
            },
        }),
    }
}

/// Read a PDF's text layer.
fn extract_pdf(path: &Path) -> Result<String, Doc2TableError> {
    let text = pdf_extract::extract_text(path).map_err(|e| Doc2TableError::DocumentParse {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;
    debug!("Extracted {} chars from PDF {}", text.len(), path.display());
    Ok(text)
}

/// Read a DOCX by walking its Paragraph → Run → Text tree.
///
/// Paragraph texts are joined with blank lines; runs inside a paragraph are
/// concatenated directly because they are parts of the same sentence.
fn extract_docx(path: &Path) -> Result<String, Doc2TableError> {
    let bytes = std::fs::read(path).map_err(|e| Doc2TableError::DocumentParse {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;

    let docx = read_docx(&bytes).map_err(|e| Doc2TableError::DocumentParse {
        path: path.to_path_buf(),
        detail: format!("{e:?}"),
    })?;

    let mut paragraphs: Vec<String> = Vec::new();
    for child in &docx.document.children {
        if let docx_rs::DocumentChild::Paragraph(para) = child {
            paragraphs.push(paragraph_text(para));
        }
    }

    let text = paragraphs.join("\n\n");
    debug!("Extracted {} chars from DOCX {}", text.len(), path.display());
    Ok(text)
}

fn paragraph_text(para: &docx_rs::Paragraph) -> String {
    let mut parts: Vec<String> = Vec::new();
    for child in &para.children {
        if let docx_rs::ParagraphChild::Run(run) = child {
            for rc in &run.children {
                if let docx_rs::RunChild::Text(t) = rc {
                    parts.push(t.text.clone());
                }
            }
        }
    }
    parts.join("")
}

/// Convert a legacy .doc to .docx via LibreOffice.
///
/// Returns the converted file's path together with the `TempDir` guard that
/// owns it; the caller must keep the guard alive while reading the file.
fn convert_doc_to_docx(path: &Path) -> Result<(PathBuf, TempDir), Doc2TableError> {
    let outdir = TempDir::new().map_err(|e| Doc2TableError::Internal(e.to_string()))?;

    info!("Converting {} to .docx via soffice", path.display());
    let output = Command::new("soffice")
        .arg("--headless")
        .arg("--convert-to")
        .arg("docx")
        .arg(path)
        .arg("--outdir")
        .arg(outdir.path())
        .output()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Doc2TableError::MissingDependency {
                    program: "soffice".to_string(),
                    hint: "Install LibreOffice to convert .doc files, or convert the document \
                           to .docx yourself and pass that instead."
                        .to_string(),
                }
            } else {
                Doc2TableError::Internal(format!("failed to spawn soffice: {e}"))
            }
        })?;

    if !output.status.success() {
        return Err(Doc2TableError::DocumentParse {
            path: path.to_path_buf(),
            detail: format!(
                "soffice conversion failed: {}",
                String::from_utf8_lossy(&output.stderr)
            ),
        });
    }

    // soffice names the output after the input; scan rather than guess.
    let converted = std::fs::read_dir(outdir.path())
        .map_err(|e| Doc2TableError::Internal(e.to_string()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .find(|p| p.extension().and_then(|e| e.to_str()) == Some("docx"))
        .ok_or_else(|| Doc2TableError::DocumentParse {
            path: path.to_path_buf(),
            detail: "soffice conversion produced no .docx file".to_string(),
        })?;

    Ok((converted, outdir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use docx_rs::{Docx, Paragraph, Run};

    fn write_docx(path: &Path, paragraphs: &[&str]) {
        let mut docx = Docx::new();
        for text in paragraphs {
            docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*text)));
        }
        let file = std::fs::File::create(path).unwrap();
        docx.build().pack(file).unwrap();
    }

    #[test]
    fn missing_file_is_reported() {
        let err = extract_text(Path::new("/definitely/not/a/real/file.pdf")).unwrap_err();
        assert!(matches!(err, Doc2TableError::FileNotFound { .. }));
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "plain text").unwrap();

        let err = extract_text(&path).unwrap_err();
        match err {
            Doc2TableError::UnsupportedFormat { extension, .. } => {
                assert_eq!(extension, ".txt");
            }
            other => panic!("expected UnsupportedFormat, got {other:?}"),
        }
    }

    #[test]
    fn no_extension_is_unsupported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("README");
        std::fs::write(&path, "plain text").unwrap();

        let err = extract_text(&path).unwrap_err();
        assert!(matches!(err, Doc2TableError::UnsupportedFormat { .. }));
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.DOCX");
        write_docx(&path, &["Hello"]);

        let text = extract_text(&path).unwrap();
        assert_eq!(text, "Hello");
    }

    #[test]
    fn docx_paragraphs_are_joined_with_blank_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.docx");
        write_docx(&path, &["First paragraph.", "Second paragraph."]);

        let text = extract_text(&path).unwrap();
        assert_eq!(text, "First paragraph.\n\nSecond paragraph.");
    }

    #[test]
    fn corrupt_docx_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.docx");
        std::fs::write(&path, b"this is not a zip archive").unwrap();

        let err = extract_text(&path).unwrap_err();
        assert!(matches!(err, Doc2TableError::DocumentParse { .. }));
    }
}
