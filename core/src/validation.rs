//! Pre-flight checks applied to selected files before any upload starts.

use huddle_protocol::FileRejection;
use huddle_protocol::RejectionReason;

use crate::config_types::UploadLimits;
use crate::pending_file::PendingFile;

/// Strip MIME parameters (`; charset=...`) and lowercase the rest.
fn mime_essence(mime_type: &str) -> String {
    mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

pub fn check_file(file: &PendingFile, limits: &UploadLimits) -> Result<(), RejectionReason> {
    let size = file.size();
    if size > limits.max_file_size {
        return Err(RejectionReason::TooLarge {
            size,
            limit: limits.max_file_size,
        });
    }

    let essence = mime_essence(&file.mime_type);
    let allowed = limits
        .allowed_mime_types
        .iter()
        .any(|allowed| mime_essence(allowed) == essence);
    if !allowed {
        return Err(RejectionReason::DisallowedType {
            mime_type: file.mime_type.clone(),
        });
    }
    Ok(())
}

/// Split `files` into those that pass [`check_file`] and one rejection per
/// file that does not. Relative order is kept on both sides.
pub fn validate(
    files: Vec<PendingFile>,
    limits: &UploadLimits,
) -> (Vec<PendingFile>, Vec<FileRejection>) {
    let mut accepted = Vec::with_capacity(files.len());
    let mut rejections = Vec::new();
    for file in files {
        match check_file(&file, limits) {
            Ok(()) => accepted.push(file),
            Err(reason) => {
                tracing::debug!(file = %file.name, %reason, "file rejected before upload");
                rejections.push(FileRejection {
                    file_name: file.name,
                    reason,
                });
            }
        }
    }
    (accepted, rejections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use pretty_assertions::assert_eq;

    fn file(name: &str, mime: &str, len: usize) -> PendingFile {
        PendingFile::new(name, mime, Bytes::from(vec![0u8; len]))
    }

    #[test]
    fn oversized_file_is_rejected_and_others_pass() {
        let limits = UploadLimits {
            max_file_size: 10,
            ..Default::default()
        };
        let (accepted, rejections) = validate(
            vec![
                file("small.png", "image/png", 4),
                file("huge.png", "image/png", 11),
                file("edge.png", "image/png", 10),
            ],
            &limits,
        );

        let names: Vec<&str> = accepted.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["small.png", "edge.png"]);
        assert_eq!(
            rejections,
            vec![FileRejection {
                file_name: "huge.png".to_string(),
                reason: RejectionReason::TooLarge { size: 11, limit: 10 },
            }]
        );
    }

    #[test]
    fn disallowed_type_is_rejected() {
        let (accepted, rejections) = validate(
            vec![file("setup.exe", "application/x-msdownload", 3)],
            &UploadLimits::default(),
        );
        assert!(accepted.is_empty());
        assert_eq!(
            rejections[0].reason,
            RejectionReason::DisallowedType {
                mime_type: "application/x-msdownload".to_string()
            }
        );
    }

    #[test]
    fn mime_comparison_ignores_case_and_parameters() {
        let limits = UploadLimits::default();
        assert_eq!(
            check_file(&file("a.txt", "Text/Plain; charset=utf-8", 1), &limits),
            Ok(())
        );
    }
}
