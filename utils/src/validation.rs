//! File validation rules shared by the uploader client and the ingest service.
//!
//! Both sides run the same predicate, each with its own [`ValidationPolicy`]:
//! the client builds one from its uploader options, while the service uses
//! the fixed [`ValidationPolicy::server`] policy. Client-side checks are a
//! convenience only; the service repeats them on what it actually received.

use std::collections::HashSet;

/// Bytes per megabyte used for every size limit.
pub const BYTES_PER_MB: u64 = 1024 * 1024;

/// MIME types the ingest service accepts.
pub const SERVER_ALLOWED_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "application/pdf",
    "text/plain",
    "text/csv",
];

/// Maximum size of a single file accepted by the ingest service.
pub const SERVER_MAX_FILE_SIZE_BYTES: u64 = 10 * BYTES_PER_MB;

/// Maximum number of files in one batch accepted by the ingest service.
pub const SERVER_MAX_FILES: usize = 10;

/// The subset of a file's attributes that validation looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeclaredFile<'a> {
    pub name: &'a str,
    pub size_bytes: u64,
    /// Declared MIME type, empty when the source did not provide one.
    pub mime_type: &'a str,
}

impl<'a> DeclaredFile<'a> {
    pub fn new(name: &'a str, size_bytes: u64, mime_type: &'a str) -> Self {
        Self {
            name,
            size_bytes,
            mime_type,
        }
    }
}

/// The set of MIME types a policy accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedTypes {
    /// Wildcard: every type is accepted.
    Any,
    /// Exact types (`image/png`) or family patterns (`image/*`).
    List(Vec<String>),
}

impl AllowedTypes {
    /// Parses an `accept`-style hint such as `image/*,application/pdf`.
    ///
    /// An empty hint or one containing `*/*` means [`AllowedTypes::Any`].
    pub fn parse_accept(accept: &str) -> Self {
        let patterns: Vec<String> = accept
            .split(',')
            .map(|p| p.trim().to_ascii_lowercase())
            .filter(|p| !p.is_empty())
            .collect();

        if patterns.is_empty() || patterns.iter().any(|p| p == "*/*" || p == "*") {
            Self::Any
        } else {
            Self::List(patterns)
        }
    }

    pub fn from_list<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(types.into_iter().map(Into::into).collect())
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }

    /// Whether `mime_type` is accepted. Matching ignores ASCII case and any
    /// parameters after `;`.
    pub fn allows(&self, mime_type: &str) -> bool {
        let patterns = match self {
            Self::Any => return true,
            Self::List(patterns) => patterns,
        };

        let essence = mime_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        patterns.iter().any(|pattern| {
            let pattern = pattern.to_ascii_lowercase();
            match pattern.strip_suffix("/*") {
                Some(family) => essence
                    .split_once('/')
                    .is_some_and(|(top, sub)| top == family && !sub.is_empty()),
                None => pattern == essence,
            }
        })
    }
}

/// Size, count and type limits applied to uploaded files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationPolicy {
    pub max_file_size_bytes: u64,
    pub max_file_count: usize,
    pub allowed_types: AllowedTypes,
    /// Reject zero-byte files.
    pub reject_empty: bool,
    /// Reject files without a declared type unless `allowed_types` is `Any`.
    pub require_declared_type: bool,
}

impl ValidationPolicy {
    /// The fixed policy enforced by the ingest service.
    ///
    /// The service never looks at a client's `accept` hint and lets files
    /// without a declared type through to the allow-list check.
    pub fn server() -> Self {
        Self {
            max_file_size_bytes: SERVER_MAX_FILE_SIZE_BYTES,
            max_file_count: SERVER_MAX_FILES,
            allowed_types: AllowedTypes::from_list(SERVER_ALLOWED_TYPES.iter().copied()),
            reject_empty: true,
            require_declared_type: false,
        }
    }

    /// A client policy built from uploader options.
    pub fn client(max_size_mb: u64, max_files: usize, accept: &str) -> Self {
        Self {
            max_file_size_bytes: max_size_mb.saturating_mul(BYTES_PER_MB),
            max_file_count: max_files,
            allowed_types: AllowedTypes::parse_accept(accept),
            reject_empty: true,
            require_declared_type: true,
        }
    }

    /// The size limit in megabytes, for messages.
    pub fn max_size_mb(&self) -> f64 {
        self.max_file_size_bytes as f64 / BYTES_PER_MB as f64
    }

    /// Validates a single file, stopping at the first violated rule.
    pub fn validate(&self, file: &DeclaredFile<'_>) -> Result<(), ValidationError> {
        validate(file, self)
    }
}

/// A user-correctable validation failure.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("File \"{name}\" exceeds maximum size of {max_mb}MB")]
    TooLarge { name: String, max_mb: f64 },

    #[error("File \"{name}\" is empty")]
    Empty { name: String },

    #[error("File type {mime_type} of \"{name}\" is not allowed")]
    TypeNotAllowed { name: String, mime_type: String },

    #[error("File \"{name}\" has no type information")]
    MissingType { name: String },

    #[error("Cannot upload more than {max} files")]
    TooManyFiles { max: usize },

    #[error("Duplicate files detected: {}", .names.join(", "))]
    Duplicates { names: Vec<String> },
}

impl ValidationError {
    /// The offending file name, for errors about a single file.
    pub fn file_name(&self) -> Option<&str> {
        match self {
            Self::TooLarge { name, .. }
            | Self::Empty { name }
            | Self::TypeNotAllowed { name, .. }
            | Self::MissingType { name } => Some(name),
            Self::TooManyFiles { .. } | Self::Duplicates { .. } => None,
        }
    }
}

/// Validates one file against `policy`.
///
/// Rules run in order: size limit, empty file, type allow-list, missing type.
pub fn validate(file: &DeclaredFile<'_>, policy: &ValidationPolicy) -> Result<(), ValidationError> {
    if file.size_bytes > policy.max_file_size_bytes {
        return Err(ValidationError::TooLarge {
            name: file.name.to_owned(),
            max_mb: policy.max_size_mb(),
        });
    }

    if policy.reject_empty && file.size_bytes == 0 {
        return Err(ValidationError::Empty {
            name: file.name.to_owned(),
        });
    }

    if !file.mime_type.is_empty() && !policy.allowed_types.allows(file.mime_type) {
        return Err(ValidationError::TypeNotAllowed {
            name: file.name.to_owned(),
            mime_type: file.mime_type.to_owned(),
        });
    }

    if policy.require_declared_type
        && !policy.allowed_types.is_any()
        && file.mime_type.is_empty()
    {
        return Err(ValidationError::MissingType {
            name: file.name.to_owned(),
        });
    }

    Ok(())
}

/// Returns the names in `incoming` that collide with `existing` or with an
/// earlier entry of `incoming`, in first-seen order.
pub fn duplicate_names<'a, E, I>(existing: E, incoming: I) -> Vec<String>
where
    E: IntoIterator<Item = &'a str>,
    I: IntoIterator<Item = &'a str>,
{
    let mut seen: HashSet<&str> = existing.into_iter().collect();
    let mut duplicates: Vec<String> = Vec::new();

    for name in incoming {
        if !seen.insert(name) && !duplicates.iter().any(|d| d == name) {
            duplicates.push(name.to_owned());
        }
    }

    duplicates
}

/// Human readable size: `0 Bytes`, `1.5 KB`, `2 MB`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_owned();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    format!("{rounded} {}", UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(name: &str, size: u64) -> DeclaredFile<'_> {
        DeclaredFile::new(name, size, "image/png")
    }

    #[test]
    fn oversized_file_is_rejected_with_name_and_limit() {
        let policy = ValidationPolicy::client(2, 10, "image/*");
        let err = validate(&png("big.png", 2 * BYTES_PER_MB + 1), &policy).unwrap_err();

        assert_eq!(
            err.to_string(),
            "File \"big.png\" exceeds maximum size of 2MB"
        );
        assert_eq!(err.file_name(), Some("big.png"));
    }

    #[test]
    fn file_at_exact_limit_passes() {
        let policy = ValidationPolicy::client(2, 10, "image/*");
        assert!(validate(&png("edge.png", 2 * BYTES_PER_MB), &policy).is_ok());
    }

    #[test]
    fn size_check_runs_before_type_check() {
        let policy = ValidationPolicy::server();
        let file = DeclaredFile::new("movie.mp4", SERVER_MAX_FILE_SIZE_BYTES + 1, "video/mp4");
        assert!(matches!(
            validate(&file, &policy),
            Err(ValidationError::TooLarge { .. })
        ));
    }

    #[test]
    fn empty_file_is_rejected() {
        let policy = ValidationPolicy::client(20, 10, "*/*");
        let err = validate(&png("blank.png", 0), &policy).unwrap_err();
        assert_eq!(err, ValidationError::Empty { name: "blank.png".to_owned() });
    }

    #[test]
    fn disallowed_type_is_rejected() {
        let policy = ValidationPolicy::server();
        let file = DeclaredFile::new("run.exe", 10, "application/x-msdownload");
        let err = validate(&file, &policy).unwrap_err();
        assert!(err.to_string().contains("application/x-msdownload"));
        assert!(err.to_string().contains("run.exe"));
    }

    #[test]
    fn client_rejects_missing_type_unless_wildcard() {
        let strict = ValidationPolicy::client(20, 10, "image/*");
        let file = DeclaredFile::new("notes", 10, "");
        assert_eq!(
            validate(&file, &strict),
            Err(ValidationError::MissingType { name: "notes".to_owned() })
        );

        let wildcard = ValidationPolicy::client(20, 10, "*/*");
        assert!(validate(&file, &wildcard).is_ok());
    }

    #[test]
    fn server_ignores_missing_type_rule() {
        let policy = ValidationPolicy::server();
        let file = DeclaredFile::new("notes", 10, "");
        assert!(validate(&file, &policy).is_ok());
    }

    #[test]
    fn accept_patterns_match_families_and_exact_types() {
        let allowed = AllowedTypes::parse_accept("image/*, application/pdf");
        assert!(allowed.allows("image/png"));
        assert!(allowed.allows("IMAGE/WEBP"));
        assert!(allowed.allows("application/pdf"));
        assert!(!allowed.allows("text/plain"));
        assert!(!allowed.allows("image"));
    }

    #[test]
    fn accept_wildcards() {
        assert!(AllowedTypes::parse_accept("*/*").is_any());
        assert!(AllowedTypes::parse_accept("").is_any());
        assert!(!AllowedTypes::parse_accept("text/csv").is_any());
    }

    #[test]
    fn type_parameters_are_ignored() {
        let policy = ValidationPolicy::server();
        let file = DeclaredFile::new("a.txt", 3, "text/plain; charset=utf-8");
        assert!(validate(&file, &policy).is_ok());
    }

    #[test]
    fn duplicates_against_existing_and_within_batch() {
        let dups = duplicate_names(["a.png"], ["a.png", "b.png", "b.png", "c.png"]);
        assert_eq!(dups, vec!["a.png".to_owned(), "b.png".to_owned()]);

        let err = ValidationError::Duplicates { names: dups };
        assert_eq!(err.to_string(), "Duplicate files detected: a.png, b.png");
    }

    #[test]
    fn duplicate_detection_is_case_sensitive() {
        assert!(duplicate_names(["A.png"], ["a.png"]).is_empty());
    }

    #[test]
    fn file_sizes_are_human_readable() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(2 * BYTES_PER_MB), "2 MB");
    }
}
