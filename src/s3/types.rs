//! Object addressing

use percent_encoding::percent_decode_str;
use std::fmt;
use std::str::FromStr;

/// Bucket plus key (or key prefix) parsed from an S3 URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Url {
    pub bucket: String,
    pub key: String,
}

impl S3Url {
    /// Parse `s3://bucket/key`, or an https/http virtual-hosted
    /// (`bucket.s3.region.amazonaws.com/key`) or path-style
    /// (`s3.region.amazonaws.com/bucket/key`) URL.
    pub fn parse(input: &str) -> Option<Self> {
        if let Some(rest) = input.strip_prefix("s3://") {
            return Self::from_path(rest);
        }

        if !(input.starts_with("https://") || input.starts_with("http://")) {
            return None;
        }

        let parsed = url::Url::parse(input).ok()?;
        let host = parsed.host_str()?;
        if !host.ends_with(".amazonaws.com") {
            return None;
        }
        // URL paths arrive percent-encoded, keys are stored decoded
        let decoded = percent_decode_str(parsed.path().trim_start_matches('/'))
            .decode_utf8()
            .ok()?;
        let path = &*decoded;

        if let Some((bucket, _)) = host.split_once(".s3.") {
            return Some(Self {
                bucket: bucket.to_string(),
                key: path.to_string(),
            });
        }
        if host.starts_with("s3.") {
            return Self::from_path(path);
        }

        None
    }

    fn from_path(path: &str) -> Option<Self> {
        let (bucket, key) = path.split_once('/').unwrap_or((path, ""));
        if bucket.is_empty() {
            return None;
        }
        Some(Self {
            bucket: bucket.to_string(),
            key: key.to_string(),
        })
    }
}

impl fmt::Display for S3Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.key.is_empty() {
            write!(f, "s3://{}", self.bucket)
        } else {
            write!(f, "s3://{}/{}", self.bucket, self.key)
        }
    }
}

impl FromStr for S3Url {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("not an S3 URL: '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_s3_scheme() {
        let url = S3Url::parse("s3://my-bucket/path/to/file.txt").unwrap();
        assert_eq!(url.bucket, "my-bucket");
        assert_eq!(url.key, "path/to/file.txt");
    }

    #[test]
    fn test_parse_s3_bucket_only() {
        for input in ["s3://my-bucket", "s3://my-bucket/"] {
            let url = S3Url::parse(input).unwrap();
            assert_eq!(url.bucket, "my-bucket");
            assert_eq!(url.key, "");
        }
    }

    #[test]
    fn test_parse_keeps_prefix_slash() {
        let url = S3Url::parse("s3://bucket/logs/2024/").unwrap();
        assert_eq!(url.key, "logs/2024/");
    }

    #[test]
    fn test_parse_https_virtual_hosted() {
        let url = S3Url::parse("https://my-bucket.s3.eu-west-1.amazonaws.com/path/to/file.txt").unwrap();
        assert_eq!(url.bucket, "my-bucket");
        assert_eq!(url.key, "path/to/file.txt");
    }

    #[test]
    fn test_parse_https_path_style() {
        let url = S3Url::parse("https://s3.eu-west-1.amazonaws.com/my-bucket/path/to/file.txt").unwrap();
        assert_eq!(url.bucket, "my-bucket");
        assert_eq!(url.key, "path/to/file.txt");
    }

    #[test]
    fn test_parse_https_decodes_key() {
        let url = S3Url::parse("https://my-bucket.s3.amazonaws.com/reports/my%20file%2B1.txt").unwrap();
        assert_eq!(url.key, "reports/my file+1.txt");

        let url = S3Url::parse("https://s3.us-east-1.amazonaws.com/my-bucket/caf%C3%A9.txt").unwrap();
        assert_eq!(url.bucket, "my-bucket");
        assert_eq!(url.key, "café.txt");

        assert!(S3Url::parse("https://my-bucket.s3.amazonaws.com/bad%FF").is_none());
    }

    #[test]
    fn test_parse_invalid() {
        assert!(S3Url::parse("https://example.com/file.txt").is_none());
        assert!(S3Url::parse("ftp://bucket/key").is_none());
        assert!(S3Url::parse("s3://").is_none());
        assert!(S3Url::parse("not-a-url").is_none());
        assert!(S3Url::parse("").is_none());
    }

    #[test]
    fn test_display() {
        let url = S3Url {
            bucket: "test-bucket".to_string(),
            key: "folder/file.txt".to_string(),
        };
        assert_eq!(url.to_string(), "s3://test-bucket/folder/file.txt");

        let bucket_only = S3Url {
            bucket: "test-bucket".to_string(),
            key: String::new(),
        };
        assert_eq!(bucket_only.to_string(), "s3://test-bucket");
    }

    #[test]
    fn test_from_str() {
        let url: S3Url = "s3://b/k".parse().unwrap();
        assert_eq!(url.bucket, "b");
        assert!("nope".parse::<S3Url>().unwrap_err().contains("nope"));
    }
}
