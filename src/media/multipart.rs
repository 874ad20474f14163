//! Minimal `multipart/form-data` encoder for uploads.

use std::fmt::Write as _;

/// Accumulates form parts into one body.
pub(crate) struct Form {
    boundary: String,
    body: Vec<u8>,
}

impl Form {
    /// A form whose boundary does not occur in `payload`.
    pub(crate) fn new(payload: &[u8]) -> Self {
        let seed = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let mut boundary = format!("----wati-sdk-{seed:x}");
        while contains(payload, boundary.as_bytes()) {
            let _ = write!(boundary, "{:x}", boundary.len());
        }
        Self {
            boundary,
            body: Vec::new(),
        }
    }

    pub(crate) fn file(mut self, name: &str, file_name: &str, bytes: &[u8]) -> Self {
        self.header(name, Some(file_name));
        self.body
            .extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub(crate) fn text(mut self, name: &str, value: &str) -> Self {
        self.header(name, None);
        self.body.extend_from_slice(b"\r\n");
        self.body.extend_from_slice(value.as_bytes());
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// Adds a text part only when `value` is set and non-empty.
    pub(crate) fn optional_text(self, name: &str, value: Option<&str>) -> Self {
        match value {
            Some(v) if !v.is_empty() => self.text(name, v),
            _ => self,
        }
    }

    /// Content type header value and the closed body.
    pub(crate) fn finish(mut self) -> (String, Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        (
            format!("multipart/form-data; boundary={}", self.boundary),
            self.body,
        )
    }

    fn header(&mut self, name: &str, file_name: Option<&str>) {
        let mut head = format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"",
            self.boundary,
            escape(name)
        );
        if let Some(file_name) = file_name {
            let _ = write!(head, "; filename=\"{}\"", escape(file_name));
        }
        head.push_str("\r\n");
        self.body.extend_from_slice(head.as_bytes());
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parts_are_framed_by_boundary() {
        let (content_type, body) = Form::new(b"PNG")
            .file("file", "cat \"1\".png", b"PNG")
            .text("mediaType", "image")
            .optional_text("caption", None)
            .optional_text("description", Some(""))
            .finish();

        let boundary = content_type
            .strip_prefix("multipart/form-data; boundary=")
            .unwrap();
        let body = String::from_utf8(body).unwrap();
        assert_eq!(
            body,
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"cat \\\"1\\\".png\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\nPNG\r\n\
                 --{boundary}\r\nContent-Disposition: form-data; name=\"mediaType\"\r\n\r\nimage\r\n\
                 --{boundary}--\r\n"
            )
        );
    }

    #[test]
    fn boundary_avoids_payload() {
        let probe = Form::new(b"");
        let payload = probe.boundary.clone().into_bytes();
        let form = Form::new(&payload);
        assert!(!contains(&payload, form.boundary.as_bytes()));
    }
}
