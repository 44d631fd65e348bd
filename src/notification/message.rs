use std::{fs, path::PathBuf};

use lettre::message::{header::ContentType, Attachment, Mailbox, MultiPart, SinglePart};
use lettre::Message;
use log::debug;

use crate::{error::NotifyError, snapshot::DirectoryEntry};

pub const SUBJECT: &str = "Package Delivered.";
pub const BODY: &str = "Your package has arrived.";

/// Name the image is advertised under, whatever the snapshot is actually called
pub const ATTACHMENT_NAME: &str = "image.jpg";

/// Image bytes read from disk, ready to attach
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub source: PathBuf,
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl Snapshot {
    /// Reads the whole file and checks it is still the size it was when scanned
    pub fn read(entry: &DirectoryEntry) -> Result<Self, NotifyError> {
        let bytes = fs::read(&entry.path).map_err(|e| {
            NotifyError::message_build_with(format!("failed to read {:?}", entry.path), e)
        })?;
        if bytes.len() as u64 != entry.len {
            return Err(NotifyError::message_build(format!(
                "{:?} changed size while being read ({} bytes read, {} expected)",
                entry.path,
                bytes.len(),
                entry.len
            )));
        }
        Self::from_bytes(entry.path.clone(), bytes)
    }

    pub fn from_bytes(source: PathBuf, bytes: Vec<u8>) -> Result<Self, NotifyError> {
        let content_type = match sniff_image_type(&bytes) {
            Some(subtype) => format!("image/{subtype}"),
            None => guess_from_extension(&source).ok_or_else(|| {
                NotifyError::message_build(format!("{source:?} does not look like an image"))
            })?,
        };
        debug!(
            "Read {} bytes of {content_type} from {source:?}",
            bytes.len()
        );
        Ok(Self {
            source,
            bytes,
            content_type,
        })
    }
}

/// Identifies common image formats by their leading bytes
fn sniff_image_type(bytes: &[u8]) -> Option<&'static str> {
    const SIGNATURES: &[(&[u8], &str)] = &[
        (b"\xFF\xD8\xFF", "jpeg"),
        (b"\x89PNG\r\n\x1a\n", "png"),
        (b"GIF87a", "gif"),
        (b"GIF89a", "gif"),
        (b"BM", "bmp"),
        (b"II*\0", "tiff"),
        (b"MM\0*", "tiff"),
    ];
    if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        return Some("webp");
    }
    SIGNATURES
        .iter()
        .find(|(magic, _)| bytes.starts_with(magic))
        .map(|(_, subtype)| *subtype)
}

fn guess_from_extension(source: &std::path::Path) -> Option<String> {
    mime_guess::from_path(source)
        .iter()
        .find(|m| m.type_() == mime_guess::mime::IMAGE)
        .map(|m| m.essence_str().to_string())
}

/// Builds the notification: a plain text body followed by the snapshot as an image attachment
pub fn compose(
    sender: &str,
    recipient: &str,
    subject: &str,
    body: &str,
    snapshot: Snapshot,
    display_name: &str,
) -> Result<Message, NotifyError> {
    let from: Mailbox = sender
        .parse()
        .map_err(|e| NotifyError::message_build_with(format!("invalid sender {sender:?}"), e))?;
    let to: Mailbox = recipient.parse().map_err(|e| {
        NotifyError::message_build_with(format!("invalid recipient {recipient:?}"), e)
    })?;
    let content_type = ContentType::parse(&snapshot.content_type).map_err(|e| {
        NotifyError::message_build_with(
            format!("invalid content type {:?}", snapshot.content_type),
            e,
        )
    })?;

    let image = Attachment::new(display_name.to_string()).body(snapshot.bytes, content_type);

    Message::builder()
        .from(from)
        .to(to)
        .subject(subject)
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(body.to_string()))
                .singlepart(image),
        )
        .map_err(|e| NotifyError::message_build_with("failed to assemble message", e))
}
