//! JPEG segment editing
//!
//! Parses a JPEG byte stream into its marker-delimited segments and replaces
//! or inserts the XMP `APP1` segment. All other segments, including the
//! entropy-coded scan data, are written back byte-for-byte in their
//! original order.
//!
//! The whole file must be in memory; segments are not parsed incrementally.
//!
//! # Example
//!
//! ```
//! use keepsake::core::metadata::jpeg::{embed, extract};
//!
//! // SOI, APP0 (empty JFIF), EOI
//! let jpeg = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x02, 0xFF, 0xD9];
//! let tagged = embed(&jpeg, "<x:xmpmeta/>").unwrap();
//! assert_eq!(extract(&tagged).unwrap().as_deref(), Some("<x:xmpmeta/>"));
//! ```

use crate::domain::errors::ContainerError;

/// Namespace identifier that opens every XMP `APP1` payload
pub const XMP_IDENTIFIER: &[u8] = b"http://ns.adobe.com/xap/1.0/";

/// Largest payload a length-prefixed segment can carry
pub const MAX_SEGMENT_PAYLOAD: usize = u16::MAX as usize - 2;

/// Marker codes used by the editor
pub mod marker {
    pub const TEM: u8 = 0x01;
    pub const SOI: u8 = 0xD8;
    pub const EOI: u8 = 0xD9;
    pub const SOS: u8 = 0xDA;
    pub const APP0: u8 = 0xE0;
    pub const APP1: u8 = 0xE1;

    /// Restart markers carry no length field
    pub fn is_restart(code: u8) -> bool {
        (0xD0..=0xD7).contains(&code)
    }
}

/// One unit of a JPEG stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Marker without a length field (SOI, EOI, RSTn, TEM)
    Standalone(u8),
    /// Length-prefixed segment; `payload` excludes the length field
    Data { marker: u8, payload: Vec<u8> },
    /// Start-of-scan header followed by its entropy-coded data
    Scan { header: Vec<u8>, data: Vec<u8> },
}

impl Segment {
    /// Marker code of the segment
    pub fn marker(&self) -> u8 {
        match self {
            Segment::Standalone(code) => *code,
            Segment::Data { marker, .. } => *marker,
            Segment::Scan { .. } => marker::SOS,
        }
    }

    /// XMP document bytes if this is an XMP `APP1` segment
    pub fn xmp_document(&self) -> Option<&[u8]> {
        match self {
            Segment::Data {
                marker: marker::APP1,
                payload,
            } => payload
                .strip_prefix(XMP_IDENTIFIER)
                .and_then(|rest| rest.strip_prefix(&[0u8][..])),
            _ => None,
        }
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        match self {
            Segment::Standalone(code) => out.extend_from_slice(&[0xFF, *code]),
            Segment::Data { marker, payload } => {
                out.extend_from_slice(&[0xFF, *marker]);
                out.extend_from_slice(&length_field(payload.len()));
                out.extend_from_slice(payload);
            }
            Segment::Scan { header, data } => {
                out.extend_from_slice(&[0xFF, marker::SOS]);
                out.extend_from_slice(&length_field(header.len()));
                out.extend_from_slice(header);
                out.extend_from_slice(data);
            }
        }
    }

    fn encoded_len(&self) -> usize {
        match self {
            Segment::Standalone(_) => 2,
            Segment::Data { payload, .. } => 4 + payload.len(),
            Segment::Scan { header, data } => 4 + header.len() + data.len(),
        }
    }
}

// Payload lengths are bounded by MAX_SEGMENT_PAYLOAD at construction.
fn length_field(payload_len: usize) -> [u8; 2] {
    ((payload_len + 2) as u16).to_be_bytes()
}

/// A parsed JPEG stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JpegContainer {
    segments: Vec<Segment>,
    /// `0xFF` fill bytes preceding each segment's marker, index-aligned with `segments`
    fill: Vec<usize>,
    /// Bytes after the end-of-image marker, kept verbatim
    trailer: Vec<u8>,
}

impl JpegContainer {
    /// Parses a JPEG byte stream into segments
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::Malformed`] if the stream does not start with
    /// a start-of-image marker, a marker prefix is missing where one is
    /// required, or a segment length runs past the end of the input.
    pub fn parse(bytes: &[u8]) -> Result<Self, ContainerError> {
        if bytes.len() < 2 || bytes[0] != 0xFF || bytes[1] != marker::SOI {
            return Err(ContainerError::malformed(0, "missing start-of-image marker"));
        }

        let mut segments = vec![Segment::Standalone(marker::SOI)];
        let mut fill = vec![0];
        let mut trailer = Vec::new();
        let mut pos = 2;

        while pos < bytes.len() {
            if bytes[pos] != 0xFF {
                return Err(ContainerError::malformed(
                    pos,
                    format!("expected marker prefix, found 0x{:02X}", bytes[pos]),
                ));
            }

            // Fill bytes may precede a marker.
            let mut code_pos = pos + 1;
            while code_pos < bytes.len() && bytes[code_pos] == 0xFF {
                code_pos += 1;
            }
            let Some(&code) = bytes.get(code_pos) else {
                return Err(ContainerError::malformed(pos, "truncated marker"));
            };
            let padding = code_pos - pos - 1;
            pos = code_pos + 1;

            match code {
                marker::EOI => {
                    segments.push(Segment::Standalone(code));
                    fill.push(padding);
                    trailer.extend_from_slice(&bytes[pos..]);
                    break;
                }
                marker::SOI | 0x00 => {
                    return Err(ContainerError::malformed(
                        code_pos,
                        format!("unexpected marker 0x{code:02X}"),
                    ));
                }
                c if c == marker::TEM || marker::is_restart(c) => {
                    segments.push(Segment::Standalone(c));
                    fill.push(padding);
                }
                _ => {
                    let payload = read_payload(bytes, pos)?;
                    pos += payload.len() + 2;

                    if code == marker::SOS {
                        let end = scan_data_end(bytes, pos);
                        segments.push(Segment::Scan {
                            header: payload.to_vec(),
                            data: bytes[pos..end].to_vec(),
                        });
                        pos = end;
                    } else {
                        segments.push(Segment::Data {
                            marker: code,
                            payload: payload.to_vec(),
                        });
                    }
                    fill.push(padding);
                }
            }
        }

        Ok(Self {
            segments,
            fill,
            trailer,
        })
    }

    /// Segments in stream order; the first is always start-of-image
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Serializes the segments back into a byte stream
    pub fn to_bytes(&self) -> Vec<u8> {
        let len = self
            .segments
            .iter()
            .map(Segment::encoded_len)
            .sum::<usize>()
            + self.fill.iter().sum::<usize>()
            + self.trailer.len();
        let mut out = Vec::with_capacity(len);
        for (segment, padding) in self.segments.iter().zip(&self.fill) {
            out.resize(out.len() + padding, 0xFF);
            segment.write_to(&mut out);
        }
        out.extend_from_slice(&self.trailer);
        out
    }

    /// The embedded XMP document, if any
    pub fn xmp_document(&self) -> Option<&[u8]> {
        self.segments.iter().find_map(Segment::xmp_document)
    }

    /// Removes every XMP segment, returning how many were removed
    pub fn remove_xmp(&mut self) -> usize {
        let before = self.segments.len();
        let (segments, fill): (Vec<Segment>, Vec<usize>) = self
            .segments
            .drain(..)
            .zip(self.fill.drain(..))
            .filter(|(segment, _)| segment.xmp_document().is_none())
            .unzip();
        self.segments = segments;
        self.fill = fill;
        before - self.segments.len()
    }

    /// Replaces any XMP segment with one carrying `document`
    ///
    /// The new segment goes right after start-of-image, or after an `APP0`
    /// segment that directly follows it, ahead of tables and scan data.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::PayloadTooLarge`] if the document does not
    /// fit in one segment. The container is left unchanged in that case.
    pub fn set_xmp(&mut self, document: &str) -> Result<(), ContainerError> {
        let size = XMP_IDENTIFIER.len() + 1 + document.len();
        if size > MAX_SEGMENT_PAYLOAD {
            return Err(ContainerError::PayloadTooLarge {
                size,
                limit: MAX_SEGMENT_PAYLOAD,
            });
        }

        let mut payload = Vec::with_capacity(size);
        payload.extend_from_slice(XMP_IDENTIFIER);
        payload.push(0);
        payload.extend_from_slice(document.as_bytes());

        self.remove_xmp();

        let index = match self.segments.get(1) {
            Some(Segment::Data {
                marker: marker::APP0,
                ..
            }) => 2,
            _ => 1,
        };
        self.segments.insert(
            index,
            Segment::Data {
                marker: marker::APP1,
                payload,
            },
        );
        self.fill.insert(index, 0);
        Ok(())
    }
}

fn read_payload(bytes: &[u8], pos: usize) -> Result<&[u8], ContainerError> {
    let Some(len_bytes) = bytes.get(pos..pos + 2) else {
        return Err(ContainerError::malformed(pos, "truncated segment length"));
    };
    let len = u16::from_be_bytes([len_bytes[0], len_bytes[1]]) as usize;
    if len < 2 {
        return Err(ContainerError::malformed(
            pos,
            format!("invalid segment length {len}"),
        ));
    }
    bytes
        .get(pos + 2..pos + len)
        .ok_or_else(|| ContainerError::malformed(pos, "segment length exceeds input"))
}

/// Offset of the first real marker after entropy-coded data starting at `start`
///
/// Stuffed `FF 00` pairs and restart markers belong to the scan.
fn scan_data_end(bytes: &[u8], start: usize) -> usize {
    let mut i = start;
    while i + 1 < bytes.len() {
        if bytes[i] == 0xFF {
            let next = bytes[i + 1];
            if next != 0x00 && !marker::is_restart(next) {
                return i;
            }
            i += 2;
        } else {
            i += 1;
        }
    }
    bytes.len()
}

/// Embeds `document` as the XMP segment of `jpeg`
///
/// Any existing XMP segment is replaced, so embedding twice leaves exactly
/// one.
pub fn embed(jpeg: &[u8], document: &str) -> Result<Vec<u8>, ContainerError> {
    let mut container = JpegContainer::parse(jpeg)?;
    container.set_xmp(document)?;
    Ok(container.to_bytes())
}

/// Reads the embedded XMP document, if any
pub fn extract(jpeg: &[u8]) -> Result<Option<String>, ContainerError> {
    let container = JpegContainer::parse(jpeg)?;
    container
        .xmp_document()
        .map(|doc| {
            String::from_utf8(doc.to_vec()).map_err(|e| {
                ContainerError::malformed(e.utf8_error().valid_up_to(), "XMP document is not UTF-8")
            })
        })
        .transpose()
}
