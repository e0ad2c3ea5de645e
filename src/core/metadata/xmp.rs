//! XMP document rendering
//!
//! Renders an image's curation fields into an XMP packet. The same document
//! is embedded into JPEG files and written as a sidecar next to RAW files.
//!
//! # Example
//!
//! ```
//! use keepsake::core::metadata::xmp::render;
//! use keepsake::domain::ImageRecord;
//!
//! let image = ImageRecord::builder()
//!     .id("img-1").unwrap()
//!     .primary_key("p/a.jpg").unwrap()
//!     .rating(5)
//!     .group(3)
//!     .build()
//!     .unwrap();
//!
//! let doc = render(&image, "Coast & Cliffs");
//! assert!(doc.contains(r#"xmp:Rating="5""#));
//! assert!(doc.contains(r#"xmp:Label="Green""#));
//! assert!(doc.contains("Coast &amp; Cliffs"));
//! ```

use crate::domain::image::ImageRecord;

const XPACKET_ID: &str = "W5M0MpCehiHzreSzNTczkc9d";
const NS_X: &str = "adobe:ns:meta/";
const NS_RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
const NS_DC: &str = "http://purl.org/dc/elements/1.1/";
const NS_XMP: &str = "http://ns.adobe.com/xap/1.0/";

/// Renders the XMP document for one image
///
/// Rating is written only for 1-5 and the label only for group numbers that
/// map to a color. Description and keywords are omitted when empty. All free
/// text is XML-escaped. Output is deterministic for identical input.
pub fn render(record: &ImageRecord, project_name: &str) -> String {
    let mut doc = String::with_capacity(1024);

    doc.push_str(&format!("<?xpacket begin=\"\u{feff}\" id=\"{XPACKET_ID}\"?>\n"));
    doc.push_str(&format!("<x:xmpmeta xmlns:x=\"{NS_X}\">\n"));
    doc.push_str(&format!(" <rdf:RDF xmlns:rdf=\"{NS_RDF}\">\n"));
    doc.push_str("  <rdf:Description rdf:about=\"\"\n");
    doc.push_str(&format!("    xmlns:dc=\"{NS_DC}\"\n"));
    doc.push_str(&format!("    xmlns:xmp=\"{NS_XMP}\""));

    if (1..=5).contains(&record.rating) {
        doc.push_str(&format!("\n    xmp:Rating=\"{}\"", record.rating));
    }
    if let Some(label) = record.color_label() {
        doc.push_str(&format!("\n    xmp:Label=\"{label}\""));
    }
    doc.push_str(">\n");

    doc.push_str(&alt_element("dc:title", project_name));

    if !record.description.is_empty() {
        doc.push_str(&alt_element("dc:description", &record.description));
    }

    if !record.keywords.is_empty() {
        doc.push_str("   <dc:subject>\n    <rdf:Bag>\n");
        for keyword in &record.keywords {
            doc.push_str(&format!("     <rdf:li>{}</rdf:li>\n", escape_xml(keyword)));
        }
        doc.push_str("    </rdf:Bag>\n   </dc:subject>\n");
    }

    doc.push_str("  </rdf:Description>\n");
    doc.push_str(" </rdf:RDF>\n");
    doc.push_str("</x:xmpmeta>\n");
    doc.push_str("<?xpacket end=\"w\"?>");
    doc
}

/// Language-alternative element holding one default-language value
fn alt_element(name: &str, value: &str) -> String {
    format!(
        "   <{name}><rdf:Alt><rdf:li xml:lang=\"x-default\">{}</rdf:li></rdf:Alt></{name}>\n",
        escape_xml(value)
    )
}

/// Escapes the five XML special characters
pub fn escape_xml(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
