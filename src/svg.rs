//! SVG input and output.
//!
//! Reading parses the asset as XML and takes the `d` attribute of the first
//! `<path>` element that has one. Writing wraps a curve description in a
//! standalone SVG document.

use roxmltree::{Document, ParsingOptions};
use serde::{Deserialize, Serialize};

/// The `d` attribute of the first `<path>` element, if there is one.
///
/// Comments and other non-element nodes are skipped, and entity references
/// in the attribute are decoded. Fails only when the document is not
/// well-formed XML.
pub fn extract_first_path_data(svg: &str) -> Result<Option<String>, String> {
    // Exported assets often carry a DOCTYPE.
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(svg, options)
        .map_err(|e| format!("Failed to parse SVG document: {}", e))?;

    Ok(doc
        .descendants()
        .filter(|node| node.has_tag_name("path"))
        .find_map(|node| node.attribute("d"))
        .map(|d| d.trim().to_string()))
}

/// Interpret file contents as either an SVG document or raw path data.
pub fn path_data_from_source(contents: &str) -> Result<String, String> {
    let trimmed = contents.trim();
    if trimmed.starts_with('<') {
        extract_first_path_data(trimmed)?
            .ok_or_else(|| "SVG document contains no <path> with a d attribute".to_string())
    } else {
        Ok(trimmed.to_string())
    }
}

fn default_view_box() -> String {
    "0 0 100 100".to_string()
}

fn default_width() -> u32 {
    1000
}

fn default_height() -> u32 {
    700
}

fn default_fill() -> String {
    "blue".to_string()
}

fn default_stroke() -> String {
    "black".to_string()
}

fn default_stroke_width() -> f64 {
    0.1
}

fn default_line_join() -> String {
    "round".to_string()
}

/// Presentation of rendered frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SvgStyle {
    #[serde(default = "default_view_box")]
    pub view_box: String,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_fill")]
    pub fill: String,
    #[serde(default = "default_stroke")]
    pub stroke: String,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
    #[serde(default = "default_line_join")]
    pub stroke_linejoin: String,
}

impl Default for SvgStyle {
    fn default() -> Self {
        Self {
            view_box: default_view_box(),
            width: default_width(),
            height: default_height(),
            fill: default_fill(),
            stroke: default_stroke(),
            stroke_width: default_stroke_width(),
            stroke_linejoin: default_line_join(),
        }
    }
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}

/// A complete SVG document containing one path drawn with `curve`.
pub fn render_frame_svg(curve: &str, style: &SvgStyle) -> String {
    format!(
        concat!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"{}\" width=\"{}\" height=\"{}\">\n",
            "  <path d=\"{}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\" stroke-linejoin=\"{}\"/>\n",
            "</svg>\n"
        ),
        escape_attr(&style.view_box),
        style.width,
        style.height,
        escape_attr(curve),
        escape_attr(&style.fill),
        escape_attr(&style.stroke),
        style.stroke_width,
        escape_attr(&style.stroke_linejoin),
    )
}
