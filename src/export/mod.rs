//! Vector text export: production artwork for every text object.
//!
//! DESIGN
//! ======
//! Runs once, at order creation, over a saved [`DesignState`]. Each text
//! object becomes a standalone SVG sized to the object's box. When its font
//! family is in the [`FontBook`] the glyphs are outlined to `<path>` data so
//! the print shop needs no fonts; otherwise a `<text>` element carries the
//! font attributes.
//!
//! Uploading prefers artifacts generated earlier (by the browser, say) and
//! only regenerates what is missing. A failed export or upload is logged and
//! reported; it never fails the order.

pub mod fonts;
pub mod store;

use std::collections::BTreeMap;

use futures::future::join_all;
use serde::{Deserialize, Serialize};

use canvas::color::normalize_hex;
use canvas::scene::{Content, ObjectId, TextContent};

use crate::design::{DesignState, PlacedObject, SideDesign};
use crate::diagnostic::Diagnostic;

use self::fonts::{FontBook, ascent, line_width, outline_line};
use self::store::ArtifactStore;

pub const SVG_CONTENT_TYPE: &str = "image/svg+xml";

/// Line box height as a multiple of font size.
const LINE_HEIGHT: f64 = 1.16;

/// Baseline offset, as a multiple of font size, when no font metrics exist.
const FALLBACK_ASCENT_RATIO: f64 = 0.8;

// =============================================================================
// TYPES
// =============================================================================

/// One exported text object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSvg {
    pub object_id: ObjectId,
    pub svg: String,
    /// Whether glyphs were outlined (`false`: `<text>` element).
    pub outlined: bool,
}

/// Where an object's artifact was stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedArtifact {
    pub object_id: ObjectId,
    pub url: String,
}

/// Artifacts generated ahead of time, keyed by side id.
pub type PregeneratedExports = BTreeMap<String, Vec<ExportedArtifact>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportReport {
    pub sides: BTreeMap<String, Vec<TextSvg>>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReport {
    pub artifacts: BTreeMap<String, Vec<ExportedArtifact>>,
    /// Artifacts taken from the pre-generated map.
    pub reused: usize,
    /// Artifacts rendered and uploaded in this pass.
    pub uploaded: usize,
    pub diagnostics: Vec<Diagnostic>,
}

// =============================================================================
// EXPORT
// =============================================================================

/// Render every text object of every side.
#[must_use]
pub fn export_text(state: &DesignState, fonts: &FontBook) -> ExportReport {
    let mut report = ExportReport::default();
    for (side_id, design) in state.sides() {
        let (svgs, diags) = export_side(side_id, design, fonts);
        report.diagnostics.extend(diags);
        report.sides.insert(side_id.to_string(), svgs);
    }
    tracing::info!(
        sides = report.sides.len(),
        files = report.sides.values().map(Vec::len).sum::<usize>(),
        failed = report.diagnostics.len(),
        "text exported"
    );
    report
}

/// Render the text objects of one side, skipping those that fail.
#[must_use]
pub fn export_side(side_id: &str, design: &SideDesign, fonts: &FontBook) -> (Vec<TextSvg>, Vec<Diagnostic>) {
    let mut svgs = Vec::new();
    let mut diagnostics = Vec::new();
    for object in &design.objects {
        let Content::Text(text) = &object.content else {
            continue;
        };
        match render_text_svg(object, text, fonts) {
            Ok(svg) => svgs.push(svg),
            Err(reason) => {
                let d = Diagnostic::Export { side_id: side_id.to_string(), object_id: object.object_id, reason };
                tracing::warn!(side_id = %side_id, error = %d, "text export failed");
                diagnostics.push(d);
            }
        }
    }
    (svgs, diagnostics)
}

/// Export and persist every text object. Objects with a pre-generated
/// artifact are not re-rendered.
pub async fn export_and_upload(
    state: &DesignState,
    pregenerated: Option<&PregeneratedExports>,
    fonts: &FontBook,
    store: &dyn ArtifactStore,
) -> UploadReport {
    let mut report = UploadReport::default();
    let mut pending = Vec::new();

    for (side_id, design) in state.sides() {
        if !is_safe_segment(side_id) {
            for object in design.objects.iter().filter(|o| matches!(o.content, Content::Text(_))) {
                let d = Diagnostic::Export {
                    side_id: side_id.to_string(),
                    object_id: object.object_id,
                    reason: "side id is not a valid artifact path segment".into(),
                };
                tracing::warn!(side_id = %side_id, error = %d, "artifact skipped");
                report.diagnostics.push(d);
            }
            continue;
        }

        let ready: BTreeMap<ObjectId, &ExportedArtifact> = pregenerated
            .and_then(|p| p.get(side_id))
            .map(|list| list.iter().map(|a| (a.object_id, a)).collect())
            .unwrap_or_default();

        let mut missing = SideDesign::default();
        for object in &design.objects {
            if !matches!(object.content, Content::Text(_)) {
                continue;
            }
            match ready.get(&object.object_id) {
                Some(artifact) => {
                    report.artifacts.entry(side_id.to_string()).or_default().push((*artifact).clone());
                    report.reused += 1;
                }
                None => missing.objects.push(object.clone()),
            }
        }

        let (svgs, diags) = export_side(side_id, &missing, fonts);
        report.diagnostics.extend(diags);
        pending.extend(svgs.into_iter().map(|svg| (side_id.to_string(), svg)));
    }

    let uploads = join_all(pending.into_iter().map(|(side_id, svg)| async move {
        let name = format!("{side_id}/{}.svg", svg.object_id);
        let result = store.put(&name, SVG_CONTENT_TYPE, svg.svg.into_bytes()).await;
        (side_id, svg.object_id, result)
    }))
    .await;

    for (side_id, object_id, result) in uploads {
        match result {
            Ok(url) => {
                report.artifacts.entry(side_id).or_default().push(ExportedArtifact { object_id, url });
                report.uploaded += 1;
            }
            Err(e) => {
                let d = Diagnostic::Export { side_id: side_id.clone(), object_id, reason: e.to_string() };
                tracing::warn!(side_id = %side_id, error = %d, "artifact upload failed");
                report.diagnostics.push(d);
            }
        }
    }

    tracing::info!(reused = report.reused, uploaded = report.uploaded, failed = report.diagnostics.len(), "artifacts stored");
    report
}

// =============================================================================
// SVG
// =============================================================================

/// Standalone SVG for one text object, in the object's local coordinates.
///
/// # Errors
///
/// Returns the reason when the object has no drawable text.
pub fn render_text_svg(object: &PlacedObject, text: &TextContent, fonts: &FontBook) -> Result<TextSvg, String> {
    if text.text.trim().is_empty() {
        return Err("empty text".into());
    }
    if !(text.font_size.is_finite() && text.font_size > 0.0) {
        return Err("font size must be positive".into());
    }
    let fill = normalize_hex(&text.fill).ok_or_else(|| format!("invalid fill {:?}", text.fill))?;
    let t = &object.transform;
    let (w, h) = (t.width.max(0.0), t.height.max(0.0));

    let mut svg = String::new();
    svg.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" viewBox=\"0 0 {} {}\">\n",
        num(t.scaled_width()),
        num(t.scaled_height()),
        num(w),
        num(h),
    ));
    svg.push_str(&format!("<g{}{}>\n", flip_transform(object, w, h), opacity_attr(object.opacity)));

    let font = fonts.get(&text.font_family, text.is_bold(), text.is_italic());
    let lines: Vec<&str> = text.text.lines().collect();
    let line_height = text.font_size * LINE_HEIGHT;
    match font {
        Some(font) => {
            #[allow(clippy::cast_possible_truncation)]
            let size = text.font_size as f32;
            let top = f64::from(ascent(font, size));
            let mut d = Vec::new();
            for (i, line) in lines.iter().enumerate() {
                let lw = f64::from(line_width(font, line, size));
                let x = align_offset(&text.text_align, w, lw);
                #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
                let baseline = (top + i as f64 * line_height) as f32;
                #[allow(clippy::cast_possible_truncation)]
                let path = outline_line(font, line, size, x as f32, baseline);
                if !path.is_empty() {
                    d.push(path);
                }
            }
            svg.push_str(&format!("<path d=\"{}\" fill=\"{fill}\"/>\n", d.join(" ")));
        }
        None => {
            let (anchor, x) = match text.text_align.as_str() {
                "center" => ("middle", w / 2.0),
                "right" | "end" => ("end", w),
                _ => ("start", 0.0),
            };
            for (i, line) in lines.iter().enumerate() {
                #[allow(clippy::cast_precision_loss)]
                let y = text.font_size * FALLBACK_ASCENT_RATIO + i as f64 * line_height;
                svg.push_str(&format!(
                    "<text x=\"{}\" y=\"{}\" font-family=\"{}\" font-size=\"{}\" font-weight=\"{}\" font-style=\"{}\" text-anchor=\"{anchor}\" fill=\"{fill}\" xml:space=\"preserve\">{}</text>\n",
                    num(x),
                    num(y),
                    xml_escape(&text.font_family),
                    num(text.font_size),
                    xml_escape(&text.font_weight),
                    xml_escape(&text.font_style),
                    xml_escape(line),
                ));
            }
        }
    }

    svg.push_str("</g>\n</svg>\n");
    Ok(TextSvg { object_id: object.object_id, svg, outlined: font.is_some() })
}

/// Side ids become one path segment of the artifact name: ASCII letters,
/// digits, `-`, `_` and `.`, but not `.` or `..` alone.
fn is_safe_segment(id: &str) -> bool {
    !id.is_empty()
        && id != "."
        && id != ".."
        && id.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

fn align_offset(align: &str, box_width: f64, line_width: f64) -> f64 {
    match align {
        "center" => (box_width - line_width) / 2.0,
        "right" | "end" => box_width - line_width,
        _ => 0.0,
    }
}

fn flip_transform(object: &PlacedObject, w: f64, h: f64) -> String {
    let t = &object.transform;
    let mut ops = Vec::new();
    if t.flip_x {
        ops.push(format!("translate({} 0) scale(-1 1)", num(w)));
    }
    if t.flip_y {
        ops.push(format!("translate(0 {}) scale(1 -1)", num(h)));
    }
    if ops.is_empty() { String::new() } else { format!(" transform=\"{}\"", ops.join(" ")) }
}

fn opacity_attr(opacity: f64) -> String {
    if opacity < 1.0 { format!(" opacity=\"{}\"", num(opacity.max(0.0))) } else { String::new() }
}

/// Compact number formatting: at most two decimals, no trailing zeros.
fn num(v: f64) -> String {
    let s = format!("{v:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

/// Escape the five XML special characters.
fn xml_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
#[path = "export_test.rs"]
mod tests;
