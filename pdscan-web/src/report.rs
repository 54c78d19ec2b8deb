//! PDF report rendering
//!
//! Single Letter page: title, recipient, timestamp, verdict, aggregate
//! confidence, per-modality confidence chart and the fixed advice list.
//! Built directly with `lopdf` using the standard Helvetica fonts.

use chrono::Local;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};
use pdscan_common::content::MEDICAL_ADVICE;
use pdscan_common::fusion::ModalityResult;
use pdscan_common::{Error, FusionOutcome, Modality, Result};
use std::path::PathBuf;
use tracing::{debug, info};
use uuid::Uuid;

const PAGE_WIDTH: f32 = 612.0;
const PAGE_HEIGHT: f32 = 792.0;
const MARGIN: f32 = 72.0;

/// WinAnsi code for the bullet glyph
const BULLET: u8 = 0x95;

/// Everything printed in a report
#[derive(Debug, Clone)]
pub struct ReportInput {
    /// Display name the report is generated for
    pub name: String,
    pub outcome: FusionOutcome,
    /// Per-modality confidences for the chart, in display order
    pub results: Vec<ModalityResult>,
    /// "YYYY-MM-DD HH:MM:SS"
    pub timestamp: String,
}

impl ReportInput {
    /// Stamp a report with the current local time
    pub fn now(name: impl Into<String>, outcome: FusionOutcome, results: Vec<ModalityResult>) -> Self {
        Self {
            name: name.into(),
            outcome,
            results,
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// Deterministic report filename for a display name
///
/// Characters outside `[A-Za-z0-9_-]` become `_` so the name is safe as a
/// single path component.
pub fn report_filename(name: &str) -> String {
    let safe: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("Parkinsons_Disease_Report_{}.pdf", safe)
}

/// Writes reports under `<reports_dir>/<session id>/`
///
/// Sessions never share a directory, so two users with the same display
/// name cannot overwrite each other's report.
#[derive(Debug, Clone)]
pub struct ReportRenderer {
    reports_dir: PathBuf,
}

impl ReportRenderer {
    pub fn new(reports_dir: PathBuf) -> Self {
        Self { reports_dir }
    }

    /// Directory holding one session's reports
    pub fn session_dir(&self, session: Uuid) -> PathBuf {
        self.reports_dir.join(session.to_string())
    }

    /// Render and write the report, returning its path
    pub fn render(&self, session: Uuid, input: &ReportInput) -> Result<PathBuf> {
        let bytes = render_pdf(input)?;

        let dir = self.session_dir(session);
        std::fs::create_dir_all(&dir)?;
        let path = dir.join(report_filename(&input.name));
        std::fs::write(&path, &bytes)?;

        info!(
            "Report generated: {} ({} bytes, verdict {})",
            path.display(),
            bytes.len(),
            input.outcome.verdict
        );
        Ok(path)
    }

    /// Delete everything rendered for a session; missing directory is fine
    pub async fn remove_session(&self, session: Uuid) -> Result<()> {
        let dir = self.session_dir(session);
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => {
                debug!("Removed reports in {}", dir.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Encode text for a WinAnsi literal string; unsupported characters become '?'
fn pdf_text(text: &str) -> Object {
    let bytes = text
        .chars()
        .map(|c| match c {
            '\u{2022}' => BULLET,
            c if (c as u32) < 0x80 => c as u8,
            c if (0xA0..=0xFF).contains(&(c as u32)) => c as u32 as u8,
            _ => b'?',
        })
        .collect();
    Object::String(bytes, StringFormat::Literal)
}

/// Accumulates page content top to bottom
struct PageWriter {
    ops: Vec<Operation>,
    y: f32,
}

impl PageWriter {
    fn new() -> Self {
        Self {
            ops: Vec::new(),
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn text_at(&mut self, font: &str, size: f32, x: f32, y: f32, text: &str) {
        self.ops.push(Operation::new("BT", vec![]));
        self.ops
            .push(Operation::new("Tf", vec![font.into(), size.into()]));
        self.ops.push(Operation::new("Td", vec![x.into(), y.into()]));
        self.ops.push(Operation::new("Tj", vec![pdf_text(text)]));
        self.ops.push(Operation::new("ET", vec![]));
    }

    /// Write one line at the cursor and advance by `size + space_after`
    fn line(&mut self, font: &str, size: f32, text: &str, space_after: f32) {
        self.y -= size;
        let y = self.y;
        self.text_at(font, size, MARGIN, y, text);
        self.y -= space_after;
    }

    fn centered(&mut self, font: &str, size: f32, text: &str, space_after: f32) {
        self.y -= size;
        // Helvetica averages roughly half an em per glyph
        let width = text.chars().count() as f32 * size * 0.5;
        let x = ((PAGE_WIDTH - width) / 2.0).max(MARGIN);
        let y = self.y;
        self.text_at(font, size, x, y, text);
        self.y -= space_after;
    }

    fn spacer(&mut self, height: f32) {
        self.y -= height;
    }

    fn fill_rect(&mut self, rgb: [f32; 3], x: f32, y: f32, w: f32, h: f32) {
        self.ops.push(Operation::new("q", vec![]));
        self.ops.push(Operation::new(
            "rg",
            vec![rgb[0].into(), rgb[1].into(), rgb[2].into()],
        ));
        self.ops
            .push(Operation::new("re", vec![x.into(), y.into(), w.into(), h.into()]));
        self.ops.push(Operation::new("f", vec![]));
        self.ops.push(Operation::new("Q", vec![]));
    }

    fn stroke_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        self.ops.push(Operation::new("m", vec![x1.into(), y1.into()]));
        self.ops.push(Operation::new("l", vec![x2.into(), y2.into()]));
        self.ops.push(Operation::new("S", vec![]));
    }

    /// Bar chart of raw confidences on a 0..1 axis
    fn confidence_chart(&mut self, results: &[ModalityResult]) {
        const CHART_HEIGHT: f32 = 100.0;
        const BAR_WIDTH: f32 = 40.0;
        const BAR_GAP: f32 = 30.0;

        self.line("F2", 12.0, "Model Confidence Levels", 8.0);

        let base_y = self.y - CHART_HEIGHT;
        let axis_x = MARGIN + 30.0;

        self.stroke_line(axis_x, base_y, axis_x, base_y + CHART_HEIGHT);
        self.stroke_line(axis_x, base_y, axis_x + 3.0 * (BAR_WIDTH + BAR_GAP) + BAR_GAP, base_y);
        self.text_at("F1", 8.0, MARGIN, base_y + CHART_HEIGHT - 4.0, "1.0");
        self.text_at("F1", 8.0, MARGIN, base_y - 2.0, "0.0");

        for (index, result) in results.iter().enumerate() {
            let x = axis_x + BAR_GAP + index as f32 * (BAR_WIDTH + BAR_GAP);
            let height = result.confidence.value() as f32 * CHART_HEIGHT;
            self.fill_rect(bar_color(result.modality), x, base_y, BAR_WIDTH, height);
            self.text_at("F1", 9.0, x + 4.0, base_y - 12.0, result.modality.short_label());
            self.text_at(
                "F1",
                8.0,
                x + 4.0,
                base_y + height + 3.0,
                &format!("{:.2}", result.confidence.value()),
            );
        }

        self.y = base_y - 24.0;
    }
}

fn bar_color(modality: Modality) -> [f32; 3] {
    match modality {
        Modality::Spiral => [0.85, 0.1, 0.1],
        Modality::Mri => [0.1, 0.6, 0.1],
        Modality::Wave => [0.1, 0.2, 0.85],
    }
}

fn pdf_err(e: impl std::fmt::Display) -> Error {
    Error::Report(e.to_string())
}

/// Render a report to PDF bytes
pub fn render_pdf(input: &ReportInput) -> Result<Vec<u8>> {
    let mut page = PageWriter::new();

    page.centered("F2", 20.0, "Parkinson's Disease Detection Report", 12.0);
    page.spacer(12.0);

    page.line("F1", 11.0, &format!("Generated for: {}", input.name), 4.0);
    page.line("F1", 11.0, &format!("Report Timestamp: {}", input.timestamp), 4.0);
    page.spacer(12.0);

    page.line(
        "F2",
        14.0,
        &format!("Final Prediction: {}", input.outcome.verdict.label()),
        12.0,
    );
    page.line(
        "F2",
        14.0,
        &format!("Confidence: {:.2}%", input.outcome.aggregate_confidence),
        12.0,
    );
    page.spacer(12.0);

    if !input.results.is_empty() {
        page.confidence_chart(&input.results);
    }

    page.line("F2", 14.0, "Medical Advice", 8.0);
    for item in MEDICAL_ADVICE {
        page.line("F1", 11.0, &format!("\u{2022} {}", item), 6.0);
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular_id,
            "F2" => bold_id,
        },
    });

    let content = Content { operations: page.ops };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().map_err(pdf_err)?));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal("Parkinson's Disease Detection Report"),
        "Producer" => Object::string_literal(concat!("pdscan-web ", env!("CARGO_PKG_VERSION"))),
    });
    doc.trailer.set("Info", info_id);

    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).map_err(pdf_err)?;
    Ok(bytes)
}
