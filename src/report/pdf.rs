//! PDF export: one chart per A4 page, its title above the image
use crate::error::DashboardError;
use crate::helpers::text::encode_win_ansi;
use crate::report::chart::ChartImage;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::path::Path;
use tracing::{debug, info};

/// A4 portrait in points
const PAGE_WIDTH: f32 = 595.28;
const PAGE_HEIGHT: f32 = 841.89;

const POINTS_PER_MM: f32 = 72.0 / 25.4;
const IMAGE_LEFT_MM: f32 = 10.0;
const IMAGE_TOP_MM: f32 = 20.0;
const IMAGE_WIDTH_MM: f32 = 180.0;
const TITLE_BASELINE_MM: f32 = 14.0;
const TITLE_FONT_SIZE: f32 = 14.0;

/// Writes `images` to `output` as a PDF with one page per chart.
///
/// The image files are only read; releasing them stays with the caller.
pub fn export_pdf(images: &[ChartImage], output: &Path) -> Result<(), DashboardError> {
    if images.is_empty() {
        Err(DashboardError::ChartError("PDF report".to_owned(), "no charts to export".to_owned()))?
    }

    let mut document = Document::with_version("1.5");
    let pages_id = document.new_object_id();
    let font_id = document.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });

    let mut kids: Vec<Object> = Vec::with_capacity(images.len());
    for image in images {
        let page_id = add_page(&mut document, pages_id, font_id, image)?;
        kids.push(page_id.into());
    }
    let count = kids.len() as i64;
    document.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = document.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    document.trailer.set("Root", catalog_id);
    document.compress();

    let mut buffer = Vec::new();
    document.save_to(&mut buffer)?;
    std::fs::write(output, &buffer)?;
    info!(pages = count, path = %output.display(), bytes = buffer.len(), "exported PDF report");
    Ok(())
}

fn add_page(document: &mut Document, pages_id: ObjectId, font_id: ObjectId, image: &ChartImage) -> Result<ObjectId, DashboardError> {
    let pixels = image::open(image.path())?.to_rgb8();
    let (width, height) = pixels.dimensions();
    let image_id = document.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8_i64,
        },
        pixels.into_raw(),
    ));

    let draw_width = IMAGE_WIDTH_MM * POINTS_PER_MM;
    let draw_height = draw_width * height as f32 / width.max(1) as f32;
    let left = IMAGE_LEFT_MM * POINTS_PER_MM;
    let bottom = PAGE_HEIGHT - IMAGE_TOP_MM * POINTS_PER_MM - draw_height;
    let baseline = PAGE_HEIGHT - TITLE_BASELINE_MM * POINTS_PER_MM;

    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), TITLE_FONT_SIZE.into()]),
            Operation::new("Td", vec![left.into(), baseline.into()]),
            Operation::new("Tj", vec![Object::String(encode_win_ansi(&image.title), StringFormat::Literal)]),
            Operation::new("ET", vec![]),
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![draw_width.into(), 0_i64.into(), 0_i64.into(), draw_height.into(), left.into(), bottom.into()],
            ),
            Operation::new("Do", vec!["Im1".into()]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = document.add_object(Stream::new(dictionary! {}, content.encode()?));
    let resources_id = document.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
        "XObject" => dictionary! { "Im1" => image_id },
    });
    let page_id = document.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0_i64.into(), 0_i64.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        "Contents" => content_id,
        "Resources" => resources_id,
    });
    debug!(title = %image.title, width, height, "added report page");
    Ok(page_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::report::chart::{render_chart, ChartImages, ChartKind};
    use crate::table::{Column, Table, Value};

    fn table() -> Table {
        Table::from_columns(vec![
            Column::new("Qtd", vec![Value::Number(1.0), Value::Number(4.0)]),
            Column::new("Loja", vec![Value::text("Sul"), Value::text("Norte")]),
        ])
        .unwrap()
    }

    #[test]
    fn one_page_per_chart() {
        let table = table();
        let mut images = ChartImages::new();
        images.push(render_chart(&table, ChartKind::Line, "Qtd").unwrap());
        images.push(render_chart(&table, ChartKind::Bar, "Qtd").unwrap());
        images.push(render_chart(&table, ChartKind::Pie, "Loja").unwrap());

        let directory = tempfile::tempdir().unwrap();
        let output = directory.path().join("relatorio.pdf");
        export_pdf(images.images(), &output).unwrap();
        images.release().unwrap();

        let bytes = std::fs::read(&output).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
        let document = Document::load(&output).unwrap();
        assert_eq!(document.get_pages().len(), 3);
    }

    #[test]
    fn nothing_to_export() {
        let directory = tempfile::tempdir().unwrap();
        let output = directory.path().join("empty.pdf");
        assert_eq!(export_pdf(&[], &output).unwrap_err().kind(), ErrorKind::Render);
        assert!(!output.exists());
    }

    #[test]
    fn unwritable_output() {
        let image = render_chart(&table(), ChartKind::Line, "Qtd").unwrap();
        let directory = tempfile::tempdir().unwrap();
        let output = directory.path().join("missing").join("report.pdf");
        let error = export_pdf(std::slice::from_ref(&image), &output).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Io);
        assert!(image.path().exists());
    }
}
