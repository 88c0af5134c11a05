use crate::error::DashboardError;
use crate::pipeline::FORMATTED_DATE_COLUMN;
use crate::table::{ColumnClass, Table, Value};
use plotters::prelude::*;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt::Display;
use std::path::Path;
use tempfile::TempPath;
use tracing::{debug, warn};

/// Pixel size of every rendered chart
pub const CHART_SIZE: (u32, u32) = (800, 500);

/// Available chart types
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    /// Numeric column over the formatted dates, points joined by a line
    Line,
    /// Numeric column over the formatted dates, one bar per row
    Bar,
    /// Value counts of a categorical column
    Pie,
}

impl ChartKind {
    /// Column class the chart is drawn from
    pub const fn required_class(&self) -> ColumnClass {
        match self {
            Self::Line | Self::Bar => ColumnClass::Numeric,
            Self::Pie => ColumnClass::Categorical,
        }
    }

    pub fn title(&self, column: &str) -> String {
        match self {
            Self::Line => format!("Line - {}", column),
            Self::Bar => format!("Bars - {}", column),
            Self::Pie => format!("Distribution of {}", column),
        }
    }
}

/// A rendered PNG chart held in a temporary file.
///
/// The file is deleted when the image is dropped, or earlier with [`ChartImage::close`].
#[derive(Debug)]
pub struct ChartImage {
    pub title: String,
    pub kind: ChartKind,
    path: TempPath,
}

impl ChartImage {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Deletes the image file now, reporting failures instead of ignoring them.
    pub fn close(self) -> Result<(), DashboardError> {
        debug!(title = %self.title, path = %self.path.display(), "removing chart image");
        Ok(self.path.close()?)
    }
}

/// The charts rendered for one interaction.
///
/// [`ChartImages::release`] deletes the files once they are exported (or when export is
/// skipped); on every other path dropping the set deletes them.
#[derive(Debug, Default)]
pub struct ChartImages {
    images: Vec<ChartImage>,
}

impl ChartImages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, image: ChartImage) {
        self.images.push(image);
    }

    pub fn images(&self) -> &[ChartImage] {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Deletes every image file. All files are attempted; the first failure is returned.
    pub fn release(self) -> Result<(), DashboardError> {
        let mut first_error = None;
        for image in self.images {
            if let Err(error) = image.close() {
                warn!(%error, "failed to remove chart image");
                first_error.get_or_insert(error);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

/// A column with no value left (e.g. outside the window) suits every chart and draws nothing.
fn class_check(table: &Table, kind: ChartKind, column: &str) -> Result<(), DashboardError> {
    let expected = kind.required_class();
    let column = table.require_column(column)?;
    if column.class() != expected && !column.values.iter().all(Value::is_null) {
        Err(DashboardError::ColumnClassMismatch {
            name: column.name.clone(),
            expected: expected.as_str(),
        })?
    }
    Ok(())
}

/// Points of a line or bar chart: the formatted date of each row with its value.
/// Null cells stay in the series as gaps.
pub fn series_data(table: &Table, column: &str) -> Result<Vec<(String, Option<f64>)>, DashboardError> {
    class_check(table, ChartKind::Line, column)?;
    let values = &table.require_column(column)?.values;
    let labels: Vec<String> = match table.column(FORMATTED_DATE_COLUMN) {
        Some(dates) => dates.values.iter().map(Value::to_string).collect(),
        None => (1..=values.len()).map(|index| index.to_string()).collect(),
    };
    Ok(labels.into_iter().zip(values.iter().map(Value::as_number)).collect())
}

/// Counts of each distinct non-null value, most frequent first; ties keep first-seen order.
pub fn value_counts(table: &Table, column: &str) -> Result<Vec<(String, usize)>, DashboardError> {
    class_check(table, ChartKind::Pie, column)?;
    let mut counts: Vec<(String, usize)> = Vec::new();
    for value in table.require_column(column)?.values.iter().filter(|value| !value.is_null()) {
        let key = value.to_string();
        match counts.iter_mut().find(|(seen, _)| *seen == key) {
            Some((_, count)) => *count += 1,
            None => counts.push((key, 1)),
        }
    }
    counts.sort_by(|left, right| right.1.cmp(&left.1));
    Ok(counts)
}

fn chart_error<E: Display>(title: &str) -> impl Fn(E) -> DashboardError + '_ {
    move |error| DashboardError::ChartError(title.to_owned(), error.to_string())
}

/// Renders one chart of `column` from the (filtered) table into a temporary PNG.
///
/// # Errors
///
/// * `ColumnNotFound` / `ColumnClassMismatch` when the column does not suit the chart
/// * `ChartError` when drawing fails, `IoError` when the temporary file cannot be created
pub fn render_chart(table: &Table, kind: ChartKind, column: &str) -> Result<ChartImage, DashboardError> {
    let title = kind.title(column);
    let path = tempfile::Builder::new()
        .prefix("chart-")
        .suffix(".png")
        .tempfile()?
        .into_temp_path();
    match kind {
        ChartKind::Line | ChartKind::Bar => {
            let series = series_data(table, column)?;
            draw_series(&path, kind, &series).map_err(chart_error(&title))?;
        }
        ChartKind::Pie => {
            let counts = value_counts(table, column)?;
            draw_pie(&path, &counts).map_err(chart_error(&title))?;
        }
    }
    debug!(title = %title, path = %path.display(), "rendered chart");
    Ok(ChartImage { title, kind, path })
}

fn draw_series(path: &Path, kind: ChartKind, series: &[(String, Option<f64>)]) -> Result<(), Box<dyn std::error::Error>> {
    let points: Vec<(f64, f64)> = series
        .iter()
        .enumerate()
        .filter_map(|(index, (_, value))| value.map(|value| (index as f64, value)))
        .collect();

    let (mut min_y, mut max_y) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), &(_, y)| (min.min(y), max.max(y)));
    if points.is_empty() {
        (min_y, max_y) = (0.0, 1.0);
    }
    if kind == ChartKind::Bar {
        min_y = min_y.min(0.0);
        max_y = max_y.max(0.0);
    }
    let padding = if max_y > min_y { (max_y - min_y) * 0.05 } else { 1.0 };
    let x_range = -0.5..(series.len().max(1) as f64 - 0.5);
    let y_range = (min_y - padding)..(max_y + padding);

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root).margin(30).build_cartesian_2d(x_range.clone(), y_range.clone())?;

    // Frame and zero line stand in for labelled axes
    chart.draw_series(std::iter::once(Rectangle::new(
        [(x_range.start, y_range.start), (x_range.end, y_range.end)],
        BLACK.mix(0.6).stroke_width(1),
    )))?;
    if y_range.start < 0.0 && 0.0 < y_range.end {
        chart.draw_series(LineSeries::new(vec![(x_range.start, 0.0), (x_range.end, 0.0)], &BLACK.mix(0.3)))?;
    }

    match kind {
        ChartKind::Bar => {
            chart.draw_series(
                points
                    .iter()
                    .map(|&(x, y)| Rectangle::new([(x - 0.35, 0.0), (x + 0.35, y)], BLUE.filled())),
            )?;
        }
        _ => {
            chart.draw_series(LineSeries::new(points.iter().copied(), &BLUE))?;
            chart.draw_series(points.iter().map(|&(x, y)| Circle::new((x, y), 4, BLUE.filled())))?;
        }
    }
    root.present()?;
    Ok(())
}

fn draw_pie(path: &Path, counts: &[(String, usize)]) -> Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let (width, height) = CHART_SIZE;
    let center = (width as f64 / 2.0, height as f64 / 2.0);
    let radius = width.min(height) as f64 * 0.4;
    let total: usize = counts.iter().map(|(_, count)| count).sum();
    let mut angle = -PI / 2.0;
    for (index, (_, count)) in counts.iter().enumerate() {
        let sweep = 2.0 * PI * *count as f64 / total as f64;
        let steps = ((sweep.to_degrees().ceil() as usize) + 1).max(2);
        let mut outline = vec![(center.0 as i32, center.1 as i32)];
        outline.extend((0..=steps).map(|step| {
            let theta = angle + sweep * step as f64 / steps as f64;
            (
                (center.0 + radius * theta.cos()).round() as i32,
                (center.1 + radius * theta.sin()).round() as i32,
            )
        }));
        root.draw(&Polygon::new(outline, Palette99::pick(index).filled()))?;
        angle += sweep;
    }
    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::table::Column;

    fn table() -> Table {
        Table::from_columns(vec![
            Column::new(
                FORMATTED_DATE_COLUMN,
                vec![Value::text("01/01/2024"), Value::text("02/01/2024"), Value::text("05/01/2024")],
            ),
            Column::new("Qtd", vec![Value::Number(3.0), Value::Null, Value::Number(-2.5)]),
            Column::new("Loja", vec![Value::text("Sul"), Value::text("Norte"), Value::text("Norte")]),
        ])
        .unwrap()
    }

    #[test]
    fn titles() {
        assert_eq!(ChartKind::Line.title("Qtd"), "Line - Qtd");
        assert_eq!(ChartKind::Bar.title("Qtd"), "Bars - Qtd");
        assert_eq!(ChartKind::Pie.title("Loja"), "Distribution of Loja");
    }

    #[test]
    fn series_uses_formatted_dates() {
        let series = series_data(&table(), "Qtd").unwrap();
        assert_eq!(
            series,
            vec![
                ("01/01/2024".to_owned(), Some(3.0)),
                ("02/01/2024".to_owned(), None),
                ("05/01/2024".to_owned(), Some(-2.5)),
            ]
        );
    }

    #[test]
    fn value_counts_order() {
        let table = Table::from_columns(vec![Column::new(
            "Loja",
            vec![
                Value::text("Sul"),
                Value::Null,
                Value::text("Leste"),
                Value::text("Norte"),
                Value::text("Norte"),
                Value::text("Leste"),
                Value::text("Oeste"),
            ],
        )])
        .unwrap();
        assert_eq!(
            value_counts(&table, "Loja").unwrap(),
            vec![
                ("Leste".to_owned(), 2),
                ("Norte".to_owned(), 2),
                ("Sul".to_owned(), 1),
                ("Oeste".to_owned(), 1),
            ]
        );
    }

    #[test]
    fn wrong_column_class() {
        assert_eq!(series_data(&table(), "Loja").unwrap_err().kind(), ErrorKind::InvalidInput);
        assert_eq!(value_counts(&table(), "Qtd").unwrap_err().kind(), ErrorKind::InvalidInput);
        assert_eq!(render_chart(&table(), ChartKind::Pie, "Missing").unwrap_err().kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn renders_png_files_and_deletes_them() {
        let table = table();
        let mut images = ChartImages::new();
        images.push(render_chart(&table, ChartKind::Line, "Qtd").unwrap());
        images.push(render_chart(&table, ChartKind::Bar, "Qtd").unwrap());
        images.push(render_chart(&table, ChartKind::Pie, "Loja").unwrap());

        let paths: Vec<_> = images.images().iter().map(|image| image.path().to_path_buf()).collect();
        for path in &paths {
            let png = image::open(path).unwrap();
            assert_eq!((png.width(), png.height()), CHART_SIZE);
        }
        images.release().unwrap();
        assert!(paths.iter().all(|path| !path.exists()));
    }

    #[test]
    fn dropped_images_are_deleted() {
        let image = render_chart(&table(), ChartKind::Bar, "Qtd").unwrap();
        let path = image.path().to_path_buf();
        assert!(path.exists());
        drop(image);
        assert!(!path.exists());
    }

    #[test]
    fn renders_empty_series() {
        let empty = table().retain_rows(&[false, false, false]);
        let image = render_chart(&empty, ChartKind::Line, "Qtd").unwrap();
        assert!(image.path().exists());
        image.close().unwrap();
    }
}
