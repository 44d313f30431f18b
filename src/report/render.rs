//! HTML heatmap rendering using minijinja templating.

use std::fs;
use std::path::{Path, PathBuf};

use minijinja::{context, Environment};
use serde::Serialize;

use crate::analysis::{Analysis, HeatmapMatrix};
use crate::core::Result;

/// The embedded HTML template. The `.html` name turns on autoescaping.
const TEMPLATE_HTML: &str = include_str!("heatmap.html");

#[derive(Debug, Serialize)]
struct Row<'a> {
    test: &'a str,
    cells: &'a [Option<f64>],
}

/// Renderer handles heatmap generation.
pub struct Renderer {
    env: Environment<'static>,
}

impl Renderer {
    /// Create a new renderer with the embedded template.
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.add_filter("cell_color", cell_color);
        env.add_filter("cell_text", cell_text);
        env.add_template("heatmap.html", TEMPLATE_HTML)?;
        Ok(Self { env })
    }

    /// Render a matrix into a standalone HTML page.
    pub fn render(&self, title: &str, matrix: &HeatmapMatrix) -> Result<String> {
        let columns: Vec<String> = matrix.windows.iter().map(|w| w.to_string()).collect();
        let rows: Vec<Row<'_>> = matrix
            .tests
            .iter()
            .zip(&matrix.values)
            .map(|(test, cells)| Row { test, cells })
            .collect();

        let tmpl = self.env.get_template("heatmap.html")?;
        let html = tmpl.render(context! {
            title => title,
            columns => columns,
            rows => rows,
        })?;
        Ok(html)
    }

    /// Render the analysis heatmap into `dir`, returning the written path.
    pub fn render_to_file(&self, analysis: &Analysis, dir: &Path) -> Result<PathBuf> {
        let html = self.render(&analysis.heatmap_title(), &analysis.matrix())?;
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.html", analysis.heatmap_stem()));
        fs::write(&path, html)?;
        tracing::info!("generated {}", path.display());
        Ok(path)
    }
}

/// Cell background: transparent at 0, saturated red at 1.
fn cell_color(value: f64) -> String {
    format!("rgba(220, 38, 38, {:.3})", value.clamp(0.0, 1.0))
}

fn cell_text(value: f64) -> String {
    format!("{value:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::WindowKey;

    fn matrix() -> HeatmapMatrix {
        HeatmapMatrix {
            tests: vec!["suite::a".to_string(), "suite::<b>".to_string()],
            windows: vec![WindowKey::Run(1), WindowKey::Run(2)],
            values: vec![vec![Some(0.5), None], vec![None, Some(0.25)]],
        }
    }

    #[test]
    fn test_render_contains_rows_and_columns() {
        let renderer = Renderer::new().unwrap();
        let html = renderer.render("Top 2", &matrix()).unwrap();

        assert!(html.contains("<title>Top 2</title>"));
        assert!(html.contains("suite::a"));
        assert!(html.contains("0.50"));
        assert!(html.contains("0.25"));
        assert!(html.contains("rgba(220, 38, 38, 0.500)"));
    }

    #[test]
    fn test_render_escapes_identifiers() {
        let renderer = Renderer::new().unwrap();
        let html = renderer.render("t", &matrix()).unwrap();
        assert!(html.contains("suite::&lt;b&gt;"));
    }

    #[test]
    fn test_absent_cells_are_blank() {
        let renderer = Renderer::new().unwrap();
        let html = renderer.render("t", &matrix()).unwrap();
        assert_eq!(html.matches("class=\"empty\"").count(), 2);
        assert!(!html.contains("0.00"));
    }

    #[test]
    fn test_cell_color_clamps() {
        assert_eq!(cell_color(2.0), "rgba(220, 38, 38, 1.000)");
        assert_eq!(cell_color(0.0), "rgba(220, 38, 38, 0.000)");
    }
}
