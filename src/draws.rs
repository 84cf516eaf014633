//! Module for visualizing a finished run: price, reference band anchor,
//! trade markers, and the equity curve.

use crate::engine::{Action, LedgerEntry};
use crate::errors::{Error, Result};

use plotters::backend::{BitMapBackend, DrawingBackend, SVGBackend};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::WHITE;

/// Aspect ratio for the generated charts.
const ASPECT_RATIO: f64 = 0.5625;
/// Size of the X-axis labels.
const X_LABEL_SIZE: i32 = 20;
/// Size of the Y-axis labels.
const Y_LABEL_SIZE: i32 = 20;

/// Output formats for the generated charts with output filename.
#[derive(Default)]
pub enum DrawOutput {
    /// Save to the output SVG file.
    Svg(String),
    /// Save to the output PNG file.
    Png(String),
    /// Save to the output HTML file (not implemented).
    Html(String),
    /// Print to the current console (not implemented).
    #[default]
    Inner,
}

/// Configuration options for chart generation.
#[derive(Default)]
pub struct DrawOptions {
    /// Chart title.
    title: Option<String>,
    /// Output format and path.
    output: DrawOutput,
    /// Whether to show the equity panel.
    show_equity: bool,
    /// Whether to overlay the virtual seed on the equity panel.
    show_seed: bool,
}

impl DrawOptions {
    /// Sets the chart title.
    pub fn title(mut self, title: impl ToString) -> Self {
        self.title = Some(title.to_string());
        self
    }

    /// Sets the output format and path.
    pub fn draw_output(mut self, output: DrawOutput) -> Self {
        self.output = output;
        self
    }

    /// Enables or disables the equity panel.
    pub fn show_equity(mut self, show: bool) -> Self {
        self.show_equity = show;
        self
    }

    /// Enables or disables the virtual-seed overlay.
    pub fn show_seed(mut self, show: bool) -> Self {
        self.show_seed = show;
        self
    }
}

/// Chart drawing utility for ledger visualization.
#[derive(Default)]
pub struct Draw<'d> {
    /// The ledger to draw.
    ledger: Option<&'d [LedgerEntry]>,
    /// Drawing options.
    options: DrawOptions,
}

impl<'d> From<&'d [LedgerEntry]> for Draw<'d> {
    fn from(ledger: &'d [LedgerEntry]) -> Self {
        Self {
            ledger: Some(ledger),
            options: DrawOptions::default(),
        }
    }
}

impl<'d> Draw<'d> {
    /// Creates a new `Draw` instance with the given ledger.
    pub fn with_ledger(ledger: &'d [LedgerEntry]) -> Self {
        Self::from(ledger)
    }

    /// Sets the drawing options.
    pub fn with_options(mut self, options: DrawOptions) -> Self {
        self.options = options;
        self
    }

    /// Generates and saves the chart based on the configured options.
    pub fn plot(&self) -> Result<()> {
        let ledger = self.ledger.ok_or(Error::Msg("No ledger provided".to_string()))?;
        if ledger.is_empty() {
            return Err(Error::Msg("Ledger is empty".to_string()));
        }

        let title = self.options.title.as_deref().unwrap_or("Gear-Band Chart");
        let mut height_factor = 1.0;
        if self.options.show_equity {
            height_factor += 0.4;
        }

        let day_count = ledger.len() as u32;
        let width = 1280.max(10 * day_count);
        let height = ((width as f64 * ASPECT_RATIO * height_factor) as u32).min(900);

        match &self.options.output {
            DrawOutput::Svg(path) => self.plot_svg(path, ledger, width, height, title),
            DrawOutput::Png(path) => self.plot_png(path, ledger, width, height, title),
            DrawOutput::Html(path) => self.plot_html(path, ledger, width, height, title),
            DrawOutput::Inner => self.plot_inner(ledger, width, height, title),
        }
    }

    /// Saves the chart as an SVG file.
    fn plot_svg(&self, path: &str, ledger: &[LedgerEntry], width: u32, height: u32, title: &str) -> Result<()> {
        let root = SVGBackend::new(path, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| Error::Plotters(e.to_string()))?;
        self.draw_chart(&root, ledger, title)
    }

    /// Saves the chart as a PNG file.
    fn plot_png(&self, path: &str, ledger: &[LedgerEntry], width: u32, height: u32, title: &str) -> Result<()> {
        let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| Error::Plotters(e.to_string()))?;
        self.draw_chart(&root, ledger, title)
    }

    /// Saves the chart as an HTML file (not implemented).
    #[allow(unused_variables)]
    fn plot_html(&self, path: &str, ledger: &[LedgerEntry], width: u32, height: u32, title: &str) -> Result<()> {
        Err(Error::Msg("HTML output is not implemented".to_string()))
    }

    /// Displays the chart in the current console (not implemented).
    #[allow(unused_variables)]
    fn plot_inner(&self, ledger: &[LedgerEntry], width: u32, height: u32, title: &str) -> Result<()> {
        Err(Error::Msg("Inner display is not implemented".to_string()))
    }

    /// Draws the price chart and, when enabled, the equity panel below it.
    fn draw_chart<DB: DrawingBackend>(
        &self,
        drawing_area: &DrawingArea<DB, Shift>,
        ledger: &[LedgerEntry],
        title: &str,
    ) -> Result<()> {
        let total_height = drawing_area.dim_in_pixel().1 as f64;
        let equity_height = if self.options.show_equity {
            total_height * 0.3
        } else {
            0.0
        };
        let price_height = total_height - equity_height;

        let (price_area, equity_area) = if self.options.show_equity {
            drawing_area.split_vertically(price_height as u32)
        } else {
            (drawing_area.clone(), drawing_area.clone())
        };

        self.draw_price_chart(&price_area, ledger, title)?;
        if self.options.show_equity {
            self.draw_equity_chart(&equity_area, ledger)?;
        }

        drawing_area.present().map_err(|e| Error::Plotters(e.to_string()))
    }

    /// Draws the close and reference lines with Buy/Sell markers.
    fn draw_price_chart<DB: DrawingBackend>(
        &self,
        drawing_area: &DrawingArea<DB, Shift>,
        ledger: &[LedgerEntry],
        title: &str,
    ) -> Result<()> {
        let min_price = ledger
            .iter()
            .flat_map(|e| [e.close(), e.reference_price()])
            .fold(f64::INFINITY, f64::min);
        let max_price = ledger
            .iter()
            .flat_map(|e| [e.close(), e.reference_price()])
            .fold(f64::NEG_INFINITY, f64::max);
        let first_date = ledger.first().ok_or(Error::Msg("Ledger is empty".to_string()))?.date();
        let last_date = ledger.last().ok_or(Error::Msg("Ledger is empty".to_string()))?.date();
        let price_padding = (max_price - min_price) * 0.1;

        let (top, bottom) = if self.options.show_equity { (0, 0) } else { (10, 10) };
        let drawing_area = drawing_area.margin(top, bottom, 70, 70);
        let mut builder = ChartBuilder::on(&drawing_area);
        if !self.options.show_equity {
            builder.x_label_area_size(X_LABEL_SIZE);
        }

        let mut chart = builder
            .caption(title, ("sans-serif", 30).into_font())
            .y_label_area_size(Y_LABEL_SIZE)
            .build_cartesian_2d(
                first_date..last_date,
                min_price - price_padding..max_price + price_padding,
            )
            .map_err(|e| Error::Plotters(e.to_string()))?;

        let x_labels = ledger.len() / 15;

        {
            let mut mesh = chart.configure_mesh();
            mesh.y_desc("Price")
                .y_label_style(("sans-serif", Y_LABEL_SIZE))
                .y_labels(5);

            if self.options.show_equity {
                mesh.disable_x_axis();
            } else {
                mesh.x_desc("Date")
                    .x_label_style(("sans-serif", X_LABEL_SIZE))
                    .x_labels(x_labels);
            }

            mesh.draw().map_err(|e| Error::Plotters(e.to_string()))?;
        }

        chart
            .draw_series(LineSeries::new(ledger.iter().map(|e| (e.date(), e.close())), BLACK))
            .map_err(|e| Error::Plotters(e.to_string()))?;

        chart
            .draw_series(LineSeries::new(
                ledger.iter().map(|e| (e.date(), e.reference_price())),
                BLUE.mix(0.6),
            ))
            .map_err(|e| Error::Plotters(e.to_string()))?;

        let buys = ledger
            .iter()
            .filter(|e| e.action() == Action::Buy)
            .map(|e| Circle::new((e.date(), e.close()), 3, GREEN.filled()));
        let sells = ledger
            .iter()
            .filter(|e| e.action() == Action::Sell)
            .map(|e| Circle::new((e.date(), e.close()), 3, RED.filled()));

        chart.draw_series(buys).map_err(|e| Error::Plotters(e.to_string()))?;
        chart.draw_series(sells).map_err(|e| Error::Plotters(e.to_string()))?;

        Ok(())
    }

    /// Draws the equity curve, optionally with the virtual seed overlaid.
    fn draw_equity_chart<DB: DrawingBackend>(
        &self,
        drawing_area: &DrawingArea<DB, Shift>,
        ledger: &[LedgerEntry],
    ) -> Result<()> {
        let show_seed = self.options.show_seed;
        let values = move |e: &LedgerEntry| {
            if show_seed {
                vec![e.total_equity(), e.virtual_seed()]
            } else {
                vec![e.total_equity()]
            }
        };
        let min_value = ledger.iter().flat_map(values).fold(f64::INFINITY, f64::min);
        let max_value = ledger.iter().flat_map(values).fold(f64::NEG_INFINITY, f64::max);
        let first_date = ledger.first().ok_or(Error::Msg("Ledger is empty".to_string()))?.date();
        let last_date = ledger.last().ok_or(Error::Msg("Ledger is empty".to_string()))?.date();
        let padding = (max_value - min_value).max(1.0) * 0.1;
        let drawing_area = drawing_area.margin(0, 10, 70, 70);

        let mut chart = ChartBuilder::on(&drawing_area)
            .x_label_area_size(X_LABEL_SIZE)
            .y_label_area_size(Y_LABEL_SIZE)
            .build_cartesian_2d(first_date..last_date, min_value - padding..max_value + padding)
            .map_err(|e| Error::Plotters(e.to_string()))?;

        let x_labels = ledger.len() / 15;

        chart
            .configure_mesh()
            .x_desc("Date")
            .x_label_style(("sans-serif", X_LABEL_SIZE))
            .y_desc("Equity")
            .y_label_style(("sans-serif", Y_LABEL_SIZE))
            .x_labels(x_labels)
            .y_labels(3)
            .draw()
            .map_err(|e| Error::Plotters(e.to_string()))?;

        chart
            .draw_series(LineSeries::new(
                ledger.iter().map(|e| (e.date(), e.total_equity())),
                BLUE,
            ))
            .map_err(|e| Error::Plotters(e.to_string()))?;

        if self.options.show_seed {
            chart
                .draw_series(LineSeries::new(
                    ledger.iter().map(|e| (e.date(), e.virtual_seed())),
                    MAGENTA.mix(0.7),
                ))
                .map_err(|e| Error::Plotters(e.to_string()))?;
        }

        Ok(())
    }
}
