//! SVG output for laid-out mind maps.
//!
//! Nodes are drawn as rounded boxes centered on their layout position and
//! joined to their parent by a vertical cubic curve.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::quote::{NoQuote, QuoteProvider};
use crate::layout::{estimate_text_block_size, LayoutResult, PositionedNode, TextMetrics, Viewport};

struct Palette {
    top: &'static str,
    bottom: &'static str,
    stroke: &'static str,
}

const ROOT_PALETTE: Palette = Palette {
    top: "#1e3a8a",
    bottom: "#1e293b",
    stroke: "#2563eb",
};

const NODE_PALETTE: Palette = Palette {
    top: "#042f2e",
    bottom: "#0f172a",
    stroke: "#14b8a6",
};

const BACKGROUND: &str = "#0f172a";
const CONNECTION_STROKE: &str = "#334155";
const LABEL_FILL: &str = "#e2e8f0";
const CAPTION_FILL: &str = "#94a3b8";

pub struct SvgRenderer {
    metrics: TextMetrics,
    box_width: f64,
    vertical_spacing: f64,
    quotes: Arc<dyn QuoteProvider>,
}

impl SvgRenderer {
    pub fn new(metrics: TextMetrics, box_width: f64, vertical_spacing: f64) -> Self {
        Self {
            metrics,
            box_width,
            vertical_spacing,
            quotes: Arc::new(NoQuote),
        }
    }

    pub fn with_quotes(mut self, quotes: Arc<dyn QuoteProvider>) -> Self {
        self.quotes = quotes;
        self
    }

    #[instrument(level = "debug", skip_all, fields(nodes = layout.nodes.len()))]
    pub fn render(&self, layout: &LayoutResult, viewport: &Viewport) -> String {
        let size = viewport.size();
        let translate = viewport.translate();
        let mut svg = String::with_capacity(512 + layout.nodes.len() * 400);

        svg.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" font-family=\"sans-serif\">\n",
            w = size.width,
            h = size.height
        ));
        svg.push_str("<defs>\n");
        push_gradient(&mut svg, "node-gradient-root", &ROOT_PALETTE);
        push_gradient(&mut svg, "node-gradient", &NODE_PALETTE);
        svg.push_str("</defs>\n");
        svg.push_str(&format!(
            "<rect width=\"100%\" height=\"100%\" fill=\"{BACKGROUND}\"/>\n"
        ));

        svg.push_str(&format!(
            "<g transform=\"translate({}, {}) scale({})\">\n",
            translate.x,
            translate.y,
            viewport.scale()
        ));

        for (from, to) in layout.edges() {
            svg.push_str(&format!(
                "<path d=\"{}\" stroke=\"{CONNECTION_STROKE}\" stroke-width=\"2\" fill=\"none\"/>\n",
                connection_path(from, to, self.vertical_spacing)
            ));
        }

        for node in &layout.nodes {
            self.push_node(&mut svg, node);
        }
        svg.push_str("</g>\n");

        if let Some(quote) = self.quotes.quote() {
            svg.push_str(&format!(
                "<text class=\"caption\" x=\"{}\" y=\"{}\" text-anchor=\"middle\" fill=\"{CAPTION_FILL}\" font-size=\"14\" font-style=\"italic\">{}</text>\n",
                size.width / 2.0,
                size.height - 16.0,
                escape_xml(&quote)
            ));
        }

        svg.push_str("</svg>\n");
        debug!(bytes = svg.len(), "svg rendered");
        svg
    }

    fn push_node(&self, svg: &mut String, node: &PositionedNode) {
        let block = estimate_text_block_size(&node.text, self.box_width, &self.metrics);
        let (gradient, palette) = if node.is_root {
            ("node-gradient-root", &ROOT_PALETTE)
        } else {
            ("node-gradient", &NODE_PALETTE)
        };
        let line_height = self.metrics.line_height;
        // Baseline of the first line, centred in its row
        let first_line_y = -block.height / 2.0 + self.metrics.padding + line_height / 2.0;

        svg.push_str(&format!(
            "<g class=\"node\" data-id=\"{}\" transform=\"translate({}, {})\">\n",
            node.id, node.x, node.y
        ));
        svg.push_str(&format!("<title>{}</title>\n", escape_xml(&node.text)));
        svg.push_str(&format!(
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"8\" ry=\"8\" fill=\"url(#{gradient})\" stroke=\"{}\" stroke-width=\"2\"/>\n",
            -block.width / 2.0,
            -block.height / 2.0,
            block.width,
            block.height,
            palette.stroke
        ));
        svg.push_str(&format!(
            "<text x=\"0\" y=\"{first_line_y}\" text-anchor=\"middle\" dominant-baseline=\"middle\" fill=\"{LABEL_FILL}\" font-size=\"12\" font-weight=\"500\">"
        ));
        for (i, line) in block.lines.iter().enumerate() {
            let dy = if i == 0 { 0.0 } else { line_height };
            svg.push_str(&format!(
                "<tspan x=\"0\" dy=\"{dy}\">{}</tspan>",
                escape_xml(line)
            ));
        }
        svg.push_str("</text>\n</g>\n");
    }
}

fn push_gradient(svg: &mut String, id: &str, palette: &Palette) {
    svg.push_str(&format!(
        "<linearGradient id=\"{id}\" x1=\"0%\" y1=\"0%\" x2=\"0%\" y2=\"100%\"><stop offset=\"0%\" stop-color=\"{}\"/><stop offset=\"100%\" stop-color=\"{}\"/></linearGradient>\n",
        palette.top, palette.bottom
    ));
}

/// Cubic curve leaving the parent downward and entering the child from above.
pub fn connection_path(from: &PositionedNode, to: &PositionedNode, vertical_spacing: f64) -> String {
    let bend = vertical_spacing / 2.0;
    format!(
        "M {} {} C {} {}, {} {}, {} {}",
        from.x,
        from.y,
        from.x,
        from.y + bend,
        to.x,
        to.y - bend,
        to.x,
        to.y
    )
}

pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
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
