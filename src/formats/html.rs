//! Static HTML summary of all passes.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::formats::plot::{
    decoder_plot_path, pass_plot_path, SkyProjection, POLAR_FILE, POLAR_INVERTED_FILE,
    ROUTE_FILE, SNR_ELEVATION_FILE,
};
use crate::summary::{DecoderSummary, PassSummary};

pub const SUMMARY_FILE_NAME: &str = "summary.html";

/// Escape text for use in HTML element content and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Percent-encode a relative path for use in `href`/`src`, keeping `/`.
pub fn url_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for b in path.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                out.push(b as char)
            }
            _ => {
                let _ = write!(out, "%{:02X}", b);
            }
        }
    }
    out
}

fn thumbnail(path: &str, alt: &str) -> String {
    let href = escape(&url_path(path));
    format!(
        "<a href=\"{href}\"><img src=\"{href}\" alt=\"{}\" width=\"160\"></a>",
        escape(alt)
    )
}

fn pass_charts(folder: &str) -> String {
    [
        (SNR_ELEVATION_FILE, "SNR and elevation"),
        (ROUTE_FILE, "Route"),
        (POLAR_FILE, "Polar plot"),
        (POLAR_INVERTED_FILE, "Inverted polar plot"),
    ]
    .iter()
    .map(|(file, alt)| thumbnail(&pass_plot_path(folder, file), alt))
    .collect::<Vec<_>>()
    .join(" ")
}

fn decoder_charts(decoder: &str) -> String {
    [
        (SkyProjection::Polar, "Combined polar plot"),
        (SkyProjection::Inverted, "Combined inverted polar plot"),
    ]
    .iter()
    .map(|(projection, alt)| thumbnail(&decoder_plot_path(decoder, *projection), alt))
    .collect::<Vec<_>>()
    .join(" ")
}

fn number(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".to_string())
}

/// Render the summary page. With `charts` set, every pass and decoder row
/// links the chart files under `images/`.
pub fn render(passes: &[PassSummary], decoders: &[DecoderSummary], charts: bool) -> String {
    let mut html = String::new();
    html.push_str(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Satellite pass summary</title>\n\
         <style>table{border-collapse:collapse}td,th{border:1px solid #999;padding:4px 8px}</style>\n\
         </head>\n<body>\n<h1>Satellite pass summary</h1>\n",
    );

    html.push_str(
        "<table>\n<tr><th>Satellite</th><th>Pass start</th><th>Pass end</th>\
         <th>Max SNR</th><th>Start azimuth</th><th>End azimuth</th>\
         <th>Max elevation</th><th>Decoder</th><th>Folder</th>",
    );
    if charts {
        html.push_str("<th>Charts</th>");
    }
    html.push_str("</tr>\n");
    for pass in passes {
        let _ = write!(
            html,
            "<tr><td>{}</td><td>{}<br>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td>",
            escape(&pass.satellite),
            pass.pass_start.format("%Y-%m-%d"),
            pass.pass_start.format("%H:%M:%S"),
            pass.pass_end.format("%H:%M:%S"),
            number(pass.max_snr),
            number(pass.start_azimuth),
            number(pass.end_azimuth),
            number(pass.max_elevation),
            escape(&pass.decoder),
            escape(&pass.folder_name),
        );
        if charts {
            let _ = write!(html, "<td>{}</td>", pass_charts(&pass.folder_name));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</table>\n");

    html.push_str(
        "<h2>Decoders</h2>\n<table>\n<tr><th>Decoder</th><th>Passes</th><th>Rows</th><th>Max SNR</th>",
    );
    if charts {
        html.push_str("<th>Charts</th>");
    }
    html.push_str("</tr>\n");
    for decoder in decoders {
        let _ = write!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td>",
            escape(&decoder.decoder),
            decoder.passes,
            decoder.rows,
            number(decoder.max_snr),
        );
        if charts {
            let _ = write!(html, "<td>{}</td>", decoder_charts(&decoder.decoder));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</table>\n</body>\n</html>\n");
    html
}

/// Render and write the summary page to `path`.
pub fn write_summary<P: AsRef<Path>>(
    path: P,
    passes: &[PassSummary],
    decoders: &[DecoderSummary],
    charts: bool,
) -> Result<()> {
    fs::write(path.as_ref(), render(passes, decoders, charts))?;
    Ok(())
}
