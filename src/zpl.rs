//! Render label batches as ZPL for the genebank's thermal label printers.
//!
//! The printer templates are opaque assets under `labels/`. They are compiled
//! into the binary and filled in through handlebars with HTML escaping turned
//! off. Each template reserves the fields `rack`, `left` and `right`.

use lazy_static::lazy_static;
use log::info;
use regex::Regex;
use rocket_dyn_templates::handlebars::{no_escape, Handlebars, TemplateError};
use serde::Serialize;

use crate::config::{Layout, LabelOptions};
use crate::error::{LabelError, Result};
use crate::models::LabelBatch;
use crate::samplesheet::BottleSheet;

static LOCATION_TEMPLATE: &str = include_str!("../labels/location.zpl.hbs");
static TUBE_TEMPLATE: &str = include_str!("../labels/tube.zpl.hbs");

lazy_static! {
    static ref RE_WHOLE: Regex = Regex::new(r"^(?P<int>[+-]?\d+)(?:\.0*)?$").unwrap();
    static ref LABELS: Handlebars<'static> = label_registry().expect("bundled ZPL templates must compile");
}

fn label_registry() -> std::result::Result<Handlebars<'static>, TemplateError> {
    let mut hbs = Handlebars::new();
    hbs.register_escape_fn(no_escape);
    hbs.set_strict_mode(true);
    hbs.register_template_string(template_name(Layout::Location), LOCATION_TEMPLATE)?;
    hbs.register_template_string(template_name(Layout::Tube), TUBE_TEMPLATE)?;
    Ok(hbs)
}

fn template_name(layout: Layout) -> &'static str {
    match layout {
        Layout::Location => "location",
        Layout::Tube => "tube",
    }
}

/// Values for one sticker
#[derive(Serialize, Debug)]
struct LabelFields<'a> {
    rack: &'a str,
    left: String,
    right: String,
}

/// Normalize a numeric bottle ID to its plain integer form.
///
/// Leading zeros, a leading `+` and an all-zero decimal part (as left behind
/// by spreadsheets) are dropped. Anything else that isn't a whole number is
/// rejected: `0042` becomes `42`, `1001.0` becomes `1001`, `abc` and `1001.5`
/// are errors.
pub fn normalize_identifier(raw: &str) -> Result<String> {
    let raw = raw.trim();
    RE_WHOLE
        .captures(raw)
        .and_then(|c| c.name("int").and_then(|m| m.as_str().parse::<i64>().ok()))
        .map(|n| n.to_string())
        .ok_or_else(|| LabelError::NotNumeric(raw.to_string()))
}

/// Hex-escape characters that ZPL would read as commands. The templates
/// enable `^FH\`, so `\XX` inside field data is decoded by the printer.
pub fn escape_field(data: &str) -> String {
    let mut out = String::with_capacity(data.len());
    for c in data.chars() {
        match c {
            '\\' => out.push_str(r"\5C"),
            '^' => out.push_str(r"\5E"),
            '~' => out.push_str(r"\7E"),
            c => out.push(c),
        }
    }
    out
}

fn slot(id: &Option<String>, verbatim: bool) -> Result<String> {
    match id {
        None => Ok(String::new()),
        Some(id) if verbatim => Ok(escape_field(id.trim())),
        Some(id) => normalize_identifier(id).map(|n| escape_field(&n)),
    }
}

/// Fill every pair of `batch` into the layout's template.
///
/// Blocks are joined by a newline in batch order. The first bad bottle ID
/// fails the whole batch.
pub fn render_batch(batch: &LabelBatch, rack: &str, options: &LabelOptions) -> Result<String> {
    if batch.is_empty() {
        return Ok(String::new());
    }
    let rack = escape_field(rack.trim());
    let name = template_name(options.layout);

    let mut blocks = Vec::with_capacity(batch.len());
    for pair in &batch.pairs {
        let fields = LabelFields {
            rack: &rack,
            left: slot(&pair.left, options.verbatim)?,
            right: slot(&pair.right, options.verbatim)?,
        };
        blocks.push(LABELS.render(name, &fields)?.trim().to_string());
    }
    Ok(blocks.join("\n").trim().to_string())
}

/// Split `ids` into pairs and render them
pub fn render<T: AsRef<str>>(ids: &[T], rack: &str, options: &LabelOptions) -> Result<String> {
    let batch = LabelBatch::split(ids, options.split);
    render_batch(&batch, rack, options)
}

/// The whole pipeline for one request: order the sheet, pair it up, render.
pub fn render_sheet(mut sheet: BottleSheet, rack: &str, options: &LabelOptions) -> Result<String> {
    sheet.apply_order(options.order);
    let zpl = render(&sheet.entries, rack, options)?;
    info!(
        "Rendered {} bottle IDs onto {} {} labels",
        sheet.len(),
        (sheet.len() + 1) / 2,
        template_name(options.layout)
    );
    Ok(zpl)
}
