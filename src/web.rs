use std::str::FromStr;

use log::{debug, error, warn};
use rocket::fairing::AdHoc;
use rocket::form::{Form, FromForm};
use rocket::fs::relative;
use rocket::fs::FileServer;
use rocket::fs::TempFile;
use rocket::http::{ContentType, Header};
use rocket::response::Debug;
use rocket::{Build, Responder, Rocket, State};
use rocket_dyn_templates::handlebars::Handlebars;
use rocket_dyn_templates::Template;

use crate::config::{LabelOptions, Layout, Order, SplitPolicy};
use crate::error::LabelError;
use crate::samplesheet::BottleSheet;
use crate::zpl;

macro_rules! context {
    ($($key:ident $(: $value:expr)?),*$(,)?) => {{
        use serde::ser::{Serialize, Serializer, SerializeMap};
        use ::std::fmt::{Debug, Formatter};

        #[allow(non_camel_case_types)]
        struct ContextMacroCtxObject<$($key: Serialize),*> {
            $($key: $key),*
        }

        #[allow(non_camel_case_types)]
        impl<$($key: Serialize),*> Serialize for ContextMacroCtxObject<$($key),*> {
            fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
                where S: Serializer,
            {
                let mut map = serializer.serialize_map(None)?;
                $(map.serialize_entry(stringify!($key), &self.$key)?;)*
                map.end()
            }
        }

        #[allow(non_camel_case_types)]
        impl<$($key: Debug + Serialize),*> Debug for ContextMacroCtxObject<$($key),*> {
            fn fmt(&self, f: &mut Formatter<'_>) -> ::std::fmt::Result {
                f.debug_struct("context!")
                    $(.field(stringify!($key), &self.$key))*
                    .finish()
            }
        }

        ContextMacroCtxObject {
            $($key $(: $value)?),*
        }
    }};
}

/// Name of the workbook offered as a download
const SAMPLE_NAME: &str = "Bottle_Location.xlsx";

/// Parse an optional form value, falling back to `fallback` (with a warning
/// for the user) if it is present but not understood.
fn choose<T: FromStr>(value: Option<&str>, fallback: T, what: &str, warnings: &mut Vec<String>) -> T {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => fallback,
        Some(v) => v.parse::<T>().unwrap_or_else(|_| {
            warnings.push(format!("Unknown {} '{}', using the default instead.", what, v));
            fallback
        }),
    }
}

fn label_options(defaults: &LabelOptions, layout: Option<&str>, split: Option<&str>, sorted: bool, verbatim: bool, warnings: &mut Vec<String>) -> LabelOptions {
    LabelOptions {
        layout: choose(layout, defaults.layout, "layout", warnings),
        split: choose(split, defaults.split, "split policy", warnings),
        order: if sorted { Order::Sorted } else { Order::Preserve },
        verbatim,
        column: defaults.column.clone(),
    }
}

/// What the page shows below the form
struct Outcome {
    output: String,
    error: String,
    labels: usize,
}

fn generate(loaded: std::result::Result<BottleSheet, LabelError>, rack: &str, options: &LabelOptions, warnings: &mut Vec<String>) -> Outcome {
    if options.layout == Layout::Location && rack.trim().is_empty() {
        warnings.push(String::from("No rack number given, location labels will print without one."));
    }

    let result = loaded.and_then(|sheet| {
        let labels = (sheet.len() + 1) / 2;
        zpl::render_sheet(sheet, rack, options).map(|output| (output, labels))
    });

    match result {
        Ok((output, labels)) => Outcome { output, error: String::new(), labels },
        Err(e) => {
            warn!("Could not generate labels: {}", e);
            Outcome { output: String::new(), error: e.to_string(), labels: 0 }
        }
    }
}

fn page(ids: &str, rack: &str, options: &LabelOptions, warnings: Vec<String>, outcome: Outcome) -> Template {
    Template::render("index", context!{
        ids,
        rack,
        column: &options.column,
        tube: options.layout == Layout::Tube,
        floor: options.split == SplitPolicy::Floor,
        sorted: options.order == Order::Sorted,
        verbatim: options.verbatim,
        warnings,
        output: outcome.output,
        error: outcome.error,
        labels: outcome.labels,
    })
}

#[derive(FromForm, Debug)]
struct PastedIds<'r> {
    ids: &'r str,
    rack: Option<&'r str>,
    layout: Option<&'r str>,
    split: Option<&'r str>,
    sorted: bool,
    verbatim: bool,
}

#[derive(FromForm, Debug)]
struct Upload<'r> {
    #[field(name = "sheet")]
    workbook: Option<TempFile<'r>>,
    column: Option<&'r str>,
    rack: Option<&'r str>,
    layout: Option<&'r str>,
    split: Option<&'r str>,
    sorted: bool,
    verbatim: bool,
}

#[derive(Responder)]
struct SampleWorkbook(Vec<u8>, ContentType, Header<'static>);

/// Move an uploaded workbook somewhere calamine can open it, and read it.
/// The copy is removed again when this returns.
async fn load_upload(workbook: &mut TempFile<'_>, column: &str) -> std::result::Result<BottleSheet, LabelError> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("upload.xlsx");
    workbook.persist_to(&path).await?;
    BottleSheet::from_reader(std::fs::File::open(&path)?, column)
}

#[get("/")]
fn index(defaults: &State<LabelOptions>) -> Template {
    let outcome = Outcome { output: String::new(), error: String::new(), labels: 0 };
    page("", "", defaults.inner(), Vec::new(), outcome)
}

#[post("/text", data = "<query>")]
fn from_text(defaults: &State<LabelOptions>, query: Form<PastedIds<'_>>) -> Template {
    let mut warnings: Vec<String> = Vec::new();
    let query = query.into_inner();

    debug!("POST /text: {:?}", &query);

    let options = label_options(defaults, query.layout, query.split, query.sorted, query.verbatim, &mut warnings);
    let rack = query.rack.unwrap_or_default();
    let outcome = generate(Ok(BottleSheet::from_text(query.ids)), rack, &options, &mut warnings);

    page(query.ids, rack, &options, warnings, outcome)
}

#[post("/upload", data = "<upload>")]
async fn from_upload(defaults: &State<LabelOptions>, upload: Form<Upload<'_>>) -> Template {
    let mut warnings: Vec<String> = Vec::new();
    let mut upload = upload.into_inner();

    debug!("POST /upload: {:?}", &upload);

    let mut options = label_options(defaults, upload.layout, upload.split, upload.sorted, upload.verbatim, &mut warnings);
    if let Some(column) = upload.column.map(str::trim).filter(|c| !c.is_empty()) {
        options.column = column.to_string();
    }
    let rack = upload.rack.unwrap_or_default();

    // browsers send an empty, unnamed part when no file was chosen
    let loaded = match upload.workbook.as_mut() {
        Some(workbook) if workbook.len() > 0 => load_upload(workbook, &options.column).await,
        _ => Err(LabelError::NoUpload),
    };
    let outcome = generate(loaded, rack, &options, &mut warnings);

    page("", rack, &options, warnings, outcome)
}

#[get("/sample.xlsx")]
fn sample_workbook() -> std::result::Result<SampleWorkbook, Debug<LabelError>> {
    let dir = tempfile::tempdir().map_err(LabelError::Io)?;
    let path = dir.path().join(SAMPLE_NAME);
    BottleSheet::write_template(&path)?;
    let bytes = std::fs::read(&path).map_err(LabelError::Io)?;

    Ok(SampleWorkbook(
        bytes,
        ContentType::new("application", "vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
        Header::new("Content-Disposition", format!("attachment; filename=\"{}\"", SAMPLE_NAME)),
    ))
}

pub fn customize_hbs(hbs: &mut Handlebars) {
    hbs.set_strict_mode(true);
}

pub fn build() -> Rocket<Build> {
    let figment = rocket::Config::figment();
    rocket::custom(figment)
        .attach(AdHoc::config::<LabelOptions>())
        .attach(Template::custom(|engines| { customize_hbs(&mut engines.handlebars) }))
        .mount("/static", FileServer::from(relative!("static")))
        .mount("/", routes![index, from_text, from_upload, sample_workbook])
}

#[rocket::main]
pub async fn rocket() {
    if let Err(e) = build().launch().await {
        error!("Could not launch rocket: {}", e);
    }
}
