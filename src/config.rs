use clap::arg_enum;
use serde::Deserialize;
use std::path::PathBuf;
use structopt::StructOpt;

use crate::samplesheet::DEFAULT_COLUMN;

arg_enum! {
    /// Physical label layout
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum Layout {
        Location,
        Tube
    }
}

arg_enum! {
    /// How a list of bottle IDs is halved into left/right label slots
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum SplitPolicy {
        Ceil,
        Floor
    }
}

arg_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum Order {
        Preserve,
        Sorted
    }
}

/// Everything that decides how a batch of bottle IDs turns into labels.
///
/// The web form reads its defaults from Rocket's figment, so every field can
/// also be set in `Rocket.toml` or via `ROCKET_LAYOUT` and friends.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LabelOptions {
    pub layout: Layout,
    pub split: SplitPolicy,
    pub order: Order,
    /// Print IDs as given instead of coercing them to integers
    pub verbatim: bool,
    /// Spreadsheet column holding the bottle IDs
    pub column: String,
}

impl Default for LabelOptions {
    fn default() -> Self {
        LabelOptions {
            layout: Layout::Location,
            split: SplitPolicy::Ceil,
            order: Order::Preserve,
            verbatim: false,
            column: String::from(DEFAULT_COLUMN),
        }
    }
}

#[derive(StructOpt, Debug)]
pub enum Command {
    /// Render ZPL labels from a spreadsheet or a list of bottle IDs
    Render {
        /// Excel workbook (.xlsx) with a column of bottle IDs
        #[structopt(long, parse(from_os_str), conflicts_with = "text")]
        xlsx: Option<PathBuf>,

        /// Text file with one bottle ID per line, "-" reads from stdin (default)
        #[structopt(long)]
        text: Option<String>,

        /// Rack number printed on location labels
        #[structopt(short, long, default_value = "")]
        rack: String,

        /// Workbook column holding the bottle IDs [default: Sticker]
        #[structopt(long)]
        column: Option<String>,

        /// Label layout
        #[structopt(possible_values=&Layout::variants(), default_value="Location", case_insensitive=true, short, long)]
        layout: Layout,

        /// Which half gets the extra ID on odd counts
        #[structopt(possible_values=&SplitPolicy::variants(), default_value="Ceil", case_insensitive=true, long)]
        split: SplitPolicy,

        /// Sort bottle IDs before pairing them up
        #[structopt(long)]
        sort: bool,

        /// Print bottle IDs as given instead of as whole numbers
        #[structopt(long)]
        verbatim: bool,

        /// Write ZPL to this file instead of stdout
        #[structopt(short, long, parse(from_os_str))]
        output: Option<PathBuf>,
    },

    /// Write a sample workbook showing the expected input format
    Sample {
        #[structopt(default_value = "Bottle_Location.xlsx", parse(from_os_str))]
        path: PathBuf,
    },

    /// Start the Rocket handler
    Web,
}

#[derive(StructOpt, Debug)]
pub struct Opt {
    #[structopt(subcommand)]
    pub cmd: Command,
}
