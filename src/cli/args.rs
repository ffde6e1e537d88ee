use std::fmt::Write;
use std::path::PathBuf;

use clap::{
    ArgAction, ColorChoice, CommandFactory, FromArgMatches, Parser, ValueEnum,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use predictive_search::{ResourceType, SearchField, UnavailableProducts};

use crate::app_dirs;

/// Produce the full version banner including config and cache directories.
fn long_version() -> &'static str {
    let config_dir = match app_dirs::get_config_dir() {
        Ok(path) => path.display().to_string(),
        Err(err) => format!("unavailable ({err})"),
    };
    let cache_dir = match app_dirs::get_cache_dir() {
        Ok(path) => path.display().to_string(),
        Err(err) => format!("unavailable ({err})"),
    };

    let mut details = format!("suggest {}", env!("CARGO_PKG_VERSION"));
    let _ = writeln!(details);
    let _ = writeln!(details, "config directory: {config_dir}");
    let _ = writeln!(details, "cache directory: {cache_dir}");

    Box::leak(details.into_boxed_str())
}

fn cli_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
        .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
        .literal(AnsiColor::Cyan.on_default())
        .placeholder(AnsiColor::Yellow.on_default())
}

/// Parse command line arguments into the strongly typed [`CliArgs`] structure.
pub(crate) fn parse_cli() -> CliArgs {
    let mut matches = CliArgs::command().get_matches();
    CliArgs::from_arg_matches_mut(&mut matches).unwrap_or_else(|err| err.exit())
}

#[derive(Parser, Debug)]
#[command(
    name = "suggest",
    version,
    long_version = long_version(),
    about = "Query a storefront's predictive search endpoint",
    color = ColorChoice::Auto,
    styles = cli_styles()
)]
/// Command-line arguments accepted by the `suggest` binary.
pub(crate) struct CliArgs {
    #[arg(
        value_name = "QUERY",
        help = "Queries to run (default: one per line from stdin)"
    )]
    pub(crate) queries: Vec<String>,
    #[arg(
        short,
        long = "config",
        value_name = "FILE",
        env = "PREDICTIVE_SEARCH_CONFIG",
        action = ArgAction::Append,
        help = "Additional configuration file to merge (default: none)"
    )]
    pub(crate) config: Vec<PathBuf>,
    #[arg(
        short = 'n',
        long = "no-config",
        help = "Skip loading default configuration files (default: disabled)"
    )]
    pub(crate) no_config: bool,
    #[arg(
        short = 'u',
        long = "store-url",
        value_name = "URL",
        help = "Storefront base URL, e.g. https://shop.example (default: store.url)"
    )]
    pub(crate) store_url: Option<String>,
    #[arg(
        short = 'p',
        long = "search-path",
        value_name = "PATH",
        help = "Search path prefix (default: /search)"
    )]
    pub(crate) search_path: Option<String>,
    #[arg(
        short = 't',
        long = "type",
        value_enum,
        action = ArgAction::Append,
        help = "Resource type to request; repeat for several (default: endpoint default)"
    )]
    pub(crate) types: Vec<ResourceTypeArg>,
    #[arg(
        short = 'f',
        long = "field",
        value_enum,
        action = ArgAction::Append,
        help = "Field to match against; repeat for several (default: endpoint default)"
    )]
    pub(crate) fields: Vec<FieldArg>,
    #[arg(
        short = 'l',
        long,
        value_name = "NUM",
        help = "Maximum results per resource type (default: endpoint default)"
    )]
    pub(crate) limit: Option<u32>,
    #[arg(
        long = "unavailable-products",
        value_enum,
        help = "Placement of unavailable products (default: endpoint default)"
    )]
    pub(crate) unavailable_products: Option<UnavailableArg>,
    #[arg(
        long = "debounce-ms",
        value_name = "MS",
        help = "Delay before a request is sent (default: 10)"
    )]
    pub(crate) debounce_ms: Option<u64>,
    #[arg(
        long = "timeout-ms",
        value_name = "MS",
        help = "HTTP request timeout (default: 10000)"
    )]
    pub(crate) timeout_ms: Option<u64>,
    #[arg(
        short = 'o',
        long,
        value_enum,
        default_value_t = OutputFormat::Plain,
        help = "Choose how events are printed"
    )]
    pub(crate) output: OutputFormat,
    #[arg(
        long = "print-config",
        help = "Print the resolved configuration; exits when no queries are given (default: disabled)"
    )]
    pub(crate) print_config: bool,
    #[arg(
        long = "type-ahead",
        help = "Submit every prefix of each query as if typed (default: disabled)"
    )]
    pub(crate) type_ahead: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum ResourceTypeArg {
    Product,
    Page,
    Article,
    Collection,
}

impl From<ResourceTypeArg> for ResourceType {
    fn from(arg: ResourceTypeArg) -> Self {
        match arg {
            ResourceTypeArg::Product => ResourceType::Product,
            ResourceTypeArg::Page => ResourceType::Page,
            ResourceTypeArg::Article => ResourceType::Article,
            ResourceTypeArg::Collection => ResourceType::Collection,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum FieldArg {
    Author,
    Body,
    #[value(name = "product_type")]
    ProductType,
    Tag,
    Title,
    #[value(name = "variants.barcode")]
    VariantsBarcode,
    #[value(name = "variants.sku")]
    VariantsSku,
    #[value(name = "variants.title")]
    VariantsTitle,
    Vendor,
}

impl From<FieldArg> for SearchField {
    fn from(arg: FieldArg) -> Self {
        match arg {
            FieldArg::Author => SearchField::Author,
            FieldArg::Body => SearchField::Body,
            FieldArg::ProductType => SearchField::ProductType,
            FieldArg::Tag => SearchField::Tag,
            FieldArg::Title => SearchField::Title,
            FieldArg::VariantsBarcode => SearchField::VariantsBarcode,
            FieldArg::VariantsSku => SearchField::VariantsSku,
            FieldArg::VariantsTitle => SearchField::VariantsTitle,
            FieldArg::Vendor => SearchField::Vendor,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum UnavailableArg {
    Show,
    Hide,
    Last,
}

impl From<UnavailableArg> for UnavailableProducts {
    fn from(arg: UnavailableArg) -> Self {
        match arg {
            UnavailableArg::Show => UnavailableProducts::Show,
            UnavailableArg::Hide => UnavailableProducts::Hide,
            UnavailableArg::Last => UnavailableProducts::Last,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
/// Output formats supported by the CLI utility.
pub(crate) enum OutputFormat {
    Plain,
    Json,
}
