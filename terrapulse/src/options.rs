use anyhow::{anyhow, Error as AnyError};
use clap::{Args, Parser, Subcommand, ValueEnum};
use geo::geometry::Coord;
use std::{path::PathBuf, str::FromStr};

/// Field measurement and streaming agronomy advice.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub advisor: AdvisorArgs,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Args, Debug, Clone)]
pub struct AdvisorArgs {
    /// Advisor endpoint URL.
    #[arg(long, env = "TERRAPULSE_ADVISOR_URL", global = true)]
    pub advisor_url: Option<String>,

    /// Bearer token for the advisor endpoint.
    #[arg(long, env = "TERRAPULSE_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Request timeout in seconds, 0 to disable.
    #[arg(long, env = "TERRAPULSE_TIMEOUT_SECS", global = true)]
    pub timeout: Option<u64>,

    /// Treat the endpoint as a chat completions gateway using this
    /// model instead of the advisor proxy.
    #[arg(long, env = "TERRAPULSE_MODEL", global = true)]
    pub model: Option<String>,

    /// Fail when a streamed line still doesn't parse after this many
    /// retries.
    #[arg(long, env = "TERRAPULSE_RETRY_LIMIT", global = true)]
    pub retry_limit: Option<usize>,
}

/// A "lat,lon" pair.
#[derive(Clone, Copy, Debug)]
pub struct LatLon(pub Coord<f64>);

impl FromStr for LatLon {
    type Err = AnyError;
    fn from_str(s: &str) -> Result<Self, AnyError> {
        let (lat_str, lon_str) = s
            .split_once(',')
            .ok_or_else(|| anyhow!("not a valid lat,lon pair"))?;
        let lat = f64::from_str(lat_str.trim())?;
        let lon = f64::from_str(lon_str.trim())?;
        if !(-90.0..=90.0).contains(&lat) {
            return Err(anyhow!("latitude {lat} out of range"));
        }
        if !lon.is_finite() {
            return Err(anyhow!("longitude {lon} is not a number"));
        }
        Ok(Self(Coord { y: lat, x: lon }))
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Mode {
    Distance,
    Area,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Format {
    Csv,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Area of a polygon, in acres.
    Area {
        /// Polygon vertex "lat,lon" (at least three).
        #[arg(short, long = "point", required = true, allow_hyphen_values = true)]
        points: Vec<LatLon>,
    },

    /// Great-circle distance between two points.
    Distance {
        /// Start "lat,lon"
        #[arg(long, allow_hyphen_values = true)]
        from: LatLon,

        /// Destination "lat,lon"
        #[arg(long, allow_hyphen_values = true)]
        to: LatLon,
    },

    /// Replay map clicks through the measurement tool.
    Measure {
        #[arg(long, value_enum)]
        mode: Mode,

        /// Double-click after the last point.
        #[arg(long)]
        finish: bool,

        /// Clicked "lat,lon", in order.
        #[arg(short, long = "point", allow_hyphen_values = true)]
        points: Vec<LatLon>,
    },

    /// Decode a captured event stream and print its text.
    Decode {
        /// SSE capture (defaults to stdin).
        input: Option<PathBuf>,
    },

    /// Ask the advisor about a field.
    Advise {
        /// Field summary JSON.
        #[arg(long)]
        field: Option<PathBuf>,

        /// Current weather JSON.
        #[arg(long)]
        weather: Option<PathBuf>,

        /// Free-form question.
        #[arg(short, long)]
        query: Option<String>,

        /// Print advice as it arrives instead of when complete.
        #[arg(long)]
        stream: bool,
    },

    /// Acreage and health summary for a list of fields.
    Report {
        /// Field records JSON.
        input: PathBuf,

        #[arg(short, long, value_enum, default_value_t = Format::Csv)]
        format: Format,
    },

    /// Import a GeoJSON or CSV overlay layer.
    Layer {
        input: PathBuf,

        /// Position in the layer list (picks the color).
        #[arg(long, default_value_t = 0)]
        index: usize,

        /// Print the full feature collection.
        #[arg(long)]
        geojson: bool,
    },
}
