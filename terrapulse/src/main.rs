mod options;

use advisor::{AdviceRequest, AdviceStream, AdvisorClient, AdvisorConfig, AdvisorError, FieldSummary};
use anyhow::{anyhow, Error as AnyError};
use clap::Parser;
use fieldgeo::{
    area_acres, distance_m, report::FieldRecord, CustomLayer, FieldReport, MeasureMode,
    MeasureTool, Measurement,
};
use log::{error, info};
use options::{AdvisorArgs, Cli, Command as CliCmd, Format, LatLon, Mode};
use serde::{de::DeserializeOwned, Serialize};
use std::{
    fs::File,
    io::{BufReader, Read, Write},
    path::{Path, PathBuf},
    time::Duration,
};

fn main() -> Result<(), AnyError> {
    let Cli { advisor, cmd } = Cli::parse();

    env_logger::init();

    match cmd {
        CliCmd::Area { points } => area(&points),
        CliCmd::Distance { from, to } => distance(from, to),
        CliCmd::Measure {
            mode,
            finish,
            points,
        } => measure(mode, finish, &points),
        CliCmd::Decode { input } => decode(input.as_deref()),
        CliCmd::Advise {
            field,
            weather,
            query,
            stream,
        } => advise(&advisor, field, weather, query, stream),
        CliCmd::Report { input, format } => report(&input, format),
        CliCmd::Layer {
            input,
            index,
            geojson,
        } => layer(&input, index, geojson),
    }
}

fn area(points: &[LatLon]) -> Result<(), AnyError> {
    let ring: Vec<_> = points.iter().map(|LatLon(coord)| *coord).collect();
    if ring.len() < 3 {
        info!("fewer than three points, no area");
    }
    println!("{}", Measurement::Area { acres: area_acres(&ring) });
    Ok(())
}

fn distance(LatLon(from): LatLon, LatLon(to): LatLon) -> Result<(), AnyError> {
    let meters = distance_m(from, to);
    println!("{}", Measurement::Distance { meters });
    Ok(())
}

fn measure(mode: Mode, finish: bool, points: &[LatLon]) -> Result<(), AnyError> {
    let mode = match mode {
        Mode::Distance => MeasureMode::Distance,
        Mode::Area => MeasureMode::Area,
    };
    let mut tool = MeasureTool::new(mode);
    let mut stdout = std::io::stdout().lock();
    for (i, LatLon(coord)) in points.iter().enumerate() {
        if let Some(measurement) = tool.click(*coord) {
            writeln!(stdout, "{i:4}: {measurement}")?;
        }
    }
    if finish {
        match tool.finish() {
            Some(measurement) => writeln!(stdout, "done: {measurement}")?,
            None => writeln!(stdout, "done: nothing to measure")?,
        }
    }
    Ok(())
}

fn decode(input: Option<&Path>) -> Result<(), AnyError> {
    let body: Box<dyn Read> = match input {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(std::io::stdin().lock()),
    };
    print_progressively(AdviceStream::new(body))?;
    Ok(())
}

fn advise(
    args: &AdvisorArgs,
    field: Option<PathBuf>,
    weather: Option<PathBuf>,
    query: Option<String>,
    stream: bool,
) -> Result<(), AnyError> {
    let mut request = match field {
        Some(path) => AdviceRequest::for_field(read_json::<FieldSummary>(&path)?),
        None => AdviceRequest::question(
            query
                .clone()
                .ok_or_else(|| anyhow!("either --field or --query is required"))?,
        ),
    };
    request.query = query;
    if let Some(path) = weather {
        request = request.weather(read_json(&path)?);
    }

    let client = AdvisorClient::new(advisor_config(args)?)?;

    // Advisor failures are reported by their short notice only.
    let result = client.stream_advice(&request).and_then(|advice| {
        if stream {
            print_progressively(advice)
        } else {
            let text = advice.into_text()?;
            println!("{text}");
            Ok(())
        }
    });
    result.map_err(|err| {
        error!("advisor; {err}");
        anyhow!(err.notice())
    })
}

fn report(input: &Path, format: Format) -> Result<(), AnyError> {
    let records: Vec<FieldRecord> = read_json(input)?;
    let report = FieldReport::from_records(&records);
    let stdout = std::io::stdout().lock();
    match format {
        Format::Csv => report.write_csv(stdout)?,
        Format::Json => serde_json::to_writer_pretty(stdout, &report)?,
    }
    Ok(())
}

fn layer(input: &Path, index: usize, geojson: bool) -> Result<(), AnyError> {
    #[derive(Serialize)]
    struct LayerSummary<'a> {
        name: &'a str,
        kind: fieldgeo::LayerKind,
        color: &'a str,
        features: usize,
    }

    let layer = CustomLayer::load(input, index)?;
    let json = if geojson {
        serde_json::to_string(&layer.collection)?
    } else {
        serde_json::to_string(&LayerSummary {
            name: &layer.name,
            kind: layer.kind,
            color: layer.color,
            features: layer.collection.features.len(),
        })?
    };
    println!("{json}");
    Ok(())
}

fn advisor_config(args: &AdvisorArgs) -> Result<AdvisorConfig, AnyError> {
    let AdvisorArgs {
        advisor_url,
        api_key,
        timeout,
        model,
        retry_limit,
    } = args.clone();

    let mut builder = AdvisorConfig::builder();
    if let Some(url) = advisor_url {
        builder = builder.url(url);
    }
    if let Some(api_key) = api_key {
        builder = builder.api_key(api_key);
    }
    if let Some(secs) = timeout {
        builder = builder.timeout((secs > 0).then(|| Duration::from_secs(secs)));
    }
    if let Some(model) = model {
        builder = builder.gateway(model);
    }
    if let Some(limit) = retry_limit {
        builder = builder.retry_limit(limit);
    }
    Ok(builder.build()?)
}

/// Writes each newly arrived piece of text as soon as it is decoded.
fn print_progressively<R: Read>(advice: AdviceStream<R>) -> Result<(), AdvisorError> {
    let mut stdout = std::io::stdout().lock();
    let mut printed = 0;
    for snapshot in advice {
        let snapshot = snapshot?;
        stdout.write_all(snapshot[printed..].as_bytes())?;
        stdout.flush()?;
        printed = snapshot.len();
    }
    writeln!(stdout)?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, AnyError> {
    let file = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(file)?)
}
