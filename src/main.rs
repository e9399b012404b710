use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use memsysexplorer::cache;
use memsysexplorer::cell::{apply_pvt, parse_cell};
use memsysexplorer::enumerate::enumerate;
use memsysexplorer::params::ingest::normalize;
use memsysexplorer::params::DesignTarget;
use memsysexplorer::report::{render_cache_text, render_structured, render_structured_cache, render_text};
use memsysexplorer::search::{search, SearchOutcome};
use memsysexplorer::tech::Technology;

/// Area/timing/energy exploration engine for memory arrays.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Path to the parameter document.
    parameter_file: PathBuf,

    /// Directory to write the plain-text and structured reports into.
    /// Defaults to printing the plain-text report to stdout only.
    output_dir: Option<PathBuf>,
}

fn read_json(path: &Path) -> Result<serde_json::Value> {
    let text = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {} as JSON", path.display()))
}

fn run(cli: &Cli) -> Result<(String, serde_json::Value)> {
    let param_doc = read_json(&cli.parameter_file)?;
    let params = normalize(&param_doc).context("invalid parameter document")?;

    let cell_file = param_doc
        .get("MemoryCellInputFile")
        .and_then(serde_json::Value::as_str)
        .context("parameter document is missing MemoryCellInputFile")?;
    let cell_doc = read_json(&cli.parameter_file.with_file_name(cell_file))?;
    let (mut cell, warnings) = parse_cell(&cell_doc).context("invalid cell document")?;
    for w in &warnings {
        warn!("{w}");
    }
    apply_pvt(&mut cell, params.temperature_k);

    let tech = Technology::for_node(params.process_node_nm, params.device_roadmap);

    if params.design_target == DesignTarget::Cache {
        // The tag array's row count is the number of sets, and its word
        // width is the physical tag field rather than the cache-line size;
        // a 32-bit tag is a reasonable stand-in absent a narrower
        // tag-width input.
        const TAG_WIDTH_BITS: u32 = 32;
        let num_sets = (params.capacity_bits / (params.word_width_bits as u64 * params.associativity as u64)).max(1);
        let mut tag_params = params.clone();
        tag_params.word_width_bits = TAG_WIDTH_BITS;
        tag_params.capacity_bits = num_sets * TAG_WIDTH_BITS as u64 * params.associativity as u64;
        tag_params.array_kind = memsysexplorer::params::ArrayKind::Tag;

        let data_points = enumerate(&params);
        let data_outcome = search(&params, &cell, &tech, data_points)?;
        let tag_points = enumerate(&tag_params);
        let tag_outcome = search(&tag_params, &cell, &tech, tag_points)?;

        let (data, tag) = match (data_outcome, tag_outcome) {
            (SearchOutcome::Incumbent(data), SearchOutcome::Incumbent(tag)) => (data, tag),
            _ => anyhow::bail!("full-exploration mode does not compose cache results"),
        };

        let composition = cache::compose(params.cache_access_mode, &data, &tag, cell.retention_time_s);

        let mut text = render_text(&params, &cell, &data);
        text.push_str(&render_text(&tag_params, &cell, &tag));
        text.push_str(&render_cache_text(&params, &composition));
        let structured = render_structured_cache(&params, &cell, &data, &tag, &composition);
        Ok((text, structured))
    } else {
        let points = enumerate(&params);
        match search(&params, &cell, &tech, points)? {
            SearchOutcome::Incumbent(candidate) => {
                let text = render_text(&params, &cell, &candidate);
                let structured = render_structured(&params, &cell, &candidate);
                Ok((text, structured))
            }
            SearchOutcome::Exploration(candidates) => {
                info!("full exploration produced {} admissible candidates", candidates.len());
                let mut text = String::new();
                let mut structured = Vec::new();
                for candidate in &candidates {
                    text.push_str(&render_text(&params, &cell, candidate));
                    structured.push(render_structured(&params, &cell, candidate));
                }
                Ok((text, serde_json::Value::Array(structured)))
            }
        }
    }
}

fn write_outputs(output_dir: Option<&Path>, text: &str, structured: &serde_json::Value) -> Result<()> {
    match output_dir {
        None => println!("{text}"),
        Some(dir) => {
            std::fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
            std::fs::write(dir.join("report.txt"), text)
                .with_context(|| format!("failed to write {}", dir.join("report.txt").display()))?;
            std::fs::write(dir.join("report.json"), serde_json::to_string_pretty(structured)?)
                .with_context(|| format!("failed to write {}", dir.join("report.json").display()))?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok((text, structured)) => match write_outputs(cli.output_dir.as_deref(), &text, &structured) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("error: {err:#}");
                ExitCode::FAILURE
            }
        },
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
