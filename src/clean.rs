use anyhow::{Context, Result, anyhow};
use log::{debug, info};

use crate::{
    cli::CleanArgs,
    io_utils,
    pipeline::Pipeline,
    rules::CleaningRules,
    store::{CsvStore, MemoryStore, RecordStore},
    summary::CleanSummary,
    table,
};

pub fn execute(args: &CleanArgs) -> Result<()> {
    if args.preview && args.output.is_some() {
        return Err(anyhow!("--preview cannot be combined with --output"));
    }
    let rules = match &args.rules {
        Some(path) => CleaningRules::load(path)?,
        None => CleaningRules::default(),
    };
    debug!("Cleaning rules: {:?}", rules);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;

    let mut source = CsvStore::new(&args.input)
        .with_delimiter(args.delimiter)
        .with_encoding(encoding)
        .with_null_tokens(&rules.null_tokens);
    let pipeline = Pipeline::new(rules);

    let summary = if args.preview {
        let mut destination = MemoryStore::default();
        let summary = run(&pipeline, &mut source, &mut destination)?;
        let rows = destination
            .records()
            .iter()
            .take(args.rows)
            .map(|record| record.to_cells())
            .collect::<Vec<_>>();
        let headers = crate::record::COLUMNS.map(String::from).to_vec();
        table::print_table(&headers, &rows);
        println!();
        table::print_table(&CleanSummary::table_headers(), &summary.table_rows());
        info!("Displayed {} of {} cleaned row(s)", rows.len(), summary.emitted);
        summary
    } else {
        let output = args
            .output
            .clone()
            .unwrap_or_else(|| std::path::PathBuf::from("-"));
        // Without an explicit output delimiter, stdout follows the input's.
        let input_delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
        let output_delimiter = io_utils::resolve_output_delimiter(
            Some(output.as_path()),
            args.output_delimiter,
            input_delimiter,
        );
        let mut destination = CsvStore::new(output).with_output_delimiter(Some(output_delimiter));
        run(&pipeline, &mut source, &mut destination)?
    };

    summary.log();
    if let Some(path) = &args.report {
        summary
            .save_json(path)
            .with_context(|| format!("Writing run report to {path:?}"))?;
        info!("Run report written to {:?}", path);
    }
    Ok(())
}

fn run(
    pipeline: &Pipeline,
    source: &mut CsvStore,
    destination: &mut dyn RecordStore,
) -> Result<CleanSummary> {
    pipeline
        .run(source, destination)
        .with_context(|| format!("Cleaning {:?}", source_label(source)))
}

fn source_label(source: &CsvStore) -> String {
    if io_utils::is_dash(source.path()) {
        "stdin".to_string()
    } else {
        source.path().display().to_string()
    }
}
