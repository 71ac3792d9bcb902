//! `propcheck check` command

use anyhow::{anyhow, bail, Result};

use crate::cli::{CheckArgs, OutputFormat};
use propcheck::ops::check_unit;
use propcheck::util::diagnostic::{emit, suggestions, Diagnostic};
use propcheck::util::GlobalContext;

pub fn execute(args: CheckArgs, color: bool) -> Result<()> {
    let ctx = GlobalContext::new()?;

    let manifest_path = match args.manifest {
        Some(path) => path,
        None => ctx
            .find_manifest()
            .map_err(|e| anyhow!("{}\n{}", e, suggestions::NO_MANIFEST))?,
    };
    let project_root = manifest_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| ctx.cwd().to_path_buf());

    let mut config = ctx.load_config(&project_root);
    if args.parallel {
        config.validation.parallel = Some(true);
    }
    if args.deny_warnings {
        config.validation.fail_on_warnings = Some(true);
    }
    let settings = config.validation_settings();

    let report = check_unit(&manifest_path, &config)?;

    match args.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            for problem in &report.problems {
                emit(&Diagnostic::from(problem), color);
            }
            for failure in &report.failures {
                emit(&Diagnostic::from(failure), color);
            }
        }
    }

    if !report.is_success(settings.fail_on_warnings) {
        if args.format == OutputFormat::Text {
            eprintln!("{}", suggestions::EXPLAIN);
        }
        bail!(
            "unit '{}' failed validation: {} error(s), {} warning(s), {} aborted",
            report.unit,
            report.errors().count(),
            report.warnings().count(),
            report.failures.len()
        );
    }

    if args.format == OutputFormat::Text {
        eprintln!(
            "unit '{}' is valid ({} warning(s))",
            report.unit,
            report.warnings().count()
        );
    }
    Ok(())
}
