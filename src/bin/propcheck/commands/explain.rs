//! `propcheck explain` command

use anyhow::{anyhow, Result};

use crate::cli::ExplainArgs;
use propcheck::core::problem::ValidationProblemId;
use propcheck::util::diagnostic::suggestions;

pub fn execute(args: ExplainArgs) -> Result<()> {
    if args.list {
        for id in ValidationProblemId::ALL {
            println!("{:<30} {}", id, id.summary());
        }
        return Ok(());
    }

    let Some(raw) = args.id else {
        return Ok(());
    };
    let id: ValidationProblemId = raw
        .parse()
        .map_err(|e| anyhow!("{}\n{}", e, suggestions::UNKNOWN_ID))?;

    println!("{}", id);
    println!("  {}", id.summary());
    println!("  docs: {}", id.documentation());
    Ok(())
}
