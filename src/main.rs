use std::fs;
use std::io::{self, Read};

use anyhow::{Context, Result};
use gridfill::config::Config;
use gridfill::{Layout, Solver, WordIndex, WordList};
use log::{debug, info};

fn read_template() -> Result<String> {
    // If a template file is given as a command line argument, use that. Otherwise read stdin.
    match std::env::args().nth(1) {
        Some(path) => {
            fs::read_to_string(&path)
                .with_context(|| format!("failed to read grid template {}", path))
        }
        None => {
            let mut template = String::new();
            io::stdin()
                .read_to_string(&mut template)
                .context("failed to read grid template from stdin")?;
            Ok(template)
        }
    }
}

fn main() -> Result<()> {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    let config = Config::from_env()?;
    debug!("{:?}", config);

    let words = WordList::load(&config.word_list, config.case_sensitive)?;
    let layout = Layout::from_template(&read_template()?)?;
    info!(
        "{} words loaded, {} slots to fill",
        words.len(),
        layout.slots().len()
    );

    let mut solver =
        Solver::new(words, config.letters.as_deref(), Some(layout), config.lengths);
    let solutions = solver.solve(&config.options)?;

    for solution in solutions {
        println!("{}", solution);
    }

    if let Some(statistics) = solver.statistics() {
        println!("{:?}", statistics);
    }

    Ok(())
}
