use std::io::{self, Write};

use anyhow::{bail, Result};

/// Abstracts the interactive archive picker so `extract_soundbank`'s logic
/// is exercised without a real terminal. The CLI surface only needs a
/// minimal line-based prompt; a richer picker is explicitly out of scope.
pub trait Selector {
    fn select(&mut self, candidates: &[String]) -> Result<usize>;
}

pub struct StdinSelector;

impl Selector for StdinSelector {
    fn select(&mut self, candidates: &[String]) -> Result<usize> {
        for (i, candidate) in candidates.iter().enumerate() {
            println!("  [{i}] {candidate}");
        }
        print!("select an archive by index: ");
        io::stdout().flush()?;

        let mut line = String::new();
        io::stdin().read_line(&mut line)?;
        let index: usize = line.trim().parse()?;
        if index >= candidates.len() {
            bail!("index {index} out of range (0..{})", candidates.len());
        }
        Ok(index)
    }
}
