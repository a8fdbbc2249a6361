use std::io::{self, Write};

use crate::error::Result;

const PREVIEW_LIMIT: usize = 5;

/// Ask the user to confirm a deletion unless `force` is set. Lists the first
/// few targets so the prompt is answerable without scrolling back.
pub fn confirm_deletion(paths: &[String], force: bool) -> Result<bool> {
    if force {
        return Ok(true);
    }

    println!(
        "This will permanently delete {} remote path(s):",
        paths.len()
    );
    for path in paths.iter().take(PREVIEW_LIMIT) {
        println!("  {path}");
    }
    if paths.len() > PREVIEW_LIMIT {
        println!("  ... and {} more", paths.len() - PREVIEW_LIMIT);
    }

    print!("Proceed? [y/N] ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let answer = input.trim();

    Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
}
