//! Natures command - list document natures.

use docseries_core::DocumentNature;

pub fn run() -> anyhow::Result<()> {
    for nature in DocumentNature::all() {
        println!("{}", nature);
    }
    Ok(())
}
