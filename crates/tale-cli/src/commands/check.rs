use std::path::Path;

pub fn run(script: Option<&Path>) -> Result<(), String> {
    let script = super::load_script(script)?;

    println!("  All checks passed for '{}'.", script.title());
    println!(
        "  {} knots, {} variables, starts at '{}'",
        script.knot_count(),
        script.variables().len(),
        script.start()
    );

    Ok(())
}
