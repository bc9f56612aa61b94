use std::{error::Error, path::Path, process::Command};

#[test]
fn division_by_zero_is_reported_on_stdout_with_error_prefix() -> Result<(), Box<dyn Error>> {
    let output = Command::new("./target/debug/meow")
        .arg(Path::new("./scripts/division_by_zero.meow"))
        .output()?;

    let stdout = std::str::from_utf8(&output.stdout)?;
    assert!(stdout.starts_with("Error: "));
    assert!(stdout.contains("Division by zero"));
    Ok(())
}

#[test]
fn more_than_one_argument_is_a_usage_error() -> Result<(), Box<dyn Error>> {
    let output = Command::new("./target/debug/meow").args(["a.meow", "b.meow"]).output()?;

    assert_eq!(output.status.code(), Some(64));
    Ok(())
}
