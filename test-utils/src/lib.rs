use std::{
    error::Error,
    path::Path,
    process::{Command, Output},
    str,
};

const MEOW_PATH: &str = "./target/debug/meow";

pub struct Expected<'a> {
    pub stdout: &'a str,
}

impl<'a> Expected<'a> {
    fn assert_matches(self, output: &Output) -> Result<(), Box<dyn Error>> {
        assert_eq!(str::from_utf8(&output.stdout)?, self.stdout);
        Ok(())
    }
}

fn run_script(src_path: &Path) -> Result<Output, std::io::Error> {
    Command::new(MEOW_PATH).arg(src_path).output()
}

/// Runs a `.meow` script through the built binary and asserts its full
/// stdout (spec.md 6: `purr` lines plus any `Error: `-prefixed diagnostic,
/// all on one channel) matches `expected`.
pub fn check_run(src_path: &Path, expected: Expected) -> Result<(), Box<dyn Error>> {
    let output = run_script(src_path)?;
    expected.assert_matches(&output)?;
    Ok(())
}
