use std::{error::Error, path::Path};

use test_utils::{check_run, Expected};

#[test]
fn recursive_fibonacci() -> Result<(), Box<dyn Error>> {
    check_run(Path::new("./scripts/fib.meow"), Expected { stdout: "6765\n" })
}
