use std::{error::Error, path::Path};

use test_utils::{check_run, Expected};

#[test]
fn block_scoped_shadowing() -> Result<(), Box<dyn Error>> {
    check_run(
        Path::new("./scripts/scope.meow"),
        Expected {
            stdout: "inner\nouter\n",
        },
    )
}
