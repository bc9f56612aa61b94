use std::{error::Error, path::Path};

use test_utils::{check_run, Expected};

#[test]
fn counter_closure_retains_its_captured_scope() -> Result<(), Box<dyn Error>> {
    check_run(
        Path::new("./scripts/counter.meow"),
        Expected {
            stdout: "1\n2\n3\n",
        },
    )
}
