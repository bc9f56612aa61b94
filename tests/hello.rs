use std::{error::Error, path::Path};

use test_utils::{check_run, Expected};

#[test]
fn prints_a_string_literal() -> Result<(), Box<dyn Error>> {
    check_run(
        Path::new("./scripts/hello.meow"),
        Expected {
            stdout: "hello, cat\n",
        },
    )
}
