use std::process::ExitCode;

use asmlex_driver::{Argument, Parser};

fn main() -> ExitCode {
    let argument = Argument::parse();
    asmlex_driver::run(argument)
}
