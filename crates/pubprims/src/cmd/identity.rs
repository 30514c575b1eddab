use pubprims_envelope::ServiceIdentity;

use crate::exit::{CliResult, SUCCESS};

pub fn run() -> CliResult<i32> {
    println!("{}", ServiceIdentity::new_random());
    Ok(SUCCESS)
}
