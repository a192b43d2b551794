//! The `explain` command: print the documentation of an error code.

use vela_diagnostic::{ErrorCode, ErrorDocs};

pub fn explain_error(code_str: &str) {
    let Ok(code) = code_str.parse::<ErrorCode>() else {
        eprintln!("Unknown error code: {code_str}");
        eprintln!();
        eprintln!("Codes have the format EXXXX: E3xxx dispatch, E5xxx code generation, E9xxx internal.");
        eprintln!("Examples: E3001, E5001, E9002");
        std::process::exit(1);
    };

    if let Some(doc) = ErrorDocs::get(code) {
        println!("{doc}");
    } else {
        eprintln!("No documentation available for {code_str}");
        eprintln!();
        eprintln!("Summary: {}", code.summary());
        std::process::exit(1);
    }
}
