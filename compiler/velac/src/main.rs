//! Vela code generator CLI.

use velac::commands::{check_file, explain_error, gen_file};

fn main() {
    velac::init_tracing();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];

    match command.as_str() {
        "gen" => {
            if args.len() < 3 {
                eprintln!("Usage: velac gen <program.json> --dest <dir> [options]");
                eprintln!();
                print_gen_options();
                std::process::exit(1);
            }
            gen_file(&args[2..]);
        }
        "check" => {
            if args.len() < 3 {
                eprintln!("Usage: velac check <program.json>");
                std::process::exit(1);
            }
            check_file(&args[2]);
        }
        "--explain" | "explain" => {
            if args.len() < 3 {
                eprintln!("Usage: velac explain <ERROR_CODE>");
                eprintln!("Example: velac explain E3001");
                std::process::exit(1);
            }
            explain_error(&args[2]);
        }
        "help" | "--help" | "-h" => {
            print_usage();
        }
        "version" | "--version" | "-V" => {
            println!("velac {}", env!("CARGO_PKG_VERSION"));
        }
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!("Vela code generator");
    println!();
    println!("Usage: velac <command> [options]");
    println!();
    println!("Commands:");
    println!("  gen <program.json>     Generate C++ translation units");
    println!("  check <program.json>   Synthesize dispatch and validate overrides only");
    println!("  explain <code>         Explain an error code (e.g., E3001)");
    println!("  help                   Show this help message");
    println!("  version                Show version information");
    println!();
    print_gen_options();
    println!();
    println!("Examples:");
    println!("  velac gen app.json --dest out/");
    println!("  velac gen app.json --dest out/ --diff      # rewrite changed files only");
    println!("  velac gen geo.json --static-lib=geo --dest out/");
    println!("  velac check app.json");
    println!();
    println!("Set RUST_LOG (e.g. RUST_LOG=vela_codegen=debug) for a trace of the pipeline.");
}

fn print_gen_options() {
    println!("Gen options:");
    println!("  --dest <dir>            Output directory (default: vela_out)");
    println!("  --jobs=<n|auto>         Worker threads; 1 runs sequentially");
    println!("  --static-lib[=<name>]   Build a static library instead of an executable");
    println!("  --tl-schema=<file>      TL schema for functions using RPC types");
    println!("  --split=<n>             Globals per vars<N>.cpp part (default: 1024)");
    println!("  --runtime-headers=<h>   Runtime header included by every unit");
    println!("  --verify-idempotence    Generate every unit twice and compare");
    println!("  --mem-stats             Emit the global variables memory report");
    println!("  --diff                  Only rewrite files whose hash changed");
}
