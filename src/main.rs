use clap::Parser;

mod commands;
mod output;

use commands::{fix, GlobalArgs};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "nsfix")]
#[command(version = VERSION)]
#[command(about = "Align a PHP file's namespace with its directory and update the imports that use it")]
struct Cli {
    #[command(flatten)]
    fix: fix::FixArgs,

    /// Print the JSON response envelope instead of status lines
    #[arg(long)]
    json: bool,
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let global = GlobalArgs { json: cli.json };

    let result = fix::run(cli.fix, &global);
    let (json_result, exit_code) = output::map_cmd_result_to_json(result);

    if global.json {
        if let Err(err) = output::print_json_result(json_result) {
            output::print_error(&err);
            return std::process::ExitCode::from(exit_code_to_u8(1));
        }
    } else if let Err(err) = json_result {
        output::print_error(&err);
    }

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
