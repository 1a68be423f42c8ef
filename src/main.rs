use colored::Colorize;
use keypath_box::{cli, logging};

fn main() {
    let command_line_interface = cli::CommandLineInterface::load();
    logging::bootstrap(command_line_interface.log_format);
    if let Err(error) = command_line_interface.run() {
        eprintln!("{} {error:#}", "error:".red().bold());
        std::process::exit(1);
    }
}
