//! repeat-get command-line entry point

use repeat_get::{app::App, cli::{Cli, HelpSystem}, error::AppError};
use std::process;

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        // The keypress listener may have left the terminal in raw mode
        let _ = crossterm::terminal::disable_raw_mode();
        eprintln!("Application panic: {}", panic_info);
        process::exit(101);
    }));

    let cli = match Cli::from_env() {
        Ok(cli) => cli,
        Err(e) => exit_with_usage(&e, Cli::default().use_colors()),
    };
    let use_colors = cli.use_colors();

    match App::new(cli).run().await {
        // A run that started always exits successfully, however its
        // requests went
        Ok(_) => process::exit(0),
        Err(e) if e.is_configuration() => exit_with_usage(&e, use_colors),
        Err(e) => {
            eprintln!("{}", e.format_for_console(use_colors));
            process::exit(e.exit_code());
        }
    }
}

/// Report a configuration error the way the tool always has: the message
/// followed by the usage text
fn exit_with_usage(error: &AppError, use_colors: bool) -> ! {
    println!("Error: ");
    println!("\t{}", error);
    print!("{}", HelpSystem::new().display_usage(use_colors));
    process::exit(error.exit_code());
}
