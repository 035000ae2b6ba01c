use clap::{Parser, Subcommand};

mod admin_cli;

use admin_cli::user_commands::{UserAction, handle_user_command_with_conn};
use admin_cli::utils::establish_connection;

#[derive(Parser)]
#[command(name = "pkwt-admin")]
#[command(about = "Perkakas administrasi akun aplikasi PKWT")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Manage login users")]
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = establish_connection().and_then(|mut conn| match cli.command {
        Commands::User { action } => handle_user_command_with_conn(&mut conn, action),
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
