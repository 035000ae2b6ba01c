use clap::Parser;
use rocket::{error, info};
use std::env;

#[derive(Parser)]
#[command(name = "pkwt-api")]
#[command(about = "Aplikasi administrasi karyawan kontrak (PKWT)")]
#[command(version)]
struct Cli {}

#[rocket::main]
async fn main() {
    let _cli = Cli::parse();

    match env::current_dir() {
        Ok(path) => info!("Current directory: {}", path.display()),
        Err(e) => error!("Error getting current directory: {}", e),
    };

    pkwt_api::rocket()
        .launch()
        .await
        .expect("Rocket server failed to launch");
}
