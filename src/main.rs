use clap::Parser;
use enterprise_userlist_app::Args;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let args = Args::parse();
    enterprise_userlist_app::init_logging(args.verbose);

    if let Err(err) = enterprise_userlist_app::generate(args).await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}
