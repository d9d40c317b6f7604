use log::error;
use tokio::io::BufReader;

use gpt5_mcp::{build_server, AdapterConfig};

#[tokio::main]
async fn main()
{   // stdout carries protocol frames, so logs go to stderr
    env_logger::Builder::from_env(
      env_logger::Env::default().default_filter_or("warn")
    )
    .target(env_logger::Target::Stderr)
    .init();

    let server = match AdapterConfig::load()
      .and_then(|config| build_server(&config))
    {   Ok(server) => server
      , Err(e) => {
          eprintln!("Error: {}", e);
          std::process::exit(1);
        }
    };

    eprintln!("GPT-5 MCP server running on stdio");

    let stdin = BufReader::new(tokio::io::stdin());
    if let Err(e) = server.serve(stdin, tokio::io::stdout()).await
    {   error!("Server stopped: {}", e);
        std::process::exit(1);
    }
}
