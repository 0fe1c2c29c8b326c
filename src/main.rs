use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use genrelist::{cli, config, error, init_tracing, query::DEFAULT_RESULTS};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the playlist builder web page
    Serve(ServeOptions),

    /// Search tracks and create a playlist from the terminal
    Create(CreateArgs),

    /// Print the Spotify consent URL for the current configuration
    AuthUrl,

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct ServeOptions {
    /// Address to bind, overrides SERVER_ADDRESS (e.g. 127.0.0.1:8501)
    #[clap(long)]
    addr: Option<String>,

    /// Open the page in the default browser
    #[clap(long)]
    open: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CreateArgs {
    /// Genre to search for
    #[clap(long)]
    genre: Option<String>,

    /// Artist name(s), comma separated
    #[clap(long)]
    artist: Option<String>,

    /// Number of tracks (1-30)
    #[clap(long, default_value_t = DEFAULT_RESULTS as i64, allow_negative_numbers = true)]
    count: i64,

    /// Playlist name, defaults to "<Genre> Playlist"
    #[clap(long)]
    name: Option<String>,

    /// Create a private playlist
    #[clap(long)]
    private: bool,

    /// Playlist description, overrides PLAYLIST_DESCRIPTION
    #[clap(long)]
    description: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve(opt) => cli::serve(opt.addr, opt.open).await,
        Command::Create(opt) => {
            cli::create(cli::CreateOptions {
                genre: opt.genre,
                artist: opt.artist,
                count: opt.count,
                name: opt.name,
                private: opt.private,
                description: opt.description,
            })
            .await
        }
        Command::AuthUrl => cli::auth_url().await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
