//! CLI command definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "haggle")]
#[command(about = "Haggle - two players, one shopkeeper, lowest price wins", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Options for `play`, which runs when no subcommand is given
    #[command(flatten)]
    pub play: PlayArgs,
}

impl Cli {
    /// The requested command, defaulting to `play`
    pub fn into_command(self) -> Commands {
        self.command.unwrap_or(Commands::Play(self.play))
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Play a two-player haggling game in the terminal
    Play(PlayArgs),

    /// Print the prices found in a piece of text
    Extract {
        /// Text to scan
        text: String,
    },

    /// Run one round of price adjustment
    NextPrice {
        /// What the player said
        #[arg(short, long)]
        player: String,

        /// What the owner replied
        #[arg(short, long)]
        owner: String,

        /// Price before the reply
        #[arg(short, long)]
        current: f64,
    },
}

#[derive(Args, Debug, Clone)]
pub struct PlayArgs {
    /// API key for the language model service
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Base URL of an OpenAI-compatible API
    #[arg(long, env = "HAGGLE_BASE_URL", default_value = "https://api.openai.com/v1")]
    pub base_url: String,

    /// Chat model playing the shop owner
    #[arg(long, env = "HAGGLE_MODEL", default_value = "gpt-3.5-turbo")]
    pub model: String,

    /// Image model used with --generate-image
    #[arg(long, env = "HAGGLE_IMAGE_MODEL", default_value = "dall-e-2")]
    pub image_model: String,

    /// Generated image size
    #[arg(long, default_value = "256x256")]
    pub image_size: String,

    /// Token cap per owner reply
    #[arg(long, default_value_t = 150)]
    pub max_tokens: u32,

    /// Sampling temperature
    #[arg(long, default_value_t = 0.7)]
    pub temperature: f32,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// Play against a scripted owner without calling any service
    #[arg(long, env = "HAGGLE_OFFLINE")]
    pub offline: bool,

    /// Ask the service to invent the item
    #[arg(long)]
    pub generate_item: bool,

    /// Ask the service for a picture of the item
    #[arg(long)]
    pub generate_image: bool,

    /// Directory where item pictures are saved
    #[arg(long)]
    pub image_dir: Option<PathBuf>,

    /// Messages each player may send
    #[arg(short = 'a', long, default_value_t = 3)]
    pub max_attempts: u32,

    /// Lowest starting price
    #[arg(long, default_value_t = 100)]
    pub min_price: u32,

    /// Highest starting price
    #[arg(long, default_value_t = 500)]
    pub max_price: u32,

    /// Item up for haggling
    #[arg(long, default_value = "Antique Vase")]
    pub item: String,

    /// Description of the item
    #[arg(long, default_value = "A delicate vase of questionable provenance.")]
    pub item_description: String,

    /// Seed for the starting price
    #[arg(long)]
    pub seed: Option<u64>,
}
