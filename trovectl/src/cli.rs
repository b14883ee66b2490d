use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "trovectl", version, about = "Manage marketplace listings and their photos")]
pub struct Cli {
    /// Configuration file (TOML or JSON). Overrides TROVE_CONFIG_PATH.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List every listing, or only those owned by --owner
    Listings {
        #[arg(long, value_name = "EMAIL")]
        owner: Option<String>,
        /// Print the listings as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a listing, optionally attaching a photo
    Create(ListingArgs),
    /// Overwrite a listing's fields and optionally replace its photo
    Update {
        /// Listing id
        id: u64,
        #[command(flatten)]
        listing: ListingArgs,
    },
    /// Delete a listing after confirmation
    Delete {
        /// Listing id
        id: u64,
        #[arg(long, value_name = "EMAIL")]
        owner: String,
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Download a listing's photo
    Photo {
        /// Listing id
        id: u64,
        /// Where to write the photo bytes
        #[arg(long, value_name = "PATH")]
        out: PathBuf,
    },
}

#[derive(Args, Debug)]
pub struct ListingArgs {
    #[arg(long, value_name = "EMAIL")]
    pub owner: String,
    #[arg(long)]
    pub title: String,
    /// Price such as 42 or 42.50
    #[arg(long)]
    pub price: String,
    #[arg(long)]
    pub description: String,
    /// Image file to attach
    #[arg(long, value_name = "PATH")]
    pub photo: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn update_takes_positional_id() {
        let cli = Cli::try_parse_from([
            "trovectl",
            "update",
            "7",
            "--owner",
            "seller@example.com",
            "--title",
            "Lamp",
            "--price",
            "42.50",
            "--description",
            "Works great",
        ])
        .unwrap();
        let Command::Update { id, listing } = cli.command else {
            panic!("expected update");
        };
        assert_eq!(id, 7);
        assert_eq!(listing.price, "42.50");
        assert!(listing.photo.is_none());
    }
}
