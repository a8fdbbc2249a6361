use clap::{Parser, Subcommand};

use crate::error::Result;
use crate::transfer::TransferClient;
use crate::utils::confirm_deletion;

#[derive(Parser)]
#[command(
    name = "depot",
    version,
    about = "Manage files in a remote depot store: upload, list, download, delete"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List files under a remote path
    Ls {
        /// Remote path to list
        #[arg(default_value = "")]
        path: String,
        /// Show detailed information
        #[arg(short, long)]
        long: bool,
        /// Descend into subdirectories
        #[arg(short = 'R', long)]
        recursive: bool,
    },
    /// Upload a local file or directory
    Put {
        /// Local file or directory to upload
        local_path: String,
        /// Remote destination prefix
        #[arg(default_value = "")]
        remote_path: String,
        /// Upload directories recursively
        #[arg(short = 'R', long)]
        recursive: bool,
    },
    /// Download a remote file
    Get {
        /// Remote file to download
        remote_path: String,
        /// Local destination path
        local_path: String,
    },
    /// Delete remote files
    Rm {
        /// Remote paths to delete
        #[arg(required = true)]
        paths: Vec<String>,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

pub async fn run(args: Args, client: TransferClient) -> Result<()> {
    match args.command {
        Command::Ls {
            path,
            long,
            recursive,
        } => client.list_directory(&path, long, recursive).await,
        Command::Put {
            local_path,
            remote_path,
            recursive,
        } => {
            client
                .upload_files(&local_path, &remote_path, recursive)
                .await
        }
        Command::Get {
            remote_path,
            local_path,
        } => client.download_files(&remote_path, &local_path).await,
        Command::Rm { paths, force } => {
            if !confirm_deletion(&paths, force)? {
                println!("Aborted.");
                return Ok(());
            }
            client.delete_files(&paths).await
        }
    }
}
