mod render;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, anyhow, bail};
use clap::{Parser, Subcommand};
use client::session::{Browser, StoredAuthClient};
use client::{ClientError, Config, FileStorage};

#[derive(Parser)]
#[command(name = "filestore")]
#[command(about = "File Storage - per-user uploads on a shared asset canister")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current login state
    Status,
    /// Log in with the identity provider
    Login,
    /// Log out and clear the stored session
    Logout,
    /// List your stored files
    List,
    /// Upload a file
    Upload {
        /// File to upload
        path: PathBuf,
    },
    /// Download a stored file
    Download {
        /// File name or storage key
        name: String,
        /// Directory to save into
        #[arg(long, short, default_value = ".")]
        out: PathBuf,
    },
    /// Delete a stored file
    Rm {
        /// File name or storage key
        name: String,
    },
}

type Storage = FileStorage<StoredAuthClient>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().map_err(user_error)?;
    let mut storage = FileStorage::create(config).await.map_err(user_error)?;

    match cli.command {
        Commands::Status => status(&storage),
        Commands::Login => login(&mut storage).await,
        Commands::Logout => logout(&mut storage).await,
        Commands::List => list(&mut storage).await,
        Commands::Upload { path } => upload(&mut storage, &path).await,
        Commands::Download { name, out } => download(&mut storage, &name, &out).await,
        Commands::Rm { name } => remove(&mut storage, &name).await,
    }
}

fn user_error(error: ClientError) -> anyhow::Error {
    anyhow!(error.user_message())
}

fn require_login(storage: &Storage) -> anyhow::Result<()> {
    if !storage.session().is_authenticated {
        bail!("Not logged in; run `filestore login` first");
    }
    Ok(())
}

fn status(storage: &Storage) -> anyhow::Result<()> {
    let receiver = storage.subscribe();
    let session = receiver.borrow().clone();
    if session.is_authenticated {
        println!("Logged in as {}", session.principal);
        println!("{} file(s) stored", storage.files().len());
    } else {
        println!("Logged out");
    }
    Ok(())
}

async fn login(storage: &mut Storage) -> anyhow::Result<()> {
    if storage.session().is_authenticated {
        println!("Already logged in as {}", storage.session().principal);
        return Ok(());
    }
    let browser = Browser::detect();
    let url = storage.provider_url(browser).map_err(user_error)?;
    println!("Complete the sign-in in your browser: {url}");

    let session = storage.login(browser).await.map_err(user_error)?;
    println!("Logged in as {}", session.principal);
    Ok(())
}

async fn logout(storage: &mut Storage) -> anyhow::Result<()> {
    storage.logout().await.map_err(user_error)?;
    println!("Logged out");
    Ok(())
}

async fn list(storage: &mut Storage) -> anyhow::Result<()> {
    require_login(storage)?;
    storage.refresh().await.map_err(user_error)?;
    render::print_table(storage.files());
    Ok(())
}

async fn upload(storage: &mut Storage, path: &Path) -> anyhow::Result<()> {
    require_login(storage)?;
    storage.select(path).map_err(user_error)?;

    let record = storage
        .upload(render::progress_line())
        .await
        .map_err(user_error)?;
    eprintln!();
    println!("Uploaded {} as {}", record.filename, record.key);
    Ok(())
}

async fn download(storage: &mut Storage, name: &str, out: &Path) -> anyhow::Result<()> {
    require_login(storage)?;
    storage.refresh().await.map_err(user_error)?;

    let (url, filename) = storage
        .download_target(name)
        .ok_or_else(|| anyhow!("No stored file named {name}"))?;
    let response = reqwest::get(&url)
        .await
        .with_context(|| format!("failed to fetch {url}"))?
        .error_for_status()?;
    let bytes = response.bytes().await?;

    let target = out.join(&filename);
    std::fs::write(&target, &bytes)
        .with_context(|| format!("failed to write {}", target.display()))?;
    println!("Saved {}", target.display());
    Ok(())
}

async fn remove(storage: &mut Storage, name: &str) -> anyhow::Result<()> {
    require_login(storage)?;
    storage.refresh().await.map_err(user_error)?;

    let record = storage
        .files()
        .iter()
        .find(|record| record.key == name || record.filename == name)
        .cloned()
        .ok_or_else(|| anyhow!("No stored file named {name}"))?;
    storage.remove(&record.key).await.map_err(user_error)?;
    println!("Deleted {}", record.filename);
    Ok(())
}
