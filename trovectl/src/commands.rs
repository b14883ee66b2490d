use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result, anyhow};
use futures::StreamExt;
use tracing::debug;
use trove_contracts::listings::ListingReader;
use trove_core::commit::{CommitStream, DeleteOutcome};
use trove_core::error::CommitError;
use trove_core::media::MediaStatus;
use trove_core::prelude::{CommitState, MediaErrorKind};
use trove_core::services::ClientServices;
use trove_model::{Listing, ListingDraft, ListingId, OwnerEmail, PhotoUpload};

use crate::cli::ListingArgs;
use crate::prompt::TerminalConfirm;

/// Listing saved, photo not.
const EXIT_PARTIAL_FAILURE: u8 = 3;

pub async fn listings(
    services: &ClientServices,
    owner: Option<String>,
    json: bool,
) -> Result<ExitCode> {
    let listings = match owner {
        Some(owner) => {
            let owner = parse_owner(&owner)?;
            services.gateway.list_listings_for_owner(&owner).await?
        }
        None => services.gateway.list_listings().await?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&listings)?);
    } else if listings.is_empty() {
        println!("no listings");
    } else {
        for listing in &listings {
            print_listing(listing);
        }
    }
    Ok(ExitCode::SUCCESS)
}

pub async fn create(services: &ClientServices, args: ListingArgs) -> Result<ExitCode> {
    let owner = parse_owner(&args.owner)?;
    let photo = read_photo(args.photo.as_deref()).await?;
    let draft = ListingDraft::new(args.title, args.price, args.description);

    let stream = services.commits.submit_create(&owner, &draft, photo);
    Ok(report(stream).await)
}

pub async fn update(services: &ClientServices, id: u64, args: ListingArgs) -> Result<ExitCode> {
    let owner = parse_owner(&args.owner)?;
    let photo = read_photo(args.photo.as_deref()).await?;
    let draft = ListingDraft::new(args.title, args.price, args.description);

    let stream = services
        .commits
        .submit_update(&owner, ListingId::new(id), &draft, photo);
    Ok(report(stream).await)
}

pub async fn delete(
    services: &ClientServices,
    id: u64,
    owner: &str,
    yes: bool,
) -> Result<ExitCode> {
    let owner = parse_owner(owner)?;
    let confirm = TerminalConfirm::new(yes);

    match services
        .commits
        .delete(&owner, ListingId::new(id), &confirm)
        .await?
    {
        DeleteOutcome::Declined => println!("delete cancelled"),
        DeleteOutcome::Deleted { .. } => println!("listing {id} deleted"),
    }
    Ok(ExitCode::SUCCESS)
}

pub async fn photo(services: &ClientServices, id: u64, out: &Path) -> Result<ExitCode> {
    let listing_id = ListingId::new(id);
    let binding = services.media.bind();
    let snapshot = binding.resolve_latest(listing_id).await;

    let result = match (&snapshot.status, &snapshot.handle) {
        (MediaStatus::Ready, Some(handle)) => {
            let bytes = services
                .media
                .store()
                .bytes(handle)
                .context("photo was released before it could be written")?;
            tokio::fs::write(out, &bytes)
                .await
                .with_context(|| format!("writing {}", out.display()))?;
            println!(
                "wrote {} bytes ({}) to {}",
                handle.len(),
                handle.content_type().unwrap_or("unknown type"),
                out.display()
            );
            Ok(ExitCode::SUCCESS)
        }
        (MediaStatus::Error(MediaErrorKind::NotFound), _) => {
            println!("listing {id} has no photo");
            Ok(ExitCode::FAILURE)
        }
        (MediaStatus::Error(kind), _) => {
            Err(anyhow!("photo unavailable for listing {id}: {kind:?}"))
        }
        (status, _) => Err(anyhow!(
            "photo for listing {id} did not resolve (status {status:?})"
        )),
    };

    binding.unbind();
    debug!(live = services.media.store().live_count(), "media handles after photo command");
    result
}

/// Print every state of a commit and map its terminal state to an exit code.
async fn report(mut stream: CommitStream) -> ExitCode {
    debug!(commit_id = %stream.id(), "commit submitted");
    let mut terminal = CommitState::Draft;
    while let Some(state) = stream.next().await {
        match &state {
            CommitState::Failed {
                error: CommitError::Validation(errors),
                ..
            } => {
                eprintln!("invalid listing:");
                for issue in errors.issues() {
                    eprintln!("  {}: {}", issue.field, issue.message);
                }
            }
            CommitState::Failed { .. } | CommitState::PartialFailure { .. } => {
                eprintln!("{state}")
            }
            _ => println!("{state}"),
        }
        terminal = state;
    }

    match terminal {
        CommitState::Committed { listing, .. } => {
            print_listing(&listing);
            ExitCode::SUCCESS
        }
        CommitState::PartialFailure { listing, .. } => {
            print_listing(&listing);
            eprintln!("retry the photo with `trovectl update {}`", listing.id);
            ExitCode::from(EXIT_PARTIAL_FAILURE)
        }
        _ => ExitCode::FAILURE,
    }
}

fn print_listing(listing: &Listing) {
    println!(
        "{:>6}  {:<32}  {:>10}  {}",
        listing.id.to_string(),
        listing.title,
        listing.price.to_string(),
        listing.owner_email
    );
}

fn parse_owner(raw: &str) -> Result<OwnerEmail> {
    OwnerEmail::parse(raw).with_context(|| format!("invalid owner email {raw:?}"))
}

async fn read_photo(path: Option<&Path>) -> Result<Option<PhotoUpload>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading photo {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "photo".to_string());
    Ok(Some(PhotoUpload::new(bytes, file_name)))
}
