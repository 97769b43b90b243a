use std::sync::Arc;

use anyhow::{bail, Context};
use colored::Colorize;
use dsv_crypto::{Ed25519Signer, Signer, VerifyingKey};
use dsv_dataset::{Commit, Dataset};
use dsv_dsfs::{create, load, BodyChangePolicy, CreateConfig, DescribeError, Describer};
use dsv_store::InMemoryContentStore;
use serde_json::json;
use tracing::debug;

use crate::cli::*;
use crate::input::{read_document, select};

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    match cli.command {
        Command::Diff(args) => cmd_diff(args, format),
        Command::Describe(args) => cmd_describe(args, format),
        Command::Create(args) => cmd_create(args, format),
    }
}

fn cmd_diff(args: DiffArgs, format: OutputFormat) -> anyhow::Result<()> {
    let left = read_document(&args.left)?;
    let right = read_document(&args.right)?;
    let selector = args.selector.as_deref();
    let output = dsv_diff::render(
        select(&left.raw, selector),
        select(&right.raw, selector),
        format.into(),
    )?;

    match format {
        OutputFormat::Json => println!("{output}"),
        OutputFormat::Text => {
            for line in output.lines() {
                if line.starts_with('+') {
                    println!("{}", line.green());
                } else if line.starts_with('-') {
                    println!("{}", line.red());
                } else {
                    println!("{line}");
                }
            }
        }
    }
    Ok(())
}

fn cmd_describe(args: DescribeArgs, format: OutputFormat) -> anyhow::Result<()> {
    let prev = read_document(&args.prev)?.dataset;
    let next = read_document(&args.next)?.dataset;
    let describer = Describer::new(BodyChangePolicy {
        max_itemized_percent: args.max_itemized_percent,
        max_itemized_rows: args.max_itemized_rows,
    });

    let description = match describer.describe(Some(&prev), Some(&next), args.force) {
        Ok(description) => description,
        Err(DescribeError::NoChanges) => {
            println!("{}", "No changes.".yellow());
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    match format {
        OutputFormat::Json => println!(
            "{}",
            json!({"title": description.short, "message": description.long})
        ),
        OutputFormat::Text => {
            println!("{}", description.short.bold());
            println!();
            println!("{}", description.long);
        }
    }
    Ok(())
}

fn cmd_create(args: CreateArgs, format: OutputFormat) -> anyhow::Result<()> {
    let signer = match &args.key {
        Some(key) => signer_from_hex(key)?,
        None => Ed25519Signer::generate(),
    };
    let author = signer.profile_id();
    let verifying_key = signer.verifying_key();
    let config = CreateConfig::new()
        .with_signer(Arc::new(signer))
        .strict(args.strict);
    let store = InMemoryContentStore::new();

    let prev = match &args.prev {
        Some(path) => {
            let saved = create(&store, with_commit(read_document(path)?.dataset), None, &config)
                .with_context(|| format!("saving previous version {}", path.display()))?;
            debug!(path = %saved, "saved previous version");
            Some(Dataset {
                path: Some(saved),
                ..Dataset::default()
            })
        }
        None => None,
    };

    let next = with_commit(read_document(&args.next)?.dataset);
    let path = create(&store, next, prev, &config.force(args.force))
        .with_context(|| format!("saving {}", args.next.display()))?;
    let saved = load(&store, &path)?;
    let commit = saved.commit().cloned().unwrap_or_default();
    let structure = saved.structure().cloned().unwrap_or_default();
    let verified = signature_verifies(&verifying_key, &commit);

    match format {
        OutputFormat::Json => println!(
            "{}",
            json!({
                "path": path.to_string(),
                "previousPath": saved.previous_path.as_ref().map(ToString::to_string),
                "commit": commit,
                "signatureVerified": verified,
                "structure": structure,
            })
        ),
        OutputFormat::Text => {
            println!("{} Saved {}", "✓".green().bold(), path.to_string().cyan());
            if let Some(previous) = &saved.previous_path {
                println!("  Previous: {}", previous.to_string().dimmed());
            }
            println!("  Author: {}", author.to_string().yellow());
            if verified {
                println!("  Signature: {}", "verified".green());
            } else {
                println!("  Signature: {}", "invalid".red().bold());
            }
            println!("  Title: {}", commit.title.bold());
            for line in commit.message.lines() {
                println!("    {line}");
            }
            println!(
                "  Body: {} entries, {} bytes, depth {}, {} invalid",
                structure.entries, structure.length, structure.depth, structure.err_count
            );
            println!("  Objects in store: {}", store.len());
        }
    }
    Ok(())
}

fn signer_from_hex(key: &str) -> anyhow::Result<Ed25519Signer> {
    let bytes = hex::decode(key.trim()).context("key must be hex")?;
    let Ok(secret) = <[u8; 32]>::try_from(bytes.as_slice()) else {
        bail!("key must be 32 bytes, got {}", bytes.len());
    };
    Ok(Ed25519Signer::from_bytes(secret))
}

fn signature_verifies(key: &VerifyingKey, commit: &Commit) -> bool {
    let Some(signature) = commit.signature.as_deref() else {
        return false;
    };
    let (Ok(signature), Ok(message)) = (hex::decode(signature), commit.signing_bytes()) else {
        return false;
    };
    key.verify(&message, &signature).is_ok()
}

/// Documents without a commit get an empty one for the message to fill.
fn with_commit(mut dataset: Dataset) -> Dataset {
    dataset
        .commit
        .get_or_insert_with(|| Commit::default().into());
    dataset
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_keys() {
        let key = "2a".repeat(32);
        let signer = signer_from_hex(&key).unwrap();
        assert_eq!(
            signer.profile_id(),
            Ed25519Signer::from_bytes([42; 32]).profile_id()
        );
        assert!(signer_from_hex("2a2a").is_err());
        assert!(signer_from_hex("zz").is_err());
    }

    #[test]
    fn created_commits_verify() {
        let signer = Ed25519Signer::from_bytes([5; 32]);
        let key = signer.verifying_key();
        let store = InMemoryContentStore::new();
        let config = CreateConfig::new().with_signer(Arc::new(signer));
        let next = Dataset {
            body: Some(dsv_dataset::Body::Rows(vec![json!([1])])),
            ..with_commit(Dataset::default())
        };
        let path = create(&store, next, None, &config).unwrap();
        let mut commit = load(&store, &path).unwrap().commit().cloned().unwrap();
        assert!(signature_verifies(&key, &commit));

        commit.title = "tampered".into();
        assert!(!signature_verifies(&key, &commit));
        commit.signature = None;
        assert!(!signature_verifies(&key, &commit));
    }

    #[test]
    fn missing_commit_is_added() {
        let ds = with_commit(Dataset::default());
        assert_eq!(ds.commit().map(|c| c.title.as_str()), Some(""));

        let titled = Dataset {
            commit: Some(Commit::with_title("kept").into()),
            ..Dataset::default()
        };
        assert_eq!(with_commit(titled).commit().unwrap().title, "kept");
    }
}
