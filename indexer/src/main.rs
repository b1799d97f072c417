use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use termstore_core::{Client, Operator, SledStore, Store};
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct InputDoc {
    id: String,
    #[serde(alias = "body")]
    text: String,
    #[serde(default)]
    title: Option<String>,
}

impl InputDoc {
    fn full_text(&self) -> String {
        match &self.title {
            Some(title) => format!("{title} {}", self.text),
            None => self.text.clone(),
        }
    }
}

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Maintain and query a term index stored in sled", long_about = None)]
struct Cli {
    /// sled database directory
    #[arg(long, default_value = "./termstore.db")]
    db: String,
    /// Key namespace; empty uses the library default
    #[arg(long, default_value = "")]
    namespace: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index every document found in JSON/JSONL files or a directory of them
    Build {
        /// Input path (file or directory)
        #[arg(long)]
        input: String,
    },
    /// Index one document
    Add {
        #[arg(long)]
        id: String,
        #[arg(long)]
        text: String,
    },
    /// Remove one document
    Remove {
        #[arg(long)]
        id: String,
    },
    /// Print matching ids, best first
    Query {
        #[arg(long)]
        q: String,
        /// and | or
        #[arg(long, default_value = "or")]
        op: Operator,
    },
    /// Print the terms indexed for a document
    Terms {
        #[arg(long)]
        id: String,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    let store = SledStore::open(&cli.db).with_context(|| format!("opening {}", cli.db))?;
    let client = Client::new(store, &cli.namespace);

    match cli.command {
        Commands::Build { input } => {
            let count = build_index(&client, Path::new(&input))?;
            tracing::info!(count, input = %input, "index build complete");
        }
        Commands::Add { id, text } => client.index(&text, &id)?,
        Commands::Remove { id } => client.remove(&id)?,
        Commands::Query { q, op } => {
            for id in client.query(&q, op)? {
                println!("{id}");
            }
        }
        Commands::Terms { id } => {
            for term in client.document_terms(&id)? {
                println!("{term}");
            }
        }
    }
    client.flush()?;
    Ok(())
}

fn collect_files(input: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() {
                if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
                    if matches!(ext, "json" | "jsonl") {
                        files.push(p.to_path_buf());
                    }
                }
            }
        }
        files.sort();
    } else if input.is_file() {
        files.push(input.to_path_buf());
    }
    files
}

fn build_index<S: Store>(client: &Client<S>, input: &Path) -> Result<usize> {
    let mut count = 0;
    for file in collect_files(input) {
        let docs = if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            read_jsonl(&file)?
        } else {
            read_json(&file)?
        };
        for doc in &docs {
            client
                .index(&doc.full_text(), &doc.id)
                .with_context(|| format!("indexing {} from {}", doc.id, file.display()))?;
        }
        tracing::debug!(file = %file.display(), docs = docs.len(), "ingested file");
        count += docs.len();
    }
    Ok(count)
}

fn read_jsonl(file: &Path) -> Result<Vec<InputDoc>> {
    let reader = BufReader::new(File::open(file)?);
    let mut docs = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        docs.push(serde_json::from_str(&line)?);
    }
    Ok(docs)
}

fn read_json(file: &Path) -> Result<Vec<InputDoc>> {
    let reader = BufReader::new(File::open(file)?);
    let json: serde_json::Value = serde_json::from_reader(reader)?;
    let docs = match json {
        serde_json::Value::Array(arr) => arr
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<InputDoc>, _>>()?,
        serde_json::Value::Object(_) => vec![serde_json::from_value(json)?],
        _ => Vec::new(),
    };
    Ok(docs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;
    use termstore_core::MemoryStore;

    #[test]
    fn builds_from_directory() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("a.json"),
            r#"[{"id":"1","text":"baller search text"},{"id":"2","body":"some more baller text to find"}]"#,
        )
        .unwrap();
        fs::create_dir_all(dir.path().join("nested")).unwrap();
        fs::write(
            dir.path().join("nested/b.jsonl"),
            "{\"id\":\"3\",\"title\":\"Found\",\"text\":\"this text\"}\n\n",
        )
        .unwrap();
        fs::write(dir.path().join("ignored.txt"), "not json").unwrap();

        let client = Client::new(MemoryStore::new(), "");
        assert_eq!(build_index(&client, dir.path()).unwrap(), 3);
        assert_eq!(client.query("baller text", Operator::And).unwrap(), vec!["2", "1"]);
        assert_eq!(client.query("found", Operator::Or).unwrap(), vec!["3"]);
    }

    #[test]
    fn single_object_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("one.json");
        fs::write(&path, r#"{"id":"x","text":"lonely document"}"#).unwrap();
        let client = Client::new(MemoryStore::new(), "t");
        assert_eq!(build_index(&client, &path).unwrap(), 1);
        assert_eq!(client.document_terms("x").unwrap(), vec!["document", "lonely"]);
    }

    #[test]
    fn rejects_empty_ids() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.jsonl");
        fs::write(&path, "{\"id\":\"\",\"text\":\"nothing\"}\n").unwrap();
        let client = Client::new(MemoryStore::new(), "t");
        assert!(build_index(&client, &path).is_err());
    }
}
