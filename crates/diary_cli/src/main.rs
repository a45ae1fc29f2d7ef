//! Diary CLI.
//!
//! # Responsibility
//! - Inspect a diary store (SQLite file or JSON snapshot) from a terminal.
//! - Move posts between the SQLite store and JSON snapshots.

use clap::{Parser, Subcommand};
use diary_core::db::open_db;
use diary_core::{
    build_tag_index, extract_hashtags, init_logging_from_config, load_snapshot, render_content,
    save_snapshot, should_show_more, DateKey, DiaryConfig, LineKind, PostFilter, PostRepository,
    PostService, PostStore, Segment, SqlitePostRepository,
};
use std::error::Error;
use std::path::{Path, PathBuf};

/// Calendar diary with hashtags
#[derive(Parser, Debug)]
#[command(name = "diary", version, about = "Inspect and edit a diary store")]
struct Cli {
    /// Store path; `.json` files are read as snapshots (default: $DIARY_DB_PATH)
    #[arg(short, long)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every hashtag in the store
    Tags,

    /// Render the posts of one day
    Show {
        /// Day as YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<DateKey>,
    },

    /// List posts matching a day, tags and/or keyword
    Filter {
        #[arg(long)]
        date: Option<DateKey>,
        /// Repeat for AND semantics, e.g. `--tag x --tag '#y'`
        #[arg(long = "tag", value_parser = parse_tag)]
        tags: Vec<String>,
        #[arg(long, default_value = "")]
        keyword: String,
    },

    /// Write a new post (SQLite stores only)
    Add {
        #[arg(long)]
        date: Option<DateKey>,
        #[arg(long)]
        text: String,
        #[arg(long)]
        author: Option<String>,
    },

    /// Copy a JSON snapshot into the SQLite store
    Import { from: PathBuf },

    /// Write the SQLite store to a JSON snapshot
    Export { to: PathBuf },
}

fn main() {
    if let Err(err) = run(Cli::parse()) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut config = DiaryConfig::from_env();
    if let Some(path) = cli.store {
        config.db_path = path;
    }
    init_logging_from_config(&config)?;
    log::info!(
        "event=cli_start module=cli status=ok store={}",
        config.db_path.display()
    );

    match cli.command {
        Command::Tags => {
            for tag in build_tag_index(&read_store(&config.db_path)?) {
                println!("{tag}");
            }
        }
        Command::Show { date } => {
            let date = date.unwrap_or_else(DateKey::today);
            let store = read_store(&config.db_path)?;
            let posts = store.bucket(&date);
            if posts.is_empty() {
                println!("{date}: no posts");
            }
            for post in posts {
                let marker = if should_show_more(post, config.show_more_threshold) {
                    " [more]"
                } else {
                    ""
                };
                println!("--- {date} {} {}{marker}", post.id, post.created_at);
                print_rendered(&post.content);
                for image in &post.images {
                    println!("  [image] {}", image.name);
                }
            }
        }
        Command::Filter {
            date,
            tags,
            keyword,
        } => {
            let store = read_store(&config.db_path)?;
            let filter = PostFilter {
                selected_date: Some(date.unwrap_or_else(DateKey::today)),
                ..PostFilter::default()
            }
            .with_tags(tags)
            .with_keyword(keyword);
            for item in filter.apply(&store) {
                let date = item.date.map(DateKey::as_str).unwrap_or("");
                println!("{date}\t{}\t{}", item.post.id, first_line(&item.post.content));
            }
        }
        Command::Add { date, text, author } => {
            ensure_sqlite_store(&config.db_path)?;
            let date = date.unwrap_or_else(DateKey::today);
            let mut conn = open_db(&config.db_path)?;
            let mut service = PostService::new(SqlitePostRepository::try_new(&mut conn)?);
            let post = service.create_post(&date, &text, Vec::new(), author)?;
            println!("{date}/{}", post.id);
        }
        Command::Import { from } => {
            ensure_sqlite_store(&config.db_path)?;
            let snapshot = load_snapshot(&from)?;
            let mut conn = open_db(&config.db_path)?;
            let imported = SqlitePostRepository::try_new(&mut conn)?.import_store(&snapshot)?;
            println!("imported {imported} posts");
        }
        Command::Export { to } => {
            ensure_sqlite_store(&config.db_path)?;
            let mut conn = open_db(&config.db_path)?;
            let store = SqlitePostRepository::try_new(&mut conn)?.load_store()?;
            save_snapshot(&to, &store)?;
            println!("exported {} posts", store.len());
        }
    }

    Ok(())
}

fn is_snapshot_path(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

fn ensure_sqlite_store(path: &Path) -> Result<(), Box<dyn Error>> {
    if is_snapshot_path(path) {
        return Err(format!(
            "`{}` is a JSON snapshot; this command needs a SQLite store",
            path.display()
        )
        .into());
    }
    Ok(())
}

/// Accepts `x` or `#x`; stored tags always carry the `#`.
fn parse_tag(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim();
    let tag = if trimmed.starts_with('#') {
        trimmed.to_string()
    } else {
        format!("#{trimmed}")
    };
    if extract_hashtags(&tag) == [tag.as_str()] {
        Ok(tag)
    } else {
        Err(format!("`{raw}` is not a hashtag"))
    }
}

fn read_store(path: &Path) -> Result<PostStore, Box<dyn Error>> {
    if is_snapshot_path(path) {
        return Ok(load_snapshot(path)?);
    }
    let mut conn = open_db(path)?;
    Ok(SqlitePostRepository::try_new(&mut conn)?.load_store()?)
}

fn print_rendered(content: &str) {
    for line in render_content(content) {
        let body: String = line
            .segments
            .iter()
            .map(|segment| match segment {
                Segment::Bold(text) => format!("**{text}**"),
                Segment::Italic(text) => format!("_{text}_"),
                Segment::Link { label, href } if label != href => format!("{label} <{href}>"),
                other => other.text().to_string(),
            })
            .collect();
        match line.kind {
            LineKind::Heading(level) => println!("{} {body}", "#".repeat(usize::from(level))),
            LineKind::ListItem => println!("  • {body}"),
            LineKind::Blank => println!(),
            LineKind::Paragraph => println!("{body}"),
        }
    }
}

fn first_line(content: &str) -> &str {
    content.lines().next().unwrap_or("")
}
