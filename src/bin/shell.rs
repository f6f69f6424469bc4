use rdfs::config::Config;
use rdfs::entry::{DirEntry, EntryKind};
use rdfs::error::{RdfsError, Result};
use rdfs::fs::{RemoteFileSystem, Session};

use std::process::exit;

use chrono::{DateTime, Utc};

use clap::clap_app;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let matches = clap_app![rdfs =>
        (@arg endpoint: -e --endpoint +takes_value
            "Filesystem endpoint, e.g. http://localhost:42000. Falls back to the configured default.")
        (@subcommand ls =>
            (about: "Lists the content of a given directory.")
            (@arg path: "The complete path to the directory.")
        )
        (@subcommand mkdir =>
            (about: "Creates a new directory (equivalent to `mkdir -p` on Unix systems).")
            (@arg path: "The directory to create.")
        )
        (@subcommand exists =>
            (about: "Reports whether a path names a file, a directory, or nothing.")
            (@arg path: "The path to check.")
        )
        (@subcommand mv =>
            (about: "Moves `src` to `dst`. Fails if `dst` already exists.")
            (@arg src: "Current path")
            (@arg dst: "Target path")
        )
        (@subcommand rm =>
            (about: "Removes a file, or a directory tree with --recursive.")
            (@arg path: "The path to remove.")
            (@arg recursive: -r --recursive "Removes directories and their contents recursively")
        )
        (@subcommand put =>
            (about: "Uploads a local file from `src` to remote `dst`")
            (@arg src: "Path to local file")
            (@arg dst: "Path to remote file")
        )
        (@subcommand get =>
            (about: "Downloads a remote file `src` to local destination `dst`")
            (@arg src: "Path to remote file")
            (@arg dst: "Path to local file")
        )
        (@subcommand cat =>
            (about: "Streams the contents of a remote file to standard output.")
            (@arg path: "Path to remote file")
        )
    ]
    .get_matches();

    let config = Config::load_from_env_or_default()?;
    let endpoint = matches.value_of("endpoint").unwrap_or("");
    let session = Session::connect(endpoint, &config).await?;
    let dfs = RemoteFileSystem::new(&session, &config);

    match matches.subcommand() {
        ("ls", Some(args)) => {
            let path = args
                .value_of("path")
                .ok_or_else(|| RdfsError::ArgMissingError("Path required".to_owned()))?;
            for entry in dfs.ls(path).await? {
                print_entry(&entry);
            }
        }
        ("mkdir", Some(args)) => {
            let path = args
                .value_of("path")
                .ok_or_else(|| RdfsError::ArgMissingError("Path required".to_owned()))?;
            dfs.mkdir(path).await?;
        }
        ("exists", Some(args)) => {
            let path = args
                .value_of("path")
                .ok_or_else(|| RdfsError::ArgMissingError("Path required".to_owned()))?;
            match dfs.exists(path).await? {
                Some(EntryKind::Directory) => println!("{}: directory", path),
                Some(EntryKind::File) => println!("{}: file", path),
                None => println!("{}: no such path", path),
            }
        }
        ("mv", Some(args)) => {
            let src = args
                .value_of("src")
                .ok_or_else(|| RdfsError::ArgMissingError("Source required".to_owned()))?;
            let dst = args
                .value_of("dst")
                .ok_or_else(|| RdfsError::ArgMissingError("Destination required".to_owned()))?;
            dfs.rename(src, dst).await?;
        }
        ("rm", Some(args)) => {
            let path = args
                .value_of("path")
                .ok_or_else(|| RdfsError::ArgMissingError("Path required".to_owned()))?;
            let removed = dfs.delete(path, args.is_present("recursive")).await?;
            if !removed {
                println!("Nothing removed at {}", path);
            }
        }
        ("put", Some(args)) => {
            let src = args
                .value_of("src")
                .ok_or_else(|| RdfsError::ArgMissingError("Source required".to_owned()))?;
            let dst = args
                .value_of("dst")
                .ok_or_else(|| RdfsError::ArgMissingError("Destination required".to_owned()))?;
            dfs.put(src, dst).await?;
        }
        ("get", Some(args)) => {
            let src = args
                .value_of("src")
                .ok_or_else(|| RdfsError::ArgMissingError("Source required".to_owned()))?;
            let dst = args
                .value_of("dst")
                .ok_or_else(|| RdfsError::ArgMissingError("Destination required".to_owned()))?;
            dfs.get(src, dst).await?;
        }
        ("cat", Some(args)) => {
            let path = args
                .value_of("path")
                .ok_or_else(|| RdfsError::ArgMissingError("Path required".to_owned()))?;
            let mut stdout = tokio::io::stdout();
            dfs.read_into(path, &mut stdout).await?;
        }
        (subcommand, _) => {
            eprintln!("Unrecognized command: '{}'", subcommand);
            exit(1);
        }
    }

    Ok(())
}

fn print_entry(entry: &DirEntry) {
    let kind = match entry.kind {
        EntryKind::Directory => 'd',
        EntryKind::File => '-',
    };
    let date = DateTime::<Utc>::from_timestamp_millis(entry.modification_time as i64)
        .map(|time| time.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| String::from("-"));
    println!(
        "{:>4} {} {:>10} {:>10} {:>10} {} {}",
        entry.index,
        kind,
        entry.print_size(),
        entry.owner,
        entry.group,
        date,
        entry.name()
    );
}
